use client_core::ClientError;
use thiserror::Error;

/// UTXO chain operation errors.
#[derive(Debug, Error)]
pub enum UtxoError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid utxo: {0}")]
    InvalidUtxo(String),

    #[error("insufficient funds: need {needed} sat, have {available} sat")]
    InsufficientFunds { needed: u64, available: u64 },

    #[error("memo is {len} bytes, at most {max} are relayed")]
    MemoTooLong { len: usize, max: usize },

    #[error("transaction build error: {0}")]
    TransactionBuildError(String),

    #[error("signing error: {0}")]
    SigningError(String),
}

impl From<UtxoError> for ClientError {
    fn from(err: UtxoError) -> Self {
        match err {
            UtxoError::InvalidAddress(msg) => ClientError::InvalidAddress(msg),
            UtxoError::InsufficientFunds { needed, available } => ClientError::InsufficientFunds {
                needed: u128::from(needed),
                available: u128::from(available),
            },
            UtxoError::InvalidPublicKey(_) | UtxoError::SigningError(_) => {
                ClientError::Signing(err.to_string())
            }
            UtxoError::InvalidUtxo(_)
            | UtxoError::MemoTooLong { .. }
            | UtxoError::TransactionBuildError(_) => ClientError::InvalidParams(err.to_string()),
        }
    }
}
