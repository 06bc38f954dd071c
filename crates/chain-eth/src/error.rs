use client_core::ClientError;
use thiserror::Error;

/// Ethereum chain operation errors.
#[derive(Debug, Error)]
pub enum EthError {
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("transaction build error: {0}")]
    TransactionBuildError(String),

    #[error("signing error: {0}")]
    SigningError(String),

    #[error("encoding error: {0}")]
    EncodingError(String),

    #[error("node reports chain id {actual}, expected {expected}")]
    ChainIdMismatch { expected: u64, actual: u64 },
}

impl From<EthError> for ClientError {
    fn from(err: EthError) -> Self {
        match err {
            EthError::InvalidAddress(msg) => ClientError::InvalidAddress(msg),
            EthError::InvalidPrivateKey(_)
            | EthError::InvalidPublicKey(_)
            | EthError::SigningError(_) => ClientError::Signing(err.to_string()),
            EthError::TransactionBuildError(_) => ClientError::InvalidParams(err.to_string()),
            EthError::EncodingError(_) => ClientError::Collaborator(err.to_string()),
            EthError::ChainIdMismatch { .. } => ClientError::Collaborator(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_chain_id_mismatch() {
        let err = EthError::ChainIdMismatch {
            expected: 1,
            actual: 11155111,
        };
        assert_eq!(err.to_string(), "node reports chain id 11155111, expected 1");
    }

    #[test]
    fn address_errors_stay_address_errors() {
        let err: ClientError = EthError::InvalidAddress("bad checksum".into()).into();
        assert!(matches!(err, ClientError::InvalidAddress(msg) if msg == "bad checksum"));
    }

    #[test]
    fn key_problems_surface_as_signing_errors() {
        let err: ClientError = EthError::InvalidPrivateKey("zero scalar".into()).into();
        assert!(matches!(err, ClientError::Signing(_)));
    }

    #[test]
    fn malformed_node_data_is_a_collaborator_error() {
        let err: ClientError = EthError::EncodingError("short return data".into()).into();
        assert!(matches!(err, ClientError::Collaborator(_)));
    }
}
