use thiserror::Error;

/// Errors surfaced by every chain client.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid phrase: {0}")]
    InvalidPhrase(String),

    #[error("client has no wallet attached")]
    ClientLocked,

    #[error("invalid wallet index: {0}")]
    InvalidIndex(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: u128, available: u128 },

    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    #[error("collaborator request failed: {0}")]
    Collaborator(String),

    #[error("broadcast rejected: {0}")]
    Broadcast(String),

    #[error("key derivation failed: {0}")]
    Derivation(String),

    #[error("signing failed: {0}")]
    Signing(String),

    #[error("initializer '{step}' failed: {reason}")]
    Initialization { step: String, reason: String },

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T, E = ClientError> = std::result::Result<T, E>;
