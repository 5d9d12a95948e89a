use cosmwasm_std::StdError;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("Authorization not found")]
    NoGrant {},

    #[error("Authorization already exists, revoke it first")]
    GrantExists {},

    #[error("Authorization has expired")]
    Expired {},

    #[error("Requested amount exceeds the {budget} spend limit")]
    InsufficientFunds { budget: String },

    #[error("Authorization for {expected} cannot accept {got}")]
    TypeMismatch { expected: String, got: String },

    #[error("Invalid authorization: {reason}")]
    InvalidGrant { reason: String },
}

impl ContractError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        ContractError::InvalidGrant {
            reason: reason.into(),
        }
    }
}
