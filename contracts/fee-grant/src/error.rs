use cosmwasm_std::StdError;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("Fee allowance not found")]
    NoGrant {},

    #[error("Fee allowance already exists, revoke it first")]
    GrantExists {},

    #[error("Fee allowance has expired")]
    Expired {},

    #[error("Requested fee exceeds the {budget} spend limit")]
    InsufficientFunds { budget: String },

    #[error("Message {msg_type} is not in the allowed messages")]
    Unauthorized { msg_type: String },

    #[error("Invalid fee allowance: {reason}")]
    InvalidGrant { reason: String },
}

impl ContractError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        ContractError::InvalidGrant {
            reason: reason.into(),
        }
    }
}
