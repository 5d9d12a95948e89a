use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, BlockInfo, Coin, Timestamp};
use grant_shared::{checked_sub_coins, has_unique_denoms, is_all_positive, Accepted};

use crate::error::ContractError;

/// Message type governed by [`SendAuthorization`].
pub const SEND_MSG_TYPE_URL: &str = "/cosmos.bank.v1beta1.MsgSend";

/// A capability the granter hands to the grantee.
#[cw_serde]
pub enum Authorization {
    Send(SendAuthorization),
    Generic(GenericAuthorization),
}

/// Lets the grantee send up to `spend_limit` of the granter's tokens.
#[cw_serde]
pub struct SendAuthorization {
    pub spend_limit: Vec<Coin>,
}

/// Unrestricted permission to execute one message type.
#[cw_serde]
pub struct GenericAuthorization {
    pub msg: String,
}

/// An action the grantee wants to perform on the granter's behalf.
#[cw_serde]
pub struct Action {
    pub type_url: String,
    pub amount: Vec<Coin>,
}

#[cw_serde]
pub struct AuthorizationGrant {
    pub granter: Addr,
    pub grantee: Addr,
    pub authorization: Authorization,
    pub expiration: Option<Timestamp>,
}

impl AuthorizationGrant {
    pub fn is_expired(&self, block: &BlockInfo) -> bool {
        self.expiration
            .map_or(false, |expiration| block.time >= expiration)
    }
}

impl Authorization {
    pub fn msg_type_url(&self) -> &str {
        match self {
            Authorization::Send(_) => SEND_MSG_TYPE_URL,
            Authorization::Generic(generic) => generic.msg.as_str(),
        }
    }

    pub fn validate(&self) -> Result<(), ContractError> {
        match self {
            Authorization::Send(send) => send.validate(),
            Authorization::Generic(generic) => {
                if generic.msg.is_empty() {
                    return Err(ContractError::invalid("message type cannot be blank"));
                }
                Ok(())
            }
        }
    }

    pub fn accept(&self, action: &Action) -> Result<Accepted<Authorization>, ContractError> {
        if action.type_url != self.msg_type_url() {
            return Err(ContractError::TypeMismatch {
                expected: self.msg_type_url().to_string(),
                got: action.type_url.clone(),
            });
        }

        match self {
            Authorization::Send(send) => Ok(send.accept(&action.amount)?.map(Authorization::Send)),
            Authorization::Generic(_) => Ok(Accepted::Retain(self.clone())),
        }
    }
}

impl SendAuthorization {
    pub fn validate(&self) -> Result<(), ContractError> {
        if self.spend_limit.is_empty() {
            return Err(ContractError::invalid("spend limit cannot be empty"));
        }
        if !is_all_positive(&self.spend_limit) {
            return Err(ContractError::invalid("spend limit must be positive"));
        }
        if !has_unique_denoms(&self.spend_limit) {
            return Err(ContractError::invalid(
                "spend limit has duplicate denominations",
            ));
        }
        Ok(())
    }

    pub fn accept(&self, amount: &[Coin]) -> Result<Accepted<SendAuthorization>, ContractError> {
        let remaining = checked_sub_coins(&self.spend_limit, amount).ok_or_else(|| {
            ContractError::InsufficientFunds {
                budget: "send".to_string(),
            }
        })?;

        if remaining.is_empty() {
            return Ok(Accepted::Remove);
        }
        Ok(Accepted::Retain(SendAuthorization {
            spend_limit: remaining,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosmwasm_std::coins;
    use cosmwasm_std::testing::mock_env;

    fn send(amount: u128) -> Authorization {
        Authorization::Send(SendAuthorization {
            spend_limit: coins(amount, "stake"),
        })
    }

    fn send_action(amount: u128) -> Action {
        Action {
            type_url: SEND_MSG_TYPE_URL.to_string(),
            amount: coins(amount, "stake"),
        }
    }

    #[test]
    fn send_decrements_then_removes() {
        let authorization = send(100);

        assert_eq!(
            authorization.accept(&send_action(40)).unwrap(),
            Accepted::Retain(send(60))
        );
        assert_eq!(
            authorization.accept(&send_action(100)).unwrap(),
            Accepted::Remove
        );
        assert_eq!(
            authorization.accept(&send_action(101)).unwrap_err(),
            ContractError::InsufficientFunds {
                budget: "send".to_string()
            }
        );
    }

    #[test]
    fn send_rejects_other_message_types() {
        let action = Action {
            type_url: "/cosmos.gov.v1beta1.MsgVote".to_string(),
            amount: vec![],
        };
        assert_eq!(
            send(100).accept(&action).unwrap_err(),
            ContractError::TypeMismatch {
                expected: SEND_MSG_TYPE_URL.to_string(),
                got: "/cosmos.gov.v1beta1.MsgVote".to_string(),
            }
        );
    }

    #[test]
    fn send_requires_positive_limit() {
        assert!(send(1).validate().is_ok());
        assert!(send(0).validate().is_err());
        let missing = Authorization::Send(SendAuthorization {
            spend_limit: vec![],
        });
        assert!(missing.validate().is_err());
    }

    #[test]
    fn generic_is_never_exhausted() {
        let authorization = Authorization::Generic(GenericAuthorization {
            msg: "/cosmos.gov.v1beta1.MsgVote".to_string(),
        });
        let action = Action {
            type_url: "/cosmos.gov.v1beta1.MsgVote".to_string(),
            amount: coins(1_000_000, "stake"),
        };
        assert_eq!(
            authorization.accept(&action).unwrap(),
            Accepted::Retain(authorization.clone())
        );
        assert_eq!(authorization.msg_type_url(), "/cosmos.gov.v1beta1.MsgVote");
    }

    #[test]
    fn grant_expiry_is_inclusive() {
        let env = mock_env();
        let mut grant = AuthorizationGrant {
            granter: Addr::unchecked("granter"),
            grantee: Addr::unchecked("grantee"),
            authorization: send(1),
            expiration: None,
        };
        assert!(!grant.is_expired(&env.block));

        grant.expiration = Some(env.block.time);
        assert!(grant.is_expired(&env.block));

        grant.expiration = Some(env.block.time.plus_seconds(1));
        assert!(!grant.is_expired(&env.block));
    }
}
