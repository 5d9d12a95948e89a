use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::Timestamp;

use crate::authorization::{Action, Authorization, AuthorizationGrant};

#[cw_serde]
pub struct InstantiateMsg {
    pub default_limit: Option<u32>,
    pub max_limit: Option<u32>,
}

#[cw_serde]
pub enum ExecuteMsg {
    /// Authorize `grantee` to act for the sender
    Grant {
        grantee: String,
        authorization: Authorization,
        expiration: Option<Timestamp>,
    },
    /// Drop the sender's grant to `grantee` for one message type
    Revoke {
        grantee: String,
        msg_type_url: String,
    },
    /// Perform `action` on behalf of `granter`
    Exec { granter: String, action: Action },
}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(GrantResponse)]
    Grant {
        granter: String,
        grantee: String,
        msg_type_url: String,
    },

    /// List grants between a granter and grantee, ordered by message type
    #[returns(GrantsResponse)]
    Grants {
        granter: String,
        grantee: String,
        start_after: Option<String>,
        limit: Option<u32>,
    },

    /// List every grant issued by a granter
    #[returns(GrantsResponse)]
    GranterGrants {
        granter: String,
        start_after: Option<GrantCursor>,
        limit: Option<u32>,
    },

    #[returns(ConfigResponse)]
    Config {},
}

/// Position of the last grant seen by a granter listing
#[cw_serde]
pub struct GrantCursor {
    pub grantee: String,
    pub msg_type_url: String,
}

// Response types

#[cw_serde]
pub struct GrantResponse {
    pub grant: AuthorizationGrant,
}

#[cw_serde]
pub struct GrantsResponse {
    pub grants: Vec<AuthorizationGrant>,
}

#[cw_serde]
pub struct ConfigResponse {
    pub default_limit: u32,
    pub max_limit: u32,
}
