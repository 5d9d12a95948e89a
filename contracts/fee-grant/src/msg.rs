use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::Coin;

use crate::allowance::{Allowance, FeeAllowanceGrant};

#[cw_serde]
pub struct InstantiateMsg {
    pub default_limit: Option<u32>,
    pub max_limit: Option<u32>,
    pub max_allowed_messages: Option<u32>,
}

#[cw_serde]
pub enum ExecuteMsg {
    /// Grant a fee allowance from the sender to `grantee`
    GrantAllowance {
        grantee: String,
        allowance: Allowance,
    },
    /// Revoke the sender's fee allowance for `grantee`
    RevokeAllowance { grantee: String },
    /// Spend from `granter`'s allowance to the sender, paying for `msgs`
    UseGrantedFees {
        granter: String,
        fee: Vec<Coin>,
        msgs: Vec<String>,
    },
}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    /// Get the allowance between a granter and grantee
    #[returns(AllowanceResponse)]
    Allowance { granter: String, grantee: String },

    /// Get all allowances granted to a grantee
    #[returns(AllowancesResponse)]
    Allowances {
        grantee: String,
        start_after: Option<String>,
        limit: Option<u32>,
    },

    /// Get all allowances issued by a granter
    #[returns(AllowancesResponse)]
    AllowancesByGranter {
        granter: String,
        start_after: Option<String>,
        limit: Option<u32>,
    },

    /// Walk every allowance in store order
    #[returns(AllowancesResponse)]
    AllAllowances {
        start_after: Option<GrantKey>,
        limit: Option<u32>,
    },

    /// Dry-run a fee payment without changing state
    #[returns(SimulateUseResponse)]
    SimulateUse {
        granter: String,
        grantee: String,
        fee: Vec<Coin>,
        msgs: Vec<String>,
    },

    #[returns(ConfigResponse)]
    Config {},
}

#[cw_serde]
pub struct GrantKey {
    pub granter: String,
    pub grantee: String,
}

// Response types

#[cw_serde]
pub struct AllowanceResponse {
    pub allowance: FeeAllowanceGrant,
}

#[cw_serde]
pub struct AllowancesResponse {
    pub allowances: Vec<FeeAllowanceGrant>,
}

#[cw_serde]
pub struct SimulateUseResponse {
    pub allowed: bool,
    pub reason: String,
    /// Allowance left after the payment, `None` if it would be removed
    pub remaining: Option<Allowance>,
}

#[cw_serde]
pub struct ConfigResponse {
    pub default_limit: u32,
    pub max_limit: u32,
    pub max_allowed_messages: u32,
}
