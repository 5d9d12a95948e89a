use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, BlockInfo, Order, StdResult, Storage};
use cw_storage_plus::{Bound, Item, Map};
use grant_shared::Accepted;

use crate::authorization::{Action, Authorization, AuthorizationGrant};
use crate::error::ContractError;

#[cw_serde]
pub struct Config {
    /// Page size when a query gives no limit
    pub default_limit: u32,
    /// Largest page a query may request
    pub max_limit: u32,
}

/// Configuration storage
pub const CONFIG: Item<Config> = Item::new("config");

/// Authorizations indexed by (granter, grantee, msg type url)
pub const GRANTS: Map<(&Addr, &Addr, &str), AuthorizationGrant> = Map::new("authz_grants");

pub fn save_grant(storage: &mut dyn Storage, grant: &AuthorizationGrant) -> Result<(), ContractError> {
    let key = (
        &grant.granter,
        &grant.grantee,
        grant.authorization.msg_type_url(),
    );
    if GRANTS.has(storage, key) {
        return Err(ContractError::GrantExists {});
    }

    GRANTS.save(storage, key, grant)?;
    Ok(())
}

pub fn delete_grant(
    storage: &mut dyn Storage,
    granter: &Addr,
    grantee: &Addr,
    msg_type_url: &str,
) -> Result<(), ContractError> {
    let key = (granter, grantee, msg_type_url);
    if !GRANTS.has(storage, key) {
        return Err(ContractError::NoGrant {});
    }

    GRANTS.remove(storage, key);
    Ok(())
}

pub fn load_grant(
    storage: &dyn Storage,
    granter: &Addr,
    grantee: &Addr,
    msg_type_url: &str,
) -> StdResult<Option<AuthorizationGrant>> {
    GRANTS.may_load(storage, (granter, grantee, msg_type_url))
}

/// Runs `action` against the matching grant and persists the result.
///
/// Exhausted and expired grants are deleted; an expired grant still fails
/// with `Expired`. Other failures leave the grant as stored.
pub fn exec_grant(
    storage: &mut dyn Storage,
    block: &BlockInfo,
    granter: &Addr,
    grantee: &Addr,
    action: &Action,
) -> Result<Accepted<Authorization>, ContractError> {
    let msg_type_url = action.type_url.as_str();
    let grant = load_grant(storage, granter, grantee, msg_type_url)?
        .ok_or(ContractError::NoGrant {})?;

    if grant.is_expired(block) {
        delete_grant(storage, granter, grantee, msg_type_url)?;
        return Err(ContractError::Expired {});
    }

    match grant.authorization.accept(action)? {
        Accepted::Remove => {
            delete_grant(storage, granter, grantee, msg_type_url)?;
            Ok(Accepted::Remove)
        }
        Accepted::Retain(authorization) => {
            let updated = AuthorizationGrant {
                authorization: authorization.clone(),
                ..grant
            };
            GRANTS.save(storage, (granter, grantee, msg_type_url), &updated)?;
            Ok(Accepted::Retain(authorization))
        }
    }
}

/// Grants between one granter and grantee, ordered by message type.
pub fn grants_between<'a>(
    storage: &'a dyn Storage,
    granter: &'a Addr,
    grantee: &'a Addr,
    start_after: Option<&'a str>,
) -> impl Iterator<Item = StdResult<AuthorizationGrant>> + 'a {
    GRANTS
        .prefix((granter, grantee))
        .range(
            storage,
            start_after.map(Bound::exclusive),
            None,
            Order::Ascending,
        )
        .map(|item| item.map(|(_, grant)| grant))
}

/// Every grant issued by `granter`, resuming after a (grantee, msg type url) cursor.
///
/// Results come in store key order. The grantee is length-prefixed in the
/// key, so shorter grantee addresses sort first.
pub fn grants_by_granter<'a>(
    storage: &'a dyn Storage,
    granter: &'a Addr,
    start_after: Option<(&'a Addr, &'a str)>,
) -> impl Iterator<Item = StdResult<AuthorizationGrant>> + 'a {
    GRANTS
        .sub_prefix(granter)
        .range(
            storage,
            start_after.map(Bound::exclusive),
            None,
            Order::Ascending,
        )
        .map(|item| item.map(|(_, grant)| grant))
}
