use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, BlockInfo, Coin, Order, StdResult, Storage};
use cw_storage_plus::{Bound, Item, Map};
use grant_shared::Accepted;

use crate::allowance::{Allowance, FeeAllowanceGrant};
use crate::error::ContractError;

#[cw_serde]
pub struct Config {
    /// Page size when a query gives no limit
    pub default_limit: u32,
    /// Largest page a query may request
    pub max_limit: u32,
    /// Largest allowed-messages list a filtered allowance may carry
    pub max_allowed_messages: u32,
}

/// Configuration storage
pub const CONFIG: Item<Config> = Item::new("config");

/// Fee allowances indexed by (granter, grantee)
pub const ALLOWANCES: Map<(&Addr, &Addr), FeeAllowanceGrant> = Map::new("fee_allowances");

/// Reverse index (grantee, granter) for grantee queries
pub const GRANTEE_ALLOWANCES: Map<(&Addr, &Addr), ()> = Map::new("grantee_allowances");

/// Stores a new grant. Never overwrites, even an expired one.
pub fn grant_allowance(
    storage: &mut dyn Storage,
    grant: &FeeAllowanceGrant,
) -> Result<(), ContractError> {
    let key = (&grant.granter, &grant.grantee);
    if ALLOWANCES.has(storage, key) {
        return Err(ContractError::GrantExists {});
    }

    ALLOWANCES.save(storage, key, grant)?;
    GRANTEE_ALLOWANCES.save(storage, (&grant.grantee, &grant.granter), &())?;
    Ok(())
}

pub fn revoke_allowance(
    storage: &mut dyn Storage,
    granter: &Addr,
    grantee: &Addr,
) -> Result<(), ContractError> {
    if !ALLOWANCES.has(storage, (granter, grantee)) {
        return Err(ContractError::NoGrant {});
    }

    ALLOWANCES.remove(storage, (granter, grantee));
    GRANTEE_ALLOWANCES.remove(storage, (grantee, granter));
    Ok(())
}

/// Plain read, no expiry pruning.
pub fn load_allowance(
    storage: &dyn Storage,
    granter: &Addr,
    grantee: &Addr,
) -> StdResult<Option<FeeAllowanceGrant>> {
    ALLOWANCES.may_load(storage, (granter, grantee))
}

/// Loads, evaluates and writes back a grant in one step.
///
/// A used-up grant is deleted. An expired grant is deleted and `Expired` is
/// returned. Any other failure leaves the stored grant untouched.
pub fn use_granted_fees(
    storage: &mut dyn Storage,
    block: &BlockInfo,
    granter: &Addr,
    grantee: &Addr,
    fee: &[Coin],
    msgs: &[String],
) -> Result<Accepted<Allowance>, ContractError> {
    let grant = load_allowance(storage, granter, grantee)?.ok_or(ContractError::NoGrant {})?;

    match grant.allowance.accept(fee, msgs, block) {
        Ok(Accepted::Remove) => {
            revoke_allowance(storage, granter, grantee)?;
            Ok(Accepted::Remove)
        }
        Ok(Accepted::Retain(allowance)) => {
            let updated = FeeAllowanceGrant {
                allowance: allowance.clone(),
                ..grant
            };
            ALLOWANCES.save(storage, (granter, grantee), &updated)?;
            Ok(Accepted::Retain(allowance))
        }
        Err(ContractError::Expired {}) => {
            revoke_allowance(storage, granter, grantee)?;
            Err(ContractError::Expired {})
        }
        Err(err) => Err(err),
    }
}

/// Every stored grant in (granter, grantee) key order.
///
/// The granter is length-prefixed in the key, so shorter granter addresses
/// come first; grantees under one granter sort bytewise.
///
/// Each call starts a fresh pass. Collect first if the caller needs to mutate
/// the store while walking it.
pub fn all_allowances<'a>(
    storage: &'a dyn Storage,
    start_after: Option<(&'a Addr, &'a Addr)>,
) -> impl Iterator<Item = StdResult<FeeAllowanceGrant>> + 'a {
    ALLOWANCES
        .range(
            storage,
            start_after.map(Bound::exclusive),
            None,
            Order::Ascending,
        )
        .map(|item| item.map(|(_, grant)| grant))
}

pub fn allowances_by_granter<'a>(
    storage: &'a dyn Storage,
    granter: &'a Addr,
    start_after: Option<&'a Addr>,
) -> impl Iterator<Item = StdResult<FeeAllowanceGrant>> + 'a {
    ALLOWANCES
        .prefix(granter)
        .range(
            storage,
            start_after.map(Bound::exclusive),
            None,
            Order::Ascending,
        )
        .map(|item| item.map(|(_, grant)| grant))
}

pub fn allowances_by_grantee<'a>(
    storage: &'a dyn Storage,
    grantee: &'a Addr,
    start_after: Option<&'a Addr>,
) -> impl Iterator<Item = StdResult<FeeAllowanceGrant>> + 'a {
    GRANTEE_ALLOWANCES
        .prefix(grantee)
        .keys(
            storage,
            start_after.map(Bound::exclusive),
            None,
            Order::Ascending,
        )
        .map(move |granter| {
            let granter = granter?;
            ALLOWANCES.load(storage, (&granter, grantee))
        })
}
