// Shared grant types and utilities for the fee-grant and authz contracts

mod coins;
mod expiration;

pub use coins::{
    checked_sub_coins, coins_to_string, denoms_subset_of, fits_within, has_unique_denoms,
    is_all_positive,
};
pub use expiration::{Duration, Expiration};

use cosmwasm_std::{StdError, StdResult};

/// Outcome of a successful grant evaluation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Accepted<T> {
    /// Keep the grant, replacing it with the updated value
    Retain(T),
    /// The grant is used up and must be deleted
    Remove,
}

impl<T> Accepted<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Accepted<U> {
        match self {
            Accepted::Retain(value) => Accepted::Retain(f(value)),
            Accepted::Remove => Accepted::Remove,
        }
    }

    pub fn is_remove(&self) -> bool {
        matches!(self, Accepted::Remove)
    }
}

/// Resolve a requested page size against the configured default and cap
pub fn clamp_limit(limit: Option<u32>, default_limit: u32, max_limit: u32) -> usize {
    limit.unwrap_or(default_limit).min(max_limit) as usize
}

/// Page-size settings must allow at least one result and keep the default under the cap
pub fn validate_limits(default_limit: u32, max_limit: u32) -> StdResult<()> {
    if default_limit == 0 || max_limit == 0 {
        return Err(StdError::generic_err("page limits must be positive"));
    }
    if default_limit > max_limit {
        return Err(StdError::generic_err(format!(
            "default_limit ({}) cannot exceed max_limit ({})",
            default_limit, max_limit
        )));
    }
    Ok(())
}
