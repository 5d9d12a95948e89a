use std::collections::{BTreeMap, BTreeSet};

use cosmwasm_std::{Coin, Uint128};

/// Subtracts `requested` from `limit` per denomination.
///
/// Returns `None` if any denomination would go negative, which includes a
/// requested denomination that `limit` does not carry. Zero entries are dropped
/// from the remainder, so an empty result means the limit is exhausted.
pub fn checked_sub_coins(limit: &[Coin], requested: &[Coin]) -> Option<Vec<Coin>> {
    let mut remaining: BTreeMap<&str, Uint128> = BTreeMap::new();
    for coin in limit {
        *remaining.entry(coin.denom.as_str()).or_default() += coin.amount;
    }

    for coin in requested.iter().filter(|coin| !coin.amount.is_zero()) {
        let left = remaining.get_mut(coin.denom.as_str())?;
        *left = left.checked_sub(coin.amount).ok()?;
    }

    Some(
        remaining
            .into_iter()
            .filter(|(_, amount)| !amount.is_zero())
            .map(|(denom, amount)| Coin::new(amount.u128(), denom))
            .collect(),
    )
}

/// True if `amount` fits inside `limit` in every denomination.
pub fn fits_within(amount: &[Coin], limit: &[Coin]) -> bool {
    checked_sub_coins(limit, amount).is_some()
}

pub fn is_all_positive(coins: &[Coin]) -> bool {
    coins.iter().all(|coin| !coin.amount.is_zero())
}

pub fn has_unique_denoms(coins: &[Coin]) -> bool {
    let mut seen = BTreeSet::new();
    coins.iter().all(|coin| seen.insert(coin.denom.as_str()))
}

pub fn denoms_subset_of(coins: &[Coin], other: &[Coin]) -> bool {
    coins
        .iter()
        .all(|coin| other.iter().any(|o| o.denom == coin.denom))
}

/// Compact rendering for response attributes, e.g. `10stake,5uatom`.
pub fn coins_to_string(coins: &[Coin]) -> String {
    coins
        .iter()
        .map(|coin| coin.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
