use std::collections::BTreeSet;

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, BlockInfo, Coin, OverflowError, OverflowOperation, StdError};
use grant_shared::{
    checked_sub_coins, denoms_subset_of, fits_within, has_unique_denoms, is_all_positive,
    Accepted, Duration, Expiration,
};

use crate::error::ContractError;

/// A fee allowance, stored with its variant tag so it decodes back to the same kind.
#[cw_serde]
pub enum Allowance {
    Basic(BasicAllowance),
    Periodic(PeriodicAllowance),
    Filtered(FilteredAllowance),
}

/// Allowances a filter may wrap. Filters never nest.
#[cw_serde]
pub enum WrappedAllowance {
    Basic(BasicAllowance),
    Periodic(PeriodicAllowance),
}

#[cw_serde]
pub struct BasicAllowance {
    /// Maximum total spend, `None` for unlimited
    pub spend_limit: Option<Vec<Coin>>,
    /// Absolute cutoff, `None` to never expire
    pub expiration: Option<Expiration>,
}

/// Budget that refills to `period_spend_limit` every `period`, capped by `basic`.
#[cw_serde]
pub struct PeriodicAllowance {
    pub basic: BasicAllowance,
    pub period: Duration,
    pub period_spend_limit: Vec<Coin>,
    /// What is left to spend in the current period
    pub period_can_spend: Vec<Coin>,
    /// When the current period ends
    pub period_reset: Expiration,
}

/// Restricts the wrapped allowance to paying for the listed message types.
#[cw_serde]
pub struct FilteredAllowance {
    pub allowance: WrappedAllowance,
    pub allowed_messages: Vec<String>,
}

/// A fee allowance from `granter` to `grantee`. At most one exists per pair.
#[cw_serde]
pub struct FeeAllowanceGrant {
    pub granter: Addr,
    pub grantee: Addr,
    pub allowance: Allowance,
}

fn validate_limit(coins: &[Coin], name: &str) -> Result<(), ContractError> {
    if coins.is_empty() {
        return Err(ContractError::invalid(format!("{} cannot be empty", name)));
    }
    if !is_all_positive(coins) {
        return Err(ContractError::invalid(format!("{} must be positive", name)));
    }
    if !has_unique_denoms(coins) {
        return Err(ContractError::invalid(format!(
            "{} has duplicate denominations",
            name
        )));
    }
    Ok(())
}

impl Allowance {
    pub fn kind(&self) -> &'static str {
        match self {
            Allowance::Basic(_) => "basic",
            Allowance::Periodic(_) => "periodic",
            Allowance::Filtered(_) => "filtered",
        }
    }

    pub fn validate(&self) -> Result<(), ContractError> {
        match self {
            Allowance::Basic(basic) => basic.validate(),
            Allowance::Periodic(periodic) => periodic.validate(),
            Allowance::Filtered(filtered) => filtered.validate(),
        }
    }

    /// Evaluates a fee payment for `msgs` against this allowance.
    ///
    /// Only filtered allowances look at `msgs`.
    pub fn accept(
        &self,
        fee: &[Coin],
        msgs: &[String],
        block: &BlockInfo,
    ) -> Result<Accepted<Allowance>, ContractError> {
        match self {
            Allowance::Basic(basic) => Ok(basic.accept(fee, block)?.map(Allowance::Basic)),
            Allowance::Periodic(periodic) => {
                Ok(periodic.accept(fee, block)?.map(Allowance::Periodic))
            }
            Allowance::Filtered(filtered) => {
                Ok(filtered.accept(fee, msgs, block)?.map(Allowance::Filtered))
            }
        }
    }
}

impl WrappedAllowance {
    pub fn validate(&self) -> Result<(), ContractError> {
        match self {
            WrappedAllowance::Basic(basic) => basic.validate(),
            WrappedAllowance::Periodic(periodic) => periodic.validate(),
        }
    }

    pub fn accept(
        &self,
        fee: &[Coin],
        block: &BlockInfo,
    ) -> Result<Accepted<WrappedAllowance>, ContractError> {
        match self {
            WrappedAllowance::Basic(basic) => {
                Ok(basic.accept(fee, block)?.map(WrappedAllowance::Basic))
            }
            WrappedAllowance::Periodic(periodic) => {
                Ok(periodic.accept(fee, block)?.map(WrappedAllowance::Periodic))
            }
        }
    }
}

impl BasicAllowance {
    pub fn validate(&self) -> Result<(), ContractError> {
        match &self.spend_limit {
            Some(limit) => validate_limit(limit, "spend limit"),
            None => Ok(()),
        }
    }

    fn check_expiry(&self, block: &BlockInfo) -> Result<(), ContractError> {
        match self.expiration {
            Some(expiration) if expiration.is_expired(block) => Err(ContractError::Expired {}),
            _ => Ok(()),
        }
    }

    pub fn accept(
        &self,
        fee: &[Coin],
        block: &BlockInfo,
    ) -> Result<Accepted<BasicAllowance>, ContractError> {
        self.check_expiry(block)?;

        let Some(limit) = &self.spend_limit else {
            return Ok(Accepted::Retain(self.clone()));
        };

        let remaining =
            checked_sub_coins(limit, fee).ok_or_else(|| ContractError::InsufficientFunds {
                budget: "basic".to_string(),
            })?;
        if remaining.is_empty() {
            return Ok(Accepted::Remove);
        }

        Ok(Accepted::Retain(BasicAllowance {
            spend_limit: Some(remaining),
            expiration: self.expiration,
        }))
    }
}

impl PeriodicAllowance {
    pub fn validate(&self) -> Result<(), ContractError> {
        self.basic.validate()?;
        validate_limit(&self.period_spend_limit, "period spend limit")?;

        if !has_unique_denoms(&self.period_can_spend) {
            return Err(ContractError::invalid(
                "period can spend has duplicate denominations",
            ));
        }
        if !fits_within(&self.period_can_spend, &self.period_spend_limit) {
            return Err(ContractError::invalid(
                "period can spend exceeds the period spend limit",
            ));
        }
        if let Some(limit) = &self.basic.spend_limit {
            if !denoms_subset_of(&self.period_spend_limit, limit) {
                return Err(ContractError::invalid(
                    "period spend limit has different currency than basic spend limit",
                ));
            }
        }

        if self.period.is_zero() {
            return Err(ContractError::invalid("period must be positive"));
        }
        if !self.period_reset.matches_duration(&self.period) {
            return Err(ContractError::invalid(
                "period and period reset must use the same clock",
            ));
        }
        if self.period_reset.checked_add(&self.period).is_none() {
            return Err(ContractError::invalid("period reset overflows"));
        }
        if let Some(expiration) = &self.basic.expiration {
            match self.period_reset.is_after(expiration) {
                Some(false) => {}
                Some(true) => {
                    return Err(ContractError::invalid(format!(
                        "period reset ({}) cannot be after expiration ({})",
                        self.period_reset, expiration
                    )))
                }
                None => {
                    return Err(ContractError::invalid(
                        "period reset and expiration must use the same clock",
                    ))
                }
            }
        }
        Ok(())
    }

    pub fn accept(
        &self,
        fee: &[Coin],
        block: &BlockInfo,
    ) -> Result<Accepted<PeriodicAllowance>, ContractError> {
        self.basic.check_expiry(block)?;

        // Rolls over by exactly one period, however many have elapsed.
        let (period_can_spend, period_reset) = if self.period_reset.is_expired(block) {
            let next_reset = self.period_reset.checked_add(&self.period).ok_or_else(|| {
                StdError::overflow(OverflowError::new(
                    OverflowOperation::Add,
                    &self.period_reset,
                    &self.period,
                ))
            })?;
            (self.period_spend_limit.clone(), next_reset)
        } else {
            (self.period_can_spend.clone(), self.period_reset)
        };

        let period_can_spend = checked_sub_coins(&period_can_spend, fee).ok_or_else(|| {
            ContractError::InsufficientFunds {
                budget: "period".to_string(),
            }
        })?;
        let spend_limit = match &self.basic.spend_limit {
            Some(limit) => Some(checked_sub_coins(limit, fee).ok_or_else(|| {
                ContractError::InsufficientFunds {
                    budget: "basic".to_string(),
                }
            })?),
            None => None,
        };

        if spend_limit.as_ref().map_or(false, |limit| limit.is_empty()) {
            return Ok(Accepted::Remove);
        }

        Ok(Accepted::Retain(PeriodicAllowance {
            basic: BasicAllowance {
                spend_limit,
                expiration: self.basic.expiration,
            },
            period: self.period,
            period_spend_limit: self.period_spend_limit.clone(),
            period_can_spend,
            period_reset,
        }))
    }
}

impl FilteredAllowance {
    pub fn validate(&self) -> Result<(), ContractError> {
        if self.allowed_messages.is_empty() {
            return Err(ContractError::invalid("allowed messages cannot be empty"));
        }
        if self.allowed_messages.iter().any(|msg| msg.is_empty()) {
            return Err(ContractError::invalid("allowed message type cannot be blank"));
        }
        let unique: BTreeSet<&str> = self.allowed_messages.iter().map(String::as_str).collect();
        if unique.len() != self.allowed_messages.len() {
            return Err(ContractError::invalid("allowed messages contain duplicates"));
        }
        self.allowance.validate()
    }

    /// Every message must be allowed before any spend is considered.
    pub fn accept(
        &self,
        fee: &[Coin],
        msgs: &[String],
        block: &BlockInfo,
    ) -> Result<Accepted<FilteredAllowance>, ContractError> {
        if let Some(msg) = msgs.iter().find(|msg| !self.allowed_messages.contains(msg)) {
            return Err(ContractError::Unauthorized {
                msg_type: msg.clone(),
            });
        }

        Ok(self
            .allowance
            .accept(fee, block)?
            .map(|allowance| FilteredAllowance {
                allowance,
                allowed_messages: self.allowed_messages.clone(),
            }))
    }
}
