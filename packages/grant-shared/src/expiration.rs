use std::fmt;

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{BlockInfo, Timestamp};

const NANOS_PER_SECOND: u64 = 1_000_000_000;

/// Absolute cutoff, measured either in block height or block time.
#[cw_serde]
#[derive(Copy, Eq)]
pub enum Expiration {
    AtHeight(u64),
    AtTime(Timestamp),
}

/// Relative step used to roll a periodic budget forward.
#[cw_serde]
#[derive(Copy, Eq)]
pub enum Duration {
    /// Number of blocks
    Height(u64),
    /// Number of seconds
    Time(u64),
}

impl Expiration {
    /// True once the block has reached or passed the cutoff.
    pub fn is_expired(&self, block: &BlockInfo) -> bool {
        match self {
            Expiration::AtHeight(height) => block.height >= *height,
            Expiration::AtTime(time) => block.time >= *time,
        }
    }

    /// Moves the cutoff forward by `duration`.
    ///
    /// Returns `None` when the clocks differ or the result overflows.
    pub fn checked_add(&self, duration: &Duration) -> Option<Expiration> {
        match (self, duration) {
            (Expiration::AtHeight(height), Duration::Height(blocks)) => {
                height.checked_add(*blocks).map(Expiration::AtHeight)
            }
            (Expiration::AtTime(time), Duration::Time(seconds)) => seconds
                .checked_mul(NANOS_PER_SECOND)
                .and_then(|nanos| time.nanos().checked_add(nanos))
                .map(|nanos| Expiration::AtTime(Timestamp::from_nanos(nanos))),
            _ => None,
        }
    }

    /// Strict ordering between two cutoffs on the same clock.
    pub fn is_after(&self, other: &Expiration) -> Option<bool> {
        match (self, other) {
            (Expiration::AtHeight(a), Expiration::AtHeight(b)) => Some(a > b),
            (Expiration::AtTime(a), Expiration::AtTime(b)) => Some(a > b),
            _ => None,
        }
    }

    pub fn same_clock(&self, other: &Expiration) -> bool {
        self.is_after(other).is_some()
    }

    pub fn matches_duration(&self, duration: &Duration) -> bool {
        matches!(
            (self, duration),
            (Expiration::AtHeight(_), Duration::Height(_)) | (Expiration::AtTime(_), Duration::Time(_))
        )
    }
}

impl fmt::Display for Expiration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expiration::AtHeight(height) => write!(f, "height: {}", height),
            Expiration::AtTime(time) => write!(f, "time: {}", time),
        }
    }
}

impl Duration {
    pub fn is_zero(&self) -> bool {
        match self {
            Duration::Height(blocks) => *blocks == 0,
            Duration::Time(seconds) => *seconds == 0,
        }
    }

    /// Cutoff `self` away from the given block, on the matching clock.
    pub fn after(&self, block: &BlockInfo) -> Option<Expiration> {
        let now = match self {
            Duration::Height(_) => Expiration::AtHeight(block.height),
            Duration::Time(_) => Expiration::AtTime(block.time),
        };
        now.checked_add(self)
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Duration::Height(blocks) => write!(f, "{} blocks", blocks),
            Duration::Time(seconds) => write!(f, "{}s", seconds),
        }
    }
}
