//! Replace-by-fee policy.
//!
//! Lotus only accepts a replacement whose tip and fee cap are both at least
//! 110% of the pending message's. Bumps default to 125% to leave headroom.

use std::fmt;

use glif_primitives::U256;

use crate::domain::TxError;

/// Minimum replacement ratio accepted by the mempool.
pub const REPLACE_BY_FEE_MIN: u64 = 110;

/// Default replacement ratio.
pub const REPLACE_BY_FEE_DEFAULT: u64 = 125;

/// Whole percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Percent(pub u64);

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// `cur * ratio / 100`.
pub fn compute_rbf(cur: U256, ratio: Percent) -> U256 {
    cur.saturating_mul(U256::from(ratio.0)) / U256::from(100u64)
}

/// Smallest value the mempool accepts as a replacement for `cur`.
pub fn compute_min_rbf(cur: U256) -> U256 {
    compute_rbf(cur, Percent(REPLACE_BY_FEE_MIN)).saturating_add(U256::one())
}

/// EIP-1559 fee pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GasFees {
    pub max_priority_fee_per_gas: U256,
    pub max_fee_per_gas: U256,
}

/// Fees before and after a replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeBump {
    pub old: GasFees,
    pub new: GasFees,
}

/// How aggressively replacements raise fees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RbfPolicy {
    ratio: Percent,
    max_fee_per_gas_limit: Option<U256>,
}

impl Default for RbfPolicy {
    fn default() -> Self {
        Self {
            ratio: Percent(REPLACE_BY_FEE_DEFAULT),
            max_fee_per_gas_limit: None,
        }
    }
}

impl RbfPolicy {
    /// Policy bumping by `ratio`, which must be at least [`REPLACE_BY_FEE_MIN`].
    pub fn new(ratio: Percent) -> Result<Self, TxError> {
        if ratio.0 < REPLACE_BY_FEE_MIN {
            return Err(TxError::InvalidRbfRatio {
                ratio: ratio.0,
                min: REPLACE_BY_FEE_MIN,
            });
        }
        Ok(Self {
            ratio,
            ..Self::default()
        })
    }

    /// Refuse any replacement whose fee cap would exceed `limit`.
    pub fn with_fee_limit(mut self, limit: U256) -> Self {
        self.max_fee_per_gas_limit = Some(limit);
        self
    }

    pub fn ratio(&self) -> Percent {
        self.ratio
    }

    pub fn fee_limit(&self) -> Option<U256> {
        self.max_fee_per_gas_limit
    }

    /// Replacement fees for `old` given the network's current tip and base fee.
    pub fn bump(&self, old: GasFees, network_tip: U256, base_fee: U256) -> Result<FeeBump, TxError> {
        let new = self.suggest(old, network_tip, base_fee);
        self.check_limit(&new)?;
        Ok(FeeBump { old, new })
    }

    /// Bumped fees without the limit check.
    ///
    /// Both fields come out strictly greater than in `old`, and the cap
    /// covers two base fees plus the tip.
    pub fn suggest(&self, old: GasFees, network_tip: U256, base_fee: U256) -> GasFees {
        let tip = compute_rbf(old.max_priority_fee_per_gas, self.ratio)
            .max(compute_min_rbf(old.max_priority_fee_per_gas))
            .max(network_tip);

        let cap = compute_rbf(old.max_fee_per_gas, self.ratio)
            .max(compute_min_rbf(old.max_fee_per_gas))
            .max(fee_cap_for(base_fee, tip));

        GasFees {
            max_priority_fee_per_gas: tip,
            max_fee_per_gas: cap,
        }
    }

    /// Fail unless `new` would be accepted as a replacement for `old`.
    pub fn check_replacement(&self, old: &GasFees, new: &GasFees) -> Result<(), TxError> {
        check_field(
            "max priority fee per gas",
            old.max_priority_fee_per_gas,
            new.max_priority_fee_per_gas,
        )?;
        check_field("max fee per gas", old.max_fee_per_gas, new.max_fee_per_gas)?;
        if new.max_fee_per_gas < new.max_priority_fee_per_gas {
            return Err(TxError::InvalidFees {
                max_fee_per_gas: new.max_fee_per_gas,
                max_priority_fee_per_gas: new.max_priority_fee_per_gas,
            });
        }
        self.check_limit(new)
    }

    fn check_limit(&self, fees: &GasFees) -> Result<(), TxError> {
        match self.max_fee_per_gas_limit {
            Some(limit) if fees.max_fee_per_gas > limit => Err(TxError::FeeLimitExceeded {
                max_fee_per_gas: fees.max_fee_per_gas,
                limit,
            }),
            _ => Ok(()),
        }
    }
}

/// Default fee cap: `2 * base_fee + tip`.
pub fn fee_cap_for(base_fee: U256, tip: U256) -> U256 {
    base_fee.saturating_mul(U256::from(2u64)).saturating_add(tip)
}

fn check_field(field: &'static str, old: U256, new: U256) -> Result<(), TxError> {
    if new < compute_min_rbf(old) {
        return Err(TxError::InsufficientFeeBump {
            field,
            old,
            new,
            min_bump_percent: REPLACE_BY_FEE_MIN - 100,
        });
    }
    Ok(())
}
