use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::PayoffError;
use crate::types::Money;
use crate::PayoffResult;

/// Default ceiling on simulated periods: 50 years of monthly payments.
pub const DEFAULT_MAX_PERIODS: u32 = 600;

/// Balances at or below this are treated as fully retired.
pub const DEFAULT_EPSILON: Money = dec!(0.01);

/// How interest is charged on the focus loan in the pooled summary planner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterestAccrual {
    /// One interest charge per loan per month on the beginning balance.
    #[default]
    SinglePerPeriod,
    /// The focus loan is charged again on its post-minimum balance before
    /// the extra payment lands. Kept for parity with legacy summary figures.
    DoubleOnTarget,
}

/// Knobs shared by every simulation. All fields have defaults, so inputs can
/// omit the block entirely.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub max_periods: u32,
    pub epsilon: Money,
    /// Decimal places interest charges are rounded to.
    pub currency_scale: u32,
    pub interest_accrual: InterestAccrual,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            max_periods: DEFAULT_MAX_PERIODS,
            epsilon: DEFAULT_EPSILON,
            currency_scale: 2,
            interest_accrual: InterestAccrual::SinglePerPeriod,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> PayoffResult<()> {
        if self.max_periods == 0 {
            return Err(PayoffError::InvalidInput {
                field: "max_periods".into(),
                reason: "At least one period must be simulated".into(),
            });
        }
        if self.epsilon < Decimal::ZERO {
            return Err(PayoffError::InvalidInput {
                field: "epsilon".into(),
                reason: "Payoff tolerance cannot be negative".into(),
            });
        }
        if self.currency_scale > 10 {
            return Err(PayoffError::InvalidInput {
                field: "currency_scale".into(),
                reason: "Currency scale above 10 decimal places is not supported".into(),
            });
        }
        Ok(())
    }

    /// Round a currency amount (midpoint away from zero, as statements do).
    pub fn round(&self, amount: Money) -> Money {
        amount.round_dp_with_strategy(self.currency_scale, RoundingStrategy::MidpointAwayFromZero)
    }

    pub fn is_retired(&self, balance: Money) -> bool {
        balance <= self.epsilon
    }
}
