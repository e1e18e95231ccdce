use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::PayoffError;
use crate::types::{Loan, Money, Percent, Rate};

/// Working copy of one loan for the duration of a single simulation run.
///
/// Built by cloning from the caller's [`Loan`]; nothing here points back at
/// the input, so concurrent runs over the same loans cannot interfere.
#[derive(Debug, Clone)]
pub struct LoanSimulationState {
    pub loan_id: String,
    pub loan_name: String,
    pub original_principal: Money,
    pub annual_rate: Percent,
    pub monthly_rate: Rate,
    pub balance: Money,
    pub minimum_payment: Money,
    pub interest_paid: Money,
    pub input_index: usize,
}

impl LoanSimulationState {
    pub fn new(input_index: usize, loan: &Loan) -> Self {
        LoanSimulationState {
            loan_id: loan.id.clone(),
            loan_name: loan.name.clone(),
            original_principal: loan.principal,
            annual_rate: loan.annual_rate,
            monthly_rate: loan.monthly_rate(),
            balance: loan.principal,
            minimum_payment: loan.minimum_payment,
            interest_paid: Decimal::ZERO,
            input_index,
        }
    }
}

/// Heuristic deciding which outstanding loan receives the pooled extra.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoffStrategy {
    /// Smallest balance first.
    Snowball,
    /// Highest interest rate first.
    Avalanche,
}

impl PayoffStrategy {
    pub const ALL: [PayoffStrategy; 2] = [PayoffStrategy::Snowball, PayoffStrategy::Avalanche];

    pub fn name(&self) -> &'static str {
        match self {
            PayoffStrategy::Snowball => "Debt Snowball",
            PayoffStrategy::Avalanche => "Debt Avalanche",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            PayoffStrategy::Snowball => {
                "Pay minimums on every loan and direct all extra cash at the smallest balance first"
            }
            PayoffStrategy::Avalanche => {
                "Pay minimums on every loan and direct all extra cash at the highest interest rate first"
            }
        }
    }

    /// Priority comparator: `Less` means `a` is paid down before `b`.
    ///
    /// Ties fall through to the other dimension, then to input order, so the
    /// ordering is total and runs are reproducible.
    pub fn compare(&self, a: &LoanSimulationState, b: &LoanSimulationState) -> Ordering {
        let primary = match self {
            PayoffStrategy::Snowball => a
                .balance
                .cmp(&b.balance)
                .then_with(|| b.annual_rate.cmp(&a.annual_rate)),
            PayoffStrategy::Avalanche => b
                .annual_rate
                .cmp(&a.annual_rate)
                .then_with(|| a.balance.cmp(&b.balance)),
        };
        primary.then_with(|| a.input_index.cmp(&b.input_index))
    }

    /// Sort outstanding loans into priority order, focus loan first.
    pub fn order(&self, states: &mut [LoanSimulationState]) {
        states.sort_by(|a, b| self.compare(a, b));
    }
}

impl fmt::Display for PayoffStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayoffStrategy::Snowball => write!(f, "snowball"),
            PayoffStrategy::Avalanche => write!(f, "avalanche"),
        }
    }
}

impl FromStr for PayoffStrategy {
    type Err = PayoffError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "snowball" => Ok(PayoffStrategy::Snowball),
            "avalanche" => Ok(PayoffStrategy::Avalanche),
            other => Err(PayoffError::InvalidInput {
                field: "strategy".into(),
                reason: format!("Unknown payoff strategy '{other}' (expected snowball or avalanche)"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn state(idx: usize, balance: Money, rate: Percent) -> LoanSimulationState {
        let loan = Loan {
            id: format!("loan-{idx}"),
            name: format!("Loan {idx}"),
            principal: balance,
            annual_rate: rate,
            minimum_payment: dec!(50),
            extra_payment: None,
            start_date: None,
            loan_type: None,
        };
        LoanSimulationState::new(idx, &loan)
    }

    fn ids(states: &[LoanSimulationState]) -> Vec<usize> {
        states.iter().map(|s| s.input_index).collect()
    }

    #[test]
    fn test_snowball_orders_by_balance() {
        let mut states = vec![
            state(0, dec!(5000), dec!(4)),
            state(1, dec!(800), dec!(22)),
            state(2, dec!(2500), dec!(9)),
        ];
        PayoffStrategy::Snowball.order(&mut states);
        assert_eq!(ids(&states), vec![1, 2, 0]);
    }

    #[test]
    fn test_avalanche_orders_by_rate() {
        let mut states = vec![
            state(0, dec!(5000), dec!(4)),
            state(1, dec!(800), dec!(22)),
            state(2, dec!(2500), dec!(9)),
        ];
        PayoffStrategy::Avalanche.order(&mut states);
        assert_eq!(ids(&states), vec![1, 2, 0]);

        let mut states = vec![state(0, dec!(100), dec!(3)), state(1, dec!(9000), dec!(18))];
        PayoffStrategy::Avalanche.order(&mut states);
        assert_eq!(ids(&states), vec![1, 0]);
    }

    #[test]
    fn test_ties_are_deterministic() {
        let mut states = vec![
            state(0, dec!(1000), dec!(5)),
            state(1, dec!(1000), dec!(7)),
            state(2, dec!(1000), dec!(7)),
        ];
        PayoffStrategy::Snowball.order(&mut states);
        assert_eq!(ids(&states), vec![1, 2, 0]);

        let mut states = vec![
            state(0, dec!(3000), dec!(7)),
            state(1, dec!(1000), dec!(7)),
            state(2, dec!(1000), dec!(7)),
        ];
        PayoffStrategy::Avalanche.order(&mut states);
        assert_eq!(ids(&states), vec![1, 2, 0]);
    }

    #[test]
    fn test_parse_strategy() {
        assert_eq!("Snowball".parse::<PayoffStrategy>().unwrap(), PayoffStrategy::Snowball);
        assert_eq!(" avalanche ".parse::<PayoffStrategy>().unwrap(), PayoffStrategy::Avalanche);
        assert!("cheapest".parse::<PayoffStrategy>().is_err());
        assert_eq!(PayoffStrategy::Avalanche.to_string(), "avalanche");
    }
}
