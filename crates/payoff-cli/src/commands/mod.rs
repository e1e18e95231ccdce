pub mod amortization;
pub mod export;
pub mod projection;
pub mod strategy;

use clap::{Args, ValueEnum};
use serde::de::DeserializeOwned;

use payoff_core::strategy::ordering::PayoffStrategy;
use payoff_core::{filter_by_type, Loan, LoanType, SimulationConfig};

use crate::input;

/// Read a full input struct from `--input` or piped stdin.
pub fn load_input<T: DeserializeOwned>(
    path: Option<&str>,
) -> Result<Option<T>, Box<dyn std::error::Error>> {
    match path {
        Some(p) => Ok(Some(input::file::read_input(p)?)),
        None => input::stdin::read_stdin(),
    }
}

/// Strategy choice on the command line.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StrategyArg {
    Snowball,
    Avalanche,
}

impl From<StrategyArg> for PayoffStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Snowball => PayoffStrategy::Snowball,
            StrategyArg::Avalanche => PayoffStrategy::Avalanche,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LoanTypeArg {
    Mortgage,
    Auto,
    Student,
    CreditCard,
    Personal,
    Other,
}

impl From<LoanTypeArg> for LoanType {
    fn from(arg: LoanTypeArg) -> Self {
        match arg {
            LoanTypeArg::Mortgage => LoanType::Mortgage,
            LoanTypeArg::Auto => LoanType::Auto,
            LoanTypeArg::Student => LoanType::Student,
            LoanTypeArg::CreditCard => LoanType::CreditCard,
            LoanTypeArg::Personal => LoanType::Personal,
            LoanTypeArg::Other => LoanType::Other,
        }
    }
}

/// Flags shared by every multi-loan command.
#[derive(Args, Debug, Clone)]
pub struct PortfolioArgs {
    /// Path to a JSON/YAML file holding a list of loans
    #[arg(long)]
    pub loans: Option<String>,

    /// Only simulate loans of these types (repeatable, comma-separated)
    #[arg(long, value_enum, value_delimiter = ',')]
    pub loan_type: Vec<LoanTypeArg>,

    /// Override the period ceiling
    #[arg(long)]
    pub max_periods: Option<u32>,
}

impl PortfolioArgs {
    pub fn read_loans(&self) -> Result<Option<Vec<Loan>>, Box<dyn std::error::Error>> {
        match self.loans {
            Some(ref path) => Ok(Some(input::file::read_input(path)?)),
            None => Ok(None),
        }
    }

    pub fn filter(&self, loans: &[Loan]) -> Vec<Loan> {
        let types: Vec<LoanType> = self.loan_type.iter().map(|&t| t.into()).collect();
        filter_by_type(loans, &types)
    }

    pub fn apply_config(&self, config: &mut SimulationConfig) {
        if let Some(max) = self.max_periods {
            config.max_periods = max;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn loan(id: &str, loan_type: Option<LoanType>) -> Loan {
        Loan {
            id: id.into(),
            name: id.into(),
            principal: dec!(1000),
            annual_rate: dec!(5),
            minimum_payment: dec!(50),
            extra_payment: None,
            start_date: None,
            loan_type,
        }
    }

    #[test]
    fn test_loan_type_flag_filters() {
        let args = PortfolioArgs {
            loans: None,
            loan_type: vec![LoanTypeArg::CreditCard],
            max_periods: Some(120),
        };
        let loans = vec![
            loan("visa", Some(LoanType::CreditCard)),
            loan("car", Some(LoanType::Auto)),
            loan("misc", None),
        ];
        let kept = args.filter(&loans);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, "visa");

        let mut config = SimulationConfig::default();
        args.apply_config(&mut config);
        assert_eq!(config.max_periods, 120);
    }

    #[test]
    fn test_no_loan_type_keeps_all() {
        let args = PortfolioArgs {
            loans: None,
            loan_type: vec![],
            max_periods: None,
        };
        let loans = vec![loan("a", None), loan("b", Some(LoanType::Student))];
        assert_eq!(args.filter(&loans).len(), 2);
    }

    #[test]
    fn test_strategy_arg_maps() {
        assert_eq!(PayoffStrategy::from(StrategyArg::Snowball), PayoffStrategy::Snowball);
        assert_eq!(PayoffStrategy::from(StrategyArg::Avalanche), PayoffStrategy::Avalanche);
    }
}
