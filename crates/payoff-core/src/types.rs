use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::PayoffError;
use crate::PayoffResult;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Periodic rates expressed as decimals (0.005 = 0.5% per month).
pub type Rate = Decimal;

/// Annual interest rates as quoted on a loan statement (5.5 = 5.5% APR).
pub type Percent = Decimal;

/// Loan category. Only used by callers to pick which loans to simulate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanType {
    Mortgage,
    Auto,
    Student,
    CreditCard,
    Personal,
    Other,
}

/// A loan as supplied by the caller. The engine never mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Loan {
    pub id: String,
    pub name: String,
    pub principal: Money,
    pub annual_rate: Percent,
    pub minimum_payment: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_payment: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loan_type: Option<LoanType>,
}

impl Loan {
    pub fn monthly_rate(&self) -> Rate {
        monthly_rate(self.annual_rate)
    }
}

/// How a simulation run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationStatus {
    /// Every loan reached a zero balance.
    Completed,
    /// The period ceiling was hit with balances still outstanding.
    TruncatedAtLimit,
    /// The pooled budget does not cover the sum of minimum payments.
    InfeasibleBudget,
}

impl SimulationStatus {
    pub fn is_completed(&self) -> bool {
        matches!(self, SimulationStatus::Completed)
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

/// Convert an annual percentage rate into a monthly decimal rate: r / 100 / 12.
pub fn monthly_rate(annual_rate: Percent) -> Rate {
    annual_rate / dec!(100) / dec!(12)
}

/// Date of the `period`-th monthly payment after `start`. Day-of-month is
/// clamped to the end of shorter months (Jan 31 + 1 month = Feb 28/29).
pub fn payment_date(start: NaiveDate, period: u32) -> PayoffResult<NaiveDate> {
    start
        .checked_add_months(Months::new(period))
        .ok_or_else(|| PayoffError::DateError(format!("{start} + {period} months is out of range")))
}

/// Keep only loans of the requested categories. An empty filter keeps
/// everything; loans without a category only survive an empty filter.
pub fn filter_by_type(loans: &[Loan], types: &[LoanType]) -> Vec<Loan> {
    if types.is_empty() {
        return loans.to_vec();
    }
    loans
        .iter()
        .filter(|l| l.loan_type.is_some_and(|t| types.contains(&t)))
        .cloned()
        .collect()
}

/// Shared validation for loan inputs that would make a schedule meaningless.
/// A non-positive minimum is not rejected here: schedules come back empty.
pub(crate) fn validate_loan(loan: &Loan) -> PayoffResult<()> {
    if loan.annual_rate < Decimal::ZERO {
        return Err(PayoffError::InvalidInput {
            field: "annual_rate".into(),
            reason: format!("Loan '{}' has a negative interest rate", loan.name),
        });
    }
    if loan.extra_payment.is_some_and(|e| e < Decimal::ZERO) {
        return Err(PayoffError::InvalidInput {
            field: "extra_payment".into(),
            reason: format!("Loan '{}' has a negative extra payment", loan.name),
        });
    }
    Ok(())
}
