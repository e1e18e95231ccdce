use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::schedule::{build_schedule, resolve_start_date};
use crate::config::SimulationConfig;
use crate::error::PayoffError;
use crate::types::*;
use crate::PayoffResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtraPaymentInput {
    pub loan: Loan,
    /// Hypothetical extra amount paid every month on top of the minimum.
    pub extra_payment: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub config: SimulationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtraPaymentAnalysis {
    pub loan_id: String,
    pub loan_name: String,
    pub extra_payment: Money,
    pub baseline_months: u32,
    pub accelerated_months: u32,
    pub months_saved: i64,
    pub baseline_interest: Money,
    pub accelerated_interest: Money,
    pub interest_saved: Money,
    pub total_extra_paid: Money,
    /// Interest saved less the extra cash put in.
    pub net_savings: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline_payoff_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accelerated_payoff_date: Option<NaiveDate>,
    pub baseline_status: SimulationStatus,
    pub accelerated_status: SimulationStatus,
}

/// Compare the loan's baseline schedule (no extra) against one with a
/// constant extra payment.
pub fn analyze_extra_payment(
    input: &ExtraPaymentInput,
) -> PayoffResult<ComputationOutput<ExtraPaymentAnalysis>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    input.config.validate()?;
    validate_loan(&input.loan)?;
    if input.extra_payment < Decimal::ZERO {
        return Err(PayoffError::InvalidInput {
            field: "extra_payment".into(),
            reason: "Extra payment cannot be negative".into(),
        });
    }

    let loan = &input.loan;
    let start_date = resolve_start_date(loan, input.start_date, &mut warnings);

    let baseline = build_schedule(loan, Decimal::ZERO, start_date, &input.config)?;
    let accelerated = build_schedule(loan, input.extra_payment, start_date, &input.config)?;

    if baseline.is_empty() {
        warnings.push(format!(
            "Loan '{}' has a non-positive principal or minimum payment; nothing to accelerate",
            loan.name
        ));
    }
    if baseline.status == SimulationStatus::TruncatedAtLimit {
        warnings.push(format!(
            "Baseline schedule hit the {}-period ceiling; savings are understated",
            input.config.max_periods
        ));
    }

    let interest_saved = baseline.total_interest - accelerated.total_interest;
    let analysis = ExtraPaymentAnalysis {
        loan_id: loan.id.clone(),
        loan_name: loan.name.clone(),
        extra_payment: input.extra_payment,
        baseline_months: baseline.number_of_payments,
        accelerated_months: accelerated.number_of_payments,
        months_saved: baseline.number_of_payments as i64 - accelerated.number_of_payments as i64,
        baseline_interest: baseline.total_interest,
        accelerated_interest: accelerated.total_interest,
        interest_saved,
        total_extra_paid: accelerated.total_extra_paid,
        net_savings: interest_saved - accelerated.total_extra_paid,
        baseline_payoff_date: baseline.payoff_date,
        accelerated_payoff_date: accelerated.payoff_date,
        baseline_status: baseline.status,
        accelerated_status: accelerated.status,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Extra payment analysis (baseline vs accelerated level-payment schedules)",
        &serde_json::json!({
            "loan": loan.id,
            "principal": loan.principal.to_string(),
            "annual_rate_pct": loan.annual_rate.to_string(),
            "extra_payment": input.extra_payment.to_string(),
        }),
        warnings,
        elapsed,
        analysis,
    ))
}
