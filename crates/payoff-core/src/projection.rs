use chrono::{Local, NaiveDate};
use rayon::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::amortization::schedule::build_schedule;
use crate::config::SimulationConfig;
use crate::types::*;
use crate::PayoffResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Input for a debt-free projection where every loan amortizes on its own
/// minimum and extra payment, with no shared budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndependentProjectionInput {
    pub loans: Vec<Loan>,
    /// Used for loans without a start date of their own.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub config: SimulationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanProjection {
    pub loan_id: String,
    pub loan_name: String,
    pub principal: Money,
    pub extra_payment: Money,
    pub months_to_payoff: u32,
    pub total_interest: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payoff_date: Option<NaiveDate>,
    pub status: SimulationStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndependentProjection {
    pub loans: Vec<LoanProjection>,
    pub status: SimulationStatus,
    /// Latest individual payoff date; absent if any loan failed to finish.
    pub debt_free_date: Option<NaiveDate>,
    pub total_interest: Money,
    pub total_monthly_payment: Money,
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

/// Project the debt-free date assuming each loan is paid independently.
///
/// Per-loan schedules touch only their own loan, so they run in parallel.
pub fn project_independent_payoff(
    input: &IndependentProjectionInput,
) -> PayoffResult<ComputationOutput<IndependentProjection>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    input.config.validate()?;
    for loan in &input.loans {
        validate_loan(loan)?;
    }

    let fallback = input.start_date.unwrap_or_else(|| {
        if input.loans.iter().any(|l| l.start_date.is_none()) {
            warnings.push("Loans without a start date are dated from today".into());
        }
        Local::now().date_naive()
    });

    let schedules = input
        .loans
        .par_iter()
        .map(|loan| {
            let extra = loan.extra_payment.unwrap_or(Decimal::ZERO);
            let start_date = loan.start_date.unwrap_or(fallback);
            build_schedule(loan, extra, start_date, &input.config)
        })
        .collect::<PayoffResult<Vec<_>>>()?;

    let mut projections = Vec::with_capacity(schedules.len());
    let mut status = SimulationStatus::Completed;
    let mut total_interest = Decimal::ZERO;
    let mut total_monthly_payment = Decimal::ZERO;

    for schedule in schedules {
        if schedule.is_empty() {
            warnings.push(format!(
                "Loan '{}' has a non-positive principal or minimum payment and was not projected",
                schedule.loan_name
            ));
        } else if schedule.status == SimulationStatus::TruncatedAtLimit {
            status = SimulationStatus::TruncatedAtLimit;
            warnings.push(format!(
                "Loan '{}' is not paid off within {} periods",
                schedule.loan_name, input.config.max_periods
            ));
        }
        total_interest += schedule.total_interest;
        total_monthly_payment += schedule.fixed_payment;
        projections.push(LoanProjection {
            loan_id: schedule.loan_id,
            loan_name: schedule.loan_name,
            principal: schedule.principal,
            extra_payment: schedule.extra_payment,
            months_to_payoff: schedule.number_of_payments,
            total_interest: schedule.total_interest,
            payoff_date: schedule.payoff_date,
            status: schedule.status,
        });
    }

    let debt_free_date = match status {
        SimulationStatus::Completed => projections.iter().filter_map(|p| p.payoff_date).max(),
        _ => None,
    };
    debug!(
        loans = projections.len(),
        status = ?status,
        debt_free = ?debt_free_date,
        "independent payoff projection finished"
    );

    let output = IndependentProjection {
        loans: projections,
        status,
        debt_free_date,
        total_interest,
        total_monthly_payment,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Independent payoff projection (each loan on its own minimum + extra)",
        &serde_json::json!({
            "loans": input.loans.len(),
            "start_date": fallback.to_string(),
            "max_periods": input.config.max_periods,
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn loan(id: &str, principal: Money, rate: Percent, minimum: Money, extra: Option<Money>) -> Loan {
        Loan {
            id: id.into(),
            name: id.into(),
            principal,
            annual_rate: rate,
            minimum_payment: minimum,
            extra_payment: extra,
            start_date: None,
            loan_type: None,
        }
    }

    fn input(loans: Vec<Loan>) -> IndependentProjectionInput {
        IndependentProjectionInput {
            loans,
            start_date: Some(date(2025, 1, 1)),
            config: SimulationConfig::default(),
        }
    }

    #[test]
    fn test_debt_free_is_latest_payoff() {
        let out = project_independent_payoff(&input(vec![
            loan("short", dec!(600), dec!(0), dec!(100), None),
            loan("long", dec!(1200), dec!(0), dec!(100), None),
        ]))
        .unwrap();
        let p = &out.result;

        assert_eq!(p.status, SimulationStatus::Completed);
        assert_eq!(p.loans[0].payoff_date, Some(date(2025, 7, 1)));
        assert_eq!(p.loans[1].payoff_date, Some(date(2026, 1, 1)));
        assert_eq!(p.debt_free_date, Some(date(2026, 1, 1)));
        assert_eq!(p.total_monthly_payment, dec!(200));
    }

    #[test]
    fn test_uses_each_loans_own_extra_and_start() {
        let mut with_start = loan("a", dec!(1200), dec!(0), dec!(100), Some(dec!(100)));
        with_start.start_date = Some(date(2024, 6, 1));
        let out = project_independent_payoff(&input(vec![with_start])).unwrap();
        let p = &out.result.loans[0];

        assert_eq!(p.extra_payment, dec!(100));
        assert_eq!(p.months_to_payoff, 6);
        assert_eq!(p.payoff_date, Some(date(2024, 12, 1)));
    }

    #[test]
    fn test_empty_loan_skipped_with_warning() {
        let out = project_independent_payoff(&input(vec![
            loan("paid", Decimal::ZERO, dec!(5), dec!(100), None),
            loan("live", dec!(500), dec!(0), dec!(100), None),
        ]))
        .unwrap();
        assert_eq!(out.result.loans[0].payoff_date, None);
        assert_eq!(out.result.debt_free_date, Some(date(2025, 6, 1)));
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_truncated_loan_clears_debt_free_date() {
        let mut inp = input(vec![loan("slow", dec!(100000), dec!(7), dec!(10), None)]);
        inp.config.max_periods = 24;
        let out = project_independent_payoff(&inp).unwrap();
        assert_eq!(out.result.status, SimulationStatus::TruncatedAtLimit);
        assert_eq!(out.result.debt_free_date, None);
    }

    #[test]
    fn test_no_loans() {
        let out = project_independent_payoff(&input(Vec::new())).unwrap();
        assert_eq!(out.result.status, SimulationStatus::Completed);
        assert_eq!(out.result.debt_free_date, None);
    }
}
