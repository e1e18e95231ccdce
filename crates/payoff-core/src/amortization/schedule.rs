use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

use crate::config::SimulationConfig;
use crate::types::*;
use crate::PayoffResult;

/// Input for a single-loan amortization schedule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationInput {
    pub loan: Loan,
    /// Overrides the loan's own extra payment when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_payment: Option<Money>,
    /// Used when the loan carries no start date of its own.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub config: SimulationConfig,
}

/// One payment in the schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationScheduleEntry {
    pub payment_number: u32,
    pub date: NaiveDate,
    pub beginning_balance: Money,
    pub payment: Money,
    pub interest: Money,
    /// Total principal reduction, extra payment included.
    pub principal: Money,
    /// Share of `principal` that came from the extra payment.
    pub extra_payment: Money,
    pub ending_balance: Money,
    pub cumulative_interest: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    pub loan_id: String,
    pub loan_name: String,
    pub principal: Money,
    pub fixed_payment: Money,
    pub extra_payment: Money,
    pub entries: Vec<AmortizationScheduleEntry>,
    pub number_of_payments: u32,
    pub total_interest: Money,
    pub total_principal: Money,
    pub total_extra_paid: Money,
    pub total_paid: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payoff_date: Option<NaiveDate>,
    pub status: SimulationStatus,
}

impl AmortizationSchedule {
    fn empty(loan: &Loan, extra: Money) -> Self {
        AmortizationSchedule {
            loan_id: loan.id.clone(),
            loan_name: loan.name.clone(),
            principal: loan.principal,
            fixed_payment: Decimal::ZERO,
            extra_payment: extra,
            entries: Vec::new(),
            number_of_payments: 0,
            total_interest: Decimal::ZERO,
            total_principal: Decimal::ZERO,
            total_extra_paid: Decimal::ZERO,
            total_paid: Decimal::ZERO,
            payoff_date: None,
            status: SimulationStatus::Completed,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Pick the loan's own start date, then the caller's, then today.
pub(crate) fn resolve_start_date(
    loan: &Loan,
    fallback: Option<NaiveDate>,
    warnings: &mut Vec<String>,
) -> NaiveDate {
    loan.start_date.or(fallback).unwrap_or_else(|| {
        warnings.push(format!(
            "Loan '{}' has no start date; schedule dated from today",
            loan.name
        ));
        Local::now().date_naive()
    })
}

/// Level-payment schedule for one loan.
///
/// The payment is fixed once at `minimum + principal * monthly_rate + extra`
/// and held for the life of the loan, so the principal share grows as the
/// interest share shrinks. Returns an empty schedule when the principal or
/// the minimum payment is not positive.
pub(crate) fn build_schedule(
    loan: &Loan,
    extra: Money,
    start: NaiveDate,
    config: &SimulationConfig,
) -> PayoffResult<AmortizationSchedule> {
    if loan.principal <= Decimal::ZERO || loan.minimum_payment <= Decimal::ZERO {
        return Ok(AmortizationSchedule::empty(loan, extra));
    }

    let rate = loan.monthly_rate();
    let fixed_payment = loan.minimum_payment + config.round(loan.principal * rate) + extra;

    let mut entries = Vec::new();
    let mut balance = loan.principal;
    let mut cumulative_interest = Decimal::ZERO;
    let mut total_principal = Decimal::ZERO;
    let mut total_extra = Decimal::ZERO;
    let mut total_paid = Decimal::ZERO;

    for n in 1..=config.max_periods {
        let beginning = balance;
        let interest = config.round(beginning * rate);

        let mut principal = (fixed_payment - interest).min(beginning);
        // Fold a sub-cent tail into this payment rather than carry it forward
        if config.is_retired(beginning - principal) {
            principal = beginning;
        }
        // The regular share is credited first; only principal beyond it counts as extra
        let regular = (fixed_payment - extra - interest).max(Decimal::ZERO);
        let extra_portion = (principal - regular).max(Decimal::ZERO).min(extra);
        let payment = interest + principal;

        balance = beginning - principal;
        cumulative_interest += interest;
        total_principal += principal;
        total_extra += extra_portion;
        total_paid += payment;

        entries.push(AmortizationScheduleEntry {
            payment_number: n,
            date: payment_date(start, n)?,
            beginning_balance: beginning,
            payment,
            interest,
            principal,
            extra_payment: extra_portion,
            ending_balance: balance,
            cumulative_interest,
        });

        if balance.is_zero() {
            break;
        }
    }

    let status = if balance.is_zero() {
        SimulationStatus::Completed
    } else {
        SimulationStatus::TruncatedAtLimit
    };
    let payoff_date = match status {
        SimulationStatus::Completed => entries.last().map(|e| e.date),
        _ => None,
    };

    Ok(AmortizationSchedule {
        loan_id: loan.id.clone(),
        loan_name: loan.name.clone(),
        principal: loan.principal,
        fixed_payment,
        extra_payment: extra,
        number_of_payments: entries.len() as u32,
        entries,
        total_interest: cumulative_interest,
        total_principal,
        total_extra_paid: total_extra,
        total_paid,
        payoff_date,
        status,
    })
}

/// Generate the payment-by-payment amortization schedule for a single loan.
pub fn generate_schedule(
    input: &AmortizationInput,
) -> PayoffResult<ComputationOutput<AmortizationSchedule>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    input.config.validate()?;
    validate_loan(&input.loan)?;
    if let Some(extra) = input.extra_payment {
        if extra < Decimal::ZERO {
            return Err(crate::PayoffError::InvalidInput {
                field: "extra_payment".into(),
                reason: "Extra payment cannot be negative".into(),
            });
        }
    }

    let loan = &input.loan;
    let extra = input
        .extra_payment
        .or(loan.extra_payment)
        .unwrap_or(Decimal::ZERO);
    let start_date = resolve_start_date(loan, input.start_date, &mut warnings);

    debug!(loan = %loan.id, principal = %loan.principal, extra = %extra, "building amortization schedule");
    let schedule = build_schedule(loan, extra, start_date, &input.config)?;

    if schedule.is_empty() {
        warn!(loan = %loan.id, "non-positive principal or minimum payment; empty schedule");
        warnings.push(format!(
            "Loan '{}' has a non-positive principal or minimum payment; no schedule generated",
            loan.name
        ));
    } else if schedule.status == SimulationStatus::TruncatedAtLimit {
        warn!(loan = %loan.id, periods = input.config.max_periods, "schedule truncated at period ceiling");
        warnings.push(format!(
            "Schedule stopped at the {}-period ceiling with {} still outstanding",
            input.config.max_periods,
            schedule
                .entries
                .last()
                .map(|e| e.ending_balance)
                .unwrap_or(loan.principal)
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Level-payment amortization (fixed payment = minimum + initial interest + extra)",
        &serde_json::json!({
            "loan": loan.id,
            "principal": loan.principal.to_string(),
            "annual_rate_pct": loan.annual_rate.to_string(),
            "minimum_payment": loan.minimum_payment.to_string(),
            "extra_payment": extra.to_string(),
            "start_date": start_date.to_string(),
            "max_periods": input.config.max_periods,
        }),
        warnings,
        elapsed,
        schedule,
    ))
}
