use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

use super::ordering::{LoanSimulationState, PayoffStrategy};
use crate::config::{InterestAccrual, SimulationConfig};
use crate::error::PayoffError;
use crate::types::*;
use crate::PayoffResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Input for a pooled-budget payoff simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayoffPlanInput {
    pub loans: Vec<Loan>,
    /// Total paid towards all loans each month.
    pub available_monthly_payment: Money,
    pub strategy: PayoffStrategy,
    /// First simulated month is dated one month after this.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub config: SimulationConfig,
}

/// When and at what cost one loan was retired.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoffPlan {
    pub loan_id: String,
    pub loan_name: String,
    pub original_principal: Money,
    pub annual_rate: Percent,
    /// 1-based position in the sequence loans actually reached zero.
    pub payoff_order: u32,
    /// 1-based position in the strategy's priority order at the outset.
    pub priority_rank: u32,
    pub payoff_date: NaiveDate,
    pub months_to_payoff: u32,
    pub interest_paid: Money,
}

/// A loan still carrying a balance when the period ceiling was hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemainingLoan {
    pub loan_id: String,
    pub loan_name: String,
    pub balance: Money,
    pub interest_paid: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyResult {
    pub strategy: PayoffStrategy,
    pub strategy_name: String,
    pub description: String,
    pub status: SimulationStatus,
    pub payoff_plans: Vec<PayoffPlan>,
    pub total_interest: Money,
    pub total_principal: Money,
    pub total_paid: Money,
    pub total_months: u32,
    /// Only set when every loan was retired.
    pub debt_free_date: Option<NaiveDate>,
    pub last_period_date: Option<NaiveDate>,
    pub available_monthly_payment: Money,
    pub total_minimum_payments: Money,
    /// How far the budget falls short of the minimums (zero when feasible).
    pub budget_shortfall: Money,
    pub remaining_loans: Vec<RemainingLoan>,
}

impl StrategyResult {
    pub fn is_completed(&self) -> bool {
        self.status.is_completed()
    }

    /// Total cost of becoming debt free: principal plus interest.
    pub fn total_cost(&self) -> Money {
        self.total_principal + self.total_interest
    }
}

/// One loan's slice of a simulated month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanPeriodPayment {
    pub loan_id: String,
    pub loan_name: String,
    pub beginning_balance: Money,
    pub payment: Money,
    pub principal: Money,
    pub interest: Money,
    pub ending_balance: Money,
    /// This loan was at the front of the priority order this month.
    pub is_focus: bool,
    pub paid_off: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyStrategyPayment {
    pub month: u32,
    pub date: NaiveDate,
    pub loan_payments: Vec<LoanPeriodPayment>,
    /// Can exceed the budget by at most `epsilon` per loan retired this
    /// month: a leftover tail within `epsilon` is added to that loan's final
    /// payment instead of being carried or written off.
    pub total_payment: Money,
    pub total_interest: Money,
    pub total_principal: Money,
    pub remaining_balance: Money,
    /// Unallocated budget plus freed minimums, after this month's payoffs.
    pub available_extra: Money,
    /// Sum of minimum payments on loans still outstanding after this month.
    pub remaining_minimums: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailedStrategyResult {
    pub summary: StrategyResult,
    pub monthly_payments: Vec<MonthlyStrategyPayment>,
}

// ---------------------------------------------------------------------------
// Simulation
// ---------------------------------------------------------------------------

/// Per-run simulation arena. Owns cloned loan state and is dropped when the
/// run finishes.
struct PooledSimulation<'a> {
    strategy: PayoffStrategy,
    config: &'a SimulationConfig,
    accrual: InterestAccrual,
    start_date: NaiveDate,
    budget: Money,
    total_minimums: Money,
    total_principal: Money,
    remaining: Vec<LoanSimulationState>,
    priority_ranks: Vec<u32>,
    available_extra: Money,
    plans: Vec<PayoffPlan>,
    total_interest: Money,
    total_paid: Money,
    month: u32,
    negative_amortization: Vec<String>,
}

impl<'a> PooledSimulation<'a> {
    fn new(
        loans: &[Loan],
        budget: Money,
        strategy: PayoffStrategy,
        start_date: NaiveDate,
        config: &'a SimulationConfig,
        accrual: InterestAccrual,
    ) -> Self {
        let mut remaining: Vec<LoanSimulationState> = loans
            .iter()
            .enumerate()
            .map(|(i, loan)| LoanSimulationState::new(i, loan))
            .collect();
        strategy.order(&mut remaining);

        let mut priority_ranks = vec![0; loans.len()];
        for (rank, state) in remaining.iter().enumerate() {
            priority_ranks[state.input_index] = rank as u32 + 1;
        }

        let total_minimums: Money = remaining.iter().map(|s| s.minimum_payment).sum();
        let total_principal: Money = remaining.iter().map(|s| s.original_principal).sum();

        PooledSimulation {
            strategy,
            config,
            accrual,
            start_date,
            budget,
            total_minimums,
            total_principal,
            remaining,
            priority_ranks,
            available_extra: budget - total_minimums,
            plans: Vec::new(),
            total_interest: Decimal::ZERO,
            total_paid: Decimal::ZERO,
            month: 0,
            negative_amortization: Vec::new(),
        }
    }

    fn is_feasible(&self) -> bool {
        self.available_extra >= Decimal::ZERO
    }

    /// Advance one month: interest and minimums on every loan, the pooled
    /// extra on the focus loan, then retire anything at zero.
    fn step(&mut self) -> PayoffResult<MonthlyStrategyPayment> {
        self.month += 1;
        let date = payment_date(self.start_date, self.month)?;
        self.strategy.order(&mut self.remaining);

        let cfg = self.config;
        let extra = self.available_extra.max(Decimal::ZERO);
        let mut loan_payments = Vec::with_capacity(self.remaining.len());

        for (pos, state) in self.remaining.iter_mut().enumerate() {
            let is_focus = pos == 0;
            let beginning = state.balance;
            let mut interest = cfg.round(beginning * state.monthly_rate);

            let mut payment = if is_focus
                && extra > Decimal::ZERO
                && self.accrual == InterestAccrual::DoubleOnTarget
            {
                let owed = beginning + interest;
                let minimum = state.minimum_payment.min(owed);
                let after_minimum = owed - minimum;
                let second_charge = cfg.round(after_minimum * state.monthly_rate);
                interest += second_charge;
                minimum + extra.min(after_minimum + second_charge)
            } else {
                let due = if is_focus {
                    state.minimum_payment + extra
                } else {
                    state.minimum_payment
                };
                due.min(beginning + interest)
            };

            let mut ending = beginning + interest - payment;
            if ending > Decimal::ZERO && cfg.is_retired(ending) {
                payment += ending;
                ending = Decimal::ZERO;
            }
            if ending > beginning && !self.negative_amortization.contains(&state.loan_id) {
                warn!(loan = %state.loan_id, "minimum payment does not cover interest");
                self.negative_amortization.push(state.loan_id.clone());
            }

            state.balance = ending;
            state.interest_paid += interest;
            self.total_interest += interest;
            self.total_paid += payment;

            loan_payments.push(LoanPeriodPayment {
                loan_id: state.loan_id.clone(),
                loan_name: state.loan_name.clone(),
                beginning_balance: beginning,
                payment,
                principal: payment - interest,
                interest,
                ending_balance: ending,
                is_focus,
                paid_off: cfg.is_retired(ending),
            });
        }

        self.retire_paid_off(date);

        debug_assert_eq!(
            self.available_extra + self.remaining_minimums(),
            self.budget,
            "budget pool must be conserved across payoffs"
        );

        Ok(MonthlyStrategyPayment {
            month: self.month,
            date,
            total_payment: loan_payments.iter().map(|p| p.payment).sum(),
            total_interest: loan_payments.iter().map(|p| p.interest).sum(),
            total_principal: loan_payments.iter().map(|p| p.principal).sum(),
            loan_payments,
            remaining_balance: self.remaining.iter().map(|s| s.balance).sum(),
            available_extra: self.available_extra,
            remaining_minimums: self.remaining_minimums(),
        })
    }

    /// Move retired loans out of the working set, releasing their minimums
    /// into the pooled extra.
    fn retire_paid_off(&mut self, date: NaiveDate) {
        let cfg = self.config;
        let (retired, outstanding): (Vec<_>, Vec<_>) = std::mem::take(&mut self.remaining)
            .into_iter()
            .partition(|s| cfg.is_retired(s.balance));
        self.remaining = outstanding;

        for state in retired {
            self.available_extra += state.minimum_payment;
            let payoff_order = self.plans.len() as u32 + 1;
            debug!(
                loan = %state.loan_id,
                order = payoff_order,
                month = self.month,
                freed = %state.minimum_payment,
                "loan retired"
            );
            self.plans.push(PayoffPlan {
                loan_id: state.loan_id,
                loan_name: state.loan_name,
                original_principal: state.original_principal,
                annual_rate: state.annual_rate,
                payoff_order,
                priority_rank: self.priority_ranks[state.input_index],
                payoff_date: date,
                months_to_payoff: self.month,
                interest_paid: state.interest_paid,
            });
        }
    }

    fn remaining_minimums(&self) -> Money {
        self.remaining.iter().map(|s| s.minimum_payment).sum()
    }

    fn run(mut self, record_months: bool) -> PayoffResult<(StrategyResult, Vec<MonthlyStrategyPayment>)> {
        if !self.is_feasible() {
            return Ok((self.into_infeasible(), Vec::new()));
        }

        let mut months = Vec::new();
        while !self.remaining.is_empty() && self.month < self.config.max_periods {
            let record = self.step()?;
            if record_months {
                months.push(record);
            }
        }
        Ok((self.into_result()?, months))
    }

    fn into_infeasible(self) -> StrategyResult {
        StrategyResult {
            strategy: self.strategy,
            strategy_name: self.strategy.name().to_string(),
            description: self.strategy.description().to_string(),
            status: SimulationStatus::InfeasibleBudget,
            payoff_plans: Vec::new(),
            total_interest: Decimal::ZERO,
            total_principal: self.total_principal,
            total_paid: Decimal::ZERO,
            total_months: 0,
            debt_free_date: None,
            last_period_date: None,
            available_monthly_payment: self.budget,
            total_minimum_payments: self.total_minimums,
            budget_shortfall: self.total_minimums - self.budget,
            remaining_loans: self
                .remaining
                .into_iter()
                .map(|s| RemainingLoan {
                    loan_id: s.loan_id,
                    loan_name: s.loan_name,
                    balance: s.balance,
                    interest_paid: s.interest_paid,
                })
                .collect(),
        }
    }

    fn into_result(self) -> PayoffResult<StrategyResult> {
        let status = if self.remaining.is_empty() {
            SimulationStatus::Completed
        } else {
            SimulationStatus::TruncatedAtLimit
        };
        let last_period_date = if self.month > 0 {
            Some(payment_date(self.start_date, self.month)?)
        } else {
            None
        };
        let debt_free_date = match status {
            SimulationStatus::Completed => last_period_date.or(Some(self.start_date)),
            _ => None,
        };

        Ok(StrategyResult {
            strategy: self.strategy,
            strategy_name: self.strategy.name().to_string(),
            description: self.strategy.description().to_string(),
            status,
            payoff_plans: self.plans,
            total_interest: self.total_interest,
            total_principal: self.total_principal,
            total_paid: self.total_paid,
            total_months: self.month,
            debt_free_date,
            last_period_date,
            available_monthly_payment: self.budget,
            total_minimum_payments: self.total_minimums,
            budget_shortfall: Decimal::ZERO,
            remaining_loans: self
                .remaining
                .into_iter()
                .map(|s| RemainingLoan {
                    loan_id: s.loan_id,
                    loan_name: s.loan_name,
                    balance: s.balance,
                    interest_paid: s.interest_paid,
                })
                .collect(),
        })
    }
}

// ---------------------------------------------------------------------------
// Shared plumbing
// ---------------------------------------------------------------------------

fn validate_plan_input(input: &PayoffPlanInput) -> PayoffResult<()> {
    input.config.validate()?;
    if input.available_monthly_payment < Decimal::ZERO {
        return Err(PayoffError::InvalidInput {
            field: "available_monthly_payment".into(),
            reason: "Monthly budget cannot be negative".into(),
        });
    }
    for loan in &input.loans {
        validate_loan(loan)?;
        // A negative minimum would inflate the pooled extra
        if loan.minimum_payment < Decimal::ZERO {
            return Err(PayoffError::InvalidInput {
                field: "minimum_payment".into(),
                reason: format!("Loan '{}' has a negative minimum payment", loan.name),
            });
        }
    }
    Ok(())
}

/// Loans already at zero take no part in the pooled simulation.
fn active_loans(loans: &[Loan], warnings: &mut Vec<String>) -> Vec<Loan> {
    loans
        .iter()
        .filter(|loan| {
            let active = loan.principal > Decimal::ZERO;
            if !active {
                warnings.push(format!(
                    "Loan '{}' has no outstanding principal and was skipped",
                    loan.name
                ));
            }
            active
        })
        .cloned()
        .collect()
}

fn resolve_plan_start(input: &PayoffPlanInput, warnings: &mut Vec<String>) -> NaiveDate {
    input.start_date.unwrap_or_else(|| {
        warnings.push("No start date supplied; simulation dated from today".into());
        Local::now().date_naive()
    })
}

fn outcome_warnings(result: &StrategyResult, config: &SimulationConfig, warnings: &mut Vec<String>) {
    match result.status {
        SimulationStatus::InfeasibleBudget => {
            warn!(
                budget = %result.available_monthly_payment,
                minimums = %result.total_minimum_payments,
                "budget does not cover minimum payments"
            );
            warnings.push(format!(
                "Monthly budget {} does not cover minimum payments of {} (short by {})",
                result.available_monthly_payment,
                result.total_minimum_payments,
                result.budget_shortfall
            ));
        }
        SimulationStatus::TruncatedAtLimit => {
            warn!(
                periods = config.max_periods,
                outstanding = result.remaining_loans.len(),
                "simulation stopped at period ceiling"
            );
            warnings.push(format!(
                "Simulation stopped at the {}-period ceiling with {} loan(s) outstanding; no debt-free date reached",
                config.max_periods,
                result.remaining_loans.len()
            ));
        }
        SimulationStatus::Completed => {}
    }
}

fn negative_amortization_warnings(
    result: &StrategyResult,
    months: &[MonthlyStrategyPayment],
    warnings: &mut Vec<String>,
) {
    let mut flagged: Vec<&str> = Vec::new();
    for month in months {
        for p in &month.loan_payments {
            if p.ending_balance > p.beginning_balance && !flagged.contains(&p.loan_name.as_str()) {
                flagged.push(&p.loan_name);
            }
        }
    }
    for name in flagged {
        warnings.push(format!(
            "Loan '{name}' grew under the {} plan: its payment did not cover monthly interest",
            result.strategy
        ));
    }
}

/// Run the pooled simulation without building the output envelope. Shared by
/// the planner entry points and the strategy comparison.
pub(crate) fn simulate(
    loans: &[Loan],
    budget: Money,
    strategy: PayoffStrategy,
    start_date: NaiveDate,
    config: &SimulationConfig,
    accrual: InterestAccrual,
    record_months: bool,
) -> PayoffResult<(StrategyResult, Vec<MonthlyStrategyPayment>)> {
    debug!(
        strategy = %strategy,
        loans = loans.len(),
        budget = %budget,
        "starting pooled payoff simulation"
    );
    let (result, months) =
        PooledSimulation::new(loans, budget, strategy, start_date, config, accrual).run(record_months)?;
    debug!(
        strategy = %strategy,
        status = ?result.status,
        months = result.total_months,
        interest = %result.total_interest,
        "pooled payoff simulation finished"
    );
    Ok((result, months))
}

// ---------------------------------------------------------------------------
// Public entry points
// ---------------------------------------------------------------------------

/// Simulate a shared monthly budget across several loans and report the
/// payoff order, total interest and debt-free date.
///
/// An insufficient budget is not an error: the result carries
/// [`SimulationStatus::InfeasibleBudget`] and no simulation is run.
pub fn plan_payoff(input: &PayoffPlanInput) -> PayoffResult<ComputationOutput<StrategyResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_plan_input(input)?;
    let loans = active_loans(&input.loans, &mut warnings);
    let start_date = resolve_plan_start(input, &mut warnings);

    let (result, _) = simulate(
        &loans,
        input.available_monthly_payment,
        input.strategy,
        start_date,
        &input.config,
        input.config.interest_accrual,
        false,
    )?;
    outcome_warnings(&result, &input.config, &mut warnings);

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        &format!("{} (pooled monthly budget)", input.strategy.name()),
        &plan_assumptions(input, start_date, input.config.interest_accrual),
        warnings,
        elapsed,
        result,
    ))
}

/// As [`plan_payoff`], plus a per-month, per-loan payment breakdown. Interest
/// is always charged once per loan per month here.
pub fn plan_payoff_detailed(
    input: &PayoffPlanInput,
) -> PayoffResult<ComputationOutput<DetailedStrategyResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_plan_input(input)?;
    if input.config.interest_accrual != InterestAccrual::SinglePerPeriod {
        warnings.push(
            "Detailed plans charge interest once per period; interest_accrual setting ignored".into(),
        );
    }
    let loans = active_loans(&input.loans, &mut warnings);
    let start_date = resolve_plan_start(input, &mut warnings);

    let (summary, monthly_payments) = simulate(
        &loans,
        input.available_monthly_payment,
        input.strategy,
        start_date,
        &input.config,
        InterestAccrual::SinglePerPeriod,
        true,
    )?;
    outcome_warnings(&summary, &input.config, &mut warnings);
    negative_amortization_warnings(&summary, &monthly_payments, &mut warnings);

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        &format!("{} (pooled monthly budget, monthly detail)", input.strategy.name()),
        &plan_assumptions(input, start_date, InterestAccrual::SinglePerPeriod),
        warnings,
        elapsed,
        DetailedStrategyResult {
            summary,
            monthly_payments,
        },
    ))
}

pub(crate) fn plan_assumptions(
    input: &PayoffPlanInput,
    start_date: NaiveDate,
    accrual: InterestAccrual,
) -> serde_json::Value {
    serde_json::json!({
        "strategy": input.strategy.to_string(),
        "loans": input.loans.len(),
        "available_monthly_payment": input.available_monthly_payment.to_string(),
        "start_date": start_date.to_string(),
        "max_periods": input.config.max_periods,
        "epsilon": input.config.epsilon.to_string(),
        "interest_accrual": accrual,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
