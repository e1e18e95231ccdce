use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::ordering::PayoffStrategy;
use super::planner::{self, PayoffPlanInput, StrategyResult};
use crate::config::SimulationConfig;
use crate::types::*;
use crate::PayoffResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyComparisonInput {
    pub loans: Vec<Loan>,
    pub available_monthly_payment: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub config: SimulationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyComparison {
    pub snowball: StrategyResult,
    pub avalanche: StrategyResult,
}

/// Run snowball and avalanche over the same loans and budget.
///
/// Both results are returned as the planner produced them. The two runs own
/// separate simulation state and execute concurrently.
pub fn compare_strategies(
    input: &StrategyComparisonInput,
) -> PayoffResult<ComputationOutput<StrategyComparison>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    // Pin the date once so both runs share a calendar.
    let start_date = input.start_date.unwrap_or_else(|| {
        warnings.push("No start date supplied; simulation dated from today".into());
        Local::now().date_naive()
    });
    let plan_input = |strategy| PayoffPlanInput {
        loans: input.loans.clone(),
        available_monthly_payment: input.available_monthly_payment,
        strategy,
        start_date: Some(start_date),
        config: input.config.clone(),
    };
    let snowball_input = plan_input(PayoffStrategy::Snowball);
    let avalanche_input = plan_input(PayoffStrategy::Avalanche);

    let (snowball, avalanche) = rayon::join(
        || planner::plan_payoff(&snowball_input),
        || planner::plan_payoff(&avalanche_input),
    );
    let snowball = snowball?;
    let avalanche = avalanche?;

    for (label, run) in [("snowball", &snowball), ("avalanche", &avalanche)] {
        warnings.extend(run.warnings.iter().map(|w| format!("{label}: {w}")));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Snowball vs avalanche comparison (pooled monthly budget)",
        &serde_json::json!({
            "loans": input.loans.len(),
            "available_monthly_payment": input.available_monthly_payment.to_string(),
            "start_date": start_date.to_string(),
            "max_periods": input.config.max_periods,
            "interest_accrual": input.config.interest_accrual,
        }),
        warnings,
        elapsed,
        StrategyComparison {
            snowball: snowball.result,
            avalanche: avalanche.result,
        },
    ))
}
