use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use payoff_core::strategy::compare::{self, StrategyComparisonInput};
use payoff_core::strategy::ordering::PayoffStrategy;
use payoff_core::strategy::planner::{self, PayoffPlanInput};
use payoff_core::{Loan, Money, SimulationConfig};

use super::{load_input, PortfolioArgs, StrategyArg};

/// Pooled-budget input as read from a file. Strategy and budget may come
/// from flags instead, so both are optional here.
#[derive(Debug, Deserialize)]
struct PortfolioFile {
    loans: Vec<Loan>,
    #[serde(default)]
    available_monthly_payment: Option<Money>,
    #[serde(default)]
    strategy: Option<PayoffStrategy>,
    #[serde(default)]
    start_date: Option<NaiveDate>,
    #[serde(default)]
    config: SimulationConfig,
}

/// Arguments for a pooled payoff plan
#[derive(Args)]
pub struct PlanArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub portfolio: PortfolioArgs,

    /// Total monthly budget across all loans
    #[arg(long)]
    pub budget: Option<Decimal>,

    /// Which loan receives the surplus each month
    #[arg(long, value_enum)]
    pub strategy: Option<StrategyArg>,

    /// Date the simulation starts from (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// Include the month-by-month payment breakdown
    #[arg(long)]
    pub detailed: bool,
}

/// Arguments for a snowball vs avalanche comparison
#[derive(Args)]
pub struct CompareArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub portfolio: PortfolioArgs,

    /// Total monthly budget across all loans
    #[arg(long)]
    pub budget: Option<Decimal>,

    /// Date the simulation starts from (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<NaiveDate>,
}

fn read_portfolio(
    input: Option<&str>,
    portfolio: &PortfolioArgs,
    budget: Option<Decimal>,
    start_date: Option<NaiveDate>,
) -> Result<PortfolioFile, Box<dyn std::error::Error>> {
    let mut file = match load_input::<PortfolioFile>(input)? {
        Some(file) => file,
        None => PortfolioFile {
            loans: portfolio
                .read_loans()?
                .ok_or("--loans is required (or provide --input)")?,
            available_monthly_payment: None,
            strategy: None,
            start_date: None,
            config: SimulationConfig::default(),
        },
    };
    file.loans = portfolio.filter(&file.loans);
    portfolio.apply_config(&mut file.config);
    if budget.is_some() {
        file.available_monthly_payment = budget;
    }
    if start_date.is_some() {
        file.start_date = start_date;
    }
    Ok(file)
}

pub fn build_plan_input(args: &PlanArgs) -> Result<PayoffPlanInput, Box<dyn std::error::Error>> {
    let file = read_portfolio(
        args.input.as_deref(),
        &args.portfolio,
        args.budget,
        args.start_date,
    )?;
    let strategy = args
        .strategy
        .map(PayoffStrategy::from)
        .or(file.strategy)
        .unwrap_or(PayoffStrategy::Avalanche);
    Ok(PayoffPlanInput {
        loans: file.loans,
        available_monthly_payment: file
            .available_monthly_payment
            .ok_or("--budget is required")?,
        strategy,
        start_date: file.start_date,
        config: file.config,
    })
}

pub fn run_plan(args: PlanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let input = build_plan_input(&args)?;
    if args.detailed {
        let result = planner::plan_payoff_detailed(&input)?;
        Ok(serde_json::to_value(result)?)
    } else {
        let result = planner::plan_payoff(&input)?;
        Ok(serde_json::to_value(result)?)
    }
}

pub fn run_compare(args: CompareArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let file = read_portfolio(
        args.input.as_deref(),
        &args.portfolio,
        args.budget,
        args.start_date,
    )?;
    let input = StrategyComparisonInput {
        loans: file.loans,
        available_monthly_payment: file
            .available_monthly_payment
            .ok_or("--budget is required")?,
        start_date: file.start_date,
        config: file.config,
    };
    let result = compare::compare_strategies(&input)?;
    Ok(serde_json::to_value(result)?)
}
