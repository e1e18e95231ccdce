use chrono::NaiveDate;
use clap::Args;
use serde_json::Value;

use payoff_core::projection::{self, IndependentProjectionInput};
use payoff_core::SimulationConfig;

use super::{load_input, PortfolioArgs};

/// Arguments for independent per-loan payoff projection
#[derive(Args)]
pub struct ProjectArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub portfolio: PortfolioArgs,

    /// Fallback start date for loans without their own
    #[arg(long)]
    pub start_date: Option<NaiveDate>,
}

pub fn run_project(args: ProjectArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut input: IndependentProjectionInput = match load_input(args.input.as_deref())? {
        Some(input) => input,
        None => IndependentProjectionInput {
            loans: args
                .portfolio
                .read_loans()?
                .ok_or("--loans is required (or provide --input)")?,
            start_date: None,
            config: SimulationConfig::default(),
        },
    };
    input.loans = args.portfolio.filter(&input.loans);
    args.portfolio.apply_config(&mut input.config);
    if args.start_date.is_some() {
        input.start_date = args.start_date;
    }

    let result = projection::project_independent_payoff(&input)?;
    Ok(serde_json::to_value(result)?)
}
