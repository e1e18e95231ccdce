use clap::Args;
use serde_json::Value;
use std::fs;
use std::io::{self, Write};

use payoff_core::amortization::schedule;
use payoff_core::export;
use payoff_core::strategy::planner;

use super::amortization::{build_schedule_input, ScheduleArgs};
use super::strategy::{build_plan_input, PlanArgs};

/// Where to write the exported document
#[derive(Args)]
pub struct OutArgs {
    /// Output file path (stdout when omitted)
    #[arg(long)]
    pub out: Option<String>,
}

#[derive(Args)]
pub struct ExportScheduleArgs {
    #[command(flatten)]
    pub schedule: ScheduleArgs,

    #[command(flatten)]
    pub out: OutArgs,
}

#[derive(Args)]
pub struct ExportStrategyArgs {
    #[command(flatten)]
    pub plan: PlanArgs,

    #[command(flatten)]
    pub out: OutArgs,
}

fn write_bytes(out: &OutArgs, bytes: &[u8]) -> Result<(), Box<dyn std::error::Error>> {
    match out.out {
        Some(ref path) => {
            fs::write(path, bytes).map_err(|e| format!("Failed to write '{}': {}", path, e))?;
            tracing::info!(path = %path, bytes = bytes.len(), "export written");
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(bytes)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

/// Exports write their own bytes; the returned `Null` tells `main` there is
/// nothing left to format.
pub fn run_export_schedule(args: ExportScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let input = build_schedule_input(&args.schedule)?;
    let output = schedule::generate_schedule(&input)?;
    for w in &output.warnings {
        tracing::warn!("{}", w);
    }
    let bytes = export::export_amortization(&input.loan, &output.result)?;
    write_bytes(&args.out, &bytes)?;
    Ok(Value::Null)
}

pub fn run_export_strategy(args: ExportStrategyArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let input = build_plan_input(&args.plan)?;
    let output = planner::plan_payoff(&input)?;
    for w in &output.warnings {
        tracing::warn!("{}", w);
    }
    let bytes = export::export_strategy(&output.result)?;
    write_bytes(&args.out, &bytes)?;
    Ok(Value::Null)
}
