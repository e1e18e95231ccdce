mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::amortization::{ExtraPaymentArgs, ScheduleArgs};
use commands::export::{ExportScheduleArgs, ExportStrategyArgs};
use commands::projection::ProjectArgs;
use commands::strategy::{CompareArgs, PlanArgs};

/// Debt payoff schedules and snowball/avalanche planning
#[derive(Parser)]
#[command(
    name = "payoff",
    version,
    about = "Debt payoff schedules and snowball/avalanche planning",
    long_about = "A CLI for simulating loan payoff with decimal precision. Builds \
                  amortization schedules, measures the effect of extra payments, \
                  plans a shared monthly budget across several loans and exports \
                  the results as CSV."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log simulation progress to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a month-by-month amortization schedule for one loan
    Schedule(ScheduleArgs),
    /// Measure months and interest saved by a constant extra payment
    ExtraPayment(ExtraPaymentArgs),
    /// Plan a shared monthly budget across several loans
    Plan(PlanArgs),
    /// Compare snowball and avalanche on the same loans and budget
    Compare(CompareArgs),
    /// Project each loan paid off on its own, with no pooling
    Project(ProjectArgs),
    /// Export an amortization schedule as CSV
    ExportSchedule(ExportScheduleArgs),
    /// Export a payoff plan as CSV
    ExportStrategy(ExportStrategyArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Schedule(args) => commands::amortization::run_schedule(args),
        Commands::ExtraPayment(args) => commands::amortization::run_extra_payment(args),
        Commands::Plan(args) => commands::strategy::run_plan(args),
        Commands::Compare(args) => commands::strategy::run_compare(args),
        Commands::Project(args) => commands::projection::run_project(args),
        Commands::ExportSchedule(args) => commands::export::run_export_schedule(args),
        Commands::ExportStrategy(args) => commands::export::run_export_strategy(args),
        Commands::Version => {
            println!("payoff {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(serde_json::Value::Null) => process::exit(0),
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
