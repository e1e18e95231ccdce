use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use payoff_core::amortization::extra_payment::{self, ExtraPaymentInput};
use payoff_core::amortization::schedule::{self, AmortizationInput};
use payoff_core::{Loan, SimulationConfig};

use super::load_input;

/// Loan described directly on the command line
#[derive(Args, Debug, Clone)]
pub struct LoanFlags {
    /// Display name for the loan
    #[arg(long, default_value = "Loan")]
    pub name: String,

    /// Outstanding principal
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate as a percentage (5.5 = 5.5%)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Minimum monthly payment
    #[arg(long)]
    pub minimum: Option<Decimal>,

    /// Date the schedule starts from (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<NaiveDate>,
}

impl LoanFlags {
    fn to_loan(&self) -> Result<Loan, Box<dyn std::error::Error>> {
        let principal = self
            .principal
            .ok_or("--principal is required (or provide --input)")?;
        let annual_rate = self.rate.ok_or("--rate is required (or provide --input)")?;
        let minimum_payment = self
            .minimum
            .ok_or("--minimum is required (or provide --input)")?;
        Ok(Loan {
            id: self.name.to_lowercase().replace(' ', "-"),
            name: self.name.clone(),
            principal,
            annual_rate,
            minimum_payment,
            extra_payment: None,
            start_date: self.start_date,
            loan_type: None,
        })
    }
}

/// Arguments for a single-loan amortization schedule
#[derive(Args)]
pub struct ScheduleArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub loan: LoanFlags,

    /// Constant extra payment each month
    #[arg(long)]
    pub extra: Option<Decimal>,

    /// Override the period ceiling
    #[arg(long)]
    pub max_periods: Option<u32>,
}

pub fn build_schedule_input(args: &ScheduleArgs) -> Result<AmortizationInput, Box<dyn std::error::Error>> {
    let mut input: AmortizationInput = match load_input(args.input.as_deref())? {
        Some(input) => input,
        None => AmortizationInput {
            loan: args.loan.to_loan()?,
            extra_payment: None,
            start_date: None,
            config: SimulationConfig::default(),
        },
    };
    if args.extra.is_some() {
        input.extra_payment = args.extra;
    }
    if let Some(max) = args.max_periods {
        input.config.max_periods = max;
    }
    Ok(input)
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let input = build_schedule_input(&args)?;
    let result = schedule::generate_schedule(&input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for extra payment analysis
#[derive(Args)]
pub struct ExtraPaymentArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub loan: LoanFlags,

    /// Hypothetical extra payment each month
    #[arg(long)]
    pub extra: Option<Decimal>,
}

pub fn run_extra_payment(args: ExtraPaymentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut input: ExtraPaymentInput = match load_input(args.input.as_deref())? {
        Some(input) => input,
        None => ExtraPaymentInput {
            loan: args.loan.to_loan()?,
            extra_payment: args
                .extra
                .ok_or("--extra is required (or provide --input)")?,
            start_date: None,
            config: SimulationConfig::default(),
        },
    };
    if let Some(extra) = args.extra {
        input.extra_payment = extra;
    }
    let result = extra_payment::analyze_extra_payment(&input)?;
    Ok(serde_json::to_value(result)?)
}
