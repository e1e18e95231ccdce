use napi::bindgen_prelude::Buffer;
use napi::Result as NapiResult;
use napi_derive::napi;
use serde::de::DeserializeOwned;

use payoff_core::amortization::{extra_payment, schedule};
use payoff_core::strategy::{compare, planner};
use payoff_core::{export, projection};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn parse<T: DeserializeOwned>(input_json: &str) -> NapiResult<T> {
    serde_json::from_str(input_json).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Amortization
// ---------------------------------------------------------------------------

#[napi]
pub fn generate_schedule(input_json: String) -> NapiResult<String> {
    let input: schedule::AmortizationInput = parse(&input_json)?;
    let output = schedule::generate_schedule(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn analyze_extra_payment(input_json: String) -> NapiResult<String> {
    let input: extra_payment::ExtraPaymentInput = parse(&input_json)?;
    let output = extra_payment::analyze_extra_payment(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Strategy
// ---------------------------------------------------------------------------

#[napi]
pub fn plan_payoff(input_json: String) -> NapiResult<String> {
    let input: planner::PayoffPlanInput = parse(&input_json)?;
    let output = planner::plan_payoff(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn plan_payoff_detailed(input_json: String) -> NapiResult<String> {
    let input: planner::PayoffPlanInput = parse(&input_json)?;
    let output = planner::plan_payoff_detailed(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn compare_strategies(input_json: String) -> NapiResult<String> {
    let input: compare::StrategyComparisonInput = parse(&input_json)?;
    let output = compare::compare_strategies(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

#[napi]
pub fn project_independent_payoff(input_json: String) -> NapiResult<String> {
    let input: projection::IndependentProjectionInput = parse(&input_json)?;
    let output = projection::project_independent_payoff(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

/// BOM-prefixed CSV of the schedule built from an amortization input.
#[napi]
pub fn export_amortization(input_json: String) -> NapiResult<Buffer> {
    let input: schedule::AmortizationInput = parse(&input_json)?;
    let output = schedule::generate_schedule(&input).map_err(to_napi_error)?;
    let bytes = export::export_amortization(&input.loan, &output.result).map_err(to_napi_error)?;
    Ok(bytes.into())
}

/// BOM-prefixed CSV of the plan built from a payoff plan input.
#[napi]
pub fn export_strategy(input_json: String) -> NapiResult<Buffer> {
    let input: planner::PayoffPlanInput = parse(&input_json)?;
    let output = planner::plan_payoff(&input).map_err(to_napi_error)?;
    let bytes = export::export_strategy(&output.result).map_err(to_napi_error)?;
    Ok(bytes.into())
}
