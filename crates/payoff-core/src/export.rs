use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use std::io::Write;

use crate::amortization::schedule::AmortizationSchedule;
use crate::error::PayoffError;
use crate::strategy::planner::StrategyResult;
use crate::types::{Loan, Money, Percent, SimulationStatus};
use crate::PayoffResult;

/// UTF-8 byte-order mark so spreadsheet tools pick the right encoding for
/// accented currency labels.
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

const DATE_FORMAT: &str = "%Y-%m-%d";

fn money(amount: Money) -> String {
    format!(
        "{:.2}",
        amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    )
}

fn percent(rate: Percent) -> String {
    format!("{}%", money(rate))
}

fn date(d: NaiveDate) -> String {
    d.format(DATE_FORMAT).to_string()
}

/// Header lines are `Label: value`, one per line.
fn write_label(buf: &mut Vec<u8>, label: &str, value: &str) -> PayoffResult<()> {
    writeln!(buf, "{label}: {value}")?;
    Ok(())
}

/// Append a CSV table to `buf`. The csv writer quotes any field containing
/// the delimiter, quotes or newlines.
fn write_table(buf: &mut Vec<u8>, header: &[&str], rows: Vec<Vec<String>>) -> PayoffResult<()> {
    let mut wtr = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    wtr.write_record(header)?;
    for row in rows {
        wtr.write_record(&row)?;
    }
    let table = wtr
        .into_inner()
        .map_err(|e| PayoffError::ExportError(e.to_string()))?;
    buf.extend_from_slice(&table);
    Ok(())
}

/// Render an amortization schedule as a BOM-prefixed CSV document: loan
/// details, the payment table, then a summary block.
pub fn export_amortization(loan: &Loan, schedule: &AmortizationSchedule) -> PayoffResult<Vec<u8>> {
    let mut buf = UTF8_BOM.to_vec();

    write_label(&mut buf, "Loan", &loan.name)?;
    write_label(&mut buf, "Principal", &money(loan.principal))?;
    write_label(&mut buf, "Interest Rate", &percent(loan.annual_rate))?;
    write_label(&mut buf, "Minimum Payment", &money(loan.minimum_payment))?;
    if schedule.extra_payment > Decimal::ZERO {
        write_label(&mut buf, "Extra Payment", &money(schedule.extra_payment))?;
    }
    writeln!(buf)?;

    let rows = schedule
        .entries
        .iter()
        .map(|e| {
            vec![
                e.payment_number.to_string(),
                date(e.date),
                money(e.beginning_balance),
                money(e.payment),
                money(e.interest),
                money(e.principal),
                money(e.ending_balance),
                money(e.cumulative_interest),
            ]
        })
        .collect();
    write_table(
        &mut buf,
        &[
            "Payment #",
            "Date",
            "Beginning Balance",
            "Payment",
            "Interest",
            "Principal",
            "Ending Balance",
            "Cumulative Interest",
        ],
        rows,
    )?;
    writeln!(buf)?;

    writeln!(buf, "Summary")?;
    write_label(&mut buf, "Number of Payments", &schedule.number_of_payments.to_string())?;
    write_label(&mut buf, "Total Interest", &money(schedule.total_interest))?;
    write_label(
        &mut buf,
        "Total Cost",
        &money(loan.principal + schedule.total_interest),
    )?;
    let final_date = schedule
        .entries
        .last()
        .map(|e| date(e.date))
        .unwrap_or_else(|| "N/A".into());
    write_label(&mut buf, "Final Payment Date", &final_date)?;

    Ok(buf)
}

/// Render a strategy result as a BOM-prefixed CSV document: headline totals
/// then the payoff-order table.
pub fn export_strategy(result: &StrategyResult) -> PayoffResult<Vec<u8>> {
    let mut buf = UTF8_BOM.to_vec();

    let debt_free = match (result.status, result.debt_free_date) {
        (SimulationStatus::Completed, Some(d)) => date(d),
        (SimulationStatus::InfeasibleBudget, _) => "Budget insufficient".into(),
        _ => "Not reached".into(),
    };

    write_label(&mut buf, "Strategy", &result.strategy_name)?;
    write_label(&mut buf, "Description", &result.description)?;
    write_label(&mut buf, "Debt-Free Date", &debt_free)?;
    write_label(&mut buf, "Total Interest", &money(result.total_interest))?;
    write_label(&mut buf, "Total Cost", &money(result.total_cost()))?;
    write_label(&mut buf, "Total Months", &result.total_months.to_string())?;
    writeln!(buf)?;

    let rows = result
        .payoff_plans
        .iter()
        .map(|p| {
            vec![
                p.payoff_order.to_string(),
                p.loan_name.clone(),
                money(p.original_principal),
                percent(p.annual_rate),
                date(p.payoff_date),
                p.months_to_payoff.to_string(),
                money(p.interest_paid),
            ]
        })
        .collect();
    write_table(
        &mut buf,
        &[
            "Order",
            "Loan",
            "Original Amount",
            "Interest Rate",
            "Payoff Date",
            "Months to Payoff",
            "Interest Paid",
        ],
        rows,
    )?;

    Ok(buf)
}
