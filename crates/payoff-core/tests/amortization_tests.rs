use chrono::NaiveDate;
use payoff_core::amortization::extra_payment::{analyze_extra_payment, ExtraPaymentInput};
use payoff_core::amortization::schedule::{generate_schedule, AmortizationInput};
use payoff_core::{Loan, LoanType, SimulationConfig, SimulationStatus};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Amortization schedule tests
// ===========================================================================

fn mortgage() -> Loan {
    Loan {
        id: "home".into(),
        name: "Home Mortgage".into(),
        principal: dec!(250000),
        annual_rate: dec!(6.25),
        minimum_payment: dec!(400),
        extra_payment: None,
        start_date: Some(NaiveDate::from_ymd_opt(2023, 5, 31).unwrap()),
        loan_type: Some(LoanType::Mortgage),
    }
}

fn schedule_input(loan: Loan, extra: Option<Decimal>) -> AmortizationInput {
    AmortizationInput {
        loan,
        extra_payment: extra,
        start_date: None,
        config: SimulationConfig::default(),
    }
}

#[test]
fn test_mortgage_schedule_completes_and_balances() {
    let out = generate_schedule(&schedule_input(mortgage(), None)).unwrap();
    let s = &out.result;

    assert_eq!(s.status, SimulationStatus::Completed);
    assert!(s.number_of_payments < 600);

    // 400 + 250,000 * 6.25% / 12 = 400 + 1302.08
    assert_eq!(s.fixed_payment, dec!(1702.08));

    let principal: Decimal = s.entries.iter().map(|e| e.principal).sum();
    assert_eq!(principal, dec!(250000));

    let interest: Decimal = s.entries.iter().map(|e| e.interest).sum();
    assert_eq!(interest, s.total_interest);
    assert_eq!(s.entries.last().unwrap().cumulative_interest, s.total_interest);
}

#[test]
fn test_balances_chain_and_never_increase() {
    let out = generate_schedule(&schedule_input(mortgage(), Some(dec!(150)))).unwrap();
    let entries = &out.result.entries;

    for pair in entries.windows(2) {
        assert_eq!(pair[0].ending_balance, pair[1].beginning_balance);
        assert!(pair[1].ending_balance <= pair[0].ending_balance);
    }
    for e in entries {
        assert_eq!(e.beginning_balance - e.principal, e.ending_balance);
        assert_eq!(e.interest + e.principal, e.payment);
    }
}

#[test]
fn test_month_end_start_dates_clamp() {
    let out = generate_schedule(&schedule_input(mortgage(), None)).unwrap();
    let dates: Vec<NaiveDate> = out.result.entries.iter().take(3).map(|e| e.date).collect();
    assert_eq!(
        dates,
        vec![
            NaiveDate::from_ymd_opt(2023, 6, 30).unwrap(),
            NaiveDate::from_ymd_opt(2023, 7, 31).unwrap(),
            NaiveDate::from_ymd_opt(2023, 8, 31).unwrap(),
        ]
    );
}

#[test]
fn test_schedule_serializes_amounts_as_strings() {
    let out = generate_schedule(&schedule_input(mortgage(), None)).unwrap();
    let json = serde_json::to_value(&out).unwrap();
    assert_eq!(json["result"]["fixed_payment"], "1702.08");
    assert_eq!(json["result"]["status"], "completed");
    assert_eq!(json["result"]["entries"][0]["date"], "2023-06-30");
}

#[test]
fn test_input_from_json_uses_config_defaults() {
    let input: AmortizationInput = serde_json::from_str(
        r#"{
            "loan": {
                "id": "cc",
                "name": "Store Card",
                "principal": "900",
                "annual_rate": "0",
                "minimum_payment": "100"
            },
            "start_date": "2024-03-01"
        }"#,
    )
    .unwrap();
    let out = generate_schedule(&input).unwrap();
    assert_eq!(out.result.number_of_payments, 9);
    assert_eq!(
        out.result.payoff_date,
        Some(NaiveDate::from_ymd_opt(2024, 12, 1).unwrap())
    );
}

// ===========================================================================
// Extra payment analysis tests
// ===========================================================================

#[test]
fn test_extra_payment_on_mortgage() {
    let out = analyze_extra_payment(&ExtraPaymentInput {
        loan: mortgage(),
        extra_payment: dec!(300),
        start_date: None,
        config: SimulationConfig::default(),
    })
    .unwrap();
    let a = &out.result;

    assert!(a.months_saved > 0);
    assert!(a.interest_saved > Decimal::ZERO);
    assert_eq!(a.interest_saved, a.baseline_interest - a.accelerated_interest);
    assert_eq!(a.net_savings, a.interest_saved - a.total_extra_paid);
    assert_eq!(a.baseline_status, SimulationStatus::Completed);
    assert_eq!(a.accelerated_status, SimulationStatus::Completed);
}

#[test]
fn test_larger_extra_saves_more() {
    let analyse = |extra| {
        analyze_extra_payment(&ExtraPaymentInput {
            loan: mortgage(),
            extra_payment: extra,
            start_date: None,
            config: SimulationConfig::default(),
        })
        .unwrap()
        .result
    };
    let small = analyse(dec!(100));
    let large = analyse(dec!(500));
    assert!(large.months_saved >= small.months_saved);
    assert!(large.interest_saved >= small.interest_saved);
}
