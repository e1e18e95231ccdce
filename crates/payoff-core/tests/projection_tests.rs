use chrono::NaiveDate;
use payoff_core::projection::{project_independent_payoff, IndependentProjectionInput};
use payoff_core::strategy::ordering::PayoffStrategy;
use payoff_core::strategy::planner::{plan_payoff, PayoffPlanInput};
use payoff_core::{Loan, SimulationConfig, SimulationStatus};
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;

fn loans() -> Vec<Loan> {
    vec![
        Loan {
            id: "a".into(),
            name: "Personal Loan".into(),
            principal: dec!(3000),
            annual_rate: dec!(7),
            minimum_payment: dec!(90),
            extra_payment: Some(dec!(50)),
            start_date: None,
            loan_type: None,
        },
        Loan {
            id: "b".into(),
            name: "Car Loan".into(),
            principal: dec!(7000),
            annual_rate: dec!(11),
            minimum_payment: dec!(150),
            extra_payment: Some(dec!(25)),
            start_date: None,
            loan_type: None,
        },
    ]
}

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
}

#[test]
fn test_independent_debt_free_is_later_single_payoff() {
    let out = project_independent_payoff(&IndependentProjectionInput {
        loans: loans(),
        start_date: Some(start()),
        config: SimulationConfig::default(),
    })
    .unwrap();
    let p = &out.result;

    assert_eq!(p.status, SimulationStatus::Completed);
    let latest = p.loans.iter().filter_map(|l| l.payoff_date).max();
    assert_eq!(p.debt_free_date, latest);
    assert_eq!(p.loans[0].months_to_payoff, 21);
    assert_eq!(p.loans[1].months_to_payoff, 35);
    assert_eq!(p.debt_free_date, Some(NaiveDate::from_ymd_opt(2027, 12, 1).unwrap()));
}

#[test]
fn test_pooled_budget_finishes_no_later() {
    let independent = project_independent_payoff(&IndependentProjectionInput {
        loans: loans(),
        start_date: Some(start()),
        config: SimulationConfig::default(),
    })
    .unwrap()
    .result;

    // Same monthly cash as the independent plan, pooled
    for strategy in PayoffStrategy::ALL {
        let pooled = plan_payoff(&PayoffPlanInput {
            loans: loans(),
            available_monthly_payment: independent.total_monthly_payment,
            strategy,
            start_date: Some(start()),
            config: SimulationConfig::default(),
        })
        .unwrap()
        .result;

        assert_eq!(pooled.status, SimulationStatus::Completed);
        assert!(independent.debt_free_date >= pooled.debt_free_date);
        assert_ne!(independent.debt_free_date, pooled.debt_free_date);
    }
}

#[test]
fn test_negative_minimum_loan_skipped_not_fatal() {
    let mut set = loans();
    set.push(Loan {
        id: "c".into(),
        name: "Store Card".into(),
        principal: dec!(500),
        annual_rate: dec!(20),
        minimum_payment: dec!(-50),
        extra_payment: None,
        start_date: None,
        loan_type: None,
    });
    let out = project_independent_payoff(&IndependentProjectionInput {
        loans: set,
        start_date: Some(start()),
        config: SimulationConfig::default(),
    })
    .unwrap();
    let p = &out.result;

    assert_eq!(p.loans.len(), 3);
    assert_eq!(p.loans[2].payoff_date, None);
    assert_eq!(p.loans[2].months_to_payoff, 0);
    assert_eq!(p.loans[0].months_to_payoff, 21);
    assert_eq!(p.debt_free_date, Some(NaiveDate::from_ymd_opt(2027, 12, 1).unwrap()));
    assert!(out.warnings.iter().any(|w| w.contains("Store Card")));
}
