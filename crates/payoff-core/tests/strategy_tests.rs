use chrono::NaiveDate;
use payoff_core::strategy::compare::{compare_strategies, StrategyComparisonInput};
use payoff_core::strategy::ordering::PayoffStrategy;
use payoff_core::strategy::planner::{plan_payoff, plan_payoff_detailed, PayoffPlanInput};
use payoff_core::{Loan, Money, Percent, SimulationConfig, SimulationStatus};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
}

fn loan(id: &str, principal: Money, rate: Percent, minimum: Money) -> Loan {
    Loan {
        id: id.into(),
        name: format!("Loan {}", id.to_uppercase()),
        principal,
        annual_rate: rate,
        minimum_payment: minimum,
        extra_payment: None,
        start_date: None,
        loan_type: None,
    }
}

fn plan_input(loans: Vec<Loan>, budget: Money, strategy: PayoffStrategy) -> PayoffPlanInput {
    PayoffPlanInput {
        loans,
        available_monthly_payment: budget,
        strategy,
        start_date: Some(start()),
        config: SimulationConfig::default(),
    }
}

// ===========================================================================
// Divergent ordering
// ===========================================================================

fn divergent() -> Vec<Loan> {
    vec![
        loan("a", dec!(2000), dec!(5), dec!(100)),
        loan("b", dec!(9000), dec!(18), dec!(100)),
    ]
}

#[test]
fn test_snowball_and_avalanche_pick_different_targets() {
    let snow = plan_payoff_detailed(&plan_input(divergent(), dec!(500), PayoffStrategy::Snowball))
        .unwrap()
        .result;
    let aval = plan_payoff_detailed(&plan_input(divergent(), dec!(500), PayoffStrategy::Avalanche))
        .unwrap()
        .result;

    let focus = |months: &[payoff_core::strategy::planner::MonthlyStrategyPayment]| {
        months[0]
            .loan_payments
            .iter()
            .find(|p| p.is_focus)
            .map(|p| p.loan_id.clone())
            .unwrap()
    };
    assert_eq!(focus(&snow.monthly_payments), "a");
    assert_eq!(focus(&aval.monthly_payments), "b");

    let ranks = |plans: &[payoff_core::strategy::planner::PayoffPlan]| {
        let mut r: Vec<(String, u32)> = plans
            .iter()
            .map(|p| (p.loan_id.clone(), p.priority_rank))
            .collect();
        r.sort();
        r
    };
    assert_ne!(
        ranks(&snow.summary.payoff_plans),
        ranks(&aval.summary.payoff_plans)
    );
}

#[test]
fn test_divergent_payoff_sequence() {
    // A stays smaller but B carries the higher rate, and neither minimum
    // alone clears its loan before the focused one
    let loans = vec![
        loan("a", dec!(3000), dec!(7), dec!(90)),
        loan("b", dec!(7000), dec!(11), dec!(150)),
    ];
    let snow = plan_payoff(&plan_input(loans.clone(), dec!(396.67), PayoffStrategy::Snowball))
        .unwrap()
        .result;
    let aval = plan_payoff(&plan_input(loans, dec!(396.67), PayoffStrategy::Avalanche))
        .unwrap()
        .result;

    let order = |r: &payoff_core::strategy::planner::StrategyResult| {
        r.payoff_plans.iter().map(|p| p.loan_id.clone()).collect::<Vec<_>>()
    };
    assert_eq!(order(&snow), vec!["a", "b"]);
    assert_eq!(order(&aval), vec!["b", "a"]);
    assert!(aval.total_interest < snow.total_interest);
}

// ===========================================================================
// Conservation and bounds
// ===========================================================================

#[test]
fn test_payoff_event_releases_exact_minimum() {
    let loans = vec![
        loan("card", dec!(900), dec!(21), dec!(40)),
        loan("car", dec!(5200), dec!(6.9), dec!(160)),
        loan("loan", dec!(11000), dec!(8.5), dec!(140)),
    ];
    let budget = dec!(650);
    let detail = plan_payoff_detailed(&plan_input(loans.clone(), budget, PayoffStrategy::Snowball))
        .unwrap()
        .result;
    let months = &detail.monthly_payments;
    let initial_extra = budget - loans.iter().map(|l| l.minimum_payment).sum::<Decimal>();

    let mut before = initial_extra;
    for m in months {
        let freed: Decimal = m
            .loan_payments
            .iter()
            .filter(|p| p.paid_off)
            .map(|p| {
                loans
                    .iter()
                    .find(|l| l.id == p.loan_id)
                    .map(|l| l.minimum_payment)
                    .unwrap()
            })
            .sum();
        assert_eq!(m.available_extra, before + freed);
        assert_eq!(m.available_extra + m.remaining_minimums, budget);
        before = m.available_extra;
    }
    assert_eq!(before, budget);
}

#[test]
fn test_total_payment_never_exceeds_budget() {
    let loans = vec![
        loan("card", dec!(900), dec!(21), dec!(40)),
        loan("car", dec!(5200), dec!(6.9), dec!(160)),
    ];
    let detail = plan_payoff_detailed(&plan_input(loans, dec!(400), PayoffStrategy::Avalanche))
        .unwrap()
        .result;
    let epsilon = SimulationConfig::default().epsilon;
    for m in &detail.monthly_payments {
        let retired = m.loan_payments.iter().filter(|p| p.paid_off).count();
        let ceiling = dec!(400) + epsilon * Decimal::from(retired as u32);
        assert!(m.total_payment <= ceiling, "month {} paid {}", m.month, m.total_payment);
        if retired == 0 {
            assert!(m.total_payment <= dec!(400));
        }
    }
}

#[test]
fn test_infeasible_is_distinct_from_empty() {
    let infeasible = plan_payoff(&plan_input(divergent(), dec!(199.99), PayoffStrategy::Snowball))
        .unwrap()
        .result;
    let empty = plan_payoff(&plan_input(Vec::new(), dec!(0), PayoffStrategy::Snowball))
        .unwrap()
        .result;

    assert_eq!(infeasible.status, SimulationStatus::InfeasibleBudget);
    assert_eq!(infeasible.debt_free_date, None);
    assert_eq!(infeasible.budget_shortfall, dec!(0.01));
    assert_eq!(empty.status, SimulationStatus::Completed);
    assert!(empty.debt_free_date.is_some());
}

#[test]
fn test_configurable_ceiling() {
    let mut input = plan_input(divergent(), dec!(200), PayoffStrategy::Avalanche);
    input.config.max_periods = 24;
    let out = plan_payoff(&input).unwrap();

    assert_eq!(out.result.status, SimulationStatus::TruncatedAtLimit);
    assert!(!out.result.remaining_loans.is_empty());
    assert_eq!(out.result.total_months, 24);
    assert!(out.warnings.iter().any(|w| w.contains("24-period ceiling")));
}

// ===========================================================================
// Comparison
// ===========================================================================

#[test]
fn test_comparison_from_json() {
    let input: StrategyComparisonInput = serde_json::from_str(
        r#"{
            "loans": [
                {"id": "a", "name": "Loan A", "principal": "2000", "annual_rate": "5", "minimum_payment": "100"},
                {"id": "b", "name": "Loan B", "principal": "9000", "annual_rate": "18", "minimum_payment": "100"}
            ],
            "available_monthly_payment": "500",
            "start_date": "2025-01-01"
        }"#,
    )
    .unwrap();
    let cmp = compare_strategies(&input).unwrap().result;

    assert_eq!(cmp.snowball.strategy, PayoffStrategy::Snowball);
    assert_eq!(cmp.avalanche.strategy, PayoffStrategy::Avalanche);
    assert!(cmp.snowball.is_completed() && cmp.avalanche.is_completed());
    assert!(cmp.avalanche.total_interest < cmp.snowball.total_interest);
    assert!(cmp.avalanche.debt_free_date <= cmp.snowball.debt_free_date);
}
