use serde_json::Value;

/// Priority list of key output fields
const PRIORITY_KEYS: [&str; 7] = [
    "debt_free_date",
    "payoff_date",
    "months_saved",
    "interest_saved",
    "total_interest",
    "total_months",
    "number_of_payments",
];

/// Print just the key answer value from the output.
///
/// Heuristic: look for well-known result fields in order of priority,
/// then fall back to the first field in the result object.
pub fn print_minimal(value: &Value) {
    for line in minimal_lines(value) {
        println!("{}", line);
    }
}

fn minimal_lines(value: &Value) -> Vec<String> {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    // Detailed plans carry the headline under "summary"
    let result_obj = result_obj
        .as_object()
        .and_then(|m| m.get("summary"))
        .unwrap_or(result_obj);

    let Value::Object(map) = result_obj else {
        return vec![format_minimal(result_obj)];
    };

    // A comparison answers with one line per strategy
    if let (Some(snow), Some(aval)) = (map.get("snowball"), map.get("avalanche")) {
        return [("snowball", snow), ("avalanche", aval)]
            .into_iter()
            .map(|(label, res)| match unfinished_status(res) {
                Some(status) => format!("{}: {}", label, status),
                None => {
                    let date = res.get("debt_free_date").unwrap_or(&Value::Null);
                    let interest = res.get("total_interest").unwrap_or(&Value::Null);
                    format!("{}: {} {}", label, format_minimal(date), format_minimal(interest))
                }
            })
            .collect();
    }

    // A run that never finished has no headline figure worth showing
    if let Some(status) = unfinished_status(result_obj) {
        return vec![status.to_string()];
    }

    // Try priority keys first (skip null values)
    for key in &PRIORITY_KEYS {
        if let Some(val) = map.get(*key) {
            if !val.is_null() {
                return vec![format_minimal(val)];
            }
        }
    }

    // Fall back to first field
    match map.iter().next() {
        Some((key, val)) => vec![format!("{}: {}", key, format_minimal(val))],
        None => vec![format_minimal(result_obj)],
    }
}

fn unfinished_status(result: &Value) -> Option<&str> {
    result
        .get("status")
        .and_then(Value::as_str)
        .filter(|s| *s != "completed")
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_infeasible_plan_prints_status() {
        let out = json!({
            "result": {
                "status": "infeasible_budget",
                "debt_free_date": null,
                "total_interest": "0",
            },
            "warnings": [],
        });
        assert_eq!(minimal_lines(&out), vec!["infeasible_budget"]);
    }

    #[test]
    fn test_completed_plan_prints_debt_free_date() {
        let out = json!({
            "result": {
                "status": "completed",
                "debt_free_date": "2027-05-01",
                "total_interest": "2128.20",
            },
        });
        assert_eq!(minimal_lines(&out), vec!["2027-05-01"]);
    }

    #[test]
    fn test_comparison_reports_status_per_strategy() {
        let out = json!({
            "result": {
                "snowball": {
                    "status": "truncated_at_limit",
                    "debt_free_date": null,
                    "total_interest": "9000",
                },
                "avalanche": {
                    "status": "completed",
                    "debt_free_date": "2030-01-01",
                    "total_interest": "8000",
                },
            },
        });
        assert_eq!(
            minimal_lines(&out),
            vec!["snowball: truncated_at_limit", "avalanche: 2030-01-01 8000"]
        );
    }

    #[test]
    fn test_detailed_summary_unwrapped() {
        let out = json!({
            "result": {
                "summary": {"status": "infeasible_budget", "debt_free_date": null},
                "monthly_payments": [],
            },
        });
        assert_eq!(minimal_lines(&out), vec!["infeasible_budget"]);
    }
}
