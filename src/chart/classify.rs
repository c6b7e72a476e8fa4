//! Picking a chart kind for arbitrary data, and summarizing it.

use serde_json::{Map, Value};

use super::ChartKind;

/// A suggested chart kind and why it was picked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    pub kind: ChartKind,
    pub reason: &'static str,
}

impl Analysis {
    fn new(kind: ChartKind, reason: &'static str) -> Self {
        Self { kind, reason }
    }
}

pub fn classify(data: &Value) -> ChartKind {
    analyze(data).kind
}

pub fn analyze(data: &Value) -> Analysis {
    match data {
        Value::Array(items) => analyze_list(items),
        Value::Object(map) => analyze_map(map),
        _ => Analysis::new(ChartKind::Table, "Unknown data structure"),
    }
}

fn analyze_list(items: &[Value]) -> Analysis {
    if items.is_empty() {
        return Analysis::new(ChartKind::Table, "Empty data");
    }
    if items.iter().all(Value::is_number) {
        return if items.len() <= 10 {
            Analysis::new(ChartKind::Bar, "Small numerical dataset")
        } else {
            Analysis::new(ChartKind::Line, "Large numerical dataset")
        };
    }
    if let Some(strings) = items.iter().map(Value::as_str).collect::<Option<Vec<_>>>() {
        let mut distinct = strings;
        distinct.sort_unstable();
        distinct.dedup();
        return if distinct.len() <= 8 {
            Analysis::new(ChartKind::Pie, "Categorical data with few categories")
        } else {
            Analysis::new(ChartKind::Bar, "Categorical data with many categories")
        };
    }
    Analysis::new(ChartKind::Table, "Mixed data types")
}

fn analyze_map(map: &Map<String, Value>) -> Analysis {
    if map.is_empty() {
        return Analysis::new(ChartKind::Table, "Empty data");
    }
    if map.values().all(Value::is_number) {
        return if map.len() <= 8 {
            Analysis::new(ChartKind::Pie, "Key-value pairs suitable for pie chart")
        } else {
            Analysis::new(ChartKind::Bar, "Many key-value pairs suitable for bar chart")
        };
    }
    let time_key = map
        .keys()
        .any(|k| matches!(k.to_ascii_lowercase().as_str(), "date" | "time" | "timestamp"));
    if time_key {
        return Analysis::new(ChartKind::Line, "Time series data detected");
    }
    Analysis::new(ChartKind::Table, "Complex dictionary structure")
}

// ============================================================================
// SUMMARY STATISTICS
// ============================================================================

/// "Data Summary:" followed by one `Label: value` line per statistic.
pub fn summary_lines(data: &Value) -> Vec<String> {
    let mut lines = vec!["Data Summary:".to_string()];
    match data {
        Value::Array(items) => match numbers(items.iter()) {
            Some(values) if !values.is_empty() => {
                let n = values.len();
                let mean = mean(&values);
                lines.push(format!("Count: {}", n));
                lines.push(format!("Mean: {:.2}", mean));
                lines.push(format!("Median: {:.2}", median(&values)));
                lines.push(format!("Min: {:.2}", values.iter().copied().fold(f64::INFINITY, f64::min)));
                lines.push(format!("Max: {:.2}", values.iter().copied().fold(f64::NEG_INFINITY, f64::max)));
                if n > 1 {
                    lines.push(format!("Std Dev: {:.2}", sample_std_dev(&values, mean)));
                }
            }
            _ => {
                lines.push(format!("Items: {}", items.len()));
                lines.push("Type: list".to_string());
            }
        },
        Value::Object(map) => {
            lines.push(format!("Categories: {}", map.len()));
            if let Some(values) = numbers(map.values()).filter(|v| !v.is_empty()) {
                lines.push(format!("Total: {:.2}", values.iter().sum::<f64>()));
                lines.push(format!("Average: {:.2}", mean(&values)));
            }
        }
        Value::String(s) => {
            lines.push(format!("Items: {}", s.chars().count()));
            lines.push("Type: string".to_string());
        }
        other => {
            lines.push("Items: Unknown".to_string());
            lines.push(format!("Type: {}", type_name(other)));
        }
    }
    lines
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "map",
    }
}

/// All values as `f64`, or `None` if any is not a number.
pub(crate) fn numbers<'a>(values: impl Iterator<Item = &'a Value>) -> Option<Vec<f64>> {
    values.map(Value::as_f64).collect()
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

fn sample_std_dev(values: &[f64], mean: f64) -> f64 {
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_numeric_lists() {
        assert_eq!(classify(&json!([1, 2, 3])), ChartKind::Bar);
        assert_eq!(classify(&json!([1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11])), ChartKind::Line);
        assert_eq!(classify(&json!([1, 2, 3, 4, 5, 6, 7, 8, 9, 10])), ChartKind::Bar);
    }

    #[test]
    fn test_string_lists() {
        assert_eq!(classify(&json!(["a", "b", "a"])), ChartKind::Pie);
        let many: Vec<String> = (0..9).map(|i| format!("c{}", i)).collect();
        assert_eq!(classify(&json!(many)), ChartKind::Bar);
    }

    #[test]
    fn test_maps() {
        assert_eq!(classify(&json!({"a": 1, "b": 2})), ChartKind::Pie);
        let many: serde_json::Map<String, Value> = (0..9).map(|i| (format!("k{}", i), json!(i))).collect();
        assert_eq!(classify(&Value::Object(many)), ChartKind::Bar);
        assert_eq!(classify(&json!({"Date": ["2024-01-01"], "v": [1]})), ChartKind::Line);
        assert_eq!(classify(&json!({"a": "x"})), ChartKind::Table);
    }

    #[test]
    fn test_fallbacks() {
        assert_eq!(analyze(&json!([])).reason, "Empty data");
        assert_eq!(classify(&json!({})), ChartKind::Table);
        assert_eq!(classify(&json!([1, "a"])), ChartKind::Table);
        assert_eq!(classify(&json!("text")), ChartKind::Table);
    }

    #[test]
    fn test_summary_numeric() {
        let lines = summary_lines(&json!([1, 2, 3, 4]));
        assert_eq!(
            lines,
            vec![
                "Data Summary:",
                "Count: 4",
                "Mean: 2.50",
                "Median: 2.50",
                "Min: 1.00",
                "Max: 4.00",
                "Std Dev: 1.29",
            ]
        );
        assert!(!summary_lines(&json!([5])).iter().any(|l| l.starts_with("Std Dev")));
    }

    #[test]
    fn test_summary_map() {
        let lines = summary_lines(&json!({"a": 1, "b": 3}));
        assert_eq!(lines, vec!["Data Summary:", "Categories: 2", "Total: 4.00", "Average: 2.00"]);
        let mixed = summary_lines(&json!({"a": "x"}));
        assert_eq!(mixed, vec!["Data Summary:", "Categories: 1"]);
    }
}
