//! Extraction of execution time from analyzed plan text.

use once_cell::sync::Lazy;
use regex::Regex;

/// `Execution Time: 1.234 ms` or DuckDB's `Total Time: 0.0012s`
static TIMING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:execution time:\s*([0-9]+(?:\.[0-9]+)?)\s*ms)|(?:total time:\s*([0-9]+(?:\.[0-9]+)?)\s*s)")
        .unwrap()
});

/// Milliseconds reported by the last timing marker in `plan`
pub fn parse_execution_ms(plan: &str) -> Option<f64> {
    let caps = TIMING_RE.captures_iter(plan).last()?;
    if let Some(ms) = caps.get(1) {
        return ms.as_str().parse().ok();
    }
    caps.get(2)
        .and_then(|s| s.as_str().parse::<f64>().ok())
        .map(|secs| secs * 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_time_ms() {
        let plan = "Seq Scan on student\nPlanning Time: 0.1 ms\nExecution Time: 2.345 ms";
        assert_eq!(parse_execution_ms(plan), Some(2.345));
    }

    #[test]
    fn test_total_time_seconds() {
        let plan = "┌─────────────────────────────┐\n│    Total Time: 0.0125s      │\n└─────────────────────────────┘";
        let ms = parse_execution_ms(plan).unwrap();
        assert!((ms - 12.5).abs() < 1e-9);
    }

    #[test]
    fn test_last_marker_wins() {
        let plan = "Total Time: 1s\nExecution Time: 3 ms";
        assert_eq!(parse_execution_ms(plan), Some(3.0));
    }

    #[test]
    fn test_missing_marker() {
        assert_eq!(parse_execution_ms("HASH_GROUP_BY\nPROJECTION"), None);
        assert_eq!(parse_execution_ms(""), None);
    }
}
