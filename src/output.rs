//! Rendering of query results as a boxed table, JSON or CSV.

use crate::db::{QueryRows, SqlValue};
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Output format for query results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// ASCII table format (default)
    #[default]
    Table,
    /// JSON array format
    Json,
    /// CSV format
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown format: {}. Valid: table, json, csv", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

/// Cap on a rendered table column
const MAX_WIDTH: usize = 50;

/// Formatter for query results
pub struct ResultFormatter;

impl ResultFormatter {
    /// Format a result set to a string
    pub fn format(result: &QueryRows, format: OutputFormat) -> String {
        match format {
            OutputFormat::Table => Self::format_table(result),
            OutputFormat::Json => Self::format_json(result),
            OutputFormat::Csv => Self::format_csv(result),
        }
    }

    /// Write formatted result to a writer
    pub fn write<W: Write>(
        result: &QueryRows,
        format: OutputFormat,
        writer: &mut W,
    ) -> std::io::Result<()> {
        writer.write_all(Self::format(result, format).as_bytes())
    }

    fn cells(result: &QueryRows) -> Vec<Vec<String>> {
        result
            .rows
            .iter()
            .map(|row| {
                result
                    .columns
                    .iter()
                    .map(|c| row.get(c).map(|v| v.to_string()).unwrap_or_default())
                    .collect()
            })
            .collect()
    }

    fn format_table(result: &QueryRows) -> String {
        if result.columns.is_empty() {
            return String::new();
        }
        let cells = Self::cells(result);

        let mut widths: Vec<usize> = result.columns.iter().map(|c| c.chars().count()).collect();
        for row in &cells {
            for (i, val) in row.iter().enumerate() {
                widths[i] = widths[i].max(val.chars().count());
            }
        }
        widths.iter_mut().for_each(|w| *w = (*w).min(MAX_WIDTH));

        let mut output = String::new();
        Self::border(&mut output, &widths, '┌', '┬', '┐');
        Self::line(&mut output, &widths, &result.columns);
        Self::border(&mut output, &widths, '├', '┼', '┤');
        for row in &cells {
            Self::line(&mut output, &widths, row);
        }
        Self::border(&mut output, &widths, '└', '┴', '┘');

        output.push_str(&format!(
            "{} row{}\n",
            cells.len(),
            if cells.len() == 1 { "" } else { "s" }
        ));
        output
    }

    fn border(output: &mut String, widths: &[usize], left: char, mid: char, right: char) {
        output.push(left);
        for (i, width) in widths.iter().enumerate() {
            output.push_str(&"─".repeat(*width + 2));
            if i < widths.len() - 1 {
                output.push(mid);
            }
        }
        output.push(right);
        output.push('\n');
    }

    fn line(output: &mut String, widths: &[usize], values: &[String]) {
        output.push('│');
        for (val, width) in values.iter().zip(widths) {
            let truncated = Self::truncate(val, *width);
            let pad = width.saturating_sub(truncated.chars().count());
            output.push(' ');
            output.push_str(&truncated);
            output.push_str(&" ".repeat(pad));
            output.push_str(" │");
        }
        output.push('\n');
    }

    /// Truncate to `max_len` characters, marking the cut with an ellipsis
    fn truncate(s: &str, max_len: usize) -> String {
        if s.chars().count() <= max_len {
            s.to_string()
        } else {
            let kept: String = s.chars().take(max_len.saturating_sub(1)).collect();
            format!("{}…", kept)
        }
    }

    fn format_json(result: &QueryRows) -> String {
        let rows: Vec<serde_json::Value> = result
            .rows
            .iter()
            .map(|row| {
                let obj: serde_json::Map<String, serde_json::Value> = row
                    .iter()
                    .map(|(col, val)| (col.to_string(), val.to_json()))
                    .collect();
                serde_json::Value::Object(obj)
            })
            .collect();

        let mut json = serde_json::to_string_pretty(&rows).unwrap_or_else(|_| "[]".to_string());
        json.push('\n');
        json
    }

    fn format_csv(result: &QueryRows) -> String {
        let mut output = String::new();
        output.push_str(&Self::csv_row(&result.columns));
        output.push('\n');
        for row in &result.rows {
            let values: Vec<String> = result
                .columns
                .iter()
                .map(|c| match row.get(c) {
                    Some(SqlValue::Null) | None => String::new(),
                    Some(v) => v.to_string(),
                })
                .collect();
            output.push_str(&Self::csv_row(&values));
            output.push('\n');
        }
        output
    }

    fn csv_row(values: &[String]) -> String {
        values
            .iter()
            .map(|v| Self::csv_escape(v))
            .collect::<Vec<_>>()
            .join(",")
    }

    fn csv_escape(val: &str) -> String {
        if val.contains(',') || val.contains('"') || val.contains('\n') || val.contains('\r') {
            format!("\"{}\"", val.replace('"', "\"\""))
        } else {
            val.to_string()
        }
    }
}

/// The last `n` lines of a plan, for compact console display
pub fn plan_tail(plan: &str, n: usize) -> String {
    let lines: Vec<&str> = plan.lines().collect();
    let start = lines.len().saturating_sub(n);
    lines[start..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Record;

    fn sample_result() -> QueryRows {
        QueryRows {
            columns: vec!["Student_ID".to_string(), "Student_Name".to_string(), "Group".to_string()],
            rows: vec![
                Record::new()
                    .with("Student_ID", 1)
                    .with("Student_Name", "Olena Koval")
                    .with("Group", 31),
                Record::new()
                    .with("Student_ID", 2)
                    .with("Student_Name", "Petro, Jr.")
                    .with("Group", SqlValue::Null),
            ],
        }
    }

    #[test]
    fn test_format_table() {
        let output = ResultFormatter::format(&sample_result(), OutputFormat::Table);
        assert!(output.contains("Olena Koval"));
        assert!(output.contains("│ Student_ID │"));
        assert!(output.contains("NULL"));
        assert!(output.ends_with("2 rows\n"));
    }

    #[test]
    fn test_format_table_single_row() {
        let mut result = sample_result();
        result.rows.truncate(1);
        let output = ResultFormatter::format(&result, OutputFormat::Table);
        assert!(output.ends_with("1 row\n"));
    }

    #[test]
    fn test_format_table_empty_columns() {
        assert_eq!(
            ResultFormatter::format(&QueryRows::default(), OutputFormat::Table),
            ""
        );
    }

    #[test]
    fn test_truncate_long_values() {
        let long = "x".repeat(80);
        let truncated = ResultFormatter::truncate(&long, MAX_WIDTH);
        assert_eq!(truncated.chars().count(), MAX_WIDTH);
        assert!(truncated.ends_with('…'));
        assert_eq!(ResultFormatter::truncate("Київ", 10), "Київ");
    }

    #[test]
    fn test_format_json() {
        let output = ResultFormatter::format(&sample_result(), OutputFormat::Json);
        let parsed: Vec<serde_json::Value> = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0]["Student_Name"], "Olena Koval");
        assert_eq!(parsed[0]["Group"], 31);
        assert!(parsed[1]["Group"].is_null());
    }

    #[test]
    fn test_format_csv() {
        let output = ResultFormatter::format(&sample_result(), OutputFormat::Csv);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "Student_ID,Student_Name,Group");
        assert_eq!(lines[1], "1,Olena Koval,31");
        assert_eq!(lines[2], "2,\"Petro, Jr.\",");
    }

    #[test]
    fn test_parse_format() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("xml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_plan_tail() {
        let plan = (1..=10).map(|i| format!("line {}", i)).collect::<Vec<_>>().join("\n");
        let tail = plan_tail(&plan, 3);
        assert_eq!(tail, "line 8\nline 9\nline 10");
        assert_eq!(plan_tail("one", 8), "one");
    }
}
