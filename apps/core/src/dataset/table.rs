use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};

/// Column holding course names.
pub const COURSE_NAME: &str = "Course Name";
/// Column holding open positions.
pub const JOB_OPENING: &str = "Job Opening";
/// Column holding course schedules.
pub const COURSE_TIMING: &str = "Course Timing";

/// Read-only snapshot of the HR spreadsheet.
///
/// Each column maps to its distinct non-empty values in first-seen order. Cells
/// are trimmed; `null` and blank cells are dropped. Numbers and booleans keep
/// their JSON text form so a timing typed as `9` still shows up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    columns: HashMap<String, Vec<String>>,
    rows: usize,
}

impl Table {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a snapshot from spreadsheet records (one JSON object per row).
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = Map<String, Value>>,
    {
        let mut columns: HashMap<String, Vec<String>> = HashMap::new();
        let mut seen: HashMap<String, HashSet<String>> = HashMap::new();
        let mut rows = 0;

        for record in records {
            rows += 1;
            for (column, cell) in record {
                let Some(text) = cell_text(&cell) else {
                    continue;
                };
                let column_seen = seen.entry(column.clone()).or_default();
                if column_seen.insert(text.clone()) {
                    columns.entry(column).or_default().push(text);
                }
            }
        }

        Self { columns, rows }
    }

    /// Builds a snapshot straight from column lists, applying the same rules as records.
    #[cfg(test)]
    pub fn from_columns<I, C, V>(columns: I) -> Self
    where
        I: IntoIterator<Item = (C, Vec<V>)>,
        C: Into<String>,
        V: Into<String>,
    {
        let mut table = Self::empty();
        for (column, values) in columns {
            let mut seen = HashSet::new();
            table.rows = table.rows.max(values.len());
            let distinct: Vec<String> = values
                .into_iter()
                .map(|v| v.into().trim().to_string())
                .filter(|v| !v.is_empty() && seen.insert(v.clone()))
                .collect();
            table.columns.insert(column.into(), distinct);
        }
        table
    }

    /// Distinct non-empty values of a column. Missing columns yield an empty slice.
    pub fn values(&self, column: &str) -> &[String] {
        self.columns.get(column).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.columns.values().all(Vec::is_empty)
    }
}

fn cell_text(cell: &Value) -> Option<String> {
    let text = match cell {
        Value::Null => return None,
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        // nested values do not occur in sheet exports; skip rather than guess
        Value::Array(_) | Value::Object(_) => return None,
    };
    (!text.is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records(value: Value) -> Vec<Map<String, Value>> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_distinct_values_keep_first_seen_order() {
        let table = Table::from_records(records(json!([
            {"Course Name": "Python", "Job Opening": ""},
            {"Course Name": "Java", "Job Opening": "HR Assistant"},
            {"Course Name": "Python", "Job Opening": "HR Assistant"},
        ])));

        assert_eq!(table.values(COURSE_NAME), ["Python", "Java"]);
        assert_eq!(table.values(JOB_OPENING), ["HR Assistant"]);
        assert_eq!(table.row_count(), 3);
    }

    #[test]
    fn test_blank_null_and_missing_cells() {
        let table = Table::from_records(records(json!([
            {"Course Timing": "  "},
            {"Course Timing": null},
            {"Course Timing": " 10am - 12pm "},
        ])));

        assert_eq!(table.values(COURSE_TIMING), ["10am - 12pm"]);
        assert!(table.values(COURSE_NAME).is_empty());
        assert!(table.values(JOB_OPENING).is_empty());
    }

    #[test]
    fn test_scalar_cells_are_rendered() {
        let table = Table::from_records(records(json!([
            {"Course Timing": 9},
            {"Course Timing": "9"},
        ])));
        assert_eq!(table.values(COURSE_TIMING), ["9"]);
    }

    #[test]
    fn test_from_columns_matches_record_rules() {
        let table = Table::from_columns([(COURSE_NAME, vec!["Python", "Java", "Python", ""])]);
        assert_eq!(table.values(COURSE_NAME), ["Python", "Java"]);
        assert!(!table.is_empty());
        assert!(Table::empty().is_empty());
    }
}
