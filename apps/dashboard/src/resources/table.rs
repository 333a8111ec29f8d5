use serde_json::Value;

use crate::models::ListItem;

#[derive(Debug, Clone, Copy)]
pub struct Column {
    /// Wire name of the field shown in this column.
    pub key: &'static str,
    pub label: &'static str,
}

impl Column {
    pub const fn new(key: &'static str, label: &'static str) -> Self {
        Self { key, label }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub id: String,
    pub cells: Vec<String>,
    pub active: bool,
}

/// Plain-text table for one page of records.
#[derive(Debug, Clone, PartialEq)]
pub struct TableView {
    pub headers: Vec<&'static str>,
    pub rows: Vec<TableRow>,
    /// Set when there are no rows.
    pub empty_message: Option<&'static str>,
}

impl TableView {
    pub fn build<T: ListItem>(columns: &[Column], items: &[T], empty_message: &'static str) -> Self {
        let rows: Vec<TableRow> = items
            .iter()
            .map(|item| {
                let record = serde_json::to_value(item).unwrap_or(Value::Null);
                TableRow {
                    id: item.id().to_string(),
                    cells: columns.iter().map(|c| cell_text(record.get(c.key))).collect(),
                    active: item.is_active(),
                }
            })
            .collect();

        Self {
            headers: columns.iter().map(|c| c.label).collect(),
            empty_message: rows.is_empty().then_some(empty_message),
            rows,
        }
    }

    pub fn row(&self, id: &str) -> Option<&TableRow> {
        self.rows.iter().find(|r| r.id == id)
    }
}

fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "-".to_string(),
        Some(Value::String(s)) if s.is_empty() => "-".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(true)) => "Yes".to_string(),
        Some(Value::Bool(false)) => "No".to_string(),
        Some(Value::Array(items)) if items.is_empty() => "-".to_string(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| cell_text(Some(v)))
            .collect::<Vec<_>>()
            .join(", "),
        Some(other) => other.to_string(),
    }
}
