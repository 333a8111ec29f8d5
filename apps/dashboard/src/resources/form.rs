use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::errors::FormError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    TextArea,
    Email,
    Url,
    Number,
    Bool,
    Select(&'static [&'static str]),
    /// A list of strings; accepts a comma separated string too.
    Tags,
}

#[derive(Debug, Clone, Copy)]
pub struct FormField {
    /// Wire name of the field.
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl FormField {
    pub const fn required(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self { name, label, kind, required: true }
    }

    pub const fn optional(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self { name, label, kind, required: false }
    }
}

/// Local state of a create/edit dialog. Holds whatever the user typed until
/// the submission succeeds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Form {
    values: BTreeMap<String, Value>,
}

impl Form {
    pub fn empty(schema: &[FormField]) -> Self {
        let values = schema
            .iter()
            .map(|f| {
                let initial = match f.kind {
                    FieldKind::Bool => Value::Bool(false),
                    FieldKind::Tags => Value::Array(Vec::new()),
                    _ => Value::String(String::new()),
                };
                (f.name.to_string(), initial)
            })
            .collect();
        Self { values }
    }

    /// Pre-fills the form from an existing record's wire representation.
    pub fn from_record(schema: &[FormField], record: &Value) -> Self {
        let mut form = Self::empty(schema);
        for field in schema {
            if let Some(value) = record.get(field.name).filter(|v| !v.is_null()) {
                form.values.insert(field.name.to_string(), value.clone());
            }
        }
        form
    }

    pub fn set(&mut self, name: &str, value: impl Into<Value>) {
        self.values.insert(name.to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Checks the values against the schema and builds the request body.
    /// Empty optional fields are left out.
    pub fn validate(&self, schema: &[FormField]) -> Result<Value, FormError> {
        let mut body = Map::new();
        for field in schema {
            let raw = self.values.get(field.name).unwrap_or(&Value::Null);
            if let Some(value) = normalize(field, raw)? {
                body.insert(field.name.to_string(), value);
            } else if field.required {
                return Err(invalid(field, "is required"));
            }
        }
        Ok(Value::Object(body))
    }
}

fn normalize(field: &FormField, raw: &Value) -> Result<Option<Value>, FormError> {
    let text = match raw {
        Value::Null => return Ok(None),
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    };

    match field.kind {
        FieldKind::Bool => Ok(Some(match raw {
            Value::Bool(b) => Value::Bool(*b),
            _ => Value::Bool(matches!(text.as_str(), "true" | "1" | "yes" | "on")),
        })),
        FieldKind::Tags => {
            let tags: Vec<Value> = match raw {
                Value::Array(items) => items
                    .iter()
                    .filter_map(|v| v.as_str())
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(|s| Value::String(s.to_string()))
                    .collect(),
                _ => text
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(|s| Value::String(s.to_string()))
                    .collect(),
            };
            Ok((!tags.is_empty()).then_some(Value::Array(tags)))
        }
        _ if text.is_empty() => Ok(None),
        FieldKind::Email => {
            let valid = text
                .split_once('@')
                .is_some_and(|(user, domain)| !user.is_empty() && domain.contains('.') && !domain.starts_with('.'));
            if !valid {
                return Err(invalid(field, "must be a valid email address"));
            }
            Ok(Some(Value::String(text)))
        }
        FieldKind::Url => {
            if !(text.starts_with("http://") || text.starts_with("https://")) {
                return Err(invalid(field, "must start with http:// or https://"));
            }
            Ok(Some(Value::String(text)))
        }
        FieldKind::Number => {
            if let Ok(whole) = text.parse::<i64>() {
                return Ok(Some(Value::from(whole)));
            }
            let number: f64 = text.parse().map_err(|_| invalid(field, "must be a number"))?;
            serde_json::Number::from_f64(number)
                .map(|n| Some(Value::Number(n)))
                .ok_or_else(|| invalid(field, "must be a finite number"))
        }
        FieldKind::Select(options) => {
            if !options.contains(&text.as_str()) {
                return Err(invalid(field, &format!("must be one of: {}", options.join(", "))));
            }
            Ok(Some(Value::String(text)))
        }
        FieldKind::Text | FieldKind::TextArea => Ok(Some(Value::String(text))),
    }
}

fn invalid(field: &FormField, message: &str) -> FormError {
    FormError {
        field: field.name.to_string(),
        label: field.label.to_string(),
        message: message.to_string(),
    }
}
