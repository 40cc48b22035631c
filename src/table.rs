//! Flat tabular projection of a JSON response, handed to the charting side
//!
//! Objects become rows. Nested objects turn into dotted column names
//! (`address.city`); arrays are kept whole as cells.

use serde_json::{Map, Value};

use crate::assertions::json_path::type_name;
use crate::error::TableError;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(|row| &row[idx]).collect())
    }

    /// Columns whose non-null cells are all numbers (and not all null)
    pub fn numeric_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(idx, _)| {
                let mut cells = self.rows.iter().map(|row| &row[*idx]).filter(|v| !v.is_null());
                let mut any = false;
                let all_numbers = cells.all(|v| {
                    any = true;
                    v.is_number()
                });
                any && all_numbers
            })
            .map(|(_, name)| name.as_str())
            .collect()
    }

    /// First `n` rows, for previews
    pub fn head(&self, n: usize) -> Table {
        Table {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }

    /// Tab-separated rendering with a header line
    pub fn to_tsv(&self) -> String {
        let mut out = self.columns.join("\t");
        for row in &self.rows {
            out.push('\n');
            let cells: Vec<String> = row
                .iter()
                .map(|v| match v {
                    Value::String(s) => s.clone(),
                    Value::Null => String::new(),
                    other => other.to_string(),
                })
                .collect();
            out.push_str(&cells.join("\t"));
        }
        out
    }
}

/// Projects an object or a non-empty array of objects into a table.
/// At least one record must have a field.
pub fn flatten(json: &Value) -> Result<Table, TableError> {
    let records: Vec<&Map<String, Value>> = match json {
        Value::Object(map) => vec![map],
        Value::Array(items) if items.is_empty() => return Err(TableError::Empty),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Object(map) => Ok(map),
                other => Err(TableError::NotTabular(format!(
                    "an array containing {}",
                    type_name(other)
                ))),
            })
            .collect::<Result<_, _>>()?,
        scalar => return Err(TableError::NotTabular(type_name(scalar).to_string())),
    };

    let mut columns: Vec<String> = Vec::new();
    let flat: Vec<Vec<(String, Value)>> = records
        .into_iter()
        .map(|record| {
            let mut cells = Vec::new();
            flatten_into(record, "", &mut cells);
            for (name, _) in &cells {
                if !columns.contains(name) {
                    columns.push(name.clone());
                }
            }
            cells
        })
        .collect();

    if columns.is_empty() {
        return Err(TableError::NotTabular("objects without fields".to_string()));
    }

    let rows = flat
        .into_iter()
        .map(|cells| {
            columns
                .iter()
                .map(|col| {
                    cells
                        .iter()
                        .find(|(name, _)| name == col)
                        .map(|(_, v)| v.clone())
                        .unwrap_or(Value::Null)
                })
                .collect()
        })
        .collect();

    Ok(Table { columns, rows })
}

fn flatten_into(map: &Map<String, Value>, prefix: &str, out: &mut Vec<(String, Value)>) {
    for (key, value) in map {
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        match value {
            Value::Object(inner) if !inner.is_empty() => flatten_into(inner, &name, out),
            other => out.push((name, other.clone())),
        }
    }
}
