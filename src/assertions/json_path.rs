//! Dot/bracket paths into a JSON document, e.g. `data.items[0].name`

use std::fmt;

use serde_json::Value;
use thiserror::Error;

/// One step of a path
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathToken {
    Field(String),
    Index(usize),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("invalid path: empty segment in '{0}'")]
    EmptySegment(String),

    #[error("invalid path: unclosed '[' in '{0}'")]
    UnclosedBracket(String),

    #[error("invalid path: '{0}' is not an array index")]
    InvalidIndex(String),

    #[error("invalid path: unexpected text after ']' in '{0}'")]
    TrailingText(String),

    #[error("field '{field}' not found")]
    MissingField { field: String },

    #[error("cannot read field '{field}' from {found}")]
    NotAnObject { field: String, found: &'static str },

    #[error("index {index} out of range (length {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("cannot index {found} with [{index}]")]
    NotAnArray { index: usize, found: &'static str },
}

/// A parsed path. An empty path addresses the document root.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct JsonPath {
    tokens: Vec<PathToken>,
}

impl JsonPath {
    pub fn parse(input: &str) -> Result<Self, PathError> {
        let trimmed = input.trim();
        let rest = match trimmed.strip_prefix('$') {
            Some(after) => after.strip_prefix('.').unwrap_or(after),
            None => trimmed,
        };

        let mut tokens = Vec::new();
        if rest.is_empty() {
            return Ok(JsonPath { tokens });
        }

        for segment in rest.split('.') {
            parse_segment(segment, input, &mut tokens)?;
        }
        Ok(JsonPath { tokens })
    }

    pub fn tokens(&self) -> &[PathToken] {
        &self.tokens
    }

    /// Walks `root` along the path
    pub fn resolve<'a>(&self, root: &'a Value) -> Result<&'a Value, PathError> {
        let mut current = root;
        for token in &self.tokens {
            current = match (token, current) {
                (PathToken::Field(field), Value::Object(map)) => {
                    map.get(field).ok_or_else(|| PathError::MissingField {
                        field: field.clone(),
                    })?
                }
                (PathToken::Field(field), other) => {
                    return Err(PathError::NotAnObject {
                        field: field.clone(),
                        found: type_name(other),
                    })
                }
                (PathToken::Index(index), Value::Array(items)) => {
                    items.get(*index).ok_or(PathError::IndexOutOfRange {
                        index: *index,
                        len: items.len(),
                    })?
                }
                (PathToken::Index(index), other) => {
                    return Err(PathError::NotAnArray {
                        index: *index,
                        found: type_name(other),
                    })
                }
            };
        }
        Ok(current)
    }
}

fn parse_segment(segment: &str, input: &str, tokens: &mut Vec<PathToken>) -> Result<(), PathError> {
    let (name, mut rest) = match segment.find('[') {
        Some(i) => (&segment[..i], &segment[i..]),
        None => (segment, ""),
    };

    if name.is_empty() && rest.is_empty() {
        return Err(PathError::EmptySegment(input.to_string()));
    }
    if name.contains(']') {
        return Err(PathError::TrailingText(input.to_string()));
    }
    if !name.is_empty() {
        tokens.push(PathToken::Field(name.to_string()));
    }

    while !rest.is_empty() {
        let close = rest
            .find(']')
            .ok_or_else(|| PathError::UnclosedBracket(input.to_string()))?;
        let inner = rest[1..close].trim();
        let index = inner
            .parse::<usize>()
            .map_err(|_| PathError::InvalidIndex(inner.to_string()))?;
        tokens.push(PathToken::Index(index));

        rest = &rest[close + 1..];
        if !rest.is_empty() && !rest.starts_with('[') {
            return Err(PathError::TrailingText(input.to_string()));
        }
    }
    Ok(())
}

pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.tokens.is_empty() {
            return f.write_str("$");
        }
        for (i, token) in self.tokens.iter().enumerate() {
            match token {
                PathToken::Field(name) if i == 0 => write!(f, "{}", name)?,
                PathToken::Field(name) => write!(f, ".{}", name)?,
                PathToken::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}
