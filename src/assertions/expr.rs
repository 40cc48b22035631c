//! Building assertions from the short text forms typed into a test tab:
//! `200`, `1000`, `X-Request-Id`, `Content-Type: application/json`,
//! `data.id == 123`.

use super::{Comparison, TestAssertion};
use crate::error::AssertionParseError;

impl TestAssertion {
    pub fn parse(kind: &str, expression: &str) -> Result<Self, AssertionParseError> {
        let expression = expression.trim();
        match kind.trim().to_lowercase().as_str() {
            "status_code" | "status" => expression
                .parse::<u16>()
                .map(|expected| TestAssertion::StatusCode { expected })
                .map_err(|_| AssertionParseError::InvalidStatus(expression.to_string())),
            "response_time" | "time" => expression
                .trim_end_matches("ms")
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|ms| ms.is_finite() && *ms >= 0.0)
                .map(|max_ms| TestAssertion::ResponseTime { max_ms })
                .ok_or_else(|| AssertionParseError::InvalidThreshold(expression.to_string())),
            "header_exists" => {
                if expression.is_empty() {
                    Err(AssertionParseError::EmptyHeader)
                } else {
                    Ok(TestAssertion::HeaderExists { name: expression.to_string() })
                }
            }
            "header_value" => match expression.split_once(':') {
                Some((name, value)) if !name.trim().is_empty() => Ok(TestAssertion::HeaderValue {
                    name: name.trim().to_string(),
                    expected: value.trim().to_string(),
                }),
                _ => Err(AssertionParseError::InvalidHeaderValue(expression.to_string())),
            },
            "json_path" => parse_json_path(expression),
            other => Err(AssertionParseError::UnknownKind(other.to_string())),
        }
    }
}

/// Splits at the leftmost operator; at one position, two-character
/// operators win over their one-character prefixes.
fn parse_json_path(expression: &str) -> Result<TestAssertion, AssertionParseError> {
    let invalid = || AssertionParseError::InvalidJsonPath(expression.to_string());

    let (at, op) = expression
        .char_indices()
        .find_map(|(i, _)| {
            Comparison::ALL
                .into_iter()
                .find(|op| expression[i..].starts_with(op.symbol()))
                .map(|op| (i, op))
        })
        .ok_or_else(invalid)?;

    let path = expression[..at].trim();
    let expected = expression[at + op.symbol().len()..].trim();
    if path.is_empty() {
        return Err(invalid());
    }

    Ok(TestAssertion::JsonPath {
        path: path.to_string(),
        op,
        expected: expected.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_kinds() {
        assert_eq!(
            TestAssertion::parse("status_code", " 201 ").unwrap(),
            TestAssertion::StatusCode { expected: 201 }
        );
        assert_eq!(
            TestAssertion::parse("response_time", "750ms").unwrap(),
            TestAssertion::ResponseTime { max_ms: 750.0 }
        );
        assert_eq!(
            TestAssertion::parse("header_exists", "X-Request-Id").unwrap(),
            TestAssertion::HeaderExists { name: "X-Request-Id".into() }
        );
        assert_eq!(
            TestAssertion::parse("header_value", "Content-Type: application/json; charset=utf-8").unwrap(),
            TestAssertion::HeaderValue {
                name: "Content-Type".into(),
                expected: "application/json; charset=utf-8".into(),
            }
        );
    }

    #[test]
    fn test_parse_json_path_operators() {
        assert_eq!(
            TestAssertion::parse("json_path", "data.id == 123").unwrap(),
            TestAssertion::JsonPath {
                path: "data.id".into(),
                op: Comparison::Eq,
                expected: "123".into(),
            }
        );
        assert!(matches!(
            TestAssertion::parse("json_path", "count>=3").unwrap(),
            TestAssertion::JsonPath { op: Comparison::Ge, .. }
        ));
        assert!(matches!(
            TestAssertion::parse("json_path", "items[0].qty < 10").unwrap(),
            TestAssertion::JsonPath { op: Comparison::Lt, .. }
        ));
        assert!(matches!(
            TestAssertion::parse("json_path", "name != \"a==b\"").unwrap(),
            TestAssertion::JsonPath { op: Comparison::Ne, .. }
        ));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(matches!(
            TestAssertion::parse("status_code", "ok"),
            Err(AssertionParseError::InvalidStatus(_))
        ));
        assert!(matches!(
            TestAssertion::parse("header_value", "no colon"),
            Err(AssertionParseError::InvalidHeaderValue(_))
        ));
        assert!(matches!(
            TestAssertion::parse("json_path", "data.id"),
            Err(AssertionParseError::InvalidJsonPath(_))
        ));
        assert!(matches!(
            TestAssertion::parse("json_path", "== 3"),
            Err(AssertionParseError::InvalidJsonPath(_))
        ));
        assert!(matches!(
            TestAssertion::parse("body_contains", "x"),
            Err(AssertionParseError::UnknownKind(_))
        ));
    }
}
