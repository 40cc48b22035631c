//! Assertion evaluation against a received response

use std::borrow::Cow;
use std::cell::OnceCell;

use serde_json::Value;

use super::json_path::{JsonPath, PathError};
use super::{Comparison, TestAssertion, TestResult};
use crate::models::ResponseData;

const NOT_FOUND: &str = "not found";

/// Evaluates every assertion independently, one result per assertion in
/// the same order. Never fails: problems become failed results.
pub fn evaluate(response: &ResponseData, assertions: &[TestAssertion]) -> Vec<TestResult> {
    let body = OnceCell::new();
    let results: Vec<TestResult> = assertions
        .iter()
        .enumerate()
        .map(|(index, assertion)| {
            let check = check(response, assertion, &body);
            TestResult {
                index,
                assertion: assertion.clone(),
                passed: check.passed,
                message: check.message,
                actual: check.actual,
            }
        })
        .collect();

    tracing::debug!(
        total = results.len(),
        failed = results.iter().filter(|r| !r.passed).count(),
        "Assertions evaluated"
    );
    results
}

struct Check {
    passed: bool,
    message: String,
    actual: String,
}

impl Check {
    fn pass(message: String, actual: impl Into<String>) -> Self {
        Check { passed: true, message, actual: actual.into() }
    }

    fn fail(message: String, actual: impl Into<String>) -> Self {
        Check { passed: false, message, actual: actual.into() }
    }
}

fn check<'a>(
    response: &'a ResponseData,
    assertion: &TestAssertion,
    body: &OnceCell<Result<Cow<'a, Value>, String>>,
) -> Check {
    match assertion {
        TestAssertion::StatusCode { expected } => {
            let actual = response.status.to_string();
            if response.status == *expected {
                Check::pass(format!("status is {}", expected), actual)
            } else {
                Check::fail(format!("expected status {}, got {}", expected, actual), actual)
            }
        }
        TestAssertion::ResponseTime { max_ms } => {
            let actual = response.elapsed_ms.to_string();
            if response.elapsed_ms <= *max_ms {
                Check::pass(format!("responded in {} ms (limit {} ms)", actual, max_ms), actual)
            } else {
                Check::fail(format!("took {} ms, limit is {} ms", actual, max_ms), actual)
            }
        }
        TestAssertion::HeaderExists { name } => match response.header(name) {
            Some(value) => Check::pass(format!("header '{}' present", name), value),
            None => Check::fail(format!("header '{}' missing", name), NOT_FOUND),
        },
        TestAssertion::HeaderValue { name, expected } => match response.header(name) {
            Some(value) if value == expected => {
                Check::pass(format!("header '{}' is '{}'", name, expected), value)
            }
            Some(value) => Check::fail(
                format!("header '{}' is '{}', expected '{}'", name, value, expected),
                value,
            ),
            None => Check::fail(format!("header '{}' missing", name), NOT_FOUND),
        },
        TestAssertion::JsonPath { path, op, expected } => {
            let parsed = body.get_or_init(|| parse_body(response));
            check_json_path(parsed, path, *op, expected)
        }
    }
}

fn parse_body(response: &ResponseData) -> Result<Cow<'_, Value>, String> {
    match &response.json {
        Some(json) => Ok(Cow::Borrowed(json)),
        None => serde_json::from_str(&response.body)
            .map(Cow::Owned)
            .map_err(|e| e.to_string()),
    }
}

fn check_json_path(
    parsed: &Result<Cow<'_, Value>, String>,
    path: &str,
    op: Comparison,
    expected: &str,
) -> Check {
    let root = match parsed {
        Ok(root) => root,
        Err(e) => {
            return Check::fail(
                format!("response body is not valid JSON: {}", e),
                format!("parse error: {}", e),
            )
        }
    };

    let leaf = match JsonPath::parse(path).and_then(|p| p.resolve(root).map(render)) {
        Ok(leaf) => leaf,
        Err(e @ (PathError::EmptySegment(_)
        | PathError::UnclosedBracket(_)
        | PathError::InvalidIndex(_)
        | PathError::TrailingText(_))) => {
            return Check::fail(e.to_string(), "invalid path");
        }
        Err(e) => {
            return Check::fail(format!("{}: {}", path, e), format!("{}: {}", NOT_FOUND, e));
        }
    };

    let expected = unquote(expected);
    match compare(&leaf, op, expected) {
        Ok(true) => Check::pass(format!("{} {} {}", path, op, expected), leaf),
        Ok(false) => Check::fail(
            format!("expected {} {} {}, got {}", path, op, expected, leaf),
            leaf,
        ),
        Err(reason) => Check::fail(reason, leaf),
    }
}

/// Leaf text: strings without quotes, everything else as compact JSON
fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn unquote(expected: &str) -> &str {
    let trimmed = expected.trim();
    for quote in ['"', '\''] {
        if trimmed.len() >= 2 && trimmed.starts_with(quote) && trimmed.ends_with(quote) {
            return &trimmed[1..trimmed.len() - 1];
        }
    }
    trimmed
}

fn as_integer(text: &str) -> Option<i128> {
    text.trim().parse::<i128>().ok()
}

fn as_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

fn apply<T: PartialOrd>(op: Comparison, a: T, b: T) -> bool {
    match op {
        Comparison::Eq => a == b,
        Comparison::Ne => a != b,
        Comparison::Gt => a > b,
        Comparison::Lt => a < b,
        Comparison::Ge => a >= b,
        Comparison::Le => a <= b,
    }
}

/// Numeric comparison when both sides are numbers; otherwise string
/// equality only. Integers are compared exactly, beyond f64 precision.
fn compare(actual: &str, op: Comparison, expected: &str) -> Result<bool, String> {
    if let (Some(a), Some(b)) = (as_integer(actual), as_integer(expected)) {
        return Ok(apply(op, a, b));
    }
    if let (Some(a), Some(b)) = (as_number(actual), as_number(expected)) {
        return Ok(apply(op, a, b));
    }
    if op.is_ordering() {
        return Err(format!(
            "operator '{}' needs numeric operands, got '{}' and '{}'",
            op, actual, expected
        ));
    }
    Ok((actual == expected) == (op == Comparison::Eq))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn response(status: u16, elapsed_ms: f64, body: &str) -> ResponseData {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        ResponseData::new(status, headers, body, elapsed_ms)
    }

    fn json_path(path: &str, op: Comparison, expected: &str) -> TestAssertion {
        TestAssertion::JsonPath {
            path: path.to_string(),
            op,
            expected: expected.to_string(),
        }
    }

    fn single(response: &ResponseData, assertion: TestAssertion) -> TestResult {
        evaluate(response, &[assertion]).remove(0)
    }

    const PRODUCTS: &str = r#"{"data":{"items":[{"name":"Product","price":9.5}],"total":3,"tag":"abc"}}"#;

    #[test]
    fn test_status_code() {
        let ok = single(&response(200, 10.0, "{}"), TestAssertion::StatusCode { expected: 200 });
        assert!(ok.passed);

        let missing = single(&response(404, 10.0, "{}"), TestAssertion::StatusCode { expected: 200 });
        assert!(!missing.passed);
        assert_eq!(missing.actual, "404");
    }

    #[test]
    fn test_response_time_is_inclusive() {
        let limit = || TestAssertion::ResponseTime { max_ms: 500.0 };
        assert!(single(&response(200, 499.0, ""), limit()).passed);
        assert!(single(&response(200, 500.0, ""), limit()).passed);
        let slow = single(&response(200, 501.0, ""), limit());
        assert!(!slow.passed);
        assert_eq!(slow.actual, "501");
    }

    #[test]
    fn test_header_name_case_insensitive_value_case_sensitive() {
        let r = response(200, 1.0, "");
        let exact = TestAssertion::HeaderValue {
            name: "content-type".into(),
            expected: "application/json".into(),
        };
        assert!(single(&r, exact).passed);

        let wrong_case = TestAssertion::HeaderValue {
            name: "content-type".into(),
            expected: "Application/JSON".into(),
        };
        let result = single(&r, wrong_case);
        assert!(!result.passed);
        assert_eq!(result.actual, "application/json");
    }

    #[test]
    fn test_header_exists_and_absent() {
        let r = response(200, 1.0, "");
        assert!(single(&r, TestAssertion::HeaderExists { name: "CONTENT-TYPE".into() }).passed);

        let absent = single(&r, TestAssertion::HeaderExists { name: "X-Trace".into() });
        assert!(!absent.passed);
        assert_eq!(absent.actual, "not found");

        let absent_value = single(
            &r,
            TestAssertion::HeaderValue { name: "X-Trace".into(), expected: "1".into() },
        );
        assert!(!absent_value.passed);
    }

    #[test]
    fn test_json_path_match_and_out_of_range() {
        let r = response(200, 1.0, r#"{"data":{"items":[{"name":"Product"}]}}"#);
        assert!(single(&r, json_path("data.items[0].name", Comparison::Eq, "\"Product\"")).passed);
        assert!(single(&r, json_path("data.items[0].name", Comparison::Eq, "Product")).passed);

        let out = single(&r, json_path("data.items[5].name", Comparison::Eq, "Product"));
        assert!(!out.passed);
        assert!(out.message.contains("out of range"), "{}", out.message);
        assert!(out.actual.starts_with("not found"));
    }

    #[test]
    fn test_json_path_numeric_comparisons() {
        let r = response(200, 1.0, PRODUCTS);
        assert!(single(&r, json_path("data.total", Comparison::Eq, "3")).passed);
        assert!(single(&r, json_path("data.total", Comparison::Eq, "3.0")).passed);
        assert!(single(&r, json_path("data.total", Comparison::Gt, "2")).passed);
        assert!(single(&r, json_path("data.total", Comparison::Le, "3")).passed);
        assert!(!single(&r, json_path("data.total", Comparison::Lt, "3")).passed);
        assert!(single(&r, json_path("data.items[0].price", Comparison::Ge, "9.5")).passed);
        assert!(single(&r, json_path("data.total", Comparison::Ne, "4")).passed);
    }

    #[test]
    fn test_json_path_large_integers_compare_exactly() {
        let r = response(200, 1.0, r#"{"id":9007199254740993}"#);
        let off_by_one = single(&r, json_path("id", Comparison::Eq, "9007199254740992"));
        assert!(!off_by_one.passed);
        assert_eq!(off_by_one.actual, "9007199254740993");

        assert!(single(&r, json_path("id", Comparison::Eq, "9007199254740993")).passed);
        assert!(single(&r, json_path("id", Comparison::Gt, "9007199254740992")).passed);
        assert!(single(&r, json_path("id", Comparison::Ne, "9007199254740992")).passed);
    }

    #[test]
    fn test_json_path_ordering_on_strings_fails_with_reason() {
        let r = response(200, 1.0, PRODUCTS);
        let result = single(&r, json_path("data.tag", Comparison::Gt, "abb"));
        assert!(!result.passed);
        assert!(result.message.contains("numeric"), "{}", result.message);
        assert_eq!(result.actual, "abc");

        assert!(single(&r, json_path("data.tag", Comparison::Ne, "xyz")).passed);
    }

    #[test]
    fn test_json_path_on_non_json_body() {
        let r = ResponseData::new(200, BTreeMap::new(), "<html></html>", 1.0);
        let result = single(&r, json_path("data", Comparison::Eq, "1"));
        assert!(!result.passed);
        assert!(result.actual.starts_with("parse error"));
    }

    #[test]
    fn test_json_path_invalid_path_and_index_on_object() {
        let r = response(200, 1.0, PRODUCTS);
        let invalid = single(&r, json_path("data..total", Comparison::Eq, "3"));
        assert!(!invalid.passed);
        assert_eq!(invalid.actual, "invalid path");

        let not_list = single(&r, json_path("data[0]", Comparison::Eq, "3"));
        assert!(!not_list.passed);
        assert!(not_list.message.contains("cannot index"), "{}", not_list.message);
    }

    #[test]
    fn test_json_path_renders_non_string_leaves() {
        let r = response(200, 1.0, r#"{"ok":true,"none":null,"list":[1,2]}"#);
        assert!(single(&r, json_path("ok", Comparison::Eq, "true")).passed);
        assert!(single(&r, json_path("none", Comparison::Eq, "null")).passed);
        assert!(single(&r, json_path("list", Comparison::Eq, "[1,2]")).passed);
    }

    #[test]
    fn test_failures_do_not_short_circuit() {
        let r = response(200, 20.0, PRODUCTS);
        let assertions = vec![
            TestAssertion::StatusCode { expected: 200 },
            json_path("data.items[9].name", Comparison::Eq, "x"),
            TestAssertion::ResponseTime { max_ms: 100.0 },
            TestAssertion::HeaderExists { name: "content-type".into() },
        ];
        let results = evaluate(&r, &assertions);
        assert_eq!(results.len(), 4);
        assert_eq!(
            results.iter().map(|r| r.passed).collect::<Vec<_>>(),
            vec![true, false, true, true]
        );
        assert!(results.iter().enumerate().all(|(i, r)| r.index == i));
        assert_eq!(results[1].assertion, assertions[1]);
    }
}
