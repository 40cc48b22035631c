//! Response assertions
//!
//! An assertion is a closed variant per check kind. Evaluation never fails:
//! every problem (missing header, bad JSON, bad path) becomes a failed
//! [`TestResult`] carrying the observed value.

pub mod engine;
pub mod expr;
pub mod json_path;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use engine::evaluate;
pub use json_path::{JsonPath, PathToken};

/// Comparison operator used by JSON path assertions
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparison {
    #[default]
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "<=")]
    Le,
}

impl Comparison {
    /// Two-character operators come first so `>=` is never read as `>`
    pub const ALL: [Comparison; 6] = [
        Comparison::Eq,
        Comparison::Ne,
        Comparison::Ge,
        Comparison::Le,
        Comparison::Gt,
        Comparison::Lt,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            Comparison::Eq => "==",
            Comparison::Ne => "!=",
            Comparison::Gt => ">",
            Comparison::Lt => "<",
            Comparison::Ge => ">=",
            Comparison::Le => "<=",
        }
    }

    pub fn is_ordering(&self) -> bool {
        !matches!(self, Comparison::Eq | Comparison::Ne)
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A user-defined check against a response
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TestAssertion {
    StatusCode {
        expected: u16,
    },
    ResponseTime {
        max_ms: f64,
    },
    HeaderExists {
        name: String,
    },
    HeaderValue {
        name: String,
        expected: String,
    },
    JsonPath {
        path: String,
        #[serde(default)]
        op: Comparison,
        expected: String,
    },
}

impl TestAssertion {
    pub fn kind(&self) -> &'static str {
        match self {
            TestAssertion::StatusCode { .. } => "status_code",
            TestAssertion::ResponseTime { .. } => "response_time",
            TestAssertion::HeaderExists { .. } => "header_exists",
            TestAssertion::HeaderValue { .. } => "header_value",
            TestAssertion::JsonPath { .. } => "json_path",
        }
    }

    /// What the assertion expects, for display
    pub fn expectation(&self) -> String {
        match self {
            TestAssertion::StatusCode { expected } => format!("status == {}", expected),
            TestAssertion::ResponseTime { max_ms } => format!("time <= {} ms", max_ms),
            TestAssertion::HeaderExists { name } => format!("header '{}' present", name),
            TestAssertion::HeaderValue { name, expected } => format!("{}: {}", name, expected),
            TestAssertion::JsonPath { path, op, expected } => {
                format!("{} {} {}", path, op, expected)
            }
        }
    }
}

/// Outcome of one assertion
#[derive(Clone, Debug, PartialEq)]
pub struct TestResult {
    /// Position of the assertion in the evaluated list
    pub index: usize,
    pub assertion: TestAssertion,
    pub passed: bool,
    pub message: String,
    /// Observed value, or a "not found"/"parse error" description
    pub actual: String,
}

/// Pass/fail counts over a result list
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TestSummary {
    pub passed: usize,
    pub failed: usize,
}

impl TestSummary {
    pub fn of(results: &[TestResult]) -> Self {
        let passed = results.iter().filter(|r| r.passed).count();
        TestSummary {
            passed,
            failed: results.len() - passed,
        }
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

impl fmt::Display for TestSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} passed", self.passed, self.total())
    }
}
