use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::assertions::{TestAssertion, TestResult};
use crate::error::WorkspaceError;

/// HTTP Method enum
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    #[default]
    GET,
    POST,
    PUT,
    DELETE,
    PATCH,
    HEAD,
    OPTIONS,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 7] = [
        HttpMethod::GET,
        HttpMethod::POST,
        HttpMethod::PUT,
        HttpMethod::DELETE,
        HttpMethod::PATCH,
        HttpMethod::HEAD,
        HttpMethod::OPTIONS,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
            HttpMethod::PUT => "PUT",
            HttpMethod::DELETE => "DELETE",
            HttpMethod::PATCH => "PATCH",
            HttpMethod::HEAD => "HEAD",
            HttpMethod::OPTIONS => "OPTIONS",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = WorkspaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        HttpMethod::ALL
            .into_iter()
            .find(|m| m.as_str() == upper)
            .ok_or_else(|| WorkspaceError::UnknownMethod(s.to_string()))
    }
}

/// Basic auth credentials
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicAuth {
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl BasicAuth {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        BasicAuth {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// A request template saved in a collection. Placeholders stay unresolved
/// until send time.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SavedRequest {
    pub name: String,
    #[serde(default)]
    pub method: HttpMethod,
    pub url: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub params: BTreeMap<String, String>,
    #[serde(default)]
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<BasicAuth>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assertions: Vec<TestAssertion>,
}

impl SavedRequest {
    pub fn new(name: impl Into<String>, method: HttpMethod, url: impl Into<String>) -> Self {
        SavedRequest {
            name: name.into(),
            method,
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_auth(mut self, auth: BasicAuth) -> Self {
        self.auth = Some(auth);
        self
    }

    pub fn with_assertion(mut self, assertion: TestAssertion) -> Self {
        self.assertions.push(assertion);
        self
    }
}

/// A named, ordered list of saved requests
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub name: String,
    #[serde(default)]
    pub requests: Vec<SavedRequest>,
}

impl Collection {
    pub fn new(name: impl Into<String>) -> Self {
        Collection {
            name: name.into(),
            requests: Vec::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&SavedRequest> {
        self.requests.iter().find(|r| r.name == name)
    }
}

/// Environment variables
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    pub name: String,
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
}

impl Environment {
    pub fn new(name: impl Into<String>) -> Self {
        Environment {
            name: name.into(),
            variables: BTreeMap::new(),
        }
    }

    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.variables.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&String> {
        self.variables.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.variables.remove(key)
    }
}

/// A request after variable substitution, as handed to the transport
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResolvedRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub params: BTreeMap<String, String>,
    pub body: String,
    pub auth: Option<BasicAuth>,
}

impl ResolvedRequest {
    /// Short label used in reports and history comparison
    pub fn label(&self) -> String {
        format!("{} {}", self.method, self.url)
    }
}

/// Response from HTTP request
#[derive(Clone, Debug, PartialEq)]
pub struct ResponseData {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
    /// Parsed body, present when the body is valid JSON
    pub json: Option<serde_json::Value>,
    pub elapsed_ms: f64,
    pub size: usize,
    pub received_at: chrono::DateTime<chrono::Utc>,
}

impl ResponseData {
    pub fn new(
        status: u16,
        headers: BTreeMap<String, String>,
        body: impl Into<String>,
        elapsed_ms: f64,
    ) -> Self {
        let body = body.into();
        let json = serde_json::from_str(&body).ok();
        ResponseData {
            status,
            headers,
            size: body.len(),
            body,
            json,
            elapsed_ms: (elapsed_ms * 100.0).round() / 100.0,
            received_at: chrono::Utc::now(),
        }
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn is_json(&self) -> bool {
        self.json.is_some()
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// What came back from a send
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Response(ResponseData),
    /// Transport error marker; no response was received
    Failed { error: String },
}

impl Outcome {
    pub fn response(&self) -> Option<&ResponseData> {
        match self {
            Outcome::Response(response) => Some(response),
            Outcome::Failed { .. } => None,
        }
    }
}

/// History entry. Created once per send and never mutated.
#[derive(Clone, Debug)]
pub struct HistoryEntry {
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub request: ResolvedRequest,
    pub outcome: Outcome,
    pub results: Vec<TestResult>,
}

impl HistoryEntry {
    pub fn new(request: ResolvedRequest, outcome: Outcome, results: Vec<TestResult>) -> Self {
        HistoryEntry {
            timestamp: chrono::Utc::now(),
            request,
            outcome,
            results,
        }
    }
}
