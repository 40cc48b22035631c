//! Error types
//!
//! Only structural operations (workspace management, import, assertion
//! definitions) report hard errors. Resolution misses and assertion failures
//! never surface here.

use thiserror::Error;

/// Configuration errors raised by workspace management and import
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkspaceError {
    #[error("a {kind} named '{name}' already exists")]
    DuplicateName { kind: &'static str, name: String },

    #[error("no collection named '{0}'")]
    UnknownCollection(String),

    #[error("no request named '{name}' in collection '{collection}'")]
    UnknownRequest { collection: String, name: String },

    #[error("no environment named '{0}'")]
    UnknownEnvironment(String),

    #[error("no active collection; create or select one first")]
    NoActiveCollection,

    #[error("{0} name must not be empty")]
    EmptyName(&'static str),

    #[error("invalid workspace document: {0}")]
    InvalidDocument(String),

    #[error("unknown HTTP method: {0}")]
    UnknownMethod(String),
}

/// Failure of the HTTP transport. Surfaced verbatim, never retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("error reading body: {0}")]
    Body(String),
}

/// Rejected assertion definition
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssertionParseError {
    #[error("unknown assertion type: {0}")]
    UnknownKind(String),

    #[error("expected an integer status code, got '{0}'")]
    InvalidStatus(String),

    #[error("expected a response time in milliseconds, got '{0}'")]
    InvalidThreshold(String),

    #[error("header name must not be empty")]
    EmptyHeader,

    #[error("expected 'Header: value', got '{0}'")]
    InvalidHeaderValue(String),

    #[error("expected 'path <op> value', got '{0}'")]
    InvalidJsonPath(String),
}

/// JSON that cannot be projected into rows and columns
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("response has no rows")]
    Empty,

    #[error("cannot visualize {0}")]
    NotTabular(String),
}
