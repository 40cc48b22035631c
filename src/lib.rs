//! # Courier
//!
//! Build, send and validate HTTP API requests.
//!
//! ## Features
//! - Saved collections of request templates
//! - Environment variables substituted as `{{$name}}`
//! - Response assertions: status, time, headers, JSON paths
//! - Request history with side-by-side comparison
//! - JSON/YAML workspace export and import
//! - Tabular projection of JSON responses
//!
//! ## Architecture
//! - Workspace (owned state) - collections, environments, history
//! - Resolver + Assertion engine - pure functions over that state
//! - Network layer (Tokio + reqwest) - the HTTP transport

pub mod app;
pub mod assertions;
pub mod constants;
pub mod error;
pub mod models;
pub mod network;
pub mod resolver;
pub mod storage;
pub mod table;
pub mod workspace;

// Re-export commonly used types
pub use assertions::{Comparison, TestAssertion, TestResult, TestSummary};
pub use error::{AssertionParseError, TableError, TransportError, WorkspaceError};
pub use models::{
    BasicAuth, Collection, Environment, HistoryEntry, HttpMethod, Outcome, ResolvedRequest,
    ResponseData, SavedRequest,
};
pub use network::{HttpTransport, Transport};
pub use workspace::{Workspace, WorkspaceDocument};
