//! Application constants
//!
//! Centralized location for magic strings and configuration defaults.

/// Default transport timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Directory under the home directory holding the workspace file
pub const CONFIG_DIR_NAME: &str = ".courier";

/// Default workspace document file name
pub const WORKSPACE_FILE_NAME: &str = "workspace.yaml";

/// Log file written by the binary
pub const LOG_FILE_NAME: &str = "courier.log";

/// Scheme prefixed to URLs entered without one
pub const DEFAULT_SCHEME: &str = "https://";

/// Application name
pub const APP_NAME: &str = "Courier";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
