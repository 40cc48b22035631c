//! App layer - the send pipeline and collection runs
//!
//! Resolves a saved request against the active environment, hands it to a
//! [`Transport`](crate::network::Transport), evaluates its assertions and
//! records the exchange in the workspace history.

pub mod report;
pub mod runner;
pub mod session;

pub use report::render_report;
pub use runner::{run_collection, RunItem, RunReport};
pub use session::send_request;
