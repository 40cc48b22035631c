//! One send: resolve -> transport -> assertions -> history

use crate::assertions;
use crate::error::TransportError;
use crate::models::{HistoryEntry, Outcome, ResolvedRequest, SavedRequest};
use crate::network::Transport;
use crate::resolver;
use crate::workspace::Workspace;

/// Sends `request` with the workspace's active environment and records the
/// exchange. A transport error is recorded as a failed entry (no results)
/// and returned unchanged.
pub async fn send_request<'w, T: Transport>(
    workspace: &'w mut Workspace,
    transport: &T,
    request: &SavedRequest,
) -> Result<&'w HistoryEntry, TransportError> {
    let environment = workspace.active_environment();
    let missing = unresolved_names(request, environment.map(|e| &e.variables));
    if !missing.is_empty() {
        tracing::debug!(request = %request.name, ?missing, "Unresolved placeholders");
    }
    let resolved = resolver::resolve_request(request, environment);

    tracing::info!(method = %resolved.method, url = %resolved.url, "Sending request");
    let (outcome, results, error) = match transport.send(&resolved).await {
        Ok(response) => {
            let results = assertions::evaluate(&response, &request.assertions);
            tracing::info!(
                status = response.status,
                elapsed_ms = response.elapsed_ms,
                "Request completed"
            );
            (Outcome::Response(response), results, None)
        }
        Err(e) => {
            tracing::warn!(url = %resolved.url, error = %e, "Request failed");
            (Outcome::Failed { error: e.to_string() }, Vec::new(), Some(e))
        }
    };

    let index = workspace.append_history(HistoryEntry::new(resolved, outcome, results));
    match error {
        Some(e) => Err(e),
        None => Ok(&workspace.history()[index]),
    }
}

/// Placeholder names in any field of `request` that `variables` cannot fill
fn unresolved_names(
    request: &SavedRequest,
    variables: Option<&std::collections::BTreeMap<String, String>>,
) -> Vec<String> {
    let empty = Default::default();
    let vars = variables.unwrap_or(&empty);
    let mut missing = resolver::unresolved(&request.url, vars);
    for value in request.headers.values().chain(request.params.values()) {
        missing.extend(resolver::unresolved(value, vars));
    }
    missing.extend(resolver::unresolved(&request.body, vars));
    if let Some(auth) = &request.auth {
        missing.extend(resolver::unresolved(&auth.username, vars));
        missing.extend(resolver::unresolved(&auth.password, vars));
    }
    missing.sort();
    missing.dedup();
    missing
}

/// Resolves without sending, for previews
pub fn preview(workspace: &Workspace, request: &SavedRequest) -> ResolvedRequest {
    resolver::resolve_request(request, workspace.active_environment())
}
