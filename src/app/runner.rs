//! Collection runner - sends saved requests in order

use crate::assertions::TestSummary;
use crate::error::WorkspaceError;
use crate::models::HistoryEntry;
use crate::network::Transport;
use crate::workspace::Workspace;

use super::session::send_request;

/// One request of a run
#[derive(Clone, Debug)]
pub struct RunItem {
    pub name: String,
    pub entry: HistoryEntry,
}

impl RunItem {
    pub fn summary(&self) -> TestSummary {
        TestSummary::of(&self.entry.results)
    }

    pub fn transport_failed(&self) -> bool {
        self.entry.outcome.response().is_none()
    }
}

#[derive(Clone, Debug, Default)]
pub struct RunReport {
    pub collection: String,
    pub environment: Option<String>,
    pub items: Vec<RunItem>,
}

impl RunReport {
    pub fn summary(&self) -> TestSummary {
        self.items.iter().fold(TestSummary::default(), |acc, item| {
            let s = item.summary();
            TestSummary {
                passed: acc.passed + s.passed,
                failed: acc.failed + s.failed,
            }
        })
    }

    pub fn transport_failures(&self) -> usize {
        self.items.iter().filter(|i| i.transport_failed()).count()
    }

    /// Every request got a response and every assertion passed
    pub fn succeeded(&self) -> bool {
        self.transport_failures() == 0 && self.summary().all_passed()
    }
}

/// Sends every request of `collection` (or just `only`) in insertion order.
/// Transport errors are recorded per item and do not stop the run.
pub async fn run_collection<T: Transport>(
    workspace: &mut Workspace,
    transport: &T,
    collection: &str,
    only: Option<&str>,
) -> Result<RunReport, WorkspaceError> {
    let requests = {
        let target = workspace
            .collection(collection)
            .ok_or_else(|| WorkspaceError::UnknownCollection(collection.to_string()))?;
        match only {
            Some(name) => vec![target.get(name).cloned().ok_or_else(|| {
                WorkspaceError::UnknownRequest {
                    collection: collection.to_string(),
                    name: name.to_string(),
                }
            })?],
            None => target.requests.clone(),
        }
    };

    let mut report = RunReport {
        collection: collection.to_string(),
        environment: workspace.active_environment().map(|e| e.name.clone()),
        items: Vec::with_capacity(requests.len()),
    };

    for request in &requests {
        let sent = send_request(workspace, transport, request).await.cloned();
        let entry = match sent {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(
                    request = %request.name,
                    error = %e,
                    "Run continues after transport error"
                );
                // The failed send was recorded as the newest entry
                match workspace.history().last() {
                    Some(entry) => entry.clone(),
                    None => continue,
                }
            }
        };
        report.items.push(RunItem {
            name: request.name.clone(),
            entry,
        });
    }

    tracing::info!(
        collection,
        requests = report.items.len(),
        summary = %report.summary(),
        "Collection run finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::stub::StubTransport;
    use crate::assertions::TestAssertion;
    use crate::models::{HttpMethod, SavedRequest};

    fn workspace() -> Workspace {
        let mut ws = Workspace::new();
        ws.create_collection("Smoke").unwrap();
        for (name, url, status) in [
            ("First", "http://up/one", 200),
            ("Broken", "http://down/two", 200),
            ("Third", "http://up/three", 201),
        ] {
            let request = SavedRequest::new(name, HttpMethod::GET, url)
                .with_assertion(TestAssertion::StatusCode { expected: status });
            ws.save_request("Smoke", request).unwrap();
        }
        ws
    }

    #[tokio::test]
    async fn test_run_continues_past_failures() {
        let mut ws = workspace();
        let transport = StubTransport::with_body("{}");
        let report = run_collection(&mut ws, &transport, "Smoke", None).await.unwrap();

        let names: Vec<_> = report.items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["First", "Broken", "Third"]);
        assert_eq!(report.transport_failures(), 1);
        assert!(report.items[1].transport_failed());
        assert!(report.items[1].entry.results.is_empty());
        assert_eq!(report.items[1].entry.request.url, "http://down/two");
        assert!(!report.items[2].transport_failed());
        assert_eq!(report.summary().passed, 1);
        assert_eq!(report.summary().failed, 1);
        assert!(!report.succeeded());
        assert_eq!(ws.history().len(), 3);
    }

    #[tokio::test]
    async fn test_run_single_request() {
        let mut ws = workspace();
        let transport = StubTransport::with_body("{}");
        let report = run_collection(&mut ws, &transport, "Smoke", Some("First"))
            .await
            .unwrap();
        assert_eq!(report.items.len(), 1);
        assert!(report.succeeded());

        assert!(matches!(
            run_collection(&mut ws, &transport, "Smoke", Some("Nope")).await,
            Err(WorkspaceError::UnknownRequest { .. })
        ));
        assert!(matches!(
            run_collection(&mut ws, &transport, "Missing", None).await,
            Err(WorkspaceError::UnknownCollection(_))
        ));
    }
}
