//! Plain-text rendering of a collection run

use std::fmt::Write;

use crate::models::Outcome;

use super::runner::RunReport;

/// Renders the run the way the results panel lists it: one block per
/// request, one line per assertion, a summary at the end.
pub fn render_report(report: &RunReport) -> String {
    let mut out = String::new();
    let env = report.environment.as_deref().unwrap_or("none");
    let _ = writeln!(out, "Collection: {} (environment: {})", report.collection, env);

    for item in &report.items {
        let _ = writeln!(out);
        let _ = writeln!(out, "{} - {}", item.name, item.entry.request.label());
        match &item.entry.outcome {
            Outcome::Response(response) => {
                let _ = writeln!(
                    out,
                    "  {} | {} ms | {:.2} KB",
                    response.status,
                    response.elapsed_ms,
                    response.size as f64 / 1024.0
                );
            }
            Outcome::Failed { error } => {
                let _ = writeln!(out, "  ERROR {}", error);
            }
        }
        for result in &item.entry.results {
            let mark = if result.passed { "PASS" } else { "FAIL" };
            let _ = writeln!(
                out,
                "  [{}] {}: {} (actual: {})",
                mark,
                result.assertion.kind(),
                result.message,
                result.actual
            );
        }
        if !item.entry.results.is_empty() {
            let _ = writeln!(out, "  Tests: {}", item.summary());
        }
    }

    let _ = writeln!(out);
    let _ = write!(
        out,
        "{} request(s), {} transport error(s), tests {}",
        report.items.len(),
        report.transport_failures(),
        report.summary()
    );
    out
}
