// src/core/scanner/headers_scanner.rs

use tracing::{debug, info};

use crate::core::models::Severity;
use crate::core::scanner::{ProbeContext, ProbeOutcome};
use crate::core::transport::{HttpResponse, Method, TransportError};

/// Checks the primary endpoint for a Strict-Transport-Security header.
///
/// # Arguments
/// * `ctx` - Probe context; only `url` and the HTTP capability are used.
///
/// # Returns
/// A `ProbeOutcome` with a "Missing HSTS" finding when the header is absent.
/// Request failures yield an empty outcome.
pub async fn run_headers_scan(ctx: &ProbeContext) -> ProbeOutcome<()> {
    info!(target = %ctx.url, "Starting headers scan.");
    let response = ctx
        .caps
        .http
        .fetch(&ctx.url, Method::Get, ctx.config.timeouts.headers())
        .await;
    let outcome = analyze_headers(response);
    info!(findings = outcome.findings.len(), "Headers scan finished.");
    outcome
}

pub(crate) fn analyze_headers(response: Result<HttpResponse, TransportError>) -> ProbeOutcome<()> {
    let mut outcome = ProbeOutcome::default();
    match response {
        Ok(response) => {
            if response.header("strict-transport-security").is_none() {
                outcome.flag(
                    "Missing HSTS",
                    Severity::Medium,
                    "No Strict-Transport-Security header. Browsers may be downgraded to plain HTTP.",
                    10,
                );
            }
        }
        Err(e) => debug!(error = %e, "Headers request failed; nothing to report."),
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::Category;
    use crate::core::transport::fake::ok;

    #[test]
    fn missing_hsts_is_flagged() {
        let outcome = analyze_headers(Ok(ok(200, &[("server", "nginx")], "")));
        assert_eq!(outcome.deduction, 10);
        assert_eq!(outcome.findings.len(), 1);
        assert_eq!(outcome.findings[0].title, "Missing HSTS");
        assert_eq!(outcome.findings[0].severity, Severity::Medium);
        assert_eq!(outcome.findings[0].category, Category::AppSec);
    }

    #[test]
    fn present_hsts_is_clean_regardless_of_status() {
        let outcome = analyze_headers(Ok(ok(503, &[("Strict-Transport-Security", "max-age=600")], "")));
        assert_eq!(outcome, ProbeOutcome::default());
    }

    #[test]
    fn failures_are_swallowed() {
        let outcome = analyze_headers(Err(TransportError::Connection("refused".into())));
        assert_eq!(outcome, ProbeOutcome::default());
    }
}
