// src/core/scanner/fingerprint_scanner.rs

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};

use crate::core::models::Technology;
use crate::core::scanner::{ProbeContext, ProbeOutcome};
use crate::core::transport::{HttpResponse, Method, TransportError};

/// Product token of a `Server` header: everything before the first `/`.
static RE_SERVER_PRODUCT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([^/]*)").unwrap());

/// Identifies the web server from the primary endpoint's `Server` header.
pub async fn run_fingerprint_scan(ctx: &ProbeContext) -> ProbeOutcome<Vec<Technology>> {
    info!(target = %ctx.url, "Starting technology fingerprinting.");
    let response = ctx
        .caps
        .http
        .fetch(&ctx.url, Method::Get, ctx.config.timeouts.tech_stack())
        .await;
    let outcome = analyze_fingerprint(response);
    info!(technologies = outcome.signals.len(), "Fingerprinting finished.");
    outcome
}

pub(crate) fn analyze_fingerprint(response: Result<HttpResponse, TransportError>) -> ProbeOutcome<Vec<Technology>> {
    let response = match response {
        Ok(response) => response,
        Err(e) => {
            debug!(error = %e, "Fingerprint request failed.");
            return ProbeOutcome::default();
        }
    };

    let technologies = response
        .header("server")
        .and_then(server_product)
        .map(|name| {
            debug!(tech = %name, "Detected web server.");
            vec![Technology {
                name,
                kind: "Web Server".to_string(),
            }]
        })
        .unwrap_or_default();
    ProbeOutcome::with_signals(technologies)
}

fn server_product(header: &str) -> Option<String> {
    RE_SERVER_PRODUCT
        .captures(header)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|name| !name.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transport::fake::ok;

    #[test]
    fn keeps_the_product_token() {
        let outcome = analyze_fingerprint(Ok(ok(200, &[("Server", "Apache/2.4.58 (Ubuntu)")], "")));
        assert_eq!(
            outcome.signals,
            vec![Technology { name: "Apache".into(), kind: "Web Server".into() }]
        );
        assert!(outcome.findings.is_empty());
    }

    #[test]
    fn bare_product_names_are_kept_whole() {
        let outcome = analyze_fingerprint(Ok(ok(200, &[("server", "cloudflare")], "")));
        assert_eq!(outcome.signals[0].name, "cloudflare");
    }

    #[test]
    fn absent_or_blank_header_yields_nothing() {
        assert!(analyze_fingerprint(Ok(ok(200, &[], ""))).signals.is_empty());
        assert!(analyze_fingerprint(Ok(ok(200, &[("server", " /1.0")], ""))).signals.is_empty());
        assert!(analyze_fingerprint(Err(TransportError::Connection("refused".into()))).signals.is_empty());
    }
}
