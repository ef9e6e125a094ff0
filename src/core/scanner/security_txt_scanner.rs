// src/core/scanner/security_txt_scanner.rs

use tracing::{debug, info};

use crate::core::scanner::{ProbeContext, ProbeOutcome};
use crate::core::transport::{HttpResponse, Method, TransportError};

pub async fn run_security_txt_scan(ctx: &ProbeContext) -> ProbeOutcome<bool> {
    let url = format!("https://{}/.well-known/security.txt", ctx.domain);
    info!(url = %url, "Checking for security.txt.");
    let response = ctx
        .caps
        .http
        .fetch(&url, Method::Get, ctx.config.timeouts.security_txt())
        .await;
    analyze_security_txt(response)
}

/// Present only when the well-known path answers 200.
pub(crate) fn analyze_security_txt(response: Result<HttpResponse, TransportError>) -> ProbeOutcome<bool> {
    let present = match response {
        Ok(response) => response.status == 200,
        Err(e) => {
            debug!(error = %e, "security.txt request failed.");
            false
        }
    };
    ProbeOutcome::with_signals(present)
}
