// src/core/scanner/resilience_scanner.rs

use tracing::{debug, info};

use crate::core::models::{ResilienceSignals, Severity};
use crate::core::scanner::{ProbeContext, ProbeOutcome};
use crate::core::transport::{HttpResponse, Method, RecordKind, TransportError};

/// Header-text marker and the vendor it identifies. Later entries win.
const WAF_SIGNATURES: &[(&str, &str)] = &[
    ("cloudflare", "Cloudflare"),
    ("x-amz-cf-id", "AWS"),
    ("akamai", "Akamai"),
];

/// Checks for a WAF/CDN in front of the site and for DNSSEC on the zone.
pub async fn run_resilience_scan(ctx: &ProbeContext) -> ProbeOutcome<ResilienceSignals> {
    info!(target = %ctx.domain, "Starting resilience scan.");
    let (head, dnskey) = tokio::join!(
        ctx.caps
            .http
            .fetch(&ctx.url, Method::Head, ctx.config.timeouts.resilience()),
        ctx.caps.dns.query(&ctx.domain, RecordKind::Dnskey),
    );
    let outcome = analyze_resilience(head, dnskey);
    info!(
        waf = outcome.signals.waf.as_deref().unwrap_or("None"),
        dnssec = outcome.signals.dnssec,
        "Resilience scan finished."
    );
    outcome
}

/// No WAF: Low finding, no deduction. DNSKEY lookup failure: Low finding, 5 points.
/// A failed HEAD request says nothing about a WAF and is not reported.
pub(crate) fn analyze_resilience(
    head: Result<HttpResponse, TransportError>,
    dnskey: Result<Vec<String>, TransportError>,
) -> ProbeOutcome<ResilienceSignals> {
    let mut outcome = ProbeOutcome::<ResilienceSignals>::default();

    match head {
        Ok(response) => {
            let headers = response.header_text();
            outcome.signals.waf = WAF_SIGNATURES
                .iter()
                .filter(|(marker, _)| headers.contains(marker))
                .last()
                .map(|(_, vendor)| vendor.to_string());
            if !outcome.signals.has_waf() {
                outcome.flag(
                    "No WAF Detected",
                    Severity::Low,
                    "No web application firewall or CDN signature in the response headers.",
                    0,
                );
            }
        }
        Err(e) => debug!(error = %e, "HEAD request failed, WAF state unknown."),
    }

    match dnskey {
        Ok(records) if !records.is_empty() => outcome.signals.dnssec = true,
        Ok(_) => missing_dnssec(&mut outcome),
        Err(e) => {
            debug!(error = %e, "DNSKEY lookup failed.");
            missing_dnssec(&mut outcome);
        }
    }

    outcome
}

fn missing_dnssec(outcome: &mut ProbeOutcome<ResilienceSignals>) {
    outcome.flag(
        "Missing DNSSEC",
        Severity::Low,
        "The zone is not signed. DNS answers can be spoofed.",
        5,
    );
}
