// src/core/scanner/whois_scanner.rs

use chrono::{Datelike, Utc};
use tracing::{debug, info};

use crate::core::models::Identity;
use crate::core::scanner::{ProbeContext, ProbeOutcome};
use crate::core::transport::{TransportError, WhoisRecord};

/// Looks up who registered the domain, where, and how long ago.
pub async fn run_whois_scan(ctx: &ProbeContext) -> ProbeOutcome<Identity> {
    info!(target = %ctx.domain, "Starting WHOIS lookup.");
    let record = ctx.caps.whois.lookup(&ctx.domain).await;
    let outcome = analyze_whois(record, Utc::now().year());
    info!(registrar = %outcome.signals.registrar, age = outcome.signals.age, "WHOIS lookup finished.");
    outcome
}

pub(crate) fn analyze_whois(record: Result<WhoisRecord, TransportError>, current_year: i32) -> ProbeOutcome<Identity> {
    match record {
        Ok(record) => ProbeOutcome::with_signals(Identity {
            registrar: record.registrar.unwrap_or_else(|| "Unknown".to_string()),
            country: record.country.unwrap_or_else(|| "Global".to_string()),
            age: record
                .creation_date
                .map(|created| current_year - created.year())
                .unwrap_or(0),
        }),
        Err(e) => {
            debug!(error = %e, "WHOIS lookup failed; identity unknown.");
            ProbeOutcome::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn computes_age_in_years() {
        let record = WhoisRecord {
            registrar: Some("MarkMonitor Inc.".into()),
            country: Some("US".into()),
            creation_date: Utc.with_ymd_and_hms(1997, 9, 15, 4, 0, 0).single(),
        };
        let outcome = analyze_whois(Ok(record), 2026);
        assert_eq!(
            outcome.signals,
            Identity { registrar: "MarkMonitor Inc.".into(), country: "US".into(), age: 29 }
        );
        assert!(outcome.findings.is_empty());
    }

    #[test]
    fn missing_country_reads_as_global() {
        let outcome = analyze_whois(Ok(WhoisRecord::default()), 2026);
        assert_eq!(outcome.signals.country, "Global");
        assert_eq!(outcome.signals.registrar, "Unknown");
        assert_eq!(outcome.signals.age, 0);
    }

    #[test]
    fn failures_yield_unknown_identity() {
        let outcome = analyze_whois(Err(TransportError::Connection("refused".into())), 2026);
        assert_eq!(outcome.signals, Identity::default());
        assert_eq!(outcome.deduction, 0);
    }
}
