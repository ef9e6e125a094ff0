// src/core/scanner/ssl_scanner.rs

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::core::models::{Severity, TlsSignals};
use crate::core::scanner::{ProbeContext, ProbeOutcome};
use crate::core::transport::{TlsSession, TransportError};

pub async fn run_ssl_scan(ctx: &ProbeContext) -> ProbeOutcome<TlsSignals> {
    info!(target = %ctx.domain, "Starting SSL/TLS scan.");
    let session = ctx
        .caps
        .tls
        .handshake(&ctx.domain, 443, ctx.config.timeouts.tls())
        .await;
    let outcome = analyze_ssl(session, Utc::now());
    info!(findings = outcome.findings.len(), version = %outcome.signals.version, "SSL/TLS scan finished.");
    outcome
}

/// Expired certificate: Critical, 50. TLS 1.0/1.1: High, 20. Failed handshake: High, 50.
pub(crate) fn analyze_ssl(session: Result<TlsSession, TransportError>, now: DateTime<Utc>) -> ProbeOutcome<TlsSignals> {
    debug!("Analyzing SSL scan results.");
    let session = match session {
        Ok(session) => session,
        Err(e) => {
            debug!(error = %e, "Handshake failed, adding SSL Handshake Failed finding.");
            let mut outcome = ProbeOutcome::default();
            outcome.flag(
                "SSL Handshake Failed",
                Severity::High,
                "A secure TLS connection could not be established on port 443.",
                50,
            );
            return outcome;
        }
    };

    let mut outcome = ProbeOutcome::with_signals(TlsSignals {
        version: session.version.to_string(),
        expires: Some(session.not_after),
    });

    if session.not_after < now {
        debug!(expiry_date = %session.not_after, "Certificate is expired.");
        outcome.flag("SSL Expired", Severity::Critical, "The server certificate has expired.", 50);
    }
    if session.version.is_obsolete() {
        outcome.flag(
            "Obsolete TLS",
            Severity::High,
            &format!("The server negotiates {}, which is deprecated.", session.version),
            20,
        );
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    use crate::core::models::Category;
    use crate::core::transport::TlsVersion;

    fn session(version: TlsVersion, days_left: i64) -> Result<TlsSession, TransportError> {
        Ok(TlsSession {
            version,
            not_after: Utc::now() + Duration::days(days_left),
        })
    }

    #[test]
    fn healthy_session_records_version() {
        let outcome = analyze_ssl(session(TlsVersion::Modern, 60), Utc::now());
        assert!(outcome.findings.is_empty());
        assert_eq!(outcome.deduction, 0);
        assert_eq!(outcome.signals.version, "TLSv1.2+");
        assert!(outcome.signals.expires.is_some());
    }

    #[test]
    fn expired_and_obsolete_stack_up() {
        let outcome = analyze_ssl(session(TlsVersion::Tls10, -3), Utc::now());
        let titles: Vec<_> = outcome.findings.iter().map(|f| f.title.as_str()).collect();
        assert_eq!(titles, ["SSL Expired", "Obsolete TLS"]);
        assert_eq!(outcome.deduction, 70);
        assert_eq!(outcome.findings[0].severity, Severity::Critical);
        assert!(outcome.findings.iter().all(|f| f.category == Category::Encryption));
        assert_eq!(outcome.signals.version, "TLSv1.0");
    }

    #[test]
    fn handshake_failure_is_a_finding() {
        let outcome = analyze_ssl(Err(TransportError::Timeout(std::time::Duration::from_secs(3))), Utc::now());
        assert_eq!(outcome.deduction, 50);
        assert_eq!(outcome.findings[0].title, "SSL Handshake Failed");
        assert_eq!(outcome.findings[0].severity, Severity::High);
        assert_eq!(outcome.signals, TlsSignals::default());
    }
}
