// src/core/scanner/dns_scanner.rs

use tracing::{debug, info, warn};

use crate::core::models::{EmailSecurity, Severity};
use crate::core::scanner::{ProbeContext, ProbeOutcome};
use crate::core::transport::{RecordKind, TransportError};

/// Runs the email authentication scan against the target domain.
///
/// Looks up the DMARC policy at `_dmarc.<domain>` and, alongside it, the SPF
/// record published at the apex. Only a failed DMARC lookup is a finding; SPF
/// is reported as a signal.
///
/// # Arguments
/// * `ctx` - Probe context carrying the domain and the DNS capability.
///
/// # Returns
/// A `ProbeOutcome` with the email-auth signals and any "Missing DMARC" finding.
pub async fn run_email_scan(ctx: &ProbeContext) -> ProbeOutcome<EmailSecurity> {
    info!(target = %ctx.domain, "Starting email security scan.");

    let dmarc_name = format!("_dmarc.{}", ctx.domain);
    let (dmarc, spf) = tokio::join!(
        ctx.caps.dns.query(&dmarc_name, RecordKind::Txt),
        ctx.caps.dns.query(&ctx.domain, RecordKind::Txt),
    );

    let outcome = analyze_email_results(dmarc, spf);
    info!(findings = outcome.findings.len(), "Email security scan finished.");
    outcome
}

/// Analyzes the DMARC and SPF lookups.
///
/// Any DMARC lookup failure, including an empty answer, becomes a High
/// "Missing DMARC" finding worth 25 points. TXT records without a `v=DMARC1`
/// tag leave the signal at "Missing" without a finding.
pub(crate) fn analyze_email_results(
    dmarc: Result<Vec<String>, TransportError>,
    spf: Result<Vec<String>, TransportError>,
) -> ProbeOutcome<EmailSecurity> {
    let mut outcome = ProbeOutcome::<EmailSecurity>::default();

    match dmarc {
        Ok(records) => {
            if let Some(record) = last_tagged(&records, "v=DMARC1") {
                debug!(record = %record, "DMARC record found.");
                outcome.signals.dmarc = record;
            } else {
                debug!("TXT records present at _dmarc but none is a DMARC policy.");
            }
        }
        Err(e) => {
            warn!(error = %e, "DMARC lookup failed, adding Missing DMARC finding.");
            outcome.flag(
                "Missing DMARC",
                Severity::High,
                "No DMARC policy is published. The domain can be spoofed in phishing mail.",
                25,
            );
        }
    }

    match spf {
        Ok(records) => outcome.signals.spf = last_tagged(&records, "v=spf1"),
        Err(e) => debug!(error = %e, "SPF lookup failed."),
    }

    outcome
}

/// The last record carrying `tag`, with quotes removed.
fn last_tagged(records: &[String], tag: &str) -> Option<String> {
    records
        .iter()
        .filter(|r| r.contains(tag))
        .last()
        .map(|r| r.replace('"', ""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::Category;

    fn records(values: &[&str]) -> Result<Vec<String>, TransportError> {
        Ok(values.iter().map(|v| v.to_string()).collect())
    }

    #[test]
    fn dmarc_and_spf_are_recorded() {
        let outcome = analyze_email_results(
            records(&["\"v=DMARC1; p=reject\""]),
            records(&["google-site-verification=abc", "v=spf1 include:_spf.google.com -all"]),
        );
        assert!(outcome.findings.is_empty());
        assert_eq!(outcome.signals.dmarc, "v=DMARC1; p=reject");
        assert_eq!(outcome.signals.spf.as_deref(), Some("v=spf1 include:_spf.google.com -all"));
    }

    #[test]
    fn failed_dmarc_lookup_is_a_finding() {
        let outcome = analyze_email_results(
            Err(TransportError::NotFound("_dmarc.example.com".into())),
            Err(TransportError::NotFound("example.com".into())),
        );
        assert_eq!(outcome.deduction, 25);
        assert_eq!(outcome.findings[0].title, "Missing DMARC");
        assert_eq!(outcome.findings[0].category, Category::BrandProtection);
        assert_eq!(outcome.signals, EmailSecurity::default());
    }

    #[test]
    fn unrelated_txt_records_leave_dmarc_missing() {
        let outcome = analyze_email_results(records(&["some-verification=1"]), records(&[]));
        assert!(outcome.findings.is_empty());
        assert_eq!(outcome.signals.dmarc, "Missing");
        assert_eq!(outcome.signals.spf, None);
    }

    #[tokio::test]
    async fn queries_the_dmarc_subdomain() {
        use crate::core::scanner::test_context;
        use crate::core::transport::fake::FakeNet;

        let mut net = FakeNet::default();
        net.dns = net.dns.with("_dmarc.example.com", RecordKind::Txt, &["v=DMARC1; p=none"]);
        let outcome = run_email_scan(&test_context(net)).await;
        assert_eq!(outcome.signals.dmarc, "v=DMARC1; p=none");
        assert_eq!(outcome.deduction, 0);
    }
}
