// src/core/scanner/subdomain_scanner.rs

use tracing::{debug, info};

use crate::core::scanner::{ProbeContext, ProbeOutcome};
use crate::core::transport::{CtEntry, TransportError};

/// Enumerates subdomains from certificate-transparency logs.
pub async fn run_subdomain_scan(ctx: &ProbeContext) -> ProbeOutcome<Vec<String>> {
    info!(target = %ctx.domain, "Starting subdomain enumeration.");
    let entries = ctx.caps.ct.query(&ctx.domain).await;
    let outcome = analyze_subdomains(&ctx.domain, entries, ctx.config.max_subdomains);
    info!(count = outcome.signals.len(), "Subdomain enumeration finished.");
    outcome
}

/// Keeps the first name of each entry, without a leading wildcard, when it
/// belongs to `domain`. Names are distinct, in log order, at most `limit`.
pub(crate) fn analyze_subdomains(
    domain: &str,
    entries: Result<Vec<CtEntry>, TransportError>,
    limit: usize,
) -> ProbeOutcome<Vec<String>> {
    let entries = match entries {
        Ok(entries) => entries,
        Err(e) => {
            debug!(error = %e, "Certificate transparency query failed.");
            return ProbeOutcome::default();
        }
    };

    let mut names: Vec<String> = Vec::new();
    for entry in &entries {
        if names.len() >= limit {
            break;
        }
        let name = entry
            .name_value
            .lines()
            .next()
            .unwrap_or_default()
            .replace("*.", "");
        if name.contains(domain) && !names.contains(&name) {
            names.push(name);
        }
    }
    ProbeOutcome::with_signals(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(names: &[&str]) -> Result<Vec<CtEntry>, TransportError> {
        Ok(names
            .iter()
            .map(|n| CtEntry { name_value: n.to_string() })
            .collect())
    }

    #[test]
    fn strips_wildcards_and_dedupes() {
        let outcome = analyze_subdomains(
            "example.com",
            entries(&["*.example.com", "api.example.com\nwww.api.example.com", "example.com", "api.example.com", "other.org"]),
            10,
        );
        assert_eq!(outcome.signals, vec!["example.com".to_string(), "api.example.com".to_string()]);
        assert!(outcome.findings.is_empty());
    }

    #[test]
    fn caps_the_list() {
        let names: Vec<String> = (0..25).map(|i| format!("h{}.example.com", i)).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let outcome = analyze_subdomains("example.com", entries(&refs), 10);
        assert_eq!(outcome.signals.len(), 10);
        assert_eq!(outcome.signals[9], "h9.example.com");
    }

    #[test]
    fn failures_yield_an_empty_list() {
        let outcome = analyze_subdomains("example.com", Err(TransportError::Parse("bad json".into())), 10);
        assert!(outcome.signals.is_empty());
        assert_eq!(outcome.deduction, 0);
    }
}
