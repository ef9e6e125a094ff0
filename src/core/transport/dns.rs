// src/core/transport/dns.rs

use std::time::Duration;

use async_trait::async_trait;
use hickory_resolver::TokioAsyncResolver;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::error::{ResolveError, ResolveErrorKind};
use hickory_resolver::proto::rr::RecordType;
use tracing::{debug, warn};

use super::{DnsQuery, RecordKind, TransportError, bounded};

/// DNS capability backed by a Tokio-based hickory resolver.
pub struct HickoryResolver {
    resolver: TokioAsyncResolver,
    timeout: Duration,
}

impl HickoryResolver {
    pub fn new(timeout: Duration) -> Self {
        let mut opts = ResolverOpts::default();
        opts.timeout = timeout;
        // Exactly one attempt per lookup.
        opts.attempts = 1;
        Self {
            resolver: TokioAsyncResolver::tokio(ResolverConfig::default(), opts),
            timeout,
        }
    }
}

fn record_type(kind: RecordKind) -> RecordType {
    match kind {
        RecordKind::Txt => RecordType::TXT,
        RecordKind::Dnskey => RecordType::DNSKEY,
    }
}

fn classify(name: &str, e: ResolveError, limit: Duration) -> TransportError {
    match e.kind() {
        ResolveErrorKind::NoRecordsFound { .. } => TransportError::NotFound(name.to_string()),
        ResolveErrorKind::Timeout => TransportError::Timeout(limit),
        _ => TransportError::Resolution(e.to_string()),
    }
}

#[async_trait]
impl DnsQuery for HickoryResolver {
    async fn query(&self, name: &str, kind: RecordKind) -> Result<Vec<String>, TransportError> {
        debug!(name, ?kind, "Looking up DNS records.");
        let lookup = async {
            let answer = self
                .resolver
                .lookup(name, record_type(kind))
                .await
                .map_err(|e| classify(name, e, self.timeout))?;
            let records: Vec<String> = answer.iter().map(|r| r.to_string()).collect();
            if records.is_empty() {
                return Err(TransportError::NotFound(name.to_string()));
            }
            Ok(records)
        };

        let result = bounded(self.timeout, lookup).await;
        match &result {
            Ok(records) => debug!(name, count = records.len(), "DNS records found."),
            Err(e) => warn!(name, error = %e, "DNS lookup failed."),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolver_timeouts_carry_the_configured_limit() {
        let limit = Duration::from_secs(5);
        let e = ResolveError::from(ResolveErrorKind::Timeout);
        assert_eq!(classify("example.com", e, limit), TransportError::Timeout(limit));
    }

    #[test]
    fn other_resolver_errors_are_resolution_failures() {
        let e = ResolveError::from(ResolveErrorKind::Message("server failure"));
        assert!(matches!(
            classify("example.com", e, Duration::from_secs(5)),
            TransportError::Resolution(_)
        ));
    }
}
