// src/core/transport/mod.rs

//! Capability interfaces the probes consume, plus the live implementations
//! backed by reqwest, native-tls, hickory and plain TCP.
//!
//! Probes only ever see the traits. Everything network-specific stays in the
//! sub-modules, so the engine can be driven by in-memory fakes in tests.

pub mod ct;
pub mod dns;
pub mod html;
pub mod http;
pub mod tls;
pub mod whois;

#[cfg(test)]
pub mod fake;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use color_eyre::eyre::Result;
use serde::Deserialize;
use thiserror::Error;

use crate::config::ScanConfig;

/// Why a transport call did not produce a usable answer.
///
/// Probes never propagate these; each probe's policy turns them into a finding
/// or a neutral result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("connection failed: {0}")]
    Connection(String),
    #[error("name resolution failed: {0}")]
    Resolution(String),
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error("malformed response: {0}")]
    Parse(String),
    #[error("no records found for {0}")]
    NotFound(String),
}

/// Bounds a transport future with a timeout, mapping expiry to [`TransportError::Timeout`].
pub async fn bounded<T, F>(limit: Duration, fut: F) -> Result<T, TransportError>
where
    F: std::future::Future<Output = Result<T, TransportError>>,
{
    tokio::time::timeout(limit, fut)
        .await
        .unwrap_or(Err(TransportError::Timeout(limit)))
}

// --- HTTP ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Head,
}

#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    pub status: u16,
    /// Header names are lower-cased.
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        let name = name.to_lowercase();
        self.headers
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }

    /// All headers rendered as one lower-cased `name: value` blob, for vendor sniffing.
    pub fn header_text(&self) -> String {
        self.headers
            .iter()
            .map(|(k, v)| format!("{}: {}", k, v))
            .collect::<Vec<_>>()
            .join("\n")
            .to_lowercase()
    }
}

#[async_trait]
pub trait HttpFetch: Send + Sync {
    async fn fetch(&self, url: &str, method: Method, timeout: Duration) -> Result<HttpResponse, TransportError>;
}

// --- TLS ---

/// Protocol version bound observed on a TLS endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsVersion {
    Tls10,
    Tls11,
    /// TLS 1.2 or newer.
    Modern,
}

impl TlsVersion {
    pub fn is_obsolete(self) -> bool {
        matches!(self, TlsVersion::Tls10 | TlsVersion::Tls11)
    }
}

impl fmt::Display for TlsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TlsVersion::Tls10 => write!(f, "TLSv1.0"),
            TlsVersion::Tls11 => write!(f, "TLSv1.1"),
            TlsVersion::Modern => write!(f, "TLSv1.2+"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsSession {
    pub version: TlsVersion,
    pub not_after: DateTime<Utc>,
}

#[async_trait]
pub trait TlsHandshake: Send + Sync {
    async fn handshake(&self, host: &str, port: u16, timeout: Duration) -> Result<TlsSession, TransportError>;
}

// --- DNS ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Txt,
    Dnskey,
}

#[async_trait]
pub trait DnsQuery: Send + Sync {
    /// Returns the records as text. An empty answer is reported as [`TransportError::NotFound`].
    async fn query(&self, name: &str, kind: RecordKind) -> Result<Vec<String>, TransportError>;
}

// --- WHOIS ---

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WhoisRecord {
    pub registrar: Option<String>,
    pub country: Option<String>,
    pub creation_date: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait WhoisLookup: Send + Sync {
    async fn lookup(&self, domain: &str) -> Result<WhoisRecord, TransportError>;
}

// --- Certificate transparency ---

/// One log entry; `name_value` may hold several names separated by newlines.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CtEntry {
    pub name_value: String,
}

#[async_trait]
pub trait CertTransparency: Send + Sync {
    async fn query(&self, domain: &str) -> Result<Vec<CtEntry>, TransportError>;
}

// --- Bundle ---

/// Every capability a scan needs, shareable across probe tasks.
#[derive(Clone)]
pub struct Capabilities {
    pub http: Arc<dyn HttpFetch>,
    pub tls: Arc<dyn TlsHandshake>,
    pub dns: Arc<dyn DnsQuery>,
    pub whois: Arc<dyn WhoisLookup>,
    pub ct: Arc<dyn CertTransparency>,
}

impl Capabilities {
    /// Builds the network-backed capabilities from the scan configuration.
    pub fn live(config: &ScanConfig) -> Result<Self> {
        let http = Arc::new(http::ReqwestFetcher::new(&config.user_agent)?);
        Ok(Self {
            http: http.clone(),
            tls: Arc::new(tls::NativeTlsHandshaker),
            dns: Arc::new(dns::HickoryResolver::new(config.timeouts.dns())),
            whois: Arc::new(whois::TcpWhoisClient::new(config.timeouts.whois())),
            ct: Arc::new(ct::CrtShClient::new(
                http,
                &config.ct_endpoint,
                config.timeouts.subdomains(),
            )),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bounded_maps_expiry_to_timeout() {
        let limit = Duration::from_millis(10);
        let result: Result<(), _> = bounded(limit, async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;
        assert_eq!(result, Err(TransportError::Timeout(limit)));
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let response = HttpResponse {
            status: 200,
            headers: vec![("server".into(), "nginx/1.25".into())],
            body: String::new(),
        };
        assert_eq!(response.header("Server"), Some("nginx/1.25"));
        assert_eq!(response.header("x-missing"), None);
        assert_eq!(response.header_text(), "server: nginx/1.25");
    }

    #[test]
    fn only_pre_1_2_versions_are_obsolete() {
        assert!(TlsVersion::Tls10.is_obsolete());
        assert!(TlsVersion::Tls11.is_obsolete());
        assert!(!TlsVersion::Modern.is_obsolete());
        assert_eq!(TlsVersion::Tls11.to_string(), "TLSv1.1");
    }
}
