// src/core/transport/ct.rs

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};
use url::Url;

use super::{CertTransparency, CtEntry, HttpFetch, Method, TransportError};

/// Certificate-transparency search over crt.sh's JSON output.
pub struct CrtShClient {
    http: Arc<dyn HttpFetch>,
    endpoint: String,
    timeout: Duration,
}

impl CrtShClient {
    pub fn new(http: Arc<dyn HttpFetch>, endpoint: &str, timeout: Duration) -> Self {
        Self {
            http,
            endpoint: endpoint.to_string(),
            timeout,
        }
    }

    /// `<endpoint>?q=%.<domain>&output=json`
    fn search_url(&self, domain: &str) -> Result<Url, TransportError> {
        let query = format!("%.{}", domain);
        Url::parse_with_params(&self.endpoint, &[("q", query.as_str()), ("output", "json")])
            .map_err(|e| TransportError::Protocol(format!("Invalid CT endpoint: {}", e)))
    }
}

#[async_trait]
impl CertTransparency for CrtShClient {
    async fn query(&self, domain: &str) -> Result<Vec<CtEntry>, TransportError> {
        let url = self.search_url(domain)?;
        debug!(url = %url, "Querying certificate transparency logs.");

        let response = self.http.fetch(url.as_str(), Method::Get, self.timeout).await?;
        if response.status != 200 {
            warn!(status = response.status, "CT search returned a non-200 status.");
            return Err(TransportError::Protocol(format!("HTTP {}", response.status)));
        }

        serde_json::from_str(&response.body).map_err(|e| TransportError::Parse(format!("Failed to parse crt.sh response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transport::HttpResponse;
    use crate::core::transport::fake::StubHttp;

    #[test]
    fn builds_encoded_search_url() {
        let client = CrtShClient::new(Arc::new(StubHttp::default()), "https://crt.sh/", Duration::from_secs(1));
        let url = client.search_url("example.com").unwrap();
        assert_eq!(url.as_str(), "https://crt.sh/?q=%25.example.com&output=json");
    }

    #[tokio::test]
    async fn parses_json_entries() {
        let body = r#"[{"name_value":"a.example.com\nb.example.com","issuer_name":"R3"},{"name_value":"*.example.com"}]"#;
        let http = StubHttp::default().respond(
            "https://crt.sh/?q=%25.example.com&output=json",
            HttpResponse { status: 200, headers: vec![], body: body.to_string() },
        );
        let client = CrtShClient::new(Arc::new(http), "https://crt.sh/", Duration::from_secs(1));
        let entries = client.query("example.com").await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].name_value, "*.example.com");
    }

    #[tokio::test]
    async fn non_200_is_a_failure() {
        let http = StubHttp::default().respond(
            "https://crt.sh/?q=%25.example.com&output=json",
            HttpResponse { status: 502, ..Default::default() },
        );
        let client = CrtShClient::new(Arc::new(http), "https://crt.sh/", Duration::from_secs(1));
        assert!(client.query("example.com").await.is_err());
    }
}
