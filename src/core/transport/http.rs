// src/core/transport/http.rs

use std::time::Duration;

use async_trait::async_trait;
use color_eyre::eyre::{Result, WrapErr};
use tracing::{debug, warn};

use super::{HttpFetch, HttpResponse, Method, TransportError, bounded};

/// HTTP capability backed by a shared `reqwest::Client`.
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    pub fn new(user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .wrap_err("Failed to build HTTP client")?;
        Ok(Self { client })
    }

    async fn send(&self, url: &str, method: Method, timeout: Duration) -> Result<HttpResponse, TransportError> {
        let request = match method {
            Method::Get => self.client.get(url),
            Method::Head => self.client.head(url),
        };

        let response = request.timeout(timeout).send().await.map_err(|e| classify(e, timeout))?;
        let status = response.status().as_u16();
        debug!(url, status, "Received HTTP response.");

        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                let value = value.to_str().unwrap_or("[Invalid UTF-8]");
                (name.as_str().to_lowercase(), value.to_string())
            })
            .collect();

        let body = match method {
            Method::Head => String::new(),
            Method::Get => response.text().await.map_err(|e| classify(e, timeout))?,
        };

        Ok(HttpResponse { status, headers, body })
    }
}

fn classify(e: reqwest::Error, limit: Duration) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout(limit)
    } else if e.is_connect() {
        TransportError::Connection(e.to_string())
    } else if e.is_decode() || e.is_body() {
        TransportError::Parse(e.to_string())
    } else {
        TransportError::Protocol(e.to_string())
    }
}

#[async_trait]
impl HttpFetch for ReqwestFetcher {
    async fn fetch(&self, url: &str, method: Method, timeout: Duration) -> Result<HttpResponse, TransportError> {
        // reqwest enforces the per-request timeout; the outer bound also covers body reads.
        let result = bounded(timeout, self.send(url, method, timeout)).await;
        if let Err(e) = &result {
            warn!(url, error = %e, "HTTP request failed.");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn silent_server_times_out_with_the_configured_limit() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Accept and hold the connection without ever answering.
        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(socket);
        });

        let fetcher = ReqwestFetcher::new("riskprism-test").unwrap();
        let limit = Duration::from_millis(200);
        let result = fetcher.fetch(&format!("http://{}/", addr), Method::Get, limit).await;
        assert_eq!(result.unwrap_err(), TransportError::Timeout(limit));
        server.abort();
    }
}
