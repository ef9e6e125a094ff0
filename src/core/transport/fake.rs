// src/core/transport/fake.rs

//! In-memory capabilities for tests. Anything not explicitly stubbed fails
//! with a connection error, the same way an unreachable host would.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::{
    Capabilities, CertTransparency, CtEntry, DnsQuery, HttpFetch, HttpResponse, Method, RecordKind,
    TlsHandshake, TlsSession, TransportError, WhoisLookup, WhoisRecord,
};

fn refused(what: &str) -> TransportError {
    TransportError::Connection(format!("{} refused", what))
}

#[derive(Default, Clone)]
pub struct StubHttp {
    responses: HashMap<(String, bool), HttpResponse>,
    panic_on: Option<String>,
}

impl StubHttp {
    /// Answers both GET and HEAD for `url`.
    pub fn respond(mut self, url: &str, response: HttpResponse) -> Self {
        self.responses.insert((url.to_string(), true), response.clone());
        self.responses.insert((url.to_string(), false), response);
        self
    }

    pub fn respond_head(mut self, url: &str, response: HttpResponse) -> Self {
        self.responses.insert((url.to_string(), true), response);
        self
    }

    pub fn panic_on(mut self, url: &str) -> Self {
        self.panic_on = Some(url.to_string());
        self
    }
}

#[async_trait]
impl HttpFetch for StubHttp {
    async fn fetch(&self, url: &str, method: Method, _timeout: Duration) -> Result<HttpResponse, TransportError> {
        if self.panic_on.as_deref() == Some(url) {
            panic!("stubbed panic for {url}");
        }
        self.responses
            .get(&(url.to_string(), method == Method::Head))
            .cloned()
            .ok_or_else(|| refused(url))
    }
}

#[derive(Default, Clone)]
pub struct StubTls {
    pub session: Option<TlsSession>,
}

#[async_trait]
impl TlsHandshake for StubTls {
    async fn handshake(&self, host: &str, _port: u16, _timeout: Duration) -> Result<TlsSession, TransportError> {
        self.session.clone().ok_or_else(|| refused(host))
    }
}

#[derive(Default, Clone)]
pub struct StubDns {
    records: HashMap<(String, RecordKind), Vec<String>>,
}

impl StubDns {
    pub fn with(mut self, name: &str, kind: RecordKind, records: &[&str]) -> Self {
        self.records
            .insert((name.to_string(), kind), records.iter().map(|r| r.to_string()).collect());
        self
    }
}

#[async_trait]
impl DnsQuery for StubDns {
    async fn query(&self, name: &str, kind: RecordKind) -> Result<Vec<String>, TransportError> {
        self.records
            .get(&(name.to_string(), kind))
            .cloned()
            .ok_or_else(|| TransportError::NotFound(name.to_string()))
    }
}

#[derive(Default, Clone)]
pub struct StubWhois {
    pub record: Option<WhoisRecord>,
}

#[async_trait]
impl WhoisLookup for StubWhois {
    async fn lookup(&self, domain: &str) -> Result<WhoisRecord, TransportError> {
        self.record.clone().ok_or_else(|| refused(domain))
    }
}

#[derive(Default, Clone)]
pub struct StubCt {
    pub entries: Option<Vec<CtEntry>>,
}

#[async_trait]
impl CertTransparency for StubCt {
    async fn query(&self, domain: &str) -> Result<Vec<CtEntry>, TransportError> {
        self.entries.clone().ok_or_else(|| refused(domain))
    }
}

/// Builder for a full [`Capabilities`] bundle of stubs.
#[derive(Default, Clone)]
pub struct FakeNet {
    pub http: StubHttp,
    pub tls: StubTls,
    pub dns: StubDns,
    pub whois: StubWhois,
    pub ct: StubCt,
}

impl FakeNet {
    pub fn capabilities(self) -> Capabilities {
        Capabilities {
            http: Arc::new(self.http),
            tls: Arc::new(self.tls),
            dns: Arc::new(self.dns),
            whois: Arc::new(self.whois),
            ct: Arc::new(self.ct),
        }
    }
}

pub fn ok(status: u16, headers: &[(&str, &str)], body: &str) -> HttpResponse {
    HttpResponse {
        status,
        headers: headers
            .iter()
            .map(|(k, v)| (k.to_lowercase(), v.to_string()))
            .collect(),
        body: body.to_string(),
    }
}
