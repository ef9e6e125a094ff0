// src/core/transport/whois.rs

//! WHOIS over TCP port 43 (RFC 3912).

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, warn};

use super::{TransportError, WhoisLookup, WhoisRecord, bounded};

const IANA_SERVER: &str = "whois.iana.org";

static RE_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{4})-(\d{2})-(\d{2})").unwrap());
static RE_DMY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{2})[./-](\d{2})[./-](\d{4})").unwrap());

pub struct TcpWhoisClient {
    timeout: Duration,
}

impl TcpWhoisClient {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    async fn query_server(&self, server: &str, domain: &str) -> Result<String, TransportError> {
        debug!(server, domain, "Querying WHOIS server.");
        bounded(self.timeout, async {
            let mut stream = TcpStream::connect((server, 43))
                .await
                .map_err(|e| TransportError::Connection(format!("Failed to connect to WHOIS server: {}", e)))?;
            stream
                .write_all(format!("{}\r\n", domain).as_bytes())
                .await
                .map_err(|e| TransportError::Connection(format!("Failed to send query: {}", e)))?;
            let mut raw = Vec::new();
            stream
                .read_to_end(&mut raw)
                .await
                .map_err(|e| TransportError::Connection(format!("Failed to read response: {}", e)))?;
            Ok(String::from_utf8_lossy(&raw).into_owned())
        })
        .await
    }
}

#[async_trait]
impl WhoisLookup for TcpWhoisClient {
    async fn lookup(&self, domain: &str) -> Result<WhoisRecord, TransportError> {
        let server = whois_server(domain);
        let mut response = self.query_server(server, domain).await?;

        // IANA only tells us who is authoritative; follow one referral.
        if server == IANA_SERVER {
            if let Some(referral) = referral(&response) {
                response = self.query_server(&referral, domain).await?;
            }
        }

        let record = parse_response(&response);
        if record == WhoisRecord::default() {
            warn!(domain, "WHOIS response had no recognisable fields.");
            return Err(TransportError::Parse("empty WHOIS record".to_string()));
        }
        Ok(record)
    }
}

/// Authoritative server for the domain's TLD; IANA for anything unlisted.
fn whois_server(domain: &str) -> &'static str {
    let tld = domain.rsplit('.').next().unwrap_or("");
    match tld {
        "com" | "net" => "whois.verisign-grs.com",
        "org" => "whois.pir.org",
        "io" => "whois.nic.io",
        "ai" => "whois.nic.ai",
        "dev" | "app" => "whois.nic.google",
        "uk" => "whois.nic.uk",
        "de" => "whois.denic.de",
        "fr" => "whois.nic.fr",
        "it" => "whois.nic.it",
        "jp" => "whois.jprs.jp",
        _ => IANA_SERVER,
    }
}

fn referral(response: &str) -> Option<String> {
    response.lines().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        let key = key.trim().to_lowercase();
        let value = value.trim();
        ((key == "refer" || key == "whois") && !value.is_empty()).then(|| value.to_string())
    })
}

fn field_value(line: &str) -> String {
    line.split_once(':').map(|(_, v)| v.trim().to_string()).unwrap_or_default()
}

fn parse_date(text: &str) -> Option<DateTime<Utc>> {
    let date = if let Some(caps) = RE_DATE.captures(text) {
        NaiveDate::from_ymd_opt(caps[1].parse().ok()?, caps[2].parse().ok()?, caps[3].parse().ok()?)
    } else {
        let caps = RE_DMY.captures(text)?;
        NaiveDate::from_ymd_opt(caps[3].parse().ok()?, caps[2].parse().ok()?, caps[1].parse().ok()?)
    }?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc())
}

/// Extracts registrar, registrant country and creation date from a raw response.
pub(crate) fn parse_response(response: &str) -> WhoisRecord {
    let mut record = WhoisRecord::default();

    for line in response.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('%') || line.starts_with('#') || line.starts_with(">>>") {
            continue;
        }
        let lower = line.to_lowercase();

        if (lower.starts_with("registrar:") || lower.starts_with("sponsoring registrar:")) && record.registrar.is_none() {
            let value = field_value(line);
            if !value.is_empty() {
                record.registrar = Some(value);
            }
        }

        if (lower.starts_with("registrant country:") || lower.starts_with("country:")) && record.country.is_none() {
            let value = field_value(line);
            if !value.is_empty() {
                record.country = Some(value);
            }
        }

        if (lower.contains("creation date") || lower.starts_with("created") || lower.starts_with("registered on"))
            && record.creation_date.is_none()
        {
            record.creation_date = parse_date(&field_value(line));
        }
    }

    record
}
