// src/core/transport/tls.rs

use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use native_tls::{Protocol, TlsConnector};
use tokio::task::spawn_blocking;
use tracing::{debug, error, info};
use x509_parser::prelude::*;

use super::{TlsHandshake, TlsSession, TlsVersion, TransportError, bounded};

/// TLS capability backed by the platform TLS stack.
///
/// `native-tls` does not report the negotiated protocol, so the version is
/// bounded by extra handshakes with a pinned protocol range.
pub struct NativeTlsHandshaker;

#[async_trait]
impl TlsHandshake for NativeTlsHandshaker {
    async fn handshake(&self, host: &str, port: u16, timeout: Duration) -> Result<TlsSession, TransportError> {
        let host_owned = host.to_string();
        debug!(host, port, "Spawning blocking task for TLS handshake.");
        let task = spawn_blocking(move || perform_handshake(&host_owned, port, timeout));
        bounded(timeout * 4, async move {
            task.await.unwrap_or_else(|e| {
                error!(panic = %e, "Blocking TLS task panicked!");
                Err(TransportError::Protocol(format!("Task panicked: {}", e)))
            })
        })
        .await
    }
}

/// Handshakes with certificate verification. When that fails, the certificate is
/// fetched once more without verification; an expired one is still reported as a
/// session so the expiry surfaces, anything else keeps the original error.
fn perform_handshake(host: &str, port: u16, timeout: Duration) -> Result<TlsSession, TransportError> {
    match session_with(host, port, timeout, true) {
        Ok(session) => Ok(session),
        Err(e) => recover_expired(e, || session_with(host, port, timeout, false), Utc::now()),
    }
}

fn recover_expired<F>(error: TransportError, unverified: F, now: DateTime<Utc>) -> Result<TlsSession, TransportError>
where
    F: FnOnce() -> Result<TlsSession, TransportError>,
{
    match unverified() {
        Ok(session) if session.not_after < now => {
            debug!(expiry_date = %session.not_after, "Verification failed on an expired certificate.");
            Ok(session)
        }
        _ => Err(error),
    }
}

fn session_with(host: &str, port: u16, timeout: Duration, verify: bool) -> Result<TlsSession, TransportError> {
    let connector = TlsConnector::builder()
        .danger_accept_invalid_certs(!verify)
        .build()
        .map_err(|e| TransportError::Protocol(format!("TlsConnector Error: {}", e)))?;
    let stream = connect_tcp(host, port, timeout)?;

    debug!(host, verify, "Performing TLS handshake.");
    let stream = connector
        .connect(host, stream)
        .map_err(|e| TransportError::Protocol(format!("TLS Handshake Error: {}", e)))?;

    let cert = match stream.peer_certificate() {
        Ok(Some(c)) => c,
        Ok(None) => return Err(TransportError::Protocol("Server did not provide a certificate.".to_string())),
        Err(e) => return Err(TransportError::Protocol(format!("Could not get peer certificate: {}", e))),
    };
    let cert_der = cert
        .to_der()
        .map_err(|e| TransportError::Parse(format!("Could not convert certificate to DER: {}", e)))?;
    let (_, x509) = parse_x509_certificate(&cert_der)
        .map_err(|e| TransportError::Parse(format!("X.509 Parse Error: {}", e)))?;

    info!(subject = %x509.subject(), issuer = %x509.issuer(), "Successfully parsed certificate.");
    let not_after = asn1_time_to_chrono_utc(&x509.validity().not_after);
    let version = probe_version(host, port, timeout, verify);

    Ok(TlsSession { version, not_after })
}

fn connect_tcp(host: &str, port: u16, timeout: Duration) -> Result<TcpStream, TransportError> {
    let addr = (host, port)
        .to_socket_addrs()
        .map_err(|e| TransportError::Resolution(e.to_string()))?
        .next()
        .ok_or_else(|| TransportError::Resolution(format!("{} has no addresses", host)))?;
    let stream = TcpStream::connect_timeout(&addr, timeout).map_err(|e| TransportError::Connection(e.to_string()))?;
    stream
        .set_read_timeout(Some(timeout))
        .and_then(|_| stream.set_write_timeout(Some(timeout)))
        .map_err(|e| TransportError::Connection(e.to_string()))?;
    Ok(stream)
}

/// Succeeds if a handshake restricted to `[min, max]` completes.
fn handshake_within(
    host: &str,
    port: u16,
    timeout: Duration,
    verify: bool,
    min: Option<Protocol>,
    max: Option<Protocol>,
) -> bool {
    let Ok(connector) = TlsConnector::builder()
        .danger_accept_invalid_certs(!verify)
        .min_protocol_version(min)
        .max_protocol_version(max)
        .build()
    else {
        return false;
    };
    connect_tcp(host, port, timeout)
        .map(|stream| connector.connect(host, stream).is_ok())
        .unwrap_or(false)
}

fn probe_version(host: &str, port: u16, timeout: Duration, verify: bool) -> TlsVersion {
    if handshake_within(host, port, timeout, verify, Some(Protocol::Tlsv12), None) {
        TlsVersion::Modern
    } else if handshake_within(host, port, timeout, verify, Some(Protocol::Tlsv11), Some(Protocol::Tlsv11)) {
        TlsVersion::Tls11
    } else {
        debug!(host, "Only legacy handshakes succeeded; assuming TLSv1.0.");
        TlsVersion::Tls10
    }
}

fn asn1_time_to_chrono_utc(time: &ASN1Time) -> DateTime<Utc> {
    DateTime::from_timestamp(time.timestamp(), 0).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    fn handshake_error() -> TransportError {
        TransportError::Protocol("TLS Handshake Error: certificate has expired".into())
    }

    #[test]
    fn expired_certificate_is_recovered_as_a_session() {
        let now = Utc::now();
        let expired = TlsSession { version: TlsVersion::Modern, not_after: now - ChronoDuration::days(2) };
        let result = recover_expired(handshake_error(), || Ok(expired.clone()), now);
        assert_eq!(result, Ok(expired));
    }

    #[test]
    fn other_verification_failures_keep_the_error() {
        let now = Utc::now();
        let valid = TlsSession { version: TlsVersion::Modern, not_after: now + ChronoDuration::days(30) };
        assert_eq!(recover_expired(handshake_error(), || Ok(valid), now), Err(handshake_error()));
        assert_eq!(
            recover_expired(handshake_error(), || Err(TransportError::Connection("reset".into())), now),
            Err(handshake_error())
        );
    }
}
