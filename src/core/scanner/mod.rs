// src/core/scanner/mod.rs

// This file acts as the public interface for the `scanner` module.
// It declares every probe and the orchestration that ties them together.
pub mod dns_scanner;
pub mod fingerprint_scanner;
pub mod headers_scanner;
pub mod privacy_scanner;
pub mod resilience_scanner;
pub mod security_txt_scanner;
pub mod ssl_scanner;
pub mod subdomain_scanner;
pub mod whois_scanner;

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use strum::IntoEnumIterator;
use tracing::{debug, error, info, warn};

use crate::config::ScanConfig;
use crate::core::knowledge_base::enrich;
use crate::core::models::{
    ComplianceSignals, EmailSecurity, Finding, Grade, Identity, PrivacySignals, ProbeKind,
    ResilienceSignals, ScanResult, Severity, Technology, TlsSignals,
};
use crate::core::scoring;
use crate::core::summary::summarize;
use crate::core::transport::{Capabilities, Method};

use self::dns_scanner::run_email_scan;
use self::fingerprint_scanner::run_fingerprint_scan;
use self::headers_scanner::run_headers_scan;
use self::privacy_scanner::run_privacy_scan;
use self::resilience_scanner::run_resilience_scan;
use self::security_txt_scanner::run_security_txt_scan;
use self::ssl_scanner::run_ssl_scan;
use self::subdomain_scanner::run_subdomain_scan;
use self::whois_scanner::run_whois_scan;

/// What a single probe hands back: its own deduction, its findings (already
/// enriched) and its probe-specific signals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProbeOutcome<S> {
    pub deduction: u32,
    pub findings: Vec<Finding>,
    pub signals: S,
}

impl<S: Default> ProbeOutcome<S> {
    pub fn with_signals(signals: S) -> Self {
        Self {
            deduction: 0,
            findings: Vec::new(),
            signals,
        }
    }

    /// Records an enriched finding together with the probe's deduction for it.
    pub fn flag(&mut self, title: &str, severity: Severity, description: &str, deduction: u32) {
        debug!(title, %severity, deduction, "Adding finding.");
        self.findings.push(enrich(Finding::new(title, severity, description)));
        self.deduction += deduction;
    }
}

/// Everything a probe needs, cheap to clone into its own task.
#[derive(Clone)]
pub struct ProbeContext {
    /// Normalised domain, e.g. `example.com`.
    pub domain: String,
    /// Primary web endpoint, `https://<domain>`.
    pub url: String,
    pub caps: Capabilities,
    pub config: Arc<ScanConfig>,
}

#[cfg(test)]
pub(crate) fn test_context(net: crate::core::transport::fake::FakeNet) -> ProbeContext {
    ProbeContext {
        domain: "example.com".to_string(),
        url: "https://example.com".to_string(),
        caps: net.capabilities(),
        config: Arc::new(ScanConfig::default()),
    }
}

/// The raw outcome of all nine probes, before aggregation.
#[derive(Debug, Clone, Default)]
pub struct ProbeResults {
    pub headers: ProbeOutcome<()>,
    pub tls: ProbeOutcome<TlsSignals>,
    pub whois: ProbeOutcome<Identity>,
    pub email: ProbeOutcome<EmailSecurity>,
    pub subdomains: ProbeOutcome<Vec<String>>,
    pub security_txt: ProbeOutcome<bool>,
    pub tech: ProbeOutcome<Vec<Technology>>,
    pub privacy: ProbeOutcome<PrivacySignals>,
    pub resilience: ProbeOutcome<ResilienceSignals>,
}

impl ProbeResults {
    fn deductions(&self) -> BTreeMap<ProbeKind, u32> {
        ProbeKind::iter()
            .map(|kind| {
                let deduction = match kind {
                    ProbeKind::Headers => self.headers.deduction,
                    ProbeKind::Tls => self.tls.deduction,
                    ProbeKind::Whois => self.whois.deduction,
                    ProbeKind::Email => self.email.deduction,
                    ProbeKind::Subdomains => self.subdomains.deduction,
                    ProbeKind::SecurityTxt => self.security_txt.deduction,
                    ProbeKind::TechStack => self.tech.deduction,
                    ProbeKind::Privacy => self.privacy.deduction,
                    ProbeKind::Resilience => self.resilience.deduction,
                };
                (kind, deduction)
            })
            .collect()
    }

    /// All findings in report order: headers, tls, email, subdomains,
    /// security.txt, privacy, resilience, tech.
    fn findings(&self) -> Vec<Finding> {
        [
            &self.headers.findings,
            &self.tls.findings,
            &self.email.findings,
            &self.subdomains.findings,
            &self.security_txt.findings,
            &self.privacy.findings,
            &self.resilience.findings,
            &self.tech.findings,
        ]
        .into_iter()
        .flatten()
        .cloned()
        .collect()
    }
}

/// Strips scheme prefixes and anything after the host, and lowercases it, e.g.
/// `https://Example.com/path?q=1` becomes `example.com`.
pub fn normalize_domain(input: &str) -> String {
    let mut rest = input.trim();
    loop {
        let lowered = rest.to_ascii_lowercase();
        if lowered.starts_with("https://") {
            rest = &rest["https://".len()..];
        } else if lowered.starts_with("http://") {
            rest = &rest["http://".len()..];
        } else {
            break;
        }
    }
    rest.split(['/', '?', '#'])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase()
}

/// One best-effort request to the primary endpoint. Any response counts as live,
/// whatever its status.
pub async fn check_liveness(ctx: &ProbeContext) -> bool {
    match ctx
        .caps
        .http
        .fetch(&ctx.url, Method::Get, ctx.config.timeouts.liveness())
        .await
    {
        Ok(response) => {
            info!(url = %ctx.url, status = response.status, "Target is live.");
            true
        }
        Err(e) => {
            warn!(url = %ctx.url, error = %e, "Target is unreachable.");
            false
        }
    }
}

/// Runs a probe in its own task so a panic stays inside that probe.
///
/// Disabled probes (liveness gate closed) are not started and report a neutral
/// outcome.
async fn isolated<S, F>(kind: ProbeKind, enabled: bool, probe: F) -> ProbeOutcome<S>
where
    S: Default + Send + 'static,
    F: Future<Output = ProbeOutcome<S>> + Send + 'static,
{
    if !enabled {
        debug!(probe = %kind, "Skipping probe: target is not live.");
        return ProbeOutcome::default();
    }
    match tokio::spawn(probe).await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(probe = %kind, error = %e, "Probe task failed; using a neutral result.");
            ProbeOutcome::default()
        }
    }
}

/// Runs all nine probes concurrently and waits for every one of them.
pub async fn run_probes(ctx: &ProbeContext, is_live: bool) -> ProbeResults {
    macro_rules! probe {
        ($kind:expr, $enabled:expr, $run:ident) => {{
            let ctx = ctx.clone();
            isolated($kind, $enabled, async move { $run(&ctx).await })
        }};
    }

    let (headers, tls, whois, email, subdomains, security_txt, tech, privacy, resilience) = tokio::join!(
        probe!(ProbeKind::Headers, is_live, run_headers_scan),
        probe!(ProbeKind::Tls, is_live, run_ssl_scan),
        probe!(ProbeKind::Whois, true, run_whois_scan),
        probe!(ProbeKind::Email, true, run_email_scan),
        probe!(ProbeKind::Subdomains, is_live, run_subdomain_scan),
        probe!(ProbeKind::SecurityTxt, is_live, run_security_txt_scan),
        probe!(ProbeKind::TechStack, is_live, run_fingerprint_scan),
        probe!(ProbeKind::Privacy, is_live, run_privacy_scan),
        probe!(ProbeKind::Resilience, is_live, run_resilience_scan),
    );

    ProbeResults {
        headers,
        tls,
        whois,
        email,
        subdomains,
        security_txt,
        tech,
        privacy,
        resilience,
    }
}

fn unreachable_finding() -> Finding {
    enrich(Finding::new(
        "Asset Unreachable",
        Severity::Critical,
        "Server offline. The primary web endpoint did not respond.",
    ))
}

/// Turns raw probe results into the final report.
///
/// For an unreachable target every finding and every liveness-gated signal is
/// discarded: the report carries exactly one "Asset Unreachable" finding, score
/// 0, grade F and no category grades. Only the WHOIS identity and email record,
/// which do not depend on the web endpoint, are kept.
pub fn assemble(domain: &str, is_live: bool, probes: ProbeResults) -> ScanResult {
    let (findings, score, grade, probe_deductions, probes) = if is_live {
        let findings = probes.findings();
        let (score, grade) = scoring::score(&findings);
        let deductions = probes.deductions();
        (findings, score, grade, deductions, probes)
    } else {
        let kept = ProbeResults {
            whois: ProbeOutcome::with_signals(probes.whois.signals),
            email: ProbeOutcome::with_signals(probes.email.signals),
            ..Default::default()
        };
        (vec![unreachable_finding()], 0, Grade::F, BTreeMap::new(), kept)
    };

    let compliance_scores =
        scoring::compliance_scores(&findings, &probes.privacy.signals, &probes.resilience.signals);
    let category_grades = scoring::category_grades(&findings, is_live);
    let summary = summarize(grade, score, &findings, &compliance_scores, is_live);
    let breakdown = scoring::breakdown(&findings);

    ScanResult {
        domain: domain.to_string(),
        is_live,
        grade,
        score,
        findings,
        identity: probes.whois.signals,
        security_txt: probes.security_txt.signals,
        tls: probes.tls.signals,
        email_security: probes.email.signals,
        subdomains: probes.subdomains.signals,
        technologies: probes.tech.signals,
        compliance: ComplianceSignals {
            privacy: probes.privacy.signals,
            resilience: probes.resilience.signals,
        },
        category_grades,
        compliance_scores,
        summary,
        breakdown,
        probe_deductions,
    }
}

/// Scans one domain end to end and returns the complete report.
///
/// Single pass: normalise, check liveness, run every probe concurrently, then
/// aggregate. Never fails; transport problems show up as findings or neutral
/// signals.
///
/// # Arguments
///
/// * `target` - The domain to scan; a scheme prefix or path suffix is tolerated.
/// * `caps` - Transport capabilities the probes use.
/// * `config` - Timeouts and endpoints.
pub async fn run_full_scan(target: &str, caps: &Capabilities, config: &ScanConfig) -> ScanResult {
    let domain = normalize_domain(target);
    info!(target = %domain, "Starting full scan.");

    let ctx = ProbeContext {
        url: format!("https://{}", domain),
        domain: domain.clone(),
        caps: caps.clone(),
        config: Arc::new(config.clone()),
    };

    let is_live = check_liveness(&ctx).await;
    let probes = run_probes(&ctx, is_live).await;
    let result = assemble(&domain, is_live, probes);

    info!(
        target = %domain,
        is_live,
        score = result.score,
        grade = %result.grade,
        findings = result.findings.len(),
        "Full scan finished."
    );
    result
}
