// src/core/scanner/privacy_scanner.rs

use tracing::{debug, info};

use crate::core::models::{PrivacySignals, Severity};
use crate::core::scanner::{ProbeContext, ProbeOutcome};
use crate::core::transport::html::Page;
use crate::core::transport::{HttpResponse, Method, TransportError};

const POLICY_KEYWORDS: &[&str] = &["privacy policy", "privacy notice", "data policy", "data protection"];
const COOKIE_KEYWORDS: &[&str] = &["cookie", "consent", "onetrust"];
/// Footers usually carry the policy link, so only the tail of the page text is searched.
const FOOTER_CHARS: usize = 3000;
const SOC2_BADGE: &str = "SOC 2";

/// Looks for a privacy policy, a cookie banner and trust badges on the home page.
///
/// # Arguments
/// * `ctx` - Probe context; the primary URL is fetched with the privacy timeout.
///
/// # Returns
/// The privacy signals, plus a "Missing Privacy Policy" finding when the page
/// loaded but no policy was referenced.
pub async fn run_privacy_scan(ctx: &ProbeContext) -> ProbeOutcome<PrivacySignals> {
    info!(target = %ctx.url, "Starting privacy compliance scan.");
    let response = ctx
        .caps
        .http
        .fetch(&ctx.url, Method::Get, ctx.config.timeouts.privacy())
        .await;
    let outcome = analyze_privacy(response);
    info!(
        findings = outcome.findings.len(),
        privacy_policy = outcome.signals.privacy_policy,
        cookie_banner = outcome.signals.cookie_banner,
        "Privacy compliance scan finished."
    );
    outcome
}

pub(crate) fn analyze_privacy(response: Result<HttpResponse, TransportError>) -> ProbeOutcome<PrivacySignals> {
    let response = match response {
        Ok(response) => response,
        Err(e) => {
            debug!(error = %e, "Privacy page request failed.");
            return ProbeOutcome::default();
        }
    };

    let page = Page::parse(&response.body);
    let mut outcome = ProbeOutcome::with_signals(PrivacySignals {
        privacy_policy: has_policy_reference(&page),
        cookie_banner: contains_any(&page.markup().to_lowercase(), COOKIE_KEYWORDS),
        trust_badges: Vec::new(),
    });

    if page
        .image_alts()
        .iter()
        .any(|alt| alt.to_lowercase().contains("soc"))
    {
        outcome.signals.trust_badges.push(SOC2_BADGE.to_string());
    }

    if !outcome.signals.privacy_policy {
        outcome.flag(
            "Missing Privacy Policy",
            Severity::Medium,
            "No privacy or data policy link was found on the home page.",
            20,
        );
    }
    outcome
}

fn has_policy_reference(page: &Page) -> bool {
    if page
        .link_texts()
        .iter()
        .any(|text| contains_any(&text.to_lowercase(), POLICY_KEYWORDS))
    {
        debug!("Privacy policy link found.");
        return true;
    }
    let text = page.text().to_lowercase();
    let skip = text.chars().count().saturating_sub(FOOTER_CHARS);
    let footer: String = text.chars().skip(skip).collect();
    contains_any(&footer, POLICY_KEYWORDS)
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::Category;
    use crate::core::transport::fake::ok;

    fn page(body: &str) -> Result<HttpResponse, TransportError> {
        Ok(ok(200, &[], body))
    }

    #[test]
    fn detects_policy_banner_and_badge() {
        let outcome = analyze_privacy(page(
            r#"<html><body>
                <script src="https://cdn.cookielaw.org/onetrust.js"></script>
                <a href="/legal">Data Protection</a>
                <img alt="AICPA SOC 2 Type II"><img alt="soc2">
            </body></html>"#,
        ));
        assert!(outcome.findings.is_empty());
        assert!(outcome.signals.privacy_policy);
        assert!(outcome.signals.cookie_banner);
        assert_eq!(outcome.signals.trust_badges, vec!["SOC 2".to_string()]);
    }

    #[test]
    fn policy_mention_in_footer_text_counts() {
        let filler = "lorem ipsum ".repeat(1000);
        let body = format!("<html><body><p>{}</p><footer>Read our privacy notice.</footer></body></html>", filler);
        assert!(analyze_privacy(page(&body)).signals.privacy_policy);
    }

    #[test]
    fn policy_mention_outside_the_footer_window_is_missed() {
        let filler = "lorem ipsum ".repeat(1000);
        let body = format!("<html><body><p>See our privacy policy.</p><p>{}</p></body></html>", filler);
        let outcome = analyze_privacy(page(&body));
        assert!(!outcome.signals.privacy_policy);
        assert_eq!(outcome.deduction, 20);
        assert_eq!(outcome.findings[0].title, "Missing Privacy Policy");
        assert_eq!(outcome.findings[0].category, Category::DataPrivacy);
    }

    #[test]
    fn failures_yield_neutral_signals() {
        let outcome = analyze_privacy(Err(TransportError::Timeout(std::time::Duration::from_secs(5))));
        assert_eq!(outcome, ProbeOutcome::default());
    }
}
