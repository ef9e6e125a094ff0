// src/core/summary.rs

use crate::core::models::{ComplianceScores, Finding, Grade};

/// Compliance below this is called out as lagging.
const LAGGING_THRESHOLD: u32 = 60;

/// Builds the plain-language synthesis shown at the top of a report.
///
/// Three sentences joined by spaces: an opening keyed by grade, an issue count,
/// and a compliance remark about the weakest framework. Unreachable targets get
/// a single fixed sentence instead.
pub fn summarize(
    grade: Grade,
    score: u32,
    findings: &[Finding],
    compliance: &ComplianceScores,
    is_live: bool,
) -> String {
    if !is_live {
        return format!(
            "CRITICAL: The asset is unreachable or does not exist. Security posture cannot be verified. \
             This represents a total loss of availability (Score: {score}/100)."
        );
    }

    let opening = match grade {
        Grade::A => format!("Security posture is robust (Score: {score}/100)."),
        Grade::B => format!("Security posture is healthy (Score: {score}/100) with minor gaps."),
        Grade::C => format!("Elevated risk detected (Score: {score}/100)."),
        _ => format!("CRITICAL RISK (Score: {score}/100). Immediate action required."),
    };

    let severe: Vec<&Finding> = findings.iter().filter(|f| f.severity.is_severe()).collect();
    let issues = match severe.first() {
        Some(first) => format!("Identified {} critical issues in {}.", severe.len(), first.category),
        None if !findings.is_empty() => {
            format!("Found {} moderate configuration issues.", findings.len())
        }
        None => "No major external vulnerabilities found.".to_string(),
    };

    let (weakest, value) = compliance.weakest();
    let compliance_text = if value < LAGGING_THRESHOLD {
        format!("However, {weakest} compliance is lagging ({value}%) due to missing governance controls.")
    } else {
        "Compliance maturity aligns with industry standards.".to_string()
    };

    format!("{opening} {issues} {compliance_text}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::knowledge_base::enrich;
    use crate::core::models::Severity;

    fn scores(iso: u32, nist: u32, gdpr: u32) -> ComplianceScores {
        ComplianceScores { iso, nist, gdpr }
    }

    #[test]
    fn unreachable_is_a_fixed_sentence() {
        let text = summarize(Grade::F, 0, &[], &scores(0, 0, 0), false);
        assert!(text.starts_with("CRITICAL: The asset is unreachable"));
        assert!(text.ends_with("(Score: 0/100)."));
    }

    #[test]
    fn clean_target_reads_as_robust() {
        let text = summarize(Grade::A, 100, &[], &scores(70, 60, 100), true);
        assert_eq!(
            text,
            "Security posture is robust (Score: 100/100). No major external vulnerabilities found. \
             Compliance maturity aligns with industry standards."
        );
    }

    #[test]
    fn severe_findings_name_the_first_category() {
        let findings = vec![
            enrich(Finding::new("No WAF Detected", Severity::Low, "")),
            enrich(Finding::new("Obsolete TLS", Severity::High, "")),
            enrich(Finding::new("Missing DMARC", Severity::High, "")),
        ];
        let text = summarize(Grade::D, 65, &findings, &scores(45, 39, 13), true);
        assert!(text.starts_with("CRITICAL RISK (Score: 65/100)."));
        assert!(text.contains("Identified 2 critical issues in Encryption."));
        assert!(text.ends_with("However, GDPR compliance is lagging (13%) due to missing governance controls."));
    }

    #[test]
    fn moderate_findings_are_counted() {
        let findings = vec![
            enrich(Finding::new("Missing HSTS", Severity::Medium, "")),
            enrich(Finding::new("No WAF Detected", Severity::Low, "")),
        ];
        let text = summarize(Grade::B, 80, &findings, &scores(86, 88, 96), true);
        assert!(text.starts_with("Security posture is healthy (Score: 80/100) with minor gaps."));
        assert!(text.contains("Found 2 moderate configuration issues."));
    }

    #[test]
    fn ties_resolve_to_iso_first() {
        let text = summarize(Grade::C, 75, &[], &scores(30, 30, 30), true);
        assert!(text.contains("However, ISO compliance is lagging (30%)"));
    }
}
