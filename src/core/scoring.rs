// src/core/scoring.rs

//! Deduction arithmetic: overall score and grade, per-category grades and the
//! derived compliance framework scores. Every function here recomputes from the
//! finding list it is given.

use std::collections::BTreeMap;

use tracing::debug;

use crate::core::models::{
    BreakdownEntry, Category, CategoryGrade, CategoryScore, ComplianceScores, Finding, Grade,
    PrivacySignals, ResilienceSignals,
};

/// Sum of severity weights over all findings.
pub fn total_deduction(findings: &[Finding]) -> u32 {
    findings.iter().map(|f| f.severity.weight()).sum()
}

/// `max(0, 100 - total deduction)`.
pub fn base_score(findings: &[Finding]) -> u32 {
    100u32.saturating_sub(total_deduction(findings))
}

/// Overall score and grade for a reachable target.
pub fn score(findings: &[Finding]) -> (u32, Grade) {
    let final_score = base_score(findings);
    let grade = Grade::from_score(final_score as i64);
    debug!(score = final_score, %grade, "Computed overall score.");
    (final_score, grade)
}

/// Running totals per tracked category.
///
/// Each category starts at 100 and loses the weight of every finding filed under
/// it, floored at 0. Unreachable targets get `NotApplicable` everywhere,
/// regardless of findings.
pub fn category_scores(findings: &[Finding], is_live: bool) -> BTreeMap<Category, CategoryScore> {
    if !is_live {
        return Category::tracked()
            .map(|c| (c, CategoryScore::NotApplicable))
            .collect();
    }

    let mut totals: BTreeMap<Category, u32> = Category::tracked().map(|c| (c, 100)).collect();
    for finding in findings {
        if let Some(total) = totals.get_mut(&finding.category) {
            *total = total.saturating_sub(finding.severity.weight());
        }
    }
    totals
        .into_iter()
        .map(|(c, total)| (c, CategoryScore::Numeric(total)))
        .collect()
}

pub fn category_grades(findings: &[Finding], is_live: bool) -> BTreeMap<Category, CategoryGrade> {
    category_scores(findings, is_live)
        .into_iter()
        .map(|(c, score)| (c, score.grade()))
        .collect()
}

/// Framework scores from the base score plus the privacy-policy and WAF flags.
///
/// iso = base*0.7 + waf*30, nist = base*0.6 + waf*40, gdpr = base*0.2 + policy*80,
/// each truncated. No upper clamp is applied.
pub fn compliance_scores(
    findings: &[Finding],
    privacy: &PrivacySignals,
    resilience: &ResilienceSignals,
) -> ComplianceScores {
    let base = base_score(findings) as f64;
    let p = if privacy.privacy_policy { 1.0 } else { 0.0 };
    let w = if resilience.has_waf() { 1.0 } else { 0.0 };

    ComplianceScores {
        iso: (base * 0.7 + w * 30.0) as u32,
        nist: (base * 0.6 + w * 40.0) as u32,
        gdpr: (base * 0.2 + p * 80.0) as u32,
    }
}

/// Pairs each finding title with the points it cost.
pub fn breakdown(findings: &[Finding]) -> Vec<BreakdownEntry> {
    findings
        .iter()
        .map(|f| BreakdownEntry {
            reason: f.title.clone(),
            points: f.severity.weight(),
        })
        .collect()
}
