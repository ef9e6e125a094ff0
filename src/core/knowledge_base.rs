//! Static, read-only taxonomy that files findings under a risk category and
//! tags them with ISO 27001 / NIST CSF / MITRE ATT&CK references.
//!
//! Entries are matched against a finding's title by case-insensitive substring,
//! in declaration order. The first matching entry wins.

use crate::core::models::{Category, ComplianceTags, Finding};

/// One row of the taxonomy: a title fragment and what it maps to.
pub struct TaxonomyEntry {
    /// Fragment looked for (case-insensitively) in the finding title.
    pub key: &'static str,
    pub category: Category,
    pub iso: &'static str,
    pub nist: &'static str,
    pub mitre: &'static str,
}

impl TaxonomyEntry {
    fn matches(&self, lowered_title: &str) -> bool {
        lowered_title.contains(&self.key.to_lowercase())
    }

    fn tags(&self) -> ComplianceTags {
        ComplianceTags {
            iso: self.iso.to_string(),
            nist: self.nist.to_string(),
            mitre: self.mitre.to_string(),
        }
    }
}

static TAXONOMY: &[TaxonomyEntry] = &[
    // --- Application layer ---
    TaxonomyEntry { key: "Missing HSTS", category: Category::AppSec, iso: "A.14.1.2", nist: "PR.DS-2", mitre: "T1595" },
    TaxonomyEntry { key: "Missing Clickjack", category: Category::AppSec, iso: "A.14.1.3", nist: "PR.IP-1", mitre: "T1189" },
    TaxonomyEntry { key: "Server Version", category: Category::AppSec, iso: "A.12.6.1", nist: "PR.IP-12", mitre: "T1592" },
    // --- Transport encryption ---
    TaxonomyEntry { key: "SSL Expired", category: Category::Encryption, iso: "A.10.1.1", nist: "PR.DS-1", mitre: "T1589" },
    TaxonomyEntry { key: "SSL Handshake Failed", category: Category::Encryption, iso: "A.10.1.1", nist: "PR.DS-1", mitre: "T1589" },
    TaxonomyEntry { key: "Obsolete TLS", category: Category::Encryption, iso: "A.10.1.1", nist: "PR.DS-2", mitre: "T1040" },
    // --- Network exposure ---
    TaxonomyEntry { key: "Open Port", category: Category::NetworkSec, iso: "A.13.1.1", nist: "PR.AC-3", mitre: "T1190" },
    TaxonomyEntry { key: "Shadow IT", category: Category::NetworkSec, iso: "A.8.1.1", nist: "ID.AM-1", mitre: "T1583" },
    // --- Email & brand ---
    TaxonomyEntry { key: "Missing DMARC", category: Category::BrandProtection, iso: "A.13.2.1", nist: "PR.DS-5", mitre: "T1566" },
    TaxonomyEntry { key: "Missing SPF", category: Category::BrandProtection, iso: "A.13.2.1", nist: "PR.DS-5", mitre: "T1566" },
    // --- Privacy & governance ---
    TaxonomyEntry { key: "Missing Privacy Policy", category: Category::DataPrivacy, iso: "A.18.1.4", nist: "ID.GV-3", mitre: "-" },
    TaxonomyEntry { key: "Missing Cookie Banner", category: Category::DataPrivacy, iso: "A.18.1.4", nist: "ID.GV-3", mitre: "-" },
    TaxonomyEntry { key: "Missing Security.txt", category: Category::CorpGovernance, iso: "A.12.6.1", nist: "ID.RA-1", mitre: "-" },
    // --- Resilience ---
    TaxonomyEntry { key: "No WAF Detected", category: Category::Resilience, iso: "A.13.1", nist: "PR.PT-4", mitre: "T1498" },
    TaxonomyEntry { key: "Missing DNSSEC", category: Category::Resilience, iso: "A.10.1.2", nist: "PR.DS-5", mitre: "T1098" },
];

/// Finds the taxonomy entry for a finding title, if any.
pub fn lookup(title: &str) -> Option<&'static TaxonomyEntry> {
    let lowered = title.to_lowercase();
    TAXONOMY.iter().find(|entry| entry.matches(&lowered))
}

/// Fills in a finding's category and compliance tags from its title.
///
/// Unmatched titles land in `General` with every framework reference set to "-".
/// The result depends only on the title, so enriching twice is the same as once.
pub fn enrich(mut finding: Finding) -> Finding {
    match lookup(&finding.title) {
        Some(entry) => {
            finding.category = entry.category;
            finding.compliance = entry.tags();
        }
        None => {
            finding.category = Category::General;
            finding.compliance = ComplianceTags::default();
        }
    }
    finding
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::Severity;

    #[test]
    fn matches_case_insensitively() {
        let finding = enrich(Finding::new("missing hsts", Severity::Medium, "No HSTS."));
        assert_eq!(finding.category, Category::AppSec);
        assert_eq!(finding.compliance.iso, "A.14.1.2");
        assert_eq!(finding.compliance.nist, "PR.DS-2");
        assert_eq!(finding.compliance.mitre, "T1595");
    }

    #[test]
    fn matches_title_fragments() {
        let finding = enrich(Finding::new("Obsolete TLS (TLSv1.0)", Severity::High, "Old TLS."));
        assert_eq!(finding.category, Category::Encryption);
        assert_eq!(finding.compliance.mitre, "T1040");
    }

    #[test]
    fn unknown_titles_fall_back_to_general() {
        let finding = enrich(Finding::new("Asset Unreachable", Severity::Critical, "Server offline."));
        assert_eq!(finding.category, Category::General);
        assert_eq!(finding.compliance, ComplianceTags::default());
    }

    #[test]
    fn first_declared_entry_wins() {
        // Contains both "Missing DMARC" and "Missing SPF"; DMARC is declared first.
        let finding = enrich(Finding::new("Missing SPF and Missing DMARC", Severity::High, ""));
        assert_eq!(finding.category, Category::BrandProtection);
        let finding = enrich(Finding::new("SSL Expired / Obsolete TLS", Severity::High, ""));
        assert_eq!(finding.compliance.nist, "PR.DS-1");
    }

    #[test]
    fn enrichment_is_idempotent() {
        for title in ["Missing DNSSEC", "No WAF Detected", "Something Else", "Missing Privacy Policy"] {
            let once = enrich(Finding::new(title, Severity::Low, "x"));
            let twice = enrich(once.clone());
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn every_entry_is_reachable_by_its_own_key() {
        for entry in TAXONOMY {
            let found = lookup(entry.key).map(|e| e.key);
            assert_eq!(found, Some(entry.key));
        }
    }
}
