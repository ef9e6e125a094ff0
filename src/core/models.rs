// src/core/models.rs

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use strum::{Display, EnumIter, IntoEnumIterator};

// --- Findings ---

/// Severity of a finding. Every severity maps to a fixed deduction weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    /// Anything a probe (or an external producer) labelled with a severity we do
    /// not know. Deducts nothing.
    #[serde(other)]
    Unknown,
}

impl Severity {
    /// Points deducted from the 100-point baseline for one finding of this severity.
    ///
    /// This is the single weight table shared by overall scoring, category grading
    /// and the compliance base score.
    pub fn weight(self) -> u32 {
        match self {
            Severity::Critical => 40,
            Severity::High => 25,
            Severity::Medium => 15,
            Severity::Low => 5,
            Severity::Unknown => 0,
        }
    }

    pub fn is_severe(self) -> bool {
        matches!(self, Severity::Critical | Severity::High)
    }
}

/// The risk category a finding is filed under.
///
/// Seven categories are tracked for per-category grading; `General` collects
/// everything the taxonomy does not recognise.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, EnumIter,
)]
pub enum Category {
    #[serde(rename = "Network Sec")]
    #[strum(serialize = "Network Sec")]
    NetworkSec,
    #[serde(rename = "App Sec")]
    #[strum(serialize = "App Sec")]
    AppSec,
    Encryption,
    #[serde(rename = "Data Privacy")]
    #[strum(serialize = "Data Privacy")]
    DataPrivacy,
    #[serde(rename = "Corp Governance")]
    #[strum(serialize = "Corp Governance")]
    CorpGovernance,
    Resilience,
    #[serde(rename = "Brand Protection")]
    #[strum(serialize = "Brand Protection")]
    BrandProtection,
    General,
}

impl Category {
    pub fn is_tracked(self) -> bool {
        self != Category::General
    }

    /// The seven categories that receive a grade, in display order.
    pub fn tracked() -> impl Iterator<Item = Category> {
        Category::iter().filter(|c| c.is_tracked())
    }
}

/// Compliance framework references attached to a finding by the taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceTags {
    pub iso: String,
    pub nist: String,
    pub mitre: String,
}

impl Default for ComplianceTags {
    fn default() -> Self {
        Self {
            iso: "-".to_string(),
            nist: "-".to_string(),
            mitre: "-".to_string(),
        }
    }
}

/// A single detected issue.
///
/// Probes create findings through [`Finding::new`]; `category` and `compliance`
/// are filled in once by the knowledge base (see `knowledge_base::enrich`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub title: String,
    pub severity: Severity,
    pub description: String,
    pub category: Category,
    pub compliance: ComplianceTags,
}

impl Finding {
    pub fn new(title: &str, severity: Severity, description: &str) -> Self {
        Self {
            title: title.to_string(),
            severity,
            description: description.to_string(),
            category: Category::General,
            compliance: ComplianceTags::default(),
        }
    }
}

// --- Grades & scores ---

/// Letter grade derived from a 0-100 score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Display)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    /// Fixed thresholds: >=90 A, >=80 B, >=70 C, >=60 D, else F.
    pub fn from_score(score: i64) -> Self {
        match score {
            s if s >= 90 => Grade::A,
            s if s >= 80 => Grade::B,
            s if s >= 70 => Grade::C,
            s if s >= 60 => Grade::D,
            _ => Grade::F,
        }
    }
}

/// Running score of one category. Unreachable targets have no category scores at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryScore {
    Numeric(u32),
    NotApplicable,
}

impl CategoryScore {
    pub fn grade(self) -> CategoryGrade {
        match self {
            CategoryScore::Numeric(value) => CategoryGrade::Graded(Grade::from_score(value as i64)),
            CategoryScore::NotApplicable => CategoryGrade::NotApplicable,
        }
    }
}

/// Letter grade of a category, or "N/A" when the target could not be assessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryGrade {
    Graded(Grade),
    NotApplicable,
}

impl fmt::Display for CategoryGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryGrade::Graded(grade) => write!(f, "{}", grade),
            CategoryGrade::NotApplicable => write!(f, "N/A"),
        }
    }
}

impl Serialize for CategoryGrade {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// The three compliance frameworks, in tie-break order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum Framework {
    #[strum(serialize = "ISO")]
    Iso,
    #[strum(serialize = "NIST")]
    Nist,
    #[strum(serialize = "GDPR")]
    Gdpr,
}

/// Derived framework scores. Deliberately not clamped to 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ComplianceScores {
    pub iso: u32,
    pub nist: u32,
    pub gdpr: u32,
}

impl ComplianceScores {
    pub fn score(&self, framework: Framework) -> u32 {
        match framework {
            Framework::Iso => self.iso,
            Framework::Nist => self.nist,
            Framework::Gdpr => self.gdpr,
        }
    }

    /// The framework with the lowest score; ties go to the first in ISO, NIST, GDPR order.
    pub fn weakest(&self) -> (Framework, u32) {
        Framework::iter()
            .map(|fw| (fw, self.score(fw)))
            .fold(None, |lowest: Option<(Framework, u32)>, current| match lowest {
                Some(low) if low.1 <= current.1 => Some(low),
                _ => Some(current),
            })
            .unwrap_or((Framework::Iso, self.iso))
    }
}

// --- Signal bundles ---

/// Registration identity of the domain, from WHOIS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub registrar: String,
    pub country: String,
    pub age: i32,
}

impl Default for Identity {
    fn default() -> Self {
        Self {
            registrar: "Unknown".to_string(),
            country: "Unknown".to_string(),
            age: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TlsSignals {
    pub version: String,
    pub expires: Option<DateTime<Utc>>,
}

impl Default for TlsSignals {
    fn default() -> Self {
        Self {
            version: "Unknown".to_string(),
            expires: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailSecurity {
    /// The DMARC record text, or "Missing".
    pub dmarc: String,
    pub spf: Option<String>,
}

impl Default for EmailSecurity {
    fn default() -> Self {
        Self {
            dmarc: "Missing".to_string(),
            spf: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Technology {
    pub name: String,
    pub kind: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PrivacySignals {
    pub privacy_policy: bool,
    pub cookie_banner: bool,
    pub trust_badges: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResilienceSignals {
    /// Name of the detected WAF / CDN vendor.
    pub waf: Option<String>,
    pub dnssec: bool,
}

impl ResilienceSignals {
    pub fn has_waf(&self) -> bool {
        self.waf.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ComplianceSignals {
    pub privacy: PrivacySignals,
    pub resilience: ResilienceSignals,
}

// --- Main report ---

/// Identifies one of the nine probes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Display, EnumIter)]
#[serde(rename_all = "snake_case")]
pub enum ProbeKind {
    Headers,
    Tls,
    Whois,
    Email,
    Subdomains,
    SecurityTxt,
    TechStack,
    Privacy,
    Resilience,
}

/// One line of the score breakdown: a finding title and the points it cost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreakdownEntry {
    pub reason: String,
    pub points: u32,
}

/// The complete, final outcome of scanning one domain.
#[derive(Debug, Clone, Serialize)]
pub struct ScanResult {
    pub domain: String,
    pub is_live: bool,
    pub grade: Grade,
    pub score: u32,
    pub findings: Vec<Finding>,
    pub identity: Identity,
    pub security_txt: bool,
    pub tls: TlsSignals,
    pub email_security: EmailSecurity,
    pub subdomains: Vec<String>,
    pub technologies: Vec<Technology>,
    pub compliance: ComplianceSignals,
    pub category_grades: BTreeMap<Category, CategoryGrade>,
    pub compliance_scores: ComplianceScores,
    pub summary: String,
    pub breakdown: Vec<BreakdownEntry>,
    /// Deductions as reported by each probe, for reference next to `breakdown`.
    pub probe_deductions: BTreeMap<ProbeKind, u32>,
}
