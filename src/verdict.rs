//! Verdict data model shared by every source adapter and the decision engine.

use crate::normalization::CanonicalPhoneNumber;
use crate::patterns::PatternAssessment;
use crate::reputation::CallerDetails;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerdictType {
    Scam,
    Spam,
    Suspicious,
    Safe,
    Reliable,
    Unknown,
}

impl VerdictType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerdictType::Scam => "scam",
            VerdictType::Spam => "spam",
            VerdictType::Suspicious => "suspicious",
            VerdictType::Safe => "safe",
            VerdictType::Reliable => "reliable",
            VerdictType::Unknown => "unknown",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "scam" => Some(VerdictType::Scam),
            "spam" => Some(VerdictType::Spam),
            "suspicious" => Some(VerdictType::Suspicious),
            "safe" => Some(VerdictType::Safe),
            "reliable" => Some(VerdictType::Reliable),
            "unknown" => Some(VerdictType::Unknown),
            _ => None,
        }
    }
}

impl fmt::Display for VerdictType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    #[default]
    None,
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Thresholds used by the external aggregate: 100 / 50 / 25
    pub fn from_risk_score(score: u32) -> Self {
        match score {
            s if s >= 100 => RiskLevel::High,
            s if s >= 50 => RiskLevel::Medium,
            s if s >= 25 => RiskLevel::Low,
            _ => RiskLevel::None,
        }
    }

    /// Score contribution of a provider that reported at this level
    pub fn score_bonus(&self) -> u32 {
        match self {
            RiskLevel::High => 100,
            RiskLevel::Medium => 50,
            RiskLevel::Low => 25,
            RiskLevel::None => 0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::None => "none",
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "none" => Some(RiskLevel::None),
            "low" => Some(RiskLevel::Low),
            "medium" => Some(RiskLevel::Medium),
            "high" => Some(RiskLevel::High),
            _ => None,
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            RiskLevel::None => "✅",
            RiskLevel::Low | RiskLevel::Medium => "⚠️",
            RiskLevel::High => "🚨",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One source's finding for a number, built fresh per query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRecord {
    pub found: bool,
    pub verdict_type: VerdictType,
    pub risk_level: RiskLevel,
    pub report_count: u32,
    pub last_report_date: Option<NaiveDate>,
    pub description: String,
    pub category: String,
    pub source_name: String,
}

/// The merged answer for one checked number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedVerdict {
    pub phone_number: CanonicalPhoneNumber,
    /// False only for the no-evidence fallback
    pub found: bool,
    pub verdict_type: VerdictType,
    pub risk_level: RiskLevel,
    pub confidence: u8,
    pub report_count: u32,
    pub last_report_date: Option<NaiveDate>,
    pub description: String,
    pub category: String,
    pub category_label: String,
    pub source: String,
    pub contributing_sources: BTreeSet<String>,
    pub reasoning: String,
    pub caller_details: Option<CallerDetails>,
    pub pattern_assessment: Option<PatternAssessment>,
}

/// Clamp an arbitrary confidence accumulator into 0..=100
pub fn clamp_confidence(value: u32) -> u8 {
    value.min(100) as u8
}
