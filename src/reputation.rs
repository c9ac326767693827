//! Caller-reputation service in the style of a caller-ID lookup.
//!
//! The built-in [`ReputationHeuristic`] scores numbers by known suspicious
//! digit runs and falls back to a small random score drawn from an injected
//! [`RandomSource`]. Carrier, city and display name are descriptive only.

use crate::normalization::CanonicalPhoneNumber;
use crate::providers::{simulate_latency, ProviderError};
use crate::random::{NumberSeededRandom, RandomSource};
use crate::verdict::{RiskLevel, SourceRecord, VerdictType};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const REPUTATION_SOURCE: &str = "caller-reputation";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLabel {
    High,
    Medium,
    Low,
    Unrated,
}

impl ConfidenceLabel {
    pub fn score(&self) -> Option<u8> {
        match self {
            ConfidenceLabel::High => Some(90),
            ConfidenceLabel::Medium => Some(70),
            ConfidenceLabel::Low => Some(40),
            ConfidenceLabel::Unrated => None,
        }
    }
}

/// Display-only metadata about the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallerDetails {
    pub display_name: String,
    pub carrier: String,
    pub city: String,
    pub line_type: String,
    pub country_code: String,
    pub timezone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReputationResult {
    pub phone_number: CanonicalPhoneNumber,
    pub spam_score: u32,
    pub scam_reports: u32,
    pub confidence: ConfidenceLabel,
    pub risk_level: RiskLevel,
    /// One of scam, spam, suspicious, safe
    pub category: VerdictType,
    pub details: CallerDetails,
    pub last_updated: DateTime<Utc>,
}

impl ReputationResult {
    pub fn description(&self) -> String {
        format!(
            "Caller reputation: spam score {}/100, {} scam reports",
            self.spam_score, self.scam_reports
        )
    }

    pub fn to_record(&self) -> SourceRecord {
        SourceRecord {
            found: true,
            verdict_type: self.category,
            risk_level: self.risk_level,
            report_count: self.scam_reports,
            last_report_date: None,
            description: self.description(),
            category: self.category.as_str().to_string(),
            source_name: REPUTATION_SOURCE.to_string(),
        }
    }
}

#[async_trait]
pub trait CallerReputationService: Send + Sync {
    fn name(&self) -> &str;

    fn is_simulated(&self) -> bool {
        false
    }

    /// `Ok(None)` when the service has no listing for the number
    async fn query(
        &self,
        number: &CanonicalPhoneNumber,
    ) -> Result<Option<ReputationResult>, ProviderError>;
}

/// Spam score thresholds: 80 / 50 / 20
pub fn risk_level_for(spam_score: u32) -> RiskLevel {
    match spam_score {
        s if s >= 80 => RiskLevel::High,
        s if s >= 50 => RiskLevel::Medium,
        s if s >= 20 => RiskLevel::Low,
        _ => RiskLevel::None,
    }
}

pub fn category_for(spam_score: u32, scam_reports: u32) -> VerdictType {
    if spam_score >= 80 || scam_reports >= 100 {
        VerdictType::Scam
    } else if spam_score >= 50 || scam_reports >= 50 {
        VerdictType::Spam
    } else if spam_score >= 20 || scam_reports >= 10 {
        VerdictType::Suspicious
    } else {
        VerdictType::Safe
    }
}

struct DigitRun {
    needles: &'static [&'static str],
    spam_score: u32,
    scam_reports: u32,
    confidence: ConfidenceLabel,
}

const KNOWN_RUNS: &[DigitRun] = &[
    DigitRun {
        needles: &["123456789"],
        spam_score: 95,
        scam_reports: 156,
        confidence: ConfidenceLabel::High,
    },
    DigitRun {
        needles: &["000", "111"],
        spam_score: 80,
        scam_reports: 89,
        confidence: ConfidenceLabel::Medium,
    },
    DigitRun {
        needles: &["999"],
        spam_score: 70,
        scam_reports: 45,
        confidence: ConfidenceLabel::Medium,
    },
];

const CARRIERS: &[&str] = &["Orange", "SFR", "Bouygues Telecom", "Free Mobile"];
const CITIES: &[&str] = &["Paris", "Lyon", "Marseille", "Toulouse", "Nice", "Nantes"];
const NAMES: &[&str] = &[
    "Jean Dupont",
    "Marie Martin",
    "Pierre Durand",
    "Sophie Moreau",
    "Michel Leroy",
    "Isabelle Roux",
    "François David",
    "Nathalie Bertrand",
    "Philippe Simon",
    "Catherine Laurent",
    "Patrick Lefebvre",
    "Monique Michel",
];

pub struct ReputationHeuristic {
    random: Arc<dyn RandomSource>,
    latency_ms: u64,
}

impl ReputationHeuristic {
    pub fn new(random: Arc<dyn RandomSource>, latency_ms: u64) -> Self {
        Self { random, latency_ms }
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(Arc::new(NumberSeededRandom::new(seed)), 0)
    }

    /// Spam score, report count and confidence for a number.
    /// Keyed on the national significant number so both notations agree.
    pub fn score(&self, number: &CanonicalPhoneNumber) -> (u32, u32, ConfidenceLabel) {
        let digits = number.national_significant_number();
        for run in KNOWN_RUNS {
            if run.needles.iter().any(|needle| digits.contains(needle)) {
                return (run.spam_score, run.scam_reports, run.confidence);
            }
        }

        let spam_score = self.random.below(&format!("{digits}/spam"), 30);
        let scam_reports = self.random.below(&format!("{digits}/reports"), 10);
        (spam_score, scam_reports, ConfidenceLabel::Low)
    }

    fn pick(&self, number: &CanonicalPhoneNumber, salt: &str, choices: &[&str]) -> String {
        let index = self
            .random
            .below(
                &format!("{}/{salt}", number.national_significant_number()),
                choices.len() as u32,
            ) as usize;
        choices[index].to_string()
    }

    fn details(&self, number: &CanonicalPhoneNumber) -> CallerDetails {
        CallerDetails {
            display_name: self.pick(number, "name", NAMES),
            carrier: self.pick(number, "carrier", CARRIERS),
            city: self.pick(number, "city", CITIES),
            line_type: if number.is_mobile() { "mobile" } else { "landline" }.to_string(),
            country_code: "FR".to_string(),
            timezone: "Europe/Paris".to_string(),
        }
    }
}

#[async_trait]
impl CallerReputationService for ReputationHeuristic {
    fn name(&self) -> &str {
        REPUTATION_SOURCE
    }

    fn is_simulated(&self) -> bool {
        true
    }

    async fn query(
        &self,
        number: &CanonicalPhoneNumber,
    ) -> Result<Option<ReputationResult>, ProviderError> {
        let jitter = self.latency_ms.saturating_mul(2) as u32;
        simulate_latency(
            self.random.as_ref(),
            number.national_significant_number(),
            self.latency_ms,
            jitter,
        )
        .await;

        let (spam_score, scam_reports, confidence) = self.score(number);
        if spam_score == 0 && scam_reports == 0 {
            log::debug!("{REPUTATION_SOURCE}: no listing for {number}");
            return Ok(None);
        }

        let result = ReputationResult {
            phone_number: number.clone(),
            spam_score,
            scam_reports,
            confidence,
            risk_level: risk_level_for(spam_score),
            category: category_for(spam_score, scam_reports),
            details: self.details(number),
            last_updated: Utc::now(),
        };
        log::debug!(
            "{REPUTATION_SOURCE}: {number} spam_score={} reports={} category={}",
            result.spam_score,
            result.scam_reports,
            result.category
        );
        Ok(Some(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::FixedRandom;

    fn number(raw: &str) -> CanonicalPhoneNumber {
        CanonicalPhoneNumber::parse(raw).unwrap()
    }

    fn heuristic(value: u32) -> ReputationHeuristic {
        ReputationHeuristic::new(Arc::new(FixedRandom(value)), 0)
    }

    #[test]
    fn test_thresholds() {
        assert_eq!(risk_level_for(95), RiskLevel::High);
        assert_eq!(risk_level_for(80), RiskLevel::High);
        assert_eq!(risk_level_for(79), RiskLevel::Medium);
        assert_eq!(risk_level_for(20), RiskLevel::Low);
        assert_eq!(risk_level_for(19), RiskLevel::None);

        assert_eq!(category_for(95, 0), VerdictType::Scam);
        assert_eq!(category_for(0, 100), VerdictType::Scam);
        assert_eq!(category_for(70, 45), VerdictType::Spam);
        assert_eq!(category_for(5, 10), VerdictType::Suspicious);
        assert_eq!(category_for(19, 9), VerdictType::Safe);
    }

    #[tokio::test]
    async fn test_known_digit_runs() {
        let service = heuristic(0);

        let result = service.query(&number("+33123456789")).await.unwrap().unwrap();
        assert_eq!(result.spam_score, 95);
        assert_eq!(result.scam_reports, 156);
        assert_eq!(result.category, VerdictType::Scam);
        assert_eq!(result.risk_level, RiskLevel::High);
        assert_eq!(result.confidence, ConfidenceLabel::High);

        let result = service.query(&number("0611100000")).await.unwrap().unwrap();
        assert_eq!(result.spam_score, 80);
        assert_eq!(result.category, VerdictType::Scam);

        let result = service.query(&number("0699912345")).await.unwrap().unwrap();
        assert_eq!(result.category, VerdictType::Spam);
        assert_eq!(result.risk_level, RiskLevel::Medium);
    }

    #[tokio::test]
    async fn test_unmatched_number_uses_random_source() {
        let result = heuristic(25)
            .query(&number("0623456782"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(result.spam_score, 25);
        assert_eq!(result.scam_reports, 9);
        assert_eq!(result.category, VerdictType::Suspicious);
        assert_eq!(result.risk_level, RiskLevel::Low);
        assert_eq!(result.confidence, ConfidenceLabel::Low);
        assert_eq!(result.details.line_type, "mobile");
    }

    #[tokio::test]
    async fn test_zero_score_means_no_listing() {
        let result = heuristic(0).query(&number("0623456782")).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_seeded_scores_are_stable() {
        let service = ReputationHeuristic::seeded(99);
        let target = number("0623456782");
        let first = service.score(&target);
        assert_eq!(service.score(&target), first);
        assert!(first.0 < 30 && first.1 < 10);
    }

    #[test]
    fn test_both_notations_score_alike() {
        let service = ReputationHeuristic::seeded(0);
        for nsn in ["623456803", "623456782", "745120937", "198765432"] {
            let national = number(&format!("0{nsn}"));
            let international = number(&format!("+33{nsn}"));
            assert_eq!(service.score(&national), service.score(&international));
            assert_eq!(service.details(&national), service.details(&international));
        }
    }

    #[test]
    fn test_record_conversion() {
        let service = heuristic(0);
        let target = number("+33123456789");
        let (spam_score, scam_reports, confidence) = service.score(&target);
        let result = ReputationResult {
            phone_number: target.clone(),
            spam_score,
            scam_reports,
            confidence,
            risk_level: risk_level_for(spam_score),
            category: category_for(spam_score, scam_reports),
            details: service.details(&target),
            last_updated: Utc::now(),
        };

        let record = result.to_record();
        assert_eq!(record.source_name, REPUTATION_SOURCE);
        assert_eq!(record.verdict_type, VerdictType::Scam);
        assert_eq!(record.report_count, 156);
        assert_eq!(record.category, "scam");
    }
}
