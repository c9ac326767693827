//! External aggregate: every configured reputation provider, queried at once.
//!
//! A provider that fails or times out contributes nothing; the summary is
//! computed from whichever providers responded.

use crate::normalization::CanonicalPhoneNumber;
use crate::providers::{ProviderError, ProviderOutcome, ProviderReport, ReputationProvider};
use crate::verdict::{clamp_confidence, RiskLevel, VerdictType};
use chrono::NaiveDate;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;

/// Settled outcome of one provider, tagged with its name
#[derive(Debug)]
pub struct ProviderSettlement {
    pub provider: String,
    pub outcome: ProviderOutcome,
}

#[derive(Debug)]
pub struct ExternalSummary {
    risk_score: u32,
    pub risk_level: RiskLevel,
    pub verdict_type: VerdictType,
    pub description: String,
    pub category: String,
    pub last_report: Option<NaiveDate>,
    pub total_reports: u32,
    pub confidence: u8,
    /// Providers that answered, reported or not
    pub responding: Vec<String>,
    /// Providers that answered with at least one report
    pub reporting: Vec<String>,
    pub failed: Vec<String>,
    pub settlements: Vec<ProviderSettlement>,
}

impl ExternalSummary {
    /// True when at least one provider answered
    pub fn produced(&self) -> bool {
        !self.responding.is_empty()
    }

    pub fn has_reports(&self) -> bool {
        self.total_reports > 0
    }

    pub fn risk_score(&self) -> u32 {
        self.risk_score
    }

    /// Fold settled outcomes (in registration order) into one summary
    pub fn from_settlements(settlements: Vec<ProviderSettlement>) -> Self {
        let mut risk_score = 0u32;
        let mut total_reports = 0u32;
        let mut responding = Vec::new();
        let mut reporting = Vec::new();
        let mut failed = Vec::new();
        let mut leader: Option<&ProviderReport> = None;

        for settlement in &settlements {
            match &settlement.outcome {
                ProviderOutcome::Failed(_) => failed.push(settlement.provider.clone()),
                ProviderOutcome::Responded(report) => {
                    responding.push(settlement.provider.clone());
                    if !report.reported {
                        continue;
                    }
                    reporting.push(settlement.provider.clone());
                    risk_score = risk_score
                        .saturating_add(report.report_count.saturating_mul(10))
                        .saturating_add(report.risk_level.score_bonus());
                    total_reports = total_reports.saturating_add(report.report_count);

                    // Strictly greater keeps the earliest-registered provider on ties
                    if leader.map_or(true, |l| report.report_count > l.report_count) {
                        leader = Some(report);
                    }
                }
            }
        }

        let confidence = Self::calculate_confidence(responding.len(), total_reports);
        let (verdict_type, description, category, last_report) = match leader {
            Some(report) => (
                report.verdict_type,
                report.description.clone(),
                report.category.clone(),
                report.last_report,
            ),
            None => (VerdictType::Unknown, String::new(), String::new(), None),
        };

        Self {
            risk_score,
            risk_level: RiskLevel::from_risk_score(risk_score),
            verdict_type,
            description,
            category,
            last_report,
            total_reports,
            confidence,
            responding,
            reporting,
            failed,
            settlements,
        }
    }

    /// Source diversity plus report volume, capped at 100
    pub fn calculate_confidence(responding: usize, total_reports: u32) -> u8 {
        let report_bonus = match total_reports {
            r if r > 100 => 40,
            r if r > 50 => 30,
            r if r > 10 => 20,
            r if r > 0 => 10,
            _ => 0,
        };
        let diversity = (responding as u32).saturating_mul(20);
        clamp_confidence(diversity.saturating_add(report_bonus))
    }
}

pub struct ExternalAggregate {
    providers: Vec<Arc<dyn ReputationProvider>>,
    timeout: Option<Duration>,
}

impl ExternalAggregate {
    pub fn new(providers: Vec<Arc<dyn ReputationProvider>>) -> Self {
        Self {
            providers,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn provider_names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name().to_string()).collect()
    }

    pub fn providers(&self) -> &[Arc<dyn ReputationProvider>] {
        &self.providers
    }

    pub async fn query_all(&self, number: &CanonicalPhoneNumber) -> ExternalSummary {
        let settlements = join_all(self.providers.iter().map(|provider| async move {
            let outcome: ProviderOutcome = self.query_one(provider.as_ref(), number).await.into();
            ProviderSettlement {
                provider: provider.name().to_string(),
                outcome,
            }
        }))
        .await;

        for settlement in &settlements {
            match &settlement.outcome {
                ProviderOutcome::Responded(report) => log::debug!(
                    "  - {}: ✅ reported={} reports={}",
                    settlement.provider,
                    report.reported,
                    report.report_count
                ),
                ProviderOutcome::Failed(e) => {
                    log::warn!("  - {}: ❌ {e}", settlement.provider)
                }
            }
        }

        let summary = ExternalSummary::from_settlements(settlements);
        log::debug!(
            "External summary for {number}: score={} level={} reports={} confidence={}",
            summary.risk_score,
            summary.risk_level,
            summary.total_reports,
            summary.confidence
        );
        summary
    }

    async fn query_one(
        &self,
        provider: &dyn ReputationProvider,
        number: &CanonicalPhoneNumber,
    ) -> Result<ProviderReport, ProviderError> {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, provider.query(number))
                .await
                .unwrap_or_else(|_| {
                    Err(ProviderError::Timeout {
                        provider: provider.name().to_string(),
                        seconds: limit.as_secs(),
                    })
                }),
            None => provider.query(number).await,
        }
    }
}
