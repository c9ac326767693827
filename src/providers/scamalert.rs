use crate::normalization::CanonicalPhoneNumber;
use crate::providers::{simulate_latency, ProviderError, ProviderReport, ReputationProvider};
use crate::random::{NumberSeededRandom, RandomSource};
use crate::reporting::{ReportError, ReportReceipt, ReportSink, SubmittedReport};
use crate::verdict::{RiskLevel, VerdictType};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Arc;

pub const SCAMALERT_NAME: &str = "ScamAlert.fr";

/// Community scam database, simulated from a static snapshot
pub struct ScamAlertProvider {
    reports: HashMap<String, ProviderReport>,
    random: Arc<dyn RandomSource>,
    latency_ms: u64,
    accept_reports: bool,
}

impl ScamAlertProvider {
    /// `seed` drives the simulated latency jitter
    pub fn new(seed: u64, latency_ms: u64, accept_reports: bool) -> Self {
        Self {
            reports: Self::snapshot(),
            random: Arc::new(NumberSeededRandom::new(seed)),
            latency_ms,
            accept_reports,
        }
    }

    fn snapshot() -> HashMap<String, ProviderReport> {
        let rows = [
            ("+33123456789", 156, (2024, 1, 20), VerdictType::Spam, "Automated telemarketing calls - SFR/Orange", "telecom", RiskLevel::Medium),
            ("+33612345678", 342, (2024, 1, 21), VerdictType::Scam, "Microsoft tech support scam - asks for remote access", "tech_support", RiskLevel::High),
            ("+33612345677", 267, (2024, 1, 22), VerdictType::Scam, "Fake EDF electricity invoice - urgent payment demand", "utility", RiskLevel::High),
        ];

        rows.into_iter()
            .map(|(number, reports, (y, m, d), verdict_type, description, category, risk_level)| {
                (
                    number.to_string(),
                    ProviderReport {
                        reported: true,
                        report_count: reports,
                        risk_level,
                        verdict_type,
                        description: description.to_string(),
                        category: category.to_string(),
                        last_report: NaiveDate::from_ymd_opt(y, m, d),
                    },
                )
            })
            .collect()
    }
}

#[async_trait]
impl ReputationProvider for ScamAlertProvider {
    fn name(&self) -> &str {
        SCAMALERT_NAME
    }

    fn is_simulated(&self) -> bool {
        true
    }

    async fn query(&self, number: &CanonicalPhoneNumber) -> Result<ProviderReport, ProviderError> {
        let jitter = (self.latency_ms / 2) as u32;
        simulate_latency(self.random.as_ref(), number.as_str(), self.latency_ms, jitter).await;

        // The snapshot is keyed in international notation only
        let key = if number.is_international() {
            number.clone()
        } else {
            number.alternate_form()
        };

        match self.reports.get(key.as_str()) {
            Some(report) => {
                log::debug!("{SCAMALERT_NAME}: {number} reported {} times", report.report_count);
                Ok(report.clone())
            }
            None => Ok(ProviderReport::not_reported()),
        }
    }
}

#[async_trait]
impl ReportSink for ScamAlertProvider {
    fn destination_id(&self) -> &str {
        SCAMALERT_NAME
    }

    async fn submit(&self, report: &SubmittedReport) -> Result<ReportReceipt, ReportError> {
        if !self.accept_reports {
            return Err(ReportError::Disabled(SCAMALERT_NAME.to_string()));
        }

        log::info!(
            "{SCAMALERT_NAME}: forwarding {} report for {}",
            report.verdict_type,
            report.phone_number
        );

        Ok(ReportReceipt {
            destination: SCAMALERT_NAME.to_string(),
            report_id: format!("SA-{}", report.submitted_at.timestamp_millis()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporting::UserReport;

    #[tokio::test]
    async fn test_known_number_in_either_notation() {
        let provider = ScamAlertProvider::new(0, 0, true);

        for raw in ["+33612345678", "06 12 34 56 78"] {
            let number = CanonicalPhoneNumber::parse(raw).unwrap();
            let report = provider.query(&number).await.unwrap();
            assert!(report.reported);
            assert_eq!(report.report_count, 342);
            assert_eq!(report.risk_level, RiskLevel::High);
            assert_eq!(report.verdict_type, VerdictType::Scam);
        }
    }

    #[tokio::test]
    async fn test_unknown_number_is_not_reported() {
        let provider = ScamAlertProvider::new(0, 0, true);
        let number = CanonicalPhoneNumber::parse("0611223344").unwrap();
        let report = provider.query(&number).await.unwrap();
        assert!(!report.reported);
        assert_eq!(report.report_count, 0);
    }

    #[tokio::test]
    async fn test_report_acceptance_follows_config() {
        let number = CanonicalPhoneNumber::parse("0611223344").unwrap();
        let report = SubmittedReport::new(
            number,
            &UserReport {
                verdict_type: VerdictType::Spam,
                description: "Robocall".to_string(),
                category: Some("telecom".to_string()),
            },
        );

        let receipt = ScamAlertProvider::new(0, 0, true).submit(&report).await.unwrap();
        assert!(receipt.report_id.starts_with("SA-"));

        let refused = ScamAlertProvider::new(0, 0, false).submit(&report).await;
        assert!(matches!(refused, Err(ReportError::Disabled(_))));
    }
}
