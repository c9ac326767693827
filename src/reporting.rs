//! Report fan-out: one user report, many independent destinations.
//!
//! Each destination succeeds or fails on its own. Nothing is rolled back when
//! a sibling fails; the dispatch policy decides what counts as overall success.

use crate::normalization::CanonicalPhoneNumber;
use crate::verdict::VerdictType;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

pub const LOCAL_STORE_DESTINATION: &str = "local";

/// What the user submits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserReport {
    #[serde(rename = "type")]
    pub verdict_type: VerdictType,
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
}

/// What every destination receives, identical across the fan-out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmittedReport {
    pub phone_number: CanonicalPhoneNumber,
    #[serde(rename = "type")]
    pub verdict_type: VerdictType,
    pub description: String,
    pub category: String,
    pub submitted_at: DateTime<Utc>,
}

impl SubmittedReport {
    pub fn new(phone_number: CanonicalPhoneNumber, report: &UserReport) -> Self {
        Self {
            phone_number,
            verdict_type: report.verdict_type,
            description: report.description.trim().to_string(),
            category: report
                .category
                .clone()
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| "unknown".to_string()),
            submitted_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportReceipt {
    pub destination: String,
    pub report_id: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Destination {destination} rejected the report: {reason}")]
    Rejected { destination: String, reason: String },
    #[error("Destination unavailable: {0}")]
    Unavailable(String),
    #[error("Destination disabled: {0}")]
    Disabled(String),
}

#[async_trait]
pub trait ReportSink: Send + Sync {
    fn destination_id(&self) -> &str;

    async fn submit(&self, report: &SubmittedReport) -> Result<ReportReceipt, ReportError>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DestinationOutcome {
    pub destination: String,
    pub success: bool,
    pub report_id: Option<String>,
    pub error: Option<String>,
}

/// Some destinations refused the report while the dispatch as a whole went through
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Report dispatch partially failed for: {}", .failed.join(", "))]
pub struct ReportDispatchPartialFailure {
    pub failed: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportDispatch {
    pub report_id: String,
    pub phone_number: CanonicalPhoneNumber,
    pub success: bool,
    pub outcomes: Vec<DestinationOutcome>,
}

impl ReportDispatch {
    pub fn outcome(&self, destination: &str) -> Option<bool> {
        self.outcomes
            .iter()
            .find(|o| o.destination == destination)
            .map(|o| o.success)
    }

    pub fn accepted_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.success).count()
    }

    pub fn partial_failure(&self) -> Option<ReportDispatchPartialFailure> {
        let failed: Vec<String> = self
            .outcomes
            .iter()
            .filter(|o| !o.success)
            .map(|o| o.destination.clone())
            .collect();
        if failed.is_empty() {
            None
        } else {
            Some(ReportDispatchPartialFailure { failed })
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchPolicy {
    /// At least one destination accepted
    #[default]
    Any,
    /// Strictly more than half accepted
    Majority,
    All,
}

impl DispatchPolicy {
    pub fn is_satisfied(&self, accepted: usize, total: usize) -> bool {
        match self {
            DispatchPolicy::Any => accepted > 0,
            DispatchPolicy::Majority => accepted * 2 > total,
            DispatchPolicy::All => total > 0 && accepted == total,
        }
    }
}

pub struct ReportFanout {
    sinks: Vec<Arc<dyn ReportSink>>,
    policy: DispatchPolicy,
}

impl ReportFanout {
    pub fn new(sinks: Vec<Arc<dyn ReportSink>>, policy: DispatchPolicy) -> Self {
        Self { sinks, policy }
    }

    pub fn destinations(&self) -> Vec<String> {
        self.sinks
            .iter()
            .map(|s| s.destination_id().to_string())
            .collect()
    }

    pub async fn dispatch(
        &self,
        number: &CanonicalPhoneNumber,
        report: &UserReport,
    ) -> ReportDispatch {
        let submitted = SubmittedReport::new(number.clone(), report);

        let results = join_all(self.sinks.iter().map(|sink| {
            let submitted = &submitted;
            async move { (sink.destination_id().to_string(), sink.submit(submitted).await) }
        }))
        .await;

        let outcomes: Vec<DestinationOutcome> = results
            .into_iter()
            .map(|(destination, result)| match result {
                Ok(receipt) => {
                    log::info!("Report for {number} accepted by {destination} ({})", receipt.report_id);
                    DestinationOutcome {
                        destination,
                        success: true,
                        report_id: Some(receipt.report_id),
                        error: None,
                    }
                }
                Err(e) => {
                    log::warn!("Report for {number} not accepted by {destination}: {e}");
                    DestinationOutcome {
                        destination,
                        success: false,
                        report_id: None,
                        error: Some(e.to_string()),
                    }
                }
            })
            .collect();

        let accepted = outcomes.iter().filter(|o| o.success).count();
        let success = self.policy.is_satisfied(accepted, outcomes.len());

        ReportDispatch {
            report_id: format!("MULTI-{}", Utc::now().timestamp_millis()),
            phone_number: number.clone(),
            success,
            outcomes,
        }
    }
}

/// In-memory store standing in for the community database
#[derive(Default)]
pub struct LocalReportStore {
    reports: RwLock<Vec<SubmittedReport>>,
}

impl LocalReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.reports.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.reports.read().await.is_empty()
    }

    pub async fn reports_for(&self, number: &CanonicalPhoneNumber) -> Vec<SubmittedReport> {
        self.reports
            .read()
            .await
            .iter()
            .filter(|r| &r.phone_number == number)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ReportSink for LocalReportStore {
    fn destination_id(&self) -> &str {
        LOCAL_STORE_DESTINATION
    }

    async fn submit(&self, report: &SubmittedReport) -> Result<ReportReceipt, ReportError> {
        if report.description.is_empty() {
            return Err(ReportError::Rejected {
                destination: LOCAL_STORE_DESTINATION.to_string(),
                reason: "empty description".to_string(),
            });
        }

        self.reports.write().await.push(report.clone());
        log::debug!(
            "Stored {} report for {} in local store",
            report.verdict_type,
            report.phone_number
        );

        Ok(ReportReceipt {
            destination: LOCAL_STORE_DESTINATION.to_string(),
            report_id: format!("LOCAL-{}", report.submitted_at.timestamp_millis()),
        })
    }
}
