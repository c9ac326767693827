//! External reputation providers.
//!
//! Every provider implements [`ReputationProvider`]; the external aggregate
//! only ever sees the trait, so a simulated provider and an HTTP-backed one
//! are interchangeable.

pub mod numverify;
pub mod scamalert;

use crate::normalization::CanonicalPhoneNumber;
use crate::random::RandomSource;
use crate::verdict::{RiskLevel, VerdictType};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use numverify::NumVerifyProvider;
pub use scamalert::ScamAlertProvider;

/// Raw answer of one provider for one number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderReport {
    pub reported: bool,
    pub report_count: u32,
    pub risk_level: RiskLevel,
    pub verdict_type: VerdictType,
    pub description: String,
    pub category: String,
    pub last_report: Option<NaiveDate>,
}

impl ProviderReport {
    /// A provider that answered but has nothing on file
    pub fn not_reported() -> Self {
        Self {
            reported: false,
            report_count: 0,
            risk_level: RiskLevel::None,
            verdict_type: VerdictType::Unknown,
            description: String::new(),
            category: String::new(),
            last_report: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Provider unavailable: {0}")]
    Unavailable(String),
    #[error("Provider {provider} timed out after {seconds}s")]
    Timeout { provider: String, seconds: u64 },
    #[error("Provider rejected the number: {0}")]
    Rejected(String),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Settled result of one provider query
#[derive(Debug)]
pub enum ProviderOutcome {
    Responded(ProviderReport),
    Failed(ProviderError),
}

impl ProviderOutcome {
    pub fn report(&self) -> Option<&ProviderReport> {
        match self {
            ProviderOutcome::Responded(report) => Some(report),
            ProviderOutcome::Failed(_) => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ProviderOutcome::Failed(_))
    }
}

impl From<Result<ProviderReport, ProviderError>> for ProviderOutcome {
    fn from(result: Result<ProviderReport, ProviderError>) -> Self {
        match result {
            Ok(report) => ProviderOutcome::Responded(report),
            Err(e) => ProviderOutcome::Failed(e),
        }
    }
}

#[async_trait]
pub trait ReputationProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Simulated providers answer from a built-in dataset
    fn is_simulated(&self) -> bool {
        false
    }

    async fn query(&self, number: &CanonicalPhoneNumber) -> Result<ProviderReport, ProviderError>;
}

/// Sleep for `base_ms` plus up to `jitter_ms` of random extra delay.
/// A zero base disables the delay entirely.
pub(crate) async fn simulate_latency(
    random: &dyn RandomSource,
    key: &str,
    base_ms: u64,
    jitter_ms: u32,
) {
    if base_ms == 0 {
        return;
    }
    let jitter = if jitter_ms > 0 {
        random.below(key, jitter_ms) as u64
    } else {
        0
    };
    tokio::time::sleep(Duration::from_millis(base_ms + jitter)).await;
}
