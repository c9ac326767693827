//! Decision Engine
//!
//! Merges the findings of every source into one verdict. Stages are evaluated
//! in a fixed order and the first stage holding evidence decides:
//! local registry → external aggregate → caller reputation → no evidence.

use crate::external::ExternalSummary;
use crate::normalization::CanonicalPhoneNumber;
use crate::patterns::PatternAnalyzer;
use crate::registry::LOCAL_REGISTRY_SOURCE;
use crate::reputation::{ReputationResult, REPUTATION_SOURCE};
use crate::verdict::{clamp_confidence, AggregatedVerdict, RiskLevel, SourceRecord, VerdictType};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

pub const EXTERNAL_SOURCE: &str = "external-aggregate";
pub const NO_EVIDENCE_SOURCE: &str = "none";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionConfig {
    /// Used for a registry hit when no external provider answered
    pub local_default_confidence: u8,
    /// Used when the caller-reputation result carries no confidence of its own
    pub heuristic_default_confidence: u8,
    /// Caller-reputation "safe" answers, reported as reliable
    pub heuristic_safe_confidence: u8,
    /// Absence of any record
    pub no_evidence_confidence: u8,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            local_default_confidence: 80,
            heuristic_default_confidence: 85,
            heuristic_safe_confidence: 95,
            no_evidence_confidence: 95,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecisionStage {
    LocalRegistry,
    ExternalAggregate,
    CallerReputation,
    NoEvidence,
}

impl fmt::Display for DecisionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DecisionStage::LocalRegistry => "LOCAL REGISTRY",
            DecisionStage::ExternalAggregate => "EXTERNAL PROVIDERS",
            DecisionStage::CallerReputation => "CALLER REPUTATION",
            DecisionStage::NoEvidence => "NO EVIDENCE",
        };
        f.write_str(label)
    }
}

/// Registry hit plus the human label of its category
#[derive(Debug, Clone)]
pub struct LocalFinding {
    pub record: SourceRecord,
    pub category_label: String,
}

/// Everything the sources produced for one number
#[derive(Debug)]
pub struct SourceFindings {
    pub number: CanonicalPhoneNumber,
    pub local: Option<LocalFinding>,
    /// `None` when the aggregate itself could not run
    pub external: Option<ExternalSummary>,
    pub reputation: Option<ReputationResult>,
}

/// Events emitted while a verdict is being built
#[derive(Debug, Clone, PartialEq)]
pub enum StageEvent {
    SourcesSettled {
        number: String,
        local_found: bool,
        external_reports: u32,
        external_failed: usize,
        reputation_found: bool,
    },
    StageSkipped {
        stage: DecisionStage,
    },
    VerdictBuilt {
        stage: DecisionStage,
        verdict_type: VerdictType,
        risk_level: RiskLevel,
        confidence: u8,
    },
}

pub trait VerdictObserver: Send + Sync {
    fn on_event(&self, event: &StageEvent);
}

/// Default observer: stage events go to the `log` facade
#[derive(Debug, Default)]
pub struct LogObserver;

impl VerdictObserver for LogObserver {
    fn on_event(&self, event: &StageEvent) {
        match event {
            StageEvent::SourcesSettled {
                number,
                local_found,
                external_reports,
                external_failed,
                reputation_found,
            } => log::debug!(
                "Sources settled for {number}: local={local_found} external_reports={external_reports} external_failed={external_failed} reputation={reputation_found}"
            ),
            StageEvent::StageSkipped { stage } => log::debug!("{stage}: no evidence, moving on"),
            StageEvent::VerdictBuilt {
                stage,
                verdict_type,
                risk_level,
                confidence,
            } => log::info!(
                "Verdict from {stage}: {verdict_type} (risk {risk_level}, confidence {confidence})"
            ),
        }
    }
}

pub struct DecisionEngine {
    config: DecisionConfig,
    patterns: PatternAnalyzer,
    observer: Arc<dyn VerdictObserver>,
}

impl DecisionEngine {
    pub fn new(config: DecisionConfig) -> Self {
        Self::with_observer(config, Arc::new(LogObserver))
    }

    pub fn with_observer(config: DecisionConfig, observer: Arc<dyn VerdictObserver>) -> Self {
        Self {
            config,
            patterns: PatternAnalyzer::new(),
            observer,
        }
    }

    /// Make final decision based on source findings
    pub fn make_decision(&self, findings: &SourceFindings) -> AggregatedVerdict {
        self.observer.on_event(&StageEvent::SourcesSettled {
            number: findings.number.to_string(),
            local_found: findings.local.is_some(),
            external_reports: findings.external.as_ref().map_or(0, |s| s.total_reports),
            external_failed: findings.external.as_ref().map_or(0, |s| s.failed.len()),
            reputation_found: findings.reputation.is_some(),
        });

        let contributing = Self::contributing_sources(findings);

        let (stage, mut verdict) = if let Some(local) = &findings.local {
            (DecisionStage::LocalRegistry, self.from_local(findings, local))
        } else {
            self.skipped(DecisionStage::LocalRegistry);
            match findings.external.as_ref().filter(|s| s.has_reports()) {
                Some(summary) => (
                    DecisionStage::ExternalAggregate,
                    self.from_external(findings, summary),
                ),
                None => {
                    self.skipped(DecisionStage::ExternalAggregate);
                    match &findings.reputation {
                        Some(result) => (
                            DecisionStage::CallerReputation,
                            self.from_reputation(findings, result),
                        ),
                        None => {
                            self.skipped(DecisionStage::CallerReputation);
                            (DecisionStage::NoEvidence, self.no_evidence(findings))
                        }
                    }
                }
            }
        };

        verdict.contributing_sources = contributing;
        verdict.reasoning = self.build_reasoning(stage, &verdict, findings);

        self.observer.on_event(&StageEvent::VerdictBuilt {
            stage,
            verdict_type: verdict.verdict_type,
            risk_level: verdict.risk_level,
            confidence: verdict.confidence,
        });

        verdict
    }

    fn skipped(&self, stage: DecisionStage) {
        self.observer.on_event(&StageEvent::StageSkipped { stage });
    }

    fn from_local(&self, findings: &SourceFindings, local: &LocalFinding) -> AggregatedVerdict {
        let record = &local.record;
        let confidence = match findings.external.as_ref().filter(|s| s.produced()) {
            Some(summary) => summary.confidence,
            None => self.config.local_default_confidence,
        };

        AggregatedVerdict {
            phone_number: findings.number.clone(),
            found: true,
            verdict_type: record.verdict_type,
            risk_level: record.risk_level,
            confidence: clamp_confidence(confidence as u32),
            report_count: record.report_count,
            last_report_date: record.last_report_date,
            description: record.description.clone(),
            category: record.category.clone(),
            category_label: local.category_label.clone(),
            source: LOCAL_REGISTRY_SOURCE.to_string(),
            contributing_sources: BTreeSet::new(),
            reasoning: String::new(),
            caller_details: findings.reputation.as_ref().map(|r| r.details.clone()),
            pattern_assessment: None,
        }
    }

    fn from_external(&self, findings: &SourceFindings, summary: &ExternalSummary) -> AggregatedVerdict {
        AggregatedVerdict {
            phone_number: findings.number.clone(),
            found: true,
            verdict_type: summary.verdict_type,
            risk_level: summary.risk_level,
            confidence: clamp_confidence(summary.confidence as u32),
            report_count: summary.total_reports,
            last_report_date: summary.last_report.or_else(|| Some(Utc::now().date_naive())),
            description: summary.description.clone(),
            category: "external".to_string(),
            category_label: "Reported externally".to_string(),
            source: EXTERNAL_SOURCE.to_string(),
            contributing_sources: BTreeSet::new(),
            reasoning: String::new(),
            caller_details: findings.reputation.as_ref().map(|r| r.details.clone()),
            pattern_assessment: None,
        }
    }

    fn from_reputation(&self, findings: &SourceFindings, result: &ReputationResult) -> AggregatedVerdict {
        let (verdict_type, confidence) = if result.category == VerdictType::Safe {
            (VerdictType::Reliable, self.config.heuristic_safe_confidence)
        } else {
            (
                result.category,
                result
                    .confidence
                    .score()
                    .unwrap_or(self.config.heuristic_default_confidence),
            )
        };

        let record = result.to_record();
        AggregatedVerdict {
            phone_number: findings.number.clone(),
            found: record.found,
            verdict_type,
            risk_level: record.risk_level,
            confidence: clamp_confidence(confidence as u32),
            report_count: record.report_count,
            last_report_date: record.last_report_date,
            description: record.description,
            category: record.category,
            category_label: "Reported by caller reputation".to_string(),
            source: record.source_name,
            contributing_sources: BTreeSet::new(),
            reasoning: String::new(),
            caller_details: Some(result.details.clone()),
            pattern_assessment: None,
        }
    }

    fn no_evidence(&self, findings: &SourceFindings) -> AggregatedVerdict {
        AggregatedVerdict {
            phone_number: findings.number.clone(),
            found: false,
            verdict_type: VerdictType::Reliable,
            risk_level: RiskLevel::None,
            confidence: clamp_confidence(self.config.no_evidence_confidence as u32),
            report_count: 0,
            last_report_date: None,
            description: "No record in any source.".to_string(),
            category: "no_record".to_string(),
            category_label: "No record".to_string(),
            source: NO_EVIDENCE_SOURCE.to_string(),
            contributing_sources: BTreeSet::new(),
            reasoning: String::new(),
            caller_details: None,
            pattern_assessment: Some(self.patterns.analyze(&findings.number)),
        }
    }

    /// Every source that held a record, whether or not it decided
    fn contributing_sources(findings: &SourceFindings) -> BTreeSet<String> {
        let mut sources = BTreeSet::new();
        if findings.local.is_some() {
            sources.insert(LOCAL_REGISTRY_SOURCE.to_string());
        }
        if let Some(summary) = &findings.external {
            sources.extend(summary.reporting.iter().cloned());
        }
        if findings.reputation.is_some() {
            sources.insert(REPUTATION_SOURCE.to_string());
        }
        sources
    }

    /// Build human-readable reasoning for the decision
    fn build_reasoning(
        &self,
        stage: DecisionStage,
        verdict: &AggregatedVerdict,
        findings: &SourceFindings,
    ) -> String {
        let headline = format!(
            "{}: {} (risk {}, confidence {}%)",
            stage, verdict.verdict_type, verdict.risk_level, verdict.confidence
        );

        let detail = match stage {
            DecisionStage::LocalRegistry => {
                let confidence_origin = match findings.external.as_ref().filter(|s| s.produced()) {
                    Some(summary) => format!(
                        "confidence from {} responding external provider(s)",
                        summary.responding.len()
                    ),
                    None => "no external provider answered, default confidence".to_string(),
                };
                format!(
                    "curated entry with {} reports; {}",
                    verdict.report_count, confidence_origin
                )
            }
            DecisionStage::ExternalAggregate => format!(
                "{} reports across {} provider(s)",
                verdict.report_count,
                findings.external.as_ref().map_or(0, |s| s.reporting.len())
            ),
            DecisionStage::CallerReputation => match &findings.reputation {
                Some(result) => format!(
                    "spam score {}/100 with {} reports",
                    result.spam_score, result.scam_reports
                ),
                None => String::new(),
            },
            DecisionStage::NoEvidence => match &verdict.pattern_assessment {
                Some(pattern) => format!("no source has a record; pattern check: {}", pattern.description),
                None => "no source has a record".to_string(),
            },
        };

        let unavailable = findings
            .external
            .as_ref()
            .map(|s| s.failed.clone())
            .unwrap_or_default();

        let mut reasoning = format!("{headline} - {detail}");
        if !verdict.contributing_sources.is_empty() {
            let names: Vec<&str> = verdict.contributing_sources.iter().map(|s| s.as_str()).collect();
            reasoning.push_str(&format!(" - Sources: {}", names.join(", ")));
        }
        if !unavailable.is_empty() {
            reasoning.push_str(&format!(" - Unavailable: {}", unavailable.join(", ")));
        }
        reasoning
    }

    /// Update configuration
    pub fn update_config(&mut self, config: DecisionConfig) {
        self.config = config;
    }

    /// Get current configuration
    pub fn get_config(&self) -> &DecisionConfig {
        &self.config
    }
}

impl Default for DecisionEngine {
    fn default() -> Self {
        Self::new(DecisionConfig::default())
    }
}
