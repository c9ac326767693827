//! Caller-facing facade.
//!
//! [`PhoneChecker`] owns every source and the decision engine. Each call is
//! independent; the only shared mutable state is the report store and the
//! statistics channel.

use crate::config::Config;
use crate::decision_engine::{DecisionEngine, LocalFinding, SourceFindings};
use crate::external::ExternalAggregate;
use crate::normalization::{normalize, CanonicalPhoneNumber};
use crate::providers::{NumVerifyProvider, ReputationProvider, ScamAlertProvider};
use crate::random::NumberSeededRandom;
use crate::registry::{LocalRegistry, RegistryStats, LOCAL_REGISTRY_SOURCE};
use crate::reporting::{LocalReportStore, ReportDispatch, ReportFanout, ReportSink, UserReport};
use crate::reputation::{CallerReputationService, ReputationHeuristic, ReputationResult};
use crate::statistics::{RuntimeStats, StatEvent, StatisticsCollector};
use crate::verdict::{AggregatedVerdict, RiskLevel, VerdictType};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error("Invalid phone number format: {0}")]
    InvalidNumberFormat(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchFilters {
    pub verdict_type: Option<VerdictType>,
    pub category: Option<String>,
    pub risk_level: Option<RiskLevel>,
    /// Also ask the external providers when the query is itself a number.
    /// On unless explicitly turned off.
    pub include_external: bool,
}

impl Default for SearchFilters {
    fn default() -> Self {
        Self {
            verdict_type: None,
            category: None,
            risk_level: None,
            include_external: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub phone_number: String,
    pub verdict_type: VerdictType,
    pub risk_level: RiskLevel,
    pub report_count: u32,
    pub description: String,
    pub category: String,
    pub category_label: String,
    pub last_report: Option<NaiveDate>,
    /// `local-registry` or the name of the external provider
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    pub query: String,
    pub hits: Vec<SearchHit>,
    pub local_count: usize,
    pub external_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckerStats {
    pub registry: RegistryStats,
    pub runtime: RuntimeStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderRole {
    External,
    CallerReputation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderStatus {
    pub name: String,
    pub role: ProviderRole,
    pub simulated: bool,
}

pub struct PhoneChecker {
    registry: Arc<LocalRegistry>,
    external: ExternalAggregate,
    reputation: Option<Arc<dyn CallerReputationService>>,
    engine: DecisionEngine,
    fanout: ReportFanout,
    statistics: StatisticsCollector,
}

impl PhoneChecker {
    /// Must be called from within a tokio runtime
    pub fn new(
        registry: Arc<LocalRegistry>,
        external: ExternalAggregate,
        reputation: Option<Arc<dyn CallerReputationService>>,
        engine: DecisionEngine,
        fanout: ReportFanout,
    ) -> Self {
        Self {
            registry,
            external,
            reputation,
            engine,
            fanout,
            statistics: StatisticsCollector::new(),
        }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let registry = match &config.registry_path {
            Some(path) => LocalRegistry::from_file(path)?,
            None => LocalRegistry::default(),
        };

        let mut providers: Vec<Arc<dyn ReputationProvider>> = Vec::new();
        let mut sinks: Vec<Arc<dyn ReportSink>> = vec![Arc::new(LocalReportStore::new())];

        let scamalert_config = &config.providers.scamalert;
        if scamalert_config.enabled {
            let scamalert = Arc::new(ScamAlertProvider::new(
                config.reputation.seed,
                scamalert_config.latency_ms,
                scamalert_config.accept_reports,
            ));
            providers.push(scamalert.clone());
            sinks.push(scamalert);
        }

        let numverify_config = &config.providers.numverify;
        if numverify_config.enabled {
            providers.push(Arc::new(NumVerifyProvider::new(
                &numverify_config.base_url,
                &numverify_config.api_key,
                numverify_config.timeout_seconds,
            )?));
        }

        let external = ExternalAggregate::new(providers)
            .with_timeout(config.provider_timeout_seconds.map(Duration::from_secs));

        let reputation: Option<Arc<dyn CallerReputationService>> = if config.reputation.enabled {
            Some(Arc::new(ReputationHeuristic::new(
                Arc::new(NumberSeededRandom::new(config.reputation.seed)),
                config.reputation.latency_ms,
            )))
        } else {
            None
        };

        log::info!(
            "Phone checker ready: {} registry entries, external providers [{}], caller reputation {}",
            registry.len(),
            external.provider_names().join(", "),
            if reputation.is_some() { "enabled" } else { "disabled" }
        );

        Ok(Self::new(
            Arc::new(registry),
            external,
            reputation,
            DecisionEngine::new(config.decision.clone()),
            ReportFanout::new(sinks, config.reporting.policy),
        ))
    }

    fn parse(raw: &str) -> Result<CanonicalPhoneNumber, CheckError> {
        CanonicalPhoneNumber::parse(raw).map_err(|e| {
            log::warn!("{e}");
            CheckError::InvalidNumberFormat(e.0)
        })
    }

    pub async fn check_phone_number(&self, raw: &str) -> Result<AggregatedVerdict, CheckError> {
        let number = Self::parse(raw)?;
        log::info!("🔍 Checking {number}");

        let local = self.registry.lookup(&number).map(|record| LocalFinding {
            category_label: self.registry.category_label(&record.category),
            record,
        });
        let (external, reputation) = tokio::join!(
            self.external.query_all(&number),
            self.query_reputation(&number)
        );

        let failed_providers = external.failed.clone();
        let findings = SourceFindings {
            number,
            local,
            external: Some(external),
            reputation,
        };
        let verdict = self.engine.make_decision(&findings);

        self.statistics.record_event(StatEvent::CheckCompleted {
            verdict_type: verdict.verdict_type,
            failed_providers,
        });
        Ok(verdict)
    }

    async fn query_reputation(&self, number: &CanonicalPhoneNumber) -> Option<ReputationResult> {
        let service = self.reputation.as_ref()?;
        match service.query(number).await {
            Ok(result) => result,
            Err(e) => {
                log::warn!("{} failed for {number}: {e}", service.name());
                None
            }
        }
    }

    pub async fn report_number(
        &self,
        raw: &str,
        report: UserReport,
    ) -> Result<ReportDispatch, CheckError> {
        let number = Self::parse(raw)?;
        log::info!("📝 Reporting {number} as {}", report.verdict_type);

        let dispatch = self.fanout.dispatch(&number, &report).await;
        if let Some(partial) = dispatch.partial_failure() {
            log::warn!("{partial}");
        }

        self.statistics.record_event(StatEvent::ReportDispatched {
            accepted: dispatch.success,
        });
        Ok(dispatch)
    }

    /// Text search over the registry, optionally extended with an external lookup
    pub async fn search_reports(&self, query: &str, filters: &SearchFilters) -> SearchResults {
        let needle = query.trim().to_lowercase();
        let digits = normalize(query);

        let mut hits: Vec<SearchHit> = self
            .registry
            .entries()
            .filter(|(key, entry)| {
                if needle.is_empty() {
                    return true;
                }
                let label = self.registry.category_label(&entry.category).to_lowercase();
                Self::number_matches(key, &digits)
                    || entry.description.to_lowercase().contains(&needle)
                    || label.contains(&needle)
            })
            .map(|(key, entry)| SearchHit {
                phone_number: key.clone(),
                verdict_type: entry.verdict_type,
                risk_level: entry.risk_level,
                report_count: entry.reports,
                description: entry.description.clone(),
                category: entry.category.clone(),
                category_label: self.registry.category_label(&entry.category),
                last_report: entry.last_report,
                source: LOCAL_REGISTRY_SOURCE.to_string(),
            })
            .filter(|hit| Self::passes_filters(hit, filters))
            .collect();
        let local_count = hits.len();

        if filters.include_external {
            if let Ok(number) = CanonicalPhoneNumber::parse(query) {
                let summary = self.external.query_all(&number).await;
                let external_hits: Vec<SearchHit> = summary
                    .settlements
                    .iter()
                    .filter_map(|settlement| {
                        let report = settlement.outcome.report().filter(|r| r.reported)?;
                        Some(SearchHit {
                            phone_number: number.to_string(),
                            verdict_type: report.verdict_type,
                            risk_level: report.risk_level,
                            report_count: report.report_count,
                            description: report.description.clone(),
                            category: report.category.clone(),
                            category_label: "Reported externally".to_string(),
                            last_report: report.last_report,
                            source: settlement.provider.clone(),
                        })
                    })
                    .filter(|hit| Self::passes_filters(hit, filters))
                    .collect();
                hits.extend(external_hits);
            }
        }
        let external_count = hits.len() - local_count;

        hits.sort_by(|a, b| {
            b.report_count
                .cmp(&a.report_count)
                .then_with(|| a.phone_number.cmp(&b.phone_number))
                .then_with(|| a.source.cmp(&b.source))
        });

        log::debug!("Search '{query}': {local_count} local, {external_count} external");
        SearchResults {
            query: query.to_string(),
            hits,
            local_count,
            external_count,
        }
    }

    fn number_matches(key: &str, digits: &str) -> bool {
        if digits.is_empty() {
            return false;
        }
        if key.contains(digits) {
            return true;
        }
        CanonicalPhoneNumber::parse(key)
            .map(|number| number.alternate_form().as_str().contains(digits))
            .unwrap_or(false)
    }

    fn passes_filters(hit: &SearchHit, filters: &SearchFilters) -> bool {
        if filters.verdict_type.is_some_and(|t| t != hit.verdict_type) {
            return false;
        }
        if filters.risk_level.is_some_and(|r| r != hit.risk_level) {
            return false;
        }
        match &filters.category {
            Some(category) => hit.category.eq_ignore_ascii_case(category),
            None => true,
        }
    }

    pub async fn statistics(&self) -> anyhow::Result<CheckerStats> {
        Ok(CheckerStats {
            registry: self.registry.stats(),
            runtime: self.statistics.get_stats().await?,
        })
    }

    pub fn provider_status(&self) -> Vec<ProviderStatus> {
        let mut status: Vec<ProviderStatus> = self
            .external
            .providers()
            .iter()
            .map(|provider| ProviderStatus {
                name: provider.name().to_string(),
                role: ProviderRole::External,
                simulated: provider.is_simulated(),
            })
            .collect();
        if let Some(service) = &self.reputation {
            status.push(ProviderStatus {
                name: service.name().to_string(),
                role: ProviderRole::CallerReputation,
                simulated: service.is_simulated(),
            });
        }
        status
    }

    pub fn report_destinations(&self) -> Vec<String> {
        self.fanout.destinations()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision_engine::DecisionConfig;
    use crate::providers::{ProviderError, ProviderReport};
    use crate::random::FixedRandom;
    use crate::reporting::{DispatchPolicy, ReportError, ReportReceipt, SubmittedReport, LOCAL_STORE_DESTINATION};
    use crate::reputation::{risk_level_for, CallerDetails, ConfidenceLabel, REPUTATION_SOURCE};
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct DownProvider;

    #[async_trait]
    impl ReputationProvider for DownProvider {
        fn name(&self) -> &str {
            "down"
        }

        async fn query(&self, _number: &CanonicalPhoneNumber) -> Result<ProviderReport, ProviderError> {
            Err(ProviderError::Unavailable("connection refused".to_string()))
        }
    }

    struct QuietProvider;

    #[async_trait]
    impl ReputationProvider for QuietProvider {
        fn name(&self) -> &str {
            "quiet"
        }

        async fn query(&self, _number: &CanonicalPhoneNumber) -> Result<ProviderReport, ProviderError> {
            Ok(ProviderReport::not_reported())
        }
    }

    /// Always answers "spam"
    struct SpamReputation;

    #[async_trait]
    impl CallerReputationService for SpamReputation {
        fn name(&self) -> &str {
            REPUTATION_SOURCE
        }

        async fn query(
            &self,
            number: &CanonicalPhoneNumber,
        ) -> Result<Option<ReputationResult>, ProviderError> {
            Ok(Some(ReputationResult {
                phone_number: number.clone(),
                spam_score: 60,
                scam_reports: 55,
                confidence: ConfidenceLabel::Medium,
                risk_level: risk_level_for(60),
                category: VerdictType::Spam,
                details: CallerDetails {
                    display_name: "Marie Martin".to_string(),
                    carrier: "SFR".to_string(),
                    city: "Lyon".to_string(),
                    line_type: "mobile".to_string(),
                    country_code: "FR".to_string(),
                    timezone: "Europe/Paris".to_string(),
                },
                last_updated: Utc::now(),
            }))
        }
    }

    /// Counts every call it receives
    #[derive(Default)]
    struct CountingSource {
        queries: AtomicUsize,
        submissions: AtomicUsize,
    }

    #[async_trait]
    impl ReputationProvider for CountingSource {
        fn name(&self) -> &str {
            "counting"
        }

        async fn query(&self, _number: &CanonicalPhoneNumber) -> Result<ProviderReport, ProviderError> {
            self.queries.fetch_add(1, Ordering::SeqCst);
            Ok(ProviderReport::not_reported())
        }
    }

    #[async_trait]
    impl ReportSink for CountingSource {
        fn destination_id(&self) -> &str {
            "counting"
        }

        async fn submit(&self, report: &SubmittedReport) -> Result<ReportReceipt, ReportError> {
            self.submissions.fetch_add(1, Ordering::SeqCst);
            Ok(ReportReceipt {
                destination: "counting".to_string(),
                report_id: format!("COUNT-{}", report.submitted_at.timestamp_millis()),
            })
        }
    }

    struct RefusingSink;

    #[async_trait]
    impl ReportSink for RefusingSink {
        fn destination_id(&self) -> &str {
            "external"
        }

        async fn submit(&self, _report: &SubmittedReport) -> Result<ReportReceipt, ReportError> {
            Err(ReportError::Unavailable("timeout".to_string()))
        }
    }

    fn checker(
        registry: LocalRegistry,
        providers: Vec<Arc<dyn ReputationProvider>>,
        reputation: Option<Arc<dyn CallerReputationService>>,
    ) -> PhoneChecker {
        let sinks: Vec<Arc<dyn ReportSink>> = vec![Arc::new(LocalReportStore::new())];
        PhoneChecker::new(
            Arc::new(registry),
            ExternalAggregate::new(providers),
            reputation,
            DecisionEngine::new(DecisionConfig::default()),
            ReportFanout::new(sinks, DispatchPolicy::Any),
        )
    }

    fn sample_report() -> UserReport {
        UserReport {
            verdict_type: VerdictType::Scam,
            description: "Fake bank advisor".to_string(),
            category: Some("banking".to_string()),
        }
    }

    #[tokio::test]
    async fn test_invalid_number_fails_fast() {
        let checker = PhoneChecker::from_config(&Config::default()).unwrap();
        for raw in ["12345", "", "+44612345678", "0012345678"] {
            assert!(matches!(
                checker.check_phone_number(raw).await,
                Err(CheckError::InvalidNumberFormat(_))
            ));
        }
        assert!(checker.report_number("12345", sample_report()).await.is_err());

        let stats = checker.statistics().await.unwrap();
        assert_eq!(stats.runtime.checks_performed, 0);
    }

    #[tokio::test]
    async fn test_invalid_number_reaches_no_source() {
        let counting = Arc::new(CountingSource::default());
        let providers: Vec<Arc<dyn ReputationProvider>> = vec![counting.clone()];
        let sinks: Vec<Arc<dyn ReportSink>> = vec![counting.clone()];
        let checker = PhoneChecker::new(
            Arc::new(LocalRegistry::default()),
            ExternalAggregate::new(providers),
            None,
            DecisionEngine::default(),
            ReportFanout::new(sinks, DispatchPolicy::Any),
        );

        assert!(checker.check_phone_number("12345").await.is_err());
        assert!(checker.report_number("12345", sample_report()).await.is_err());
        assert_eq!(counting.queries.load(Ordering::SeqCst), 0);
        assert_eq!(counting.submissions.load(Ordering::SeqCst), 0);

        // Same wiring with a valid number reaches both
        checker.check_phone_number("0611223344").await.unwrap();
        checker.report_number("0611223344", sample_report()).await.unwrap();
        assert_eq!(counting.queries.load(Ordering::SeqCst), 1);
        assert_eq!(counting.submissions.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_notation_does_not_change_verdict() {
        let checker = checker(
            LocalRegistry::empty(),
            vec![],
            Some(Arc::new(ReputationHeuristic::seeded(0))),
        );

        for subscriber in 623_456_700u32..623_456_900 {
            let national = checker.check_phone_number(&format!("0{subscriber}")).await.unwrap();
            let international = checker
                .check_phone_number(&format!("+33{subscriber}"))
                .await
                .unwrap();
            assert_eq!(national.verdict_type, international.verdict_type, "{subscriber}");
            assert_eq!(national.risk_level, international.risk_level, "{subscriber}");
            assert_eq!(national.confidence, international.confidence, "{subscriber}");
        }
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_local_verdict() {
        let checker = checker(
            LocalRegistry::default(),
            vec![Arc::new(DownProvider), Arc::new(DownProvider)],
            Some(Arc::new(SpamReputation)),
        );

        let verdict = checker.check_phone_number("+33612345678").await.unwrap();
        assert_eq!(verdict.verdict_type, VerdictType::Scam);
        assert_eq!(verdict.report_count, 342);
        assert_eq!(verdict.risk_level, RiskLevel::High);
        assert_eq!(verdict.confidence, 80);
        assert_eq!(verdict.source, LOCAL_REGISTRY_SOURCE);

        let stats = checker.statistics().await.unwrap();
        assert_eq!(stats.runtime.provider_failures.get("down"), Some(&2));
    }

    #[tokio::test]
    async fn test_no_evidence_fallback() {
        let checker = checker(
            LocalRegistry::empty(),
            vec![Arc::new(QuietProvider)],
            Some(Arc::new(ReputationHeuristic::new(Arc::new(FixedRandom(0)), 0))),
        );

        let verdict = checker.check_phone_number("06 11 22 33 44").await.unwrap();
        assert!(!verdict.found);
        assert_eq!(verdict.verdict_type, VerdictType::Reliable);
        assert_eq!(verdict.risk_level, RiskLevel::None);
        assert_eq!(verdict.confidence, 95);
        assert_eq!(verdict.report_count, 0);
        assert!(verdict.pattern_assessment.is_some());
    }

    #[tokio::test]
    async fn test_heuristic_decides_when_nothing_else_knows() {
        let checker = checker(
            LocalRegistry::empty(),
            vec![Arc::new(DownProvider)],
            Some(Arc::new(SpamReputation)),
        );
        let verdict = checker.check_phone_number("0611223344").await.unwrap();
        assert_eq!(verdict.verdict_type, VerdictType::Spam);
        assert_eq!(verdict.confidence, 70);
        assert_eq!(verdict.source, REPUTATION_SOURCE);
    }

    #[tokio::test]
    async fn test_consecutive_checks_agree() {
        let checker = PhoneChecker::from_config(&Config::default()).unwrap();
        for raw in ["0623456782", "+33612345678", "0711223344", "0199912345"] {
            let first = checker.check_phone_number(raw).await.unwrap();
            let second = checker.check_phone_number(raw).await.unwrap();
            assert_eq!(first.verdict_type, second.verdict_type);
            assert_eq!(first.risk_level, second.risk_level);
            assert_eq!(first.confidence, second.confidence);
            assert!(first.confidence <= 100);
        }

        let stats = checker.statistics().await.unwrap();
        assert_eq!(stats.runtime.checks_performed, 8);
    }

    #[tokio::test]
    async fn test_default_checker_on_known_numbers() {
        let checker = PhoneChecker::from_config(&Config::default()).unwrap();

        // Local entry, ScamAlert confirms: one responder (20) + >100 reports (40)
        let verdict = checker.check_phone_number("06 12 34 56 78").await.unwrap();
        assert_eq!(verdict.verdict_type, VerdictType::Scam);
        assert_eq!(verdict.confidence, 60);
        assert!(verdict.contributing_sources.contains("ScamAlert.fr"));
        assert_eq!(verdict.category_label, "Fraudulent tech support");
    }

    #[tokio::test]
    async fn test_report_fanout_is_independent() {
        let store = Arc::new(LocalReportStore::new());
        let sinks: Vec<Arc<dyn ReportSink>> = vec![store.clone(), Arc::new(RefusingSink)];
        let checker = PhoneChecker::new(
            Arc::new(LocalRegistry::default()),
            ExternalAggregate::new(vec![]),
            None,
            DecisionEngine::default(),
            ReportFanout::new(sinks, DispatchPolicy::Any),
        );

        let dispatch = checker
            .report_number("0611223344", sample_report())
            .await
            .unwrap();
        assert!(dispatch.success);
        assert_eq!(dispatch.outcome(LOCAL_STORE_DESTINATION), Some(true));
        assert_eq!(dispatch.outcome("external"), Some(false));
        assert!(dispatch.partial_failure().is_some());
        assert_eq!(store.len().await, 1);

        let stats = checker.statistics().await.unwrap();
        assert_eq!(stats.runtime.reports_submitted, 1);
        assert_eq!(stats.runtime.reports_accepted, 1);
    }

    #[tokio::test]
    async fn test_default_fanout_reaches_scamalert() {
        let checker = PhoneChecker::from_config(&Config::default()).unwrap();
        assert_eq!(checker.report_destinations(), vec!["local", "ScamAlert.fr"]);

        let dispatch = checker
            .report_number("0611223344", sample_report())
            .await
            .unwrap();
        assert!(dispatch.success);
        assert_eq!(dispatch.accepted_count(), 2);
        assert!(dispatch.report_id.starts_with("MULTI-"));
    }

    #[tokio::test]
    async fn test_search_by_text() {
        let checker = checker(LocalRegistry::default(), vec![], None);

        let results = checker.search_reports("TECH SUPPORT", &SearchFilters::default()).await;
        let counts: Vec<u32> = results.hits.iter().map(|h| h.report_count).collect();
        assert_eq!(counts, vec![342, 298]);
        assert_eq!(results.local_count, 2);
        assert_eq!(results.external_count, 0);

        let results = checker.search_reports("06 12 34 56 78", &SearchFilters::default()).await;
        assert_eq!(results.hits.len(), 1);
        assert_eq!(results.hits[0].phone_number, "+33612345678");
    }

    #[tokio::test]
    async fn test_search_filters() {
        let checker = checker(LocalRegistry::default(), vec![], None);

        let filters = SearchFilters {
            verdict_type: Some(VerdictType::Spam),
            risk_level: Some(RiskLevel::Low),
            ..SearchFilters::default()
        };
        let results = checker.search_reports("", &filters).await;
        assert_eq!(results.hits.len(), 2);
        assert_eq!(results.hits[0].report_count, 123);
        assert_eq!(results.hits[1].report_count, 89);

        let filters = SearchFilters {
            category: Some("banking".to_string()),
            ..SearchFilters::default()
        };
        let results = checker.search_reports("", &filters).await;
        assert_eq!(results.hits.len(), 1);
        assert_eq!(results.hits[0].category_label, "Banking scam");
    }

    #[tokio::test]
    async fn test_search_with_external_lookup() {
        let checker = PhoneChecker::from_config(&Config::default()).unwrap();
        let filters = SearchFilters::default();
        assert!(filters.include_external);

        let results = checker.search_reports("+33612345677", &filters).await;
        assert_eq!(results.local_count, 1);
        assert_eq!(results.external_count, 1);
        assert!(results.hits.iter().any(|h| h.source == "ScamAlert.fr"));

        // Text queries never reach external providers
        let results = checker.search_reports("insurance", &filters).await;
        assert_eq!(results.external_count, 0);

        let local_only = SearchFilters {
            include_external: false,
            ..SearchFilters::default()
        };
        let results = checker.search_reports("+33612345677", &local_only).await;
        assert_eq!(results.local_count, 1);
        assert_eq!(results.external_count, 0);
    }

    #[test]
    fn test_search_filters_deserialize_with_external_on() {
        let filters: SearchFilters = serde_json::from_str(r#"{"verdict_type": "scam"}"#).unwrap();
        assert_eq!(filters.verdict_type, Some(VerdictType::Scam));
        assert!(filters.include_external);
    }

    #[tokio::test]
    async fn test_provider_status() {
        let checker = PhoneChecker::from_config(&Config::default()).unwrap();
        let status = checker.provider_status();
        assert_eq!(status.len(), 2);
        assert_eq!(status[0].name, "ScamAlert.fr");
        assert_eq!(status[0].role, ProviderRole::External);
        assert!(status[0].simulated);
        assert_eq!(status[1].role, ProviderRole::CallerReputation);

        let mut config = Config::default();
        config.providers.numverify.enabled = true;
        config.reputation.enabled = false;
        let checker = PhoneChecker::from_config(&config).unwrap();
        let names: Vec<String> = checker.provider_status().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["ScamAlert.fr", "NumVerify"]);
    }
}
