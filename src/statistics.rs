use crate::verdict::VerdictType;
use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tokio::sync::{mpsc, oneshot};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeStats {
    pub checks_performed: u64,
    pub verdicts: BTreeMap<String, u64>,
    pub reports_submitted: u64,
    pub reports_accepted: u64,
    pub provider_failures: BTreeMap<String, u64>,
    pub start_time: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl RuntimeStats {
    fn new() -> Self {
        let now = Utc::now();
        Self {
            checks_performed: 0,
            verdicts: BTreeMap::new(),
            reports_submitted: 0,
            reports_accepted: 0,
            provider_failures: BTreeMap::new(),
            start_time: now,
            last_updated: now,
        }
    }

    pub fn verdict_count(&self, verdict_type: VerdictType) -> u64 {
        self.verdicts.get(verdict_type.as_str()).copied().unwrap_or(0)
    }
}

#[derive(Debug)]
pub enum StatEvent {
    CheckCompleted {
        verdict_type: VerdictType,
        failed_providers: Vec<String>,
    },
    ReportDispatched {
        accepted: bool,
    },
    Snapshot(oneshot::Sender<RuntimeStats>),
}

/// Runtime counters, owned by a background task fed over a channel
pub struct StatisticsCollector {
    sender: mpsc::UnboundedSender<StatEvent>,
    _handle: tokio::task::JoinHandle<()>,
}

impl StatisticsCollector {
    /// Must be called from within a tokio runtime
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let handle = tokio::spawn(Self::stats_worker(receiver));
        Self {
            sender,
            _handle: handle,
        }
    }

    pub fn record_event(&self, event: StatEvent) {
        if let Err(e) = self.sender.send(event) {
            log::warn!("Failed to send statistics event: {e}");
        }
    }

    /// Counters as of every event recorded before this call
    pub async fn get_stats(&self) -> Result<RuntimeStats> {
        let (reply, answer) = oneshot::channel();
        self.sender
            .send(StatEvent::Snapshot(reply))
            .map_err(|_| anyhow!("Statistics worker is not running"))?;
        answer
            .await
            .map_err(|_| anyhow!("Statistics worker dropped the snapshot request"))
    }

    async fn stats_worker(mut receiver: mpsc::UnboundedReceiver<StatEvent>) {
        let mut stats = RuntimeStats::new();
        while let Some(event) = receiver.recv().await {
            Self::process_event(event, &mut stats);
        }
        log::debug!("Statistics channel closed after {} checks", stats.checks_performed);
    }

    fn process_event(event: StatEvent, stats: &mut RuntimeStats) {
        match event {
            StatEvent::CheckCompleted {
                verdict_type,
                failed_providers,
            } => {
                stats.checks_performed += 1;
                *stats
                    .verdicts
                    .entry(verdict_type.as_str().to_string())
                    .or_insert(0) += 1;
                for provider in failed_providers {
                    *stats.provider_failures.entry(provider).or_insert(0) += 1;
                }
            }
            StatEvent::ReportDispatched { accepted } => {
                stats.reports_submitted += 1;
                if accepted {
                    stats.reports_accepted += 1;
                }
            }
            StatEvent::Snapshot(reply) => {
                // The requester may have given up; nothing to do then
                let _ = reply.send(stats.clone());
                return;
            }
        }
        stats.last_updated = Utc::now();
    }
}

impl Default for StatisticsCollector {
    fn default() -> Self {
        Self::new()
    }
}
