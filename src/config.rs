use crate::decision_engine::DecisionConfig;
use crate::reporting::DispatchPolicy;
use anyhow::Context;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Optional YAML registry; the built-in dataset is used when unset
    pub registry_path: Option<String>,
    pub providers: ProvidersConfig,
    pub reputation: ReputationConfig,
    /// Per-provider timeout. Unset means wait for every provider to settle.
    pub provider_timeout_seconds: Option<u64>,
    pub decision: DecisionConfig,
    pub reporting: ReportingConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub scamalert: ScamAlertConfig,
    pub numverify: NumVerifyConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScamAlertConfig {
    pub enabled: bool,
    /// Simulated round-trip time
    pub latency_ms: u64,
    /// Also act as a report destination
    pub accept_reports: bool,
}

impl Default for ScamAlertConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            latency_ms: 0,
            accept_reports: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NumVerifyConfig {
    pub enabled: bool,
    pub api_key: String,
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl Default for NumVerifyConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: "demo".to_string(),
            base_url: "http://apilayer.net/api/validate".to_string(),
            timeout_seconds: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReputationConfig {
    pub enabled: bool,
    /// Mixed with the number so a given number always scores the same
    pub seed: u64,
    pub latency_ms: u64,
}

impl Default for ReputationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            seed: 0,
            latency_ms: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportingConfig {
    pub policy: DispatchPolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl LoggingConfig {
    pub fn level_filter(&self) -> log::LevelFilter {
        match self.level.to_lowercase().as_str() {
            "off" => log::LevelFilter::Off,
            "error" => log::LevelFilter::Error,
            "warn" | "warning" => log::LevelFilter::Warn,
            "debug" => log::LevelFilter::Debug,
            "trace" => log::LevelFilter::Trace,
            _ => log::LevelFilter::Info,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            registry_path: None,
            providers: ProvidersConfig::default(),
            reputation: ReputationConfig::default(),
            provider_timeout_seconds: None,
            decision: DecisionConfig::default(),
            reporting: ReportingConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {path}"))?;
        Ok(config)
    }

    /// Like `from_file`, but a missing file yields the defaults
    pub fn load_or_default(path: &str) -> anyhow::Result<Self> {
        if std::path::Path::new(path).exists() {
            Self::from_file(path)
        } else {
            log::warn!("Config file {path} not found, using defaults");
            Ok(Self::default())
        }
    }

    pub fn to_file(&self, path: &str) -> anyhow::Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {path}"))?;
        Ok(())
    }
}
