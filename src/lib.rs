pub mod checker;
pub mod config;
pub mod decision_engine;
pub mod external;
pub mod normalization;
pub mod patterns;
pub mod providers;
pub mod random;
pub mod registry;
pub mod reporting;
pub mod reputation;
pub mod statistics;
pub mod verdict;

pub use checker::{CheckError, PhoneChecker, SearchFilters, SearchHit, SearchResults};
pub use config::Config;
pub use decision_engine::{DecisionConfig, DecisionEngine, LogObserver, VerdictObserver};
pub use normalization::{normalize, validate, CanonicalPhoneNumber};
pub use reporting::{DispatchPolicy, ReportDispatch, UserReport};
pub use statistics::{StatEvent, StatisticsCollector};
pub use verdict::{AggregatedVerdict, RiskLevel, VerdictType};
