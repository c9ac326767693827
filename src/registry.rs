//! Curated local registry of reported numbers.
//!
//! The registry is read-only once built. Lookups return a fresh
//! [`SourceRecord`] copied verbatim from the stored entry.

use crate::normalization::CanonicalPhoneNumber;
use crate::verdict::{RiskLevel, SourceRecord, VerdictType};
use anyhow::Context;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

pub const LOCAL_REGISTRY_SOURCE: &str = "local-registry";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryEntry {
    #[serde(rename = "type")]
    pub verdict_type: VerdictType,
    pub reports: u32,
    pub last_report: Option<NaiveDate>,
    pub description: String,
    pub category: String,
    pub risk_level: RiskLevel,
}

/// On-disk layout of a registry file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryFile {
    #[serde(default)]
    pub numbers: BTreeMap<String, RegistryEntry>,
    #[serde(default)]
    pub categories: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub name: String,
    pub count: u32,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegistryStats {
    pub total_entries: usize,
    pub total_reports: u32,
    pub scam_reports: u32,
    pub spam_reports: u32,
    pub verified_safe: usize,
    pub top_categories: Vec<CategoryShare>,
}

#[derive(Debug, Clone)]
pub struct LocalRegistry {
    entries: HashMap<String, RegistryEntry>,
    category_labels: HashMap<String, String>,
}

impl LocalRegistry {
    pub fn new(
        entries: HashMap<String, RegistryEntry>,
        category_labels: HashMap<String, String>,
    ) -> Self {
        Self {
            entries,
            category_labels,
        }
    }

    pub fn empty() -> Self {
        Self::new(HashMap::new(), default_category_labels())
    }

    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read registry file: {path}"))?;
        let file: RegistryFile = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse registry file: {path}"))?;
        Ok(Self::from_registry_file(file))
    }

    pub fn from_registry_file(file: RegistryFile) -> Self {
        let mut entries = HashMap::new();
        for (raw, entry) in file.numbers {
            // Keys are stored in canonical form so lookups never need to normalize
            match CanonicalPhoneNumber::parse(&raw) {
                Ok(number) => {
                    entries.insert(number.as_str().to_string(), entry);
                }
                Err(e) => log::warn!("Skipping registry entry: {e}"),
            }
        }

        let mut category_labels = default_category_labels();
        category_labels.extend(file.categories);

        log::info!("Loaded local registry with {} entries", entries.len());
        Self::new(entries, category_labels)
    }

    /// Exact canonical key first, then the other notation of the same number
    pub fn lookup(&self, number: &CanonicalPhoneNumber) -> Option<SourceRecord> {
        let (key, entry) = self.entry_for(number)?;
        log::debug!("Local registry hit for {number} (stored as {key})");
        Some(Self::to_record(entry))
    }

    fn entry_for(&self, number: &CanonicalPhoneNumber) -> Option<(&str, &RegistryEntry)> {
        if let Some((key, entry)) = self.entries.get_key_value(number.as_str()) {
            return Some((key.as_str(), entry));
        }
        let alternate = number.alternate_form();
        self.entries
            .get_key_value(alternate.as_str())
            .map(|(key, entry)| (key.as_str(), entry))
    }

    fn to_record(entry: &RegistryEntry) -> SourceRecord {
        SourceRecord {
            found: true,
            verdict_type: entry.verdict_type,
            risk_level: entry.risk_level,
            report_count: entry.reports,
            last_report_date: entry.last_report,
            description: entry.description.clone(),
            category: entry.category.clone(),
            source_name: LOCAL_REGISTRY_SOURCE.to_string(),
        }
    }

    pub fn category_label(&self, category: &str) -> String {
        self.category_labels
            .get(category)
            .cloned()
            .unwrap_or_else(|| "Uncategorized".to_string())
    }

    pub fn entries(&self) -> impl Iterator<Item = (&String, &RegistryEntry)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> RegistryStats {
        let total_reports: u32 = self.entries.values().map(|e| e.reports).sum();
        let reports_of = |kind: VerdictType| -> u32 {
            self.entries
                .values()
                .filter(|e| e.verdict_type == kind)
                .map(|e| e.reports)
                .sum()
        };

        let mut per_category: HashMap<&str, u32> = HashMap::new();
        for entry in self.entries.values().filter(|e| e.reports > 0) {
            *per_category.entry(entry.category.as_str()).or_insert(0) += entry.reports;
        }

        let mut top_categories: Vec<CategoryShare> = per_category
            .into_iter()
            .map(|(category, count)| CategoryShare {
                name: self.category_label(category),
                count,
                percentage: if total_reports > 0 {
                    (count as f64 / total_reports as f64 * 1000.0).round() / 10.0
                } else {
                    0.0
                },
            })
            .collect();
        top_categories.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
        top_categories.truncate(6);

        RegistryStats {
            total_entries: self.entries.len(),
            total_reports,
            scam_reports: reports_of(VerdictType::Scam),
            spam_reports: reports_of(VerdictType::Spam),
            verified_safe: self
                .entries
                .values()
                .filter(|e| e.verdict_type == VerdictType::Safe)
                .count(),
            top_categories,
        }
    }
}

impl Default for LocalRegistry {
    /// Built-in community dataset
    fn default() -> Self {
        Self::from_registry_file(builtin_registry_file())
    }
}

pub fn default_category_labels() -> HashMap<String, String> {
    [
        ("tech_support", "Fraudulent tech support"),
        ("banking", "Banking scam"),
        ("utility", "Fake invoices"),
        ("tax", "Tax scam"),
        ("insurance", "Insurance scam"),
        ("inheritance", "Inheritance scam"),
        ("telecom", "Telecom cold calling"),
        ("finance", "Financial cold calling"),
        ("energy", "Energy cold calling"),
        ("home_improvement", "Home improvement"),
        ("lottery", "Contests and lotteries"),
        ("survey", "Paid surveys"),
        ("spam", "Unsolicited calls"),
        ("verified", "Verified number"),
        ("unknown", "Uncategorized"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

fn builtin_registry_file() -> RegistryFile {
    let rows: [(&str, VerdictType, u32, Option<(i32, u32, u32)>, &str, &str, RiskLevel); 16] = [
        ("+33123456789", VerdictType::Spam, 156, Some((2024, 1, 20)), "Automated telemarketing calls - SFR/Orange", "telecom", RiskLevel::Medium),
        ("0568482050", VerdictType::Spam, 1, Some((2024, 1, 22)), "Spam calls and SMS reported by a user", "spam", RiskLevel::Medium),
        ("+33612345678", VerdictType::Scam, 342, Some((2024, 1, 21)), "Microsoft tech support scam - asks for remote access", "tech_support", RiskLevel::High),
        ("+33123456788", VerdictType::Spam, 89, Some((2024, 1, 19)), "Unsolicited SMS advertising - mortgage offers", "finance", RiskLevel::Low),
        ("+33612345677", VerdictType::Scam, 267, Some((2024, 1, 22)), "Fake EDF electricity invoice - urgent payment demand", "utility", RiskLevel::High),
        ("+33123456787", VerdictType::Safe, 0, None, "Verified and safe number", "verified", RiskLevel::None),
        ("+33612345676", VerdictType::Scam, 189, Some((2024, 1, 18)), "Bank card scam - fictitious fraud alert", "banking", RiskLevel::High),
        ("+33123456786", VerdictType::Spam, 67, Some((2024, 1, 17)), "Cold calling - free insulation", "home_improvement", RiskLevel::Medium),
        ("+33612345675", VerdictType::Scam, 234, Some((2024, 1, 20)), "Tax refund scam - urgent payment", "tax", RiskLevel::High),
        ("+33123456785", VerdictType::Spam, 45, Some((2024, 1, 16)), "Contest SMS - you won an iPhone", "lottery", RiskLevel::Medium),
        ("+33612345674", VerdictType::Scam, 178, Some((2024, 1, 19)), "Insurance scam - fictitious car accident", "insurance", RiskLevel::High),
        ("+33123456784", VerdictType::Spam, 123, Some((2024, 1, 21)), "Cold calling - green energy", "energy", RiskLevel::Low),
        ("+33612345673", VerdictType::Scam, 298, Some((2024, 1, 22)), "Computer virus scam - fake malware detection", "tech_support", RiskLevel::High),
        ("+33123456783", VerdictType::Spam, 78, Some((2024, 1, 18)), "Paid survey SMS - earn 50 EUR", "survey", RiskLevel::Medium),
        ("+33612345672", VerdictType::Scam, 156, Some((2024, 1, 20)), "Inheritance scam - deceased relative abroad", "inheritance", RiskLevel::High),
        ("+33123456782", VerdictType::Spam, 92, Some((2024, 1, 17)), "Cold calling - consumer credit", "finance", RiskLevel::Medium),
    ];

    let numbers = rows
        .into_iter()
        .map(|(number, verdict_type, reports, date, description, category, risk_level)| {
            let last_report = date.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d));
            (
                number.to_string(),
                RegistryEntry {
                    verdict_type,
                    reports,
                    last_report,
                    description: description.to_string(),
                    category: category.to_string(),
                    risk_level,
                },
            )
        })
        .collect();

    RegistryFile {
        numbers,
        categories: BTreeMap::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number(raw: &str) -> CanonicalPhoneNumber {
        CanonicalPhoneNumber::parse(raw).unwrap()
    }

    #[test]
    fn test_lookup_returns_entry_verbatim() {
        let registry = LocalRegistry::default();
        let record = registry.lookup(&number("+33612345678")).unwrap();

        assert!(record.found);
        assert_eq!(record.verdict_type, VerdictType::Scam);
        assert_eq!(record.report_count, 342);
        assert_eq!(record.risk_level, RiskLevel::High);
        assert_eq!(record.category, "tech_support");
        assert_eq!(record.source_name, LOCAL_REGISTRY_SOURCE);
        assert_eq!(record.last_report_date, NaiveDate::from_ymd_opt(2024, 1, 21));
    }

    #[test]
    fn test_lookup_accepts_alternate_notation() {
        let registry = LocalRegistry::default();
        let record = registry.lookup(&number("06 12 34 56 78")).unwrap();
        assert_eq!(record.report_count, 342);

        let record = registry.lookup(&number("+33568482050")).unwrap();
        assert_eq!(record.verdict_type, VerdictType::Spam);
    }

    #[test]
    fn test_lookup_miss() {
        let registry = LocalRegistry::default();
        assert!(registry.lookup(&number("0611223344")).is_none());
        assert!(LocalRegistry::empty().lookup(&number("+33612345678")).is_none());
    }

    #[test]
    fn test_category_labels() {
        let registry = LocalRegistry::default();
        assert_eq!(registry.category_label("banking"), "Banking scam");
        assert_eq!(registry.category_label("nonexistent"), "Uncategorized");
    }

    #[test]
    fn test_registry_file_skips_invalid_numbers() {
        let yaml = r#"
numbers:
  "06 11 22 33 44":
    type: scam
    reports: 12
    last_report: 2024-02-01
    description: Fake parcel delivery
    category: parcel
    risk_level: high
  "12345":
    type: spam
    reports: 1
    last_report: null
    description: broken
    category: spam
    risk_level: low
categories:
  parcel: Parcel delivery scam
"#;
        let file: RegistryFile = serde_yaml::from_str(yaml).unwrap();
        let registry = LocalRegistry::from_registry_file(file);

        assert_eq!(registry.len(), 1);
        let record = registry.lookup(&number("0611223344")).unwrap();
        assert_eq!(record.report_count, 12);
        assert_eq!(registry.category_label("parcel"), "Parcel delivery scam");
    }

    #[test]
    fn test_stats() {
        let stats = LocalRegistry::default().stats();
        assert_eq!(stats.total_entries, 16);
        assert_eq!(stats.total_reports, 2315);
        assert_eq!(stats.scam_reports, 1664);
        assert_eq!(stats.spam_reports, 651);
        assert_eq!(stats.verified_safe, 1);
        assert_eq!(stats.top_categories[0].name, "Fraudulent tech support");
        assert_eq!(stats.top_categories[0].count, 640);
    }
}
