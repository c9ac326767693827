//! Digit-pattern heuristics for numbers no source knows about.
//!
//! Never decides a verdict; it only explains why an unlisted number may
//! still deserve caution.

use crate::normalization::CanonicalPhoneNumber;
use crate::verdict::RiskLevel;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternAssessment {
    pub risk: bool,
    pub risk_level: RiskLevel,
    pub description: String,
    pub confidence: u8,
}

struct PrefixPattern {
    regex: Regex,
    risk_level: RiskLevel,
    description: &'static str,
}

pub struct PatternAnalyzer {
    prefix_patterns: Vec<PrefixPattern>,
    repeated_digit_threshold: usize,
}

impl PatternAnalyzer {
    pub fn new() -> Self {
        let prefix_patterns = vec![
            PrefixPattern {
                regex: Regex::new(r"^1\d{8}$").expect("static pattern compiles"),
                risk_level: RiskLevel::Medium,
                description: "Number starting with 1 (frequently telemarketing)",
            },
            PrefixPattern {
                regex: Regex::new(r"^8\d{8}$").expect("static pattern compiles"),
                risk_level: RiskLevel::Low,
                description: "Number starting with 8 (premium-rate services)",
            },
            PrefixPattern {
                regex: Regex::new(r"^9\d{8}$").expect("static pattern compiles"),
                risk_level: RiskLevel::Low,
                description: "Number starting with 9 (special services)",
            },
        ];

        Self {
            prefix_patterns,
            repeated_digit_threshold: 6,
        }
    }

    pub fn analyze(&self, number: &CanonicalPhoneNumber) -> PatternAssessment {
        let nsn = number.national_significant_number();

        for pattern in &self.prefix_patterns {
            if pattern.regex.is_match(nsn) {
                log::debug!("Prefix pattern matched for {number}: {}", pattern.description);
                return PatternAssessment {
                    risk: true,
                    risk_level: pattern.risk_level,
                    description: pattern.description.to_string(),
                    confidence: 60,
                };
            }
        }

        if Self::max_digit_repeats(nsn) >= self.repeated_digit_threshold {
            return PatternAssessment {
                risk: true,
                risk_level: RiskLevel::Medium,
                description: "Suspicious number of repeated digits".to_string(),
                confidence: 70,
            };
        }

        PatternAssessment {
            risk: false,
            risk_level: RiskLevel::None,
            description: "No suspicious digit pattern".to_string(),
            confidence: 85,
        }
    }

    fn max_digit_repeats(digits: &str) -> usize {
        let mut counts: HashMap<char, usize> = HashMap::new();
        for digit in digits.chars() {
            *counts.entry(digit).or_insert(0) += 1;
        }
        counts.values().copied().max().unwrap_or(0)
    }
}

impl Default for PatternAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
