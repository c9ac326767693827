use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// French national format: `+33` or a leading `0`, a non-zero digit, then 8 digits.
const FRENCH_NUMBER_PATTERN: &str = r"^(\+33|0)[1-9]\d{8}$";

fn french_number_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(FRENCH_NUMBER_PATTERN).expect("static pattern compiles"))
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid French phone number: {0}")]
pub struct InvalidNumberFormat(pub String);

/// A phone number that has been stripped and validated.
///
/// Only obtainable through [`CanonicalPhoneNumber::parse`], so every adapter
/// taking this type can assume the French national format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CanonicalPhoneNumber(String);

impl CanonicalPhoneNumber {
    pub fn parse(raw: &str) -> Result<Self, InvalidNumberFormat> {
        let cleaned = normalize(raw);
        if validate(&cleaned) {
            Ok(Self(cleaned))
        } else {
            Err(InvalidNumberFormat(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_international(&self) -> bool {
        self.0.starts_with("+33")
    }

    /// The 9 digits after the `+33` or `0` prefix
    pub fn national_significant_number(&self) -> &str {
        self.0
            .strip_prefix("+33")
            .or_else(|| self.0.strip_prefix('0'))
            .unwrap_or(&self.0)
    }

    /// Same subscriber, other notation: `0612345678` <-> `+33612345678`
    pub fn alternate_form(&self) -> CanonicalPhoneNumber {
        let nsn = self.national_significant_number();
        if self.is_international() {
            CanonicalPhoneNumber(format!("0{nsn}"))
        } else {
            CanonicalPhoneNumber(format!("+33{nsn}"))
        }
    }

    /// Mobile ranges start with 6 or 7 after the prefix
    pub fn is_mobile(&self) -> bool {
        matches!(self.national_significant_number().chars().next(), Some('6' | '7'))
    }
}

impl fmt::Display for CanonicalPhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for CanonicalPhoneNumber {
    type Error = InvalidNumberFormat;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CanonicalPhoneNumber> for String {
    fn from(number: CanonicalPhoneNumber) -> Self {
        number.0
    }
}

/// Strip whitespace, dashes and parentheses from user input
pub fn normalize(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '(' | ')'))
        .collect()
}

pub fn validate(number: &str) -> bool {
    french_number_regex().is_match(number)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_french_formats() {
        assert!(validate("+33612345678"));
        assert!(validate("0612345678"));
        assert!(!validate("12345"));
        assert!(!validate("0012345678")); // first digit after prefix must be non-zero
        assert!(!validate("+3361234567")); // one digit short
        assert!(!validate("+44612345678"));
    }

    #[test]
    fn test_normalize_strips_punctuation() {
        assert_eq!(normalize("06 12-34 (56) 78"), "0612345678");
        assert_eq!(normalize("+33 6 12 34 56 78"), "+33612345678");
        assert_eq!(normalize("\t06.12"), "06.12");
    }

    #[test]
    fn test_parse_rejects_invalid_input() {
        let err = CanonicalPhoneNumber::parse("06.12.34.56.78").unwrap_err();
        assert_eq!(err, InvalidNumberFormat("06.12.34.56.78".to_string()));
        assert!(CanonicalPhoneNumber::parse("").is_err());
    }

    #[test]
    fn test_alternate_forms() {
        let international = CanonicalPhoneNumber::parse("+33 6 12 34 56 78").unwrap();
        assert_eq!(international.national_significant_number(), "612345678");
        assert_eq!(international.alternate_form().as_str(), "0612345678");

        let national = CanonicalPhoneNumber::parse("0568482050").unwrap();
        assert!(!national.is_international());
        assert_eq!(national.alternate_form().as_str(), "+33568482050");
        assert!(!national.is_mobile());
        assert!(international.is_mobile());
    }

    #[test]
    fn test_serde_goes_through_validation() {
        let number: CanonicalPhoneNumber = serde_json::from_str("\"0612345678\"").unwrap();
        assert_eq!(number.as_str(), "0612345678");
        assert!(serde_json::from_str::<CanonicalPhoneNumber>("\"12345\"").is_err());
    }
}
