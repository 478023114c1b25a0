//! Strongly-typed identifiers used across the domain.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Natural key of an inventory item.
///
/// Always trimmed and non-empty. Comparison is exact (case-sensitive), matching
/// what a scanner decodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Barcode(String);

impl Barcode {
    /// Validate and normalize a raw barcode value.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DomainError::invalid_field("barcode", "cannot be empty"));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Barcode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Barcode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for Barcode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Barcode {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Barcode> for String {
    fn from(value: Barcode) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_trims_surrounding_whitespace() {
        let code = Barcode::parse("  0123456789 \t").unwrap();
        assert_eq!(code.as_str(), "0123456789");
    }

    #[test]
    fn parse_rejects_blank_input() {
        let err = Barcode::parse("   ").unwrap_err();
        assert!(matches!(err, DomainError::InvalidField { field: "barcode", .. }));
    }

    #[test]
    fn comparison_is_case_sensitive() {
        assert_ne!(Barcode::parse("abc").unwrap(), Barcode::parse("ABC").unwrap());
    }

    #[test]
    fn deserialize_goes_through_validation() {
        let ok: Barcode = serde_json::from_str("\" 42 \"").unwrap();
        assert_eq!(ok.as_str(), "42");

        let bad: Result<Barcode, _> = serde_json::from_str("\"\"");
        assert!(bad.is_err());
    }
}
