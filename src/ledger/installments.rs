use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Ordered set of installment numbers a payment covers, stored as "3,4,5".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InstallmentNumbers(BTreeSet<u32>);

impl InstallmentNumbers {
    /// Parses free-form input. Blank input means "no list" and yields `None`.
    pub fn parse_optional(raw: Option<&str>) -> Result<Option<Self>, ValidationError> {
        match raw.map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => s.parse().map(Some),
        }
    }

    pub fn contains(&self, installment: u32) -> bool {
        self.0.contains(&installment)
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromStr for InstallmentNumbers {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut numbers = BTreeSet::new();
        for token in s.split(',') {
            let token = token.trim();
            let n = digits(token).ok_or_else(|| {
                ValidationError::new(
                    "installment_numbers",
                    format!("'{token}' is not a valid installment number"),
                )
            })?;
            if n == 0 {
                return Err(ValidationError::new(
                    "installment_numbers",
                    "installment number must be greater than 0",
                ));
            }
            numbers.insert(n);
        }
        Ok(Self(numbers))
    }
}

/// Plain decimal digits only; signs, spaces and overflow are rejected.
fn digits(token: &str) -> Option<u32> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

impl fmt::Display for InstallmentNumbers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<String> = self.0.iter().map(u32::to_string).collect();
        write!(f, "{}", joined.join(","))
    }
}

/// How the schedule's fallback lookup compares a slot number against a stored list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum InstallmentMatch {
    /// Split on commas and compare numbers.
    #[default]
    Exact,
    /// Substring containment on the stored text; "1" also matches "11".
    Substring,
}

impl InstallmentMatch {
    pub fn matches(self, stored: &str, installment: u32) -> bool {
        match self {
            InstallmentMatch::Exact => stored
                .split(',')
                .any(|token| digits(token.trim()) == Some(installment)),
            InstallmentMatch::Substring => stored.contains(&installment.to_string()),
        }
    }
}

impl FromStr for InstallmentMatch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exact" => Ok(InstallmentMatch::Exact),
            "substring" => Ok(InstallmentMatch::Substring),
            other => Err(format!("unknown installment match mode: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sorts_and_dedups() {
        let numbers: InstallmentNumbers = " 5, 3,4 ,3".parse().unwrap();
        assert_eq!(numbers.to_string(), "3,4,5");
        assert_eq!(numbers.len(), 3);
        assert!(numbers.contains(4));
        assert!(!numbers.contains(6));
    }

    #[test]
    fn test_parse_rejects_whole_list_on_bad_token() {
        for raw in ["1,0", "2,-1", "1,x", "1,,2", "3,", "+3", "2,+4", "4294967296"] {
            let err = raw.parse::<InstallmentNumbers>().unwrap_err();
            assert_eq!(err.field, "installment_numbers", "input {raw:?}");
        }
    }

    #[test]
    fn test_signed_token_is_not_an_installment() {
        let err = "+3".parse::<InstallmentNumbers>().unwrap_err();
        assert!(err.message.contains("'+3'"), "{}", err.message);
        assert!(!InstallmentMatch::Exact.matches("+3", 3));
    }

    #[test]
    fn test_parse_optional_blank_is_absent() {
        assert_eq!(InstallmentNumbers::parse_optional(None).unwrap(), None);
        assert_eq!(InstallmentNumbers::parse_optional(Some("  ")).unwrap(), None);
        let parsed = InstallmentNumbers::parse_optional(Some("7")).unwrap().unwrap();
        assert_eq!(parsed.iter().collect::<Vec<_>>(), vec![7]);
    }

    #[test]
    fn test_exact_match_does_not_collide_on_multi_digit() {
        assert!(InstallmentMatch::Exact.matches("3,11,12", 11));
        assert!(!InstallmentMatch::Exact.matches("11,12", 1));
        assert!(!InstallmentMatch::Exact.matches("11,12", 2));
    }

    #[test]
    fn test_substring_match_keeps_inherited_behaviour() {
        assert!(InstallmentMatch::Substring.matches("11,12", 1));
        assert!(InstallmentMatch::Substring.matches("11,12", 2));
        assert!(!InstallmentMatch::Substring.matches("11,12", 3));
    }

    #[test]
    fn test_match_mode_from_str() {
        assert_eq!("EXACT".parse::<InstallmentMatch>(), Ok(InstallmentMatch::Exact));
        assert_eq!(
            "substring".parse::<InstallmentMatch>(),
            Ok(InstallmentMatch::Substring)
        );
        assert!("fuzzy".parse::<InstallmentMatch>().is_err());
    }
}
