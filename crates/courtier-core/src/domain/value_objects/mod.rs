//! Value Objects module
//!
//! Immutable domain primitives shared by the wizard and the ingestor.

pub mod attribution;
pub mod consent;
pub mod prefill;

pub use attribution::{AttributionError, AttributionParams};
pub use consent::{
    ConsentChannel, ConsentFlags, ConsentOption, ConsentPurpose, ConsentRecord, LawfulBasis,
};
pub use prefill::PrefillClaims;

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

/// Field identifiers the pipeline reads when it builds the contact record
pub mod field_ids {
    pub const FIRST_NAME: &str = "prenom";
    pub const LAST_NAME: &str = "nom";
    pub const EMAIL: &str = "email";
    pub const PHONE: &str = "telephone";
    pub const POSTAL_CODE: &str = "code_postal";
    pub const CIVILITY: &str = "civilite";
}

/// Store-generated contact identifier (`contact.identifiant`)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContactId(i64);

impl ContactId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Store-generated project identifier (`projets.projet_id`)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(i64);

impl ProjectId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Value entered for one field: a single string, or several for checkbox groups
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Multi(Vec<String>),
}

impl FieldValue {
    /// Empty string or empty selection
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.is_empty(),
            Self::Multi(items) => items.is_empty(),
        }
    }

    /// Length in characters for text, in items for selections
    pub fn len(&self) -> usize {
        match self {
            Self::Text(s) => s.chars().count(),
            Self::Multi(items) => items.len(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Multi(_) => None,
        }
    }

    /// Text a pattern is matched against; selections are joined with commas
    pub fn match_text(&self) -> Cow<'_, str> {
        match self {
            Self::Text(s) => Cow::Borrowed(s),
            Self::Multi(items) => Cow::Owned(items.join(",")),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(values: Vec<String>) -> Self {
        Self::Multi(values)
    }
}

impl From<Vec<&str>> for FieldValue {
    fn from(values: Vec<&str>) -> Self {
        Self::Multi(values.into_iter().map(str::to_string).collect())
    }
}

/// Field id → entered value
pub type FieldValues = HashMap<String, FieldValue>;

/// Field id → displayed validation message
pub type ErrorMap = HashMap<String, String>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_value_emptiness() {
        assert!(FieldValue::from("").is_empty());
        assert!(FieldValue::Multi(vec![]).is_empty());
        assert!(!FieldValue::from("a").is_empty());
        assert!(!FieldValue::from(vec!["Optique"]).is_empty());
    }

    #[test]
    fn test_field_value_length_counts_chars() {
        assert_eq!(FieldValue::from("Hélène").len(), 6);
        assert_eq!(FieldValue::from(vec!["a", "b"]).len(), 2);
    }

    #[test]
    fn test_field_value_untagged_json() {
        let text: FieldValue = serde_json::from_str("\"75001\"").unwrap();
        assert_eq!(text, FieldValue::from("75001"));

        let multi: FieldValue = serde_json::from_str("[\"Dentaire\",\"Optique\"]").unwrap();
        assert_eq!(multi.match_text(), "Dentaire,Optique");
    }
}
