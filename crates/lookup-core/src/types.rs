//! Shared types used across the Lookup workspace.
//!
//! This module defines the record model every backend produces and the
//! newtypes that identify sources and search modes.

use crate::error::LookupError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::OnceLock;

/// A person record as captured by one source.
///
/// No field is ever absent: an unknown string is empty and an unknown age is
/// `0`. Equality (and hashing) is full structural equality over every field,
/// which is what result deduplication relies on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Person {
    /// Source-opaque identifier, stable per source
    pub id: String,
    /// Full name as displayed by the source
    pub name: String,
    /// Age in years (0 = unknown)
    pub age: u32,
    /// Postal address
    pub address: String,
    /// Phone number
    pub phone: String,
    /// Email address
    pub email: String,
}

impl Person {
    /// Create a person with an id and name; every other field is unknown.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the age.
    #[must_use]
    pub fn with_age(mut self, age: u32) -> Self {
        self.age = age;
        self
    }

    /// Set the address.
    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    /// Set the phone number.
    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = phone.into();
        self
    }

    /// Set the email address.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }
}

/// Ordered collection of matches returned by a search.
///
/// Order carries no meaning beyond "first seen" and is not stable across
/// merges.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Matched person records
    pub matches: Vec<Person>,
}

impl SearchResult {
    /// Wrap a list of matches.
    #[must_use]
    pub fn new(matches: Vec<Person>) -> Self {
        Self { matches }
    }

    /// A result with no matches.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of matches.
    #[must_use]
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    /// Whether there are no matches.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Iterate over the matches.
    pub fn iter(&self) -> std::slice::Iter<'_, Person> {
        self.matches.iter()
    }

    /// Drop structurally identical records, keeping the first occurrence.
    #[must_use]
    pub fn dedup(self) -> Self {
        let mut seen = HashSet::with_capacity(self.matches.len());
        let matches = self
            .matches
            .into_iter()
            .filter(|person| seen.insert(person.clone()))
            .collect();
        Self { matches }
    }
}

impl From<Vec<Person>> for SearchResult {
    fn from(matches: Vec<Person>) -> Self {
        Self::new(matches)
    }
}

impl IntoIterator for SearchResult {
    type Item = Person;
    type IntoIter = std::vec::IntoIter<Person>;

    fn into_iter(self) -> Self::IntoIter {
        self.matches.into_iter()
    }
}

/// The field a search is keyed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    /// Full name
    Name,
    /// Postal address
    Address,
    /// Phone number
    Phone,
    /// Email address
    Email,
}

impl SearchMode {
    /// Every search mode, in canonical order.
    pub const ALL: [SearchMode; 4] = [Self::Name, Self::Address, Self::Phone, Self::Email];

    /// Lowercase identifier used in definitions and logs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Address => "address",
            Self::Phone => "phone",
            Self::Email => "email",
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Newtype for source identifiers with validation.
///
/// Source IDs must be lowercase alphanumeric with hyphens, 3-50 characters.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SourceId(String);

impl SourceId {
    /// Create a new `SourceId` from a string.
    ///
    /// # Errors
    /// Returns error if the ID doesn't match the required format.
    pub fn new(id: impl Into<String>) -> Result<Self, LookupError> {
        let id = id.into();
        Self::validate(&id)?;
        Ok(Self(id))
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(id: &str) -> Result<(), LookupError> {
        static SOURCE_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = SOURCE_REGEX
            .get_or_init(|| Regex::new(r"^[a-z0-9][a-z0-9-]{1,48}[a-z0-9]$").expect("valid regex"));

        if id.len() < 3 || id.len() > 50 {
            return Err(LookupError::Validation(format!(
                "invalid source ID: must be 3-50 characters, got {} characters",
                id.len()
            )));
        }

        if regex.is_match(id) {
            Ok(())
        } else {
            Err(LookupError::Validation(format!(
                "invalid source ID: must be lowercase alphanumeric with hyphens, got '{id}'"
            )))
        }
    }
}

impl TryFrom<String> for SourceId {
    type Error = LookupError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SourceId> for String {
    fn from(id: SourceId) -> Self {
        id.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn john(id: &str) -> Person {
        Person::new(id, "John Smith")
            .with_age(42)
            .with_address("12 Elm St, Springfield")
    }

    #[test]
    fn test_person_defaults_are_unknown_not_null() {
        let person = Person::new("p1", "Jane Doe");
        assert_eq!(person.age, 0);
        assert!(person.address.is_empty());
        assert!(person.phone.is_empty());
        assert!(person.email.is_empty());
    }

    #[test]
    fn test_person_equality_is_structural() {
        assert_eq!(john("1"), john("1"));
        // Differing only by one populated field keeps them distinct
        assert_ne!(john("1"), john("1").with_phone("555-0100"));
    }

    #[test]
    fn test_dedup_preserves_first_seen_order() {
        let result = SearchResult::new(vec![
            john("2"),
            john("1"),
            john("2"),
            john("3"),
            john("1"),
        ]);

        let ids: Vec<_> = result.dedup().iter().map(|p| p.id.clone()).collect();
        assert_eq!(ids, vec!["2", "1", "3"]);
    }

    #[test]
    fn test_dedup_keeps_near_duplicates() {
        let result = SearchResult::new(vec![john("1"), john("1").with_age(43)]);
        assert_eq!(result.dedup().len(), 2);
    }

    #[test]
    fn test_search_result_json_shape() {
        let result = SearchResult::new(vec![Person::new("1", "John Smith")]);
        let json = serde_json::to_value(&result).expect("serialize result");
        assert_eq!(json["matches"][0]["id"], "1");
        assert_eq!(json["matches"][0]["age"], 0);
        assert_eq!(json["matches"][0]["email"], "");
    }

    #[test]
    fn test_search_mode_display() {
        assert_eq!(SearchMode::Name.to_string(), "name");
        assert_eq!(SearchMode::Email.as_str(), "email");
        assert_eq!(SearchMode::ALL.len(), 4);

        let mode: SearchMode = serde_json::from_str("\"phone\"").expect("deserialize mode");
        assert_eq!(mode, SearchMode::Phone);
    }

    #[test]
    fn test_source_id_valid() {
        for id in ["cyber-background-checks", "smart-bgc", "abc"] {
            assert!(SourceId::new(id).is_ok(), "Failed for: {id}");
        }
    }

    #[test]
    fn test_source_id_invalid() {
        let too_long = "a".repeat(51);
        let invalid_ids = vec![
            "ab",              // Too short
            "Cyber",           // Uppercase
            "cyber_bgc",       // Underscore
            "-cyber",          // Starts with hyphen
            "cyber-",          // Ends with hyphen
            too_long.as_str(), // Too long
        ];

        for id in invalid_ids {
            assert!(SourceId::new(id).is_err(), "Should fail for: {id}");
        }
    }

    #[test]
    fn test_source_id_deserialize_validates() {
        let ok: SourceId = serde_json::from_str("\"people-finder\"").expect("valid id");
        assert_eq!(ok.as_str(), "people-finder");

        let bad = serde_json::from_str::<SourceId>("\"Not Valid\"");
        assert!(bad.is_err());
    }
}
