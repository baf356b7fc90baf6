//! Domain values for name generation: the validated subject, the rendered
//! prompt, and the per-request set of unique names.

use std::{collections::HashSet, fmt, sync::LazyLock};

use regex::Regex;

use crate::core::error::{Error, Result};

pub const MAX_SUBJECT_CHARS: usize = 50;

pub const EMPTY_SUBJECT_MESSAGE: &str = "Please enter a valid animal";
pub const INVALID_SUBJECT_CHARS_MESSAGE: &str = "Animal names may only contain letters and spaces";
pub const SUBJECT_TOO_LONG_MESSAGE: &str = "Animal names must be 50 characters or fewer";

static LETTERS_AND_SPACES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\p{L}\s]+$").expect("valid regex"));

/// A trimmed, non-empty animal name submitted by a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject(String);

impl Subject {
    /// Validates raw input. `strict` additionally limits the subject to letters
    /// and whitespace and caps its length.
    pub fn parse(raw: Option<&str>, strict: bool) -> Result<Self> {
        let trimmed = raw.unwrap_or_default().trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidInput(EMPTY_SUBJECT_MESSAGE.to_string()));
        }

        if strict {
            if trimmed.chars().count() > MAX_SUBJECT_CHARS {
                return Err(Error::InvalidInput(SUBJECT_TOO_LONG_MESSAGE.to_string()));
            }
            if !LETTERS_AND_SPACES.is_match(trimmed) {
                return Err(Error::InvalidInput(
                    INVALID_SUBJECT_CHARS_MESSAGE.to_string(),
                ));
            }
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn capitalized(&self) -> String {
        capitalize(&self.0)
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Upper-cases the first character and lower-cases the rest.
pub fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Fully rendered prompt sent to the completion provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt(String);

impl Prompt {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reduces a raw completion to a single name: the first line, trimmed.
/// Returns `None` when nothing usable remains.
pub fn normalize_candidate(raw: &str) -> Option<String> {
    let first_line = raw
        .trim()
        .split(['\n', '\r'])
        .next()
        .unwrap_or_default()
        .trim();
    if first_line.is_empty() {
        None
    } else {
        Some(first_line.to_string())
    }
}

/// Insertion-ordered set of distinct names.
#[derive(Debug, Default, Clone)]
pub struct NameSet {
    seen: HashSet<String>,
    ordered: Vec<String>,
}

impl NameSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the name was not already present.
    pub fn insert(&mut self, name: String) -> bool {
        if self.seen.contains(&name) {
            return false;
        }
        self.seen.insert(name.clone());
        self.ordered.push(name);
        true
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.ordered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capitalize_normalizes_case() {
        assert_eq!(capitalize("cAT"), "Cat");
        assert_eq!(capitalize("DOG"), "Dog");
        assert_eq!(capitalize("x"), "X");
        assert_eq!(capitalize(""), "");
        assert_eq!(capitalize("élan"), "Élan");
    }

    #[test]
    fn parse_rejects_blank_subjects() {
        for raw in [None, Some(""), Some("   \t ")] {
            let err = Subject::parse(raw, false).unwrap_err();
            assert!(matches!(err, Error::InvalidInput(ref msg) if msg == EMPTY_SUBJECT_MESSAGE));
        }
    }

    #[test]
    fn parse_trims_surrounding_whitespace() {
        let subject = Subject::parse(Some("  sea otter "), true).unwrap();
        assert_eq!(subject.as_str(), "sea otter");
        assert_eq!(subject.capitalized(), "Sea otter");
    }

    #[test]
    fn strict_parse_rejects_digits_and_punctuation() {
        let err = Subject::parse(Some("cat9"), true).unwrap_err();
        assert!(
            matches!(err, Error::InvalidInput(ref msg) if msg == INVALID_SUBJECT_CHARS_MESSAGE)
        );
        assert!(Subject::parse(Some("cat9"), false).is_ok());
    }

    #[test]
    fn strict_parse_rejects_overlong_subjects() {
        let raw = "a".repeat(MAX_SUBJECT_CHARS + 1);
        let err = Subject::parse(Some(&raw), true).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(ref msg) if msg == SUBJECT_TOO_LONG_MESSAGE));
        assert!(Subject::parse(Some(&"a".repeat(MAX_SUBJECT_CHARS)), true).is_ok());
    }

    #[test]
    fn normalize_keeps_first_line_only() {
        assert_eq!(
            normalize_candidate("  Captain Bark\nAnimal: Cat").as_deref(),
            Some("Captain Bark")
        );
        assert_eq!(
            normalize_candidate("\r\n Wonder Canine \r\nmore").as_deref(),
            Some("Wonder Canine")
        );
        assert_eq!(normalize_candidate(" \n\t "), None);
    }

    #[test]
    fn normalize_does_not_split_on_escaped_newline_text() {
        assert_eq!(
            normalize_candidate(r"Sir Barks\nA Lot").as_deref(),
            Some(r"Sir Barks\nA Lot")
        );
    }

    #[test]
    fn name_set_ignores_duplicates_and_keeps_order() {
        let mut set = NameSet::new();
        assert!(set.insert("b".into()));
        assert!(set.insert("a".into()));
        assert!(!set.insert("b".into()));
        assert_eq!(set.len(), 2);
        assert_eq!(set.into_vec(), vec!["b".to_string(), "a".to_string()]);
    }
}
