use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identity of a contact within one directory.
///
/// Ids are positive and assigned by the directory in increasing order. They
/// are never reused while the directory is alive, even after a delete.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContactId(u64);

impl ContactId {
    /// The id handed out by an empty directory.
    pub const FIRST: ContactId = ContactId(1);

    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    /// The id following this one, or `None` once the id space is used up.
    pub const fn next(self) -> Option<Self> {
        match self.0.checked_add(1) {
            Some(raw) => Some(Self(raw)),
            None => None,
        }
    }
}

impl fmt::Debug for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContactId({})", self.0)
    }
}

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ContactId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

/// A single directory entry.
///
/// Contacts are plain values: the directory hands out clones and replaces
/// whole entries on update, so a caller holding a `Contact` never observes
/// later mutations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: ContactId,
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub comment: String,
}

impl Contact {
    /// Build a contact from already-normalized fields. No validation is done.
    pub fn new(
        id: ContactId,
        name: impl Into<String>,
        phone: impl Into<String>,
        comment: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            phone: phone.into(),
            comment: comment.into(),
        }
    }

    /// Listing order key: case-insensitive name, then id.
    pub fn sort_key(&self) -> (String, ContactId) {
        (self.name.to_lowercase(), self.id)
    }

    /// True if the lowercase `needle` occurs in any field.
    ///
    /// `needle` must already be lowercase.
    pub fn mentions(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self.phone.to_lowercase().contains(needle)
            || self.comment.to_lowercase().contains(needle)
    }
}

impl fmt::Display for Contact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} | {} | {}", self.id, self.name, self.phone, self.comment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_advance_by_one() {
        assert_eq!(ContactId::FIRST.get(), 1);
        assert_eq!(ContactId::FIRST.next(), Some(ContactId::new(2)));
    }

    #[test]
    fn last_id_has_no_successor() {
        assert_eq!(ContactId::new(u64::MAX - 1).next(), Some(ContactId::new(u64::MAX)));
        assert_eq!(ContactId::new(u64::MAX).next(), None);
    }

    #[test]
    fn id_parses_from_decimal() {
        assert_eq!("42".parse::<ContactId>().unwrap(), ContactId::new(42));
        assert!("abc".parse::<ContactId>().is_err());
        assert!("-1".parse::<ContactId>().is_err());
    }

    #[test]
    fn display_uses_listing_format() {
        let c = Contact::new(ContactId::new(3), "Иван", "+7 (999) 123-45-67", "Коллега");
        assert_eq!(c.to_string(), "[3] Иван | +7 (999) 123-45-67 | Коллега");
    }

    #[test]
    fn sort_key_ignores_case() {
        let a = Contact::new(ContactId::new(2), "alice", "123456", "");
        let b = Contact::new(ContactId::new(1), "Bob", "123456", "");
        assert!(a.sort_key() < b.sort_key());
    }

    #[test]
    fn mentions_checks_every_field() {
        let c = Contact::new(ContactId::new(1), "Мария", "+7 999 333-33-33", "Иван");
        assert!(c.mentions("иван"));
        assert!(c.mentions("мар"));
        assert!(c.mentions("333-33"));
        assert!(!c.mentions("пётр"));
    }

    #[test]
    fn serde_roundtrip() {
        let c = Contact::new(ContactId::new(7), "Alex", "+1 (415) 555-0133", "work");
        let json = serde_json::to_string(&c).unwrap();
        assert!(json.contains("\"id\":7"));
        let parsed: Contact = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, c);
    }
}
