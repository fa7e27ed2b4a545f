//! The in-memory contact directory.
//!
//! [`Directory`] is the authoritative copy of the contacts while the
//! application runs. Each mutation validates its input first, replaces a
//! whole entry, and sets the dirty flag only once it has succeeded.

use std::collections::BTreeMap;

use phonebook_types::{normalize_comment, validate_name, validate_phone, Contact, ContactId};
use tracing::debug;

use crate::error::{StoreError, StoreResult};

/// In-memory store of contacts keyed by id.
///
/// Invariants:
/// - ids are unique (they are the map keys)
/// - `next_id` is greater than every stored id, and is [`ContactId::FIRST`]
///   for an empty directory that was just created or loaded; it is `None`
///   once the largest id has been used
/// - `dirty` is true iff the contents differ from the last load or save
#[derive(Debug)]
pub struct Directory {
    contacts: BTreeMap<ContactId, Contact>,
    next_id: Option<ContactId>,
    dirty: bool,
}

impl Directory {
    /// Create an empty, clean directory.
    pub fn new() -> Self {
        Self {
            contacts: BTreeMap::new(),
            next_id: Some(ContactId::FIRST),
            dirty: false,
        }
    }

    /// True if there are changes since the last load or save.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Record that the current contents match what was last saved.
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Number of stored contacts.
    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    /// Returns `true` if the directory holds no contacts.
    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    /// The id the next [`add`](Self::add) will assign, if any is left.
    pub fn next_id(&self) -> Option<ContactId> {
        self.next_id
    }

    /// Discard the current contents and take `contacts` as-is.
    ///
    /// The contacts are assumed to be valid already (they normally come
    /// from storage). On duplicate ids the last one wins. The directory is
    /// clean afterwards.
    pub fn replace_all(&mut self, contacts: impl IntoIterator<Item = Contact>) {
        self.contacts = contacts.into_iter().map(|c| (c.id, c)).collect();
        self.next_id = self
            .contacts
            .keys()
            .next_back()
            .map_or(Some(ContactId::FIRST), |max| max.next());
        self.dirty = false;
        debug!(count = self.contacts.len(), next_id = ?self.next_id, "directory replaced");
    }

    /// All contacts ordered by case-insensitive name, then id.
    pub fn list(&self) -> Vec<Contact> {
        sorted(self.contacts.values())
    }

    /// Validate and insert a new contact under the next free id.
    ///
    /// On a validation failure nothing changes and no id is consumed. Once
    /// the largest id is taken every further add fails with
    /// [`StoreError::IdsExhausted`].
    pub fn add(&mut self, name: &str, phone: &str, comment: &str) -> StoreResult<Contact> {
        let name = validate_name(name)?;
        let phone = validate_phone(phone)?;
        let id = self.next_id.ok_or(StoreError::IdsExhausted)?;
        let contact = Contact::new(id, name, phone, normalize_comment(comment));

        self.contacts.insert(id, contact.clone());
        self.next_id = id.next();
        self.dirty = true;
        debug!(id = %contact.id, "contact added");
        Ok(contact)
    }

    /// Look up a contact by id.
    pub fn get(&self, id: ContactId) -> StoreResult<Contact> {
        self.contacts
            .get(&id)
            .cloned()
            .ok_or(StoreError::ContactNotFound { id })
    }

    /// Replace the fields that are `Some`, keeping the rest.
    ///
    /// A new name or phone is validated; a new comment is only trimmed and
    /// may be empty.
    pub fn update(
        &mut self,
        id: ContactId,
        name: Option<&str>,
        phone: Option<&str>,
        comment: Option<&str>,
    ) -> StoreResult<Contact> {
        let existing = self
            .contacts
            .get(&id)
            .ok_or(StoreError::ContactNotFound { id })?;

        let name = match name {
            Some(raw) => validate_name(raw)?,
            None => existing.name.clone(),
        };
        let phone = match phone {
            Some(raw) => validate_phone(raw)?,
            None => existing.phone.clone(),
        };
        let comment = match comment {
            Some(raw) => normalize_comment(raw),
            None => existing.comment.clone(),
        };

        let updated = Contact::new(id, name, phone, comment);
        self.contacts.insert(id, updated.clone());
        self.dirty = true;
        debug!(%id, "contact updated");
        Ok(updated)
    }

    /// Remove a contact by id.
    pub fn delete(&mut self, id: ContactId) -> StoreResult<()> {
        if self.contacts.remove(&id).is_none() {
            return Err(StoreError::ContactNotFound { id });
        }
        self.dirty = true;
        debug!(%id, "contact deleted");
        Ok(())
    }

    /// Free-text search across name, phone and comment, case-insensitive.
    ///
    /// A query that is blank after trimming matches nothing. Results use the
    /// [`list`](Self::list) order.
    pub fn search(&self, query: &str) -> Vec<Contact> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        sorted(self.contacts.values().filter(|c| c.mentions(&needle)))
    }

    /// Per-field substring search; every non-blank filter must match.
    ///
    /// Unlike [`search`](Self::search), leaving every filter blank returns
    /// the whole directory.
    pub fn search_by_fields(
        &self,
        name: Option<&str>,
        phone: Option<&str>,
        comment: Option<&str>,
    ) -> Vec<Contact> {
        let name = FieldFilter::new(name);
        let phone = FieldFilter::new(phone);
        let comment = FieldFilter::new(comment);

        sorted(self.contacts.values().filter(|c| {
            name.matches(&c.name) && phone.matches(&c.phone) && comment.matches(&c.comment)
        }))
    }
}

impl Default for Directory {
    fn default() -> Self {
        Self::new()
    }
}

/// A lowercase substring filter; blank input imposes no constraint.
struct FieldFilter(Option<String>);

impl FieldFilter {
    fn new(raw: Option<&str>) -> Self {
        let needle = raw.map(|s| s.trim().to_lowercase()).filter(|s| !s.is_empty());
        Self(needle)
    }

    fn matches(&self, value: &str) -> bool {
        match &self.0 {
            Some(needle) => value.to_lowercase().contains(needle.as_str()),
            None => true,
        }
    }
}

fn sorted<'a>(contacts: impl Iterator<Item = &'a Contact>) -> Vec<Contact> {
    let mut out: Vec<Contact> = contacts.cloned().collect();
    out.sort_by_cached_key(Contact::sort_key);
    out
}
