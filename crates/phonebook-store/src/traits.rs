//! The [`ContactStorage`] trait defining the persistence interface.

use std::path::Path;

use phonebook_types::Contact;

use crate::error::StorageError;

/// A persistence backend bound to a single location.
///
/// Implementations must never leave the target in a partially written state:
/// after a failed `save` the previous contents are still readable.
pub trait ContactStorage {
    /// Where this backend reads from and writes to.
    fn path(&self) -> &Path;

    /// Read every stored contact, in file order.
    ///
    /// A missing target is an empty directory, not an error.
    fn load(&self) -> Result<Vec<Contact>, StorageError>;

    /// Replace the stored contents with `contacts`, in the order given.
    fn save(&self, contacts: &[Contact]) -> Result<(), StorageError>;
}
