//! Contact storage for the phonebook.
//!
//! This crate holds the authoritative in-memory [`Directory`] and the
//! line-oriented text format it is persisted to.
//!
//! # Architecture
//!
//! - **Directory** owns every contact, assigns ids, and tracks whether its
//!   contents differ from the last load or save (the dirty flag).
//! - **Storage** backends implement [`ContactStorage`]. [`TxtStorage`] writes
//!   one tab-separated contact per line and replaces the target file
//!   atomically.
//!
//! Neither component knows about the user interface; callers drive them and
//! report results.
//!
//! # Modules
//!
//! - [`error`] -- [`StoreError`] and [`StorageError`]
//! - [`directory`] -- The in-memory [`Directory`]
//! - [`traits`] -- The [`ContactStorage`] trait
//! - [`text`] -- Tab-delimited [`TxtStorage`]

pub mod directory;
pub mod error;
pub mod text;
pub mod traits;

pub use directory::Directory;
pub use error::{StorageError, StoreError, StoreResult};
pub use text::TxtStorage;
pub use traits::ContactStorage;
