//! Foundation types for the phonebook.
//!
//! Every other phonebook crate depends on `phonebook-types`.
//!
//! # Key Types
//!
//! - [`ContactId`] -- Positive integer identity, unique within a directory
//! - [`Contact`] -- Immutable directory entry (id, name, phone, comment)
//! - [`validate_name`] / [`validate_phone`] -- Field normalization and checks

pub mod contact;
pub mod error;
pub mod validate;

pub use contact::{Contact, ContactId};
pub use error::ValidationError;
pub use validate::{normalize_comment, validate_name, validate_phone};
