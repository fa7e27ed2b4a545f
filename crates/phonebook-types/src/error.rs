use thiserror::Error;

/// Errors produced when a contact field fails validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error(
        "invalid phone {phone:?}: allowed are digits, spaces, dashes, parentheses and a leading '+'"
    )]
    InvalidPhone { phone: String },
}
