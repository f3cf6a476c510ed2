//! Attribute error types

use crate::attribute::Access;
use observable_core::ObservableError;
use thiserror::Error;

/// Errors raised while building or accessing an observable attribute
#[derive(Error, Debug)]
pub enum PropertyError {
    /// A handler failed during one of the attribute's events
    #[error(transparent)]
    Registry(#[from] ObservableError),

    /// The named registry attribute does not exist on the object
    #[error("attribute '{attribute}' cannot resolve registry '{registry}'")]
    RegistryUnresolved { attribute: String, registry: String },

    /// No accessor was supplied for this kind of access
    #[error("attribute '{attribute}' does not support {access}")]
    Unsupported { attribute: String, access: Access },

    /// No explicit name and no named accessor to take one from
    #[error("attribute needs an event name: pass one explicitly or use named fn items")]
    MissingName,

    /// Accessors were given different fn items with different names
    #[error("accessor names disagree: '{first}' vs '{second}'")]
    NameMismatch { first: String, second: String },

    /// Neither a registry nor a registry attribute name was supplied
    #[error("attribute '{attribute}' has no registry")]
    MissingRegistry { attribute: String },
}

/// Result type for attribute operations
pub type Result<T> = std::result::Result<T, PropertyError>;
