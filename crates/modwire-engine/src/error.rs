//! Engine errors

use modwire_types::{ClassName, MetadataError, MethodElement, TypeId};
use thiserror::Error;

/// Errors that can occur while building a module descriptor
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DescriptorError {
    /// The type carries no module annotation; only module types may be described
    #[error("{name} is not a module: no module annotation present")]
    NotAModule {
        /// The offending type
        ty: TypeId,
        /// Its canonical name, as far as it could be resolved
        name: String,
    },

    /// The metadata oracle failed to answer a query
    #[error("Metadata query failed: {0}")]
    Metadata(#[from] MetadataError),

    /// A marked member cannot be turned into a declaration
    #[error("Malformed member {member}: {reason}")]
    MalformedMember {
        /// Member name, qualified by its enclosing type
        member: String,
        /// What is wrong with it
        reason: String,
    },

    /// A generated module type that should exist is not present
    #[error("Type not present: {0}")]
    TypeNotPresent(String),

    /// The superclass chain loops back on itself
    #[error("Cyclic superclass chain at {0}")]
    CyclicHierarchy(TypeId),

    /// The descriptor is being built further up the current call stack, or
    /// waiting for it would deadlock against another building thread
    #[error("Descriptor for {0} is still being built")]
    BuildInProgress(TypeId),

    /// The build unwound before producing a descriptor or an error
    #[error("Descriptor build for {0} was aborted")]
    BuildAborted(TypeId),
}

impl DescriptorError {
    /// A [`MalformedMember`](Self::MalformedMember) error naming `method` as
    /// `Enclosing.method`
    pub fn malformed_member(
        enclosing: &ClassName,
        method: &MethodElement,
        reason: impl Into<String>,
    ) -> Self {
        DescriptorError::MalformedMember {
            member: format!("{}.{}", enclosing.canonical_name(), method.name),
            reason: reason.into(),
        }
    }
}

/// Errors that can occur while loading factory configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Validation error
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}
