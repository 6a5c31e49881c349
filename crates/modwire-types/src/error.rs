//! Metadata oracle errors

use thiserror::Error;

use crate::ty::{MethodId, TypeId};

/// Errors a metadata oracle may report while answering a query
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MetadataError {
    /// The oracle has no record of the type
    #[error("Unknown type: {0}")]
    UnknownType(TypeId),

    /// The oracle has no record of the method
    #[error("Unknown method: {0}")]
    UnknownMethod(MethodId),

    /// A member could not be classified
    #[error("Cannot classify member {member}: {reason}")]
    Unclassifiable {
        /// Member name
        member: String,
        /// Why classification failed
        reason: String,
    },
}
