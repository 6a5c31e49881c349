//! The metadata oracle
//!
//! Everything the descriptor engine knows about a type comes through this
//! trait. Implementations may sit on top of a compiler's symbol tables, a
//! class-file reader, or the in-memory [`TypeModel`](crate::model::TypeModel).

use crate::error::MetadataError;
use crate::marker::{Marker, ModuleAnnotation};
use crate::ty::{ClassName, MethodElement, TypeId};

/// Read-only view of declared types, their members and annotations
pub trait TypeMetadata: Send + Sync {
    /// Qualified name of a type
    fn class_name(&self, ty: TypeId) -> Result<ClassName, MetadataError>;

    /// Direct superclass, or `None` when the type has none
    fn superclass(&self, ty: TypeId) -> Result<Option<TypeId>, MetadataError>;

    /// Methods declared on the type and every method it inherits
    fn all_methods(&self, ty: TypeId) -> Result<Vec<MethodElement>, MetadataError>;

    /// Methods declared directly on the type
    fn enclosed_methods(&self, ty: TypeId) -> Result<Vec<MethodElement>, MetadataError>;

    /// Whether `marker` is present on `method`
    fn has_marker(&self, method: &MethodElement, marker: Marker) -> Result<bool, MetadataError>;

    /// The module annotation on a type, if it carries one
    fn module_annotation(&self, ty: TypeId) -> Result<Option<ModuleAnnotation>, MetadataError>;

    /// The companion container attached to a type, if any
    fn companion_object(&self, ty: TypeId) -> Result<Option<TypeId>, MetadataError>;

    /// Resolve a canonical name to a type present in the environment
    fn type_by_name(&self, canonical_name: &str) -> Option<TypeId>;
}
