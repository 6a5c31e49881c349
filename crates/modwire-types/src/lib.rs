//! Modwire Type Vocabulary
//!
//! Type identities, method elements, markers and binding declarations shared
//! between the descriptor engine and the metadata oracle that feeds it.

#![warn(missing_docs)]

pub mod declaration;
pub mod error;
pub mod marker;
pub mod metadata;
pub mod model;
pub mod ty;

pub use declaration::{
    BindingDeclaration, ContributionBinding, ContributionKind, DelegateDeclaration, Key,
    MultibindingDeclaration, OptionalBindingDeclaration, SubcomponentDeclaration,
};
pub use error::MetadataError;
pub use marker::{Marker, ModuleAnnotation, ModuleKind};
pub use metadata::TypeMetadata;
pub use model::{ClassBuilder, MethodBuilder, TypeModel, TypeModelBuilder};
pub use ty::{type_descriptor, ClassName, MethodElement, MethodId, TypeId};
