//! Modwire Engine
//!
//! Builds immutable module descriptors from type metadata and walks the
//! module include graph:
//! - **Extraction**: classify provider, producer, delegate, multibinding and
//!   optional-binding members, including inherited ones
//! - **Companions**: fold companion container bindings into their module,
//!   skipping members mirrored into the owner
//! - **Includes**: merge declared includes across the superclass chain plus
//!   implicitly included generated modules
//! - **Caching**: one descriptor per module type, with reentrant-safe fill
//! - **Closure**: depth-first, cycle-safe traversal of included modules
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use modwire_engine::ModuleDescriptorFactory;
//!
//! let factory = ModuleDescriptorFactory::new(Arc::new(model));
//! let closure = factory.transitive_modules([app_module])?;
//! for descriptor in closure.iter() {
//!     println!("{} bindings", descriptor.bindings().len());
//! }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod config;
pub mod declarations;
pub mod error;
pub mod module;

pub use config::{FactoryConfig, ImplicitInclusionConfig};
pub use declarations::{DeclarationFactory, StandardDeclarationFactory};
pub use error::{ConfigError, DescriptorError};
pub use module::{
    CacheStats, DescriptorCache, DescriptorHandle, ImplicitModuleNaming, InjectorModuleNaming,
    ModuleClosure, ModuleDescriptor, ModuleDescriptorFactory,
};
