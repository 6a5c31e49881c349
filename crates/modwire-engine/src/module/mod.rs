//! Module descriptors and their include closure
//!
//! This module provides:
//! - Declaration extraction from own and inherited members
//! - Companion container merging
//! - Included module collection across the superclass chain
//! - Reentrant descriptor caching
//! - Cycle-safe transitive closure over includes

mod cache;
mod closure;
mod companion;
mod descriptor;
mod extract;
mod factory;
mod includes;

pub use cache::{CacheStats, DescriptorCache, DescriptorHandle};
pub use closure::ModuleClosure;
pub use descriptor::ModuleDescriptor;
pub use factory::ModuleDescriptorFactory;
pub use includes::{ImplicitModuleNaming, InjectorModuleNaming};
