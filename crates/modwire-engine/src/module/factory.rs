//! Module descriptor factory
//!
//! Orchestrates extraction, companion merging and include collection into one
//! cached descriptor per module type.

use std::sync::Arc;

use tracing::{debug, trace};

use modwire_types::{TypeId, TypeMetadata};

use super::cache::{CacheStats, DescriptorCache, DescriptorHandle, Lookup};
use super::companion::merge_companion_bindings;
use super::descriptor::{DescriptorParts, ModuleDescriptor};
use super::extract::extract_declarations;
use super::includes::{ImplicitModuleNaming, IncludeCollector, InjectorModuleNaming};
use crate::config::FactoryConfig;
use crate::declarations::{DeclarationFactory, StandardDeclarationFactory};
use crate::error::DescriptorError;

/// Creates and caches [`ModuleDescriptor`]s
pub struct ModuleDescriptorFactory {
    metadata: Arc<dyn TypeMetadata>,
    declarations: Arc<dyn DeclarationFactory>,
    naming: Arc<dyn ImplicitModuleNaming>,
    config: FactoryConfig,
    cache: DescriptorCache,
}

impl ModuleDescriptorFactory {
    /// Create a factory with the default configuration
    pub fn new(metadata: Arc<dyn TypeMetadata>) -> Self {
        Self::with_config(metadata, FactoryConfig::default())
    }

    /// Create a factory with an explicit configuration
    pub fn with_config(metadata: Arc<dyn TypeMetadata>, config: FactoryConfig) -> Self {
        Self {
            metadata,
            declarations: Arc::new(StandardDeclarationFactory),
            naming: Arc::new(InjectorModuleNaming),
            config,
            cache: DescriptorCache::new(),
        }
    }

    /// Replace the declaration factory
    pub fn with_declarations(mut self, declarations: Arc<dyn DeclarationFactory>) -> Self {
        self.declarations = declarations;
        self
    }

    /// Replace the naming policy for implicitly included modules
    pub fn with_naming(mut self, naming: Arc<dyn ImplicitModuleNaming>) -> Self {
        self.naming = naming;
        self
    }

    /// The active configuration
    pub fn config(&self) -> &FactoryConfig {
        &self.config
    }

    /// The metadata oracle this factory reads from
    pub fn metadata(&self) -> &dyn TypeMetadata {
        self.metadata.as_ref()
    }

    /// Get the descriptor for `module`, building and caching it on first request
    ///
    /// A build already running on another thread is waited for. Fails with
    /// [`DescriptorError::BuildInProgress`] when called while the same
    /// descriptor is being built further up this thread's stack, or when
    /// waiting would deadlock against another building thread; use
    /// [`request`](Self::request) where that can happen.
    pub fn create(&self, module: TypeId) -> Result<Arc<ModuleDescriptor>, DescriptorError> {
        self.request(module)?.wait()
    }

    /// Get a handle to the descriptor for `module`
    ///
    /// A request for a descriptor that is already being built returns a
    /// pending handle to that build rather than starting another one. The
    /// handle resolves to the same descriptor once the build completes.
    pub fn request(&self, module: TypeId) -> Result<DescriptorHandle, DescriptorError> {
        match self.cache.begin(module) {
            Lookup::Ready(handle) => {
                trace!(module = %module, "descriptor cache hit");
                Ok(handle)
            }
            Lookup::InFlight(handle) => {
                trace!(module = %module, "descriptor already being built");
                Ok(handle)
            }
            // Dropping `build` on unwind releases the slot
            Lookup::Vacant(build) => match self.create_uncached(module) {
                Ok(descriptor) => Ok(build.complete(descriptor)),
                Err(err) => {
                    debug!(module = %module, error = %err, "descriptor build failed");
                    build.abandon(err.clone());
                    Err(err)
                }
            },
        }
    }

    /// Build the descriptor for `module` without consulting the cache
    pub fn create_uncached(&self, module: TypeId) -> Result<ModuleDescriptor, DescriptorError> {
        let metadata = self.metadata.as_ref();

        let Some(annotation) = metadata.module_annotation(module)? else {
            let name = metadata
                .class_name(module)
                .map(|name| name.canonical_name())
                .unwrap_or_else(|_| module.to_string());
            return Err(DescriptorError::NotAModule { ty: module, name });
        };

        let mut parts = DescriptorParts::default();
        extract_declarations(metadata, self.declarations.as_ref(), module, &mut parts)?;

        if let Some(companion) = metadata.companion_object(module)? {
            merge_companion_bindings(metadata, self.declarations.as_ref(), companion, &mut parts)?;
        }

        parts.included_modules =
            IncludeCollector::new(metadata, &self.config, self.naming.as_ref()).collect(module)?;
        parts.subcomponent_declarations = self
            .declarations
            .subcomponent_declarations(metadata, module, &annotation)?
            .into_iter()
            .collect();

        let descriptor = ModuleDescriptor::new(module, annotation.kind, parts);
        debug!(
            module = %module,
            kind = %descriptor.kind(),
            bindings = descriptor.bindings().len(),
            includes = descriptor.included_modules().len(),
            "built module descriptor"
        );
        Ok(descriptor)
    }

    /// Drop every cached descriptor
    ///
    /// Call between independent processing rounds. Descriptors already handed
    /// out stay valid.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// The descriptor cache, for inspection
    pub fn cache(&self) -> &DescriptorCache {
        &self.cache
    }

    /// Get cache statistics
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}
