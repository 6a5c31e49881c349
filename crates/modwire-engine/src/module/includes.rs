//! Included module collection
//!
//! Walks the superclass chain up to (not including) the root type, merging
//! the `includes` of every module-annotated level, plus modules that a
//! separate code generator emits for methods carrying the implicit inclusion
//! marker.

use indexmap::IndexSet;
use rustc_hash::FxHashSet;
use tracing::debug;

use modwire_types::{ClassName, Marker, MethodElement, TypeId, TypeMetadata};

use crate::config::FactoryConfig;
use crate::error::DescriptorError;

/// Derives the name of the module generated for an implicitly including method
pub trait ImplicitModuleNaming: Send + Sync {
    /// Canonical name of the generated module for `method`, declared on `enclosing`
    fn generated_module_name(&self, enclosing: &ClassName, method: &MethodElement) -> String;
}

/// `pkg.Outer_Inner_MethodName`: the enclosing type's file name, an
/// underscore, and the method name in upper camel case
#[derive(Debug, Clone, Copy, Default)]
pub struct InjectorModuleNaming;

impl ImplicitModuleNaming for InjectorModuleNaming {
    fn generated_module_name(&self, enclosing: &ClassName, method: &MethodElement) -> String {
        let simple = format!("{}_{}", enclosing.file_name(), upper_camel(&method.name));
        if enclosing.package.is_empty() {
            simple
        } else {
            format!("{}.{}", enclosing.package, simple)
        }
    }
}

fn upper_camel(lower_camel: &str) -> String {
    let mut chars = lower_camel.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Collects the included modules of one module type
pub(crate) struct IncludeCollector<'a> {
    metadata: &'a dyn TypeMetadata,
    config: &'a FactoryConfig,
    naming: &'a dyn ImplicitModuleNaming,
}

impl<'a> IncludeCollector<'a> {
    pub(crate) fn new(
        metadata: &'a dyn TypeMetadata,
        config: &'a FactoryConfig,
        naming: &'a dyn ImplicitModuleNaming,
    ) -> Self {
        Self {
            metadata,
            config,
            naming,
        }
    }

    /// Includes of `module` and all of its superclasses, superclasses first
    pub(crate) fn collect(&self, module: TypeId) -> Result<IndexSet<TypeId>, DescriptorError> {
        let marker = self.implicit_marker();
        let mut included = IndexSet::new();

        for level in self.hierarchy(module)?.into_iter().rev() {
            let Some(annotation) = self.metadata.module_annotation(level)? else {
                continue;
            };
            included.extend(annotation.includes);
            if let Some(marker) = marker {
                included.extend(self.implicitly_included(level, marker)?);
            }
        }

        Ok(included)
    }

    /// `module` followed by its superclasses, stopping before the root type
    fn hierarchy(&self, module: TypeId) -> Result<Vec<TypeId>, DescriptorError> {
        let root = self.metadata.type_by_name(&self.config.root_type);
        let mut chain = Vec::new();
        let mut visited = FxHashSet::default();
        let mut current = Some(module);

        while let Some(level) = current {
            if !visited.insert(level) {
                return Err(DescriptorError::CyclicHierarchy(level));
            }
            chain.push(level);
            current = self
                .metadata
                .superclass(level)?
                .filter(|superclass| Some(*superclass) != root);
        }

        Ok(chain)
    }

    /// The implicit inclusion marker, if the feature is enabled and its type is present
    fn implicit_marker(&self) -> Option<TypeId> {
        let settings = &self.config.implicit_inclusion;
        if !settings.enabled {
            return None;
        }
        let marker = self.metadata.type_by_name(&settings.marker);
        if marker.is_none() {
            debug!(marker = %settings.marker, "implicit inclusion marker not present, skipping");
        }
        marker
    }

    fn implicitly_included(
        &self,
        level: TypeId,
        marker: TypeId,
    ) -> Result<Vec<TypeId>, DescriptorError> {
        let mut modules = Vec::new();
        for method in self.metadata.enclosed_methods(level)? {
            if !self.metadata.has_marker(&method, Marker::Custom(marker))? {
                continue;
            }
            let enclosing = self.metadata.class_name(method.enclosing)?;
            let name = self.naming.generated_module_name(&enclosing, &method);
            let module = self
                .metadata
                .type_by_name(&name)
                .ok_or(DescriptorError::TypeNotPresent(name))?;
            modules.push(module);
        }
        Ok(modules)
    }
}
