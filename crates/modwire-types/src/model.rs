//! In-memory type model
//!
//! A self-contained [`TypeMetadata`] implementation. Types are declared by
//! name first so that superclass, include and companion references may point
//! at each other in any order, including cyclically.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::MetadataError;
use crate::marker::{Marker, ModuleAnnotation, ModuleKind};
use crate::metadata::TypeMetadata;
use crate::ty::{ClassName, MethodElement, MethodId, TypeId};

#[derive(Debug, Clone)]
struct ClassEntry {
    name: ClassName,
    superclass: Option<TypeId>,
    methods: Vec<MethodId>,
    module: Option<ModuleAnnotation>,
    companion: Option<TypeId>,
}

#[derive(Debug, Clone)]
struct MethodEntry {
    element: MethodElement,
    markers: FxHashSet<Marker>,
}

/// Immutable in-memory metadata for a set of declared types
#[derive(Debug, Clone, Default)]
pub struct TypeModel {
    classes: Vec<ClassEntry>,
    methods: Vec<MethodEntry>,
    by_name: FxHashMap<String, TypeId>,
}

impl TypeModel {
    /// Start building a model
    pub fn builder() -> TypeModelBuilder {
        TypeModelBuilder::default()
    }

    /// Number of declared types
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Check if the model declares no types
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    fn class(&self, ty: TypeId) -> Result<&ClassEntry, MetadataError> {
        self.classes
            .get(ty.0 as usize)
            .ok_or(MetadataError::UnknownType(ty))
    }

    fn method(&self, id: MethodId) -> Result<&MethodEntry, MetadataError> {
        self.methods
            .get(id.0 as usize)
            .ok_or(MetadataError::UnknownMethod(id))
    }
}

impl TypeMetadata for TypeModel {
    fn class_name(&self, ty: TypeId) -> Result<ClassName, MetadataError> {
        Ok(self.class(ty)?.name.clone())
    }

    fn superclass(&self, ty: TypeId) -> Result<Option<TypeId>, MetadataError> {
        Ok(self.class(ty)?.superclass)
    }

    fn all_methods(&self, ty: TypeId) -> Result<Vec<MethodElement>, MetadataError> {
        let mut result = Vec::new();
        let mut seen_descriptors = FxHashSet::default();
        let mut visited = FxHashSet::default();
        let mut current = Some(ty);

        // Subclass methods come first so they hide the overridden ones
        while let Some(level) = current {
            if !visited.insert(level) {
                break;
            }
            let entry = self.class(level)?;
            for id in &entry.methods {
                let element = &self.method(*id)?.element;
                if seen_descriptors.insert(element.descriptor()) {
                    result.push(element.clone());
                }
            }
            current = entry.superclass;
        }

        Ok(result)
    }

    fn enclosed_methods(&self, ty: TypeId) -> Result<Vec<MethodElement>, MetadataError> {
        self.class(ty)?
            .methods
            .iter()
            .map(|id| self.method(*id).map(|m| m.element.clone()))
            .collect()
    }

    fn has_marker(&self, method: &MethodElement, marker: Marker) -> Result<bool, MetadataError> {
        Ok(self.method(method.id)?.markers.contains(&marker))
    }

    fn module_annotation(&self, ty: TypeId) -> Result<Option<ModuleAnnotation>, MetadataError> {
        Ok(self.class(ty)?.module.clone())
    }

    fn companion_object(&self, ty: TypeId) -> Result<Option<TypeId>, MetadataError> {
        Ok(self.class(ty)?.companion)
    }

    fn type_by_name(&self, canonical_name: &str) -> Option<TypeId> {
        self.by_name.get(canonical_name).copied()
    }
}

/// Builder for [`TypeModel`]
#[derive(Debug, Default)]
pub struct TypeModelBuilder {
    model: TypeModel,
}

impl TypeModelBuilder {
    /// Declare a type by canonical name, returning its identity
    ///
    /// Declaring the same name twice returns the existing identity.
    pub fn declare(&mut self, canonical_name: &str) -> TypeId {
        if let Some(&ty) = self.model.by_name.get(canonical_name) {
            return ty;
        }
        let ty = TypeId(self.model.classes.len() as u32);
        self.model.classes.push(ClassEntry {
            name: ClassName::parse(canonical_name),
            superclass: None,
            methods: Vec::new(),
            module: None,
            companion: None,
        });
        self.model.by_name.insert(canonical_name.to_string(), ty);
        ty
    }

    /// Edit a previously declared type
    ///
    /// # Panics
    /// Panics if `ty` was not produced by this builder.
    pub fn class(&mut self, ty: TypeId) -> ClassBuilder<'_> {
        assert!(
            (ty.0 as usize) < self.model.classes.len(),
            "{} was not declared by this builder",
            ty
        );
        ClassBuilder { builder: self, ty }
    }

    /// Finish building
    pub fn build(self) -> TypeModel {
        self.model
    }
}

/// Edits one declared type
pub struct ClassBuilder<'a> {
    builder: &'a mut TypeModelBuilder,
    ty: TypeId,
}

impl ClassBuilder<'_> {
    fn entry(&mut self) -> &mut ClassEntry {
        &mut self.builder.model.classes[self.ty.0 as usize]
    }

    fn annotation(&mut self) -> &mut ModuleAnnotation {
        self.entry()
            .module
            .get_or_insert_with(|| ModuleAnnotation::new(ModuleKind::Module))
    }

    /// Set the direct superclass
    pub fn extends(&mut self, superclass: TypeId) -> &mut Self {
        self.entry().superclass = Some(superclass);
        self
    }

    /// Annotate the type as a module of the given kind
    pub fn module(&mut self, kind: ModuleKind) -> &mut Self {
        self.annotation().kind = kind;
        self
    }

    /// Add an entry to the module annotation's `includes`
    ///
    /// Annotates the type with `@Module` if it carries no module annotation yet.
    pub fn include(&mut self, module: TypeId) -> &mut Self {
        self.annotation().includes.push(module);
        self
    }

    /// Add an entry to the module annotation's `subcomponents`
    pub fn subcomponent(&mut self, subcomponent: TypeId) -> &mut Self {
        self.annotation().subcomponents.push(subcomponent);
        self
    }

    /// Attach a companion container
    pub fn companion(&mut self, companion: TypeId) -> &mut Self {
        self.entry().companion = Some(companion);
        self
    }

    /// Declare a method on this type
    pub fn method(&mut self, method: MethodBuilder) -> MethodId {
        let id = MethodId(self.builder.model.methods.len() as u32);
        let element = MethodElement {
            id,
            name: method.name,
            enclosing: self.ty,
            parameters: method.parameters,
            return_type: method.return_type,
            qualifier: method.qualifier,
        };
        self.builder.model.methods.push(MethodEntry {
            element,
            markers: method.markers,
        });
        self.entry().methods.push(id);
        id
    }
}

/// Describes a method to declare with [`ClassBuilder::method`]
#[derive(Debug, Clone)]
pub struct MethodBuilder {
    name: String,
    parameters: Vec<String>,
    return_type: String,
    qualifier: Option<String>,
    markers: FxHashSet<Marker>,
}

impl MethodBuilder {
    /// A method with no parameters returning `void`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            return_type: "void".to_string(),
            qualifier: None,
            markers: FxHashSet::default(),
        }
    }

    /// Set the return type
    pub fn returns(mut self, type_name: impl Into<String>) -> Self {
        self.return_type = type_name.into();
        self
    }

    /// Append a parameter
    pub fn param(mut self, type_name: impl Into<String>) -> Self {
        self.parameters.push(type_name.into());
        self
    }

    /// Set the qualifier
    pub fn qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.qualifier = Some(qualifier.into());
        self
    }

    /// Add a marker
    pub fn marker(mut self, marker: Marker) -> Self {
        self.markers.insert(marker);
        self
    }
}
