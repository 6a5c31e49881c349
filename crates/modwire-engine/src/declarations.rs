//! Declaration factories
//!
//! The engine calls a [`DeclarationFactory`] exactly once per matched member
//! and never looks inside the values it returns beyond their keys.

use modwire_types::{
    ContributionBinding, ContributionKind, DelegateDeclaration, Key, MethodElement,
    ModuleAnnotation, MultibindingDeclaration, OptionalBindingDeclaration,
    SubcomponentDeclaration, TypeId, TypeMetadata,
};

use crate::error::DescriptorError;

/// Turns marked members into binding and declaration values
pub trait DeclarationFactory: Send + Sync {
    /// Binding for a `@Provides` method owned by `module`
    fn provides_method_binding(
        &self,
        method: &MethodElement,
        module: TypeId,
    ) -> Result<ContributionBinding, DescriptorError>;

    /// Binding for a `@Produces` method owned by `module`
    fn produces_method_binding(
        &self,
        method: &MethodElement,
        module: TypeId,
    ) -> Result<ContributionBinding, DescriptorError>;

    /// Declaration for a `@Binds` method
    fn delegate_declaration(
        &self,
        method: &MethodElement,
        module: TypeId,
    ) -> Result<DelegateDeclaration, DescriptorError>;

    /// Declaration for a `@Multibinds` method
    fn multibinding_declaration(
        &self,
        method: &MethodElement,
        module: TypeId,
    ) -> Result<MultibindingDeclaration, DescriptorError>;

    /// Declaration for a `@BindsOptionalOf` method
    fn optional_declaration(
        &self,
        method: &MethodElement,
        module: TypeId,
    ) -> Result<OptionalBindingDeclaration, DescriptorError>;

    /// Declarations for every entry in the annotation's `subcomponents`
    fn subcomponent_declarations(
        &self,
        metadata: &dyn TypeMetadata,
        module: TypeId,
        annotation: &ModuleAnnotation,
    ) -> Result<Vec<SubcomponentDeclaration>, DescriptorError>;
}

/// Keys every declaration on its method's return type and qualifier
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardDeclarationFactory;

impl StandardDeclarationFactory {
    fn key(method: &MethodElement) -> Key {
        Key {
            type_name: method.return_type.clone(),
            qualifier: method.qualifier.clone(),
        }
    }

    fn contribution(
        kind: ContributionKind,
        method: &MethodElement,
        module: TypeId,
    ) -> ContributionBinding {
        ContributionBinding {
            kind,
            key: Self::key(method),
            binding_element: method.clone(),
            contributing_module: module,
        }
    }
}

impl DeclarationFactory for StandardDeclarationFactory {
    fn provides_method_binding(
        &self,
        method: &MethodElement,
        module: TypeId,
    ) -> Result<ContributionBinding, DescriptorError> {
        Ok(Self::contribution(ContributionKind::Provision, method, module))
    }

    fn produces_method_binding(
        &self,
        method: &MethodElement,
        module: TypeId,
    ) -> Result<ContributionBinding, DescriptorError> {
        Ok(Self::contribution(ContributionKind::Production, method, module))
    }

    fn delegate_declaration(
        &self,
        method: &MethodElement,
        module: TypeId,
    ) -> Result<DelegateDeclaration, DescriptorError> {
        let delegate_key = match method.parameters.as_slice() {
            [delegate] => Some(Key::of(delegate.clone())),
            _ => None,
        };
        Ok(DelegateDeclaration {
            key: Self::key(method),
            delegate_key,
            binding_element: method.clone(),
            contributing_module: module,
        })
    }

    fn multibinding_declaration(
        &self,
        method: &MethodElement,
        module: TypeId,
    ) -> Result<MultibindingDeclaration, DescriptorError> {
        Ok(MultibindingDeclaration {
            key: Self::key(method),
            binding_element: method.clone(),
            contributing_module: module,
        })
    }

    fn optional_declaration(
        &self,
        method: &MethodElement,
        module: TypeId,
    ) -> Result<OptionalBindingDeclaration, DescriptorError> {
        Ok(OptionalBindingDeclaration {
            key: Self::key(method),
            binding_element: method.clone(),
            contributing_module: module,
        })
    }

    fn subcomponent_declarations(
        &self,
        metadata: &dyn TypeMetadata,
        module: TypeId,
        annotation: &ModuleAnnotation,
    ) -> Result<Vec<SubcomponentDeclaration>, DescriptorError> {
        annotation
            .subcomponents
            .iter()
            .map(|&subcomponent| {
                let name = metadata.class_name(subcomponent)?;
                Ok(SubcomponentDeclaration {
                    key: Key::of(name.canonical_name()),
                    subcomponent,
                    contributing_module: module,
                })
            })
            .collect()
    }
}
