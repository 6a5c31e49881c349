//! Binding declarations contributed by modules
//!
//! Five kinds of declaration can come out of a module: contribution bindings
//! (provision and production methods), delegate declarations, multibinding
//! declarations, optional binding declarations and subcomponent declarations.

use std::fmt;

use crate::ty::{MethodElement, TypeId};

/// Dependency key: a type plus an optional qualifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key {
    /// Source-level type name
    pub type_name: String,
    /// Qualifier, if any
    pub qualifier: Option<String>,
}

impl Key {
    /// Unqualified key for a type
    pub fn of(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            qualifier: None,
        }
    }

    /// Qualified key for a type
    pub fn qualified(type_name: impl Into<String>, qualifier: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            qualifier: Some(qualifier.into()),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.qualifier {
            Some(q) => write!(f, "@{} {}", q, self.type_name),
            None => write!(f, "{}", self.type_name),
        }
    }
}

/// Whether a contribution binding provides or produces its value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContributionKind {
    /// Synchronous provision (`@Provides`)
    Provision,
    /// Asynchronous production (`@Produces`)
    Production,
}

/// A binding backed by a provision or production method
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContributionBinding {
    /// Provision or production
    pub kind: ContributionKind,
    /// Key the binding satisfies
    pub key: Key,
    /// The method that declares the binding
    pub binding_element: MethodElement,
    /// The module (or companion container) that owns the method
    pub contributing_module: TypeId,
}

/// A `@Binds` delegate declaration
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DelegateDeclaration {
    /// Key being bound
    pub key: Key,
    /// Key of the implementation the binding delegates to, when the method
    /// declares exactly one parameter
    pub delegate_key: Option<Key>,
    /// The declaring method
    pub binding_element: MethodElement,
    /// Declaring module
    pub contributing_module: TypeId,
}

/// A `@Multibinds` declaration
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MultibindingDeclaration {
    /// Key of the (possibly empty) multibound collection
    pub key: Key,
    /// The declaring method
    pub binding_element: MethodElement,
    /// Declaring module
    pub contributing_module: TypeId,
}

/// A `@BindsOptionalOf` declaration
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OptionalBindingDeclaration {
    /// Key of the underlying, possibly absent, binding
    pub key: Key,
    /// The declaring method
    pub binding_element: MethodElement,
    /// Declaring module
    pub contributing_module: TypeId,
}

/// A subcomponent listed in a module annotation's `subcomponents`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubcomponentDeclaration {
    /// Key of the subcomponent's creator
    pub key: Key,
    /// The declared subcomponent type
    pub subcomponent: TypeId,
    /// Declaring module
    pub contributing_module: TypeId,
}

/// Any declaration a module contributes
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BindingDeclaration {
    /// Provision or production binding
    Contribution(ContributionBinding),
    /// Delegate declaration
    Delegate(DelegateDeclaration),
    /// Multibinding declaration
    Multibinding(MultibindingDeclaration),
    /// Optional binding declaration
    Optional(OptionalBindingDeclaration),
    /// Subcomponent declaration
    Subcomponent(SubcomponentDeclaration),
}

impl BindingDeclaration {
    /// The key this declaration contributes
    pub fn key(&self) -> &Key {
        match self {
            BindingDeclaration::Contribution(b) => &b.key,
            BindingDeclaration::Delegate(d) => &d.key,
            BindingDeclaration::Multibinding(m) => &m.key,
            BindingDeclaration::Optional(o) => &o.key,
            BindingDeclaration::Subcomponent(s) => &s.key,
        }
    }

    /// The module that contributed this declaration
    pub fn contributing_module(&self) -> TypeId {
        match self {
            BindingDeclaration::Contribution(b) => b.contributing_module,
            BindingDeclaration::Delegate(d) => d.contributing_module,
            BindingDeclaration::Multibinding(m) => m.contributing_module,
            BindingDeclaration::Optional(o) => o.contributing_module,
            BindingDeclaration::Subcomponent(s) => s.contributing_module,
        }
    }

    /// The declaring method, if the declaration came from one
    pub fn binding_element(&self) -> Option<&MethodElement> {
        match self {
            BindingDeclaration::Contribution(b) => Some(&b.binding_element),
            BindingDeclaration::Delegate(d) => Some(&d.binding_element),
            BindingDeclaration::Multibinding(m) => Some(&m.binding_element),
            BindingDeclaration::Optional(o) => Some(&o.binding_element),
            BindingDeclaration::Subcomponent(_) => None,
        }
    }
}
