//! Module descriptors
//!
//! An immutable summary of everything one module type contributes.

use indexmap::IndexSet;
use once_cell::sync::OnceCell;

use modwire_types::{
    BindingDeclaration, ContributionBinding, DelegateDeclaration, Key, ModuleKind,
    MultibindingDeclaration, OptionalBindingDeclaration, SubcomponentDeclaration, TypeId,
};

/// Metadata describing one module
#[derive(Debug)]
pub struct ModuleDescriptor {
    module_type: TypeId,
    included_modules: IndexSet<TypeId>,
    bindings: IndexSet<ContributionBinding>,
    multibinding_declarations: IndexSet<MultibindingDeclaration>,
    subcomponent_declarations: IndexSet<SubcomponentDeclaration>,
    delegate_declarations: IndexSet<DelegateDeclaration>,
    optional_declarations: IndexSet<OptionalBindingDeclaration>,
    kind: ModuleKind,
    all_binding_declarations: OnceCell<IndexSet<BindingDeclaration>>,
}

/// The collected parts of a descriptor, before it is frozen
#[derive(Debug, Default)]
pub(crate) struct DescriptorParts {
    pub included_modules: IndexSet<TypeId>,
    pub bindings: IndexSet<ContributionBinding>,
    pub multibinding_declarations: IndexSet<MultibindingDeclaration>,
    pub subcomponent_declarations: IndexSet<SubcomponentDeclaration>,
    pub delegate_declarations: IndexSet<DelegateDeclaration>,
    pub optional_declarations: IndexSet<OptionalBindingDeclaration>,
}

impl ModuleDescriptor {
    pub(crate) fn new(module_type: TypeId, kind: ModuleKind, mut parts: DescriptorParts) -> Self {
        parts.included_modules.shift_remove(&module_type);
        Self {
            module_type,
            included_modules: parts.included_modules,
            bindings: parts.bindings,
            multibinding_declarations: parts.multibinding_declarations,
            subcomponent_declarations: parts.subcomponent_declarations,
            delegate_declarations: parts.delegate_declarations,
            optional_declarations: parts.optional_declarations,
            kind,
            all_binding_declarations: OnceCell::new(),
        }
    }

    /// The described module type
    pub fn module_type(&self) -> TypeId {
        self.module_type
    }

    /// Modules this module includes, directly or through its superclasses
    pub fn included_modules(&self) -> &IndexSet<TypeId> {
        &self.included_modules
    }

    /// Provision and production bindings
    pub fn bindings(&self) -> &IndexSet<ContributionBinding> {
        &self.bindings
    }

    /// The multibinding declarations contained in this module
    pub fn multibinding_declarations(&self) -> &IndexSet<MultibindingDeclaration> {
        &self.multibinding_declarations
    }

    /// The subcomponent declarations contained in this module
    pub fn subcomponent_declarations(&self) -> &IndexSet<SubcomponentDeclaration> {
        &self.subcomponent_declarations
    }

    /// The `@Binds` method declarations that define delegate bindings
    pub fn delegate_declarations(&self) -> &IndexSet<DelegateDeclaration> {
        &self.delegate_declarations
    }

    /// The `@BindsOptionalOf` method declarations that define optional bindings
    pub fn optional_declarations(&self) -> &IndexSet<OptionalBindingDeclaration> {
        &self.optional_declarations
    }

    /// The kind of the module
    pub fn kind(&self) -> ModuleKind {
        self.kind
    }

    /// Every declaration in this module, computed once
    pub fn all_binding_declarations(&self) -> &IndexSet<BindingDeclaration> {
        self.all_binding_declarations.get_or_init(|| {
            let bindings = self
                .bindings
                .iter()
                .cloned()
                .map(BindingDeclaration::Contribution);
            let delegates = self
                .delegate_declarations
                .iter()
                .cloned()
                .map(BindingDeclaration::Delegate);
            let multibindings = self
                .multibinding_declarations
                .iter()
                .cloned()
                .map(BindingDeclaration::Multibinding);
            let optionals = self
                .optional_declarations
                .iter()
                .cloned()
                .map(BindingDeclaration::Optional);
            let subcomponents = self
                .subcomponent_declarations
                .iter()
                .cloned()
                .map(BindingDeclaration::Subcomponent);

            bindings
                .chain(delegates)
                .chain(multibindings)
                .chain(optionals)
                .chain(subcomponents)
                .collect()
        })
    }

    /// The keys of all declarations in this module
    pub fn all_binding_keys(&self) -> IndexSet<Key> {
        self.all_binding_declarations()
            .iter()
            .map(|declaration| declaration.key().clone())
            .collect()
    }
}
