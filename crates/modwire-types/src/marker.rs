//! Markers (annotations) consulted while classifying module members

use std::fmt;

use crate::ty::TypeId;

/// A marker annotation that may be present on a method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    /// Provision method: `@Provides`
    Provides,
    /// Production method: `@Produces`
    Produces,
    /// Delegate binding: `@Binds`
    Binds,
    /// Multibinding declaration: `@Multibinds`
    Multibinds,
    /// Optional binding declaration: `@BindsOptionalOf`
    BindsOptionalOf,
    /// Companion member mirrored into the owning type as a static: `@JvmStatic`
    JvmStatic,
    /// Any other annotation type, identified by its resolved type
    Custom(TypeId),
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Marker::Provides => write!(f, "@Provides"),
            Marker::Produces => write!(f, "@Produces"),
            Marker::Binds => write!(f, "@Binds"),
            Marker::Multibinds => write!(f, "@Multibinds"),
            Marker::BindsOptionalOf => write!(f, "@BindsOptionalOf"),
            Marker::JvmStatic => write!(f, "@JvmStatic"),
            Marker::Custom(ty) => write!(f, "@{}", ty),
        }
    }
}

/// Which module annotation variant declared a module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleKind {
    /// `@Module`
    Module,
    /// `@ProducerModule`
    ProducerModule,
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleKind::Module => write!(f, "@Module"),
            ModuleKind::ProducerModule => write!(f, "@ProducerModule"),
        }
    }
}

/// The module annotation present on a type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleAnnotation {
    /// Annotation variant
    pub kind: ModuleKind,
    /// Modules listed in `includes`
    pub includes: Vec<TypeId>,
    /// Subcomponents listed in `subcomponents`
    pub subcomponents: Vec<TypeId>,
}

impl ModuleAnnotation {
    /// An annotation of the given kind with no attributes
    pub fn new(kind: ModuleKind) -> Self {
        Self {
            kind,
            includes: Vec::new(),
            subcomponents: Vec::new(),
        }
    }
}
