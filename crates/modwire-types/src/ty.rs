//! Core type handles for the modwire vocabulary

use std::fmt;

/// Opaque identity of a declared type, handed out by a metadata oracle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub(crate) u32);

impl TypeId {
    /// Wrap a raw identity issued by an external oracle
    pub fn from_raw(raw: u32) -> Self {
        TypeId(raw)
    }

    /// The raw identity value
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeId({})", self.0)
    }
}

/// Opaque identity of a declared method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodId(pub(crate) u32);

impl MethodId {
    /// Wrap a raw identity issued by an external oracle
    pub fn from_raw(raw: u32) -> Self {
        MethodId(raw)
    }

    /// The raw identity value
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for MethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MethodId({})", self.0)
    }
}

/// Fully qualified class name, split into package and (possibly nested) simple names
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassName {
    /// Dotted package name, empty for the default package
    pub package: String,
    /// Simple names from the outermost enclosing class to this class
    pub simple_names: Vec<String>,
}

impl ClassName {
    /// Create a class name from a package and its simple names
    pub fn new(package: impl Into<String>, simple_names: Vec<String>) -> Self {
        Self {
            package: package.into(),
            simple_names,
        }
    }

    /// Parse a dotted name, treating lowercase leading segments as the package
    ///
    /// `com.example.Outer.Inner` becomes package `com.example` with simple
    /// names `[Outer, Inner]`.
    pub fn parse(qualified: &str) -> Self {
        let mut package = Vec::new();
        let mut simple_names = Vec::new();
        for segment in qualified.split('.') {
            let is_package = simple_names.is_empty()
                && segment.chars().next().is_some_and(|c| c.is_lowercase());
            if is_package {
                package.push(segment);
            } else {
                simple_names.push(segment.to_string());
            }
        }
        Self {
            package: package.join("."),
            simple_names,
        }
    }

    /// The innermost simple name
    pub fn simple_name(&self) -> &str {
        self.simple_names.last().map(String::as_str).unwrap_or_default()
    }

    /// Dotted name as written in source: `pkg.Outer.Inner`
    pub fn canonical_name(&self) -> String {
        let nested = self.simple_names.join(".");
        if self.package.is_empty() {
            nested
        } else {
            format!("{}.{}", self.package, nested)
        }
    }

    /// Nested simple names joined with `_`, as used for generated file names
    pub fn file_name(&self) -> String {
        self.simple_names.join("_")
    }
}

impl fmt::Display for ClassName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical_name())
    }
}

/// A method declared on some type
///
/// Parameter and return types are carried as source-level type names
/// (`int`, `java.lang.String`, `Foo[]`); the structural descriptor is derived
/// from them on demand.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodElement {
    /// Identity of this method
    pub id: MethodId,
    /// Simple method name
    pub name: String,
    /// Type that declares the method
    pub enclosing: TypeId,
    /// Parameter type names in declaration order
    pub parameters: Vec<String>,
    /// Return type name (`void` for none)
    pub return_type: String,
    /// Qualifier annotation on the method, if any
    pub qualifier: Option<String>,
}

impl MethodElement {
    /// Structural signature: `name(<param descriptors>)<return descriptor>`
    ///
    /// The qualifier does not participate, so two methods differing only in
    /// their qualifier share a descriptor.
    pub fn descriptor(&self) -> String {
        let params: String = self.parameters.iter().map(|p| type_descriptor(p)).collect();
        format!("{}({}){}", self.name, params, type_descriptor(&self.return_type))
    }
}

/// Encode a source-level type name in JVM descriptor form
///
/// Generic arguments are erased: `java.util.Set<Foo>` encodes as
/// `Ljava/util/Set;`.
pub fn type_descriptor(type_name: &str) -> String {
    let type_name = type_name.trim();
    if let Some(element) = type_name.strip_suffix("[]") {
        return format!("[{}", type_descriptor(element));
    }
    let erased = match type_name.find('<') {
        Some(idx) => &type_name[..idx],
        None => type_name,
    };
    match erased {
        "boolean" => "Z".to_string(),
        "byte" => "B".to_string(),
        "char" => "C".to_string(),
        "short" => "S".to_string(),
        "int" => "I".to_string(),
        "long" => "J".to_string(),
        "float" => "F".to_string(),
        "double" => "D".to_string(),
        "void" => "V".to_string(),
        other => format!("L{};", other.replace('.', "/")),
    }
}
