//! Declaration extraction
//!
//! Scans a module's own and inherited methods and classifies every marked
//! one. Markers are checked independently: a member carrying two binding
//! markers yields two declarations.

use modwire_types::{Marker, TypeId, TypeMetadata};

use super::descriptor::DescriptorParts;
use crate::declarations::DeclarationFactory;
use crate::error::DescriptorError;

/// Collect the declarations of `module` into `parts`
pub(crate) fn extract_declarations(
    metadata: &dyn TypeMetadata,
    declarations: &dyn DeclarationFactory,
    module: TypeId,
    parts: &mut DescriptorParts,
) -> Result<(), DescriptorError> {
    for method in metadata.all_methods(module)? {
        if metadata.has_marker(&method, Marker::Provides)? {
            parts
                .bindings
                .insert(declarations.provides_method_binding(&method, module)?);
        }
        if metadata.has_marker(&method, Marker::Produces)? {
            parts
                .bindings
                .insert(declarations.produces_method_binding(&method, module)?);
        }
        if metadata.has_marker(&method, Marker::Binds)? {
            parts
                .delegate_declarations
                .insert(declarations.delegate_declaration(&method, module)?);
        }
        if metadata.has_marker(&method, Marker::Multibinds)? {
            parts
                .multibinding_declarations
                .insert(declarations.multibinding_declaration(&method, module)?);
        }
        if metadata.has_marker(&method, Marker::BindsOptionalOf)? {
            parts
                .optional_declarations
                .insert(declarations.optional_declaration(&method, module)?);
        }
    }
    Ok(())
}
