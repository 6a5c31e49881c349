//! Companion container merging
//!
//! Binding methods declared on a companion container may also be visible on
//! the owning module as mirrored statics. Members marked `@JvmStatic` are
//! skipped outright; anything whose descriptor already matches a collected
//! binding is skipped as well, since some mirroring conventions do not carry
//! the marker. Only contribution bindings are taken from a companion.

use rustc_hash::FxHashSet;
use tracing::trace;

use modwire_types::{Marker, TypeId, TypeMetadata};

use super::descriptor::DescriptorParts;
use crate::declarations::DeclarationFactory;
use crate::error::DescriptorError;

/// Fold the bindings of `companion` into `parts`, owned by the companion
pub(crate) fn merge_companion_bindings(
    metadata: &dyn TypeMetadata,
    declarations: &dyn DeclarationFactory,
    companion: TypeId,
    parts: &mut DescriptorParts,
) -> Result<(), DescriptorError> {
    // TODO: compare qualifiers too; two methods differing only by qualifier collide here
    let existing: FxHashSet<String> = parts
        .bindings
        .iter()
        .map(|binding| binding.binding_element.descriptor())
        .collect();

    for method in metadata.enclosed_methods(companion)? {
        if metadata.has_marker(&method, Marker::JvmStatic)? {
            trace!(method = %method.name, "skipping companion member mirrored into owner");
            continue;
        }
        if existing.contains(&method.descriptor()) {
            trace!(method = %method.name, "skipping companion member with duplicate descriptor");
            continue;
        }
        if metadata.has_marker(&method, Marker::Provides)? {
            parts
                .bindings
                .insert(declarations.provides_method_binding(&method, companion)?);
        }
        if metadata.has_marker(&method, Marker::Produces)? {
            parts
                .bindings
                .insert(declarations.produces_method_binding(&method, companion)?);
        }
    }
    Ok(())
}
