//! Transitive module closure
//!
//! Follows `included_modules` edges from a set of root modules. Include
//! graphs may contain cycles; each module is visited once, in depth-first
//! pre-order.

use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use tracing::debug;

use modwire_types::TypeId;

use super::descriptor::ModuleDescriptor;
use super::factory::ModuleDescriptorFactory;
use crate::error::DescriptorError;

/// Every module reachable from a set of roots, roots included
#[derive(Debug, Default)]
pub struct ModuleClosure {
    modules: IndexMap<TypeId, Arc<ModuleDescriptor>>,
}

impl ModuleClosure {
    /// Number of modules in the closure
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Check if the closure is empty
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Check if a module is part of the closure
    pub fn contains(&self, module: TypeId) -> bool {
        self.modules.contains_key(&module)
    }

    /// Get the descriptor of a module in the closure
    pub fn get(&self, module: TypeId) -> Option<&Arc<ModuleDescriptor>> {
        self.modules.get(&module)
    }

    /// Descriptors in visit order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<ModuleDescriptor>> {
        self.modules.values()
    }

    /// Module types in visit order
    pub fn module_types(&self) -> impl Iterator<Item = TypeId> + '_ {
        self.modules.keys().copied()
    }

    /// Find one include cycle, if the closure contains any
    ///
    /// The returned path starts and ends with the same module. Cycles are
    /// legal; this is for diagnostics.
    pub fn include_cycle(&self) -> Option<Vec<TypeId>> {
        let mut visited = FxHashSet::default();

        for &start in self.modules.keys() {
            if !visited.insert(start) {
                continue;
            }
            // Current DFS path; each frame holds the index of its next include
            let mut path: Vec<(TypeId, usize)> = vec![(start, 0)];
            let mut on_path = FxHashSet::default();
            on_path.insert(start);

            while let Some(frame) = path.last_mut() {
                let node = frame.0;
                let next = self
                    .modules
                    .get(&node)
                    .and_then(|descriptor| descriptor.included_modules().get_index(frame.1))
                    .copied();
                frame.1 += 1;

                match next {
                    None => {
                        path.pop();
                        on_path.remove(&node);
                    }
                    Some(next) if on_path.contains(&next) => {
                        let from = path.iter().position(|&(module, _)| module == next)?;
                        let mut cycle: Vec<TypeId> =
                            path[from..].iter().map(|&(module, _)| module).collect();
                        cycle.push(next);
                        debug!(at = %next, length = cycle.len() - 1, "found include cycle");
                        return Some(cycle);
                    }
                    Some(next) => {
                        if visited.insert(next) {
                            on_path.insert(next);
                            path.push((next, 0));
                        }
                    }
                }
            }
        }
        None
    }
}

impl<'a> IntoIterator for &'a ModuleClosure {
    type Item = &'a Arc<ModuleDescriptor>;
    type IntoIter = indexmap::map::Values<'a, TypeId, Arc<ModuleDescriptor>>;

    fn into_iter(self) -> Self::IntoIter {
        self.modules.values()
    }
}

impl ModuleDescriptorFactory {
    /// Returns all the modules transitively included by `roots`, including the roots
    pub fn transitive_modules<I>(&self, roots: I) -> Result<ModuleClosure, DescriptorError>
    where
        I: IntoIterator<Item = TypeId>,
    {
        let roots: Vec<TypeId> = roots.into_iter().collect();
        for &root in &roots {
            self.create(root)?;
        }

        let mut closure = ModuleClosure::default();
        for root in roots {
            let mut stack = vec![root];
            while let Some(module) = stack.pop() {
                if closure.contains(module) {
                    continue;
                }
                let descriptor = self.create(module)?;
                stack.extend(
                    descriptor
                        .included_modules()
                        .iter()
                        .rev()
                        .filter(|included| !closure.contains(**included)),
                );
                closure.modules.insert(module, descriptor);
            }
        }

        debug!(modules = closure.len(), "collected transitive modules");
        Ok(closure)
    }
}
