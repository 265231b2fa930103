//! The flat, name-indexed structure arena.

use arcstr::ArcStr;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::element::Element;
use crate::error::{LayoutError, LayoutResult};
use crate::flatten::Flattener;

/// A named structure: an ordered list of elements.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Structure {
    /// The structure name.
    pub name: ArcStr,
    /// The structure's elements, in file order.
    pub elements: Vec<Element>,
}

impl Structure {
    /// Creates an empty structure.
    pub fn new(name: impl Into<ArcStr>) -> Self {
        Self {
            name: name.into(),
            elements: Vec::new(),
        }
    }
}

/// A library of structures indexed by name.
///
/// References between structures are held as names, not pointers, and are
/// resolved through this table at flatten time. This keeps the hierarchy a
/// plain arena: a dangling reference surfaces as
/// [`LayoutError::UnknownStructureReference`] rather than an unbuildable
/// object graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Library {
    /// The library name.
    pub name: ArcStr,
    structures: IndexMap<ArcStr, Structure>,
}

impl Library {
    /// Creates an empty library.
    pub fn new(name: impl Into<ArcStr>) -> Self {
        Self {
            name: name.into(),
            structures: IndexMap::new(),
        }
    }

    /// Adds a structure to the library.
    ///
    /// # Errors
    ///
    /// Fails with [`LayoutError::DuplicateStructure`] if a structure with
    /// the same name already exists.
    pub fn insert(&mut self, structure: Structure) -> LayoutResult<()> {
        let name = structure.name.clone();
        if self.structures.contains_key(&name) {
            return Err(LayoutError::DuplicateStructure { name });
        }
        self.structures.insert(name, structure);
        Ok(())
    }

    /// Looks up a structure by name.
    pub fn get(&self, name: &str) -> Option<&Structure> {
        self.structures.get(name)
    }

    /// Iterates over all structures in insertion order.
    pub fn structures(&self) -> impl Iterator<Item = &Structure> {
        self.structures.values()
    }

    /// The number of structures in the library.
    pub fn len(&self) -> usize {
        self.structures.len()
    }

    /// Returns `true` if the library contains no structures.
    pub fn is_empty(&self) -> bool {
        self.structures.is_empty()
    }

    /// Creates a [`Flattener`] over the named structure.
    ///
    /// The returned iterator walks the hierarchy depth-first and yields each
    /// leaf shape with its accumulated transform applied. Each call re-walks
    /// the hierarchy from the start.
    ///
    /// # Errors
    ///
    /// Fails with [`LayoutError::UnknownStructureReference`] if `top` is not
    /// in the library. Errors on inner references are reported lazily, as
    /// the iterator reaches them.
    pub fn flatten(&self, top: &str) -> LayoutResult<Flattener<'_>> {
        Flattener::new(self, top)
    }

    /// Like [`Library::flatten`], but skips references to the named
    /// structures entirely (including everything beneath them).
    pub fn flatten_ignoring(
        &self,
        top: &str,
        ignored: Vec<ArcStr>,
    ) -> LayoutResult<Flattener<'_>> {
        Flattener::with_ignored(self, top, ignored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_structures_are_rejected() {
        let mut lib = Library::new("test");
        lib.insert(Structure::new("cell")).unwrap();
        assert!(matches!(
            lib.insert(Structure::new("cell")),
            Err(LayoutError::DuplicateStructure { .. })
        ));
    }

    #[test]
    fn lookup_is_by_name() {
        let mut lib = Library::new("test");
        lib.insert(Structure::new("a")).unwrap();
        lib.insert(Structure::new("b")).unwrap();
        assert!(lib.get("a").is_some());
        assert!(lib.get("missing").is_none());
        assert_eq!(lib.len(), 2);
    }
}
