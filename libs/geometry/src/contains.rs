//! Containment of one geometric object within another.

use serde::{Deserialize, Serialize};

/// The result of a containment test.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Hash, PartialEq, Eq)]
pub enum Containment {
    /// The object is strictly inside.
    Full,
    /// The object lies on the boundary.
    Boundary,
    /// The object is outside.
    None,
}

impl Containment {
    /// Returns `true` if the object is inside or on the boundary.
    ///
    /// Boundary points count as inside throughout the blockage analysis:
    /// a shape that merely touches a probe line still blocks it.
    #[inline]
    pub fn is_inside(&self) -> bool {
        matches!(self, Containment::Full | Containment::Boundary)
    }

    /// Returns `true` only if the object is strictly inside.
    #[inline]
    pub fn is_full(&self) -> bool {
        matches!(self, Containment::Full)
    }
}

/// Trait for checking containment of another geometric object.
pub trait Contains<T: ?Sized> {
    /// Tests whether `other` is contained within `self`.
    fn contains(&self, other: &T) -> Containment;
}
