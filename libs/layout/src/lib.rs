//! Hierarchical GDSII layout model and flattening.
//!
//! A [`Library`](library::Library) is a flat, name-indexed arena of
//! structures; structure references are resolved by name at flatten time, so
//! dangling and circular references are detected instead of materialized.
//! The [`Flattener`](flatten::Flattener) walks a structure depth-first and
//! yields transform-applied polygons one at a time.

pub mod element;
pub mod error;
pub mod flatten;
pub mod import;
pub mod library;

pub use element::{ArrayRef, Boundary, Element, Path, PathStyle, StructRef};
pub use error::{LayoutError, LayoutResult};
pub use flatten::{path_polygon, Flattener, Shape};
pub use library::{Library, Structure};
