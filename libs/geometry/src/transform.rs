//! Transformation types and traits.
//!
//! Transformations are restricted to the Manhattan subset that hierarchical
//! layout references use: an optional reflection about the x-axis, followed
//! by a counter-clockwise rotation by a multiple of 90 degrees, followed by
//! a translation. Magnification is not supported.

use serde::{Deserialize, Serialize};

use crate::point::Point;

/// A Manhattan rotation: 0, 90, 180, or 270 degrees counterclockwise.
#[derive(Debug, Clone, Copy, Default, Eq, Ord, PartialOrd, PartialEq, Serialize, Deserialize)]
pub enum Rotation {
    /// 0 degrees; no rotation.
    #[default]
    R0,
    /// 90 degrees counterclockwise.
    R90,
    /// 180 degrees counterclockwise.
    R180,
    /// 270 degrees counterclockwise.
    R270,
}

impl Rotation {
    /// Converts an angle in degrees to a [`Rotation`].
    ///
    /// Angles are wrapped to `[0, 360)`. Returns [`None`] for angles that are
    /// not a multiple of 90 degrees; callers decide how to report the
    /// unsupported transform.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// assert_eq!(Rotation::try_from_degrees(270.), Some(Rotation::R270));
    /// assert_eq!(Rotation::try_from_degrees(-90.), Some(Rotation::R270));
    /// assert_eq!(Rotation::try_from_degrees(45.), None);
    /// ```
    pub fn try_from_degrees(angle: f64) -> Option<Self> {
        let angle = (((angle % 360.) + 360.) % 360.).round() as i64;
        match angle {
            0 => Some(Rotation::R0),
            90 => Some(Rotation::R90),
            180 => Some(Rotation::R180),
            270 => Some(Rotation::R270),
            _ => None,
        }
    }

    /// The angle of this rotation, in degrees.
    pub fn degrees(&self) -> f64 {
        match self {
            Rotation::R0 => 0.,
            Rotation::R90 => 90.,
            Rotation::R180 => 180.,
            Rotation::R270 => 270.,
        }
    }
}

/// A matrix representing a unitary Manhattan transformation.
///
/// Can represent rotations, reflections, or combinations of the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformationMatrix([[i8; 2]; 2]);

impl TransformationMatrix {
    /// The identity transformation.
    ///
    /// Maps any point to itself.
    #[inline]
    pub const fn identity() -> Self {
        Self([[1, 0], [0, 1]])
    }

    /// The determinant of the matrix.
    ///
    /// Always `1` (orientation-preserving) or `-1` (reflecting)
    /// for a unitary Manhattan matrix.
    pub fn det(&self) -> i8 {
        self.0[0][0] * self.0[1][1] - self.0[0][1] * self.0[1][0]
    }

    /// The inverse of the transformation matrix.
    pub fn inverse(&self) -> Self {
        // inverse = adjugate / det, and det is +/-1 for unitary matrices.
        let det = self.det();
        let adj = unitary_matinv(&self.0);
        Self([
            [adj[0][0] * det, adj[0][1] * det],
            [adj[1][0] * det, adj[1][1] * det],
        ])
    }
}

impl From<Rotation> for TransformationMatrix {
    fn from(value: Rotation) -> Self {
        Self(match value {
            Rotation::R0 => [[1, 0], [0, 1]],
            Rotation::R90 => [[0, -1], [1, 0]],
            Rotation::R180 => [[-1, 0], [0, -1]],
            Rotation::R270 => [[0, 1], [-1, 0]],
        })
    }
}

/// Multiplies two 2x2 matrices, returning a new 2x2 matrix.
fn matmul_i8(a: &[[i8; 2]; 2], b: &[[i8; 2]; 2]) -> [[i8; 2]; 2] {
    [
        [
            a[0][0] * b[0][0] + a[0][1] * b[1][0],
            a[0][0] * b[0][1] + a[0][1] * b[1][1],
        ],
        [
            a[1][0] * b[0][0] + a[1][1] * b[1][0],
            a[1][0] * b[0][1] + a[1][1] * b[1][1],
        ],
    ]
}

/// Multiplies a 2x2 matrix by a 2-entry vector, returning a new 2-entry vector.
fn matvec_i8_i64(a: &[[i8; 2]; 2], b: &[i64; 2]) -> [i64; 2] {
    [
        a[0][0] as i64 * b[0] + a[0][1] as i64 * b[1],
        a[1][0] as i64 * b[0] + a[1][1] as i64 * b[1],
    ]
}

/// The adjugate of a 2x2 matrix.
fn unitary_matinv(a: &[[i8; 2]; 2]) -> [[i8; 2]; 2] {
    [[a[1][1], -a[0][1]], [-a[1][0], a[0][0]]]
}

impl std::ops::Mul<TransformationMatrix> for TransformationMatrix {
    type Output = Self;
    fn mul(self, rhs: TransformationMatrix) -> Self::Output {
        Self(matmul_i8(&self.0, &rhs.0))
    }
}

impl std::ops::Mul<Point> for TransformationMatrix {
    type Output = Point;
    fn mul(self, rhs: Point) -> Self::Output {
        let out = matvec_i8_i64(&self.0, &[rhs.x, rhs.y]);
        Point::new(out[0], out[1])
    }
}

impl Default for TransformationMatrix {
    #[inline]
    fn default() -> Self {
        Self::identity()
    }
}

/// A transformation representing a Manhattan translation, rotation, and/or
/// reflection of geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transformation {
    /// The transformation matrix.
    mat: TransformationMatrix,
    /// The x-y translation applied after the matrix.
    b: Point,
}

impl Default for Transformation {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transformation {
    /// Returns the identity transform, leaving any transformed object unmodified.
    pub const fn identity() -> Self {
        Self {
            mat: TransformationMatrix::identity(),
            b: Point::zero(),
        }
    }

    /// Returns a translation by `(x, y)`.
    pub const fn translate(x: i64, y: i64) -> Self {
        Self {
            mat: TransformationMatrix::identity(),
            b: Point::new(x, y),
        }
    }

    /// Returns a rotation by `angle` about the origin.
    pub fn rotate(angle: Rotation) -> Self {
        Self {
            mat: TransformationMatrix::from(angle),
            b: Point::zero(),
        }
    }

    /// Returns a reflection about the x-axis.
    pub const fn reflect_x() -> Self {
        Self {
            mat: TransformationMatrix([[1, 0], [0, -1]]),
            b: Point::zero(),
        }
    }

    /// Creates a transform from an offset, an optional reflection about the
    /// x-axis, and a rotation.
    ///
    /// The component operations apply in the fixed order used by layout
    /// instance references: reflect, then rotate, then translate.
    ///
    /// # Example
    ///
    /// A point at local (1, 0), rotated 90 degrees counterclockwise:
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let trans = Transformation::from_opts(Point::zero(), false, Rotation::R90);
    /// assert_eq!(trans.apply(Point::new(1, 0)), Point::new(0, 1));
    /// ```
    pub fn from_opts(offset: Point, reflect_x: bool, angle: Rotation) -> Self {
        let mut mat = TransformationMatrix::from(angle);
        if reflect_x {
            // Post-multiplying by diag(1, -1) flips the second column,
            // so the reflection applies before the rotation.
            mat.0[0][1] = -mat.0[0][1];
            mat.0[1][1] = -mat.0[1][1];
        }
        Self { mat, b: offset }
    }

    /// Creates a transform that applies only an offset.
    pub const fn from_offset(offset: Point) -> Self {
        Self {
            mat: TransformationMatrix::identity(),
            b: offset,
        }
    }

    /// Creates a new [`Transformation`] that is the cascade of `parent` and `child`.
    ///
    /// "Parents" and "children" refer to layout-instance hierarchies, in
    /// which each level of instance carries a transformation relative to its
    /// parent. The cascade applies `child` first, then `parent`; the
    /// operation is not commutative.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let parent = Transformation::from_opts(Point::new(1, 1), true, Rotation::R0);
    /// let child = Transformation::translate(1, 1);
    /// let p = Transformation::cascade(parent, child).apply(Point::new(1, 1));
    /// assert_eq!(p, Point::new(3, -1));
    /// ```
    pub fn cascade(parent: Transformation, child: Transformation) -> Transformation {
        // The cascaded origin is the parent's origin plus the
        // parent-transformed child origin; the matrix is the product.
        let mut b = parent.mat * child.b;
        b += parent.b;
        let mat = parent.mat * child.mat;
        Self { mat, b }
    }

    /// Applies this transformation to a point.
    pub fn apply(&self, p: Point) -> Point {
        self.mat * p + self.b
    }

    /// The point representing the translation of this transformation.
    pub const fn offset_point(&self) -> Point {
        self.b
    }

    /// Returns `true` if this transformation reverses orientation.
    ///
    /// A reflecting transformation turns a counter-clockwise ring clockwise;
    /// polygon transforms must reverse their point order to compensate.
    pub fn reflects(&self) -> bool {
        self.mat.det() < 0
    }

    /// Returns the inverse [`Transformation`] of `self`.
    pub fn inv(&self) -> Transformation {
        let inv = self.mat.inverse();
        let invb = inv * self.b;
        Self { mat: inv, b: -invb }
    }
}

/// A trait for specifying how a shape is translated by a [`Point`].
pub trait TranslateMut {
    /// Translates the shape by a [`Point`] through mutation.
    fn translate_mut(&mut self, p: Point);
}

impl<T: TranslateMut> TranslateMut for Vec<T> {
    fn translate_mut(&mut self, p: Point) {
        for i in self.iter_mut() {
            i.translate_mut(p);
        }
    }
}

/// A trait for specifying how a shape is translated by a [`Point`].
///
/// Takes in an owned copy of the shape and returns the translated version.
pub trait Translate: TranslateMut + Sized {
    /// Translates the shape by a [`Point`].
    fn translate(mut self, p: Point) -> Self {
        self.translate_mut(p);
        self
    }
}

impl<T: TranslateMut + Sized> Translate for T {}

/// A trait for specifying how an object is changed by a [`Transformation`].
pub trait TransformMut {
    /// Applies matrix-vector [`Transformation`] `trans`.
    fn transform_mut(&mut self, trans: Transformation);
}

impl<T: TransformMut> TransformMut for Vec<T> {
    fn transform_mut(&mut self, trans: Transformation) {
        for i in self.iter_mut() {
            i.transform_mut(trans);
        }
    }
}

/// A trait for specifying how an object is changed by a [`Transformation`].
///
/// Takes in an owned copy of the shape and returns the transformed version.
pub trait Transform: TransformMut + Sized {
    /// Applies matrix-vector [`Transformation`] `trans`.
    fn transform(mut self, trans: Transformation) -> Self {
        self.transform_mut(trans);
        self
    }
}

impl<T: TransformMut + Sized> Transform for T {}
