//! The sides of an axis-aligned rectangle.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::dir::Dir;

/// An enumeration of the sides of an axis-aligned rectangle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum Side {
    /// The left side (negative x).
    Left,
    /// The bottom side (negative y).
    Bot,
    /// The right side (positive x).
    Right,
    /// The top side (positive y).
    Top,
}

impl Side {
    /// All four sides, in the order left, bottom, right, top.
    pub const fn all() -> [Side; 4] {
        [Side::Left, Side::Bot, Side::Right, Side::Top]
    }

    /// The direction of the side's coordinate.
    ///
    /// Left/right sides are located at a given x-coordinate,
    /// so their coordinate direction is [`Dir::Horiz`];
    /// top/bottom sides analogously have [`Dir::Vert`].
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// assert_eq!(Side::Left.coord_dir(), Dir::Horiz);
    /// assert_eq!(Side::Top.coord_dir(), Dir::Vert);
    /// ```
    pub const fn coord_dir(&self) -> Dir {
        match self {
            Side::Left | Side::Right => Dir::Horiz,
            Side::Top | Side::Bot => Dir::Vert,
        }
    }

    /// The direction along which the side's edge runs.
    ///
    /// The opposite of [`Side::coord_dir`].
    pub const fn edge_dir(&self) -> Dir {
        self.coord_dir().other()
    }

    /// `+1` for sides in the positive x/y direction, `-1` otherwise.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// assert_eq!(Side::Right.sign(), 1);
    /// assert_eq!(Side::Bot.sign(), -1);
    /// ```
    pub const fn sign(&self) -> i64 {
        match self {
            Side::Right | Side::Top => 1,
            Side::Left | Side::Bot => -1,
        }
    }
}

impl Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Side::Left => write!(f, "left"),
            Side::Bot => write!(f, "bottom"),
            Side::Right => write!(f, "right"),
            Side::Top => write!(f, "top"),
        }
    }
}
