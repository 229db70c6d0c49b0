//! Foundational primitives for laser path planning.
//!
//! ## Coordinates
//! A [`Point`] is an integer pixel coordinate, `x` the column and `y` the row.
//! Points compare row-major (`y` first, then `x`); every tie-break in the
//! planner uses this order so output is reproducible frame to frame.
//!
//! ## Adjacency
//! - 4-adjacency: one coordinate shared, the other differs by exactly one.
//! - 8-adjacency: both deltas at most one, excluding the point itself.
//!
//! ## Images and Masks
//! Images use element stride (not byte stride), as in any borrowed view over a
//! padded buffer. A [`BinaryMask`] is the FOREGROUND/BACKGROUND grid the planner
//! consumes; [`BinaryMask::from_threshold`] binarizes an 8-bit edge image.

mod error;
mod geom;
mod image;
mod mask;

pub use error::Error;
pub use geom::{Point, Rgb};
pub use image::{Image, ImageView};
pub use mask::BinaryMask;
