//! Virtual rooms behind planar wall mirrors.
//!
//! A [`RealRoom`] is an axis-aligned rectangle holding objects, eyes and the
//! rays linking them, some of whose walls are mirrors. The [`ReflectionEngine`]
//! derives, layer by layer, the [`VirtualRoom`]s an observer would see behind
//! those mirrors (images of images), carrying every reflected entity and
//! rebuilding the rays between reflected counterparts.
//!
//! Virtual rooms are never stored: [`Scene::frame`] recomputes them from the
//! real rooms every time it is called.

pub use nalgebra;

use nalgebra::SVector;

mod engine;
mod entity;
mod error;
mod geometry;
mod render;
mod room;
mod scene;
mod side;

pub use engine::*;
pub use entity::*;
pub use error::*;
pub use geometry::*;
pub use render::*;
pub use room::*;
pub use scene::*;
pub use side::*;

pub type Float = f64;

/// A point (or displacement) in the plane. `y` grows downward, as on screen.
pub type Point = SVector<Float, 2>;

#[inline]
#[must_use]
pub fn point(x: Float, y: Float) -> Point {
    Point::new(x, y)
}
