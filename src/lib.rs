//! Tessellation of planar polygons by a sweep line over a half-edge
//! mesh.
//!
//! 1. [Usage](#usage)
//! 1. [Pipeline](#pipeline)
//!
//! # Usage
//!
//! Add any number of closed contours to a [`Tessellator`], possibly
//! self-intersecting and overlapping each other, then call
//! [`Tessellator::tessellate`]. A [`WindingRule`] decides which parts of
//! the plane are inside; the output is a [`Tessellation`] of triangles,
//! of convex polygons of bounded size, or of the boundary contours of
//! the inside region.
//!
//! ```rust
//! use geo::polygon;
//! use geo_tessellate::{TessOptions, Tessellator, WindingRule};
//!
//! // A square with a square hole.
//! let poly = polygon!(
//!     exterior: [(x: 0., y: 0.), (x: 4., y: 0.), (x: 4., y: 4.), (x: 0., y: 4.)],
//!     interiors: [[(x: 1., y: 1.), (x: 3., y: 1.), (x: 3., y: 3.), (x: 1., y: 3.)]]
//! );
//! let mut tess = Tessellator::<f64>::new();
//! tess.add_polygon(&poly).unwrap();
//! let out = tess
//!     .tessellate(&TessOptions::default().with_winding_rule(WindingRule::NonZero))
//!     .unwrap();
//! assert_eq!(out.element_count(), 8);
//! ```
//!
//! Vertices may carry a payload. Vertices created where edges cross
//! get theirs from a [`Combine`] callback, see
//! [`Tessellator::tessellate_with`].
//!
//! # Pipeline
//!
//! Contours are stored in a half-edge [`Mesh`]. A tessellation
//! projects the mesh onto a plane, then sweeps a line across it: the
//! sweep splits edges at their intersections, merges coincident
//! vertices, and cuts the mesh into monotone faces, each classified as
//! inside or outside by its winding number. Inside faces are then
//! triangulated (and optionally merged back into convex polygons) or
//! reduced to their boundary.
//!
//! The building blocks are public: the generational [`pool`], the
//! [`mesh`] and its edit operations, the predicates of [`geom`] and the
//! [`queue`] of sweep events.
pub mod pool;

pub mod geom;
pub use geom::SweepPoint;

pub mod mesh;
pub use mesh::Mesh;

pub mod queue;

mod dict;
mod monotone;
mod sweep;

mod tess;
pub use tess::{
    Combine, ContourOrientation, ContourVertex, ElementType, NoCombine, OutputVertex, TessOptions,
    Tessellation, Tessellator, WindingRule, UNDEF,
};

mod error;
pub use error::{MeshError, TessError};

#[cfg(test)]
#[path = "../benches/utils/random.rs"]
pub mod random;
