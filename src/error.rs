use thiserror::Error;

use crate::mesh::{EdgeId, FaceId, VertexId};

/// A broken invariant found by [`Mesh::check`](crate::Mesh::check).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeshError {
    #[error("half-edge {edge:?}: {rule}")]
    Edge { edge: EdgeId, rule: &'static str },

    #[error("vertex {vertex:?}: {rule}")]
    Vertex { vertex: VertexId, rule: &'static str },

    #[error("face {face:?}: {rule}")]
    Face { face: FaceId, rule: &'static str },
}

/// Tessellation failure.
///
/// No partial output accompanies a failure; the tessellator is left
/// empty and ready for new contours.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TessError {
    /// An input coordinate is NaN or infinite.
    #[error("contour {contour}, vertex {vertex}: coordinate is not finite")]
    NonFiniteCoordinate { contour: usize, vertex: usize },

    /// The sweep processed more events than the input size allows.
    #[error("sweep aborted after {events} events (budget {budget})")]
    EventBudgetExceeded { events: usize, budget: usize },

    /// The sweep reached a state its invariants rule out.
    #[error("inconsistent sweep state: {0}")]
    Topology(&'static str),

    #[error("mesh check failed: {0}")]
    Mesh(#[from] MeshError),
}
