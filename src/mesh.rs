//! Half-edge mesh.
//!
//! Every undirected edge is a pair of directed half-edges, each the
//! `sym` of the other. A half-edge knows its origin vertex, its left
//! face, the next half-edge counter-clockwise around its origin
//! (`onext`) and the next half-edge counter-clockwise around its left
//! face (`lnext`). All other adjacency is derived from these:
//!
//! ```text
//!   dst   = sym.org          rface = sym.lface
//!   oprev = sym.lnext        lprev = onext.sym
//!   dprev = lnext.sym        rprev = sym.onext
//!   dnext = rprev.sym        rnext = oprev.sym
//! ```
//!
//! Vertices, faces and edge pairs live in [`Pool`]s and are addressed by
//! typed ids. Ids are plain values: copying one never keeps an element
//! alive, and a stale id is caught by the pool's generation check.
use geo::GeoFloat;
use std::fmt;

use crate::{
    error::MeshError,
    geom::{vert_leq, SweepPoint},
    pool::{Key, Pool},
    queue::QueueHandle,
};

mod edit;
#[cfg(test)]
pub(crate) mod fixtures;

/// Handle to a [`Vertex`] of a [`Mesh`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexId(pub(crate) Key);

/// Handle to a [`Face`] of a [`Mesh`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FaceId(pub(crate) Key);

/// Handle to one directed half of an edge pair.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeId {
    pair: Key,
    side: u8,
}

impl EdgeId {
    fn new(pair: Key, side: u8) -> Self {
        EdgeId { pair, side }
    }

    /// The oppositely directed twin.
    #[inline]
    #[must_use]
    pub fn sym(self) -> EdgeId {
        EdgeId {
            pair: self.pair,
            side: self.side ^ 1,
        }
    }
}

impl fmt::Debug for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "V{:?}", self.0)
    }
}

impl fmt::Debug for FaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "F{:?}", self.0)
    }
}

impl fmt::Debug for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:?}{}", self.pair, if self.side == 0 { "+" } else { "-" })
    }
}

#[derive(Debug, Clone)]
pub struct Vertex<T: GeoFloat> {
    pub(crate) an_edge: EdgeId,
    pub(crate) coords: [T; 3],
    pub(crate) point: SweepPoint<T>,
    pub(crate) data: Option<usize>,
    pub(crate) queue_handle: Option<QueueHandle>,
}

impl<T: GeoFloat> Vertex<T> {
    fn new(an_edge: EdgeId) -> Self {
        Vertex {
            an_edge,
            coords: [T::zero(); 3],
            point: SweepPoint::new(T::zero(), T::zero()),
            data: None,
            queue_handle: None,
        }
    }

    /// Get an edge with this vertex as origin.
    #[must_use]
    pub fn an_edge(&self) -> EdgeId {
        self.an_edge
    }

    /// Get the vertex's input coordinates.
    #[must_use]
    pub fn coords(&self) -> [T; 3] {
        self.coords
    }

    /// Get the vertex's projected position.
    #[must_use]
    pub fn point(&self) -> SweepPoint<T> {
        self.point
    }

    /// Get the index of the payload attached to the vertex.
    #[must_use]
    pub fn data(&self) -> Option<usize> {
        self.data
    }
}

#[derive(Debug, Clone)]
pub struct Face {
    pub(crate) an_edge: EdgeId,
    pub(crate) inside: bool,
}

impl Face {
    /// Get an edge with this face on its left.
    #[must_use]
    pub fn an_edge(&self) -> EdgeId {
        self.an_edge
    }

    /// Whether the sweep classified this face as inside.
    #[must_use]
    pub fn inside(&self) -> bool {
        self.inside
    }
}

#[derive(Debug, Clone)]
struct HalfEdge {
    org: VertexId,
    lface: Option<FaceId>,
    onext: EdgeId,
    lnext: EdgeId,
    winding: i32,
    active_region: Option<Key>,
}

impl HalfEdge {
    /// A half-edge forming a two-edge loop with its twin, with no
    /// vertex or face attached yet.
    fn detached(this: EdgeId) -> Self {
        HalfEdge {
            org: VertexId(Key::DANGLING),
            lface: None,
            onext: this,
            lnext: this.sym(),
            winding: 0,
            active_region: None,
        }
    }
}

#[derive(Debug, Clone)]
struct EdgePair {
    halves: [HalfEdge; 2],
}

/// A planar subdivision made of vertices, half-edge pairs and faces.
#[derive(Debug, Clone)]
pub struct Mesh<T: GeoFloat> {
    vertices: Pool<Vertex<T>>,
    faces: Pool<Face>,
    edges: Pool<EdgePair>,
}

impl<T: GeoFloat> Default for Mesh<T> {
    fn default() -> Self {
        Mesh::new()
    }
}

impl<T: GeoFloat> Mesh<T> {
    pub fn new() -> Self {
        Mesh {
            vertices: Pool::new(),
            faces: Pool::new(),
            edges: Pool::new(),
        }
    }

    #[inline]
    fn half(&self, e: EdgeId) -> &HalfEdge {
        &self.edges[e.pair].halves[e.side as usize]
    }

    #[inline]
    fn half_mut(&mut self, e: EdgeId) -> &mut HalfEdge {
        &mut self.edges[e.pair].halves[e.side as usize]
    }

    #[inline]
    #[must_use]
    pub fn onext(&self, e: EdgeId) -> EdgeId {
        self.half(e).onext
    }

    #[inline]
    #[must_use]
    pub fn lnext(&self, e: EdgeId) -> EdgeId {
        self.half(e).lnext
    }

    #[inline]
    #[must_use]
    pub fn oprev(&self, e: EdgeId) -> EdgeId {
        self.lnext(e.sym())
    }

    #[inline]
    #[must_use]
    pub fn lprev(&self, e: EdgeId) -> EdgeId {
        self.onext(e).sym()
    }

    #[inline]
    #[must_use]
    pub fn dprev(&self, e: EdgeId) -> EdgeId {
        self.lnext(e).sym()
    }

    #[inline]
    #[must_use]
    pub fn rprev(&self, e: EdgeId) -> EdgeId {
        self.onext(e.sym())
    }

    #[inline]
    #[must_use]
    pub fn dnext(&self, e: EdgeId) -> EdgeId {
        self.rprev(e).sym()
    }

    #[inline]
    #[must_use]
    pub fn rnext(&self, e: EdgeId) -> EdgeId {
        self.oprev(e).sym()
    }

    #[inline]
    #[must_use]
    pub fn org(&self, e: EdgeId) -> VertexId {
        self.half(e).org
    }

    #[inline]
    #[must_use]
    pub fn dst(&self, e: EdgeId) -> VertexId {
        self.org(e.sym())
    }

    #[inline]
    #[must_use]
    pub fn lface(&self, e: EdgeId) -> Option<FaceId> {
        self.half(e).lface
    }

    #[inline]
    #[must_use]
    pub fn rface(&self, e: EdgeId) -> Option<FaceId> {
        self.lface(e.sym())
    }

    /// Get the winding contribution of a half-edge.
    #[inline]
    #[must_use]
    pub fn winding(&self, e: EdgeId) -> i32 {
        self.half(e).winding
    }

    pub fn set_winding(&mut self, e: EdgeId, winding: i32) {
        self.half_mut(e).winding = winding;
    }

    /// Accumulate the windings of `src` (and its twin) into `dst` (and
    /// its twin). Used when two coincident edges are merged into one.
    pub fn add_winding(&mut self, dst: EdgeId, src: EdgeId) {
        let (w, w_sym) = (self.winding(src), self.winding(src.sym()));
        self.half_mut(dst).winding += w;
        self.half_mut(dst.sym()).winding += w_sym;
    }

    pub(crate) fn active_region(&self, e: EdgeId) -> Option<Key> {
        self.half(e).active_region
    }

    pub(crate) fn set_active_region(&mut self, e: EdgeId, region: Option<Key>) {
        self.half_mut(e).active_region = region;
    }

    #[must_use]
    pub fn vertex(&self, v: VertexId) -> &Vertex<T> {
        &self.vertices[v.0]
    }

    pub fn vertex_mut(&mut self, v: VertexId) -> &mut Vertex<T> {
        &mut self.vertices[v.0]
    }

    #[must_use]
    pub fn face(&self, f: FaceId) -> &Face {
        &self.faces[f.0]
    }

    pub fn face_mut(&mut self, f: FaceId) -> &mut Face {
        &mut self.faces[f.0]
    }

    #[must_use]
    pub fn contains_vertex(&self, v: VertexId) -> bool {
        self.vertices.contains(v.0)
    }

    #[must_use]
    pub fn contains_face(&self, f: FaceId) -> bool {
        self.faces.contains(f.0)
    }

    #[must_use]
    pub fn contains_edge(&self, e: EdgeId) -> bool {
        self.edges.contains(e.pair)
    }

    /// Get the projected position of a vertex.
    #[inline]
    #[must_use]
    pub fn point(&self, v: VertexId) -> SweepPoint<T> {
        self.vertices[v.0].point
    }

    #[inline]
    pub(crate) fn org_point(&self, e: EdgeId) -> SweepPoint<T> {
        self.point(self.org(e))
    }

    #[inline]
    pub(crate) fn dst_point(&self, e: EdgeId) -> SweepPoint<T> {
        self.point(self.dst(e))
    }

    pub fn set_point(&mut self, v: VertexId, point: SweepPoint<T>) {
        self.vertices[v.0].point = point;
    }

    pub fn set_coords(&mut self, v: VertexId, coords: [T; 3]) {
        self.vertices[v.0].coords = coords;
    }

    pub fn set_data(&mut self, v: VertexId, data: Option<usize>) {
        self.vertices[v.0].data = data;
    }

    /// Whether `e` points left (or is degenerate) in sweep order.
    #[inline]
    #[must_use]
    pub fn edge_goes_left(&self, e: EdgeId) -> bool {
        vert_leq(self.dst_point(e), self.org_point(e))
    }

    /// Whether `e` points right (or is degenerate) in sweep order.
    #[inline]
    #[must_use]
    pub fn edge_goes_right(&self, e: EdgeId) -> bool {
        vert_leq(self.org_point(e), self.dst_point(e))
    }

    #[must_use]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    #[must_use]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Number of edge pairs.
    #[must_use]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Snapshot of the live vertex ids.
    ///
    /// Algorithms that edit the mesh while walking it iterate a
    /// snapshot and skip ids that died in the meantime; elements
    /// created during the walk are not visited.
    #[must_use]
    pub fn vertex_ids(&self) -> Vec<VertexId> {
        self.vertices.keys().map(VertexId).collect()
    }

    /// Snapshot of the live face ids.
    #[must_use]
    pub fn face_ids(&self) -> Vec<FaceId> {
        self.faces.keys().map(FaceId).collect()
    }

    /// Snapshot of one half-edge of every live edge pair.
    #[must_use]
    pub fn edge_ids(&self) -> Vec<EdgeId> {
        self.edges.keys().map(|pair| EdgeId::new(pair, 0)).collect()
    }

    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &Vertex<T>)> + '_ {
        self.vertices.iter().map(|(k, v)| (VertexId(k), v))
    }

    pub fn faces(&self) -> impl Iterator<Item = (FaceId, &Face)> + '_ {
        self.faces.iter().map(|(k, f)| (FaceId(k), f))
    }

    /// Iterate the left-face loop starting at `start`.
    pub fn face_loop(&self, start: EdgeId) -> impl Iterator<Item = EdgeId> + '_ {
        self.ring(start, Self::lnext)
    }

    /// Iterate the origin ring starting at `start`.
    pub fn vertex_ring(&self, start: EdgeId) -> impl Iterator<Item = EdgeId> + '_ {
        self.ring(start, Self::onext)
    }

    fn ring(
        &self,
        start: EdgeId,
        next: fn(&Self, EdgeId) -> EdgeId,
    ) -> impl Iterator<Item = EdgeId> + '_ {
        let mut cur = Some(start);
        std::iter::from_fn(move || {
            let e = cur?;
            let n = next(self, e);
            cur = if n == start { None } else { Some(n) };
            Some(e)
        })
    }

    #[must_use]
    pub fn face_vertex_count(&self, f: FaceId) -> usize {
        self.face_loop(self.face(f).an_edge).count()
    }

    /// Signed area of a face in the projection plane; positive when the
    /// loop runs counter-clockwise in (s, t).
    #[must_use]
    pub fn face_area(&self, f: FaceId) -> T {
        let twice = self
            .face_loop(self.face(f).an_edge)
            .fold(T::zero(), |area, e| {
                let (org, dst) = (self.org_point(e), self.dst_point(e));
                area + (org.s() - dst.s()) * (org.t() + dst.t())
            });
        twice / (T::one() + T::one())
    }

    /// Verify the pointer invariants of every face, vertex and edge.
    ///
    /// Linear in the size of the mesh; meant for debug builds and tests.
    pub fn check(&self) -> Result<(), MeshError> {
        // A loop longer than this cannot close.
        let bound = 2 * self.edges.len() + 1;

        for (f, face) in self.faces() {
            let start = face.an_edge;
            if !self.contains_edge(start) {
                return Err(MeshError::Face { face: f, rule: "dangling an_edge" });
            }
            let mut e = start;
            let mut steps = 0;
            loop {
                self.check_edge(e)?;
                if self.lface(e) != Some(f) {
                    return Err(MeshError::Face { face: f, rule: "lface mismatch in loop" });
                }
                e = self.lnext(e);
                steps += 1;
                if e == start {
                    break;
                }
                if steps > bound {
                    return Err(MeshError::Face { face: f, rule: "face loop does not close" });
                }
            }
        }

        for (v, vertex) in self.vertices() {
            let start = vertex.an_edge;
            if !self.contains_edge(start) {
                return Err(MeshError::Vertex { vertex: v, rule: "dangling an_edge" });
            }
            let mut e = start;
            let mut steps = 0;
            loop {
                self.check_edge(e)?;
                if self.org(e) != v {
                    return Err(MeshError::Vertex { vertex: v, rule: "org mismatch in ring" });
                }
                e = self.onext(e);
                steps += 1;
                if e == start {
                    break;
                }
                if steps > bound {
                    return Err(MeshError::Vertex { vertex: v, rule: "vertex ring does not close" });
                }
            }
        }

        for e in self.edge_ids() {
            for e in [e, e.sym()] {
                self.check_edge(e)?;
                if !self.contains_vertex(self.org(e)) {
                    return Err(MeshError::Edge { edge: e, rule: "dangling origin" });
                }
                if let Some(f) = self.lface(e) {
                    if !self.contains_face(f) {
                        return Err(MeshError::Edge { edge: e, rule: "dangling left face" });
                    }
                }
            }
        }
        Ok(())
    }

    fn check_edge(&self, e: EdgeId) -> Result<(), MeshError> {
        let linked = |e: EdgeId| self.contains_edge(e);
        if !linked(self.onext(e)) || !linked(self.lnext(e)) {
            return Err(MeshError::Edge { edge: e, rule: "dangling onext/lnext" });
        }
        if self.onext(self.lnext(e)).sym() != e {
            return Err(MeshError::Edge { edge: e, rule: "lnext.onext.sym != e" });
        }
        if self.lnext(self.onext(e).sym()) != e {
            return Err(MeshError::Edge { edge: e, rule: "onext.sym.lnext != e" });
        }
        Ok(())
    }
}
