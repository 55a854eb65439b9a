//! Topology editing primitives.
//!
//! Each public operation leaves the mesh consistent: every live vertex
//! and face points at a live incident half-edge, and all `onext`/`lnext`
//! rings close.
use geo::GeoFloat;
use log::trace;

use super::{EdgeId, EdgePair, Face, FaceId, HalfEdge, Mesh, Vertex, VertexId};
use crate::{geom::vert_ccw, pool::Key};

impl<T: GeoFloat> Mesh<T> {
    /// Exchange `a.onext` and `b.onext`, fixing up the `lnext` pointers
    /// that refer to them.
    ///
    /// This either merges two origin rings into one (and two face loops
    /// into one), or splits one of each into two. Vertex and face
    /// records are left untouched.
    fn splice_rings(&mut self, a: EdgeId, b: EdgeId) {
        let a_onext = self.onext(a);
        let b_onext = self.onext(b);
        self.half_mut(a_onext.sym()).lnext = b;
        self.half_mut(b_onext.sym()).lnext = a;
        self.half_mut(a).onext = b_onext;
        self.half_mut(b).onext = a_onext;
    }

    /// New edge pair forming its own loop, with no vertex or face.
    fn make_edge_pair(&mut self) -> EdgeId {
        let pair = self.edges.insert_with(|pair: Key| {
            let e = EdgeId::new(pair, 0);
            EdgePair {
                halves: [HalfEdge::detached(e), HalfEdge::detached(e.sym())],
            }
        });
        EdgeId::new(pair, 0)
    }

    /// Attach a new vertex as the origin of every edge around `e_orig`.
    fn make_vertex(&mut self, e_orig: EdgeId) -> VertexId {
        let v = VertexId(self.vertices.insert(Vertex::new(e_orig)));
        let mut e = e_orig;
        loop {
            self.half_mut(e).org = v;
            e = self.onext(e);
            if e == e_orig {
                break;
            }
        }
        v
    }

    /// Attach a new face as the left face of every edge in the loop of
    /// `e_orig`. The new face copies the `inside` flag of `like`, the
    /// face being split.
    fn make_face(&mut self, e_orig: EdgeId, like: Option<FaceId>) -> FaceId {
        let inside = like.map_or(false, |f| self.face(f).inside);
        let f = FaceId(self.faces.insert(Face {
            an_edge: e_orig,
            inside,
        }));
        let mut e = e_orig;
        loop {
            self.half_mut(e).lface = Some(f);
            e = self.lnext(e);
            if e == e_orig {
                break;
            }
        }
        f
    }

    fn kill_edge(&mut self, e: EdgeId) {
        self.edges.repool(e.pair);
    }

    /// Destroy `v`, re-pointing its ring at `new_org`.
    fn kill_vertex(&mut self, v: VertexId, new_org: Option<VertexId>) {
        let start = self.vertex(v).an_edge;
        let new_org = new_org.unwrap_or(VertexId(Key::DANGLING));
        let mut e = start;
        loop {
            self.half_mut(e).org = new_org;
            e = self.onext(e);
            if e == start {
                break;
            }
        }
        self.vertices.repool(v.0);
    }

    /// Destroy `f`, re-pointing its loop at `new_lface`.
    fn kill_face(&mut self, f: FaceId, new_lface: Option<FaceId>) {
        let start = self.face(f).an_edge;
        let mut e = start;
        loop {
            self.half_mut(e).lface = new_lface;
            e = self.lnext(e);
            if e == start {
                break;
            }
        }
        self.faces.repool(f.0);
    }

    /// Create an edge pair with two new vertices and one new face: a
    /// loop of two half-edges.
    pub fn make_edge(&mut self) -> EdgeId {
        let e = self.make_edge_pair();
        self.make_vertex(e);
        self.make_vertex(e.sym());
        self.make_face(e, None);
        e
    }

    /// The basic topology change: exchange `e_org.onext` and
    /// `e_dst.onext`.
    ///
    /// If the origins differ the two vertices are merged (destroying
    /// `e_dst.org`), otherwise the origin ring is split in two with a
    /// new vertex. Likewise the left faces are merged (destroying
    /// `e_dst.lface`) or split with a new face.
    pub fn splice(&mut self, e_org: EdgeId, e_dst: EdgeId) {
        if e_org == e_dst {
            return;
        }

        let joining_vertices = self.org(e_dst) != self.org(e_org);
        if joining_vertices {
            // Two vertex rings become one.
            self.kill_vertex(self.org(e_dst), Some(self.org(e_org)));
        }
        let joining_loops = self.lface(e_dst) != self.lface(e_org);
        if joining_loops {
            if let Some(f) = self.lface(e_dst) {
                self.kill_face(f, self.lface(e_org));
            }
        }

        self.splice_rings(e_dst, e_org);

        if !joining_vertices {
            // One ring became two: new vertex for the e_dst side.
            self.make_vertex(e_dst);
            let org = self.org(e_org);
            self.vertex_mut(org).an_edge = e_org;
        }
        if !joining_loops {
            let lface = self.lface(e_org);
            self.make_face(e_dst, lface);
            if let Some(f) = lface {
                self.face_mut(f).an_edge = e_org;
            }
        }
    }

    /// Remove the edge pair of `e_del`.
    ///
    /// Distinct left and right faces are merged into one. Vertices left
    /// without edges are destroyed, as is the face of an edge that was
    /// isolated.
    pub fn delete(&mut self, e_del: EdgeId) {
        let e_del_sym = e_del.sym();

        let joining_loops = self.lface(e_del) != self.rface(e_del);
        if joining_loops {
            if let Some(f) = self.lface(e_del) {
                self.kill_face(f, self.rface(e_del));
            }
        }

        if self.onext(e_del) == e_del {
            self.kill_vertex(self.org(e_del), None);
        } else {
            // Make sure that e_del.org and e_del.rface point to valid
            // half-edges.
            if let Some(rface) = self.rface(e_del) {
                let oprev = self.oprev(e_del);
                self.face_mut(rface).an_edge = oprev;
            }
            let (org, onext) = (self.org(e_del), self.onext(e_del));
            self.vertex_mut(org).an_edge = onext;

            self.splice_rings(e_del, self.oprev(e_del));
            if !joining_loops {
                // One loop became two.
                let lface = self.lface(e_del);
                self.make_face(e_del, lface);
            }
        }

        // Claim: the mesh is now in a consistent state, except that
        // e_del.org may have been deleted. Now we disconnect e_del.dst.
        if self.onext(e_del_sym) == e_del_sym {
            self.kill_vertex(self.org(e_del_sym), None);
            if let Some(f) = self.lface(e_del_sym) {
                self.kill_face(f, None);
            }
        } else {
            if let Some(lface) = self.lface(e_del) {
                let oprev = self.oprev(e_del_sym);
                self.face_mut(lface).an_edge = oprev;
            }
            let (org, onext) = (self.org(e_del_sym), self.onext(e_del_sym));
            self.vertex_mut(org).an_edge = onext;
            self.splice_rings(e_del_sym, self.oprev(e_del_sym));
        }

        self.kill_edge(e_del);
    }

    /// Create `e_new` with `e_new == e_org.lnext` and a fresh vertex as
    /// `e_new.dst`. Both halves of `e_new` get `e_org`'s left face.
    pub fn add_edge_vertex(&mut self, e_org: EdgeId) -> EdgeId {
        let e_new = self.make_edge_pair();
        let e_new_sym = e_new.sym();

        // Connect the new edge appropriately.
        self.splice_rings(e_new, self.lnext(e_org));

        // Set the vertex and face information.
        self.half_mut(e_new).org = self.dst(e_org);
        self.make_vertex(e_new_sym);
        let lface = self.lface(e_org);
        self.half_mut(e_new).lface = lface;
        self.half_mut(e_new_sym).lface = lface;

        e_new
    }

    /// Split `e_org` into `e_org` and `e_new`, such that
    /// `e_new == e_org.lnext`. The new vertex is `e_org.dst ==
    /// e_new.org`; its coordinates are left for the caller to set. Both
    /// halves keep `e_org`'s winding.
    pub fn split_edge(&mut self, e_org: EdgeId) -> EdgeId {
        let e_tmp = self.add_edge_vertex(e_org);
        let e_new = e_tmp.sym();

        // Disconnect e_org from e_org.dst and connect it to e_new.org.
        self.splice_rings(e_org.sym(), self.oprev(e_org.sym()));
        self.splice_rings(e_org.sym(), e_new);

        // Set the vertex and face information.
        self.half_mut(e_org.sym()).org = self.org(e_new);
        let dst = self.dst(e_new);
        self.vertex_mut(dst).an_edge = e_new.sym();
        self.half_mut(e_new.sym()).lface = self.rface(e_org);
        self.half_mut(e_new).winding = self.winding(e_org);
        self.half_mut(e_new.sym()).winding = self.winding(e_org.sym());

        e_new
    }

    /// Create a new edge from `e_org.dst` to `e_dst.org` and return it.
    ///
    /// If `e_org` and `e_dst` share a left face, it is split in two,
    /// with the new face on the left of the returned edge. Otherwise
    /// the two faces are merged and `e_dst`'s left face is destroyed.
    pub fn connect(&mut self, e_org: EdgeId, e_dst: EdgeId) -> EdgeId {
        let e_new = self.make_edge_pair();
        let e_new_sym = e_new.sym();

        let joining_loops = self.lface(e_dst) != self.lface(e_org);
        if joining_loops {
            if let Some(f) = self.lface(e_dst) {
                self.kill_face(f, self.lface(e_org));
            }
        }

        // Connect the new edge appropriately.
        self.splice_rings(e_new, self.lnext(e_org));
        self.splice_rings(e_new_sym, e_dst);

        // Set the vertex and face information.
        self.half_mut(e_new).org = self.dst(e_org);
        self.half_mut(e_new_sym).org = self.org(e_dst);
        let lface = self.lface(e_org);
        self.half_mut(e_new).lface = lface;
        self.half_mut(e_new_sym).lface = lface;

        // Make sure the old face points to a valid half-edge.
        if let Some(f) = lface {
            self.face_mut(f).an_edge = e_new_sym;
        }

        if !joining_loops {
            self.make_face(e_new, lface);
        }
        e_new
    }

    /// Destroy face `f_zap`. Edges of its loop whose other side has no
    /// face either are deleted, along with vertices left isolated.
    pub fn zap_face(&mut self, f_zap: FaceId) {
        let e_start = self.face(f_zap).an_edge;

        // Walk around the face, deleting edges whose right face is also
        // gone.
        let mut e_next = self.lnext(e_start);
        loop {
            let e = e_next;
            e_next = self.lnext(e);

            self.half_mut(e).lface = None;
            if self.rface(e).is_none() {
                if self.onext(e) == e {
                    self.kill_vertex(self.org(e), None);
                } else {
                    let (org, onext) = (self.org(e), self.onext(e));
                    self.vertex_mut(org).an_edge = onext;
                    self.splice_rings(e, self.oprev(e));
                }
                let e_sym = e.sym();
                if self.onext(e_sym) == e_sym {
                    self.kill_vertex(self.org(e_sym), None);
                } else {
                    let (org, onext) = (self.org(e_sym), self.onext(e_sym));
                    self.vertex_mut(org).an_edge = onext;
                    self.splice_rings(e_sym, self.oprev(e_sym));
                }
                self.kill_edge(e);
            }
            if e == e_start {
                break;
            }
        }

        self.faces.repool(f_zap.0);
    }

    /// Merge adjacent inside faces across shared edges while the result
    /// stays convex and has at most `max_verts` vertices.
    pub fn merge_convex_faces(&mut self, max_verts: usize) {
        let mut merged = 0;
        for f in self.face_ids() {
            if !self.contains_face(f) || !self.face(f).inside {
                continue;
            }

            let mut e_cur = self.face(f).an_edge;
            let v_start = self.org(e_cur);

            loop {
                let mut e_next = self.lnext(e_cur);
                let e_sym = e_cur.sym();
                let mut deleted = false;

                if let Some(sym_face) = self.lface(e_sym) {
                    if self.face(sym_face).inside {
                        // Try to merge if the resulting face is convex
                        // and small enough.
                        let cur_nv = self.face_vertex_count(f);
                        let sym_nv = self.face_vertex_count(sym_face);
                        if cur_nv + sym_nv - 2 <= max_verts
                            && vert_ccw(
                                self.org_point(self.lprev(e_cur)),
                                self.org_point(e_cur),
                                self.org_point(self.lnext(self.lnext(e_sym))),
                            )
                            && vert_ccw(
                                self.org_point(self.lprev(e_sym)),
                                self.org_point(e_sym),
                                self.org_point(self.lnext(self.lnext(e_cur))),
                            )
                        {
                            e_next = self.lnext(e_sym);
                            self.delete(e_sym);
                            deleted = true;
                            merged += 1;
                        }
                    }
                }

                if !deleted && self.org(self.lnext(e_cur)) == v_start {
                    break;
                }
                e_cur = e_next;
            }
        }
        trace!("merge_convex_faces: removed {merged} edges");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::fixtures::polygon;

    fn init_log() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn test_make_edge() {
        let mut mesh = Mesh::<f64>::new();
        let e = mesh.make_edge();
        assert_eq!(mesh.num_vertices(), 2);
        assert_eq!(mesh.num_faces(), 1);
        assert_eq!(mesh.num_edges(), 1);
        assert_ne!(mesh.org(e), mesh.dst(e));
        assert_eq!(mesh.lface(e), mesh.rface(e));
        assert_eq!(mesh.lnext(e), e.sym());
        assert_eq!(mesh.onext(e), e);
        mesh.check().unwrap();
    }

    #[test]
    fn test_splice_self_loop() {
        let mut mesh = Mesh::<f64>::new();
        let e = mesh.make_edge();
        mesh.splice(e, e.sym());
        // Vertices merged, face split in two.
        assert_eq!(mesh.num_vertices(), 1);
        assert_eq!(mesh.num_faces(), 2);
        assert_eq!(mesh.org(e), mesh.dst(e));
        assert_ne!(mesh.lface(e), mesh.rface(e));
        mesh.check().unwrap();

        // Splicing back undoes it.
        mesh.splice(e, e.sym());
        assert_eq!(mesh.num_vertices(), 2);
        assert_eq!(mesh.num_faces(), 1);
        mesh.check().unwrap();

        // No-op on identical edges.
        mesh.splice(e, e);
        mesh.check().unwrap();
    }

    #[test]
    fn test_contour_construction() {
        init_log();
        let mut mesh = Mesh::<f64>::new();
        let e = polygon(&mut mesh, &[[0., 0.], [1., 0.], [1., 1.], [0., 1.]]);
        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.num_edges(), 4);
        assert_eq!(mesh.num_faces(), 2);
        mesh.check().unwrap();

        let f = mesh.lface(e).unwrap();
        assert_eq!(mesh.face_vertex_count(f), 4);
        let windings: Vec<_> = mesh.face_loop(e).map(|e| mesh.winding(e)).collect();
        assert!(windings.iter().all(|&w| w == mesh.winding(e)));
        let area = mesh.face_area(f).abs();
        assert!((area - 1.).abs() < 1e-12);
    }

    #[test]
    fn test_connect_and_delete() {
        let mut mesh = Mesh::<f64>::new();
        let e = polygon(&mut mesh, &[[0., 0.], [1., 0.], [1., 1.], [0., 1.]]);
        let f = mesh.lface(e).unwrap();
        mesh.face_mut(f).inside = true;

        // Diagonal splits the face.
        let diag = mesh.connect(e, mesh.lprev(e));
        assert_eq!(mesh.num_faces(), 3);
        assert_eq!(mesh.num_edges(), 5);
        assert_ne!(mesh.lface(diag), mesh.rface(diag));
        // The new face inherits the inside flag.
        assert!(mesh.face(mesh.lface(diag).unwrap()).inside);
        assert!(mesh.face(mesh.rface(diag).unwrap()).inside);
        mesh.check().unwrap();

        mesh.delete(diag);
        assert_eq!(mesh.num_faces(), 2);
        assert_eq!(mesh.num_edges(), 4);
        mesh.check().unwrap();
    }

    #[test]
    fn test_split_edge_keeps_winding() {
        let mut mesh = Mesh::<f64>::new();
        let e = polygon(&mut mesh, &[[0., 0.], [2., 0.], [1., 1.]]);
        let old_dst = mesh.dst(e);
        let e_new = mesh.split_edge(e);
        assert_eq!(mesh.lnext(e), e_new);
        assert_eq!(mesh.dst(e), mesh.org(e_new));
        assert_eq!(mesh.dst(e_new), old_dst);
        assert_eq!(mesh.winding(e_new), mesh.winding(e));
        assert_eq!(mesh.winding(e_new.sym()), mesh.winding(e.sym()));
        assert_eq!(mesh.num_vertices(), 4);
        mesh.check().unwrap();
    }

    #[test]
    fn test_add_edge_vertex() {
        let mut mesh = Mesh::<f64>::new();
        let e = mesh.make_edge();
        let e_new = mesh.add_edge_vertex(e);
        assert_eq!(mesh.lnext(e), e_new);
        assert_eq!(mesh.org(e_new), mesh.dst(e));
        assert_eq!(mesh.lface(e_new), mesh.lface(e));
        assert_eq!(mesh.num_vertices(), 3);
        mesh.check().unwrap();
    }

    #[test]
    fn test_delete_isolated_edge() {
        let mut mesh = Mesh::<f64>::new();
        let e = mesh.make_edge();
        mesh.delete(e);
        assert_eq!(mesh.num_vertices(), 0);
        assert_eq!(mesh.num_faces(), 0);
        assert_eq!(mesh.num_edges(), 0);
        mesh.check().unwrap();
    }

    #[test]
    fn test_zap_faces_erases_mesh() {
        let mut mesh = Mesh::<f64>::new();
        let e = polygon(&mut mesh, &[[0., 0.], [1., 0.], [1., 1.], [0., 1.]]);
        mesh.connect(e, mesh.lprev(e));
        mesh.check().unwrap();

        for f in mesh.face_ids() {
            if mesh.contains_face(f) {
                mesh.zap_face(f);
                mesh.check().unwrap();
            }
        }
        assert_eq!(mesh.num_faces(), 0);
        assert_eq!(mesh.num_edges(), 0);
        assert_eq!(mesh.num_vertices(), 0);
    }

    #[test]
    fn test_merge_convex_faces() {
        let mut mesh = Mesh::<f64>::new();
        let e = polygon(&mut mesh, &[[0., 0.], [1., 0.], [1., 1.], [0., 1.]]);
        let f = mesh.lface(e).unwrap();
        let inside = mesh.face_area(f) > 0.;
        mesh.face_mut(f).inside = inside;
        let outer = mesh.rface(e).unwrap();
        mesh.face_mut(outer).inside = !inside;

        let start = if inside { e } else { e.sym() };
        mesh.connect(start, mesh.lprev(start));
        assert_eq!(mesh.num_faces(), 3);

        // Two triangles only fit in a quad.
        mesh.merge_convex_faces(3);
        assert_eq!(mesh.num_faces(), 3);
        mesh.merge_convex_faces(4);
        assert_eq!(mesh.num_faces(), 2);
        mesh.check().unwrap();
    }
}
