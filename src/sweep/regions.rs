//! Bookkeeping of the active regions.
use geo::GeoFloat;

use super::{ActiveRegion, IntersectHook, RegionId, Sweep};
use crate::{
    geom::{edge_eval, edge_sign, vert_leq},
    mesh::{EdgeId, Mesh, VertexId},
};

/// Ordering of the dictionary edges at the current event: whether `e1`
/// lies below (or at) `e2` along the sweep line.
///
/// Both edges are directed right to left and must cross the line
/// through `event`. Edges ending at the event itself are compared by
/// slope.
pub(super) fn edge_leq<T: GeoFloat>(
    mesh: &Mesh<T>,
    event: VertexId,
    e1: EdgeId,
    e2: EdgeId,
) -> bool {
    let ev = mesh.point(event);
    let (org1, dst1) = (mesh.org_point(e1), mesh.dst_point(e1));
    let (org2, dst2) = (mesh.org_point(e2), mesh.dst_point(e2));

    if mesh.dst(e1) == event {
        if mesh.dst(e2) == event {
            // Both edges meet at the event: sort by slope.
            if vert_leq(org1, org2) {
                return edge_sign(dst2, org1, org2) <= T::zero();
            }
            return edge_sign(dst1, org2, org1) >= T::zero();
        }
        return edge_sign(dst2, ev, org2) <= T::zero();
    }
    if mesh.dst(e2) == event {
        return edge_sign(dst1, ev, org1) >= T::zero();
    }

    edge_eval(dst1, ev, org1) >= edge_eval(dst2, ev, org2)
}

impl<'a, T: GeoFloat, H: IntersectHook<T>> Sweep<'a, T, H> {
    pub(super) fn region_below(&self, reg: RegionId) -> Option<RegionId> {
        let node = self.dict.prev(self.regions[reg].node_up);
        self.dict.key(node)
    }

    pub(super) fn region_above(&self, reg: RegionId) -> Option<RegionId> {
        let node = self.dict.next(self.regions[reg].node_up);
        self.dict.key(node)
    }

    /// The region below `reg`; the bottom sentinel guarantees one.
    pub(super) fn below(&self, reg: RegionId) -> RegionId {
        self.region_below(reg)
            .expect("sweep: no region below")
    }

    /// The region above `reg`; the top sentinel guarantees one.
    pub(super) fn above(&self, reg: RegionId) -> RegionId {
        self.region_above(reg)
            .expect("sweep: no region above")
    }

    pub(super) fn delete_region(&mut self, reg: RegionId) {
        let ActiveRegion {
            e_up,
            node_up,
            fix_upper_edge,
            ..
        } = self.regions.repool(reg);
        if fix_upper_edge {
            // Temporary edges carry no winding.
            debug_assert_eq!(self.mesh.winding(e_up), 0);
        }
        self.mesh.set_active_region(e_up, None);
        self.dict.remove(node_up);
    }

    /// Replace the temporary upper edge of `reg` by `new_edge`.
    pub(super) fn fix_upper_edge(&mut self, reg: RegionId, new_edge: EdgeId) {
        debug_assert!(self.regions[reg].fix_upper_edge);
        let old = self.regions[reg].e_up;
        self.mesh.delete(old);

        let region = &mut self.regions[reg];
        region.fix_upper_edge = false;
        region.e_up = new_edge;
        self.mesh.set_active_region(new_edge, Some(reg));
    }

    /// Topmost region whose upper edge shares the origin of `reg`'s.
    pub(super) fn top_left_region(&mut self, reg: RegionId) -> RegionId {
        let org = self.mesh.org(self.regions[reg].e_up);
        let mut reg = reg;
        loop {
            reg = self.above(reg);
            if self.mesh.org(self.regions[reg].e_up) != org {
                break;
            }
        }

        // A temporary edge above must be replaced now, since the new
        // edges may need to be attached to it.
        if self.regions[reg].fix_upper_edge {
            let below = self.below(reg);
            let org = self.regions[below].e_up.sym();
            let dst = self.mesh.lnext(self.regions[reg].e_up);
            let e = self.mesh.connect(org, dst);
            self.fix_upper_edge(reg, e);
            reg = self.above(reg);
        }
        reg
    }

    /// Topmost region whose upper edge shares the destination of
    /// `reg`'s.
    pub(super) fn top_right_region(&self, reg: RegionId) -> RegionId {
        let dst = self.mesh.dst(self.regions[reg].e_up);
        let mut reg = reg;
        loop {
            reg = self.above(reg);
            if self.mesh.dst(self.regions[reg].e_up) != dst {
                return reg;
            }
        }
    }

    /// Insert a region for `e_new_up` right below `reg_above`. Winding
    /// and inside flag are left for the caller.
    pub(super) fn add_region_below(&mut self, reg_above: RegionId, e_new_up: EdgeId) -> RegionId {
        let reg = self.regions.insert(ActiveRegion::new(e_new_up));
        let hint = self.regions[reg_above].node_up;
        let (mesh, regions, event) = (&*self.mesh, &self.regions, self.event);
        let node = self.dict.insert_before(hint, reg, |a, b| {
            edge_leq(mesh, event, regions[a].e_up, regions[b].e_up)
        });
        self.regions[reg].node_up = node;
        self.mesh.set_active_region(e_new_up, Some(reg));
        reg
    }

    pub(super) fn compute_winding(&mut self, reg: RegionId) {
        let above = self.above(reg);
        let winding = self.regions[above].winding_number + self.mesh.winding(self.regions[reg].e_up);
        let region = &mut self.regions[reg];
        region.winding_number = winding;
        region.inside = self.rule.is_inside(winding);
    }

    /// `reg` is closed by the current event: record its inside flag on
    /// the face and delete it.
    pub(super) fn finish_region(&mut self, reg: RegionId) {
        let e = self.regions[reg].e_up;
        let inside = self.regions[reg].inside;
        let f = self
            .mesh
            .lface(e)
            .expect("sweep: region edge without a face");
        let face = self.mesh.face_mut(f);
        face.inside = inside;
        face.an_edge = e;
        self.delete_region(reg);
    }

    /// Finish the regions from `reg_first` down to (not including)
    /// `reg_last`, or down to the first region whose upper edge does not
    /// start at the event. The left-going edges at the event are linked
    /// in dictionary order as a side effect.
    ///
    /// Returns the lowest left-going edge.
    pub(super) fn finish_left_regions(
        &mut self,
        reg_first: RegionId,
        reg_last: Option<RegionId>,
    ) -> EdgeId {
        let mut reg_prev = reg_first;
        let mut e_prev = self.regions[reg_first].e_up;
        while Some(reg_prev) != reg_last {
            self.regions[reg_prev].fix_upper_edge = false;
            let reg = self.below(reg_prev);
            let mut e = self.regions[reg].e_up;

            if self.mesh.org(e) != self.mesh.org(e_prev) {
                if !self.regions[reg].fix_upper_edge {
                    // No more left-going edges in the dictionary, but
                    // the mesh may have others: finish rather than just
                    // delete.
                    self.finish_region(reg_prev);
                    break;
                }
                // Replace the temporary edge below by a real one.
                let org = self.mesh.lprev(e_prev);
                e = self.mesh.connect(org, e.sym());
                self.fix_upper_edge(reg, e);
            }

            if self.mesh.onext(e_prev) != e {
                let oprev = self.mesh.oprev(e);
                self.mesh.splice(oprev, e);
                self.mesh.splice(e_prev, e);
            }
            // May change the upper edge of `reg`.
            self.finish_region(reg_prev);
            e_prev = self.regions[reg].e_up;
            reg_prev = reg;
        }
        e_prev
    }

    /// Add regions for the right-going edges `e_first..e_last` (in
    /// `onext` order) at the event, below `reg_up`, and compute their
    /// windings.
    ///
    /// `e_top_left` is the edge just above the new ones, if known. With
    /// `clean_up`, the dirty regions are processed before returning.
    pub(super) fn add_right_edges(
        &mut self,
        reg_up: RegionId,
        e_first: EdgeId,
        e_last: EdgeId,
        e_top_left: Option<EdgeId>,
        clean_up: bool,
    ) {
        let mut e = e_first;
        loop {
            debug_assert!(self.mesh.edge_goes_right(e));
            self.add_region_below(reg_up, e.sym());
            e = self.mesh.onext(e);
            if e == e_last {
                break;
            }
        }

        let e_top_left = match e_top_left {
            Some(e) => e,
            None => {
                let below = self.below(reg_up);
                self.mesh.rprev(self.regions[below].e_up)
            }
        };

        let mut reg_prev = reg_up;
        let mut e_prev = e_top_left;
        let mut first_time = true;
        let mut reg;
        loop {
            reg = self.below(reg_prev);
            e = self.regions[reg].e_up.sym();
            if self.mesh.org(e) != self.mesh.org(e_prev) {
                break;
            }

            if self.mesh.onext(e) != e_prev {
                // Relink `e` right below `e_prev`.
                let oprev = self.mesh.oprev(e);
                self.mesh.splice(oprev, e);
                let oprev = self.mesh.oprev(e_prev);
                self.mesh.splice(oprev, e);
            }

            let winding = self.regions[reg_prev].winding_number - self.mesh.winding(e);
            self.regions[reg].winding_number = winding;
            self.regions[reg].inside = self.rule.is_inside(winding);

            // Two edges leaving with the same slope are merged before
            // any intersection test.
            self.regions[reg_prev].dirty = true;
            if !first_time && self.check_for_right_splice(reg_prev) {
                self.mesh.add_winding(e, e_prev);
                self.delete_region(reg_prev);
                self.mesh.delete(e_prev);
            }
            first_time = false;
            reg_prev = reg;
            e_prev = e;
        }

        self.regions[reg_prev].dirty = true;
        debug_assert_eq!(
            self.regions[reg_prev].winding_number - self.mesh.winding(e),
            self.regions[reg].winding_number
        );

        if clean_up {
            self.walk_dirty_regions(reg_prev);
        }
    }
}
