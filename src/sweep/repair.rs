//! Restoring the dictionary invariants after the mesh changes: edge
//! ordering at shared endpoints, and intersections between neighbours.
use geo::GeoFloat;
use log::trace;

use super::{IntersectHook, RegionId, Sweep};
use crate::{
    geom::{edge_intersect, edge_sign, vert_eq, vert_l1_dist, vert_leq, SweepPoint},
    mesh::{EdgeId, VertexId},
};

impl<'a, T: GeoFloat, H: IntersectHook<T>> Sweep<'a, T, H> {
    fn mark_dirty(&mut self, regs: &[RegionId]) {
        for &reg in regs {
            self.regions[reg].dirty = true;
        }
    }

    /// Take `v` out of the event queue. The vertex must still be queued.
    fn dequeue(&mut self, v: VertexId) {
        let handle = self.mesh.vertex_mut(v).queue_handle.take();
        debug_assert!(handle.is_some(), "dequeue: vertex {v:?} is not queued");
        if let Some(handle) = handle {
            self.queue.remove(handle);
        }
    }

    /// Check the ordering of the upper edges of `reg_up` and the region
    /// below at their origins, which lie right of the sweep line, and
    /// splice one origin into the other edge if they are out of order.
    ///
    /// Returns whether the mesh changed.
    pub(super) fn check_for_right_splice(&mut self, reg_up: RegionId) -> bool {
        let reg_lo = self.below(reg_up);
        let e_up = self.regions[reg_up].e_up;
        let e_lo = self.regions[reg_lo].e_up;
        let (org_up, org_lo) = (self.mesh.org_point(e_up), self.mesh.org_point(e_lo));

        if vert_leq(org_up, org_lo) {
            if edge_sign(self.mesh.dst_point(e_lo), org_up, org_lo) > T::zero() {
                return false;
            }
            // The origin of `e_up` is below `e_lo`.
            if !vert_eq(org_up, org_lo) {
                self.mesh.split_edge(e_lo.sym());
                let oprev = self.mesh.oprev(e_lo);
                self.mesh.splice(e_up, oprev);
                self.mark_dirty(&[reg_up, reg_lo]);
            } else if self.mesh.org(e_up) != self.mesh.org(e_lo) {
                // Same position: merge the two, dropping e_up's origin.
                let org = self.mesh.org(e_up);
                self.dequeue(org);
                let oprev = self.mesh.oprev(e_lo);
                self.splice_merge_vertices(oprev, e_up);
            }
        } else {
            if edge_sign(self.mesh.dst_point(e_up), org_lo, org_up) < T::zero() {
                return false;
            }
            // The origin of `e_lo` is above `e_up`.
            let above = self.above(reg_up);
            self.mark_dirty(&[above, reg_up]);
            self.mesh.split_edge(e_up.sym());
            let oprev = self.mesh.oprev(e_lo);
            self.mesh.splice(oprev, e_up);
        }
        true
    }

    /// Like [`check_for_right_splice`](Self::check_for_right_splice), at
    /// the destinations, which lie left of the sweep line.
    pub(super) fn check_for_left_splice(&mut self, reg_up: RegionId) -> bool {
        let reg_lo = self.below(reg_up);
        let e_up = self.regions[reg_up].e_up;
        let e_lo = self.regions[reg_lo].e_up;
        let (dst_up, dst_lo) = (self.mesh.dst_point(e_up), self.mesh.dst_point(e_lo));
        debug_assert!(!vert_eq(dst_up, dst_lo));

        if vert_leq(dst_up, dst_lo) {
            if edge_sign(dst_up, dst_lo, self.mesh.org_point(e_up)) < T::zero() {
                return false;
            }
            // The destination of `e_lo` is above `e_up`.
            let above = self.above(reg_up);
            self.mark_dirty(&[above, reg_up]);
            let e = self.mesh.split_edge(e_up);
            self.mesh.splice(e_lo.sym(), e);
            let f = self.mesh.lface(e).expect("sweep: split edge without a face");
            self.mesh.face_mut(f).inside = self.regions[reg_up].inside;
        } else {
            if edge_sign(dst_lo, dst_up, self.mesh.org_point(e_lo)) > T::zero() {
                return false;
            }
            // The destination of `e_up` is below `e_lo`.
            self.mark_dirty(&[reg_up, reg_lo]);
            let e = self.mesh.split_edge(e_lo);
            let lnext = self.mesh.lnext(e_up);
            self.mesh.splice(lnext, e_lo.sym());
            let f = self.mesh.rface(e).expect("sweep: split edge without a face");
            self.mesh.face_mut(f).inside = self.regions[reg_up].inside;
        }
        true
    }

    /// Contribution of the endpoints of an edge `org → dst` to a vertex
    /// at `isect` on it: half of the weight, split by inverse L1
    /// distance. Accumulates the weighted coordinates into `coords`.
    fn vertex_weights(
        &self,
        isect: SweepPoint<T>,
        org: VertexId,
        dst: VertexId,
        coords: &mut [T; 3],
    ) -> (T, T) {
        let (org, dst) = (self.mesh.vertex(org), self.mesh.vertex(dst));
        let t1 = vert_l1_dist(org.point(), isect);
        let t2 = vert_l1_dist(dst.point(), isect);
        let half = T::one() / (T::one() + T::one());
        let w0 = half * t2 / (t1 + t2);
        let w1 = half * t1 / (t1 + t2);
        for (c, (o, d)) in coords
            .iter_mut()
            .zip(org.coords().iter().zip(dst.coords().iter()))
        {
            *c = *c + w0 * *o + w1 * *d;
        }
        (w0, w1)
    }

    /// Fill in the coordinates and payload of the vertex created where
    /// `org_up → dst_up` crosses `org_lo → dst_lo`.
    fn get_intersect_data(
        &mut self,
        isect: VertexId,
        org_up: VertexId,
        dst_up: VertexId,
        org_lo: VertexId,
        dst_lo: VertexId,
    ) {
        let at = self.mesh.point(isect);
        let mut coords = [T::zero(); 3];
        let (w0, w1) = self.vertex_weights(at, org_up, dst_up, &mut coords);
        let (w2, w3) = self.vertex_weights(at, org_lo, dst_lo, &mut coords);
        self.mesh.set_coords(isect, coords);

        let sources = [org_up, dst_up, org_lo, dst_lo].map(|v| self.mesh.vertex(v).data());
        let data = self.hook.intersect(coords, sources, [w0, w1, w2, w3]);
        self.mesh.set_data(isect, data);
        trace!("intersection {isect:?} at {at:?}");
    }

    /// Check the upper edges of `reg_up` and the region below for an
    /// intersection right of the sweep line, and split both at it.
    ///
    /// Returns `true` when the regions were reprocessed here, in which
    /// case the caller has nothing left to do.
    pub(super) fn check_for_intersect(&mut self, reg_up: RegionId) -> bool {
        let mut reg_up = reg_up;
        let mut reg_lo = self.below(reg_up);
        let e_up = self.regions[reg_up].e_up;
        let mut e_lo = self.regions[reg_lo].e_up;
        let (org_up, dst_up) = (self.mesh.org(e_up), self.mesh.dst(e_up));
        let (org_lo, dst_lo) = (self.mesh.org(e_lo), self.mesh.dst(e_lo));
        let (p_org_up, p_dst_up) = (self.mesh.point(org_up), self.mesh.point(dst_up));
        let (p_org_lo, p_dst_lo) = (self.mesh.point(org_lo), self.mesh.point(dst_lo));
        let event = self.event;
        let ev = self.mesh.point(event);

        debug_assert!(org_up != event && org_lo != event);
        debug_assert!(!self.regions[reg_up].fix_upper_edge && !self.regions[reg_lo].fix_upper_edge);

        if org_up == org_lo {
            // Same right endpoint.
            return false;
        }

        let t_min_up = p_org_up.t().min(p_dst_up.t());
        let t_max_lo = p_org_lo.t().max(p_dst_lo.t());
        if t_min_up > t_max_lo {
            return false;
        }

        if vert_leq(p_org_up, p_org_lo) {
            if edge_sign(p_dst_lo, p_org_up, p_org_lo) > T::zero() {
                return false;
            }
        } else if edge_sign(p_dst_up, p_org_lo, p_org_up) < T::zero() {
            return false;
        }

        // The edges intersect, at least marginally.
        let mut isect = edge_intersect(p_dst_up, p_org_up, p_dst_lo, p_org_lo);
        if vert_leq(isect, ev) {
            // Numerically left of the sweep line: move it onto the event.
            isect = ev;
        }
        let org_min = if vert_leq(p_org_up, p_org_lo) {
            p_org_up
        } else {
            p_org_lo
        };
        if vert_leq(org_min, isect) {
            // Past the leftmost right endpoint: snap to it.
            isect = org_min;
        }

        if vert_eq(isect, p_org_up) || vert_eq(isect, p_org_lo) {
            // At one of the right endpoints.
            self.check_for_right_splice(reg_up);
            return false;
        }

        if (!vert_eq(p_dst_up, ev) && edge_sign(p_dst_up, ev, isect) >= T::zero())
            || (!vert_eq(p_dst_lo, ev) && edge_sign(p_dst_lo, ev, isect) <= T::zero())
        {
            // Rounding put one of the new edges on the wrong side of the
            // event, or through it.
            if dst_lo == event {
                // Splice the event into e_up and redo the regions.
                self.mesh.split_edge(e_up.sym());
                self.mesh.splice(e_lo.sym(), e_up);
                reg_up = self.top_left_region(reg_up);
                let below = self.below(reg_up);
                let e_up = self.regions[below].e_up;
                self.finish_left_regions(below, Some(reg_lo));
                let e_first = self.mesh.oprev(e_up);
                self.add_right_edges(reg_up, e_first, e_up, Some(e_up), true);
                return true;
            }
            if dst_up == event {
                // Splice the event into e_lo and redo the regions.
                self.mesh.split_edge(e_lo.sym());
                let lnext = self.mesh.lnext(e_up);
                let oprev = self.mesh.oprev(e_lo);
                self.mesh.splice(lnext, oprev);
                reg_lo = reg_up;
                reg_up = self.top_right_region(reg_up);
                let below = self.below(reg_up);
                let e = self.mesh.rprev(self.regions[below].e_up);
                self.regions[reg_lo].e_up = self.mesh.oprev(e_lo);
                e_lo = self.finish_left_regions(reg_lo, None);
                let (e_first, e_last) = (self.mesh.onext(e_lo), self.mesh.rprev(e_up));
                self.add_right_edges(reg_up, e_first, e_last, Some(e), true);
                return true;
            }

            // Split the offending edge at the event; the caller splices
            // it in.
            let coords = self.mesh.vertex(event).coords();
            if edge_sign(p_dst_up, ev, isect) >= T::zero() {
                let above = self.above(reg_up);
                self.mark_dirty(&[above, reg_up]);
                self.mesh.split_edge(e_up.sym());
                let v = self.mesh.org(e_up);
                self.mesh.set_point(v, ev);
                self.mesh.set_coords(v, coords);
            }
            if edge_sign(p_dst_lo, ev, isect) <= T::zero() {
                self.mark_dirty(&[reg_up, reg_lo]);
                self.mesh.split_edge(e_lo.sym());
                let v = self.mesh.org(e_lo);
                self.mesh.set_point(v, ev);
                self.mesh.set_coords(v, coords);
            }
            return false;
        }

        // General case: split both edges and join them at a new vertex.
        // The splice order keeps the work proportional to the (smaller)
        // processed faces.
        self.mesh.split_edge(e_up.sym());
        self.mesh.split_edge(e_lo.sym());
        let oprev = self.mesh.oprev(e_lo);
        self.mesh.splice(oprev, e_up);

        let v = self.mesh.org(e_up);
        self.mesh.set_point(v, isect);
        let handle = self.queue.insert(isect, v);
        self.mesh.vertex_mut(v).queue_handle = Some(handle);
        self.get_intersect_data(v, org_up, dst_up, org_lo, dst_lo);

        let above = self.above(reg_up);
        self.mark_dirty(&[above, reg_up, reg_lo]);
        false
    }

    /// Process the dirty regions from `reg_up` downwards and upwards
    /// until the dictionary is ordered and free of intersections.
    pub(super) fn walk_dirty_regions(&mut self, reg_up: RegionId) {
        let mut reg_up = reg_up;
        let mut reg_lo = self.below(reg_up);
        loop {
            // Find the lowest dirty region.
            while self.regions[reg_lo].dirty {
                reg_up = reg_lo;
                reg_lo = self.below(reg_lo);
            }
            if !self.regions[reg_up].dirty {
                reg_lo = reg_up;
                match self.region_above(reg_up) {
                    Some(reg) if self.regions[reg].dirty => reg_up = reg,
                    _ => return,
                }
            }
            self.regions[reg_up].dirty = false;
            let mut e_up = self.regions[reg_up].e_up;
            let mut e_lo = self.regions[reg_lo].e_up;

            if self.mesh.dst(e_up) != self.mesh.dst(e_lo) && self.check_for_left_splice(reg_up) {
                // A temporary edge that now has company is no longer
                // needed.
                if self.regions[reg_lo].fix_upper_edge {
                    self.delete_region(reg_lo);
                    self.mesh.delete(e_lo);
                    reg_lo = self.below(reg_up);
                    e_lo = self.regions[reg_lo].e_up;
                } else if self.regions[reg_up].fix_upper_edge {
                    self.delete_region(reg_up);
                    self.mesh.delete(e_up);
                    reg_up = self.above(reg_lo);
                    e_up = self.regions[reg_up].e_up;
                }
            }

            if self.mesh.org(e_up) != self.mesh.org(e_lo) {
                let (dst_up, dst_lo) = (self.mesh.dst(e_up), self.mesh.dst(e_lo));
                if dst_up != dst_lo
                    && !self.regions[reg_up].fix_upper_edge
                    && !self.regions[reg_lo].fix_upper_edge
                    && (dst_up == self.event || dst_lo == self.event)
                {
                    // The event lies between the two edges, so it can
                    // serve as a fallback intersection.
                    if self.check_for_intersect(reg_up) {
                        return;
                    }
                } else {
                    self.check_for_right_splice(reg_up);
                }
            }

            if self.mesh.org(e_up) == self.mesh.org(e_lo) && self.mesh.dst(e_up) == self.mesh.dst(e_lo) {
                // Two-edge loop: merge the edges.
                self.mesh.add_winding(e_lo, e_up);
                self.delete_region(reg_up);
                self.mesh.delete(e_up);
                reg_up = self.above(reg_lo);
            }
        }
    }

    /// The event has no right-going edges: link it to the mesh through
    /// a temporary edge, so that the face to its left is closed off
    /// properly.
    pub(super) fn connect_right_vertex(&mut self, reg_up: RegionId, e_bottom_left: EdgeId) {
        let mut reg_up = reg_up;
        let mut e_bottom_left = e_bottom_left;
        let mut e_top_left = self.mesh.onext(e_bottom_left);
        let reg_lo = self.below(reg_up);
        let e_up = self.regions[reg_up].e_up;
        let e_lo = self.regions[reg_lo].e_up;
        let mut degenerate = false;

        if self.mesh.dst(e_up) != self.mesh.dst(e_lo) && self.check_for_intersect(reg_up) {
            return;
        }

        // The upper or lower edge may now pass through the event.
        let ev = self.mesh.point(self.event);
        if vert_eq(self.mesh.org_point(e_up), ev) {
            let oprev = self.mesh.oprev(e_top_left);
            self.mesh.splice(oprev, e_up);
            reg_up = self.top_left_region(reg_up);
            let below = self.below(reg_up);
            e_top_left = self.regions[below].e_up;
            self.finish_left_regions(below, Some(reg_lo));
            degenerate = true;
        }
        if vert_eq(self.mesh.org_point(e_lo), ev) {
            let oprev = self.mesh.oprev(e_lo);
            self.mesh.splice(e_bottom_left, oprev);
            e_bottom_left = self.finish_left_regions(reg_lo, None);
            degenerate = true;
        }
        if degenerate {
            let e_first = self.mesh.onext(e_bottom_left);
            self.add_right_edges(reg_up, e_first, e_top_left, Some(e_top_left), true);
            return;
        }

        // Connect to the closer of the two origins with a temporary
        // edge.
        let target = if vert_leq(self.mesh.org_point(e_lo), self.mesh.org_point(e_up)) {
            self.mesh.oprev(e_lo)
        } else {
            e_up
        };
        let org = self.mesh.lprev(e_bottom_left);
        let e_new = self.mesh.connect(org, target);

        // No clean-up yet: the new edge is not marked temporary until
        // its region exists.
        let e_next = self.mesh.onext(e_new);
        self.add_right_edges(reg_up, e_new, e_next, Some(e_next), false);
        let reg = self
            .mesh
            .active_region(e_new.sym())
            .expect("sweep: temporary edge without a region");
        self.regions[reg].fix_upper_edge = true;
        self.walk_dirty_regions(reg_up);
    }
}
