//! Sweep-line classification of the mesh faces.
//!
//! A vertical line sweeps the projected mesh from left to right (in
//! [`vert_leq`] order), stopping at every vertex and at every edge
//! intersection discovered along the way. The edges crossing the line
//! are kept bottom to top in a [`Dict`]; each gap between two
//! consecutive edges is an [`ActiveRegion`] carrying the winding number
//! of that part of the plane.
//!
//! When the sweep is over, every face of the mesh is monotone, all
//! intersections have been turned into vertices, and each face has its
//! `inside` flag set according to the winding rule.
use geo::GeoFloat;
use log::{debug, trace};

use crate::{
    dict::{Dict, NodeId},
    error::TessError,
    geom::{edge_sign, vert_eq, vert_leq, SweepPoint},
    mesh::{EdgeId, Mesh, VertexId},
    pool::{Key, Pool},
    queue::EventQueue,
    tess::WindingRule,
};

mod regions;
mod repair;

use regions::edge_leq;

pub(crate) type RegionId = Key;

/// The part of the plane between an edge crossing the sweep line and
/// the next edge below it.
#[derive(Debug, Clone)]
pub(crate) struct ActiveRegion {
    /// Upper edge, directed right to left.
    e_up: EdgeId,
    node_up: NodeId,
    winding_number: i32,
    inside: bool,
    /// One of the two bounding edges added before the sweep.
    sentinel: bool,
    /// The upper or lower edge changed since the last ordering check.
    dirty: bool,
    /// `e_up` is a temporary edge, to be replaced once a real edge
    /// shows up at its origin.
    fix_upper_edge: bool,
}

impl ActiveRegion {
    fn new(e_up: EdgeId) -> Self {
        ActiveRegion {
            e_up,
            node_up: NodeId::MAX,
            winding_number: 0,
            inside: false,
            sentinel: false,
            dirty: false,
            fix_upper_edge: false,
        }
    }
}

/// Receives every vertex created at an edge intersection.
///
/// `sources` holds the payload indices of the four endpoints (upper
/// edge origin and destination, then the lower edge's) and `weights`
/// their contribution to `position`. The returned index becomes the new
/// vertex's payload.
pub(crate) trait IntersectHook<T> {
    fn intersect(
        &mut self,
        position: [T; 3],
        sources: [Option<usize>; 4],
        weights: [T; 4],
    ) -> Option<usize>;
}

impl<T> IntersectHook<T> for () {
    fn intersect(&mut self, _: [T; 3], _: [Option<usize>; 4], _: [T; 4]) -> Option<usize> {
        None
    }
}

/// Run the sweep over `mesh`: remove degeneracies, split every edge at
/// its intersections, make every face monotone and mark the faces
/// inside `rule`.
///
/// Fails when more than `(vertices + 8) * budget_factor` events are
/// processed, or when the sweep reaches an inconsistent state.
pub(crate) fn compute_interior<T: GeoFloat, H: IntersectHook<T>>(
    mesh: &mut Mesh<T>,
    rule: WindingRule,
    hook: &mut H,
    budget_factor: usize,
) -> Result<(), TessError> {
    remove_degenerate_edges(mesh);
    let queue = init_priority_q(mesh);
    remove_degenerate_faces(mesh);

    let budget = (mesh.num_vertices() + 8).saturating_mul(budget_factor);
    debug!(
        "sweep: {} vertices, {} edges, budget {budget}",
        mesh.num_vertices(),
        mesh.num_edges()
    );

    let mut sweep = Sweep::new(mesh, rule, hook, queue, budget);
    sweep.run()?;
    sweep.done_edge_dict();
    let events = sweep.events;
    drop(sweep);

    remove_degenerate_faces(mesh);
    debug!(
        "sweep: done after {events} events, {} faces",
        mesh.num_faces()
    );
    Ok(())
}

pub(crate) struct Sweep<'a, T: GeoFloat, H> {
    mesh: &'a mut Mesh<T>,
    rule: WindingRule,
    hook: &'a mut H,
    regions: Pool<ActiveRegion>,
    dict: Dict<RegionId>,
    queue: EventQueue<T, VertexId>,
    /// The vertex being processed.
    event: VertexId,
    events: usize,
    budget: usize,
}

impl<'a, T: GeoFloat, H: IntersectHook<T>> Sweep<'a, T, H> {
    fn new(
        mesh: &'a mut Mesh<T>,
        rule: WindingRule,
        hook: &'a mut H,
        queue: EventQueue<T, VertexId>,
        budget: usize,
    ) -> Self {
        let mut sweep = Sweep {
            mesh,
            rule,
            hook,
            regions: Pool::new(),
            dict: Dict::new(),
            queue,
            event: VertexId(Key::DANGLING),
            events: 0,
            budget,
        };
        sweep.init_edge_dict();
        sweep
    }

    fn run(&mut self) -> Result<(), TessError> {
        while let Some(v) = self.queue.extract_min() {
            self.mesh.vertex_mut(v).queue_handle = None;

            // Coincident vertices are merged before any of them is
            // processed, so a vertex is never swept twice.
            while let Some(next) = self.queue.minimum() {
                if !vert_eq(self.mesh.point(next), self.mesh.point(v)) {
                    break;
                }
                self.queue.extract_min();
                self.mesh.vertex_mut(next).queue_handle = None;
                let (e1, e2) = (self.mesh.vertex(v).an_edge, self.mesh.vertex(next).an_edge);
                self.splice_merge_vertices(e1, e2);
            }
            self.sweep_event(v)?;
        }
        Ok(())
    }

    fn tick(&mut self) -> Result<(), TessError> {
        self.events += 1;
        if self.events > self.budget {
            return Err(TessError::EventBudgetExceeded {
                events: self.events,
                budget: self.budget,
            });
        }
        Ok(())
    }

    /// Process one vertex: close the regions ending here, then open
    /// regions for the edges leaving to the right.
    fn sweep_event(&mut self, v_event: VertexId) -> Result<(), TessError> {
        self.tick()?;
        self.event = v_event;
        trace!("sweep event {:?} at {:?}", v_event, self.mesh.point(v_event));

        // Find an edge already in the dictionary, if any.
        let an_edge = self.mesh.vertex(v_event).an_edge;
        let mut e = an_edge;
        let reg = loop {
            if let Some(reg) = self.mesh.active_region(e) {
                break reg;
            }
            e = self.mesh.onext(e);
            if e == an_edge {
                // Not incident to any processed edge.
                return self.connect_left_vertex(v_event);
            }
        };

        // Finish the regions closed by this vertex: these are all the
        // left-going edges.
        let reg_up = self.top_left_region(reg);
        let reg = self.below(reg_up);
        let e_top_left = self.regions[reg].e_up;
        let e_bottom_left = self.finish_left_regions(reg, None);

        if self.mesh.onext(e_bottom_left) == e_top_left {
            // No right-going edges: add a temporary edge.
            self.connect_right_vertex(reg_up, e_bottom_left);
        } else {
            let e_first = self.mesh.onext(e_bottom_left);
            self.add_right_edges(reg_up, e_first, e_top_left, Some(e_top_left), true);
        }
        Ok(())
    }

    /// The event vertex has no processed edges: find the region
    /// containing it and connect it to the rest of the mesh if needed.
    fn connect_left_vertex(&mut self, v_event: VertexId) -> Result<(), TessError> {
        let probe = self.mesh.vertex(v_event).an_edge.sym();
        let node = {
            let (mesh, regions, event) = (&*self.mesh, &self.regions, self.event);
            self.dict
                .find(|reg| edge_leq(mesh, event, probe, regions[reg].e_up))
        };
        let reg_up = self
            .dict
            .key(node)
            .ok_or(TessError::Topology("event above the top sentinel"))?;
        let reg_lo = match self.region_below(reg_up) {
            Some(reg) => reg,
            None => return Ok(()),
        };
        let e_up = self.regions[reg_up].e_up;
        let e_lo = self.regions[reg_lo].e_up;
        let ev = self.mesh.point(v_event);

        if edge_sign(self.mesh.dst_point(e_up), ev, self.mesh.org_point(e_up)) == T::zero() {
            return self.connect_left_degenerate(reg_up, v_event);
        }

        // Connect to the closer of the two destinations.
        let reg = if vert_leq(self.mesh.dst_point(e_lo), self.mesh.dst_point(e_up)) {
            reg_up
        } else {
            reg_lo
        };

        if self.regions[reg_up].inside || self.regions[reg].fix_upper_edge {
            let an_edge = self.mesh.vertex(v_event).an_edge;
            let e_new = if reg == reg_up {
                let dst = self.mesh.lnext(e_up);
                self.mesh.connect(an_edge.sym(), dst)
            } else {
                let org = self.mesh.dnext(e_lo);
                self.mesh.connect(org, an_edge).sym()
            };
            if self.regions[reg].fix_upper_edge {
                self.fix_upper_edge(reg, e_new);
            } else {
                let new_reg = self.add_region_below(reg_up, e_new);
                self.compute_winding(new_reg);
            }
            return self.sweep_event(v_event);
        }

        // Outside the polygon: no need to connect it to anything.
        let an_edge = self.mesh.vertex(v_event).an_edge;
        self.add_right_edges(reg_up, an_edge, an_edge, None, true);
        Ok(())
    }

    /// The event lies on the upper edge of its region.
    fn connect_left_degenerate(
        &mut self,
        reg_up: RegionId,
        v_event: VertexId,
    ) -> Result<(), TessError> {
        let e = self.regions[reg_up].e_up;
        let ev = self.mesh.point(v_event);
        if vert_eq(self.mesh.org_point(e), ev) {
            return Err(TessError::Topology(
                "vertices should have been merged",
            ));
        }
        if vert_eq(self.mesh.dst_point(e), ev) {
            return Err(TessError::Topology(
                "event coincides with a processed vertex",
            ));
        }

        // Splice the event into the edge passing through it.
        self.mesh.split_edge(e.sym());
        if self.regions[reg_up].fix_upper_edge {
            // Drop the unused part of the temporary edge.
            let unused = self.mesh.onext(e);
            self.mesh.delete(unused);
            self.regions[reg_up].fix_upper_edge = false;
        }
        let an_edge = self.mesh.vertex(v_event).an_edge;
        self.mesh.splice(an_edge, e);
        self.sweep_event(v_event)
    }

    /// Merge the origin of `e2` into the origin of `e1`.
    fn splice_merge_vertices(&mut self, e1: EdgeId, e2: EdgeId) {
        self.mesh.splice(e1, e2);
    }

    /// Add one sentinel edge spanning `[smin, smax]` at height `t`.
    fn add_sentinel(&mut self, smin: T, smax: T, t: T) {
        let e = self.mesh.make_edge();
        let (org, dst) = (self.mesh.org(e), self.mesh.dst(e));
        self.mesh.set_point(org, SweepPoint::new(smax, t));
        self.mesh.set_point(dst, SweepPoint::new(smin, t));
        self.event = dst;

        let reg = self.regions.insert(ActiveRegion {
            sentinel: true,
            ..ActiveRegion::new(e)
        });
        let (mesh, regions, event) = (&*self.mesh, &self.regions, self.event);
        let node = self
            .dict
            .insert(reg, |a, b| edge_leq(mesh, event, regions[a].e_up, regions[b].e_up));
        self.regions[reg].node_up = node;
        self.mesh.set_active_region(e, Some(reg));
    }

    /// Seed the dictionary with two sentinel edges, one below and one
    /// above everything, placed a bounding box away from the input.
    fn init_edge_dict(&mut self) {
        let mut bbox: Option<(SweepPoint<T>, SweepPoint<T>)> = None;
        for (_, v) in self.mesh.vertices() {
            let p = v.point();
            bbox = Some(match bbox {
                None => (p, p),
                Some((lo, hi)) => (
                    SweepPoint::new(lo.s().min(p.s()), lo.t().min(p.t())),
                    SweepPoint::new(hi.s().max(p.s()), hi.t().max(p.t())),
                ),
            });
        }
        let (lo, hi) = bbox.unwrap_or_else(|| {
            let origin = SweepPoint::new(T::zero(), T::zero());
            (origin, origin)
        });

        let w = (hi.s() - lo.s()) + T::one();
        let h = (hi.t() - lo.t()) + T::one();
        let (smin, smax) = (lo.s() - w, hi.s() + w);
        let (tmin, tmax) = (lo.t() - h, hi.t() + h);

        self.add_sentinel(smin, smax, tmin);
        self.add_sentinel(smin, smax, tmax);
    }

    /// Empty the dictionary. Only the sentinels and at most one
    /// temporary edge may be left.
    fn done_edge_dict(&mut self) {
        let mut fixed_edges = 0;
        while let Some(reg) = self.dict.min() {
            if !self.regions[reg].sentinel {
                debug_assert!(self.regions[reg].fix_upper_edge);
                fixed_edges += 1;
                debug_assert_eq!(fixed_edges, 1);
            }
            debug_assert_eq!(self.regions[reg].winding_number, 0);
            self.delete_region(reg);
        }
        trace!("sweep: {fixed_edges} temporary edges left at the end");
    }
}

/// Remove zero-length edges, and contours with fewer than three edges.
fn remove_degenerate_edges<T: GeoFloat>(mesh: &mut Mesh<T>) {
    let mut removed = 0;
    for e in mesh.edge_ids() {
        if !mesh.contains_edge(e) {
            continue;
        }
        let mut e = e;
        let mut e_lnext = mesh.lnext(e);

        if vert_eq(mesh.org_point(e), mesh.dst_point(e)) && mesh.lnext(e_lnext) != e {
            // Zero-length edge on a contour of at least three edges.
            mesh.splice(e_lnext, e);
            mesh.delete(e);
            removed += 1;
            e = e_lnext;
            e_lnext = mesh.lnext(e);
        }
        if mesh.lnext(e_lnext) == e {
            // Contour of one or two edges.
            if e_lnext != e {
                mesh.delete(e_lnext);
                removed += 1;
            }
            if mesh.contains_edge(e) {
                mesh.delete(e);
                removed += 1;
            }
        }
    }
    if removed > 0 {
        debug!("sweep: removed {removed} degenerate edges");
    }
}

/// Queue every vertex of the mesh.
fn init_priority_q<T: GeoFloat>(mesh: &mut Mesh<T>) -> EventQueue<T, VertexId> {
    let mut queue = EventQueue::with_capacity(mesh.num_vertices());
    for v in mesh.vertex_ids() {
        let handle = queue.insert(mesh.point(v), v);
        mesh.vertex_mut(v).queue_handle = Some(handle);
    }
    queue.init();
    queue
}

/// Delete faces bounded by just two edges, folding their winding into
/// the surviving edge.
fn remove_degenerate_faces<T: GeoFloat>(mesh: &mut Mesh<T>) {
    for f in mesh.face_ids() {
        if !mesh.contains_face(f) {
            continue;
        }
        let e = mesh.face(f).an_edge;
        debug_assert_ne!(mesh.lnext(e), e);
        if mesh.lnext(mesh.lnext(e)) == e {
            let onext = mesh.onext(e);
            mesh.add_winding(onext, e);
            mesh.delete(e);
        }
    }
}
