//! The tessellator: contour input, the tessellation pipeline, and the
//! combine strategy for intersection vertices.
use geo::{Coordinate, GeoFloat, LineString, Polygon};
use itertools::Itertools;
use log::debug;

use crate::{
    error::TessError,
    mesh::{EdgeId, Mesh},
    monotone::tessellate_interior,
    sweep::{compute_interior, IntersectHook},
};

mod options;
pub use options::{ElementType, TessOptions, WindingRule};

mod output;
pub use output::{OutputVertex, Tessellation, UNDEF};

mod project;

#[cfg(test)]
mod cases;

/// Orientation imposed on a contour as it is added.
///
/// Orientations are taken in a y-up frame: counter-clockwise is positive
/// signed area in x/y, as for the exterior of a `geo::Polygon`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContourOrientation {
    /// Keep the input order.
    Original,
    /// Reverse the contour if its x/y signed area is positive.
    Clockwise,
    /// Reverse the contour if its x/y signed area is negative.
    CounterClockwise,
}

impl Default for ContourOrientation {
    fn default() -> Self {
        ContourOrientation::Original
    }
}

/// An input vertex with an optional payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ContourVertex<T, D = ()> {
    pub position: [T; 3],
    pub data: Option<D>,
}

impl<T: GeoFloat, D> ContourVertex<T, D> {
    pub fn new(position: [T; 3]) -> Self {
        ContourVertex {
            position,
            data: None,
        }
    }

    pub fn with_data(position: [T; 3], data: D) -> Self {
        ContourVertex {
            position,
            data: Some(data),
        }
    }
}

impl<T: GeoFloat, D> From<[T; 3]> for ContourVertex<T, D> {
    fn from(position: [T; 3]) -> Self {
        ContourVertex::new(position)
    }
}

impl<T: GeoFloat, D> From<[T; 2]> for ContourVertex<T, D> {
    fn from([x, y]: [T; 2]) -> Self {
        ContourVertex::new([x, y, T::zero()])
    }
}

impl<T: GeoFloat, D> From<(T, T)> for ContourVertex<T, D> {
    fn from((x, y): (T, T)) -> Self {
        ContourVertex::new([x, y, T::zero()])
    }
}

impl<T: GeoFloat, D> From<Coordinate<T>> for ContourVertex<T, D> {
    fn from(c: Coordinate<T>) -> Self {
        ContourVertex::new([c.x, c.y, T::zero()])
    }
}

/// Creates the payload of a vertex introduced where two edges cross.
///
/// Receives the new vertex's position, the payloads of the four
/// endpoints of the crossing edges (upper edge first) and their
/// weights. The weights are non-negative and sum to one; the position
/// is the weighted sum of the endpoints'.
///
/// Implemented for closures of the matching signature.
pub trait Combine<T, D> {
    fn combine(&mut self, position: [T; 3], data: [Option<&D>; 4], weights: [T; 4]) -> Option<D>;
}

impl<T, D, F> Combine<T, D> for F
where
    F: FnMut([T; 3], [Option<&D>; 4], [T; 4]) -> Option<D>,
{
    fn combine(&mut self, position: [T; 3], data: [Option<&D>; 4], weights: [T; 4]) -> Option<D> {
        self(position, data, weights)
    }
}

/// Intersection vertices get no payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCombine;

impl<T, D> Combine<T, D> for NoCombine {
    fn combine(&mut self, _: [T; 3], _: [Option<&D>; 4], _: [T; 4]) -> Option<D> {
        None
    }
}

/// Adapts a [`Combine`] to the payload indices stored in the mesh.
struct Combiner<'p, D, C> {
    payloads: &'p mut Vec<D>,
    combine: C,
}

impl<'p, T: GeoFloat, D, C: Combine<T, D>> IntersectHook<T> for Combiner<'p, D, C> {
    fn intersect(
        &mut self,
        position: [T; 3],
        sources: [Option<usize>; 4],
        weights: [T; 4],
    ) -> Option<usize> {
        let payloads = &*self.payloads;
        let data = sources.map(|i| i.map(|i| &payloads[i]));
        let new = self.combine.combine(position, data, weights)?;
        self.payloads.push(new);
        Some(self.payloads.len() - 1)
    }
}

/// Polygon tessellator.
///
/// Contours are accumulated with [`add_contour`](Self::add_contour)
/// (or the `geo` helpers) and consumed by one
/// [`tessellate`](Self::tessellate) call, after which the tessellator is
/// empty again.
///
/// ```rust
/// use geo_tessellate::{ContourOrientation, TessOptions, Tessellator};
///
/// let mut tess = Tessellator::<f64>::new();
/// tess.add_contour(
///     vec![[0., 0.], [1., 0.], [1., 1.], [0., 1.]],
///     ContourOrientation::Original,
/// ).unwrap();
/// let out = tess.tessellate(&TessOptions::default()).unwrap();
/// assert_eq!(out.element_count(), 2);
/// assert_eq!(out.vertices().len(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct Tessellator<T: GeoFloat, D = ()> {
    mesh: Mesh<T>,
    payloads: Vec<D>,
    contours: usize,
}

impl<T: GeoFloat, D> Default for Tessellator<T, D> {
    fn default() -> Self {
        Tessellator::new()
    }
}

impl<T: GeoFloat, D> Tessellator<T, D> {
    pub fn new() -> Self {
        Tessellator {
            mesh: Mesh::new(),
            payloads: vec![],
            contours: 0,
        }
    }

    /// Number of contours added since the last tessellation.
    #[must_use]
    pub fn contour_count(&self) -> usize {
        self.contours
    }

    /// Add a closed contour. The last vertex connects back to the first.
    ///
    /// Fails, without adding anything, if a coordinate is not finite.
    pub fn add_contour<I, V>(&mut self, vertices: I, orientation: ContourOrientation) -> Result<(), TessError>
    where
        I: IntoIterator<Item = V>,
        V: Into<ContourVertex<T, D>>,
    {
        let contour = self.contours;
        let mut vertices: Vec<ContourVertex<T, D>> = vertices.into_iter().map(Into::into).collect();
        if let Some(vertex) = vertices
            .iter()
            .position(|v| !v.position.iter().all(|c| c.is_finite()))
        {
            return Err(TessError::NonFiniteCoordinate { contour, vertex });
        }
        self.contours += 1;

        let reverse = match orientation {
            ContourOrientation::Original => false,
            ContourOrientation::Clockwise => signed_area(&vertices) > T::zero(),
            ContourOrientation::CounterClockwise => signed_area(&vertices) < T::zero(),
        };
        if reverse {
            vertices.reverse();
        }

        let mesh = &mut self.mesh;
        let mut e: Option<EdgeId> = None;
        for ContourVertex { position, data } in vertices {
            let cur = match e {
                None => {
                    // A single vertex with a self-loop edge.
                    let e = mesh.make_edge();
                    mesh.splice(e, e.sym());
                    e
                }
                Some(e) => {
                    // A new vertex and edge right after `e` on its left face.
                    mesh.split_edge(e);
                    mesh.lnext(e)
                }
            };

            let org = mesh.org(cur);
            mesh.set_coords(org, position);
            let data = data.map(|data| {
                self.payloads.push(data);
                self.payloads.len() - 1
            });
            mesh.set_data(org, data);

            // Crossing `cur` from right to left enters the contour: a
            // counter-clockwise contour adds one to the winding inside.
            mesh.set_winding(cur, 1);
            mesh.set_winding(cur.sym(), -1);
            e = Some(cur);
        }
        Ok(())
    }

    /// Add a `geo` polygon: the exterior counter-clockwise, the holes
    /// clockwise. The closing coordinate of each ring is dropped.
    pub fn add_polygon(&mut self, polygon: &Polygon<T>) -> Result<(), TessError> {
        self.add_line_string(polygon.exterior(), ContourOrientation::CounterClockwise)?;
        for hole in polygon.interiors() {
            self.add_line_string(hole, ContourOrientation::Clockwise)?;
        }
        Ok(())
    }

    /// Add a ring as a contour, dropping the closing coordinate if the
    /// ring is closed.
    pub fn add_line_string(&mut self, ring: &LineString<T>, orientation: ContourOrientation) -> Result<(), TessError> {
        let coords = &ring.0;
        let len = if coords.len() > 1 && ring.is_closed() {
            coords.len() - 1
        } else {
            coords.len()
        };
        self.add_contour(coords[..len].iter().copied(), orientation)
    }
}

impl<T: GeoFloat, D: Clone> Tessellator<T, D> {
    /// Tessellate the contours added so far.
    ///
    /// Intersection vertices get no payload; see
    /// [`tessellate_with`](Self::tessellate_with).
    pub fn tessellate(&mut self, options: &TessOptions<T>) -> Result<Tessellation<T, D>, TessError> {
        self.tessellate_with(options, NoCombine)
    }

    /// Tessellate the contours added so far, calling `combine` for every
    /// vertex created at an edge intersection.
    ///
    /// Whatever the outcome, the tessellator is empty afterwards.
    pub fn tessellate_with<C: Combine<T, D>>(
        &mut self,
        options: &TessOptions<T>,
        combine: C,
    ) -> Result<Tessellation<T, D>, TessError> {
        let mut mesh = std::mem::take(&mut self.mesh);
        let mut payloads = std::mem::take(&mut self.payloads);
        let contours = std::mem::replace(&mut self.contours, 0);

        if mesh.num_vertices() == 0 {
            return Ok(Tessellation::empty(options));
        }
        debug!(
            "tessellate: {contours} contours, {} vertices, {:?}",
            mesh.num_vertices(),
            options.winding_rule
        );

        let normal = project::project_polygon(&mut mesh, options.normal);

        let mut combiner = Combiner {
            payloads: &mut payloads,
            combine,
        };
        compute_interior(
            &mut mesh,
            options.winding_rule,
            &mut combiner,
            options.event_budget_factor,
        )?;

        match options.element_type {
            ElementType::BoundaryContours => output::set_winding_number(&mut mesh, 1, true),
            ElementType::Polygons | ElementType::ConnectedPolygons => {
                tessellate_interior(&mut mesh);
                output::discard_exterior(&mut mesh);
            }
        }

        if cfg!(debug_assertions) {
            mesh.check()?;
        }

        Ok(match options.element_type {
            ElementType::BoundaryContours => output::output_contours(&mesh, &payloads, options, normal),
            ElementType::Polygons | ElementType::ConnectedPolygons => {
                output::output_polymesh(&mut mesh, &payloads, options, normal)
            }
        })
    }
}

/// Signed area of the x/y projection of a contour; positive when
/// counter-clockwise.
fn signed_area<T: GeoFloat, D>(vertices: &[ContourVertex<T, D>]) -> T {
    let twice = vertices
        .iter()
        .circular_tuple_windows()
        .fold(T::zero(), |area, (v0, v1)| {
            area + v0.position[0] * v1.position[1] - v0.position[1] * v1.position[0]
        });
    twice / (T::one() + T::one())
}
