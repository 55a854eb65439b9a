//! Serialising the classified mesh.
use geo::{Coordinate, GeoFloat, LineString, Polygon, Triangle};
use log::debug;
use std::{collections::HashMap, ops::Range};

use super::{ElementType, TessOptions};
use crate::mesh::{FaceId, Mesh, VertexId};

/// Index marking an unused polygon slot or a missing neighbour.
pub const UNDEF: usize = usize::MAX;

/// A vertex of the output: its position and, when the input vertex (or
/// the combine callback) provided one, its payload.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputVertex<T, D = ()> {
    pub position: [T; 3],
    pub data: Option<D>,
}

impl<T: GeoFloat, D> OutputVertex<T, D> {
    /// The x/y components of the position.
    #[must_use]
    pub fn coord(&self) -> Coordinate<T> {
        Coordinate {
            x: self.position[0],
            y: self.position[1],
        }
    }
}

/// Result of [`Tessellator::tessellate`](crate::Tessellator::tessellate).
///
/// For polygon element types, `elements` holds `poly_size` vertex
/// indices per polygon, padded with [`UNDEF`]; with
/// [`ElementType::ConnectedPolygons`], `neighbors` has the same layout
/// and gives the polygon across each edge (edge `i` runs from vertex `i`
/// to vertex `i + 1`). For [`ElementType::BoundaryContours`], `elements`
/// holds a `(start, count)` pair per contour, indexing a run of
/// `vertices`.
#[derive(Debug, Clone)]
pub struct Tessellation<T: GeoFloat, D = ()> {
    vertices: Vec<OutputVertex<T, D>>,
    elements: Vec<usize>,
    neighbors: Option<Vec<usize>>,
    element_type: ElementType,
    poly_size: usize,
    normal: [T; 3],
}

impl<T: GeoFloat, D> Tessellation<T, D> {
    pub(crate) fn empty(options: &TessOptions<T>) -> Self {
        Tessellation {
            vertices: vec![],
            elements: vec![],
            neighbors: match options.element_type {
                ElementType::ConnectedPolygons => Some(vec![]),
                _ => None,
            },
            element_type: options.element_type,
            poly_size: options.poly_size.max(3),
            normal: [T::zero(), T::zero(), T::one()],
        }
    }

    pub fn vertices(&self) -> &[OutputVertex<T, D>] {
        &self.vertices
    }

    pub fn elements(&self) -> &[usize] {
        &self.elements
    }

    pub fn neighbors(&self) -> Option<&[usize]> {
        self.neighbors.as_deref()
    }

    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    pub fn poly_size(&self) -> usize {
        self.poly_size
    }

    /// Unit normal of the projection plane. Polygons and contours wind
    /// counter-clockwise around it.
    pub fn normal(&self) -> [T; 3] {
        self.normal
    }

    /// Number of polygons or contours.
    #[must_use]
    pub fn element_count(&self) -> usize {
        match self.element_type {
            ElementType::BoundaryContours => self.elements.len() / 2,
            _ => self.elements.len() / self.poly_size,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Vertex indices of each polygon, without the padding. Empty for
    /// boundary contours.
    pub fn polygon_indices(&self) -> impl Iterator<Item = &[usize]> + '_ {
        let elements: &[usize] = match self.element_type {
            ElementType::BoundaryContours => &[],
            _ => &self.elements,
        };
        elements.chunks(self.poly_size).map(trim_undef)
    }

    /// Vertex range of each boundary contour. Empty for polygons.
    pub fn contour_ranges(&self) -> impl Iterator<Item = Range<usize>> + '_ {
        let elements: &[usize] = match self.element_type {
            ElementType::BoundaryContours => &self.elements,
            _ => &[],
        };
        elements
            .chunks(2)
            .map(|pair| pair[0]..pair[0] + pair[1])
    }

    /// The triangles of the output, in the x/y plane.
    pub fn triangles(&self) -> impl Iterator<Item = Triangle<T>> + '_ {
        self.polygon_indices()
            .filter(|poly| poly.len() == 3)
            .map(move |poly| {
                let c = |i: usize| self.vertices[poly[i]].coord();
                Triangle(c(0), c(1), c(2))
            })
    }

    /// The output polygons, in the x/y plane.
    pub fn polygons(&self) -> impl Iterator<Item = Polygon<T>> + '_ {
        self.polygon_indices().map(move |poly| {
            let ring: Vec<_> = poly.iter().map(|&i| self.vertices[i].coord()).collect();
            Polygon::new(LineString::from(ring), vec![])
        })
    }

    /// The boundary contours as closed rings, in the x/y plane.
    pub fn contours(&self) -> impl Iterator<Item = LineString<T>> + '_ {
        self.contour_ranges().map(move |range| {
            let mut ring: Vec<_> = self.vertices[range].iter().map(OutputVertex::coord).collect();
            if let Some(&first) = ring.first() {
                ring.push(first);
            }
            LineString::from(ring)
        })
    }
}

fn trim_undef(poly: &[usize]) -> &[usize] {
    let len = poly.iter().position(|&i| i == UNDEF).unwrap_or(poly.len());
    &poly[..len]
}

/// Delete every face not marked inside, with the edges and vertices
/// they alone use.
pub(crate) fn discard_exterior<T: GeoFloat>(mesh: &mut Mesh<T>) {
    for f in mesh.face_ids() {
        if mesh.contains_face(f) && !mesh.face(f).inside() {
            mesh.zap_face(f);
        }
    }
}

/// Give boundary edges winding `value` (with the inside on their left)
/// and clear the others, deleting them with `keep_only_boundary`.
pub(crate) fn set_winding_number<T: GeoFloat>(mesh: &mut Mesh<T>, value: i32, keep_only_boundary: bool) {
    let inside = |mesh: &Mesh<T>, f: Option<FaceId>| f.map_or(false, |f| mesh.face(f).inside());
    for e in mesh.edge_ids() {
        let l_inside = inside(mesh, mesh.lface(e));
        let r_inside = inside(mesh, mesh.rface(e));
        if l_inside != r_inside {
            let w = if l_inside { value } else { -value };
            mesh.set_winding(e, w);
            mesh.set_winding(e.sym(), -w);
        } else if !keep_only_boundary {
            mesh.set_winding(e, 0);
            mesh.set_winding(e.sym(), 0);
        } else {
            mesh.delete(e);
        }
    }
}

/// The inside faces selected for output, in mesh order.
fn output_faces<T: GeoFloat>(mesh: &Mesh<T>, no_empty_polygons: bool) -> Vec<FaceId> {
    mesh.faces()
        .filter(|(_, face)| face.inside())
        .filter(|&(f, _)| !no_empty_polygons || mesh.face_area(f).abs() >= T::min_positive_value())
        .map(|(f, _)| f)
        .collect()
}

fn output_vertex<T: GeoFloat, D: Clone>(mesh: &Mesh<T>, payloads: &[D], v: VertexId) -> OutputVertex<T, D> {
    let vertex = mesh.vertex(v);
    OutputVertex {
        position: vertex.coords(),
        data: vertex.data().map(|i| payloads[i].clone()),
    }
}

/// Emit the inside faces as polygons, merging triangles into convex
/// polygons first when `poly_size` allows.
pub(crate) fn output_polymesh<T: GeoFloat, D: Clone>(
    mesh: &mut Mesh<T>,
    payloads: &[D],
    options: &TessOptions<T>,
    normal: [T; 3],
) -> Tessellation<T, D> {
    let poly_size = options.poly_size.max(3);
    if poly_size > 3 {
        mesh.merge_convex_faces(poly_size);
    }
    let mesh = &*mesh;

    let faces = output_faces(mesh, options.no_empty_polygons);
    let face_index: HashMap<FaceId, usize> =
        faces.iter().enumerate().map(|(i, &f)| (f, i)).collect();

    let mut vertex_index: HashMap<VertexId, usize> = HashMap::new();
    let mut vertices = vec![];
    let mut elements = Vec::with_capacity(faces.len() * poly_size);
    let mut neighbors = match options.element_type {
        ElementType::ConnectedPolygons => Some(Vec::with_capacity(faces.len() * poly_size)),
        _ => None,
    };

    for &f in &faces {
        let an_edge = mesh.face(f).an_edge();
        let start = elements.len();
        for e in mesh.face_loop(an_edge) {
            let v = mesh.org(e);
            let index = *vertex_index.entry(v).or_insert_with(|| {
                vertices.push(output_vertex(mesh, payloads, v));
                vertices.len() - 1
            });
            elements.push(index);

            if let Some(neighbors) = neighbors.as_mut() {
                let across = mesh
                    .rface(e)
                    .and_then(|f| face_index.get(&f).copied())
                    .unwrap_or(UNDEF);
                neighbors.push(across);
            }
        }
        let count = elements.len() - start;
        debug_assert!(count <= poly_size);
        elements.resize(start + poly_size, UNDEF);
        if let Some(neighbors) = neighbors.as_mut() {
            neighbors.resize(start + poly_size, UNDEF);
        }
    }

    debug!(
        "output: {} polygons, {} vertices",
        faces.len(),
        vertices.len()
    );
    Tessellation {
        vertices,
        elements,
        neighbors,
        element_type: options.element_type,
        poly_size,
        normal,
    }
}

/// Emit the loops of the inside faces as `(start, count)` runs of
/// vertices.
pub(crate) fn output_contours<T: GeoFloat, D: Clone>(
    mesh: &Mesh<T>,
    payloads: &[D],
    options: &TessOptions<T>,
    normal: [T; 3],
) -> Tessellation<T, D> {
    let mut vertices = vec![];
    let mut elements = vec![];
    for (_, face) in mesh.faces().filter(|(_, face)| face.inside()) {
        let start = vertices.len();
        vertices.extend(
            mesh.face_loop(face.an_edge())
                .map(|e| output_vertex(mesh, payloads, mesh.org(e))),
        );
        elements.push(start);
        elements.push(vertices.len() - start);
    }

    debug!(
        "output: {} contours, {} vertices",
        elements.len() / 2,
        vertices.len()
    );
    Tessellation {
        vertices,
        elements,
        neighbors: None,
        element_type: ElementType::BoundaryContours,
        poly_size: options.poly_size.max(3),
        normal,
    }
}
