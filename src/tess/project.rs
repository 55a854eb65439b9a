//! Choice of the projection plane.
use geo::GeoFloat;
use log::debug;

use crate::{geom::SweepPoint, mesh::Mesh};

/// Index of the component of largest magnitude.
fn long_axis<T: GeoFloat>(v: [T; 3]) -> usize {
    let mut i = 0;
    if v[1].abs() > v[0].abs() {
        i = 1;
    }
    if v[2].abs() > v[i].abs() {
        i = 2;
    }
    i
}

fn sub<T: GeoFloat>(a: [T; 3], b: [T; 3]) -> [T; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn cross<T: GeoFloat>(a: [T; 3], b: [T; 3]) -> [T; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn dot<T: GeoFloat>(a: [T; 3], b: [T; 3]) -> T {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// Estimate the plane of the input vertices.
///
/// Takes the two extreme vertices along the axis of largest extent and
/// the vertex forming the largest triangle with them. Collinear input
/// falls back to an axis orthogonal-ish to the line; a single point to
/// +Z.
pub(crate) fn compute_normal<T: GeoFloat>(mesh: &Mesh<T>) -> [T; 3] {
    let up = [T::zero(), T::zero(), T::one()];
    let mut coords = mesh.vertices().map(|(_, v)| v.coords());
    let first = match coords.next() {
        Some(c) => c,
        None => return up,
    };

    let (mut min_val, mut max_val) = (first, first);
    let (mut min_vert, mut max_vert) = ([first; 3], [first; 3]);
    for c in coords {
        for i in 0..3 {
            if c[i] < min_val[i] {
                min_val[i] = c[i];
                min_vert[i] = c;
            }
            if c[i] > max_val[i] {
                max_val[i] = c[i];
                max_vert[i] = c;
            }
        }
    }

    let mut i = 0;
    if max_val[1] - min_val[1] > max_val[0] - min_val[0] {
        i = 1;
    }
    if max_val[2] - min_val[2] > max_val[i] - min_val[i] {
        i = 2;
    }
    if min_val[i] >= max_val[i] {
        // All vertices coincide.
        return up;
    }

    let (v1, v2) = (min_vert[i], max_vert[i]);
    let d1 = sub(v1, v2);
    let mut norm = [T::zero(); 3];
    let mut max_len2 = T::zero();
    for (_, v) in mesh.vertices() {
        let n = cross(d1, sub(v.coords(), v2));
        let len2 = dot(n, n);
        if len2 > max_len2 {
            max_len2 = len2;
            norm = n;
        }
    }

    if max_len2 <= T::zero() {
        // Collinear: any plane containing the line will do.
        norm = [T::zero(); 3];
        norm[long_axis(d1)] = T::one();
    }
    norm
}

/// Flip the `t` axis if the contours wound positively have negative
/// total area. Returns whether it flipped.
pub(crate) fn check_orientation<T: GeoFloat>(mesh: &mut Mesh<T>) -> bool {
    let area = mesh
        .faces()
        .filter(|(_, f)| mesh.winding(f.an_edge()) > 0)
        .fold(T::zero(), |area, (f, _)| area + mesh.face_area(f));
    if area >= T::zero() {
        return false;
    }
    for v in mesh.vertex_ids() {
        let mut p = mesh.point(v);
        p.set_t(-p.t());
        mesh.set_point(v, p);
    }
    true
}

/// Project every vertex onto the plane orthogonal to `normal` (or to
/// the computed normal when it is `None` or zero).
///
/// Returns the unit normal of the final (s, t) frame: output polygons
/// wind counter-clockwise around it.
pub(crate) fn project_polygon<T: GeoFloat>(mesh: &mut Mesh<T>, normal: Option<[T; 3]>) -> [T; 3] {
    let zero = [T::zero(); 3];
    let (norm, computed) = match normal {
        Some(n) if n != zero => (n, false),
        _ => (compute_normal(mesh), true),
    };

    let i = long_axis(norm);
    let (j, k) = ((i + 1) % 3, (i + 2) % 3);
    let mut s_unit = zero;
    let mut t_unit = zero;
    s_unit[j] = T::one();
    t_unit[k] = if norm[i] > T::zero() { T::one() } else { -T::one() };

    for v in mesh.vertex_ids() {
        let c = mesh.vertex(v).coords();
        mesh.set_point(v, SweepPoint::new(dot(c, s_unit), dot(c, t_unit)));
    }

    if computed && check_orientation(mesh) {
        t_unit[k] = -t_unit[k];
    }
    let frame = cross(s_unit, t_unit);
    debug!("projection: normal {norm:?}, frame {frame:?}");
    frame
}
