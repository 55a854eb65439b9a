//! Triangulation of monotone faces.
//!
//! After the sweep, every face is monotone in `s`: its boundary splits
//! at the leftmost and rightmost vertices into an upper and a lower
//! chain, each running left to right. Such a face is triangulated in
//! linear time by walking both chains from the right and cutting off
//! triangles greedily, as in the classic stack-based algorithm but
//! without the stack: the loop itself holds the pending vertices.
use geo::GeoFloat;

use crate::{
    geom::{edge_sign, vert_leq},
    mesh::{FaceId, Mesh},
};

/// Triangulate the monotone face `face` by adding diagonals.
///
/// The face must have at least three edges. The new faces inherit its
/// `inside` flag.
pub(crate) fn tessellate_mono_region<T: GeoFloat>(mesh: &mut Mesh<T>, face: FaceId) {
    let mut up = mesh.face(face).an_edge();
    debug_assert!(mesh.lnext(up) != up && mesh.lnext(mesh.lnext(up)) != up);

    // Rotate `up` to start at the rightmost vertex, so that `up` runs
    // along the upper chain and `lo` along the lower one.
    while vert_leq(mesh.dst_point(up), mesh.org_point(up)) {
        up = mesh.lprev(up);
    }
    while vert_leq(mesh.org_point(up), mesh.dst_point(up)) {
        up = mesh.lnext(up);
    }
    let mut lo = mesh.lprev(up);

    while mesh.lnext(up) != lo {
        if vert_leq(mesh.dst_point(up), mesh.org_point(lo)) {
            // up.dst is on the left: fan from lo.org. Edges going left
            // guarantee progress even if some triangles come out
            // clockwise.
            while mesh.lnext(lo) != up
                && (mesh.edge_goes_left(mesh.lnext(lo))
                    || edge_sign(
                        mesh.org_point(lo),
                        mesh.dst_point(lo),
                        mesh.dst_point(mesh.lnext(lo)),
                    ) <= T::zero())
            {
                let next = mesh.lnext(lo);
                lo = mesh.connect(next, lo).sym();
            }
            lo = mesh.lprev(lo);
        } else {
            // lo.org is on the left: fan from up.dst.
            while mesh.lnext(lo) != up
                && (mesh.edge_goes_right(mesh.lprev(up))
                    || edge_sign(
                        mesh.dst_point(up),
                        mesh.org_point(up),
                        mesh.org_point(mesh.lprev(up)),
                    ) >= T::zero())
            {
                let prev = mesh.lprev(up);
                up = mesh.connect(up, prev).sym();
            }
            up = mesh.lnext(up);
        }
    }

    // What is left is a fan around the leftmost vertex, lo.org.
    debug_assert!(mesh.lnext(lo) != up);
    while mesh.lnext(mesh.lnext(lo)) != up {
        let next = mesh.lnext(lo);
        lo = mesh.connect(next, lo).sym();
    }
}

/// Triangulate every face marked inside.
pub(crate) fn tessellate_interior<T: GeoFloat>(mesh: &mut Mesh<T>) {
    for f in mesh.face_ids() {
        // Faces created here are triangles already and are not in the
        // snapshot.
        if mesh.contains_face(f) && mesh.face(f).inside() {
            tessellate_mono_region(mesh, f);
        }
    }
}
