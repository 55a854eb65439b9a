//! Mesh builders shared by the unit tests.
use super::{EdgeId, Mesh};
use crate::geom::SweepPoint;

/// Add a closed loop through `pts` the way contours are added: each
/// point splits the previous edge, with winding +1 along the loop and
/// -1 against it. Returns the edge leaving the last point.
pub(crate) fn polygon(mesh: &mut Mesh<f64>, pts: &[[f64; 2]]) -> EdgeId {
    let pts: Vec<_> = pts.iter().map(|&[s, t]| [s, t, 0.]).collect();
    contour3(mesh, &pts)
}

/// Like [`polygon`], for 3D coordinates. Sweep points are set from x
/// and y.
pub(crate) fn contour3(mesh: &mut Mesh<f64>, pts: &[[f64; 3]]) -> EdgeId {
    let mut e: Option<EdgeId> = None;
    for &c in pts {
        let cur = match e {
            None => {
                let e = mesh.make_edge();
                mesh.splice(e, e.sym());
                e
            }
            Some(e) => {
                mesh.split_edge(e);
                mesh.lnext(e)
            }
        };
        let org = mesh.org(cur);
        mesh.set_point(org, SweepPoint::new(c[0], c[1]));
        mesh.set_coords(org, c);
        mesh.set_winding(cur, 1);
        mesh.set_winding(cur.sym(), -1);
        e = Some(cur);
    }
    e.expect("contour3: no points")
}
