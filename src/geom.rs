//! Predicates on projected (s, t) coordinates.
//!
//! The sweep runs left to right in the projection plane: a vertex `u`
//! precedes `v` when `u.s < v.s`, or when they share `s` and `u.t <=
//! v.t`. This ordering is implemented by [`SweepPoint`]'s `PartialOrd`
//! and determines the order in which events are processed.
//!
//! The `trans_*` family mirrors the plain family with the roles of `s`
//! and `t` swapped. They are expressed here by applying the plain
//! predicates to [`SweepPoint::transposed`] points.
use geo::{Coordinate, GeoFloat};
use std::cmp::Ordering;

/// A projected vertex position.
///
/// Wraps a [`Coordinate`] whose `x` is the sweep coordinate `s` and
/// whose `y` is the transverse coordinate `t`. Ordering is
/// lexicographic by `s` and then by `t`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepPoint<T: GeoFloat>(Coordinate<T>);

impl<T: GeoFloat> SweepPoint<T> {
    pub fn new(s: T, t: T) -> Self {
        SweepPoint(Coordinate { x: s, y: t })
    }

    /// Get the point's sweep coordinate.
    #[must_use]
    pub fn s(&self) -> T {
        self.0.x
    }

    /// Get the point's transverse coordinate.
    #[must_use]
    pub fn t(&self) -> T {
        self.0.y
    }

    /// Get the underlying coordinate.
    #[must_use]
    pub fn coord(&self) -> Coordinate<T> {
        self.0
    }

    /// The same point with `s` and `t` exchanged.
    #[must_use]
    pub fn transposed(&self) -> Self {
        SweepPoint::new(self.t(), self.s())
    }

    pub(crate) fn set_t(&mut self, t: T) {
        self.0.y = t;
    }
}

/// Lexicographic ordering by `s` and then by `t`.
impl<T: GeoFloat> PartialOrd for SweepPoint<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match self.0.x.partial_cmp(&other.0.x) {
            Some(Ordering::Equal) => self.0.y.partial_cmp(&other.0.y),
            o => o,
        }
    }
}

impl<T: GeoFloat> From<Coordinate<T>> for SweepPoint<T> {
    fn from(coord: Coordinate<T>) -> Self {
        SweepPoint(coord)
    }
}

#[inline]
pub fn vert_leq<T: GeoFloat>(u: SweepPoint<T>, v: SweepPoint<T>) -> bool {
    u <= v
}

#[inline]
pub fn vert_eq<T: GeoFloat>(u: SweepPoint<T>, v: SweepPoint<T>) -> bool {
    u == v
}

#[inline]
pub fn trans_leq<T: GeoFloat>(u: SweepPoint<T>, v: SweepPoint<T>) -> bool {
    u.transposed() <= v.transposed()
}

/// Signed vertical distance of `v` above the segment `u → w`, evaluated
/// at `v.s`.
///
/// Requires `u <= v <= w`. The result is exact when the segment is
/// vertical (returns zero), and interpolates from the nearer endpoint
/// otherwise so that the error stays proportional to the shorter half.
pub fn edge_eval<T: GeoFloat>(u: SweepPoint<T>, v: SweepPoint<T>, w: SweepPoint<T>) -> T {
    debug_assert!(vert_leq(u, v) && vert_leq(v, w));
    let gap_l = v.s() - u.s();
    let gap_r = w.s() - v.s();

    if gap_l + gap_r > T::zero() {
        if gap_l < gap_r {
            (v.t() - u.t()) + (u.t() - w.t()) * (gap_l / (gap_l + gap_r))
        } else {
            (v.t() - w.t()) + (w.t() - u.t()) * (gap_r / (gap_l + gap_r))
        }
    } else {
        // vertical line
        T::zero()
    }
}

/// Same sign as [`edge_eval`], but cheaper: no division.
pub fn edge_sign<T: GeoFloat>(u: SweepPoint<T>, v: SweepPoint<T>, w: SweepPoint<T>) -> T {
    debug_assert!(vert_leq(u, v) && vert_leq(v, w));
    let gap_l = v.s() - u.s();
    let gap_r = w.s() - v.s();

    if gap_l + gap_r > T::zero() {
        (v.t() - w.t()) * gap_l + (v.t() - u.t()) * gap_r
    } else {
        T::zero()
    }
}

#[inline]
pub fn trans_eval<T: GeoFloat>(u: SweepPoint<T>, v: SweepPoint<T>, w: SweepPoint<T>) -> T {
    edge_eval(u.transposed(), v.transposed(), w.transposed())
}

#[inline]
pub fn trans_sign<T: GeoFloat>(u: SweepPoint<T>, v: SweepPoint<T>, w: SweepPoint<T>) -> T {
    edge_sign(u.transposed(), v.transposed(), w.transposed())
}

/// Whether `u`, `v`, `w` make a left turn (or are collinear).
pub fn vert_ccw<T: GeoFloat>(u: SweepPoint<T>, v: SweepPoint<T>, w: SweepPoint<T>) -> bool {
    u.s() * (v.t() - w.t()) + v.s() * (w.t() - u.t()) + w.s() * (u.t() - v.t()) >= T::zero()
}

#[inline]
pub fn vert_l1_dist<T: GeoFloat>(u: SweepPoint<T>, v: SweepPoint<T>) -> T {
    (u.s() - v.s()).abs() + (u.t() - v.t()).abs()
}

/// Blend `x` and `y` with weights inversely related to the (clamped
/// non-negative) distances `a` and `b`.
///
/// Returns `x` when `a == 0`, `y` when `b == 0`, and the midpoint when
/// both vanish. The result always lies between `x` and `y`.
pub fn interpolate<T: GeoFloat>(a: T, x: T, b: T, y: T) -> T {
    let a = if a < T::zero() { T::zero() } else { a };
    let b = if b < T::zero() { T::zero() } else { b };
    if a <= b {
        if b == T::zero() {
            (x + y) / (T::one() + T::one())
        } else {
            x + (y - x) * (a / (a + b))
        }
    } else {
        y + (x - y) * (b / (a + b))
    }
}

/// Intersection of segments `o1 → d1` and `o2 → d2`.
///
/// Each coordinate is found separately: sort the four endpoints by the
/// relevant ordering, then interpolate between the two middle ones. This
/// keeps the result inside the bounding box of the overlap even when the
/// segments are nearly parallel.
pub fn edge_intersect<T: GeoFloat>(
    o1: SweepPoint<T>,
    d1: SweepPoint<T>,
    o2: SweepPoint<T>,
    d2: SweepPoint<T>,
) -> SweepPoint<T> {
    let mut pts = [o1, d1, o2, d2];
    let s = middle_interpolate(&mut pts);
    for pt in pts.iter_mut() {
        *pt = pt.transposed();
    }
    let t = middle_interpolate(&mut pts);
    SweepPoint::new(s, t)
}

/// Sorts `[o1, d1, o2, d2]` in place so that `o1 <= d1`, `o2 <= d2` and
/// `o1 <= o2`, then returns the `s` coordinate of the crossing.
fn middle_interpolate<T: GeoFloat>(pts: &mut [SweepPoint<T>; 4]) -> T {
    use std::mem::swap;
    let [o1, d1, o2, d2] = pts;

    if !vert_leq(*o1, *d1) {
        swap(o1, d1);
    }
    if !vert_leq(*o2, *d2) {
        swap(o2, d2);
    }
    if !vert_leq(*o1, *o2) {
        swap(o1, o2);
        swap(d1, d2);
    }

    if !vert_leq(*o2, *d1) {
        // Technically, no intersection: use the midpoint of the gap.
        (o2.s() + d1.s()) / (T::one() + T::one())
    } else if vert_leq(*d1, *d2) {
        // Interpolate between o2 and d1.
        let mut z1 = edge_eval(*o1, *o2, *d1);
        let mut z2 = edge_eval(*o2, *d1, *d2);
        if z1 + z2 < T::zero() {
            z1 = -z1;
            z2 = -z2;
        }
        interpolate(z1, o2.s(), z2, d1.s())
    } else {
        // Interpolate between o2 and d2.
        let mut z1 = edge_sign(*o1, *o2, *d1);
        let mut z2 = -edge_sign(*o1, *d2, *d1);
        if z1 + z2 < T::zero() {
            z1 = -z1;
            z2 = -z2;
        }
        interpolate(z1, o2.s(), z2, d2.s())
    }
}
