use std::f64::consts::PI;

use geo::{Coordinate, LineString, Rect};

use rand::Rng;
use rand_distr::{Distribution, Normal, Standard};

#[inline]
pub fn uniform_point<R: Rng>(rng: &mut R, bounds: Rect<f64>) -> Coordinate<f64> {
    let coords: [f64; 2] = rng.sample(Standard);
    let dims = bounds.max() - bounds.min();
    Coordinate {
        x: bounds.min().x + dims.x * coords[0],
        y: bounds.min().y + dims.y * coords[1],
    }
}

/// A star-shaped ring of `n` vertices around `center`: angles are evenly
/// spaced and radii jitter around `radius`. Simple and counter-clockwise.
pub fn star_ring<R: Rng>(rng: &mut R, center: Coordinate<f64>, radius: f64, n: usize) -> LineString<f64> {
    let jitter = Normal::<f64>::new(1., 0.25).expect("valid normal distribution");
    let mut ring: Vec<Coordinate<f64>> = (0..n)
        .map(|i| {
            let angle = 2. * PI * i as f64 / n as f64;
            let r = radius * jitter.sample(&mut *rng).clamp(0.1, 2.);
            Coordinate {
                x: center.x + r * angle.cos(),
                y: center.y + r * angle.sin(),
            }
        })
        .collect();
    if let Some(&first) = ring.first() {
        ring.push(first);
    }
    ring.into()
}

/// A ring of `n` points drawn uniformly in `bounds`; self-intersects
/// freely.
pub fn scribble_ring<R: Rng>(rng: &mut R, bounds: Rect<f64>, n: usize) -> LineString<f64> {
    (0..n)
        .map(|_| uniform_point(&mut *rng, bounds))
        .collect::<Vec<_>>()
        .into()
}

/// A comb: `teeth` spikes of height `height` over a base of width
/// `teeth`, with random tip heights. Monotone in x but not in y.
#[allow(dead_code)]
pub fn comb_ring<R: Rng>(rng: &mut R, teeth: usize, height: f64) -> LineString<f64> {
    let mut ring = vec![Coordinate { x: 0., y: 0. }, Coordinate { x: teeth as f64, y: 0. }];
    for i in (0..teeth).rev() {
        let tip: f64 = rng.sample(Standard);
        ring.push(Coordinate {
            x: i as f64 + 1.,
            y: height * (0.5 + tip),
        });
        ring.push(Coordinate {
            x: i as f64 + 0.5,
            y: 0.25 * height,
        });
    }
    ring.push(Coordinate { x: 0., y: height });
    ring.into()
}
