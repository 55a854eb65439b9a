use criterion::*;
use geo::{Coordinate, LineString, Rect};

const BBOX: [f64; 2] = [1024., 1024.];

#[path = "utils/random.rs"]
mod random;
use geo_tessellate::{ContourOrientation, TessOptions, Tessellator, WindingRule};
use rand::{rngs::StdRng, SeedableRng};
use random::*;

fn tessellate(rings: &[LineString<f64>], options: &TessOptions<f64>) -> usize {
    let mut tess = Tessellator::<f64>::new();
    for ring in rings {
        tess.add_line_string(ring, ContourOrientation::Original)
            .expect("finite input");
    }
    tess.tessellate(options).expect("tessellation").element_count()
}

fn star_tess(c: &mut Criterion) {
    let mut group = c.benchmark_group("Tessellate - star polygons");
    let center = Coordinate { x: 512., y: 512. };
    for &n in &[64usize, 1024, 16384] {
        let rings = vec![star_ring(&mut StdRng::seed_from_u64(n as u64), center, 400., n)];
        let options = TessOptions::default();
        group.bench_with_input(BenchmarkId::from_parameter(n), &rings, |b, rings| {
            b.iter(|| black_box(tessellate(rings, &options)))
        });
    }
    group.finish();
}

fn scribble_tess(c: &mut Criterion) {
    let bbox: Rect<f64> = Rect::new([0., 0.], BBOX);
    let mut group = c.benchmark_group("Tessellate - self-intersecting rings");
    for &n in &[16usize, 64, 256] {
        let rings = vec![scribble_ring(&mut StdRng::seed_from_u64(n as u64), bbox, n)];
        for rule in [WindingRule::EvenOdd, WindingRule::NonZero] {
            let options = TessOptions::default().with_winding_rule(rule);
            group.bench_with_input(BenchmarkId::new(format!("{rule:?}"), n), &rings, |b, rings| {
                b.iter(|| black_box(tessellate(rings, &options)))
            });
        }
    }
    group.finish();
}

fn merged_tess(c: &mut Criterion) {
    let center = Coordinate { x: 512., y: 512. };
    let rings = vec![star_ring(&mut StdRng::seed_from_u64(7), center, 400., 4096)];
    let options = TessOptions::default().with_poly_size(16);
    c.bench_function("Tessellate - star polygon, convex pieces", |b| {
        b.iter(|| black_box(tessellate(&rings, &options)))
    });
}

criterion_group!(bench, star_tess, scribble_tess, merged_tess);
criterion_main!(bench);
