use std::error::Error;

use approx::assert_relative_eq;
use geo::{algorithm::area::Area, Coordinate, LineString, Polygon, Rect};
use log::info;
use rand::{rngs::StdRng, SeedableRng};
use wkt::{ToWkt, TryFromWkt};

use super::*;
use crate::random::*;

fn init_log() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn area<D>(out: &Tessellation<f64, D>) -> f64 {
    out.polygons().map(|p| p.signed_area()).sum()
}

fn tessellate_wkt(wkt: &str, options: &TessOptions<f64>) -> Result<Tessellation<f64>, Box<dyn Error>> {
    init_log();
    let poly = Polygon::<f64>::try_from_wkt_str(wkt)?;
    let mut tess = Tessellator::new();
    tess.add_polygon(&poly)?;
    let out = tess.tessellate(options)?;
    for p in out.polygons() {
        info!("\t{}", p.wkt_string());
    }
    Ok(out)
}

fn nonzero() -> TessOptions<f64> {
    TessOptions::default().with_winding_rule(WindingRule::NonZero)
}

#[test]
fn test_unit_square() -> Result<(), Box<dyn Error>> {
    let out = tessellate_wkt("POLYGON((0 0,1 0,1 1,0 1,0 0))", &TessOptions::default())?;
    assert_eq!(out.element_type(), ElementType::Polygons);
    assert_eq!(out.poly_size(), 3);
    assert_eq!(out.element_count(), 2);
    assert_eq!(out.vertices().len(), 4);
    assert_eq!(out.elements().len(), 6);
    assert!(out.elements().iter().all(|&i| i < 4));
    assert_relative_eq!(area(&out), 1.);
    for t in out.triangles() {
        assert!(t.signed_area() > 0.);
    }
    Ok(())
}

#[test]
fn test_square_with_hole() -> Result<(), Box<dyn Error>> {
    let wkt = "POLYGON((0 0,4 0,4 4,0 4,0 0),(1 1,3 1,3 3,1 3,1 1))";
    let out = tessellate_wkt(wkt, &nonzero())?;
    assert_eq!(out.element_count(), 8);
    assert_eq!(out.vertices().len(), 8);
    assert_relative_eq!(area(&out), 12.);

    // The hole's orientation is forced, so every rule but AbsGeqTwo
    // agrees.
    let out = tessellate_wkt(wkt, &TessOptions::default())?;
    assert_relative_eq!(area(&out), 12.);
    let out = tessellate_wkt(wkt, &TessOptions::default().with_winding_rule(WindingRule::AbsGeqTwo))?;
    assert!(out.is_empty());
    Ok(())
}

#[test]
fn test_doubled_square() {
    init_log();
    let square = [[0., 0.], [1., 0.], [1., 1.], [0., 1.]];
    let run = |rule: WindingRule| {
        let mut tess = Tessellator::<f64>::new();
        tess.add_contour(square, ContourOrientation::Original).unwrap();
        tess.add_contour(square, ContourOrientation::Original).unwrap();
        tess.tessellate(&TessOptions::default().with_winding_rule(rule))
            .unwrap()
    };
    assert_relative_eq!(area(&run(WindingRule::NonZero)), 1.);
    assert_relative_eq!(area(&run(WindingRule::AbsGeqTwo)), 1.);
    assert!(run(WindingRule::EvenOdd).is_empty());
    assert!(run(WindingRule::Negative).is_empty());

    // Wound once each way: zero everywhere.
    for rule in [WindingRule::NonZero, WindingRule::AbsGeqTwo, WindingRule::EvenOdd] {
        let mut tess = Tessellator::<f64>::new();
        tess.add_contour(square, ContourOrientation::Original).unwrap();
        tess.add_contour(square.iter().rev().copied(), ContourOrientation::Original)
            .unwrap();
        let out = tess
            .tessellate(&TessOptions::default().with_winding_rule(rule))
            .unwrap();
        assert!(out.is_empty(), "{rule:?}");
    }
}

#[test]
fn test_overlapping_squares() {
    init_log();
    let cases = [
        (WindingRule::NonZero, 7.),
        (WindingRule::EvenOdd, 6.),
        (WindingRule::AbsGeqTwo, 1.),
        (WindingRule::Positive, 7.),
    ];
    for (rule, expected) in cases {
        let mut tess = Tessellator::<f64, u32>::new();
        tess.add_contour([[0., 0.], [2., 0.], [2., 2.], [0., 2.]], ContourOrientation::Original)
            .unwrap();
        tess.add_contour([[1., 1.], [3., 1.], [3., 3.], [1., 3.]], ContourOrientation::Original)
            .unwrap();

        let mut calls = 0;
        let out = tess
            .tessellate_with(
                &TessOptions::default().with_winding_rule(rule),
                |_: [f64; 3], _: [Option<&u32>; 4], weights: [f64; 4]| -> Option<u32> {
                    calls += 1;
                    assert_relative_eq!(weights.iter().sum::<f64>(), 1., epsilon = 1e-12);
                    None
                },
            )
            .unwrap();
        assert_eq!(calls, 2, "{rule:?}");
        assert_relative_eq!(area(&out), expected, epsilon = 1e-12);
    }
}

#[test]
fn test_bowtie_combines_payloads() {
    init_log();
    let mut tess = Tessellator::<f64, u32>::new();
    tess.add_contour(
        vec![
            ContourVertex::with_data([0., 0., 0.], 1),
            ContourVertex::with_data([2., 2., 0.], 2),
            ContourVertex::with_data([2., 0., 0.], 3),
            ContourVertex::with_data([0., 2., 0.], 4),
        ],
        ContourOrientation::Original,
    )
    .unwrap();

    let mut seen = vec![];
    let out = tess
        .tessellate_with(
            &nonzero(),
            |position: [f64; 3], data: [Option<&u32>; 4], weights: [f64; 4]| -> Option<u32> {
                seen.push((position, weights));
                let mut sources: Vec<u32> = data.iter().flatten().map(|&&d| d).collect();
                sources.sort_unstable();
                assert_eq!(sources, vec![1, 2, 3, 4]);
                Some(100)
            },
        )
        .unwrap();

    assert_eq!(seen.len(), 1);
    let (position, weights) = seen[0];
    assert_relative_eq!(position[0], 1., epsilon = 1e-12);
    assert_relative_eq!(position[1], 1., epsilon = 1e-12);
    assert_relative_eq!(position[2], 0., epsilon = 1e-12);
    assert_relative_eq!(weights.iter().sum::<f64>(), 1., epsilon = 1e-12);
    assert!(weights.iter().all(|&w| w >= 0.));

    assert_eq!(out.element_count(), 2);
    assert_eq!(out.vertices().len(), 5);
    assert_relative_eq!(area(&out), 2., epsilon = 1e-12);
    let mut data: Vec<u32> = out.vertices().iter().filter_map(|v| v.data).collect();
    data.sort_unstable();
    assert_eq!(data, vec![1, 2, 3, 4, 100]);
}

#[test]
fn test_bowtie_without_combine() {
    init_log();
    let mut tess = Tessellator::<f64, u32>::new();
    tess.add_contour(
        vec![
            ContourVertex::with_data([0., 0., 0.], 1),
            ContourVertex::with_data([2., 2., 0.], 2),
            ContourVertex::with_data([2., 0., 0.], 3),
            ContourVertex::with_data([0., 2., 0.], 4),
        ],
        ContourOrientation::Original,
    )
    .unwrap();
    let out = tess
        .tessellate(&TessOptions::default().with_winding_rule(WindingRule::Positive))
        .unwrap();
    // One lobe is wound each way.
    assert_eq!(out.element_count(), 1);
    assert_relative_eq!(area(&out).abs(), 1., epsilon = 1e-12);
    let center = out
        .vertices()
        .iter()
        .find(|v| v.data.is_none())
        .expect("intersection vertex");
    assert_relative_eq!(center.position[0], 1., epsilon = 1e-12);
    assert_relative_eq!(center.position[1], 1., epsilon = 1e-12);
}

#[test]
fn test_payloads_follow_vertices() {
    init_log();
    let mut tess = Tessellator::<f64, usize>::new();
    let pts = [[0., 0.], [3., 0.], [3., 2.], [1., 3.], [0., 2.]];
    tess.add_contour(
        pts.iter()
            .enumerate()
            .map(|(i, &[x, y])| ContourVertex::with_data([x, y, 0.], i)),
        ContourOrientation::Original,
    )
    .unwrap();
    let out = tess.tessellate(&TessOptions::default()).unwrap();
    assert_eq!(out.element_count(), 3);
    for v in out.vertices() {
        let i = v.data.expect("input vertex");
        assert_eq!([v.position[0], v.position[1]], pts[i]);
    }
}

#[test]
fn test_degenerate_contours() {
    init_log();
    let mut tess = Tessellator::<f64>::new();
    tess.add_contour([[1., 1.]], ContourOrientation::Original).unwrap();
    tess.add_contour([[0., 0.], [1., 1.]], ContourOrientation::Original)
        .unwrap();
    tess.add_contour([[0., 0.], [1., 0.], [3., 0.]], ContourOrientation::Original)
        .unwrap();
    tess.add_contour([[5., 5.], [5., 5.], [5., 5.]], ContourOrientation::Original)
        .unwrap();
    let empty: [[f64; 2]; 0] = [];
    tess.add_contour(empty, ContourOrientation::Original).unwrap();
    assert_eq!(tess.contour_count(), 5);

    let out = tess.tessellate(&nonzero()).unwrap();
    assert!(out.is_empty());
    assert_eq!(out.element_count(), 0);
}

#[test]
fn test_reuse() {
    init_log();
    let mut tess = Tessellator::<f64>::new();
    let ring = [[0., 0.], [4., 0.], [4., 3.], [3., 1.], [2., 3.], [1., 1.], [0., 3.]];
    let run = |tess: &mut Tessellator<f64>| {
        tess.add_contour(ring, ContourOrientation::Original).unwrap();
        tess.tessellate(&TessOptions::default()).unwrap()
    };
    let first = run(&mut tess);
    let second = run(&mut tess);
    assert_eq!(first.elements(), second.elements());
    assert_eq!(first.vertices(), second.vertices());
    assert_eq!(first.element_count(), 5);

    // Nothing left over.
    assert_eq!(tess.contour_count(), 0);
    assert!(tess.tessellate(&TessOptions::default()).unwrap().is_empty());
}

#[test]
fn test_convex_polygon_area() {
    init_log();
    let n = 12;
    let ring: Vec<_> = (0..n)
        .map(|i| {
            let a = 2. * std::f64::consts::PI * i as f64 / n as f64;
            Coordinate { x: 3. * a.cos(), y: 3. * a.sin() }
        })
        .collect();
    let poly = Polygon::new(LineString::from(ring), vec![]);

    let mut tess = Tessellator::<f64>::new();
    tess.add_polygon(&poly).unwrap();
    let out = tess.tessellate(&TessOptions::default()).unwrap();
    assert_eq!(out.element_count(), n - 2);
    assert_relative_eq!(area(&out), poly.unsigned_area(), epsilon = 1e-9);

    // One convex piece when it fits.
    tess.add_polygon(&poly).unwrap();
    let out = tess
        .tessellate(&TessOptions::default().with_poly_size(n))
        .unwrap();
    assert_eq!(out.element_count(), 1);
    assert_eq!(out.polygon_indices().next().map(|p| p.len()), Some(n));
    assert_relative_eq!(area(&out), poly.unsigned_area(), epsilon = 1e-9);
}

#[test]
fn test_poly_size_padding() {
    init_log();
    let mut tess = Tessellator::<f64>::new();
    tess.add_contour([[0., 0.], [1., 0.], [1., 1.], [0., 1.]], ContourOrientation::Original)
        .unwrap();
    let out = tess
        .tessellate(&TessOptions::default().with_poly_size(6))
        .unwrap();
    assert_eq!(out.poly_size(), 6);
    assert_eq!(out.element_count(), 1);
    assert_eq!(out.elements().len(), 6);
    assert_eq!(&out.elements()[4..], &[UNDEF, UNDEF]);
    assert_relative_eq!(area(&out), 1.);

    // Sizes below three are raised to three.
    tess.add_contour([[0., 0.], [1., 0.], [1., 1.]], ContourOrientation::Original)
        .unwrap();
    let out = tess
        .tessellate(&TessOptions::default().with_poly_size(1))
        .unwrap();
    assert_eq!(out.poly_size(), 3);
    assert_eq!(out.element_count(), 1);
}

#[test]
fn test_no_empty_polygons() {
    init_log();
    // The fan from the bottom chain cuts off the collinear triangle
    // (1 0, 2 0, 3 0).
    let contour = [[1., 0.], [2., 0.], [3., 0.], [0.5, 1.]];
    let options = TessOptions::default().with_normal([0., 0., 1.]);

    let mut tess = Tessellator::<f64>::new();
    tess.add_contour(contour, ContourOrientation::Original)
        .unwrap();
    let out = tess.tessellate(&options).unwrap();
    assert_eq!(out.element_count(), 2);
    assert_eq!(out.triangles().filter(|t| t.signed_area() == 0.).count(), 1);
    assert_relative_eq!(area(&out), 1.);

    tess.add_contour(contour, ContourOrientation::Original)
        .unwrap();
    let out = tess
        .tessellate(&options.with_no_empty_polygons(true))
        .unwrap();
    assert_eq!(out.element_count(), 1);
    assert!(out.triangles().all(|t| t.signed_area() > 0.));
    assert_relative_eq!(area(&out), 1.);
}

#[test]
fn test_connected_polygons() {
    init_log();
    let mut tess = Tessellator::<f64>::new();
    tess.add_contour([[0., 0.], [1., 0.], [1., 1.], [0., 1.]], ContourOrientation::Original)
        .unwrap();
    let out = tess
        .tessellate(&TessOptions::default().with_element_type(ElementType::ConnectedPolygons))
        .unwrap();
    assert_eq!(out.element_count(), 2);
    let neighbors = out.neighbors().expect("neighbors");
    assert_eq!(neighbors.len(), 6);

    for (poly, adj) in neighbors.chunks(3).enumerate() {
        let other = 1 - poly;
        assert_eq!(adj.iter().filter(|&&n| n == other).count(), 1);
        assert_eq!(adj.iter().filter(|&&n| n == UNDEF).count(), 2);

        // The shared edge has the same endpoints in both triangles.
        let k = adj.iter().position(|&n| n == other).unwrap();
        let tri = &out.elements()[poly * 3..poly * 3 + 3];
        let mut shared = [tri[k], tri[(k + 1) % 3]];
        shared.sort_unstable();
        let other_tri = &out.elements()[other * 3..other * 3 + 3];
        assert!(shared.iter().all(|v| other_tri.contains(v)));
    }

    let out = Tessellator::<f64>::new()
        .tessellate(&TessOptions::default())
        .unwrap();
    assert!(out.neighbors().is_none());
}

#[test]
fn test_boundary_contours() -> Result<(), Box<dyn Error>> {
    let wkt = "POLYGON((0 0,4 0,4 4,0 4,0 0),(1 1,3 1,3 3,1 3,1 1))";
    let options = nonzero().with_element_type(ElementType::BoundaryContours);
    let out = tessellate_wkt(wkt, &options)?;
    assert_eq!(out.element_type(), ElementType::BoundaryContours);
    assert_eq!(out.element_count(), 2);
    assert_eq!(out.vertices().len(), 8);
    assert_eq!(out.polygon_indices().count(), 0);

    let mut areas: Vec<f64> = out
        .contours()
        .map(|ring| {
            assert!(ring.is_closed());
            assert_eq!(ring.0.len(), 5);
            Polygon::new(ring, vec![]).signed_area()
        })
        .collect();
    areas.sort_by(|a, b| a.partial_cmp(b).unwrap());
    // The inside is on the left of each contour.
    assert_relative_eq!(areas[0], -4.);
    assert_relative_eq!(areas[1], 16.);
    Ok(())
}

#[test]
fn test_boundary_of_overlap() {
    init_log();
    let mut tess = Tessellator::<f64>::new();
    tess.add_contour([[0., 0.], [2., 0.], [2., 2.], [0., 2.]], ContourOrientation::Original)
        .unwrap();
    tess.add_contour([[1., 1.], [3., 1.], [3., 3.], [1., 3.]], ContourOrientation::Original)
        .unwrap();
    let out = tess
        .tessellate(&nonzero().with_element_type(ElementType::BoundaryContours))
        .unwrap();
    assert_eq!(out.element_count(), 1);
    assert_eq!(out.vertices().len(), 8);
    let ring = out.contours().next().unwrap();
    assert_relative_eq!(Polygon::new(ring, vec![]).signed_area(), 7., epsilon = 1e-12);
}

#[test]
fn test_vertical_plane() {
    init_log();
    let square = [[0., 5., 0.], [1., 5., 0.], [1., 5., 1.], [0., 5., 1.]];

    let mut tess = Tessellator::<f64>::new();
    tess.add_contour(square, ContourOrientation::Original).unwrap();
    let out = tess.tessellate(&TessOptions::default()).unwrap();
    assert_eq!(out.element_count(), 2);
    let n = out.normal();
    assert_eq!(n[0], 0.);
    assert_eq!(n[2], 0.);
    assert_relative_eq!(n[1].abs(), 1.);
    assert!(out.vertices().iter().all(|v| v.position[1] == 5.));

    tess.add_contour(square, ContourOrientation::Original).unwrap();
    let out = tess
        .tessellate(&TessOptions::default().with_normal([0., 3., 0.]))
        .unwrap();
    assert_eq!(out.normal(), [0., 1., 0.]);
    assert_eq!(out.element_count(), 2);
}

#[test]
fn test_clockwise_input_is_flipped() {
    init_log();
    let mut tess = Tessellator::<f64>::new();
    tess.add_contour([[0., 0.], [0., 1.], [1., 1.], [1., 0.]], ContourOrientation::Original)
        .unwrap();
    let out = tess
        .tessellate(&TessOptions::default().with_winding_rule(WindingRule::Positive))
        .unwrap();
    assert_eq!(out.element_count(), 2);
    assert_eq!(out.normal(), [0., 0., -1.]);
}

#[test]
fn test_non_finite_input() {
    init_log();
    let mut tess = Tessellator::<f64>::new();
    let err = tess
        .add_contour([[0., 0.], [1., f64::INFINITY], [1., 1.]], ContourOrientation::Original)
        .unwrap_err();
    assert_eq!(err, TessError::NonFiniteCoordinate { contour: 0, vertex: 1 });
    assert_eq!(tess.contour_count(), 0);

    let poly = Polygon::new(
        LineString::from(vec![(0., 0.), (1., 0.), (f64::NAN, 1.), (0., 0.)]),
        vec![],
    );
    assert!(tess.add_polygon(&poly).is_err());
    assert!(tess.tessellate(&TessOptions::default()).unwrap().is_empty());
}

#[test]
fn test_random_stars() {
    init_log();
    let center = Coordinate { x: 0., y: 0. };
    for seed in 0..8 {
        let mut rng = StdRng::seed_from_u64(seed);
        let n = 16 << (seed % 4);
        let ring = star_ring(&mut rng, center, 10., n);
        let poly = Polygon::new(ring.clone(), vec![]);

        let mut tess = Tessellator::<f64>::new();
        tess.add_line_string(&ring, ContourOrientation::Original)
            .unwrap();
        let out = tess.tessellate(&TessOptions::default()).unwrap();
        assert_eq!(out.element_count(), n - 2);
        assert_eq!(out.vertices().len(), n);
        assert_relative_eq!(area(&out), poly.unsigned_area(), epsilon = 1e-9, max_relative = 1e-9);
    }
}

/// Winding number of `ring` around `p`; counter-clockwise loops count
/// positive.
fn winding_number(ring: &[Coordinate<f64>], p: Coordinate<f64>) -> i32 {
    let mut winding = 0;
    for (i, &a) in ring.iter().enumerate() {
        let b = ring[(i + 1) % ring.len()];
        let side = (b.x - a.x) * (p.y - a.y) - (p.x - a.x) * (b.y - a.y);
        if a.y <= p.y {
            if b.y > p.y && side > 0. {
                winding += 1;
            }
        } else if b.y <= p.y && side < 0. {
            winding -= 1;
        }
    }
    winding
}

#[test]
fn test_random_scribbles() {
    init_log();
    const SIDE: f64 = 100.;
    const CELLS: usize = 400;
    let cell = SIDE / CELLS as f64;
    let bbox: Rect<f64> = Rect::new([0., 0.], [SIDE, SIDE]);
    let rules = [
        WindingRule::EvenOdd,
        WindingRule::NonZero,
        WindingRule::Positive,
        WindingRule::Negative,
        WindingRule::AbsGeqTwo,
    ];

    for seed in 0..8 {
        let mut rng = StdRng::seed_from_u64(seed);
        let ring = scribble_ring(&mut rng, bbox, 24);
        let pts = &ring.0;
        let perimeter: f64 = (0..pts.len())
            .map(|i| {
                let (a, b) = (pts[i], pts[(i + 1) % pts.len()]);
                (b.x - a.x).hypot(b.y - a.y)
            })
            .sum();

        // Midpoint sampling of the winding number; the error is bounded
        // by the cells the boundary passes through.
        let windings: Vec<i32> = (0..CELLS * CELLS)
            .map(|k| {
                let p = Coordinate {
                    x: ((k % CELLS) as f64 + 0.5) * cell,
                    y: ((k / CELLS) as f64 + 0.5) * cell,
                };
                winding_number(pts, p)
            })
            .collect();

        for rule in rules {
            let mut tess = Tessellator::<f64>::new();
            tess.add_line_string(&ring, ContourOrientation::Original)
                .unwrap();
            let options = TessOptions::default()
                .with_winding_rule(rule)
                .with_normal([0., 0., 1.]);
            let out = tess.tessellate(&options).unwrap();
            let total = area(&out);
            let sampled = windings.iter().filter(|&&w| rule.is_inside(w)).count() as f64 * cell * cell;
            assert!(
                (total - sampled).abs() <= perimeter * cell,
                "seed {seed}, {rule:?}: {total} vs sampled {sampled}"
            );
        }
    }
}

#[test]
fn test_comb() {
    init_log();
    let mut rng = StdRng::seed_from_u64(3);
    let ring = comb_ring(&mut rng, 20, 4.);
    let poly = Polygon::new(ring.clone(), vec![]);
    let mut tess = Tessellator::<f64>::new();
    tess.add_line_string(&ring, ContourOrientation::Original)
        .unwrap();
    let out = tess.tessellate(&TessOptions::default()).unwrap();
    assert_eq!(out.element_count(), 2 * 20 + 1);
    assert_relative_eq!(area(&out), poly.unsigned_area(), epsilon = 1e-9);
}
