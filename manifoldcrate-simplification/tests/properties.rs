//! Property-based tests for the error metric and edge collapse.
//!
//! Run with: cargo test -p manifoldcrate-simplification --test properties

use approx::relative_eq;
use manifoldcrate_core::{shapes, Point3f, PolygonMesh};
use manifoldcrate_simplification::*;
use proptest::prelude::*;

type Mesh = HalfEdgeMesh<IsotropicQuadric>;

// =============================================================================
// Strategies
// =============================================================================

fn arb_point() -> impl Strategy<Value = Point3f> {
    prop::array::uniform3(-50.0..50.0f32).prop_map(|[x, y, z]| Point3f::new(x, y, z))
}

fn arb_samples() -> impl Strategy<Value = Vec<Point3f>> {
    prop::collection::vec(arb_point(), 1..12)
}

/// Triangulated torus with every vertex nudged by a small offset
fn jittered_torus(rings: usize, sides: usize, jitter: &[f32]) -> PolygonMesh {
    let mut mesh = shapes::torus(rings, sides, 2.0, 0.7);
    for (p, &d) in mesh.vertices.iter_mut().zip(jitter.iter().cycle()) {
        p.x += d;
        p.y -= d * 0.5;
        p.z += d * 0.25;
    }
    mesh
}

fn sum_of_squares(samples: &[Point3f], p: &Point3f) -> f64 {
    samples
        .iter()
        .map(|s| {
            let d = p.coords.cast::<f64>() - s.coords.cast::<f64>();
            d.dot(&d)
        })
        .sum()
}

// =============================================================================
// Property Tests: Error Metric
// =============================================================================

proptest! {
    /// Combining two metrics equals building one from both sample sets.
    #[test]
    fn combined_metric_matches_merged_samples(
        a in arb_samples(),
        b in arb_samples(),
        p in arb_point(),
    ) {
        let qa = IsotropicQuadric::from_one_ring(&Point3f::origin(), a.iter().copied());
        let qb = IsotropicQuadric::from_one_ring(&Point3f::origin(), b.iter().copied());
        let merged = IsotropicQuadric::from_one_ring(&Point3f::origin(), a.iter().chain(&b).copied());

        let combined = qa.combine(&qb).evaluate_at(&p);
        let direct = merged.evaluate_at(&p);
        let brute: f64 = sum_of_squares(&a, &p) + sum_of_squares(&b, &p);

        prop_assert!(relative_eq!(combined, direct, epsilon = 1e-6, max_relative = 1e-9));
        prop_assert!(relative_eq!(combined, brute, epsilon = 1e-3, max_relative = 1e-6));
        prop_assert!(relative_eq!(
            qa.evaluate_at(&p) + qb.evaluate_at(&p),
            combined,
            epsilon = 1e-6,
            max_relative = 1e-9
        ));
    }

    /// The minimizer is never beaten by any other point.
    #[test]
    fn minimizer_is_optimal(samples in arb_samples(), p in arb_point()) {
        let q = IsotropicQuadric::from_one_ring(&Point3f::origin(), samples);
        let m = q.minimizer().unwrap();
        let at_min = q.evaluate_at(&m);
        prop_assert!(at_min <= q.evaluate_at(&p) + 1e-3 * at_min.abs().max(1.0));
    }
}

// =============================================================================
// Property Tests: Collapse Sequences
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// Any sequence of collapses judged safe keeps the mesh a valid manifold
    /// without duplicate edges.
    #[test]
    fn safe_collapses_keep_invariants(
        rings in 4usize..9,
        sides in 3usize..7,
        picks in prop::collection::vec(any::<prop::sample::Index>(), 1..40),
        jitter in prop::collection::vec(-0.05f32..0.05, 1..16),
    ) {
        let mut mesh = Mesh::from_polygons(&jittered_torus(rings, sides, &jitter)).unwrap();

        for pick in picks {
            let safe: Vec<EdgeId> = mesh.edge_ids().filter(|&e| mesh.is_collapse_safe(e)).collect();
            if safe.is_empty() {
                break;
            }
            let before = mesh.face_count();
            let outcome = mesh.collapse_edge(*pick.get(&safe));

            prop_assert_eq!(outcome.faces_removed, 2);
            prop_assert_eq!(mesh.face_count(), before - 2);
            prop_assert_eq!(mesh.verify(), Ok(()));
            prop_assert!(mesh.duplicate_edges().is_empty());
        }
    }

    /// Same on a quad mesh, where collapses first turn quads into triangles.
    #[test]
    fn safe_collapses_on_polygons_keep_invariants(
        rings in 4usize..9,
        sides in 4usize..7,
        picks in prop::collection::vec(any::<prop::sample::Index>(), 1..30),
    ) {
        let mut mesh = Mesh::from_polygons(&shapes::torus_quads(rings, sides, 2.0, 0.7)).unwrap();

        for pick in picks {
            let safe: Vec<EdgeId> = mesh.edge_ids().filter(|&e| mesh.is_collapse_safe(e)).collect();
            if safe.is_empty() {
                break;
            }
            let before = mesh.face_count();
            mesh.collapse_edge(*pick.get(&safe));

            prop_assert!(mesh.face_count() <= before);
            prop_assert_eq!(mesh.verify(), Ok(()));
            prop_assert!(mesh.duplicate_edges().is_empty());
        }
    }

    /// Simplification either meets the target (possibly one below it) or
    /// stops early on a valid mesh.
    #[test]
    fn simplify_meets_target_or_exhausts(
        rings in 4usize..10,
        sides in 3usize..8,
        fraction in 0.0f64..1.0,
        jitter in prop::collection::vec(-0.05f32..0.05, 1..16),
    ) {
        let mut mesh = Mesh::from_polygons(&jittered_torus(rings, sides, &jitter)).unwrap();
        let initial = mesh.face_count();
        let target = (initial as f64 * fraction) as usize;

        let report = mesh.simplify(target);

        prop_assert_eq!(report.initial_faces, initial);
        prop_assert_eq!(mesh.face_count(), report.achieved_faces);
        prop_assert_eq!(report.faces_removed(), 2 * report.collapses);
        prop_assert_eq!(mesh.verify(), Ok(()));
        if report.reached_target() {
            prop_assert!(report.achieved_faces + 1 >= target);
        } else {
            prop_assert!(report.achieved_faces > target);
        }
    }
}
