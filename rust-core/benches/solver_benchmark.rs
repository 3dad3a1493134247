use criterion::{criterion_group, criterion_main, Criterion};
use nalgebra::{Matrix3, Vector3};
use std::f64::consts::PI;
use std::hint::black_box;

use diffcalc_core::calc::{angles_to_hkl, hkl_to_angles, virtual_angles, SolveContext};
use diffcalc_core::geometry::{geometry_from_name, HardwareLimits, Position};
use diffcalc_core::lattice::{cubic_lattice, monoclinic_lattice};
use diffcalc_core::modes::{ConstraintName, ConstraintSet};
use diffcalc_core::ub::{fit_u, Reflection};

/// Forward and inverse solves across the geometry families, plus the
/// orientation fits they depend on.
fn bench_solver(c: &mut Criterion) {
    let mut group = c.benchmark_group("solver");

    let ub = Matrix3::identity() * 2.0 * PI;
    let hkl = Vector3::new(0.6, 0.3, 0.4);
    let position = Position::from_degrees(2.0, 45.0, 3.0, 20.0, 35.0, -60.0);
    let limits = HardwareLimits::new();

    group.bench_function("angles_to_hkl", |b| {
        b.iter(|| angles_to_hkl(black_box(&position), black_box(1.0), black_box(&ub)))
    });

    group.bench_function("virtual_angles", |b| {
        b.iter(|| virtual_angles(black_box(&position), black_box(&Vector3::z())))
    });

    // One representative constraint set per family
    let cases = [
        ("fourc", vec![(ConstraintName::BetainEqBetaout, None)]),
        ("fourc", vec![(ConstraintName::Psi, Some(30.0))]),
        ("fourc", vec![(ConstraintName::Phi, Some(20.0))]),
        (
            "fivec",
            vec![(ConstraintName::AlphaEqBetain, None), (ConstraintName::Betain, Some(5.0))],
        ),
        ("zaxis", vec![(ConstraintName::Betaout, Some(10.0))]),
        (
            "sixc",
            vec![
                (ConstraintName::Alpha, Some(2.0)),
                (ConstraintName::Gamma, Some(3.0)),
                (ConstraintName::Betain, Some(4.0)),
            ],
        ),
    ];
    for (name, entries) in cases {
        let geometry = geometry_from_name(name).unwrap();
        let mut constraints = ConstraintSet::new();
        for (constraint, value) in &entries {
            match value {
                Some(degrees) => constraints.fix(*constraint, *degrees).unwrap(),
                None => constraints.enable(*constraint).unwrap(),
            };
        }
        let context = SolveContext::new(geometry.as_ref(), &limits);
        let label = format!("hkl_to_angles_{}_{}", name, constraints.describe());
        group.bench_function(label.as_str(), |b| {
            b.iter(|| {
                hkl_to_angles(
                    black_box(&hkl),
                    black_box(1.0),
                    black_box(&ub),
                    black_box(&constraints),
                    black_box(&context),
                )
            })
        });
    }

    // Orientation fits
    let cubic = cubic_lattice(1.0).unwrap();
    let energy = 12.3984;
    let reflections = vec![
        Reflection::new(
            Vector3::new(1.0, 0.0, 0.0),
            &Position::from_degrees(0.0, 60.0, 0.0, 30.0, 0.0, 0.0),
            energy,
        )
        .unwrap(),
        Reflection::new(
            Vector3::new(0.0, 1.0, 0.0),
            &Position::from_degrees(0.0, 60.0, 0.0, 30.0, 0.0, 90.0),
            energy,
        )
        .unwrap(),
        Reflection::new(
            Vector3::new(0.0, 0.0, 1.0),
            &Position::from_degrees(0.0, 60.0, 0.0, 30.0, 90.0, 0.0),
            energy,
        )
        .unwrap(),
    ];

    group.bench_function("fit_u_triad", |b| {
        b.iter(|| fit_u(black_box(&reflections[..2]), black_box(cubic.b_matrix()), 0.5))
    });

    group.bench_function("fit_u_kabsch", |b| {
        b.iter(|| fit_u(black_box(&reflections), black_box(cubic.b_matrix()), 0.5))
    });

    group.bench_function("monoclinic_b_matrix", |b| {
        b.iter(|| monoclinic_lattice(black_box(5.1), black_box(6.2), black_box(7.3), black_box(101.5)))
    });

    group.finish();
}

criterion_group!(benches, bench_solver);
criterion_main!(benches);
