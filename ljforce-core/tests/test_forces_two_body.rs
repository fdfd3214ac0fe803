//! Two-body and small-N checks of the force kernel

use approx::assert_relative_eq;
use ljforce_core::tests::test_helpers::{approx_eq, random_configuration, two_body};
use ljforce_core::{
    compute_forces, pair_force, Accumulation, Boundary, DVec3, ForceKernel, KernelConfig,
    LjParams,
};

/// x-force on the particle at (r, 0, 0) due to one at the origin, sigma = eps = 1
fn closed_form(r: f64) -> f64 {
    24.0 * (2.0 / r.powi(13) - 1.0 / r.powi(7))
}

fn kernel(boundary: Boundary, config: KernelConfig) -> ForceKernel {
    ForceKernel::new(LjParams::new(1.0, 1.0), boundary, config).expect("valid kernel")
}

#[test]
fn test_repulsive_pair_matches_closed_form() {
    let r = 0.9;
    let positions = two_body([0.0, 0.0, 0.0], [r, 0.0, 0.0]);
    let mut out = vec![0.0; 6];
    compute_forces(&positions, &mut out, 2, 1.0, 1.0, false, 0.0).unwrap();

    // The second particle is pushed along +x, the first along -x
    assert!(out[3] > 0.0);
    assert_relative_eq!(out[3], closed_form(r), max_relative = 1e-12);
    assert_relative_eq!(out[0], -closed_form(r), max_relative = 1e-12);
    assert_eq!(&out[1..3], &[0.0, 0.0]);
    assert_eq!(&out[4..6], &[0.0, 0.0]);
}

#[test]
fn test_attractive_pair_matches_closed_form() {
    let r = 1.5; // beyond the minimum at 2^(1/6)
    let positions = two_body([0.0, 0.0, 0.0], [r, 0.0, 0.0]);
    let mut out = vec![0.0; 6];
    compute_forces(&positions, &mut out, 2, 1.0, 1.0, false, 0.0).unwrap();

    assert!(out[3] < 0.0, "particle 1 should be pulled toward particle 0");
    assert_relative_eq!(out[3], closed_form(r), max_relative = 1e-12);
    assert_relative_eq!(out[0], -closed_form(r), max_relative = 1e-12);
}

#[test]
fn test_force_vanishes_at_minimum() {
    let r = 2f64.powf(1.0 / 6.0);
    let positions = two_body([0.0, 0.0, 0.0], [r, 0.0, 0.0]);
    let mut out = vec![0.0; 6];
    compute_forces(&positions, &mut out, 2, 1.0, 1.0, false, 0.0).unwrap();
    assert!(approx_eq(out[0], 0.0, 1e-12));
    assert!(approx_eq(out[3], 0.0, 1e-12));
}

#[test]
fn test_sigma_and_eps_scale_the_force() {
    // F(r; sigma, eps) = eps / sigma * F(r / sigma; 1, 1)
    let (sigma, eps, r) = (0.3405, 10.323, 0.4);
    let positions = two_body([0.0, 0.0, 0.0], [r, 0.0, 0.0]);
    let mut out = vec![0.0; 6];
    compute_forces(&positions, &mut out, 2, sigma, eps, false, 0.0).unwrap();
    assert_relative_eq!(
        out[3],
        eps / sigma * closed_form(r / sigma),
        max_relative = 1e-12
    );
}

#[test]
fn test_pair_contributions_are_exact_negations() {
    let positions = two_body([0.13, -0.42, 0.77], [1.01, 0.35, -0.12]);
    let periodic = Boundary::Periodic { boxsize: 1.5 };

    for boundary in [Boundary::Open, periodic] {
        for accumulation in [Accumulation::Reduce, Accumulation::Atomic] {
            let config = KernelConfig::default().with_accumulation(accumulation);
            let out = kernel(boundary, config).evaluate(&positions).unwrap();

            for k in 0..3 {
                assert_eq!(
                    out[k].to_bits(),
                    (-out[k + 3]).to_bits(),
                    "{boundary:?} {accumulation:?} component {k}"
                );
            }
        }
    }
}

#[test]
fn test_kernel_agrees_bitwise_with_pair_force() {
    let a = DVec3::new(0.13, -0.42, 0.77);
    let b = DVec3::new(1.01, 0.35, -0.12);
    let params = LjParams::new(1.0, 1.0);
    let boundary = Boundary::Periodic { boxsize: 1.5 };

    let expected = pair_force(a, b, &params, &boundary);
    let out = kernel(boundary, KernelConfig::default())
        .evaluate(&two_body(a.to_array(), b.to_array()))
        .unwrap();
    assert_eq!(DVec3::new(out[0], out[1], out[2]), expected);
    assert_eq!(DVec3::new(out[3], out[4], out[5]), -expected);
}

#[test]
fn test_fewer_than_two_particles_leave_output_untouched() {
    let before = vec![1.5, -2.0, 3.25];
    for n in 0..=1 {
        let mut out = before.clone();
        compute_forces(&[0.0, 0.0, 0.0], &mut out, n, 1.0, 1.0, true, 5.0).unwrap();
        assert_eq!(out, before);
    }

    let empty = kernel(Boundary::Open, KernelConfig::default())
        .evaluate(&[])
        .unwrap();
    assert!(empty.is_empty());
}

#[test]
fn test_accumulates_into_existing_output() {
    let (positions, _) = random_configuration(12, 3);
    let config = KernelConfig::default().with_workers(1);
    let k = kernel(Boundary::Open, config);

    let delta = k.evaluate(&positions).unwrap();
    let before: Vec<f64> = (0..positions.len()).map(|i| i as f64 * 0.25 - 3.0).collect();
    let mut out = before.clone();
    k.accumulate(&positions, &mut out).unwrap();

    // one worker, one private buffer: the only rounding is the final add
    for ((o, b), d) in out.iter().zip(&before).zip(&delta) {
        assert_eq!(*o, b + d);
    }
}

#[test]
fn test_accumulates_into_existing_output_atomic() {
    let (positions, _) = random_configuration(12, 3);
    let config = KernelConfig::default()
        .with_workers(4)
        .with_accumulation(Accumulation::Atomic);
    let k = kernel(Boundary::Open, config);

    let delta = k.evaluate(&positions).unwrap();
    let mut out = vec![100.0; positions.len()];
    k.accumulate(&positions, &mut out).unwrap();

    for (o, d) in out.iter().zip(&delta) {
        assert_relative_eq!(*o, 100.0 + d, max_relative = 1e-12, epsilon = 1e-9);
    }
}

#[test]
fn test_explicit_n_only_touches_prefix() {
    let mut positions = two_body([0.0, 0.0, 0.0], [1.2, 0.0, 0.0]);
    positions.extend([0.6, 0.0, 0.0]);
    let mut out = vec![0.0; 9];
    compute_forces(&positions, &mut out, 2, 1.0, 1.0, false, 0.0).unwrap();

    assert_relative_eq!(out[3], closed_form(1.2), max_relative = 1e-12);
    assert_eq!(&out[6..9], &[0.0, 0.0, 0.0]);
}
