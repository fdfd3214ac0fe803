//! Whole-array statistics over flat force buffers.

/// Sum of the per-particle force vectors. Zero up to rounding for a closed
/// system, by Newton's third law.
pub fn net_force(forces: &[f64]) -> [f64; 3] {
    forces.chunks_exact(3).fold([0.0; 3], |acc, f| {
        [acc[0] + f[0], acc[1] + f[1], acc[2] + f[2]]
    })
}

/// Largest per-particle force magnitude
pub fn max_force(forces: &[f64]) -> f64 {
    forces
        .chunks_exact(3)
        .map(|f| (f[0] * f[0] + f[1] * f[1] + f[2] * f[2]).sqrt())
        .fold(0.0, f64::max)
}

/// Largest `|a - b| / max(|a|, |b|, floor)` over two arrays of equal length.
/// `floor` keeps near-zero components from dominating.
pub fn max_relative_diff(a: &[f64], b: &[f64], floor: f64) -> f64 {
    assert_eq!(a.len(), b.len(), "arrays differ in length");
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).abs() / x.abs().max(y.abs()).max(floor))
        .fold(0.0, f64::max)
}
