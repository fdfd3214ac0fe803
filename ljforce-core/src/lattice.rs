//! Random non-overlapping starting configurations.
//!
//! Particles are dropped onto distinct sites of a cubic lattice with the
//! given spacing, so no two of them can coincide. Sites sit at
//! `k * spacing` for `(k + 1) * spacing <= boxsize`, which also keeps
//! periodic images at least `spacing` apart.

use crate::error::ForceError;
use crate::params::positive_finite;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Number of lattice sites along one edge of the box. The cast saturates,
/// so callers must check the cube of this for overflow.
pub fn sites_per_axis(boxsize: f64, spacing: f64) -> usize {
    (boxsize / spacing).floor() as usize
}

/// Place `n` particles on random distinct lattice sites inside
/// `[0, boxsize)^3`. Returns a flat `x, y, z` array of length `3n`.
pub fn random_lattice<R: Rng + ?Sized>(
    n: usize,
    boxsize: f64,
    spacing: f64,
    rng: &mut R,
) -> Result<Vec<f64>, ForceError> {
    positive_finite("boxsize", boxsize)?;
    positive_finite("spacing", spacing)?;

    let per_axis = sites_per_axis(boxsize, spacing);
    let (plane, sites) = per_axis
        .checked_mul(per_axis)
        .and_then(|plane| Some((plane, plane.checked_mul(per_axis)?)))
        .ok_or_else(|| {
            ForceError::invalid("boxsize", boxsize, "lattice site count overflows usize")
        })?;
    if sites < n {
        return Err(ForceError::LatticeTooSmall { requested: n, sites });
    }

    let mut positions = Vec::with_capacity(n * 3);
    for site in rand::seq::index::sample(rng, sites, n) {
        let a = site / plane;
        let b = (site / per_axis) % per_axis;
        let c = site % per_axis;
        positions.extend([a as f64 * spacing, b as f64 * spacing, c as f64 * spacing]);
    }
    Ok(positions)
}

/// [`random_lattice`] driven by a seeded [`StdRng`]
pub fn random_lattice_seeded(
    n: usize,
    boxsize: f64,
    spacing: f64,
    seed: u64,
) -> Result<Vec<f64>, ForceError> {
    let mut rng = StdRng::seed_from_u64(seed);
    random_lattice(n, boxsize, spacing, &mut rng)
}
