//! All-pairs Lennard-Jones force evaluation.
//!
//! For every unordered pair `(i, j)` with `i < j` the kernel computes the
//! displacement `d = r_j - r_i` (minimum image when periodic), the factor
//!
//! ```text
//! fac = -24 * eps * (2 * sigma^12 / r^14 - sigma^6 / r^8)
//! ```
//!
//! from even powers of `r^2` only, and adds `fac * d` to particle `i` and
//! subtracts it from particle `j`. Forces are accumulated into the caller's
//! buffer; it is never cleared.

use crate::accumulate::{atomic_into, reduce_into};
use crate::config::{Accumulation, KernelConfig, Validation};
use crate::error::ForceError;
use crate::params::{Boundary, LjParams};
use glam::DVec3;
use log::{debug, info, warn};

/// Map a displacement onto its nearest periodic image. `d / boxsize` is
/// rounded half to even, the same rule as `rint` in the default rounding
/// mode.
pub fn minimum_image(d: DVec3, boxsize: f64) -> DVec3 {
    let wrap = |x: f64| x - boxsize * (x / boxsize).round_ties_even();
    DVec3::new(wrap(d.x), wrap(d.y), wrap(d.z))
}

/// Force exerted on the particle at `pi` by the particle at `pj`. The force
/// on `pj` is exactly the negation.
pub fn pair_force(pi: DVec3, pj: DVec3, params: &LjParams, boundary: &Boundary) -> DVec3 {
    let law = PairLaw::new(params, boundary, None, Validation::Permissive);
    let d = law.wrap(pj - pi);
    d * law.factor(d.length_squared())
}

/// Per-pair force law with the sigma powers hoisted out of the loop
#[derive(Debug, Clone, Copy)]
pub(crate) struct PairLaw {
    s6: f64,
    s12: f64,
    eps: f64,
    boxsize: Option<f64>,
    cutoff_sq: Option<f64>,
    strict: bool,
}

impl PairLaw {
    pub(crate) fn new(
        params: &LjParams,
        boundary: &Boundary,
        cutoff: Option<f64>,
        validation: Validation,
    ) -> Self {
        let sigma = params.sigma;
        let s6 = sigma * sigma * sigma * sigma * sigma * sigma;
        Self {
            s6,
            s12: s6 * s6,
            eps: params.eps,
            boxsize: match *boundary {
                Boundary::Open => None,
                Boundary::Periodic { boxsize } => Some(boxsize),
            },
            cutoff_sq: cutoff.map(|rc| rc * rc),
            strict: validation == Validation::Strict,
        }
    }

    #[inline]
    fn wrap(&self, d: DVec3) -> DVec3 {
        match self.boxsize {
            Some(boxsize) => minimum_image(d, boxsize),
            None => d,
        }
    }

    #[inline]
    fn factor(&self, rsq: f64) -> f64 {
        let rsq4 = rsq * rsq * rsq * rsq;
        let rsq7 = rsq4 * rsq * rsq * rsq;
        -24.0 * self.eps * (2.0 * (self.s12 / rsq7) - self.s6 / rsq4)
    }

    /// Visit every pair `(i, j)` with `j > i`, handing `emit` the partner
    /// index and the force on `i`.
    #[inline]
    pub(crate) fn visit_row(
        &self,
        positions: &[f64],
        n: usize,
        i: usize,
        mut emit: impl FnMut(usize, DVec3),
    ) -> Result<(), ForceError> {
        let ri = DVec3::new(positions[i * 3], positions[i * 3 + 1], positions[i * 3 + 2]);
        for j in (i + 1)..n {
            let rj = DVec3::new(positions[j * 3], positions[j * 3 + 1], positions[j * 3 + 2]);
            let d = self.wrap(rj - ri);
            let rsq = d.length_squared();

            if self.strict && rsq == 0.0 {
                return Err(ForceError::CoincidentParticles { i, j });
            }
            if let Some(cutoff_sq) = self.cutoff_sq {
                if rsq > cutoff_sq {
                    continue;
                }
            }

            let force = d * self.factor(rsq);
            if self.strict && !force.is_finite() {
                return Err(ForceError::SingularPair { i, j, rsq });
            }
            emit(j, force);
        }
        Ok(())
    }
}

/// A configured force evaluator owning its worker pool
#[derive(Debug)]
pub struct ForceKernel {
    params: LjParams,
    boundary: Boundary,
    config: KernelConfig,
    law: PairLaw,
    pool: Option<rayon::ThreadPool>,
}

impl ForceKernel {
    /// Build a kernel. Under strict validation the parameters, the box and
    /// the cutoff are checked here, once, rather than on every evaluation.
    pub fn new(
        params: LjParams,
        boundary: Boundary,
        config: KernelConfig,
    ) -> Result<Self, ForceError> {
        if config.validation == Validation::Strict {
            params.validate()?;
            boundary.validate()?;
            config.validate()?;
        }

        // workers == 0 runs on rayon's global pool
        let pool = match config.workers {
            0 => None,
            workers => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(workers)
                    .thread_name(|idx| format!("ljforce-{idx}"))
                    .build()?,
            ),
        };

        let law = PairLaw::new(&params, &boundary, config.cutoff, config.validation);
        let kernel = Self {
            params,
            boundary,
            config,
            law,
            pool,
        };
        info!(
            "force kernel ready: sigma={} eps={} {:?}, {} workers, {:?} accumulation, {:?} validation",
            kernel.params.sigma,
            kernel.params.eps,
            kernel.boundary,
            kernel.workers(),
            kernel.config.accumulation,
            kernel.config.validation
        );
        Ok(kernel)
    }

    pub fn params(&self) -> &LjParams {
        &self.params
    }

    pub fn boundary(&self) -> &Boundary {
        &self.boundary
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    /// Number of workers the outer loop is split across
    pub fn workers(&self) -> usize {
        match &self.pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        }
    }

    /// Add the forces for `positions` (3 values per particle) into `out`.
    pub fn accumulate(&self, positions: &[f64], out: &mut [f64]) -> Result<(), ForceError> {
        let n = positions.len() / 3;
        if positions.len() != n * 3 {
            return Err(ForceError::BufferLength {
                name: "positions",
                expected: n * 3,
                actual: positions.len(),
            });
        }
        self.accumulate_n(positions, out, n)
    }

    /// Add the forces for the first `n` particles into the first `3n`
    /// entries of `out`. Entries past `3n` are left alone.
    pub fn accumulate_n(
        &self,
        positions: &[f64],
        out: &mut [f64],
        n: usize,
    ) -> Result<(), ForceError> {
        let len = n
            .checked_mul(3)
            .ok_or_else(|| ForceError::invalid("n", n as f64, "3n overflows usize"))?;
        if positions.len() < len {
            return Err(ForceError::BufferLength {
                name: "positions",
                expected: len,
                actual: positions.len(),
            });
        }
        if out.len() < len {
            return Err(ForceError::BufferLength {
                name: "out",
                expected: len,
                actual: out.len(),
            });
        }
        if n < 2 {
            return Ok(());
        }

        let workers = self.workers();
        debug!(
            "evaluating {} pairs of {} particles on {} workers",
            n * (n - 1) / 2,
            n,
            workers
        );

        let positions = &positions[..len];
        let out = &mut out[..len];
        let law = &self.law;
        let result = self.run(|| match self.config.accumulation {
            Accumulation::Reduce => reduce_into(law, positions, out, n, workers),
            Accumulation::Atomic => atomic_into(law, positions, out, n, workers),
        });

        if let Err(err) = &result {
            warn!("force evaluation rejected, output left unchanged: {err}");
        }
        result
    }

    /// Forces on a fresh zeroed accumulator
    pub fn evaluate(&self, positions: &[f64]) -> Result<Vec<f64>, ForceError> {
        let mut out = vec![0.0; positions.len()];
        self.accumulate(positions, &mut out)?;
        Ok(out)
    }

    fn run<R, F>(&self, f: F) -> R
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        match &self.pool {
            Some(pool) => pool.install(f),
            None => f(),
        }
    }
}

/// Flat entry point: add the Lennard-Jones forces on `n` particles into
/// `out`, with the default kernel configuration (strict validation,
/// reduce accumulation, rayon's global pool). `boxsize` is ignored unless
/// `periodic` is set.
pub fn compute_forces(
    positions: &[f64],
    out: &mut [f64],
    n: usize,
    sigma: f64,
    eps: f64,
    periodic: bool,
    boxsize: f64,
) -> Result<(), ForceError> {
    let kernel = ForceKernel::new(
        LjParams::new(sigma, eps),
        Boundary::from_flag(periodic, boxsize),
        KernelConfig::default(),
    )?;
    kernel.accumulate_n(positions, out, n)
}
