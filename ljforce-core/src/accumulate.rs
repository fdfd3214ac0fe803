//! Combining per-pair contributions from concurrent workers.
//!
//! The outer particle index is split statically into contiguous chunks, one
//! per worker. A worker owning particle `i` also writes to every `j > i`, so
//! chunks overlap in the output and the writes have to be combined:
//!
//! - [`reduce_into`] gives each chunk a private zeroed buffer and adds the
//!   buffers into the output after the join, chunk 0 first. For a fixed
//!   worker count the result is bit-reproducible.
//! - [`atomic_into`] stages the output as `AtomicU64` bit patterns and adds
//!   with a compare-and-swap loop per component. Summation order depends on
//!   scheduling.
//!
//! Both only write the caller's buffer once every chunk has succeeded.

use crate::error::ForceError;
use crate::kernel::PairLaw;
use rayon::prelude::*;
use std::ops::Range;
use std::sync::atomic::{AtomicU64, Ordering};

/// Split `0..n` into at most `parts` contiguous ranges whose lengths differ
/// by at most one, longer ranges first.
pub(crate) fn static_chunks(n: usize, parts: usize) -> Vec<Range<usize>> {
    let parts = parts.clamp(1, n.max(1));
    let base = n / parts;
    let extra = n % parts;

    let mut start = 0;
    (0..parts)
        .map(|k| {
            let len = base + usize::from(k < extra);
            let range = start..start + len;
            start += len;
            range
        })
        .collect()
}

pub(crate) fn reduce_into(
    law: &PairLaw,
    positions: &[f64],
    out: &mut [f64],
    n: usize,
    workers: usize,
) -> Result<(), ForceError> {
    let partials = static_chunks(n, workers)
        .into_par_iter()
        .map(|rows| -> Result<Vec<f64>, ForceError> {
            let mut buf = vec![0.0; n * 3];
            for i in rows {
                law.visit_row(positions, n, i, |j, f| {
                    buf[i * 3] += f.x;
                    buf[i * 3 + 1] += f.y;
                    buf[i * 3 + 2] += f.z;

                    buf[j * 3] -= f.x;
                    buf[j * 3 + 1] -= f.y;
                    buf[j * 3 + 2] -= f.z;
                })?;
            }
            Ok(buf)
        })
        .collect::<Result<Vec<_>, ForceError>>()?;

    for buf in &partials {
        for (slot, value) in out.iter_mut().zip(buf) {
            *slot += value;
        }
    }
    Ok(())
}

pub(crate) fn atomic_into(
    law: &PairLaw,
    positions: &[f64],
    out: &mut [f64],
    n: usize,
    workers: usize,
) -> Result<(), ForceError> {
    let staged: Vec<AtomicU64> = out.iter().map(|v| AtomicU64::new(v.to_bits())).collect();

    static_chunks(n, workers)
        .into_par_iter()
        .try_for_each(|rows| {
            for i in rows {
                law.visit_row(positions, n, i, |j, f| {
                    atomic_add(&staged[i * 3], f.x);
                    atomic_add(&staged[i * 3 + 1], f.y);
                    atomic_add(&staged[i * 3 + 2], f.z);

                    atomic_add(&staged[j * 3], -f.x);
                    atomic_add(&staged[j * 3 + 1], -f.y);
                    atomic_add(&staged[j * 3 + 2], -f.z);
                })?;
            }
            Ok::<(), ForceError>(())
        })?;

    // the join above orders every update before these loads
    for (slot, value) in out.iter_mut().zip(staged) {
        *slot = f64::from_bits(value.into_inner());
    }
    Ok(())
}

#[inline]
fn atomic_add(slot: &AtomicU64, delta: f64) {
    let mut current = slot.load(Ordering::Relaxed);
    loop {
        let next = (f64::from_bits(current) + delta).to_bits();
        match slot.compare_exchange_weak(current, next, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return,
            Err(actual) => current = actual,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunks_cover_range_in_order() {
        let chunks = static_chunks(10, 4);
        assert_eq!(chunks, vec![0..3, 3..6, 6..8, 8..10]);
    }

    #[test]
    fn more_workers_than_rows() {
        let chunks = static_chunks(3, 8);
        assert_eq!(chunks, vec![0..1, 1..2, 2..3]);
    }

    #[test]
    fn empty_range_yields_one_empty_chunk() {
        assert_eq!(static_chunks(0, 4), vec![0..0]);
    }

    #[test]
    fn atomic_add_accumulates() {
        let slot = AtomicU64::new(1.5f64.to_bits());
        atomic_add(&slot, 2.25);
        atomic_add(&slot, -0.75);
        assert_eq!(f64::from_bits(slot.into_inner()), 3.0);
    }

    #[test]
    fn concurrent_atomic_adds_are_not_lost() {
        let slot = AtomicU64::new(0f64.to_bits());
        (0..10_000).into_par_iter().for_each(|_| atomic_add(&slot, 1.0));
        assert_eq!(f64::from_bits(slot.into_inner()), 10_000.0);
    }
}
