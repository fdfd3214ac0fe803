//! Kernel configuration.
//!
//! Every field has a default, so an empty TOML table is a valid config:
//!
//! ```toml
//! workers = 8
//! accumulation = "atomic"
//! validation = "permissive"
//! cutoff = 2.5
//! ```

use crate::error::ForceError;
use crate::params::positive_finite;
use serde::{Deserialize, Serialize};

/// How concurrent contributions to the shared force array are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Accumulation {
    /// Private buffer per worker chunk, summed into the output in chunk order
    #[default]
    Reduce,
    /// Compare-and-swap f64 adds on a shared staging array
    Atomic,
}

/// Input checking policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Validation {
    /// Reject invalid parameters, and coincident or near-coincident pairs whose
    /// force is not finite, before touching the output
    #[default]
    Strict,
    /// No checks beyond buffer lengths; degenerate input yields inf/NaN forces
    Permissive,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KernelConfig {
    /// Worker threads; 0 lets rayon pick (one per logical CPU)
    pub workers: usize,
    pub accumulation: Accumulation,
    pub validation: Validation,
    /// Pairs farther apart than this are skipped. `None` visits every pair.
    pub cutoff: Option<f64>,
}

impl KernelConfig {
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_accumulation(mut self, accumulation: Accumulation) -> Self {
        self.accumulation = accumulation;
        self
    }

    pub fn with_validation(mut self, validation: Validation) -> Self {
        self.validation = validation;
        self
    }

    pub fn with_cutoff(mut self, cutoff: Option<f64>) -> Self {
        self.cutoff = cutoff;
        self
    }

    /// Parse configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self, ForceError> {
        Ok(toml::from_str(content)?)
    }

    pub fn validate(&self) -> Result<(), ForceError> {
        match self.cutoff {
            Some(rc) => positive_finite("cutoff", rc),
            None => Ok(()),
        }
    }
}
