//! Interaction parameters and boundary conditions.
//!
//! Energies are in meV and lengths in nm for the built-in element table;
//! the kernel itself is unit-agnostic.

use crate::error::ForceError;
use serde::{Deserialize, Serialize};

/// Lennard-Jones length and energy scales
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LjParams {
    pub sigma: f64,
    pub eps: f64,
}

/// (symbol, eps in meV, sigma in nm)
const ELEMENT_TABLE: &[(&str, f64, f64)] = &[("Ne", 3.0840, 0.2782), ("Ar", 10.3230, 0.3405)];

impl LjParams {
    pub fn new(sigma: f64, eps: f64) -> Self {
        Self { sigma, eps }
    }

    /// Look up the built-in parameters for an element symbol, e.g. `"Ne"`.
    pub fn for_element(symbol: &str) -> Result<Self, ForceError> {
        ELEMENT_TABLE
            .iter()
            .find(|(sym, _, _)| *sym == symbol)
            .map(|&(_, eps, sigma)| Self { sigma, eps })
            .ok_or_else(|| ForceError::UnknownElement(symbol.to_string()))
    }

    /// Symbols with an entry in the built-in table
    pub fn known_elements() -> impl Iterator<Item = &'static str> {
        ELEMENT_TABLE.iter().map(|(sym, _, _)| *sym)
    }

    pub fn validate(&self) -> Result<(), ForceError> {
        positive_finite("sigma", self.sigma)?;
        positive_finite("eps", self.eps)
    }
}

/// Boundary conditions of the simulation cell
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Boundary {
    /// No wrapping; displacements are used as-is
    #[default]
    Open,
    /// Cubic periodic box with edge `boxsize`
    Periodic { boxsize: f64 },
}

impl Boundary {
    /// Build from the flat `periodic` flag + `boxsize` pair. `boxsize` is
    /// ignored when `periodic` is false.
    pub fn from_flag(periodic: bool, boxsize: f64) -> Self {
        if periodic {
            Self::Periodic { boxsize }
        } else {
            Self::Open
        }
    }

    pub fn is_periodic(&self) -> bool {
        matches!(self, Self::Periodic { .. })
    }

    pub fn validate(&self) -> Result<(), ForceError> {
        match *self {
            Self::Open => Ok(()),
            Self::Periodic { boxsize } => positive_finite("boxsize", boxsize),
        }
    }
}

pub(crate) fn positive_finite(name: &'static str, value: f64) -> Result<(), ForceError> {
    if !value.is_finite() {
        return Err(ForceError::invalid(name, value, "must be finite"));
    }
    if value <= 0.0 {
        return Err(ForceError::invalid(name, value, "must be positive"));
    }
    Ok(())
}
