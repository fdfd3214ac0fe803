//! Run configuration for the `ljforce` driver.
//!
//! ```toml
//! [kernel]
//! workers = 8
//! accumulation = "reduce"
//!
//! [system]
//! n = 500
//! boxsize = 5.0
//! spacing = 0.38
//! element = "Ar"
//! periodic = true
//! seed = 7
//! ```

use ljforce_core::{Boundary, ForceError, KernelConfig, LjParams};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub kernel: KernelConfig,
    pub system: SystemConfig,
}

/// The generated particle configuration and its interaction parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SystemConfig {
    pub n: usize,
    /// Cube edge, nm
    pub boxsize: f64,
    /// Lattice spacing the particles are placed on, nm
    pub spacing: f64,
    /// Element symbol for the built-in parameter table, used unless both
    /// `sigma` and `eps` are given
    pub element: String,
    pub sigma: Option<f64>,
    pub eps: Option<f64>,
    pub periodic: bool,
    pub seed: u64,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            n: 500,
            boxsize: 5.0,
            spacing: 0.38,
            element: "Ar".to_string(),
            sigma: None,
            eps: None,
            periodic: true,
            seed: 0,
        }
    }
}

impl RunConfig {
    /// Load configuration from TOML file
    pub fn from_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        Ok(Self::from_toml_str(&content)?)
    }

    /// Parse configuration from TOML string
    pub fn from_toml_str(content: &str) -> Result<Self, ForceError> {
        toml::from_str(content).map_err(|e| ForceError::Config(e.to_string()))
    }
}

impl SystemConfig {
    pub fn lj_params(&self) -> Result<LjParams, ForceError> {
        match (self.sigma, self.eps) {
            (Some(sigma), Some(eps)) => Ok(LjParams::new(sigma, eps)),
            _ => LjParams::for_element(&self.element),
        }
    }

    pub fn boundary(&self) -> Boundary {
        Boundary::from_flag(self.periodic, self.boxsize)
    }
}
