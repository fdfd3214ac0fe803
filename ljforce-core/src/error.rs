use thiserror::Error;

/// Errors reported by the force kernel and its supporting builders
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ForceError {
    #[error("invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("buffer `{name}` has length {actual}, expected {expected}")]
    BufferLength {
        name: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("particles {i} and {j} occupy the same position")]
    CoincidentParticles { i: usize, j: usize },

    #[error("particles {i} and {j} are {rsq:e} apart squared, force is not finite")]
    SingularPair { i: usize, j: usize, rsq: f64 },

    #[error("no Lennard-Jones parameters for element '{0}'")]
    UnknownElement(String),

    #[error("lattice has {sites} sites, cannot place {requested} particles")]
    LatticeTooSmall { requested: usize, sites: usize },

    #[error("failed to build worker pool: {0}")]
    ThreadPool(String),

    #[error("config error: {0}")]
    Config(String),
}

impl ForceError {
    pub fn invalid(name: &'static str, value: f64, reason: &'static str) -> Self {
        Self::InvalidParameter {
            name,
            value,
            reason,
        }
    }
}

impl From<rayon::ThreadPoolBuildError> for ForceError {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        Self::ThreadPool(err.to_string())
    }
}

impl From<toml::de::Error> for ForceError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}
