mod accumulate;
pub mod config;
pub mod error;
pub mod kernel;
pub mod lattice;
pub mod params;
pub mod summary;

pub use config::{Accumulation, KernelConfig, Validation};
pub use error::ForceError;
pub use kernel::{compute_forces, minimum_image, pair_force, ForceKernel};
pub use lattice::{random_lattice, random_lattice_seeded};
pub use params::{Boundary, LjParams};

pub use glam::DVec3;
