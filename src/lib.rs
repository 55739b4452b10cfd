//! Electron cloud sampling for multi-electron atom visualization.
//!
//! Quantum numbers go in, colored point clouds come out. Rendering is left to
//! the caller: [`sampling::PointCloud::vertices`] produces a GPU-ready buffer.

pub mod config;
pub mod error;
pub mod orbitals;
pub mod physics;
pub mod sampling;
pub mod scene;

pub use config::{ServerConfig, SimulationConfig};
pub use error::{Error, Result};
pub use orbitals::{catalog, find_orbital, OrbitalInfo, Rgb, Shell};
pub use physics::{probability_density, QuantumNumbers};
pub use sampling::{generate_orbital_cloud, PointCloud, PointVertex};
pub use scene::{OrbitalScene, SceneUpdate};
