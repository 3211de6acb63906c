//! Kinematics and quasi-steady aerodynamics of a flapping insect wing.
//!
//! This library provides:
//! - unit-tagged angle series and frame-tagged 3D vector series
//! - rotation matrices between the global, body, stroke-plane and wing frames,
//!   batched over time samples
//! - finite-difference time derivatives
//! - a staged pipeline from prescribed wingbeat angles to forces and power
//! - cycle metrics and a hover objective for parameter fitting
//!
//! # Example
//!
//! ```
//! use flapwing_calc::{run_pipeline, CycleMetrics, SimulationConfig};
//!
//! let solution = run_pipeline(&SimulationConfig::coarse(100)).unwrap();
//! let metrics = CycleMetrics::from_solution(&solution).unwrap();
//! assert!(metrics.is_valid());
//! ```

#![warn(missing_docs)]
#![warn(clippy::doc_markdown)]
#![allow(clippy::tabs_in_doc_comments)]
#![allow(clippy::inconsistent_struct_constructor)]

pub mod aerodynamics;
pub mod angle;
pub mod constants;
pub mod derivative;
pub mod error;
pub mod kinematics;
pub mod loss;
pub mod metrics;
pub mod pipeline;
pub mod referential;
pub mod rotation;
pub mod solution;
pub mod vector;

// Re-export key types and functions for easy use
pub use aerodynamics::{AerodynamicModel, ForceTerms, SinusoidalFit};
pub use angle::{Angle, AngleUnit};
pub use constants::{DimensionalParams, SimulationConfig};
pub use derivative::{time_derivative, TimeDerivative};
pub use error::{KinematicsError, Result};
pub use loss::{CostFunction, HoverCost};
pub use metrics::CycleMetrics;
pub use pipeline::run_pipeline;
pub use referential::{Referential, Transformations};
pub use rotation::RotationMatrix;
pub use solution::KinematicsSolution;
pub use vector::{cross, dot, normalize, Vector3D};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
