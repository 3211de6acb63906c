//! Physical constants and model parameters for flapping-wing calculations.
//!
//! Every parameter set derives serde so a whole [`SimulationConfig`] can be loaded from
//! JSON, and exposes `from_slice` / `to_slice` so it can be driven by an optimizer.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{KinematicsError, Result};

/// Inclination of the stroke plane relative to the body (deg).
pub const STROKE_PLANE_ANGLE_DEG: f64 = -90.0;

/// Body yaw in the lab frame (deg). Roll and pitch are zero in hover.
pub const BODY_YAW_DEG: f64 = 180.0;

/// Point where the net force is applied when computing power, in wing lengths (WING frame).
pub const POWER_REFERENCE_POSITION: [f64; 3] = [-0.26, 0.59, 0.0];

/// Dimensional constants used to scale the non-dimensional forces and power.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DimensionalParams {
    /// Insect mass (kg)
    pub mass: f64,

    /// Gravitational acceleration (m/s²)
    pub gravity: f64,

    /// Air density (kg/m³)
    pub density: f64,

    /// Wing length R (m)
    pub wing_length: f64,

    /// Wingbeat frequency (Hz)
    pub frequency: f64,
}

impl DimensionalParams {
    /// Bumblebee values.
    pub const fn new() -> Self {
        Self {
            mass: 175e-6,
            gravity: 9.81,
            density: 1.2,
            wing_length: 13.2e-3,
            frequency: 150.0,
        }
    }

    /// Half the body weight: the vertical force one wing must produce in hover.
    pub fn weight_per_wing(&self) -> f64 {
        0.5 * self.mass * self.gravity
    }

    /// Factor turning a non-dimensional force into newtons at `frequency`.
    pub fn force_scale(&self, frequency: f64) -> f64 {
        self.density * self.wing_length.powi(4) * frequency.powi(2)
    }

    /// Factor turning a non-dimensional power into watts at `frequency`.
    pub fn power_scale(&self, frequency: f64) -> f64 {
        self.density * self.wing_length.powi(5) * frequency.powi(3)
    }

    /// Get a summary of constants as a hash map for reporting.
    pub fn summary(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();
        map.insert("mass (kg)".to_string(), format!("{:.3e}", self.mass));
        map.insert("g (m/s²)".to_string(), format!("{:.3}", self.gravity));
        map.insert("ρ_air (kg/m³)".to_string(), format!("{:.3}", self.density));
        map.insert("R (m)".to_string(), format!("{:.4}", self.wing_length));
        map.insert("f (Hz)".to_string(), format!("{:.1}", self.frequency));
        map
    }
}

impl Default for DimensionalParams {
    fn default() -> Self {
        Self::new()
    }
}

/// Model-specific parameters and tuning constants.
pub mod model_params {
    use serde::{Deserialize, Serialize};

    use crate::error::{KinematicsError, Result};

    fn expect_len(p: &[f64], len: usize, what: &str) -> Result<()> {
        if p.len() < len {
            return Err(KinematicsError::InvalidArgumentType(format!(
                "{what} require at least {len} elements (got {})",
                p.len()
            )));
        }
        Ok(())
    }

    /// Prescribed wingbeat kinematics. Angles in degrees, timings in stroke periods.
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct WingbeatParams {
        /// Peak-to-peak stroke angle PHI
        pub stroke_amplitude: f64,
        /// Mean stroke angle `phi_m`
        pub mean_stroke: f64,
        /// Supination/pronation shift `d_tau`
        pub rotation_delay: f64,
        /// Feathering angle on the downstroke
        pub alpha_down: f64,
        /// Feathering angle on the upstroke
        pub alpha_up: f64,
        /// Wing rotation duration tau
        pub rotation_duration: f64,
        /// Constant deviation angle `theta0`
        pub deviation: f64,
    }

    impl WingbeatParams {
        /// Bumblebee hover kinematics.
        pub fn default_params() -> Self {
            Self {
                stroke_amplitude: 115.0,
                mean_stroke: 24.0,
                rotation_delay: 0.0,
                alpha_down: 70.0,
                alpha_up: -40.0,
                rotation_duration: 0.22,
                deviation: 12.55 / 2.0,
            }
        }

        /// Reads the seven parameters in field order.
        pub fn from_slice(p: &[f64]) -> Result<Self> {
            expect_len(p, 7, "Wingbeat params")?;
            Ok(Self {
                stroke_amplitude: p[0],
                mean_stroke: p[1],
                rotation_delay: p[2],
                alpha_down: p[3],
                alpha_up: p[4],
                rotation_duration: p[5],
                deviation: p[6],
            })
        }

        /// Inverse of [`WingbeatParams::from_slice`].
        pub fn to_slice(&self) -> [f64; 7] {
            [
                self.stroke_amplitude,
                self.mean_stroke,
                self.rotation_delay,
                self.alpha_down,
                self.alpha_up,
                self.rotation_duration,
                self.deviation,
            ]
        }

        /// Copy with a different stroke amplitude (deg).
        pub fn with_stroke_amplitude(mut self, stroke_amplitude: f64) -> Self {
            self.stroke_amplitude = stroke_amplitude;
            self
        }

        /// Rejects non-finite values and rotation durations outside `(0, 0.5]`.
        pub fn validate(&self) -> Result<()> {
            let names = [
                "stroke_amplitude",
                "mean_stroke",
                "rotation_delay",
                "alpha_down",
                "alpha_up",
                "rotation_duration",
                "deviation",
            ];
            for (name, value) in names.into_iter().zip(self.to_slice()) {
                if !value.is_finite() {
                    return Err(KinematicsError::InvalidParameter { name, value });
                }
            }
            if self.rotation_duration <= 0.0 || self.rotation_duration > 0.5 {
                return Err(KinematicsError::InvalidParameter {
                    name: "rotation_duration",
                    value: self.rotation_duration,
                });
            }
            Ok(())
        }
    }

    impl Default for WingbeatParams {
        fn default() -> Self {
            Self::default_params()
        }
    }

    /// Lift and drag coefficient fit `K1 + K2 sin(a α − b)`.
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct CoefficientModel {
        /// Lift offset
        pub k1: f64,
        /// Lift amplitude
        pub k2: f64,
        /// Drag offset
        pub k3: f64,
        /// Drag amplitude
        pub k4: f64,
    }

    impl CoefficientModel {
        /// Revolving-wing fit at Re ≈ 100.
        pub fn default_params() -> Self {
            Self {
                k1: -0.2083,
                k2: 0.4193,
                k3: 0.2509,
                k4: -0.2656,
            }
        }

        /// Reads `[K1, K2, K3, K4]`.
        pub fn from_slice(p: &[f64]) -> Result<Self> {
            expect_len(p, 4, "Coefficient params")?;
            Ok(Self {
                k1: p[0],
                k2: p[1],
                k3: p[2],
                k4: p[3],
            })
        }

        /// `[K1, K2, K3, K4]`.
        pub fn to_slice(&self) -> [f64; 4] {
            [self.k1, self.k2, self.k3, self.k4]
        }
    }

    impl Default for CoefficientModel {
        fn default() -> Self {
            Self::default_params()
        }
    }

    /// Empirical coefficients of the rotational and added-mass force terms.
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct ForceCoefficients {
        /// Rotational circulation
        pub c_rc: f64,
        /// Rotational damping
        pub c_rd: f64,
        /// Chordwise added mass: `u̇_z`, `ω̇_y`
        pub c_amx: [f64; 2],
        /// Normal added mass: `u̇_xyz`, `ω̇_xyz`
        pub c_amz: [f64; 6],
    }

    impl ForceCoefficients {
        /// Empirical values fitted to the reference wing.
        pub fn default_params() -> Self {
            Self {
                c_rc: 0.0972,
                c_rd: 0.0626,
                c_amx: [-0.0045, 0.0017],
                c_amz: [0.0211, 0.0422, 0.1479, -0.1697, -0.0063, 0.0242],
            }
        }

        /// Reads `c_rc, c_rd`, then the two chordwise and six normal added-mass values.
        pub fn from_slice(p: &[f64]) -> Result<Self> {
            expect_len(p, 10, "Force coefficients")?;
            Ok(Self {
                c_rc: p[0],
                c_rd: p[1],
                c_amx: [p[2], p[3]],
                c_amz: [p[4], p[5], p[6], p[7], p[8], p[9]],
            })
        }

        /// Same layout as [`ForceCoefficients::from_slice`].
        pub fn to_slice(&self) -> [f64; 10] {
            let mut slice = [0.0; 10];
            slice[0] = self.c_rc;
            slice[1] = self.c_rd;
            slice[2..4].copy_from_slice(&self.c_amx);
            slice[4..].copy_from_slice(&self.c_amz);
            slice
        }
    }

    impl Default for ForceCoefficients {
        fn default() -> Self {
            Self::default_params()
        }
    }
}

use model_params::{CoefficientModel, ForceCoefficients, WingbeatParams};

/// Everything a pipeline run needs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of time samples over one stroke period
    pub samples: usize,
    /// Prescribed wing motion
    pub wingbeat: WingbeatParams,
    /// Lift and drag coefficient fit
    pub coefficients: CoefficientModel,
    /// Rotational and added-mass coefficients
    pub forces: ForceCoefficients,
    /// Physical scales for dimensional output
    pub dimensional: DimensionalParams,
}

impl SimulationConfig {
    /// Samples per period used by [`SimulationConfig::new`].
    pub const DEFAULT_SAMPLES: usize = 400;

    /// Default bumblebee hover configuration.
    pub fn new() -> Self {
        Self {
            samples: Self::DEFAULT_SAMPLES,
            wingbeat: WingbeatParams::default_params(),
            coefficients: CoefficientModel::default_params(),
            forces: ForceCoefficients::default_params(),
            dimensional: DimensionalParams::new(),
        }
    }

    /// Coarse grid for quick parameter sweeps.
    pub fn coarse(samples: usize) -> Self {
        Self {
            samples,
            ..Self::new()
        }
    }

    /// Checks the sample count and the wingbeat parameters.
    pub fn validate(&self) -> Result<()> {
        if self.samples < 2 {
            return Err(KinematicsError::InvalidParameter {
                name: "samples",
                value: self.samples as f64,
            });
        }
        self.wingbeat.validate()
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::new()
    }
}
