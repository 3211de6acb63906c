//! Prescribed wingbeat kinematics over one normalized stroke period.
//!
//! The stroke angle is a cosine centred on the mean stroke angle, the deviation is held
//! constant and the feathering angle switches between a downstroke and an upstroke
//! plateau through smooth cosine ramps around each stroke reversal.

use std::f64::consts::PI;

use ndarray::Array1;
use tracing::debug;

use crate::angle::{Angle, AngleUnit};
use crate::constants::model_params::WingbeatParams;
use crate::error::{KinematicsError, Result};

/// Time grid and the three prescribed angle series, in degrees.
#[derive(Debug, Clone, PartialEq)]
pub struct WingbeatKinematics {
    /// Normalized time, see [`time_grid`].
    pub time: Array1<f64>,
    /// Stroke angle.
    pub phi: Angle,
    /// Feathering angle.
    pub alpha: Angle,
    /// Deviation angle.
    pub theta: Angle,
}

/// `samples` strictly increasing normalized times inside `[0, 1)`.
///
/// Samples sit a quarter step after each grid point, so neither stroke reversal
/// (`t = 0` and `t = 0.5`) is ever hit exactly.
pub fn time_grid(samples: usize) -> Array1<f64> {
    let n = samples as f64;
    Array1::from_shape_fn(samples, |i| (i as f64 + 0.25) / n)
}

/// Stroke angle (deg) at normalized time `t`. Downstroke first.
pub fn stroke_angle(t: f64, params: &WingbeatParams) -> f64 {
    params.mean_stroke + 0.5 * params.stroke_amplitude * (2.0 * PI * t).cos()
}

/// Feathering angle (deg) at normalized time `t`.
pub fn feathering_angle(t: f64, params: &WingbeatParams) -> f64 {
    let half = 0.5 * params.rotation_duration;
    let (down, up) = (params.alpha_down, params.alpha_up);
    let ramp = |from: f64, to: f64, s: f64| from + (to - from) * 0.5 * (1.0 - (PI * s).cos());

    let u = (t - params.rotation_delay).rem_euclid(1.0);
    if (u - 0.5).abs() <= half {
        // Supination
        ramp(down, up, (u - 0.5 + half) / params.rotation_duration)
    } else if u < half {
        // Pronation, second half
        ramp(up, down, (u + half) / params.rotation_duration)
    } else if u > 1.0 - half {
        // Pronation, first half
        ramp(up, down, (u - 1.0 + half) / params.rotation_duration)
    } else if u < 0.5 {
        down
    } else {
        up
    }
}

/// Evaluates the prescribed angles on [`time_grid`].
pub fn evaluate_wingbeat(samples: usize, params: &WingbeatParams) -> Result<WingbeatKinematics> {
    if samples < 2 {
        return Err(KinematicsError::InvalidParameter {
            name: "samples",
            value: samples as f64,
        });
    }
    params.validate()?;

    let time = time_grid(samples);
    let phi = time.mapv(|t| stroke_angle(t, params));
    let alpha = time.mapv(|t| feathering_angle(t, params));
    let theta = Array1::from_elem(samples, params.deviation);

    debug!(
        samples,
        stroke_amplitude = params.stroke_amplitude,
        "evaluated wingbeat kinematics"
    );
    Ok(WingbeatKinematics {
        time,
        phi: Angle::new(phi, AngleUnit::Degrees),
        alpha: Angle::new(alpha, AngleUnit::Degrees),
        theta: Angle::new(theta, AngleUnit::Degrees),
    })
}
