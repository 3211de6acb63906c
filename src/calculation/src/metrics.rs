//! Stroke-averaged metrics of a kinematics solution.
//!
//! These condense a full pipeline run into a handful of numbers: cycle-mean force and
//! power, peak force and mean angle of attack. They feed both the console report and
//! the hover cost.

use std::collections::HashMap;

use crate::constants::DimensionalParams;
use crate::error::Result;
use crate::solution::KinematicsSolution;

/// Cycle-averaged quantities, non-dimensional unless noted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleMetrics {
    /// Number of samples averaged over
    pub samples: usize,
    /// Mean net force (x, y, z), GLOBAL
    pub mean_force: [f64; 3],
    /// Largest net force magnitude
    pub peak_force: f64,
    /// Mean aerodynamic power
    pub mean_power: f64,
    /// Largest absolute power
    pub peak_power: f64,
    /// Mean angle of attack (deg)
    pub mean_angle_of_attack: f64,
}

impl CycleMetrics {
    /// Computes the metrics of a completed solution.
    pub fn from_solution(solution: &KinematicsSolution) -> Result<Self> {
        let net_force = KinematicsSolution::require(&solution.net_force, "net_force")?;
        let power = KinematicsSolution::require(&solution.power, "power")?;
        let angle_of_attack = KinematicsSolution::require(&solution.angle_of_attack, "angle_of_attack")?;

        let samples = net_force.len();
        let mut mean_force = [0.0; 3];
        for (axis, mean) in mean_force.iter_mut().enumerate() {
            *mean = net_force.component(axis).mean().unwrap_or(0.0);
        }

        Ok(Self {
            samples,
            mean_force,
            peak_force: net_force.norm().iter().cloned().fold(0.0, f64::max),
            mean_power: power.mean().unwrap_or(0.0),
            peak_power: power.iter().map(|p| p.abs()).fold(0.0, f64::max),
            mean_angle_of_attack: angle_of_attack.degrees().mean().unwrap_or(0.0),
        })
    }

    /// Mean vertical force in newtons at `frequency`.
    pub fn vertical_force(&self, dimensional: &DimensionalParams, frequency: f64) -> f64 {
        self.mean_force[2] * dimensional.force_scale(frequency)
    }

    /// Mean power in watts at `frequency`.
    pub fn power(&self, dimensional: &DimensionalParams, frequency: f64) -> f64 {
        self.mean_power * dimensional.power_scale(frequency)
    }

    /// Ratio of mean vertical force to the per-wing share of the body weight.
    pub fn lift_to_weight(&self, dimensional: &DimensionalParams, frequency: f64) -> f64 {
        self.vertical_force(dimensional, frequency) / dimensional.weight_per_wing()
    }

    /// True when every metric is finite.
    pub fn is_valid(&self) -> bool {
        self.mean_force
            .iter()
            .chain([
                &self.peak_force,
                &self.mean_power,
                &self.peak_power,
                &self.mean_angle_of_attack,
            ])
            .all(|v| v.is_finite())
    }

    /// Get a summary of metrics as a hash map for reporting.
    pub fn get_summary(&self) -> HashMap<String, f64> {
        let mut summary = HashMap::new();
        summary.insert("samples".to_string(), self.samples as f64);
        summary.insert("mean_force_x".to_string(), self.mean_force[0]);
        summary.insert("mean_force_y".to_string(), self.mean_force[1]);
        summary.insert("mean_force_z".to_string(), self.mean_force[2]);
        summary.insert("peak_force".to_string(), self.peak_force);
        summary.insert("mean_power".to_string(), self.mean_power);
        summary.insert("peak_power".to_string(), self.peak_power);
        summary.insert("mean_aoa_deg".to_string(), self.mean_angle_of_attack);
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::angle::{Angle, AngleUnit};
    use crate::error::KinematicsError;
    use crate::referential::Referential;
    use crate::vector::Vector3D;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn synthetic_solution() -> KinematicsSolution {
        KinematicsSolution {
            net_force: Some(
                Vector3D::new(array![[3.0, -1.0], [4.0, 1.0], [0.0, 2.0]], Referential::Global).unwrap(),
            ),
            power: Some(array![1.0, -3.0]),
            angle_of_attack: Some(Angle::from_vec(vec![0.5, 1.0], AngleUnit::Radians)),
            ..KinematicsSolution::new()
        }
    }

    #[test]
    fn test_from_solution() {
        let metrics = CycleMetrics::from_solution(&synthetic_solution()).unwrap();
        assert_eq!(metrics.samples, 2);
        assert_eq!(metrics.mean_force, [1.0, 2.5, 1.0]);
        assert_relative_eq!(metrics.peak_force, 5.0);
        assert_relative_eq!(metrics.mean_power, -1.0);
        assert_relative_eq!(metrics.peak_power, 3.0);
        assert_relative_eq!(metrics.mean_angle_of_attack, 0.75_f64.to_degrees());
        assert!(metrics.is_valid());
    }

    #[test]
    fn test_dimensional_values() {
        let metrics = CycleMetrics::from_solution(&synthetic_solution()).unwrap();
        let d = DimensionalParams::new();
        assert_relative_eq!(metrics.vertical_force(&d, 100.0), d.force_scale(100.0));
        assert_relative_eq!(metrics.power(&d, 100.0), -d.power_scale(100.0));
        assert_relative_eq!(
            metrics.lift_to_weight(&d, 100.0),
            d.force_scale(100.0) / d.weight_per_wing()
        );
    }

    #[test]
    fn test_summary() {
        let metrics = CycleMetrics::from_solution(&synthetic_solution()).unwrap();
        let summary = metrics.get_summary();
        assert_eq!(summary.len(), 8);
        assert_eq!(summary["mean_force_y"], 2.5);
    }

    #[test]
    fn test_incomplete_solution() {
        assert_eq!(
            CycleMetrics::from_solution(&KinematicsSolution::new()),
            Err(KinematicsError::MissingField("net_force"))
        );
    }
}
