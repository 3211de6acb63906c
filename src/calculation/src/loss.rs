//! Objective functions for fitting wingbeat parameters.
//!
//! An external optimizer drives these through [`CostFunction::evaluate`]. Each call runs
//! the full pipeline on a fresh solution and frame registry, so independent evaluations
//! share no state.

use tracing::debug;

use crate::constants::SimulationConfig;
use crate::error::{KinematicsError, Result};
use crate::metrics::CycleMetrics;
use crate::pipeline::run_pipeline;

/// Scalar objective over a parameter vector.
pub trait CostFunction {
    /// Number of parameters [`CostFunction::evaluate`] expects.
    fn n_params(&self) -> usize;

    /// Cost of the given parameters.
    fn evaluate(&self, params: &[f64]) -> Result<f64>;

    /// Cost scaled by `weight` (for combining several objectives).
    fn evaluate_weighted(&self, params: &[f64], weight: f64) -> Result<f64> {
        Ok(self.evaluate(params)? * weight)
    }
}

/// Hover objective over `[stroke_amplitude_deg, frequency_hz]`.
///
/// `(mean(F_z) − ½ m g)² + mean(P)²` with force and power in SI units: the wing must
/// carry half the body weight while spending as little power as possible.
#[derive(Debug, Clone, PartialEq)]
pub struct HoverCost {
    /// Base configuration; the stroke amplitude is overridden per evaluation
    pub config: SimulationConfig,
}

impl Default for HoverCost {
    fn default() -> Self {
        Self::new(SimulationConfig::new())
    }
}

impl HoverCost {
    /// Cost evaluated against `config`.
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    /// Cycle metrics of one evaluation, before the cost is formed.
    pub fn metrics(&self, stroke_amplitude: f64) -> Result<CycleMetrics> {
        let config = SimulationConfig {
            wingbeat: self.config.wingbeat.with_stroke_amplitude(stroke_amplitude),
            ..self.config
        };
        let solution = run_pipeline(&config)?;
        CycleMetrics::from_solution(&solution)
    }

    /// Initial guess taken from the base configuration.
    pub fn initial_guess(&self) -> [f64; 2] {
        [
            self.config.wingbeat.stroke_amplitude,
            self.config.dimensional.frequency,
        ]
    }
}

impl CostFunction for HoverCost {
    fn n_params(&self) -> usize {
        2
    }

    fn evaluate(&self, params: &[f64]) -> Result<f64> {
        let [stroke_amplitude, frequency] = params else {
            return Err(KinematicsError::InvalidArgumentType(format!(
                "hover cost expects [stroke_amplitude, frequency] (got {} values)",
                params.len()
            )));
        };
        if !frequency.is_finite() {
            return Err(KinematicsError::InvalidParameter {
                name: "frequency",
                value: *frequency,
            });
        }

        let metrics = self.metrics(*stroke_amplitude)?;
        let dimensional = &self.config.dimensional;
        let lift_error = metrics.vertical_force(dimensional, *frequency) - dimensional.weight_per_wing();
        let power = metrics.power(dimensional, *frequency);
        let cost = lift_error.powi(2) + power.powi(2);

        debug!(stroke_amplitude, frequency, cost, "evaluated hover cost");
        Ok(cost)
    }
}

/// Evaluates `cost` with parameter `index` set to each of `values` in turn.
pub fn sweep_parameter<C: CostFunction>(
    cost: &C,
    base: &[f64],
    index: usize,
    values: &[f64],
) -> Result<Vec<(f64, f64)>> {
    if base.len() != cost.n_params() || index >= base.len() {
        return Err(KinematicsError::InvalidArgumentType(format!(
            "cannot sweep parameter {index} of {} (cost takes {})",
            base.len(),
            cost.n_params()
        )));
    }

    let mut params = base.to_vec();
    values
        .iter()
        .map(|&value| {
            params[index] = value;
            Ok((value, cost.evaluate(&params)?))
        })
        .collect()
}
