use std::env;
use std::fs;

use flapwing_calc::loss::{sweep_parameter, CostFunction, HoverCost};
use flapwing_calc::{run_pipeline, CycleMetrics, KinematicsSolution, SimulationConfig};
use ndarray::Array1;
use polars::prelude::*;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Rows of the sample table printed to the console
const PREVIEW_ROWS: usize = 10;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Optional JSON configuration as first argument
    let config = match env::args().nth(1) {
        Some(path) => {
            info!(%path, "loading configuration");
            serde_json::from_str::<SimulationConfig>(&fs::read_to_string(&path)?)?
        }
        None => SimulationConfig::new(),
    };

    println!("Physical Constants:");
    let mut constants: Vec<_> = config.dimensional.summary().into_iter().collect();
    constants.sort();
    for (k, v) in constants {
        println!("  {}: {}", k, v);
    }
    println!();

    let solution = run_pipeline(&config)?;
    let metrics = CycleMetrics::from_solution(&solution)?;
    if !metrics.is_valid() {
        warn!("cycle metrics contain non-finite values");
    }

    let frequency = config.dimensional.frequency;
    println!("=== Cycle metrics ({} samples) ===", metrics.samples);
    let mut summary: Vec<_> = metrics.get_summary().into_iter().collect();
    summary.sort_by(|a, b| a.0.cmp(&b.0));
    for (name, value) in summary {
        println!("{:>14}: {:.6}", name, value);
    }
    println!(
        "mean vertical force: {:.4e} N  (weight share {:.4e} N, ratio {:.3})",
        metrics.vertical_force(&config.dimensional, frequency),
        config.dimensional.weight_per_wing(),
        metrics.lift_to_weight(&config.dimensional, frequency),
    );
    println!("mean power: {:.4e} W", metrics.power(&config.dimensional, frequency));

    let df = solution_table(&solution)?;
    println!("\n=== First {PREVIEW_ROWS} samples ===");
    println!("{}", df.head(Some(PREVIEW_ROWS)));

    let means = df
        .clone()
        .lazy()
        .select([
            col("aoa_deg").mean(),
            col("c_l").mean(),
            col("c_d").mean(),
            col("f_z").max(),
        ])
        .collect()?;
    println!("\n=== Column statistics ===");
    println!("{}", means);

    // Coarse sweep of the hover cost over stroke amplitude
    println!("\n=== Hover cost sweep (f = {frequency} Hz) ===");
    let cost = HoverCost::new(SimulationConfig {
        samples: config.samples.clamp(2, 100),
        ..config
    });
    let amplitudes = Array1::linspace(90.0, 150.0, 7);
    let results = sweep_parameter(&cost, &cost.initial_guess(), 0, amplitudes.as_slice().unwrap_or(&[]))?;

    let mut best = (f64::NAN, f64::INFINITY);
    for (amplitude, value) in &results {
        println!("PHI = {:>6.1}°  cost = {:.4e}", amplitude, value);
        if *value < best.1 {
            best = (*amplitude, *value);
        }
    }
    println!("Best amplitude: {:.1}° (cost {:.4e})", best.0, best.1);

    let refined = HoverCost::new(config).evaluate(&[best.0, frequency])?;
    info!(amplitude = best.0, cost = refined, samples = config.samples, "refined best amplitude");

    Ok(())
}

/// Tabulates the per-sample quantities of a completed solution.
fn solution_table(solution: &KinematicsSolution) -> Result<DataFrame, Box<dyn std::error::Error>> {
    let time = KinematicsSolution::require(&solution.time, "time")?;
    let phi = KinematicsSolution::require(&solution.phi, "phi")?;
    let alpha = KinematicsSolution::require(&solution.alpha, "alpha")?;
    let aoa = KinematicsSolution::require(&solution.angle_of_attack, "angle_of_attack")?;
    let c_l = KinematicsSolution::require(&solution.lift_coefficient, "lift_coefficient")?;
    let c_d = KinematicsSolution::require(&solution.drag_coefficient, "drag_coefficient")?;
    let force = KinematicsSolution::require(&solution.net_force, "net_force")?;
    let power = KinematicsSolution::require(&solution.power, "power")?;

    let df = DataFrame::new(vec![
        Series::new("t", time.to_vec()),
        Series::new("phi_deg", phi.degrees().to_vec()),
        Series::new("alpha_deg", alpha.degrees().to_vec()),
        Series::new("aoa_deg", aoa.degrees().to_vec()),
        Series::new("c_l", c_l.to_vec()),
        Series::new("c_d", c_d.to_vec()),
        Series::new("f_x", force.component(0).to_vec()),
        Series::new("f_y", force.component(1).to_vec()),
        Series::new("f_z", force.component(2).to_vec()),
        Series::new("power", power.to_vec()),
    ])?;
    Ok(df)
}
