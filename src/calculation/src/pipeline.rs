//! Kinematics and force pipeline.
//!
//! Each stage takes the solution record by value, reads the fields earlier stages
//! produced and returns the record with its own fields set. [`run_pipeline`] chains them
//! in dependency order:
//!
//! 1. prescribed angles and their rates
//! 2. frame transformations
//! 3. wing unit vectors
//! 4. angular velocity (STROKE)
//! 5. tip velocity (WING)
//! 6. drag and lift directions (GLOBAL)
//! 7. angle of attack
//! 8. lift and drag coefficients
//! 9. planar angular velocity
//! 10. accelerations
//! 11. force terms and net force
//! 12. power

use ndarray::Array1;
use tracing::{debug, info, warn};

use crate::aerodynamics::{compute_force_terms, AerodynamicModel, ForceInputs, SinusoidalFit};
use crate::angle::{Angle, AngleUnit};
use crate::constants::model_params::{ForceCoefficients, WingbeatParams};
use crate::constants::{SimulationConfig, BODY_YAW_DEG, POWER_REFERENCE_POSITION, STROKE_PLANE_ANGLE_DEG};
use crate::derivative::time_derivative;
use crate::error::Result;
use crate::kinematics::evaluate_wingbeat;
use crate::referential::{Referential, Transformations};
use crate::solution::KinematicsSolution as Solution;
use crate::vector::{cross, dot, normalize, Vector3D};

/// Cosines further than this outside `[-1, 1]` are reported before clamping.
const COSINE_TOLERANCE: f64 = 1e-9;

/// Prescribed angles in the wing sign convention, and their rates.
///
/// The stroke and feathering angles of the wingbeat model are negated.
pub fn evaluate_angles_kinematics(
    mut solution: Solution,
    samples: usize,
    params: &WingbeatParams,
) -> Result<Solution> {
    let wingbeat = evaluate_wingbeat(samples, params)?;
    let time = wingbeat.time;
    let phi = wingbeat.phi.neg();
    let alpha = wingbeat.alpha.neg();
    let theta = wingbeat.theta;

    solution.phi_dt = Some(time_derivative(&time, &phi)?);
    solution.alpha_dt = Some(time_derivative(&time, &alpha)?);
    solution.theta_dt = Some(time_derivative(&time, &theta)?);
    solution.phi = Some(phi);
    solution.alpha = Some(alpha);
    solution.theta = Some(theta);
    solution.time = Some(time);

    debug!(samples, "stage: angles");
    Ok(solution)
}

/// Sets the hovering body attitude and builds the frame registry.
pub fn initialize_transformations(mut solution: Solution) -> Result<(Solution, Transformations)> {
    let eta = Angle::scalar(STROKE_PLANE_ANGLE_DEG, AngleUnit::Degrees);
    let psi = Angle::scalar(0.0, AngleUnit::Degrees);
    let beta = Angle::scalar(0.0, AngleUnit::Degrees);
    let gamma = Angle::scalar(BODY_YAW_DEG, AngleUnit::Degrees);

    let transformations = Transformations::from_angles(
        Solution::require(&solution.phi, "phi")?,
        Solution::require(&solution.alpha, "alpha")?,
        Solution::require(&solution.theta, "theta")?,
        &eta,
        &psi,
        &beta,
        &gamma,
    )?;

    solution.eta = Some(eta);
    solution.psi = Some(psi);
    solution.beta = Some(beta);
    solution.gamma = Some(gamma);

    debug!("stage: transformations");
    Ok((solution, transformations))
}

/// Wing axes: x chordwise, y spanwise, z normal.
pub fn define_unit_vectors(mut solution: Solution) -> Result<Solution> {
    solution.ex = Some(Vector3D::from_xyz(1.0, 0.0, 0.0, Referential::Wing));
    solution.ey = Some(Vector3D::from_xyz(0.0, 1.0, 0.0, Referential::Wing));
    solution.ez = Some(Vector3D::from_xyz(0.0, 0.0, 1.0, Referential::Wing));
    Ok(solution)
}

/// Angular velocity of the wing in the stroke plane frame.
pub fn evaluate_angular_velocity(mut solution: Solution) -> Result<Solution> {
    let phi = Solution::require(&solution.phi, "phi")?.radians();
    let theta = Solution::require(&solution.theta, "theta")?.radians();
    let phi_dt = Solution::require(&solution.phi_dt, "phi_dt")?.radians();
    let alpha_dt = Solution::require(&solution.alpha_dt, "alpha_dt")?.radians();
    let theta_dt = Solution::require(&solution.theta_dt, "theta_dt")?.radians();

    let (sin_phi, cos_phi) = (phi.mapv(f64::sin), phi.mapv(f64::cos));
    let (sin_theta, cos_theta) = (theta.mapv(f64::sin), theta.mapv(f64::cos));

    let wx = &phi_dt - &(&sin_theta * &alpha_dt);
    let wy = &cos_phi * &cos_theta * &alpha_dt - &sin_phi * &theta_dt;
    let wz = &sin_phi * &cos_theta * &alpha_dt + &cos_phi * &theta_dt;

    solution.angular_velocity = Some(Vector3D::from_components(&wx, &wy, &wz, Referential::Stroke)?);
    debug!("stage: angular velocity");
    Ok(solution)
}

/// Tip velocity `ω × e_y`, in WING.
pub fn evaluate_tip_velocity(mut solution: Solution, transformations: &Transformations) -> Result<Solution> {
    let omega = Solution::require(&solution.angular_velocity, "angular_velocity")?
        .in_referential(Referential::Wing, transformations)?;
    let ey = Solution::require(&solution.ey, "ey")?;

    solution.tip_velocity = Some(cross(&omega, ey)?);
    debug!("stage: tip velocity");
    Ok(solution)
}

/// Drag along the relative airflow, lift perpendicular to it and to the span.
///
/// Lift is flipped at samples where the feathering angle is negative.
pub fn define_aero_unit_vectors(mut solution: Solution, transformations: &Transformations) -> Result<Solution> {
    let tip_velocity = Solution::require(&solution.tip_velocity, "tip_velocity")?
        .in_referential(Referential::Global, transformations)?;
    let ey = Solution::require(&solution.ey, "ey")?.in_referential(Referential::Global, transformations)?;
    let alpha = Solution::require(&solution.alpha, "alpha")?;

    let e_drag = normalize(&tip_velocity.neg())?;
    let sign = alpha.radians().mapv(|a| if a < 0.0 { -1.0 } else { 1.0 });
    let e_lift = cross(&ey, &e_drag)?.scale_by(&sign)?;

    solution.e_drag = Some(e_drag);
    solution.e_lift = Some(e_lift);
    debug!("stage: aerodynamic unit vectors");
    Ok(solution)
}

/// Angle between the chord and the incoming flow.
pub fn compute_angle_of_attack(mut solution: Solution, transformations: &Transformations) -> Result<Solution> {
    let ex = Solution::require(&solution.ex, "ex")?.in_referential(Referential::Global, transformations)?;
    let e_drag = Solution::require(&solution.e_drag, "e_drag")?;

    let cosines = dot(&ex, &e_drag.neg())?;
    let outside = cosines
        .iter()
        .filter(|c| c.abs() > 1.0 + COSINE_TOLERANCE)
        .count();
    if outside > 0 {
        warn!(outside, "angle of attack cosine outside [-1, 1], clamping");
    }
    let angles = cosines.mapv(|c| c.clamp(-1.0, 1.0).acos());

    solution.angle_of_attack = Some(Angle::new(angles, AngleUnit::Radians));
    debug!("stage: angle of attack");
    Ok(solution)
}

/// Lift and drag coefficients from the angle of attack.
pub fn compute_aerodynamic_coefficients<M: AerodynamicModel>(mut solution: Solution, model: &M) -> Result<Solution> {
    let angle_of_attack = Solution::require(&solution.angle_of_attack, "angle_of_attack")?;

    solution.lift_coefficient = Some(model.lift_coefficient(angle_of_attack));
    solution.drag_coefficient = Some(model.drag_coefficient(angle_of_attack));
    debug!("stage: aerodynamic coefficients");
    Ok(solution)
}

/// Angular velocity in WING with the spanwise component removed.
pub fn define_planar_angular_velocity(mut solution: Solution, transformations: &Transformations) -> Result<Solution> {
    let omega = Solution::require(&solution.angular_velocity, "angular_velocity")?
        .in_referential(Referential::Wing, transformations)?;

    let mut coords = omega.coords().clone();
    coords.row_mut(1).fill(0.0);

    solution.planar_angular_velocity = Some(Vector3D::new(coords, Referential::Wing)?);
    debug!("stage: planar angular velocity");
    Ok(solution)
}

/// Time derivatives of tip velocity and angular velocity, taken in GLOBAL.
pub fn compute_accelerations(mut solution: Solution, transformations: &Transformations) -> Result<Solution> {
    let time = Solution::require(&solution.time, "time")?;
    let tip_velocity = Solution::require(&solution.tip_velocity, "tip_velocity")?
        .in_referential(Referential::Global, transformations)?;
    // STROKE has no direct pair with GLOBAL; hop through WING.
    let omega = Solution::require(&solution.angular_velocity, "angular_velocity")?
        .in_referential(Referential::Wing, transformations)?
        .in_referential(Referential::Global, transformations)?;

    solution.tip_acceleration = Some(time_derivative(time, &tip_velocity)?);
    solution.angular_acceleration = Some(time_derivative(time, &omega)?);
    debug!("stage: accelerations");
    Ok(solution)
}

/// The six quasi-steady force terms and their sum, in GLOBAL.
pub fn compute_forces(
    mut solution: Solution,
    transformations: &Transformations,
    coefficients: &ForceCoefficients,
) -> Result<Solution> {
    let to_wing = |field: &Option<Vector3D>, name| {
        Solution::require(field, name)?.in_referential(Referential::Wing, transformations)
    };
    let to_global = |field: &Option<Vector3D>, name| {
        Solution::require(field, name)?.in_referential(Referential::Global, transformations)
    };

    let angular_velocity = to_wing(&solution.angular_velocity, "angular_velocity")?;
    let tip_acceleration = to_wing(&solution.tip_acceleration, "tip_acceleration")?;
    let angular_acceleration = to_wing(&solution.angular_acceleration, "angular_acceleration")?;
    let e_x = to_global(&solution.ex, "ex")?;
    let e_z = to_global(&solution.ez, "ez")?;

    let inputs = ForceInputs {
        lift_coefficient: Solution::require(&solution.lift_coefficient, "lift_coefficient")?,
        drag_coefficient: Solution::require(&solution.drag_coefficient, "drag_coefficient")?,
        planar_angular_velocity: Solution::require(
            &solution.planar_angular_velocity,
            "planar_angular_velocity",
        )?,
        angular_velocity: &angular_velocity,
        tip_velocity: Solution::require(&solution.tip_velocity, "tip_velocity")?,
        tip_acceleration: &tip_acceleration,
        angular_acceleration: &angular_acceleration,
        e_lift: Solution::require(&solution.e_lift, "e_lift")?,
        e_drag: Solution::require(&solution.e_drag, "e_drag")?,
        e_x: &e_x,
        e_z: &e_z,
    };
    let terms = compute_force_terms(&inputs, coefficients)?;
    let net = terms.net()?;

    solution.forces = Some(terms);
    solution.net_force = Some(net);
    debug!("stage: forces");
    Ok(solution)
}

/// Aerodynamic power `−((r × F) · ω)`, evaluated in WING.
pub fn evaluate_power(mut solution: Solution, transformations: &Transformations) -> Result<Solution> {
    let [x, y, z] = POWER_REFERENCE_POSITION;
    let position = Vector3D::from_xyz(x, y, z, Referential::Wing);
    let force = Solution::require(&solution.net_force, "net_force")?
        .in_referential(Referential::Wing, transformations)?;
    let omega = Solution::require(&solution.angular_velocity, "angular_velocity")?
        .in_referential(Referential::Wing, transformations)?;

    let moment = cross(&position, &force)?;
    let power: Array1<f64> = -dot(&moment, &omega)?;

    solution.power = Some(power);
    debug!("stage: power");
    Ok(solution)
}

/// Runs every stage for `config` on a fresh record and registry.
pub fn run_pipeline(config: &SimulationConfig) -> Result<Solution> {
    config.validate()?;
    info!(
        samples = config.samples,
        stroke_amplitude = config.wingbeat.stroke_amplitude,
        "running kinematics pipeline"
    );

    let model = SinusoidalFit::new(config.coefficients);

    let solution = evaluate_angles_kinematics(Solution::new(), config.samples, &config.wingbeat)?;
    let (solution, transformations) = initialize_transformations(solution)?;
    let solution = define_unit_vectors(solution)?;
    let solution = evaluate_angular_velocity(solution)?;
    let solution = evaluate_tip_velocity(solution, &transformations)?;
    let solution = define_aero_unit_vectors(solution, &transformations)?;
    let solution = compute_angle_of_attack(solution, &transformations)?;
    let solution = compute_aerodynamic_coefficients(solution, &model)?;
    let solution = define_planar_angular_velocity(solution, &transformations)?;
    let solution = compute_accelerations(solution, &transformations)?;
    let solution = compute_forces(solution, &transformations, &config.forces)?;
    let solution = evaluate_power(solution, &transformations)?;

    info!("kinematics pipeline finished");
    Ok(solution)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KinematicsError;
    use approx::assert_abs_diff_eq;

    fn run(samples: usize) -> Solution {
        run_pipeline(&SimulationConfig::coarse(samples)).unwrap()
    }

    #[test]
    fn test_full_run_time_grid() {
        let solution = run(400);
        let time = solution.time.as_ref().unwrap();
        assert_eq!(time.len(), 400);
        assert!(time.windows(2).into_iter().all(|w| w[1] > w[0]));
        assert!(time[0] >= 0.0 && time[399] < 1.0);
        assert!(solution.is_complete());
    }

    #[test]
    fn test_every_series_has_n_samples() {
        let solution = run(64);
        assert_eq!(solution.tip_velocity.as_ref().unwrap().len(), 64);
        assert_eq!(solution.e_lift.as_ref().unwrap().len(), 64);
        assert_eq!(solution.angle_of_attack.as_ref().unwrap().len(), 64);
        assert_eq!(solution.net_force.as_ref().unwrap().len(), 64);
        assert_eq!(solution.power.as_ref().unwrap().len(), 64);
        for (_, term) in solution.forces.as_ref().unwrap().named() {
            assert_eq!(term.len(), 64);
            assert_eq!(term.referential(), Referential::Global);
        }
    }

    #[test]
    fn test_net_force_is_sum_of_terms() {
        let solution = run(50);
        let terms = solution.forces.as_ref().unwrap();
        let net = solution.net_force.as_ref().unwrap();

        let mut total = ndarray::Array2::<f64>::zeros((3, 50));
        for (_, term) in terms.named() {
            total = total + term.coords();
        }
        for (a, b) in total.iter().zip(net.coords().iter()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_aero_unit_vectors_are_orthonormal() {
        let solution = run(40);
        let e_drag = solution.e_drag.as_ref().unwrap();
        let e_lift = solution.e_lift.as_ref().unwrap();
        for n in e_drag.norm().iter().chain(e_lift.norm().iter()) {
            assert_abs_diff_eq!(*n, 1.0, epsilon = 1e-9);
        }
        for d in dot(e_drag, e_lift).unwrap().iter() {
            assert_abs_diff_eq!(*d, 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_angle_of_attack_in_range() {
        let solution = run(40);
        let aoa = solution.angle_of_attack.as_ref().unwrap();
        assert!(aoa.radians().iter().all(|a| (0.0..=std::f64::consts::PI).contains(a)));
    }

    #[test]
    fn test_tip_velocity_is_perpendicular_to_span() {
        let solution = run(30);
        let tip = solution.tip_velocity.as_ref().unwrap();
        assert!(tip.component(1).iter().all(|v| v.abs() < 1e-12));
    }

    #[test]
    fn test_planar_angular_velocity_has_no_span_component() {
        let solution = run(30);
        let planar = solution.planar_angular_velocity.as_ref().unwrap();
        assert_eq!(planar.referential(), Referential::Wing);
        assert!(planar.component(1).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_accelerations_from_stroke_frame_omega() {
        let params = WingbeatParams::default_params();
        let solution = evaluate_angles_kinematics(Solution::new(), 32, &params).unwrap();
        let (solution, transformations) = initialize_transformations(solution).unwrap();
        let solution = define_unit_vectors(solution).unwrap();
        let solution = evaluate_angular_velocity(solution).unwrap();
        let solution = evaluate_tip_velocity(solution, &transformations).unwrap();
        assert_eq!(
            solution.angular_velocity.as_ref().unwrap().referential(),
            Referential::Stroke
        );

        let solution = compute_accelerations(solution, &transformations).unwrap();
        for acceleration in [&solution.tip_acceleration, &solution.angular_acceleration] {
            let acceleration = acceleration.as_ref().unwrap();
            assert_eq!(acceleration.referential(), Referential::Global);
            assert_eq!(acceleration.len(), 32);
            assert!(acceleration.coords().iter().all(|v| v.is_finite()));
        }
    }

    #[test]
    fn test_stage_out_of_order() {
        assert_eq!(
            evaluate_angular_velocity(Solution::new()),
            Err(KinematicsError::MissingField("phi"))
        );
        let transformations = Transformations::new();
        assert_eq!(
            compute_forces(Solution::new(), &transformations, &ForceCoefficients::default()),
            Err(KinematicsError::MissingField("angular_velocity"))
        );
    }

    #[test]
    fn test_angles_follow_wing_convention() {
        let params = WingbeatParams::default_params();
        let solution = evaluate_angles_kinematics(Solution::new(), 8, &params).unwrap();
        let alpha = solution.alpha.as_ref().unwrap();
        let time = solution.time.as_ref().unwrap();
        let k = time.iter().position(|&t| (t - 0.28125).abs() < 1e-12).unwrap();
        assert_eq!(alpha.values()[k], -params.alpha_down);
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            run_pipeline(&SimulationConfig::coarse(1)),
            Err(KinematicsError::InvalidParameter { name: "samples", .. })
        ));
    }
}
