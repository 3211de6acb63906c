//! Quasi-steady aerodynamic model of a flapping wing.
//!
//! The force on the wing is split into six terms:
//!
//! - **Translational circulation / damping**: lift and drag from the wing's translation,
//!   scaled by the squared planar angular velocity.
//! - **Rotational circulation / damping**: normal force from pitching about the span.
//! - **Added mass**: chordwise and normal reaction of the accelerated air.
//!
//! Unit vectors (`e_x`, `e_z`, `e_lift`, `e_drag`) are expected in GLOBAL; accelerations
//! are expected in WING, where their components line up with the wing axes.

use ndarray::{Array1, ArrayView1};

use crate::angle::Angle;
use crate::constants::model_params::{CoefficientModel, ForceCoefficients};
use crate::error::{KinematicsError, Result};
use crate::referential::Referential;
use crate::vector::Vector3D;

/// Lift and drag coefficients as functions of the angle of attack.
pub trait AerodynamicModel {
    /// Lift coefficient per sample.
    fn lift_coefficient(&self, angle_of_attack: &Angle) -> Array1<f64>;

    /// Drag coefficient per sample.
    fn drag_coefficient(&self, angle_of_attack: &Angle) -> Array1<f64>;
}

/// Sinusoidal fit of revolving-wing measurements.
///
/// `C_L = K1 + K2 sin(2.13° · α − 7.20°)`, `C_D = K3 + K4 sin(2.04° · α − 9.82°)`.
///
/// Every angle, the slopes included, is converted to radians on its own and the
/// terms are combined afterwards. The slope is therefore `2.13° ≈ 0.0372` per
/// radian of angle of attack, not a dimensionless `2.13`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SinusoidalFit {
    /// Offsets and amplitudes `K1..K4`.
    pub params: CoefficientModel,
}

impl SinusoidalFit {
    const LIFT_SLOPE_DEG: f64 = 2.13;
    const LIFT_SHIFT_DEG: f64 = 7.20;
    const DRAG_SLOPE_DEG: f64 = 2.04;
    const DRAG_SHIFT_DEG: f64 = 9.82;

    /// Model with the given coefficients.
    pub fn new(params: CoefficientModel) -> Self {
        Self { params }
    }
}

impl AerodynamicModel for SinusoidalFit {
    fn lift_coefficient(&self, angle_of_attack: &Angle) -> Array1<f64> {
        let (slope, shift) = (Self::LIFT_SLOPE_DEG.to_radians(), Self::LIFT_SHIFT_DEG.to_radians());
        angle_of_attack
            .radians()
            .mapv(|a| self.params.k1 + self.params.k2 * (slope * a - shift).sin())
    }

    fn drag_coefficient(&self, angle_of_attack: &Angle) -> Array1<f64> {
        let (slope, shift) = (Self::DRAG_SLOPE_DEG.to_radians(), Self::DRAG_SHIFT_DEG.to_radians());
        angle_of_attack
            .radians()
            .mapv(|a| self.params.k3 + self.params.k4 * (slope * a - shift).sin())
    }
}

fn require_frame(vector: &Vector3D, expected: Referential) -> Result<()> {
    if vector.referential() != expected {
        return Err(KinematicsError::WrongReferential {
            expected,
            found: vector.referential(),
        });
    }
    Ok(())
}

fn require_len(series: &[usize]) -> Result<()> {
    let expected = series[0];
    match series.iter().find(|&&len| len != expected) {
        Some(&found) => Err(KinematicsError::ShapeMismatch { expected, found }),
        None => Ok(()),
    }
}

/// `½ C_L |ω_p|² e_lift`
pub fn translational_circulatory(
    lift_coefficient: &Array1<f64>,
    planar_rate: &Array1<f64>,
    e_lift: &Vector3D,
) -> Result<Vector3D> {
    require_frame(e_lift, Referential::Global)?;
    require_len(&[lift_coefficient.len(), planar_rate.len()])?;
    e_lift.scale_by(&(0.5 * lift_coefficient * &planar_rate.mapv(|w| w * w)))
}

/// `½ C_D |ω_p|² e_drag`
pub fn translational_damping(
    drag_coefficient: &Array1<f64>,
    planar_rate: &Array1<f64>,
    e_drag: &Vector3D,
) -> Result<Vector3D> {
    require_frame(e_drag, Referential::Global)?;
    require_len(&[drag_coefficient.len(), planar_rate.len()])?;
    e_drag.scale_by(&(0.5 * drag_coefficient * &planar_rate.mapv(|w| w * w)))
}

/// `C_RC |u_tip| ω_y e_z`
pub fn rotational_circulatory(
    c_rc: f64,
    tip_speed: &Array1<f64>,
    pitch_rate: ArrayView1<f64>,
    e_z: &Vector3D,
) -> Result<Vector3D> {
    require_frame(e_z, Referential::Global)?;
    require_len(&[tip_speed.len(), pitch_rate.len()])?;
    e_z.scale_by(&(c_rc * tip_speed * &pitch_rate))
}

/// `−C_RD |ω_y| ω_y e_z`
pub fn rotational_damping(c_rd: f64, pitch_rate: ArrayView1<f64>, e_z: &Vector3D) -> Result<Vector3D> {
    require_frame(e_z, Referential::Global)?;
    e_z.scale_by(&pitch_rate.mapv(|w| -c_rd * w.abs() * w))
}

/// `(C1 u̇_z + C2 ω̇_y) e_x`
pub fn added_mass_chordwise(
    c_amx: &[f64; 2],
    tip_acceleration: &Vector3D,
    angular_acceleration: &Vector3D,
    e_x: &Vector3D,
) -> Result<Vector3D> {
    require_frame(tip_acceleration, Referential::Wing)?;
    require_frame(angular_acceleration, Referential::Wing)?;
    require_frame(e_x, Referential::Global)?;
    require_len(&[tip_acceleration.len(), angular_acceleration.len()])?;

    let magnitude = c_amx[0] * &tip_acceleration.component(2)
        + c_amx[1] * &angular_acceleration.component(1);
    e_x.scale_by(&magnitude)
}

/// `(Σ C1..3 u̇_xyz + Σ C4..6 ω̇_xyz) e_z`
pub fn added_mass_normal(
    c_amz: &[f64; 6],
    tip_acceleration: &Vector3D,
    angular_acceleration: &Vector3D,
    e_z: &Vector3D,
) -> Result<Vector3D> {
    require_frame(tip_acceleration, Referential::Wing)?;
    require_frame(angular_acceleration, Referential::Wing)?;
    require_frame(e_z, Referential::Global)?;
    require_len(&[tip_acceleration.len(), angular_acceleration.len()])?;

    let mut magnitude = Array1::zeros(tip_acceleration.len());
    for axis in 0..3 {
        magnitude = magnitude
            + c_amz[axis] * &tip_acceleration.component(axis)
            + c_amz[axis + 3] * &angular_acceleration.component(axis);
    }
    e_z.scale_by(&magnitude)
}

/// The six force terms of one stroke, all in GLOBAL.
#[derive(Debug, Clone, PartialEq)]
pub struct ForceTerms {
    /// Lift from translation.
    pub translational_circulatory: Vector3D,
    /// Drag from translation.
    pub translational_damping: Vector3D,
    /// Normal force from pitching.
    pub rotational_circulatory: Vector3D,
    /// Normal damping of the pitching rate.
    pub rotational_damping: Vector3D,
    /// Added mass along the chord.
    pub added_mass_chordwise: Vector3D,
    /// Added mass normal to the wing.
    pub added_mass_normal: Vector3D,
}

impl ForceTerms {
    /// Terms paired with their display names, in a fixed order.
    pub fn named(&self) -> [(&'static str, &Vector3D); 6] {
        [
            ("translational_circulatory", &self.translational_circulatory),
            ("translational_damping", &self.translational_damping),
            ("rotational_circulatory", &self.rotational_circulatory),
            ("rotational_damping", &self.rotational_damping),
            ("added_mass_chordwise", &self.added_mass_chordwise),
            ("added_mass_normal", &self.added_mass_normal),
        ]
    }

    /// Sum of all six terms.
    pub fn net(&self) -> Result<Vector3D> {
        let [(_, first), rest @ ..] = self.named();
        rest.iter()
            .try_fold(first.clone(), |total, (_, term)| total.add(term))
    }
}

/// Kinematic quantities the force terms are built from.
#[derive(Debug, Clone, Copy)]
pub struct ForceInputs<'a> {
    /// Lift coefficient per sample.
    pub lift_coefficient: &'a Array1<f64>,
    /// Drag coefficient per sample.
    pub drag_coefficient: &'a Array1<f64>,
    /// Planar angular velocity, WING.
    pub planar_angular_velocity: &'a Vector3D,
    /// Angular velocity, WING.
    pub angular_velocity: &'a Vector3D,
    /// Tip velocity, any frame.
    pub tip_velocity: &'a Vector3D,
    /// Tip acceleration, WING.
    pub tip_acceleration: &'a Vector3D,
    /// Angular acceleration, WING.
    pub angular_acceleration: &'a Vector3D,
    /// Lift direction, GLOBAL.
    pub e_lift: &'a Vector3D,
    /// Drag direction, GLOBAL.
    pub e_drag: &'a Vector3D,
    /// Chordwise wing axis, GLOBAL.
    pub e_x: &'a Vector3D,
    /// Wing normal, GLOBAL.
    pub e_z: &'a Vector3D,
}

/// Evaluates every force term.
pub fn compute_force_terms(inputs: &ForceInputs<'_>, coefficients: &ForceCoefficients) -> Result<ForceTerms> {
    require_frame(inputs.angular_velocity, Referential::Wing)?;
    require_frame(inputs.planar_angular_velocity, Referential::Wing)?;

    let planar_rate = inputs.planar_angular_velocity.norm();
    let tip_speed = inputs.tip_velocity.norm();
    let pitch_rate = inputs.angular_velocity.component(1);

    Ok(ForceTerms {
        translational_circulatory: translational_circulatory(
            inputs.lift_coefficient,
            &planar_rate,
            inputs.e_lift,
        )?,
        translational_damping: translational_damping(
            inputs.drag_coefficient,
            &planar_rate,
            inputs.e_drag,
        )?,
        rotational_circulatory: rotational_circulatory(
            coefficients.c_rc,
            &tip_speed,
            pitch_rate,
            inputs.e_z,
        )?,
        rotational_damping: rotational_damping(coefficients.c_rd, pitch_rate, inputs.e_z)?,
        added_mass_chordwise: added_mass_chordwise(
            &coefficients.c_amx,
            inputs.tip_acceleration,
            inputs.angular_acceleration,
            inputs.e_x,
        )?,
        added_mass_normal: added_mass_normal(
            &coefficients.c_amz,
            inputs.tip_acceleration,
            inputs.angular_acceleration,
            inputs.e_z,
        )?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::angle::AngleUnit;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use ndarray::array;

    fn global(x: f64, y: f64, z: f64) -> Vector3D {
        Vector3D::from_xyz(x, y, z, Referential::Global)
    }

    fn wing_series(coords: ndarray::Array2<f64>) -> Vector3D {
        Vector3D::new(coords, Referential::Wing).unwrap()
    }

    #[test]
    fn test_coefficients_at_known_angles() {
        let model = SinusoidalFit::default();
        let aoa = Angle::from_vec(vec![0.0, 45.0], AngleUnit::Degrees);

        let c_l = model.lift_coefficient(&aoa);
        assert_relative_eq!(c_l[0], -0.2083 + 0.4193 * (-7.20_f64.to_radians()).sin(), epsilon = 1e-12);
        let lift_arg = 2.13_f64.to_radians() * 45.0_f64.to_radians() - 7.20_f64.to_radians();
        assert_relative_eq!(c_l[1], -0.2083 + 0.4193 * lift_arg.sin(), epsilon = 1e-12);

        let c_d = model.drag_coefficient(&aoa);
        let drag_arg = 2.04_f64.to_radians() * 45.0_f64.to_radians() - 9.82_f64.to_radians();
        assert_relative_eq!(c_d[1], 0.2509 - 0.2656 * drag_arg.sin(), epsilon = 1e-12);
    }

    #[test]
    fn test_slope_is_converted_separately() {
        let model = SinusoidalFit::default();
        let aoa = Angle::scalar(45.0, AngleUnit::Degrees);

        // Composing 2.13 α − 7.20 in degrees first would give about 0.2109 here.
        let c_l = model.lift_coefficient(&aoa)[0];
        assert_abs_diff_eq!(c_l, -0.248686, epsilon = 1e-5);
        assert!((c_l - 0.210884).abs() > 0.4);
    }

    #[test]
    fn test_coefficients_unit_independent() {
        let model = SinusoidalFit::default();
        let deg = Angle::from_vec(vec![30.0], AngleUnit::Degrees);
        let rad = Angle::from_vec(vec![30.0_f64.to_radians()], AngleUnit::Radians);
        assert_relative_eq!(model.lift_coefficient(&deg)[0], model.lift_coefficient(&rad)[0]);
        assert_relative_eq!(model.drag_coefficient(&deg)[0], model.drag_coefficient(&rad)[0]);
    }

    #[test]
    fn test_translational_terms() {
        let c_l = array![2.0, 1.0];
        let rate = array![3.0, 1.0];
        let force = translational_circulatory(&c_l, &rate, &global(0.0, 0.0, 1.0)).unwrap();
        assert_eq!(force.coords().row(2), array![9.0, 0.5]);

        let force = translational_damping(&c_l, &rate, &global(1.0, 0.0, 0.0)).unwrap();
        assert_eq!(force.coords().row(0), array![9.0, 0.5]);
    }

    #[test]
    fn test_rotational_terms() {
        let pitch = array![2.0, -2.0];
        let speed = array![1.0, 3.0];
        let e_z = global(0.0, 0.0, 1.0);

        let circulatory = rotational_circulatory(0.5, &speed, pitch.view(), &e_z).unwrap();
        assert_eq!(circulatory.coords().row(2), array![1.0, -3.0]);

        let damping = rotational_damping(0.25, pitch.view(), &e_z).unwrap();
        assert_eq!(damping.coords().row(2), array![-1.0, 1.0]);
    }

    #[test]
    fn test_added_mass_terms() {
        let u_dt = wing_series(array![[1.0], [2.0], [3.0]]);
        let w_dt = wing_series(array![[4.0], [5.0], [6.0]]);

        let chordwise = added_mass_chordwise(&[2.0, 1.0], &u_dt, &w_dt, &global(1.0, 0.0, 0.0)).unwrap();
        assert_eq!(chordwise, global(2.0 * 3.0 + 5.0, 0.0, 0.0));

        let c_amz = [1.0, 1.0, 1.0, 0.5, 0.5, 0.5];
        let normal = added_mass_normal(&c_amz, &u_dt, &w_dt, &global(0.0, 0.0, 1.0)).unwrap();
        assert_eq!(normal, global(0.0, 0.0, 6.0 + 7.5));
    }

    #[test]
    fn test_frames_are_checked() {
        let wing = Vector3D::from_xyz(0.0, 0.0, 1.0, Referential::Wing);
        assert!(matches!(
            rotational_damping(0.1, array![1.0].view(), &wing),
            Err(KinematicsError::WrongReferential { .. })
        ));

        let g = global(1.0, 0.0, 0.0);
        assert!(matches!(
            added_mass_chordwise(&[1.0, 1.0], &g, &g, &g),
            Err(KinematicsError::WrongReferential { .. })
        ));
    }

    #[test]
    fn test_net_force_is_sum() {
        let terms = ForceTerms {
            translational_circulatory: global(1.0, 0.0, 0.0),
            translational_damping: global(0.0, 2.0, 0.0),
            rotational_circulatory: global(0.0, 0.0, 3.0),
            rotational_damping: global(-1.0, 0.0, 0.0),
            added_mass_chordwise: global(0.5, 0.5, 0.5),
            added_mass_normal: global(0.0, 0.0, -1.0),
        };
        assert_eq!(terms.net().unwrap(), global(0.5, 2.5, 2.5));
    }
}
