//! Result record filled by the kinematics pipeline.
//!
//! Every field starts empty and is set by exactly one stage. A stage that reads a field
//! no earlier stage produced fails with [`KinematicsError::MissingField`].

use ndarray::Array1;

use crate::aerodynamics::ForceTerms;
use crate::angle::Angle;
use crate::error::{KinematicsError, Result};
use crate::vector::Vector3D;

/// Time series produced by one pipeline run. Frames are noted per field.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct KinematicsSolution {
    /// Normalized time, one stroke period
    pub time: Option<Array1<f64>>,

    /// Stroke angle, wing sign convention
    pub phi: Option<Angle>,
    /// Feathering angle, wing sign convention
    pub alpha: Option<Angle>,
    /// Deviation angle
    pub theta: Option<Angle>,

    /// Stroke plane inclination
    pub eta: Option<Angle>,
    /// Body roll
    pub psi: Option<Angle>,
    /// Body pitch
    pub beta: Option<Angle>,
    /// Body yaw
    pub gamma: Option<Angle>,

    /// Stroke rate, rad per period
    pub phi_dt: Option<Angle>,
    /// Feathering rate, rad per period
    pub alpha_dt: Option<Angle>,
    /// Deviation rate, rad per period
    pub theta_dt: Option<Angle>,

    /// Chordwise axis, WING
    pub ex: Option<Vector3D>,
    /// Spanwise axis, WING
    pub ey: Option<Vector3D>,
    /// Normal axis, WING
    pub ez: Option<Vector3D>,

    /// Angular velocity, STROKE
    pub angular_velocity: Option<Vector3D>,
    /// Tip velocity, WING
    pub tip_velocity: Option<Vector3D>,

    /// Drag direction, GLOBAL
    pub e_drag: Option<Vector3D>,
    /// Lift direction, GLOBAL
    pub e_lift: Option<Vector3D>,

    /// Angle between chord and incoming flow
    pub angle_of_attack: Option<Angle>,
    /// Lift coefficient per sample
    pub lift_coefficient: Option<Array1<f64>>,
    /// Drag coefficient per sample
    pub drag_coefficient: Option<Array1<f64>>,

    /// Angular velocity without its spanwise component, WING
    pub planar_angular_velocity: Option<Vector3D>,
    /// Tip acceleration, GLOBAL
    pub tip_acceleration: Option<Vector3D>,
    /// Angular acceleration, GLOBAL
    pub angular_acceleration: Option<Vector3D>,

    /// The six force terms, GLOBAL
    pub forces: Option<ForceTerms>,
    /// Sum of the six force terms, GLOBAL
    pub net_force: Option<Vector3D>,
    /// Aerodynamic power
    pub power: Option<Array1<f64>>,
}

impl KinematicsSolution {
    /// Empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrows a field that an earlier stage must have filled.
    pub fn require<'a, T>(field: &'a Option<T>, name: &'static str) -> Result<&'a T> {
        field.as_ref().ok_or(KinematicsError::MissingField(name))
    }

    /// Number of time samples, once the time grid exists.
    pub fn samples(&self) -> Option<usize> {
        self.time.as_ref().map(Array1::len)
    }

    /// Names of the fields filled so far, in pipeline order.
    pub fn completed_fields(&self) -> Vec<&'static str> {
        let filled = [
            ("time", self.time.is_some()),
            ("phi", self.phi.is_some()),
            ("alpha", self.alpha.is_some()),
            ("theta", self.theta.is_some()),
            ("eta", self.eta.is_some()),
            ("psi", self.psi.is_some()),
            ("beta", self.beta.is_some()),
            ("gamma", self.gamma.is_some()),
            ("phi_dt", self.phi_dt.is_some()),
            ("alpha_dt", self.alpha_dt.is_some()),
            ("theta_dt", self.theta_dt.is_some()),
            ("ex", self.ex.is_some()),
            ("ey", self.ey.is_some()),
            ("ez", self.ez.is_some()),
            ("angular_velocity", self.angular_velocity.is_some()),
            ("tip_velocity", self.tip_velocity.is_some()),
            ("e_drag", self.e_drag.is_some()),
            ("e_lift", self.e_lift.is_some()),
            ("angle_of_attack", self.angle_of_attack.is_some()),
            ("lift_coefficient", self.lift_coefficient.is_some()),
            ("drag_coefficient", self.drag_coefficient.is_some()),
            ("planar_angular_velocity", self.planar_angular_velocity.is_some()),
            ("tip_acceleration", self.tip_acceleration.is_some()),
            ("angular_acceleration", self.angular_acceleration.is_some()),
            ("forces", self.forces.is_some()),
            ("net_force", self.net_force.is_some()),
            ("power", self.power.is_some()),
        ];
        filled
            .into_iter()
            .filter_map(|(name, is_set)| is_set.then_some(name))
            .collect()
    }

    /// True once power, the last quantity, has been computed.
    pub fn is_complete(&self) -> bool {
        self.power.is_some()
    }
}
