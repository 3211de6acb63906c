//! Reference frames and the registry of rotations between them.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::angle::Angle;
use crate::error::{KinematicsError, Result};
use crate::rotation::{
    body_to_stroke_matrix, global_to_body_matrix, global_to_wing_matrix, stroke_to_wing_matrix,
    RotationMatrix,
};

/// Coordinate frame a vector is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Referential {
    /// Lab frame, z up.
    Global,
    /// Insect body frame.
    Body,
    /// Stroke plane frame.
    Stroke,
    /// Frame attached to the wing.
    Wing,
}

impl Referential {
    /// Every frame, in declaration order.
    pub const ALL: [Referential; 4] = [Self::Global, Self::Body, Self::Stroke, Self::Wing];
}

impl FromStr for Referential {
    type Err = KinematicsError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "GLOBAL" => Ok(Self::Global),
            "BODY" => Ok(Self::Body),
            "STROKE" => Ok(Self::Stroke),
            "WING" => Ok(Self::Wing),
            other => Err(KinematicsError::InvalidReferential(other.to_string())),
        }
    }
}

impl fmt::Display for Referential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Global => "GLOBAL",
            Self::Body => "BODY",
            Self::Stroke => "STROKE",
            Self::Wing => "WING",
        };
        f.write_str(name)
    }
}

/// Rotations between frames for one set of kinematic angles.
///
/// Only the four direct pairs are stored. Reverse directions are served as the
/// transpose of the stored rotation.
#[derive(Debug, Clone, Default)]
pub struct Transformations {
    matrices: HashMap<(Referential, Referential), RotationMatrix>,
    initialized: bool,
}

impl Transformations {
    /// Empty registry. [`Transformations::get_matrix`] fails until it is initialized.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry initialized from the given angles.
    #[allow(clippy::too_many_arguments)]
    pub fn from_angles(
        phi: &Angle,
        alpha: &Angle,
        theta: &Angle,
        eta: &Angle,
        psi: &Angle,
        beta: &Angle,
        gamma: &Angle,
    ) -> Result<Self> {
        let mut transformations = Self::new();
        transformations.initialize(phi, alpha, theta, eta, psi, beta, gamma)?;
        Ok(transformations)
    }

    /// Computes and stores the four direct rotations, replacing any previous set.
    ///
    /// On error the registry is left unchanged.
    #[allow(clippy::too_many_arguments)]
    pub fn initialize(
        &mut self,
        phi: &Angle,
        alpha: &Angle,
        theta: &Angle,
        eta: &Angle,
        psi: &Angle,
        beta: &Angle,
        gamma: &Angle,
    ) -> Result<()> {
        let mut matrices = HashMap::with_capacity(4);
        matrices.insert(
            (Referential::Stroke, Referential::Wing),
            stroke_to_wing_matrix(phi, alpha, theta)?,
        );
        matrices.insert(
            (Referential::Global, Referential::Body),
            global_to_body_matrix(psi, beta, gamma)?,
        );
        matrices.insert(
            (Referential::Body, Referential::Stroke),
            body_to_stroke_matrix(eta),
        );
        matrices.insert(
            (Referential::Global, Referential::Wing),
            global_to_wing_matrix(phi, alpha, theta, eta, psi, beta, gamma)?,
        );

        debug!(
            samples = phi.len().max(alpha.len()).max(theta.len()),
            "initialized frame transformations"
        );
        self.matrices = matrices;
        self.initialized = true;
        Ok(())
    }

    /// True once [`Transformations::initialize`] has succeeded.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Rotation taking coordinates in `from` to coordinates in `to`.
    pub fn get_matrix(&self, from: Referential, to: Referential) -> Result<RotationMatrix> {
        if !self.initialized {
            return Err(KinematicsError::NotInitialized);
        }
        if from == to {
            return Ok(RotationMatrix::identity());
        }
        if let Some(matrix) = self.matrices.get(&(from, to)) {
            return Ok(matrix.clone());
        }
        self.matrices
            .get(&(to, from))
            .map(RotationMatrix::transpose)
            .ok_or(KinematicsError::TransformationUnavailable { from, to })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::angle::AngleUnit;
    use approx::assert_abs_diff_eq;
    use ndarray::Array2;

    fn deg(value: f64) -> Angle {
        Angle::scalar(value, AngleUnit::Degrees)
    }

    fn sample_transformations() -> Transformations {
        Transformations::from_angles(
            &deg(30.0),
            &deg(-20.0),
            &deg(6.0),
            &deg(-90.0),
            &deg(0.0),
            &deg(0.0),
            &deg(180.0),
        )
        .unwrap()
    }

    #[test]
    fn test_parse_and_display() {
        for referential in Referential::ALL {
            let text = referential.to_string();
            assert_eq!(text.parse::<Referential>().unwrap(), referential);
        }
        assert_eq!(
            "LAB".parse::<Referential>(),
            Err(KinematicsError::InvalidReferential("LAB".to_string()))
        );
    }

    #[test]
    fn test_uninitialized() {
        let transformations = Transformations::new();
        assert!(!transformations.is_initialized());
        assert_eq!(
            transformations.get_matrix(Referential::Global, Referential::Wing),
            Err(KinematicsError::NotInitialized)
        );
    }

    #[test]
    fn test_identity_for_same_frame() {
        let transformations = sample_transformations();
        for referential in Referential::ALL {
            let m = transformations.get_matrix(referential, referential).unwrap();
            assert_eq!(m, RotationMatrix::identity());
        }
    }

    #[test]
    fn test_reverse_is_inverse() {
        let transformations = sample_transformations();
        let pairs = [
            (Referential::Stroke, Referential::Wing),
            (Referential::Global, Referential::Body),
            (Referential::Body, Referential::Stroke),
            (Referential::Global, Referential::Wing),
        ];
        for (from, to) in pairs {
            let forward = transformations.get_matrix(from, to).unwrap();
            let backward = transformations.get_matrix(to, from).unwrap();
            let product = forward.at(0).dot(&backward.at(0));
            for (a, e) in product.iter().zip(Array2::<f64>::eye(3).iter()) {
                assert_abs_diff_eq!(*a, *e, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_reverse_is_transpose_for_batches() {
        let phi = Angle::from_vec(vec![10.0, 20.0, 30.0], AngleUnit::Degrees);
        let transformations = Transformations::from_angles(
            &phi,
            &deg(40.0),
            &deg(5.0),
            &deg(-90.0),
            &deg(0.0),
            &deg(0.0),
            &deg(180.0),
        )
        .unwrap();

        let forward = transformations
            .get_matrix(Referential::Global, Referential::Wing)
            .unwrap();
        let backward = transformations
            .get_matrix(Referential::Wing, Referential::Global)
            .unwrap();
        assert_eq!(backward.shape(), vec![3, 3, 3]);
        assert_eq!(backward, forward.transpose());
    }

    #[test]
    fn test_unregistered_pair() {
        let transformations = sample_transformations();
        assert_eq!(
            transformations.get_matrix(Referential::Global, Referential::Stroke),
            Err(KinematicsError::TransformationUnavailable {
                from: Referential::Global,
                to: Referential::Stroke,
            })
        );
    }

    #[test]
    fn test_failed_initialize_keeps_previous_state() {
        let mut transformations = sample_transformations();
        let before = transformations
            .get_matrix(Referential::Stroke, Referential::Wing)
            .unwrap();

        let two = Angle::from_vec(vec![0.1, 0.2], AngleUnit::Radians);
        let three = Angle::from_vec(vec![0.1, 0.2, 0.3], AngleUnit::Radians);
        let zero = deg(0.0);
        assert!(transformations
            .initialize(&two, &three, &zero, &zero, &zero, &zero, &zero)
            .is_err());

        let after = transformations
            .get_matrix(Referential::Stroke, Referential::Wing)
            .unwrap();
        assert_eq!(before, after);
    }
}
