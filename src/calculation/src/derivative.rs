//! Finite-difference time derivatives of angle and vector series.
//!
//! Samples use a forward difference at the first point, a backward difference at the
//! last point and the mean of the two adjacent slopes in between. The scheme is exact
//! for linear series on any strictly increasing grid.

use ndarray::{Array1, Array2, ArrayView1};

use crate::angle::{Angle, AngleUnit};
use crate::error::{KinematicsError, Result};
use crate::referential::Referential;
use crate::vector::Vector3D;

/// Series that can be differentiated against a time grid.
pub trait TimeDerivative: Sized {
    /// Derivative with the same shape as `self`.
    fn time_derivative(&self, time: &Array1<f64>) -> Result<Self>;
}

/// Derivative of `series` with respect to `time`.
pub fn time_derivative<T: TimeDerivative>(time: &Array1<f64>, series: &T) -> Result<T> {
    series.time_derivative(time)
}

/// Checks that `time` is usable as a grid for a series of `len` samples.
fn validate_time(time: &Array1<f64>, len: usize) -> Result<()> {
    if time.len() != len {
        return Err(KinematicsError::ShapeMismatch {
            expected: time.len(),
            found: len,
        });
    }
    if time.len() < 2 {
        return Err(KinematicsError::TooFewSamples(time.len()));
    }
    for i in 1..time.len() {
        if time[i] <= time[i - 1] {
            return Err(KinematicsError::NonIncreasingTime(i));
        }
    }
    Ok(())
}

/// Derivative of one scalar series on a validated grid.
fn differentiate(t: &Array1<f64>, x: ArrayView1<f64>) -> Array1<f64> {
    let n = t.len();
    Array1::from_shape_fn(n, |i| {
        if i == 0 {
            // Forward difference
            (x[1] - x[0]) / (t[1] - t[0])
        } else if i == n - 1 {
            // Backward difference
            (x[i] - x[i - 1]) / (t[i] - t[i - 1])
        } else {
            let dt1 = t[i] - t[i - 1];
            let dt2 = t[i + 1] - t[i];
            0.5 * ((x[i + 1] - x[i]) / dt2 + (x[i] - x[i - 1]) / dt1)
        }
    })
}

impl TimeDerivative for Angle {
    /// Angular rate in radians per time unit.
    fn time_derivative(&self, time: &Array1<f64>) -> Result<Self> {
        validate_time(time, self.len())?;
        let radians = self.radians();
        Ok(Angle::new(differentiate(time, radians.view()), AngleUnit::Radians))
    }
}

impl TimeDerivative for Vector3D {
    /// Componentwise rate; only GLOBAL series are accepted since other frames rotate.
    fn time_derivative(&self, time: &Array1<f64>) -> Result<Self> {
        if self.referential() != Referential::Global {
            return Err(KinematicsError::WrongReferential {
                expected: Referential::Global,
                found: self.referential(),
            });
        }
        validate_time(time, self.len())?;

        let mut rates = Array2::zeros((3, time.len()));
        for (axis, row) in self.coords().rows().into_iter().enumerate() {
            rates.row_mut(axis).assign(&differentiate(time, row));
        }
        Vector3D::new(rates, Referential::Global)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_linear_angle_slope_everywhere() {
        let time = array![0.0, 0.1, 0.25, 0.3, 0.7, 1.0];
        let angle = Angle::new(time.mapv(|t| 3.0 * t - 1.0), AngleUnit::Radians);
        let rate = time_derivative(&time, &angle).unwrap();
        assert_eq!(rate.unit(), AngleUnit::Radians);
        for value in rate.values().iter() {
            assert_relative_eq!(*value, 3.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_degrees_differentiated_in_radians() {
        let time = array![0.0, 1.0, 2.0];
        let angle = Angle::new(array![0.0, 180.0, 360.0], AngleUnit::Degrees);
        let rate = time_derivative(&time, &angle).unwrap();
        for value in rate.values().iter() {
            assert_relative_eq!(*value, std::f64::consts::PI, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_linear_vector_slope_everywhere() {
        let time = array![0.0, 0.5, 0.6, 2.0];
        let coords = Array2::from_shape_fn((3, 4), |(axis, k)| (axis as f64 + 1.0) * time[k]);
        let v = Vector3D::new(coords, Referential::Global).unwrap();
        let rate = time_derivative(&time, &v).unwrap();
        for k in 0..4 {
            assert_relative_eq!(rate.coords()[[0, k]], 1.0, epsilon = 1e-12);
            assert_relative_eq!(rate.coords()[[1, k]], 2.0, epsilon = 1e-12);
            assert_relative_eq!(rate.coords()[[2, k]], 3.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_quadratic_interior_is_centered() {
        let time = array![0.0, 1.0, 2.0, 3.0];
        let angle = Angle::new(time.mapv(|t| t * t), AngleUnit::Radians);
        let rate = time_derivative(&time, &angle).unwrap();
        assert_eq!(rate.values(), &array![1.0, 2.0, 4.0, 5.0]);
    }

    #[test]
    fn test_vector_must_be_global() {
        let time = array![0.0, 1.0];
        let v = Vector3D::new(Array2::zeros((3, 2)), Referential::Wing).unwrap();
        assert_eq!(
            time_derivative(&time, &v),
            Err(KinematicsError::WrongReferential {
                expected: Referential::Global,
                found: Referential::Wing,
            })
        );
    }

    #[test]
    fn test_invalid_grids() {
        let angle = Angle::from_vec(vec![0.0, 1.0, 2.0], AngleUnit::Radians);
        assert_eq!(
            time_derivative(&array![0.0, 1.0], &angle),
            Err(KinematicsError::ShapeMismatch { expected: 2, found: 3 })
        );
        assert_eq!(
            time_derivative(&array![0.0, 1.0, 1.0], &angle),
            Err(KinematicsError::NonIncreasingTime(2))
        );

        let single = Angle::scalar(1.0, AngleUnit::Radians);
        assert_eq!(
            time_derivative(&array![0.0], &single),
            Err(KinematicsError::TooFewSamples(1))
        );
    }
}
