//! Unit-tagged angle series.
//!
//! An [`Angle`] is a flat series of N samples carrying one unit tag for the whole
//! series. Every derived angle (sums, differences, [`Angle::apply`], time derivatives)
//! comes back tagged in radians; only [`Angle::set_unit`] changes a series in place.

use std::fmt;
use std::str::FromStr;

use ndarray::{Array1, ArrayBase, Data, Dimension};
use serde::{Deserialize, Serialize};

use crate::error::{KinematicsError, Result};

/// Unit of an angle series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AngleUnit {
    /// Radians.
    #[default]
    #[serde(rename = "rad")]
    Radians,
    /// Degrees.
    #[serde(rename = "deg")]
    Degrees,
}

impl FromStr for AngleUnit {
    type Err = KinematicsError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "rad" => Ok(Self::Radians),
            "deg" => Ok(Self::Degrees),
            other => Err(KinematicsError::InvalidUnit(other.to_string())),
        }
    }
}

impl fmt::Display for AngleUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Radians => write!(f, "rad"),
            Self::Degrees => write!(f, "deg"),
        }
    }
}

/// Series of angles sharing a single unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Angle {
    values: Array1<f64>,
    unit: AngleUnit,
}

impl Angle {
    /// Creates an angle series from raw values.
    pub fn new(values: Array1<f64>, unit: AngleUnit) -> Self {
        Self { values, unit }
    }

    /// Creates a single-sample angle.
    pub fn scalar(value: f64, unit: AngleUnit) -> Self {
        Self::new(Array1::from_elem(1, value), unit)
    }

    /// Creates an angle series from a vector of values.
    pub fn from_vec(values: Vec<f64>, unit: AngleUnit) -> Self {
        Self::new(Array1::from_vec(values), unit)
    }

    /// Creates an angle series from an array of any rank.
    ///
    /// Rank-2+ input is flattened in logical (row-major) order, so a `(2, 3)` array
    /// becomes a series of 6 samples.
    pub fn from_array<S, D>(values: &ArrayBase<S, D>, unit: AngleUnit) -> Self
    where
        S: Data<Elem = f64>,
        D: Dimension,
    {
        Self::new(values.iter().copied().collect(), unit)
    }

    /// Creates an angle series from a textual unit (`"rad"` or `"deg"`).
    pub fn parse(values: Vec<f64>, unit: &str) -> Result<Self> {
        Ok(Self::from_vec(values, unit.parse()?))
    }

    /// Raw stored values, in [`Angle::unit`].
    pub fn values(&self) -> &Array1<f64> {
        &self.values
    }

    /// Unit tag of the stored values.
    pub fn unit(&self) -> AngleUnit {
        self.unit
    }

    /// Values in radians.
    pub fn radians(&self) -> Array1<f64> {
        match self.unit {
            AngleUnit::Radians => self.values.clone(),
            AngleUnit::Degrees => self.values.mapv(f64::to_radians),
        }
    }

    /// Values in degrees.
    pub fn degrees(&self) -> Array1<f64> {
        match self.unit {
            AngleUnit::Radians => self.values.mapv(f64::to_degrees),
            AngleUnit::Degrees => self.values.clone(),
        }
    }

    /// Converts the stored values in place. No-op if already in `unit`.
    pub fn set_unit(&mut self, unit: AngleUnit) {
        if self.unit != unit {
            self.values = match unit {
                AngleUnit::Radians => self.radians(),
                AngleUnit::Degrees => self.degrees(),
            };
            self.unit = unit;
        }
    }

    /// Applies `func` to the radian values and returns the result tagged in radians.
    pub fn apply<F>(&self, func: F) -> Angle
    where
        F: FnOnce(Array1<f64>) -> Array1<f64>,
    {
        Angle::new(func(self.radians()), AngleUnit::Radians)
    }

    /// Broadcasts the series to `len` samples.
    ///
    /// A single-sample angle is repeated; a series already of length `len` is returned
    /// in radians. Any other length is rejected.
    pub fn broadcast(&self, len: usize) -> Result<Angle> {
        match self.len() {
            n if n == len => Ok(self.apply(|values| values)),
            1 => Ok(self.apply(|values| Array1::from_elem(len, values[0]))),
            n => Err(KinematicsError::IncompatibleLengths(vec![n, len])),
        }
    }

    /// Elementwise sum, tagged in radians. Lengths must match or one side be 1.
    pub fn add(&self, other: &Angle) -> Result<Angle> {
        let (lhs, rhs) = broadcast_pair(self, other)?;
        Ok(Angle::new(lhs + rhs, AngleUnit::Radians))
    }

    /// Elementwise difference, tagged in radians. Lengths must match or one side be 1.
    pub fn sub(&self, other: &Angle) -> Result<Angle> {
        let (lhs, rhs) = broadcast_pair(self, other)?;
        Ok(Angle::new(lhs - rhs, AngleUnit::Radians))
    }

    /// Negated series, in the same unit.
    pub fn neg(&self) -> Angle {
        Angle::new(-&self.values, self.unit)
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when the series holds no samples.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Angle(values={}, unit='{}')", self.values, self.unit)
    }
}

/// Radian values of both operands brought to a common length.
fn broadcast_pair(lhs: &Angle, rhs: &Angle) -> Result<(Array1<f64>, Array1<f64>)> {
    let lengths = vec![lhs.len(), rhs.len()];
    let len = lhs.len().max(rhs.len());
    match (lhs.broadcast(len), rhs.broadcast(len)) {
        (Ok(lhs), Ok(rhs)) => Ok((lhs.values, rhs.values)),
        _ => Err(KinematicsError::IncompatibleLengths(lengths)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{array, Array2};
    use std::f64::consts::PI;

    #[test]
    fn test_degrees_to_radians() {
        let angle = Angle::scalar(180.0, AngleUnit::Degrees);
        assert_relative_eq!(angle.radians()[0], PI);
        assert_relative_eq!(angle.degrees()[0], 180.0);
    }

    #[test]
    fn test_parse_unit() {
        assert_eq!("rad".parse::<AngleUnit>().unwrap(), AngleUnit::Radians);
        assert_eq!("deg".parse::<AngleUnit>().unwrap(), AngleUnit::Degrees);
        assert_eq!(
            Angle::parse(vec![1.0], "grad"),
            Err(KinematicsError::InvalidUnit("grad".to_string()))
        );
    }

    #[test]
    fn test_set_unit_round_trip() {
        let original = array![-90.0, 0.0, 12.5, 270.0];
        let mut angle = Angle::new(original.clone(), AngleUnit::Degrees);

        angle.set_unit(AngleUnit::Radians);
        assert_eq!(angle.unit(), AngleUnit::Radians);
        assert_relative_eq!(angle.values()[3], 1.5 * PI);

        angle.set_unit(AngleUnit::Degrees);
        for (restored, expected) in angle.values().iter().zip(original.iter()) {
            assert_relative_eq!(*restored, *expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_set_unit_same_unit_is_noop() {
        let mut angle = Angle::from_vec(vec![0.1, 0.2], AngleUnit::Radians);
        angle.set_unit(AngleUnit::Radians);
        assert_eq!(angle.values(), &array![0.1, 0.2]);
    }

    #[test]
    fn test_flatten_rank_two_input() {
        let grid = Array2::from_shape_vec((2, 3), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let angle = Angle::from_array(&grid, AngleUnit::Degrees);
        assert_eq!(angle.len(), 6);
        assert_eq!(angle.values()[3], 4.0);
    }

    #[test]
    fn test_add_mixed_units_is_radians() {
        let a = Angle::scalar(90.0, AngleUnit::Degrees);
        let b = Angle::scalar(PI / 2.0, AngleUnit::Radians);
        let sum = a.add(&b).unwrap();
        assert_eq!(sum.unit(), AngleUnit::Radians);
        assert_relative_eq!(sum.values()[0], PI);

        let diff = a.sub(&b).unwrap();
        assert_relative_eq!(diff.values()[0], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_add_incompatible_lengths() {
        let a = Angle::from_vec(vec![0.1, 0.2], AngleUnit::Radians);
        let b = Angle::from_vec(vec![0.1, 0.2, 0.3], AngleUnit::Radians);
        assert!(matches!(
            a.add(&b),
            Err(KinematicsError::IncompatibleLengths(_))
        ));
    }

    #[test]
    fn test_broadcast_scalar() {
        let angle = Angle::scalar(45.0, AngleUnit::Degrees);
        let wide = angle.broadcast(4).unwrap();
        assert_eq!(wide.len(), 4);
        assert_eq!(wide.unit(), AngleUnit::Radians);
        assert_relative_eq!(wide.values()[3], PI / 4.0);

        let series = Angle::from_vec(vec![0.1, 0.2], AngleUnit::Radians);
        assert!(series.broadcast(3).is_err());
    }

    #[test]
    fn test_apply_returns_radians() {
        let angle = Angle::from_vec(vec![0.0, 180.0], AngleUnit::Degrees);
        let doubled = angle.apply(|values| values * 2.0);
        assert_eq!(doubled.unit(), AngleUnit::Radians);
        assert_relative_eq!(doubled.values()[1], 2.0 * PI);
    }

    #[test]
    fn test_neg_keeps_unit() {
        let angle = Angle::scalar(70.0, AngleUnit::Degrees).neg();
        assert_eq!(angle.unit(), AngleUnit::Degrees);
        assert_eq!(angle.values()[0], -70.0);
    }
}
