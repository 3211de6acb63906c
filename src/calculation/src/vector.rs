//! Frame-tagged 3D vector series.
//!
//! A [`Vector3D`] stores `3xN` coordinates, one column per time sample, together with the
//! [`Referential`] they are expressed in. Binary operations never convert between frames
//! implicitly: operands in different frames are rejected with
//! [`KinematicsError::ReferentialMismatch`].

use std::fmt;

use ndarray::{Array1, Array2, ArrayD, ArrayView1, ArrayView2, Axis, Ix1, Ix2};

use crate::error::{KinematicsError, Result};
use crate::referential::{Referential, Transformations};

/// Series of 3D vectors bound to one reference frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Vector3D {
    coords: Array2<f64>,
    referential: Referential,
}

impl Vector3D {
    /// Creates a vector series from `3xN` or `Nx3` coordinates.
    ///
    /// A `3xN` array is kept as is (including `3x3`); an `Nx3` array is transposed.
    pub fn new(coords: Array2<f64>, referential: Referential) -> Result<Self> {
        let (rows, cols) = coords.dim();
        let coords = match (rows, cols) {
            (3, n) if n >= 1 => coords,
            (n, 3) if n >= 1 => coords.reversed_axes().as_standard_layout().into_owned(),
            _ => return Err(KinematicsError::InvalidShape(vec![rows, cols])),
        };
        Ok(Self { coords, referential })
    }

    /// Creates a vector series from an array of rank 1 (length 3) or rank 2.
    pub fn from_dyn(coords: ArrayD<f64>, referential: Referential) -> Result<Self> {
        let shape = coords.shape().to_vec();
        match coords.ndim() {
            1 if shape[0] == 3 => {
                let flat = coords
                    .into_dimensionality::<Ix1>()
                    .map_err(|_| KinematicsError::InvalidShape(shape.clone()))?;
                Self::new(flat.insert_axis(Axis(1)), referential)
            }
            1 => Err(KinematicsError::InvalidShape(shape)),
            2 => {
                let grid = coords
                    .into_dimensionality::<Ix2>()
                    .map_err(|_| KinematicsError::InvalidShape(shape.clone()))?;
                Self::new(grid, referential)
            }
            rank => Err(KinematicsError::InvalidRank(rank)),
        }
    }

    /// Single vector `(x, y, z)`.
    pub fn from_xyz(x: f64, y: f64, z: f64, referential: Referential) -> Self {
        let xyz = [x, y, z];
        let coords = Array2::from_shape_fn((3, 1), |(i, _)| xyz[i]);
        Self { coords, referential }
    }

    /// Vector series from three same-length component series.
    pub fn from_components(
        x: &Array1<f64>,
        y: &Array1<f64>,
        z: &Array1<f64>,
        referential: Referential,
    ) -> Result<Self> {
        let n = x.len();
        for found in [y.len(), z.len()] {
            if found != n {
                return Err(KinematicsError::ShapeMismatch { expected: n, found });
            }
        }
        let mut coords = Array2::zeros((3, n));
        coords.row_mut(0).assign(x);
        coords.row_mut(1).assign(y);
        coords.row_mut(2).assign(z);
        Self::new(coords, referential)
    }

    /// Raw `3xN` coordinates.
    pub fn coords(&self) -> &Array2<f64> {
        &self.coords
    }

    /// Frame the coordinates are expressed in.
    pub fn referential(&self) -> Referential {
        self.referential
    }

    /// Number of samples (columns).
    pub fn len(&self) -> usize {
        self.coords.ncols()
    }

    /// True when there are no samples; construction rejects that case.
    pub fn is_empty(&self) -> bool {
        self.coords.ncols() == 0
    }

    /// Component series: 0 for x, 1 for y, 2 for z.
    pub fn component(&self, index: usize) -> ArrayView1<'_, f64> {
        self.coords.row(index)
    }

    /// Per-column Euclidean norm.
    pub fn norm(&self) -> Array1<f64> {
        self.coords
            .map_axis(Axis(0), |column| column.dot(&column).sqrt())
    }

    /// Scales every column by `scalar`.
    pub fn mul(&self, scalar: f64) -> Self {
        self.with_coords(&self.coords * scalar)
    }

    /// Divides every column by `scalar`.
    pub fn div(&self, scalar: f64) -> Result<Self> {
        if scalar == 0.0 {
            return Err(KinematicsError::DivisionByZero);
        }
        Ok(self.with_coords(&self.coords / scalar))
    }

    /// Scales column `k` by `series[k]`.
    ///
    /// A single vector is broadcast against the whole series.
    pub fn scale_by(&self, series: &Array1<f64>) -> Result<Self> {
        let n = series.len().max(self.len());
        let coords = broadcast_to(&self.coords, n)?;
        if series.len() != n {
            return Err(KinematicsError::ShapeMismatch {
                expected: n,
                found: series.len(),
            });
        }
        Ok(self.with_coords(&coords * series))
    }

    /// Columnwise sum; both operands must share the frame.
    pub fn add(&self, other: &Self) -> Result<Self> {
        let (lhs, rhs) = broadcast_pair(self, other)?;
        Ok(self.with_coords(&lhs + &rhs))
    }

    /// Columnwise difference; both operands must share the frame.
    pub fn sub(&self, other: &Self) -> Result<Self> {
        let (lhs, rhs) = broadcast_pair(self, other)?;
        Ok(self.with_coords(&lhs - &rhs))
    }

    /// Negated series in the same frame.
    pub fn neg(&self) -> Self {
        self.with_coords(-&self.coords)
    }

    /// Re-expresses the coordinates in `target`, in place.
    ///
    /// The coordinates and the tag change together: on error neither is touched.
    pub fn set_referential(
        &mut self,
        target: Referential,
        transformations: &Transformations,
    ) -> Result<&mut Self> {
        if target == self.referential {
            return Ok(self);
        }
        let matrix = transformations.get_matrix(self.referential, target)?;
        let coords = matrix.apply(&self.coords)?;
        self.coords = coords;
        self.referential = target;
        Ok(self)
    }

    /// Copy of the series expressed in `target`.
    pub fn in_referential(
        &self,
        target: Referential,
        transformations: &Transformations,
    ) -> Result<Self> {
        let mut converted = self.clone();
        converted.set_referential(target, transformations)?;
        Ok(converted)
    }

    fn with_coords(&self, coords: Array2<f64>) -> Self {
        Self {
            coords,
            referential: self.referential,
        }
    }
}

impl fmt::Display for Vector3D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Vector3D(coords={}, referential={})",
            self.coords, self.referential
        )
    }
}

fn check_same_frame(u: &Vector3D, v: &Vector3D) -> Result<()> {
    if u.referential != v.referential {
        return Err(KinematicsError::ReferentialMismatch {
            left: u.referential,
            right: v.referential,
        });
    }
    Ok(())
}

/// Stretches a `3x1` array to `3xn`; a `3xn` array is returned as a view.
fn broadcast_to(coords: &Array2<f64>, n: usize) -> Result<ArrayView2<'_, f64>> {
    coords
        .broadcast((3, n))
        .ok_or(KinematicsError::ShapeMismatch {
            expected: n,
            found: coords.ncols(),
        })
}

/// Same-frame operands brought to a common column count.
fn broadcast_pair<'a>(
    u: &'a Vector3D,
    v: &'a Vector3D,
) -> Result<(ArrayView2<'a, f64>, ArrayView2<'a, f64>)> {
    check_same_frame(u, v)?;
    let n = u.len().max(v.len());
    Ok((broadcast_to(&u.coords, n)?, broadcast_to(&v.coords, n)?))
}

/// Columnwise cross product `u x v`, in the shared frame.
pub fn cross(u: &Vector3D, v: &Vector3D) -> Result<Vector3D> {
    let (a, b) = broadcast_pair(u, v)?;
    let n = a.ncols();
    let mut coords = Array2::zeros((3, n));
    for k in 0..n {
        coords[[0, k]] = a[[1, k]] * b[[2, k]] - a[[2, k]] * b[[1, k]];
        coords[[1, k]] = a[[2, k]] * b[[0, k]] - a[[0, k]] * b[[2, k]];
        coords[[2, k]] = a[[0, k]] * b[[1, k]] - a[[1, k]] * b[[0, k]];
    }
    Ok(u.with_coords(coords))
}

/// Columnwise dot product.
pub fn dot(u: &Vector3D, v: &Vector3D) -> Result<Array1<f64>> {
    let (a, b) = broadcast_pair(u, v)?;
    Ok((&a * &b).sum_axis(Axis(0)))
}

/// Unit vectors along each column of `u`.
pub fn normalize(u: &Vector3D) -> Result<Vector3D> {
    let norms = u.norm();
    if norms.iter().any(|&n| n == 0.0) {
        return Err(KinematicsError::DivisionByZero);
    }
    Ok(u.with_coords(&u.coords / &norms))
}
