//! Elementary and composite rotation matrices between wing frames.
//!
//! Every builder accepts [`Angle`] series and returns a [`RotationMatrix`]: a single
//! `3x3` matrix when all inputs hold one sample, or a `3x3xN` batch with one matrix per
//! time sample. Batches are composed index by index; matrices built from different
//! samples are never multiplied together.
//!
//! All rotations are passive (they re-express a fixed vector in a rotated frame):
//!
//! ```text
//! Rx(a) = | 1   0   0 |   Ry(a) = | c  0  -s |   Rz(a) = |  c  s  0 |
//!         | 0   c   s |           | 0  1   0 |           | -s  c  0 |
//!         | 0  -s   c |           | s  0   c |           |  0  0  1 |
//! ```

use ndarray::{s, Array2, Array3, ArrayD, ArrayView2, Axis, Ix2, Ix3};

use crate::angle::Angle;
use crate::error::{KinematicsError, Result};

/// A rotation matrix or a time series of rotation matrices.
#[derive(Debug, Clone, PartialEq)]
pub enum RotationMatrix {
    /// One `3x3` matrix valid for every sample.
    Single(Array2<f64>),
    /// `3x3xN` batch, one matrix per sample along the last axis.
    Batched(Array3<f64>),
}

impl RotationMatrix {
    /// The `3x3` identity.
    pub fn identity() -> Self {
        Self::Single(Array2::eye(3))
    }

    /// Wraps a `3x3xN` batch, collapsing it to [`RotationMatrix::Single`] when `N == 1`.
    fn from_batch(batch: Array3<f64>) -> Self {
        if batch.len_of(Axis(2)) == 1 {
            Self::Single(batch.slice(s![.., .., 0]).to_owned())
        } else {
            Self::Batched(batch)
        }
    }

    /// Validates a dynamically shaped array as a `3x3` matrix or a `3x3xN` batch.
    pub fn from_array(matrix: ArrayD<f64>) -> Result<Self> {
        let shape = matrix.shape().to_vec();
        match matrix.ndim() {
            2 if shape == [3, 3] => matrix
                .into_dimensionality::<Ix2>()
                .map(Self::Single)
                .map_err(|_| KinematicsError::InvalidShape(shape)),
            3 if shape[..2] == [3, 3] => matrix
                .into_dimensionality::<Ix3>()
                .map(Self::Batched)
                .map_err(|_| KinematicsError::InvalidShape(shape)),
            2 | 3 => Err(KinematicsError::InvalidShape(shape)),
            rank => Err(KinematicsError::InvalidRank(rank)),
        }
    }

    /// Dynamically shaped copy: `[3, 3]` or `[3, 3, N]`.
    pub fn to_array(&self) -> ArrayD<f64> {
        match self {
            Self::Single(m) => m.clone().into_dyn(),
            Self::Batched(b) => b.clone().into_dyn(),
        }
    }

    /// Shape as `[3, 3]` or `[3, 3, N]`.
    pub fn shape(&self) -> Vec<usize> {
        match self {
            Self::Single(m) => m.shape().to_vec(),
            Self::Batched(b) => b.shape().to_vec(),
        }
    }

    /// Number of samples covered: 1 for a single matrix, N for a batch.
    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Batched(b) => b.len_of(Axis(2)),
        }
    }

    /// True for an empty batch.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Matrix applying at sample `index`. A single matrix applies at every index.
    pub fn at(&self, index: usize) -> ArrayView2<'_, f64> {
        match self {
            Self::Single(m) => m.view(),
            Self::Batched(b) => b.index_axis(Axis(2), index),
        }
    }

    /// Transposes each `3x3` matrix, keeping the batch axis in place.
    pub fn transpose(&self) -> Self {
        match self {
            Self::Single(m) => Self::Single(m.t().to_owned()),
            Self::Batched(b) => {
                Self::Batched(b.view().permuted_axes([1, 0, 2]).as_standard_layout().into_owned())
            }
        }
    }

    /// Left-multiplies a `3xN` coordinate series.
    ///
    /// * single matrix, one vector: ordinary product;
    /// * batch of N, N vectors: column `k` is rotated by matrix `k`;
    /// * batch of N, one vector: the vector is rotated by every matrix.
    ///
    /// Any other combination is [`KinematicsError::IncompatibleTransform`].
    pub fn apply(&self, coords: &Array2<f64>) -> Result<Array2<f64>> {
        let vectors = coords.ncols();
        match self {
            Self::Single(m) if vectors == 1 => Ok(m.dot(coords)),
            Self::Batched(b) if vectors == b.len_of(Axis(2)) || vectors == 1 => {
                let n = b.len_of(Axis(2));
                let mut out = Array2::zeros((3, n));
                for k in 0..n {
                    let column = coords.column(if vectors == 1 { 0 } else { k });
                    out.column_mut(k).assign(&b.index_axis(Axis(2), k).dot(&column));
                }
                Ok(out)
            }
            _ => Err(KinematicsError::IncompatibleTransform {
                matrix: self.shape(),
                vectors,
            }),
        }
    }
}

/// Transposes a `3x3` matrix or the leading two axes of a `3x3xN` batch.
pub fn transpose(matrix: &ArrayD<f64>) -> Result<ArrayD<f64>> {
    let shape = matrix.shape();
    match matrix.ndim() {
        2 if shape == [3, 3] => Ok(matrix.t().to_owned()),
        3 if shape[..2] == [3, 3] => Ok(matrix
            .view()
            .permuted_axes(vec![1, 0, 2])
            .as_standard_layout()
            .into_owned()),
        2 | 3 => Err(KinematicsError::InvalidShape(shape.to_vec())),
        rank => Err(KinematicsError::InvalidRank(rank)),
    }
}

/// Builds one matrix per sample from `(cos, sin)` of each angle.
fn elementary<F>(angle: &Angle, build: F) -> RotationMatrix
where
    F: Fn(f64, f64) -> [[f64; 3]; 3],
{
    let radians = angle.radians();
    let mut batch = Array3::zeros((3, 3, radians.len()));
    for (k, a) in radians.iter().enumerate() {
        let m = build(a.cos(), a.sin());
        for (i, row) in m.iter().enumerate() {
            for (j, value) in row.iter().enumerate() {
                batch[[i, j, k]] = *value;
            }
        }
    }
    RotationMatrix::from_batch(batch)
}

/// Rotation about the x-axis.
pub fn rotation_x(angle: &Angle) -> RotationMatrix {
    elementary(angle, |c, s| [[1.0, 0.0, 0.0], [0.0, c, s], [0.0, -s, c]])
}

/// Rotation about the y-axis.
pub fn rotation_y(angle: &Angle) -> RotationMatrix {
    elementary(angle, |c, s| [[c, 0.0, -s], [0.0, 1.0, 0.0], [s, 0.0, c]])
}

/// Rotation about the z-axis.
pub fn rotation_z(angle: &Angle) -> RotationMatrix {
    elementary(angle, |c, s| [[c, s, 0.0], [-s, c, 0.0], [0.0, 0.0, 1.0]])
}

/// Multiplies `factors` left to right, sample by sample.
///
/// Every factor must cover 1 or N samples; single matrices are reused at each index.
pub fn compose(factors: &[&RotationMatrix]) -> Result<RotationMatrix> {
    let lengths: Vec<usize> = factors.iter().map(|f| f.len()).collect();
    let n = lengths.iter().copied().max().unwrap_or(1);
    if lengths.iter().any(|&len| len != 1 && len != n) {
        return Err(KinematicsError::IncompatibleLengths(lengths));
    }

    let mut batch = Array3::zeros((3, 3, n));
    for k in 0..n {
        let product = factors
            .iter()
            .fold(Array2::eye(3), |acc: Array2<f64>, factor| acc.dot(&factor.at(k)));
        batch.index_axis_mut(Axis(2), k).assign(&product);
    }
    Ok(RotationMatrix::from_batch(batch))
}

/// Checks that every angle holds 1 or `max_len` samples and stretches them to `max_len`.
fn broadcast_angles<const K: usize>(angles: [&Angle; K]) -> Result<[Angle; K]> {
    let lengths: Vec<usize> = angles.iter().map(|a| a.len()).collect();
    let max_len = lengths.iter().copied().max().unwrap_or(0);
    if max_len == 0 || lengths.iter().any(|&len| len != 1 && len != max_len) {
        return Err(KinematicsError::IncompatibleLengths(lengths));
    }

    let mut broadcast = Vec::with_capacity(K);
    for angle in angles {
        broadcast.push(angle.broadcast(max_len)?);
    }
    broadcast
        .try_into()
        .map_err(|_| KinematicsError::IncompatibleLengths(vec![K]))
}

/// Stroke plane to wing: `Ry(alpha) Rz(theta) Rx(phi)`.
pub fn stroke_to_wing_matrix(phi: &Angle, alpha: &Angle, theta: &Angle) -> Result<RotationMatrix> {
    let [phi, alpha, theta] = broadcast_angles([phi, alpha, theta])?;
    compose(&[&rotation_y(&alpha), &rotation_z(&theta), &rotation_x(&phi)])
}

/// Global to body: `Rx(psi) Ry(beta) Rz(gamma)`.
pub fn global_to_body_matrix(psi: &Angle, beta: &Angle, gamma: &Angle) -> Result<RotationMatrix> {
    let [psi, beta, gamma] = broadcast_angles([psi, beta, gamma])?;
    compose(&[&rotation_x(&psi), &rotation_y(&beta), &rotation_z(&gamma)])
}

/// Body to stroke plane: `Ry(eta)`.
pub fn body_to_stroke_matrix(eta: &Angle) -> RotationMatrix {
    rotation_y(eta)
}

/// Global to wing: `R_s2w R_b2s R_g2b`.
pub fn global_to_wing_matrix(
    phi: &Angle,
    alpha: &Angle,
    theta: &Angle,
    eta: &Angle,
    psi: &Angle,
    beta: &Angle,
    gamma: &Angle,
) -> Result<RotationMatrix> {
    let [phi, alpha, theta, eta, psi, beta, gamma] =
        broadcast_angles([phi, alpha, theta, eta, psi, beta, gamma])?;

    let stroke_to_wing = stroke_to_wing_matrix(&phi, &alpha, &theta)?;
    let body_to_stroke = body_to_stroke_matrix(&eta);
    let global_to_body = global_to_body_matrix(&psi, &beta, &gamma)?;

    compose(&[&stroke_to_wing, &body_to_stroke, &global_to_body])
}
