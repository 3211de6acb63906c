//! Error type shared by every frame, kinematics and force computation.

use thiserror::Error;

use crate::referential::Referential;

/// Errors raised while building frames, converting vectors or running the pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum KinematicsError {
    /// Angle unit text was neither `rad` nor `deg`.
    #[error("Angle unit must be 'deg' or 'rad' (got '{0}')")]
    InvalidUnit(String),

    /// Referential name does not match any known frame.
    #[error("Invalid referential '{0}'")]
    InvalidReferential(String),

    /// A parameter vector or argument list has the wrong arity or type.
    #[error("Invalid argument: {0}")]
    InvalidArgumentType(String),

    /// Two series that must share a length do not.
    #[error("Shape mismatch: expected {expected} samples, found {found}")]
    ShapeMismatch {
        /// Expected sample count.
        expected: usize,
        /// Actual sample count.
        found: usize,
    },

    /// Angle series lengths must each be 1 or the common maximum.
    #[error("Angle arrays must either be of length 1 or same length (got {0:?})")]
    IncompatibleLengths(Vec<usize>),

    /// Array shape is not accepted by the operation.
    #[error("Invalid shape {0:?}")]
    InvalidShape(Vec<usize>),

    /// Array rank is not accepted by the operation.
    #[error("Invalid array dimension: {0}D")]
    InvalidRank(usize),

    /// Binary vector operation between different frames.
    #[error("Referentials mismatch: {left} vs {right}")]
    ReferentialMismatch {
        /// Frame of the left operand.
        left: Referential,
        /// Frame of the right operand.
        right: Referential,
    },

    /// Operation requires a specific frame.
    #[error("The vector must be in the {expected} referential (found {found})")]
    WrongReferential {
        /// Required frame.
        expected: Referential,
        /// Frame the vector was in.
        found: Referential,
    },

    /// Frame registry used before `initialize`.
    #[error("Transformations must be initialized first")]
    NotInitialized,

    /// Neither direction of the frame pair is registered.
    #[error("No transformation available from {from} to {to}")]
    TransformationUnavailable {
        /// Source frame.
        from: Referential,
        /// Target frame.
        to: Referential,
    },

    /// Rotation matrix shape cannot be applied to the vector series.
    #[error("Cannot apply rotation of shape {matrix:?} to {vectors} vectors")]
    IncompatibleTransform {
        /// Shape of the rotation matrix or batch.
        matrix: Vec<usize>,
        /// Number of vectors in the series.
        vectors: usize,
    },

    /// Scalar division by zero or normalization of a zero-length column.
    #[error("Division by zero")]
    DivisionByZero,

    /// Finite differences need at least two samples.
    #[error("Need at least 2 samples to compute derivatives (got {0})")]
    TooFewSamples(usize),

    /// Time samples must be strictly increasing.
    #[error("Time must be strictly increasing (violated at index {0})")]
    NonIncreasingTime(usize),

    /// A pipeline stage read a field no earlier stage has produced.
    #[error("Solution field '{0}' has not been computed yet")]
    MissingField(&'static str),

    /// Configuration value outside its valid range.
    #[error("Invalid parameter {name}: {value}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Offending value.
        value: f64,
    },
}

/// Result type for kinematics operations.
pub type Result<T> = std::result::Result<T, KinematicsError>;
