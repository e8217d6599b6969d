//! Error types shared across the crate.

use crate::time::Timestamp;
use thiserror::Error;

/// Result type alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by conversions, translations, integration, and
/// consistency diagnostics.
///
/// Every operation in this crate is a pure function of its inputs, so none of
/// these are transient: retrying with unchanged input yields the same error.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum Error {
    /// A raw buffer that should hold exactly one 3-vector had a different
    /// number of components. The buffer is never truncated or padded.
    #[error("expected exactly 3 components for a point, got {len}")]
    BadShape {
        /// Number of components actually supplied.
        len: usize,
    },

    /// A flat batch buffer's length is not a multiple of 3.
    #[error("flat batch of {len} components cannot be split into 3-vectors")]
    RaggedBatch {
        /// Number of components actually supplied.
        len: usize,
    },

    /// Parallel position/attitude sequences differ in length.
    #[error("positions ({positions}) and attitudes ({attitudes}) differ in length")]
    LengthMismatch {
        /// Number of positions supplied.
        positions: usize,
        /// Number of attitudes supplied.
        attitudes: usize,
    },

    /// A timestamp sequence stopped strictly increasing.
    #[error("timestamp {current} at index {index} does not increase over {previous}")]
    TimestampOrder {
        /// Index of the offending timestamp within its sequence.
        index: usize,
        /// The preceding timestamp.
        previous: Timestamp,
        /// The timestamp that failed to increase.
        current: Timestamp,
    },

    /// Latitude at or beyond a pole, where the east and north directions of
    /// the local tangent plane are undefined.
    #[error("latitude {latitude_deg}° is at or beyond a pole; east-north-up axes are undefined there")]
    PoleProximity {
        /// The offending latitude, in degrees.
        latitude_deg: f64,
    },

    /// A sensor log offered timestamps but no absolute pose to anchor
    /// dead-reckoning at.
    #[error("sensor log supplies no absolute pose to seed from")]
    NoSeedPose,

    /// An innovation covariance matrix could not be inverted.
    #[error("innovation covariance is singular")]
    SingularCovariance,

    /// A confidence level outside the open interval (0, 1).
    #[error("confidence {0} is outside (0, 1)")]
    ConfidenceOutOfRange(f64),

    /// A chi-square critical value was requested for zero degrees of freedom.
    #[error("chi-square critical value requires at least one degree of freedom")]
    ZeroDegreesOfFreedom,
}
