//! Absolute poses and relative rigid-body motion between sensor frames.

use crate::ecef::Ecef;
use crate::rotation::Rotation;
use crate::Vector3;

#[cfg(any(test, feature = "approx"))]
use approx::{AbsDiffEq, RelativeEq};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The rigid motion observed between two consecutive sensor frames.
///
/// The translation is expressed, in meters, in the body frame of the earlier
/// of the two poses; the rotation is the attitude increment from the earlier
/// to the later pose. Produced by a frame aligner
/// (see [`FrameAlign`](crate::FrameAlign)) and consumed by dead-reckoning
/// integration.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RigidTransform {
    /// Body-frame displacement of the later pose, in meters.
    pub translation: Vector3,
    /// Attitude increment from the earlier pose to the later one.
    pub rotation: Rotation,
}

impl RigidTransform {
    /// Constructs a relative motion from its parts.
    #[must_use]
    pub fn new(translation: Vector3, rotation: Rotation) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    /// The motion of a vehicle that did not move.
    #[must_use]
    pub fn identity() -> Self {
        Self::new(Vector3::zeros(), Rotation::identity())
    }
}

/// An absolute vehicle pose: where the vehicle is and which way it points.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Pose {
    /// Position in the Earth-centered frame.
    pub position: Ecef,
    /// Attitude, mapping Earth-frame vectors into the body frame.
    pub attitude: Rotation,
}

impl Pose {
    /// Constructs a pose from its parts.
    #[must_use]
    pub fn new(position: Ecef, attitude: Rotation) -> Self {
        Self { position, attitude }
    }
}

#[cfg(any(test, feature = "approx"))]
impl AbsDiffEq<Self> for Pose {
    type Epsilon = <f64 as AbsDiffEq>::Epsilon;

    fn default_epsilon() -> Self::Epsilon {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        self.position.abs_diff_eq(&other.position, epsilon)
            && self.attitude.abs_diff_eq(&other.attitude, epsilon)
    }
}

#[cfg(any(test, feature = "approx"))]
impl RelativeEq for Pose {
    fn default_max_relative() -> Self::Epsilon {
        f64::default_max_relative()
    }

    fn relative_eq(
        &self,
        other: &Self,
        epsilon: Self::Epsilon,
        max_relative: Self::Epsilon,
    ) -> bool {
        self.position
            .relative_eq(&other.position, epsilon, max_relative)
            && self
                .attitude
                .relative_eq(&other.attitude, epsilon, max_relative)
    }
}
