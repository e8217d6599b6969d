//! Sensor mounting offsets and the body-frame translation that removes them.
//!
//! A sensor is rarely mounted at the point whose trajectory we want: a GPS
//! antenna sits on the roof, a radar at a bumper corner. The offset between
//! the sensor's mounting point and the vehicle reference point -- the lever
//! arm, or boresight offset -- is fixed in the vehicle's body frame, so
//! removing it from a reported position requires a round trip through that
//! frame.

use crate::ecef::Ecef;
use crate::error::{Error, Result};
use crate::rotation::Rotation;
use crate::Vector3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The fixed lever arm from the vehicle reference point to a sensor's
/// mounting point, expressed in meters in the sensor's body frame.
///
/// Supplied once per sensor log and immutable thereafter.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct BoresightOffset {
    offset: Vector3,
}

impl BoresightOffset {
    /// Constructs an offset from its body-frame components in meters.
    #[must_use]
    pub fn from_meters(x: f64, y: f64, z: f64) -> Self {
        Self {
            offset: Vector3::new(x, y, z),
        }
    }

    /// A sensor mounted exactly at the vehicle reference point.
    #[must_use]
    pub fn zero() -> Self {
        Self {
            offset: Vector3::zeros(),
        }
    }

    /// Constructs an offset from a buffer holding exactly `[x, y, z]` in
    /// meters.
    ///
    /// A buffer of any other length fails with [`Error::BadShape`].
    pub fn try_from_slice(components: &[f64]) -> Result<Self> {
        match components {
            &[x, y, z] => Ok(Self::from_meters(x, y, z)),
            _ => Err(Error::BadShape {
                len: components.len(),
            }),
        }
    }

    /// Returns the body-frame lever arm in meters.
    #[must_use]
    pub fn as_vector(&self) -> Vector3 {
        self.offset
    }

    /// Whether this offset is exactly zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.offset == Vector3::zeros()
    }
}

/// Converts one sensor-reported position into the vehicle reference-point
/// position by removing the mounting offset.
///
/// The offset lives in the body frame, so the position is first rotated into
/// the body frame by the attitude, the offset subtracted there, and the
/// result rotated back out:
///
/// ```text
/// reference = attitude⁻¹ · (attitude · position - offset)
/// ```
///
/// The three steps do not commute with a single rotated subtraction and must
/// stay in this order.
///
/// A zero offset returns the position bit-for-bit unchanged.
#[must_use]
pub fn reference_position(
    position: &Ecef,
    attitude: &Rotation,
    offset: &BoresightOffset,
) -> Ecef {
    if offset.is_zero() {
        // skip the rotation round trip so the identity is exact
        return *position;
    }
    let in_body = attitude.apply(position.to_vector());
    Ecef::from_vector(attitude.apply_inverse(in_body - offset.as_vector()))
}

/// Converts parallel sequences of sensor positions and attitudes into
/// vehicle reference-point positions; the sequence shape of
/// [`reference_position`].
///
/// # Errors
///
/// Fails with [`Error::LengthMismatch`] when the sequences differ in length.
pub fn reference_positions(
    positions: &[Ecef],
    attitudes: &[Rotation],
    offset: &BoresightOffset,
) -> Result<Vec<Ecef>> {
    if positions.len() != attitudes.len() {
        return Err(Error::LengthMismatch {
            positions: positions.len(),
            attitudes: attitudes.len(),
        });
    }
    Ok(positions
        .iter()
        .zip(attitudes)
        .map(|(position, attitude)| reference_position(position, attitude, offset))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::{reference_position, reference_positions, BoresightOffset};
    use crate::ecef::Ecef;
    use crate::error::Error;
    use crate::rotation::Rotation;
    use crate::Vector3;
    use approx::assert_abs_diff_eq;
    use uom::si::angle::degree;
    use uom::si::f64::Angle;

    fn d(degrees: f64) -> Angle {
        Angle::new::<degree>(degrees)
    }

    #[test]
    fn zero_offset_is_exactly_identity() {
        let positions = [
            Ecef::from_meters(6_378_137., 0., 0.),
            Ecef::from_meters(1., 2., 3.),
        ];
        let attitudes = [
            Rotation::from_euler_angles(d(37.), d(-12.), d(3.)),
            Rotation::from_euler_angles(d(-119.), d(45.), d(90.)),
        ];

        let out = reference_positions(&positions, &attitudes, &BoresightOffset::zero()).unwrap();
        // bitwise, not approximately: the offset removal must short-circuit
        assert_eq!(out, positions);
    }

    #[test]
    fn rotate_subtract_unrotate_order_is_pinned() {
        // a 90° yaw applies as (x, y, z) -> (-y, x, z)
        let attitude = Rotation::from_euler_angles(d(90.), d(0.), d(0.));
        let position = Ecef::from_meters(10., 20., 30.);
        let offset = BoresightOffset::from_meters(1., 2., 0.);

        // by hand: into the body frame = (-20, 10, 30); minus the offset
        // = (-21, 8, 30); back out = (8, 21, 30)
        let reference = reference_position(&position, &attitude, &offset);
        assert_abs_diff_eq!(
            reference.to_vector(),
            Vector3::new(8., 21., 30.),
            epsilon = 1e-9,
        );

        // and that differs from subtracting the world-rotated offset on the
        // wrong side
        let naive = position.to_vector() - attitude.apply(offset.as_vector());
        assert!((reference.to_vector() - naive).norm() > 1.);
    }

    #[test]
    fn mismatched_sequences_are_rejected() {
        let positions = [Ecef::from_meters(1., 2., 3.)];
        let attitudes = [Rotation::identity(), Rotation::identity()];
        assert_eq!(
            reference_positions(&positions, &attitudes, &BoresightOffset::zero()),
            Err(Error::LengthMismatch {
                positions: 1,
                attitudes: 2,
            }),
        );
    }

    #[test]
    fn bad_slice_shape_is_rejected() {
        assert_eq!(
            BoresightOffset::try_from_slice(&[1., 2.]),
            Err(Error::BadShape { len: 2 }),
        );
        assert!(BoresightOffset::try_from_slice(&[1., 2., 3.]).is_ok());
    }
}
