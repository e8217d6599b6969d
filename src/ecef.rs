//! Positions in the Earth-centered, Earth-fixed frame.

use crate::error::{Error, Result};
use crate::{Point3, Vector3};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use uom::si::f64::Length;
use uom::si::length::meter;

#[cfg(any(test, feature = "approx"))]
use approx::{AbsDiffEq, RelativeEq};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A position in the [Earth-centered, Earth-fixed][ecef] (ECEF) cartesian
/// frame.
///
/// The frame's origin is the Earth's center of mass, the positive X axis
/// pierces the equator at the prime meridian, positive Z points through the
/// North pole, and Y completes the right-handed triad. This is the primary
/// representation for all position arithmetic in this crate; geodetic
/// latitude/longitude ([`Wgs84`](crate::Wgs84)) is derived from it for
/// display.
///
/// [ecef]: https://en.wikipedia.org/wiki/Earth-centered,_Earth-fixed_coordinate_system
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Ecef {
    pub(crate) point: Point3,
}

impl Ecef {
    pub(crate) fn from_nalgebra_point(point: Point3) -> Self {
        Self { point }
    }

    /// Constructs a position from its X, Y, and Z components.
    pub fn new(x: impl Into<Length>, y: impl Into<Length>, z: impl Into<Length>) -> Self {
        Self::from_nalgebra_point(Point3::new(
            x.into().get::<meter>(),
            y.into().get::<meter>(),
            z.into().get::<meter>(),
        ))
    }

    /// Constructs a position from raw meter components.
    #[must_use]
    pub fn from_meters(x: f64, y: f64, z: f64) -> Self {
        Self::from_nalgebra_point(Point3::new(x, y, z))
    }

    /// The center of the Earth.
    #[must_use]
    pub fn origin() -> Self {
        Self::from_nalgebra_point(Point3::origin())
    }

    /// Constructs a position from a buffer holding exactly `[x, y, z]` in
    /// meters.
    ///
    /// A buffer of any other length fails with [`Error::BadShape`]; it is
    /// never truncated or padded.
    pub fn try_from_slice(components: &[f64]) -> Result<Self> {
        match components {
            &[x, y, z] => Ok(Self::from_meters(x, y, z)),
            _ => Err(Error::BadShape {
                len: components.len(),
            }),
        }
    }

    /// Constructs a batch of positions from a flat `[x0, y0, z0, x1, ...]`
    /// buffer in meters.
    ///
    /// A buffer whose length is not a multiple of 3 fails with
    /// [`Error::RaggedBatch`].
    pub fn many_from_flat(components: &[f64]) -> Result<Vec<Self>> {
        if components.len() % 3 != 0 {
            return Err(Error::RaggedBatch {
                len: components.len(),
            });
        }
        Ok(components
            .chunks_exact(3)
            .map(|c| Self::from_meters(c[0], c[1], c[2]))
            .collect())
    }

    /// Returns the X component (through the equator at the prime meridian).
    #[must_use]
    pub fn x(&self) -> Length {
        Length::new::<meter>(self.point.x)
    }

    /// Returns the Y component.
    #[must_use]
    pub fn y(&self) -> Length {
        Length::new::<meter>(self.point.y)
    }

    /// Returns the Z component (through the North pole).
    #[must_use]
    pub fn z(&self) -> Length {
        Length::new::<meter>(self.point.z)
    }

    /// Returns the raw `[x, y, z]` components in meters.
    #[must_use]
    pub fn to_meters(self) -> [f64; 3] {
        [self.point.x, self.point.y, self.point.z]
    }

    /// Returns the position as a vector from the Earth's center, in meters.
    #[must_use]
    pub fn to_vector(self) -> Vector3 {
        self.point.coords
    }

    /// Constructs a position from a vector from the Earth's center, in
    /// meters.
    #[must_use]
    pub fn from_vector(vector: Vector3) -> Self {
        Self::from_nalgebra_point(Point3::from(vector))
    }

    /// Returns the straight-line (chord) distance to another position.
    #[must_use]
    pub fn distance_to(&self, other: &Self) -> Length {
        Length::new::<meter>((self.point - other.point).norm())
    }
}

impl fmt::Display for Ecef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}m, {}m, {}m)",
            self.point.x, self.point.y, self.point.z
        )
    }
}

/// The displacement between two positions, in meters.
impl Sub for Ecef {
    type Output = Vector3;

    fn sub(self, rhs: Self) -> Self::Output {
        self.point - rhs.point
    }
}

impl Add<Vector3> for Ecef {
    type Output = Ecef;

    fn add(self, rhs: Vector3) -> Self::Output {
        Self::from_nalgebra_point(self.point + rhs)
    }
}

impl AddAssign<Vector3> for Ecef {
    fn add_assign(&mut self, rhs: Vector3) {
        self.point += rhs;
    }
}

impl Sub<Vector3> for Ecef {
    type Output = Ecef;

    fn sub(self, rhs: Vector3) -> Self::Output {
        Self::from_nalgebra_point(self.point - rhs)
    }
}

impl SubAssign<Vector3> for Ecef {
    fn sub_assign(&mut self, rhs: Vector3) {
        self.point -= rhs;
    }
}

#[cfg(any(test, feature = "approx"))]
impl AbsDiffEq<Self> for Ecef {
    type Epsilon = <f64 as AbsDiffEq>::Epsilon;

    fn default_epsilon() -> Self::Epsilon {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        self.point.abs_diff_eq(&other.point, epsilon)
    }
}

#[cfg(any(test, feature = "approx"))]
impl RelativeEq for Ecef {
    fn default_max_relative() -> Self::Epsilon {
        f64::default_max_relative()
    }

    fn relative_eq(
        &self,
        other: &Self,
        epsilon: Self::Epsilon,
        max_relative: Self::Epsilon,
    ) -> bool {
        self.point.relative_eq(&other.point, epsilon, max_relative)
    }
}
