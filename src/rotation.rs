//! Orientation values and the Earth-centered to local tangent-plane
//! rotation.

use crate::error::{Error, Result};
use crate::{Matrix3, UnitQuaternion, Vector3};
use std::fmt;
use uom::si::angle::{degree, radian};
use uom::si::f64::Angle;

#[cfg(any(test, feature = "approx"))]
use approx::{AbsDiffEq, RelativeEq};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An orientation, or equivalently a rotation between two cartesian frames.
///
/// Mathematically this is a thin wrapper around a [unit quaternion], so it
/// always represents a proper orthogonal transform: applying it preserves
/// vector norms and handedness. All operations have value semantics --
/// composing or inverting never mutates an existing instance.
///
/// Vehicle attitudes in this crate follow the convention of the sensor logs
/// they come from: the attitude maps Earth-frame
/// ([ECEF](crate::Ecef)) vectors *into* the body frame via [`apply`], and
/// body-frame vectors back out via [`apply_inverse`].
///
/// [unit quaternion]: https://en.wikipedia.org/wiki/Versor
/// [`apply`]: Rotation::apply
/// [`apply_inverse`]: Rotation::apply_inverse
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
// no need for the "inner": indirection
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Rotation {
    pub(crate) inner: UnitQuaternion,
}

impl Rotation {
    pub(crate) fn from_unit_quaternion(inner: UnitQuaternion) -> Self {
        Self { inner }
    }

    /// The rotation that maps every vector to itself.
    #[must_use]
    pub fn identity() -> Self {
        Self::from_unit_quaternion(UnitQuaternion::identity())
    }

    /// Constructs a rotation from ([intrinsic]) yaw, pitch, and roll
    /// [Tait-Bryan angles][tb]: first yaw about Z, then pitch about the
    /// resulting Y, then roll about the resulting X, all by the right-hand
    /// rule.
    ///
    /// [intrinsic]: https://dominicplein.medium.com/extrinsic-intrinsic-rotation-do-i-multiply-from-right-or-left-357c38c1abfd
    /// [tb]: https://en.wikipedia.org/wiki/Euler_angles#Tait%E2%80%93Bryan_angles
    #[must_use]
    pub fn from_euler_angles(
        yaw: impl Into<Angle>,
        pitch: impl Into<Angle>,
        roll: impl Into<Angle>,
    ) -> Self {
        // nalgebra's constructor takes (roll, pitch, yaw) for the same 3-2-1
        // intrinsic sequence
        Self::from_unit_quaternion(UnitQuaternion::from_euler_angles(
            roll.into().get::<radian>(),
            pitch.into().get::<radian>(),
            yaw.into().get::<radian>(),
        ))
    }

    /// Constructs a rotation from the components of a quaternion, given as
    /// `w` (the scalar part) and `i, j, k` (the vector part).
    ///
    /// The quaternion is normalized internally; the zero quaternion has no
    /// rotation associated with it and yields `None`.
    #[must_use]
    pub fn from_quaternion(w: f64, i: f64, j: f64, k: f64) -> Option<Self> {
        let norm_sq = w * w + i * i + j * j + k * k;
        if norm_sq == 0. || !norm_sq.is_finite() {
            return None;
        }
        Some(Self::from_unit_quaternion(UnitQuaternion::new_normalize(
            nalgebra::Quaternion::new(w, i, j, k),
        )))
    }

    /// Returns the quaternion components as `(w, i, j, k)`.
    #[must_use]
    pub fn to_quaternion(&self) -> (f64, f64, f64, f64) {
        let q = self.inner.quaternion();
        (q.w, q.i, q.j, q.k)
    }

    /// Rotates a vector into this rotation's target frame.
    ///
    /// For a vehicle attitude, this takes an Earth-frame vector into the
    /// body frame.
    #[must_use]
    pub fn apply(&self, vector: Vector3) -> Vector3 {
        self.inner.transform_vector(&vector)
    }

    /// Rotates a vector out of this rotation's target frame.
    ///
    /// For a vehicle attitude, this takes a body-frame vector into the Earth
    /// frame. Equivalent to `self.inverse().apply(vector)` without
    /// constructing the intermediate value.
    #[must_use]
    pub fn apply_inverse(&self, vector: Vector3) -> Vector3 {
        self.inner.inverse_transform_vector(&vector)
    }

    /// Composes this rotation with another on the right: the returned
    /// rotation applies `rhs` first and `self` second.
    ///
    /// This is the composition used to accumulate frame-to-frame attitude
    /// increments, which are expressed in the frame of the pose they extend.
    #[must_use]
    pub fn compose(&self, rhs: &Self) -> Self {
        Self::from_unit_quaternion(self.inner * rhs.inner)
    }

    /// Returns the equal-but-opposite rotation.
    #[must_use]
    pub fn inverse(&self) -> Self {
        Self::from_unit_quaternion(self.inner.inverse())
    }

    /// Returns the yaw, pitch, and roll [Tait-Bryan angles][tb] describing
    /// this rotation, in the same convention as
    /// [`from_euler_angles`](Self::from_euler_angles).
    ///
    /// [tb]: https://en.wikipedia.org/wiki/Euler_angles#Tait%E2%80%93Bryan_angles
    #[must_use]
    pub fn euler_angles(&self) -> (Angle, Angle, Angle) {
        let (roll, pitch, yaw) = self.inner.euler_angles();
        (
            Angle::new::<radian>(yaw),
            Angle::new::<radian>(pitch),
            Angle::new::<radian>(roll),
        )
    }

    /// Returns the yaw (heading) component of this rotation.
    #[must_use]
    pub fn yaw(&self) -> Angle {
        self.euler_angles().0
    }

    /// Returns the angle of the smallest rotation taking `self` to `other`.
    #[must_use]
    pub fn angle_to(&self, other: &Self) -> Angle {
        Angle::new::<radian>(self.inner.angle_to(&other.inner))
    }
}

impl Default for Rotation {
    fn default() -> Self {
        Self::identity()
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Quaternion: {}", self.inner)
    }
}

#[cfg(any(test, feature = "approx"))]
impl AbsDiffEq<Self> for Rotation {
    type Epsilon = <f64 as AbsDiffEq>::Epsilon;

    fn default_epsilon() -> Self::Epsilon {
        UnitQuaternion::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        self.inner.abs_diff_eq(&other.inner, epsilon)
    }
}

#[cfg(any(test, feature = "approx"))]
impl RelativeEq for Rotation {
    fn default_max_relative() -> Self::Epsilon {
        UnitQuaternion::default_max_relative()
    }

    fn relative_eq(
        &self,
        other: &Self,
        epsilon: Self::Epsilon,
        max_relative: Self::Epsilon,
    ) -> bool {
        self.inner.relative_eq(&other.inner, epsilon, max_relative)
    }
}

/// How close to a pole, in radians of latitude, the east-north-up frame is
/// considered numerically degraded. 0.1° of latitude.
const POLE_GUARD: f64 = 0.1 * std::f64::consts::PI / 180.;

/// Computes the rotation that takes Earth-centered
/// ([ECEF](crate::Ecef)) vectors into the local [East-North-Up][enu] frame
/// centered at the given geodetic point.
///
/// The rotation is assembled from the same factor chain the rest of the
/// pipeline's attitude data uses: a reflection of the north-pole-referenced
/// axes, a rotation about the east axis by 90° minus the colatitude, a
/// rotation about the polar axis by the longitude, and a final axis
/// reordering from the north-referenced intermediate frame into East-North-Up.
/// The factor order is load-bearing; the unit tests pin it against reference
/// directions (local up maps to `(0, 0, 1)`, east to `(1, 0, 0)`, north to
/// `(0, 1, 0)`) rather than re-deriving the algebra.
///
/// # Errors
///
/// Latitude must lie strictly between the poles; at or beyond ±90° the east
/// and north directions are undefined and the function fails with
/// [`Error::PoleProximity`]. Within 0.1° of a pole the rotation is still
/// computed but a warning is logged, since the east/north axes spin rapidly
/// with longitude there. Longitude is unrestricted (periodic).
///
/// [enu]: https://en.wikipedia.org/wiki/Local_tangent_plane_coordinates#Local_east,_north,_up_(ENU)_coordinates
pub fn enu_rotation_at(latitude: impl Into<Angle>, longitude: impl Into<Angle>) -> Result<Rotation> {
    let lat = latitude.into().get::<radian>();
    let lon = longitude.into().get::<radian>();

    let pole_distance = std::f64::consts::FRAC_PI_2 - lat.abs();
    if pole_distance <= 0. || !lat.is_finite() {
        return Err(Error::PoleProximity {
            latitude_deg: Angle::new::<radian>(lat).get::<degree>(),
        });
    }
    if pole_distance < POLE_GUARD {
        log::warn!(
            "east-north-up frame at latitude {:.6}° is within {:.1}° of a pole; \
             east and north are numerically unstable here",
            Angle::new::<radian>(lat).get::<degree>(),
            Angle::new::<radian>(POLE_GUARD).get::<degree>(),
        );
    }

    // reflect the conventional north-pole-referenced axes into the desired
    // handedness
    let north_pole_reflection = Matrix3::new(
        -1., 0., 0., //
        0., -1., 0., //
        0., 0., 1.,
    );

    // rotate about the east axis so the local vertical aligns with +Z
    let colatitude = std::f64::consts::FRAC_PI_2 - lat;
    let (sin_colat, cos_colat) = colatitude.sin_cos();
    let about_east = Matrix3::new(
        cos_colat, 0., sin_colat, //
        0., 1., 0., //
        -sin_colat, 0., cos_colat,
    );

    // rotate about the polar axis by the longitude
    let (sin_lon, cos_lon) = lon.sin_cos();
    let about_pole = Matrix3::new(
        cos_lon, -sin_lon, 0., //
        sin_lon, cos_lon, 0., //
        0., 0., 1.,
    );

    // reorder the north-referenced intermediate axes into East-North-Up
    let into_enu = Matrix3::new(
        0., -1., 0., //
        1., 0., 0., //
        0., 0., 1.,
    );

    let matrix = into_enu * (about_pole * about_east * north_pole_reflection).transpose();
    let rotation = nalgebra::Rotation3::from_matrix(&matrix);
    Ok(Rotation::from_unit_quaternion(
        UnitQuaternion::from_rotation_matrix(&rotation),
    ))
}

#[cfg(test)]
mod tests {
    use super::{enu_rotation_at, Rotation};
    use crate::error::Error;
    use crate::Vector3;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use quickcheck::quickcheck;
    use rstest::rstest;
    use uom::si::angle::{degree, radian};
    use uom::si::f64::Angle;

    fn d(degrees: f64) -> Angle {
        Angle::new::<degree>(degrees)
    }

    impl quickcheck::Arbitrary for Rotation {
        fn arbitrary(g: &mut quickcheck::Gen) -> Self {
            let mut component = || loop {
                let f = f64::arbitrary(g);
                if f.is_normal() && f.abs() < 1e6 {
                    break f;
                }
            };
            loop {
                if let Some(rotation) =
                    Rotation::from_quaternion(component(), component(), component(), component())
                {
                    break rotation;
                }
            }
        }
    }

    /// The unit vector pointing away from the ellipsoid surface at the given
    /// geodetic point, expressed in the Earth-centered frame.
    fn local_up(lat: Angle, lon: Angle) -> Vector3 {
        let (sin_lat, cos_lat) = lat.get::<radian>().sin_cos();
        let (sin_lon, cos_lon) = lon.get::<radian>().sin_cos();
        Vector3::new(cos_lat * cos_lon, cos_lat * sin_lon, sin_lat)
    }

    #[test]
    fn up_maps_to_z_across_the_globe() {
        let mut lat = -80.;
        while lat <= 80. {
            let mut lon = -180.;
            while lon <= 180. {
                let enu = enu_rotation_at(d(lat), d(lon)).unwrap();
                let up = enu.apply(local_up(d(lat), d(lon)));
                assert_abs_diff_eq!(up, Vector3::new(0., 0., 1.), epsilon = 1e-9);
                lon += 30.;
            }
            lat += 10.;
        }
    }

    #[rstest]
    #[case(0., 0.)]
    #[case(45., 45.)]
    #[case(-33., 151.)]
    #[case(62.5, -110.)]
    fn east_north_up_triad(#[case] lat: f64, #[case] lon: f64) {
        let enu = enu_rotation_at(d(lat), d(lon)).unwrap();

        let (sin_lat, cos_lat) = d(lat).get::<radian>().sin_cos();
        let (sin_lon, cos_lon) = d(lon).get::<radian>().sin_cos();
        let east = Vector3::new(-sin_lon, cos_lon, 0.);
        let north = Vector3::new(-cos_lon * sin_lat, -sin_lon * sin_lat, cos_lat);

        assert_abs_diff_eq!(enu.apply(east), Vector3::new(1., 0., 0.), epsilon = 1e-9);
        assert_abs_diff_eq!(enu.apply(north), Vector3::new(0., 1., 0.), epsilon = 1e-9);
        assert_abs_diff_eq!(
            enu.apply(local_up(d(lat), d(lon))),
            Vector3::new(0., 0., 1.),
            epsilon = 1e-9,
        );
    }

    #[test]
    fn equator_prime_meridian_sanity() {
        // at 0°N 0°E, ECEF +X is up, +Y is east, +Z is north
        let enu = enu_rotation_at(d(0.), d(0.)).unwrap();
        assert_abs_diff_eq!(
            enu.apply(Vector3::new(1., 0., 0.)),
            Vector3::new(0., 0., 1.),
            epsilon = 1e-12,
        );
        assert_abs_diff_eq!(
            enu.apply(Vector3::new(0., 1., 0.)),
            Vector3::new(1., 0., 0.),
            epsilon = 1e-12,
        );
        assert_abs_diff_eq!(
            enu.apply(Vector3::new(0., 0., 1.)),
            Vector3::new(0., 1., 0.),
            epsilon = 1e-12,
        );
    }

    #[rstest]
    #[case(90.)]
    #[case(-90.)]
    #[case(100.)]
    fn poles_are_rejected(#[case] lat: f64) {
        assert!(matches!(
            enu_rotation_at(d(lat), d(0.)),
            Err(Error::PoleProximity { .. }),
        ));
    }

    #[test]
    fn near_pole_still_computes() {
        // inside the warning band but still strictly inside the domain
        let enu = enu_rotation_at(d(89.95), d(12.)).unwrap();
        let up = enu.apply(local_up(d(89.95), d(12.)));
        assert_abs_diff_eq!(up, Vector3::new(0., 0., 1.), epsilon = 1e-9);
    }

    #[test]
    fn euler_round_trip() {
        let rotation = Rotation::from_euler_angles(d(30.), d(20.), d(-40.));
        let (yaw, pitch, roll) = rotation.euler_angles();
        assert_relative_eq!(yaw.get::<degree>(), 30., epsilon = 1e-10);
        assert_relative_eq!(pitch.get::<degree>(), 20., epsilon = 1e-10);
        assert_relative_eq!(roll.get::<degree>(), -40., epsilon = 1e-10);
        assert_relative_eq!(rotation.yaw().get::<degree>(), 30., epsilon = 1e-10);
    }

    #[test]
    fn zero_quaternion_is_rejected() {
        assert_eq!(Rotation::from_quaternion(0., 0., 0., 0.), None);
        assert!(Rotation::from_quaternion(0., 1., 0., 0.).is_some());
    }

    quickcheck! {
        fn apply_preserves_norm(rotation: Rotation) -> bool {
            let v = Vector3::new(3., -4., 12.);
            (rotation.apply(v).norm() - v.norm()).abs() < 1e-9
        }

        fn compose_with_inverse_is_identity(rotation: Rotation) -> bool {
            let id = rotation.compose(&rotation.inverse());
            id.angle_to(&Rotation::identity()).get::<radian>() < 1e-9
        }

        fn inverse_undoes_apply(rotation: Rotation) -> bool {
            let v = Vector3::new(1., 2., -3.);
            (rotation.apply_inverse(rotation.apply(v)) - v).norm() < 1e-9
        }
    }

    #[test]
    fn composition_applies_right_operand_first() {
        let yaw90 = Rotation::from_euler_angles(d(90.), d(0.), d(0.));
        let pitch90 = Rotation::from_euler_angles(d(0.), d(90.), d(0.));

        let composed = yaw90.compose(&pitch90);
        let expected = yaw90.apply(pitch90.apply(Vector3::new(1., 0., 0.)));
        assert_abs_diff_eq!(
            composed.apply(Vector3::new(1., 0., 0.)),
            expected,
            epsilon = 1e-12,
        );
    }
}
