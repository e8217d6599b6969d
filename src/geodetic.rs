//! Geodetic coordinates on the WGS84 ellipsoid and conversions to and from
//! the Earth-centered frame.

use crate::ecef::Ecef;
use crate::util::normalize_signed_radians;
use crate::Point3;
use std::fmt;
use uom::si::f64::{Angle, Length};
use uom::si::{
    angle::{degree, radian},
    length::meter,
};

#[cfg(any(test, feature = "approx"))]
use approx::{AbsDiffEq, RelativeEq};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// Parameters of the WGS84 ellipsoid
// https://nsgreg.nga.mil/doc/view?i=4085 table 3.1
#[doc(alias = "equatorial radius")]
pub(crate) const SEMI_MAJOR_AXIS: f64 = 6_378_137.0;
#[doc(alias = "1/f")]
const INVERSE_FLATTENING: f64 = 298.257_223_563;
const FLATTENING: f64 = 1.0 / INVERSE_FLATTENING;
#[doc(alias = "polar radius")]
// b = a * (1 - f)
const SEMI_MINOR_AXIS: f64 = SEMI_MAJOR_AXIS * (1.0 - FLATTENING);
// e^2 = 1 - b^2/a^2 = 2f - f^2
const ECCENTRICITY_SQ: f64 = 2.0 * FLATTENING - FLATTENING * FLATTENING;

/// An Earth-bound location in the [World Geodetic System
/// '84](https://en.wikipedia.org/wiki/World_Geodetic_System#WGS_84):
/// geodetic latitude, longitude, and altitude above the reference ellipsoid.
///
/// This representation exists for display and for anchoring local
/// tangent-plane frames; all position arithmetic happens in [`Ecef`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Wgs84 {
    // NOTE: stored as handed to us; accessors normalize on the way out, so
    // callers may feed in angles beyond a single turn.
    pub(crate) latitude: Angle,
    pub(crate) longitude: Angle,
    altitude: Length,
}

impl Wgs84 {
    /// Constructs a location from latitude, longitude, and altitude.
    ///
    /// The latitude must be in [-90°, 90°] % 360°; anything else returns
    /// `None`. The altitude is measured along the ellipsoid normal from the
    /// ellipsoid surface, which only approximates height above ground or sea
    /// level.
    #[must_use]
    pub fn new(
        latitude: impl Into<Angle>,
        longitude: impl Into<Angle>,
        altitude: impl Into<Length>,
    ) -> Option<Self> {
        let latitude = latitude.into();
        let signed = normalize_signed_radians(latitude.get::<radian>());
        if !(-std::f64::consts::FRAC_PI_2..=std::f64::consts::FRAC_PI_2).contains(&signed) {
            return None;
        }
        Some(Self {
            latitude,
            longitude: longitude.into(),
            altitude: altitude.into(),
        })
    }

    /// Returns the geodetic latitude ("northing"), normalized into
    /// [-90°, 90°].
    #[must_use]
    pub fn latitude(&self) -> Angle {
        Angle::new::<radian>(normalize_signed_radians(self.latitude.get::<radian>()))
    }

    /// Returns the longitude east of the [IERS Reference Meridian]
    /// ("easting"), normalized into [-180°, 180°).
    ///
    /// [IERS Reference Meridian]: https://en.wikipedia.org/wiki/IERS_Reference_Meridian
    #[must_use]
    pub fn longitude(&self) -> Angle {
        Angle::new::<radian>(normalize_signed_radians(self.longitude.get::<radian>()))
    }

    /// Returns the distance beyond the WGS84 reference ellipsoid, along the
    /// ellipsoid normal.
    #[must_use]
    pub fn altitude(&self) -> Length {
        self.altitude
    }
}

impl fmt::Display for Wgs84 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lat = self.latitude();
        let lon = self.longitude();
        let ns = if lat.is_sign_positive() { 'N' } else { 'S' };
        let ew = if lon.is_sign_positive() { 'E' } else { 'W' };
        write!(
            f,
            "{}°{ns}, {}°{ew}, {}m",
            lat.abs().get::<degree>(),
            lon.abs().get::<degree>(),
            self.altitude.get::<meter>(),
        )
    }
}

impl Ecef {
    /// Converts geodetic latitude, longitude, and altitude into the
    /// Earth-centered frame.
    ///
    /// Closed form via the prime vertical radius of curvature; see
    /// <https://en.wikipedia.org/wiki/Geographic_coordinate_conversion#From_geodetic_to_ECEF_coordinates>.
    #[must_use]
    pub fn from_wgs84(wgs84: &Wgs84) -> Self {
        let h = wgs84.altitude.get::<meter>();
        let lambda = wgs84.longitude.get::<radian>();
        let phi = wgs84.latitude.get::<radian>();

        let (sin_phi, cos_phi) = phi.sin_cos();
        let (sin_lambda, cos_lambda) = lambda.sin_cos();

        // prime vertical radius of curvature at phi
        let n = SEMI_MAJOR_AXIS / (1. - ECCENTRICITY_SQ * sin_phi * sin_phi).sqrt();

        let x = (n + h) * cos_phi * cos_lambda;
        let y = (n + h) * cos_phi * sin_lambda;
        let z = ((1. - ECCENTRICITY_SQ) * n + h) * sin_phi;

        Self::from_nalgebra_point(Point3::new(x, y, z))
    }

    /// Converts an Earth-centered position into geodetic latitude, longitude,
    /// and altitude.
    ///
    /// There is no exact closed form for this direction; this implementation
    /// iterates the scheme of [Shu & Li][shu-li], which converges to within
    /// f64 round-off in a handful of steps and behaves well in both
    /// hemispheres and at the poles.
    ///
    /// [shu-li]: https://www.sciencedirect.com/science/article/pii/S0098300410001238
    #[must_use]
    pub fn to_wgs84(&self) -> Wgs84 {
        let lon = self.point.y.atan2(self.point.x);

        let a = SEMI_MAJOR_AXIS;
        let b = SEMI_MINOR_AXIS;
        let a2 = a * a;
        let b2 = b * b;
        let z2 = self.point.z.powi(2);
        let r2 = self.point.x.powi(2) + self.point.y.powi(2);
        let r = r2.sqrt();
        let dist2 = r2 + z2;

        // initial tangent-angle parameter, refined by Newton steps below
        let denom = a2 * z2 + b2 * r2;
        let mut k = ((denom.sqrt() - a * b) * dist2) / denom;
        loop {
            let p = a + b * k;
            let q = b + a * k;
            let f_k = 2. * (b * p * q.powi(2) + a * p.powi(2) * q - a * r2 * q - b * z2 * p);
            let dk = -1. / f_k;

            // dk is a delta on the tangent of the surface angle; it shrinks
            // below f64 resolution within a few iterations
            if !dk.is_normal() || dk.abs() < f64::EPSILON {
                break;
            }

            k += dk;
        }

        let p = a + b * k;
        let q = b + a * k;
        let lat = ((a * p * self.point.z) / (b * q * r)).atan();
        let altitude = k * ((b2 * r2 / p.powi(2)) + (a2 * z2 / q.powi(2))).sqrt();

        Wgs84 {
            latitude: Angle::new::<radian>(lat),
            longitude: Angle::new::<radian>(lon),
            altitude: Length::new::<meter>(altitude),
        }
    }
}

impl From<Ecef> for Wgs84 {
    fn from(ecef: Ecef) -> Self {
        ecef.to_wgs84()
    }
}

impl From<Wgs84> for Ecef {
    fn from(wgs84: Wgs84) -> Self {
        Self::from_wgs84(&wgs84)
    }
}

/// Converts a sequence of Earth-centered positions into geodetic coordinates.
///
/// The single-point shape is [`Ecef::to_wgs84`]; no wrapping into a batch is
/// required.
#[must_use]
pub fn ecef_to_wgs84(positions: &[Ecef]) -> Vec<Wgs84> {
    positions.iter().map(Ecef::to_wgs84).collect()
}

/// Converts a sequence of geodetic coordinates into Earth-centered positions.
///
/// The single-point shape is [`Ecef::from_wgs84`].
#[must_use]
pub fn wgs84_to_ecef(coords: &[Wgs84]) -> Vec<Ecef> {
    coords.iter().map(Ecef::from_wgs84).collect()
}

#[cfg(any(test, feature = "approx"))]
impl AbsDiffEq<Self> for Wgs84 {
    type Epsilon = <f64 as AbsDiffEq>::Epsilon;

    fn default_epsilon() -> Self::Epsilon {
        // radians of arc and meters of altitude share this bound; at the
        // Earth's surface 1e-9 rad of latitude is ~6mm
        1e-9
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        let d_lat = normalize_signed_radians(
            self.latitude.get::<radian>() - other.latitude.get::<radian>(),
        );
        let d_lon = normalize_signed_radians(
            self.longitude.get::<radian>() - other.longitude.get::<radian>(),
        );
        d_lat.abs() <= epsilon
            && d_lon.abs() <= epsilon
            && self
                .altitude
                .get::<meter>()
                .abs_diff_eq(&other.altitude.get::<meter>(), epsilon)
    }
}

#[cfg(any(test, feature = "approx"))]
impl RelativeEq for Wgs84 {
    fn default_max_relative() -> Self::Epsilon {
        f64::default_max_relative()
    }

    fn relative_eq(
        &self,
        other: &Self,
        epsilon: Self::Epsilon,
        max_relative: Self::Epsilon,
    ) -> bool {
        let d_lat = normalize_signed_radians(
            self.latitude.get::<radian>() - other.latitude.get::<radian>(),
        );
        let d_lon = normalize_signed_radians(
            self.longitude.get::<radian>() - other.longitude.get::<radian>(),
        );
        d_lat.abs_diff_eq(&0., epsilon)
            && d_lon.abs_diff_eq(&0., epsilon)
            && self.altitude.get::<meter>().relative_eq(
                &other.altitude.get::<meter>(),
                epsilon,
                max_relative,
            )
    }
}

#[cfg(test)]
mod tests {
    use super::{ecef_to_wgs84, wgs84_to_ecef, Wgs84};
    use crate::ecef::Ecef;
    use approx::assert_relative_eq;
    use quickcheck::quickcheck;
    use rstest::rstest;
    use uom::si::f64::{Angle, Length};
    use uom::si::{angle::degree, length::meter};

    fn m(meters: f64) -> Length {
        Length::new::<meter>(meters)
    }
    fn d(degrees: f64) -> Angle {
        Angle::new::<degree>(degrees)
    }

    impl quickcheck::Arbitrary for Wgs84 {
        fn arbitrary(g: &mut quickcheck::Gen) -> Self {
            // quickcheck will hand us awkward f64 values; skip those
            let mut finite = || loop {
                match f64::arbitrary(g) {
                    0. => break 0.,
                    f if f.is_normal() => break f,
                    _ => {}
                }
            };
            let latitude = finite().rem_euclid(178.) - 89.;
            let longitude = finite().rem_euclid(360.) - 180.;
            let altitude = finite().rem_euclid(11_000.) - 1_000.;
            Wgs84::new(d(latitude), d(longitude), m(altitude))
                .expect("latitude generated in [-89, 89]")
        }
    }

    #[rstest]
    #[case(d(90.9948211), d(7.8211606), m(1000.))]
    #[case(d(190.112282), d(19.880389), m(0.))]
    #[case(d(-135.), d(0.), m(0.))]
    fn rejects_out_of_range_latitude(
        #[case] latitude: Angle,
        #[case] longitude: Angle,
        #[case] altitude: Length,
    ) {
        assert_eq!(Wgs84::new(latitude, longitude, altitude), None);
    }

    #[test]
    fn known_geodetic_to_ecef() {
        for ((lat, lon, alt), (x, y, z)) in [
            ((0., 0., 0.), (6_378_137., 0., 0.)),
            (
                // Mt. Fuji
                (35.3619, 138.7280, 2294.0),
                (-3_915_138.118_709_466, 3_436_144.354_064_903, 3_672_011.028_417_511),
            ),
            (
                (-27.270950, 19.880389, 3000.),
                (5_337_604.33, 1_930_119.71, -2_906_308.35),
            ),
        ] {
            let wgs84 = Wgs84::new(d(lat), d(lon), m(alt)).unwrap();
            let ecef = Ecef::from_wgs84(&wgs84);
            assert_relative_eq!(
                ecef,
                Ecef::from_meters(x, y, z),
                epsilon = 1e-2,
                max_relative = 1e-9,
            );
        }
    }

    #[rstest]
    #[case(0., 0.)]
    #[case(0., 179.5)]
    #[case(45., 45.)]
    #[case(-45., -135.)]
    #[case(80., 10.)]
    #[case(-80., -170.)]
    #[case(52.52, 13.405)]
    fn ecef_round_trips_to_micrometers(#[case] lat: f64, #[case] lon: f64) {
        for alt in [-1000., 0., 305.7, 10_000.] {
            let wgs84 = Wgs84::new(d(lat), d(lon), m(alt)).unwrap();
            let ecef = Ecef::from_wgs84(&wgs84);
            let back = Ecef::from_wgs84(&ecef.to_wgs84());
            assert_relative_eq!(ecef, back, epsilon = 1e-6);
        }
    }

    // the poles are the stress case for the iteration: the equatorial radius
    // term collapses and longitude becomes arbitrary
    #[rstest]
    #[case(90., 0.)]
    #[case(-90., 0.)]
    #[case(89.999999, 180.)]
    #[case(-89.999999, -179.99999)]
    fn polar_round_trips(#[case] lat: f64, #[case] lon: f64) {
        let wgs84 = Wgs84::new(d(lat), d(lon), m(1000.)).unwrap();
        let ecef = Ecef::from_wgs84(&wgs84);
        let back = Ecef::from_wgs84(&ecef.to_wgs84());
        assert_relative_eq!(ecef, back, epsilon = 1e-3);
    }

    fn check_against_oracle(wgs84: Wgs84) {
        let ecef = Ecef::from_wgs84(&wgs84);

        let oracle = nav_types::WGS84::from_degrees_and_meters(
            wgs84.latitude().get::<degree>(),
            wgs84.longitude().get::<degree>(),
            wgs84.altitude().get::<meter>(),
        );
        let oracle_ecef = nav_types::ECEF::from(oracle);

        assert_relative_eq!(
            ecef,
            Ecef::from_meters(oracle_ecef.x(), oracle_ecef.y(), oracle_ecef.z()),
            epsilon = 1e-3,
        );

        assert_relative_eq!(Wgs84::from(ecef), wgs84, epsilon = 1e-7);
    }

    quickcheck! {
        fn ecef_matches_independent_implementation(wgs84: Wgs84) -> () {
            check_against_oracle(wgs84);
        }
    }

    #[test]
    fn batch_mirrors_single_point_shape() {
        let coords = [
            Wgs84::new(d(0.), d(0.), m(0.)).unwrap(),
            Wgs84::new(d(48.8575), d(2.3514), m(35.)).unwrap(),
        ];
        let positions = wgs84_to_ecef(&coords);
        assert_eq!(positions.len(), 2);
        assert_relative_eq!(positions[0], Ecef::from_wgs84(&coords[0]));

        let back = ecef_to_wgs84(&positions);
        for (orig, round) in coords.iter().zip(&back) {
            assert_relative_eq!(orig, round, epsilon = 1e-7);
        }
    }

    #[test]
    fn display_quadrants() {
        let wgs84 = Wgs84::new(d(-35.25), d(138.5), m(120.)).unwrap();
        let shown = wgs84.to_string();
        assert!(shown.contains("°S"), "{shown}");
        assert!(shown.contains("°E"), "{shown}");

        let wgs84 = Wgs84::new(d(35.25), d(-138.5), m(120.)).unwrap();
        let shown = wgs84.to_string();
        assert!(shown.contains("°N"), "{shown}");
        assert!(shown.contains("°W"), "{shown}");
    }
}
