//! Angle normalization and local-frame projection helpers for the display
//! paths.

use crate::ecef::Ecef;
use crate::error::Result;
use crate::rotation::enu_rotation_at;
use crate::Vector3;
use uom::si::angle::radian;
use uom::si::f64::Angle;

/// Normalizes an angle in radians into [-π, π).
///
/// Values already inside [0, π) pass through `rem_euclid` unchanged, so
/// boundary values like π/2 survive bit-for-bit.
pub(crate) fn normalize_signed_radians(radians: f64) -> f64 {
    let bounded = radians.rem_euclid(std::f64::consts::TAU);
    if bounded < std::f64::consts::PI {
        bounded
    } else {
        bounded - std::f64::consts::TAU
    }
}

/// Removes ±half-turn jumps from an angle series, making it continuous.
///
/// Each successive difference is normalized into [-π, π) and accumulated
/// onto the running value, so a heading series crossing the ±180° seam keeps
/// counting up (or down) instead of jumping. The first element is returned
/// as-is.
#[must_use]
pub fn unwrap_angles(angles: &[Angle]) -> Vec<Angle> {
    let mut out = Vec::with_capacity(angles.len());
    let Some(first) = angles.first() else {
        return out;
    };
    out.push(*first);

    let mut previous_raw = first.get::<radian>();
    let mut accumulated = previous_raw;
    for angle in &angles[1..] {
        let raw = angle.get::<radian>();
        accumulated += normalize_signed_radians(raw - previous_raw);
        out.push(Angle::new::<radian>(accumulated));
        previous_raw = raw;
    }
    out
}

/// Projects an Earth-centered track into the local East-North-Up tangent
/// plane centered on its first point, for plotting a trajectory "from
/// above".
///
/// Returns one displacement per input point (the first is always zero). An
/// empty track yields an empty result.
///
/// # Errors
///
/// Fails with [`Error::PoleProximity`](crate::Error::PoleProximity) when the
/// first point sits on a pole, where the tangent-plane axes are undefined.
pub fn enu_displacements(track: &[Ecef]) -> Result<Vec<Vector3>> {
    let Some(origin) = track.first() else {
        return Ok(Vec::new());
    };
    let anchor = origin.to_wgs84();
    let to_enu = enu_rotation_at(anchor.latitude(), anchor.longitude())?;
    Ok(track
        .iter()
        .map(|position| to_enu.apply(*position - *origin))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::{enu_displacements, normalize_signed_radians, unwrap_angles};
    use crate::ecef::Ecef;
    use crate::geodetic::Wgs84;
    use crate::Vector3;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use rstest::rstest;
    use std::f64::consts::{FRAC_PI_2, PI};
    use uom::si::angle::{degree, radian};
    use uom::si::f64::{Angle, Length};
    use uom::si::length::meter;

    #[rstest]
    #[case(0., 0.)]
    #[case(FRAC_PI_2, FRAC_PI_2)]
    #[case(-FRAC_PI_2, -FRAC_PI_2)]
    #[case(PI, -PI)]
    #[case(3. * PI, -PI)]
    #[case(-PI, -PI)]
    #[case(2. * PI, 0.)]
    fn signed_normalization(#[case] input: f64, #[case] expected: f64) {
        assert_abs_diff_eq!(normalize_signed_radians(input), expected, epsilon = 1e-12);
    }

    #[test]
    fn unwrap_keeps_series_continuous() {
        let wrapped: Vec<Angle> = [170., 179., -179., -170.]
            .into_iter()
            .map(Angle::new::<degree>)
            .collect();
        let unwrapped = unwrap_angles(&wrapped);
        let degrees: Vec<f64> = unwrapped.iter().map(|a| a.get::<degree>()).collect();
        assert_relative_eq!(degrees[1] - degrees[0], 9., epsilon = 1e-9);
        assert_relative_eq!(degrees[2] - degrees[1], 2., epsilon = 1e-9);
        assert_relative_eq!(degrees[3], 190., epsilon = 1e-9);
    }

    #[test]
    fn unwrap_of_empty_and_single() {
        assert!(unwrap_angles(&[]).is_empty());
        let single = [Angle::new::<degree>(12.)];
        assert_eq!(unwrap_angles(&single), single);
    }

    #[test]
    fn pure_east_track_projects_onto_the_east_axis() {
        // two points on the equator, a sliver of longitude apart: the
        // displacement is (east, 0, ~0) in the tangent plane
        let a = Ecef::from_wgs84(
            &Wgs84::new(
                Angle::new::<degree>(0.),
                Angle::new::<degree>(0.),
                Length::new::<meter>(0.),
            )
            .unwrap(),
        );
        let b = Ecef::from_wgs84(
            &Wgs84::new(
                Angle::new::<degree>(0.),
                Angle::new::<radian>(1e-5),
                Length::new::<meter>(0.),
            )
            .unwrap(),
        );

        let displacements = enu_displacements(&[a, b]).unwrap();
        assert_abs_diff_eq!(displacements[0], Vector3::zeros(), epsilon = 1e-12);

        let east = displacements[1];
        // ~64m east, nothing north, a hair below the tangent plane from the
        // Earth's curvature
        assert_relative_eq!(east.x, 6_378_137. * 1e-5, max_relative = 1e-6);
        assert_abs_diff_eq!(east.y, 0., epsilon = 1e-6);
        assert!(east.z.abs() < 0.01);
    }

    #[test]
    fn empty_track_is_fine() {
        assert_eq!(enu_displacements(&[]).unwrap(), Vec::<Vector3>::new());
    }
}
