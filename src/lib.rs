//! Reconstruction and cross-validation of a vehicle trajectory from
//! independent position and attitude sources.
//!
//! A recorded drive typically leaves behind several disagreeing accounts of
//! where the vehicle was: absolute geodetic fixes from a GPS-grade receiver,
//! frame-to-frame relative motions from a visual or radar odometry routine,
//! and the state of a fused estimator that blended the two. This crate
//! provides the geometry to put those accounts side by side:
//!
//! - conversions between Earth-centered cartesian positions ([`Ecef`]),
//!   geodetic coordinates on the WGS84 ellipsoid ([`Wgs84`]), and the local
//!   East-North-Up tangent plane ([`enu_rotation_at`]);
//! - removal of fixed sensor mounting offsets ([`reference_position`],
//!   [`BoresightOffset`]);
//! - dead-reckoning integration of relative motions into an absolute
//!   trajectory anchored at one known pose ([`DeadReckoner`], [`integrate`],
//!   [`odometry_trajectory`]);
//! - timestamped recording of fused-estimator snapshots and their projection
//!   into diagnostic time series, including normalized-innovation filter
//!   consistency checks ([`StateRecorder`]).
//!
//! Reading sensor logs, the fused filter's own update logic, the
//! frame-alignment algorithm, and all rendering stay behind the
//! [`TrajectorySource`], [`FrameAlign`], and [`EstimatorState`] traits: this
//! crate is the forward geometry between them, nothing more. Everything here
//! is synchronous, deterministic, and free of I/O.
//!
//! # Examples
//!
//! Dead-reckon a straight, eastward crawl along the equator from a known
//! starting fix:
//!
//! ```
//! use trackline::{integrate, Ecef, Pose, RigidTransform, Rotation, Timestamp, Vector3};
//!
//! // the one absolute fix we trust, at the first frame's timestamp
//! let seed = Pose::new(Ecef::from_meters(6_378_137., 0., 0.), Rotation::identity());
//!
//! // three frame alignments, each reporting "one meter body-forward"
//! let step = RigidTransform::new(Vector3::new(1., 0., 0.), Rotation::identity());
//! let steps = (1..=3).map(|i| (Timestamp::from_micros(i), step));
//!
//! let trajectory = integrate(Timestamp::from_micros(0), seed, steps)?;
//! assert_eq!(trajectory.len(), 4);
//! assert_eq!(trajectory.positions()[3], Ecef::from_meters(6_378_140., 0., 0.));
//! # Ok::<(), trackline::Error>(())
//! ```
//!
//! Convert the result for display:
//!
//! ```
//! use trackline::Ecef;
//!
//! let over_the_alps = Ecef::from_meters(4_396_296., 507_620., 4_604_817.);
//! let wgs84 = over_the_alps.to_wgs84();
//! println!("{wgs84}"); // latitude, longitude, altitude
//! ```

mod boresight;
mod consistency;
mod dead_reckoning;
mod ecef;
mod error;
mod geodetic;
mod pose;
mod recorder;
mod rotation;
mod source;
mod time;
mod util;

pub use boresight::{reference_position, reference_positions, BoresightOffset};
pub use consistency::{
    chi_square_critical, normalized_innovation_squared, per_axis_normalized_innovation,
};
pub use dead_reckoning::{integrate, odometry_trajectory, DeadReckoner, FrameAlign, Trajectory};
pub use ecef::Ecef;
pub use error::{Error, Result};
pub use geodetic::{ecef_to_wgs84, wgs84_to_ecef, Wgs84};
pub use pose::{Pose, RigidTransform};
pub use recorder::{EstimatorState, Innovation, Snapshot, StateRecorder};
pub use rotation::{enu_rotation_at, Rotation};
pub use source::{GroundTruth, TrajectorySource};
pub use time::Timestamp;
pub use util::{enu_displacements, unwrap_angles};

/// 3-vector of f64 components, used for body-frame displacements, lever
/// arms, and innovation residuals (meters throughout).
pub type Vector3 = nalgebra::Vector3<f64>;
/// 3×3 matrix of f64 components, used for innovation covariances.
pub type Matrix3 = nalgebra::Matrix3<f64>;

pub(crate) type Point3 = nalgebra::Point3<f64>;
pub(crate) type Quaternion = nalgebra::Quaternion<f64>;
pub(crate) type UnitQuaternion = nalgebra::Unit<Quaternion>;
