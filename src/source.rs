//! The sensor-log collaborator interface.
//!
//! Reading, decoding, and storing sensor logs is not this crate's concern;
//! the geometry pipeline only needs a narrow, read-only view of one. This
//! module defines that view.

use crate::boresight::{reference_positions, BoresightOffset};
use crate::dead_reckoning::FrameAlign;
use crate::ecef::Ecef;
use crate::error::Result;
use crate::rotation::Rotation;
use crate::time::Timestamp;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A read-only view of one sensor log: an absolute (GPS) track, a timestamp
/// sequence, alignable sensor frames, and the sensor's mounting offset.
///
/// All sequences are time-ordered and, where parallel, of equal length.
pub trait TrajectorySource {
    /// The opaque sensor-frame type this log hands out.
    type Frame: FrameAlign;

    /// The absolute positions reported by the log's GPS-grade source, one
    /// per timestamp.
    fn gps_positions(&self) -> &[Ecef];

    /// The absolute attitudes paired with [`gps_positions`], mapping the
    /// Earth frame into the body frame.
    ///
    /// [`gps_positions`]: Self::gps_positions
    fn gps_attitudes(&self) -> &[Rotation];

    /// The log's strictly increasing timestamp sequence. Sub-ranges are
    /// plain slices of this.
    fn timestamps(&self) -> &[Timestamp];

    /// The sensor frame captured at the given timestamp.
    fn frame_at(&self, timestamp: Timestamp) -> Self::Frame;

    /// The mounting offset of the tracked sensor.
    fn boresight(&self) -> BoresightOffset;

    /// An independent reference track, if the log carries one.
    ///
    /// Most logs do not; a `None` here is an ordinary state to branch on,
    /// not a failure.
    fn groundtruth(&self) -> Option<&GroundTruth> {
        None
    }
}

/// An independently surveyed reference track some logs carry alongside the
/// sensor data, used to judge reconstruction quality offline.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GroundTruth {
    /// Timestamps of the reference track (its own time base; not
    /// necessarily aligned with the log's frame timestamps).
    pub times: Vec<Timestamp>,
    /// Reference positions, parallel to `times`.
    pub positions: Vec<Ecef>,
    /// Reference attitudes, parallel to `times`.
    pub attitudes: Vec<Rotation>,
    /// Mounting offset of the reference sensor.
    pub boresight: BoresightOffset,
}

impl GroundTruth {
    /// The reference track translated to the vehicle reference point, with
    /// the reference sensor's own mounting offset removed.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::LengthMismatch`](crate::Error::LengthMismatch)
    /// when the position and attitude sequences differ in length.
    pub fn reference_track(&self) -> Result<Vec<Ecef>> {
        reference_positions(&self.positions, &self.attitudes, &self.boresight)
    }
}
