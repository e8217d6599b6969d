//! Dead-reckoning integration of frame-to-frame motion into an absolute
//! trajectory.
//!
//! A frame aligner (visual or radar odometry, scan matching, ...) can only
//! say how the vehicle moved *between* two sensor frames. Anchoring one
//! absolute pose and chaining those relative motions forward reconstructs the
//! whole trajectory. There is no correction mechanism in this chain: each
//! step's alignment error rotates and shifts every subsequent pose, so drift
//! grows without bound over the sequence. That is inherent to the method --
//! cross-validate against an absolute source rather than trusting long
//! chains.

use crate::ecef::Ecef;
use crate::error::{Error, Result};
use crate::pose::{Pose, RigidTransform};
use crate::rotation::Rotation;
use crate::source::TrajectorySource;
use crate::time::Timestamp;

/// A sensor frame that can measure the rigid motion separating it from
/// another frame of the same kind.
///
/// Implemented by the opaque frame objects of a sensor log; the alignment
/// algorithm behind it (image registration, point-cloud matching, ...) is
/// not this crate's concern.
pub trait FrameAlign {
    /// Computes the motion from `earlier`'s pose to this frame's pose, with
    /// the translation expressed in `earlier`'s body frame.
    fn align_to(&self, earlier: &Self) -> RigidTransform;
}

/// A time-ordered absolute trajectory: parallel timestamp, position, and
/// attitude sequences.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Trajectory {
    timestamps: Vec<Timestamp>,
    positions: Vec<Ecef>,
    attitudes: Vec<Rotation>,
}

impl Trajectory {
    fn with_seed(timestamp: Timestamp, seed: Pose) -> Self {
        Self {
            timestamps: vec![timestamp],
            positions: vec![seed.position],
            attitudes: vec![seed.attitude],
        }
    }

    /// The timestamps of the trajectory, strictly increasing.
    #[must_use]
    pub fn timestamps(&self) -> &[Timestamp] {
        &self.timestamps
    }

    /// The positions of the trajectory, parallel to
    /// [`timestamps`](Self::timestamps).
    #[must_use]
    pub fn positions(&self) -> &[Ecef] {
        &self.positions
    }

    /// The attitudes of the trajectory, parallel to
    /// [`timestamps`](Self::timestamps).
    #[must_use]
    pub fn attitudes(&self) -> &[Rotation] {
        &self.attitudes
    }

    /// Number of poses in the trajectory.
    #[must_use]
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Whether the trajectory holds no poses at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Returns the pose at the given index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<(Timestamp, Pose)> {
        Some((
            *self.timestamps.get(index)?,
            Pose::new(self.positions[index], self.attitudes[index]),
        ))
    }

    /// Iterates over `(timestamp, pose)` pairs in time order.
    pub fn iter(&self) -> impl Iterator<Item = (Timestamp, Pose)> + '_ {
        (0..self.len()).map(|i| {
            (
                self.timestamps[i],
                Pose::new(self.positions[i], self.attitudes[i]),
            )
        })
    }
}

/// Incremental dead-reckoning state: one absolute pose, advanced one relative
/// motion at a time.
///
/// Streaming counterpart of [`integrate`]; feeding the same steps in the same
/// order produces the identical trajectory. The accumulated pose at step `i`
/// is a strict function of the pose at step `i-1` and the `i`-th motion:
///
/// - `attitude[i] = attitude[i-1] ∘ step.rotation` (increment composed on
///   the right, in the frame of the previous pose);
/// - `position[i] = position[i-1] + attitude[i-1]⁻¹ · step.translation`
///   (the body-frame translation carried into the Earth frame by the
///   *previous* attitude, which is the frame the aligner reported it in).
#[derive(Debug, Clone)]
pub struct DeadReckoner {
    trajectory: Trajectory,
}

impl DeadReckoner {
    /// Starts a reckoner at a known absolute pose, typically the first fix of
    /// an independent absolute source.
    #[must_use]
    pub fn new(timestamp: Timestamp, seed: Pose) -> Self {
        Self {
            trajectory: Trajectory::with_seed(timestamp, seed),
        }
    }

    /// The timestamp and pose the reckoner is currently at.
    #[must_use]
    pub fn current(&self) -> (Timestamp, Pose) {
        self.trajectory
            .get(self.trajectory.len() - 1)
            .expect("a reckoner always holds at least its seed")
    }

    /// Advances by one relative motion and returns the new absolute pose.
    ///
    /// # Errors
    ///
    /// The timestamp must strictly increase over the current one; otherwise
    /// the step is rejected with [`Error::TimestampOrder`] and the reckoner
    /// is left unchanged.
    pub fn advance(&mut self, timestamp: Timestamp, step: &RigidTransform) -> Result<Pose> {
        let (previous_ts, previous) = self.current();
        if timestamp <= previous_ts {
            return Err(Error::TimestampOrder {
                index: self.trajectory.len(),
                previous: previous_ts,
                current: timestamp,
            });
        }

        let position = previous.position + previous.attitude.apply_inverse(step.translation);
        let attitude = previous.attitude.compose(&step.rotation);
        let pose = Pose::new(position, attitude);

        self.trajectory.timestamps.push(timestamp);
        self.trajectory.positions.push(position);
        self.trajectory.attitudes.push(attitude);
        Ok(pose)
    }

    /// The trajectory accumulated so far, seed included.
    #[must_use]
    pub fn trajectory(&self) -> &Trajectory {
        &self.trajectory
    }

    /// Consumes the reckoner, returning the accumulated trajectory.
    #[must_use]
    pub fn into_trajectory(self) -> Trajectory {
        self.trajectory
    }
}

/// Chains a sequence of timestamped relative motions into an absolute
/// trajectory anchored at `seed`.
///
/// The first output pose is the seed exactly; an empty `steps` sequence
/// therefore yields a single-pose trajectory. Equivalent to driving a
/// [`DeadReckoner`] by hand.
///
/// # Errors
///
/// Fails with [`Error::TimestampOrder`] as soon as a step's timestamp does
/// not strictly increase.
pub fn integrate(
    seed_timestamp: Timestamp,
    seed: Pose,
    steps: impl IntoIterator<Item = (Timestamp, RigidTransform)>,
) -> Result<Trajectory> {
    let mut reckoner = DeadReckoner::new(seed_timestamp, seed);
    for (timestamp, step) in steps {
        reckoner.advance(timestamp, &step)?;
    }
    Ok(reckoner.into_trajectory())
}

/// Reconstructs the odometry-only trajectory of a sensor log: aligns each
/// frame to its predecessor and dead-reckons the resulting motions from the
/// log's first absolute pose.
///
/// A log without timestamps yields an empty trajectory; a log with
/// timestamps but no absolute pose to anchor at fails with
/// [`Error::NoSeedPose`].
///
/// # Errors
///
/// Propagates [`Error::TimestampOrder`] from the integration and
/// [`Error::NoSeedPose`] as above.
pub fn odometry_trajectory<S: TrajectorySource>(source: &S) -> Result<Trajectory> {
    let timestamps = source.timestamps();
    let Some(&seed_timestamp) = timestamps.first() else {
        return Ok(Trajectory::default());
    };
    let seed = Pose::new(
        *source.gps_positions().first().ok_or(Error::NoSeedPose)?,
        *source.gps_attitudes().first().ok_or(Error::NoSeedPose)?,
    );

    let mut reckoner = DeadReckoner::new(seed_timestamp, seed);
    for window in timestamps.windows(2) {
        let earlier = source.frame_at(window[0]);
        let later = source.frame_at(window[1]);
        reckoner.advance(window[1], &later.align_to(&earlier))?;
    }
    Ok(reckoner.into_trajectory())
}
