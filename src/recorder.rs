//! Timestamped recording of fused-estimator state for offline diagnostics.

use crate::consistency::{normalized_innovation_squared, per_axis_normalized_innovation};
use crate::ecef::Ecef;
use crate::error::Result;
use crate::rotation::Rotation;
use crate::time::Timestamp;
use crate::util::unwrap_angles;
use crate::{Matrix3, Vector3};
use std::collections::BTreeMap;
use uom::si::f64::Angle;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One filter update's innovation: the measurement residual and the
/// covariance the filter predicted for it, both in meters (squared).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Innovation {
    /// The measurement residual `z`.
    pub residual: Vector3,
    /// The predicted innovation covariance `S`.
    pub covariance: Matrix3,
}

/// A read-only view of a live fused estimator, as much of it as the recorder
/// needs.
///
/// The estimator's internal update logic is not this crate's concern; any
/// recursive filter that can report its current position, attitude, and last
/// innovation can be recorded. Each method returns an owned value, so a
/// recorded snapshot can never alias the live filter's state.
pub trait EstimatorState {
    /// The estimator's current position.
    fn position(&self) -> Ecef;

    /// The estimator's current attitude.
    fn attitude(&self) -> Rotation;

    /// The innovation of the estimator's most recent measurement update, or
    /// `None` if it has not absorbed a measurement yet.
    fn innovation(&self) -> Option<Innovation>;
}

/// An independent copy of a fused estimator's state at one timestamp.
///
/// Owned exclusively by the [`StateRecorder`] that made it; later mutation
/// of the live estimator cannot reach back into it.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Snapshot {
    position: Ecef,
    attitude: Rotation,
    innovation: Option<Innovation>,
}

impl Snapshot {
    /// The recorded position.
    #[must_use]
    pub fn position(&self) -> Ecef {
        self.position
    }

    /// The recorded attitude.
    #[must_use]
    pub fn attitude(&self) -> Rotation {
        self.attitude
    }

    /// The recorded innovation, if the estimator had absorbed a measurement.
    #[must_use]
    pub fn innovation(&self) -> Option<&Innovation> {
        self.innovation.as_ref()
    }

    /// The joint normalized innovation squared of this snapshot at the given
    /// confidence level, or `None` for a snapshot recorded before the first
    /// measurement update.
    ///
    /// See [`normalized_innovation_squared`].
    pub fn normalized_innovation_squared(&self, confidence: f64) -> Option<Result<f64>> {
        self.innovation
            .as_ref()
            .map(|innovation| normalized_innovation_squared(innovation, confidence))
    }

    /// The per-axis normalized innovation squared of this snapshot at the
    /// given confidence level, or `None` for a snapshot recorded before the
    /// first measurement update.
    ///
    /// See [`per_axis_normalized_innovation`].
    pub fn per_axis_normalized_innovation(&self, confidence: f64) -> Option<Result<Vector3>> {
        self.innovation
            .as_ref()
            .map(|innovation| per_axis_normalized_innovation(innovation, confidence))
    }
}

/// Records timestamped snapshots of a fused estimator and projects them into
/// time series for diagnostics.
///
/// Snapshots are keyed by timestamp; recording twice at the same key
/// overwrites (last write wins), and every projection runs in ascending
/// timestamp order regardless of the order the snapshots arrived in, so a
/// re-ordered replay of the same updates produces identical series.
#[derive(Debug, Clone, Default)]
pub struct StateRecorder {
    store: BTreeMap<Timestamp, Snapshot>,
}

impl StateRecorder {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an independent copy of the estimator's current state at the
    /// given timestamp, replacing any earlier record at the same timestamp.
    pub fn record(&mut self, timestamp: Timestamp, state: &impl EstimatorState) {
        // field-by-field copy out of the live estimator; the snapshot owns
        // every value it holds
        let snapshot = Snapshot {
            position: state.position(),
            attitude: state.attitude(),
            innovation: state.innovation(),
        };
        self.store.insert(timestamp, snapshot);
    }

    /// Number of recorded snapshots (re-records at the same timestamp count
    /// once).
    #[must_use]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Whether nothing has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// The snapshot recorded at exactly the given timestamp, if any.
    #[must_use]
    pub fn get(&self, timestamp: Timestamp) -> Option<&Snapshot> {
        self.store.get(&timestamp)
    }

    /// Iterates over `(timestamp, snapshot)` pairs in ascending timestamp
    /// order.
    pub fn snapshots(&self) -> impl Iterator<Item = (Timestamp, &Snapshot)> {
        self.store.iter().map(|(ts, snapshot)| (*ts, snapshot))
    }

    /// The recorded timestamps, ascending.
    #[must_use]
    pub fn timestamps(&self) -> Vec<Timestamp> {
        self.store.keys().copied().collect()
    }

    /// The recorded positions, in ascending timestamp order.
    #[must_use]
    pub fn positions(&self) -> Vec<Ecef> {
        self.store.values().map(Snapshot::position).collect()
    }

    /// The recorded attitudes, in ascending timestamp order.
    #[must_use]
    pub fn attitudes(&self) -> Vec<Rotation> {
        self.store.values().map(Snapshot::attitude).collect()
    }

    /// Projects every snapshot through `f` into a time series, in ascending
    /// timestamp order.
    ///
    /// Read-only; calling this repeatedly without an intervening
    /// [`record`](Self::record) yields identical results.
    pub fn series<T>(&self, mut f: impl FnMut(&Snapshot) -> T) -> Vec<(Timestamp, T)> {
        self.store
            .iter()
            .map(|(ts, snapshot)| (*ts, f(snapshot)))
            .collect()
    }

    /// The estimator's heading over time, unwrapped into a continuous angle
    /// series (no ±180° jumps).
    #[must_use]
    pub fn yaw_series(&self) -> Vec<(Timestamp, Angle)> {
        let yaws: Vec<Angle> = self
            .store
            .values()
            .map(|snapshot| snapshot.attitude.yaw())
            .collect();
        self.store
            .keys()
            .copied()
            .zip(unwrap_angles(&yaws))
            .collect()
    }

    /// The joint normalized innovation squared over time, at the given
    /// confidence level. Snapshots without an innovation (eg, recorded
    /// before the first measurement update) are skipped.
    ///
    /// # Errors
    ///
    /// Propagates the failures of
    /// [`normalized_innovation_squared`].
    pub fn normalized_innovations(&self, confidence: f64) -> Result<Vec<(Timestamp, f64)>> {
        self.store
            .iter()
            .filter_map(|(ts, snapshot)| {
                snapshot
                    .innovation
                    .as_ref()
                    .map(|innovation| (ts, innovation))
            })
            .map(|(ts, innovation)| {
                Ok((*ts, normalized_innovation_squared(innovation, confidence)?))
            })
            .collect()
    }

    /// The per-axis normalized innovation squared over time, at the given
    /// confidence level. Snapshots without an innovation are skipped.
    ///
    /// # Errors
    ///
    /// Propagates the failures of
    /// [`per_axis_normalized_innovation`].
    pub fn per_axis_innovations(&self, confidence: f64) -> Result<Vec<(Timestamp, Vector3)>> {
        self.store
            .iter()
            .filter_map(|(ts, snapshot)| {
                snapshot
                    .innovation
                    .as_ref()
                    .map(|innovation| (ts, innovation))
            })
            .map(|(ts, innovation)| {
                Ok((*ts, per_axis_normalized_innovation(innovation, confidence)?))
            })
            .collect()
    }
}
