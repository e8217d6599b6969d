//! Sensor-log timestamps.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A sensor-log timestamp with microsecond resolution.
///
/// Stored as an unsigned tick count so it can serve as a totally-ordered map
/// key without floating-point comparison caveats. The epoch is whatever the
/// originating log's time base is (typically the start of the recording);
/// timestamps from different logs are only comparable if their time bases
/// agree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Timestamp(u64);

impl Timestamp {
    /// Constructs a timestamp from a microsecond tick count.
    #[must_use]
    pub const fn from_micros(micros: u64) -> Self {
        Self(micros)
    }

    /// Constructs a timestamp from seconds since the log's time base.
    ///
    /// Sub-microsecond fractions are rounded to the nearest tick. Negative or
    /// non-finite input saturates to zero.
    #[must_use]
    pub fn from_secs_f64(seconds: f64) -> Self {
        if !seconds.is_finite() || seconds <= 0. {
            return Self(0);
        }
        Self((seconds * 1e6).round() as u64)
    }

    /// Returns the microsecond tick count.
    #[must_use]
    pub const fn as_micros(self) -> u64 {
        self.0
    }

    /// Returns the timestamp as seconds since the log's time base.
    #[must_use]
    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / 1e6
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}s", self.as_secs_f64())
    }
}
