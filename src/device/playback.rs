//! Pattern playback state.
//!
//! Playback is explicit state plus an elapsed-time accumulator advanced once
//! per scheduled tick; nothing blocks or spawns. The fixed-rate and custom
//! timing modes consume the host's frame delta through the same accumulator
//! scheme as a fixed-timestep physics loop.

use crate::body::SegmentId;
use crate::pattern::HapticPattern;

/// Stepping configuration for fixed-rate pattern playback.
#[derive(Debug, Clone)]
pub struct PlaybackConfig {
    /// Step length for [`PlaybackTiming::FixedRate`] patterns in seconds.
    /// Default: 1/60.
    ///
    /// [`PlaybackTiming::FixedRate`]: crate::pattern::PlaybackTiming::FixedRate
    pub fixed_timestep: f32,
    /// Maximum ticks consumed per `step` call for the accumulator-driven
    /// timing modes. Default: 4.
    pub max_substeps: u32,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            fixed_timestep: 1.0 / 60.0,
            max_substeps: 4,
        }
    }
}

/// One active playback session.
#[derive(Debug)]
pub(crate) struct Session {
    pub(crate) segment: SegmentId,
    pub(crate) pattern: HapticPattern,
    /// Accumulated playback time; the pattern is evaluated at this time each
    /// tick, then the tick's duration is added.
    pub(crate) elapsed: f32,
    /// Unconsumed host time for the fixed-rate and custom timing modes.
    pub(crate) accumulator: f32,
}

impl Session {
    pub(crate) fn new(segment: SegmentId, pattern: HapticPattern) -> Self {
        Self {
            segment,
            pattern,
            elapsed: 0.0,
            accumulator: 0.0,
        }
    }
}
