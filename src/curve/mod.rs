//! Time-keyed haptic trajectories.
//!
//! A [`HapticCurve`] describes one continuous point-of-contact trajectory as
//! three parallel keyframe tracks (height, angle, intensity) that share
//! identical keyframe times. Every edit goes through the curve so the tracks
//! stay synchronized; assets that arrive desynchronized are rejected by
//! [`HapticCurve::validate`] instead of being partially evaluated.

use thiserror::Error;

use crate::body::SurfaceHit;

/// Why a curve or pattern asset was rejected at load time.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error(
        "keyframe tracks have unequal lengths (height {height}, angle {angle}, intensity {intensity})"
    )]
    TrackLengthMismatch {
        height: usize,
        angle: usize,
        intensity: usize,
    },
    #[error("keyframe times diverge at index {index} ({height} / {angle} / {intensity})")]
    TimeMismatch {
        index: usize,
        height: f32,
        angle: f32,
        intensity: f32,
    },
    #[error("keyframe times are not sorted at index {index}")]
    UnsortedTimes { index: usize },
    #[error("priority curve index {index} is out of range for {curves} curves")]
    PriorityCurveOutOfRange { index: usize, curves: usize },
    #[error("custom playback interval must be positive (got {interval})")]
    NonPositiveInterval { interval: f32 },
}

/// A single time-keyed value.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "assets", derive(serde::Serialize, serde::Deserialize))]
pub struct Keyframe {
    pub time: f32,
    pub value: f32,
}

/// One sorted keyframe sequence with linear interpolation and endpoint hold.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "assets", derive(serde::Serialize, serde::Deserialize))]
struct Track {
    keys: Vec<Keyframe>,
}

impl Track {
    /// Insertion position keeping times sorted; equal times insert after.
    fn insertion_index(&self, time: f32) -> usize {
        self.keys.partition_point(|k| k.time <= time)
    }

    fn insert(&mut self, index: usize, time: f32, value: f32) {
        self.keys.insert(index, Keyframe { time, value });
    }

    fn last_time(&self) -> f32 {
        self.keys.last().map_or(0.0, |k| k.time)
    }

    /// Evaluate at `t`: linear between keyframes, held at the nearest
    /// endpoint outside the keyed range, 0 when empty.
    fn sample(&self, t: f32) -> f32 {
        let keys = &self.keys;
        let Some(first) = keys.first() else {
            return 0.0;
        };
        if t <= first.time {
            return first.value;
        }
        let Some(last) = keys.last() else {
            return 0.0;
        };
        if t >= last.time {
            return last.value;
        }

        let after = keys.partition_point(|k| k.time <= t);
        let a = keys[after - 1];
        let b = keys[after];
        let span = b.time - a.time;
        if span <= f32::EPSILON {
            a.value
        } else {
            a.value + (b.value - a.value) * ((t - a.time) / span)
        }
    }
}

/// Three synchronized keyframe tracks describing one point-of-contact
/// trajectory: height(t) in `[0, 1]`, angle(t) in `[0, 360]`, intensity(t)
/// in `[0, 1]`.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "assets", derive(serde::Serialize, serde::Deserialize))]
pub struct HapticCurve {
    height: Track,
    angle: Track,
    intensity: Track,
}

impl HapticCurve {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keyframes (identical across the three tracks).
    pub fn len(&self) -> usize {
        self.height.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.height.keys.is_empty()
    }

    /// Time of the curve's last keyframe, 0 when empty.
    pub fn end_time(&self) -> f32 {
        self.height.last_time()
    }

    /// Time of the keyframe at `index`.
    pub fn time_at(&self, index: usize) -> Option<f32> {
        self.height.keys.get(index).map(|k| k.time)
    }

    /// The keyframe at `index` as `(time, hit, intensity)`.
    pub fn keyframe_at(&self, index: usize) -> Option<(f32, SurfaceHit, f32)> {
        let height = self.height.keys.get(index)?;
        let angle = self.angle.keys.get(index)?;
        let intensity = self.intensity.keys.get(index)?;
        Some((
            height.time,
            SurfaceHit::new(height.value, angle.value),
            intensity.value,
        ))
    }

    /// First-keyframe height and angle, used as the reference point when a
    /// pattern applies its hit offset.
    pub(crate) fn first_values(&self) -> Option<(f32, f32)> {
        let height = self.height.keys.first()?;
        let angle = self.angle.keys.first()?;
        Some((height.value, angle.value))
    }

    /// Insert a keyframe into all three tracks at the same time.
    ///
    /// Time is floored at 0; values are clamped into their declared ranges.
    /// Returns the index the keyframe landed at.
    pub fn add_keyframe(&mut self, time: f32, hit: SurfaceHit, intensity: f32) -> usize {
        let time = time.max(0.0);
        let index = self.height.insertion_index(time);
        self.height.insert(index, time, hit.height.clamp(0.0, 1.0));
        self.angle.insert(index, time, hit.angle.clamp(0.0, 360.0));
        self.intensity.insert(index, time, intensity.clamp(0.0, 1.0));
        index
    }

    /// Replace the keyframe at `index` with new values, re-sorting by time.
    ///
    /// Returns the keyframe's new index. When the new time reorders the
    /// keyframe, every externally held keyframe index for this curve is
    /// invalidated and must be remapped by the caller.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn move_keyframe(&mut self, index: usize, time: f32, hit: SurfaceHit, intensity: f32) -> usize {
        self.remove_keyframe(index);
        self.add_keyframe(time, hit, intensity)
    }

    /// Remove the keyframe at `index` from all three tracks.
    ///
    /// Later keyframe indices shift down by one; callers holding them must
    /// remap.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn remove_keyframe(&mut self, index: usize) {
        assert!(
            index < self.len(),
            "keyframe index {} out of bounds for curve of {} keyframes",
            index,
            self.len()
        );
        self.height.keys.remove(index);
        self.angle.keys.remove(index);
        self.intensity.keys.remove(index);
    }

    /// Evaluate the three tracks at `t`.
    ///
    /// Each track interpolates independently and holds at its endpoints
    /// outside the keyed range. Height and intensity are clamped to
    /// `[0, 1]`, angle to `[0, 360]`.
    pub fn evaluate(&self, t: f32) -> (SurfaceHit, f32) {
        let height = self.height.sample(t).clamp(0.0, 1.0);
        let angle = self.angle.sample(t).clamp(0.0, 360.0);
        let intensity = self.intensity.sample(t).clamp(0.0, 1.0);
        (SurfaceHit::new(height, angle), intensity)
    }

    /// Check the track-synchronization invariant, for assets that bypassed
    /// the editing operations (e.g. deserialized from a corrupted file).
    pub fn validate(&self) -> Result<(), ValidationError> {
        let (h, a, i) = (
            self.height.keys.len(),
            self.angle.keys.len(),
            self.intensity.keys.len(),
        );
        if h != a || h != i {
            return Err(ValidationError::TrackLengthMismatch {
                height: h,
                angle: a,
                intensity: i,
            });
        }
        for index in 0..h {
            let ht = self.height.keys[index].time;
            let at = self.angle.keys[index].time;
            let it = self.intensity.keys[index].time;
            if ht != at || ht != it {
                return Err(ValidationError::TimeMismatch {
                    index,
                    height: ht,
                    angle: at,
                    intensity: it,
                });
            }
            if index > 0 && self.height.keys[index - 1].time > ht {
                return Err(ValidationError::UnsortedTimes { index });
            }
        }
        Ok(())
    }
}
