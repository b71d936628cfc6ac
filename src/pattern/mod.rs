//! Authored multi-curve haptic effects.
//!
//! A [`HapticPattern`] bundles an ordered list of [`HapticCurve`]s with the
//! policies that govern playback: how simultaneous samples targeting the same
//! actuator are combined, how out-of-range coordinates are resolved, and at
//! what cadence the pattern is stepped. Patterns are authored offline and
//! read-only during playback, except for the transient hit offset stamped by
//! the dispatcher.

use crate::body::SurfaceHit;
use crate::curve::{HapticCurve, ValidationError};

/// Policy for combining simultaneous intensities that target the same
/// actuator.
///
/// `Add` and `Multiply` combine the raw per-curve intensities first and clamp
/// only the combined result, so `Add` can saturate and `Multiply` collapses
/// to zero whenever any colliding sample is zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "assets", derive(serde::Serialize, serde::Deserialize))]
pub enum CollisionResolution {
    Min,
    Max,
    #[default]
    Average,
    Add,
    Multiply,
    /// Use the pattern's priority curve when it is among the colliding
    /// samples, otherwise the first colliding sample.
    CurvePriority,
}

/// Policy for evaluated coordinates that fall outside their valid range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "assets", derive(serde::Serialize, serde::Deserialize))]
pub enum OvershootResolution {
    /// Skip the sample for this tick.
    Discard,
    /// Pin to the nearest bound.
    #[default]
    Clamp,
    /// Wrap modulo the valid range (angle 370 becomes 10).
    Wrap,
}

/// Cadence at which a playing pattern is stepped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "assets", derive(serde::Serialize, serde::Deserialize))]
pub enum PlaybackTiming {
    /// Advance by the host's frame delta.
    #[default]
    VariableRate,
    /// Advance in fixed physics-style steps.
    FixedRate,
    /// Advance by the pattern's own interval on a self-re-arming timer.
    Custom,
}

/// Which axes of the triggering hit offset are applied during evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "assets", derive(serde::Serialize, serde::Deserialize))]
pub enum HitOffsetMode {
    #[default]
    Disabled,
    /// Shift both height and angle toward the triggering hit.
    Full,
    HeightOnly,
    AngleOnly,
}

/// One curve's evaluated output for a single tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveSample {
    pub hit: SurfaceHit,
    pub intensity: f32,
}

/// An authored, reusable time-based haptic effect composed of one or more
/// curves.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "assets", derive(serde::Serialize, serde::Deserialize))]
pub struct HapticPattern {
    curves: Vec<HapticCurve>,
    pub collision_resolution: CollisionResolution,
    /// Curve index used by [`CollisionResolution::CurvePriority`]. Kept in
    /// range by [`remove_curve`](Self::remove_curve).
    pub priority_curve: usize,
    pub timing: PlaybackTiming,
    /// Step length in seconds for [`PlaybackTiming::Custom`]. Default: 0.05.
    pub custom_interval: f32,
    pub height_overshoot: OvershootResolution,
    pub angle_overshoot: OvershootResolution,
    pub offset_mode: HitOffsetMode,
    /// The hit that last triggered this pattern. Transient: stamped by the
    /// dispatcher when playback starts, cleared when playback is not active,
    /// never persisted.
    #[cfg_attr(feature = "assets", serde(skip))]
    hit_offset: Option<SurfaceHit>,
}

impl Default for HapticPattern {
    fn default() -> Self {
        Self {
            curves: Vec::new(),
            collision_resolution: CollisionResolution::default(),
            priority_curve: 0,
            timing: PlaybackTiming::default(),
            custom_interval: 0.05,
            height_overshoot: OvershootResolution::default(),
            angle_overshoot: OvershootResolution::default(),
            offset_mode: HitOffsetMode::default(),
            hit_offset: None,
        }
    }
}

impl HapticPattern {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn curve_count(&self) -> usize {
        self.curves.len()
    }

    pub fn curves(&self) -> &[HapticCurve] {
        &self.curves
    }

    pub fn curve(&self, index: usize) -> Option<&HapticCurve> {
        self.curves.get(index)
    }

    pub fn curve_mut(&mut self, index: usize) -> Option<&mut HapticCurve> {
        self.curves.get_mut(index)
    }

    /// Append a new empty curve and return its index.
    pub fn add_curve(&mut self) -> usize {
        self.curves.push(HapticCurve::new());
        self.curves.len() - 1
    }

    /// Append an existing curve and return its index.
    pub fn add_existing_curve(&mut self, curve: HapticCurve) -> usize {
        self.curves.push(curve);
        self.curves.len() - 1
    }

    /// Remove and return the curve at `index`.
    ///
    /// Later curve indices shift down by one; callers holding them must
    /// remap. The pattern's own priority-curve index is remapped here:
    /// decremented when it sat past the removal point, reset to 0 when the
    /// priority curve itself was removed.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn remove_curve(&mut self, index: usize) -> HapticCurve {
        assert!(
            index < self.curves.len(),
            "curve index {} out of bounds for pattern of {} curves",
            index,
            self.curves.len()
        );
        let removed = self.curves.remove(index);
        if self.priority_curve == index {
            self.priority_curve = 0;
        } else if self.priority_curve > index {
            self.priority_curve -= 1;
        }
        removed
    }

    /// End time of the curve at `index`.
    pub fn curve_end_time(&self, index: usize) -> Option<f32> {
        self.curves.get(index).map(HapticCurve::end_time)
    }

    /// Latest end time across all curves, 0 when the pattern has no curves.
    pub fn end_time(&self) -> f32 {
        self.curves
            .iter()
            .map(HapticCurve::end_time)
            .fold(0.0, f32::max)
    }

    pub fn hit_offset(&self) -> Option<SurfaceHit> {
        self.hit_offset
    }

    /// Stamp the hit that triggered this playback.
    pub fn set_hit_offset(&mut self, hit: SurfaceHit) {
        self.hit_offset = Some(hit);
    }

    /// Clear the transient offset; called whenever playback is not active.
    pub fn clear_hit_offset(&mut self) {
        self.hit_offset = None;
    }

    /// Evaluate every curve at `t`, one output slot per curve.
    ///
    /// Per curve: evaluate the three tracks, then (when the offset mode
    /// enables it) add the delta between the stored hit offset and the
    /// curve's first keyframe to the sample, then apply overshoot resolution
    /// for height and angle independently. A `None` slot means the sample
    /// was discarded for this tick. Non-discarded samples satisfy height in
    /// `[0, 1]`, angle in `[0, 360)`, intensity in `[0, 1]`.
    pub fn evaluate_all(&self, t: f32) -> Vec<Option<CurveSample>> {
        let offset = match self.offset_mode {
            HitOffsetMode::Disabled => None,
            _ => self.hit_offset,
        };

        self.curves
            .iter()
            .map(|curve| {
                let (hit, intensity) = curve.evaluate(t);
                let mut height = hit.height;
                let mut angle = hit.angle;

                if let (Some(offset), Some((first_height, first_angle))) =
                    (offset, curve.first_values())
                {
                    if matches!(self.offset_mode, HitOffsetMode::Full | HitOffsetMode::HeightOnly) {
                        height += offset.height - first_height;
                    }
                    if matches!(self.offset_mode, HitOffsetMode::Full | HitOffsetMode::AngleOnly) {
                        angle += offset.angle - first_angle;
                    }
                }

                let height = resolve_overshoot(height, 0.0, 1.0, self.height_overshoot)?;
                let angle = resolve_overshoot(angle, 0.0, 360.0, self.angle_overshoot)?;
                // Canonicalize the closed upper bound into [0, 360).
                let angle = if angle >= 360.0 { 0.0 } else { angle };

                Some(CurveSample {
                    hit: SurfaceHit::new(height, angle),
                    intensity,
                })
            })
            .collect()
    }

    /// Validate every curve plus the pattern's own cross-references, for
    /// assets that bypassed the editing operations.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for curve in &self.curves {
            curve.validate()?;
        }
        if !self.curves.is_empty() && self.priority_curve >= self.curves.len() {
            return Err(ValidationError::PriorityCurveOutOfRange {
                index: self.priority_curve,
                curves: self.curves.len(),
            });
        }
        if self.timing == PlaybackTiming::Custom && self.custom_interval <= 0.0 {
            return Err(ValidationError::NonPositiveInterval {
                interval: self.custom_interval,
            });
        }
        Ok(())
    }
}

/// Apply one overshoot policy to a value with the valid range `[min, max]`.
/// `None` means the sample is discarded for this tick.
fn resolve_overshoot(value: f32, min: f32, max: f32, policy: OvershootResolution) -> Option<f32> {
    if value >= min && value <= max {
        return Some(value);
    }
    match policy {
        OvershootResolution::Discard => None,
        OvershootResolution::Clamp => Some(value.clamp(min, max)),
        OvershootResolution::Wrap => Some(min + (value - min).rem_euclid(max - min)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constant_curve(height: f32, angle: f32, intensity: f32, end: f32) -> HapticCurve {
        let mut curve = HapticCurve::new();
        curve.add_keyframe(0.0, SurfaceHit::new(height, angle), intensity);
        curve.add_keyframe(end, SurfaceHit::new(height, angle), intensity);
        curve
    }

    #[test]
    fn test_end_time_is_latest_curve_end() {
        let mut pattern = HapticPattern::new();
        assert_eq!(pattern.end_time(), 0.0);
        pattern.add_existing_curve(constant_curve(0.5, 0.0, 1.0, 1.0));
        pattern.add_existing_curve(constant_curve(0.5, 0.0, 1.0, 2.5));
        assert_eq!(pattern.end_time(), 2.5);
        assert_eq!(pattern.curve_end_time(0), Some(1.0));
    }

    #[test]
    fn test_remove_curve_remaps_priority() {
        let mut pattern = HapticPattern::new();
        for _ in 0..3 {
            pattern.add_curve();
        }
        pattern.priority_curve = 2;

        pattern.remove_curve(0);
        assert_eq!(pattern.priority_curve, 1);

        pattern.remove_curve(1);
        assert_eq!(pattern.priority_curve, 0);
    }

    #[test]
    fn test_evaluate_all_one_slot_per_curve() {
        let mut pattern = HapticPattern::new();
        pattern.add_existing_curve(constant_curve(0.2, 45.0, 0.3, 1.0));
        pattern.add_existing_curve(constant_curve(0.8, 200.0, 0.9, 1.0));

        let samples = pattern.evaluate_all(0.5);
        assert_eq!(samples.len(), 2);
        let first = samples[0].unwrap();
        assert!((first.hit.height - 0.2).abs() < 1e-6);
        assert!((first.intensity - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_offset_shifts_samples() {
        let mut pattern = HapticPattern::new();
        pattern.offset_mode = HitOffsetMode::Full;
        pattern.add_existing_curve(constant_curve(0.2, 40.0, 1.0, 1.0));
        pattern.set_hit_offset(SurfaceHit::new(0.5, 100.0));

        let sample = pattern.evaluate_all(0.5)[0].unwrap();
        assert!((sample.hit.height - 0.5).abs() < 1e-6);
        assert!((sample.hit.angle - 100.0).abs() < 1e-4);
    }

    #[test]
    fn test_offset_mode_axis_subset() {
        let mut pattern = HapticPattern::new();
        pattern.offset_mode = HitOffsetMode::HeightOnly;
        pattern.add_existing_curve(constant_curve(0.2, 40.0, 1.0, 1.0));
        pattern.set_hit_offset(SurfaceHit::new(0.5, 100.0));

        let sample = pattern.evaluate_all(0.5)[0].unwrap();
        assert!((sample.hit.height - 0.5).abs() < 1e-6);
        assert!((sample.hit.angle - 40.0).abs() < 1e-4);
    }

    #[test]
    fn test_overshoot_wrap() {
        // Curve sweeps from 20 to 350 degrees; the offset shifts it by +20,
        // so the final sample lands at 370 and wraps to 10.
        let mut pattern = HapticPattern::new();
        pattern.offset_mode = HitOffsetMode::Full;
        pattern.angle_overshoot = OvershootResolution::Wrap;
        let mut curve = HapticCurve::new();
        curve.add_keyframe(0.0, SurfaceHit::new(0.5, 20.0), 1.0);
        curve.add_keyframe(1.0, SurfaceHit::new(0.5, 350.0), 1.0);
        pattern.add_existing_curve(curve);
        pattern.set_hit_offset(SurfaceHit::new(0.5, 40.0));

        let sample = pattern.evaluate_all(1.0)[0].unwrap();
        assert!((sample.hit.angle - 10.0).abs() < 1e-3, "angle = {}", sample.hit.angle);
    }

    #[test]
    fn test_overshoot_clamp_and_discard() {
        // First keyframe at height 0.9, offset 0.6 above it: the evaluated
        // sample lands at 1.5, outside [0, 1].
        let mut pattern = HapticPattern::new();
        pattern.offset_mode = HitOffsetMode::Full;
        pattern.height_overshoot = OvershootResolution::Clamp;
        pattern.add_existing_curve(constant_curve(0.9, 100.0, 1.0, 1.0));
        pattern.set_hit_offset(SurfaceHit::new(1.5, 100.0));

        let sample = pattern.evaluate_all(0.5)[0].unwrap();
        assert_eq!(sample.hit.height, 1.0);

        pattern.height_overshoot = OvershootResolution::Discard;
        let samples = pattern.evaluate_all(0.5);
        assert!(samples[0].is_none(), "out-of-range sample must be discarded");
    }

    #[test]
    fn test_range_invariant_after_resolution() {
        let mut pattern = HapticPattern::new();
        pattern.offset_mode = HitOffsetMode::Full;
        pattern.height_overshoot = OvershootResolution::Wrap;
        pattern.angle_overshoot = OvershootResolution::Wrap;
        pattern.add_existing_curve(constant_curve(0.7, 300.0, 0.8, 2.0));
        pattern.add_existing_curve(constant_curve(0.1, 30.0, 0.4, 2.0));
        pattern.set_hit_offset(SurfaceHit::new(0.9, 350.0));

        for tick in 0..20 {
            let t = tick as f32 * 0.1;
            for sample in pattern.evaluate_all(t).into_iter().flatten() {
                assert!((0.0..=1.0).contains(&sample.hit.height));
                assert!((0.0..360.0).contains(&sample.hit.angle));
                assert!((0.0..=1.0).contains(&sample.intensity));
            }
        }
    }

    #[test]
    fn test_validate_priority_and_interval() {
        let mut pattern = HapticPattern::new();
        pattern.add_curve();
        pattern.priority_curve = 3;
        assert!(matches!(
            pattern.validate(),
            Err(ValidationError::PriorityCurveOutOfRange { index: 3, curves: 1 })
        ));

        pattern.priority_curve = 0;
        pattern.timing = PlaybackTiming::Custom;
        pattern.custom_interval = 0.0;
        assert!(matches!(
            pattern.validate(),
            Err(ValidationError::NonPositiveInterval { .. })
        ));

        pattern.custom_interval = 0.02;
        assert!(pattern.validate().is_ok());
    }

    #[test]
    fn test_wrap_helper() {
        assert_eq!(
            resolve_overshoot(370.0, 0.0, 360.0, OvershootResolution::Wrap),
            Some(10.0)
        );
        assert_eq!(
            resolve_overshoot(-0.25, 0.0, 1.0, OvershootResolution::Wrap),
            Some(0.75)
        );
        assert_eq!(
            resolve_overshoot(1.2, 0.0, 1.0, OvershootResolution::Clamp),
            Some(1.0)
        );
        assert_eq!(
            resolve_overshoot(1.2, 0.0, 1.0, OvershootResolution::Discard),
            None
        );
    }
}
