//! Device contract, collision resolution, and pattern playback.
//!
//! Hardware vendors implement only the two [`PulseDriver`] primitives; the
//! engine-side [`HapticDevice`] contract (one-shot pulses, the playback
//! state machine, per-tick stepping, collision resolution) is provided
//! by the generic [`PatternDevice`]. The manager holds devices as trait
//! objects and never depends on concrete types.

pub mod playback;

pub use playback::PlaybackConfig;

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::body::{AffectedArea, SegmentId, SurfaceHit};
use crate::pattern::{CollisionResolution, CurveSample, HapticPattern, PlaybackTiming};

use self::playback::Session;

/// Smallest usable custom playback interval; guards against a zero interval
/// slipping past asset validation.
const MIN_CUSTOM_INTERVAL: f32 = 1e-4;

/// The two hardware primitives a vendor driver must provide.
///
/// Drivers are infallible by contract: a disconnected or failing device
/// no-ops (or caches the failure) instead of surfacing an error, so one
/// device can never interrupt another device's dispatch.
pub trait PulseDriver {
    /// Emit one instantaneous pulse at the given surface coordinate.
    fn pulse(&mut self, segment: &SegmentId, hit: SurfaceHit, intensity: f32);

    /// Cancel all output. Must be safe to call at any time, in any state.
    fn cancel(&mut self);
}

/// Engine-side contract for a haptic output device.
///
/// A device owns the [`AffectedArea`]s describing its actuator coverage,
/// renders one-shot pulses, and drives pattern playback over time. At most
/// one pattern plays per device; starting a new one implicitly stops the
/// previous session.
pub trait HapticDevice {
    /// Actuator coverage in surface coordinates. The position of an area in
    /// this list is the device's physical actuator index.
    fn areas(&self) -> &[AffectedArea];

    /// Fire exactly one instantaneous pulse if `hit` lies inside one of the
    /// device's areas; silent no-op otherwise.
    fn trigger_pulse(&mut self, segment: &SegmentId, hit: SurfaceHit, intensity: f32);

    /// Begin a playback session, resetting elapsed time to 0.
    fn start_pattern(&mut self, segment: &SegmentId, pattern: HapticPattern);

    /// End the session playing on `segment`. The hardware cancel is always
    /// issued, even when the device is idle.
    fn stop_pattern(&mut self, segment: &SegmentId);

    /// Unconditionally cancel all output and clear playback state.
    fn cancel(&mut self);

    /// Advance playback by the host's frame delta. Called once per
    /// simulation tick.
    fn step(&mut self, dt: f32);

    fn is_playing(&self) -> bool {
        self.playing_segment().is_some()
    }

    /// Segment of the active playback session, if any.
    fn playing_segment(&self) -> Option<&SegmentId>;
}

/// Generic device implementation over a vendor [`PulseDriver`].
#[derive(Debug)]
pub struct PatternDevice<D: PulseDriver> {
    driver: D,
    areas: Vec<AffectedArea>,
    config: PlaybackConfig,
    session: Option<Session>,
}

impl<D: PulseDriver> PatternDevice<D> {
    /// Create a device from its driver and actuator coverage.
    pub fn new(driver: D, areas: Vec<AffectedArea>) -> Self {
        Self {
            driver,
            areas,
            config: PlaybackConfig::default(),
            session: None,
        }
    }

    pub fn with_config(mut self, config: PlaybackConfig) -> Self {
        self.config = config;
        self
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Elapsed playback time of the active session.
    pub fn elapsed(&self) -> Option<f32> {
        self.session.as_ref().map(|s| s.elapsed)
    }

    /// Evaluate, resolve, and emit one tick, then advance elapsed time.
    /// Returns true when the session has run past the pattern's end.
    fn tick(driver: &mut D, areas: &[AffectedArea], session: &mut Session, dt: f32) -> bool {
        let samples = session.pattern.evaluate_all(session.elapsed);
        let resolved = resolve_collisions(
            areas,
            &samples,
            session.pattern.collision_resolution,
            session.pattern.priority_curve,
        );
        for sample in resolved.into_iter().flatten() {
            driver.pulse(&session.segment, sample.hit, sample.intensity);
        }
        session.elapsed += dt;
        session.elapsed > session.pattern.end_time()
    }
}

impl<D: PulseDriver> HapticDevice for PatternDevice<D> {
    fn areas(&self) -> &[AffectedArea] {
        &self.areas
    }

    fn trigger_pulse(&mut self, segment: &SegmentId, hit: SurfaceHit, intensity: f32) {
        if AffectedArea::index_of(&self.areas, hit).is_some() {
            self.driver.pulse(segment, hit, intensity.clamp(0.0, 1.0));
        }
    }

    fn start_pattern(&mut self, segment: &SegmentId, pattern: HapticPattern) {
        if self.session.is_some() {
            self.driver.cancel();
        }
        tracing::debug!(segment = %segment, "pattern playback started");
        self.session = Some(Session::new(segment.clone(), pattern));
    }

    fn stop_pattern(&mut self, segment: &SegmentId) {
        // The cancel must reach hardware even when idle (idempotent cancel).
        self.driver.cancel();
        if self
            .session
            .as_ref()
            .is_some_and(|s| &s.segment == segment)
        {
            tracing::debug!(segment = %segment, "pattern playback stopped");
            self.session = None;
        }
    }

    fn cancel(&mut self) {
        self.driver.cancel();
        self.session = None;
    }

    fn step(&mut self, dt: f32) {
        let Some(session) = self.session.as_mut() else {
            return;
        };

        let finished = match session.pattern.timing {
            PlaybackTiming::VariableRate => {
                Self::tick(&mut self.driver, &self.areas, session, dt)
            }
            PlaybackTiming::FixedRate => Self::step_accumulated(
                &mut self.driver,
                &self.areas,
                session,
                dt,
                self.config.fixed_timestep,
                self.config.max_substeps,
            ),
            PlaybackTiming::Custom => {
                let interval = session.pattern.custom_interval.max(MIN_CUSTOM_INTERVAL);
                Self::step_accumulated(
                    &mut self.driver,
                    &self.areas,
                    session,
                    dt,
                    interval,
                    self.config.max_substeps,
                )
            }
        };

        if finished {
            tracing::debug!(segment = %session.segment, "pattern playback finished");
            self.driver.cancel();
            self.session = None;
        }
    }

    fn playing_segment(&self) -> Option<&SegmentId> {
        self.session.as_ref().map(|s| &s.segment)
    }
}

impl<D: PulseDriver> PatternDevice<D> {
    /// Consume host time in fixed ticks, re-arming until the frame delta or
    /// the substep cap is spent.
    fn step_accumulated(
        driver: &mut D,
        areas: &[AffectedArea],
        session: &mut Session,
        dt: f32,
        interval: f32,
        max_substeps: u32,
    ) -> bool {
        session.accumulator += dt;
        let mut substeps = 0;
        while session.accumulator >= interval && substeps < max_substeps {
            if Self::tick(driver, areas, session, interval) {
                return true;
            }
            session.accumulator -= interval;
            substeps += 1;
        }
        // Clamp leftover time to avoid the spiral of death.
        if session.accumulator > interval * max_substeps as f32 {
            session.accumulator = 0.0;
        }
        false
    }
}

/// Combine simultaneous per-curve samples that target the same actuator.
///
/// Sample slots are grouped by [`AffectedArea::index_of`]. For any actuator
/// index shared by two or more samples, intensities are combined per policy
/// without pre-clamping the individual values, then the combined result is
/// clamped to `[0, 1]` and broadcast back to every colliding slot. Slots that
/// were discarded, or whose hit lies outside every area, come back as `None`
/// and produce no hardware command.
pub fn resolve_collisions(
    areas: &[AffectedArea],
    samples: &[Option<CurveSample>],
    policy: CollisionResolution,
    priority_curve: usize,
) -> Vec<Option<CurveSample>> {
    let mut resolved: Vec<Option<CurveSample>> = Vec::with_capacity(samples.len());
    let mut groups: HashMap<usize, Vec<usize>> = HashMap::new();

    for (slot, sample) in samples.iter().copied().enumerate() {
        match sample.and_then(|s| AffectedArea::index_of(areas, s.hit).map(|a| (a, s))) {
            Some((actuator, sample)) => {
                groups.entry(actuator).or_default().push(slot);
                resolved.push(Some(sample));
            }
            None => resolved.push(None),
        }
    }

    for slots in groups.values() {
        if slots.len() < 2 {
            continue;
        }
        let intensities: Vec<f32> = slots
            .iter()
            .filter_map(|&slot| resolved[slot].map(|s| s.intensity))
            .collect();

        let combined = match policy {
            CollisionResolution::Min => intensities.iter().copied().fold(f32::INFINITY, f32::min),
            CollisionResolution::Max => {
                intensities.iter().copied().fold(f32::NEG_INFINITY, f32::max)
            }
            CollisionResolution::Average => {
                intensities.iter().sum::<f32>() / intensities.len() as f32
            }
            CollisionResolution::Add => intensities.iter().sum(),
            CollisionResolution::Multiply => intensities.iter().product(),
            CollisionResolution::CurvePriority => {
                if slots.contains(&priority_curve) {
                    resolved[priority_curve]
                        .map(|s| s.intensity)
                        .unwrap_or(intensities[0])
                } else {
                    intensities[0]
                }
            }
        }
        .clamp(0.0, 1.0);

        for &slot in slots {
            if let Some(sample) = resolved[slot].as_mut() {
                sample.intensity = combined;
            }
        }
    }

    resolved
}

/// One captured pulse emission.
#[derive(Debug, Clone, PartialEq)]
pub struct PulseRecord {
    pub segment: SegmentId,
    pub hit: SurfaceHit,
    pub intensity: f32,
}

/// Driver that captures emissions instead of driving hardware.
///
/// Clones share the same buffer, so a copy can be kept outside the device
/// for inspection. Used by the test suites and by visualization collaborators
/// that replay `(segment, hit, intensity)` emissions. Single-threaded, like
/// the engine itself.
#[derive(Debug, Clone, Default)]
pub struct RecordingDriver {
    inner: Rc<RefCell<Recording>>,
}

#[derive(Debug, Default)]
struct Recording {
    pulses: Vec<PulseRecord>,
    cancels: usize,
}

impl RecordingDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pulses(&self) -> Vec<PulseRecord> {
        self.inner.borrow().pulses.clone()
    }

    pub fn pulse_count(&self) -> usize {
        self.inner.borrow().pulses.len()
    }

    pub fn cancel_count(&self) -> usize {
        self.inner.borrow().cancels
    }

    pub fn clear(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.pulses.clear();
        inner.cancels = 0;
    }
}

impl PulseDriver for RecordingDriver {
    fn pulse(&mut self, segment: &SegmentId, hit: SurfaceHit, intensity: f32) {
        self.inner.borrow_mut().pulses.push(PulseRecord {
            segment: segment.clone(),
            hit,
            intensity,
        });
    }

    fn cancel(&mut self) {
        self.inner.borrow_mut().cancels += 1;
    }
}
