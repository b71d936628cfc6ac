//! Shared setup helpers for the engine benchmarks.

use glam::Vec3;
use tacton::{
    AffectedArea, BodySegment, HapticCurve, HapticDevice, HapticPattern, PatternDevice,
    PulseDriver, SegmentId, SurfaceHit,
};

/// Driver that discards every emission; keeps benchmarks free of I/O.
#[derive(Debug, Default)]
pub struct NullDriver;

impl PulseDriver for NullDriver {
    fn pulse(&mut self, _segment: &SegmentId, _hit: SurfaceHit, _intensity: f32) {}
    fn cancel(&mut self) {}
}

/// A forearm-sized capsule with an off-origin transform.
pub fn setup_segment() -> BodySegment {
    BodySegment::new(
        "forearm",
        Vec3::ZERO,
        Vec3::new(0.0, 0.3, 0.0),
        0.04,
        Vec3::X,
    )
    .with_transform(glam::Mat4::from_translation(Vec3::new(0.2, 1.1, -0.4)))
}

/// A curve sweeping the full surface with `keys` keyframes.
pub fn setup_curve(keys: usize) -> HapticCurve {
    let mut curve = HapticCurve::new();
    for i in 0..keys {
        let t = i as f32 / keys.max(1) as f32;
        curve.add_keyframe(t * 2.0, SurfaceHit::new(t, (t * 340.0) % 360.0), 1.0 - t);
    }
    curve
}

/// A pattern of `curves` sweeping curves, `keys` keyframes each.
pub fn setup_pattern(curves: usize, keys: usize) -> HapticPattern {
    let mut pattern = HapticPattern::new();
    for _ in 0..curves {
        pattern.add_existing_curve(setup_curve(keys));
    }
    pattern
}

/// A grid of `bands` x `sectors` actuator areas covering the surface.
pub fn setup_areas(bands: usize, sectors: usize) -> Vec<AffectedArea> {
    let mut areas = Vec::with_capacity(bands * sectors);
    for band in 0..bands {
        for sector in 0..sectors {
            areas.push(AffectedArea::new(
                band as f32 / bands as f32,
                (band + 1) as f32 / bands as f32,
                sector as f32 * 360.0 / sectors as f32,
                (sector + 1) as f32 * 360.0 / sectors as f32,
            ));
        }
    }
    areas
}

/// A device mid-playback, ready to be stepped.
pub fn setup_playing_device(curves: usize, keys: usize) -> PatternDevice<NullDriver> {
    let mut device = PatternDevice::new(NullDriver, setup_areas(4, 8));
    device.start_pattern(&SegmentId::new("forearm"), setup_pattern(curves, keys));
    device
}
