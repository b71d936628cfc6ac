//! Console demo: author a pattern, dispatch it through the manager, and step
//! a fixed simulation loop until playback ends.

use anyhow::{Context, Result};
use glam::Vec3;
use tacton::{
    AffectedArea, BodySegment, CollisionResolution, HapticCurve, HapticManager, HapticPattern,
    HitOffsetMode, PatternDevice, PatternLibrary, PulseDriver, SegmentId, SurfaceHit,
};

/// Driver that logs every emission instead of driving hardware.
struct ConsoleDriver {
    name: &'static str,
}

impl PulseDriver for ConsoleDriver {
    fn pulse(&mut self, segment: &SegmentId, hit: SurfaceHit, intensity: f32) {
        log::info!(
            "[{}] pulse on {} at h={:.2} a={:.1} intensity={:.2}",
            self.name,
            segment,
            hit.height,
            hit.angle,
            intensity
        );
    }

    fn cancel(&mut self) {
        log::info!("[{}] cancel", self.name);
    }
}

/// A spiral sweep around the forearm that fades out.
fn sweep_pattern() -> HapticPattern {
    let mut pattern = HapticPattern::new();
    pattern.collision_resolution = CollisionResolution::Max;
    pattern.offset_mode = HitOffsetMode::Full;

    let mut curve = HapticCurve::new();
    curve.add_keyframe(0.0, SurfaceHit::new(0.1, 0.0), 1.0);
    curve.add_keyframe(0.5, SurfaceHit::new(0.5, 180.0), 0.8);
    curve.add_keyframe(1.0, SurfaceHit::new(0.9, 350.0), 0.0);
    pattern.add_existing_curve(curve);

    pattern
}

fn main() -> Result<()> {
    env_logger::init();

    // A forearm capsule: 30 cm long, 4 cm radius, along local Y.
    let mut forearm = BodySegment::new(
        "left_forearm",
        Vec3::ZERO,
        Vec3::new(0.0, 0.3, 0.0),
        0.04,
        Vec3::X,
    );
    forearm.set_transform(glam::Mat4::from_translation(Vec3::new(0.0, 1.2, 0.4)));

    // A sleeve device with two actuator bands.
    let mut manager = HapticManager::new();
    let sleeve = manager.add_device(Box::new(PatternDevice::new(
        ConsoleDriver { name: "sleeve" },
        vec![
            AffectedArea::new(0.0, 0.5, 0.0, 360.0),
            AffectedArea::new(0.5, 1.0, 0.0, 360.0),
        ],
    )));
    manager.register(sleeve, forearm.id().clone());

    // Author the pattern, persist it, and play it back from the library.
    let library = PatternLibrary::open(std::env::temp_dir().join("tacton-demo"))
        .context("opening pattern library")?;
    library
        .save("forearm_sweep", &sweep_pattern())
        .context("saving demo pattern")?;
    let pattern = library
        .load("forearm_sweep")
        .context("loading demo pattern")?;

    // A collision somewhere on the forearm.
    let contact_point = forearm.to_world_point(SurfaceHit::new(0.3, 45.0), false);
    let hit = forearm.to_surface_hit(contact_point);
    log::info!("contact at h={:.2} a={:.1}", hit.height, hit.angle);

    manager.dispatch_pattern(forearm.id(), hit, &pattern);

    // Host simulation loop at 60 Hz.
    let dt = 1.0 / 60.0;
    while manager.devices().any(|d| d.is_playing()) {
        manager.update(dt);
    }

    Ok(())
}
