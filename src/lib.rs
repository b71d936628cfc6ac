//! Tacton Haptic Engine
//!
//! A body-coordinate haptic pattern engine: converts 3D collision points on
//! a tracked body into device-independent surface coordinates, evaluates
//! authored time-based vibration patterns at those coordinates, resolves
//! conflicts between overlapping pattern channels, and dispatches
//! per-actuator intensities to registered output devices.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! 1. **body** - Capsule segments and surface coordinates (BodySegment, SurfaceHit, AffectedArea)
//! 2. **curve** - Time-keyed contact trajectories (HapticCurve)
//! 3. **pattern** - Authored multi-curve effects with resolution policies (HapticPattern)
//! 4. **device** - Device contract and pattern playback (HapticDevice, PatternDevice)
//! 5. **manager** - Body-part → device registry and dispatch (HapticManager)
//! 6. **assets** - JSON pattern library (feature = "assets")
//!
//! The engine is single-threaded and cooperative: the host simulation loop
//! calls [`HapticManager::update`] once per tick, and playback is explicit
//! state advanced by that tick. Nothing blocks or spawns.

pub mod body;
pub mod curve;
pub mod device;
pub mod manager;
pub mod pattern;

#[cfg(feature = "assets")]
pub mod assets;

// Re-export commonly used types
pub use body::{AffectedArea, AngleDirection, BodySegment, SegmentId, SurfaceHit};

pub use curve::{HapticCurve, Keyframe, ValidationError};

pub use pattern::{
    CollisionResolution, CurveSample, HapticPattern, HitOffsetMode, OvershootResolution,
    PlaybackTiming,
};

pub use device::{
    resolve_collisions, HapticDevice, PatternDevice, PlaybackConfig, PulseDriver, PulseRecord,
    RecordingDriver,
};

pub use manager::{DeviceId, HapticManager};

#[cfg(feature = "assets")]
pub use assets::{AssetError, PatternLibrary};

// Re-export glam for convenience
pub use glam;
