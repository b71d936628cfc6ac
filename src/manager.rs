//! Body-part → device registry and dispatch.
//!
//! The [`HapticManager`] is the single entry point for "something hit body
//! part X at coordinate Y". It owns every registered device, maps each
//! [`SegmentId`] to the devices covering it, and fans dispatches out in
//! registration order. It is an explicit, host-owned instance: constructed at
//! startup, torn down on drop, no hidden statics.
//!
//! The engine is single-threaded; the registration map and ignore sets are
//! written only during initialization and ignore/reconsider calls and read
//! during dispatch. An embedding that introduces scheduler threads must
//! serialize access to both, and to each device's playback state.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info};

use crate::body::{SegmentId, SurfaceHit};
use crate::device::HapticDevice;
use crate::pattern::{HapticPattern, HitOffsetMode};

/// Stable handle to a device owned by the manager.
///
/// Handles stay valid for the manager's lifetime; devices are never removed,
/// only suppressed via [`HapticManager::ignore_device`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceId(usize);

/// Process-wide registry mapping body segments to the devices that cover
/// them.
#[derive(Default)]
pub struct HapticManager {
    devices: Vec<Box<dyn HapticDevice>>,
    registry: HashMap<SegmentId, Vec<DeviceId>>,
    ignored_segments: HashSet<SegmentId>,
    ignored_devices: HashSet<DeviceId>,
}

impl HapticManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a device and return its handle.
    pub fn add_device(&mut self, device: Box<dyn HapticDevice>) -> DeviceId {
        let id = DeviceId(self.devices.len());
        self.devices.push(device);
        id
    }

    /// Append `device` to the dispatch list for `segment`.
    ///
    /// A device may be registered for several segments; dispatch order
    /// follows registration order.
    pub fn register(&mut self, device: DeviceId, segment: SegmentId) {
        assert!(
            device.0 < self.devices.len(),
            "device handle {:?} does not belong to this manager",
            device
        );
        info!(segment = %segment, device = device.0, "haptic device registered");
        self.registry.entry(segment).or_default().push(device);
    }

    pub fn device(&self, id: DeviceId) -> Option<&dyn HapticDevice> {
        self.devices.get(id.0).map(|d| &**d)
    }

    pub fn device_mut(&mut self, id: DeviceId) -> Option<&mut (dyn HapticDevice + 'static)> {
        self.devices.get_mut(id.0).map(|d| &mut **d)
    }

    /// Number of distinct devices known to the manager.
    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    /// Every known device, de-duplicated, for visualization collaborators.
    pub fn devices(&self) -> impl Iterator<Item = &dyn HapticDevice> {
        self.devices.iter().map(|d| &**d)
    }

    /// Segments with at least one registered device.
    pub fn covered_segments(&self) -> impl Iterator<Item = &SegmentId> {
        self.registry.keys()
    }

    /// Fire one instantaneous pulse on every device registered for
    /// `segment`.
    ///
    /// A segment with no registered devices is a silent no-op; partial
    /// hardware coverage is expected.
    pub fn dispatch_pulse(&mut self, segment: &SegmentId, hit: SurfaceHit, intensity: f32) {
        if self.ignored_segments.contains(segment) {
            debug!(segment = %segment, "pulse dispatch suppressed: segment ignored");
            return;
        }
        let Some(ids) = self.registry.get(segment) else {
            debug!(segment = %segment, "pulse dispatch: no devices registered");
            return;
        };
        for id in ids {
            if self.ignored_devices.contains(id) {
                continue;
            }
            self.devices[id.0].trigger_pulse(segment, hit, intensity);
        }
    }

    /// Begin pattern playback on every device registered for `segment`.
    ///
    /// The triggering hit is stamped into each device's copy of the pattern
    /// when its offset mode is enabled.
    pub fn dispatch_pattern(&mut self, segment: &SegmentId, hit: SurfaceHit, pattern: &HapticPattern) {
        if self.ignored_segments.contains(segment) {
            debug!(segment = %segment, "pattern dispatch suppressed: segment ignored");
            return;
        }
        let Some(ids) = self.registry.get(segment) else {
            debug!(segment = %segment, "pattern dispatch: no devices registered");
            return;
        };

        let mut pattern = pattern.clone();
        match pattern.offset_mode {
            HitOffsetMode::Disabled => pattern.clear_hit_offset(),
            _ => pattern.set_hit_offset(hit),
        }

        for id in ids {
            if self.ignored_devices.contains(id) {
                continue;
            }
            self.devices[id.0].start_pattern(segment, pattern.clone());
        }
    }

    /// Stop pattern playback on every device registered for `segment`.
    ///
    /// Reaches every registered device regardless of ignore state, so a
    /// cancel can never be suppressed.
    pub fn cancel_on(&mut self, segment: &SegmentId) {
        let Some(ids) = self.registry.get(segment) else {
            return;
        };
        for id in ids {
            self.devices[id.0].stop_pattern(segment);
        }
    }

    /// Suppress dispatch to `segment` and immediately cancel any pattern
    /// playing on it.
    pub fn ignore_segment(&mut self, segment: SegmentId) {
        self.cancel_on(&segment);
        self.ignored_segments.insert(segment);
    }

    pub fn reconsider_segment(&mut self, segment: &SegmentId) {
        self.ignored_segments.remove(segment);
    }

    pub fn is_segment_ignored(&self, segment: &SegmentId) -> bool {
        self.ignored_segments.contains(segment)
    }

    /// Suppress dispatch to one device without unregistering it.
    pub fn ignore_device(&mut self, device: DeviceId) {
        self.ignored_devices.insert(device);
    }

    pub fn reconsider_device(&mut self, device: DeviceId) {
        self.ignored_devices.remove(&device);
    }

    pub fn is_device_ignored(&self, device: DeviceId) -> bool {
        self.ignored_devices.contains(&device)
    }

    /// Advance pattern playback on every device by the host's frame delta.
    /// Call once per simulation tick.
    pub fn update(&mut self, dt: f32) {
        for device in &mut self.devices {
            device.step(dt);
        }
    }
}

impl std::fmt::Debug for HapticManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HapticManager")
            .field("devices", &self.devices.len())
            .field("segments", &self.registry.len())
            .field("ignored_segments", &self.ignored_segments)
            .field("ignored_devices", &self.ignored_devices)
            .finish()
    }
}
