//! Body model: capsule segments, surface coordinates, and actuator areas.
//!
//! A tracked body is approximated as a set of capsule-shaped [`BodySegment`]s.
//! Every point on a segment's surface is addressed by a device-independent
//! [`SurfaceHit`] coordinate: normalized height along the segment's long axis
//! and an angle about that axis. Haptic hardware describes its coverage as
//! rectangular [`AffectedArea`]s in the same coordinate space.

pub mod area;
pub mod mapper;

pub use area::AffectedArea;

use std::fmt;

use glam::{Mat4, Vec3};

/// Identifies a named body part (e.g. `"left_forearm"`).
///
/// Segment names follow the same conventions as skeleton/link names in the
/// host's body-tracking rig.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SegmentId(String);

impl SegmentId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SegmentId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for SegmentId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// A point on a body segment's surface in normalized coordinates.
///
/// `height` is the normalized distance from the segment's proximal end cap to
/// its distal end cap. `angle` is measured about the segment's long axis from
/// the segment's polar axis, in degrees, with the direction configured per
/// segment via [`AngleDirection`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    /// Normalized position along the segment axis (0 = proximal, 1 = distal).
    pub height: f32,
    /// Angle about the segment axis in degrees, `[0, 360)`.
    pub angle: f32,
}

impl SurfaceHit {
    pub fn new(height: f32, angle: f32) -> Self {
        Self { height, angle }
    }
}

/// Direction of increasing angle, looking down the segment's long axis from
/// the distal end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AngleDirection {
    #[default]
    CounterClockwise,
    Clockwise,
}

impl AngleDirection {
    /// Sign applied to signed angles measured counter-clockwise about the axis.
    pub fn sign(self) -> f32 {
        match self {
            AngleDirection::CounterClockwise => 1.0,
            AngleDirection::Clockwise => -1.0,
        }
    }
}

/// A capsule-approximated rigid body part carrying a local coordinate frame.
///
/// `proximal` and `distal` are the capsule's extremal end-cap positions in
/// segment-local space; `radius` is the capsule radius. `polar_axis` defines
/// where angle zero lies on the circumference. The local→world transform is
/// updated by the host as the tracked body moves.
///
/// Whether the authored proximal/distal order matches the segment's local
/// origin is derived once at construction: the cap nearer the local origin is
/// treated as the proximal (height 0) end. This also covers segments whose
/// cap separation is smaller than twice their radius, which degenerate to a
/// sphere with coincident hemisphere centers.
#[derive(Debug, Clone)]
pub struct BodySegment {
    id: SegmentId,
    proximal: Vec3,
    distal: Vec3,
    radius: f32,
    polar_axis: Vec3,
    angle_direction: AngleDirection,
    transform: Mat4,
    /// Set when the authored proximal cap is farther from the segment's local
    /// origin than the distal cap.
    inverted: bool,
}

impl BodySegment {
    /// Create a segment from its local-space capsule description.
    pub fn new(
        id: impl Into<SegmentId>,
        proximal: Vec3,
        distal: Vec3,
        radius: f32,
        polar_axis: Vec3,
    ) -> Self {
        let inverted = proximal.length_squared() > distal.length_squared();
        Self {
            id: id.into(),
            proximal,
            distal,
            radius: radius.max(0.0),
            polar_axis,
            angle_direction: AngleDirection::default(),
            transform: Mat4::IDENTITY,
            inverted,
        }
    }

    pub fn with_angle_direction(mut self, direction: AngleDirection) -> Self {
        self.angle_direction = direction;
        self
    }

    pub fn with_transform(mut self, transform: Mat4) -> Self {
        self.transform = transform;
        self
    }

    pub fn id(&self) -> &SegmentId {
        &self.id
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn angle_direction(&self) -> AngleDirection {
        self.angle_direction
    }

    /// True when the authored cap order was flipped to keep height 0 at the
    /// cap nearer the segment's local origin.
    pub fn inverted(&self) -> bool {
        self.inverted
    }

    pub fn transform(&self) -> Mat4 {
        self.transform
    }

    /// Update the local→world transform for the current body pose.
    pub fn set_transform(&mut self, transform: Mat4) {
        self.transform = transform;
    }

    /// End-cap positions in local space, in effective (proximal, distal)
    /// order after inversion.
    pub(crate) fn endpoints(&self) -> (Vec3, Vec3) {
        if self.inverted {
            (self.distal, self.proximal)
        } else {
            (self.proximal, self.distal)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_id_display() {
        let id = SegmentId::new("right_hand");
        assert_eq!(id.as_str(), "right_hand");
        assert_eq!(format!("{}", id), "right_hand");
    }

    #[test]
    fn test_inversion_flag() {
        // Proximal nearer the local origin: not inverted.
        let seg = BodySegment::new(
            "a",
            Vec3::new(0.0, 0.1, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            0.05,
            Vec3::X,
        );
        assert!(!seg.inverted());

        // Authored backwards: flag set, endpoints swapped.
        let seg = BodySegment::new(
            "b",
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, 0.1, 0.0),
            0.05,
            Vec3::X,
        );
        assert!(seg.inverted());
        let (p0, p1) = seg.endpoints();
        assert_eq!(p0, Vec3::new(0.0, 0.1, 0.0));
        assert_eq!(p1, Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_inversion_flag_degenerate_sphere() {
        // Cap separation below twice the radius: the distance comparison
        // still decides the flag.
        let seg = BodySegment::new(
            "sphere",
            Vec3::new(0.0, 0.3, 0.0),
            Vec3::new(0.0, 0.2, 0.0),
            0.2,
            Vec3::X,
        );
        assert!(seg.inverted());
    }
}
