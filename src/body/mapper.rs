//! Bidirectional mapping between world points and surface coordinates.
//!
//! `to_surface_hit` projects an arbitrary world-space point onto a capsule
//! segment's surface-coordinate system; `to_world_point` inverts the mapping
//! for visualization and authoring overlays. The two are exact inverses for
//! hits strictly between the end caps.

use glam::{Quat, Vec3};

use super::{BodySegment, SurfaceHit};

/// Below this axis length a segment's caps are treated as coincident.
const AXIS_EPS: f32 = 1e-6;

impl BodySegment {
    /// Convert a world-space point into surface coordinates.
    ///
    /// The point is transformed into segment-local space. Height is the
    /// clamped inverse-lerp of its projection between the (possibly
    /// inverted) proximal and distal cap positions along the segment axis.
    /// Angle is the signed angle between the polar axis and the projected
    /// radial direction, sign-adjusted per the segment's
    /// [`AngleDirection`](super::AngleDirection) and normalized into
    /// `[0, 360)`.
    pub fn to_surface_hit(&self, world_point: Vec3) -> SurfaceHit {
        let local = self.transform().inverse().transform_point3(world_point);
        let (p0, _p1, axis, length, polar) = self.axis_frame();

        let rel = local - p0;
        let along = rel.dot(axis);
        let height = if length > AXIS_EPS {
            (along / length).clamp(0.0, 1.0)
        } else {
            0.0
        };

        let radial = rel - along * axis;
        let angle = if radial.length_squared() > AXIS_EPS * AXIS_EPS {
            let signed = signed_angle_deg(polar, radial.normalize(), axis);
            (signed * self.angle_direction().sign()).rem_euclid(360.0)
        } else {
            // On the axis the angle is undefined; report the polar reference.
            0.0
        };

        SurfaceHit::new(height, angle)
    }

    /// Convert a surface coordinate back into a world-space point.
    ///
    /// Without `on_surface` the result lies at cylinder radius, which is the
    /// exact inverse of [`to_surface_hit`](Self::to_surface_hit) between the
    /// caps. With `on_surface` (used for visualization) heights 0 and 1 map
    /// exactly to the cap end positions, and heights within one cap-radius
    /// of either end are corrected onto the rounded cap: a ray cast from the
    /// in-plane cylinder point toward the segment axis is intersected with
    /// the cap sphere.
    pub fn to_world_point(&self, hit: SurfaceHit, on_surface: bool) -> Vec3 {
        let (p0, p1, axis, length, polar) = self.axis_frame();
        let height = hit.height.clamp(0.0, 1.0);
        let radius = self.radius();

        if on_surface {
            if height <= 0.0 {
                return self.transform().transform_point3(p0);
            }
            if height >= 1.0 {
                return self.transform().transform_point3(p1);
            }
        }

        let rotation = Quat::from_axis_angle(
            axis,
            (hit.angle * self.angle_direction().sign()).to_radians(),
        );
        let radial = rotation * polar;
        let axis_point = p0 + axis * (height * length);
        let mut local = axis_point + radial * radius;

        if on_surface {
            let proximal_depth = height * length;
            let distal_depth = (1.0 - height) * length;
            if proximal_depth < radius && proximal_depth <= distal_depth {
                let cap_center = p0 + axis * radius;
                local = cap_surface_point(local, radial, cap_center, radius);
            } else if distal_depth < radius {
                let cap_center = p1 - axis * radius;
                local = cap_surface_point(local, radial, cap_center, radius);
            }
        }

        self.transform().transform_point3(local)
    }

    /// Local-space mapping frame: effective cap positions, unit long axis,
    /// cap separation, and the polar axis orthonormalized against the long
    /// axis.
    fn axis_frame(&self) -> (Vec3, Vec3, Vec3, f32, Vec3) {
        let (p0, p1) = self.endpoints();
        let span = p1 - p0;
        let length = span.length();
        let axis = if length > AXIS_EPS {
            span / length
        } else {
            // Degenerate sphere segment: fall back to the local Y convention.
            Vec3::Y
        };

        let projected = self.polar_axis - self.polar_axis.dot(axis) * axis;
        let polar = if projected.length_squared() > AXIS_EPS * AXIS_EPS {
            projected.normalize()
        } else {
            axis.any_orthonormal_vector()
        };

        (p0, p1, axis, length, polar)
    }
}

/// Signed angle in degrees from `from` to `to` about `axis`, in `(-180, 180]`.
fn signed_angle_deg(from: Vec3, to: Vec3, axis: Vec3) -> f32 {
    axis.dot(from.cross(to)).atan2(from.dot(to)).to_degrees()
}

/// Project a cylinder-radius point onto the hemispherical cap sphere by
/// casting a ray toward the segment axis.
fn cap_surface_point(surface: Vec3, radial: Vec3, cap_center: Vec3, radius: f32) -> Vec3 {
    match ray_sphere_intersection(surface, -radial, cap_center, radius) {
        Some(t) => surface - radial * t,
        // The ray misses only for degenerate geometry; keep the cylinder point.
        None => surface,
    }
}

/// First intersection of a ray with a sphere, as a distance along the ray.
/// `direction` must be unit length. Returns `None` when the ray misses.
fn ray_sphere_intersection(origin: Vec3, direction: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let oc = origin - center;
    let b = oc.dot(direction);
    let c = oc.length_squared() - radius * radius;
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    let sqrt_d = discriminant.sqrt();
    let near = -b - sqrt_d;
    if near >= 0.0 {
        return Some(near);
    }
    let far = -b + sqrt_d;
    (far >= 0.0).then_some(far)
}
