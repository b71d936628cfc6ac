//! Rectangular surface regions tied to physical actuators.

use super::SurfaceHit;

/// A rectangular region of surface-coordinate space covered by one physical
/// actuator.
///
/// Bounds are kept ordered (`start <= end`) on every write; reversed values
/// are swapped rather than rejected. Membership is inclusive on all four
/// bounds. Angles do not wrap: an area spanning the 0/360 seam must be
/// authored as two areas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffectedArea {
    start_height: f32,
    end_height: f32,
    start_angle: f32,
    end_angle: f32,
}

impl AffectedArea {
    pub fn new(start_height: f32, end_height: f32, start_angle: f32, end_angle: f32) -> Self {
        let mut area = Self {
            start_height: 0.0,
            end_height: 0.0,
            start_angle: 0.0,
            end_angle: 0.0,
        };
        area.set_heights(start_height, end_height);
        area.set_angles(start_angle, end_angle);
        area
    }

    /// The full segment surface.
    pub fn full() -> Self {
        Self::new(0.0, 1.0, 0.0, 360.0)
    }

    pub fn start_height(&self) -> f32 {
        self.start_height
    }

    pub fn end_height(&self) -> f32 {
        self.end_height
    }

    pub fn start_angle(&self) -> f32 {
        self.start_angle
    }

    pub fn end_angle(&self) -> f32 {
        self.end_angle
    }

    /// Set the height bounds, clamped to `[0, 1]` and swapped if reversed.
    pub fn set_heights(&mut self, start: f32, end: f32) {
        let start = start.clamp(0.0, 1.0);
        let end = end.clamp(0.0, 1.0);
        if start <= end {
            self.start_height = start;
            self.end_height = end;
        } else {
            self.start_height = end;
            self.end_height = start;
        }
    }

    /// Set the angle bounds, clamped to `[0, 360]` and swapped if reversed.
    pub fn set_angles(&mut self, start: f32, end: f32) {
        let start = start.clamp(0.0, 360.0);
        let end = end.clamp(0.0, 360.0);
        if start <= end {
            self.start_angle = start;
            self.end_angle = end;
        } else {
            self.start_angle = end;
            self.end_angle = start;
        }
    }

    /// Inclusive point-in-rectangle test in (height, angle) space.
    pub fn contains(&self, hit: SurfaceHit) -> bool {
        hit.height >= self.start_height
            && hit.height <= self.end_height
            && hit.angle >= self.start_angle
            && hit.angle <= self.end_angle
    }

    /// Index of the first area in list order containing `hit`.
    ///
    /// The index identifies which physical actuator the hit belongs to.
    pub fn index_of(areas: &[AffectedArea], hit: SurfaceHit) -> Option<usize> {
        areas.iter().position(|area| area.contains(hit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reversed_bounds_swapped() {
        let area = AffectedArea::new(0.8, 0.2, 300.0, 60.0);
        assert_eq!(area.start_height(), 0.2);
        assert_eq!(area.end_height(), 0.8);
        assert_eq!(area.start_angle(), 60.0);
        assert_eq!(area.end_angle(), 300.0);
    }

    #[test]
    fn test_bounds_clamped_to_ranges() {
        let area = AffectedArea::new(-0.5, 1.5, -20.0, 400.0);
        assert_eq!(area.start_height(), 0.0);
        assert_eq!(area.end_height(), 1.0);
        assert_eq!(area.start_angle(), 0.0);
        assert_eq!(area.end_angle(), 360.0);
    }

    #[test]
    fn test_contains_inclusive() {
        let area = AffectedArea::new(0.2, 0.8, 90.0, 180.0);
        assert!(area.contains(SurfaceHit::new(0.2, 90.0)));
        assert!(area.contains(SurfaceHit::new(0.8, 180.0)));
        assert!(area.contains(SurfaceHit::new(0.5, 135.0)));
        assert!(!area.contains(SurfaceHit::new(0.19, 135.0)));
        assert!(!area.contains(SurfaceHit::new(0.5, 180.1)));
    }

    #[test]
    fn test_no_wraparound() {
        // An area "from 350 to 10 degrees" ends up as [10, 350]; the seam
        // itself is not covered.
        let area = AffectedArea::new(0.0, 1.0, 350.0, 10.0);
        assert!(!area.contains(SurfaceHit::new(0.5, 355.0)));
        assert!(area.contains(SurfaceHit::new(0.5, 180.0)));
    }

    #[test]
    fn test_index_of_first_match() {
        let areas = [
            AffectedArea::new(0.0, 0.5, 0.0, 360.0),
            AffectedArea::new(0.4, 1.0, 0.0, 360.0),
        ];
        assert_eq!(AffectedArea::index_of(&areas, SurfaceHit::new(0.45, 10.0)), Some(0));
        assert_eq!(AffectedArea::index_of(&areas, SurfaceHit::new(0.7, 10.0)), Some(1));
        assert_eq!(AffectedArea::index_of(&areas, SurfaceHit::new(0.7, 365.0)), None);
        assert_eq!(AffectedArea::index_of(&[], SurfaceHit::new(0.5, 0.0)), None);
    }
}
