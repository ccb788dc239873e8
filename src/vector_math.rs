//! Geometry helpers for sight lines and query volumes.
//! Axis-aligned boxes, slab ray intersection and vision-cone angles.
use glam::Vec3;

/// Axis-aligned bounding box in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Cube centred on `center` with the given side length.
    ///
    /// # Examples
    /// ```
    /// use glam::Vec3;
    /// use lurk::vector_math::Aabb;
    /// let bounds = Aabb::cube(Vec3::ZERO, 60.0);
    /// assert_eq!(bounds.max, Vec3::splat(30.0));
    /// ```
    #[must_use]
    pub fn cube(center: Vec3, side: f32) -> Self {
        Self::from_half_extents(center, Vec3::splat(side * 0.5))
    }

    #[must_use]
    pub fn from_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        let half = half_extents.abs();
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Inclusive containment test.
    #[must_use]
    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }
}

/// Distance along the segment `from → to` at which it enters `aabb`.
///
/// Uses the slab method. Returns `None` when the segment misses the box or
/// either endpoint is not finite. A segment starting inside the box hits at
/// distance zero.
///
/// # Examples
/// ```
/// use glam::Vec3;
/// use lurk::vector_math::{segment_entry, Aabb};
/// let wall = Aabb::from_half_extents(Vec3::new(5.0, 0.0, 0.0), Vec3::splat(1.0));
/// let hit = segment_entry(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), &wall);
/// assert!((hit.unwrap() - 4.0).abs() < 1e-5);
/// ```
#[must_use]
pub fn segment_entry(from: Vec3, to: Vec3, aabb: &Aabb) -> Option<f32> {
    let delta = to - from;
    let length = delta.length();
    if !length.is_finite() || !from.is_finite() {
        return None;
    }
    if length <= f32::EPSILON {
        return aabb.contains(from).then_some(0.0);
    }
    let direction = delta / length;

    let mut t_min = 0.0_f32;
    let mut t_max = length;
    for axis in 0..3 {
        let origin = from[axis];
        let dir = direction[axis];
        let (lo, hi) = (aabb.min[axis], aabb.max[axis]);
        if dir.abs() <= f32::EPSILON {
            if origin < lo || origin > hi {
                return None;
            }
            continue;
        }
        let inv = dir.recip();
        let (near, far) = {
            let a = (lo - origin) * inv;
            let b = (hi - origin) * inv;
            if a <= b {
                (a, b)
            } else {
                (b, a)
            }
        };
        t_min = t_min.max(near);
        t_max = t_max.min(far);
        if t_min > t_max {
            return None;
        }
    }
    Some(t_min)
}

/// Angle in degrees between two directions, or `None` if either is zero.
#[must_use]
pub fn angle_between_degrees(a: Vec3, b: Vec3) -> Option<f32> {
    let a = a.try_normalize()?;
    let b = b.try_normalize()?;
    Some(a.dot(b).clamp(-1.0, 1.0).acos().to_degrees())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn unit_box_at(x: f32) -> Aabb {
        Aabb::from_half_extents(Vec3::new(x, 0.0, 0.0), Vec3::splat(0.5))
    }

    #[rstest]
    fn cube_contains_its_corners() {
        let bounds = Aabb::cube(Vec3::new(1.0, 2.0, 3.0), 4.0);
        assert!(bounds.contains(Vec3::new(3.0, 4.0, 5.0)));
        assert!(bounds.contains(Vec3::new(-1.0, 0.0, 1.0)));
        assert!(!bounds.contains(Vec3::new(3.1, 2.0, 3.0)));
    }

    #[rstest]
    fn segment_stops_short_of_box() {
        assert!(segment_entry(Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0), &unit_box_at(5.0)).is_none());
    }

    #[rstest]
    fn segment_parallel_outside_slab_misses() {
        let from = Vec3::new(0.0, 3.0, 0.0);
        let to = Vec3::new(10.0, 3.0, 0.0);
        assert!(segment_entry(from, to, &unit_box_at(5.0)).is_none());
    }

    #[rstest]
    fn diagonal_segment_reports_entry_distance() {
        let wall = Aabb::from_half_extents(Vec3::new(5.0, 5.0, 0.0), Vec3::splat(1.0));
        let hit = segment_entry(Vec3::ZERO, Vec3::new(10.0, 10.0, 0.0), &wall)
            .expect("diagonal should cross the box");
        assert_relative_eq!(hit, 4.0 * 2.0_f32.sqrt(), epsilon = 1e-4);
    }

    #[rstest]
    fn segment_starting_inside_hits_immediately() {
        let hit = segment_entry(Vec3::new(5.0, 0.0, 0.0), Vec3::new(9.0, 0.0, 0.0), &unit_box_at(5.0));
        assert_eq!(hit, Some(0.0));
    }

    #[rstest]
    #[case::same(Vec3::X, Vec3::X, 0.0)]
    #[case::perpendicular(Vec3::X, Vec3::Z, 90.0)]
    #[case::opposite(Vec3::X, Vec3::NEG_X, 180.0)]
    fn angles_in_degrees(#[case] a: Vec3, #[case] b: Vec3, #[case] expected: f32) {
        let angle = angle_between_degrees(a, b).expect("non-zero inputs");
        assert_relative_eq!(angle, expected, epsilon = 1e-3);
    }

    #[rstest]
    fn zero_vector_has_no_angle() {
        assert!(angle_between_degrees(Vec3::ZERO, Vec3::X).is_none());
    }
}
