use super::{Ray, Vec3};

/// Axis aligned box stored by its corners.
#[derive(Debug, Clone, Copy)]
pub struct Box3 {
    pub min: Vec3,
    pub max: Vec3,
    pub center: Vec3,
}

impl Box3 {
    pub fn from_min_max(min: Vec3, max: Vec3) -> Box3 {
        Box3 {
            min,
            max,
            center: min.midpoint(max),
        }
    }

    /// Slab test. Returns the entry and exit distances along the ray, the entry
    /// is negative when the ray starts inside the box.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<(f64, f64)> {
        let inv_dir = ray.direction.recip();
        let (t_min, t_max) = slab(self.min.x, self.max.x, ray.origin.x, inv_dir.x)?;
        let (ty_min, ty_max) = slab(self.min.y, self.max.y, ray.origin.y, inv_dir.y)?;
        if t_min > ty_max || ty_min > t_max {
            return None;
        }
        let t_min = t_min.max(ty_min);
        let t_max = t_max.min(ty_max);

        let (tz_min, tz_max) = slab(self.min.z, self.max.z, ray.origin.z, inv_dir.z)?;
        if t_min > tz_max || tz_min > t_max {
            return None;
        }
        let t_min = t_min.max(tz_min);
        let t_max = t_max.min(tz_max);

        // the whole box is behind the origin
        if t_max < 0.0 {
            return None;
        }
        Some((t_min, t_max))
    }
}

/// Entry and exit distance for a single axis, swapping the corners when the
/// direction is negative along it.
/// A ray parallel to the axis (infinite reciprocal) spans the whole line when
/// its origin lies within the slab, faces included, and misses otherwise.
#[inline(always)]
fn slab(min: f64, max: f64, origin: f64, inv_dir: f64) -> Option<(f64, f64)> {
    if inv_dir.is_infinite() {
        if origin < min || origin > max {
            return None;
        }
        return Some((f64::NEG_INFINITY, f64::INFINITY));
    }
    let (near, far) = if inv_dir < 0.0 { (max, min) } else { (min, max) };
    Some(((near - origin) * inv_dir, (far - origin) * inv_dir))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> Box3 {
        Box3::from_min_max(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn test_center_is_midpoint() {
        let b = Box3::from_min_max(Vec3::new(0.0, 2.0, -4.0), Vec3::new(2.0, 4.0, -2.0));
        assert_eq!(b.center, Vec3::new(1.0, 3.0, -3.0));
    }

    #[test]
    fn test_axis_aligned_hit() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        let (t_min, t_max) = unit_box().intersect_ray(&ray).unwrap();
        assert_eq!(t_min, 4.0);
        assert_eq!(t_max, 6.0);
    }

    #[test]
    fn test_axis_aligned_hit_positive_direction() {
        let ray = Ray::new(Vec3::new(-3.0, 0.5, 0.0), Vec3::new(1.0, 0.0, 0.0));
        let (t_min, t_max) = unit_box().intersect_ray(&ray).unwrap();
        assert_eq!(t_min, 2.0);
        assert_eq!(t_max, 4.0);
    }

    #[test]
    fn test_pointing_away_misses() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(unit_box().intersect_ray(&ray).is_none());
    }

    #[test]
    fn test_parallel_offset_misses() {
        let ray = Ray::new(Vec3::new(0.0, 2.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(unit_box().intersect_ray(&ray).is_none());
    }

    #[test]
    fn test_parallel_ray_on_face_plane_grazes() {
        // origin exactly on the x = 1 and y = -1 planes, travelling along z
        let ray = Ray::new(Vec3::new(1.0, -1.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        let (t_min, t_max) = unit_box().intersect_ray(&ray).unwrap();
        assert_eq!(t_min, 4.0);
        assert_eq!(t_max, 6.0);
        let whole_line = Some((f64::NEG_INFINITY, f64::INFINITY));
        assert_eq!(slab(-1.0, 1.0, 1.0, f64::INFINITY), whole_line);
        assert_eq!(slab(-1.0, 1.0, -1.0, f64::NEG_INFINITY), whole_line);
        assert_eq!(slab(-1.0, 1.0, 1.5, f64::INFINITY), None);
    }

    #[test]
    fn test_parallel_ray_just_outside_misses() {
        let ray = Ray::new(Vec3::new(1.0 + 1e-12, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(unit_box().intersect_ray(&ray).is_none());
        let ray = Ray::new(Vec3::new(0.0, -1.0 - 1e-12, 5.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(unit_box().intersect_ray(&ray).is_none());
    }

    #[test]
    fn test_origin_inside() {
        let ray = Ray::new(Vec3::zero(), Vec3::new(0.0, 1.0, 0.0));
        let (t_min, t_max) = unit_box().intersect_ray(&ray).unwrap();
        assert_eq!(t_min, -1.0);
        assert_eq!(t_max, 1.0);
    }

    #[test]
    fn test_exit_uses_nearest_far_plane() {
        // diagonal ray leaving through the y face before reaching the far x face
        let b = Box3::from_min_max(Vec3::new(0.0, 0.0, -1.0), Vec3::new(4.0, 1.0, 1.0));
        let ray = Ray::new(Vec3::new(-0.5, 0.0, 0.0), Vec3::new(1.0, 1.0, 0.0).normalize());
        let (t_min, t_max) = b.intersect_ray(&ray).unwrap();
        let s = 2f64.sqrt();
        assert!((t_min - s * 0.5).abs() < 1e-9);
        assert!((t_max - s).abs() < 1e-9);
    }
}
