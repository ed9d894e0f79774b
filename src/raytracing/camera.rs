use super::core::RenderSettings;
use super::math::{Ray, RsqrtStrategy, Vec3};

/// Pinhole camera looking toward -z.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    position: Vec3,
    width: f64,
    height: f64,
    scale: f64,
    aspect: f64,
    rsqrt: RsqrtStrategy,
}

impl Camera {
    pub fn new(position: Vec3, settings: &RenderSettings) -> Self {
        Self {
            position,
            width: settings.width as f64,
            height: settings.height as f64,
            scale: (settings.fov.to_radians() * 0.5).tan(),
            aspect: settings.width as f64 / settings.height as f64,
            rsqrt: settings.rsqrt,
        }
    }

    /// Primary ray through the center of pixel `(x, y)`, row 0 being the top one.
    pub fn shoot_to(&self, x: u32, y: u32) -> Ray {
        let xx = (2.0 * ((x as f64 + 0.5) / self.width) - 1.0) * self.scale * self.aspect;
        let yy = (1.0 - 2.0 * ((y as f64 + 0.5) / self.height)) * self.scale;
        Ray {
            origin: self.position,
            direction: Vec3::new(xx, yy, -1.0).normalize_with(self.rsqrt),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(width: u32, height: u32, fov: f64) -> RenderSettings {
        RenderSettings {
            width,
            height,
            fov,
            ..RenderSettings::default()
        }
    }

    #[test]
    fn test_single_pixel_looks_forward() {
        let camera = Camera::new(Vec3::zero(), &settings(1, 1, 30.0));
        let ray = camera.shoot_to(0, 0);
        assert_eq!(ray.origin, Vec3::zero());
        assert_eq!(ray.direction, Vec3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn test_corners_span_field_of_view() {
        // 90 degrees: scale = 1, the pixel centers of a 2x2 image sit at +-0.5
        let camera = Camera::new(Vec3::new(1.0, 2.0, 3.0), &settings(2, 2, 90.0));
        let top_left = camera.shoot_to(0, 0);
        let bottom_right = camera.shoot_to(1, 1);
        assert_eq!(top_left.origin, Vec3::new(1.0, 2.0, 3.0));
        let expected = Vec3::new(-0.5, 0.5, -1.0).normalize();
        assert!((top_left.direction - expected).len() < 1e-9);
        let expected = Vec3::new(0.5, -0.5, -1.0).normalize();
        assert!((bottom_right.direction - expected).len() < 1e-9);
    }

    #[test]
    fn test_aspect_ratio_widens_x() {
        let camera = Camera::new(Vec3::zero(), &settings(4, 2, 90.0));
        let ray = camera.shoot_to(3, 0);
        let unnormalized = ray.direction * (-1.0 / ray.direction.z);
        assert!((unnormalized.x - 1.5).abs() < 1e-9);
        assert!((unnormalized.y - 0.5).abs() < 1e-9);
    }
}
