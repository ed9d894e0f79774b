use super::math::{Box3, Ray, Vec3};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    pub surface_color: Vec3,
    /// in [0, 1]
    pub reflectivity: f64,
    /// in [0, 1]
    pub transparency: f64,
    pub emission_color: Vec3,
}

impl Material {
    /// Opaque, non reflective, non emissive material.
    pub fn diffuse(surface_color: Vec3) -> Material {
        Material {
            surface_color,
            reflectivity: 0.0,
            transparency: 0.0,
            emission_color: Vec3::zero(),
        }
    }

    pub fn with_reflectivity(mut self, reflectivity: f64) -> Material {
        self.reflectivity = reflectivity.clamp(0.0, 1.0);
        self
    }

    pub fn with_transparency(mut self, transparency: f64) -> Material {
        self.transparency = transparency.clamp(0.0, 1.0);
        self
    }

    pub fn with_emission(mut self, emission_color: Vec3) -> Material {
        self.emission_color = emission_color;
        self
    }

    /// Emissive objects double as point lights placed at their center.
    #[inline(always)]
    pub fn is_light(&self) -> bool {
        self.emission_color.x > 0.0
    }
}

impl Default for Material {
    fn default() -> Self {
        Material::diffuse(Vec3::one())
    }
}

/// Distances along a ray where it enters and leaves a solid.
/// `near` is negative when the origin lies inside the solid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Intersection {
    pub near: f64,
    pub far: f64,
}

impl Intersection {
    /// The distance of the visible surface: the exit point when the ray starts inside.
    #[inline(always)]
    pub fn distance(&self) -> f64 {
        if self.near < 0.0 {
            self.far
        } else {
            self.near
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Solid {
    Sphere { center: Vec3, radius_sq: f64 },
    Box(Box3),
}

impl Solid {
    pub fn sphere(center: Vec3, radius: f64) -> Solid {
        Solid::Sphere {
            center,
            radius_sq: radius * radius,
        }
    }

    pub fn cube(min: Vec3, max: Vec3) -> Solid {
        Solid::Box(Box3::from_min_max(min, max))
    }

    /// Used both to compute the surface normal and as the position of a light.
    pub fn center(&self) -> Vec3 {
        match self {
            Solid::Sphere { center, .. } => *center,
            Solid::Box(bbox) => bbox.center,
        }
    }

    pub fn intersect(&self, ray: &Ray) -> Option<Intersection> {
        match self {
            Solid::Sphere { center, radius_sq } => {
                let l = *center - ray.origin;
                let tca = l.dot(ray.direction);
                // the center is behind the origin. This also discards rays starting
                // inside the sphere and looking away from its center
                if tca < 0.0 {
                    return None;
                }
                let d2 = l.dot(l) - tca * tca;
                if d2 > *radius_sq {
                    return None;
                }
                let thc = (radius_sq - d2).sqrt();
                Some(Intersection {
                    near: tca - thc,
                    far: tca + thc,
                })
            }
            Solid::Box(bbox) => bbox
                .intersect_ray(ray)
                .map(|(near, far)| Intersection { near, far }),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SceneObject {
    pub solid: Solid,
    pub material: Material,
}

impl SceneObject {
    pub fn new(solid: Solid, material: Material) -> SceneObject {
        SceneObject { solid, material }
    }

    #[inline(always)]
    pub fn is_light(&self) -> bool {
        self.material.is_light()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere_through_center() {
        let sphere = Solid::sphere(Vec3::new(0.0, 0.0, -10.0), 2.0);
        let ray = Ray::new(Vec3::zero(), Vec3::new(0.0, 0.0, -1.0));
        let hit = sphere.intersect(&ray).unwrap();
        assert_eq!(hit.near, 8.0);
        assert_eq!(hit.far, 12.0);
        assert_eq!(hit.distance(), 8.0);
    }

    #[test]
    fn test_sphere_miss() {
        let sphere = Solid::sphere(Vec3::new(0.0, 3.0, -10.0), 2.0);
        let ray = Ray::new(Vec3::zero(), Vec3::new(0.0, 0.0, -1.0));
        assert!(sphere.intersect(&ray).is_none());
    }

    #[test]
    fn test_sphere_behind_origin() {
        let sphere = Solid::sphere(Vec3::new(0.0, 0.0, 10.0), 2.0);
        let ray = Ray::new(Vec3::zero(), Vec3::new(0.0, 0.0, -1.0));
        assert!(sphere.intersect(&ray).is_none());
    }

    #[test]
    fn test_sphere_from_inside_uses_far() {
        let sphere = Solid::sphere(Vec3::new(0.0, 0.0, -1.0), 2.0);
        let ray = Ray::new(Vec3::zero(), Vec3::new(0.0, 0.0, -1.0));
        let hit = sphere.intersect(&ray).unwrap();
        assert_eq!(hit.near, -1.0);
        assert_eq!(hit.distance(), 3.0);
    }

    #[test]
    fn test_box_intersection() {
        let cube = Solid::cube(Vec3::new(-1.0, -1.0, -6.0), Vec3::new(1.0, 1.0, -4.0));
        assert_eq!(cube.center(), Vec3::new(0.0, 0.0, -5.0));
        let ray = Ray::new(Vec3::zero(), Vec3::new(0.0, 0.0, -1.0));
        let hit = cube.intersect(&ray).unwrap();
        assert_eq!(hit.distance(), 4.0);
        let away = Ray::new(Vec3::zero(), Vec3::new(0.0, 0.0, 1.0));
        assert!(cube.intersect(&away).is_none());
    }

    #[test]
    fn test_light_detection() {
        let lamp = Material::diffuse(Vec3::zero()).with_emission(Vec3::new(3.0, 3.0, 3.0));
        assert!(lamp.is_light());
        // only the red channel counts
        let blue_glow = Material::diffuse(Vec3::zero()).with_emission(Vec3::new(0.0, 0.0, 1.0));
        assert!(!blue_glow.is_light());
        assert!(!Material::default().is_light());
    }

    #[test]
    fn test_material_builders_clamp() {
        let m = Material::diffuse(Vec3::one())
            .with_reflectivity(1.5)
            .with_transparency(-0.2);
        assert_eq!(m.reflectivity, 1.0);
        assert_eq!(m.transparency, 0.0);
    }
}
