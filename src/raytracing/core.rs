use super::math::{Ray, RsqrtStrategy, Vec3};
use super::solid::{Material, SceneObject, Solid};

/// Parameters shared by the camera and the tracer.
#[derive(Debug, Clone, Copy)]
pub struct RenderSettings {
    pub width: u32,
    pub height: u32,
    /// vertical field of view in degrees
    pub fov: f64,
    pub max_depth: u32,
    /// offset along the normal applied to secondary ray origins
    pub bias: f64,
    /// index of refraction of transparent objects, the outside medium is 1
    pub ior: f64,
    /// returned for rays that leave the scene, may be brighter than 1
    pub background: Vec3,
    pub rsqrt: RsqrtStrategy,
}

impl Default for RenderSettings {
    fn default() -> Self {
        RenderSettings {
            width: 500,
            height: 500,
            fov: 30.0,
            max_depth: 5,
            bias: 1e-4,
            ior: 1.1,
            background: Vec3::new(2.0, 2.0, 2.0),
            rsqrt: RsqrtStrategy::Exact,
        }
    }
}

/// Objects in the scene, built once and only read while rendering.
#[derive(Debug, Default)]
pub struct Scene {
    pub objects: Vec<SceneObject>,
}

pub struct RaycastResult<'a> {
    pub hitted_object: &'a SceneObject,
    pub t: f64,
}

impl Scene {
    pub fn new(objects: Vec<SceneObject>) -> Scene {
        Scene { objects }
    }

    /// Emissive objects together with their index in the scene.
    pub fn lights(&self) -> impl Iterator<Item = (usize, &SceneObject)> + '_ {
        self.objects
            .iter()
            .enumerate()
            .filter(|(_, object)| object.is_light())
    }

    /// Nearest object along the ray, brute force over every object.
    pub fn hit(&self, ray: &Ray) -> Option<RaycastResult<'_>> {
        let mut closest: Option<RaycastResult<'_>> = None;
        let mut closest_t = f64::INFINITY;
        for object in &self.objects {
            if let Some(intersection) = object.solid.intersect(ray) {
                let t = intersection.distance();
                if t < closest_t {
                    closest_t = t;
                    closest = Some(RaycastResult {
                        hitted_object: object,
                        t,
                    });
                }
            }
        }
        closest
    }

    /// True when any object other than the light blocks the ray. The first
    /// blocker found ends the search, there is no partial occlusion.
    pub fn occluded(&self, ray: &Ray, light_index: usize) -> bool {
        self.objects
            .iter()
            .enumerate()
            .filter(|(index, _)| *index != light_index)
            .any(|(_, object)| object.solid.intersect(ray).is_some())
    }
}

/// Built-in scene: a ground sphere, four colored mirrors (the central one
/// also transparent) and a light above them.
pub fn demo_scene() -> Scene {
    let sphere = |center: [f64; 3], radius: f64, color: [f64; 3], reflect: f64, transp: f64| {
        let material = Material::diffuse(color.into())
            .with_reflectivity(reflect)
            .with_transparency(transp);
        SceneObject::new(Solid::sphere(center.into(), radius), material)
    };
    let mut light = sphere([0.0, 20.0, -30.0], 3.0, [0.0, 0.0, 0.0], 0.0, 0.0);
    light.material = light.material.with_emission(Vec3::new(3.0, 3.0, 3.0));
    Scene::new(vec![
        sphere([0.0, -10004.0, -20.0], 10000.0, [0.20, 0.20, 0.20], 0.0, 0.0),
        sphere([0.0, 0.0, -20.0], 4.0, [1.00, 0.32, 0.36], 1.0, 0.5),
        sphere([5.0, -1.0, -15.0], 2.0, [0.90, 0.76, 0.46], 1.0, 0.0),
        sphere([5.0, 0.0, -25.0], 3.0, [0.65, 0.77, 0.97], 1.0, 0.0),
        sphere([-5.5, 0.0, -15.0], 3.0, [0.90, 0.90, 0.90], 1.0, 0.0),
        light,
    ])
}

#[inline(always)]
fn mix(a: f64, b: f64, t: f64) -> f64 {
    b * t + a * (1.0 - t)
}

/// Refracted direction for a unit direction crossing a surface with unit
/// normal facing the incoming ray. `None` on total internal reflection.
fn refract(direction: Vec3, normal: Vec3, eta: f64) -> Option<Vec3> {
    let cos_i = -normal.dot(direction);
    let k = 1.0 - eta * eta * (1.0 - cos_i * cos_i);
    if k < 0.0 {
        return None;
    }
    Some(direction * eta + normal * (eta * cos_i - k.sqrt()))
}

/// Whitted tracer over a read-only scene.
pub struct Tracer<'a> {
    pub scene: &'a Scene,
    pub settings: &'a RenderSettings,
}

impl<'a> Tracer<'a> {
    pub fn new(scene: &'a Scene, settings: &'a RenderSettings) -> Self {
        Tracer { scene, settings }
    }

    #[inline(always)]
    fn normalize(&self, v: Vec3) -> Vec3 {
        v.normalize_with(self.settings.rsqrt)
    }

    /// Color seen along the ray. Reflective and transparent surfaces spawn up
    /// to two rays per level, so the work grows exponentially with `max_depth`.
    pub fn trace(&self, ray: &Ray, depth: u32) -> Vec3 {
        let Some(hit) = self.scene.hit(ray) else {
            return self.settings.background;
        };
        let object = hit.hitted_object;
        let material = &object.material;
        let bias = self.settings.bias;

        let hit_point = ray.at(hit.t);
        let mut normal = self.normalize(hit_point - object.solid.center());
        let mut inside = false;
        if ray.direction.dot(normal) > 0.0 {
            // reverse the normal when we hit an internal surface
            normal = -normal;
            inside = true;
        }

        let mut color = Vec3::zero();
        if (material.reflectivity > 0.0 || material.transparency > 0.0)
            && depth < self.settings.max_depth
        {
            let facing_ratio = -ray.direction.dot(normal);
            let fresnel = mix((1.0 - facing_ratio).powi(3), 1.0, 0.1);

            let reflect_ray = Ray::new(
                hit_point + normal * bias,
                self.normalize(ray.direction.reflect(normal)),
            );
            let reflect_color = self.trace(&reflect_ray, depth + 1);

            let mut refract_color = Vec3::zero();
            let mut total_internal_reflection = false;
            if material.transparency > 0.0 {
                // entering goes from air into the object, leaving the opposite
                let eta = if inside {
                    self.settings.ior
                } else {
                    1.0 / self.settings.ior
                };
                match refract(ray.direction, normal, eta) {
                    Some(direction) => {
                        let refract_ray =
                            Ray::new(hit_point - normal * bias, self.normalize(direction));
                        refract_color = self.trace(&refract_ray, depth + 1);
                    }
                    None => total_internal_reflection = true,
                }
            }

            color = if total_internal_reflection {
                reflect_color
            } else {
                reflect_color * fresnel + refract_color * (1.0 - fresnel) * material.transparency
            };
            color = color * material.surface_color;
        } else {
            for (light_index, light) in self.scene.lights() {
                let light_direction = self.normalize(light.solid.center() - hit_point);
                let shadow_ray = Ray::new(hit_point + normal * bias, light_direction);
                if self.scene.occluded(&shadow_ray, light_index) {
                    continue;
                }
                let lambert = normal.dot(light_direction).max(0.0);
                color += material.surface_color * light.material.emission_color * lambert;
            }
        }

        color + material.emission_color
    }

    pub fn trace_primary(&self, ray: &Ray) -> Vec3 {
        self.trace(ray, 0)
    }
}
