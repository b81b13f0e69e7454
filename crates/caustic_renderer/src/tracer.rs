//! Monte Carlo ray tracer.
//!
//! Each hit is shaded locally from every light with shadow rays, then the
//! material decides which secondary rays to follow:
//!
//! - **Mirror**: the reflected ray only
//! - **Glass**: reflected and refracted rays blended by Schlick's Fresnel term
//! - **Phong**: local shading plus the glass blend weighted by the specular colour
//! - **Ambient**: local shading plus one random outward bounce
//! - **Glossy**: local shading plus one random bounce weighted by Cook-Torrance
//!
//! Recursion ends at emissive primitives, on misses, by Russian roulette past
//! a configurable depth, or at the depth limit.

use std::sync::atomic::{AtomicUsize, Ordering};

use caustic_math::{Ray, Vec3};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::light::Illumination;
use crate::medium::MediumStack;
use crate::optics::{cook_torrance, reflect, refract, schlick};
use crate::sampling::{gen_f32, random_outward_direction};
use crate::{Color, Hit, LightObject, Material, MaterialKind, Scene, TracerConfig};

/// Per-thread state of a trace: the random source and the medium stack.
///
/// Contexts are never shared; each render worker owns one.
#[derive(Debug, Clone)]
pub struct TraceContext {
    rng: StdRng,
    media: MediumStack,
}

impl TraceContext {
    pub fn new(rng: StdRng, camera_refraction_index: f32) -> Self {
        Self {
            rng,
            media: MediumStack::new(camera_refraction_index),
        }
    }

    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    pub fn media(&self) -> &MediumStack {
        &self.media
    }
}

/// Recursive tracer over one scene.
///
/// The tracer itself is shared between threads; the only mutable state is
/// the deepest recursion level seen so far.
#[derive(Debug)]
pub struct Tracer<'s> {
    scene: &'s Scene,
    config: TracerConfig,
    max_depth_seen: AtomicUsize,
}

impl<'s> Tracer<'s> {
    pub fn new(scene: &'s Scene, config: TracerConfig) -> Self {
        Self {
            scene,
            config,
            max_depth_seen: AtomicUsize::new(0),
        }
    }

    pub fn scene(&self) -> &'s Scene {
        self.scene
    }

    pub fn config(&self) -> &TracerConfig {
        &self.config
    }

    /// A fresh trace context rooted in the camera medium.
    pub fn context(&self, rng: StdRng) -> TraceContext {
        TraceContext::new(rng, self.config.camera_refraction_index)
    }

    /// A fresh trace context with a generator seeded from `seed`.
    pub fn context_from_seed(&self, seed: u64) -> TraceContext {
        self.context(StdRng::seed_from_u64(seed))
    }

    /// Deepest recursion level reached by any trace so far.
    pub fn maximum_observed_depth(&self) -> usize {
        self.max_depth_seen.load(Ordering::Relaxed)
    }

    /// Trace a primary ray from the camera.
    pub fn trace_ray(&self, ray: &Ray, hit: &mut Hit<'s>, ctx: &mut TraceContext) -> Color {
        ctx.media.reset();
        self.trace_ray_at(ray, hit, ctx, 0, self.config.epsilon)
    }

    /// Trace a ray at a given recursion depth, ignoring hits closer than
    /// `bias`.
    ///
    /// The medium stack must already hold an entry for `depth`. On return
    /// `hit` holds the nearest intersection, emissive or not.
    pub fn trace_ray_at(
        &self,
        ray: &Ray,
        hit: &mut Hit<'s>,
        ctx: &mut TraceContext,
        depth: usize,
        bias: f32,
    ) -> Color {
        self.max_depth_seen.fetch_max(depth, Ordering::Relaxed);
        let scene = self.scene;

        let mut light_hit = *hit;
        let hit_object = scene.group().intersect(ray, hit, bias);
        let hit_light = scene.light_group().intersect(ray, &mut light_hit, bias);

        if !hit_object && !hit_light {
            return scene.background();
        }

        if light_hit.t <= hit.t {
            *hit = light_hit;
            return light_hit
                .light_object()
                .map_or(scene.background(), LightObject::color);
        }

        let Some(material) = hit.material() else {
            return scene.background();
        };

        let local = self.local_color(ray, hit, material, ctx);

        if self.should_terminate(depth, &mut ctx.rng) || depth > self.config.max_depth {
            return clamp_color(local);
        }

        let color = match material.kind() {
            MaterialKind::Mirror => self.trace_mirror(ray, hit, ctx, depth),
            MaterialKind::Glass => self.trace_reflect_refract(ray, hit, material, ctx, depth),
            MaterialKind::Ambient => local + self.trace_ambient(ray, hit, ctx, depth),
            MaterialKind::Phong => {
                local + self.trace_reflect_refract(ray, hit, material, ctx, depth) * material.specular_color()
            }
            MaterialKind::Glossy => local + self.trace_glossy(ray, hit, material, ctx, depth),
        };
        clamp_color(color)
    }

    /// Russian roulette: past `roulette_depth`, stop with
    /// `stop_probability`. No random number is drawn at shallower depths.
    pub fn should_terminate(&self, depth: usize, rng: &mut dyn RngCore) -> bool {
        depth > self.config.roulette_depth && gen_f32(rng) < self.config.stop_probability
    }

    /// Ambient term plus the unshadowed contribution of every light.
    fn local_color(&self, ray: &Ray, hit: &Hit<'s>, material: &Material, ctx: &mut TraceContext) -> Color {
        let scene = self.scene;
        let p = ray.at(hit.t);
        let mut color = material.shade_ambient(hit, scene.ambient_light());

        for light in scene.lights() {
            let illum = light.illumination(p);
            if !self.is_shadowed(p, ray.time, &illum, None) {
                color += material.shade(ray.direction, hit, illum.dir_to_light, illum.color);
            }
        }

        for object in scene.light_group().iter() {
            let illum = object.sample_illumination(p, &mut ctx.rng);
            if !self.is_shadowed(p, ray.time, &illum, Some(object.id())) {
                color += material.shade(ray.direction, hit, illum.dir_to_light, illum.color);
            }
        }

        color
    }

    /// True when ordinary geometry, or an emissive primitive other than
    /// `source`, lies between `p` and the light at shutter time `time`.
    fn is_shadowed(&self, p: Vec3, time: f32, illum: &Illumination, source: Option<usize>) -> bool {
        let eps = self.config.epsilon;
        let shadow_ray = Ray::new(p, illum.dir_to_light).with_time(time);
        let limit = illum.distance - eps;

        let mut blocker = Hit::default();
        if self.scene.group().intersect(&shadow_ray, &mut blocker, eps) && blocker.t < limit {
            return true;
        }

        let mut light_blocker = Hit::default();
        if !self.scene.light_group().intersect(&shadow_ray, &mut light_blocker, eps) {
            return false;
        }
        let other_light = light_blocker
            .light_object()
            .is_some_and(|light| Some(light.id()) != source);
        other_light && light_blocker.t < limit
    }

    /// Trace a secondary ray spawned at `depth` through a medium of index
    /// `medium`. Returns its colour and hit distance.
    ///
    /// The child keeps the shutter time of `parent`.
    fn trace_child(
        &self,
        parent: &Ray,
        origin: Vec3,
        direction: Vec3,
        medium: f32,
        ctx: &mut TraceContext,
        depth: usize,
    ) -> (Color, f32) {
        ctx.media.push_child(depth, medium);
        let mut child_hit = Hit::default();
        let color = self.trace_ray_at(
            &Ray::new(origin, direction).with_time(parent.time),
            &mut child_hit,
            ctx,
            depth + 1,
            self.config.epsilon,
        );
        (color, child_hit.t)
    }

    fn trace_mirror(&self, ray: &Ray, hit: &Hit<'s>, ctx: &mut TraceContext, depth: usize) -> Color {
        let current = ctx.media.current(depth);
        let dir = reflect(ray.direction, hit.normal).normalize_or_zero();
        self.trace_child(ray, ray.at(hit.t), dir, current, ctx, depth).0
    }

    /// Fresnel blend of the reflected and refracted rays. Without a positive
    /// refraction index, or under total internal reflection, only the
    /// reflection is returned.
    fn trace_reflect_refract(
        &self,
        ray: &Ray,
        hit: &Hit<'s>,
        material: &Material,
        ctx: &mut TraceContext,
        depth: usize,
    ) -> Color {
        let p = ray.at(hit.t);
        let d = ray.direction.normalize_or_zero();
        let n = hit.normal;
        let current = ctx.media.current(depth);

        let reflect_dir = reflect(d, n).normalize_or_zero();
        let (reflect_color, _) = self.trace_child(ray, p, reflect_dir, current, ctx, depth);

        let index = material.refraction_index();
        if index <= 0.0 {
            return reflect_color;
        }

        // Entering against the outward normal, leaving along it
        let entering = d.dot(n) < 0.0;
        let next = if entering {
            index
        } else {
            ctx.media.previous_index(depth)
        };

        let Some(refract_dir) = refract(d, n, current / next) else {
            return reflect_color;
        };
        let (refract_color, _) = self.trace_child(ray, p, refract_dir, next, ctx, depth);

        let cosine = if current <= next {
            d.dot(n).abs()
        } else {
            refract_dir.dot(n).abs()
        };
        let r = schlick(current, next, cosine);
        r * reflect_color + (1.0 - r) * refract_color
    }

    fn trace_ambient(&self, ray: &Ray, hit: &Hit<'s>, ctx: &mut TraceContext, depth: usize) -> Color {
        let current = ctx.media.current(depth);
        let dir = random_outward_direction(hit.normal, &mut ctx.rng);
        let (color, t) = self.trace_child(ray, ray.at(hit.t), dir, current, ctx, depth);
        color * self.attenuation(t)
    }

    fn trace_glossy(
        &self,
        ray: &Ray,
        hit: &Hit<'s>,
        material: &Material,
        ctx: &mut TraceContext,
        depth: usize,
    ) -> Color {
        let current = ctx.media.current(depth);
        let dir = random_outward_direction(hit.normal, &mut ctx.rng);
        let (color, t) = self.trace_child(ray, ray.at(hit.t), dir, current, ctx, depth);

        let brdf = cook_torrance(
            hit.normal,
            ray.direction,
            dir,
            material.specular_color(),
            material.roughness(),
        );
        let contribution = color * brdf * self.attenuation(t);

        if contribution.is_nan() {
            log::warn!("NaN glossy contribution at depth {depth}");
        } else if !contribution.is_finite() {
            log::warn!("Infinite glossy contribution at depth {depth}");
        } else if contribution.min_element() < 0.0 {
            log::warn!("Negative glossy contribution {contribution} at depth {depth}");
        } else {
            return contribution;
        }
        sanitize_color(contribution)
    }

    /// Distance falloff `1 / (1 + falloff * t^2)` of a bounce; a miss at
    /// infinite distance contributes nothing unless falloff is disabled.
    fn attenuation(&self, t: f32) -> f32 {
        let falloff = self.config.falloff;
        if falloff == 0.0 {
            1.0
        } else {
            1.0 / (1.0 + falloff * t * t)
        }
    }
}

/// Clamp every channel to `[0, 1]`, mapping NaN to 0.
pub fn clamp_color(color: Color) -> Color {
    let clamp = |v: f32| if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };
    Color::new(clamp(color.x), clamp(color.y), clamp(color.z))
}

/// Replace NaN with 0, infinities with 1 and negatives with their magnitude.
fn sanitize_color(color: Color) -> Color {
    let fix = |v: f32| {
        if v.is_nan() {
            0.0
        } else if v.is_infinite() {
            1.0
        } else {
            v.abs()
        }
    };
    Color::new(fix(color.x), fix(color.y), fix(color.z))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampling::{gen_range, random_unit_vector};
    use crate::{Light, LightShape, Plane, Sphere};
    use std::sync::Arc;

    fn phong_scene() -> Scene {
        let mut scene = Scene::new(Color::new(0.1, 0.2, 0.3), Color::splat(0.1));
        scene.add_light(Light::point(Vec3::ZERO, Color::ONE, 0.0));
        scene.group_mut().add(Sphere::new(
            Vec3::new(0.0, 0.0, -5.0),
            1.0,
            Arc::new(Material::phong(
                Color::new(0.5, 0.2, 0.1),
                Color::splat(0.2),
                10.0,
                0.0,
            )),
        ));
        scene
    }

    fn glass_scene(index: f32) -> Scene {
        let mut scene = Scene::new(Color::new(0.1, 0.2, 0.3), Color::ZERO);
        scene
            .group_mut()
            .add(Sphere::new(Vec3::new(0.0, 0.0, -5.0), 1.0, Arc::new(Material::glass(index))));
        scene
    }

    #[test]
    fn test_background_on_miss() {
        let scene = phong_scene();
        let tracer = Tracer::new(&scene, TracerConfig::default());
        let mut ctx = tracer.context_from_seed(0);

        let mut hit = Hit::default();
        let color = tracer.trace_ray(&Ray::new(Vec3::ZERO, Vec3::Z), &mut hit, &mut ctx);
        assert_eq!(color, Color::new(0.1, 0.2, 0.3));
        assert!(!hit.is_hit());
    }

    #[test]
    fn test_phong_sphere_matches_hand_computation() {
        let scene = phong_scene();
        let tracer = Tracer::new(&scene, TracerConfig::default());
        let ray = Ray::new(Vec3::ZERO, -Vec3::Z);

        // ambient 0.1 * kd + diffuse kd + highlight 0.2, plus reflected
        // background weighted by the specular colour
        let expected = Color::new(0.77, 0.46, 0.37);

        let mut first = Color::ZERO;
        for seed in [1, 2] {
            let mut ctx = tracer.context_from_seed(seed);
            let mut hit = Hit::default();
            let color = tracer.trace_ray(&ray, &mut hit, &mut ctx);
            assert!((color - expected).abs().max_element() < 1e-5, "got {color}");
            assert!((hit.t - 4.0).abs() < 1e-5);
            if seed == 1 {
                first = color;
            } else {
                assert_eq!(color.to_array(), first.to_array());
            }
        }
        assert_eq!(tracer.maximum_observed_depth(), 1);
    }

    #[test]
    fn test_shadowed_point_light() {
        let mut scene = phong_scene();
        // Blocker between the light at the origin and the big sphere
        scene.group_mut().add(Sphere::new(
            Vec3::new(0.0, 0.0, -2.0),
            0.1,
            Arc::new(Material::phong(Color::ZERO, Color::ZERO, 1.0, 0.0)),
        ));
        let tracer = Tracer::new(&scene, TracerConfig::default());
        let mut ctx = tracer.context_from_seed(0);

        // Camera off to the side so its ray passes the blocker, while the
        // shadow ray from the front of the sphere to the light does not
        let origin = Vec3::new(0.5, 0.0, 0.0);
        let dir = (Vec3::new(0.0, 0.0, -4.0) - origin).normalize();
        let mut hit = Hit::default();
        let color = tracer.trace_ray(&Ray::new(origin, dir), &mut hit, &mut ctx);
        assert!(hit.t > 3.5);

        // Only the ambient term and a faint reflection remain
        assert!(color.x < 0.2, "got {color}");
    }

    #[test]
    fn test_shadow_rays_keep_shutter_time() {
        let mut scene = phong_scene();
        // Blocker on the light path at time 0, well clear of it at time 1
        let blocker = Sphere::new(
            Vec3::new(0.0, 0.0, -2.0),
            0.1,
            Arc::new(Material::phong(Color::ZERO, Color::ZERO, 1.0, 0.0)),
        );
        scene.group_mut().add(crate::Velocity::new(Vec3::X, blocker.into()));
        let tracer = Tracer::new(&scene, TracerConfig::default());

        let origin = Vec3::new(0.5, 0.0, 0.0);
        let ray = Ray::new(origin, (Vec3::new(0.0, 0.0, -4.0) - origin).normalize());

        let mut ctx = tracer.context_from_seed(0);
        let mut hit = Hit::default();
        let shadowed = tracer.trace_ray(&ray, &mut hit, &mut ctx);
        assert!(shadowed.x < 0.2, "got {shadowed}");

        let mut hit = Hit::default();
        let lit = tracer.trace_ray(&ray.with_time(1.0), &mut hit, &mut ctx);
        assert!(hit.t > 3.5);
        assert!(lit.x > 0.5, "got {lit}");
    }

    #[test]
    fn test_light_object_hit_returns_emission() {
        let mut scene = phong_scene();
        scene.light_group_mut().add(
            LightShape::Sphere {
                center: Vec3::new(0.0, 0.0, -2.0),
                radius: 0.5,
            },
            Color::new(0.9, 0.8, 0.7),
            0.0,
        );
        let tracer = Tracer::new(&scene, TracerConfig::default());
        let mut ctx = tracer.context_from_seed(0);

        let mut hit = Hit::default();
        let color = tracer.trace_ray(&Ray::new(Vec3::ZERO, -Vec3::Z), &mut hit, &mut ctx);
        assert_eq!(color, Color::new(0.9, 0.8, 0.7));
        assert!((hit.t - 1.5).abs() < 1e-5);
        assert_eq!(hit.light_object().map(|l| l.id()), Some(0));
    }

    #[test]
    fn test_light_object_illuminates_surface() {
        let mut scene = Scene::new(Color::ZERO, Color::ZERO);
        scene.group_mut().add(Plane::new(
            Vec3::Y,
            0.0,
            Arc::new(Material::phong(Color::ONE, Color::ZERO, 1.0, 0.0)),
        ));
        scene.light_group_mut().add(
            LightShape::Triangle {
                vertices: [
                    Vec3::new(-1.0, 3.0, -1.0),
                    Vec3::new(1.0, 3.0, -1.0),
                    Vec3::new(0.0, 3.0, 1.0),
                ],
            },
            Color::ONE,
            0.0,
        );
        let tracer = Tracer::new(&scene, TracerConfig::default());
        let mut ctx = tracer.context_from_seed(4);

        let ray = Ray::new(Vec3::new(0.0, 1.0, 2.0), Vec3::new(0.0, -1.0, -2.0).normalize());
        let mut hit = Hit::default();
        let color = tracer.trace_ray(&ray, &mut hit, &mut ctx);
        assert!(color.x > 0.5, "got {color}");
    }

    #[test]
    fn test_index_matched_glass_is_invisible() {
        let scene = glass_scene(1.0);
        let tracer = Tracer::new(&scene, TracerConfig::default());
        let mut ctx = tracer.context_from_seed(8);

        let mut hit = Hit::default();
        let color = tracer.trace_ray(&Ray::new(Vec3::ZERO, -Vec3::Z), &mut hit, &mut ctx);
        assert_eq!(color, scene.background());
    }

    #[test]
    fn test_medium_returns_to_vacuum_after_glass() {
        let scene = glass_scene(1.5);
        let tracer = Tracer::new(&scene, TracerConfig::default());
        let mut ctx = tracer.context_from_seed(3);

        let mut hit = Hit::default();
        tracer.trace_ray(&Ray::new(Vec3::ZERO, -Vec3::Z), &mut hit, &mut ctx);

        // The last path traced entered the sphere and left it again
        let media = ctx.media();
        assert_eq!(media.len(), 3);
        assert_eq!(media.current(0), 1.0);
        assert_eq!(media.current(1), 1.5);
        assert_eq!(media.current(2), 1.0);
        assert!(tracer.maximum_observed_depth() >= 2);
    }

    #[test]
    fn test_roulette_rate() {
        let scene = Scene::default();
        let tracer = Tracer::new(&scene, TracerConfig::default());
        let mut rng = StdRng::seed_from_u64(99);

        assert!(!(0..1_000).any(|_| tracer.should_terminate(5, &mut rng)));

        let trials = 100_000;
        let stopped = (0..trials).filter(|_| tracer.should_terminate(6, &mut rng)).count();
        let rate = stopped as f32 / trials as f32;
        assert!((rate - 0.5).abs() < 0.02, "rate {rate}");
    }

    #[test]
    fn test_depth_limit_respected() {
        // Two facing mirrors bounce forever without roulette
        let mut scene = Scene::new(Color::ZERO, Color::ZERO);
        let mirror = Arc::new(Material::mirror());
        scene.group_mut().add(Plane::new(Vec3::Z, -1.0, mirror.clone()));
        scene.group_mut().add(Plane::new(Vec3::Z, 1.0, mirror));

        let config = TracerConfig {
            max_depth: 10,
            stop_probability: 0.0,
            ..TracerConfig::default()
        };
        let tracer = Tracer::new(&scene, config);
        assert_eq!(tracer.config().max_depth, 10);
        let mut ctx = tracer.context_from_seed(0);

        let mut hit = Hit::default();
        let color = tracer.trace_ray(&Ray::new(Vec3::ZERO, Vec3::Z), &mut hit, &mut ctx);
        assert!(color.is_finite());
        assert_eq!(tracer.maximum_observed_depth(), 11);
    }

    #[test]
    fn test_colors_stay_valid() {
        let mut rng = StdRng::seed_from_u64(1234);

        for _ in 0..4 {
            let mut scene = Scene::new(
                Color::new(gen_f32(&mut rng), gen_f32(&mut rng), gen_f32(&mut rng)),
                Color::splat(0.1),
            );
            scene.add_light(Light::directional(Vec3::new(-1.0, -1.0, -1.0), Color::splat(0.8)));
            scene.add_light(Light::point(Vec3::new(0.0, 4.0, 0.0), Color::ONE, 0.1));
            scene.group_mut().add(Plane::new(
                Vec3::Y,
                -2.0,
                Arc::new(Material::ambient(Color::splat(0.7), Color::ZERO, 1.0)),
            ));
            scene.light_group_mut().add(
                LightShape::Sphere {
                    center: Vec3::new(2.0, 3.0, -6.0),
                    radius: 0.5,
                },
                Color::ONE,
                0.1,
            );

            let materials = [
                Material::glass(1.5),
                Material::mirror(),
                Material::phong(Color::splat(0.6), Color::splat(0.3), 20.0, 1.3),
                Material::glossy(Color::splat(0.4), Color::splat(0.8), 5.0, 0.2),
                Material::ambient(Color::new(0.8, 0.3, 0.3), Color::ZERO, 1.0),
            ];
            for material in materials {
                let center = Vec3::new(
                    gen_range(&mut rng, -3.0, 3.0),
                    gen_range(&mut rng, -1.0, 2.0),
                    gen_range(&mut rng, -9.0, -4.0),
                );
                scene
                    .group_mut()
                    .add(Sphere::new(center, gen_range(&mut rng, 0.5, 1.5), Arc::new(material)));
            }

            let tracer = Tracer::new(&scene, TracerConfig::default());
            let mut ctx = tracer.context_from_seed(rng.next_u64());
            for _ in 0..40 {
                let mut dir = random_unit_vector(&mut rng);
                dir.z = -dir.z.abs();
                let mut hit = Hit::default();
                let color = tracer.trace_ray(&Ray::new(Vec3::ZERO, dir), &mut hit, &mut ctx);
                assert!(color.is_finite(), "got {color}");
                assert!(color.min_element() >= 0.0, "got {color}");
            }
        }
    }

    #[test]
    fn test_clamp_color() {
        assert_eq!(clamp_color(Color::new(-1.0, 0.5, 7.0)), Color::new(0.0, 0.5, 1.0));
        assert_eq!(clamp_color(Color::new(f32::NAN, 0.0, 0.0)), Color::ZERO);
    }

    #[test]
    fn test_sanitize_color() {
        let c = sanitize_color(Color::new(f32::NAN, f32::INFINITY, -0.25));
        assert_eq!(c, Color::new(0.0, 1.0, 0.25));
    }
}
