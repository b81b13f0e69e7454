//! Built-in demo scenes.

use std::f32::consts::FRAC_PI_3;
use std::path::Path;
use std::sync::Arc;

use caustic_core::{Mesh, Texture};
use caustic_math::{Mat4, Vec3};
use caustic_renderer::{
    Color, Light, LightShape, Material, MeshObject, PerspectiveCamera, Plane, Scene, SceneError,
    Sphere, Transform, Triangle, Velocity,
};

/// Build a scene by name, or load an OBJ file when `name` is a path.
pub fn load(name: &str) -> Result<(Scene, PerspectiveCamera), SceneError> {
    match name {
        "glass" => glass(),
        "materials" => materials(),
        "motion" => motion(),
        path => obj_scene(Path::new(path)),
    }
}

fn default_camera() -> PerspectiveCamera {
    PerspectiveCamera::new(Vec3::new(0.0, 1.0, 6.0), Vec3::new(0.0, -0.1, -1.0), Vec3::Y, FRAC_PI_3)
}

fn floor(scene: &mut Scene, height: f32) {
    let material = Material::phong(Color::splat(0.6), Color::splat(0.1), 4.0, 0.0);
    scene.group_mut().add(Plane::new(Vec3::Y, height, Arc::new(material)));
}

/// Nested glass spheres over a floor, lit by a point light and a sphere light.
fn glass() -> Result<(Scene, PerspectiveCamera), SceneError> {
    let mut scene = Scene::new(Color::new(0.05, 0.05, 0.1), Color::splat(0.1));
    floor(&mut scene, -1.0);

    let glass = Arc::new(Material::glass(1.5));
    scene.group_mut().add(Sphere::new(Vec3::new(0.0, 0.2, 0.0), 1.2, glass));
    // Air bubble inside the outer sphere
    scene
        .group_mut()
        .add(Sphere::new(Vec3::new(0.0, 0.2, 0.0), 0.5, Arc::new(Material::glass(1.0))));
    scene
        .group_mut()
        .add(Sphere::new(Vec3::new(-2.5, 0.0, -2.0), 1.0, Arc::new(Material::mirror())));
    scene.group_mut().add(Sphere::new(
        Vec3::new(2.4, -0.4, -1.0),
        0.6,
        Arc::new(Material::phong(Color::new(0.8, 0.2, 0.2), Color::splat(0.3), 32.0, 0.0)),
    ));

    scene.add_light(Light::point(Vec3::new(3.0, 5.0, 4.0), Color::splat(0.8), 0.01));
    scene.light_group_mut().add(
        LightShape::Sphere {
            center: Vec3::new(-1.5, 4.0, 1.0),
            radius: 0.4,
        },
        Color::splat(0.6),
        0.02,
    );

    Ok((scene, default_camera()))
}

/// One sphere per material kind, a textured sphere, a stretched sphere and a
/// triangle light.
fn materials() -> Result<(Scene, PerspectiveCamera), SceneError> {
    let mut scene = Scene::new(Color::new(0.6, 0.7, 0.9), Color::splat(0.15));
    floor(&mut scene, -1.0);

    let row = [
        Material::phong(Color::new(0.2, 0.6, 0.9), Color::splat(0.5), 64.0, 0.0),
        Material::glossy(Color::new(0.9, 0.7, 0.2), Color::splat(0.6), 16.0, 0.3),
        Material::ambient(Color::new(0.3, 0.8, 0.3), Color::ZERO, 1.0),
        Material::mirror(),
        Material::glass(1.33),
    ];
    for (i, material) in row.into_iter().enumerate() {
        let x = (i as f32 - 2.0) * 1.3;
        scene
            .group_mut()
            .add(Sphere::new(Vec3::new(x, -0.4, 0.0), 0.6, Arc::new(material)));
    }

    let checker = Texture::from_fn(16, 8, |x, y| {
        if (x + y) % 2 == 0 {
            Vec3::new(0.9, 0.9, 0.9)
        } else {
            Vec3::new(0.8, 0.1, 0.1)
        }
    })?;
    let textured = Material::phong(Color::ONE, Color::splat(0.2), 16.0, 0.0).with_texture(Arc::new(checker));
    scene
        .group_mut()
        .add(Sphere::new(Vec3::new(2.8, 0.4, -2.0), 0.8, Arc::new(textured)));

    let squashed = Transform::new(
        Mat4::from_translation(Vec3::new(0.0, 1.2, -2.5)) * Mat4::from_scale(Vec3::new(2.0, 0.6, 0.6)),
        Sphere::new(
            Vec3::ZERO,
            1.0,
            Arc::new(Material::phong(Color::new(0.8, 0.4, 0.8), Color::splat(0.2), 8.0, 0.0)),
        )
        .into(),
    )?;
    scene.group_mut().add(squashed);

    scene.group_mut().add(Triangle::new(
        [
            Vec3::new(-4.0, -1.0, -3.0),
            Vec3::new(-3.0, 2.0, -3.5),
            Vec3::new(-2.0, -1.0, -4.0),
        ],
        Arc::new(Material::phong(Color::new(0.9, 0.9, 0.5), Color::ZERO, 1.0, 0.0)),
    ));

    scene.add_light(Light::directional(Vec3::new(-0.3, -1.0, -0.5), Color::splat(0.6)));
    scene.light_group_mut().add(
        LightShape::Triangle {
            vertices: [
                Vec3::new(-1.0, 4.0, 1.0),
                Vec3::new(1.0, 4.0, 1.0),
                Vec3::new(0.0, 4.0, 3.0),
            ],
        },
        Color::splat(0.5),
        0.02,
    );

    Ok((scene, default_camera()))
}

/// A row of spheres, some moving, seen through a lens focused on the middle
/// one.
fn motion() -> Result<(Scene, PerspectiveCamera), SceneError> {
    let mut scene = Scene::new(Color::new(0.5, 0.6, 0.8), Color::splat(0.2));
    floor(&mut scene, -1.0);

    let red = Arc::new(Material::phong(Color::new(0.8, 0.2, 0.2), Color::splat(0.3), 32.0, 0.0));
    let blue = Arc::new(Material::phong(Color::new(0.2, 0.3, 0.8), Color::splat(0.3), 32.0, 0.0));
    scene.group_mut().add(Velocity::new(
        Vec3::new(0.4, 0.0, 0.0),
        Sphere::new(Vec3::new(-2.0, 0.0, -2.0), 0.8, red).into(),
    ));
    scene
        .group_mut()
        .add(Sphere::new(Vec3::new(0.0, -0.2, 0.0), 0.8, Arc::new(Material::mirror())));
    // Bouncing sphere, moved through its transform
    let bouncing = Transform::new(
        Mat4::from_translation(Vec3::new(2.0, 0.0, 2.0)),
        Velocity::new(Vec3::new(0.0, 0.5, 0.0), Sphere::new(Vec3::ZERO, 0.6, blue).into()).into(),
    )?;
    scene.group_mut().add(bouncing);

    scene.add_light(Light::point(Vec3::new(2.0, 6.0, 5.0), Color::splat(0.8), 0.01));

    let eye = Vec3::new(0.0, 1.0, 6.0);
    let camera = PerspectiveCamera::new(eye, Vec3::new(0.0, -0.15, -1.0), Vec3::Y, FRAC_PI_3)
        .with_depth_of_field(0.1, eye.length());
    Ok((scene, camera))
}

/// Load an OBJ mesh, stand it on a floor and frame it with the camera.
fn obj_scene(path: &Path) -> Result<(Scene, PerspectiveCamera), SceneError> {
    let mesh = Arc::new(Mesh::load_obj(path)?);
    let bounds = mesh.bounds();
    let material = Arc::new(Material::phong(Color::splat(0.75), Color::splat(0.25), 24.0, 0.0));
    let object = MeshObject::new(mesh, material)?;

    let mut scene = Scene::new(Color::splat(0.1), Color::splat(0.15));
    scene.group_mut().add(object);
    floor(&mut scene, bounds.lower().y);

    let center = bounds.centroid();
    let radius = bounds.size().length().max(1e-3) / 2.0;
    let eye = center + Vec3::new(0.0, 0.3, 1.0).normalize() * radius * 2.5;
    scene.add_light(Light::point(eye + Vec3::new(radius, 2.0 * radius, 0.0), Color::ONE, 0.0));

    let camera = PerspectiveCamera::new(eye, center - eye, Vec3::Y, FRAC_PI_3);
    Ok((scene, camera))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_scenes() {
        let (glass, _) = load("glass").unwrap();
        assert_eq!(glass.num_objects(), 5);
        assert_eq!(glass.num_lights(), 1);
        assert_eq!(glass.num_light_objects(), 1);
        assert!(glass.is_stochastic());

        let (materials, _) = load("materials").unwrap();
        assert_eq!(materials.num_objects(), 9);
        assert_eq!(materials.num_light_objects(), 1);
        assert!(!materials.has_motion());

        let (motion, camera) = load("motion").unwrap();
        assert_eq!(motion.num_objects(), 4);
        assert!(motion.has_motion());
        assert!(motion.is_stochastic());
        assert!(camera.is_stochastic());
    }

    #[test]
    fn test_missing_obj_is_an_error() {
        assert!(matches!(
            load("/nonexistent/caustic/model.obj"),
            Err(SceneError::Mesh(_))
        ));
    }
}
