//! Perspective camera for primary ray generation, with an optional thin
//! lens for depth of field.

use caustic_math::{Ray, Vec3};
use rand::RngCore;

use crate::sampling::{gen_range, random_in_unit_disk};

/// Perspective camera with a vertical field of view.
///
/// Pixel coordinates have their origin at the bottom-left of the image: `x`
/// grows along `horizontal`, `y` along `up`.
///
/// With a positive aperture the camera is a thin lens: ray origins are
/// spread over a disk of that radius around `center`, and every ray through a
/// pixel converges on the same point `focal_length` along the pinhole ray.
#[derive(Debug, Clone)]
pub struct PerspectiveCamera {
    center: Vec3,
    direction: Vec3,
    up: Vec3,
    horizontal: Vec3,
    /// Vertical field of view in radians
    angle: f32,
    width: u32,
    height: u32,
    /// Lens radius; 0 is a pinhole
    aperture: f32,
    focal_length: f32,
}

impl PerspectiveCamera {
    /// Create a camera at `center` looking along `direction`.
    ///
    /// The image size defaults to 1x1; set it with [`with_size`](Self::with_size).
    pub fn new(center: Vec3, direction: Vec3, up: Vec3, angle: f32) -> Self {
        let direction = direction.normalize_or_zero();
        Self {
            center,
            direction,
            up: up.normalize_or_zero(),
            horizontal: direction.cross(up).normalize_or_zero(),
            angle,
            width: 1,
            height: 1,
            aperture: 0.0,
            focal_length: 1.0,
        }
    }

    /// Turn the camera into a thin lens of radius `aperture` focused at
    /// distance `focal_length`. A non-positive aperture keeps the pinhole.
    pub fn with_depth_of_field(mut self, aperture: f32, focal_length: f32) -> Self {
        self.aperture = aperture.max(0.0);
        self.focal_length = focal_length;
        self
    }

    /// Set image resolution.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// True when a pixel needs several rays to converge.
    pub fn is_stochastic(&self) -> bool {
        self.aperture > 0.0
    }

    /// Focal length in pixels.
    fn focal(&self) -> f32 {
        self.height as f32 / (2.0 * (self.angle / 2.0).tan())
    }

    fn ray_through(&self, x: f32, y: f32) -> Ray {
        let f = self.focal();
        let view = ((x - self.width as f32 / 2.0) / f) * self.horizontal
            + ((y - self.height as f32 / 2.0) / f) * self.up
            + self.direction;
        Ray::new(self.center, view.normalize_or_zero())
    }

    /// Ray through pixel `(x, y)`.
    pub fn generate_ray(&self, x: u32, y: u32) -> Ray {
        self.ray_through(x as f32, y as f32)
    }

    /// Ray through pixel `(x, y)` offset by a uniform random amount in
    /// `[-0.5, 0.5)` on each axis.
    pub fn generate_jittered_ray(&self, x: u32, y: u32, rng: &mut dyn RngCore) -> Ray {
        let jx = gen_range(rng, -0.5, 0.5);
        let jy = gen_range(rng, -0.5, 0.5);
        self.ray_through(x as f32 + jx, y as f32 + jy)
    }

    /// Primary ray for one sample of pixel `(x, y)`.
    ///
    /// The pinhole ray is jittered when `jitter` is set, then moved onto the
    /// lens when the camera has an aperture.
    pub fn sample_ray(&self, x: u32, y: u32, jitter: bool, rng: &mut dyn RngCore) -> Ray {
        let ray = if jitter {
            self.generate_jittered_ray(x, y, rng)
        } else {
            self.generate_ray(x, y)
        };
        if !self.is_stochastic() {
            return ray;
        }

        let focus = ray.at(self.focal_length);
        let lens = random_in_unit_disk(rng) * self.aperture;
        let origin = self.center + lens.x * self.horizontal + lens.y * self.up;
        Ray::new(origin, (focus - origin).normalize_or_zero())
    }
}
