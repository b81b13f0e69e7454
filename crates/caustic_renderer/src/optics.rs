//! Reflection, refraction and reflectance formulas.

use caustic_math::Vec3;

use crate::Color;

/// Exponent of the Fresnel term in the Cook-Torrance model.
const COOK_TORRANCE_FRESNEL_EXPONENT: i32 = 5;

/// Reflect a vector about a normal.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refract a unit direction through a surface with unit normal `n`.
///
/// `n_ratio` is the index of the medium being left over the index of the
/// medium being entered. The sign of `v . n` decides which side the ray comes
/// from: negative means it travels against the normal. Returns `None` on
/// total internal reflection.
pub fn refract(v: Vec3, n: Vec3, n_ratio: f32) -> Option<Vec3> {
    let vn = v.dot(n);
    let delta = 1.0 - n_ratio * n_ratio * (1.0 - vn * vn);
    if delta <= 0.0 {
        return None;
    }

    let tangent = n_ratio * (v - n * vn);
    let dir = if vn < 0.0 {
        tangent - n * delta.sqrt()
    } else {
        tangent + n * delta.sqrt()
    };
    dir.try_normalize()
}

/// Schlick's approximation of Fresnel reflectance.
///
/// `n1` is the index on the incoming side, `n2` on the far side, and `cosine`
/// the cosine of the angle used for the blend.
#[inline]
pub fn schlick(n1: f32, n2: f32, cosine: f32) -> f32 {
    let r0 = ((n2 - n1) / (n2 + n1)).powi(2);
    r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
}

/// Cook-Torrance microfacet term scaled by the specular colour.
///
/// `incoming` is the direction of the ray that hit the surface and
/// `outgoing` the sampled bounce direction. Degenerate values are replaced:
/// infinity becomes white, negative results are mirrored, NaN becomes black.
pub fn cook_torrance(
    normal: Vec3,
    incoming: Vec3,
    outgoing: Vec3,
    specular: Color,
    roughness: f32,
) -> Color {
    let n = normal.normalize_or_zero();
    let v = -incoming.normalize_or_zero();
    let l = outgoing.normalize_or_zero();
    let h = (l + v).normalize_or_zero();

    let h_n = h.dot(n);
    let h_v = h.dot(v);
    let n_l = n.dot(l);
    let n_v = n.dot(v);

    if n_v == 0.0 {
        return Color::ZERO;
    }

    // Angle between the half vector and the normal
    let delta = h_n.clamp(-1.0, 1.0).acos();
    let m = roughness;

    let d = (-((delta / m).powi(2)).tan()).exp() / (m * m * delta.cos().powi(4));
    let g = 1.0_f32
        .min(2.0 * h_n * n_v / h_v)
        .min(2.0 * h_n * n_l / h_v);
    let f = h_n.powi(COOK_TORRANCE_FRESNEL_EXPONENT);

    let result = d * f * g / (n_l * n_v);

    if result.is_nan() {
        Color::ZERO
    } else if result.is_infinite() {
        Color::ONE
    } else {
        specular * result.abs()
    }
}
