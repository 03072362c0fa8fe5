use crate::foundation::core::{Affine, Point};

/// Tolerance under which a matrix determinant is treated as singular.
pub(crate) const SINGULAR_EPS: f64 = 1e-12;

pub(crate) fn deg_to_rad(deg: f64) -> f64 {
    deg.to_radians()
}

pub(crate) fn rad_to_deg(rad: f64) -> f64 {
    rad.to_degrees()
}

/// Normalize degrees into `(-180, 180]`.
pub fn normalize_deg_signed(deg: f64) -> f64 {
    let r = deg.rem_euclid(360.0);
    if r > 180.0 { r - 360.0 } else { r }
}

/// Normalize degrees into `[-180, 180)`.
pub fn normalize_deg_detach(deg: f64) -> f64 {
    (deg + 180.0).rem_euclid(360.0) - 180.0
}

/// Round to the nearest whole unit, halves away from zero.
pub fn round_unit(v: f64) -> f64 {
    let r = v.round();
    // Avoid emitting `-0.0` into serialized overrides.
    if r == 0.0 { 0.0 } else { r }
}

/// Rotation by `deg` degrees around `center`.
pub(crate) fn rotate_about_deg(deg: f64, center: Point) -> Affine {
    Affine::rotate_about(deg_to_rad(deg), center)
}

/// Absolute rotation of a matrix in degrees, `atan2(b, a)`.
pub(crate) fn rotation_deg_of(m: Affine) -> f64 {
    let [a, b, _, _, _, _] = m.as_coeffs();
    rad_to_deg(b.atan2(a))
}

/// Invert `m`, or `None` when it is (numerically) singular.
pub(crate) fn checked_inverse(m: Affine) -> Option<Affine> {
    let det = m.determinant();
    if !det.is_finite() || det.abs() < SINGULAR_EPS {
        return None;
    }
    Some(m.inverse())
}

/// Map a point and return its angle around `pivot` in degrees (`atan2(dy, dx)`).
pub(crate) fn angle_around_deg(pivot: Point, p: Point) -> f64 {
    let d = p - pivot;
    rad_to_deg(d.y.atan2(d.x))
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
