// src/math.rs
//! Vector/matrix helpers on top of `glam`.
//!
//! Bodies are unit cubes (`±0.5` on each axis) placed in the world by
//! `T * R * S`, so every corner and edge is generated here once and pushed
//! through a body's transform.

use glam::{Mat3, Mat4, Vec3};

/// Below this length a vector is treated as zero when normalising.
pub const NORMALIZE_EPSILON: f32 = 1e-8;

/// The eight corners of the unit cube. Bit 0 selects x, bit 1 y, bit 2 z.
pub const UNIT_CORNERS: [Vec3; 8] = [
    Vec3::new(-0.5, -0.5, -0.5),
    Vec3::new(0.5, -0.5, -0.5),
    Vec3::new(-0.5, 0.5, -0.5),
    Vec3::new(0.5, 0.5, -0.5),
    Vec3::new(-0.5, -0.5, 0.5),
    Vec3::new(0.5, -0.5, 0.5),
    Vec3::new(-0.5, 0.5, 0.5),
    Vec3::new(0.5, 0.5, 0.5),
];

/// The twelve unit-cube edges as corner index pairs (corners differing in one bit).
pub const UNIT_EDGES: [(usize, usize); 12] = [
    // along x
    (0, 1),
    (2, 3),
    (4, 5),
    (6, 7),
    // along y
    (0, 2),
    (1, 3),
    (4, 6),
    (5, 7),
    // along z
    (0, 4),
    (1, 5),
    (2, 6),
    (3, 7),
];

/// Normalize, returning zero instead of NaN for (near) zero vectors.
#[inline]
pub fn safe_normalize(v: Vec3) -> Vec3 {
    let len = v.length();
    if len > NORMALIZE_EPSILON {
        v / len
    } else {
        Vec3::ZERO
    }
}

/// Rotation matrix about `axis` by `angle_deg` degrees.
///
/// A zero axis or zero angle yields the identity.
#[inline]
pub fn rotation_deg(axis: Vec3, angle_deg: f32) -> Mat3 {
    let axis = safe_normalize(axis);
    if axis == Vec3::ZERO || angle_deg == 0.0 {
        return Mat3::IDENTITY;
    }
    Mat3::from_axis_angle(axis, angle_deg.to_radians())
}

/// Compose a world transform `T * R * S`.
#[inline]
pub fn compose_transform(position: Vec3, orientation: Mat3, scale: Vec3) -> Mat4 {
    Mat4::from_translation(position) * Mat4::from_mat3(orientation) * Mat4::from_scale(scale)
}

/// Inverse of `compose_transform`, built analytically as `S⁻¹ * Rᵀ * T⁻¹`.
///
/// `orientation` must be orthonormal and `scale` non-zero.
#[inline]
pub fn invert_transform(position: Vec3, orientation: Mat3, scale: Vec3) -> Mat4 {
    Mat4::from_scale(scale.recip())
        * Mat4::from_mat3(orientation.transpose())
        * Mat4::from_translation(-position)
}

/// Gram–Schmidt on the columns; keeps a rotation orthonormal after many
/// incremental updates.
pub fn orthonormalize(m: Mat3) -> Mat3 {
    let x = safe_normalize(m.x_axis);
    if x == Vec3::ZERO {
        return Mat3::IDENTITY;
    }
    let y = safe_normalize(m.y_axis - x * x.dot(m.y_axis));
    if y == Vec3::ZERO {
        return Mat3::IDENTITY;
    }
    let z = x.cross(y);
    Mat3::from_cols(x, y, z)
}

/// World positions of the eight corners under `transform`.
#[inline]
pub fn world_corners(transform: &Mat4) -> [Vec3; 8] {
    UNIT_CORNERS.map(|c| transform.transform_point3(c))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_vec(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn safe_normalize_zero_is_zero() {
        let n = safe_normalize(Vec3::ZERO);
        assert_eq!(n, Vec3::ZERO);
        assert!(!n.x.is_nan());
    }

    #[test]
    fn rotation_quarter_turn_about_y() {
        let r = rotation_deg(Vec3::Y, 90.0);
        assert!(approx_vec(r * Vec3::X, -Vec3::Z));
        assert_eq!(rotation_deg(Vec3::ZERO, 45.0), Mat3::IDENTITY);
    }

    #[test]
    fn inverse_undoes_transform() {
        let pos = Vec3::new(1.0, 2.0, -3.0);
        let rot = rotation_deg(Vec3::new(1.0, 1.0, 0.0), 33.0);
        let scale = Vec3::new(2.0, 0.5, 1.5);
        let m = compose_transform(pos, rot, scale);
        let inv = invert_transform(pos, rot, scale);
        let p = Vec3::new(0.3, -0.2, 0.4);
        assert!(approx_vec(inv.transform_point3(m.transform_point3(p)), p));
        assert!((m * inv).abs_diff_eq(Mat4::IDENTITY, 1e-5));
    }

    #[test]
    fn orthonormalize_repairs_drift() {
        let drifted = rotation_deg(Vec3::Z, 20.0) * 1.01;
        let fixed = orthonormalize(drifted);
        assert!((fixed.x_axis.length() - 1.0).abs() < 1e-5);
        assert!(fixed.x_axis.dot(fixed.y_axis).abs() < 1e-5);
        assert!((fixed.determinant() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn unit_edges_differ_in_one_bit() {
        for (a, b) in UNIT_EDGES {
            assert_eq!((a ^ b).count_ones(), 1);
        }
    }
}
