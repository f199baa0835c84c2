//! Polygon triangulation and flat normal synthesis.
//!
//! A polygon is projected onto the plane of its Newell normal and handed to
//! `earcutr`, so concave outlines come out right. Every corner triple keeps
//! the winding of the source polygon.

use glam::{DVec2, Vec3};

/// Newell normal length below this fraction of the squared extent means the
/// outline has no area.
const DEGENERATE_RATIO: f32 = 1e-6;

/// Face normal of triangle ABC: `(B - A) x (C - B)`, normalized.
///
/// A degenerate triangle yields the zero vector.
pub fn face_normal(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    (b - a).cross(c - b).normalize_or_zero()
}

/// Split a polygon into triangles of local corner indices.
///
/// Polygons with fewer than 3 corners yield nothing. Simple polygons yield
/// `n - 2` triangles; outlines without area are split as a fan.
pub fn triangulate_polygon(corners: &[Vec3]) -> Vec<[usize; 3]> {
    let n = corners.len();
    if n < 3 {
        return Vec::new();
    }
    if n == 3 {
        return vec![[0, 1, 2]];
    }

    let normal = newell_normal(corners);
    if is_degenerate(corners, normal) {
        return fan(n);
    }

    let projected = project_to_2d(corners, normal);
    let orientation = signed_area(&projected).signum();
    let flat: Vec<f64> = projected.iter().flat_map(|p| [p.x, p.y]).collect();

    let indices = match earcutr::earcut(&flat, &[], 2) {
        Ok(indices) if !indices.is_empty() => indices,
        Ok(_) => return fan(n),
        Err(_) => {
            tracing::debug!("Ear cutting failed on a {}-gon, splitting as a fan", n);
            return fan(n);
        }
    };

    indices
        .chunks_exact(3)
        .map(|t| {
            let (a, b, c) = (projected[t[0]], projected[t[1]], projected[t[2]]);
            if (b - a).perp_dot(c - b) * orientation < 0.0 {
                [t[0], t[2], t[1]]
            } else {
                [t[0], t[1], t[2]]
            }
        })
        .collect()
}

/// Fan split around corner 0.
fn fan(n: usize) -> Vec<[usize; 3]> {
    (1..n - 1).map(|i| [0, i, i + 1]).collect()
}

fn newell_normal(corners: &[Vec3]) -> Vec3 {
    let mut normal = Vec3::ZERO;
    for (i, current) in corners.iter().enumerate() {
        let next = corners[(i + 1) % corners.len()];
        normal.x += (current.y - next.y) * (current.z + next.z);
        normal.y += (current.z - next.z) * (current.x + next.x);
        normal.z += (current.x - next.x) * (current.y + next.y);
    }
    normal
}

/// Compare twice the enclosed area against the squared longest edge.
fn is_degenerate(corners: &[Vec3], normal: Vec3) -> bool {
    let extent_squared = corners
        .iter()
        .enumerate()
        .map(|(i, p)| p.distance_squared(corners[(i + 1) % corners.len()]))
        .fold(0.0_f32, f32::max);
    !normal.is_finite() || extent_squared <= 0.0 || normal.length() <= DEGENERATE_RATIO * extent_squared
}

/// Drop the dominant axis of `normal`.
fn project_to_2d(corners: &[Vec3], normal: Vec3) -> Vec<DVec2> {
    let abs = normal.abs();
    corners
        .iter()
        .map(|p| {
            let p = p.as_dvec3();
            if abs.x >= abs.y && abs.x >= abs.z {
                DVec2::new(p.y, p.z)
            } else if abs.y >= abs.z {
                DVec2::new(p.z, p.x)
            } else {
                DVec2::new(p.x, p.y)
            }
        })
        .collect()
}

fn signed_area(points: &[DVec2]) -> f64 {
    let mut area = 0.0;
    for (i, p) in points.iter().enumerate() {
        let q = points[(i + 1) % points.len()];
        area += p.perp_dot(q);
    }
    area * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area_sum(corners: &[Vec3], triangles: &[[usize; 3]]) -> f32 {
        triangles
            .iter()
            .map(|t| (corners[t[1]] - corners[t[0]]).cross(corners[t[2]] - corners[t[0]]).length() * 0.5)
            .sum()
    }

    /// Clockwise U outline with the notch open to +y; area 7 at unit scale.
    fn u_shape(scale: f32) -> Vec<Vec3> {
        [
            (1.0, 3.0),
            (1.0, 1.0),
            (2.0, 1.0),
            (2.0, 3.0),
            (3.0, 3.0),
            (3.0, 0.0),
            (0.0, 0.0),
            (0.0, 3.0),
        ]
        .iter()
        .map(|&(x, y)| Vec3::new(x, y, 0.0) * scale)
        .collect()
    }

    #[test]
    fn test_face_normal() {
        let n = face_normal(Vec3::ZERO, Vec3::X, Vec3::Y);
        assert_eq!(n, Vec3::Z);

        let n = face_normal(Vec3::ZERO, Vec3::X, Vec3::Y * 3.0);
        assert!((n.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_degenerate_normal_is_zero() {
        let n = face_normal(Vec3::ZERO, Vec3::X, Vec3::X * 2.0);
        assert_eq!(n, Vec3::ZERO);
    }

    #[test]
    fn test_convex_polygons_yield_n_minus_two() {
        for n in 3..10 {
            let corners: Vec<Vec3> = (0..n)
                .map(|i| {
                    let angle = i as f32 / n as f32 * std::f32::consts::TAU;
                    Vec3::new(angle.cos(), angle.sin(), 0.5)
                })
                .collect();
            let triangles = triangulate_polygon(&corners);
            assert_eq!(triangles.len(), n - 2);
            for t in &triangles {
                assert!(t.iter().all(|&i| i < n));
                let normal = face_normal(corners[t[0]], corners[t[1]], corners[t[2]]);
                assert!(normal.dot(Vec3::Z) > 0.99, "winding flipped for n = {n}");
            }
        }
    }

    #[test]
    fn test_concave_polygon() {
        // Arrow head pointing +x with a notch at index 2
        let corners = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(2.0, 2.0, 0.0),
            Vec3::new(0.0, 2.0, 0.0),
        ];
        let triangles = triangulate_polygon(&corners);
        assert_eq!(triangles.len(), 3);
        // Total area of the outline is 4 - 1 = 3
        assert!((area_sum(&corners, &triangles) - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_concave_polygon_at_any_scale() {
        for scale in [1.0_f32, 1e-3, 1e-4, 1e-6, 1e3] {
            let corners = u_shape(scale);
            let triangles = triangulate_polygon(&corners);
            assert_eq!(triangles.len(), 6, "scale {scale}");
            let ratio = area_sum(&corners, &triangles) / (7.0 * scale * scale);
            assert!((ratio - 1.0).abs() < 1e-3, "scale {scale}: area ratio {ratio}");
            for t in &triangles {
                let normal = face_normal(corners[t[0]], corners[t[1]], corners[t[2]]);
                assert!(normal.dot(Vec3::Z) < -0.99, "scale {scale}: winding flipped");
            }
        }
    }

    #[test]
    fn test_clockwise_polygon_in_yz_plane() {
        let corners = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(0.0, 1.0, 1.0),
            Vec3::new(0.0, 1.0, 0.0),
        ];
        let triangles = triangulate_polygon(&corners);
        assert_eq!(triangles.len(), 2);
        for t in &triangles {
            let normal = face_normal(corners[t[0]], corners[t[1]], corners[t[2]]);
            assert!(normal.dot(-Vec3::X) > 0.99);
        }
    }

    #[test]
    fn test_collinear_polygon_falls_back_to_fan() {
        let corners = [Vec3::ZERO, Vec3::X, Vec3::X * 2.0, Vec3::X * 3.0];
        assert_eq!(triangulate_polygon(&corners), vec![[0, 1, 2], [0, 2, 3]]);

        let tiny: Vec<Vec3> = corners.iter().map(|&p| p * 1e-5).collect();
        assert_eq!(triangulate_polygon(&tiny).len(), 2);
    }

    #[test]
    fn test_short_polygon() {
        assert!(triangulate_polygon(&[Vec3::ZERO, Vec3::X]).is_empty());
    }
}
