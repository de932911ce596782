//! Ray casting against convex polygons and hulls
//!
//! Used for editor picking and line-of-sight queries. Rays are moved into the
//! hull's object space instead of moving every face into world space.

use super::half_edge::{ConvexHull, FaceIndex};
use super::primitives::Ray;
use crate::core::config::RayCastConfig;
use crate::foundation::math::{Transform, Vec3};

/// Hit against a single convex polygon
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolygonHit {
    /// Ray parameter of the hit
    pub t: f32,
    /// Unit polygon normal, `(v2 - v1) × (v0 - v1)`
    pub normal: Vec3,
}

/// Nearest hit against a convex hull
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HullRayHit {
    /// Ray parameter of the hit, in world units when the ray is normalized
    pub t: f32,
    /// Face that was hit
    pub face: FaceIndex,
    /// World-space hit point
    pub point: Vec3,
    /// World-space unit normal of the hit face
    pub normal: Vec3,
}

/// Intersect a ray with a planar convex polygon using the default tolerances
pub fn intersect_ray_convex_polygon(ray: &Ray, vertices: &[Vec3]) -> Option<PolygonHit> {
    intersect_ray_convex_polygon_with_config(ray, vertices, &RayCastConfig::default())
}

/// Intersect a ray with a planar convex polygon
///
/// `vertices` must be coplanar and wound counter-clockwise around the
/// normal. Returns `None` for fewer than three vertices, degenerate
/// polygons, rays parallel to the plane, hits behind the origin and hits
/// outside any edge by more than `edge_tolerance`.
///
/// The ray direction need not be unit length. `edge_tolerance` is a distance
/// in the polygon's own space.
pub fn intersect_ray_convex_polygon_with_config(
    ray: &Ray,
    vertices: &[Vec3],
    config: &RayCastConfig,
) -> Option<PolygonHit> {
    let [v0, v1, v2, ..] = *vertices else {
        return None;
    };

    let normal = (v2 - v1).cross(&(v0 - v1)).try_normalize(f32::EPSILON)?;

    // Cosine test, so an unnormalized object-space direction is judged by angle alone
    let denominator = normal.dot(&ray.direction);
    if denominator.abs() < config.parallel_epsilon * ray.direction.norm() {
        return None;
    }

    let t = normal.dot(&(v0 - ray.origin)) / denominator;
    if t < 0.0 {
        return None;
    }

    let point = ray.point_at(t);
    let outside = vertices.iter().enumerate().any(|(i, &start)| {
        let end = vertices[(i + 1) % vertices.len()];
        let edge = end - start;
        edge.cross(&normal).dot(&(point - start)) > config.edge_tolerance * edge.norm()
    });

    (!outside).then_some(PolygonHit { t, normal })
}

/// Nearest hit of a world-space ray against a placed hull, default tolerances
pub fn intersect_ray_convex_hull(ray: &Ray, hull: &ConvexHull, transform: &Transform) -> Option<HullRayHit> {
    intersect_ray_convex_hull_with_config(ray, hull, transform, &RayCastConfig::default())
}

/// Nearest hit of a world-space ray against a placed hull
///
/// Every face is tested and the smallest strictly positive `t` wins, so a
/// ray starting inside the hull reports the face it leaves through.
pub fn intersect_ray_convex_hull_with_config(
    ray: &Ray,
    hull: &ConvexHull,
    transform: &Transform,
    config: &RayCastConfig,
) -> Option<HullRayHit> {
    let local_ray = ray.transformed(&transform.inverse_matrix());
    let mut polygon = Vec::new();
    let mut best: Option<(f32, FaceIndex)> = None;

    for (index, face) in hull.faces().iter().enumerate() {
        polygon.clear();
        polygon.extend(face.vertices.iter().map(|&v| hull.vertex(v)));

        let Some(hit) = intersect_ray_convex_polygon_with_config(&local_ray, &polygon, config) else {
            continue;
        };
        if hit.t > 0.0 && best.map_or(true, |(t, _)| hit.t < t) {
            best = Some((hit.t, index as FaceIndex));
        }
    }

    best.map(|(t, face)| HullRayHit {
        t,
        face,
        point: ray.point_at(t),
        normal: transform.transform_normal(&hull.face(face).normal),
    })
}
