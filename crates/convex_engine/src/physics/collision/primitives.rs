//! Primitive collision shapes and intersection algorithms
//!
//! Plain value types (rays, planes, spheres, boxes, triangles, segments) with
//! containment, encapsulation and intersection helpers. Nothing here holds
//! state; every operation is a pure function of its inputs.

use crate::foundation::math::{Mat3, Mat4, Point3, Quat, Transform, Vec3};

/// A ray for ray casting and picking
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// The origin point of the ray
    pub origin: Vec3,
    /// The direction of the ray (normalized by [`Ray::new`])
    pub direction: Vec3,
}

impl Ray {
    /// Creates a new ray with the given origin and direction
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Get a point along the ray at parameter t
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Map the ray through an affine matrix
    ///
    /// The direction is not renormalized, so a `t` found in the target space
    /// is the same `t` in the source space.
    pub fn transformed(&self, matrix: &Mat4) -> Self {
        Self {
            origin: matrix.transform_point(&Point3::from(self.origin)).coords,
            direction: matrix.transform_vector(&self.direction),
        }
    }
}

/// An oriented plane `normal · p = distance`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Unit normal
    pub normal: Vec3,
    /// Offset along the normal from the origin
    pub distance: f32,
}

impl Plane {
    /// Plane through `point` with the given unit normal
    pub fn from_point_normal(point: Vec3, normal: Vec3) -> Self {
        Self {
            normal,
            distance: normal.dot(&point),
        }
    }

    /// Plane through three counter-clockwise points (normal by right-hand rule)
    ///
    /// Returns `None` for collinear points.
    pub fn from_points(a: Vec3, b: Vec3, c: Vec3) -> Option<Self> {
        let normal = (b - a).cross(&(c - a)).try_normalize(f32::EPSILON)?;
        Some(Self::from_point_normal(a, normal))
    }

    /// Signed distance of a point: positive in front of the plane
    pub fn signed_distance(&self, point: &Vec3) -> f32 {
        self.normal.dot(point) - self.distance
    }

    /// Orthogonal projection of a point onto the plane
    pub fn project_point(&self, point: &Vec3) -> Vec3 {
        point - self.normal * self.signed_distance(point)
    }

    /// Ray parameter where the ray crosses the plane
    ///
    /// `None` when the ray runs parallel to the plane.
    pub fn intersect_ray(&self, ray: &Ray, parallel_epsilon: f32) -> Option<f32> {
        let denom = self.normal.dot(&ray.direction);
        if denom.abs() < parallel_epsilon {
            return None;
        }
        Some((self.distance - self.normal.dot(&ray.origin)) / denom)
    }
}

/// A bounding sphere for collision detection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    /// The center position of the sphere
    pub center: Vec3,
    /// The radius of the sphere
    pub radius: f32,
}

impl BoundingSphere {
    /// Creates a new bounding sphere with the given center and radius
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Sphere around a point set: centered on the box center, radius to the
    /// farthest point. Not minimal.
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        let center = Aabb::from_points(points)?.center();
        let radius = points
            .iter()
            .map(|p| (p - center).norm())
            .fold(0.0f32, f32::max);
        Some(Self { center, radius })
    }

    /// Check if this sphere intersects with another
    pub fn intersects(&self, other: &Self) -> bool {
        let distance_squared = (self.center - other.center).norm_squared();
        let radius_sum = self.radius + other.radius;
        distance_squared <= radius_sum * radius_sum
    }

    /// Get the penetration depth if intersecting (0.0 if not intersecting)
    pub fn penetration_depth(&self, other: &Self) -> f32 {
        let distance = (self.center - other.center).norm();
        (self.radius + other.radius - distance).max(0.0)
    }

    /// Check whether a point lies inside or on the sphere
    pub fn contains_point(&self, point: &Vec3) -> bool {
        (point - self.center).norm_squared() <= self.radius * self.radius
    }

    /// Grow the sphere just enough to contain a point
    ///
    /// The far side of the sphere stays fixed, so the result is the smallest
    /// sphere containing both the old sphere and the point.
    pub fn encapsulate_point(&mut self, point: &Vec3) {
        let offset = point - self.center;
        let distance = offset.norm();
        if distance <= self.radius {
            return;
        }
        let new_radius = (self.radius + distance) * 0.5;
        self.center += offset * ((new_radius - self.radius) / distance);
        self.radius = new_radius;
    }

    /// Grow the sphere just enough to contain another sphere
    pub fn encapsulate_sphere(&mut self, other: &Self) {
        let offset = other.center - self.center;
        let distance = offset.norm();
        if distance + other.radius <= self.radius {
            return;
        }
        if distance + self.radius <= other.radius {
            *self = *other;
            return;
        }
        let new_radius = (self.radius + distance + other.radius) * 0.5;
        self.center += offset * ((new_radius - self.radius) / distance);
        self.radius = new_radius;
    }

    /// Test ray intersection with this sphere
    /// Returns (t, hit_point, normal) for the nearest non-negative hit
    pub fn intersect_ray(&self, ray: &Ray) -> Option<(f32, Vec3, Vec3)> {
        // Solve |origin + t*direction - center|^2 = radius^2
        let oc = ray.origin - self.center;
        let a = ray.direction.dot(&ray.direction);
        let half_b = oc.dot(&ray.direction);
        let c = oc.dot(&oc) - self.radius * self.radius;

        let discriminant = half_b * half_b - a * c;
        if discriminant < 0.0 || a == 0.0 {
            return None;
        }

        let sqrt_discriminant = discriminant.sqrt();
        let near = (-half_b - sqrt_discriminant) / a;
        let far = (-half_b + sqrt_discriminant) / a;
        let t = if near >= 0.0 {
            near
        } else if far >= 0.0 {
            far
        } else {
            return None;
        };

        let hit_point = ray.point_at(t);
        let normal = (hit_point - self.center).normalize();
        Some((t, hit_point, normal))
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box
    pub min: Vec3,
    /// Maximum corner of the bounding box
    pub max: Vec3,
}

impl Aabb {
    /// Create a new AABB from min and max points
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create an AABB centered at a point with given half extents
    pub fn from_center_extents(center: Vec3, extents: Vec3) -> Self {
        Self {
            min: center - extents,
            max: center + extents,
        }
    }

    /// Tightest box around a point set, `None` for an empty set
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut aabb = Self::new(*first, *first);
        for point in rest {
            aabb.encapsulate_point(point);
        }
        Some(aabb)
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the extents (half-size) of the AABB
    pub fn extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Check if this AABB contains a point
    pub fn contains_point(&self, point: &Vec3) -> bool {
        point.x >= self.min.x && point.x <= self.max.x
            && point.y >= self.min.y && point.y <= self.max.y
            && point.z >= self.min.z && point.z <= self.max.z
    }

    /// Check if this AABB fully contains another AABB
    pub fn contains_aabb(&self, other: &Self) -> bool {
        self.contains_point(&other.min) && self.contains_point(&other.max)
    }

    /// Check if this AABB intersects another AABB
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x
            && self.min.y <= other.max.y && self.max.y >= other.min.y
            && self.min.z <= other.max.z && self.max.z >= other.min.z
    }

    /// Grow to include a point
    pub fn encapsulate_point(&mut self, point: &Vec3) {
        self.min = self.min.inf(point);
        self.max = self.max.sup(point);
    }

    /// Grow to include another box
    pub fn encapsulate_aabb(&mut self, other: &Self) {
        self.min = self.min.inf(&other.min);
        self.max = self.max.sup(&other.max);
    }

    /// The eight corners, bit `i` of the index selecting max on axis `i`
    pub fn corners(&self) -> [Vec3; 8] {
        std::array::from_fn(|i| {
            Vec3::new(
                if i & 1 != 0 { self.max.x } else { self.min.x },
                if i & 2 != 0 { self.max.y } else { self.min.y },
                if i & 4 != 0 { self.max.z } else { self.min.z },
            )
        })
    }

    /// World-space box enclosing this object-space box after a transform
    pub fn transformed(&self, transform: &Transform) -> Self {
        let corners = self.corners().map(|corner| transform.transform_point(&corner));
        let mut aabb = Self::new(corners[0], corners[0]);
        for corner in &corners[1..] {
            aabb.encapsulate_point(corner);
        }
        aabb
    }
}

/// Oriented bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obb {
    /// Box center
    pub center: Vec3,
    /// Half size along each local axis
    pub half_extents: Vec3,
    /// Rotation from box space to world space
    pub orientation: Quat,
}

impl Obb {
    /// Creates a new oriented box
    pub fn new(center: Vec3, half_extents: Vec3, orientation: Quat) -> Self {
        Self {
            center,
            half_extents,
            orientation,
        }
    }

    /// Place an object-space box in the world
    ///
    /// Scale is folded into the half extents, so the result stays exact for
    /// any non-uniform scale.
    pub fn from_aabb(aabb: &Aabb, transform: &Transform) -> Self {
        Self {
            center: transform.transform_point(&aabb.center()),
            half_extents: aabb.extents().component_mul(&transform.scale).abs(),
            orientation: transform.rotation,
        }
    }

    /// World-space unit axes of the box (columns of its rotation)
    pub fn axes(&self) -> [Vec3; 3] {
        let rotation: Mat3 = self.orientation.to_rotation_matrix().into_inner();
        [
            rotation.column(0).into_owned(),
            rotation.column(1).into_owned(),
            rotation.column(2).into_owned(),
        ]
    }

    /// Check if the box contains a point
    pub fn contains_point(&self, point: &Vec3) -> bool {
        let local = self.orientation.inverse() * (point - self.center);
        local.x.abs() <= self.half_extents.x
            && local.y.abs() <= self.half_extents.y
            && local.z.abs() <= self.half_extents.z
    }

    /// The eight world-space corners
    pub fn corners(&self) -> [Vec3; 8] {
        let local = Aabb::from_center_extents(Vec3::zeros(), self.half_extents);
        local.corners().map(|corner| self.center + self.orientation * corner)
    }

    /// Axis-aligned box enclosing this box
    pub fn to_aabb(&self) -> Aabb {
        let [x, y, z] = self.axes();
        let reach = x.abs() * self.half_extents.x
            + y.abs() * self.half_extents.y
            + z.abs() * self.half_extents.z;
        Aabb::from_center_extents(self.center, reach)
    }
}

/// A triangle for collision detection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// First vertex
    pub v0: Vec3,
    /// Second vertex
    pub v1: Vec3,
    /// Third vertex
    pub v2: Vec3,
}

impl Triangle {
    /// Creates a new triangle
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3) -> Self {
        Self { v0, v1, v2 }
    }

    /// Calculates the normal of the triangle (right-hand rule)
    pub fn normal(&self) -> Vec3 {
        (self.v1 - self.v0).cross(&(self.v2 - self.v0)).normalize()
    }

    /// Twice the area vector; zero for a degenerate triangle
    pub fn scaled_normal(&self) -> Vec3 {
        (self.v1 - self.v0).cross(&(self.v2 - self.v0))
    }

    /// Calculates the centroid (center point) of the triangle
    pub fn centroid(&self) -> Vec3 {
        (self.v0 + self.v1 + self.v2) / 3.0
    }

    /// Möller-Trumbore ray-triangle intersection algorithm
    /// Returns (t, u, v) barycentric coordinates if hit, None otherwise
    pub fn intersect_ray(&self, ray: &Ray) -> Option<(f32, f32, f32)> {
        const EPSILON: f32 = 1e-6;

        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;

        let h = ray.direction.cross(&edge2);
        let det = edge1.dot(&h);
        if det.abs() < EPSILON {
            return None;
        }

        let inv_det = 1.0 / det;
        let s = ray.origin - self.v0;
        let u = inv_det * s.dot(&h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(&edge1);
        let v = inv_det * ray.direction.dot(&q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = inv_det * edge2.dot(&q);
        (t >= 0.0).then_some((t, u, v))
    }
}

/// A line segment between two points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    /// Start point
    pub start: Vec3,
    /// End point
    pub end: Vec3,
}

impl Segment {
    /// Creates a new segment
    pub fn new(start: Vec3, end: Vec3) -> Self {
        Self { start, end }
    }

    /// Closest pair of points between two segments, `(on self, on other)`
    ///
    /// Ericson, Real-Time Collision Detection 5.1.9, with the degenerate
    /// (point-like) segment cases folded in.
    pub fn closest_points(&self, other: &Self) -> (Vec3, Vec3) {
        const EPSILON: f32 = 1e-12;

        let d1 = self.end - self.start;
        let d2 = other.end - other.start;
        let r = self.start - other.start;
        let a = d1.norm_squared();
        let e = d2.norm_squared();
        let f = d2.dot(&r);

        let (s, t) = if a <= EPSILON && e <= EPSILON {
            (0.0, 0.0)
        } else if a <= EPSILON {
            (0.0, (f / e).clamp(0.0, 1.0))
        } else {
            let c = d1.dot(&r);
            if e <= EPSILON {
                ((-c / a).clamp(0.0, 1.0), 0.0)
            } else {
                let b = d1.dot(&d2);
                let denom = a * e - b * b;
                let mut s = if denom > EPSILON {
                    ((b * f - c * e) / denom).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                let mut t = (b * s + f) / e;
                if t < 0.0 {
                    t = 0.0;
                    s = (-c / a).clamp(0.0, 1.0);
                } else if t > 1.0 {
                    t = 1.0;
                    s = ((b - c) / a).clamp(0.0, 1.0);
                }
                (s, t)
            }
        };

        (self.start + d1 * s, other.start + d2 * t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_4;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_plane_signed_distance_and_projection() {
        let plane = Plane::from_point_normal(Vec3::new(0.0, 2.0, 0.0), Vec3::y());
        assert_relative_eq!(plane.signed_distance(&Vec3::new(5.0, 3.0, -1.0)), 1.0);
        assert_relative_eq!(plane.signed_distance(&Vec3::new(0.0, 0.0, 0.0)), -2.0);
        assert_relative_eq!(
            plane.project_point(&Vec3::new(1.0, 7.0, 1.0)),
            Vec3::new(1.0, 2.0, 1.0)
        );
    }

    #[test]
    fn test_plane_from_points_ccw() {
        let plane = Plane::from_points(Vec3::zeros(), Vec3::x(), Vec3::y()).unwrap();
        assert_relative_eq!(plane.normal, Vec3::z());
        assert!(Plane::from_points(Vec3::zeros(), Vec3::x(), Vec3::x() * 2.0).is_none());
    }

    #[test]
    fn test_plane_ray_parallel() {
        let plane = Plane::from_point_normal(Vec3::zeros(), Vec3::y());
        let parallel = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::x());
        assert!(plane.intersect_ray(&parallel, 1e-6).is_none());

        let down = Ray::new(Vec3::new(0.0, 4.0, 0.0), -Vec3::y());
        assert_relative_eq!(plane.intersect_ray(&down, 1e-6).unwrap(), 4.0);
    }

    #[test]
    fn test_ray_transformed_keeps_parameter() {
        let transform = Transform::from_position(Vec3::new(10.0, 0.0, 0.0))
            .with_scale(Vec3::new(2.0, 2.0, 2.0));
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), -Vec3::z());
        let local = ray.transformed(&transform.inverse_matrix());

        let t = 3.0;
        let world_point = ray.point_at(t);
        assert_relative_eq!(
            transform.transform_point(&local.point_at(t)),
            world_point,
            epsilon = EPSILON
        );
    }

    #[test]
    fn test_sphere_intersection_and_penetration() {
        let a = BoundingSphere::new(Vec3::zeros(), 5.0);
        let b = BoundingSphere::new(Vec3::new(8.0, 0.0, 0.0), 5.0);
        let c = BoundingSphere::new(Vec3::new(20.0, 0.0, 0.0), 1.0);

        assert!(a.intersects(&b));
        assert_relative_eq!(a.penetration_depth(&b), 2.0);
        assert!(!a.intersects(&c));
        assert_eq!(a.penetration_depth(&c), 0.0);
    }

    #[test]
    fn test_sphere_encapsulate_point() {
        let mut sphere = BoundingSphere::new(Vec3::zeros(), 1.0);
        sphere.encapsulate_point(&Vec3::new(3.0, 0.0, 0.0));

        assert_relative_eq!(sphere.radius, 2.0);
        assert_relative_eq!(sphere.center, Vec3::new(1.0, 0.0, 0.0));
        assert!(sphere.contains_point(&Vec3::new(-1.0, 0.0, 0.0)));
        assert!(sphere.contains_point(&Vec3::new(3.0, 0.0, 0.0)));
    }

    #[test]
    fn test_sphere_encapsulate_sphere() {
        let mut sphere = BoundingSphere::new(Vec3::zeros(), 1.0);
        sphere.encapsulate_sphere(&BoundingSphere::new(Vec3::new(4.0, 0.0, 0.0), 1.0));
        assert_relative_eq!(sphere.radius, 3.0);
        assert_relative_eq!(sphere.center, Vec3::new(2.0, 0.0, 0.0));

        // Already contained: unchanged
        let before = sphere;
        sphere.encapsulate_sphere(&BoundingSphere::new(Vec3::new(2.0, 0.0, 0.0), 0.5));
        assert_eq!(sphere, before);
    }

    #[test]
    fn test_sphere_ray_from_inside() {
        let sphere = BoundingSphere::new(Vec3::zeros(), 2.0);
        let ray = Ray::new(Vec3::zeros(), Vec3::x());
        let (t, point, normal) = sphere.intersect_ray(&ray).unwrap();
        assert_relative_eq!(t, 2.0);
        assert_relative_eq!(point, Vec3::new(2.0, 0.0, 0.0));
        assert_relative_eq!(normal, Vec3::x());
    }

    #[test]
    fn test_aabb_containment_and_encapsulation() {
        let mut aabb = Aabb::from_points(&[Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0)]).unwrap();
        assert!(aabb.contains_point(&Vec3::new(0.5, 0.5, 0.5)));
        assert!(!aabb.contains_point(&Vec3::new(1.5, 0.5, 0.5)));

        let other = Aabb::new(Vec3::new(2.0, 2.0, 2.0), Vec3::new(3.0, 3.0, 3.0));
        assert!(!aabb.intersects(&other));
        aabb.encapsulate_aabb(&other);
        assert!(aabb.contains_aabb(&other));
        assert_eq!(aabb.max, Vec3::new(3.0, 3.0, 3.0));
        assert!(Aabb::from_points(&[]).is_none());
    }

    #[test]
    fn test_aabb_transformed_rotation() {
        let aabb = Aabb::from_center_extents(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0));
        let transform = Transform::from_position_rotation(
            Vec3::zeros(),
            Quat::from_axis_angle(&Vec3::z_axis(), FRAC_PI_4),
        );
        let world = aabb.transformed(&transform);
        let reach = 2.0f32.sqrt();
        assert_relative_eq!(world.max, Vec3::new(reach, reach, 1.0), epsilon = EPSILON);
    }

    #[test]
    fn test_obb_contains_and_bounds() {
        let aabb = Aabb::from_center_extents(Vec3::zeros(), Vec3::new(2.0, 0.5, 0.5));
        let transform = Transform::from_position_rotation(
            Vec3::new(1.0, 0.0, 0.0),
            Quat::from_axis_angle(&Vec3::z_axis(), FRAC_PI_4),
        );
        let obb = Obb::from_aabb(&aabb, &transform);

        // Along the rotated long axis
        let along = Vec3::new(1.0, 0.0, 0.0) + Vec3::new(1.0, 1.0, 0.0).normalize() * 1.9;
        assert!(obb.contains_point(&along));
        // Same distance along world X leaves the thin box
        assert!(!obb.contains_point(&Vec3::new(2.9, 0.0, 0.0)));

        let bounds = obb.to_aabb();
        let grown = Aabb::from_center_extents(bounds.center(), bounds.extents().add_scalar(EPSILON));
        for corner in obb.corners() {
            assert!(grown.contains_point(&corner));
        }
    }

    #[test]
    fn test_triangle_ray() {
        let triangle = Triangle::new(Vec3::zeros(), Vec3::x(), Vec3::y());
        let hit = Ray::new(Vec3::new(0.25, 0.25, 1.0), -Vec3::z());
        let miss = Ray::new(Vec3::new(1.0, 1.0, 1.0), -Vec3::z());

        let (t, u, v) = triangle.intersect_ray(&hit).unwrap();
        assert_relative_eq!(t, 1.0);
        assert_relative_eq!(u, 0.25);
        assert_relative_eq!(v, 0.25);
        assert!(triangle.intersect_ray(&miss).is_none());
        assert_relative_eq!(triangle.normal(), Vec3::z());
    }

    #[test]
    fn test_segment_closest_points_crossing() {
        let a = Segment::new(Vec3::new(-1.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        let b = Segment::new(Vec3::new(0.0, -1.0, 1.0), Vec3::new(0.0, 1.0, 1.0));
        let (pa, pb) = a.closest_points(&b);
        assert_relative_eq!(pa, Vec3::zeros(), epsilon = EPSILON);
        assert_relative_eq!(pb, Vec3::new(0.0, 0.0, 1.0), epsilon = EPSILON);
    }

    #[test]
    fn test_segment_closest_points_clamped() {
        let a = Segment::new(Vec3::zeros(), Vec3::x());
        let b = Segment::new(Vec3::new(3.0, 1.0, 0.0), Vec3::new(3.0, 2.0, 0.0));
        let (pa, pb) = a.closest_points(&b);
        assert_relative_eq!(pa, Vec3::x(), epsilon = EPSILON);
        assert_relative_eq!(pb, Vec3::new(3.0, 1.0, 0.0), epsilon = EPSILON);
    }
}
