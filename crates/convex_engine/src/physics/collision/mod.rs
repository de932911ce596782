//! Convex hull collision geometry and queries
//!
//! # Architecture
//!
//! This module follows Game Engine Architecture 3rd Edition (GEA 13.3.4):
//! - **Model Space Storage**: Hulls are stored in local coordinates
//! - **On-Demand Transformation**: Hulls are placed in world space only during queries
//! - **Coordinate Decoupling**: Hull geometry is separate from the owner's transform
//!
//! # Module Organization
//!
//! - [`primitives`] - Basic geometric primitives (rays, planes, bounds, triangles)
//! - [`half_edge`] - Half-edge convex hull and its builder
//! - [`point_cloud`] - Hull construction from raw point clouds
//! - [`ray_cast`] - Ray against polygon and hull
//! - [`sat`] - Separating-axis test and contact manifolds

pub mod primitives;
pub mod half_edge;
pub mod point_cloud;
pub mod ray_cast;
pub mod sat;

// Re-export commonly used types
pub use primitives::{Aabb, BoundingSphere, Obb, Plane, Ray, Segment, Triangle};
pub use half_edge::{ConvexHull, Face, HalfEdge, HullBuildError, HullBuilder};
pub use ray_cast::{
    intersect_ray_convex_hull,
    intersect_ray_convex_hull_with_config,
    intersect_ray_convex_polygon,
    intersect_ray_convex_polygon_with_config,
    HullRayHit,
    PolygonHit,
};
pub use sat::{
    intersect_convex_hulls_sat,
    intersect_convex_hulls_sat_with_config,
    CollisionType,
    ContactFeature,
    ContactManifold,
    ContactPoint,
    FeatureId,
    ReferenceHull,
    SatStats,
};
