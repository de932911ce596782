//! # Convex Engine
//!
//! Convex polyhedron physics core for a small 3D game engine.
//!
//! ## Features
//!
//! - **Half-Edge Hulls**: Triangle soups become convex polygon faces with twin links
//! - **Point Clouds**: Raw points are wrapped in their convex hull first
//! - **SAT Contacts**: Face and edge contact manifolds between placed hulls
//! - **Ray Casts**: Nearest-face picking against hulls in world space
//! - **Mass Properties**: Exact volume, center of mass and inertia tensor
//!
//! ## Quick Start
//!
//! ```rust
//! use convex_engine::prelude::*;
//!
//! fn main() -> Result<(), PhysicsError> {
//!     let vertices = [
//!         Vec3::new(0.0, 0.0, 0.0),
//!         Vec3::new(1.0, 0.0, 0.0),
//!         Vec3::new(0.0, 1.0, 0.0),
//!         Vec3::new(0.0, 0.0, 1.0),
//!     ];
//!     let triangles = [[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]];
//!
//!     let mut registry = HullRegistry::new();
//!     let tetrahedron = registry.build_and_insert(&vertices, &triangles)?;
//!
//!     let mut physics = HullCollisionSystem::new(registry);
//!     let a = physics.register_collider(tetrahedron, Transform::identity(), CollisionLayers::ALL, CollisionLayers::ALL)?;
//!     physics.register_collider(
//!         tetrahedron,
//!         Transform::from_position(Vec3::new(0.2, 0.2, 0.2)),
//!         CollisionLayers::ALL,
//!         CollisionLayers::ALL,
//!     )?;
//!
//!     assert_eq!(physics.detect_collisions().len(), 1);
//!     assert!(physics.mass_properties(a)?.mass > 0.0);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

// Core engine modules
pub mod core;

pub mod config;
pub mod foundation;
pub mod physics;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        core::{Config, PhysicsConfig},
        foundation::math::{Mat3, Quat, Transform, Vec3},
        physics::{
            collision::{
                intersect_convex_hulls_sat,
                intersect_ray_convex_hull,
                CollisionType,
                ContactManifold,
                ConvexHull,
                HullBuilder,
                Ray,
            },
            CollisionLayers,
            CollisionPair,
            ColliderHandle,
            HullCollisionSystem,
            HullHandle,
            HullRegistry,
            MassProperties,
            PhysicsError,
        },
    };
}
