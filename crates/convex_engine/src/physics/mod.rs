//! Physics module for convex hull collision detection
//!
//! Builds immutable half-edge hulls, tests them against rays and each other
//! and integrates their mass properties for a rigid-body solver.

pub mod collision;
pub mod collision_layers;
pub mod collision_system;
pub mod hull_registry;
pub mod mass_properties;

#[cfg(test)]
mod tests;

pub use collision::{
    CollisionType,
    ContactManifold,
    ConvexHull,
    HullBuildError,
    HullBuilder,
    Ray,
};
pub use collision_layers::CollisionLayers;
pub use collision_system::{CollisionPair, ColliderHandle, HullCollisionSystem, RaycastHit};
pub use hull_registry::{HullHandle, HullRegistry};
pub use mass_properties::{compute_mass_properties, MassProperties};

use crate::config::ConfigError;

/// Physics errors
#[derive(thiserror::Error, Debug)]
pub enum PhysicsError {
    /// Hull handle was released or never issued
    #[error("Unknown hull handle: {0:?}")]
    UnknownHull(HullHandle),

    /// Collider handle was unregistered or never issued
    #[error("Unknown collider handle: {0:?}")]
    UnknownCollider(ColliderHandle),

    /// Hull construction failed
    #[error("Hull build failed: {0}")]
    Build(#[from] HullBuildError),

    /// Invalid physics configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
