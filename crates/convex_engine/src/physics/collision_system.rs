//! Hull collision system
//!
//! Based on Game Engine Architecture 3rd Edition, Chapter 13:
//! "The collision detection system is typically split into two phases:
//! broad-phase and narrow-phase."
//!
//! Colliders reference shared hulls in a [`HullRegistry`] and carry their own
//! world [`Transform`]. Every frame, [`HullCollisionSystem::detect_collisions`]
//! walks all collider pairs, filters them by layer and by world bounding
//! spheres, then runs the SAT on the survivors. There is no spatial
//! partition; callers with many colliders should cull before registering.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::collision::half_edge::ConvexHull;
use super::collision::primitives::{BoundingSphere, Ray};
use super::collision::ray_cast::{intersect_ray_convex_hull_with_config, HullRayHit};
use super::collision::sat::{intersect_convex_hulls_sat_with_config, ContactManifold};
use super::collision_layers::CollisionLayers;
use super::hull_registry::{HullHandle, HullRegistry};
use super::mass_properties::{compute_mass_properties, MassProperties};
use super::PhysicsError;
use crate::core::config::PhysicsConfig;
use crate::foundation::collections::HandleMap;
use crate::foundation::math::Transform;

slotmap::new_key_type! {
    /// Handle to a collider registered with a [`HullCollisionSystem`]
    pub struct ColliderHandle;
}

/// Two colliders that are touching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CollisionPair {
    /// Lower of the two handles
    pub collider_a: ColliderHandle,
    /// Higher of the two handles
    pub collider_b: ColliderHandle,
}

impl CollisionPair {
    /// Create a new collision pair (always stores the smaller handle first for consistency)
    pub fn new(collider_a: ColliderHandle, collider_b: ColliderHandle) -> Self {
        if collider_a < collider_b {
            Self { collider_a, collider_b }
        } else {
            Self { collider_a: collider_b, collider_b: collider_a }
        }
    }

    /// Whether the pair involves `collider`
    pub fn contains(&self, collider: ColliderHandle) -> bool {
        self.collider_a == collider || self.collider_b == collider
    }
}

/// Nearest collider hit by a ray
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    /// Collider that was hit
    pub collider: ColliderHandle,
    /// Hit details in world space
    pub hit: HullRayHit,
}

/// Collider data stored by the collision system
#[derive(Debug, Clone)]
struct ColliderData {
    hull_handle: HullHandle,
    hull: Arc<ConvexHull>,
    transform: Transform,
    layer: CollisionLayers,
    mask: CollisionLayers,
    world_sphere: BoundingSphere,
}

impl ColliderData {
    fn update_world_sphere(&mut self) {
        let local = self.hull.local_bounding_sphere();
        self.world_sphere = BoundingSphere::new(
            self.transform.transform_point(&local.center),
            local.radius * self.transform.max_scale(),
        );
    }
}

/// Narrow-phase collision system over convex hull colliders (GEA 13.3)
#[derive(Debug)]
pub struct HullCollisionSystem {
    registry: HullRegistry,
    config: PhysicsConfig,
    colliders: HandleMap<ColliderHandle, ColliderData>,
    current_pairs: HashSet<CollisionPair>,
    previous_pairs: HashSet<CollisionPair>,
    manifolds: HashMap<CollisionPair, ContactManifold>,
    /// Log per-frame collision statistics
    pub debug_enabled: bool,
}

impl HullCollisionSystem {
    /// Collision system over `registry` with default tolerances
    pub fn new(registry: HullRegistry) -> Self {
        Self {
            registry,
            config: PhysicsConfig::default(),
            colliders: HandleMap::with_key(),
            current_pairs: HashSet::new(),
            previous_pairs: HashSet::new(),
            manifolds: HashMap::new(),
            debug_enabled: false,
        }
    }

    /// Collision system with validated tolerances
    pub fn with_config(registry: HullRegistry, config: PhysicsConfig) -> Result<Self, PhysicsError> {
        config.validate()?;
        let debug_enabled = config.engine.debug_mode;
        Ok(Self {
            config,
            debug_enabled,
            ..Self::new(registry)
        })
    }

    /// Hull registry backing the colliders
    pub fn registry(&self) -> &HullRegistry {
        &self.registry
    }

    /// Mutable access for registering or releasing hulls
    ///
    /// Colliders keep their own `Arc`, so releasing a hull in use does not
    /// invalidate them.
    pub fn registry_mut(&mut self) -> &mut HullRegistry {
        &mut self.registry
    }

    /// Register a collider for a registered hull
    pub fn register_collider(
        &mut self,
        hull_handle: HullHandle,
        transform: Transform,
        layer: CollisionLayers,
        mask: CollisionLayers,
    ) -> Result<ColliderHandle, PhysicsError> {
        let hull = self
            .registry
            .get(hull_handle)
            .ok_or(PhysicsError::UnknownHull(hull_handle))?;

        let mut collider = ColliderData {
            hull_handle,
            hull,
            transform,
            layer,
            mask,
            world_sphere: BoundingSphere::new(transform.position, 0.0),
        };
        collider.update_world_sphere();

        let handle = self.colliders.insert(collider);
        log::debug!("Registered collider {:?} for hull {:?}", handle, hull_handle);
        Ok(handle)
    }

    /// Unregister a collider; its pairs report as exited on the next detection
    pub fn unregister_collider(&mut self, handle: ColliderHandle) -> Result<(), PhysicsError> {
        self.colliders
            .remove(handle)
            .ok_or(PhysicsError::UnknownCollider(handle))?;
        log::debug!("Unregistered collider {:?}", handle);
        Ok(())
    }

    /// Move a collider
    pub fn set_transform(&mut self, handle: ColliderHandle, transform: Transform) -> Result<(), PhysicsError> {
        let collider = self
            .colliders
            .get_mut(handle)
            .ok_or(PhysicsError::UnknownCollider(handle))?;
        collider.transform = transform;
        collider.update_world_sphere();
        Ok(())
    }

    /// Current transform of a collider
    pub fn transform(&self, handle: ColliderHandle) -> Option<&Transform> {
        self.colliders.get(handle).map(|c| &c.transform)
    }

    /// Hull a collider was registered with
    pub fn hull_handle(&self, handle: ColliderHandle) -> Option<HullHandle> {
        self.colliders.get(handle).map(|c| c.hull_handle)
    }

    /// Perform collision detection for this frame
    pub fn detect_collisions(&mut self) -> &HashSet<CollisionPair> {
        // Move current pairs to previous
        std::mem::swap(&mut self.current_pairs, &mut self.previous_pairs);
        self.current_pairs.clear();
        self.manifolds.clear();

        let candidates = self.candidate_pairs();
        let candidate_count = candidates.len();

        for pair in candidates {
            let (Some(a), Some(b)) = (self.colliders.get(pair.collider_a), self.colliders.get(pair.collider_b)) else {
                continue;
            };
            let manifold = intersect_convex_hulls_sat_with_config(
                &a.hull,
                &a.transform,
                &b.hull,
                &b.transform,
                &self.config.sat,
            );
            if manifold.is_colliding() {
                self.current_pairs.insert(pair);
                self.manifolds.insert(pair, manifold);
            }
        }

        if self.debug_enabled {
            log::debug!(
                "Collision detection: {} colliders, {} candidate pairs, {} colliding",
                self.colliders.len(),
                candidate_count,
                self.current_pairs.len()
            );
        }

        &self.current_pairs
    }

    /// Pairs that pass the layer filter and overlap by bounding sphere
    fn candidate_pairs(&self) -> Vec<CollisionPair> {
        let colliders: Vec<(ColliderHandle, &ColliderData)> = self.colliders.iter().collect();
        let mut pairs = Vec::new();

        for (i, &(handle_a, a)) in colliders.iter().enumerate() {
            for &(handle_b, b) in &colliders[i + 1..] {
                if !CollisionLayers::should_collide(a.layer, a.mask, b.layer, b.mask) {
                    continue;
                }
                if !a.world_sphere.intersects(&b.world_sphere) {
                    continue;
                }
                pairs.push(CollisionPair::new(handle_a, handle_b));
            }
        }
        pairs
    }

    /// Pairs that started touching this frame
    pub fn collision_entered(&self) -> Vec<CollisionPair> {
        self.current_pairs
            .difference(&self.previous_pairs)
            .copied()
            .collect()
    }

    /// Pairs that stopped touching this frame
    pub fn collision_exited(&self) -> Vec<CollisionPair> {
        self.previous_pairs
            .difference(&self.current_pairs)
            .copied()
            .collect()
    }

    /// All pairs touching this frame
    pub fn current_collisions(&self) -> &HashSet<CollisionPair> {
        &self.current_pairs
    }

    /// Contact manifold of a touching pair, oriented from `collider_a`
    pub fn manifold(&self, pair: &CollisionPair) -> Option<&ContactManifold> {
        self.manifolds.get(pair)
    }

    /// Nearest collider hit by a ray on any layer
    pub fn raycast(&self, ray: &Ray) -> Option<RaycastHit> {
        self.raycast_filtered(ray, CollisionLayers::ALL)
    }

    /// Nearest collider on a layer in `mask` hit by a ray
    pub fn raycast_filtered(&self, ray: &Ray, mask: CollisionLayers) -> Option<RaycastHit> {
        self.colliders
            .iter()
            .filter(|(_, collider)| collider.layer.intersects(mask))
            .filter(|(_, collider)| collider.world_sphere.intersect_ray(ray).is_some())
            .filter_map(|(handle, collider)| {
                intersect_ray_convex_hull_with_config(ray, &collider.hull, &collider.transform, &self.config.ray)
                    .map(|hit| RaycastHit { collider: handle, hit })
            })
            .min_by(|x, y| x.hit.t.total_cmp(&y.hit.t))
    }

    /// Unit-density mass properties of a collider in body space
    ///
    /// The collider's scale is applied; position and rotation are not. A
    /// mirroring scale keeps the triangles wound outward.
    pub fn mass_properties(&self, handle: ColliderHandle) -> Result<MassProperties, PhysicsError> {
        let collider = self
            .colliders
            .get(handle)
            .ok_or(PhysicsError::UnknownCollider(handle))?;
        let scale = collider.transform.scale;
        let mirrored = scale.x * scale.y * scale.z < 0.0;

        let mut triangles = collider.hull.triangulate();
        for triangle in &mut triangles {
            triangle.v0.component_mul_assign(&scale);
            triangle.v1.component_mul_assign(&scale);
            triangle.v2.component_mul_assign(&scale);
            if mirrored {
                std::mem::swap(&mut triangle.v1, &mut triangle.v2);
            }
        }
        Ok(compute_mass_properties(&triangles))
    }

    /// Check if a collider is registered
    pub fn has_collider(&self, handle: ColliderHandle) -> bool {
        self.colliders.contains_key(handle)
    }

    /// Get the number of registered colliders
    pub fn collider_count(&self) -> usize {
        self.colliders.len()
    }

    /// Clear all colliders and collision state; the registry is kept
    pub fn clear(&mut self) {
        self.colliders.clear();
        self.current_pairs.clear();
        self.previous_pairs.clear();
        self.manifolds.clear();
    }
}
