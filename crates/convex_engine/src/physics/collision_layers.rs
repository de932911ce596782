//! Layer and mask filtering for hull colliders (GEA 13.3.8)
//!
//! Every collider has a layer (what it is) and a mask (what it wants to hit).
//! A pair is tested only when each side's layer is in the other side's mask.

use bitflags::bitflags;

bitflags! {
    /// Collision layer and mask bits
    ///
    /// Bits 8-31 are free for game-specific layers via
    /// [`CollisionLayers::from_bits_retain`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CollisionLayers: u32 {
        /// Player character layer
        const PLAYER = 1 << 0;
        /// Enemy character layer
        const ENEMY = 1 << 1;
        /// Projectiles (bullets, missiles, etc.)
        const PROJECTILE = 1 << 2;
        /// Static environment geometry
        const ENVIRONMENT = 1 << 3;
        /// Trigger volumes (no physical response)
        const TRIGGER = 1 << 4;
        /// Debris and small physics objects
        const DEBRIS = 1 << 5;
        /// All collision layers, custom bits included
        const ALL = u32::MAX;
    }
}

impl Default for CollisionLayers {
    fn default() -> Self {
        Self::ALL
    }
}

impl CollisionLayers {
    /// Whether a pair passes the filter: each layer must be in the other's mask
    ///
    /// ```
    /// use convex_engine::physics::CollisionLayers;
    ///
    /// // Debris rests on the environment but ignores other debris
    /// let debris_mask = CollisionLayers::ENVIRONMENT;
    /// let environment_mask = CollisionLayers::ALL;
    ///
    /// assert!(CollisionLayers::should_collide(
    ///     CollisionLayers::DEBRIS, debris_mask,
    ///     CollisionLayers::ENVIRONMENT, environment_mask,
    /// ));
    /// assert!(!CollisionLayers::should_collide(
    ///     CollisionLayers::DEBRIS, debris_mask,
    ///     CollisionLayers::DEBRIS, debris_mask,
    /// ));
    /// ```
    pub fn should_collide(layer_a: Self, mask_a: Self, layer_b: Self, mask_b: Self) -> bool {
        layer_a.intersects(mask_b) && layer_b.intersects(mask_a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projectile_hits_enemy() {
        let projectile_mask = CollisionLayers::ENEMY | CollisionLayers::ENVIRONMENT;
        let enemy_mask = CollisionLayers::PLAYER | CollisionLayers::PROJECTILE;
        assert!(CollisionLayers::should_collide(
            CollisionLayers::PROJECTILE,
            projectile_mask,
            CollisionLayers::ENEMY,
            enemy_mask,
        ));
    }

    #[test]
    fn test_filter_requires_both_masks() {
        // The trigger wants the player, the player ignores triggers
        let trigger_mask = CollisionLayers::PLAYER;
        let player_mask = CollisionLayers::ENEMY | CollisionLayers::ENVIRONMENT;
        assert!(!CollisionLayers::should_collide(
            CollisionLayers::TRIGGER,
            trigger_mask,
            CollisionLayers::PLAYER,
            player_mask,
        ));
    }

    #[test]
    fn test_should_collide_is_symmetric() {
        let layers = [
            CollisionLayers::PLAYER,
            CollisionLayers::TRIGGER,
            CollisionLayers::DEBRIS | CollisionLayers::ENVIRONMENT,
        ];
        for &a in &layers {
            for &b in &layers {
                assert_eq!(
                    CollisionLayers::should_collide(a, b, b, a),
                    CollisionLayers::should_collide(b, a, a, b)
                );
            }
        }
    }

    #[test]
    fn test_empty_mask_collides_with_nothing() {
        assert!(!CollisionLayers::should_collide(
            CollisionLayers::PLAYER,
            CollisionLayers::empty(),
            CollisionLayers::ENEMY,
            CollisionLayers::ALL,
        ));
    }

    #[test]
    fn test_custom_layer_bits() {
        let custom = CollisionLayers::from_bits_retain(1 << 12);
        assert!(CollisionLayers::ALL.contains(custom));
        assert!(CollisionLayers::should_collide(
            custom,
            CollisionLayers::ALL,
            CollisionLayers::DEBRIS,
            custom,
        ));
    }
}
