//! # Unified Configuration System
//!
//! Tolerances and tuning constants for the physics core, gathered in one
//! serializable structure so they can be tweaked from a TOML or RON file
//! without recompiling.
//!
//! ## Configuration Categories
//!
//! - **Engine Config**: logging behaviour
//! - **Hull Build Config**: coplanar face merging and point-cloud tolerance
//! - **SAT Config**: face/edge classification bias and numeric tolerances
//! - **Ray Cast Config**: parallel-ray and edge tolerances

use serde::{Serialize, Deserialize};

pub use crate::config::{Config, ConfigError, ConfigFormat};

fn check_positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("must be a positive finite number, got {value}"),
        })
    }
}

fn check_non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("must be a non-negative finite number, got {value}"),
        })
    }
}

/// # Hull Build Configuration
///
/// Controls how the half-edge builder decides that two neighbouring faces
/// lie in the same plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HullBuildConfig {
    /// Maximum per-component difference between two unit face normals for
    /// the faces to be merged
    pub coplanar_epsilon: f32,
    /// Distance, relative to the extent of a point cloud, below which a
    /// point counts as lying on a face plane
    pub point_cloud_epsilon: f32,
}

impl HullBuildConfig {
    /// Set the coplanarity tolerance
    pub fn with_coplanar_epsilon(mut self, epsilon: f32) -> Self {
        self.coplanar_epsilon = epsilon;
        self
    }

    /// Set the relative point-cloud tolerance
    pub fn with_point_cloud_epsilon(mut self, epsilon: f32) -> Self {
        self.point_cloud_epsilon = epsilon;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_positive("hull.coplanar_epsilon", self.coplanar_epsilon)?;
        check_positive("hull.point_cloud_epsilon", self.point_cloud_epsilon)
    }
}

impl Default for HullBuildConfig {
    fn default() -> Self {
        Self {
            coplanar_epsilon: 1e-5,
            point_cloud_epsilon: 1e-5,
        }
    }
}

/// # SAT Configuration
///
/// The biases are empirical: they keep the classification stable when a
/// face axis and an edge axis report nearly the same separation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SatConfig {
    /// An edge axis wins only if its separation exceeds the best face
    /// separation by more than this
    pub edge_bias: f32,
    /// Hull B provides the reference face only if its best face separation
    /// exceeds hull A's by more than this
    pub face_bias: f32,
    /// Squared sine of the angle between two edges below which they count
    /// as parallel and their cross product is skipped
    pub parallel_epsilon: f32,
    /// Slack allowed when keeping clipped points behind the reference plane
    pub contact_tolerance: f32,
}

impl SatConfig {
    /// Set the face/edge classification bias
    pub fn with_edge_bias(mut self, bias: f32) -> Self {
        self.edge_bias = bias;
        self
    }

    /// Set the reference-face bias between the two hulls
    pub fn with_face_bias(mut self, bias: f32) -> Self {
        self.face_bias = bias;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_non_negative("sat.edge_bias", self.edge_bias)?;
        check_non_negative("sat.face_bias", self.face_bias)?;
        check_positive("sat.parallel_epsilon", self.parallel_epsilon)?;
        check_non_negative("sat.contact_tolerance", self.contact_tolerance)
    }
}

impl Default for SatConfig {
    fn default() -> Self {
        Self {
            edge_bias: 1e-3,
            face_bias: 1e-3,
            parallel_epsilon: 1e-5,
            contact_tolerance: 1e-4,
        }
    }
}

/// # Ray Cast Configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RayCastConfig {
    /// Rays whose direction makes an angle with a face normal whose cosine
    /// is below this are treated as parallel to the face
    pub parallel_epsilon: f32,
    /// Distance a hit point may lie outside a polygon edge and still count,
    /// measured in the hull's object space
    pub edge_tolerance: f32,
}

impl RayCastConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_positive("ray.parallel_epsilon", self.parallel_epsilon)?;
        check_non_negative("ray.edge_tolerance", self.edge_tolerance)
    }
}

impl Default for RayCastConfig {
    fn default() -> Self {
        Self {
            parallel_epsilon: 1e-6,
            edge_tolerance: 1e-5,
        }
    }
}

/// # Engine Configuration
///
/// Core behaviour that affects the whole crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Default `env_logger` filter, e.g. `"info"` or `"convex_engine=debug"`
    pub log_level: String,
    /// Whether to enable debug features
    pub debug_mode: bool,
}

impl EngineConfig {
    /// Create a new engine configuration
    pub fn new() -> Self {
        Self {
            log_level: "info".to_string(),
            debug_mode: cfg!(debug_assertions),
        }
    }

    /// Set log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Enable debug mode
    pub fn with_debug(mut self, enabled: bool) -> Self {
        self.debug_mode = enabled;
        self
    }

    /// Install the global logger with `log_level` as the default filter
    ///
    /// `RUST_LOG` still wins when set. Later calls are ignored.
    pub fn init_logging(&self) {
        crate::foundation::logging::init_with_level(&self.log_level);
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Complete Physics Configuration
///
/// Top-level configuration that encompasses every subsystem of the core.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Engine core configuration
    pub engine: EngineConfig,
    /// Hull construction configuration
    pub hull: HullBuildConfig,
    /// SAT collision configuration
    pub sat: SatConfig,
    /// Ray cast configuration
    pub ray: RayCastConfig,
}

impl PhysicsConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.hull.validate()?;
        self.sat.validate()?;
        self.ray.validate()
    }
}

impl Config for PhysicsConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(PhysicsConfig::default().validate().is_ok());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = PhysicsConfig {
            engine: EngineConfig::new().with_log_level("convex_engine=trace"),
            sat: SatConfig::default().with_edge_bias(0.01),
            ..Default::default()
        };

        let text = config.to_string_with_format(ConfigFormat::Toml).unwrap();
        let parsed = PhysicsConfig::from_str_with_format(&text, ConfigFormat::Toml).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_ron_round_trip() {
        let config = PhysicsConfig {
            hull: HullBuildConfig::default().with_coplanar_epsilon(1e-4),
            ..Default::default()
        };

        let text = config.to_string_with_format(ConfigFormat::Ron).unwrap();
        let parsed = PhysicsConfig::from_str_with_format(&text, ConfigFormat::Ron).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed = PhysicsConfig::from_str_with_format("[sat]\nedge_bias = 0.5\n", ConfigFormat::Toml).unwrap();
        assert_eq!(parsed.sat.edge_bias, 0.5);
        assert_eq!(parsed.sat.face_bias, SatConfig::default().face_bias);
        assert_eq!(parsed.hull, HullBuildConfig::default());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = PhysicsConfig::default();
        config.hull.coplanar_epsilon = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "hull.coplanar_epsilon", .. })
        ));

        let mut config = PhysicsConfig::default();
        config.hull.point_cloud_epsilon = -1.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "hull.point_cloud_epsilon", .. })
        ));

        let mut config = PhysicsConfig::default();
        config.sat.edge_bias = f32::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_init_logging_is_idempotent() {
        let engine = EngineConfig::new().with_log_level("convex_engine=debug");
        engine.init_logging();
        engine.init_logging();
        log::debug!("logger installed");
    }

    #[test]
    fn test_unsupported_extension() {
        let result = PhysicsConfig::load_from_file("physics.json");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }
}
