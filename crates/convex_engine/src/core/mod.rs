//! # Core Engine Module
//!
//! Shared abstractions that the physics subsystems depend on.
//!
//! ## Organization
//!
//! - **Config**: Unified configuration for every physics subsystem

pub mod config;

// Re-export foundation modules for convenience
pub use crate::foundation;

// Re-export commonly used config types
pub use config::{
    PhysicsConfig,
    EngineConfig,
    HullBuildConfig,
    SatConfig,
    RayCastConfig,
    Config,
    ConfigError,
    ConfigFormat,
};
