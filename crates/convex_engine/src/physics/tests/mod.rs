//! Cross-module physics scenarios and shared fixtures
