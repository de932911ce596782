//! Registry of built convex hulls
//!
//! Owns every hull the engine knows about and hands out generation-checked
//! [`HullHandle`]s. Hulls are stored behind `Arc`, so a query that fetched a
//! hull keeps it alive even if the handle is released mid-frame.
//!
//! The registry is an ordinary value: create one per world and pass it to
//! whoever needs it. Hulls may be built on any thread and published later
//! with [`HullRegistry::insert`]; nothing half-built is ever visible.

use std::sync::Arc;

use super::collision::half_edge::{ConvexHull, HullBuildError, HullBuilder, VertexIndex};
use crate::core::config::HullBuildConfig;
use crate::foundation::collections::HandleMap;
use crate::foundation::math::Vec3;

slotmap::new_key_type! {
    /// Handle to a hull stored in a [`HullRegistry`]
    pub struct HullHandle;
}

/// Arena of shared, immutable convex hulls
#[derive(Debug, Default)]
pub struct HullRegistry {
    hulls: HandleMap<HullHandle, Arc<ConvexHull>>,
    builder: HullBuilder,
}

impl HullRegistry {
    /// Empty registry with the default build tolerances
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty registry that builds with the given tolerances
    pub fn with_config(config: HullBuildConfig) -> Self {
        Self {
            hulls: HandleMap::with_key(),
            builder: HullBuilder::with_config(config),
        }
    }

    /// Build a hull from a triangle soup and publish it
    ///
    /// Nothing is inserted when the build fails.
    pub fn build_and_insert(
        &mut self,
        vertices: &[Vec3],
        triangles: &[[VertexIndex; 3]],
    ) -> Result<HullHandle, HullBuildError> {
        let hull = self.builder.build(vertices, triangles)?;
        Ok(self.insert(hull))
    }

    /// Build the hull of a point cloud and publish it
    pub fn build_from_points_and_insert(&mut self, points: &[Vec3]) -> Result<HullHandle, HullBuildError> {
        let hull = self.builder.build_from_points(points)?;
        Ok(self.insert(hull))
    }

    /// Publish a fully built hull
    pub fn insert(&mut self, hull: impl Into<Arc<ConvexHull>>) -> HullHandle {
        let hull = hull.into();
        let faces = hull.faces().len();
        let handle = self.hulls.insert(hull);
        log::debug!("Registered hull {:?} ({} faces)", handle, faces);
        handle
    }

    /// Shared reference to a hull, `None` for released or foreign handles
    pub fn get(&self, handle: HullHandle) -> Option<Arc<ConvexHull>> {
        self.hulls.get(handle).cloned()
    }

    /// Whether the handle still refers to a hull
    pub fn contains(&self, handle: HullHandle) -> bool {
        self.hulls.contains_key(handle)
    }

    /// Remove a hull; outstanding `Arc`s stay valid
    pub fn release(&mut self, handle: HullHandle) -> Option<Arc<ConvexHull>> {
        let removed = self.hulls.remove(handle);
        if removed.is_some() {
            log::debug!("Released hull {:?}", handle);
        } else {
            log::warn!("Release of unknown hull handle {:?}", handle);
        }
        removed
    }

    /// Number of live hulls
    pub fn len(&self) -> usize {
        self.hulls.len()
    }

    /// Whether the registry holds no hulls
    pub fn is_empty(&self) -> bool {
        self.hulls.is_empty()
    }

    /// Iterate over live handles and their hulls
    pub fn iter(&self) -> impl Iterator<Item = (HullHandle, &Arc<ConvexHull>)> {
        self.hulls.iter()
    }
}
