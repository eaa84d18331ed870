//! Ledge catalog - every ledge marker in the current level
//!
//! Built once per level from the spawned platform hierarchy and shared read-only
//! with every AI instance. A catalog built for another level reads as empty, so a
//! level change never exposes stale ledges while the rebuild is pending.

use std::sync::Arc;

use bevy::prelude::*;

use crate::world::LedgeMarker;

/// Resource holding the ledge markers of the level it was built for
#[derive(Resource, Clone, Debug)]
pub struct LedgeCatalog {
    /// Level ID the catalog was built for (None = never built)
    built_for_level: Option<String>,
    ledges: Arc<[LedgeMarker]>,
}

impl Default for LedgeCatalog {
    fn default() -> Self {
        Self {
            built_for_level: None,
            ledges: Arc::from(Vec::new()),
        }
    }
}

impl LedgeCatalog {
    /// Ledges for `level_id`, or an empty slice if the catalog belongs to another level
    pub fn ledges_for(&self, level_id: &str) -> &[LedgeMarker] {
        if self.is_built_for(level_id) {
            &self.ledges
        } else {
            &[]
        }
    }

    /// Shared handle to the current snapshot, independent of later rebuilds
    pub fn snapshot(&self) -> Arc<[LedgeMarker]> {
        Arc::clone(&self.ledges)
    }

    pub fn is_built_for(&self, level_id: &str) -> bool {
        self.built_for_level.as_deref() == Some(level_id)
    }

    pub fn built_for_level(&self) -> Option<&str> {
        self.built_for_level.as_deref()
    }

    pub fn len(&self) -> usize {
        self.ledges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ledges.is_empty()
    }

    /// Replace the catalog wholesale with a fresh scan of `level_id`
    pub fn rebuild(&mut self, level_id: &str, ledges: Vec<LedgeMarker>) {
        self.ledges = Arc::from(ledges);
        self.built_for_level = Some(level_id.to_string());
    }

    /// Rebuild only when the level differs from the one already cataloged.
    /// Returns true if `scan` ran.
    pub fn refresh_with<F>(&mut self, level_id: &str, scan: F) -> bool
    where
        F: FnOnce() -> Vec<LedgeMarker>,
    {
        if self.is_built_for(level_id) {
            return false;
        }
        self.rebuild(level_id, scan());
        true
    }

    /// Forget the current level; the next refresh always rescans
    pub fn invalidate(&mut self) {
        self.built_for_level = None;
        self.ledges = Arc::from(Vec::new());
    }
}
