//! Levels module - database, spawning, and level switching

mod database;
mod spawning;

pub use database::*;
pub use spawning::*;

use bevy::prelude::*;

use crate::world::LevelPlatform;

/// Current level ID (stable across file reordering)
#[derive(Resource, Default, Clone, Debug, PartialEq, Eq)]
pub struct CurrentLevel(pub String);

/// Level whose geometry is currently spawned (None = nothing spawned yet)
#[derive(Resource, Default, Debug)]
pub struct LoadedLevel(pub Option<String>);

impl LoadedLevel {
    pub fn is(&self, level_id: &str) -> bool {
        self.0.as_deref() == Some(level_id)
    }
}

/// Swap level geometry when the current level changes
pub fn sync_level_geometry(
    mut commands: Commands,
    current_level: Res<CurrentLevel>,
    level_db: Res<LevelDatabase>,
    mut loaded: ResMut<LoadedLevel>,
    roots: Query<Entity, (With<LevelPlatform>, Without<ChildOf>)>,
) {
    if loaded.is(&current_level.0) {
        return;
    }

    let removed = despawn_level_platforms(&mut commands, &roots);
    if removed > 0 {
        debug!("Despawned {} level platforms", removed);
    }

    match level_db.get_by_id(&current_level.0) {
        Some(level) => {
            let spawned = spawn_level_platforms(&mut commands, level);
            info!("Spawned level '{}' ({} platforms)", level.id, spawned.len());
        }
        None => {
            warn!("Unknown level '{}', no geometry spawned", current_level.0);
        }
    }

    loaded.0 = Some(current_level.0.clone());
}
