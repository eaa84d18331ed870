//! Bevy systems that drive the pursuit AI each frame

use bevy::prelude::*;

use super::{
    ActorView, LedgeCatalog, MotionInput, PursuitAi, TargetKind, TargetView, TickContext,
};
use crate::actor::{Collectible, Facing, Health, Sliding, Velocity};
use crate::levels::{CurrentLevel, LevelDatabase, LoadedLevel, sync_level_geometry};
use crate::tuning::{PursuitTuning, load_global_tuning_system};
use crate::world::{
    CollisionLayers, Ledge, Platform, build_platform_scene, collect_ledge_markers,
};

/// Registers the pursuit AI resources and its Update chain:
/// level geometry sync, catalog refresh, decisions, facing.
pub struct PursuitAiPlugin;

impl Plugin for PursuitAiPlugin {
    fn build(&self, app: &mut App) {
        // Apps that insert their own tuning keep it; otherwise load the config file
        if !app.world().contains_resource::<PursuitTuning>() {
            app.init_resource::<PursuitTuning>();
            app.add_systems(Startup, load_global_tuning_system);
        }

        app.init_resource::<CurrentLevel>()
            .init_resource::<LoadedLevel>()
            .init_resource::<LedgeCatalog>()
            .add_systems(
                Update,
                (
                    sync_level_geometry.run_if(resource_exists::<LevelDatabase>),
                    refresh_ledge_catalog,
                    pursuit_decision_update,
                    apply_facing_requests,
                )
                    .chain(),
            );
    }
}

/// Rebuild the ledge catalog once the current level's geometry is in place
pub fn refresh_ledge_catalog(
    current_level: Res<CurrentLevel>,
    loaded: Res<LoadedLevel>,
    level_db: Option<Res<LevelDatabase>>,
    mut catalog: ResMut<LedgeCatalog>,
    ledges: Query<(Entity, &ChildOf), With<Ledge>>,
    nodes: Query<(&Transform, Option<&ChildOf>)>,
) {
    if catalog.is_built_for(&current_level.0) {
        return;
    }

    // Geometry for the new level spawns through commands; wait until it has landed
    if level_db.is_some() && !loaded.is(&current_level.0) {
        debug!("Ledge catalog waiting for level '{}' geometry", current_level.0);
        return;
    }

    catalog.rebuild(&current_level.0, collect_ledge_markers(&ledges, &nodes));
    if catalog.is_empty() {
        debug!("Level '{}' has no ledge markers", current_level.0);
    } else {
        info!(
            "Rebuilt ledge catalog for level '{}': {} ledges",
            current_level.0,
            catalog.len()
        );
    }
}

fn target_kind(health: Option<&Health>, collectible: bool) -> TargetKind {
    match (health, collectible) {
        (_, true) => TargetKind::Collectible,
        (Some(health), false) => TargetKind::Combatant { health: health.0 },
        (None, false) => TargetKind::Other,
    }
}

/// Run every AI's policy for this frame and write its motion input
pub fn pursuit_decision_update(
    time: Res<Time>,
    tuning: Res<PursuitTuning>,
    catalog: Res<LedgeCatalog>,
    current_level: Res<CurrentLevel>,
    level_db: Option<Res<LevelDatabase>>,
    mut ai_query: Query<(
        &Transform,
        &Facing,
        &Velocity,
        &Sliding,
        &mut PursuitAi,
        &mut MotionInput,
    )>,
    targets: Query<(&Transform, Option<&Health>, Has<Collectible>)>,
    platforms: Query<(Entity, &Platform, &CollisionLayers, Option<&ChildOf>)>,
    ledges: Query<(Entity, &ChildOf), With<Ledge>>,
    nodes: Query<(&Transform, Option<&ChildOf>)>,
) {
    if ai_query.is_empty() {
        return;
    }

    let scene = build_platform_scene(&platforms, &ledges, &nodes);
    let origin_x = level_db
        .as_deref()
        .and_then(|db| db.get_by_id(&current_level.0))
        .map_or(0.0, |level| level.origin_x);
    let ctx = TickContext {
        scene: &scene,
        ledges: catalog.ledges_for(&current_level.0),
        tuning: &tuning,
        origin_x,
        dt: time.delta_secs(),
    };

    for (transform, facing, velocity, sliding, mut ai, mut input) in &mut ai_query {
        let me = ActorView {
            position: transform.translation,
            facing_right: facing.is_right(),
            vertical_velocity: velocity.0.y,
            sliding: sliding.0,
        };
        let target = ai
            .target
            .and_then(|entity| targets.get(entity).ok())
            .map(|(target_transform, health, collectible)| TargetView {
                position: target_transform.translation,
                kind: target_kind(health, collectible),
            });

        let trace = ai
            .policy
            .choose_action(&me, target.as_ref(), &ctx, &mut *input);
        ai.last_trace = trace;
    }
}

/// Turn actors toward the side their AI asked for
pub fn apply_facing_requests(mut query: Query<(&mut MotionInput, &mut Facing)>) {
    for (mut input, mut facing) in &mut query {
        if let Some(right) = input.face_request {
            facing.0 = if right { 1.0 } else { -1.0 };
            input.face_request = None;
        }
    }
}
