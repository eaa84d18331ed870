//! Scenario execution engine

use bevy::prelude::*;

use crate::actor::{Actor, Collectible, Facing, Health, Sliding, Velocity};
use crate::ai::{LedgeCatalog, LedgeTrace, MotionInput, PursuitAi};
use crate::levels::{CurrentLevel, LevelDatabase};
use crate::simulation::HeadlessAppBuilder;
use crate::tuning::PursuitTuning;

use super::TEST_LEVELS_FILE;
use super::assertions::{AiSnapshot, AssertionError, LedgeSource, ScenarioState, check_state};
use super::parser::{
    ActorDef, PolicyKind, ScenarioDefinition, ScriptStep, TargetDef, TargetType,
};

/// Result of running a scenario
#[derive(Debug)]
pub enum TestResult {
    Pass { ticks: u64 },
    Fail { error: AssertionError },
    Error { message: String },
}

/// Run a scenario against the levels in the test level file
pub fn run_scenario(def: &ScenarioDefinition) -> TestResult {
    run_scenario_with_levels(def, LevelDatabase::load_from_file(TEST_LEVELS_FILE))
}

/// Run a scenario against an explicit level database
pub fn run_scenario_with_levels(def: &ScenarioDefinition, level_db: LevelDatabase) -> TestResult {
    let referenced = std::iter::once(&def.setup.level)
        .chain(def.script.iter().filter_map(|step| step.level.as_ref()));
    for level_id in referenced {
        if level_db.get_by_id(level_id).is_none() {
            return TestResult::Error {
                message: format!(
                    "Level '{}' not found. Available: {:?}",
                    level_id,
                    level_db.levels.iter().map(|l| &l.id).collect::<Vec<_>>()
                ),
            };
        }
    }

    let dt = def.setup.dt;
    if !dt.is_finite() || dt <= 0.0 {
        return TestResult::Error {
            message: format!("Tick length must be positive, got {}", dt),
        };
    }

    let tuning = match scenario_tuning(def.setup.tuning.as_ref()) {
        Ok(tuning) => tuning,
        Err(message) => return TestResult::Error { message },
    };

    let mut ai = match def.setup.policy {
        PolicyKind::Idle => PursuitAi::idle(),
        PolicyKind::Pursuit => {
            match PursuitAi::pursue(Entity::PLACEHOLDER, def.setup.engagement_distance) {
                Ok(ai) => ai,
                Err(err) => {
                    return TestResult::Error {
                        message: format!("Bad pursuit setup: {}", err),
                    };
                }
            }
        }
    };

    let mut app = HeadlessAppBuilder::for_level(def.setup.level.clone())
        .with_level_db(level_db)
        .with_tuning(tuning)
        .with_fps(1.0 / dt)
        .with_minimal_threads()
        .with_manual_time()
        .build();

    let target = def
        .setup
        .target
        .as_ref()
        .map(|target_def| spawn_target(app.world_mut(), target_def));
    ai.target = target;
    let ai_entity = spawn_ai(app.world_mut(), &def.setup.ai, ai);

    let last_tick = def.last_tick();
    for tick in 0..=last_tick {
        for step in def.script.iter().filter(|step| step.tick == tick) {
            apply_script_step(app.world_mut(), ai_entity, target, step);
        }

        app.update();

        let state = capture_state(app.world(), ai_entity, tick);
        for assertion in def.expect.state.iter().filter(|a| a.after_tick == tick) {
            if let Err(error) = check_state(assertion, &state) {
                return TestResult::Fail { error };
            }
        }
    }

    TestResult::Pass {
        ticks: last_tick + 1,
    }
}

/// Default tuning with the scenario's overrides layered on top
fn scenario_tuning(overrides: Option<&toml::Table>) -> Result<PursuitTuning, String> {
    match overrides {
        None => Ok(PursuitTuning::default()),
        Some(table) => toml::Value::Table(table.clone())
            .try_into::<PursuitTuning>()
            .map_err(|e| format!("Bad tuning overrides: {}", e)),
    }
}

fn spawn_target(world: &mut World, def: &TargetDef) -> Entity {
    let transform = Transform::from_xyz(def.x, def.y, 0.0);
    match def.target_type {
        TargetType::Combatant => world.spawn((Actor, transform, Health(def.health))).id(),
        TargetType::Collectible => world.spawn((transform, Collectible)).id(),
        TargetType::Marker => world.spawn(transform).id(),
    }
}

fn spawn_ai(world: &mut World, def: &ActorDef, ai: PursuitAi) -> Entity {
    world
        .spawn((
            Actor,
            Transform::from_xyz(def.x, def.y, 0.0),
            Facing(if def.facing_right { 1.0 } else { -1.0 }),
            Sliding(def.sliding),
            Velocity(Vec2::new(0.0, def.vertical_velocity)),
            ai,
        ))
        .id()
}

fn apply_script_step(world: &mut World, ai: Entity, target: Option<Entity>, step: &ScriptStep) {
    if let Some(mut transform) = world.get_mut::<Transform>(ai) {
        if let Some(x) = step.ai_x {
            transform.translation.x = x;
        }
        if let Some(y) = step.ai_y {
            transform.translation.y = y;
        }
    }
    if let (Some(sliding), Some(mut component)) = (step.ai_sliding, world.get_mut::<Sliding>(ai)) {
        component.0 = sliding;
    }
    if let (Some(vy), Some(mut velocity)) =
        (step.ai_vertical_velocity, world.get_mut::<Velocity>(ai))
    {
        velocity.0.y = vy;
    }

    if let Some(target) = target {
        if step.remove_target {
            world.despawn(target);
        } else if let Ok(mut entity) = world.get_entity_mut(target) {
            if let Some(mut transform) = entity.get_mut::<Transform>() {
                if let Some(x) = step.target_x {
                    transform.translation.x = x;
                }
                if let Some(y) = step.target_y {
                    transform.translation.y = y;
                }
            }
            if let Some(health) = step.target_health {
                entity.insert(Health(health));
            }
        }
    }

    if let Some(level) = &step.level {
        world.resource_mut::<CurrentLevel>().0 = level.clone();
    }
}

fn ledge_source(trace: &LedgeTrace) -> LedgeSource {
    match trace.chosen {
        None => LedgeSource::None,
        Some(_) if trace.falling => LedgeSource::Recovery,
        chosen if chosen == trace.blocking => LedgeSource::Blocking,
        chosen if chosen == trace.gap => LedgeSource::Gap,
        Some(_) => LedgeSource::None,
    }
}

fn snapshot_ai(world: &World, ai: Entity, catalog: &LedgeCatalog, level_id: &str) -> Option<AiSnapshot> {
    let transform = world.get::<Transform>(ai)?;
    let input = world.get::<MotionInput>(ai)?;
    let facing = world.get::<Facing>(ai)?;
    let trace = world.get::<PursuitAi>(ai)?.last_trace;
    let ledge_x = trace.chosen.and_then(|id| {
        catalog
            .ledges_for(level_id)
            .iter()
            .find(|ledge| ledge.id == id)
            .map(|ledge| ledge.position.x)
    });

    Some(AiSnapshot {
        x: transform.translation.x,
        y: transform.translation.y,
        run: input.move_x,
        jump: input.jump_held,
        slide: input.slide_held,
        facing_right: facing.is_right(),
        blocked: trace.line_blocked,
        falling: trace.falling,
        ledge: ledge_source(&trace),
        ledge_x,
    })
}

fn capture_state(world: &World, ai: Entity, tick: u64) -> ScenarioState {
    let catalog = world.resource::<LedgeCatalog>();
    let current_level = &world.resource::<CurrentLevel>().0;

    ScenarioState {
        tick,
        ai: snapshot_ai(world, ai, catalog, current_level),
        catalog_level: catalog.built_for_level().map(str::to_string),
        catalog_size: catalog.len(),
    }
}
