//! Global pursuit tuning settings loaded from JSON

use bevy::log::warn;
use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::constants::*;

// Serde default functions so partial config files stay valid
fn default_turn_cooldown() -> f32 {
    TURN_COOLDOWN
}
fn default_ledge_grab_distance() -> f32 {
    LEDGE_GRAB_DISTANCE
}
fn default_ledge_regrab_fraction() -> f32 {
    LEDGE_REGRAB_FRACTION
}
fn default_ledge_climb_height() -> f32 {
    LEDGE_CLIMB_HEIGHT
}
fn default_ledge_band_below() -> f32 {
    LEDGE_BAND_BELOW
}
fn default_ledge_band_above() -> f32 {
    LEDGE_BAND_ABOVE
}
fn default_ledge_target_tolerance() -> f32 {
    LEDGE_TARGET_TOLERANCE
}
fn default_gap_between_tolerance() -> f32 {
    GAP_BETWEEN_TOLERANCE
}
fn default_fall_ledge_height() -> f32 {
    FALL_LEDGE_HEIGHT
}
fn default_ray_max_distance() -> f32 {
    RAY_MAX_DISTANCE
}
fn default_edge_probe_offset() -> f32 {
    EDGE_PROBE_OFFSET
}
fn default_edge_probe_drop() -> f32 {
    EDGE_PROBE_DROP
}
fn default_ground_probe_height() -> f32 {
    GROUND_PROBE_HEIGHT
}
fn default_ground_probe_sidestep() -> f32 {
    GROUND_PROBE_SIDESTEP
}
fn default_obstacle_probe_height() -> f32 {
    OBSTACLE_PROBE_HEIGHT
}
fn default_aim_height() -> f32 {
    AIM_HEIGHT
}
fn default_lookahead_height() -> f32 {
    LOOKAHEAD_HEIGHT
}
fn default_run_step() -> f32 {
    RUN_STEP
}
fn default_edge_lookahead_steps() -> [f32; 2] {
    EDGE_LOOKAHEAD_STEPS
}
fn default_jump_trigger_distance() -> f32 {
    JUMP_TRIGGER_DISTANCE
}
fn default_retreat_distance() -> f32 {
    RETREAT_DISTANCE
}
fn default_slide_distance_factor() -> f32 {
    SLIDE_DISTANCE_FACTOR
}
fn default_stack_distance() -> f32 {
    STACK_DISTANCE
}
fn default_settle_drop() -> f32 {
    SETTLE_DROP
}
fn default_probe_layers() -> u32 {
    LAYER_PLATFORM
}

/// Path to global pursuit tuning config
pub const PURSUIT_TUNING_FILE: &str = "config/pursuit_tuning.json";

/// Decision thresholds shared by every pursuit policy in the app.
///
/// Every field falls back to its constant when missing from the config file.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PursuitTuning {
    #[serde(default = "default_turn_cooldown")]
    pub turn_cooldown: f32,
    #[serde(default = "default_ledge_grab_distance")]
    pub ledge_grab_distance: f32,
    #[serde(default = "default_ledge_regrab_fraction")]
    pub ledge_regrab_fraction: f32,
    #[serde(default = "default_ledge_climb_height")]
    pub ledge_climb_height: f32,
    #[serde(default = "default_ledge_band_below")]
    pub ledge_band_below: f32,
    #[serde(default = "default_ledge_band_above")]
    pub ledge_band_above: f32,
    #[serde(default = "default_ledge_target_tolerance")]
    pub ledge_target_tolerance: f32,
    #[serde(default = "default_gap_between_tolerance")]
    pub gap_between_tolerance: f32,
    #[serde(default = "default_fall_ledge_height")]
    pub fall_ledge_height: f32,
    #[serde(default = "default_ray_max_distance")]
    pub ray_max_distance: f32,
    #[serde(default = "default_edge_probe_offset")]
    pub edge_probe_offset: f32,
    #[serde(default = "default_edge_probe_drop")]
    pub edge_probe_drop: f32,
    #[serde(default = "default_ground_probe_height")]
    pub ground_probe_height: f32,
    #[serde(default = "default_ground_probe_sidestep")]
    pub ground_probe_sidestep: f32,
    #[serde(default = "default_obstacle_probe_height")]
    pub obstacle_probe_height: f32,
    #[serde(default = "default_aim_height")]
    pub aim_height: f32,
    #[serde(default = "default_lookahead_height")]
    pub lookahead_height: f32,
    #[serde(default = "default_run_step")]
    pub run_step: f32,
    #[serde(default = "default_edge_lookahead_steps")]
    pub edge_lookahead_steps: [f32; 2],
    #[serde(default = "default_jump_trigger_distance")]
    pub jump_trigger_distance: f32,
    #[serde(default = "default_retreat_distance")]
    pub retreat_distance: f32,
    #[serde(default = "default_slide_distance_factor")]
    pub slide_distance_factor: f32,
    #[serde(default = "default_stack_distance")]
    pub stack_distance: f32,
    #[serde(default = "default_settle_drop")]
    pub settle_drop: f32,
    /// Collision layers every probe ray tests against
    #[serde(default = "default_probe_layers")]
    pub probe_layers: u32,
}

impl Default for PursuitTuning {
    fn default() -> Self {
        Self {
            turn_cooldown: default_turn_cooldown(),
            ledge_grab_distance: default_ledge_grab_distance(),
            ledge_regrab_fraction: default_ledge_regrab_fraction(),
            ledge_climb_height: default_ledge_climb_height(),
            ledge_band_below: default_ledge_band_below(),
            ledge_band_above: default_ledge_band_above(),
            ledge_target_tolerance: default_ledge_target_tolerance(),
            gap_between_tolerance: default_gap_between_tolerance(),
            fall_ledge_height: default_fall_ledge_height(),
            ray_max_distance: default_ray_max_distance(),
            edge_probe_offset: default_edge_probe_offset(),
            edge_probe_drop: default_edge_probe_drop(),
            ground_probe_height: default_ground_probe_height(),
            ground_probe_sidestep: default_ground_probe_sidestep(),
            obstacle_probe_height: default_obstacle_probe_height(),
            aim_height: default_aim_height(),
            lookahead_height: default_lookahead_height(),
            run_step: default_run_step(),
            edge_lookahead_steps: default_edge_lookahead_steps(),
            jump_trigger_distance: default_jump_trigger_distance(),
            retreat_distance: default_retreat_distance(),
            slide_distance_factor: default_slide_distance_factor(),
            stack_distance: default_stack_distance(),
            settle_drop: default_settle_drop(),
            probe_layers: default_probe_layers(),
        }
    }
}

impl PursuitTuning {
    /// Distance under which a ledge counts as the one the AI just left
    pub fn regrab_distance(&self) -> f32 {
        self.ledge_grab_distance * self.ledge_regrab_fraction
    }
}

pub fn load_pursuit_tuning_from_file(path: &str) -> Result<PursuitTuning, String> {
    let contents =
        std::fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", path, e))?;
    parse_pursuit_tuning(&contents).map_err(|e| format!("Failed to parse {}: {}", path, e))
}

pub fn parse_pursuit_tuning(contents: &str) -> Result<PursuitTuning, serde_json::Error> {
    serde_json::from_str(contents)
}

pub fn apply_global_tuning(tuning: &mut PursuitTuning) -> Result<(), String> {
    match load_pursuit_tuning_from_file(PURSUIT_TUNING_FILE) {
        Ok(loaded) => {
            *tuning = loaded;
            Ok(())
        }
        Err(err) => {
            *tuning = PursuitTuning::default();
            Err(err)
        }
    }
}

pub fn load_global_tuning_system(mut tuning: bevy::prelude::ResMut<PursuitTuning>) {
    if let Err(err) = apply_global_tuning(&mut tuning) {
        warn!("{}, using default pursuit tuning", err);
    }
}
