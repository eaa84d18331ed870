//! TOML scenario file parsing

use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Complete scenario definition from TOML file
#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioDefinition {
    pub name: String,
    pub description: Option<String>,
    pub setup: ScenarioSetup,
    /// Position and state overrides applied before given ticks
    #[serde(default)]
    pub script: Vec<ScriptStep>,
    #[serde(default)]
    pub expect: ScenarioExpectations,
}

/// Scenario setup: level, policy and the two actors
#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioSetup {
    pub level: String,
    #[serde(default)]
    pub policy: PolicyKind,
    #[serde(default = "default_engagement_distance")]
    pub engagement_distance: f32,
    /// Tick length in seconds
    #[serde(default = "default_dt")]
    pub dt: f32,
    /// Minimum number of ticks to run (assertions may extend it)
    #[serde(default)]
    pub ticks: u64,
    pub ai: ActorDef,
    pub target: Option<TargetDef>,
    /// Tuning overrides in the same keys as the JSON config
    #[serde(default)]
    pub tuning: Option<toml::Table>,
}

fn default_engagement_distance() -> f32 {
    3.0
}

fn default_dt() -> f32 {
    1.0 / 60.0
}

fn default_facing_right() -> bool {
    true
}

fn default_health() -> f32 {
    100.0
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    #[default]
    Pursuit,
    Idle,
}

/// The AI-controlled actor
#[derive(Debug, Clone, Deserialize)]
pub struct ActorDef {
    pub x: f32,
    pub y: f32,
    #[serde(default = "default_facing_right")]
    pub facing_right: bool,
    #[serde(default)]
    pub sliding: bool,
    #[serde(default)]
    pub vertical_velocity: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    #[default]
    Combatant,
    Collectible,
    Marker,
}

/// The pursued entity
#[derive(Debug, Clone, Deserialize)]
pub struct TargetDef {
    #[serde(default, rename = "type")]
    pub target_type: TargetType,
    pub x: f32,
    pub y: f32,
    #[serde(default = "default_health")]
    pub health: f32,
}

/// State overrides applied right before tick `tick` runs
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScriptStep {
    pub tick: u64,
    pub ai_x: Option<f32>,
    pub ai_y: Option<f32>,
    pub ai_sliding: Option<bool>,
    pub ai_vertical_velocity: Option<f32>,
    pub target_x: Option<f32>,
    pub target_y: Option<f32>,
    pub target_health: Option<f32>,
    /// Despawn the target
    #[serde(default)]
    pub remove_target: bool,
    /// Switch the current level
    pub level: Option<String>,
}

/// Expected scenario outcomes
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScenarioExpectations {
    /// State assertions at different ticks (uses [[expect.state]] TOML syntax)
    #[serde(default)]
    pub state: Vec<StateAssertion>,
}

/// Checks evaluated after tick `after_tick` has run
#[derive(Debug, Clone, Deserialize)]
pub struct StateAssertion {
    pub after_tick: u64,
    #[serde(default)]
    pub checks: Vec<String>,
}

impl ScenarioDefinition {
    /// Last tick that has to run for every script step and assertion to apply
    pub fn last_tick(&self) -> u64 {
        let scripted = self.script.iter().map(|s| s.tick);
        let asserted = self.expect.state.iter().map(|s| s.after_tick);
        scripted
            .chain(asserted)
            .max()
            .unwrap_or(0)
            .max(self.setup.ticks.saturating_sub(1))
    }
}

/// Parse a scenario from TOML text
pub fn parse_scenario_str(content: &str) -> Result<ScenarioDefinition, String> {
    toml::from_str(content).map_err(|e| e.to_string())
}

/// Parse a scenario file from path
pub fn parse_scenario_file(path: &Path) -> Result<ScenarioDefinition, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;

    parse_scenario_str(&content).map_err(|e| format!("Failed to parse {}: {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic() {
        let toml = r#"
name = "Chase"
[setup]
level = "flat"
[setup.ai]
x = 0.0
y = 0.0
[setup.target]
x = 10.0
y = 0.0

[[expect.state]]
after_tick = 0
checks = ["ai.run = 1"]
"#;
        let def = parse_scenario_str(toml).unwrap();
        assert_eq!(def.name, "Chase");
        assert_eq!(def.setup.level, "flat");
        assert_eq!(def.setup.policy, PolicyKind::Pursuit);
        assert_eq!(def.setup.engagement_distance, 3.0);
        assert!(def.setup.ai.facing_right);
        let target = def.setup.target.as_ref().unwrap();
        assert_eq!(target.target_type, TargetType::Combatant);
        assert_eq!(target.health, 100.0);
        assert_eq!(def.expect.state[0].checks, vec!["ai.run = 1".to_string()]);
    }

    #[test]
    fn test_parse_script_and_tuning() {
        let toml = r#"
name = "Scripted"
[setup]
level = "gap"
policy = "idle"
ticks = 10
[setup.ai]
x = 1.0
y = 0.0
[setup.target]
type = "collectible"
x = 2.0
y = 0.0
[setup.tuning]
turn_cooldown = 0.25

[[script]]
tick = 4
target_x = -3.0
level = "flat"
"#;
        let def = parse_scenario_str(toml).unwrap();
        assert_eq!(def.setup.policy, PolicyKind::Idle);
        assert_eq!(def.setup.target.as_ref().unwrap().target_type, TargetType::Collectible);
        assert_eq!(def.script[0].target_x, Some(-3.0));
        assert_eq!(def.script[0].level.as_deref(), Some("flat"));
        assert!(!def.script[0].remove_target);
        assert!(def.setup.tuning.is_some());
        assert_eq!(def.last_tick(), 9);
    }

    #[test]
    fn test_missing_setup_is_error() {
        let err = parse_scenario_str("name = \"nothing\"").unwrap_err();
        assert!(err.contains("setup"), "got: {}", err);
    }
}
