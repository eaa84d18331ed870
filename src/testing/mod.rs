//! Scenario testing system for deterministic AI testing
//!
//! Scenarios are TOML files that place an AI and its target in a level,
//! optionally script changes between ticks, and check the AI's decisions
//! after chosen ticks in a headless app.

pub mod assertions;
pub mod parser;
pub mod runner;

use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

pub use assertions::{AiSnapshot, AssertionError, LedgeSource, ScenarioState, check_state};
pub use parser::{
    ScenarioDefinition, ScenarioSetup, ScriptStep, StateAssertion, parse_scenario_file,
    parse_scenario_str,
};
pub use runner::{TestResult, run_scenario, run_scenario_with_levels};

/// Default path for test scenarios
pub const SCENARIOS_DIR: &str = "tests/scenarios";

/// Default path for test levels
pub const TEST_LEVELS_FILE: &str = "config/test_levels.txt";

/// Find scenario files under `base`, sorted, keeping paths that contain `filter`
pub fn discover_scenarios(base: &Path, filter: Option<&str>) -> Vec<PathBuf> {
    let mut scenarios = Vec::new();
    discover_recursive(base, base, filter, &mut scenarios);
    scenarios.sort();
    scenarios
}

fn discover_recursive(base: &Path, current: &Path, filter: Option<&str>, out: &mut Vec<PathBuf>) {
    let entries = match fs::read_dir(current) {
        Ok(e) => e,
        Err(_) => return,
    };

    for entry in entries.flatten() {
        let path = entry.path();

        if path.is_dir() {
            discover_recursive(base, &path, filter, out);
        } else if path.extension().map(|e| e == "toml").unwrap_or(false) {
            if let Some(f) = filter {
                let rel = path.strip_prefix(base).unwrap_or(&path).to_string_lossy();
                if !rel.contains(f) {
                    continue;
                }
            }
            out.push(path);
        }
    }
}

/// Parse and run scenario files in parallel.
/// Returns results in the same order as `paths`.
pub fn run_scenarios_parallel(paths: &[PathBuf]) -> Vec<TestResult> {
    paths
        .par_iter()
        .map(|path| match parse_scenario_file(path) {
            Ok(def) => run_scenario(&def),
            Err(message) => TestResult::Error { message },
        })
        .collect()
}
