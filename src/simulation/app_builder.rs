//! Headless App Builder
//!
//! Provides a reusable builder for creating headless Bevy apps that run the
//! pursuit AI. Used by the scenario runner, the ledge report and ECS tests.

use bevy::app::ScheduleRunnerPlugin;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use std::time::Duration;

use crate::ai::PursuitAiPlugin;
use crate::levels::{CurrentLevel, LevelDatabase};
use crate::tuning::{self, PursuitTuning};

/// Builder for creating headless Bevy apps
pub struct HeadlessAppBuilder {
    level_id: Option<String>,
    level_db: Option<LevelDatabase>,
    tuning: Option<PursuitTuning>,
    fps: f32,
    minimal_threads: bool,
    manual_time: bool,
}

impl Default for HeadlessAppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessAppBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self {
            level_id: None,
            level_db: None,
            tuning: None,
            fps: 60.0,
            minimal_threads: false,
            manual_time: false,
        }
    }

    /// Create a new builder for the given level ID
    pub fn for_level(level_id: String) -> Self {
        Self {
            level_id: Some(level_id),
            ..Self::new()
        }
    }

    /// Set the level ID
    pub fn with_level(mut self, level_id: &str) -> Self {
        self.level_id = Some(level_id.to_string());
        self
    }

    /// Set the level database
    pub fn with_level_db(mut self, level_db: LevelDatabase) -> Self {
        self.level_db = Some(level_db);
        self
    }

    /// Use explicit tuning instead of loading the global config file
    pub fn with_tuning(mut self, tuning: PursuitTuning) -> Self {
        self.tuning = Some(tuning);
        self
    }

    /// Set the target FPS (default: 60)
    pub fn with_fps(mut self, fps: f32) -> Self {
        self.fps = fps;
        self
    }

    /// Enable minimal thread mode (task pools = 1)
    ///
    /// Use this when running many apps in parallel to avoid hitting OS thread limits.
    /// Each Bevy app normally spawns multiple threads; this reduces it to 1 per app.
    pub fn with_minimal_threads(mut self) -> Self {
        self.minimal_threads = true;
        self
    }

    /// Advance time by exactly one frame (1 / fps) per update instead of wall-clock time
    pub fn with_manual_time(mut self) -> Self {
        self.manual_time = true;
        self
    }

    /// Build the app with minimal plugins and the pursuit AI
    ///
    /// The returned app has:
    /// - MinimalPlugins with ScheduleRunnerPlugin
    /// - CurrentLevel (the given ID, else the first level in the database)
    /// - LevelDatabase if provided
    /// - PursuitTuning (explicit, or loaded from the global config file)
    /// - PursuitAiPlugin systems in Update
    ///
    /// Callers spawn actors and call `update()`.
    pub fn build(self) -> App {
        let mut app = App::new();
        let frame = Duration::from_secs_f32(1.0 / self.fps);

        if self.minimal_threads {
            // Reduce Bevy's internal thread pools to minimum
            app.add_plugins(
                MinimalPlugins
                    .set(ScheduleRunnerPlugin::run_loop(frame))
                    .set(TaskPoolPlugin {
                        task_pool_options: TaskPoolOptions::with_num_threads(1),
                    }),
            );
        } else {
            app.add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(frame)));
        }

        if self.manual_time {
            app.insert_resource(TimeUpdateStrategy::ManualDuration(frame));
        }

        let level_id = self
            .level_id
            .or_else(|| {
                self.level_db
                    .as_ref()
                    .and_then(|db| db.first_id().map(str::to_string))
            })
            .unwrap_or_default();
        app.insert_resource(CurrentLevel(level_id));

        if let Some(level_db) = self.level_db {
            app.insert_resource(level_db);
        }

        match self.tuning {
            Some(tuning) => {
                app.insert_resource(tuning);
            }
            None => {
                let mut tuning = PursuitTuning::default();
                if let Err(err) = tuning::apply_global_tuning(&mut tuning) {
                    debug!("{}, using default pursuit tuning", err);
                }
                app.insert_resource(tuning);
            }
        }

        app.add_plugins(PursuitAiPlugin);
        app
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::LedgeCatalog;

    #[test]
    fn test_builder_creates_app() {
        let app = HeadlessAppBuilder::for_level("test_level".to_string()).build();
        assert!(app.world().contains_resource::<LedgeCatalog>());
        assert_eq!(app.world().resource::<CurrentLevel>().0, "test_level");
    }

    #[test]
    fn test_minimal_threads_creates_app() {
        let app = HeadlessAppBuilder::for_level("test_level".to_string())
            .with_minimal_threads()
            .build();
        assert!(app.world().contains_resource::<PursuitTuning>());
    }

    #[test]
    fn test_level_defaults_to_first_in_database() {
        let app = HeadlessAppBuilder::new()
            .with_level_db(LevelDatabase::default_levels())
            .build();
        assert_eq!(app.world().resource::<CurrentLevel>().0, "flat");
    }

    #[test]
    fn test_explicit_tuning_is_kept() {
        let tuning = PursuitTuning {
            turn_cooldown: 2.0,
            ..PursuitTuning::default()
        };
        let app = HeadlessAppBuilder::new().with_tuning(tuning.clone()).build();
        assert_eq!(*app.world().resource::<PursuitTuning>(), tuning);
    }
}
