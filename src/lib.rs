//! Pursuit AI - per-tick chase decisions for 2D platformer actors, built on Bevy
//!
//! This crate provides the ledge catalog, the pursuit policy, the ECS systems
//! that drive it, and the headless tooling used to test it.

// Core modules
pub mod constants;
pub mod simulation;
pub mod testing;
pub mod tuning;

// Game logic modules
pub mod actor;
pub mod ai;
pub mod levels;
pub mod world;

// Re-export commonly used types for convenience
pub use actor::{Actor, Collectible, Facing, Health, Sliding, Velocity};
pub use ai::{
    AiPolicy, LedgeCatalog, LedgeTrace, MotionActuator, MotionInput, PolicyConfigError,
    PursuitAction, PursuitAi, PursuitAiPlugin, PursuitPolicy, TargetKind, TargetView, TickOutcome,
};
pub use constants::*;
pub use levels::{CurrentLevel, LevelData, LevelDatabase, PlatformDef};
pub use simulation::HeadlessAppBuilder;
pub use tuning::{PURSUIT_TUNING_FILE, PursuitTuning};
pub use world::{
    LedgeId, LedgeMarker, LevelPlatform, Platform, PlatformId, PlatformScene, SpatialQuery,
};
