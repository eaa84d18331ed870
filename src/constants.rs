//! Tunable constants for the pursuit AI
//!
//! All decision thresholds are defined here for easy tweaking. Units are world
//! units (one unit is roughly one actor width) and seconds.

// =============================================================================
// TURN HYSTERESIS
// =============================================================================

pub const TURN_COOLDOWN: f32 = 0.5; // Seconds between permitted run-direction reversals

// =============================================================================
// LEDGES
// =============================================================================

pub const LEDGE_GRAB_DISTANCE: f32 = 0.6; // How far past a ledge marker the AI aims to stand
pub const LEDGE_REGRAB_FRACTION: f32 = 2.0 / 3.0; // Markers closer than grab * this are "just jumped from"
pub const LEDGE_CLIMB_HEIGHT: f32 = 1.5; // A close marker this far above is still worth grabbing
pub const LEDGE_BAND_BELOW: f32 = 1.0; // Gap ledges may sit at most this far below the AI
pub const LEDGE_BAND_ABOVE: f32 = 5.0; // Ledges this far above are out of reach
pub const LEDGE_TARGET_TOLERANCE: f32 = 0.1; // Distance tolerance while walking onto a ledge
pub const GAP_BETWEEN_TOLERANCE: f32 = 1.0; // Horizontal slack for "between self and target" in gap search
pub const FALL_LEDGE_HEIGHT: f32 = 1.0; // Recovery ledges may be at most this far above the AI

// =============================================================================
// RAY PROBES
// =============================================================================

pub const RAY_MAX_DISTANCE: f32 = 30.0; // Range of every downward ground probe
pub const EDGE_PROBE_OFFSET: f32 = 3.0; // Sideways offset of the "ledge still has ground" probes
pub const EDGE_PROBE_DROP: f32 = 0.5; // Ledge probes start this far below the marker
pub const GROUND_PROBE_HEIGHT: f32 = 1.0; // Ground probes under an actor start this far above its feet
pub const GROUND_PROBE_SIDESTEP: f32 = 1.0; // Horizontal offset of the fallback ground probes
pub const OBSTACLE_PROBE_HEIGHT: f32 = 0.1; // Low-obstacle probe height above the feet
pub const AIM_HEIGHT: f32 = 1.0; // Height of the line-of-engagement ray above both actors' feet
pub const LOOKAHEAD_HEIGHT: f32 = 0.5; // Map-edge probes start this far above the feet

// =============================================================================
// MOVEMENT
// =============================================================================

pub const RUN_STEP: f32 = 1.0; // Horizontal distance of one run step for map-edge lookahead
pub const EDGE_LOOKAHEAD_STEPS: [f32; 2] = [1.0, 2.0]; // Run steps ahead probed for ground
pub const JUMP_TRIGGER_DISTANCE: f32 = 1.0; // Jump when the adjusted ledge target is this close
pub const RETREAT_DISTANCE: f32 = 1.0; // Back off only when closer than this in open pursuit
pub const SLIDE_DISTANCE_FACTOR: f32 = 2.0; // Slide when farther than engagement distance * this
pub const STACK_DISTANCE: f32 = 1.0; // Horizontal distance at which the AI is "on top of" the target
pub const RISING_EPSILON: f32 = f32::EPSILON; // Vertical speed above this counts as rising
pub const SETTLE_DROP: f32 = 1.0; // Desired offset this far below collapses the engagement band

// =============================================================================
// COLLISION LAYERS
// =============================================================================

pub const LAYER_PLATFORM: u32 = 1 << 0; // Solid level geometry
pub const LAYER_DECORATION: u32 = 1 << 1; // Visual-only geometry, ignored by probes

// =============================================================================
// FILES
// =============================================================================

pub const LEVELS_FILE: &str = "config/levels.txt";
