//! AI module - per-tick decision making and motion output

mod catalog;
mod decision;
mod ledges;
mod pursuit;

pub use catalog::*;
pub use decision::*;
pub use ledges::*;
pub use pursuit::*;

use bevy::prelude::*;

use crate::tuning::PursuitTuning;
use crate::world::{LedgeMarker, SpatialQuery};

/// Receives one tick of movement decisions. The controller integrates them on the
/// following physics step; nothing is returned.
pub trait MotionActuator {
    /// Signed run direction; zero means stop. Only the sign is meaningful.
    fn set_run_direction(&mut self, direction: f32);
    fn set_jump(&mut self, jump: bool);
    fn set_slide(&mut self, slide: bool);
    /// Turn to face right (`true`) or left without moving
    fn face(&mut self, right: bool);
}

/// Per-entity motion command buffer written by AI policies and read by the controller.
#[derive(Component, Default, Debug, Clone, PartialEq)]
pub struct MotionInput {
    /// -1.0, 0.0 or 1.0
    pub move_x: f32,
    pub jump_held: bool,
    pub slide_held: bool,
    /// Facing change requested this tick, consumed by `apply_facing_requests`
    pub face_request: Option<bool>,
}

impl MotionActuator for MotionInput {
    fn set_run_direction(&mut self, direction: f32) {
        self.move_x = run_sign(direction);
    }

    fn set_jump(&mut self, jump: bool) {
        self.jump_held = jump;
    }

    fn set_slide(&mut self, slide: bool) {
        self.slide_held = slide;
    }

    fn face(&mut self, right: bool) {
        self.face_request = Some(right);
    }
}

/// Sign of a run command: -1, 0 or 1 (zero stays zero)
pub fn run_sign(value: f32) -> f32 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// What the AI knows about itself this tick
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActorView {
    /// Feet position
    pub position: Vec3,
    pub facing_right: bool,
    pub vertical_velocity: f32,
    pub sliding: bool,
}

impl ActorView {
    pub fn standing_at(position: Vec3) -> Self {
        Self {
            position,
            facing_right: true,
            vertical_velocity: 0.0,
            sliding: false,
        }
    }
}

/// What kind of thing is being pursued
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TargetKind {
    /// Another fighter; dead once health drops to zero
    Combatant { health: f32 },
    /// A pickup the AI wants to touch
    Collectible,
    /// Any other positional target (waypoint, decoy)
    Other,
}

/// What the AI knows about its target this tick
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetView {
    pub position: Vec3,
    pub kind: TargetKind,
}

impl TargetView {
    pub fn combatant(position: Vec3, health: f32) -> Self {
        Self {
            position,
            kind: TargetKind::Combatant { health },
        }
    }

    pub fn collectible(position: Vec3) -> Self {
        Self {
            position,
            kind: TargetKind::Collectible,
        }
    }

    /// Dead combatants are no longer worth chasing
    pub fn is_alive(&self) -> bool {
        match self.kind {
            TargetKind::Combatant { health } => health > 0.0,
            TargetKind::Collectible | TargetKind::Other => true,
        }
    }

    pub fn is_combatant(&self) -> bool {
        matches!(self.kind, TargetKind::Combatant { .. })
    }

    pub fn is_collectible(&self) -> bool {
        matches!(self.kind, TargetKind::Collectible)
    }
}

/// Everything a policy reads besides its own state and the two actors
pub struct TickContext<'a, S: SpatialQuery> {
    pub scene: &'a S,
    /// Current level's ledge catalog (empty when unavailable)
    pub ledges: &'a [LedgeMarker],
    pub tuning: &'a PursuitTuning,
    /// Horizontal origin of the level, the fallback retreat point
    pub origin_x: f32,
    /// Seconds since the previous tick
    pub dt: f32,
}

/// Interchangeable AI strategies, each with a single per-tick entry point
#[derive(Clone, Debug)]
pub enum AiPolicy {
    /// Debug mode - stand still, do nothing
    Idle,
    /// Chase a target across platforms
    Pursuit(PursuitPolicy),
}

impl AiPolicy {
    /// Decide this tick's movement, push it into `motion`, and report which ledges were considered
    pub fn choose_action<S: SpatialQuery, M: MotionActuator>(
        &mut self,
        me: &ActorView,
        target: Option<&TargetView>,
        ctx: &TickContext<S>,
        motion: &mut M,
    ) -> LedgeTrace {
        match self {
            AiPolicy::Idle => {
                PursuitAction::STOP.apply_to(motion);
                LedgeTrace::default()
            }
            AiPolicy::Pursuit(policy) => policy.choose_action(me, target, ctx, motion),
        }
    }
}

/// AI brain attached to an actor: a policy plus the entity it is after
#[derive(Component, Clone, Debug)]
#[require(MotionInput)]
pub struct PursuitAi {
    pub policy: AiPolicy,
    pub target: Option<Entity>,
    /// Ledges considered on the last decision tick
    pub last_trace: LedgeTrace,
}

impl PursuitAi {
    /// Pursue `target`, keeping `engagement_distance` of horizontal spacing
    pub fn pursue(target: Entity, engagement_distance: f32) -> Result<Self, PolicyConfigError> {
        Ok(Self {
            policy: AiPolicy::Pursuit(PursuitPolicy::new(engagement_distance)?),
            target: Some(target),
            last_trace: LedgeTrace::default(),
        })
    }

    pub fn idle() -> Self {
        Self {
            policy: AiPolicy::Idle,
            target: None,
            last_trace: LedgeTrace::default(),
        }
    }
}
