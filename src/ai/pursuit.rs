//! Pursuit policy - chase a target across platforms and stay at engagement range
//!
//! One call to [`PursuitPolicy::decide`] per tick. The policy keeps only the
//! previous run direction and a turn cooldown between ticks; everything else is
//! read fresh from the actors and the level geometry.
//!
//! Decision order:
//! 1. Give up on missing or dead targets
//! 2. Ray-cast the line of engagement at aim height
//! 3. Blocked: look for a ledge on the blocking platform
//! 4. Different platforms: look for a ledge across the gap
//! 5. Keep the horizontally nearer of the two ledges
//! 6. Aim just past the chosen ledge, jumping when close; otherwise hop low obstacles
//! 7. Nothing underfoot: steer toward the nearest low ledge
//! 8. Run toward, back away from, or turn to face the target
//! 9. Don't run off map edges; slide when far away
//! 10. Don't sit on top of the target
//! 11. Suppress direction thrash
//! 12. Hop for pickups when parked on them

use std::fmt;

use bevy::prelude::*;

use super::ledges::{
    blocking_candidates, choose_target_ledge, ledge_approach_offset, ledge_has_support,
    nearest_recovery_ledge, select_blocking_ledge, select_gap_ledge, sign_non_negative,
};
use super::{ActorView, MotionActuator, TargetView, TickContext, run_sign};
use crate::constants::RISING_EPSILON;
use crate::world::{LedgeId, LedgeMarker, SpatialQuery};

/// Rejected policy configuration
#[derive(Debug, Clone, PartialEq)]
pub enum PolicyConfigError {
    NegativeEngagementDistance(f32),
    NonFiniteEngagementDistance(f32),
}

impl fmt::Display for PolicyConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyConfigError::NegativeEngagementDistance(d) => {
                write!(f, "engagement distance must be non-negative, got {}", d)
            }
            PolicyConfigError::NonFiniteEngagementDistance(d) => {
                write!(f, "engagement distance must be finite, got {}", d)
            }
        }
    }
}

impl std::error::Error for PolicyConfigError {}

/// One tick of movement output
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PursuitAction {
    /// -1.0, 0.0 or 1.0
    pub run: f32,
    pub jump: bool,
    pub slide: bool,
    /// Facing change requested instead of running
    pub face_right: Option<bool>,
}

impl PursuitAction {
    pub const STOP: PursuitAction = PursuitAction {
        run: 0.0,
        jump: false,
        slide: false,
        face_right: None,
    };

    pub fn apply_to<M: MotionActuator>(&self, motion: &mut M) {
        motion.set_run_direction(self.run);
        motion.set_jump(self.jump);
        motion.set_slide(self.slide);
        if let Some(right) = self.face_right {
            motion.face(right);
        }
    }
}

/// Which ledges a tick considered, for debug output and scenario assertions
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LedgeTrace {
    /// Line of engagement struck a platform
    pub line_blocked: bool,
    pub blocking: Option<LedgeId>,
    pub gap: Option<LedgeId>,
    /// Ledge that shaped this tick's movement (after the falling guard)
    pub chosen: Option<LedgeId>,
    /// Nothing was underfoot
    pub falling: bool,
}

/// Result of one decision tick
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickOutcome {
    pub action: PursuitAction,
    pub trace: LedgeTrace,
}

impl TickOutcome {
    fn stopped() -> Self {
        Self {
            action: PursuitAction::STOP,
            trace: LedgeTrace::default(),
        }
    }
}

/// Chases one target, holding `engagement_distance` of horizontal spacing
#[derive(Clone, Debug, PartialEq)]
pub struct PursuitPolicy {
    engagement_distance: f32,
    /// Run sign emitted on the prior tick
    previous_run_sign: f32,
    turn_cooldown_remaining: f32,
}

impl PursuitPolicy {
    pub fn new(engagement_distance: f32) -> Result<Self, PolicyConfigError> {
        if !engagement_distance.is_finite() {
            return Err(PolicyConfigError::NonFiniteEngagementDistance(engagement_distance));
        }
        if engagement_distance < 0.0 {
            return Err(PolicyConfigError::NegativeEngagementDistance(engagement_distance));
        }
        Ok(Self {
            engagement_distance,
            previous_run_sign: 0.0,
            turn_cooldown_remaining: 0.0,
        })
    }

    pub fn engagement_distance(&self) -> f32 {
        self.engagement_distance
    }

    pub fn previous_run_sign(&self) -> f32 {
        self.previous_run_sign
    }

    pub fn turn_cooldown_remaining(&self) -> f32 {
        self.turn_cooldown_remaining
    }

    /// Decide and push the result into `motion`
    pub fn choose_action<S: SpatialQuery, M: MotionActuator>(
        &mut self,
        me: &ActorView,
        target: Option<&TargetView>,
        ctx: &TickContext<S>,
        motion: &mut M,
    ) -> LedgeTrace {
        let outcome = self.decide(me, target, ctx);
        debug!(
            "pursuit: run={} jump={} slide={} blocked={} blocking={:?} gap={:?} chosen={:?} falling={}",
            outcome.action.run,
            outcome.action.jump,
            outcome.action.slide,
            outcome.trace.line_blocked,
            outcome.trace.blocking,
            outcome.trace.gap,
            outcome.trace.chosen,
            outcome.trace.falling
        );
        outcome.action.apply_to(motion);
        outcome.trace
    }

    /// Run one decision tick
    pub fn decide<S: SpatialQuery>(
        &mut self,
        me: &ActorView,
        target: Option<&TargetView>,
        ctx: &TickContext<S>,
    ) -> TickOutcome {
        let Some(target) = target.filter(|t| t.is_alive()) else {
            self.previous_run_sign = 0.0;
            return TickOutcome::stopped();
        };

        let tuning = ctx.tuning;
        let scene = ctx.scene;
        let layers = tuning.probe_layers;
        let ray_max = tuning.ray_max_distance;
        let pos = me.position;

        let mut trace = LedgeTrace::default();
        let mut jump = false;
        let mut slide = false;
        let mut face_right = None;

        let opponent_offset = target.position - pos;
        let mut target_offset = opponent_offset;
        let mut chasing_target_directly = true;
        let mut engagement = self.engagement_distance;
        let mut tolerance = self.engagement_distance - tuning.retreat_distance;

        // Line of engagement, aim height to aim height
        let aim = Vec3::Y * tuning.aim_height;
        let line_hit = scene.raycast(pos + aim, opponent_offset, opponent_offset.length(), layers);
        trace.line_blocked = line_hit.is_some();

        let blocking = line_hit.and_then(|hit| {
            let candidates = blocking_candidates(scene, &hit);
            select_blocking_ledge(&candidates, pos, target.position, tuning, |ledge| {
                ledge_has_support(scene, ledge, tuning)
            })
        });

        // Ground under both actors
        let probe_origin = pos + Vec3::Y * tuning.ground_probe_height;
        let sidestep = Vec3::X * tuning.ground_probe_sidestep;
        let mut under = scene.ground_below(probe_origin, ray_max, layers);
        let mut gap = None;
        if blocking.is_none() {
            let check_gap = line_hit.is_some() || {
                under = scene.ground_below(
                    pos + sidestep * sign_non_negative(opponent_offset.x),
                    ray_max,
                    layers,
                );
                under.is_none()
            };
            if check_gap {
                let under_target =
                    scene.ground_below(target.position + Vec3::Y * tuning.ground_probe_height, ray_max, layers);
                if under.is_none() {
                    under = scene.ground_below(probe_origin + sidestep, ray_max, layers);
                }
                if under.is_none() {
                    under = scene.ground_below(probe_origin - sidestep, ray_max, layers);
                }
                if let (Some(mine), Some(theirs)) = (under, under_target) {
                    if mine.platform != theirs.platform {
                        gap = select_gap_ledge(ctx.ledges, pos, target.position, line_hit.is_some(), tuning);
                    }
                }
            }
        }
        trace.blocking = blocking.map(|l| l.id);
        trace.gap = gap.map(|l| l.id);

        let mut ledge_in_play: Option<LedgeMarker> = choose_target_ledge(blocking, gap, pos);

        if let Some(ledge) = ledge_in_play {
            let approach = ledge_approach_offset(&ledge, pos, tuning.ledge_grab_distance);
            jump = approach.x.abs() < tuning.jump_trigger_distance
                && (opponent_offset.y > 0.0 || gap.is_some());
            engagement = 0.0;
            tolerance = tuning.ledge_target_tolerance;
            target_offset = approach;
            chasing_target_directly = false;
        } else if scene
            .raycast(
                pos + Vec3::Y * tuning.obstacle_probe_height,
                opponent_offset,
                opponent_offset.length(),
                layers,
            )
            .is_some()
        {
            // Low obstacle in the way
            jump = true;
        }

        if under.is_none() {
            trace.falling = true;
            let recovery = nearest_recovery_ledge(ctx.ledges, pos, tuning);
            ledge_in_play = recovery;
            trace.chosen = recovery.map(|l| l.id);
            // Only an out-of-reach recovery ledge ends the tick early
            if let Some(ledge) = recovery {
                let dx = ledge.position.x - pos.x;
                if dx.abs() > tuning.ledge_grab_distance {
                    return self.finish(run_sign(dx), true, false, None, trace);
                }
            }
            jump = true;
        } else {
            trace.chosen = ledge_in_play.map(|l| l.id);
        }

        // Dropping down onto the target: stop holding range so the AI lands on it
        if engagement > 0.0
            && target_offset.y < -tuning.settle_drop
            && (ledge_in_play.is_some() || opponent_offset.x.abs() > tuning.stack_distance)
        {
            engagement = 0.0;
        }

        let horizontal_distance = target_offset.x.abs();
        let mut run = if horizontal_distance > engagement {
            run_sign(target_offset.x)
        } else if horizontal_distance < engagement - tolerance {
            run_sign(-target_offset.x)
        } else {
            let wants_right = opponent_offset.x > 0.0;
            if chasing_target_directly && under.is_some() && me.facing_right != wants_right {
                face_right = Some(wants_right);
            }
            0.0
        };

        // Map edge guard
        if run != 0.0 {
            let ground_ahead = tuning.edge_lookahead_steps.iter().any(|steps| {
                let probe = pos + Vec3::new(run * tuning.run_step * steps, tuning.lookahead_height, 0.0);
                scene.ground_below(probe, ray_max, layers).is_some()
            });
            if ground_ahead {
                slide = horizontal_distance > self.engagement_distance * tuning.slide_distance_factor;
            } else {
                if me.sliding {
                    run = run_sign(-opponent_offset.x);
                } else if ledge_in_play.is_none() {
                    run = 0.0;
                }
                slide = false;
            }
        }

        // Don't stand on the target's head
        if run == 0.0
            && opponent_offset.x.abs() < tuning.stack_distance
            && opponent_offset.y < 0.0
            && target.is_combatant()
            && me.vertical_velocity <= RISING_EPSILON
        {
            run = run_sign(ctx.origin_x - pos.x);
        }

        // Turn hysteresis
        if (run > 0.0 && self.previous_run_sign < 0.0) || (run < 0.0 && self.previous_run_sign > 0.0) {
            self.turn_cooldown_remaining -= ctx.dt;
            if self.turn_cooldown_remaining <= 0.0 {
                self.turn_cooldown_remaining = tuning.turn_cooldown;
            } else {
                run = 0.0;
            }
        }

        // Pickups sometimes sit just above reach
        if self.engagement_distance == 0.0 && run == 0.0 && target.is_collectible() {
            jump = true;
        }

        self.finish(run, jump, slide, face_right, trace)
    }

    fn finish(
        &mut self,
        run: f32,
        jump: bool,
        slide: bool,
        face_right: Option<bool>,
        trace: LedgeTrace,
    ) -> TickOutcome {
        self.previous_run_sign = run;
        TickOutcome {
            action: PursuitAction {
                run,
                jump,
                slide,
                face_right,
            },
            trace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MotionInput;
    use crate::tuning::PursuitTuning;
    use crate::world::{PlatformId, PlatformScene};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const DT: f32 = 1.0 / 60.0;

    /// Wide floor, top surface at y = 0, spanning x in [-20, 20]
    fn flat_scene() -> PlatformScene {
        let mut scene = PlatformScene::new();
        scene.add_platform(Vec2::new(0.0, -0.5), Vec2::new(40.0, 1.0));
        scene
    }

    /// Two floors with a gap: A spans [-10, 0], B spans [6, 16], both tops at y = 0
    fn gap_scene() -> (PlatformScene, PlatformId, PlatformId) {
        let mut scene = PlatformScene::new();
        let a = scene.add_platform(Vec2::new(-5.0, -0.5), Vec2::new(10.0, 1.0));
        let b = scene.add_platform(Vec2::new(11.0, -0.5), Vec2::new(10.0, 1.0));
        scene.add_corner_ledges(a);
        scene.add_corner_ledges(b);
        (scene, a, b)
    }

    fn ctx<'a>(scene: &'a PlatformScene, tuning: &'a PursuitTuning) -> TickContext<'a, PlatformScene> {
        TickContext {
            scene,
            ledges: scene.ledges(),
            tuning,
            origin_x: 0.0,
            dt: DT,
        }
    }

    fn at(x: f32, y: f32) -> Vec3 {
        Vec3::new(x, y, 0.0)
    }

    #[test]
    fn test_rejects_bad_engagement_distance() {
        assert_eq!(
            PursuitPolicy::new(-1.0),
            Err(PolicyConfigError::NegativeEngagementDistance(-1.0))
        );
        assert!(matches!(
            PursuitPolicy::new(f32::NAN),
            Err(PolicyConfigError::NonFiniteEngagementDistance(_))
        ));
        assert!(PursuitPolicy::new(0.0).is_ok());
    }

    #[test]
    fn test_chases_on_flat_ground() {
        let scene = flat_scene();
        let tuning = PursuitTuning::default();
        let mut policy = PursuitPolicy::new(3.0).unwrap();
        let target = TargetView::combatant(at(10.0, 0.0), 100.0);

        let outcome = policy.decide(&ActorView::standing_at(at(0.0, 0.0)), Some(&target), &ctx(&scene, &tuning));

        assert_eq!(outcome.action.run, 1.0);
        assert!(!outcome.action.jump);
        // 10 units away is more than twice the engagement distance
        assert!(outcome.action.slide);
        assert!(!outcome.trace.line_blocked);
        assert_eq!(outcome.trace.chosen, None);
    }

    #[test]
    fn test_no_slide_inside_slide_range() {
        let scene = flat_scene();
        let tuning = PursuitTuning::default();
        let mut policy = PursuitPolicy::new(3.0).unwrap();
        let target = TargetView::combatant(at(5.0, 0.0), 100.0);

        let outcome = policy.decide(&ActorView::standing_at(at(0.0, 0.0)), Some(&target), &ctx(&scene, &tuning));
        assert_eq!(outcome.action.run, 1.0);
        assert!(!outcome.action.slide);
    }

    #[test]
    fn test_holds_position_inside_engagement_band() {
        let scene = flat_scene();
        let tuning = PursuitTuning::default();
        let mut policy = PursuitPolicy::new(3.0).unwrap();
        // Tolerance is 2, so anything in [1, 3] is close enough
        let target = TargetView::combatant(at(2.0, 0.0), 100.0);

        let outcome = policy.decide(&ActorView::standing_at(at(0.0, 0.0)), Some(&target), &ctx(&scene, &tuning));
        assert_eq!(outcome.action, PursuitAction::STOP);
    }

    #[test]
    fn test_backs_off_when_too_close() {
        let scene = flat_scene();
        let tuning = PursuitTuning::default();
        let mut policy = PursuitPolicy::new(3.0).unwrap();
        let target = TargetView::combatant(at(0.5, 0.0), 100.0);

        let outcome = policy.decide(&ActorView::standing_at(at(0.0, 0.0)), Some(&target), &ctx(&scene, &tuning));
        assert_eq!(outcome.action.run, -1.0);
    }

    #[test]
    fn test_turns_to_face_target_instead_of_moving() {
        let scene = flat_scene();
        let tuning = PursuitTuning::default();
        let mut policy = PursuitPolicy::new(3.0).unwrap();
        let target = TargetView::combatant(at(-2.0, 0.0), 100.0);
        let me = ActorView::standing_at(at(0.0, 0.0)); // facing right

        let outcome = policy.decide(&me, Some(&target), &ctx(&scene, &tuning));
        assert_eq!(outcome.action.run, 0.0);
        assert_eq!(outcome.action.face_right, Some(false));

        let facing_left = ActorView {
            facing_right: false,
            ..me
        };
        let outcome = policy.decide(&facing_left, Some(&target), &ctx(&scene, &tuning));
        assert_eq!(outcome.action.face_right, None);
    }

    #[test]
    fn test_dead_or_missing_target_stops() {
        let scene = flat_scene();
        let tuning = PursuitTuning::default();
        let mut policy = PursuitPolicy::new(3.0).unwrap();
        let me = ActorView::standing_at(at(0.0, 0.0));

        let alive = TargetView::combatant(at(10.0, 0.0), 100.0);
        assert_eq!(policy.decide(&me, Some(&alive), &ctx(&scene, &tuning)).action.run, 1.0);

        let dead = TargetView::combatant(at(10.0, 0.0), 0.0);
        let outcome = policy.decide(&me, Some(&dead), &ctx(&scene, &tuning));
        assert_eq!(outcome.action, PursuitAction::STOP);
        assert_eq!(policy.previous_run_sign(), 0.0);

        let outcome = policy.decide(&me, None, &ctx(&scene, &tuning));
        assert_eq!(outcome.action, PursuitAction::STOP);
    }

    #[test]
    fn test_runs_toward_gap_ledge_then_jumps() {
        let (scene, a, _) = gap_scene();
        let tuning = PursuitTuning::default();
        let mut policy = PursuitPolicy::new(3.0).unwrap();
        let target = TargetView::combatant(at(10.0, 0.0), 100.0);
        let edge = scene
            .ledges_of(a)
            .into_iter()
            .find(|l| l.position.x == 0.0)
            .unwrap();

        // Aim point is 0.6 past the edge, 1.1 away: keep running
        let outcome = policy.decide(&ActorView::standing_at(at(-0.5, 0.0)), Some(&target), &ctx(&scene, &tuning));
        assert_eq!(outcome.trace.gap, Some(edge.id));
        assert_eq!(outcome.trace.chosen, Some(edge.id));
        assert_eq!(outcome.action.run, 1.0);
        assert!(!outcome.action.jump);
        assert!(!outcome.action.slide);

        // Within one unit of the aim point: jump the gap
        let outcome = policy.decide(&ActorView::standing_at(at(-0.3, 0.0)), Some(&target), &ctx(&scene, &tuning));
        assert_eq!(outcome.action.run, 1.0);
        assert!(outcome.action.jump);
    }

    #[test]
    fn test_jumps_for_stepping_stone_mid_gap() {
        // Floors span [-10, 0] and [3, 13]; a floating stone above the middle of the gap
        let mut scene = PlatformScene::new();
        scene.add_platform(Vec2::new(-5.0, -0.5), Vec2::new(10.0, 1.0));
        scene.add_platform(Vec2::new(8.0, -0.5), Vec2::new(10.0, 1.0));
        let stone = scene.add_platform(Vec2::new(2.0, 2.25), Vec2::new(1.0, 0.5));
        let marker = scene.add_ledge(stone, at(1.5, 2.5));
        let tuning = PursuitTuning::default();
        let mut policy = PursuitPolicy::new(3.0).unwrap();
        let target = TargetView::combatant(at(10.0, 0.0), 100.0);

        // Aim point is 0.6 short of the marker at x = 0.9, still 1.4 away
        let outcome = policy.decide(&ActorView::standing_at(at(-0.5, 0.0)), Some(&target), &ctx(&scene, &tuning));
        assert!(!outcome.trace.line_blocked);
        assert_eq!(outcome.trace.blocking, None);
        assert_eq!(outcome.trace.gap, Some(marker));
        assert_eq!(outcome.trace.chosen, Some(marker));
        assert_eq!(outcome.action.run, 1.0);
        assert!(!outcome.action.jump);

        // At the floor's edge the aim point is 0.9 away
        let outcome = policy.decide(&ActorView::standing_at(at(0.0, 0.0)), Some(&target), &ctx(&scene, &tuning));
        assert_eq!(outcome.trace.gap, Some(marker));
        assert_eq!(outcome.trace.chosen, Some(marker));
        assert_eq!(outcome.action.run, 1.0);
        assert!(outcome.action.jump);
        assert!(!outcome.trace.falling);
    }

    #[test]
    fn test_gap_ignored_on_shared_platform() {
        let (scene, _, _) = gap_scene();
        let tuning = PursuitTuning::default();
        let mut policy = PursuitPolicy::new(3.0).unwrap();
        let target = TargetView::combatant(at(-6.0, 0.0), 100.0);

        let outcome = policy.decide(&ActorView::standing_at(at(-2.0, 0.0)), Some(&target), &ctx(&scene, &tuning));
        assert_eq!(outcome.trace.gap, None);
        assert_eq!(outcome.action.run, -1.0);
    }

    #[test]
    fn test_stops_at_map_edge() {
        // Single platform spanning [-10, 0] with nothing beyond
        let mut scene = PlatformScene::new();
        scene.add_platform(Vec2::new(-5.0, -0.5), Vec2::new(10.0, 1.0));
        let tuning = PursuitTuning::default();
        let mut policy = PursuitPolicy::new(3.0).unwrap();
        let target = TargetView::collectible(at(10.0, 0.0));

        let outcome = policy.decide(&ActorView::standing_at(at(-0.5, 0.0)), Some(&target), &ctx(&scene, &tuning));
        assert_eq!(outcome.action.run, 0.0);
        assert!(!outcome.action.slide);
    }

    #[test]
    fn test_sliding_at_map_edge_reverses() {
        let mut scene = PlatformScene::new();
        scene.add_platform(Vec2::new(-5.0, -0.5), Vec2::new(10.0, 1.0));
        let tuning = PursuitTuning::default();
        let mut policy = PursuitPolicy::new(3.0).unwrap();
        let target = TargetView::collectible(at(10.0, 0.0));
        let me = ActorView {
            sliding: true,
            ..ActorView::standing_at(at(-0.5, 0.0))
        };

        let outcome = policy.decide(&me, Some(&target), &ctx(&scene, &tuning));
        assert_eq!(outcome.action.run, -1.0);
        assert!(!outcome.action.slide);
    }

    #[test]
    fn test_hops_low_obstacle() {
        let mut scene = flat_scene();
        // Knee-high step between the actors, below aim height
        scene.add_platform(Vec2::new(3.0, 0.25), Vec2::new(1.0, 0.5));
        let tuning = PursuitTuning::default();
        let mut policy = PursuitPolicy::new(1.0).unwrap();
        let target = TargetView::combatant(at(8.0, 0.0), 100.0);

        let outcome = policy.decide(&ActorView::standing_at(at(0.0, 0.0)), Some(&target), &ctx(&scene, &tuning));
        assert!(!outcome.trace.line_blocked);
        assert!(outcome.action.jump);
        assert_eq!(outcome.action.run, 1.0);
    }

    #[test]
    fn test_climbs_toward_blocking_ledge() {
        let mut scene = flat_scene();
        // Ledge platform overhead: spans [2, 8], top at y = 3
        let shelf = scene.add_platform(Vec2::new(5.0, 2.75), Vec2::new(6.0, 0.5));
        scene.add_corner_ledges(shelf);
        let tuning = PursuitTuning::default();
        let mut policy = PursuitPolicy::new(3.0).unwrap();
        let target = TargetView::combatant(at(5.0, 3.0), 100.0);

        let outcome = policy.decide(&ActorView::standing_at(at(0.0, 0.0)), Some(&target), &ctx(&scene, &tuning));
        assert!(outcome.trace.line_blocked);
        let left_edge = scene
            .ledges_of(shelf)
            .into_iter()
            .find(|l| l.position.x == 2.0)
            .unwrap();
        assert_eq!(outcome.trace.blocking, Some(left_edge.id));
        // Aim point is 0.6 left of the edge at x = 1.4
        assert_eq!(outcome.action.run, 1.0);
        assert!(!outcome.action.jump);

        let outcome = policy.decide(&ActorView::standing_at(at(1.0, 0.0)), Some(&target), &ctx(&scene, &tuning));
        assert!(outcome.action.jump);
    }

    #[test]
    fn test_falling_steers_to_recovery_ledge() {
        let (scene, _, b) = gap_scene();
        let tuning = PursuitTuning::default();
        let mut policy = PursuitPolicy::new(3.0).unwrap();
        let target = TargetView::combatant(at(-8.0, 0.0), 100.0);
        let near_edge = scene
            .ledges_of(b)
            .into_iter()
            .find(|l| l.position.x == 6.0)
            .unwrap();

        // Over the void between the platforms, falling
        let me = ActorView {
            vertical_velocity: -3.0,
            ..ActorView::standing_at(at(4.0, 0.5))
        };
        let outcome = policy.decide(&me, Some(&target), &ctx(&scene, &tuning));
        assert!(outcome.trace.falling);
        assert_eq!(outcome.trace.chosen, Some(near_edge.id));
        // Recovery beats pursuit: away from the target, toward the ledge
        assert_eq!(outcome.action.run, 1.0);
        assert!(outcome.action.jump);
    }

    #[test]
    fn test_falling_without_ledges_keeps_pursuing() {
        let scene = PlatformScene::new();
        let tuning = PursuitTuning::default();
        let target = TargetView::combatant(at(20.0, 0.0), 100.0);
        let ctx = TickContext {
            origin_x: -10.0,
            ..ctx(&scene, &tuning)
        };

        // Chases toward the target, but the edge guard finds nothing ahead
        let mut policy = PursuitPolicy::new(3.0).unwrap();
        let outcome = policy.decide(&ActorView::standing_at(at(5.0, 0.0)), Some(&target), &ctx);
        assert!(outcome.trace.falling);
        assert_eq!(outcome.trace.chosen, None);
        assert_eq!(outcome.action.run, 0.0);
        assert!(outcome.action.jump);
        assert!(!outcome.action.slide);

        // A sliding actor is still turned back by the edge guard
        let mut policy = PursuitPolicy::new(3.0).unwrap();
        let me = ActorView {
            sliding: true,
            ..ActorView::standing_at(at(5.0, 0.0))
        };
        let outcome = policy.decide(&me, Some(&target), &ctx);
        assert!(outcome.trace.falling);
        assert_eq!(outcome.action.run, -1.0);
        assert!(outcome.action.jump);
    }

    #[test]
    fn test_steps_off_target_head() {
        let scene = flat_scene();
        let tuning = PursuitTuning::default();
        let mut policy = PursuitPolicy::new(0.0).unwrap();
        // Standing on the target's head
        let target = TargetView::combatant(at(0.5, 0.0), 100.0);
        let ctx = TickContext {
            origin_x: -10.0,
            ..ctx(&scene, &tuning)
        };

        let outcome = policy.decide(&ActorView::standing_at(at(0.5, 2.0)), Some(&target), &ctx);
        assert_eq!(outcome.action.run, -1.0);

        // Still rising from a jump: stay put
        let mut policy = PursuitPolicy::new(0.0).unwrap();
        let rising = ActorView {
            vertical_velocity: 2.0,
            ..ActorView::standing_at(at(0.5, 2.0))
        };
        assert_eq!(policy.decide(&rising, Some(&target), &ctx).action.run, 0.0);
    }

    #[test]
    fn test_jumps_for_pickup_when_parked() {
        let scene = flat_scene();
        let tuning = PursuitTuning::default();
        let mut policy = PursuitPolicy::new(0.0).unwrap();
        let token = TargetView::collectible(at(0.0, 0.5));

        let outcome = policy.decide(&ActorView::standing_at(at(0.0, 0.0)), Some(&token), &ctx(&scene, &tuning));
        assert_eq!(outcome.action.run, 0.0);
        assert!(outcome.action.jump);

        // Combatants get no hop
        let mut policy = PursuitPolicy::new(0.0).unwrap();
        let fighter = TargetView::combatant(at(0.0, 0.5), 100.0);
        let outcome = policy.decide(&ActorView::standing_at(at(0.0, 0.0)), Some(&fighter), &ctx(&scene, &tuning));
        assert!(!outcome.action.jump);
    }

    #[test]
    fn test_turn_cooldown_suppresses_thrash() {
        let scene = flat_scene();
        let tuning = PursuitTuning::default();
        let mut policy = PursuitPolicy::new(3.0).unwrap();
        let me = ActorView::standing_at(at(0.0, 0.0));
        let right = TargetView::combatant(at(10.0, 0.0), 100.0);
        let left = TargetView::combatant(at(-10.0, 0.0), 100.0);

        assert_eq!(policy.decide(&me, Some(&right), &ctx(&scene, &tuning)).action.run, 1.0);
        // First reversal passes straight away and arms the cooldown
        assert_eq!(policy.decide(&me, Some(&left), &ctx(&scene, &tuning)).action.run, -1.0);
        assert_eq!(policy.turn_cooldown_remaining(), tuning.turn_cooldown);
        // Second reversal right after is held
        assert_eq!(policy.decide(&me, Some(&right), &ctx(&scene, &tuning)).action.run, 0.0);
        assert!(policy.turn_cooldown_remaining() < tuning.turn_cooldown);
    }

    #[test]
    fn test_suppressed_flip_clears_previous_direction() {
        let scene = flat_scene();
        let tuning = PursuitTuning::default();
        let mut policy = PursuitPolicy::new(3.0).unwrap();
        let me = ActorView::standing_at(at(0.0, 0.0));
        let right = TargetView::combatant(at(10.0, 0.0), 100.0);
        let left = TargetView::combatant(at(-10.0, 0.0), 100.0);

        assert_eq!(policy.decide(&me, Some(&right), &ctx(&scene, &tuning)).action.run, 1.0);
        assert_eq!(policy.decide(&me, Some(&left), &ctx(&scene, &tuning)).action.run, -1.0);

        // Flip inside the cooldown: held at zero, and zero is what gets remembered
        assert_eq!(policy.decide(&me, Some(&right), &ctx(&scene, &tuning)).action.run, 0.0);
        assert_eq!(policy.previous_run_sign(), 0.0);
        let remaining = policy.turn_cooldown_remaining();
        assert!(remaining > 0.0 && remaining < tuning.turn_cooldown);

        // Starting from a stop is not a flip, so it passes and leaves the cooldown alone
        assert_eq!(policy.decide(&me, Some(&right), &ctx(&scene, &tuning)).action.run, 1.0);
        assert_eq!(policy.turn_cooldown_remaining(), remaining);

        // The next flip is still inside the cooldown
        assert_eq!(policy.decide(&me, Some(&left), &ctx(&scene, &tuning)).action.run, 0.0);
        assert!(policy.turn_cooldown_remaining() < remaining);
    }

    #[test]
    fn test_cooldown_only_grows_on_reset() {
        let scene = flat_scene();
        let tuning = PursuitTuning::default();
        let mut policy = PursuitPolicy::new(3.0).unwrap();
        let me = ActorView::standing_at(at(0.0, 0.0));
        let mut rng = StdRng::seed_from_u64(7);

        let mut resets = 0;
        let mut suppressed = 0;
        for _ in 0..600 {
            let x = if rng.gen_bool(0.5) { 10.0 } else { -10.0 };
            let target = TargetView::combatant(at(x, 0.0), 100.0);
            let before = policy.turn_cooldown_remaining();
            let previous = policy.previous_run_sign();

            let run = policy.decide(&me, Some(&target), &ctx(&scene, &tuning)).action.run;
            let after = policy.turn_cooldown_remaining();

            if after > before {
                assert_eq!(after, tuning.turn_cooldown);
                resets += 1;
            }
            if after < before {
                // Decremented without expiring: the flip was held
                assert_eq!(run, 0.0);
                suppressed += 1;
            }
            if run * previous < 0.0 {
                // A direct reversal always re-arms the cooldown
                assert_eq!(after, tuning.turn_cooldown);
            }
            if after == before {
                assert!(run * previous >= 0.0);
            }
        }

        assert!(resets > 1);
        assert!(suppressed > 0);
    }

    #[test]
    fn test_same_state_same_decision() {
        let (scene, _, _) = gap_scene();
        let tuning = PursuitTuning::default();
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..200 {
            let me = ActorView::standing_at(at(rng.gen_range(-12.0..18.0), rng.gen_range(-2.0..4.0)));
            let target = TargetView::combatant(at(rng.gen_range(-12.0..18.0), rng.gen_range(-2.0..4.0)), 10.0);
            let engagement = rng.gen_range(0.0..5.0);

            let mut first = PursuitPolicy::new(engagement).unwrap();
            let mut second = first.clone();
            let a = first.decide(&me, Some(&target), &ctx(&scene, &tuning));
            let b = second.decide(&me, Some(&target), &ctx(&scene, &tuning));
            assert_eq!(a, b);
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_choose_action_writes_actuator() {
        let scene = flat_scene();
        let tuning = PursuitTuning::default();
        let mut policy = PursuitPolicy::new(3.0).unwrap();
        let mut input = MotionInput::default();
        let target = TargetView::combatant(at(-2.0, 0.0), 100.0);

        policy.choose_action(&ActorView::standing_at(at(0.0, 0.0)), Some(&target), &ctx(&scene, &tuning), &mut input);
        assert_eq!(input.move_x, 0.0);
        assert_eq!(input.face_request, Some(false));
    }
}
