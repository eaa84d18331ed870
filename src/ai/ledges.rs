//! Ledge selection - which platform edge the AI should climb toward
//!
//! Two searches feed the pursuit policy. The blocking search looks at the ledges
//! of whatever platform cuts the line to the target; the gap search scans the
//! whole catalog when the two actors stand on different platforms. Both are pure
//! functions over explicit candidate lists so they can be tested without a scene.

use bevy::prelude::*;

use crate::tuning::PursuitTuning;
use crate::world::{LedgeMarker, RayHit, SpatialQuery};

/// Sign where zero counts as positive, the convention all horizontal
/// comparisons in this module use
pub fn sign_non_negative(value: f32) -> f32 {
    if value >= 0.0 { 1.0 } else { -1.0 }
}

/// True when `middle` lies horizontally between `a` and `b`, with the interval
/// widened by `tolerance` on both ends. Order of `a` and `b` does not matter.
pub fn between_x(middle: f32, a: f32, b: f32, tolerance: f32) -> bool {
    let (lo, hi) = if b < a { (b, a) } else { (a, b) };
    sign_non_negative(middle - (lo - tolerance)) != sign_non_negative(middle - (hi + tolerance))
}

/// [`between_x`] over optional positions; any missing position means false
pub fn between_x_opt(middle: Option<Vec3>, a: Option<Vec3>, b: Option<Vec3>, tolerance: f32) -> bool {
    match (middle, a, b) {
        (Some(m), Some(a), Some(b)) => between_x(m.x, a.x, b.x, tolerance),
        _ => false,
    }
}

/// Ledges worth considering on the platform a line-of-sight ray struck.
///
/// Compound platforms keep their markers on sibling colliders, so a struck collider
/// without markers of its own falls back to everything grouped under its parent.
pub fn blocking_candidates<S: SpatialQuery>(scene: &S, hit: &RayHit) -> Vec<LedgeMarker> {
    let own = scene.ledges_of(hit.platform);
    if !own.is_empty() {
        return own;
    }
    match hit.parent {
        Some(parent) => scene.ledges_under_parent(parent),
        None => own,
    }
}

/// A ledge is only usable if there is ground below it on at least one side;
/// edges over a bottomless drop are skipped.
pub fn ledge_has_support<S: SpatialQuery>(scene: &S, ledge: &LedgeMarker, tuning: &PursuitTuning) -> bool {
    let base = ledge.position - Vec3::Y * tuning.edge_probe_drop;
    [-1.0_f32, 1.0].into_iter().any(|side| {
        scene
            .ground_below(
                base + Vec3::X * side * tuning.edge_probe_offset,
                tuning.ray_max_distance,
                tuning.probe_layers,
            )
            .is_some()
    })
}

/// Pick the ledge to climb when a platform blocks the line to the target.
///
/// Candidates on the wrong vertical side of the AI are skipped. Among the rest a
/// ledge between the two actors beats any ledge outside them, and closer beats
/// farther. A ledge the AI is practically hanging from (within the regrab distance
/// and below climb height) is ignored unless the current pick lies between it and
/// the target, and nothing at or above the band ceiling qualifies.
pub fn select_blocking_ledge<F>(
    candidates: &[LedgeMarker],
    self_pos: Vec3,
    target_pos: Vec3,
    tuning: &PursuitTuning,
    mut has_support: F,
) -> Option<LedgeMarker>
where
    F: FnMut(&LedgeMarker) -> bool,
{
    let target_side = sign_non_negative(target_pos.y - self_pos.y);
    let regrab_distance = tuning.regrab_distance();

    let mut best: Option<LedgeMarker> = None;
    let mut closest = f32::INFINITY;
    let mut found_between = false;

    for ledge in candidates {
        let offset = ledge.position - self_pos;
        if sign_non_negative(offset.y) != target_side {
            continue;
        }

        let distance = offset.x.abs();
        let between = between_x(ledge.position.x, self_pos.x, target_pos.x, 0.0);
        let preferred = (!(found_between && !between) && distance < closest) || (!found_between && between);
        if !preferred || !has_support(ledge) {
            continue;
        }

        let far_enough = distance > regrab_distance;
        let climbable = ledge.position.y >= self_pos.y + tuning.ledge_climb_height;
        let past_current = best.is_some_and(|b| between_x(b.position.x, target_pos.x, ledge.position.x, 0.0));
        let below_ceiling = ledge.position.y < self_pos.y + tuning.ledge_band_above;

        if (far_enough || climbable || past_current) && below_ceiling {
            best = Some(*ledge);
            closest = distance;
            found_between |= between;
        }
    }

    best
}

/// Pick a ledge that bridges the gap between the AI's platform and the target's.
///
/// Only ledges inside the vertical band around the AI count. When the line of
/// sight is blocked any horizontal position is accepted; otherwise the ledge must
/// lie between the two actors (with some slack).
pub fn select_gap_ledge(
    ledges: &[LedgeMarker],
    self_pos: Vec3,
    target_pos: Vec3,
    line_blocked: bool,
    tuning: &PursuitTuning,
) -> Option<LedgeMarker> {
    let floor = self_pos.y - tuning.ledge_band_below;
    let ceiling = self_pos.y + tuning.ledge_band_above;

    let mut best: Option<LedgeMarker> = None;
    let mut closest = f32::INFINITY;

    for ledge in ledges {
        let distance = (ledge.position.x - self_pos.x).abs();
        let in_band = ledge.position.y > floor && ledge.position.y < ceiling;
        let in_reach = line_blocked
            || between_x(ledge.position.x, self_pos.x, target_pos.x, tuning.gap_between_tolerance);
        if distance < closest && in_band && in_reach {
            best = Some(*ledge);
            closest = distance;
        }
    }

    best
}

/// Choose between the blocking and gap ledges: the horizontally nearer one wins,
/// ties go to the blocking ledge.
pub fn choose_target_ledge(
    blocking: Option<LedgeMarker>,
    gap: Option<LedgeMarker>,
    self_pos: Vec3,
) -> Option<LedgeMarker> {
    match (blocking, gap) {
        (Some(b), Some(g)) => {
            let to_blocking = (b.position.x - self_pos.x).abs();
            let to_gap = (g.position.x - self_pos.x).abs();
            if to_blocking <= to_gap { Some(b) } else { Some(g) }
        }
        (Some(b), None) => Some(b),
        (None, g) => g,
    }
}

/// Nearest ledge (horizontally) below the AI's feet plus the fall allowance,
/// the place to steer toward when nothing is underfoot.
pub fn nearest_recovery_ledge(
    ledges: &[LedgeMarker],
    self_pos: Vec3,
    tuning: &PursuitTuning,
) -> Option<LedgeMarker> {
    let ceiling = self_pos.y + tuning.fall_ledge_height;
    ledges
        .iter()
        .filter(|l| l.position.y < ceiling)
        .fold(None::<(LedgeMarker, f32)>, |best, ledge| {
            let distance = (ledge.position.x - self_pos.x).abs();
            match best {
                Some((_, d)) if d <= distance => best,
                _ => Some((*ledge, distance)),
            }
        })
        .map(|(ledge, _)| ledge)
}

/// Offset from the AI to the spot it should stand on to grab `ledge`:
/// just past the edge, on the outward side.
pub fn ledge_approach_offset(ledge: &LedgeMarker, self_pos: Vec3, grab_distance: f32) -> Vec3 {
    let mut offset = ledge.position - self_pos;
    offset.x += ledge.outward_sign() * grab_distance;
    offset
}
