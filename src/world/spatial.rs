//! Spatial queries against level geometry.
//!
//! The pursuit policy only ever sees the world through [`SpatialQuery`]: ray casts
//! that return the nearest blocking surface, plus lookups of the ledge markers that
//! hang off a platform. [`PlatformScene`] is the concrete implementation, a flat
//! list of axis-aligned platform boxes rebuilt from the ECS every tick.

use bevy::prelude::*;

use crate::constants::LAYER_PLATFORM;

/// Below this a ray direction component counts as parallel to the box face
const PARALLEL_EPSILON: f32 = 1e-6;

/// Stable identifier of a platform collider
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlatformId(pub u64);

impl From<Entity> for PlatformId {
    fn from(entity: Entity) -> Self {
        Self(entity.to_bits())
    }
}

/// Stable identifier of a ledge marker
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LedgeId(pub u64);

impl From<Entity> for LedgeId {
    fn from(entity: Entity) -> Self {
        Self(entity.to_bits())
    }
}

/// A ledge marker: a grabbable platform edge
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LedgeMarker {
    pub id: LedgeId,
    /// World position of the marker (top corner of its platform)
    pub position: Vec3,
    /// Platform the marker belongs to
    pub platform: PlatformId,
    /// Horizontal center of the owning platform, used to tell which side the edge faces
    pub platform_center_x: f32,
}

impl LedgeMarker {
    /// +1.0 when the marker is on the right edge of its platform, -1.0 on the left edge
    pub fn outward_sign(&self) -> f32 {
        if self.position.x - self.platform_center_x > 0.0 {
            1.0
        } else {
            -1.0
        }
    }
}

/// Nearest surface struck by a ray
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    pub point: Vec3,
    pub distance: f32,
    /// Collider that was hit
    pub platform: PlatformId,
    /// Compound platform the collider belongs to, if any
    pub parent: Option<PlatformId>,
}

/// Read-only view of level geometry used by AI policies.
///
/// Every query may legitimately return nothing; callers treat "no hit" as normal
/// control flow.
pub trait SpatialQuery {
    /// Cast a ray and return the nearest surface on `layers` within `max_distance`.
    /// Colliders that strictly contain the origin are ignored.
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32, layers: u32)
    -> Option<RayHit>;

    /// Ledge markers that are direct children of `platform`
    fn ledges_of(&self, platform: PlatformId) -> Vec<LedgeMarker>;

    /// Ledge markers on every collider grouped under `parent`, including the parent itself
    fn ledges_under_parent(&self, parent: PlatformId) -> Vec<LedgeMarker>;

    /// Straight-down probe, the most common query
    fn ground_below(&self, origin: Vec3, max_distance: f32, layers: u32) -> Option<RayHit> {
        self.raycast(origin, Vec3::NEG_Y, max_distance, layers)
    }
}

/// Axis-aligned platform box in a [`PlatformScene`]
#[derive(Clone, Copy, Debug)]
pub struct SceneBox {
    pub id: PlatformId,
    pub parent: Option<PlatformId>,
    pub center: Vec2,
    pub half_size: Vec2,
    pub layers: u32,
}

impl SceneBox {
    pub fn min(&self) -> Vec2 {
        self.center - self.half_size
    }

    pub fn max(&self) -> Vec2 {
        self.center + self.half_size
    }

    /// Top surface Y (what actors stand on)
    pub fn top(&self) -> f32 {
        self.center.y + self.half_size.y
    }

    /// Strict interior test; points on the boundary are outside
    pub fn strictly_contains(&self, point: Vec2) -> bool {
        let min = self.min();
        let max = self.max();
        point.x > min.x && point.x < max.x && point.y > min.y && point.y < max.y
    }

    /// Distance along a normalized ray to the first boundary crossing, if within `max_distance`
    fn ray_distance(&self, origin: Vec2, direction: Vec2, max_distance: f32) -> Option<f32> {
        let min = self.min();
        let max = self.max();
        let mut t_enter = 0.0_f32;
        let mut t_exit = max_distance;

        for axis in 0..2 {
            let o = origin[axis];
            let d = direction[axis];
            if d.abs() < PARALLEL_EPSILON {
                // Parallel: must already be inside the slab
                if o < min[axis] || o > max[axis] {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / d;
            let mut t0 = (min[axis] - o) * inv;
            let mut t1 = (max[axis] - o) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_enter = t_enter.max(t0);
            t_exit = t_exit.min(t1);
            if t_enter > t_exit {
                return None;
            }
        }

        Some(t_enter)
    }
}

/// Snapshot of all platforms and ledge markers in the level
#[derive(Clone, Debug, Default)]
pub struct PlatformScene {
    boxes: Vec<SceneBox>,
    ledges: Vec<LedgeMarker>,
    next_id: u64,
}

impl PlatformScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a solid platform with a fresh id
    pub fn add_platform(&mut self, center: Vec2, size: Vec2) -> PlatformId {
        let id = self.fresh_id();
        self.insert_box(SceneBox {
            id: PlatformId(id),
            parent: None,
            center,
            half_size: size.abs() / 2.0,
            layers: LAYER_PLATFORM,
        });
        PlatformId(id)
    }

    /// Add a collider that belongs to a compound platform
    pub fn add_child_platform(&mut self, parent: PlatformId, center: Vec2, size: Vec2) -> PlatformId {
        let id = self.add_platform(center, size);
        if let Some(b) = self.boxes.iter_mut().find(|b| b.id == id) {
            b.parent = Some(parent);
        }
        id
    }

    /// Insert a box with an externally assigned id (ECS entities)
    pub fn insert_box(&mut self, scene_box: SceneBox) {
        self.next_id = self.next_id.max(scene_box.id.0 + 1);
        self.boxes.push(scene_box);
    }

    /// Add a ledge marker to a platform at an explicit position
    pub fn add_ledge(&mut self, platform: PlatformId, position: Vec3) -> LedgeId {
        let id = LedgeId(self.fresh_id());
        let platform_center_x = self
            .platform(platform)
            .map(|b| b.center.x)
            .unwrap_or(position.x);
        self.ledges.push(LedgeMarker {
            id,
            position,
            platform,
            platform_center_x,
        });
        id
    }

    /// Insert a fully specified marker (ECS entities)
    pub fn insert_ledge(&mut self, ledge: LedgeMarker) {
        self.next_id = self.next_id.max(ledge.id.0 + 1);
        self.ledges.push(ledge);
    }

    /// Add markers on both top corners of a platform. Returns (left, right).
    pub fn add_corner_ledges(&mut self, platform: PlatformId) -> Option<(LedgeId, LedgeId)> {
        let b = *self.platform(platform)?;
        let top = b.top();
        let left = self.add_ledge(platform, Vec3::new(b.min().x, top, 0.0));
        let right = self.add_ledge(platform, Vec3::new(b.max().x, top, 0.0));
        Some((left, right))
    }

    pub fn platform(&self, id: PlatformId) -> Option<&SceneBox> {
        self.boxes.iter().find(|b| b.id == id)
    }

    pub fn set_layers(&mut self, id: PlatformId, layers: u32) {
        if let Some(b) = self.boxes.iter_mut().find(|b| b.id == id) {
            b.layers = layers;
        }
    }

    pub fn boxes(&self) -> &[SceneBox] {
        &self.boxes
    }

    /// Every ledge marker in the scene
    pub fn ledges(&self) -> &[LedgeMarker] {
        &self.ledges
    }

    fn fresh_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl SpatialQuery for PlatformScene {
    fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        layers: u32,
    ) -> Option<RayHit> {
        let dir = direction.truncate().normalize_or_zero();
        if dir == Vec2::ZERO || max_distance <= 0.0 {
            return None;
        }
        let origin_2d = origin.truncate();

        self.boxes
            .iter()
            .filter(|b| b.layers & layers != 0)
            .filter(|b| !b.strictly_contains(origin_2d))
            .filter_map(|b| {
                b.ray_distance(origin_2d, dir, max_distance)
                    .map(|t| (b, t))
            })
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(b, t)| RayHit {
                point: (origin_2d + dir * t).extend(origin.z),
                distance: t,
                platform: b.id,
                parent: b.parent,
            })
    }

    fn ledges_of(&self, platform: PlatformId) -> Vec<LedgeMarker> {
        self.ledges
            .iter()
            .filter(|l| l.platform == platform)
            .copied()
            .collect()
    }

    fn ledges_under_parent(&self, parent: PlatformId) -> Vec<LedgeMarker> {
        self.ledges
            .iter()
            .filter(|l| {
                l.platform == parent
                    || self
                        .platform(l.platform)
                        .is_some_and(|b| b.parent == Some(parent))
            })
            .copied()
            .collect()
    }
}
