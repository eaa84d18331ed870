//! World components for platforms and ledge markers

mod scene;
mod spatial;

pub use scene::*;
pub use spatial::*;

use bevy::prelude::*;

use crate::constants::LAYER_PLATFORM;

/// Collision layers a collider lives on (bitmask)
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub struct CollisionLayers(pub u32);

impl Default for CollisionLayers {
    fn default() -> Self {
        Self(LAYER_PLATFORM)
    }
}

/// Platform component - solid axis-aligned surface of the given size
#[derive(Component, Clone, Copy, Debug)]
#[require(CollisionLayers, Transform)]
pub struct Platform {
    pub size: Vec2,
}

/// Marks platforms that belong to the current level (despawned on level change)
#[derive(Component)]
pub struct LevelPlatform;

/// Ledge marker - a grabbable platform edge, spawned as a child of its platform
#[derive(Component, Default)]
#[require(Transform)]
pub struct Ledge;

/// Which top corners of a platform get ledge markers
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LedgeSides {
    #[default]
    Both,
    Left,
    Right,
    None,
}

impl LedgeSides {
    pub fn has_left(self) -> bool {
        matches!(self, LedgeSides::Both | LedgeSides::Left)
    }

    pub fn has_right(self) -> bool {
        matches!(self, LedgeSides::Both | LedgeSides::Right)
    }
}

/// Spawn a level platform with ledge markers on the requested top corners.
///
/// Markers are children of the platform, positioned relative to its center.
pub fn spawn_platform(
    commands: &mut Commands,
    center: Vec2,
    size: Vec2,
    sides: LedgeSides,
) -> Entity {
    let half = size.abs() / 2.0;
    commands
        .spawn((
            Transform::from_xyz(center.x, center.y, 0.0),
            Platform { size },
            LevelPlatform,
        ))
        .with_children(|parent| {
            if sides.has_left() {
                parent.spawn((Ledge, Transform::from_xyz(-half.x, half.y, 0.0)));
            }
            if sides.has_right() {
                parent.spawn((Ledge, Transform::from_xyz(half.x, half.y, 0.0)));
            }
        })
        .id()
}
