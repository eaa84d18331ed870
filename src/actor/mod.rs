//! Actor components read by AI policies.
//!
//! These are written by the movement controller and the combat layer; the AI
//! only reads them.

use bevy::prelude::*;

/// Marker for actors (AI or human controlled combatants)
#[derive(Component)]
#[require(Transform, Velocity, Facing, Sliding)]
pub struct Actor;

/// Remaining hit points. Zero or below means dead.
#[derive(Component, Clone, Copy, Debug)]
pub struct Health(pub f32);

/// 2D velocity vector
#[derive(Component, Default, Clone, Copy, Debug)]
pub struct Velocity(pub Vec2);

/// Direction actor faces (-1.0 = left, 1.0 = right)
#[derive(Component, Clone, Copy, Debug)]
pub struct Facing(pub f32);

impl Default for Facing {
    fn default() -> Self {
        Self(1.0) // Default facing right
    }
}

impl Facing {
    pub fn is_right(&self) -> bool {
        self.0 > 0.0
    }
}

/// Whether the controller currently has the actor in a slide
#[derive(Component, Default, Clone, Copy, Debug)]
pub struct Sliding(pub bool);

/// Marker for pickups (arrow tokens etc.) that AI can chase but not fight
#[derive(Component)]
#[require(Transform)]
pub struct Collectible;
