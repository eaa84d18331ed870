//! Level platform spawning helpers

use bevy::prelude::*;

use crate::levels::database::LevelData;
use crate::world::{CollisionLayers, Ledge, LevelPlatform, spawn_platform};

/// Spawn every platform of `level` with ledge markers on the requested corners.
///
/// Compound platforms become ECS children of their parent platform, so their
/// transforms are local to the parent center. Hand-placed ledges become children
/// of their platform. Returns the platform entities in level order.
pub fn spawn_level_platforms(commands: &mut Commands, level: &LevelData) -> Vec<Entity> {
    let mut spawned: Vec<Entity> = Vec::with_capacity(level.platforms.len());

    for (index, def) in level.platforms.iter().enumerate() {
        let entity = spawn_platform(commands, def.center(), def.size(), def.ledges);
        commands.entity(entity).insert(CollisionLayers(def.layers()));

        let parent = level
            .resolved_parent(index)
            .and_then(|p| Some((spawned.get(p).copied()?, level.platforms.get(p)?)));
        if let Some((parent_entity, parent_def)) = parent {
            let local = def.center() - parent_def.center();
            commands.entity(entity).insert((
                ChildOf(parent_entity),
                Transform::from_xyz(local.x, local.y, 0.0),
            ));
        }

        spawned.push(entity);
    }

    for ledge in &level.ledges {
        let (Some(&platform), Some(def)) = (
            spawned.get(ledge.platform),
            level.platforms.get(ledge.platform),
        ) else {
            warn!(
                "Ledge at ({}, {}) in level '{}' references missing platform {}",
                ledge.x, ledge.y, level.id, ledge.platform
            );
            continue;
        };
        let local = Vec2::new(ledge.x, ledge.y) - def.center();
        commands.spawn((
            Ledge,
            Transform::from_xyz(local.x, local.y, 0.0),
            ChildOf(platform),
        ));
    }

    spawned
}

/// Despawn all level geometry. Child platforms and ledges go with their roots.
pub fn despawn_level_platforms(
    commands: &mut Commands,
    roots: &Query<Entity, (With<LevelPlatform>, Without<ChildOf>)>,
) -> usize {
    let mut count = 0;
    for entity in roots {
        commands.entity(entity).despawn();
        count += 1;
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levels::LevelDatabase;
    use crate::world::{Platform, SpatialQuery, build_platform_scene};
    use bevy::ecs::system::RunSystemOnce;

    const COMPOUND: &str = "
level: compound
platform: 0 -0.5 20 1 noledges
platform: 4 3 2 0.5 noledges
platform: 7 3 4 0.5 right parent=1
ledge: 3 3.25 1
";

    #[test]
    fn test_spawned_level_matches_direct_scene() {
        let db = LevelDatabase::parse(COMPOUND);
        let level = db.get_by_id("compound").unwrap().clone();

        let mut world = World::new();
        let spawned = {
            let mut commands = world.commands();
            spawn_level_platforms(&mut commands, &level)
        };
        world.flush();
        assert_eq!(spawned.len(), 3);
        assert_eq!(
            world.get::<ChildOf>(spawned[2]).map(|c| c.parent()),
            Some(spawned[1])
        );

        let scene = world
            .run_system_once(
                |platforms: Query<(Entity, &Platform, &CollisionLayers, Option<&ChildOf>)>,
                 ledges: Query<(Entity, &ChildOf), With<Ledge>>,
                 nodes: Query<(&Transform, Option<&ChildOf>)>| {
                    build_platform_scene(&platforms, &ledges, &nodes)
                },
            )
            .expect("system runs");

        let mut xs: Vec<f32> = scene.ledges().iter().map(|l| l.position.x).collect();
        xs.sort_by(|a, b| a.total_cmp(b));
        assert_eq!(xs, vec![3.0, 9.0]);
        assert!(scene.ledges().iter().all(|l| (l.position.y - 3.25).abs() < 1e-5));

        // The compound child keeps its world position
        let child = scene.platform(spawned[2].into()).unwrap();
        assert_eq!(child.center, Vec2::new(7.0, 3.0));
        assert_eq!(child.parent, Some(spawned[1].into()));
        assert_eq!(scene.ledges_under_parent(spawned[1].into()).len(), 2);
    }

    #[test]
    fn test_despawn_removes_whole_hierarchy() {
        let db = LevelDatabase::parse(COMPOUND);
        let level = db.get_by_id("compound").unwrap().clone();

        let mut world = World::new();
        {
            let mut commands = world.commands();
            spawn_level_platforms(&mut commands, &level);
        }
        world.flush();

        let removed = world
            .run_system_once(
                |mut commands: Commands,
                 roots: Query<Entity, (With<LevelPlatform>, Without<ChildOf>)>| {
                    despawn_level_platforms(&mut commands, &roots)
                },
            )
            .expect("system runs");
        assert_eq!(removed, 2);

        let remaining = world
            .run_system_once(|platforms: Query<(), With<Platform>>, ledges: Query<(), With<Ledge>>| {
                platforms.iter().count() + ledges.iter().count()
            })
            .expect("system runs");
        assert_eq!(remaining, 0);
    }
}
