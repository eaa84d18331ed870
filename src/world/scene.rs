//! Scene extraction - turns ECS platforms and ledges into a [`PlatformScene`].

use bevy::prelude::*;

use super::spatial::{LedgeMarker, PlatformId, PlatformScene, SceneBox};
use super::{CollisionLayers, Ledge, Platform};

/// Deepest hierarchy walked when composing translations
const MAX_HIERARCHY_DEPTH: usize = 16;

/// World translation of an entity, composed from local translations up the `ChildOf` chain.
/// Level geometry is unrotated and unscaled, so translations add.
pub fn world_translation(entity: Entity, nodes: &Query<(&Transform, Option<&ChildOf>)>) -> Vec3 {
    let mut position = Vec3::ZERO;
    let mut current = Some(entity);
    for _ in 0..MAX_HIERARCHY_DEPTH {
        let Some(e) = current else {
            break;
        };
        let Ok((transform, parent)) = nodes.get(e) else {
            break;
        };
        position += transform.translation;
        current = parent.map(|c| c.parent());
    }
    position
}

/// Collect every ledge marker attached to a platform
pub fn collect_ledge_markers(
    ledges: &Query<(Entity, &ChildOf), With<Ledge>>,
    nodes: &Query<(&Transform, Option<&ChildOf>)>,
) -> Vec<LedgeMarker> {
    ledges
        .iter()
        .map(|(entity, child_of)| {
            let platform = child_of.parent();
            LedgeMarker {
                id: entity.into(),
                position: world_translation(entity, nodes),
                platform: platform.into(),
                platform_center_x: world_translation(platform, nodes).x,
            }
        })
        .collect()
}

/// Snapshot all platforms and their ledge markers
pub fn build_platform_scene(
    platforms: &Query<(Entity, &Platform, &CollisionLayers, Option<&ChildOf>)>,
    ledges: &Query<(Entity, &ChildOf), With<Ledge>>,
    nodes: &Query<(&Transform, Option<&ChildOf>)>,
) -> PlatformScene {
    let mut scene = PlatformScene::new();

    for (entity, platform, layers, parent) in platforms.iter() {
        let center = world_translation(entity, nodes).truncate();
        scene.insert_box(SceneBox {
            id: entity.into(),
            parent: parent.map(|c| PlatformId::from(c.parent())),
            center,
            half_size: platform.size.abs() / 2.0,
            layers: layers.0,
        });
    }

    for marker in collect_ledge_markers(ledges, nodes) {
        scene.insert_ledge(marker);
    }

    scene
}
