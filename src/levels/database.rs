//! Level database - parsing and storage

use bevy::prelude::*;
use std::fs;

use crate::constants::{LAYER_DECORATION, LAYER_PLATFORM};
use crate::world::{LedgeSides, PlatformId, PlatformScene};

/// Platform definition in level data. Position is the box center.
#[derive(Clone, Debug, PartialEq)]
pub struct PlatformDef {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Top corners that get ledge markers
    pub ledges: LedgeSides,
    /// Index of the compound platform this collider belongs to
    pub parent: Option<usize>,
    /// Visual only: ignored by probes
    pub decoration: bool,
}

impl PlatformDef {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            ledges: LedgeSides::Both,
            parent: None,
            decoration: false,
        }
    }

    pub fn with_ledges(mut self, ledges: LedgeSides) -> Self {
        self.ledges = ledges;
        self
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn layers(&self) -> u32 {
        if self.decoration {
            LAYER_DECORATION
        } else {
            LAYER_PLATFORM
        }
    }
}

/// Extra ledge marker placed by hand (world position) on platform `platform`
#[derive(Clone, Debug, PartialEq)]
pub struct LedgeDef {
    pub x: f32,
    pub y: f32,
    pub platform: usize,
}

/// Single level definition
#[derive(Clone, Debug, PartialEq)]
pub struct LevelData {
    pub id: String,
    pub name: String,
    /// Horizontal origin AIs retreat toward
    pub origin_x: f32,
    pub platforms: Vec<PlatformDef>,
    pub ledges: Vec<LedgeDef>,
}

impl LevelData {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: id.to_string(),
            origin_x: 0.0,
            platforms: Vec::new(),
            ledges: Vec::new(),
        }
    }

    /// Parent index for platform `index`, if it points at an earlier platform
    pub fn resolved_parent(&self, index: usize) -> Option<usize> {
        self.platforms
            .get(index)
            .and_then(|p| p.parent)
            .filter(|&parent| parent < index)
    }

    /// Build the geometry snapshot for this level without going through the ECS
    pub fn to_scene(&self) -> PlatformScene {
        let mut scene = PlatformScene::new();
        let mut ids: Vec<PlatformId> = Vec::with_capacity(self.platforms.len());

        for (index, def) in self.platforms.iter().enumerate() {
            let id = match self.resolved_parent(index) {
                Some(parent) => scene.add_child_platform(ids[parent], def.center(), def.size()),
                None => scene.add_platform(def.center(), def.size()),
            };
            scene.set_layers(id, def.layers());

            let half = def.size().abs() / 2.0;
            let top = def.y + half.y;
            if def.ledges.has_left() {
                scene.add_ledge(id, Vec3::new(def.x - half.x, top, 0.0));
            }
            if def.ledges.has_right() {
                scene.add_ledge(id, Vec3::new(def.x + half.x, top, 0.0));
            }
            ids.push(id);
        }

        for ledge in &self.ledges {
            if let Some(&platform) = ids.get(ledge.platform) {
                scene.add_ledge(platform, Vec3::new(ledge.x, ledge.y, 0.0));
            }
        }

        scene
    }
}

/// Database of all loaded levels
#[derive(Resource, Default)]
pub struct LevelDatabase {
    pub levels: Vec<LevelData>,
}

fn parse_floats(params: &str, count: usize) -> Option<Vec<f32>> {
    let values: Vec<f32> = params
        .split_whitespace()
        .take(count)
        .map_while(|s| s.parse::<f32>().ok())
        .collect();
    (values.len() == count).then_some(values)
}

fn parse_platform(params: &str) -> Option<PlatformDef> {
    let values = parse_floats(params, 4)?;
    let mut def = PlatformDef::new(values[0], values[1], values[2], values[3]);

    for token in params.split_whitespace().skip(4) {
        match token {
            "ledges" | "both" => def.ledges = LedgeSides::Both,
            "noledges" | "none" => def.ledges = LedgeSides::None,
            "left" => def.ledges = LedgeSides::Left,
            "right" => def.ledges = LedgeSides::Right,
            "decoration" => def.decoration = true,
            other => match other.strip_prefix("parent=").map(str::parse::<usize>) {
                Some(Ok(parent)) => def.parent = Some(parent),
                _ => warn!("Unknown platform option '{}'", other),
            },
        }
    }

    Some(def)
}

fn parse_ledge(params: &str) -> Option<LedgeDef> {
    let parts: Vec<&str> = params.split_whitespace().collect();
    if parts.len() < 3 {
        return None;
    }
    match (
        parts[0].parse::<f32>(),
        parts[1].parse::<f32>(),
        parts[2].parse::<usize>(),
    ) {
        (Ok(x), Ok(y), Ok(platform)) => Some(LedgeDef { x, y, platform }),
        _ => None,
    }
}

impl LevelDatabase {
    /// Load levels from file, returns default hardcoded levels on error
    pub fn load_from_file(path: &str) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => Self::parse(&content),
            Err(e) => {
                warn!("Failed to load levels from {}: {}, using defaults", path, e);
                Self::default_levels()
            }
        }
    }

    /// Parse level data from string
    pub fn parse(content: &str) -> Self {
        let mut levels = Vec::new();
        let mut current_level: Option<LevelData> = None;

        for line in content.lines() {
            let line = line.trim();

            // Skip empty lines and comments
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some(id) = line.strip_prefix("level:") {
                if let Some(level) = current_level.take() {
                    levels.push(level);
                }
                current_level = Some(LevelData::new(id.trim()));
                continue;
            }

            let Some(level) = &mut current_level else {
                warn!("Level line outside a level block: {}", line);
                continue;
            };

            if let Some(name) = line.strip_prefix("name:") {
                level.name = name.trim().to_string();
            } else if let Some(origin_str) = line.strip_prefix("origin:") {
                match origin_str.trim().parse::<f32>() {
                    Ok(origin) => level.origin_x = origin,
                    Err(_) => warn!("Bad origin in level '{}': {}", level.id, line),
                }
            } else if let Some(params) = line.strip_prefix("platform:") {
                match parse_platform(params) {
                    Some(def) => level.platforms.push(def),
                    None => warn!("Bad platform in level '{}': {}", level.id, line),
                }
            } else if let Some(params) = line.strip_prefix("ledge:") {
                match parse_ledge(params) {
                    Some(def) => level.ledges.push(def),
                    None => warn!("Bad ledge in level '{}': {}", level.id, line),
                }
            } else {
                warn!("Unknown level line: {}", line);
            }
        }

        // Don't forget the last level
        if let Some(level) = current_level {
            levels.push(level);
        }

        if levels.is_empty() {
            warn!("No levels parsed, using defaults");
            return Self::default_levels();
        }

        info!("Loaded {} levels from file", levels.len());
        Self { levels }
    }

    /// Hardcoded fallback levels
    pub fn default_levels() -> Self {
        let mut flat = LevelData::new("flat");
        flat.name = "Flat".to_string();
        flat.platforms = vec![PlatformDef::new(0.0, -0.5, 40.0, 1.0)];

        let mut gap = LevelData::new("gap");
        gap.name = "Gap".to_string();
        gap.platforms = vec![
            PlatformDef::new(-5.0, -0.5, 10.0, 1.0),
            PlatformDef::new(11.0, -0.5, 10.0, 1.0),
        ];

        let mut towers = LevelData::new("towers");
        towers.name = "Towers".to_string();
        towers.platforms = vec![
            PlatformDef::new(0.0, -0.5, 30.0, 1.0).with_ledges(LedgeSides::None),
            PlatformDef::new(-6.0, 2.75, 4.0, 0.5),
            PlatformDef::new(6.0, 2.75, 4.0, 0.5),
            PlatformDef::new(0.0, 5.75, 6.0, 0.5),
        ];

        Self {
            levels: vec![flat, gap, towers],
        }
    }

    /// Get level by index
    pub fn get(&self, index: usize) -> Option<&LevelData> {
        self.levels.get(index)
    }

    /// Get level by its ID
    pub fn get_by_id(&self, id: &str) -> Option<&LevelData> {
        self.levels.iter().find(|l| l.id == id)
    }

    /// ID of the first level, the usual starting point
    pub fn first_id(&self) -> Option<&str> {
        self.levels.first().map(|l| l.id.as_str())
    }

    /// Get number of levels
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Check if database is empty
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}
