//! Ledge Report - print the ledge catalog the AI sees for each level
//!
//! Spawns every level in a headless app, lets the catalog rebuild, and lists
//! each ledge marker with its owning platform and the side it faces.
//!
//! Usage:
//!   cargo run --bin ledge-report
//!   cargo run --bin ledge-report -- config/test_levels.txt
//!   cargo run --bin ledge-report -- config/levels.txt towers

use std::env;

use pursuit_ai::LEVELS_FILE;
use pursuit_ai::ai::LedgeCatalog;
use pursuit_ai::levels::{CurrentLevel, LevelDatabase};
use pursuit_ai::simulation::HeadlessAppBuilder;
use pursuit_ai::tuning::PursuitTuning;

fn main() {
    let args: Vec<String> = env::args().collect();
    let levels_file = args.get(1).map(String::as_str).unwrap_or(LEVELS_FILE);
    let only_level = args.get(2).cloned();

    let level_db = LevelDatabase::load_from_file(levels_file);
    let level_ids: Vec<(String, String, f32)> = level_db
        .levels
        .iter()
        .filter(|level| only_level.as_ref().is_none_or(|id| *id == level.id))
        .map(|level| (level.id.clone(), level.name.clone(), level.origin_x))
        .collect();

    if level_ids.is_empty() {
        println!("No matching levels in {}", levels_file);
        std::process::exit(1);
    }

    let mut app = HeadlessAppBuilder::new()
        .with_level_db(level_db)
        .with_tuning(PursuitTuning::default())
        .with_manual_time()
        .build();

    println!("Ledge Report ({})", levels_file);
    println!("============================================================");

    for (id, name, origin_x) in &level_ids {
        app.world_mut().resource_mut::<CurrentLevel>().0 = id.clone();
        app.update();

        let catalog = app.world().resource::<LedgeCatalog>();
        let mut ledges = catalog.ledges_for(id).to_vec();
        ledges.sort_by(|a, b| {
            a.position
                .y
                .total_cmp(&b.position.y)
                .then(a.position.x.total_cmp(&b.position.x))
        });

        println!();
        println!("{} ({}) origin x={:.2}, {} ledges", id, name, origin_x, ledges.len());
        for ledge in &ledges {
            let side = if ledge.outward_sign() > 0.0 { "right" } else { "left" };
            println!(
                "  ({:>7.2}, {:>6.2})  platform {:>12}  faces {}",
                ledge.position.x, ledge.position.y, ledge.platform.0, side
            );
        }
    }
}
