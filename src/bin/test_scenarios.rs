//! Scenario test runner CLI
//!
//! Usage:
//!   cargo run --bin test-scenarios              # Run all scenarios
//!   cargo run --bin test-scenarios -- chase/    # Run category
//!   cargo run --bin test-scenarios -- ledges/gap_approach  # Run single scenario
//!   cargo run --bin test-scenarios -- --verbose # Show details on failure
//!   cargo run --bin test-scenarios -- --threads 4

use std::env;
use std::path::Path;

use pursuit_ai::testing::{
    SCENARIOS_DIR, TestResult, discover_scenarios, run_scenarios_parallel,
};

fn main() {
    let args: Vec<String> = env::args().collect();

    let mut verbose = false;
    let mut threads: usize = 0;
    let mut filter: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        let arg = &args[i];
        if arg == "--verbose" || arg == "-v" {
            verbose = true;
        } else if arg == "--threads" || arg == "-j" {
            i += 1;
            threads = args.get(i).and_then(|s| s.parse().ok()).unwrap_or(0);
        } else if !arg.starts_with('-') {
            filter = Some(arg.clone());
        }
        i += 1;
    }

    if threads > 0 {
        if let Err(e) = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
        {
            eprintln!("Failed to configure {} threads: {}", threads, e);
        }
    }

    println!("Scenario Tests");
    println!("==============\n");

    let scenarios_path = Path::new(SCENARIOS_DIR);
    if !scenarios_path.exists() {
        println!("No scenarios directory found at {}", SCENARIOS_DIR);
        println!("Create scenario files in tests/scenarios/");
        std::process::exit(1);
    }

    let scenarios = discover_scenarios(scenarios_path, filter.as_deref());

    if scenarios.is_empty() {
        println!("No scenario files found.");
        if let Some(f) = filter {
            println!("Filter: {}", f);
        }
        std::process::exit(1);
    }

    let results = run_scenarios_parallel(&scenarios);

    let mut passed = 0;
    let mut failed = 0;
    let mut errors = 0;
    let mut current_category = String::new();

    for (path, result) in scenarios.iter().zip(&results) {
        let rel_path = path.strip_prefix(scenarios_path).unwrap_or(path);

        // Print category header
        if let Some(parent) = rel_path.parent() {
            let category = parent.to_string_lossy().to_string();
            if category != current_category && !category.is_empty() {
                if !current_category.is_empty() {
                    println!();
                }
                println!("{}/", category);
                current_category = category;
            }
        }

        let name = rel_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        match result {
            TestResult::Pass { .. } => passed += 1,
            TestResult::Fail { .. } => failed += 1,
            TestResult::Error { .. } => errors += 1,
        }

        print_result(&name, result, verbose);
    }

    println!("\n==============");
    println!(
        "Results: {} passed, {} failed, {} errors",
        passed, failed, errors
    );

    if failed > 0 || errors > 0 {
        std::process::exit(1);
    }
}

fn print_result(name: &str, result: &TestResult, verbose: bool) {
    let dots = ".".repeat(40 - name.len().min(39));

    match result {
        TestResult::Pass { ticks } => {
            println!("  {} {} PASS ({} ticks)", name, dots, ticks);
        }
        TestResult::Fail { error } => {
            println!("  {} {} FAIL", name, dots);
            if verbose {
                println!("    {}", error);
            } else {
                println!("    {}", error.message);
            }
        }
        TestResult::Error { message } => {
            println!("  {} {} ERROR", name, dots);
            println!("    {}", message);
        }
    }
}
