//! Raster Test Runner
//!
//! Command-line tool for running geometry regression tests for Quill.
//!
//! Usage:
//!   quill-raster-tests                      # Run all tests
//!   quill-raster-tests --filter foo         # Run tests matching "foo"
//!   quill-raster-tests --list               # List all tests
//!   quill-raster-tests --config raster.toml # Override rasterizer tuning

use anyhow::{Context, Result};
use quill_raster::RasterConfig;
use quill_test_suite::{runner::TestRunner, tests, TestHarnessConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--list") {
        println!("Available test suites:");
        for suite in tests::all_suites() {
            println!("\n  {}:", suite.name);
            for (case, _) in &suite.cases {
                println!("    - {}", case);
            }
        }
        return Ok(());
    }

    let mut config = TestHarnessConfig::default();
    if let Some(path) = flag_value(&args, "--config") {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read rasterizer config {}", path))?;
        config.raster = RasterConfig::from_toml_str(&source)
            .with_context(|| format!("Failed to load rasterizer config {}", path))?;
        tracing::info!("Using rasterizer config from {}", path);
    }

    println!("╔══════════════════════════════════════════╗");
    println!("║      QUILL RASTER REGRESSION TESTS       ║");
    println!("╚══════════════════════════════════════════╝\n");

    let mut runner = TestRunner::with_config(config)?;
    for suite in tests::all_suites() {
        runner.add_suite(suite);
    }

    if let Some(pattern) = flag_value(&args, "--filter") {
        println!("Running tests matching: {}\n", pattern);
        runner.filter(pattern);
    }

    let result = runner.run();
    result.print_summary();

    if result.all_passed() {
        println!("\nAll tests passed!");
        Ok(())
    } else {
        std::process::exit(1);
    }
}
