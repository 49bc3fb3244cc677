//! Suite execution
//!
//! Runs every selected case through the [`TestHarness`] and totals the
//! geometry the frames produced, so a run reports how much splitting and
//! flushing happened as well as which snapshots changed.

use crate::harness::{FrameSnapshot, TestContext, TestHarness, TestHarnessConfig, TestResult};
use anyhow::Result;
use std::time::{Duration, Instant};

type DrawFn = Box<dyn FnOnce(&mut TestContext) + Send>;

/// A named group of drawing cases
pub struct TestSuite {
    pub name: String,
    /// Case names paired with the drawing they record
    pub cases: Vec<(String, DrawFn)>,
}

impl TestSuite {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            cases: Vec::new(),
        }
    }

    pub fn add<F>(&mut self, name: &str, draw: F) -> &mut Self
    where
        F: FnOnce(&mut TestContext) + Send + 'static,
    {
        self.cases.push((name.to_string(), Box::new(draw)));
        self
    }
}

/// Outcome of one case
pub struct TestRun {
    /// `suite::case`
    pub name: String,
    pub result: TestResult,
    /// Missing when the harness itself failed, e.g. on I/O
    pub snapshot: Option<FrameSnapshot>,
}

/// Sums over every rendered frame of a run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameTotals {
    pub frames: usize,
    pub aborted: usize,
    pub batches: u32,
    pub triangles: usize,
    pub cubic_splits: u32,
    pub stroke_subdivisions: u32,
    pub early_flushes: u32,
}

impl FrameTotals {
    fn add(&mut self, snapshot: &FrameSnapshot) {
        self.frames += 1;
        self.aborted += usize::from(snapshot.error.is_some());
        self.batches += snapshot.batches;
        self.triangles += snapshot.triangles;
        self.cubic_splits += snapshot.cubic_splits;
        self.stroke_subdivisions += snapshot.stroke_subdivisions;
        self.early_flushes += snapshot.early_flushes;
    }
}

pub struct TestRunner {
    harness: TestHarness,
    suites: Vec<TestSuite>,
    /// Substring of `suite::case` a case must contain to run
    filter: Option<String>,
}

impl TestRunner {
    pub fn with_config(config: TestHarnessConfig) -> Result<Self> {
        Ok(Self {
            harness: TestHarness::with_config(config)?,
            suites: Vec::new(),
            filter: None,
        })
    }

    pub fn add_suite(&mut self, suite: TestSuite) -> &mut Self {
        self.suites.push(suite);
        self
    }

    pub fn filter(&mut self, pattern: &str) -> &mut Self {
        self.filter = Some(pattern.to_string());
        self
    }

    pub fn run(&mut self) -> RunResult {
        let start = Instant::now();
        let mut runs = Vec::new();
        let mut totals = FrameTotals::default();

        for suite in self.suites.drain(..) {
            tracing::info!("Running suite: {}", suite.name);
            for (case, draw) in suite.cases {
                let name = format!("{}::{}", suite.name, case);
                if self.filter.as_ref().is_some_and(|p| !name.contains(p.as_str())) {
                    continue;
                }

                let run = match self.harness.run_test(&name, draw) {
                    Ok((result, snapshot)) => {
                        totals.add(&snapshot);
                        TestRun {
                            name,
                            result,
                            snapshot: Some(snapshot),
                        }
                    }
                    Err(e) => {
                        tracing::error!("Test {} failed with error: {:#}", name, e);
                        let output_path = self.harness.output_path(&name);
                        TestRun {
                            name,
                            result: TestResult::Failed {
                                reason: format!("{:#}", e),
                                output_path,
                            },
                            snapshot: None,
                        }
                    }
                };
                runs.push(run);
            }
        }

        RunResult {
            runs,
            totals,
            duration: start.elapsed(),
        }
    }
}

pub struct RunResult {
    pub runs: Vec<TestRun>,
    pub totals: FrameTotals,
    pub duration: Duration,
}

impl RunResult {
    pub fn passed(&self) -> usize {
        self.runs.iter().filter(|r| r.result.is_passed()).count()
    }

    /// Cases whose reference did not exist and was written by this run
    pub fn new_references(&self) -> usize {
        self.runs
            .iter()
            .filter(|r| matches!(r.result, TestResult::PassedWithNewReference))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.runs.len() - self.passed()
    }

    pub fn all_passed(&self) -> bool {
        self.failed() == 0
    }

    pub fn print_summary(&self) {
        let t = &self.totals;
        println!("\n╔══════════════════════════════════════════╗");
        println!("║           TEST RESULTS SUMMARY           ║");
        println!("╠══════════════════════════════════════════╣");
        println!("║  Passed:        {:>6} ({:>3} new)        ║", self.passed(), self.new_references());
        println!("║  Failed:        {:>6}                   ║", self.failed());
        println!("║  Frames:        {:>6} ({:>3} aborted)    ║", t.frames, t.aborted);
        println!("║  Batches:       {:>6}                   ║", t.batches);
        println!("║  Triangles:     {:>6}                   ║", t.triangles);
        println!("║  Cubic splits:  {:>6}                   ║", t.cubic_splits);
        println!("║  Subdivisions:  {:>6}                   ║", t.stroke_subdivisions);
        println!("║  Early flushes: {:>6}                   ║", t.early_flushes);
        println!("║  Time:        {:>8.2?}                  ║", self.duration);
        println!("╚══════════════════════════════════════════╝");

        for run in &self.runs {
            if let TestResult::Failed {
                reason,
                output_path,
            } = &run.result
            {
                println!("  ✗ {} - {} (see {})", run.name, reason, output_path.display());
            }
        }
    }
}
