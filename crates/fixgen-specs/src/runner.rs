//! Parallel fill over spec files and statistics

use crate::context::FillContext;
use crate::error::{SpecError, SpecResult};
use crate::fill::{fill, fixture_id, GroupTarget};
use crate::groups::PreAllocGroups;
use crate::spec::{load_spec_file, TestCase};
use fixgen_fixtures::{Fixture, FixtureFormat};
use fixgen_forks::Network;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// A named test case and the spec file it came from
#[derive(Debug, Clone)]
pub struct FillJob {
    /// Spec file stem, names the output file
    pub source: String,
    /// Test name
    pub name: String,
    /// The test
    pub case: TestCase,
}

impl FillJob {
    /// Jobs of one spec file, in name order
    pub fn from_file(path: &Path) -> SpecResult<Vec<FillJob>> {
        let source = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .ok_or_else(|| SpecError::SpecFile {
                path: path.to_path_buf(),
                reason: "no file name".into(),
            })?;
        Ok(load_spec_file(path)?
            .into_iter()
            .map(|(name, case)| FillJob {
                source: source.clone(),
                name,
                case,
            })
            .collect())
    }
}

/// Spec files under `paths`: files as given, directories searched for
/// `.json` files recursively, in path order
pub fn collect_spec_files(paths: &[PathBuf]) -> SpecResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            collect_recursive(path, &mut files)?;
        } else {
            files.push(path.clone());
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

fn collect_recursive(dir: &Path, files: &mut Vec<PathBuf>) -> SpecResult<()> {
    let io_err = |e: std::io::Error| SpecError::SpecFile {
        path: dir.to_path_buf(),
        reason: e.to_string(),
    };
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_dir() {
            collect_recursive(&path, files)?;
        } else if path.extension().is_some_and(|e| e == "json") {
            files.push(path);
        }
    }
    Ok(())
}

/// A produced fixture and where it goes
#[derive(Debug, Clone)]
pub struct FilledFixture {
    /// Spec file stem
    pub source: String,
    /// Fixture id
    pub id: String,
    /// Sealed fixture
    pub fixture: Fixture,
}

/// Aggregated fill statistics
#[derive(Debug, Default)]
pub struct FillStats {
    /// Fills attempted or skipped
    pub total: usize,
    /// Fixtures produced
    pub filled: usize,
    /// Fills that failed
    pub failed: usize,
    /// Fills not attempted after a stop
    pub skipped: usize,
    /// Wall time
    pub duration: Duration,
    /// Failed fixture ids with reasons
    pub failures: Vec<(String, String)>,
}

impl FillStats {
    /// Create empty stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Success rate as percentage
    pub fn pass_rate(&self) -> f64 {
        let executed = self.filled + self.failed;
        if executed == 0 {
            return 100.0;
        }
        (self.filled as f64 / executed as f64) * 100.0
    }

    /// Print summary
    pub fn print_summary(&self) {
        println!("\n========================================");
        println!("Fill Summary");
        println!("========================================");
        println!("Total:   {}", self.total);
        println!("Filled:  {}", self.filled);
        println!("Failed:  {}", self.failed);
        println!("Skipped: {}", self.skipped);
        println!("Pass Rate: {:.2}%", self.pass_rate());
        println!("Duration: {:.2}s", self.duration.as_secs_f64());

        if !self.failures.is_empty() {
            println!("\nFailed fixtures:");
            for (id, reason) in &self.failures {
                println!("  - {}: {}", id, reason);
            }
        }
    }
}

/// Output of [`FillRunner::run`]
#[derive(Debug)]
pub struct FillReport {
    /// Produced fixtures in job order
    pub fixtures: Vec<FilledFixture>,
    /// Statistics
    pub stats: FillStats,
    /// Pre-allocation groups, when grouping was enabled
    pub groups: Option<PreAllocGroups>,
}

enum Outcome {
    Filled(FilledFixture),
    Failed(String, String),
    Skipped,
}

/// Fills jobs on a worker pool
#[derive(Debug)]
pub struct FillRunner {
    ctx: FillContext,
    workers: usize,
    stop_on_first_error: bool,
    group_salt: Option<String>,
}

impl FillRunner {
    /// Runner with one worker per core
    pub fn new(ctx: FillContext) -> Self {
        Self {
            ctx,
            workers: 0,
            stop_on_first_error: false,
            group_salt: None,
        }
    }

    /// Worker count, zero for one per core
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Skip remaining work after the first failure
    pub fn stop_on_first_error(mut self, stop: bool) -> Self {
        self.stop_on_first_error = stop;
        self
    }

    /// Collect blockchain geneses into pre-allocation groups keyed with `salt`
    pub fn with_pre_alloc_groups(mut self, salt: impl Into<String>) -> Self {
        self.group_salt = Some(salt.into());
        self
    }

    /// Fill every selected (network, format) pair of every job
    pub fn run(&self, jobs: &[FillJob]) -> SpecResult<FillReport> {
        let start = Instant::now();
        let units: Vec<(&FillJob, Network, FixtureFormat)> = jobs
            .iter()
            .flat_map(|job| {
                let formats = job.case.selected_formats();
                job.case.networks.iter().flat_map(move |network| {
                    formats.clone().into_iter().map(move |format| (job, *network, format))
                })
            })
            .collect();
        tracing::info!(jobs = jobs.len(), fixtures = units.len(), "filling");

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .build()
            .map_err(|e| SpecError::Pool(e.to_string()))?;
        let groups = self.group_salt.as_ref().map(PreAllocGroups::new);
        let stop = AtomicBool::new(false);

        let outcomes: Vec<Outcome> = pool.install(|| {
            units
                .par_iter()
                .map(|(job, network, format)| {
                    if stop.load(Ordering::Relaxed) {
                        return Outcome::Skipped;
                    }
                    let id = fixture_id(&job.name, *network, *format);
                    let group = groups.as_ref().map(|groups| GroupTarget {
                        groups,
                        test_id: &id,
                    });
                    match fill(&self.ctx, &job.case, *network, *format, group) {
                        Ok(fixture) => {
                            tracing::debug!(test = %id, "filled");
                            Outcome::Filled(FilledFixture {
                                source: job.source.clone(),
                                id,
                                fixture,
                            })
                        }
                        Err(e) => {
                            tracing::warn!(test = %id, error = %e, "fill failed");
                            if self.stop_on_first_error {
                                stop.store(true, Ordering::Relaxed);
                            }
                            Outcome::Failed(id, e.to_string())
                        }
                    }
                })
                .collect()
        });

        let mut stats = FillStats::new();
        let mut fixtures = Vec::new();
        for outcome in outcomes {
            stats.total += 1;
            match outcome {
                Outcome::Filled(f) => {
                    stats.filled += 1;
                    fixtures.push(f);
                }
                Outcome::Failed(id, reason) => {
                    stats.failed += 1;
                    stats.failures.push((id, reason));
                }
                Outcome::Skipped => stats.skipped += 1,
            }
        }
        stats.duration = start.elapsed();
        tracing::info!(
            filled = stats.filled,
            failed = stats.failed,
            skipped = stats.skipped,
            "fill done"
        );

        Ok(FillReport {
            fixtures,
            stats,
            groups,
        })
    }
}
