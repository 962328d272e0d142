//! Orchestration of the external synthesizer and compiler.
//!
//! Harvesting produces compiled-program directories for the dataset: a
//! bounded pool of workers repeatedly synthesizes a random program and
//! compiles it, discarding failed attempts, until the target number of clean
//! compiles is reached. A shared stop flag cancels outstanding workers once
//! the target is met, and every compiler invocation runs under a per-attempt
//! timeout; a timeout counts as a failed attempt.
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use crossbeam_channel::{unbounded, Sender};
use rand::RngExt;
use tracing::{debug, info, warn};

use crate::dataset::assemble::find_program_dirs;
use crate::error::{Error, Result};

/// Line prefix in the compile log that marks a clean compile.
const CLEAN_COMPILE_PREFIX: &str = "0 errors";

/// Log file capturing both tools' output inside an attempt directory.
const ATTEMPT_LOG: &str = "log.txt";

/// Configuration for one harvest run.
#[derive(Clone, Debug)]
pub struct HarvestConfig {
    /// Program synthesizer executable.
    pub synthesizer: PathBuf,
    pub synthesizer_args: Vec<String>,
    /// Switch compiler executable.
    pub compiler: PathBuf,
    pub compiler_args: Vec<String>,
    /// Successful program directories to produce.
    pub target: usize,
    /// Worker threads running attempts concurrently.
    pub workers: usize,
    /// Time budget for one compiler invocation.
    pub attempt_timeout: Duration,
    /// Directory attempt directories are created under.
    pub root: PathBuf,
}

impl HarvestConfig {
    pub fn new(
        synthesizer: impl Into<PathBuf>,
        compiler: impl Into<PathBuf>,
        target: usize,
    ) -> Self {
        Self {
            synthesizer: synthesizer.into(),
            synthesizer_args: default_synthesizer_args(),
            compiler: compiler.into(),
            compiler_args: default_compiler_args(),
            target,
            workers: 4,
            attempt_timeout: Duration::from_secs(30),
            root: PathBuf::from("."),
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.target == 0 {
            return Err(Error::Other("harvest target must be > 0".into()));
        }
        if self.workers == 0 {
            return Err(Error::Other("harvest needs at least one worker".into()));
        }
        Ok(())
    }
}

fn default_synthesizer_args() -> Vec<String> {
    [
        "--target",
        "tofino",
        "--arch",
        "tna",
        "./smith.p4",
        "--generate-dag",
        "--dag-node-num",
        "9",
        "--dag-density",
        "0.6",
    ]
    .map(str::to_owned)
    .to_vec()
}

fn default_compiler_args() -> Vec<String> {
    [
        "./smith.p4",
        "-g",
        "--target",
        "tofino",
        "--arch",
        "tna",
        "--verbose",
        "--enable-event-logger",
        "--optimized-source",
        "opt.p4",
        "-Ttable_dependency_graph:3,table_dependency_summary:3,table_placement:5",
    ]
    .map(str::to_owned)
    .to_vec()
}

/// Result of a harvest run.
#[derive(Clone, Debug, Default)]
pub struct HarvestReport {
    /// Directories holding cleanly compiled programs.
    pub produced: Vec<PathBuf>,
    /// Total attempts across all workers, successful or not.
    pub attempts: usize,
}

/// Runs the harvest: spawns the worker pool, collects produced directories
/// until the target count is reached, then cancels and joins the workers.
pub fn run(config: &HarvestConfig) -> Result<HarvestReport> {
    config.validate()?;
    fs::create_dir_all(&config.root)?;

    let stop = Arc::new(AtomicBool::new(false));
    let attempts = Arc::new(AtomicUsize::new(0));
    let (tx, rx) = unbounded::<PathBuf>();

    let mut handles = Vec::with_capacity(config.workers);
    for worker in 0..config.workers {
        let config = config.clone();
        let stop = Arc::clone(&stop);
        let attempts = Arc::clone(&attempts);
        let tx = tx.clone();
        handles.push(thread::spawn(move || {
            worker_loop(worker, &config, &stop, &attempts, &tx);
        }));
    }
    drop(tx);

    let mut produced = Vec::with_capacity(config.target);
    while produced.len() < config.target {
        match rx.recv() {
            Ok(dir) => {
                produced.push(dir);
                info!("harvested {}/{} programs", produced.len(), config.target);
            }
            // All workers exited; no more results will arrive.
            Err(_) => break,
        }
    }
    stop.store(true, Ordering::Relaxed);

    for handle in handles {
        if handle.join().is_err() {
            warn!("harvest worker panicked");
        }
    }

    Ok(HarvestReport {
        produced,
        attempts: attempts.load(Ordering::Relaxed),
    })
}

fn worker_loop(
    worker: usize,
    config: &HarvestConfig,
    stop: &AtomicBool,
    attempts: &AtomicUsize,
    tx: &Sender<PathBuf>,
) {
    while !stop.load(Ordering::Relaxed) {
        attempts.fetch_add(1, Ordering::Relaxed);
        match run_attempt(config) {
            Ok(Some(dir)) => {
                // The receiver hangs up once the target is met.
                if tx.send(dir).is_err() {
                    break;
                }
            }
            Ok(None) => debug!("worker {worker}: attempt failed, retrying"),
            Err(e) => warn!("worker {worker}: attempt error: {e}"),
        }
    }
}

/// Runs one synthesize-then-compile attempt in a fresh directory.
///
/// Returns the directory on a clean compile. Every other outcome removes the
/// directory before returning: tool failures, compile timeouts, dirty compile
/// logs, and errors spawning the tools themselves.
fn run_attempt(config: &HarvestConfig) -> Result<Option<PathBuf>> {
    let dir = config.root.join(attempt_dir_name());
    fs::create_dir_all(&dir)?;
    let log_path = dir.join(ATTEMPT_LOG);

    let clean = synthesize_and_compile(config, &dir, &log_path)
        .and_then(|completed| Ok(completed && log_reports_clean_compile(&log_path)?));
    if let Ok(true) = clean {
        return Ok(Some(dir));
    }

    if let Err(e) = fs::remove_dir_all(&dir) {
        warn!("could not remove failed attempt '{}': {e}", dir.display());
    }
    clean.map(|_| None)
}

fn synthesize_and_compile(config: &HarvestConfig, dir: &Path, log_path: &Path) -> Result<bool> {
    let log = File::create(log_path)?;
    let status = Command::new(&config.synthesizer)
        .args(&config.synthesizer_args)
        .current_dir(dir)
        .stdout(Stdio::from(log.try_clone()?))
        .stderr(Stdio::from(log))
        .status()?;
    if !status.success() {
        debug!("synthesizer failed with {status}");
        return Ok(false);
    }

    let log = File::options().append(true).open(log_path)?;
    let mut child = Command::new(&config.compiler)
        .args(&config.compiler_args)
        .current_dir(dir)
        .stdout(Stdio::from(log.try_clone()?))
        .stderr(Stdio::from(log))
        .spawn()?;

    // Poll rather than block so the timeout can fire.
    let deadline = Instant::now() + config.attempt_timeout;
    loop {
        if child.try_wait()?.is_some() {
            // The compiler's exit status is not trusted; the caller's log
            // check decides whether the compile was clean.
            return Ok(true);
        }
        if Instant::now() >= deadline {
            debug!("compile timed out after {:?}", config.attempt_timeout);
            child.kill().ok();
            child.wait().ok();
            return Ok(false);
        }
        thread::sleep(Duration::from_millis(50));
    }
}

fn log_reports_clean_compile(log_path: &Path) -> Result<bool> {
    let text = fs::read_to_string(log_path)?;
    Ok(text
        .lines()
        .any(|line| line.starts_with(CLEAN_COMPILE_PREFIX)))
}

fn attempt_dir_name() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    let suffix: u32 = rand::rng().random_range(0..1_000_000);
    format!("attempt_{millis}_{}_{suffix}", std::process::id())
}

/// Removes program directories whose compile log lacks the clean-compile
/// line. Returns the number of directories removed.
pub fn prune_failed_programs(root: &Path, marker: &Path) -> Result<usize> {
    let mut removed = 0;
    for dir in find_program_dirs(root, marker)? {
        let log_path = dir.join(ATTEMPT_LOG);
        let clean = log_path.is_file() && log_reports_clean_compile(&log_path)?;
        if clean {
            continue;
        }
        warn!("pruning '{}': no clean compile", dir.display());
        fs::remove_dir_all(&dir)?;
        removed += 1;
    }
    Ok(removed)
}
