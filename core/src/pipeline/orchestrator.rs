// ## 📂 File: `src/pipeline/orchestrator.rs`
// ## Wiring: walk -> Discover -> Decrypt -> Persist, plus the error sink

use std::fs;
use std::path::{Path, PathBuf};
use std::thread;

use chrono::Utc;
use crossbeam::channel::bounded;
use tracing::{debug, error, info};

use crate::constants::DEFAULT_BUFFER_SIZE;
use crate::pipeline::config::PipelineConfig;
use crate::pipeline::decrypt::run_decrypt;
use crate::pipeline::discover::{run_discover, walk_source};
use crate::pipeline::persist::run_persist;
use crate::pipeline::sink::run_error_sink;
use crate::pipeline::types::{report, FileFailure, FileTask, SourceFile};
use crate::recovery::ProcessedSet;
use crate::telemetry::{FailureRecord, RunCounters, RunReport, Stage, StageTimes, TelemetryTimer};
use crate::types::StreamError;

/// Everything a stage may read while the run is in progress.
pub struct PipelineContext<'a> {
    pub config: &'a PipelineConfig,
    /// `None` in single-file mode: nothing is skipped or recorded.
    pub state: Option<&'a ProcessedSet>,
    pub counters: &'a RunCounters,
    pub dest_root: &'a Path,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelinePhase {
    Idle,
    /// All stages alive.
    Running,
    /// Discover is done; Decrypt and Persist finish what is queued.
    Draining,
    Done,
}

/// Runs one source tree (or one file) through the pipeline.
#[derive(Debug)]
pub struct Orchestrator {
    config: PipelineConfig,
    phase: PipelinePhase,
}

impl Orchestrator {
    pub fn new(config: PipelineConfig) -> Result<Self, StreamError> {
        config.validate()?;
        Ok(Self {
            config,
            phase: PipelinePhase::Idle,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn phase(&self) -> PipelinePhase {
        self.phase
    }

    /// Directory source: resumable run. File source: one-file run, no state.
    pub fn process_path(&mut self, source: &Path, dest: &Path) -> Result<RunReport, StreamError> {
        let meta = fs::metadata(source)?;
        if meta.is_dir() {
            self.run_directory(source, dest)
        } else if meta.is_file() {
            self.run_single_file(source, dest)
        } else {
            Err(StreamError::Config(format!(
                "{} is neither a regular file nor a directory",
                source.display()
            )))
        }
    }

    /// Mirror `source_root` into `dest_root`, skipping files recorded in
    /// `<dest_root>/STATE_FILE_NAME` and recording each completed one.
    pub fn run_directory(&mut self, source_root: &Path, dest_root: &Path) -> Result<RunReport, StreamError> {
        let started_at = Utc::now();
        let timer = TelemetryTimer::new();
        info!(source = %source_root.display(), dest = %dest_root.display(), "directory run starting");

        fs::create_dir_all(dest_root)?;
        let state = ProcessedSet::load(dest_root)?;
        let walk = walk_source(source_root, self.config.traversal)?;
        debug!(files = walk.files.len(), unreadable = walk.unreadable.len(), "source walked");

        let unreadable: Vec<FileFailure> = walk
            .unreadable
            .into_iter()
            .map(|(path, e)| {
                let rel = path
                    .strip_prefix(source_root)
                    .map(|p| p.to_string_lossy().replace('\\', "/"))
                    .unwrap_or_else(|_| path.to_string_lossy().into_owned());
                FileFailure::new(Stage::Discover, &rel, path, e.into())
            })
            .collect();

        let counters = RunCounters::default();
        let (times, failures) = self.run_pipeline(dest_root, Some(&state), &counters, walk.files, unreadable)?;

        let report = RunReport::new(started_at, timer.elapsed(), counters.values(), times, failures);
        log_finished(&report);
        Ok(report)
    }

    /// Decrypt one file. `dest` is the output file, or an existing directory
    /// to place `<source file name>` in.
    pub fn run_single_file(&mut self, source: &Path, dest: &Path) -> Result<RunReport, StreamError> {
        let started_at = Utc::now();
        let timer = TelemetryTimer::new();
        info!(source = %source.display(), dest = %dest.display(), "single-file run starting");

        let (dest_root, rel_path) = single_file_target(source, dest)?;
        fs::create_dir_all(&dest_root)?;

        let file = SourceFile {
            path: source.to_path_buf(),
            rel_path,
        };
        let counters = RunCounters::default();
        let (times, failures) = self.run_pipeline(&dest_root, None, &counters, vec![file], Vec::new())?;

        let report = RunReport::new(started_at, timer.elapsed(), counters.values(), times, failures);
        log_finished(&report);
        Ok(report)
    }

    fn run_pipeline(
        &mut self,
        dest_root: &Path,
        state: Option<&ProcessedSet>,
        counters: &RunCounters,
        files: Vec<SourceFile>,
        early_failures: Vec<FileFailure>,
    ) -> Result<(StageTimes, Vec<FailureRecord>), StreamError> {
        let phase = &mut self.phase;
        let config = &self.config;
        let ctx = PipelineContext {
            config,
            state,
            counters,
            dest_root,
        };
        let ctx = &ctx;

        // ---- Channels ----
        let (input_tx, input_rx) = bounded::<FileTask>(config.input_queue_cap);
        let (output_tx, output_rx) = bounded::<FileTask>(config.output_queue_cap);
        let (err_tx, err_rx) = bounded::<FileFailure>(config.error_queue_cap);

        *phase = PipelinePhase::Running;
        debug!("pipeline running");

        let outcome = thread::scope(|scope| {
            let sink = scope.spawn(move || run_error_sink(err_rx));

            let errors = err_tx.clone();
            let discover = scope.spawn(move || run_discover(ctx, files, input_tx, errors));

            let errors = err_tx.clone();
            let decrypt = scope.spawn(move || run_decrypt(ctx, input_rx, output_tx, errors));

            let errors = err_tx.clone();
            let persist = scope.spawn(move || run_persist(ctx, output_rx, errors));

            for failure in early_failures {
                report(&err_tx, failure);
            }
            // sink ends once every stage has dropped its clone
            drop(err_tx);

            let mut times = StageTimes::default();
            let mut panicked = false;

            match discover.join() {
                Ok(t) => times.merge(&t),
                Err(_) => panicked = true,
            }
            *phase = PipelinePhase::Draining;
            debug!("discover joined, draining");

            for handle in [decrypt, persist] {
                match handle.join() {
                    Ok(t) => times.merge(&t),
                    Err(_) => panicked = true,
                }
            }

            let failures = sink.join().unwrap_or_else(|_| {
                panicked = true;
                Vec::new()
            });

            if panicked {
                return Err(StreamError::PipelineError("a pipeline stage panicked"));
            }
            Ok((times, failures))
        });

        *phase = PipelinePhase::Done;
        if let Err(e) = &outcome {
            error!(error = %e, "pipeline aborted");
        }
        outcome
    }
}

/// Resolve `(dest_root, rel_path)` for a single-file run.
fn single_file_target(source: &Path, dest: &Path) -> Result<(PathBuf, String), StreamError> {
    if dest.is_dir() {
        let name = source
            .file_name()
            .ok_or_else(|| StreamError::Config(format!("{} has no file name", source.display())))?;
        return Ok((dest.to_path_buf(), name.to_string_lossy().into_owned()));
    }

    let name = dest
        .file_name()
        .ok_or_else(|| StreamError::Config(format!("{} has no file name", dest.display())))?;
    let parent = match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((parent, name.to_string_lossy().into_owned()))
}

fn log_finished(report: &RunReport) {
    info!(
        discovered = report.files_discovered,
        skipped = report.files_skipped,
        decrypted = report.files_decrypted,
        failed = report.files_failed,
        bytes = report.bytes_plaintext,
        elapsed_ms = report.elapsed.as_millis() as u64,
        "run finished"
    );
}

/// Decrypt `source` into `dest` with `password`.
///
/// A directory source is mirrored into `dest` and can be resumed after an
/// interruption; a file source is decrypted to `dest` without any state.
/// `buffer_size == 0` selects the default chunk size.
///
/// Per-file failures do not fail the call; they are listed in the returned
/// [`RunReport`]. An `Err` means the run could not start or a stage died.
pub fn process_path(
    source: impl AsRef<Path>,
    dest: impl AsRef<Path>,
    password: &str,
    buffer_size: usize,
) -> Result<RunReport, StreamError> {
    let buffer_size = if buffer_size == 0 { DEFAULT_BUFFER_SIZE } else { buffer_size };
    let config = PipelineConfig::new(password).with_buffer_size(buffer_size);
    Orchestrator::new(config)?.process_path(source.as_ref(), dest.as_ref())
}
