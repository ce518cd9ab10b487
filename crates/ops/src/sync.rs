//! Mirror a source directory as bzip2 files

use std::collections::HashSet;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use bubz2_compress::{compress_file, destination_path};
use bubz2_config::{calculate_jobs, Config};
use bubz2_errors::{Error, OpsError, StorageError, UserFacingError};
use bubz2_events::{AppEvent, EventEmitter, FailureContext, SyncEvent};
use bubz2_pattern::IgnoreRules;
use bubz2_state::StateFile;
use bubz2_types::{CompressedFile, CompressionLevel, FailedFile, SyncReport};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, instrument};
use walkdir::WalkDir;

use crate::OpsCtx;

/// Everything a sync run needs to know
#[derive(Clone, Debug)]
pub struct SyncRequest {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub state_path: PathBuf,
    pub ignore_file: Option<PathBuf>,
    pub level: CompressionLevel,
    /// Concurrent compressions, `0` picks a value from the CPU count
    pub jobs: usize,
    /// Compress every file regardless of recorded times
    pub force: bool,
    /// Report what would be compressed without writing anything
    pub dry_run: bool,
    pub prune_state: bool,
    pub follow_symlinks: bool,
}

impl SyncRequest {
    /// Build a request from the effective configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the source or destination directory is not set.
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        Ok(Self {
            source: config.source()?.to_path_buf(),
            destination: config.destination()?.to_path_buf(),
            state_path: config.sync.state_path.clone(),
            ignore_file: config.sync.ignore_file.clone(),
            level: config.sync.level,
            jobs: config.general.jobs,
            force: false,
            dry_run: false,
            prune_state: config.sync.prune_state,
            follow_symlinks: config.sync.follow_symlinks,
        })
    }

    #[must_use]
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// A regular file found under the source directory
#[derive(Debug)]
struct SourceFile {
    relative: PathBuf,
    modified: u64,
    len: u64,
}

#[derive(Debug, Default)]
struct Scan {
    files: Vec<SourceFile>,
    ignored: Vec<PathBuf>,
    /// Entries the walk could not read, relative to the source
    unreadable: Vec<(PathBuf, StorageError)>,
}

/// A file whose compressed copy must be (re)written
#[derive(Debug)]
struct Job {
    relative: PathBuf,
    source: PathBuf,
    destination: PathBuf,
    modified: u64,
    len: u64,
}

/// Compress every new or modified file under `request.source` into
/// `request.destination`.
///
/// Files that fail to compress, and entries the walk cannot read (such as
/// dangling symlinks), are listed in the report rather than aborting the run;
/// their times are not recorded, so the next run retries them.
///
/// # Errors
///
/// Returns an error if the source directory is missing, the ignore file or
/// the state file cannot be read, the walk hits a symlink loop or cannot read
/// the source itself, or the state cannot be saved.
#[instrument(level = "debug", skip_all, fields(source = %request.source.display()))]
pub async fn sync(ctx: &OpsCtx, request: &SyncRequest) -> Result<SyncReport, Error> {
    let start = Instant::now();
    ctx.emit_operation_started("sync");

    let result = run(ctx, request, start).await;
    match &result {
        Ok(report) => ctx.emit_operation_completed("sync", report.is_success()),
        Err(e) => ctx.emit_operation_failed("sync", e.to_string()),
    }
    result
}

async fn run(ctx: &OpsCtx, request: &SyncRequest, start: Instant) -> Result<SyncReport, Error> {
    check_source(&request.source).await?;

    let rules = match &request.ignore_file {
        Some(path) => IgnoreRules::load(path).await?,
        None => IgnoreRules::new(),
    };
    let mut state = StateFile::open(&request.state_path).await?;

    ctx.emit(AppEvent::Sync(SyncEvent::ScanStarted {
        source: request.source.clone(),
        destination: request.destination.clone(),
    }));

    let scan = {
        let source = request.source.clone();
        let destination = request.destination.clone();
        let follow_symlinks = request.follow_symlinks;
        tokio::task::spawn_blocking(move || {
            scan_source(&source, &destination, &rules, follow_symlinks)
        })
        .await
        .map_err(|e| OpsError::TaskJoinFailed {
            message: e.to_string(),
        })??
    };

    let mut report = SyncReport {
        scanned: scan.files.len() + scan.unreadable.len(),
        ignored: scan.ignored.len(),
        dry_run: request.dry_run,
        ..SyncReport::default()
    };

    for path in scan.ignored {
        ctx.emit_file_ignored(request.source.join(path));
    }

    let (jobs, mut seen) = plan_jobs(ctx, request, &state, scan.files, &mut report).await;

    // Keep their records; a later run retries them
    for (relative, error) in scan.unreadable {
        let source = request.source.join(&relative);
        ctx.emit_compression_failed(&source, FailureContext::from_error(&error));
        report.failed.push(FailedFile {
            source,
            error: error.user_message().into_owned(),
        });
        seen.insert(relative);
    }

    let workers = calculate_jobs(request.jobs);
    ctx.emit(AppEvent::Sync(SyncEvent::CompressionQueued {
        files: jobs.len(),
        jobs: workers,
        dry_run: request.dry_run,
    }));
    info!(
        scanned = report.scanned,
        stale = jobs.len(),
        ignored = report.ignored,
        "scan finished"
    );

    if request.dry_run {
        for job in jobs {
            ctx.emit_file_compressed(&job.source, &job.destination, job.len, 0);
            report.compressed.push(CompressedFile {
                source: job.source,
                destination: job.destination,
                bytes_in: job.len,
                bytes_out: 0,
            });
        }
    } else {
        compress_all(ctx, jobs, request.level, workers, &mut state, &mut report).await?;
    }

    let pruned = if request.prune_state {
        state.retain_paths(&seen)
    } else {
        0
    };

    if request.dry_run {
        debug!("dry run, state file left untouched");
    } else if state.is_dirty() {
        state.save().await?;
        ctx.emit(AppEvent::Sync(SyncEvent::StateSaved {
            path: state.path().to_path_buf(),
            records: state.len(),
            pruned,
        }));
    }

    report.compressed.sort_by(|a, b| a.source.cmp(&b.source));
    report.failed.sort_by(|a, b| a.source.cmp(&b.source));
    report.duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

    ctx.emit(AppEvent::Sync(SyncEvent::Completed {
        compressed: report.compressed.len(),
        failed: report.failed.len(),
        up_to_date: report.up_to_date,
        ignored: report.ignored,
        duration_ms: report.duration_ms,
    }));

    Ok(report)
}

/// Split scanned files into stale ones and ones whose output is current
async fn plan_jobs(
    ctx: &OpsCtx,
    request: &SyncRequest,
    state: &StateFile,
    files: Vec<SourceFile>,
    report: &mut SyncReport,
) -> (Vec<Job>, HashSet<PathBuf>) {
    let mut seen = HashSet::with_capacity(files.len());
    let mut jobs = Vec::new();
    for file in files {
        let destination = destination_path(&request.destination, &file.relative);
        let stale = request.force
            || state.time_of(&file.relative) != Some(file.modified)
            || !tokio::fs::try_exists(&destination).await.unwrap_or(false);

        if stale {
            jobs.push(Job {
                source: request.source.join(&file.relative),
                destination,
                relative: file.relative.clone(),
                modified: file.modified,
                len: file.len,
            });
        } else {
            report.up_to_date += 1;
            ctx.emit_file_up_to_date(&file.relative);
        }
        seen.insert(file.relative);
    }
    (jobs, seen)
}

async fn check_source(source: &Path) -> Result<(), Error> {
    match tokio::fs::metadata(source).await {
        Ok(metadata) if metadata.is_dir() => Ok(()),
        Ok(_) => Err(OpsError::SourceNotDirectory {
            path: source.display().to_string(),
        }
        .into()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(OpsError::SourceNotFound {
            path: source.display().to_string(),
        }
        .into()),
        Err(e) => Err(Error::io_with_path(&e, source)),
    }
}

/// Walk `source` depth first, collecting regular files and ignored paths.
///
/// Ignored directories are not descended into. When the destination lies
/// inside the source its subtree is skipped, otherwise every run would
/// compress the previous run's output. Entries that cannot be read are
/// collected in [`Scan::unreadable`]; symlink loops and errors on the source
/// itself end the walk.
fn scan_source(
    source: &Path,
    destination: &Path,
    rules: &IgnoreRules,
    follow_symlinks: bool,
) -> Result<Scan, Error> {
    let nested_destination = nested_destination(source, destination);
    let mut scan = Scan::default();

    let walker = WalkDir::new(source)
        .follow_links(follow_symlinks)
        .min_depth(1)
        .into_iter()
        .filter_entry(|entry| {
            let Ok(relative) = entry.path().strip_prefix(source) else {
                return true;
            };
            if nested_destination.as_deref() == Some(relative) {
                debug!(path = %relative.display(), "skipping destination inside source");
                return false;
            }
            if rules.is_path_ignored(relative) {
                scan.ignored.push(relative.to_path_buf());
                return false;
            }
            true
        });

    let mut files = Vec::new();
    let mut unreadable = Vec::new();
    let mut ignored_unreadable = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let (relative, error) = unreadable_entry(source, &e)?;
                if rules.is_path_ignored(&relative) {
                    ignored_unreadable.push(relative);
                } else {
                    unreadable.push((relative, error));
                }
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let metadata = match entry.metadata() {
            Ok(metadata) => metadata,
            Err(e) => {
                unreadable.push(unreadable_entry(source, &e)?);
                continue;
            }
        };
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|_| StorageError::InvalidPath {
                path: entry.path().display().to_string(),
            })?
            .to_path_buf();

        files.push(SourceFile {
            relative,
            modified: metadata.modified().map(unix_seconds).unwrap_or(0),
            len: metadata.len(),
        });
    }

    scan.files = files;
    scan.ignored.extend(ignored_unreadable);
    scan.unreadable = unreadable;
    Ok(scan)
}

/// Turn a per-entry walk error into a failed entry, or fail the walk for
/// loops and errors that have no entry path below the source
fn unreadable_entry(
    source: &Path,
    error: &walkdir::Error,
) -> Result<(PathBuf, StorageError), Error> {
    let fatal = || StorageError::WalkFailed {
        message: error.to_string(),
    };
    if error.loop_ancestor().is_some() || error.depth() == 0 {
        return Err(fatal().into());
    }
    let relative = error
        .path()
        .and_then(|path| path.strip_prefix(source).ok())
        .filter(|relative| !relative.as_os_str().is_empty())
        .ok_or_else(fatal)?
        .to_path_buf();

    let message = error
        .io_error()
        .map_or_else(|| error.to_string(), ToString::to_string);
    debug!(path = %relative.display(), error = %message, "unreadable entry");
    let error = StorageError::UnreadableEntry {
        path: relative.display().to_string(),
        message,
    };
    Ok((relative, error))
}

/// Path of `destination` relative to `source`, if it lies inside it
fn nested_destination(source: &Path, destination: &Path) -> Option<PathBuf> {
    let source = std::fs::canonicalize(source).ok()?;
    let destination = std::fs::canonicalize(destination).ok()?;
    destination
        .strip_prefix(&source)
        .ok()
        .filter(|relative| !relative.as_os_str().is_empty())
        .map(Path::to_path_buf)
}

fn unix_seconds(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

async fn compress_all(
    ctx: &OpsCtx,
    jobs: Vec<Job>,
    level: CompressionLevel,
    workers: usize,
    state: &mut StateFile,
    report: &mut SyncReport,
) -> Result<(), Error> {
    let mut tasks = spawn_bounded(jobs, workers, move |job| async move {
        let result = compress_job(&job, level).await;
        (job, result)
    })
    .await?;

    while let Some(joined) = tasks.join_next().await {
        let (job, result) = joined.map_err(|e| OpsError::TaskJoinFailed {
            message: e.to_string(),
        })?;

        match result {
            Ok(compressed) => {
                if !state.set_time_of(&job.relative, job.modified) {
                    ctx.emit_warning_with_context(
                        "path is not valid UTF-8, its time is not recorded",
                        job.relative.display().to_string(),
                    );
                }
                ctx.emit_file_compressed(
                    &compressed.source,
                    &compressed.destination,
                    compressed.bytes_in,
                    compressed.bytes_out,
                );
                report.compressed.push(compressed);
            }
            Err(e) => {
                ctx.emit_compression_failed(&job.source, FailureContext::from_error(&e));
                report.failed.push(FailedFile {
                    source: job.source,
                    error: e.user_message().into_owned(),
                });
            }
        }
    }

    Ok(())
}

/// Spawn `work` for each item, with at most `workers` tasks running at once
async fn spawn_bounded<T, R, F, Fut>(
    items: Vec<T>,
    workers: usize,
    work: F,
) -> Result<JoinSet<R>, Error>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> Fut,
    Fut: Future<Output = R> + Send + 'static,
{
    let semaphore = Arc::new(Semaphore::new(workers.max(1)));
    let mut tasks = JoinSet::new();

    for item in items {
        let permit = semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| OpsError::TaskJoinFailed {
                message: format!("semaphore acquire error: {e}"),
            })?;

        let task = work(item);
        tasks.spawn(async move {
            let _permit = permit;
            task.await
        });
    }

    Ok(tasks)
}

async fn compress_job(job: &Job, level: CompressionLevel) -> Result<CompressedFile, Error> {
    if let Some(parent) = job.destination.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| Error::io_with_path(&e, parent))?;
    }
    compress_file(&job.source, &job.destination, level).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn rules(lines: &str) -> IgnoreRules {
        let mut rules = IgnoreRules::new();
        rules.read_from(lines.as_bytes()).unwrap();
        rules
    }

    #[test]
    fn test_scan_skips_ignored_directories() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("src");
        std::fs::create_dir_all(source.join("maps")).unwrap();
        std::fs::create_dir_all(source.join("cfg")).unwrap();
        std::fs::write(source.join("maps/a.bsp"), b"map").unwrap();
        std::fs::write(source.join("maps/a.nav"), b"nav").unwrap();
        std::fs::write(source.join("cfg/server.cfg"), b"cfg").unwrap();

        let scan = scan_source(
            &source,
            &dir.path().join("out"),
            &rules("*.nav\ncfg\n"),
            true,
        )
        .unwrap();

        let files: Vec<_> = scan.files.iter().map(|f| f.relative.clone()).collect();
        assert_eq!(files, vec![PathBuf::from("maps").join("a.bsp")]);
        assert_eq!(scan.ignored.len(), 2);
        assert!(scan.ignored.contains(&PathBuf::from("cfg")));
    }

    #[test]
    fn test_scan_skips_nested_destination() {
        let dir = tempdir().unwrap();
        let source = dir.path();
        std::fs::create_dir_all(source.join("fastdl")).unwrap();
        std::fs::write(source.join("a.bsp"), b"map").unwrap();
        std::fs::write(source.join("fastdl/a.bsp.bz2"), b"old").unwrap();

        let scan = scan_source(source, &source.join("fastdl"), &IgnoreRules::new(), true).unwrap();
        assert_eq!(scan.files.len(), 1);
        assert_eq!(scan.files[0].relative, PathBuf::from("a.bsp"));
        assert_eq!(scan.files[0].len, 3);
        assert!(scan.ignored.is_empty());
    }

    #[test]
    fn test_keep_rule_wins_in_scan() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), b"a").unwrap();
        std::fs::write(dir.path().join("b.txt"), b"b").unwrap();

        let rules = rules("!b.txt\n*.txt\n");
        let scan = scan_source(dir.path(), &dir.path().join("out"), &rules, true).unwrap();
        assert_eq!(scan.files.len(), 1);
        assert_eq!(scan.files[0].relative, PathBuf::from("b.txt"));
    }

    #[test]
    fn test_nested_destination() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("out")).unwrap();
        assert_eq!(
            nested_destination(dir.path(), &dir.path().join("out")),
            Some(PathBuf::from("out"))
        );
        assert_eq!(nested_destination(dir.path(), dir.path()), None);
        assert_eq!(nested_destination(dir.path(), &dir.path().join("missing")), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_collects_dangling_symlinks() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a.bsp"), b"map").unwrap();
        std::os::unix::fs::symlink(dir.path().join("gone.wav"), dir.path().join("broken.wav"))
            .unwrap();

        let out = dir.path().join("out");
        let scan = scan_source(dir.path(), &out, &IgnoreRules::new(), true).unwrap();
        assert_eq!(scan.files.len(), 1);
        assert_eq!(scan.unreadable.len(), 1);
        let (relative, error) = &scan.unreadable[0];
        assert_eq!(relative, &PathBuf::from("broken.wav"));
        assert!(matches!(error, StorageError::UnreadableEntry { .. }));

        // Not followed, the link is simply not a regular file
        let scan = scan_source(dir.path(), &out, &IgnoreRules::new(), false).unwrap();
        assert_eq!(scan.files.len(), 1);
        assert!(scan.unreadable.is_empty());
    }

    #[test]
    fn test_scan_of_missing_source_fails() {
        let dir = tempdir().unwrap();
        let err = scan_source(
            &dir.path().join("missing"),
            &dir.path().join("out"),
            &IgnoreRules::new(),
            true,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Storage(StorageError::WalkFailed { .. })));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_spawn_bounded_limits_running_tasks() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        for workers in [1, 3] {
            let running = Arc::new(AtomicUsize::new(0));
            let peak = Arc::new(AtomicUsize::new(0));
            let mut tasks = spawn_bounded((0..8).collect(), workers, |i: usize| {
                let running = Arc::clone(&running);
                let peak = Arc::clone(&peak);
                async move {
                    let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
                    running.fetch_sub(1, Ordering::SeqCst);
                    i
                }
            })
            .await
            .unwrap();

            let mut done = Vec::new();
            while let Some(joined) = tasks.join_next().await {
                done.push(joined.unwrap());
            }
            done.sort_unstable();
            assert_eq!(done, (0..8).collect::<Vec<_>>());
            let peak = peak.load(Ordering::SeqCst);
            assert!(peak >= 1 && peak <= workers, "peak {peak} with {workers} workers");
        }
    }

    #[tokio::test]
    async fn test_spawn_bounded_treats_zero_workers_as_one() {
        let mut tasks = spawn_bounded(vec![1, 2], 0, |i: u32| async move { i * 2 })
            .await
            .unwrap();
        let mut total = 0;
        while let Some(joined) = tasks.join_next().await {
            total += joined.unwrap();
        }
        assert_eq!(total, 6);
    }

    #[test]
    fn test_unix_seconds_before_epoch() {
        let before = UNIX_EPOCH - std::time::Duration::from_secs(5);
        assert_eq!(unix_seconds(before), 0);
        assert_eq!(
            unix_seconds(UNIX_EPOCH + std::time::Duration::from_secs(42)),
            42
        );
    }
}
