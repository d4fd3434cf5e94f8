//! This module mirrors one directory tree into another.
//!
//! Files are compared by modification time and size: a destination file is
//! replaced when it is missing, older than its source, or a different size.
//! Optionally, destination files without a source counterpart are removed.
//! A dry run performs every comparison but never touches the filesystem.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

const SIZE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
const OVERFLOW_UNIT: &str = "PB";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncOptions {
    pub dry_run: bool,
    pub delete_extra: bool,
}

/// Outcome of comparing a source file with its destination counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyDecision {
    Missing,
    Outdated,
    SizeMismatch,
    UpToDate,
}

impl CopyDecision {
    pub fn should_copy(self) -> bool {
        self != CopyDecision::UpToDate
    }
}

/// Progress notifications emitted while syncing, one per file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    Copied(PathBuf),
    Skipped(PathBuf),
    Deleted(PathBuf),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub copied: usize,
    pub skipped: usize,
    /// Extras removed, or that would be removed in a dry run.
    pub deleted: usize,
}

/// Formats a byte count with 1024-based units and one decimal.
///
/// # Examples
///
/// ```
/// use albumlinks::sync::format_size;
///
/// assert_eq!(format_size(1023), "1023.0 B");
/// assert_eq!(format_size(1536), "1.5 KB");
/// ```
pub fn format_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    for unit in SIZE_UNITS {
        if size < 1024.0 {
            return format!("{size:.1} {unit}");
        }
        size /= 1024.0;
    }
    format!("{size:.1} {OVERFLOW_UNIT}")
}

/// Lists every file under `root`, sorted by path. Symlinks to files count as files.
pub fn collect_files(root: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            io::Error::new(
                io::ErrorKind::Other,
                format!("Failed to read directory entry. Details: {}", e),
            )
        })?;
        if entry.path().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Total size of the files under `root`. Entries that cannot be read are ignored.
pub fn directory_size(root: &Path) -> u64 {
    WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter_map(|entry| fs::metadata(entry.path()).ok())
        .filter(|metadata| metadata.is_file())
        .map(|metadata| metadata.len())
        .sum()
}

/// Compares the metadata of a source file with that of its destination, if any.
pub fn decide(source: &fs::Metadata, destination: Option<&fs::Metadata>) -> io::Result<CopyDecision> {
    let Some(destination) = destination else {
        return Ok(CopyDecision::Missing);
    };

    if destination.modified()? < source.modified()? {
        Ok(CopyDecision::Outdated)
    } else if destination.len() != source.len() {
        Ok(CopyDecision::SizeMismatch)
    } else {
        Ok(CopyDecision::UpToDate)
    }
}

fn relative_path(path: &Path, base: &Path) -> io::Result<PathBuf> {
    path.strip_prefix(base)
        .map(Path::to_path_buf)
        .map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not under {}", path.display(), base.display()),
            )
        })
}

fn optional_metadata(path: &Path) -> io::Result<Option<fs::Metadata>> {
    match fs::metadata(path) {
        Ok(metadata) => Ok(Some(metadata)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Copies `source` to `destination`, creating parent directories and keeping the source mtime.
fn copy_preserving_mtime(source: &Path, destination: &Path, modified: SystemTime) -> io::Result<()> {
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(source, destination)?;
    File::options()
        .write(true)
        .open(destination)?
        .set_modified(modified)
}

/// A source/destination pair of directory roots.
#[derive(Debug, Clone)]
pub struct DirSync {
    source: PathBuf,
    destination: PathBuf,
}

impl DirSync {
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Decides whether the source file at `source_file` needs copying and copies it unless `dry_run`.
    ///
    /// Returns the decision along with the file's path relative to the source root.
    pub fn sync_file(&self, source_file: &Path, dry_run: bool) -> io::Result<(CopyDecision, PathBuf)> {
        let relative = relative_path(source_file, &self.source)?;
        let destination_file = self.destination.join(&relative);

        let source_metadata = fs::metadata(source_file)?;
        let destination_metadata = optional_metadata(&destination_file)?;
        let decision = decide(&source_metadata, destination_metadata.as_ref())?;

        tracing::debug!(path = %relative.display(), ?decision, "compared");
        if decision.should_copy() && !dry_run {
            copy_preserving_mtime(source_file, &destination_file, source_metadata.modified()?)?;
        }

        Ok((decision, relative))
    }

    /// Destination files, relative to the destination root, that have no source counterpart.
    pub fn find_extras(&self) -> io::Result<Vec<PathBuf>> {
        if !self.destination.exists() {
            return Ok(Vec::new());
        }

        let mut extras = Vec::new();
        for file in collect_files(&self.destination)? {
            let relative = relative_path(&file, &self.destination)?;
            if !self.source.join(&relative).exists() {
                extras.push(relative);
            }
        }
        Ok(extras)
    }

    /// Copies the given source files, then handles extras when requested.
    ///
    /// `on_event` is called once per file processed.
    pub fn sync_files(
        &self,
        source_files: &[PathBuf],
        options: SyncOptions,
        mut on_event: impl FnMut(SyncEvent),
    ) -> io::Result<SyncReport> {
        let mut report = SyncReport::default();

        for source_file in source_files {
            let (decision, relative) = self.sync_file(source_file, options.dry_run)?;
            if decision.should_copy() {
                report.copied += 1;
                on_event(SyncEvent::Copied(relative));
            } else {
                report.skipped += 1;
                on_event(SyncEvent::Skipped(relative));
            }
        }

        if options.delete_extra {
            for relative in self.find_extras()? {
                if !options.dry_run {
                    fs::remove_file(self.destination.join(&relative))?;
                }
                report.deleted += 1;
                on_event(SyncEvent::Deleted(relative));
            }
        }

        Ok(report)
    }

    /// Scans the source tree and syncs it in one go.
    pub fn run(&self, options: SyncOptions, on_event: impl FnMut(SyncEvent)) -> io::Result<SyncReport> {
        let source_files = collect_files(&self.source)?;
        self.sync_files(&source_files, options, on_event)
    }
}
