//! # Batch Alpha Correction
//!
//! Runs detection and correction over a list of files. Every file yields one
//! [`CorrectionResult`] in input order; a failing file never stops the batch.
//!
//! ## Output placement
//!
//! | Options | Output path |
//! |---------|-------------|
//! | `overwrite` | the input path (after a `<stem>.backup.<ext>` copy when `backup`) |
//! | `output_dir` + `preserve_structure` + common root | `output_dir/<path relative to root>` |
//! | `output_dir` | `output_dir/<file name>` |
//! | neither | `<stem>_corrected.<ext>` next to the input |
//!
//! Unchanged images are never written.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

use serde::{Serialize, Serializer};

use crate::alpha::correct::CorrectionStats;
use crate::alpha::detect::DetectionReport;
use crate::alpha::presets::BandSource;
use crate::error::{EngineError, EngineResult};

/// Settings shared by every item of a batch.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub source: BandSource,
    pub output_dir: Option<PathBuf>,
    pub preserve_structure: bool,
    pub preserve_gradient: bool,
    pub overwrite: bool,
    pub backup: bool,
}

impl BatchOptions {
    /// Write `<stem>_corrected` siblings, preserving structure and backing up
    /// if later switched to an output directory or overwrite.
    pub fn new(source: BandSource) -> Self {
        Self {
            source,
            output_dir: None,
            preserve_structure: true,
            preserve_gradient: false,
            overwrite: false,
            backup: true,
        }
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    /// Alpha changed and the result was written.
    Corrected,
    /// Nothing to change; no file written.
    Unchanged,
    /// The item failed; see `error`.
    Failed,
}

#[derive(Debug, Serialize)]
pub struct CorrectionResult {
    pub path: PathBuf,
    pub status: ItemStatus,
    pub output_path: Option<PathBuf>,
    pub backup_path: Option<PathBuf>,
    pub detection: Option<DetectionReport>,
    pub correction: Option<CorrectionStats>,
    #[serde(serialize_with = "error_message")]
    pub error: Option<EngineError>,
}

impl CorrectionResult {
    pub(crate) fn failed(path: &Path, error: EngineError) -> Self {
        Self {
            path: path.to_path_buf(),
            status: ItemStatus::Failed,
            output_path: None,
            backup_path: None,
            detection: None,
            correction: None,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status != ItemStatus::Failed
    }
}

fn error_message<S: Serializer>(error: &Option<EngineError>, serializer: S) -> Result<S::Ok, S::Error> {
    match error {
        Some(e) => serializer.serialize_some(&e.to_string()),
        None => serializer.serialize_none(),
    }
}

/// Per-status counts for a finished batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub corrected: usize,
    pub unchanged: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn from_results(results: &[CorrectionResult]) -> Self {
        results.iter().fold(
            Self {
                total: results.len(),
                ..Self::default()
            },
            |mut summary, result| {
                match result.status {
                    ItemStatus::Corrected => summary.corrected += 1,
                    ItemStatus::Unchanged => summary.unchanged += 1,
                    ItemStatus::Failed => summary.failed += 1,
                }
                summary
            },
        )
    }
}

/// Pretty JSON report of batch results.
pub fn results_to_json(results: &[CorrectionResult]) -> EngineResult<String> {
    serde_json::to_string_pretty(results).map_err(|e| EngineError::processing("serialize results", e))
}

/// Absolute, symlink-free form of `path` when it exists; absolute otherwise.
pub(crate) fn resolve(path: &Path) -> PathBuf {
    fs::canonicalize(path)
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// Deepest directory that is a string prefix (plus separator) of every resolved path.
///
/// Starts from the first path's parent and ascends until every other path
/// starts with it. Reaching the filesystem root means there is no common root.
pub fn common_root(paths: &[PathBuf]) -> Option<PathBuf> {
    let resolved: Vec<PathBuf> = paths.iter().map(|p| resolve(p)).collect();
    let mut root = resolved.first()?.parent()?.to_path_buf();
    for path in &resolved[1..] {
        let text = path.to_string_lossy();
        while !text.starts_with(&format!("{}{}", root.to_string_lossy(), MAIN_SEPARATOR)) {
            root = root.parent()?.to_path_buf();
            root.parent()?;
        }
    }
    Some(root)
}

/// Where a corrected image goes, per the placement table above.
pub fn output_path_for(input: &Path, options: &BatchOptions, root: Option<&Path>) -> PathBuf {
    if options.overwrite {
        return input.to_path_buf();
    }
    match &options.output_dir {
        Some(dir) => {
            let relative = root
                .filter(|_| options.preserve_structure)
                .and_then(|root| resolve(input).strip_prefix(root).ok().map(Path::to_path_buf));
            match relative {
                Some(relative) => dir.join(relative),
                None => dir.join(input.file_name().unwrap_or(input.as_os_str())),
            }
        }
        None => with_stem_suffix(input, "_corrected"),
    }
}

/// `<stem>.backup.<ext>` next to the input.
pub fn backup_path_for(input: &Path) -> PathBuf {
    with_stem_suffix(input, ".backup")
}

fn with_stem_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.file_stem().unwrap_or_default());
    name.push(suffix);
    if let Some(ext) = path.extension() {
        name.push(".");
        name.push(ext);
    }
    path.with_file_name(name)
}
