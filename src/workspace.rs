use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Result;

pub const SILENCE_LOG: &str = "tempSilence.txt";
pub const SPLIT_DIR: &str = "tempVideos";
pub const CONVERTED_DIR: &str = "convertedVideos";
pub const MANIFEST: &str = "join.txt";
pub const PROBE_REPORT: &str = "superTemp.txt";

/// Marker carried by the normalized intermediate's file name.
pub const NORMALIZED_MARKER: &str = "-normalized";
pub const FINAL_MARKER: &str = "-final";

/// The fixed set of scratch paths a run uses, rooted at the working directory.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Workspace in the process's current directory.
    pub fn current() -> Result<Self> {
        Ok(Self::new(std::env::current_dir()?))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn silence_log(&self) -> PathBuf {
        self.root.join(SILENCE_LOG)
    }

    pub fn split_dir(&self) -> PathBuf {
        self.root.join(SPLIT_DIR)
    }

    pub fn converted_dir(&self) -> PathBuf {
        self.split_dir().join(CONVERTED_DIR)
    }

    pub fn manifest(&self) -> PathBuf {
        self.root.join(MANIFEST)
    }

    pub fn probe_report(&self) -> PathBuf {
        self.root.join(PROBE_REPORT)
    }

    /// `<stem>-final.mp4` in the workspace root.
    pub fn final_output(&self, input: &Path) -> PathBuf {
        let stem = input.file_stem().unwrap_or_default();
        self.root
            .join(format!("{}{FINAL_MARKER}.mp4", stem.to_string_lossy()))
    }

    /// Remove every scratch path left by a previous run.
    ///
    /// `normalized` is only deleted when its file name carries the
    /// normalization marker. Missing paths are skipped, so this can run any
    /// number of times. Returns the paths that were removed.
    pub fn reset(&self, normalized: Option<&Path>) -> Result<Vec<PathBuf>> {
        let mut removed = Vec::new();

        let split_dir = self.split_dir();
        if split_dir.exists() {
            fs::remove_dir_all(&split_dir)?;
            removed.push(split_dir);
        }

        for file in [self.silence_log(), self.manifest(), self.probe_report()] {
            if file.exists() {
                fs::remove_file(&file)?;
                removed.push(file);
            }
        }

        if let Some(path) = normalized {
            let marked = path
                .file_name()
                .is_some_and(|n| n.to_string_lossy().contains(NORMALIZED_MARKER));
            if marked && path.exists() {
                fs::remove_file(path)?;
                removed.push(path.to_path_buf());
            }
        }

        for path in &removed {
            debug!("Cleaned {}", path.display());
        }

        Ok(removed)
    }
}

/// `<parent>/<stem>-normalized.mp4` next to the input.
pub fn normalized_path(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default();
    input.with_file_name(format!(
        "{}{NORMALIZED_MARKER}.mp4",
        stem.to_string_lossy()
    ))
}
