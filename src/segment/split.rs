use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use indicatif::ProgressBar;
use tracing::{debug, info};

use crate::error::{JumpcutError, Result};
use crate::media::MediaTool;

use super::Segment;

/// Cut every planned segment of `input` into its own file under `split_dir`.
///
/// The directory is recreated first. A file already present under a
/// segment's name is an error; nothing is overwritten. Once `cancelled` is
/// set no further cut is started.
pub fn split_video(
    tool: &dyn MediaTool,
    input: &Path,
    segments: &[Segment],
    split_dir: &Path,
    cancelled: &AtomicBool,
    progress: Option<&ProgressBar>,
) -> Result<Vec<PathBuf>> {
    if !input.exists() {
        return Err(JumpcutError::FileNotFound(input.display().to_string()));
    }

    if split_dir.exists() {
        fs::remove_dir_all(split_dir)?;
    }
    fs::create_dir_all(split_dir)?;

    info!(
        "Splitting {} into {} segments",
        input.display(),
        segments.len()
    );

    let mut paths = Vec::with_capacity(segments.len());
    for segment in segments {
        if cancelled.load(Ordering::Relaxed) {
            return Err(JumpcutError::Cancelled);
        }

        let output = split_dir.join(segment.file_name());
        if output.exists() {
            return Err(JumpcutError::SegmentExists(output));
        }

        debug!("Cutting {}", segment);
        tool.cut_segment(input, segment.start, segment.duration, &output)?;

        if let Some(pb) = progress {
            pb.inc(1);
        }
        paths.push(output);
    }

    Ok(paths)
}
