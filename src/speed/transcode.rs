use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use indicatif::ProgressBar;
use tracing::{debug, info};

use crate::error::{JumpcutError, Result};
use crate::media::MediaTool;
use crate::segment::Segment;

use super::{SpeedFactors, TempoChain};

/// Re-time every split segment into `converted_dir`.
///
/// Segments whose factor is 1 are moved rather than re-encoded. Outputs are
/// named `converted-<segment file name>` and returned in segment order.
/// Stops with [`JumpcutError::Cancelled`] before the next segment once
/// `cancelled` is set.
pub fn transcode_segments(
    tool: &dyn MediaTool,
    segments: &[Segment],
    split_dir: &Path,
    converted_dir: &Path,
    speeds: SpeedFactors,
    cancelled: &AtomicBool,
    progress: Option<&ProgressBar>,
) -> Result<Vec<PathBuf>> {
    if converted_dir.exists() {
        fs::remove_dir_all(converted_dir)?;
    }
    fs::create_dir_all(converted_dir)?;

    info!(
        "Re-timing {} segments (silence x{}, normal x{})",
        segments.len(),
        speeds.silence,
        speeds.normal
    );

    let mut outputs = Vec::with_capacity(segments.len());
    for segment in segments {
        if cancelled.load(Ordering::Relaxed) {
            return Err(JumpcutError::Cancelled);
        }

        let input = split_dir.join(segment.file_name());
        if !input.exists() {
            return Err(JumpcutError::FileNotFound(input.display().to_string()));
        }

        let output = converted_dir.join(segment.converted_file_name());
        let speed = speeds.for_kind(segment.kind);
        let tempo = TempoChain::for_speed(speed)?;

        if tempo.is_identity() {
            debug!("Moving {} unchanged", segment.file_name());
            fs::rename(&input, &output)?;
        } else {
            debug!(
                "Speeding {} x{} ({})",
                segment.file_name(),
                speed,
                tempo.to_filter()
            );
            tool.change_speed(&input, speed, &tempo, &output)?;
        }

        if let Some(pb) = progress {
            pb.inc(1);
        }
        outputs.push(output);
    }

    Ok(outputs)
}
