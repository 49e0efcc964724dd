pub mod manifest;

pub use manifest::{collect_converted, render_manifest, sort_for_concat, write_manifest};

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::Result;
use crate::media::MediaTool;
use crate::segment::{Segment, SegmentKind};

/// Name of the first converted segment when the video opens with silence.
pub fn first_silence_name() -> String {
    Segment {
        index: 0,
        start: 0.0,
        duration: 0.0,
        kind: SegmentKind::Silence,
    }
    .converted_file_name()
}

/// Give an opening silent clip an audio track if it has none.
///
/// The concat demuxer needs every input to share a stream layout. Returns
/// `true` when a silent track was added.
pub fn fix_silent_first_clip(
    tool: &dyn MediaTool,
    converted_dir: &Path,
    probe_report: &Path,
) -> Result<bool> {
    let first = converted_dir.join(first_silence_name());
    if !first.exists() {
        debug!("Video does not open with silence, no audio fix-up needed");
        return Ok(false);
    }

    tool.probe_audio_streams(&first, probe_report)?;
    let report = fs::read_to_string(probe_report)?;
    fs::remove_file(probe_report)?;

    if !report.trim().is_empty() {
        debug!("{} already has audio", first.display());
        return Ok(false);
    }

    info!("Adding empty audio to {}", first.display());
    let temp = converted_dir.join(format!(
        "{}-temp.mp4",
        first_silence_name().trim_end_matches(".mp4")
    ));
    tool.add_silent_audio(&first, &temp)?;
    fs::rename(&temp, &first)?;

    Ok(true)
}

/// Outcome of the join stage.
#[derive(Debug, Clone)]
pub struct JoinResult {
    pub output: PathBuf,
    pub parts: Vec<PathBuf>,
    pub added_silent_audio: bool,
}

/// Fix up the first clip, write the manifest and concatenate into `output`.
pub fn join_converted(
    tool: &dyn MediaTool,
    converted_dir: &Path,
    manifest: &Path,
    probe_report: &Path,
    output: &Path,
) -> Result<JoinResult> {
    let added_silent_audio = fix_silent_first_clip(tool, converted_dir, probe_report)?;
    let parts = write_manifest(converted_dir, manifest)?;

    info!("Joining {} segments into {}", parts.len(), output.display());
    tool.concat(manifest, output)?;

    Ok(JoinResult {
        output: output.to_path_buf(),
        parts,
        added_silent_audio,
    })
}
