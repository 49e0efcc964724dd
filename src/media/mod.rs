pub mod ffmpeg;

pub use ffmpeg::{check_ffmpeg, check_ffprobe, Ffmpeg};

use std::path::Path;

use crate::error::Result;
use crate::speed::TempoChain;

/// Typed interface to the external media tool.
///
/// Every operation blocks until the underlying process exits and maps a
/// non-zero exit status to [`JumpcutError::CommandFailed`].
///
/// [`JumpcutError::CommandFailed`]: crate::error::JumpcutError::CommandFailed
pub trait MediaTool {
    /// Loudness-normalize `input` into `output`, copying the video stream.
    fn normalize_audio(&self, input: &Path, output: &Path) -> Result<()>;

    /// Run silence detection and write the tool's diagnostic stream to `log`.
    fn detect_silence(
        &self,
        input: &Path,
        threshold_db: f64,
        min_duration: f64,
        log: &Path,
    ) -> Result<()>;

    /// Container duration in seconds.
    fn probe_duration(&self, input: &Path) -> Result<f64>;

    /// Extract `[start, start + duration)` into `output`. Never overwrites.
    fn cut_segment(&self, input: &Path, start: f64, duration: f64, output: &Path) -> Result<()>;

    /// Re-encode `input` at `speed`: video timestamps scaled by `1/speed`,
    /// audio through `tempo`.
    fn change_speed(&self, input: &Path, speed: f64, tempo: &TempoChain, output: &Path)
        -> Result<()>;

    /// Write the audio stream report for `input` to `report`. An empty
    /// report means the file has no audio stream.
    fn probe_audio_streams(&self, input: &Path, report: &Path) -> Result<()>;

    /// Mux a generated silent audio track alongside the video of `input`.
    fn add_silent_audio(&self, input: &Path, output: &Path) -> Result<()>;

    /// Concatenate the files listed in a concat-demuxer manifest.
    fn concat(&self, manifest: &Path, output: &Path) -> Result<()>;
}
