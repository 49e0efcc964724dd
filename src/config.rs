use crate::error::{JumpcutError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Runtime settings shared by every stage.
///
/// Values come from `<config_dir>/jumpcut/config.toml`, then `JUMPCUT_*`
/// environment variables, then command-line flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub ffmpeg_path: PathBuf,
    pub ffprobe_path: PathBuf,
    /// Minimum length in seconds for a quiet span to count as silence.
    pub min_silence_duration: f64,
    /// Video bitrate used when re-encoding sped-up segments.
    pub video_bitrate: String,
    /// Log per-command success lines and debug output.
    pub verbose: bool,
    /// Log every media-tool command line before running it.
    pub print_commands: bool,
    pub show_progress: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ffmpeg_path: PathBuf::from("ffmpeg"),
            ffprobe_path: PathBuf::from("ffprobe"),
            min_silence_duration: 0.5,
            video_bitrate: "1500k".to_string(),
            verbose: false,
            print_commands: false,
            show_progress: true,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        if let Some(config_path) = Self::config_file_path() {
            if config_path.exists() {
                let contents = std::fs::read_to_string(&config_path)?;
                config = Self::from_toml(&contents)?;
            }
        }

        config.apply_env(|key| std::env::var(key).ok());

        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents)
            .map_err(|e| JumpcutError::Config(format!("Failed to parse config file: {e}")))
    }

    /// Apply `JUMPCUT_*` overrides. Unparseable values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("JUMPCUT_FFMPEG") {
            self.ffmpeg_path = PathBuf::from(path);
        }
        if let Some(path) = lookup("JUMPCUT_FFPROBE") {
            self.ffprobe_path = PathBuf::from(path);
        }
        if let Some(bitrate) = lookup("JUMPCUT_VIDEO_BITRATE") {
            self.video_bitrate = bitrate;
        }
        if let Some(min) = lookup("JUMPCUT_MIN_SILENCE") {
            if let Ok(m) = min.parse() {
                self.min_silence_duration = m;
            }
        }
        if let Some(verbose) = lookup("JUMPCUT_VERBOSE") {
            if let Some(v) = parse_flag(&verbose) {
                self.verbose = v;
            }
        }
        if let Some(print) = lookup("JUMPCUT_PRINT_COMMANDS") {
            if let Some(p) = parse_flag(&print) {
                self.print_commands = p;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.min_silence_duration.is_finite() && self.min_silence_duration > 0.0) {
            return Err(JumpcutError::Config(format!(
                "min_silence_duration must be greater than 0, got {}",
                self.min_silence_duration
            )));
        }

        if self.video_bitrate.trim().is_empty() {
            return Err(JumpcutError::Config(
                "video_bitrate must not be empty".to_string(),
            ));
        }

        if self.ffmpeg_path.as_os_str().is_empty() || self.ffprobe_path.as_os_str().is_empty() {
            return Err(JumpcutError::Config(
                "ffmpeg_path and ffprobe_path must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    fn config_file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("jumpcut").join("config.toml"))
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
