use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, info};

use crate::config::Config;
use crate::error::{JumpcutError, Result};
use crate::speed::TempoChain;

use super::MediaTool;

/// Check if FFmpeg is installed and accessible.
pub fn check_ffmpeg(ffmpeg: &Path) -> Result<()> {
    check_tool(ffmpeg, "FFmpeg")
}

/// Check if FFprobe is installed and accessible.
pub fn check_ffprobe(ffprobe: &Path) -> Result<()> {
    check_tool(ffprobe, "FFprobe")
}

fn check_tool(binary: &Path, name: &str) -> Result<()> {
    let output = Command::new(binary)
        .arg("-version")
        .output()
        .map_err(|e| JumpcutError::ToolNotFound {
            tool: name.to_string(),
            detail: format!(
                "could not run '{}'. Install FFmpeg and ensure it's in your PATH. Error: {e}",
                binary.display()
            ),
        })?;

    if !output.status.success() {
        return Err(JumpcutError::ToolNotFound {
            tool: name.to_string(),
            detail: format!("'{} -version' failed", binary.display()),
        });
    }

    debug!("{} is available", name);
    Ok(())
}

/// [`MediaTool`] backed by the `ffmpeg` and `ffprobe` binaries.
#[derive(Debug, Clone)]
pub struct Ffmpeg {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
    video_bitrate: String,
    print_commands: bool,
    verbose: bool,
}

impl Ffmpeg {
    pub fn new(ffmpeg: impl Into<PathBuf>, ffprobe: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
            video_bitrate: "1500k".to_string(),
            print_commands: false,
            verbose: false,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.ffmpeg_path, &config.ffprobe_path)
            .with_video_bitrate(config.video_bitrate.clone())
            .with_print_commands(config.print_commands)
            .with_verbose(config.verbose)
    }

    pub fn with_video_bitrate(mut self, bitrate: String) -> Self {
        self.video_bitrate = bitrate;
        self
    }

    pub fn with_print_commands(mut self, print: bool) -> Self {
        self.print_commands = print;
        self
    }

    /// Log a success line after every command.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Verify both binaries can be executed.
    pub fn check(&self) -> Result<()> {
        check_ffmpeg(&self.ffmpeg)?;
        check_ffprobe(&self.ffprobe)
    }

    fn ffmpeg_command(&self) -> Command {
        let mut cmd = Command::new(&self.ffmpeg);
        cmd.args(["-hide_banner", "-nostdin", "-loglevel", "fatal"]);
        cmd
    }

    fn log_command(&self, cmd: &Command) {
        let line = describe_command(cmd);
        if self.print_commands {
            info!("{}", line);
        } else {
            debug!("{}", line);
        }
    }

    /// Run to completion, capturing stderr for the error message.
    fn run(&self, operation: &str, cmd: &mut Command) -> Result<Vec<u8>> {
        self.log_command(cmd);

        let output = cmd
            .stdin(Stdio::null())
            .output()
            .map_err(|e| JumpcutError::command(operation, format!("failed to start: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(JumpcutError::command(
                operation,
                format!("{} {}", output.status, stderr.trim()),
            ));
        }

        self.log_success(operation);
        Ok(output.stdout)
    }

    fn log_success(&self, operation: &str) {
        if self.verbose {
            info!("Successful - ({})", operation);
        }
    }
}

impl MediaTool for Ffmpeg {
    fn normalize_audio(&self, input: &Path, output: &Path) -> Result<()> {
        if !input.exists() {
            return Err(JumpcutError::FileNotFound(input.display().to_string()));
        }

        let mut cmd = self.ffmpeg_command();
        cmd.arg("-y")
            .arg("-i")
            .arg(input)
            .args(["-af", "dynaudnorm", "-vcodec", "copy"])
            .arg(output);

        self.run("Audio normalize", &mut cmd)?;
        Ok(())
    }

    fn detect_silence(
        &self,
        input: &Path,
        threshold_db: f64,
        min_duration: f64,
        log: &Path,
    ) -> Result<()> {
        let filter = format!(
            "silencedetect=noise=-{}dB:d={}",
            threshold_db.abs(),
            min_duration
        );

        // silencedetect reports at info level on stderr, so no -loglevel here
        let mut cmd = Command::new(&self.ffmpeg);
        cmd.args(["-hide_banner", "-nostdin", "-i"])
            .arg(input)
            .args(["-af", filter.as_str(), "-f", "null", "-"]);
        self.log_command(&cmd);

        let log_file = File::create(log)?;
        let status = cmd
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::from(log_file))
            .status()
            .map_err(|e| {
                JumpcutError::command("Detect silence", format!("failed to start: {e}"))
            })?;

        if !status.success() {
            return Err(JumpcutError::command(
                "Detect silence",
                format!("{status}, see {}", log.display()),
            ));
        }

        self.log_success("Detect silence");
        Ok(())
    }

    fn probe_duration(&self, input: &Path) -> Result<f64> {
        let mut cmd = Command::new(&self.ffprobe);
        cmd.args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(input);

        let stdout = self.run("Probe duration", &mut cmd)?;
        let duration_str = String::from_utf8_lossy(&stdout);
        duration_str.trim().parse().map_err(|e| {
            JumpcutError::Parse(format!(
                "Failed to parse duration '{}': {e}",
                duration_str.trim()
            ))
        })
    }

    fn cut_segment(&self, input: &Path, start: f64, duration: f64, output: &Path) -> Result<()> {
        if output.exists() {
            return Err(JumpcutError::SegmentExists(output.to_path_buf()));
        }

        let mut cmd = self.ffmpeg_command();
        cmd.arg("-ss")
            .arg(format!("{start:.6}"))
            .arg("-i")
            .arg(input)
            .arg("-t")
            .arg(format!("{duration:.6}"))
            .args(["-n", "-map", "0", "-avoid_negative_ts", "1"])
            .arg(output);

        self.run(&format!("Split video to {}", output.display()), &mut cmd)?;
        Ok(())
    }

    fn change_speed(
        &self,
        input: &Path,
        speed: f64,
        tempo: &TempoChain,
        output: &Path,
    ) -> Result<()> {
        let graph = speed_graph(speed, tempo);

        let mut cmd = self.ffmpeg_command();
        cmd.arg("-y")
            .arg("-i")
            .arg(input)
            .args(["-filter_complex", graph.as_str()])
            .args(["-map", "[v]", "-map", "[a]", "-b:v", self.video_bitrate.as_str()])
            .arg(output);

        self.run(&format!("Sped video to {}", output.display()), &mut cmd)?;
        Ok(())
    }

    fn probe_audio_streams(&self, input: &Path, report: &Path) -> Result<()> {
        let mut cmd = Command::new(&self.ffprobe);
        cmd.arg("-i")
            .arg(input)
            .args(["-show_streams", "-select_streams", "a", "-loglevel", "error"]);

        let stdout = self.run("Check file for audio", &mut cmd)?;
        std::fs::write(report, stdout)?;
        Ok(())
    }

    fn add_silent_audio(&self, input: &Path, output: &Path) -> Result<()> {
        let mut cmd = self.ffmpeg_command();
        cmd.args(["-y", "-f", "lavfi", "-i", "anullsrc", "-i"])
            .arg(input)
            .args(["-map", "1:v", "-map", "0:a", "-shortest", "-c:v", "copy", "-c:a", "aac"])
            .arg(output);

        self.run("Adding empty audio to first clip", &mut cmd)?;
        Ok(())
    }

    fn concat(&self, manifest: &Path, output: &Path) -> Result<()> {
        let mut cmd = self.ffmpeg_command();
        cmd.args(["-y", "-f", "concat", "-safe", "0", "-i"])
            .arg(manifest)
            .args(["-fflags", "+genpts"])
            .arg(output);

        self.run("Join converted videos", &mut cmd)?;
        Ok(())
    }
}

/// Filter graph re-timing video by `speed` and audio by `tempo`.
///
/// The video factor is written in shortest round-trip form so it matches
/// the audio chain exactly.
pub fn speed_graph(speed: f64, tempo: &TempoChain) -> String {
    let audio = if tempo.is_identity() {
        "anull".to_string()
    } else {
        tempo.to_filter()
    };
    format!("[0:v]setpts=PTS/{speed}[v];[0:a]{audio}[a]")
}

/// Render a command as a copy-pasteable shell line for logging.
pub fn describe_command(cmd: &Command) -> String {
    std::iter::once(cmd.get_program())
        .chain(cmd.get_args())
        .map(|part| shell_quote(&part.to_string_lossy()))
        .collect::<Vec<_>>()
        .join(" ")
}

fn shell_quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=+,@%".contains(c));
    if plain {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}
