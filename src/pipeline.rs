use crate::config::Config;
use crate::error::{JumpcutError, Result};
use crate::join::{join_converted, JoinResult};
use crate::media::MediaTool;
use crate::segment::{plan_segments, split_video, Segment, SegmentKind};
use crate::silence::{parse_silence_file, total_silence_duration, SilenceInterval};
use crate::speed::{transcode_segments, SpeedFactors};
use crate::workspace::{normalized_path, Workspace};
use console::style;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// What the user asked for: one input video and the speeds to apply.
#[derive(Debug, Clone)]
pub struct JumpcutJob {
    pub input: PathBuf,
    /// Noise threshold in dB; the sign is ignored.
    pub threshold_db: f64,
    pub speeds: SpeedFactors,
}

impl JumpcutJob {
    pub fn new(
        input: impl Into<PathBuf>,
        threshold_db: f64,
        silence_speed: f64,
        normal_speed: f64,
    ) -> Result<Self> {
        if !threshold_db.is_finite() {
            return Err(JumpcutError::Config(format!(
                "Invalid silence threshold: {threshold_db}"
            )));
        }

        Ok(Self {
            input: input.into(),
            threshold_db,
            speeds: SpeedFactors::new(silence_speed, normal_speed)?,
        })
    }
}

/// Data handed from one stage to the next.
#[derive(Debug, Default)]
pub struct PipelineState {
    pub normalized: Option<PathBuf>,
    pub intervals: Vec<SilenceInterval>,
    pub source_duration: f64,
    pub segments: Vec<Segment>,
    pub converted: Vec<PathBuf>,
    pub join: Option<JoinResult>,
}

/// Everything a stage can see while it runs.
pub struct StageContext<'a> {
    pub tool: &'a dyn MediaTool,
    pub config: &'a Config,
    pub workspace: &'a Workspace,
    pub job: &'a JumpcutJob,
    pub state: PipelineState,
    cancelled: &'a AtomicBool,
    progress: Option<&'a MultiProgress>,
}

impl StageContext<'_> {
    /// The file later stages read: the normalized copy once it exists.
    pub fn source(&self) -> &Path {
        self.state.normalized.as_deref().unwrap_or(&self.job.input)
    }

    /// Set once the user interrupts the run.
    pub fn cancelled(&self) -> &AtomicBool {
        self.cancelled
    }

    fn spinner(&self, message: &str) -> Option<ProgressBar> {
        self.progress.map(|mp| {
            let pb = mp.add(ProgressBar::new_spinner());
            if let Ok(spinner_style) =
                ProgressStyle::default_spinner().template("{spinner:.green} {msg}")
            {
                pb.set_style(spinner_style);
            }
            pb.set_message(message.to_string());
            pb.enable_steady_tick(Duration::from_millis(100));
            pb
        })
    }

    fn progress_bar(&self, len: usize, message: &str) -> Option<ProgressBar> {
        self.progress.map(|mp| {
            let pb = mp.add(ProgressBar::new(len as u64));
            if let Ok(bar_style) =
                ProgressStyle::default_bar().template("{msg} [{bar:30.cyan/blue}] {pos}/{len}")
            {
                pb.set_style(bar_style.progress_chars("=> "));
            }
            pb.set_message(message.to_string());
            pb
        })
    }
}

/// One step of the jump-cut pipeline.
pub trait Stage {
    /// Short description used in success and failure messages.
    fn name(&self) -> &'static str;

    fn run(&self, ctx: &mut StageContext<'_>) -> Result<()>;
}

pub struct ResetWorkspace;

impl Stage for ResetWorkspace {
    fn name(&self) -> &'static str {
        "Workspace cleaned"
    }

    fn run(&self, ctx: &mut StageContext<'_>) -> Result<()> {
        let normalized = normalized_path(&ctx.job.input);
        let removed = ctx.workspace.reset(Some(&normalized))?;
        debug!("Removed {} leftover paths", removed.len());
        Ok(())
    }
}

pub struct NormalizeAudio;

impl Stage for NormalizeAudio {
    fn name(&self) -> &'static str {
        "Audio normalized"
    }

    fn run(&self, ctx: &mut StageContext<'_>) -> Result<()> {
        let output = normalized_path(&ctx.job.input);
        let pb = ctx.spinner("Normalizing audio...");
        ctx.tool.normalize_audio(&ctx.job.input, &output)?;
        if let Some(pb) = pb {
            pb.finish_with_message(format!("✓ Audio normalized into {}", output.display()));
        }

        ctx.state.normalized = Some(output);
        Ok(())
    }
}

pub struct DetectSilence;

impl Stage for DetectSilence {
    fn name(&self) -> &'static str {
        "Silence detected"
    }

    fn run(&self, ctx: &mut StageContext<'_>) -> Result<()> {
        let pb = ctx.spinner("Detecting silence...");
        ctx.tool.detect_silence(
            ctx.source(),
            ctx.job.threshold_db,
            ctx.config.min_silence_duration,
            &ctx.workspace.silence_log(),
        )?;
        if let Some(pb) = pb {
            pb.finish_with_message("✓ Silence detected");
        }
        Ok(())
    }
}

pub struct ParseSilence;

impl Stage for ParseSilence {
    fn name(&self) -> &'static str {
        "Silence parsed"
    }

    fn run(&self, ctx: &mut StageContext<'_>) -> Result<()> {
        let intervals = parse_silence_file(&ctx.workspace.silence_log())?;
        info!(
            "Found {} silent intervals ({:.1}s total)",
            intervals.len(),
            total_silence_duration(&intervals)
        );
        ctx.state.intervals = intervals;
        Ok(())
    }
}

pub struct SplitVideo;

impl Stage for SplitVideo {
    fn name(&self) -> &'static str {
        "Split video"
    }

    fn run(&self, ctx: &mut StageContext<'_>) -> Result<()> {
        let duration = ctx.tool.probe_duration(ctx.source())?;
        let segments = plan_segments(&ctx.state.intervals, duration)?;

        let pb = ctx.progress_bar(segments.len(), "Splitting");
        split_video(
            ctx.tool,
            ctx.source(),
            &segments,
            &ctx.workspace.split_dir(),
            ctx.cancelled(),
            pb.as_ref(),
        )?;
        if let Some(pb) = pb {
            pb.finish_with_message(format!("✓ Split into {} segments", segments.len()));
        }

        ctx.state.source_duration = duration;
        ctx.state.segments = segments;
        Ok(())
    }
}

pub struct SpeedUp;

impl Stage for SpeedUp {
    fn name(&self) -> &'static str {
        "Videos sped up"
    }

    fn run(&self, ctx: &mut StageContext<'_>) -> Result<()> {
        let pb = ctx.progress_bar(ctx.state.segments.len(), "Re-timing");
        let converted = transcode_segments(
            ctx.tool,
            &ctx.state.segments,
            &ctx.workspace.split_dir(),
            &ctx.workspace.converted_dir(),
            ctx.job.speeds,
            ctx.cancelled(),
            pb.as_ref(),
        )?;
        if let Some(pb) = pb {
            pb.finish_with_message(format!("✓ Re-timed {} segments", converted.len()));
        }

        ctx.state.converted = converted;
        Ok(())
    }
}

pub struct JoinSegments;

impl Stage for JoinSegments {
    fn name(&self) -> &'static str {
        "New video created"
    }

    fn run(&self, ctx: &mut StageContext<'_>) -> Result<()> {
        let workspace = ctx.workspace;
        let pb = ctx.spinner("Joining segments...");
        let result = join_converted(
            ctx.tool,
            &workspace.converted_dir(),
            &workspace.manifest(),
            &workspace.probe_report(),
            &workspace.final_output(&ctx.job.input),
        )?;
        if let Some(pb) = pb {
            pb.finish_with_message(format!(
                "✓ Joined {} segments into {}",
                result.parts.len(),
                result.output.display()
            ));
        }

        ctx.state.join = Some(result);
        Ok(())
    }
}

/// Statistics from a finished run.
#[derive(Debug, Clone)]
pub struct PipelineStats {
    /// Total time taken for the entire pipeline.
    pub total_time: Duration,
    /// Wall time of each stage, in run order.
    pub stage_times: Vec<(&'static str, Duration)>,
    pub silence_intervals: usize,
    pub silent_segments: usize,
    pub normal_segments: usize,
    /// Duration of the source video.
    pub source_duration: f64,
    /// Expected duration after re-timing.
    pub output_duration: f64,
}

/// Result of a successful run.
#[derive(Debug)]
pub struct PipelineResult {
    /// Path to the final video.
    pub output_path: PathBuf,
    pub segments: Vec<Segment>,
    /// Whether the opening silent clip needed a synthetic audio track.
    pub added_silent_audio: bool,
    pub stats: PipelineStats,
}

/// Expected output length: each segment shortened by its speed factor.
pub fn estimate_output_duration(segments: &[Segment], speeds: SpeedFactors) -> f64 {
    segments
        .iter()
        .map(|s| s.duration / speeds.for_kind(s.kind))
        .sum()
}

/// Runs the stages in order, stopping at the first failure.
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
    cancelled: Arc<AtomicBool>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(vec![
            Box::new(ResetWorkspace),
            Box::new(NormalizeAudio),
            Box::new(DetectSilence),
            Box::new(ParseSilence),
            Box::new(SplitVideo),
            Box::new(SpeedUp),
            Box::new(JoinSegments),
            Box::new(ResetWorkspace),
        ])
    }
}

impl Pipeline {
    pub fn new(stages: Vec<Box<dyn Stage>>) -> Self {
        Self {
            stages,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Stop at the next stage or segment once `cancelled` is set.
    pub fn with_cancel(mut self, cancelled: Arc<AtomicBool>) -> Self {
        self.cancelled = cancelled;
        self
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    pub fn run(
        &self,
        tool: &dyn MediaTool,
        config: &Config,
        workspace: &Workspace,
        job: &JumpcutJob,
    ) -> Result<PipelineResult> {
        let start_time = Instant::now();

        if !job.input.exists() {
            return Err(JumpcutError::FileNotFound(job.input.display().to_string()));
        }

        let multi_progress = if config.show_progress {
            Some(MultiProgress::new())
        } else {
            None
        };

        let mut ctx = StageContext {
            tool,
            config,
            workspace,
            job,
            state: PipelineState::default(),
            cancelled: &self.cancelled,
            progress: multi_progress.as_ref(),
        };

        let total = self.stages.len();
        let mut stage_times = Vec::with_capacity(total);

        for (i, stage) in self.stages.iter().enumerate() {
            if self.cancelled.load(Ordering::Relaxed) {
                return Err(JumpcutError::Cancelled);
            }

            info!("Stage {}/{}: {}", i + 1, total, stage.name());
            let stage_start = Instant::now();

            if let Err(e) = stage.run(&mut ctx) {
                // an interrupted FFmpeg child fails with a signal status
                if self.cancelled.load(Ordering::Relaxed) {
                    warn!("Cancelled during: {} ({})", stage.name(), e);
                    return Err(JumpcutError::Cancelled);
                }
                error!("Error running command - {}", stage.name());
                return Err(e);
            }

            if config.verbose {
                info!("Successful - ({})", stage.name());
            }
            stage_times.push((stage.name(), stage_start.elapsed()));
        }

        let state = ctx.state;
        let join = state.join.ok_or_else(|| {
            JumpcutError::FileNotFound("pipeline finished without joining segments".to_string())
        })?;

        let count = |kind: SegmentKind| state.segments.iter().filter(|s| s.kind == kind).count();
        let stats = PipelineStats {
            total_time: start_time.elapsed(),
            stage_times,
            silence_intervals: state.intervals.len(),
            silent_segments: count(SegmentKind::Silence),
            normal_segments: count(SegmentKind::Normal),
            source_duration: state.source_duration,
            output_duration: estimate_output_duration(&state.segments, job.speeds),
        };

        Ok(PipelineResult {
            output_path: join.output,
            segments: state.segments,
            added_silent_audio: join.added_silent_audio,
            stats,
        })
    }
}

/// Print a summary of the pipeline results.
pub fn print_summary(result: &PipelineResult) {
    let stats = &result.stats;
    println!();
    println!(
        "{}",
        style("═══════════════════════════════════════════════════════════════").cyan()
    );
    println!("                         Jump Cut Complete                       ");
    println!(
        "{}",
        style("═══════════════════════════════════════════════════════════════").cyan()
    );
    println!();
    println!("  Output:     {}", style(result.output_path.display()).green());
    println!(
        "  Segments:   {} ({} silent, {} normal)",
        stats.silent_segments + stats.normal_segments,
        stats.silent_segments,
        stats.normal_segments
    );
    println!("  Silences:   {}", stats.silence_intervals);
    println!(
        "  Duration:   {:.1}s -> {:.1}s",
        stats.source_duration, stats.output_duration
    );
    if result.added_silent_audio {
        println!("  Note:       added a silent audio track to the opening clip");
    }
    println!();
    println!("  Timing:");
    for (name, elapsed) in &stats.stage_times {
        println!("    {:<20} {:.2}s", name, elapsed.as_secs_f64());
    }
    println!(
        "  Process took: {} seconds",
        style(stats.total_time.as_secs()).bold()
    );
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_stage_order() {
        let pipeline = Pipeline::default();
        assert_eq!(
            pipeline.stage_names(),
            vec![
                "Workspace cleaned",
                "Audio normalized",
                "Silence detected",
                "Silence parsed",
                "Split video",
                "Videos sped up",
                "New video created",
                "Workspace cleaned",
            ]
        );
    }

    #[test]
    fn test_job_rejects_bad_speeds() {
        assert!(JumpcutJob::new("talk.mp4", -30.0, 8.0, 1.0).is_ok());
        assert!(matches!(
            JumpcutJob::new("talk.mp4", -30.0, 0.0, 1.0),
            Err(JumpcutError::InvalidSpeed(_))
        ));
        assert!(JumpcutJob::new("talk.mp4", f64::NAN, 8.0, 1.0).is_err());
    }

    #[test]
    fn test_estimate_output_duration() {
        let segments = vec![
            Segment {
                index: 0,
                start: 0.0,
                duration: 3.0,
                kind: SegmentKind::Normal,
            },
            Segment {
                index: 1,
                start: 3.0,
                duration: 2.0,
                kind: SegmentKind::Silence,
            },
            Segment {
                index: 2,
                start: 5.0,
                duration: 5.0,
                kind: SegmentKind::Normal,
            },
        ];
        let speeds = SpeedFactors::new(8.0, 1.0).unwrap();
        assert!((estimate_output_duration(&segments, speeds) - 8.25).abs() < 1e-9);
    }

    struct Unreachable;

    impl MediaTool for Unreachable {
        fn normalize_audio(&self, _: &Path, _: &Path) -> Result<()> {
            unreachable!()
        }
        fn detect_silence(&self, _: &Path, _: f64, _: f64, _: &Path) -> Result<()> {
            unreachable!()
        }
        fn probe_duration(&self, _: &Path) -> Result<f64> {
            unreachable!()
        }
        fn cut_segment(&self, _: &Path, _: f64, _: f64, _: &Path) -> Result<()> {
            unreachable!()
        }
        fn change_speed(
            &self,
            _: &Path,
            _: f64,
            _: &crate::speed::TempoChain,
            _: &Path,
        ) -> Result<()> {
            unreachable!()
        }
        fn probe_audio_streams(&self, _: &Path, _: &Path) -> Result<()> {
            unreachable!()
        }
        fn add_silent_audio(&self, _: &Path, _: &Path) -> Result<()> {
            unreachable!()
        }
        fn concat(&self, _: &Path, _: &Path) -> Result<()> {
            unreachable!()
        }
    }

    #[test]
    fn test_missing_input_fails_before_stages() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            show_progress: false,
            ..Config::default()
        };
        let job = JumpcutJob::new(dir.path().join("missing.mp4"), 30.0, 4.0, 1.0).unwrap();
        let result = Pipeline::default().run(
            &Unreachable,
            &config,
            &Workspace::new(dir.path()),
            &job,
        );
        assert!(matches!(result, Err(JumpcutError::FileNotFound(_))));
    }

    #[test]
    fn test_spinner_follows_progress_setting() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        let workspace = Workspace::new(dir.path());
        let job = JumpcutJob::new("talk.mp4", 30.0, 4.0, 1.0).unwrap();
        let cancelled = AtomicBool::new(false);
        let multi = MultiProgress::with_draw_target(indicatif::ProgressDrawTarget::hidden());

        let mut ctx = StageContext {
            tool: &Unreachable,
            config: &config,
            workspace: &workspace,
            job: &job,
            state: PipelineState::default(),
            cancelled: &cancelled,
            progress: None,
        };
        assert!(ctx.spinner("Detecting silence...").is_none());

        ctx.progress = Some(&multi);
        let pb = ctx.spinner("Detecting silence...").unwrap();
        assert_eq!(pb.message(), "Detecting silence...");
        pb.finish_with_message("✓ Silence detected");
        assert!(pb.is_finished());
    }
}
