use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use regex::Regex;
use tracing::{debug, warn};

use crate::error::{JumpcutError, Result};

use super::SilenceInterval;

/// Parse a silencedetect log file written by the detector stage.
pub fn parse_silence_file(path: &Path) -> Result<Vec<SilenceInterval>> {
    if !path.exists() {
        return Err(JumpcutError::FileNotFound(path.display().to_string()));
    }

    let file = File::open(path)?;
    parse_silence_log(BufReader::new(file))
}

/// Parse silencedetect output into ordered silence intervals.
///
/// A `silence_start` line opens an interval and the next `silence_end` closes
/// it; the duration ffmpeg reports after `|` is ignored. A trailing start
/// with no matching end produces nothing.
pub fn parse_silence_log<R: BufRead>(reader: R) -> Result<Vec<SilenceInterval>> {
    let event_re = Regex::new(
        r"\[silencedetect[^\]]*\]\s+silence_(start|end):\s*(-?\d*\.?\d+(?:[eE][-+]?\d+)?)",
    )
    .expect("Invalid regex");

    let mut intervals = Vec::new();
    let mut pending: Option<f64> = None;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let Some(cap) = event_re.captures(&line) else {
            continue;
        };

        let raw = &cap[2];
        let timestamp: f64 = raw.parse().map_err(|e| {
            JumpcutError::Parse(format!(
                "Invalid timestamp '{raw}' on line {}: {e}",
                line_no + 1
            ))
        })?;
        // silencedetect reports slightly negative starts for silence at t=0
        let timestamp = timestamp.max(0.0);

        match &cap[1] {
            "start" => {
                if let Some(previous) = pending.replace(timestamp) {
                    warn!(
                        "silence_start at {:.3}s replaces unclosed start at {:.3}s",
                        timestamp, previous
                    );
                }
            }
            _ => match pending.take() {
                Some(start) if timestamp >= start => {
                    intervals.push(SilenceInterval::new(start, timestamp));
                }
                Some(start) => {
                    warn!(
                        "Skipping silence_end {:.3}s earlier than its start {:.3}s",
                        timestamp, start
                    );
                }
                None => {
                    warn!("Skipping silence_end {:.3}s with no matching start", timestamp);
                }
            },
        }
    }

    if let Some(start) = pending {
        debug!("Dropping unclosed silence_start at {:.3}s", start);
    }

    debug!("Parsed {} silence intervals", intervals.len());
    Ok(intervals)
}
