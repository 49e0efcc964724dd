pub mod split;

pub use split::split_video;

use std::fmt;

use regex::Regex;
use tracing::warn;

use crate::error::{JumpcutError, Result};
use crate::silence::SilenceInterval;

/// Segment file names carry a 4-digit index, so ordering by name stays
/// chronological only up to this many segments.
pub const MAX_SEGMENTS: usize = 10_000;

/// Gaps shorter than this are not worth a separate cut.
const MIN_GAP: f64 = 1e-3;

/// Prefix given to segments once they have been re-timed.
pub const CONVERTED_PREFIX: &str = "converted-";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Silence,
    Normal,
}

impl SegmentKind {
    /// File name suffix, without extension.
    pub fn suffix(&self) -> &'static str {
        match self {
            SegmentKind::Silence => "silence",
            SegmentKind::Normal => "norm",
        }
    }
}

impl fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SegmentKind::Silence => write!(f, "silence"),
            SegmentKind::Normal => write!(f, "normal"),
        }
    }
}

impl std::str::FromStr for SegmentKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "silence" => Ok(SegmentKind::Silence),
            "norm" => Ok(SegmentKind::Normal),
            _ => Err(format!("Unknown segment kind: {s}")),
        }
    }
}

/// A contiguous cut of the source video.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub index: usize,
    pub start: f64,
    pub duration: f64,
    pub kind: SegmentKind,
}

impl Segment {
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    pub fn is_silence(&self) -> bool {
        self.kind == SegmentKind::Silence
    }

    /// Name of the cut file, e.g. `0001-silence.mp4`.
    pub fn file_name(&self) -> String {
        format!("{:04}-{}.mp4", self.index, self.kind.suffix())
    }

    /// Name of the re-timed file, e.g. `converted-0001-silence.mp4`.
    pub fn converted_file_name(&self) -> String {
        format!("{CONVERTED_PREFIX}{}", self.file_name())
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}: {:.3}s - {:.3}s (duration: {:.3}s)",
            self.file_name(),
            self.kind,
            self.start,
            self.end(),
            self.duration
        )
    }
}

/// Index and kind recovered from a converted segment file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertedName {
    pub index: usize,
    pub kind: SegmentKind,
}

impl ConvertedName {
    /// Parse `converted-NNNN-(silence|norm).mp4`; anything else is `None`.
    pub fn parse(file_name: &str) -> Option<Self> {
        let re = Regex::new(r"^converted-(\d{4})-(silence|norm)\.mp4$").expect("Invalid regex");
        let cap = re.captures(file_name)?;
        Some(Self {
            index: cap[1].parse().ok()?,
            kind: cap[2].parse().ok()?,
        })
    }
}

/// Lay out silent and normal segments over `[0, total_duration)`.
///
/// Each interval becomes one silent segment; the gaps before, between and
/// after them become normal segments. With no intervals the whole video is a
/// single normal segment.
pub fn plan_segments(intervals: &[SilenceInterval], total_duration: f64) -> Result<Vec<Segment>> {
    if !(total_duration > 0.0) {
        return Err(JumpcutError::InvalidDuration(total_duration));
    }

    if intervals.is_empty() {
        warn!("No silence detected, keeping the whole video as one normal segment");
    }

    let mut segments: Vec<Segment> = Vec::new();
    let mut cursor = 0.0_f64;

    for interval in intervals {
        let start = interval.start.clamp(cursor, total_duration);
        let end = interval.end.clamp(start, total_duration);
        if end - start <= MIN_GAP {
            continue;
        }

        let gap = start - cursor;
        if gap > MIN_GAP {
            push_segment(&mut segments, cursor, start, SegmentKind::Normal);
            push_segment(&mut segments, start, end, SegmentKind::Silence);
        } else if let Some(last) = segments.last_mut().filter(|s| s.is_silence()) {
            // silences separated by a sliver merge into one
            last.duration = end - last.start;
        } else {
            push_segment(&mut segments, cursor, end, SegmentKind::Silence);
        }
        cursor = end;
    }

    if total_duration - cursor > MIN_GAP {
        push_segment(&mut segments, cursor, total_duration, SegmentKind::Normal);
    } else if let Some(last) = segments.last_mut() {
        last.duration = total_duration - last.start;
    }

    if segments.len() > MAX_SEGMENTS {
        return Err(JumpcutError::TooManySegments(segments.len()));
    }

    Ok(segments)
}

fn push_segment(segments: &mut Vec<Segment>, start: f64, end: f64, kind: SegmentKind) {
    segments.push(Segment {
        index: segments.len(),
        start,
        duration: end - start,
        kind,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_tiles(segments: &[Segment], total: f64) {
        let mut cursor = 0.0;
        for (i, seg) in segments.iter().enumerate() {
            assert_eq!(seg.index, i);
            assert!((seg.start - cursor).abs() < 1e-9, "gap before {seg}");
            assert!(seg.duration > 0.0, "empty {seg}");
            cursor = seg.end();
        }
        assert!((cursor - total).abs() < 1e-9, "ends at {cursor}, expected {total}");
        for pair in segments.windows(2) {
            assert_ne!(pair[0].kind, pair[1].kind, "{} then {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_single_interval() {
        let segments = plan_segments(&[SilenceInterval::new(3.0, 5.0)], 10.0).unwrap();
        let names: Vec<String> = segments.iter().map(Segment::file_name).collect();
        assert_eq!(names, vec!["0000-norm.mp4", "0001-silence.mp4", "0002-norm.mp4"]);
        assert_eq!((segments[1].start, segments[1].duration), (3.0, 2.0));
        assert_eq!((segments[2].start, segments[2].duration), (5.0, 5.0));
        assert_tiles(&segments, 10.0);
    }

    #[test]
    fn test_leading_silence() {
        let intervals = [SilenceInterval::new(0.0, 2.0), SilenceInterval::new(6.0, 7.0)];
        let segments = plan_segments(&intervals, 10.0).unwrap();
        assert_eq!(segments[0].kind, SegmentKind::Silence);
        assert_eq!(segments.len(), 4);
        assert_tiles(&segments, 10.0);
    }

    #[test]
    fn test_trailing_silence_emitted_once() {
        let intervals = [SilenceInterval::new(2.0, 4.0), SilenceInterval::new(8.0, 10.0)];
        let segments = plan_segments(&intervals, 10.0).unwrap();
        let silent = segments.iter().filter(|s| s.is_silence()).count();
        assert_eq!(silent, 2);
        assert_eq!(segments.last().unwrap().kind, SegmentKind::Silence);
        assert_tiles(&segments, 10.0);
    }

    #[test]
    fn test_no_intervals() {
        let segments = plan_segments(&[], 12.5).unwrap();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].kind, SegmentKind::Normal);
        assert_eq!(segments[0].duration, 12.5);
    }

    #[test]
    fn test_interval_past_end_is_clamped() {
        let segments = plan_segments(&[SilenceInterval::new(9.0, 10.4)], 10.0).unwrap();
        assert_eq!(segments.len(), 2);
        assert_tiles(&segments, 10.0);
    }

    #[test]
    fn test_many_intervals_tile() {
        let intervals: Vec<SilenceInterval> = (0..20)
            .map(|i| SilenceInterval::new(i as f64 * 3.0 + 1.0, i as f64 * 3.0 + 2.0))
            .collect();
        let segments = plan_segments(&intervals, 61.0).unwrap();
        assert_eq!(segments.len(), 41);
        assert_tiles(&segments, 61.0);
    }

    #[test]
    fn test_invalid_duration() {
        for duration in [0.0, -4.0, f64::NAN] {
            assert!(matches!(
                plan_segments(&[SilenceInterval::new(1.0, 2.0)], duration),
                Err(JumpcutError::InvalidDuration(_))
            ));
        }
    }

    #[test]
    fn test_too_many_segments() {
        let intervals: Vec<SilenceInterval> = (0..5001)
            .map(|i| SilenceInterval::new(i as f64 * 2.0 + 1.0, i as f64 * 2.0 + 1.5))
            .collect();
        let result = plan_segments(&intervals, 20_000.0);
        assert!(matches!(result, Err(JumpcutError::TooManySegments(_))));
    }

    #[test]
    fn test_converted_name_parse() {
        assert_eq!(
            ConvertedName::parse("converted-0012-norm.mp4"),
            Some(ConvertedName {
                index: 12,
                kind: SegmentKind::Normal
            })
        );
        assert_eq!(
            ConvertedName::parse("converted-0000-silence.mp4").map(|n| n.kind),
            Some(SegmentKind::Silence)
        );
        assert_eq!(ConvertedName::parse("converted-0000-silence-temp.mp4"), None);
        assert_eq!(ConvertedName::parse("0003-norm.mp4"), None);
    }

    #[test]
    fn test_converted_file_name() {
        let seg = Segment {
            index: 7,
            start: 1.0,
            duration: 2.0,
            kind: SegmentKind::Silence,
        };
        assert_eq!(seg.converted_file_name(), "converted-0007-silence.mp4");
    }
}
