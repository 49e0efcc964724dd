pub mod tempo;
pub mod transcode;

pub use tempo::TempoChain;
pub use transcode::transcode_segments;

use crate::error::Result;
use crate::segment::SegmentKind;

/// Playback speed applied to each kind of segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedFactors {
    pub silence: f64,
    pub normal: f64,
}

impl SpeedFactors {
    /// Both factors must be positive, finite and expressible as a
    /// [`TempoChain`].
    pub fn new(silence: f64, normal: f64) -> Result<Self> {
        TempoChain::for_speed(silence)?;
        TempoChain::for_speed(normal)?;
        Ok(Self { silence, normal })
    }

    pub fn for_kind(&self, kind: SegmentKind) -> f64 {
        match kind {
            SegmentKind::Silence => self.silence,
            SegmentKind::Normal => self.normal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_kind() {
        let speeds = SpeedFactors::new(8.0, 1.25).unwrap();
        assert_eq!(speeds.for_kind(SegmentKind::Silence), 8.0);
        assert_eq!(speeds.for_kind(SegmentKind::Normal), 1.25);
    }

    #[test]
    fn test_rejects_non_positive() {
        assert!(SpeedFactors::new(0.0, 1.0).is_err());
        assert!(SpeedFactors::new(4.0, -1.0).is_err());
        assert!(SpeedFactors::new(f64::NAN, 1.0).is_err());
    }

    #[test]
    fn test_rejects_unreachable_factor() {
        assert!(matches!(
            SpeedFactors::new(1e-7, 1.0),
            Err(crate::error::JumpcutError::InvalidSpeed(_))
        ));
        assert!(SpeedFactors::new(1.0 / 64.0, 64.0).is_ok());
    }
}
