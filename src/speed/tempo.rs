use crate::error::{JumpcutError, Result};

/// Smallest factor a single `atempo` stage accepts.
pub const MIN_STAGE: f64 = 0.5;
/// Largest factor a single `atempo` stage accepts.
pub const MAX_STAGE: f64 = 2.0;

/// Longest chain accepted, which covers factors from 1/65536 to 65536.
pub const MAX_STAGES: usize = 16;

const EPSILON: f64 = 1e-9;

/// Chain of `atempo` stages whose product is the requested speed.
#[derive(Debug, Clone, PartialEq)]
pub struct TempoChain {
    stages: Vec<f64>,
}

impl TempoChain {
    /// Decompose `speed` into stages within `[0.5, 2.0]`.
    ///
    /// Factors above 2 are reached with repeated `2.0` stages, factors below
    /// 0.5 with repeated `0.5` stages, plus one stage for the remainder when
    /// it is not 1. Factors needing more than [`MAX_STAGES`] stages are
    /// rejected.
    pub fn for_speed(speed: f64) -> Result<Self> {
        if !speed.is_finite() || speed <= 0.0 {
            return Err(JumpcutError::InvalidSpeed(speed));
        }

        let mut stages = Vec::new();
        let mut residual = speed;

        while residual > MAX_STAGE + EPSILON {
            stages.push(MAX_STAGE);
            residual /= MAX_STAGE;
        }
        while residual < MIN_STAGE - EPSILON {
            stages.push(MIN_STAGE);
            residual /= MIN_STAGE;
        }

        if (residual - 1.0).abs() > EPSILON {
            stages.push(residual.clamp(MIN_STAGE, MAX_STAGE));
        }

        if stages.len() > MAX_STAGES {
            return Err(JumpcutError::InvalidSpeed(speed));
        }

        Ok(Self { stages })
    }

    pub fn stages(&self) -> &[f64] {
        &self.stages
    }

    pub fn is_identity(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn product(&self) -> f64 {
        self.stages.iter().product()
    }

    /// Render as an ffmpeg filter expression, e.g. `atempo=2.000000,atempo=1.500000`.
    pub fn to_filter(&self) -> String {
        self.stages
            .iter()
            .map(|s| format!("atempo={s:.6}"))
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        let chain = TempoChain::for_speed(1.0).unwrap();
        assert!(chain.is_identity());
        assert_eq!(chain.to_filter(), "");
    }

    #[test]
    fn test_single_stage_range() {
        for speed in [0.5, 0.75, 1.25, 1.5, 2.0] {
            let chain = TempoChain::for_speed(speed).unwrap();
            assert_eq!(chain.stages(), &[speed]);
        }
    }

    #[test]
    fn test_power_of_two() {
        let chain = TempoChain::for_speed(8.0).unwrap();
        assert_eq!(chain.stages(), &[2.0, 2.0, 2.0]);
        assert_eq!(
            chain.to_filter(),
            "atempo=2.000000,atempo=2.000000,atempo=2.000000"
        );
    }

    #[test]
    fn test_fractional_residual() {
        let chain = TempoChain::for_speed(3.0).unwrap();
        assert_eq!(chain.stages(), &[2.0, 1.5]);

        let chain = TempoChain::for_speed(4.5).unwrap();
        assert_eq!(chain.stages(), &[2.0, 2.0, 1.125]);
    }

    #[test]
    fn test_product_and_bounds_above_two() {
        let mut speed = 2.01;
        while speed <= 64.0 {
            let chain = TempoChain::for_speed(speed).unwrap();
            assert!(
                (chain.product() - speed).abs() < 1e-6,
                "speed {speed}: product {}",
                chain.product()
            );
            assert!(chain
                .stages()
                .iter()
                .all(|s| (MIN_STAGE..=MAX_STAGE).contains(s)));
            speed += 0.37;
        }
        let chain = TempoChain::for_speed(64.0).unwrap();
        assert_eq!(chain.stages().len(), 6);
    }

    #[test]
    fn test_slow_motion() {
        let chain = TempoChain::for_speed(0.25).unwrap();
        assert_eq!(chain.stages(), &[0.5, 0.5]);

        let chain = TempoChain::for_speed(1.0 / 64.0).unwrap();
        assert_eq!(chain.stages(), &[0.5; 6]);
    }

    #[test]
    fn test_product_and_bounds_below_half() {
        let mut speed = 1.0 / 64.0;
        while speed < 0.5 {
            let chain = TempoChain::for_speed(speed).unwrap();
            assert!(
                (chain.product() - speed).abs() < 1e-6,
                "speed {speed}: product {}",
                chain.product()
            );
            assert!(chain
                .stages()
                .iter()
                .all(|s| (MIN_STAGE..=MAX_STAGE).contains(s)));
            speed += 0.0071;
        }
    }

    #[test]
    fn test_chain_length_is_bounded() {
        let chain = TempoChain::for_speed(1e-4).unwrap();
        assert!(chain.stages().len() <= MAX_STAGES);
        for speed in [1e-7, 1e7] {
            assert!(matches!(
                TempoChain::for_speed(speed),
                Err(JumpcutError::InvalidSpeed(_))
            ));
        }
    }

    #[test]
    fn test_invalid_speed() {
        for speed in [0.0, -2.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                TempoChain::for_speed(speed),
                Err(JumpcutError::InvalidSpeed(_))
            ));
        }
    }
}
