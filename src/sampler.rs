//! Weighted sampling of grasp points over the paper.
//!
//! Each axis is split into disjoint bands with relative weights. Bands that are more likely
//! to produce reachable, collision-free grasps get more weight, which makes sampling much
//! more efficient than a uniform draw over the whole sheet.

use std::f64::consts::PI;
use std::fmt;
use rand::Rng;

/// Half-open interval `[from, to)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub from: f64,
    pub to: f64,
}

impl Band {
    pub fn new(from: f64, to: f64) -> Self {
        Band { from, to }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.from && value < self.to
    }
}

/// Bands of one axis with their relative weights.
#[derive(Debug, Clone)]
pub struct WeightedBands {
    bands: Vec<Band>,
    weights: Vec<f64>,
    total: f64,
}

impl WeightedBands {
    pub fn new(bands: Vec<Band>, weights: Vec<f64>) -> Result<Self, SamplerError> {
        if bands.is_empty() {
            return Err(SamplerError::NoBands);
        }
        if bands.len() != weights.len() {
            return Err(SamplerError::WeightCount { bands: bands.len(), weights: weights.len() });
        }
        if let Some(band) = bands.iter().find(|b| !(b.from.is_finite() && b.to.is_finite() && b.from < b.to)) {
            return Err(SamplerError::EmptyBand(*band));
        }
        if let Some(&weight) = weights.iter().find(|w| !(w.is_finite() && **w >= 0.0)) {
            return Err(SamplerError::InvalidWeight(weight));
        }
        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return Err(SamplerError::ZeroTotalWeight);
        }
        Ok(WeightedBands { bands, weights, total })
    }

    pub fn bands(&self) -> &[Band] {
        &self.bands
    }

    /// Probability to pick the band with the given index.
    pub fn probability(&self, index: usize) -> f64 {
        self.weights[index] / self.total
    }

    /// Weighted discrete choice: scan the cumulative weights against a uniform draw.
    /// If the scan runs past the end (rounding), the last band is taken.
    pub fn choose_band<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let mut n = rng.gen_range(0.0..self.total);
        for (i, weight) in self.weights.iter().enumerate() {
            if n < *weight {
                return i;
            }
            n -= weight;
        }
        self.weights.len() - 1
    }

    /// Pick the band, then a uniform value inside it.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let band = &self.bands[self.choose_band(rng)];
        rng.gen_range(band.from..band.to)
    }
}

/// Samples grasp points (in marker coordinates) and gripper orientation.
#[derive(Debug, Clone)]
pub struct WeightedSampler {
    pub x: WeightedBands,
    pub y: WeightedBands,

    /// Range of the rotation of the gripper around the vertical axis, radians.
    pub orientation: Band,
}

impl WeightedSampler {
    pub fn new(x: WeightedBands, y: WeightedBands) -> Self {
        WeightedSampler { x, y, orientation: Band::new(-PI, PI) }
    }

    pub fn sample_xy<R: Rng + ?Sized>(&self, rng: &mut R) -> (f64, f64) {
        let x = self.x.sample(rng);
        let y = self.y.sample(rng);
        (x, y)
    }

    pub fn sample_orientation<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        rng.gen_range(self.orientation.from..self.orientation.to)
    }
}

impl Default for WeightedSampler {
    /// Bands tuned for the paper handling experiment: both halves of the sheet across,
    /// strongly preferring the far edge of the sheet along.
    fn default() -> Self {
        let x = WeightedBands {
            bands: vec![Band::new(-0.105, 0.0), Band::new(0.0, 0.105)],
            weights: vec![0.5, 0.75],
            total: 1.25,
        };
        let y = WeightedBands {
            bands: vec![Band::new(0.1, 0.145), Band::new(0.02, 0.1), Band::new(-0.05, 0.02)],
            weights: vec![0.85, 0.15, 0.05],
            total: 1.05,
        };
        WeightedSampler::new(x, y)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SamplerError {
    NoBands,
    WeightCount { bands: usize, weights: usize },
    EmptyBand(Band),
    InvalidWeight(f64),
    ZeroTotalWeight,
}

impl fmt::Display for SamplerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SamplerError::NoBands =>
                write!(f, "At least one band is required"),
            SamplerError::WeightCount { bands, weights } =>
                write!(f, "{} bands but {} weights", bands, weights),
            SamplerError::EmptyBand(band) =>
                write!(f, "Band [{}, {}) is empty or not finite", band.from, band.to),
            SamplerError::InvalidWeight(weight) =>
                write!(f, "Weight {} must be finite and not negative", weight),
            SamplerError::ZeroTotalWeight =>
                write!(f, "Sum of weights must be positive"),
        }
    }
}

impl std::error::Error for SamplerError {}
