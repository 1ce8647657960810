//! The heat field: a seeded coherent-noise scalar grid.
//!
//! A [`FieldGenerator`] evaluates 2-D gradient noise at every integer cell of a
//! `width x height` grid and stores the result in an immutable
//! [`ScalarField`]. The same seed, noise kind and dimensions always produce the
//! same field, cell for cell.
//!
//! # Frequency
//!
//! Cell `(x, y)` is sampled at `(x / f, y / f)` with `f = width / divisor`, so
//! a larger divisor packs more noise features into the grid.
//!
//! ```ignore
//! use braitenberg_core::{FieldGenerator, NoiseKind};
//!
//! let field = FieldGenerator::new(7, NoiseKind::Simplex).generate(800, 800, 8.0)?;
//! let hot = field.get(400, 400);
//! ```

use crate::error::{require_positive, ConfigError};
use noise::{NoiseFn, OpenSimplex, Perlin, Simplex};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// An integer grid coordinate. May lie outside any particular field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPoint {
    pub x: i64,
    pub y: i64,
}

impl GridPoint {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Snaps a continuous position to the nearest cell.
    ///
    /// Halves round toward positive infinity (`-4.5 -> -4`, `2.5 -> 3`).
    /// Non-finite input saturates (NaN maps to 0).
    pub fn round(x: f64, y: f64) -> Self {
        Self {
            x: round_half_up(x),
            y: round_half_up(y),
        }
    }
}

fn round_half_up(v: f64) -> i64 {
    (v + 0.5).floor() as i64
}

/// Which gradient-noise algorithm drives the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseKind {
    #[default]
    Simplex,
    OpenSimplex,
    Perlin,
}

/// Affine remap applied to each raw noise sample, with optional clamping
/// and quantization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueMap {
    pub scale: f64,
    pub offset: f64,
    /// Inclusive `(min, max)` bounds applied after scaling
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clamp: Option<(f64, f64)>,
    /// Snap to multiples of `1 / levels` after clamping (ties to even)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub levels: Option<u32>,
}

impl ValueMap {
    /// Raw noise, unchanged.
    pub const IDENTITY: ValueMap = ValueMap {
        scale: 1.0,
        offset: 0.0,
        clamp: None,
        levels: None,
    };

    /// Reading taken from the heat map's alpha channel in the same-side demo:
    /// `(93 - 139 n) / 255`, clamped to `[0, 1]` and stored as a byte.
    pub fn alpha_channel() -> Self {
        Self {
            scale: -139.0 / 255.0,
            offset: 93.0 / 255.0,
            clamp: Some((0.0, 1.0)),
            levels: Some(255),
        }
    }

    pub fn apply(&self, raw: f64) -> f64 {
        let mut v = raw * self.scale + self.offset;
        if let Some((lo, hi)) = self.clamp {
            v = v.clamp(lo, hi);
        }
        match self.levels {
            Some(levels) if levels > 0 => {
                let levels = f64::from(levels);
                (v * levels).round_ties_even() / levels
            }
            _ => v,
        }
    }
}

impl Default for ValueMap {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Shape of the heat field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Grid width in cells
    pub width: usize,

    /// Grid height in cells
    pub height: usize,

    /// Number of noise periods across the width
    pub frequency_divisor: f64,

    /// Noise algorithm
    pub noise: NoiseKind,

    /// Remap applied to every raw sample
    pub value_map: ValueMap,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 800,
            frequency_divisor: 8.0,
            noise: NoiseKind::Simplex,
            value_map: ValueMap::IDENTITY,
        }
    }
}

impl FieldConfig {
    /// Checks the generation preconditions.
    pub fn validate(&self) -> Result<(), ConfigError> {
        cell_count(self.width, self.height)?;
        require_positive(self.frequency_divisor, ConfigError::InvalidFrequencyDivisor)?;
        Ok(())
    }
}

/// Largest grid whose `f64` buffer fits in one allocation.
const MAX_CELLS: usize = isize::MAX as usize / std::mem::size_of::<f64>();

/// Cell count of a `width x height` grid, rejecting empty or unallocatable
/// grids.
fn cell_count(width: usize, height: usize) -> Result<usize, ConfigError> {
    width
        .checked_mul(height)
        .filter(|&cells| cells > 0 && cells <= MAX_CELLS)
        .ok_or(ConfigError::InvalidDimensions { width, height })
}

/// Summary statistics over every cell of a field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

/// Immutable row-major grid of heat values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScalarField {
    width: usize,
    height: usize,
    values: Vec<f64>,
}

impl ScalarField {
    /// Wraps precomputed row-major values (`values[y * width + x]`).
    pub fn from_values(width: usize, height: usize, values: Vec<f64>) -> Result<Self, ConfigError> {
        let expected = cell_count(width, height)?;
        if values.len() != expected {
            return Err(ConfigError::FieldSizeMismatch {
                expected,
                actual: values.len(),
            });
        }
        Ok(Self { width, height, values })
    }

    /// Builds a field by evaluating `f(x, y)` at every cell.
    pub fn from_fn(
        width: usize,
        height: usize,
        f: impl Fn(usize, usize) -> f64,
    ) -> Result<Self, ConfigError> {
        let mut values = Vec::with_capacity(cell_count(width, height)?);
        for y in 0..height {
            for x in 0..width {
                values.push(f(x, y));
            }
        }
        Self::from_values(width, height, values)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// All cells, row-major.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Iterates rows from `y = 0` downward.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.values.chunks(self.width)
    }

    /// Returns true if `(x, y)` addresses a cell.
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as u64) < self.width as u64 && (y as u64) < self.height as u64
    }

    /// Value at `(x, y)`, or `None` outside the grid.
    pub fn get(&self, x: i64, y: i64) -> Option<f64> {
        if self.contains(x, y) {
            Some(self.values[y as usize * self.width + x as usize])
        } else {
            None
        }
    }

    /// Nearest in-bounds cell to `point`.
    pub fn clamp_point(&self, point: GridPoint) -> GridPoint {
        GridPoint {
            x: point.x.clamp(0, self.width as i64 - 1),
            y: point.y.clamp(0, self.height as i64 - 1),
        }
    }

    pub fn stats(&self) -> FieldStats {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        for &v in &self.values {
            min = min.min(v);
            max = max.max(v);
            sum += v;
        }
        FieldStats {
            min,
            max,
            mean: sum / self.values.len() as f64,
        }
    }
}

/// Deterministic heat-field builder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldGenerator {
    seed: u32,
    noise: NoiseKind,
    value_map: ValueMap,
}

impl FieldGenerator {
    /// Creates a generator with the identity value map.
    pub fn new(seed: u32, noise: NoiseKind) -> Self {
        Self {
            seed,
            noise,
            value_map: ValueMap::IDENTITY,
        }
    }

    /// Sets the remap applied to raw noise.
    pub fn with_value_map(mut self, value_map: ValueMap) -> Self {
        self.value_map = value_map;
        self
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Generates the field described by `config`.
    pub fn generate_from(seed: u32, config: &FieldConfig) -> Result<ScalarField, ConfigError> {
        FieldGenerator::new(seed, config.noise)
            .with_value_map(config.value_map)
            .generate(config.width, config.height, config.frequency_divisor)
    }

    /// Samples noise at every cell of a `width x height` grid.
    pub fn generate(
        &self,
        width: usize,
        height: usize,
        frequency_divisor: f64,
    ) -> Result<ScalarField, ConfigError> {
        let cells = cell_count(width, height)?;
        require_positive(frequency_divisor, ConfigError::InvalidFrequencyDivisor)?;

        let frequency = width as f64 / frequency_divisor;
        let values = match self.noise {
            NoiseKind::Simplex => self.fill(&Simplex::new(self.seed), cells, width, frequency),
            NoiseKind::OpenSimplex => {
                self.fill(&OpenSimplex::new(self.seed), cells, width, frequency)
            }
            NoiseKind::Perlin => self.fill(&Perlin::new(self.seed), cells, width, frequency),
        };

        debug!(
            "Generated {}x{} {:?} field (seed={}, divisor={})",
            width, height, self.noise, self.seed, frequency_divisor
        );

        Ok(ScalarField { width, height, values })
    }

    fn fill<N>(&self, noise: &N, cells: usize, width: usize, frequency: f64) -> Vec<f64>
    where
        N: NoiseFn<f64, 2> + Sync,
    {
        let mut values = vec![0.0; cells];
        let fill_row = |(y, row): (usize, &mut [f64])| {
            let ny = y as f64 / frequency;
            for (x, cell) in row.iter_mut().enumerate() {
                let raw = noise.get([x as f64 / frequency, ny]);
                *cell = self.value_map.apply(raw);
            }
        };

        #[cfg(feature = "parallel")]
        values.par_chunks_mut(width).enumerate().for_each(fill_row);

        #[cfg(not(feature = "parallel"))]
        values.chunks_mut(width).enumerate().for_each(fill_row);

        values
    }
}
