//! Read-only lookups into a [`ScalarField`].

use crate::field::{GridPoint, ScalarField};
use serde::{Deserialize, Serialize};

/// Anything a vehicle sensor can read a heat value from.
///
/// Implementations must be total: every grid point, in bounds or not, yields a
/// value.
pub trait HeatSource: Sync {
    fn sample(&self, point: GridPoint) -> f64;
}

/// What a sampler returns for a point outside the grid.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutOfBounds {
    /// Value of the nearest in-bounds cell
    #[default]
    Clamp,
    /// A fixed value
    Constant(f64),
}

/// A view over a field with an out-of-bounds policy.
#[derive(Debug, Clone, Copy)]
pub struct FieldSampler<'a> {
    field: &'a ScalarField,
    policy: OutOfBounds,
}

impl<'a> FieldSampler<'a> {
    pub fn new(field: &'a ScalarField, policy: OutOfBounds) -> Self {
        Self { field, policy }
    }

    pub fn policy(&self) -> OutOfBounds {
        self.policy
    }

    /// Value at integer `(x, y)`.
    pub fn sample_xy(&self, x: i64, y: i64) -> f64 {
        if let Some(v) = self.field.get(x, y) {
            return v;
        }
        match self.policy {
            OutOfBounds::Clamp => {
                let p = self.field.clamp_point(GridPoint::new(x, y));
                self.field.get(p.x, p.y).unwrap_or_default()
            }
            OutOfBounds::Constant(v) => v,
        }
    }

    /// Value at the cell nearest to continuous `(x, y)`.
    pub fn sample_at(&self, x: f64, y: f64) -> f64 {
        self.sample(GridPoint::round(x, y))
    }
}

impl HeatSource for FieldSampler<'_> {
    fn sample(&self, point: GridPoint) -> f64 {
        self.sample_xy(point.x, point.y)
    }
}
