//! Clean/noisy decision on a noise estimate

use std::fmt;
use ndarray::{ArrayBase, Data, Dimension};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Clean,
    Noisy,
}

impl Classification {
    /// Clean iff every element lies within `threshold` of zero. The tolerance
    /// is purely absolute; NaN is never within tolerance.
    pub fn from_noise<S, D>(noise: &ArrayBase<S, D>, threshold: f32) -> Self
    where
        S: Data<Elem = f32>,
        D: Dimension,
    {
        if noise.iter().all(|&x| x.abs() <= threshold) {
            Classification::Clean
        } else {
            Classification::Noisy
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Classification::Clean => "clean",
            Classification::Noisy => "noisy",
        }
    }

    pub fn is_noisy(&self) -> bool {
        matches!(self, Classification::Noisy)
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Magnitude summary of a noise estimate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseStats {
    /// Mean squared error against an all-zero estimate
    pub mse: f64,
    pub max_abs: f32,
}

impl NoiseStats {
    pub fn measure<S, D>(noise: &ArrayBase<S, D>) -> Self
    where
        S: Data<Elem = f32>,
        D: Dimension,
    {
        if noise.is_empty() {
            return Self { mse: 0.0, max_abs: 0.0 };
        }

        let (sum_sq, max_abs) = noise.iter()
            .fold((0.0f64, 0.0f32), |(s, m), &x| (s + (x as f64) * (x as f64), m.max(x.abs())));

        Self {
            mse: sum_sq / noise.len() as f64,
            max_abs,
        }
    }
}
