//! Rasterizer tuning constants.
//!
//! The thresholds below were tuned empirically against real drawings. They keep
//! near-boundary numerical cases from subdividing forever; none of them has a
//! derivation that makes its exact value load-bearing.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Tuning constants for curve classification, offsetting and recursion caps.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterConfig {
    /// Power-basis coefficients are divided by this before classification.
    pub coefficient_scale: f32,
    /// `|d1|` and `|d2|` below this (with `d3 != 0`) classify a cubic as a quadratic.
    pub quadratic_degenerate_threshold: f32,
    /// Loop double-point parameters are only split inside `(min, max)`.
    pub loop_split_min: f32,
    pub loop_split_max: f32,
    /// Per-component distance under which two control points are coincident.
    pub point_equal_epsilon: f32,
    /// Hull legs shorter than this cannot be offset.
    pub leg_length_epsilon: f32,
    /// Offset legs whose cross determinant is below this are parallel.
    pub leg_parallel_epsilon: f32,
    /// Maximum nesting of loop-curve splits.
    pub max_cubic_split_depth: u32,
    /// Maximum nesting of adaptive stroke subdivisions.
    pub max_stroke_subdivision_depth: u32,
    /// Curve parameters where offset curves are checked against the tolerance band.
    pub check_samples: Vec<f32>,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self::standard()
    }
}

impl RasterConfig {
    /// Standard configuration for general use.
    pub fn standard() -> Self {
        Self {
            coefficient_scale: 10.0,
            quadratic_degenerate_threshold: 0.1,
            loop_split_min: 0.01,
            loop_split_max: 0.99,
            point_equal_epsilon: 1e-3,
            leg_length_epsilon: 1e-6,
            leg_parallel_epsilon: 1e-4,
            max_cubic_split_depth: 8,
            max_stroke_subdivision_depth: 16,
            check_samples: vec![1.0 / 6.0, 2.0 / 6.0, 3.0 / 6.0, 4.0 / 6.0, 5.0 / 6.0],
        }
    }

    /// Denser offset checks for reference renders, with room to subdivide further.
    pub fn strict() -> Self {
        Self {
            max_stroke_subdivision_depth: 24,
            check_samples: (1..10).map(|i| i as f32 / 10.0).collect(),
            ..Self::standard()
        }
    }

    /// Parse a TOML document; missing keys keep their standard values.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: RasterConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the loop split window.
    pub fn with_loop_split_bounds(mut self, min: f32, max: f32) -> Self {
        self.loop_split_min = min;
        self.loop_split_max = max;
        self
    }

    /// Set the loop split recursion cap.
    pub fn with_max_cubic_split_depth(mut self, depth: u32) -> Self {
        self.max_cubic_split_depth = depth;
        self
    }

    /// Set the stroke subdivision recursion cap.
    pub fn with_max_stroke_subdivision_depth(mut self, depth: u32) -> Self {
        self.max_stroke_subdivision_depth = depth;
        self
    }

    /// Replace the offset check parameters.
    pub fn with_check_samples(mut self, samples: Vec<f32>) -> Self {
        self.check_samples = samples;
        self
    }

    /// Set the coincident point epsilon.
    pub fn with_point_equal_epsilon(mut self, epsilon: f32) -> Self {
        self.point_equal_epsilon = epsilon;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("coefficient_scale", self.coefficient_scale),
            ("quadratic_degenerate_threshold", self.quadratic_degenerate_threshold),
            ("point_equal_epsilon", self.point_equal_epsilon),
            ("leg_length_epsilon", self.leg_length_epsilon),
            ("leg_parallel_epsilon", self.leg_parallel_epsilon),
        ];
        for (name, value) in positive {
            if value <= 0.0 || !value.is_finite() {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }

        if !(0.0 < self.loop_split_min
            && self.loop_split_min < self.loop_split_max
            && self.loop_split_max < 1.0)
        {
            return Err(ConfigError::Invalid(format!(
                "loop split bounds must satisfy 0 < min < max < 1, got ({}, {})",
                self.loop_split_min, self.loop_split_max
            )));
        }

        if self.max_cubic_split_depth == 0 || self.max_stroke_subdivision_depth == 0 {
            return Err(ConfigError::Invalid(
                "recursion depth caps must be at least 1".to_string(),
            ));
        }

        if self.check_samples.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one check sample is required".to_string(),
            ));
        }
        if let Some(t) = self
            .check_samples
            .iter()
            .find(|t| !(**t > 0.0 && **t < 1.0))
        {
            return Err(ConfigError::Invalid(format!(
                "check samples must lie strictly inside (0, 1), got {t}"
            )));
        }

        Ok(())
    }
}
