// SPDX-FileCopyrightText: 2026 Santhosh Shyamsundar, Prabhu S., and Studio Tyto
// SPDX-License-Identifier: MIT
//! Kernel configuration.

use crate::error::{MixError, Result};
use crate::qualification::QualificationPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Closed, evenly spaced axis. Points come from integer indices so the upper
/// bound is always hit exactly, regardless of step rounding.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridAxis {
    pub start: f64,
    pub stop: f64,
    pub points: usize,
}

impl GridAxis {
    pub fn new(start: f64, stop: f64, points: usize) -> Self {
        GridAxis {
            start,
            stop,
            points,
        }
    }

    pub fn value(&self, index: usize) -> f64 {
        if self.points <= 1 || index == 0 {
            return self.start;
        }
        if index + 1 >= self.points {
            return self.stop;
        }
        self.start + (self.stop - self.start) * index as f64 / (self.points - 1) as f64
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.points).map(move |i| self.value(i))
    }

    pub fn validate(&self, name: &str) -> Result<()> {
        if self.points == 0 {
            return Err(MixError::invalid(name, "axis has no points"));
        }
        if !self.start.is_finite() || !self.stop.is_finite() || self.stop < self.start {
            return Err(MixError::invalid(
                name,
                format!("expected finite start <= stop, got {}..{}", self.start, self.stop),
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Water/binder ratio, 0.30..=0.50 step 0.01.
    pub water_binder: GridAxis,
    /// Cement share of the non-filler binder, 0.50..=1.00 step 0.05.
    pub cement_fraction: GridAxis,
    /// Age the target strength refers to.
    pub target_age_days: u32,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            water_binder: GridAxis::new(0.30, 0.50, 21),
            cement_fraction: GridAxis::new(0.50, 1.00, 11),
            target_age_days: 28,
        }
    }
}

impl OptimizerConfig {
    pub fn evaluations(&self) -> usize {
        self.water_binder.points * self.cement_fraction.points
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    /// Ages (days) at which strength is predicted.
    pub ages: Vec<u32>,
    pub optimizer: OptimizerConfig,
    pub qualification: QualificationPolicy,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            ages: vec![7, 28],
            optimizer: OptimizerConfig::default(),
            qualification: QualificationPolicy::default(),
        }
    }
}

impl KernelConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        let config: KernelConfig = serde_json::from_str(text)
            .map_err(|e| MixError::invalid("config", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| MixError::invalid("config", format!("{}: {}", path.display(), e)))?;
        Self::from_json(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.ages.is_empty() {
            return Err(MixError::invalid("ages", "at least one age is required"));
        }
        self.optimizer.water_binder.validate("optimizer.water_binder")?;
        self.optimizer.cement_fraction.validate("optimizer.cement_fraction")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_axes_hit_closed_bounds() {
        let cfg = OptimizerConfig::default();
        let wb: Vec<f64> = cfg.water_binder.values().collect();
        assert_eq!(wb.len(), 21);
        assert_eq!(wb[0], 0.30);
        assert_eq!(*wb.last().unwrap(), 0.50);
        assert!((wb[1] - 0.31).abs() < 1e-12);

        let cement: Vec<f64> = cfg.cement_fraction.values().collect();
        assert_eq!(cement.len(), 11);
        assert_eq!(*cement.last().unwrap(), 1.00);
        assert!((cement[1] - 0.55).abs() < 1e-12);
        assert_eq!(cfg.evaluations(), 231);
    }

    #[test]
    fn test_axis_values_strictly_increase() {
        let axis = GridAxis::new(0.30, 0.50, 21);
        let v: Vec<f64> = axis.values().collect();
        assert!(v.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let cfg = KernelConfig::from_json(r#"{"ages": [1, 7, 28]}"#).unwrap();
        assert_eq!(cfg.ages, vec![1, 7, 28]);
        assert_eq!(cfg.optimizer, OptimizerConfig::default());
        assert_eq!(cfg.qualification, QualificationPolicy::default());
    }

    #[test]
    fn test_invalid_configs_rejected() {
        assert!(KernelConfig::from_json(r#"{"ages": []}"#).is_err());
        assert!(KernelConfig::from_json(
            r#"{"optimizer": {"water_binder": {"start": 0.5, "stop": 0.3, "points": 3}}}"#
        )
        .is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"optimizer": {{"target_age_days": 7}}}}"#).unwrap();
        let cfg = KernelConfig::load(file.path()).unwrap();
        assert_eq!(cfg.optimizer.target_age_days, 7);
        assert_eq!(cfg.ages, vec![7, 28]);
    }
}
