// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Santhosh Shyamsundar, Prabhu S., and Studio Tyto

//! Grid-search optimizer for target strength
//!
//! Sweeps water/binder ratio against the cement share of the non-filler
//! binder and keeps every design whose predicted strength reaches the target.
//! Only the strength model runs per candidate.

use super::CancelToken;
use crate::config::OptimizerConfig;
use crate::error::{MixError, Result};
use crate::mix::BaseMix;
use crate::pipeline::PredictionPipeline;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info};

/// A recorded design that meets the target.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeasibleMix {
    pub cement_pct: f64,
    pub scm_pct: f64,
    pub water_binder: f64,
    pub predicted_strength: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OptimizationReport {
    pub target_strength: f64,
    pub age_days: u32,
    /// K = 100 - limestone - silica fume
    pub binder_budget: f64,
    pub evaluated: usize,
    /// Water/binder ascending, then cement fraction ascending.
    pub candidates: Vec<FeasibleMix>,
}

pub struct GridSearchOptimizer<'a> {
    pipeline: &'a PredictionPipeline,
    config: OptimizerConfig,
}

impl<'a> GridSearchOptimizer<'a> {
    /// Uses the optimizer section of the pipeline's configuration.
    pub fn new(pipeline: &'a PredictionPipeline) -> Self {
        Self::with_config(pipeline, pipeline.config().optimizer.clone())
    }

    pub fn with_config(pipeline: &'a PredictionPipeline, config: OptimizerConfig) -> Self {
        GridSearchOptimizer { pipeline, config }
    }

    fn binder_budget(&self, base: &BaseMix) -> Result<f64> {
        self.config.water_binder.validate("optimizer.water_binder")?;
        self.config.cement_fraction.validate("optimizer.cement_fraction")?;
        base.scm.validate_oxides()?;
        let k = base.binder_budget();
        if k <= 0.0 || !k.is_finite() {
            return Err(MixError::NonPositiveBinderBudget(k));
        }
        Ok(k)
    }

    /// Grid point `(i, j)` -> candidate strength, or `None` below target.
    fn evaluate_point(
        &self,
        base: &BaseMix,
        k: f64,
        i: usize,
        j: usize,
        target: f64,
    ) -> Result<Option<FeasibleMix>> {
        let water_binder = self.config.water_binder.value(i);
        let cement = self.config.cement_fraction.value(j) * k;
        let scm = k - cement;

        let candidate = base.complete(cement, scm, water_binder, self.config.target_age_days);
        let strength = self
            .pipeline
            .predict_strength(&candidate, self.config.target_age_days)?;

        Ok((strength >= target).then_some(FeasibleMix {
            cement_pct: cement,
            scm_pct: scm,
            water_binder,
            predicted_strength: strength,
        }))
    }

    pub fn optimize(&self, base: &BaseMix, target_strength: f64) -> Result<OptimizationReport> {
        self.optimize_with_cancel(base, target_strength, &CancelToken::new())
    }

    /// Sequential sweep; the token is checked before every grid point and a
    /// cancelled run yields no partial results.
    pub fn optimize_with_cancel(
        &self,
        base: &BaseMix,
        target_strength: f64,
        cancel: &CancelToken,
    ) -> Result<OptimizationReport> {
        let k = self.binder_budget(base)?;
        let start = instant::Instant::now();
        let mut candidates = Vec::new();
        let mut evaluated = 0usize;

        for i in 0..self.config.water_binder.points {
            for j in 0..self.config.cement_fraction.points {
                if cancel.is_cancelled() {
                    debug!(evaluated, "optimization cancelled");
                    return Err(MixError::Cancelled { evaluated });
                }
                if let Some(hit) = self.evaluate_point(base, k, i, j, target_strength)? {
                    candidates.push(hit);
                }
                evaluated += 1;
            }
        }

        info!(
            target = target_strength,
            binder_budget = k,
            evaluated,
            feasible = candidates.len(),
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "grid search complete"
        );

        Ok(OptimizationReport {
            target_strength,
            age_days: self.config.target_age_days,
            binder_budget: k,
            evaluated,
            candidates,
        })
    }

    /// Same sweep spread over the rayon pool; result order matches the
    /// sequential sweep.
    pub fn optimize_parallel(
        &self,
        base: &BaseMix,
        target_strength: f64,
        cancel: &CancelToken,
    ) -> Result<OptimizationReport> {
        let k = self.binder_budget(base)?;
        let cols = self.config.cement_fraction.points;
        let total = self.config.evaluations();

        let done = AtomicUsize::new(0);

        let outcomes: Result<Vec<Option<FeasibleMix>>> = (0..total)
            .into_par_iter()
            .map(|flat| {
                if cancel.is_cancelled() {
                    return Err(MixError::Cancelled { evaluated: 0 });
                }
                let hit = self.evaluate_point(base, k, flat / cols, flat % cols, target_strength)?;
                done.fetch_add(1, Ordering::Relaxed);
                Ok(hit)
            })
            .collect();

        // Workers stop at different points; report what actually ran.
        // A late cancel still discards the run.
        let outcomes = match outcomes {
            Err(MixError::Cancelled { .. }) => {
                return Err(MixError::Cancelled {
                    evaluated: done.load(Ordering::Relaxed),
                })
            }
            Err(e) => return Err(e),
            Ok(_) if cancel.is_cancelled() => {
                return Err(MixError::Cancelled {
                    evaluated: done.load(Ordering::Relaxed),
                })
            }
            Ok(outcomes) => outcomes,
        };

        let candidates: Vec<FeasibleMix> = outcomes.into_iter().flatten().collect();
        info!(
            target = target_strength,
            binder_budget = k,
            evaluated = total,
            feasible = candidates.len(),
            "parallel grid search complete"
        );

        Ok(OptimizationReport {
            target_strength,
            age_days: self.config.target_age_days,
            binder_budget: k,
            evaluated: total,
            candidates,
        })
    }
}
