// SPDX-FileCopyrightText: 2026 Santhosh Shyamsundar, Prabhu S., and Studio Tyto
// SPDX-License-Identifier: MIT
//
// PrintMix — Exported regression ensembles
//
// This file is part of PrintMix.
// For licensing terms, see the LICENSE file in the project root.

//! Serialized regressors produced by the offline training job.
//!
//! Trees use the flat array layout of the exporting library: node `i` splits
//! on `feature[i]` at `threshold[i]`, samples with `x <= threshold` go to
//! `left[i]`, the rest to `right[i]`. A node whose children are both `-1` is
//! a leaf and predicts `value[i]`.

use super::predictor::{check_schema, ordered_values, Predictor};
use crate::error::PredictError;
use crate::mix::FeatureVector;
use serde::{Deserialize, Serialize};

const LEAF: i64 = -1;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub left: Vec<i64>,
    pub right: Vec<i64>,
    pub value: Vec<f64>,
}

impl RegressionTree {
    /// Single-leaf tree.
    pub fn constant(value: f64) -> Self {
        RegressionTree {
            feature: vec![LEAF],
            threshold: vec![0.0],
            left: vec![LEAF],
            right: vec![LEAF],
            value: vec![value],
        }
    }

    fn is_leaf(&self, node: usize) -> bool {
        self.left[node] == LEAF && self.right[node] == LEAF
    }

    /// Structural checks so `evaluate` can index without bounds failures and
    /// always terminates: equal array lengths, in-range features, and children
    /// strictly after their parent.
    pub fn validate(&self, n_features: usize) -> Result<(), String> {
        let n = self.value.len();
        if n == 0 {
            return Err("tree has no nodes".to_string());
        }
        if self.feature.len() != n
            || self.threshold.len() != n
            || self.left.len() != n
            || self.right.len() != n
        {
            return Err(format!(
                "array lengths differ (feature {}, threshold {}, left {}, right {}, value {})",
                self.feature.len(),
                self.threshold.len(),
                self.left.len(),
                self.right.len(),
                n
            ));
        }
        for node in 0..n {
            if self.is_leaf(node) {
                continue;
            }
            let (l, r) = (self.left[node], self.right[node]);
            if l <= node as i64 || r <= node as i64 || l >= n as i64 || r >= n as i64 {
                return Err(format!("node {} has invalid children ({}, {})", node, l, r));
            }
            let f = self.feature[node];
            if f < 0 || f as usize >= n_features {
                return Err(format!(
                    "node {} splits on feature {} but the model has {} features",
                    node, f, n_features
                ));
            }
        }
        Ok(())
    }

    pub fn evaluate(&self, row: &[f64]) -> f64 {
        let mut node = 0usize;
        while !self.is_leaf(node) {
            let x = row[self.feature[node] as usize];
            node = if x <= self.threshold[node] {
                self.left[node] as usize
            } else {
                self.right[node] as usize
            };
        }
        self.value[node]
    }
}

/// Final blender of a stacking ensemble.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinearBlend {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

impl LinearBlend {
    fn apply(&self, inputs: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(inputs)
                .map(|(c, x)| c * x)
                .sum::<f64>()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Regressor {
    Linear {
        intercept: f64,
        coefficients: Vec<f64>,
    },
    RandomForest {
        trees: Vec<RegressionTree>,
    },
    GradientBoosting {
        init: f64,
        learning_rate: f64,
        trees: Vec<RegressionTree>,
    },
    Stacking {
        estimators: Vec<Regressor>,
        final_estimator: LinearBlend,
    },
}

impl Regressor {
    pub fn validate(&self, n_features: usize) -> Result<(), String> {
        match self {
            Regressor::Linear { coefficients, .. } => {
                if coefficients.len() != n_features {
                    return Err(format!(
                        "linear model has {} coefficients for {} features",
                        coefficients.len(),
                        n_features
                    ));
                }
                Ok(())
            }
            Regressor::RandomForest { trees } => {
                if trees.is_empty() {
                    return Err("random forest has no trees".to_string());
                }
                trees.iter().try_for_each(|t| t.validate(n_features))
            }
            Regressor::GradientBoosting { trees, .. } => {
                trees.iter().try_for_each(|t| t.validate(n_features))
            }
            Regressor::Stacking {
                estimators,
                final_estimator,
            } => {
                if estimators.is_empty() {
                    return Err("stacking ensemble has no base estimators".to_string());
                }
                if final_estimator.coefficients.len() != estimators.len() {
                    return Err(format!(
                        "final estimator has {} coefficients for {} base estimators",
                        final_estimator.coefficients.len(),
                        estimators.len()
                    ));
                }
                estimators.iter().try_for_each(|e| e.validate(n_features))
            }
        }
    }

    pub fn evaluate(&self, row: &[f64]) -> f64 {
        match self {
            Regressor::Linear {
                intercept,
                coefficients,
            } => {
                intercept
                    + coefficients
                        .iter()
                        .zip(row)
                        .map(|(c, x)| c * x)
                        .sum::<f64>()
            }
            Regressor::RandomForest { trees } => {
                trees.iter().map(|t| t.evaluate(row)).sum::<f64>() / trees.len() as f64
            }
            Regressor::GradientBoosting {
                init,
                learning_rate,
                trees,
            } => init + learning_rate * trees.iter().map(|t| t.evaluate(row)).sum::<f64>(),
            Regressor::Stacking {
                estimators,
                final_estimator,
            } => {
                let base: Vec<f64> = estimators.iter().map(|e| e.evaluate(row)).collect();
                final_estimator.apply(&base)
            }
        }
    }
}

/// One artifact entry: a regressor together with its training columns.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainedModel {
    pub feature_names: Vec<String>,
    pub regressor: Regressor,
}

impl TrainedModel {
    pub fn validate(&self) -> Result<(), String> {
        if self.feature_names.is_empty() {
            return Err("model declares no features".to_string());
        }
        for (i, name) in self.feature_names.iter().enumerate() {
            if self.feature_names[..i].contains(name) {
                return Err(format!("feature '{}' declared twice", name));
            }
        }
        self.regressor.validate(self.feature_names.len())
    }
}

impl Predictor for TrainedModel {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict(&self, features: &FeatureVector) -> Result<f64, PredictError> {
        check_schema(&self.feature_names, features)?;
        let row = ordered_values(&self.feature_names, features)?;
        Ok(self.regressor.evaluate(&row))
    }
}
