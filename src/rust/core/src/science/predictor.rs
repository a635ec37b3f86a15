// SPDX-FileCopyrightText: 2026 Santhosh Shyamsundar, Prabhu S., and Studio Tyto
// SPDX-License-Identifier: MIT
//
// PrintMix — Predictor interface
//
// This file is part of PrintMix.
// For licensing terms, see the LICENSE file in the project root.

//! Predictor trait for trained property models
//!
//! Every regressor the registry hands out declares the ordered feature names
//! it was trained on and maps a matching feature vector to a scalar.
//!
//! ```text
//! PredictionPipeline --uses--> PredictorRegistry --owns--> dyn Predictor
//!                                                              ^
//!                                   +--------------------------+
//!                                   |                          |
//!                              TrainedModel               FnPredictor
//! ```

use crate::error::PredictError;
use crate::mix::FeatureVector;

/// A trained regression function over named features.
pub trait Predictor: Send + Sync {
    /// Feature names the model was fitted on, in training column order.
    fn feature_names(&self) -> &[String];

    /// Predict one scalar from a feature vector carrying exactly
    /// `feature_names()` (order-insensitive).
    fn predict(&self, features: &FeatureVector) -> Result<f64, PredictError>;
}

/// Compare a vector's keys against a declared schema.
pub fn check_schema(declared: &[String], features: &FeatureVector) -> Result<(), PredictError> {
    let missing: Vec<String> = declared
        .iter()
        .filter(|name| !features.contains(name))
        .cloned()
        .collect();
    let extra: Vec<String> = features
        .names()
        .filter(|name| !declared.iter().any(|d| d.as_str() == *name))
        .map(str::to_string)
        .collect();

    if missing.is_empty() && extra.is_empty() {
        Ok(())
    } else {
        Err(PredictError::SchemaMismatch { missing, extra })
    }
}

/// Gather values in declared order. Assumes `check_schema` passed.
pub fn ordered_values(declared: &[String], features: &FeatureVector) -> Result<Vec<f64>, PredictError> {
    declared
        .iter()
        .map(|name| {
            let value = features.get(name).unwrap_or(f64::NAN);
            if value.is_finite() {
                Ok(value)
            } else {
                Err(PredictError::NonFiniteInput {
                    feature: name.clone(),
                    value,
                })
            }
        })
        .collect()
}

/// Predictor backed by a closure over the ordered input row.
pub struct FnPredictor<F>
where
    F: Fn(&[f64]) -> f64 + Send + Sync,
{
    feature_names: Vec<String>,
    func: F,
}

impl<F> FnPredictor<F>
where
    F: Fn(&[f64]) -> f64 + Send + Sync,
{
    pub fn new<S: AsRef<str>>(feature_names: &[S], func: F) -> Self {
        FnPredictor {
            feature_names: feature_names.iter().map(|s| s.as_ref().to_string()).collect(),
            func,
        }
    }
}

impl<F> Predictor for FnPredictor<F>
where
    F: Fn(&[f64]) -> f64 + Send + Sync,
{
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict(&self, features: &FeatureVector) -> Result<f64, PredictError> {
        check_schema(&self.feature_names, features)?;
        let row = ordered_values(&self.feature_names, features)?;
        Ok((self.func)(&row))
    }
}
