// SPDX-FileCopyrightText: 2026 Santhosh Shyamsundar, Prabhu S., and Studio Tyto
// SPDX-License-Identifier: MIT
//! Error taxonomy for mix evaluation and predictor access.

use thiserror::Error;

/// Failure raised by a single predictor, before the registry attaches its name.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictError {
    #[error("feature schema mismatch: missing {missing:?}, unexpected {extra:?}")]
    SchemaMismatch {
        missing: Vec<String>,
        extra: Vec<String>,
    },

    #[error("non-finite value {value} for feature '{feature}'")]
    NonFiniteInput { feature: String, value: f64 },
}

/// Errors from the predictor registry and artifact loading.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("predictor '{0}' not found")]
    PredictorNotFound(String),

    #[error("schema mismatch for predictor '{predictor}': missing {missing:?}, unexpected {extra:?}")]
    SchemaMismatch {
        predictor: String,
        missing: Vec<String>,
        extra: Vec<String>,
    },

    #[error("predictor '{predictor}' rejected its input: {source}")]
    Evaluation {
        predictor: String,
        #[source]
        source: PredictError,
    },

    #[error("invalid model '{name}': {reason}")]
    InvalidModel { name: String, reason: String },

    #[error("failed to parse predictor artifact: {0}")]
    Artifact(#[from] serde_json::Error),

    #[error("failed to read predictor artifact: {0}")]
    Io(#[from] std::io::Error),
}

impl RegistryError {
    /// Attach the predictor name to a model-level failure.
    pub fn from_predict(predictor: &str, err: PredictError) -> Self {
        match err {
            PredictError::SchemaMismatch { missing, extra } => RegistryError::SchemaMismatch {
                predictor: predictor.to_string(),
                missing,
                extra,
            },
            other => RegistryError::Evaluation {
                predictor: predictor.to_string(),
                source: other,
            },
        }
    }
}

/// Errors surfaced by the prediction pipeline, optimizer and session.
#[derive(Debug, Error)]
pub enum MixError {
    #[error("missing required feature '{0}'")]
    MissingFeature(String),

    #[error("invalid input '{field}': {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("binder budget K = {0} is not positive; limestone + silica fume must stay below 100%")]
    NonPositiveBinderBudget(f64),

    #[error("optimization cancelled after {evaluated} grid points")]
    Cancelled { evaluated: usize },

    #[error("printability prediction requested before a base prediction")]
    NotPredicted,

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl MixError {
    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        MixError::InvalidInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = MixError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_mismatch_gains_predictor_name() {
        let err = RegistryError::from_predict(
            "stacking_model_L",
            PredictError::SchemaMismatch {
                missing: vec!["nozzle size (mm)".to_string()],
                extra: vec![],
            },
        );
        let msg = err.to_string();
        assert!(msg.contains("stacking_model_L"));
        assert!(msg.contains("nozzle size (mm)"));
    }

    #[test]
    fn test_missing_feature_names_key() {
        let err = MixError::MissingFeature("Age".to_string());
        assert_eq!(err.to_string(), "missing required feature 'Age'");
    }
}
