// SPDX-FileCopyrightText: 2026 Santhosh Shyamsundar, Prabhu S., and Studio Tyto
// SPDX-License-Identifier: MIT
//
// PrintMix — Predictor registry
//
// This file is part of PrintMix.
// For licensing terms, see the LICENSE file in the project root.

use super::ensemble::TrainedModel;
use super::predictor::Predictor;
use super::properties::Property;
use crate::error::RegistryError;
use crate::mix::FeatureVector;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;
use tracing::{debug, info, warn};

/// On-disk bundle written by the training job.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PredictorArtifact {
    #[serde(default)]
    pub version: Option<String>,
    pub models: IndexMap<String, TrainedModel>,
}

/// Read-only name -> predictor map, filled once at start-up.
pub struct PredictorRegistry {
    predictors: IndexMap<String, Box<dyn Predictor>>,
    version: Option<String>,
    digest: Option<String>,
}

impl Default for PredictorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PredictorRegistry {
    pub fn new() -> Self {
        PredictorRegistry {
            predictors: IndexMap::new(),
            version: None,
            digest: None,
        }
    }

    /// Builder-style registration, used when wiring predictors in code.
    pub fn with(mut self, name: impl Into<String>, predictor: impl Predictor + 'static) -> Self {
        self.insert(name, Box::new(predictor));
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, predictor: Box<dyn Predictor>) {
        let name = name.into();
        if self.predictors.insert(name.clone(), predictor).is_some() {
            warn!(predictor = %name, "predictor replaced");
        }
    }

    /// Parse and validate a JSON artifact.
    pub fn from_json(artifact_json: &str) -> Result<Self, RegistryError> {
        let artifact: PredictorArtifact = serde_json::from_str(artifact_json)?;
        let mut registry = Self::from_artifact(artifact)?;
        registry.digest = Some(hex::encode(Sha256::digest(artifact_json.as_bytes())));
        info!(
            version = registry.version.as_deref().unwrap_or("unversioned"),
            digest = registry.digest.as_deref().unwrap_or_default(),
            models = registry.len(),
            "predictor artifact loaded"
        );
        Ok(registry)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "reading predictor artifact");
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_artifact(artifact: PredictorArtifact) -> Result<Self, RegistryError> {
        let mut registry = PredictorRegistry::new();
        registry.version = artifact.version;

        for (name, model) in artifact.models {
            model
                .validate()
                .map_err(|reason| RegistryError::InvalidModel {
                    name: name.clone(),
                    reason,
                })?;
            if Property::from_artifact_key(&name).is_none() {
                debug!(predictor = %name, "artifact carries a model with no known property");
            }
            registry.insert(name, Box::new(model));
        }

        for property in Property::ALL {
            if !registry.contains(property.artifact_key()) {
                if property.is_printability() {
                    debug!(predictor = property.artifact_key(), "printability model absent");
                } else {
                    warn!(predictor = property.artifact_key(), "core model absent from artifact");
                }
            }
        }
        Ok(registry)
    }

    pub fn get(&self, name: &str) -> Result<&dyn Predictor, RegistryError> {
        self.predictors
            .get(name)
            .map(|p| p.as_ref())
            .ok_or_else(|| RegistryError::PredictorNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.predictors.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.predictors.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.predictors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predictors.is_empty()
    }

    pub fn feature_names(&self, name: &str) -> Result<&[String], RegistryError> {
        Ok(self.get(name)?.feature_names())
    }

    /// Run one predictor; model errors come back tagged with its name.
    pub fn predict(&self, name: &str, features: &FeatureVector) -> Result<f64, RegistryError> {
        self.get(name)?
            .predict(features)
            .map_err(|e| RegistryError::from_predict(name, e))
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// SHA-256 of the artifact text, when loaded from one.
    pub fn digest(&self) -> Option<&str> {
        self.digest.as_deref()
    }
}

impl std::fmt::Debug for PredictorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredictorRegistry")
            .field("predictors", &self.predictors.keys().collect::<Vec<_>>())
            .field("version", &self.version)
            .field("digest", &self.digest)
            .finish()
    }
}
