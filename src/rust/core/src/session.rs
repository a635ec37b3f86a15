// SPDX-FileCopyrightText: 2026 Santhosh Shyamsundar, Prabhu S., and Studio Tyto
// SPDX-License-Identifier: MIT
//! Caller-owned prediction session.
//!
//! Printability is only offered once a base prediction exists for the
//! current design. That gate lives here, per session, so the pipeline itself
//! stays stateless.

use crate::error::{MixError, Result};
use crate::mix::{MixDesign, PrintingParameters};
use crate::pipeline::{PredictionPipeline, PrintabilityReport, PredictionReport};
use crate::qualification::QualificationReport;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::warn;

/// Outcome of the base prediction step.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// SHA-256 over the design's JSON form, to tie later steps to it.
    pub design_hash: String,
    pub prediction: PredictionReport,
    pub qualification: QualificationReport,
}

#[derive(Clone, Debug, Default)]
pub struct PredictionSession {
    design: Option<MixDesign>,
    evaluation: Option<Evaluation>,
}

fn design_hash(mix: &MixDesign) -> Result<String> {
    let bytes = serde_json::to_vec(mix).map_err(|e| MixError::invalid("design", e.to_string()))?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}

impl PredictionSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_prediction(&self) -> bool {
        self.evaluation.is_some()
    }

    pub fn evaluation(&self) -> Option<&Evaluation> {
        self.evaluation.as_ref()
    }

    /// Predict and qualify a design, replacing whatever the session held.
    /// A failed prediction leaves the session cleared.
    pub fn predict(&mut self, pipeline: &PredictionPipeline, mix: MixDesign) -> Result<&Evaluation> {
        self.reset();
        let hash = design_hash(&mix)?;
        let prediction = pipeline.predict(&mix, None)?;
        let qualification = pipeline.qualify(&mix, &prediction);
        let evaluation = Evaluation {
            design_hash: hash,
            prediction,
            qualification,
        };
        self.design = Some(mix);
        Ok(&*self.evaluation.insert(evaluation))
    }

    /// Printability for the design of the last successful prediction.
    /// Still runs when quality checks failed, with a warning.
    pub fn predict_printability(
        &self,
        pipeline: &PredictionPipeline,
        params: &PrintingParameters,
    ) -> Result<PrintabilityReport> {
        let (mix, evaluation) = match (&self.design, &self.evaluation) {
            (Some(mix), Some(evaluation)) => (mix, evaluation),
            _ => return Err(MixError::NotPredicted),
        };
        if let Some(advisory) = &evaluation.qualification.advisory {
            warn!(design = %evaluation.design_hash, "{}", advisory);
        }
        pipeline.predict_printability(mix, params, &pipeline.config().ages)
    }

    pub fn reset(&mut self) {
        self.design = None;
        self.evaluation = None;
    }
}
