// SPDX-FileCopyrightText: 2026 Santhosh Shyamsundar, Prabhu S., and Studio Tyto
// SPDX-License-Identifier: MIT
//
// PrintMix — JS facade
//
// This file is part of PrintMix.
// For licensing terms, see the LICENSE file in the project root.

// ============================================================================
// MixDesignStudio: JSON in, JSON out
// ============================================================================
// The front end sends raw JSON strings; all marshalling happens in Rust.
// Every response is {"result": ..., "error": ..., "events": [...]}.
// ============================================================================

use crate::config::KernelConfig;
use crate::error::MixError;
use crate::mix::{BaseMix, InputRecord, MixDesign, PrintingParameters};
use crate::optimization::GridSearchOptimizer;
use crate::pipeline::PredictionPipeline;
use crate::qualification::{QualificationReport, Verdict};
use crate::science::{PredictorRegistry, ScmPreset};
use crate::session::PredictionSession;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use wasm_bindgen::prelude::*;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ValidationEvent {
    pub topic: String,
    pub message: String,
    pub severity: String, // 'INFO', 'WARNING', 'CRITICAL'
}

#[derive(Serialize)]
struct Envelope<T: Serialize> {
    result: Option<T>,
    error: Option<String>,
    events: Vec<ValidationEvent>,
}

fn respond<T: Serialize>(outcome: Result<T, MixError>, events: Vec<ValidationEvent>) -> String {
    let envelope = match outcome {
        Ok(result) => Envelope {
            result: Some(result),
            error: None,
            events,
        },
        Err(e) => Envelope {
            result: None,
            error: Some(e.to_string()),
            events,
        },
    };
    serde_json::to_string(&envelope).unwrap_or_else(|e| {
        serde_json::json!({ "result": null, "error": e.to_string(), "events": [] }).to_string()
    })
}

fn parse<T: for<'de> Deserialize<'de>>(field: &str, json: &str) -> Result<T, MixError> {
    serde_json::from_str(json).map_err(|e| MixError::invalid(field, e.to_string()))
}

fn qualification_events(q: &QualificationReport) -> Vec<ValidationEvent> {
    let mut events: Vec<ValidationEvent> = q
        .rheology
        .iter()
        .filter(|c| c.verdict == Verdict::Fail)
        .map(|c| ValidationEvent {
            topic: "QUALIFICATION.RHEOLOGY".to_string(),
            message: format!("{}: {:.3} outside acceptance band", c.label, c.value),
            severity: "WARNING".to_string(),
        })
        .chain(
            q.strength
                .iter()
                .filter(|c| c.verdict == Verdict::Fail)
                .map(|c| ValidationEvent {
                    topic: "QUALIFICATION.STRENGTH".to_string(),
                    message: format!("{} days: {:.3} MPa below requirement", c.age_days, c.value),
                    severity: "WARNING".to_string(),
                }),
        )
        .collect();

    if let Some(advisory) = &q.advisory {
        events.push(ValidationEvent {
            topic: "QUALIFICATION".to_string(),
            message: advisory.clone(),
            severity: "INFO".to_string(),
        });
    }
    events
}

#[wasm_bindgen]
pub struct MixDesignStudio {
    pipeline: PredictionPipeline,
    session: PredictionSession,
}

#[wasm_bindgen]
impl MixDesignStudio {
    /// Load a predictor artifact and an optional kernel configuration.
    #[wasm_bindgen(constructor)]
    pub fn new(artifact_json: &str, config_json: Option<String>) -> Result<MixDesignStudio, String> {
        let registry = PredictorRegistry::from_json(artifact_json).map_err(|e| e.to_string())?;
        let config = match config_json {
            Some(text) => KernelConfig::from_json(&text).map_err(|e| e.to_string())?,
            None => KernelConfig::default(),
        };
        Ok(MixDesignStudio {
            pipeline: PredictionPipeline::new(Arc::new(registry), config),
            session: PredictionSession::new(),
        })
    }

    /// Rheology + strength prediction with pass/fail for a column-keyed record.
    pub fn predict(&mut self, record_json: &str) -> String {
        let mix = match parse::<InputRecord>("record", record_json).and_then(|r| MixDesign::from_record(&r)) {
            Ok(mix) => mix,
            Err(e) => {
                self.session.reset();
                return respond::<()>(Err(e), Vec::new());
            }
        };
        match self.session.predict(&self.pipeline, mix) {
            Ok(evaluation) => {
                let events = qualification_events(&evaluation.qualification);
                respond(Ok(evaluation.clone()), events)
            }
            Err(e) => respond::<()>(Err(e), Vec::new()),
        }
    }

    /// Printability for the last predicted design.
    pub fn predict_printability(&self, params_json: &str) -> String {
        let outcome = parse::<PrintingParameters>("printing", params_json)
            .and_then(|params| self.session.predict_printability(&self.pipeline, &params));
        respond(outcome, Vec::new())
    }

    /// Grid search for designs reaching `target_strength` at the configured age.
    pub fn optimize(&self, record_json: &str, target_strength: f64) -> String {
        let outcome = parse::<InputRecord>("record", record_json)
            .and_then(|r| BaseMix::from_record(&r))
            .and_then(|base| GridSearchOptimizer::new(&self.pipeline).optimize(&base, target_strength));

        let events = match &outcome {
            Ok(report) if report.candidates.is_empty() => vec![ValidationEvent {
                topic: "OPTIMIZATION".to_string(),
                message: "No combination met the target strength.".to_string(),
                severity: "WARNING".to_string(),
            }],
            Ok(report) => vec![ValidationEvent {
                topic: "OPTIMIZATION".to_string(),
                message: format!("Found {} valid combinations!", report.candidates.len()),
                severity: "INFO".to_string(),
            }],
            Err(_) => Vec::new(),
        };
        respond(outcome, events)
    }

    pub fn has_prediction(&self) -> bool {
        self.session.has_prediction()
    }

    pub fn artifact_digest(&self) -> Option<String> {
        self.pipeline.registry().digest().map(str::to_string)
    }

    /// `[{ "key", "label", "composition" }]` for the SCM picker.
    pub fn scm_presets() -> String {
        let presets: Vec<serde_json::Value> = ScmPreset::ALL
            .iter()
            .map(|p| {
                serde_json::json!({
                    "key": p,
                    "label": p.label(),
                    "composition": p.composition(),
                })
            })
            .collect();
        serde_json::to_string(&presets).unwrap_or_else(|_| "[]".to_string())
    }

    /// Composition of one preset, looked up by display label or key.
    pub fn scm_preset(label: &str) -> String {
        let outcome = ScmPreset::from_label(label)
            .map(ScmPreset::composition)
            .ok_or_else(|| MixError::invalid("scm", format!("unknown SCM preset '{}'", label)));
        respond(outcome, Vec::new())
    }
}
