// SPDX-FileCopyrightText: 2026 Santhosh Shyamsundar, Prabhu S., and Studio Tyto
// SPDX-License-Identifier: MIT
//
// PrintMix — Prediction pipeline
//
// This file is part of PrintMix.
// For licensing terms, see the LICENSE file in the project root.

// ============================================================================
// PredictionPipeline: rheology -> strength -> printability
// ============================================================================
// Stage order is fixed: later stages reuse pool fields (age) set by earlier
// ones. Any predictor failure aborts the whole call.
// ============================================================================

use crate::config::KernelConfig;
use crate::error::Result;
use crate::formulas::ChemistryIndex;
use crate::mix::{FeaturePool, MixDesign, PrintingParameters, RHEOLOGY_FEATURES, STRENGTH_FEATURES};
use crate::qualification::QualificationReport;
use crate::science::{PredictorRegistry, Property};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PrintabilityReport {
    pub max_layers: f64,
    /// `max_layers` rounded for display.
    pub max_layers_rounded: i64,
    /// Printed-specimen strength by age (days).
    pub strength: BTreeMap<u32, f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionReport {
    pub chemistry: Option<ChemistryIndex>,
    pub rheology: IndexMap<Property, f64>,
    /// Compressive strength by age (days).
    pub strength: BTreeMap<u32, f64>,
    pub printability: Option<PrintabilityReport>,
}

/// Orchestrates chemistry index, feature assembly and the registry.
///
/// Stateless between calls; the registry is shared read-only.
#[derive(Clone, Debug)]
pub struct PredictionPipeline {
    registry: Arc<PredictorRegistry>,
    config: KernelConfig,
}

impl PredictionPipeline {
    pub fn new(registry: Arc<PredictorRegistry>, config: KernelConfig) -> Self {
        PredictionPipeline { registry, config }
    }

    pub fn registry(&self) -> &Arc<PredictorRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    /// Full prediction at the configured ages. Printability runs only when
    /// printer settings are supplied.
    pub fn predict(
        &self,
        mix: &MixDesign,
        printing: Option<&PrintingParameters>,
    ) -> Result<PredictionReport> {
        self.predict_at(mix, &self.config.ages, printing)
    }

    pub fn predict_at(
        &self,
        mix: &MixDesign,
        ages: &[u32],
        printing: Option<&PrintingParameters>,
    ) -> Result<PredictionReport> {
        let start = instant::Instant::now();
        mix.validate()?;

        // 1. Nc, once
        let mut pool = FeaturePool::from_design(mix);
        debug!(nc = pool.nc(), branch = ?pool.chemistry().branch, "chemistry index");

        // 2. Rheology (age independent)
        let rheology = self.predict_rheology(&pool)?;

        // 3. Strength per age
        let mut strength = BTreeMap::new();
        for &age in ages {
            strength.insert(age, self.predict_strength_in(&mut pool, age)?);
        }

        // 4. Printability
        let printability = match printing {
            Some(params) => Some(self.predict_printability_in(&mut pool, params, ages)?),
            None => None,
        };

        debug!(
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            ages = ages.len(),
            printability = printability.is_some(),
            "prediction complete"
        );

        Ok(PredictionReport {
            chemistry: Some(*pool.chemistry()),
            rheology,
            strength,
            printability,
        })
    }

    /// The five fresh-state properties from one rheology vector.
    pub fn predict_rheology(&self, pool: &FeaturePool) -> Result<IndexMap<Property, f64>> {
        let features = pool.assemble(&RHEOLOGY_FEATURES)?;
        let mut out = IndexMap::with_capacity(Property::RHEOLOGY.len());
        for property in Property::RHEOLOGY {
            let value = self.registry.predict(property.artifact_key(), &features)?;
            out.insert(property, value);
        }
        Ok(out)
    }

    /// Compressive strength of a design at one age. The caller's design is
    /// not modified.
    pub fn predict_strength(&self, mix: &MixDesign, age_days: u32) -> Result<f64> {
        let mut pool = FeaturePool::from_design(mix);
        self.predict_strength_in(&mut pool, age_days)
    }

    fn predict_strength_in(&self, pool: &mut FeaturePool, age_days: u32) -> Result<f64> {
        pool.set_age(age_days);
        let features = pool.assemble(&STRENGTH_FEATURES)?;
        Ok(self
            .registry
            .predict(Property::CompressiveStrength.artifact_key(), &features)?)
    }

    /// Printability stage alone, for callers that already hold a base
    /// prediction. `Age` is taken from `ages`, not from the design.
    pub fn predict_printability(
        &self,
        mix: &MixDesign,
        params: &PrintingParameters,
        ages: &[u32],
    ) -> Result<PrintabilityReport> {
        let mut pool = FeaturePool::from_design(mix);
        self.predict_printability_in(&mut pool, params, ages)
    }

    fn predict_printability_in(
        &self,
        pool: &mut FeaturePool,
        params: &PrintingParameters,
        ages: &[u32],
    ) -> Result<PrintabilityReport> {
        pool.set_printing(params);
        // Layer model sees the last strength age, as after the strength stage
        if let Some(&age) = ages.last() {
            pool.set_age(age);
        }

        let layer_key = Property::MaxPrintableLayers.artifact_key();
        let layer_features = pool.assemble_declared(self.registry.feature_names(layer_key)?);
        let max_layers = self.registry.predict(layer_key, &layer_features)?;

        let strength_key = Property::PrintedCompressiveStrength.artifact_key();
        let declared = self.registry.feature_names(strength_key)?;
        let mut strength = BTreeMap::new();
        for &age in ages {
            pool.set_age(age);
            let features = pool.assemble_declared(declared);
            strength.insert(age, self.registry.predict(strength_key, &features)?);
        }

        Ok(PrintabilityReport {
            max_layers,
            max_layers_rounded: max_layers.round() as i64,
            strength,
        })
    }

    /// Apply the configured qualification policy to a report.
    pub fn qualify(&self, mix: &MixDesign, report: &PredictionReport) -> QualificationReport {
        self.config.qualification.evaluate(report, mix.fiber.fiber_type)
    }
}
