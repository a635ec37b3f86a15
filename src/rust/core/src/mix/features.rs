// SPDX-FileCopyrightText: 2026 Santhosh Shyamsundar, Prabhu S., and Studio Tyto
// SPDX-License-Identifier: MIT
//! Feature pool and per-predictor feature vectors.

use super::design::{columns, MixDesign, PrintingParameters};
use crate::error::{MixError, Result};
use crate::formulas::ChemistryIndex;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Rheology predictors: mini-slump in the last slot.
pub const RHEOLOGY_FEATURES: [&str; 13] = [
    columns::CEMENT,
    columns::LIMESTONE,
    columns::SILICA_FUME,
    columns::SCM,
    columns::NC,
    columns::SSA,
    columns::WATER_BINDER,
    columns::SAND_BINDER,
    columns::AGGREGATE_BINDER,
    columns::FIBER_LENGTH,
    columns::FIBER_VOLUME,
    columns::FIBER_TYPE,
    columns::MINI_SLUMP,
];

/// Strength predictor: age in the last slot.
pub const STRENGTH_FEATURES: [&str; 13] = [
    columns::CEMENT,
    columns::LIMESTONE,
    columns::SILICA_FUME,
    columns::SCM,
    columns::NC,
    columns::SSA,
    columns::WATER_BINDER,
    columns::SAND_BINDER,
    columns::AGGREGATE_BINDER,
    columns::FIBER_LENGTH,
    columns::FIBER_VOLUME,
    columns::FIBER_TYPE,
    columns::AGE,
];

/// Ordered feature record handed to exactly one predictor.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector(IndexMap<String, f64>);

impl FeatureVector {
    pub fn new() -> Self {
        FeatureVector(IndexMap::new())
    }

    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        self.0.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, f64)> for FeatureVector {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        FeatureVector(iter.into_iter().collect())
    }
}

/// Every value known about one design, keyed by column name.
///
/// The oxide triple is taken out to derive Nc and written back unchanged, so
/// the pool stays self-consistent when inspected.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FeaturePool {
    values: IndexMap<String, f64>,
    chemistry: ChemistryIndex,
}

impl FeaturePool {
    pub fn from_design(mix: &MixDesign) -> Self {
        let chemistry = ChemistryIndex::compute(mix.scm.cao, mix.scm.al2o3, mix.scm.sio2);

        let mut values = IndexMap::new();
        let mut put = |k: &str, v: f64| {
            values.insert(k.to_string(), v);
        };
        put(columns::CEMENT, mix.cement_pct);
        put(columns::LIMESTONE, mix.limestone_pct);
        put(columns::SILICA_FUME, mix.silica_fume_pct);
        put(columns::SCM, mix.scm_pct);
        put(columns::NC, chemistry.nc);
        put(columns::SSA, mix.scm.specific_surface_area);
        put(columns::WATER_BINDER, mix.water_binder);
        put(columns::SAND_BINDER, mix.sand_binder);
        put(columns::AGGREGATE_BINDER, mix.aggregate_binder);
        put(columns::FIBER_LENGTH, mix.fiber.length_mm);
        put(columns::FIBER_VOLUME, mix.fiber.volume_pct);
        put(columns::FIBER_TYPE, mix.fiber.fiber_type.code() as f64);
        if let Some(slump) = mix.mini_slump {
            put(columns::MINI_SLUMP, slump);
        }
        if let Some(age) = mix.age_days {
            put(columns::AGE, age as f64);
        }
        put(columns::CAO, mix.scm.cao);
        put(columns::AL2O3, mix.scm.al2o3);
        put(columns::SIO2, mix.scm.sio2);

        FeaturePool { values, chemistry }
    }

    pub fn chemistry(&self) -> &ChemistryIndex {
        &self.chemistry
    }

    pub fn nc(&self) -> f64 {
        self.chemistry.nc
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn set(&mut self, name: &str, value: f64) {
        self.values.insert(name.to_string(), value);
    }

    pub fn set_age(&mut self, age_days: u32) {
        self.set(columns::AGE, age_days as f64);
    }

    pub fn set_printing(&mut self, params: &PrintingParameters) {
        self.set(columns::PRINTING_SPEED, params.speed_mm_s);
        self.set(columns::NOZZLE_SIZE, params.nozzle_mm);
        self.set(columns::LAYER_HEIGHT, params.layer_height_mm);
    }

    /// Strict assembly against a fixed schema. Absent keys are an input error,
    /// never a silent zero.
    pub fn assemble(&self, schema: &[&str]) -> Result<FeatureVector> {
        schema
            .iter()
            .map(|&name| {
                self.get(name)
                    .map(|v| (name.to_string(), v))
                    .ok_or_else(|| MixError::MissingFeature(name.to_string()))
            })
            .collect()
    }

    /// Assembly against a schema declared by the predictor itself: the
    /// declared names present in the pool, in declared order. Names the pool
    /// cannot supply are left out for the predictor to reject.
    pub fn assemble_declared<S: AsRef<str>>(&self, declared: &[S]) -> FeatureVector {
        declared
            .iter()
            .filter_map(|name| {
                let name = name.as_ref();
                self.get(name).map(|v| (name.to_string(), v))
            })
            .collect()
    }
}
