// SPDX-FileCopyrightText: 2026 Santhosh Shyamsundar, Prabhu S., and Studio Tyto
// SPDX-License-Identifier: MIT
//! Typed mix-design records.
//!
//! Column names are the headers of the training sheets; predictors are keyed
//! on them, so they are spelled exactly as exported.

use crate::error::{MixError, Result};
use crate::science::materials::{FiberSpec, FiberType, ScmComposition};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub mod columns {
    pub const CEMENT: &str = "Cement content (%)";
    pub const LIMESTONE: &str = "Limestone content (%)";
    pub const SILICA_FUME: &str = "Silica fume content (%)";
    pub const SCM: &str = "SCM content (%)";
    pub const NC: &str = "Nc";
    pub const SSA: &str = "SSA of SCM (m2/g)";
    pub const WATER_BINDER: &str = "Water/Binder";
    pub const SAND_BINDER: &str = "Sand/Binder";
    pub const AGGREGATE_BINDER: &str = "Aggregate/Binder";
    pub const FIBER_LENGTH: &str = "Fiber length (mm)";
    pub const FIBER_VOLUME: &str = "Fiber Volume (%)";
    pub const FIBER_TYPE: &str = "Fiber Type";
    pub const AGE: &str = "Age";
    pub const MINI_SLUMP: &str = "Mini-slump after joint";
    pub const CAO: &str = "CaO in SCM";
    pub const AL2O3: &str = "Al2O3 in SCM";
    pub const SIO2: &str = "SiO2 in SCM";
    pub const PRINTING_SPEED: &str = "Printing speed (mm/s)";
    pub const NOZZLE_SIZE: &str = "nozzle size (mm)";
    pub const LAYER_HEIGHT: &str = "single layer height (mm)";
}

/// Flat name -> value record as supplied by a form or a JSON request.
pub type InputRecord = IndexMap<String, f64>;

/// One complete formulation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MixDesign {
    pub cement_pct: f64,
    pub limestone_pct: f64,
    pub silica_fume_pct: f64,
    pub scm_pct: f64,
    pub scm: ScmComposition,
    pub water_binder: f64,
    pub sand_binder: f64,
    pub aggregate_binder: f64,
    #[serde(default)]
    pub fiber: FiberSpec,
    #[serde(default)]
    pub mini_slump: Option<f64>,
    #[serde(default)]
    pub age_days: Option<u32>,
}

/// A mix with the binder split, water/binder ratio and age left open.
/// Input of the grid search.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BaseMix {
    pub limestone_pct: f64,
    pub silica_fume_pct: f64,
    pub scm: ScmComposition,
    pub sand_binder: f64,
    pub aggregate_binder: f64,
    #[serde(default)]
    pub fiber: FiberSpec,
    #[serde(default)]
    pub mini_slump: Option<f64>,
}

/// Printer settings required by the printability predictors.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PrintingParameters {
    pub speed_mm_s: f64,
    pub nozzle_mm: f64,
    pub layer_height_mm: f64,
}

fn required(record: &InputRecord, key: &str) -> Result<f64> {
    let value = *record
        .get(key)
        .ok_or_else(|| MixError::MissingFeature(key.to_string()))?;
    if !value.is_finite() {
        return Err(MixError::invalid(key, format!("non-finite value {}", value)));
    }
    Ok(value)
}

fn optional(record: &InputRecord, key: &str) -> Result<Option<f64>> {
    match record.get(key) {
        Some(_) => required(record, key).map(Some),
        None => Ok(None),
    }
}

fn age_from(record: &InputRecord) -> Result<Option<u32>> {
    match optional(record, columns::AGE)? {
        Some(age) if age < 0.0 || age.fract() != 0.0 => Err(MixError::invalid(
            columns::AGE,
            format!("expected whole days, got {}", age),
        )),
        Some(age) => Ok(Some(age as u32)),
        None => Ok(None),
    }
}

fn scm_from(record: &InputRecord) -> Result<ScmComposition> {
    Ok(ScmComposition {
        specific_surface_area: required(record, columns::SSA)?,
        cao: required(record, columns::CAO)?,
        al2o3: required(record, columns::AL2O3)?,
        sio2: required(record, columns::SIO2)?,
    })
}

fn fiber_from(record: &InputRecord) -> Result<FiberSpec> {
    Ok(FiberSpec {
        fiber_type: FiberType::from_feature(required(record, columns::FIBER_TYPE)?)?,
        length_mm: required(record, columns::FIBER_LENGTH)?,
        volume_pct: required(record, columns::FIBER_VOLUME)?,
    })
}

impl MixDesign {
    /// Validate a column-keyed record. Missing required columns are reported
    /// by name; optional columns (age, mini-slump) may be absent.
    pub fn from_record(record: &InputRecord) -> Result<Self> {
        let scm = scm_from(record)?;
        scm.validate_oxides()?;
        Ok(MixDesign {
            cement_pct: required(record, columns::CEMENT)?,
            limestone_pct: required(record, columns::LIMESTONE)?,
            silica_fume_pct: required(record, columns::SILICA_FUME)?,
            scm_pct: required(record, columns::SCM)?,
            scm,
            water_binder: required(record, columns::WATER_BINDER)?,
            sand_binder: required(record, columns::SAND_BINDER)?,
            aggregate_binder: required(record, columns::AGGREGATE_BINDER)?,
            fiber: fiber_from(record)?,
            mini_slump: optional(record, columns::MINI_SLUMP)?,
            age_days: age_from(record)?,
        })
    }

    pub fn validate(&self) -> Result<()> {
        self.scm.validate_oxides()
    }
}

impl BaseMix {
    pub fn from_record(record: &InputRecord) -> Result<Self> {
        let scm = scm_from(record)?;
        scm.validate_oxides()?;
        Ok(BaseMix {
            limestone_pct: required(record, columns::LIMESTONE)?,
            silica_fume_pct: required(record, columns::SILICA_FUME)?,
            scm,
            sand_binder: required(record, columns::SAND_BINDER)?,
            aggregate_binder: required(record, columns::AGGREGATE_BINDER)?,
            fiber: fiber_from(record)?,
            mini_slump: optional(record, columns::MINI_SLUMP)?,
        })
    }

    /// Binder mass left for cement + SCM once the fillers are taken out.
    pub fn binder_budget(&self) -> f64 {
        100.0 - self.limestone_pct - self.silica_fume_pct
    }

    /// Fill in the open fields to obtain a complete design.
    pub fn complete(&self, cement_pct: f64, scm_pct: f64, water_binder: f64, age_days: u32) -> MixDesign {
        MixDesign {
            cement_pct,
            limestone_pct: self.limestone_pct,
            silica_fume_pct: self.silica_fume_pct,
            scm_pct,
            scm: self.scm,
            water_binder,
            sand_binder: self.sand_binder,
            aggregate_binder: self.aggregate_binder,
            fiber: self.fiber,
            mini_slump: self.mini_slump,
            age_days: Some(age_days),
        }
    }
}

impl From<&MixDesign> for BaseMix {
    fn from(mix: &MixDesign) -> Self {
        BaseMix {
            limestone_pct: mix.limestone_pct,
            silica_fume_pct: mix.silica_fume_pct,
            scm: mix.scm,
            sand_binder: mix.sand_binder,
            aggregate_binder: mix.aggregate_binder,
            fiber: mix.fiber,
            mini_slump: mix.mini_slump,
        }
    }
}
