// SPDX-FileCopyrightText: 2026 Santhosh Shyamsundar, Prabhu S., and Studio Tyto
// SPDX-License-Identifier: MIT
//! Closed-form chemistry formulas for SCM characterisation
//!
//! Pure scalar functions. The Nc index condenses the CaO / Al2O3 / SiO2
//! split of a supplementary cementitious material into a single reactivity
//! feature consumed by the rheology and strength predictors.

use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

// ============================================================================
// CHEMISTRY INDEX (Nc)
// ============================================================================

/// Lower edge of the balanced branch, `reg = nAl - nCa`.
pub const BALANCED_LOWER: f64 = -2.0 / 3.0;

/// Which rational expression produced an Nc value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NcBranch {
    /// `reg < -2/3`
    CalciumRich,
    /// `-2/3 <= reg <= 0`
    Balanced,
    /// `reg > 0`
    AluminaRich,
}

impl NcBranch {
    /// Total partition of the real line; both edges belong to `Balanced`.
    pub fn select(reg: f64) -> Self {
        if reg < BALANCED_LOWER {
            NcBranch::CalciumRich
        } else if reg <= 0.0 {
            NcBranch::Balanced
        } else {
            NcBranch::AluminaRich
        }
    }

    /// Evaluate this branch at normalized fractions `(n_ca, n_al)`.
    pub fn evaluate(self, n_ca: f64, n_al: f64) -> f64 {
        let denominator = 3.0 - 2.0 * n_ca + 2.0 * n_al;
        let numerator = match self {
            NcBranch::CalciumRich => 11.0 + n_al - 10.0 * n_ca,
            NcBranch::Balanced => 11.0 + 10.0 * n_al - 10.0 * n_ca,
            NcBranch::AluminaRich => 11.0 + 13.0 * n_al - 13.0 * n_ca,
        };
        numerator / denominator
    }
}

/// Full breakdown of one Nc evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChemistryIndex {
    pub norm_cao: f64,
    pub norm_al2o3: f64,
    pub branch: NcBranch,
    pub nc: f64,
}

impl ChemistryIndex {
    /// Normalize the oxide triple and select the Nc branch.
    ///
    /// A zero-sum triple is defined behaviour: both fractions are zero and the
    /// balanced branch yields 11/3.
    pub fn compute(cao: f64, al2o3: f64, sio2: f64) -> Self {
        let total = cao + al2o3 + sio2;
        let (norm_cao, norm_al2o3) = if total != 0.0 {
            (cao / total, al2o3 / total)
        } else {
            (0.0, 0.0)
        };

        let branch = NcBranch::select(norm_al2o3 - norm_cao);
        ChemistryIndex {
            norm_cao,
            norm_al2o3,
            branch,
            nc: branch.evaluate(norm_cao, norm_al2o3),
        }
    }
}

/// Nc chemistry index of an SCM from its oxide mass fractions
///
/// # Arguments
/// * `cao` - CaO content of the SCM (mass %)
/// * `al2o3` - Al2O3 content of the SCM (mass %)
/// * `sio2` - SiO2 content of the SCM (mass %)
///
/// # Returns
/// Nc at full precision, no rounding
#[wasm_bindgen]
pub fn chemistry_index(cao: f64, al2o3: f64, sio2: f64) -> f64 {
    ChemistryIndex::compute(cao, al2o3, sio2).nc
}
