// SPDX-FileCopyrightText: 2026 Santhosh Shyamsundar, Prabhu S., and Studio Tyto
// SPDX-License-Identifier: MIT
//
// PrintMix — SCM and fiber material definitions

use crate::error::{MixError, Result};
use crate::mix::columns;
use serde::{Deserialize, Serialize};

/// Oxide and fineness profile of the supplementary cementitious material.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScmComposition {
    #[serde(rename = "ssa")]
    pub specific_surface_area: f64, // m2/g
    pub cao: f64,   // mass %
    pub al2o3: f64, // mass %
    pub sio2: f64,  // mass %
}

impl ScmComposition {
    /// Oxide fractions must be non-negative; a zero triple is allowed.
    pub fn validate_oxides(&self) -> Result<()> {
        for (name, v) in [
            (columns::CAO, self.cao),
            (columns::AL2O3, self.al2o3),
            (columns::SIO2, self.sio2),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(MixError::invalid(name, format!("invalid oxide fraction {}", v)));
            }
        }
        Ok(())
    }
}

impl Default for ScmComposition {
    fn default() -> Self {
        ScmPreset::None.composition()
    }
}

/// Reference compositions offered by the mix entry form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScmPreset {
    CalcinedClay,
    FFlyAsh,
    CFlyAsh,
    Ggbfs,
    MswiAsh,
    SteelSlag,
    GlassPowder,
    None,
}

impl ScmPreset {
    pub const ALL: [ScmPreset; 8] = [
        ScmPreset::CalcinedClay,
        ScmPreset::FFlyAsh,
        ScmPreset::CFlyAsh,
        ScmPreset::Ggbfs,
        ScmPreset::MswiAsh,
        ScmPreset::SteelSlag,
        ScmPreset::GlassPowder,
        ScmPreset::None,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ScmPreset::CalcinedClay => "Calcined clay",
            ScmPreset::FFlyAsh => "F fly ash",
            ScmPreset::CFlyAsh => "C fly ash",
            ScmPreset::Ggbfs => "Ground granulated blast furnace slag",
            ScmPreset::MswiAsh => "MSWI ash",
            ScmPreset::SteelSlag => "Steel slag",
            ScmPreset::GlassPowder => "Glass powder",
            ScmPreset::None => "None",
        }
    }

    /// Accepts the display label or the snake_case key.
    pub fn from_label(s: &str) -> Option<Self> {
        let lower = s.trim().to_lowercase();
        Self::ALL.into_iter().find(|p| {
            p.label().to_lowercase() == lower
                || serde_json::to_value(p)
                    .ok()
                    .and_then(|v| v.as_str().map(|k| k == lower))
                    .unwrap_or(false)
        })
    }

    pub fn composition(self) -> ScmComposition {
        // [ssa, CaO, Al2O3, SiO2]
        let [specific_surface_area, cao, al2o3, sio2] = match self {
            ScmPreset::CalcinedClay => [12.067, 0.73, 35.27, 57.05],
            ScmPreset::FFlyAsh => [2.153, 11.83, 19.48, 43.59],
            ScmPreset::CFlyAsh => [2.973, 29.51, 18.07, 37.29],
            ScmPreset::Ggbfs => [1.084, 42.73, 8.58, 35.9],
            ScmPreset::MswiAsh => [12.086, 52.85, 6.85, 12.91],
            ScmPreset::SteelSlag => [0.854, 62.75, 9.9, 16.09],
            ScmPreset::GlassPowder => [0.233, 12.54, 1.16, 74.8],
            ScmPreset::None => [0.0, 0.0, 0.0, 0.0],
        };
        ScmComposition {
            specific_surface_area,
            cao,
            al2o3,
            sio2,
        }
    }
}

/// Fiber reinforcement, encoded the way the training sheets encode it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum FiberType {
    #[default]
    None = 0,
    Steel = 1,
    Pva = 2,
    Pp = 3,
    Glass = 4,
    Hemp = 5,
}

impl FiberType {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn is_reinforced(self) -> bool {
        self != FiberType::None
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(FiberType::None),
            1 => Some(FiberType::Steel),
            2 => Some(FiberType::Pva),
            3 => Some(FiberType::Pp),
            4 => Some(FiberType::Glass),
            5 => Some(FiberType::Hemp),
            _ => None,
        }
    }

    /// Decode the numeric column value; rejects fractional or out-of-range codes.
    pub fn from_feature(value: f64) -> Result<Self> {
        if value.fract() != 0.0 || !(0.0..=5.0).contains(&value) {
            return Err(MixError::invalid(
                columns::FIBER_TYPE,
                format!("expected an integer code 0..=5, got {}", value),
            ));
        }
        Self::from_code(value as u8)
            .ok_or_else(|| MixError::invalid(columns::FIBER_TYPE, format!("unknown code {}", value)))
    }
}

impl TryFrom<u8> for FiberType {
    type Error = String;

    fn try_from(code: u8) -> std::result::Result<Self, Self::Error> {
        FiberType::from_code(code).ok_or_else(|| format!("unknown fiber type code {}", code))
    }
}

impl From<FiberType> for u8 {
    fn from(f: FiberType) -> u8 {
        f.code()
    }
}

/// Fiber dosage and geometry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FiberSpec {
    #[serde(rename = "type", default)]
    pub fiber_type: FiberType,
    #[serde(default)]
    pub length_mm: f64,
    #[serde(default)]
    pub volume_pct: f64,
}
