// SPDX-FileCopyrightText: 2026 Santhosh Shyamsundar, Prabhu S., and Studio Tyto
// SPDX-License-Identifier: MIT
//! Acceptance bands for predicted properties
//!
//! Bands classify predictions; they never alter them. The table in force is
//! picked by fiber presence, and the whole policy is configuration.

use crate::pipeline::PredictionReport;
use crate::science::{FiberType, Property};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

pub const UNRELIABLE_PRINTABILITY_WARNING: &str = "The predicted results did not pass all quality checks. \
3DP Layer and 3DP Strength predictions may not be accurate.";

/// Inclusive (lower, upper) pair; an absent side is unbounded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct QualificationBand {
    #[serde(default)]
    pub lower: Option<f64>,
    #[serde(default)]
    pub upper: Option<f64>,
}

impl QualificationBand {
    pub fn between(lower: f64, upper: f64) -> Self {
        QualificationBand {
            lower: Some(lower),
            upper: Some(upper),
        }
    }

    pub fn at_most(upper: f64) -> Self {
        QualificationBand {
            lower: None,
            upper: Some(upper),
        }
    }

    pub fn at_least(lower: f64) -> Self {
        QualificationBand {
            lower: Some(lower),
            upper: None,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.lower.map_or(true, |lo| value >= lo) && self.upper.map_or(true, |hi| value <= hi)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Pass,
    Fail,
}

impl Verdict {
    /// A property or age with no configured band fails.
    pub fn of(band: Option<&QualificationBand>, value: f64) -> Self {
        match band {
            Some(b) if b.contains(value) => Verdict::Pass,
            _ => Verdict::Fail,
        }
    }

    pub fn passed(self) -> bool {
        self == Verdict::Pass
    }
}

/// Bands for one fiber selector.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ThresholdTable {
    pub properties: IndexMap<Property, QualificationBand>,
    pub strength_by_age: BTreeMap<u32, QualificationBand>,
}

impl ThresholdTable {
    fn with_water_retention_limit(limit: f64) -> Self {
        let mut properties = IndexMap::new();
        properties.insert(Property::WaterRetention, QualificationBand::at_most(limit));
        properties.insert(Property::DynamicYieldStress, QualificationBand::between(400.0, 700.0));
        properties.insert(Property::PlasticViscosity, QualificationBand::between(3.0, 14.0));
        properties.insert(
            Property::StaticFlocculationStress,
            QualificationBand::between(200.0, 500.0),
        );
        properties.insert(Property::ThixotropyIndex, QualificationBand::between(8.0, 25.0));

        let mut strength_by_age = BTreeMap::new();
        strength_by_age.insert(1, QualificationBand::at_least(10.0));
        strength_by_age.insert(7, QualificationBand::at_least(20.0));
        strength_by_age.insert(28, QualificationBand::at_least(25.0));

        ThresholdTable {
            properties,
            strength_by_age,
        }
    }
}

/// Two threshold tables selected by whether the mix carries fiber.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QualificationPolicy {
    pub plain: ThresholdTable,
    pub fiber_reinforced: ThresholdTable,
}

impl Default for QualificationPolicy {
    fn default() -> Self {
        QualificationPolicy {
            plain: ThresholdTable::with_water_retention_limit(8.0),
            fiber_reinforced: ThresholdTable::with_water_retention_limit(12.0),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropertyCheck {
    pub property: Property,
    pub label: String,
    pub value: f64,
    pub band: Option<QualificationBand>,
    pub verdict: Verdict,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StrengthCheck {
    pub age_days: u32,
    pub value: f64,
    pub band: Option<QualificationBand>,
    pub verdict: Verdict,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QualificationReport {
    pub fiber_reinforced: bool,
    pub rheology: Vec<PropertyCheck>,
    pub strength: Vec<StrengthCheck>,
    pub all_pass: bool,
    /// Informational only; downstream predictions stay available.
    pub advisory: Option<String>,
}

impl QualificationPolicy {
    pub fn table(&self, fiber: FiberType) -> &ThresholdTable {
        if fiber.is_reinforced() {
            &self.fiber_reinforced
        } else {
            &self.plain
        }
    }

    pub fn classify(&self, property: Property, value: f64, fiber: FiberType) -> Verdict {
        Verdict::of(self.table(fiber).properties.get(&property), value)
    }

    pub fn classify_strength(&self, age_days: u32, value: f64, fiber: FiberType) -> Verdict {
        Verdict::of(self.table(fiber).strength_by_age.get(&age_days), value)
    }

    /// Classify every rheology property and strength age of a report.
    pub fn evaluate(&self, report: &PredictionReport, fiber: FiberType) -> QualificationReport {
        let table = self.table(fiber);

        let rheology: Vec<PropertyCheck> = report
            .rheology
            .iter()
            .map(|(&property, &value)| {
                let band = table.properties.get(&property).copied();
                PropertyCheck {
                    property,
                    label: property.label().to_string(),
                    value,
                    band,
                    verdict: Verdict::of(band.as_ref(), value),
                }
            })
            .collect();

        let strength: Vec<StrengthCheck> = report
            .strength
            .iter()
            .map(|(&age_days, &value)| {
                let band = table.strength_by_age.get(&age_days).copied();
                StrengthCheck {
                    age_days,
                    value,
                    band,
                    verdict: Verdict::of(band.as_ref(), value),
                }
            })
            .collect();

        let all_pass = rheology.iter().all(|c| c.verdict.passed())
            && strength.iter().all(|c| c.verdict.passed());

        let advisory = if all_pass {
            None
        } else {
            warn!(
                failed_rheology = rheology.iter().filter(|c| !c.verdict.passed()).count(),
                failed_strength = strength.iter().filter(|c| !c.verdict.passed()).count(),
                "quality checks failed"
            );
            Some(UNRELIABLE_PRINTABILITY_WARNING.to_string())
        };

        QualificationReport {
            fiber_reinforced: fiber.is_reinforced(),
            rheology,
            strength,
            all_pass,
            advisory,
        }
    }
}
