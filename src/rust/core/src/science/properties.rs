// SPDX-FileCopyrightText: 2026 Santhosh Shyamsundar, Prabhu S., and Studio Tyto
// SPDX-License-Identifier: MIT
use serde::{Deserialize, Serialize};

/// Predicted physical properties and the artifact keys their models ship under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Property {
    WaterRetention,
    DynamicYieldStress,
    PlasticViscosity,
    StaticFlocculationStress,
    ThixotropyIndex,
    CompressiveStrength,
    MaxPrintableLayers,
    PrintedCompressiveStrength,
}

impl Property {
    /// Fresh-state properties, in evaluation order.
    pub const RHEOLOGY: [Property; 5] = [
        Property::WaterRetention,
        Property::DynamicYieldStress,
        Property::PlasticViscosity,
        Property::StaticFlocculationStress,
        Property::ThixotropyIndex,
    ];

    pub const ALL: [Property; 8] = [
        Property::WaterRetention,
        Property::DynamicYieldStress,
        Property::PlasticViscosity,
        Property::StaticFlocculationStress,
        Property::ThixotropyIndex,
        Property::CompressiveStrength,
        Property::MaxPrintableLayers,
        Property::PrintedCompressiveStrength,
    ];

    pub fn artifact_key(self) -> &'static str {
        match self {
            Property::WaterRetention => "stacking_model_R1",
            Property::DynamicYieldStress => "stacking_model_R2",
            Property::PlasticViscosity => "stacking_model_R3",
            Property::StaticFlocculationStress => "stacking_model_R4",
            Property::ThixotropyIndex => "stacking_model_R5",
            Property::CompressiveStrength => "stacking_model_C",
            Property::MaxPrintableLayers => "stacking_model_L",
            Property::PrintedCompressiveStrength => "stacking_model_S",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Property::WaterRetention => "Water Retention",
            Property::DynamicYieldStress => "Dynamic Yield Stress (Pa)",
            Property::PlasticViscosity => "Plastic Viscosity (Pa·s)",
            Property::StaticFlocculationStress => "Static Flocculation Stress (Pa)",
            Property::ThixotropyIndex => "Athix (Pa/min)",
            Property::CompressiveStrength => "Compressive Strength (MPa)",
            Property::MaxPrintableLayers => "Maximum Printing Layers",
            Property::PrintedCompressiveStrength => "3DP Compressive Strength (MPa)",
        }
    }

    pub fn from_artifact_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.artifact_key() == key)
    }

    /// Printability models are optional in an artifact.
    pub fn is_printability(self) -> bool {
        matches!(
            self,
            Property::MaxPrintableLayers | Property::PrintedCompressiveStrength
        )
    }
}
