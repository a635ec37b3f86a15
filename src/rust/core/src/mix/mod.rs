// SPDX-FileCopyrightText: 2026 Santhosh Shyamsundar, Prabhu S., and Studio Tyto
// SPDX-License-Identifier: MIT
pub mod design;
pub mod features;

pub use design::{columns, BaseMix, InputRecord, MixDesign, PrintingParameters};
pub use features::{FeaturePool, FeatureVector, RHEOLOGY_FEATURES, STRENGTH_FEATURES};
