// SPDX-FileCopyrightText: 2026 Santhosh Shyamsundar, Prabhu S., and Studio Tyto
// SPDX-License-Identifier: MIT
pub mod ensemble;
pub mod materials;
pub mod predictor;
pub mod properties;
pub mod registry; // [CORE] Model access

pub use ensemble::{Regressor, RegressionTree, TrainedModel};
pub use materials::{FiberSpec, FiberType, ScmComposition, ScmPreset};
pub use predictor::{FnPredictor, Predictor};
pub use properties::Property;
pub use registry::{PredictorArtifact, PredictorRegistry};
