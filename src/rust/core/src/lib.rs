// SPDX-FileCopyrightText: 2026 Santhosh Shyamsundar, Prabhu S., and Studio Tyto
// SPDX-License-Identifier: MIT
//
// PrintMix — 3D-printable concrete property prediction and mix search
//

pub mod bindings;
pub mod config;
pub mod error;
pub mod formulas;
pub mod mix;
pub mod optimization;
pub mod pipeline;
pub mod qualification;
pub mod science;
pub mod session;
#[cfg(test)]
pub mod tests_pipeline;

// Re-export core types
pub use bindings::MixDesignStudio;
pub use config::KernelConfig;
pub use error::{MixError, PredictError, RegistryError};
pub use formulas::{chemistry_index, ChemistryIndex, NcBranch};
pub use mix::{BaseMix, FeatureVector, MixDesign, PrintingParameters};
pub use optimization::{CancelToken, GridSearchOptimizer, OptimizationReport};
pub use pipeline::{PredictionPipeline, PredictionReport};
pub use qualification::{QualificationPolicy, QualificationReport, Verdict};
pub use science::{Predictor, PredictorRegistry, Property};
pub use session::PredictionSession;
