// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Santhosh Shyamsundar, Prabhu S., and Studio Tyto
//
//! mix-designer — CLI for prediction and target-strength search
//!
//! Reads a column-keyed JSON record (file or stdin), runs it against a
//! predictor artifact and prints a JSON report on stdout. Logs go to stderr.
//!
//! Usage:
//!   mix-designer --models 3DP_August_2025.json predict --input mix.json
//!   mix-designer --models 3DP_August_2025.json predict --input mix.json \
//!       --speed 40 --nozzle 25 --layer-height 10
//!   echo '{"Limestone content (%)": 10, ...}' | mix-designer --models m.json optimize --target 30

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Arc;

use printmix_core::config::KernelConfig;
use printmix_core::mix::{BaseMix, InputRecord, MixDesign, PrintingParameters};
use printmix_core::optimization::{CancelToken, GridSearchOptimizer};
use printmix_core::pipeline::PredictionPipeline;
use printmix_core::science::PredictorRegistry;

#[derive(Parser)]
#[command(name = "mix-designer", version, about = "3D-printable concrete mix predictor")]
struct Cli {
    /// Predictor artifact (JSON)
    #[arg(long)]
    models: PathBuf,

    /// Kernel configuration (JSON); defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Predict rheology, strength and (optionally) printability
    Predict {
        /// Input record; stdin when omitted
        #[arg(long)]
        input: Option<PathBuf>,
        /// Printing speed (mm/s)
        #[arg(long, requires_all = ["nozzle", "layer_height"])]
        speed: Option<f64>,
        /// Nozzle size (mm)
        #[arg(long)]
        nozzle: Option<f64>,
        /// Single layer height (mm)
        #[arg(long)]
        layer_height: Option<f64>,
    },
    /// Search cement share and water/binder ratio for a target strength
    Optimize {
        #[arg(long)]
        input: Option<PathBuf>,
        /// Target compressive strength (MPa)
        #[arg(long, default_value_t = 50.0)]
        target: f64,
        /// Spread the grid over all cores
        #[arg(long)]
        parallel: bool,
    },
}

fn read_record(path: Option<&PathBuf>) -> Result<InputRecord> {
    let text = match path {
        Some(p) => std::fs::read_to_string(p).with_context(|| format!("reading {}", p.display()))?,
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("reading record from stdin")?;
            buffer
        }
    };
    serde_json::from_str(&text).context("input is not a JSON object of numbers")
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let cli = Cli::parse();
    let registry = PredictorRegistry::load(&cli.models)
        .with_context(|| format!("loading predictors from {}", cli.models.display()))?;
    let config = match &cli.config {
        Some(path) => KernelConfig::load(path)?,
        None => KernelConfig::default(),
    };
    let pipeline = PredictionPipeline::new(Arc::new(registry), config);

    let output = match &cli.command {
        Command::Predict {
            input,
            speed,
            nozzle,
            layer_height,
        } => {
            let mix = MixDesign::from_record(&read_record(input.as_ref())?)?;
            let printing = match (speed, nozzle, layer_height) {
                (Some(speed), Some(nozzle), Some(layer_height)) => Some(PrintingParameters {
                    speed_mm_s: *speed,
                    nozzle_mm: *nozzle,
                    layer_height_mm: *layer_height,
                }),
                _ => None,
            };
            let prediction = pipeline.predict(&mix, printing.as_ref())?;
            let qualification = pipeline.qualify(&mix, &prediction);
            if let Some(advisory) = &qualification.advisory {
                eprintln!("WARNING: {}", advisory);
            }
            json!({ "prediction": prediction, "qualification": qualification })
        }
        Command::Optimize {
            input,
            target,
            parallel,
        } => {
            let base = BaseMix::from_record(&read_record(input.as_ref())?)?;
            let optimizer = GridSearchOptimizer::new(&pipeline);
            let report = if *parallel {
                optimizer.optimize_parallel(&base, *target, &CancelToken::new())?
            } else {
                optimizer.optimize(&base, *target)?
            };
            if report.candidates.is_empty() {
                eprintln!("No combination met the target strength.");
            } else {
                eprintln!("Found {} valid combinations!", report.candidates.len());
            }
            json!({ "optimization": report })
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
