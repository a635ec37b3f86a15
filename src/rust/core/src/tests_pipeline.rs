// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Santhosh Shyamsundar, Prabhu S., and Studio Tyto

//! Pipeline, grid search and session tests
//!
//! Predictors are closures with known closed forms, so every number below
//! can be checked by hand.

use crate::config::KernelConfig;
use crate::error::{MixError, RegistryError};
use crate::formulas::chemistry_index;
use crate::mix::design::tests::sample_record;
use crate::mix::{columns, BaseMix, MixDesign, PrintingParameters, RHEOLOGY_FEATURES, STRENGTH_FEATURES};
use crate::optimization::{CancelToken, GridSearchOptimizer};
use crate::pipeline::PredictionPipeline;
use crate::science::{FnPredictor, PredictorRegistry, Property};
use crate::session::PredictionSession;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// STRENGTH_FEATURES slots
const CEMENT: usize = 0;
const WB: usize = 6;
const AGE: usize = 12;

fn strength_model(x: &[f64]) -> f64 {
    20.0 + 0.5 * x[CEMENT] - 60.0 * x[WB] + 0.1 * x[AGE]
}

fn rheology_registry(water_retention: f64) -> PredictorRegistry {
    PredictorRegistry::new()
        .with(
            "stacking_model_R1",
            FnPredictor::new(&RHEOLOGY_FEATURES, move |_: &[f64]| water_retention),
        )
        .with("stacking_model_R2", FnPredictor::new(&RHEOLOGY_FEATURES, |_: &[f64]| 500.0))
        .with("stacking_model_R3", FnPredictor::new(&RHEOLOGY_FEATURES, |_: &[f64]| 8.0))
        .with("stacking_model_R4", FnPredictor::new(&RHEOLOGY_FEATURES, |_: &[f64]| 300.0))
        .with("stacking_model_R5", FnPredictor::new(&RHEOLOGY_FEATURES, |_: &[f64]| 15.0))
}

fn printability_registry(registry: PredictorRegistry) -> PredictorRegistry {
    registry
        .with(
            "stacking_model_L",
            FnPredictor::new(
                &[
                    columns::WATER_BINDER,
                    columns::PRINTING_SPEED,
                    columns::NOZZLE_SIZE,
                    columns::LAYER_HEIGHT,
                ],
                |x: &[f64]| 2.0 * x[2] - 0.1 * x[1] + 0.04 * x[3],
            ),
        )
        .with(
            "stacking_model_S",
            FnPredictor::new(
                &[columns::CEMENT, columns::AGE, columns::LAYER_HEIGHT],
                |x: &[f64]| 0.5 * x[0] + 0.1 * x[1] - 0.2 * x[2],
            ),
        )
}

fn full_registry() -> PredictorRegistry {
    printability_registry(
        rheology_registry(4.0).with("stacking_model_C", FnPredictor::new(&STRENGTH_FEATURES, strength_model)),
    )
}

fn pipeline(registry: PredictorRegistry) -> PredictionPipeline {
    PredictionPipeline::new(Arc::new(registry), KernelConfig::default())
}

fn sample_mix() -> MixDesign {
    MixDesign::from_record(&sample_record()).unwrap()
}

fn sample_base() -> BaseMix {
    BaseMix::from_record(&sample_record()).unwrap()
}

fn printer() -> PrintingParameters {
    PrintingParameters {
        speed_mm_s: 40.0,
        nozzle_mm: 25.0,
        layer_height_mm: 10.0,
    }
}

/// Strength-only pipeline that counts predictor calls.
fn counting_pipeline(calls: Arc<AtomicUsize>) -> PredictionPipeline {
    pipeline(PredictorRegistry::new().with(
        "stacking_model_C",
        FnPredictor::new(&STRENGTH_FEATURES, move |x: &[f64]| {
            calls.fetch_add(1, Ordering::SeqCst);
            strength_model(x)
        }),
    ))
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

// ============================================================================
// Prediction pipeline
// ============================================================================

#[test]
fn test_prediction_is_deterministic() {
    let p = pipeline(full_registry());
    let mix = sample_mix();
    let first = p.predict(&mix, Some(&printer())).unwrap();
    let second = p.predict(&mix, Some(&printer())).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_stage_outputs_and_order() {
    let p = pipeline(full_registry());
    let report = p.predict(&sample_mix(), None).unwrap();

    let order: Vec<Property> = report.rheology.keys().copied().collect();
    assert_eq!(order, Property::RHEOLOGY.to_vec());
    assert_eq!(report.rheology[&Property::WaterRetention], 4.0);

    let ages: Vec<u32> = report.strength.keys().copied().collect();
    assert_eq!(ages, vec![7, 28]);
    // 20 + 30 - 24 + 0.1 * age
    assert!(close(report.strength[&7], 26.7));
    assert!(close(report.strength[&28], 28.8));

    let chemistry = report.chemistry.unwrap();
    assert_eq!(chemistry.nc, chemistry_index(11.83, 19.48, 43.59));
    assert!(report.printability.is_none());
}

#[test]
fn test_caller_design_not_modified() {
    let p = pipeline(full_registry());
    let mix = sample_mix();
    let before = mix.clone();
    p.predict(&mix, Some(&printer())).unwrap();
    p.predict_strength(&mix, 90).unwrap();
    assert_eq!(mix, before);
    assert_eq!(mix.age_days, None);
}

#[test]
fn test_strength_at_arbitrary_age() {
    let p = pipeline(full_registry());
    let s = p.predict_strength(&sample_mix(), 1).unwrap();
    assert!(close(s, 26.1));
}

#[test]
fn test_printability_uses_declared_schemas() {
    let p = pipeline(full_registry());
    let report = p.predict(&sample_mix(), Some(&printer())).unwrap();
    let printability = report.printability.unwrap();

    // 2 * 25 - 0.1 * 40 + 0.04 * 10
    assert!(close(printability.max_layers, 46.4));
    assert_eq!(printability.max_layers_rounded, 46);
    assert!(close(printability.strength[&7], 28.7));
    assert!(close(printability.strength[&28], 30.8));
}

#[test]
fn test_printability_missing_column_is_schema_mismatch() {
    let registry = full_registry().with(
        "stacking_model_L",
        FnPredictor::new(&[columns::WATER_BINDER, "Accelerator (%)"], |x: &[f64]| x[0]),
    );
    let p = pipeline(registry);
    match p.predict(&sample_mix(), Some(&printer())) {
        Err(MixError::Registry(RegistryError::SchemaMismatch {
            predictor, missing, ..
        })) => {
            assert_eq!(predictor, "stacking_model_L");
            assert_eq!(missing, vec!["Accelerator (%)".to_string()]);
        }
        other => panic!("expected schema mismatch, got {:?}", other),
    }
}

#[test]
fn test_missing_predictor_aborts() {
    let registry = PredictorRegistry::new()
        .with("stacking_model_R1", FnPredictor::new(&RHEOLOGY_FEATURES, |_: &[f64]| 4.0))
        .with("stacking_model_R2", FnPredictor::new(&RHEOLOGY_FEATURES, |_: &[f64]| 500.0))
        .with("stacking_model_C", FnPredictor::new(&STRENGTH_FEATURES, strength_model));
    match pipeline(registry).predict(&sample_mix(), None) {
        Err(MixError::Registry(RegistryError::PredictorNotFound(name))) => {
            assert_eq!(name, "stacking_model_R3")
        }
        other => panic!("expected PredictorNotFound, got {:?}", other),
    }
}

#[test]
fn test_missing_mini_slump_fails_rheology() {
    let mut record = sample_record();
    record.shift_remove(columns::MINI_SLUMP);
    let mix = MixDesign::from_record(&record).unwrap();
    match pipeline(full_registry()).predict(&mix, None) {
        Err(MixError::MissingFeature(name)) => assert_eq!(name, columns::MINI_SLUMP),
        other => panic!("expected MissingFeature, got {:?}", other),
    }
}

#[test]
fn test_qualification_selects_fiber_table() {
    let p = pipeline(printability_registry(
        rheology_registry(10.0).with("stacking_model_C", FnPredictor::new(&STRENGTH_FEATURES, strength_model)),
    ));

    // PVA fibers: water retention limit 12
    let fiber_mix = sample_mix();
    let q = p.qualify(&fiber_mix, &p.predict(&fiber_mix, None).unwrap());
    assert!(q.fiber_reinforced);
    assert!(q.all_pass);
    assert!(q.advisory.is_none());

    // Same mix without fibers: limit 8
    let mut plain = fiber_mix.clone();
    plain.fiber.fiber_type = crate::science::FiberType::None;
    let q = p.qualify(&plain, &p.predict(&plain, None).unwrap());
    assert!(!q.fiber_reinforced);
    assert!(!q.all_pass);
    assert!(q.advisory.is_some());
}

// ============================================================================
// Grid search
// ============================================================================

#[test]
fn test_grid_evaluates_every_point() {
    let calls = Arc::new(AtomicUsize::new(0));
    let p = counting_pipeline(calls.clone());
    let report = GridSearchOptimizer::new(&p).optimize(&sample_base(), 1000.0).unwrap();
    assert_eq!(report.evaluated, 231);
    assert_eq!(calls.load(Ordering::SeqCst), 231);
    assert!(report.candidates.is_empty());
}

#[test]
fn test_grid_matches_closed_form_in_loop_order() {
    let p = pipeline(full_registry());
    let report = GridSearchOptimizer::new(&p).optimize(&sample_base(), 30.0).unwrap();
    assert_eq!(report.binder_budget, 85.0);
    assert_eq!(report.age_days, 28);

    let mut expected = Vec::new();
    for i in 0..21 {
        let wb = 0.30 + 0.01 * i as f64;
        for j in 0..11 {
            let cement = (0.50 + 0.05 * j as f64) * 85.0;
            let strength = 20.0 + 0.5 * cement - 60.0 * wb + 2.8;
            if strength >= 30.0 {
                expected.push((cement, wb, strength));
            }
        }
    }

    assert_eq!(report.candidates.len(), expected.len());
    for (got, (cement, wb, strength)) in report.candidates.iter().zip(&expected) {
        assert!(close(got.cement_pct, *cement));
        assert!(close(got.scm_pct, 85.0 - cement));
        assert!(close(got.water_binder, *wb));
        assert!(close(got.predicted_strength, *strength));
        assert!(close(got.cement_pct + got.scm_pct, 85.0));
    }
}

#[test]
fn test_grid_endpoints() {
    let p = pipeline(full_registry());
    let report = GridSearchOptimizer::new(&p).optimize(&sample_base(), 0.0).unwrap();
    assert_eq!(report.candidates.len(), 231);

    let first = &report.candidates[0];
    assert_eq!(first.cement_pct, 42.5);
    assert_eq!(first.scm_pct, 42.5);
    assert_eq!(first.water_binder, 0.30);

    let last = report.candidates.last().unwrap();
    assert_eq!(last.cement_pct, 85.0);
    assert_eq!(last.scm_pct, 0.0);
    assert_eq!(last.water_binder, 0.50);

    // No duplicate grid points
    for pair in report.candidates.windows(2) {
        assert!(pair[0].water_binder != pair[1].water_binder || pair[0].cement_pct < pair[1].cement_pct);
    }
}

#[test]
fn test_feasible_set_shrinks_as_target_rises() {
    let p = pipeline(full_registry());
    let optimizer = GridSearchOptimizer::new(&p);
    let counts: Vec<usize> = [0.0, 10.0, 20.0, 30.0, 40.0, 50.0, 60.0]
        .iter()
        .map(|&t| optimizer.optimize(&sample_base(), t).unwrap().candidates.len())
        .collect();
    assert!(counts.windows(2).all(|w| w[0] >= w[1]), "{:?}", counts);
    assert_eq!(*counts.last().unwrap(), 0);
}

#[test]
fn test_non_positive_binder_budget() {
    let calls = Arc::new(AtomicUsize::new(0));
    let p = counting_pipeline(calls.clone());
    let mut base = sample_base();
    base.limestone_pct = 60.0;
    base.silica_fume_pct = 40.0;
    match GridSearchOptimizer::new(&p).optimize(&base, 30.0) {
        Err(MixError::NonPositiveBinderBudget(k)) => assert_eq!(k, 0.0),
        other => panic!("expected NonPositiveBinderBudget, got {:?}", other),
    }
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_cancel_before_start() {
    let p = pipeline(full_registry());
    let token = CancelToken::new();
    token.cancel();
    let optimizer = GridSearchOptimizer::new(&p);
    assert!(matches!(
        optimizer.optimize_with_cancel(&sample_base(), 30.0, &token),
        Err(MixError::Cancelled { evaluated: 0 })
    ));
    assert!(matches!(
        optimizer.optimize_parallel(&sample_base(), 30.0, &token),
        Err(MixError::Cancelled { .. })
    ));
}

#[test]
fn test_cancel_mid_sweep_discards_results() {
    let token = CancelToken::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let (remote, counter) = (token.clone(), calls.clone());
    let p = pipeline(PredictorRegistry::new().with(
        "stacking_model_C",
        FnPredictor::new(&STRENGTH_FEATURES, move |x: &[f64]| {
            if counter.fetch_add(1, Ordering::SeqCst) + 1 == 50 {
                remote.cancel();
            }
            strength_model(x)
        }),
    ));

    match GridSearchOptimizer::new(&p).optimize_with_cancel(&sample_base(), 0.0, &token) {
        Err(MixError::Cancelled { evaluated }) => assert_eq!(evaluated, 50),
        other => panic!("expected Cancelled, got {:?}", other),
    }
    assert_eq!(calls.load(Ordering::SeqCst), 50);
}

#[test]
fn test_parallel_sweep_matches_sequential() {
    let p = pipeline(full_registry());
    let optimizer = GridSearchOptimizer::new(&p);
    let sequential = optimizer.optimize(&sample_base(), 30.0).unwrap();
    let parallel = optimizer
        .optimize_parallel(&sample_base(), 30.0, &CancelToken::new())
        .unwrap();
    assert_eq!(sequential, parallel);
}

// ============================================================================
// Session
// ============================================================================

#[test]
fn test_printability_requires_prediction() {
    let p = pipeline(full_registry());
    let session = PredictionSession::new();
    assert!(!session.has_prediction());
    assert!(matches!(
        session.predict_printability(&p, &printer()),
        Err(MixError::NotPredicted)
    ));
}

#[test]
fn test_session_predict_then_printability() {
    let p = pipeline(full_registry());
    let mut session = PredictionSession::new();
    let evaluation = session.predict(&p, sample_mix()).unwrap();
    assert_eq!(evaluation.design_hash.len(), 64);
    assert!(evaluation.qualification.all_pass);

    let printability = session.predict_printability(&p, &printer()).unwrap();
    assert_eq!(printability.max_layers_rounded, 46);
}

#[test]
fn test_failed_checks_still_allow_printability() {
    let p = pipeline(printability_registry(
        rheology_registry(50.0).with("stacking_model_C", FnPredictor::new(&STRENGTH_FEATURES, strength_model)),
    ));
    let mut session = PredictionSession::new();
    let evaluation = session.predict(&p, sample_mix()).unwrap();
    assert!(!evaluation.qualification.all_pass);
    assert!(evaluation.qualification.advisory.is_some());
    assert!(session.predict_printability(&p, &printer()).is_ok());
}

#[test]
fn test_failed_prediction_clears_session() {
    let p = pipeline(full_registry());
    let mut session = PredictionSession::new();
    session.predict(&p, sample_mix()).unwrap();
    assert!(session.has_prediction());

    let mut broken = sample_mix();
    broken.mini_slump = None;
    assert!(session.predict(&p, broken).is_err());
    assert!(!session.has_prediction());
    assert!(matches!(
        session.predict_printability(&p, &printer()),
        Err(MixError::NotPredicted)
    ));
}

#[test]
fn test_session_printability_supplies_age_to_layer_model() {
    let registry = full_registry().with(
        "stacking_model_L",
        FnPredictor::new(
            &[columns::WATER_BINDER, columns::AGE, columns::NOZZLE_SIZE],
            |x: &[f64]| 2.0 * x[2] + 0.1 * x[1],
        ),
    );
    let p = pipeline(registry);
    let mix = sample_mix();
    assert_eq!(mix.age_days, None);

    // 2 * 25 + 0.1 * 28
    let combined = p.predict(&mix, Some(&printer())).unwrap().printability.unwrap();
    assert!(close(combined.max_layers, 52.8));

    let mut session = PredictionSession::new();
    session.predict(&p, mix).unwrap();
    let gated = session.predict_printability(&p, &printer()).unwrap();
    assert_eq!(gated, combined);
    assert_eq!(gated.max_layers_rounded, 53);
}

#[test]
fn test_parallel_cancel_reports_points_run() {
    let token = CancelToken::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let (remote, counter) = (token.clone(), calls.clone());
    let p = pipeline(PredictorRegistry::new().with(
        "stacking_model_C",
        FnPredictor::new(&STRENGTH_FEATURES, move |x: &[f64]| {
            if counter.fetch_add(1, Ordering::SeqCst) + 1 == 50 {
                remote.cancel();
            }
            strength_model(x)
        }),
    ));

    match GridSearchOptimizer::new(&p).optimize_parallel(&sample_base(), 0.0, &token) {
        Err(MixError::Cancelled { evaluated }) => {
            assert!(evaluated >= 50);
            assert_eq!(evaluated, calls.load(Ordering::SeqCst));
        }
        other => panic!("expected Cancelled, got {:?}", other),
    }
}
