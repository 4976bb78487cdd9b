// tests/bootstrap_config.rs
//
// Startup wiring: config files on disk, fail-fast env validation.

mod common;

use std::{env, fs};

use common::*;
use leaf_disease_gate::bootstrap::Runtime;
use leaf_disease_gate::classifier::DynClassifier;
use leaf_disease_gate::config::{GateConfig, ServiceConfig};

fn service_with_files(dir: &std::path::Path, keywords_toml: Option<&str>) -> ServiceConfig {
    let labels = dir.join("labels.txt");
    let text: Vec<String> = vocabulary().iter().map(str::to_string).collect();
    fs::write(&labels, text.join("\n")).unwrap();

    let keywords = dir.join("plant_keywords.toml");
    if let Some(toml) = keywords_toml {
        fs::write(&keywords, toml).unwrap();
    }

    ServiceConfig {
        plant_labels_path: labels,
        keywords_path: keywords,
        ..ServiceConfig::default()
    }
}

#[test]
fn assemble_builds_a_working_pipeline_from_files() {
    let dir = tempfile::tempdir().unwrap();
    let svc = service_with_files(
        dir.path(),
        Some("[relevance]\ntop_k = 3\nkeywords = [\"car\"]\n"),
    );

    // With "car" as the only keyword the car-heavy output counts as plant.
    let general = ScriptedClassifier::returning("general", general_output(&[("car", 0.6)]));
    let disease = ScriptedClassifier::returning("disease", vec![0.0, 0.0, 0.99]);
    let (g, d): (DynClassifier, DynClassifier) = (general.clone(), disease.clone());

    let rt = Runtime::assemble(GateConfig::default(), svc, g, d).unwrap();
    let out = rt.pipeline.classify(&leaf_image()).unwrap();
    assert!(out.is_accepted(), "{out:?}");
    assert!((out.plant_score() - 0.6).abs() < 1e-6);
}

#[test]
fn assemble_falls_back_to_builtin_keywords_when_file_absent() {
    let dir = tempfile::tempdir().unwrap();
    let svc = service_with_files(dir.path(), None);

    let general = ScriptedClassifier::returning("general", general_output(&[("banana", 0.5)]));
    let disease = ScriptedClassifier::returning("disease", vec![0.0, 0.0, 0.99]);
    let (g, d): (DynClassifier, DynClassifier) = (general.clone(), disease.clone());

    let rt = Runtime::assemble(GateConfig::default(), svc, g, d).unwrap();
    assert!(rt.pipeline.classify(&leaf_image()).unwrap().is_accepted());
}

#[test]
fn assemble_rejects_broken_keyword_table() {
    let dir = tempfile::tempdir().unwrap();
    let svc = service_with_files(dir.path(), Some("[relevance]\nkeywords = []\n"));

    let general = ScriptedClassifier::returning("general", general_output(&[]));
    let disease = ScriptedClassifier::returning("disease", vec![1.0, 0.0, 0.0]);
    let (g, d): (DynClassifier, DynClassifier) = (general, disease);

    assert!(Runtime::assemble(GateConfig::default(), svc, g, d).is_err());
}

#[test]
fn shipped_keyword_table_parses() {
    let t = leaf_disease_gate::relevance::KeywordTable::load("config/plant_keywords.toml").unwrap();
    assert_eq!(t.top_k(), 50);
    assert!(t.matches("leaf beetle"));
}

#[serial_test::serial]
#[test]
fn out_of_range_threshold_in_env_fails_startup() {
    env::set_var("PLANT_THRESHOLD", "1.5");
    env::remove_var("CONF_THRESHOLD");

    let err = Runtime::from_env().err().expect("startup must fail");
    assert!(err.to_string().contains("PLANT_THRESHOLD"), "{err}");
    assert!(GateConfig::from_env().is_err());

    env::set_var("PLANT_THRESHOLD", "0.4");
    env::set_var("CONF_THRESHOLD", "0.9");
    let g = GateConfig::from_env().unwrap();
    assert!((g.plant_threshold() - 0.4).abs() < 1e-6);
    assert!((g.conf_threshold() - 0.9).abs() < 1e-6);

    env::remove_var("PLANT_THRESHOLD");
    env::remove_var("CONF_THRESHOLD");
}
