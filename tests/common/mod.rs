use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use sift::session::{Predictor, ScriptedPredictor, SessionDriver, SessionPolicy};

#[allow(dead_code)]
pub fn policy(sample_count: usize, total_items: u64) -> SessionPolicy {
    SessionPolicy {
        sample_count,
        total_items,
        ..Default::default()
    }
}

#[allow(dead_code)]
pub fn scripted_driver(policy: SessionPolicy, increments: Vec<u64>) -> SessionDriver {
    SessionDriver::with_predictor_factory(
        policy,
        Box::new(move || -> Box<dyn Predictor> {
            Box::new(ScriptedPredictor::new().with_increments(increments.clone()))
        }),
    )
    .expect("scripted driver policy must be valid")
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}
