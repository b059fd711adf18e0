//! Shared helpers for the Plugwise integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use ha_config_entries::ConfigEntry;
use ha_plugwise::{PlugwiseData, PlugwiseError, PlugwiseResult, SmileApi, SmileType};
use serde_json::{json, Value};

/// Path of a file under `tests/fixtures/`
pub fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Load a fixture file as JSON
pub fn load_json_fixture(name: &str) -> Value {
    let path = fixture_path(name);
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to load fixture '{}' from {:?}: {}", name, path, e));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture '{}' as JSON: {}", name, e))
}

/// Config entry for a Smile at `smile.local`
pub fn mock_config_entry() -> ConfigEntry {
    let data: HashMap<String, Value> =
        serde_json::from_value(json!({"host": "smile.local", "password": "abcdefgh"})).unwrap();
    ConfigEntry::new("plugwise", "Smile Anna").with_data(data)
}

/// Smile that serves scripted snapshots and records every call
///
/// Each fetch returns the current snapshot; `replace` swaps it. Writes are
/// recorded and answered with the configured outcome without touching the
/// snapshot.
pub struct RecordingSmile {
    data: Mutex<PlugwiseData>,
    fail_updates: Mutex<bool>,
    fail_commands: Mutex<bool>,
    updates: AtomicUsize,
    commands: Mutex<Vec<f64>>,
}

impl RecordingSmile {
    pub fn new(data: Value) -> Self {
        Self {
            data: Mutex::new(serde_json::from_value(data).unwrap()),
            fail_updates: Mutex::new(false),
            fail_commands: Mutex::new(false),
            updates: AtomicUsize::new(0),
            commands: Mutex::new(Vec::new()),
        }
    }

    pub fn replace(&self, data: Value) {
        *self.data.lock().unwrap() = serde_json::from_value(data).unwrap();
    }

    pub fn fail_updates(&self, fail: bool) {
        *self.fail_updates.lock().unwrap() = fail;
    }

    pub fn fail_commands(&self, fail: bool) {
        *self.fail_commands.lock().unwrap() = fail;
    }

    pub fn update_count(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    pub fn commands(&self) -> Vec<f64> {
        self.commands.lock().unwrap().clone()
    }
}

#[async_trait]
impl SmileApi for RecordingSmile {
    fn smile_type(&self) -> SmileType {
        SmileType::Thermostat
    }

    async fn async_update(&self) -> PlugwiseResult<PlugwiseData> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        if *self.fail_updates.lock().unwrap() {
            return Err(PlugwiseError::ConnectionFailed {
                host: "smile.local".to_string(),
                reason: "connection refused".to_string(),
            });
        }
        Ok(self.data.lock().unwrap().clone())
    }

    async fn set_max_boiler_temperature(&self, temperature: f64) -> PlugwiseResult<()> {
        self.commands.lock().unwrap().push(temperature);
        if *self.fail_commands.lock().unwrap() {
            return Err(PlugwiseError::Timeout);
        }
        Ok(())
    }
}
