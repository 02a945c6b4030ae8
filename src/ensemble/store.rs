use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::EngineError;

/// Serializable cumulative performance counters, keyed by group name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PerformanceSnapshot {
    pub groups: HashMap<String, GroupPerformance>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupPerformance {
    pub wins: u64,
    pub losses: u64,
    pub total_return: f64,
}

/// Injectable persistence hook for ensemble performance history. The core
/// never hard-codes a storage backend; the ensemble works with no store
/// attached.
pub trait PerformanceStore: Send + Sync {
    fn load(&self) -> Result<Option<PerformanceSnapshot>, EngineError>;
    fn save(&self, snapshot: &PerformanceSnapshot) -> Result<(), EngineError>;
}

/// File-backed store writing pretty JSON under the configured log directory.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(log_dir: &str) -> Self {
        Self {
            path: Path::new(log_dir).join("ensemble_performance.json"),
        }
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PerformanceStore for JsonFileStore {
    fn load(&self) -> Result<Option<PerformanceSnapshot>, EngineError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)?;
        let snapshot = serde_json::from_str(&content)?;
        Ok(Some(snapshot))
    }

    fn save(&self, snapshot: &PerformanceSnapshot) -> Result<(), EngineError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(snapshot)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}
