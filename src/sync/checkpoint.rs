//! The one piece of local state: the end of the last fully processed
//! fetch window.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_epoch: Option<i64>,
    // Other keys in the file are kept as-is
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Checkpoint {
    /// Whether a window ending at `end_epoch` was already processed.
    pub fn covers(&self, end_epoch: i64) -> bool {
        self.last_epoch.is_some_and(|last| last >= end_epoch)
    }
}

/// Reads and writes the checkpoint as a single record.
pub trait CheckpointStore: Send + Sync {
    fn load(&self) -> Result<Checkpoint>;

    fn save(&self, checkpoint: &Checkpoint) -> Result<()>;
}

/// JSON file store, `{ "last_epoch": <int> }`. A missing or blank file
/// reads as an empty checkpoint. There is no locking between processes.
#[derive(Debug, Clone)]
pub struct FileCheckpointStore {
    path: PathBuf,
}

impl FileCheckpointStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CheckpointStore for FileCheckpointStore {
    fn load(&self) -> Result<Checkpoint> {
        if !self.path.exists() {
            return Ok(Checkpoint::default());
        }
        let text = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read checkpoint {}", self.path.display()))?;
        if text.trim().is_empty() {
            return Ok(Checkpoint::default());
        }
        serde_json::from_str(&text)
            .with_context(|| format!("Invalid checkpoint file {}", self.path.display()))
    }

    fn save(&self, checkpoint: &Checkpoint) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        checkpoint.serialize(&mut ser)?;
        fs::write(&self.path, buf)
            .with_context(|| format!("Failed to write checkpoint {}", self.path.display()))
    }
}

/// In-memory store, counts saves.
#[derive(Debug, Default)]
pub struct MemoryCheckpointStore {
    state: Mutex<(Checkpoint, usize)>,
}

impl MemoryCheckpointStore {
    pub fn new(checkpoint: Checkpoint) -> Self {
        Self {
            state: Mutex::new((checkpoint, 0)),
        }
    }

    pub fn save_count(&self) -> usize {
        self.state.lock().map(|state| state.1).unwrap_or_default()
    }
}

impl CheckpointStore for MemoryCheckpointStore {
    fn load(&self) -> Result<Checkpoint> {
        let state = self
            .state
            .lock()
            .map_err(|_| anyhow!("Checkpoint lock poisoned"))?;
        Ok(state.0.clone())
    }

    fn save(&self, checkpoint: &Checkpoint) -> Result<()> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| anyhow!("Checkpoint lock poisoned"))?;
        state.0 = checkpoint.clone();
        state.1 += 1;
        Ok(())
    }
}
