use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::app::Result;
use crate::domain::WatchState;
use crate::store::StateStore;

type StateMap = BTreeMap<String, WatchState>;

/// All sources in one JSON object, rewritten on every save.
pub struct JsonStateStore {
    path: PathBuf,
}

impl JsonStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<StateMap> {
        match fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(StateMap::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(StateMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_all(&self, states: &StateMap) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        // Write then rename so a crash never leaves half a file behind
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(states)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl StateStore for JsonStateStore {
    fn load(&self, key: &str) -> Result<Option<WatchState>> {
        Ok(self.read_all()?.remove(key))
    }

    fn save(&self, key: &str, state: &WatchState) -> Result<()> {
        let mut states = self.read_all()?;
        states.insert(key.to_string(), state.clone());
        self.write_all(&states)
    }

    fn remove(&self, key: &str) -> Result<bool> {
        let mut states = self.read_all()?;
        let removed = states.remove(key).is_some();
        if removed {
            self.write_all(&states)?;
        }
        Ok(removed)
    }
}
