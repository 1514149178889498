pub mod json;

use crate::app::Result;
use crate::domain::WatchState;

pub use json::JsonStateStore;

/// Persists watch state between process runs, keyed by source.
pub trait StateStore {
    fn load(&self, key: &str) -> Result<Option<WatchState>>;
    fn save(&self, key: &str, state: &WatchState) -> Result<()>;
    fn remove(&self, key: &str) -> Result<bool>;
}
