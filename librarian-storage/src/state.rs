use dashmap::DashMap;

use librarian_core::errors::LibrarianResult;
use librarian_core::traits::StateStore;

/// In-memory key/value state store.
#[derive(Default)]
pub struct MemoryStateStore {
    values: DashMap<String, String>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStateStore {
    fn get_state(&self, key: &str) -> LibrarianResult<Option<String>> {
        Ok(self.values.get(key).map(|v| v.clone()))
    }

    fn set_state(&self, key: &str, value: &str) -> LibrarianResult<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
