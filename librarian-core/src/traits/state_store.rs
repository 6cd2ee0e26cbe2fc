use crate::errors::LibrarianResult;

/// Generic keyed string persistence for small markers (outcome tracker
/// records, last recovery action). Backed by anything; the core never
/// assumes a persistence engine.
pub trait StateStore: Send + Sync {
    fn get_state(&self, key: &str) -> LibrarianResult<Option<String>>;
    fn set_state(&self, key: &str, value: &str) -> LibrarianResult<()>;
}
