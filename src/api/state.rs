//! Application state for the payroll engine API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::config::ConfigLoader;
use crate::engine::PayrollEngine;
use crate::store::InMemoryStore;

/// Shared application state.
///
/// Holds the engine, which in turn shares the store and the loaded
/// configuration across all handlers.
#[derive(Clone)]
pub struct AppState {
    engine: PayrollEngine,
}

impl AppState {
    /// Creates a new application state around an engine.
    pub fn new(engine: PayrollEngine) -> Self {
        Self { engine }
    }

    /// Creates a state with an empty store and the given configuration.
    pub fn from_config(config: ConfigLoader) -> Self {
        Self::new(PayrollEngine::new(
            Arc::new(InMemoryStore::new()),
            Arc::new(config),
        ))
    }

    /// Returns the engine.
    pub fn engine(&self) -> &PayrollEngine {
        &self.engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_is_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }

    #[test]
    fn test_clones_share_the_store() {
        let config = ConfigLoader::load("./config/default").expect("Failed to load config");
        let state = AppState::from_config(config);
        let clone = state.clone();
        assert!(std::ptr::eq(state.engine().store(), clone.engine().store()));
    }
}
