//! Application state for the Payslip Engine API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::config::ConfigLoader;

/// Shared application state.
///
/// Holds the loaded payroll policy. It is read-only, so concurrent requests
/// share it without locking.
#[derive(Clone, Default)]
pub struct AppState {
    /// The loaded payroll policy.
    config: Arc<ConfigLoader>,
}

impl AppState {
    /// Creates a new application state with the given configuration loader.
    pub fn new(config: ConfigLoader) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Returns a reference to the configuration loader.
    pub fn config(&self) -> &ConfigLoader {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PayrollPolicy;

    #[test]
    fn test_app_state_is_clone() {
        fn assert_clone<T: Clone + Send + Sync>() {}
        assert_clone::<AppState>();
    }

    #[test]
    fn test_clones_share_the_policy() {
        let state = AppState::new(ConfigLoader::default());
        let clone = state.clone();

        assert!(std::ptr::eq(state.config(), clone.config()));
        assert_eq!(clone.config().policy(), &PayrollPolicy::default());
    }
}
