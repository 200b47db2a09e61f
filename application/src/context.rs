//! Explicit per-run context
//!
//! Everything a component needs about the current run travels in this
//! value; nothing is read from process-wide state.

use leadforge_domain::{EffectiveConfig, RunState, keys};
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct RunContext {
    pub run_state: RunState,
    pub config: EffectiveConfig,
}

impl RunContext {
    pub fn new(run_state: RunState, config: EffectiveConfig) -> Self {
        Self { run_state, config }
    }

    /// Endpoints for the run's environment (`projectEnvironments.<env>`)
    pub fn environment_settings(&self) -> BTreeMap<String, String> {
        self.config
            .environment_section(keys::PROJECT_ENVIRONMENTS, self.run_state.environment.as_str())
    }

    /// Credentials for the run's environment (`login_Credential.<env>`)
    pub fn credentials(&self) -> BTreeMap<String, String> {
        self.config
            .environment_section(keys::LOGIN_CREDENTIALS, self.run_state.environment.as_str())
    }
}
