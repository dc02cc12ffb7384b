//! Live polling inputs.
//!
//! The credential and the polling interval can change while the dashboard
//! runs. They are read through a [`SettingsSource`] at the points where they
//! matter: the credential once per pass (captured in a [`PollContext`]) and
//! the interval at every toggle.

/// Inputs captured at the start of one polling pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollContext {
    pub api_key: String,
}

impl PollContext {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self { api_key: api_key.into() }
    }
}

/// Source of the externally mutable polling inputs
pub trait SettingsSource {
    /// Current API credential
    fn api_key(&self) -> String;

    /// Current polling interval in seconds; zero or negative means a single pass
    fn interval_secs(&self) -> i64;

    fn poll_context(&self) -> PollContext {
        PollContext::new(self.api_key())
    }
}

/// Fixed settings
#[derive(Debug, Clone, Default)]
pub struct StaticSettings {
    pub api_key: String,
    pub interval_secs: i64,
}

impl SettingsSource for StaticSettings {
    fn api_key(&self) -> String {
        self.api_key.clone()
    }

    fn interval_secs(&self) -> i64 {
        self.interval_secs
    }
}
