//! Router configuration.

use std::time::Duration;

/// Tunables for a router instance.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouterConfig {
    /// Name of the session-id cookie.
    pub session_cookie_name: String,
    /// Default session lifetime, in seconds.
    pub session_lifetime_secs: u64,
    /// Interval between background session sweeps, in seconds.
    pub sweep_interval_secs: u64,
    /// Content type for static files with no known extension.
    pub static_default_type: String,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            session_cookie_name: "WayrouteSessionID".to_owned(),
            session_lifetime_secs: 86_400,
            sweep_interval_secs: 60,
            static_default_type: "text/plain".to_owned(),
        }
    }
}

impl RouterConfig {
    /// Default session lifetime as a [`Duration`].
    #[must_use]
    pub fn session_lifetime(&self) -> Duration {
        Duration::from_secs(self.session_lifetime_secs)
    }

    /// Sweep interval as a [`Duration`].
    #[must_use]
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}
