//! Coordinator configuration loading.
//!
//! Settings come from three layers, highest priority first: CLI flags, an
//! optional YAML file, built-in defaults.  This module owns the last two; the
//! binary applies CLI overrides with [`CoordinatorConfig::apply_overrides`].
//!
//! The expected YAML structure is:
//! ```yaml
//! coordinator:
//!   listen: "0.0.0.0:12345"
//!   registration_window_secs: 60
//!   result_timeout_secs: 30   # optional – absent means wait indefinitely
//! ```

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::{debug, info};

// ── Defaults ──────────────────────────────────────────────────────────────────

/// Default listen endpoint, matching the port the workers dial by default.
pub const DEFAULT_LISTEN: &str = "0.0.0.0:12345";

/// Default registration window length.
pub const DEFAULT_REGISTRATION_WINDOW: Duration = Duration::from_secs(60);

// ── Private YAML deserialization types ────────────────────────────────────────

/// Top-level wrapper that maps directly onto the YAML file layout.
#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    coordinator: CoordinatorSection,
}

/// Every field is optional so partial files are accepted; missing values fall
/// back to the built-in defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct CoordinatorSection {
    listen: Option<String>,
    registration_window_secs: Option<u64>,
    result_timeout_secs: Option<u64>,
}

// ── Public data structures ────────────────────────────────────────────────────

/// Runtime settings for one coordinator run.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinatorConfig {
    /// `host:port` the coordinator listens on.
    pub listen: String,

    /// How long additional workers may join after the job is submitted.
    pub registration_window: Duration,

    /// Upper bound on the wait for each worker's partial result.
    /// `None` waits indefinitely.
    pub result_timeout: Option<Duration>,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            listen: DEFAULT_LISTEN.to_string(),
            registration_window: DEFAULT_REGISTRATION_WINDOW,
            result_timeout: None,
        }
    }
}

/// CLI-level overrides.  `None` leaves the underlying value untouched.
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub listen: Option<String>,
    pub registration_window_secs: Option<u64>,
    pub result_timeout_secs: Option<u64>,
}

impl CoordinatorConfig {
    /// Parse `path` and layer it over the defaults.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened, if the YAML is
    /// structurally invalid, or if the resulting settings are rejected by
    /// [`validate`](Self::validate).
    pub fn load_from_file(path: &Path) -> Result<Self> {
        info!("Loading coordinator configuration from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot open configuration file: {}", path.display()))?;

        let file: ConfigFile = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML file: {}", path.display()))?;

        let mut config = Self::default();
        let section = file.coordinator;
        if let Some(listen) = section.listen {
            config.listen = listen;
        }
        if let Some(secs) = section.registration_window_secs {
            config.registration_window = Duration::from_secs(secs);
        }
        config.result_timeout = section.result_timeout_secs.map(Duration::from_secs);

        debug!(?config, "Parsed coordinator configuration");
        config.validate()?;
        Ok(config)
    }

    /// Apply CLI overrides on top of the current values, then re-validate.
    pub fn apply_overrides(mut self, overrides: &ConfigOverrides) -> Result<Self> {
        if let Some(listen) = &overrides.listen {
            self.listen = listen.clone();
        }
        if let Some(secs) = overrides.registration_window_secs {
            self.registration_window = Duration::from_secs(secs);
        }
        if let Some(secs) = overrides.result_timeout_secs {
            self.result_timeout = Some(Duration::from_secs(secs));
        }
        self.validate()?;
        Ok(self)
    }

    /// Reject settings that cannot produce a meaningful run.
    pub fn validate(&self) -> Result<()> {
        if self.listen.trim().is_empty() {
            bail!("listen endpoint must not be empty");
        }
        if self.registration_window.is_zero() {
            bail!("registration window must be longer than zero seconds");
        }
        if self.result_timeout.is_some_and(|t| t.is_zero()) {
            bail!("result timeout must be longer than zero seconds when set");
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
