//! Application-level configuration loading, including the random play rules.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

use crate::state::state_machine::GameStateMachine;

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "QUIZ_RANDOM_PLAY_CONFIG_PATH";

const DEFAULT_MAX_TIP_CREDITS: u32 = 3;
const DEFAULT_ALLOWED_TIME: u32 = 10;
const DEFAULT_SESSION_TTL_SECS: u64 = 30 * 60;
const DEFAULT_SESSION_SWEEP_SECS: u64 = 60;
const DEFAULT_CATALOG_PATH: &str = "config/quizzes.json";

#[derive(Debug, Clone, PartialEq, Eq)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    max_tip_credits: u32,
    allowed_time: u32,
    session_ttl: Duration,
    session_sweep: Duration,
    catalog_path: PathBuf,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        max_tip_credits = app_config.max_tip_credits,
                        allowed_time = app_config.allowed_time,
                        "loaded random play configuration"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Rules of the random play game derived from this configuration.
    pub fn game_rules(&self) -> GameStateMachine {
        GameStateMachine::new(self.max_tip_credits, self.allowed_time)
    }

    /// Idle time after which a session and its game are discarded.
    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }

    /// Interval between two expired-session sweeps.
    pub fn session_sweep(&self) -> Duration {
        self.session_sweep
    }

    /// JSON catalog seeding the in-memory quiz store.
    pub fn catalog_path(&self) -> &PathBuf {
        &self.catalog_path
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        RawConfig::default().into()
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    max_tip_credits: u32,
    allowed_time: u32,
    session_ttl_secs: u64,
    session_sweep_secs: u64,
    catalog_path: String,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            max_tip_credits: DEFAULT_MAX_TIP_CREDITS,
            allowed_time: DEFAULT_ALLOWED_TIME,
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
            session_sweep_secs: DEFAULT_SESSION_SWEEP_SECS,
            catalog_path: DEFAULT_CATALOG_PATH.into(),
        }
    }
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        Self {
            max_tip_credits: value.max_tip_credits,
            allowed_time: value.allowed_time,
            session_ttl: Duration::from_secs(value.session_ttl_secs),
            // A zero interval would spin the sweeper.
            session_sweep: Duration::from_secs(value.session_sweep_secs.max(1)),
            catalog_path: PathBuf::from(value.catalog_path),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
