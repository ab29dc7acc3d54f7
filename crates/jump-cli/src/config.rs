//! CLI configuration from environment.

use std::env;
use std::str::FromStr;

/// Output format of the log lines written to stderr.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "plain" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format: {other}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Resampling step for profiles built from forecast levels, meters
    pub profile_step_m: f64,
    pub log_format: LogFormat,
    /// Pretty-print JSON output
    pub pretty: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            profile_step_m: 200.0,
            log_format: LogFormat::Text,
            pretty: true,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unparseable values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            profile_step_m: lookup("JUMP_PROFILE_STEP_M")
                .and_then(|s| s.parse().ok())
                .filter(|step: &f64| step.is_finite() && *step > 0.0)
                .unwrap_or(defaults.profile_step_m),
            log_format: lookup("JUMP_LOG_FORMAT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.log_format),
            pretty: lookup("JUMP_PRETTY")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.pretty),
        }
    }
}
