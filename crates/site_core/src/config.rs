use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use thiserror::Error;
use tracing::warn;
use url::Url;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8001";
pub const DEFAULT_STATUS_CLEAR_DELAY: Duration = Duration::from_secs(5);
pub const DEFAULT_SCROLL_REFERENCE_OFFSET: f64 = 100.0;
pub const SETTINGS_FILE: &str = "site.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub backend_url: String,
    pub status_clear_delay: Duration,
    pub scroll_reference_offset: f64,
    pub request_timeout: Option<Duration>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.into(),
            status_clear_delay: DEFAULT_STATUS_CLEAR_DELAY,
            scroll_reference_offset: DEFAULT_SCROLL_REFERENCE_OFFSET,
            request_timeout: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse settings file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid backend url '{url}': {reason}")]
    InvalidBackendUrl { url: String, reason: String },
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    backend_url: Option<String>,
    status_clear_delay_ms: Option<u64>,
    scroll_reference_offset: Option<f64>,
    request_timeout_ms: Option<u64>,
}

/// Defaults, then `site.toml` in the working directory, then the process
/// environment.
pub fn load_settings() -> Result<Settings, ConfigError> {
    load_settings_from(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

pub fn load_settings_from(
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> Result<Settings, ConfigError> {
    let mut settings = Settings::default();

    match fs::read_to_string(path) {
        Ok(raw) => {
            let file_cfg: FileSettings =
                toml::from_str(&raw).map_err(|source| ConfigError::Parse {
                    path: path.to_path_buf(),
                    source,
                })?;
            if let Some(v) = file_cfg.backend_url {
                settings.backend_url = v;
            }
            if let Some(v) = file_cfg.status_clear_delay_ms {
                settings.status_clear_delay = Duration::from_millis(v);
            }
            match file_cfg.scroll_reference_offset {
                Some(v) if v.is_finite() => settings.scroll_reference_offset = v,
                Some(v) => warn!(value = %v, "config: ignoring non-finite scroll_reference_offset in {}", path.display()),
                None => {}
            }
            if let Some(v) = file_cfg.request_timeout_ms {
                settings.request_timeout = Some(Duration::from_millis(v));
            }
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    }

    if let Some(v) = env("BACKEND_URL") {
        settings.backend_url = v;
    }
    if let Some(v) = env("APP__BACKEND_URL") {
        settings.backend_url = v;
    }

    if let Some(v) = env("APP__STATUS_CLEAR_DELAY_MS") {
        match v.parse::<u64>() {
            Ok(ms) => settings.status_clear_delay = Duration::from_millis(ms),
            Err(_) => warn!(value = %v, "config: ignoring non-numeric APP__STATUS_CLEAR_DELAY_MS"),
        }
    }

    if let Some(v) = env("APP__SCROLL_REFERENCE_OFFSET") {
        match v.parse::<f64>() {
            Ok(offset) if offset.is_finite() => settings.scroll_reference_offset = offset,
            _ => warn!(value = %v, "config: ignoring invalid APP__SCROLL_REFERENCE_OFFSET"),
        }
    }

    if let Some(v) = env("APP__REQUEST_TIMEOUT_MS") {
        match v.parse::<u64>() {
            Ok(0) => settings.request_timeout = None,
            Ok(ms) => settings.request_timeout = Some(Duration::from_millis(ms)),
            Err(_) => warn!(value = %v, "config: ignoring non-numeric APP__REQUEST_TIMEOUT_MS"),
        }
    }

    settings.backend_url = validate_backend_url(&settings.backend_url)?;
    Ok(settings)
}

/// Checks that `raw` is an absolute http(s) URL and strips trailing slashes so
/// endpoint paths can be appended directly.
pub fn validate_backend_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let invalid = |reason: String| ConfigError::InvalidBackendUrl {
        url: raw.to_string(),
        reason,
    };

    let parsed = Url::parse(trimmed).map_err(|e| invalid(e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", parsed.scheme())));
    }
    if parsed.host_str().is_none() {
        return Err(invalid("missing host".into()));
    }
    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err(invalid("query and fragment are not allowed".into()));
    }

    Ok(trimmed.to_string())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
