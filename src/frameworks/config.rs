use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::{env, time::Duration};
use thiserror::Error;
use url::Url;

// Runtime constants for the client binary.

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api/";
pub const DEFAULT_SESSION_FILE: &str = ".gig_client_session.json";
pub const DEFAULT_CONFIG_FILE: &str = "gig_client.toml";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(10_000);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid API base URL `{value}`: {source}")]
    BaseUrl {
        value: String,
        source: url::ParseError,
    },
    #[error("invalid {name} `{value}`")]
    InvalidValue { name: &'static str, value: String },
}

// Settings as written in the optional TOML file. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub api_base_url: Option<String>,
    pub session_file: Option<PathBuf>,
    pub request_timeout_ms: Option<u64>,
}

impl FileConfig {
    pub fn parse(path: &Path, content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base_url: Url,
    pub session_file: PathBuf,
    pub request_timeout: Duration,
}

impl ClientConfig {
    // Defaults, then the TOML file, then environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let explicit = env::var("GIG_CLIENT_CONFIG").ok().map(PathBuf::from);
        let file = match explicit {
            Some(path) => Some(read_file(&path)?),
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Some(read_file(path)?)
                } else {
                    None
                }
            }
        };

        Self::from_sources(file.unwrap_or_default(), |name| env::var(name).ok())
    }

    pub fn from_sources(
        file: FileConfig,
        env_var: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let base_url = env_var("API_BASE_URL")
            .or(file.api_base_url)
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

        let session_file = env_var("SESSION_FILE")
            .map(PathBuf::from)
            .or(file.session_file)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_FILE));

        let request_timeout = match env_var("REQUEST_TIMEOUT_MS") {
            Some(value) => parse_timeout(&value)?,
            None => file
                .request_timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT),
        };
        if request_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: "request timeout",
                value: "0".to_string(),
            });
        }

        Ok(Self {
            api_base_url: parse_base_url(&base_url)?,
            session_file,
            request_timeout,
        })
    }
}

fn read_file(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    FileConfig::parse(path, &content)
}

fn parse_timeout(value: &str) -> Result<Duration, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|_| ConfigError::InvalidValue {
            name: "REQUEST_TIMEOUT_MS",
            value: value.to_string(),
        })
}

// Endpoint paths are joined relative to the base, which only keeps the last
// path segment when the base ends with a slash.
fn parse_base_url(value: &str) -> Result<Url, ConfigError> {
    let trimmed = value.trim();
    let normalized = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    let url = Url::parse(&normalized).map_err(|source| ConfigError::BaseUrl {
        value: value.to_string(),
        source,
    })?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidValue {
            name: "API base URL",
            value: value.to_string(),
        });
    }
    Ok(url)
}
