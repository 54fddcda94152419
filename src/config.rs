use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

const ENV_FILE: &str = ".env";
pub const TOKEN_ENV: &str = "PROJECT_CONSOLE_TOKEN";

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub backend: BackendConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
    /// Keep a cookie jar across calls so session cookies are sent back.
    pub with_credentials: bool,
    /// No timeout when unset; a hung request waits forever.
    pub request_timeout_ms: Option<u64>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            with_credentials: true,
            request_timeout_ms: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub file: String,
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: "project-console.log".to_string(),
            filter: "project_console=info".to_string(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).with_context(|| "Failed to parse config TOML")
    }

    /// Load `path` if it exists. A missing file yields defaults unless the
    /// caller asked for that file explicitly.
    pub fn load_or_default(path: &Path, explicit: bool) -> Result<Self> {
        if !explicit && !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Apply the base URL override, if any. Blank values are ignored.
    pub fn override_base_url(&mut self, base_url: Option<&str>) {
        if let Some(url) = base_url.map(sanitize_key).filter(|u| !u.is_empty()) {
            self.backend.base_url = url;
        }
    }

    /// Load `.env` from the working directory into the process environment.
    /// Variables already set in the environment win. Returns how many were set.
    pub fn load_env_file() -> usize {
        load_env_file_from(Path::new(ENV_FILE))
    }

    /// Bearer token passed through to the backend, if configured.
    pub fn api_token() -> Option<String> {
        std::env::var(TOKEN_ENV)
            .ok()
            .map(|t| sanitize_key(&t))
            .filter(|t| !t.is_empty())
    }
}

/// Export the entries of the `.env` file at `path` that the environment does
/// not already define. A missing or unreadable file is not an error.
/// Returns how many variables were set.
fn load_env_file_from(path: &Path) -> usize {
    let Ok(content) = std::fs::read_to_string(path) else {
        return 0;
    };
    let mut applied = 0;
    for (key, value) in parse_env(&content) {
        if std::env::var_os(&key).is_none() {
            std::env::set_var(&key, value);
            applied += 1;
        }
    }
    applied
}

/// `KEY=value` pairs from `.env` text, in file order. Blank lines, `#`
/// comments, and lines without `=` or without a key are skipped. An
/// `export ` prefix is allowed, and a value wrapped in one matching pair of
/// quotes is unwrapped.
fn parse_env(content: &str) -> Vec<(String, String)> {
    content
        .lines()
        .map(sanitize_key)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let line = line.strip_prefix("export ").unwrap_or(&line);
            let (key, value) = line.split_once('=')?;
            let key = key.trim();
            if key.is_empty() || key.contains(char::is_whitespace) {
                return None;
            }
            Some((key.to_string(), unquote(value.trim()).to_string()))
        })
        .collect()
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|v| v.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

/// Strip carriage returns, BOM, and other invisible chars from a key/URL value.
fn sanitize_key(raw: &str) -> String {
    raw.replace(['\r', '\u{feff}', '\u{200b}'], "")
        .trim()
        .to_string()
}
