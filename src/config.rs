//! Configuration for the WeChat push client
//!
//! Loads `wxpush.yml`, then lets environment variables (and `.env`) override it.
//! String values written as `${VAR}` are read from the environment.

use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::wechat::Credentials;

pub const CONFIG_FILE: &str = "wxpush.yml";
pub const DEFAULT_API_BASE: &str = "https://api.weixin.qq.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

pub const ENV_APP_ID: &str = "WXPUSH_APP_ID";
pub const ENV_SECRET: &str = "WXPUSH_SECRET";
pub const ENV_API_BASE: &str = "WXPUSH_API_BASE";
pub const ENV_TIMEOUT: &str = "WXPUSH_TIMEOUT";

/// YAML config structures
#[derive(Debug, Deserialize, Default)]
struct YamlConfig {
    wechat: Option<WechatSection>,
    http: Option<HttpSection>,
}

#[derive(Debug, Deserialize, Default)]
struct WechatSection {
    app_id: Option<String>,
    secret: Option<String>,
    api_base: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct HttpSection {
    timeout_secs: Option<u64>,
    user_agent: Option<String>,
}

/// Values given on the command line. They win over the file and the environment.
#[derive(Clone, Default)]
pub struct ConfigOverrides {
    pub app_id: Option<String>,
    pub secret: Option<String>,
    pub api_base: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Resolved runtime configuration.
#[derive(Clone)]
pub struct Config {
    pub app_id: String,
    pub secret: String,
    pub api_base: String,
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("app_id", &self.app_id)
            .field("secret", &"***")
            .field("api_base", &self.api_base)
            .field("request_timeout", &self.request_timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_id: String::new(),
            secret: String::new(),
            api_base: DEFAULT_API_BASE.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: default_user_agent(),
        }
    }
}

fn default_user_agent() -> String {
    format!("wxpush/{}", env!("CARGO_PKG_VERSION"))
}

impl Config {
    /// Full resolution: file (explicit or discovered), environment, then
    /// command-line overrides. Validation runs once, on the merged result.
    pub fn resolve(path: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::read_file(path, overrides)?,
            None => Self::discover(overrides)?,
        };
        config.apply_overrides(overrides);
        config.validate()?;
        Ok(config)
    }

    /// Load `.env`, then `wxpush.yml` from the current or parent directory.
    ///
    /// A missing file is not an error: defaults plus environment are used.
    /// The result is not validated.
    pub fn load() -> Result<Self> {
        Self::discover(&ConfigOverrides::default())
    }

    /// Load configuration from a specific file. The file must exist.
    /// The result is not validated.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::read_file(path.as_ref(), &ConfigOverrides::default())
    }

    fn discover(overrides: &ConfigOverrides) -> Result<Self> {
        Self::load_dotenv();

        for candidate in [CONFIG_FILE, "../wxpush.yml"] {
            if Path::new(candidate).is_file() {
                return Self::read_file(Path::new(candidate), overrides);
            }
        }

        Self::from_yaml(YamlConfig::default(), overrides)
    }

    fn read_file(path: &Path, overrides: &ConfigOverrides) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let yaml: YamlConfig = if content.trim().is_empty() {
            YamlConfig::default()
        } else {
            serde_yaml::from_str(&content).map_err(|e| {
                Error::Config(format!("Failed to parse {}: {}", path.display(), e))
            })?
        };

        Self::from_yaml(yaml, overrides)
    }

    fn load_dotenv() {
        if dotenvy::dotenv().is_err() {
            let _ = dotenvy::from_filename("../.env");
        }
    }

    fn from_yaml(yaml: YamlConfig, overrides: &ConfigOverrides) -> Result<Self> {
        let wechat = yaml.wechat.unwrap_or_default();
        let http = yaml.http.unwrap_or_default();

        let api_base = Self::resolve_env_string(wechat.api_base, ENV_API_BASE)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        // an overridden timeout makes the env value irrelevant, even if malformed
        let env_timeout = match overrides.timeout_secs {
            Some(_) => None,
            None => std::env::var(ENV_TIMEOUT)
                .ok()
                .filter(|raw| !raw.trim().is_empty()),
        };
        let timeout_secs = match env_timeout {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                Error::Config(format!(
                    "{} must be a whole number of seconds, got '{}'",
                    ENV_TIMEOUT, raw
                ))
            })?,
            None => http.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self {
            app_id: Self::resolve_env_string(wechat.app_id, ENV_APP_ID).unwrap_or_default(),
            secret: Self::resolve_env_string(wechat.secret, ENV_SECRET).unwrap_or_default(),
            api_base: api_base.trim_end_matches('/').to_string(),
            request_timeout: Duration::from_secs(timeout_secs),
            user_agent: http.user_agent.unwrap_or_else(default_user_agent),
        })
    }

    /// Replace file/env values with whatever was given on the command line.
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(app_id) = &overrides.app_id {
            self.app_id = app_id.clone();
        }
        if let Some(secret) = &overrides.secret {
            self.secret = secret.clone();
        }
        if let Some(api_base) = &overrides.api_base {
            self.api_base = api_base.trim_end_matches('/').to_string();
        }
        if let Some(secs) = overrides.timeout_secs {
            self.request_timeout = Duration::from_secs(secs);
        }
    }

    /// Prefer `${VAR}` placeholders and the explicit env key over the literal YAML value.
    fn resolve_env_string(value: Option<String>, env_key: &str) -> Option<String> {
        if let Some(ref v) = value {
            if v.starts_with("${") && v.ends_with('}') {
                let var_name = &v[2..v.len() - 1];
                if let Ok(env_val) = std::env::var(var_name) {
                    return Some(env_val);
                }
            }
        }
        if let Ok(env_val) = std::env::var(env_key) {
            return Some(env_val);
        }
        value.filter(|v| !(v.starts_with("${") && v.ends_with('}')))
    }

    /// Check values that would otherwise fail later in an obscure way.
    pub fn validate(&self) -> Result<()> {
        if self.request_timeout.is_zero() {
            return Err(Error::Config(
                "request timeout must be greater than zero".to_string(),
            ));
        }
        if !(self.api_base.starts_with("http://") || self.api_base.starts_with("https://")) {
            return Err(Error::Config(format!(
                "api_base must be an http(s) URL, got '{}'",
                self.api_base
            )));
        }
        Ok(())
    }

    /// Credentials built from the configured app id and secret.
    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.app_id.clone(), self.secret.clone())
    }
}
