//! Configuration for the housing client.
//!
//! TOML profiles layered with `HOUSING_*` environment variables, and the
//! translation to `housing_core::ClientConfig`. The CLI adds flag-aware
//! overrides on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use housing_api::TlsMode;
use housing_api::sample::DEFAULT_SAMPLE_PATH;
use housing_api::userinfo::DEFAULT_USERINFO_URL;
use housing_core::{AuthSettings, ClientConfig};

// ── Built-in deployment ─────────────────────────────────────────────

pub const DEFAULT_API_ROOT: &str = "https://rithonorshousing.appspot.com/_ah/api";
pub const DEFAULT_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/auth";
pub const DEFAULT_CLIENT_ID: &str =
    "180343920180-41f9qsqdcf9it1poolqtqages644lgs3.apps.googleusercontent.com";
pub const DEFAULT_SCOPE: &str = "https://www.googleapis.com/auth/userinfo.email";
pub const DEFAULT_HOSTED_DOMAIN: &str = "g.rit.edu";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    UnknownProfile { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when `--profile` is not given.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named deployments.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Look up `name` (or the default profile). The implicit `default`
    /// profile always exists and points at the built-in deployment.
    pub fn resolve_profile(&self, name: Option<&str>) -> Result<(String, Profile), ConfigError> {
        let name = name
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into());

        match self.profiles.get(&name) {
            Some(profile) => Ok((name, profile.clone())),
            None if name == "default" => Ok((name, Profile::default())),
            None => Err(ConfigError::UnknownProfile { name }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named deployment. Unset fields fall back to the built-in deployment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    /// Cloud Endpoints root (e.g. "https://host/_ah/api").
    pub api_root: Option<String>,

    /// OAuth authorization endpoint.
    pub auth_url: Option<String>,

    /// Identity endpoint.
    pub userinfo_url: Option<String>,

    pub client_id: Option<String>,

    pub scopes: Option<Vec<String>>,

    /// Preferred account domain for silent sign-in. Empty disables the hint.
    pub hosted_domain: Option<String>,

    /// Static sample document; defaults to `/spec.json` on the API host.
    pub sample_url: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout (seconds).
    pub timeout: Option<u64>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("edu", "rit", "housing").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("housing");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Defaults, then `path` (if it exists), then `HOUSING_*` variables
/// (`__` separates nesting, e.g. `HOUSING_DEFAULTS__TIMEOUT`).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("HOUSING_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

fn parse_url(field: &str, raw: &str) -> Result<Url, ConfigError> {
    raw.parse().map_err(|e| ConfigError::Validation {
        field: field.into(),
        reason: format!("invalid URL '{raw}': {e}"),
    })
}

/// Build a `ClientConfig` from a profile, falling back to `defaults` and
/// then to the built-in deployment.
pub fn profile_to_client_config(
    profile: &Profile,
    defaults: &Defaults,
) -> Result<ClientConfig, ConfigError> {
    let api_root = parse_url(
        "api_root",
        profile.api_root.as_deref().unwrap_or(DEFAULT_API_ROOT),
    )?;
    let auth_url = parse_url(
        "auth_url",
        profile.auth_url.as_deref().unwrap_or(DEFAULT_AUTH_URL),
    )?;
    let userinfo_url = parse_url(
        "userinfo_url",
        profile.userinfo_url.as_deref().unwrap_or(DEFAULT_USERINFO_URL),
    )?;
    let sample_url = match profile.sample_url.as_deref() {
        Some(raw) => parse_url("sample_url", raw)?,
        None => api_root
            .join(DEFAULT_SAMPLE_PATH)
            .map_err(|e| ConfigError::Validation {
                field: "sample_url".into(),
                reason: e.to_string(),
            })?,
    };

    let auth = AuthSettings {
        client_id: profile
            .client_id
            .clone()
            .unwrap_or_else(|| DEFAULT_CLIENT_ID.into()),
        scopes: profile
            .scopes
            .clone()
            .unwrap_or_else(|| vec![DEFAULT_SCOPE.into()]),
        hosted_domain: match profile.hosted_domain.as_deref() {
            Some("") => None,
            Some(domain) => Some(domain.to_owned()),
            None => Some(DEFAULT_HOSTED_DOMAIN.into()),
        },
    };

    let tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsMode::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsMode::CustomCa(ca_path.clone())
    } else {
        TlsMode::System
    };

    let timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));

    Ok(ClientConfig {
        api_root,
        auth_url,
        userinfo_url,
        sample_url,
        auth,
        tls,
        timeout,
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn builtin_profile_targets_the_deployment() {
        let cfg = profile_to_client_config(&Profile::default(), &Defaults::default())
            .expect("config");
        assert_eq!(
            cfg.api_root.as_str(),
            "https://rithonorshousing.appspot.com/_ah/api"
        );
        assert_eq!(
            cfg.sample_url.as_str(),
            "https://rithonorshousing.appspot.com/spec.json"
        );
        assert_eq!(cfg.auth.client_id, DEFAULT_CLIENT_ID);
        assert_eq!(cfg.auth.hosted_domain.as_deref(), Some("g.rit.edu"));
        assert_eq!(cfg.timeout, Duration::from_secs(30));
        assert!(matches!(cfg.tls, TlsMode::System));
    }

    #[test]
    fn profile_overrides_defaults() {
        let profile = Profile {
            api_root: Some("http://localhost:8080/_ah/api".into()),
            hosted_domain: Some(String::new()),
            insecure: Some(true),
            timeout: Some(5),
            ..Profile::default()
        };
        let cfg = profile_to_client_config(&profile, &Defaults::default()).expect("config");
        assert_eq!(cfg.sample_url.as_str(), "http://localhost:8080/spec.json");
        assert_eq!(cfg.auth.hosted_domain, None);
        assert_eq!(cfg.timeout, Duration::from_secs(5));
        assert!(matches!(cfg.tls, TlsMode::DangerAcceptInvalid));
    }

    #[test]
    fn invalid_url_names_the_field() {
        let profile = Profile {
            auth_url: Some("not a url".into()),
            ..Profile::default()
        };
        let err = profile_to_client_config(&profile, &Defaults::default()).unwrap_err();
        assert!(err.to_string().contains("auth_url"), "{err}");
    }

    #[test]
    fn implicit_default_profile() {
        let cfg = Config::default();
        let (name, profile) = cfg.resolve_profile(None).expect("profile");
        assert_eq!(name, "default");
        assert_eq!(profile, Profile::default());

        assert!(matches!(
            cfg.resolve_profile(Some("staging")),
            Err(ConfigError::UnknownProfile { .. })
        ));
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.toml");

        let cfg = Config {
            default_profile: Some("local".into()),
            defaults: Defaults {
                timeout: 12,
                ..Defaults::default()
            },
            profiles: HashMap::from([(
                "local".to_owned(),
                Profile {
                    api_root: Some("http://localhost:8080/_ah/api".into()),
                    scopes: Some(vec!["email".into()]),
                    ..Profile::default()
                },
            )]),
        };

        save_config_to(&cfg, &path).expect("save");
        let loaded = load_config_from(&path).expect("load");
        assert_eq!(loaded.default_profile.as_deref(), Some("local"));
        assert_eq!(loaded.defaults.timeout, 12);
        assert_eq!(loaded.profiles["local"], cfg.profiles["local"]);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let loaded = load_config_from(&dir.path().join("absent.toml")).expect("load");
        assert_eq!(loaded.defaults, Defaults::default());
        assert!(loaded.profiles.is_empty());
    }
}
