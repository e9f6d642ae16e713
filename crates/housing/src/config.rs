//! Flag-aware configuration: the active profile plus `--api-root`,
//! `--timeout` and `--insecure` overrides, translated to
//! `housing_core::ClientConfig`.

use std::time::Duration;

use housing_api::TlsMode;
use housing_config::{Config, Profile, profile_to_client_config};
use housing_core::ClientConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// The active profile after CLI overrides, with its name.
pub fn active_profile(global: &GlobalOpts, cfg: &Config) -> Result<(String, Profile), CliError> {
    let (name, mut profile) = cfg.resolve_profile(global.profile.as_deref())?;

    if let Some(ref root) = global.api_root {
        profile.api_root = Some(root.clone());
    }
    Ok((name, profile))
}

/// Build the runtime configuration for the active profile.
pub fn client_config(global: &GlobalOpts, cfg: &Config) -> Result<ClientConfig, CliError> {
    let (name, profile) = active_profile(global, cfg)?;
    tracing::debug!(profile = %name, "resolved profile");

    let mut client = profile_to_client_config(&profile, &cfg.defaults)?;
    if global.insecure {
        client.tls = TlsMode::DangerAcceptInvalid;
    }
    if let Some(secs) = global.timeout {
        client.timeout = Duration::from_secs(secs);
    }
    Ok(client)
}
