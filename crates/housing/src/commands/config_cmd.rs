//! Config subcommand handlers.

use serde::Serialize;

use housing_api::TlsMode;
use housing_config::{self as config, Config, Profile};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{active_profile, client_config};
use crate::error::CliError;
use crate::output;

use super::util;

/// The active profile after defaults and flag overrides.
#[derive(Serialize)]
struct ResolvedView {
    profile: String,
    api_root: String,
    auth_url: String,
    userinfo_url: String,
    sample_url: String,
    client_id: String,
    scopes: Vec<String>,
    hosted_domain: Option<String>,
    tls: String,
    timeout: u64,
}

fn resolve(global: &GlobalOpts, cfg: &Config) -> Result<ResolvedView, CliError> {
    let (profile, _) = active_profile(global, cfg)?;
    let client = client_config(global, cfg)?;

    let tls = match client.tls {
        TlsMode::System => "system".to_owned(),
        TlsMode::CustomCa(ref path) => format!("ca:{}", path.display()),
        TlsMode::DangerAcceptInvalid => "insecure".to_owned(),
    };

    Ok(ResolvedView {
        profile,
        api_root: client.api_root.to_string(),
        auth_url: client.auth_url.to_string(),
        userinfo_url: client.userinfo_url.to_string(),
        sample_url: client.sample_url.to_string(),
        client_id: client.auth.client_id,
        scopes: client.auth.scopes,
        hosted_domain: client.auth.hosted_domain,
        tls,
        timeout: client.timeout.as_secs(),
    })
}

/// Profile edited by `config set`: `--profile`, else the configured default.
fn target_profile(global: &GlobalOpts, cfg: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| cfg.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

fn parse_value<T: std::str::FromStr>(
    key: &str,
    value: &str,
    expected: &str,
) -> Result<T, CliError> {
    value.parse().map_err(|_| CliError::Validation {
        field: key.into(),
        reason: format!("must be {expected}"),
    })
}

fn set_key(profile: &mut Profile, key: &str, value: String) -> Result<(), CliError> {
    match key {
        "api_root" | "api-root" => profile.api_root = Some(value),
        "auth_url" | "auth-url" => profile.auth_url = Some(value),
        "userinfo_url" | "userinfo-url" => profile.userinfo_url = Some(value),
        "sample_url" | "sample-url" => profile.sample_url = Some(value),
        "client_id" | "client-id" => profile.client_id = Some(value),
        "hosted_domain" | "hosted-domain" => profile.hosted_domain = Some(value),
        "scopes" => {
            profile.scopes = Some(
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_owned)
                    .collect(),
            );
        }
        "ca_cert" | "ca-cert" => profile.ca_cert = Some(value.into()),
        "insecure" => profile.insecure = Some(parse_value(key, &value, "'true' or 'false'")?),
        "timeout" => profile.timeout = Some(parse_value(key, &value, "a number (seconds)")?),
        other => {
            return Err(CliError::Validation {
                field: other.into(),
                reason: format!(
                    "unknown config key '{other}'. Valid keys: api_root, auth_url, \
                     userinfo_url, sample_url, client_id, scopes, hosted_domain, ca_cert, \
                     insecure, timeout"
                ),
            });
        }
    }
    Ok(())
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => {
            let cfg = config::load_config()?;
            let view = resolve(global, &cfg)?;
            let out = output::render_single(
                &global.output,
                &view,
                |v| {
                    toml::to_string_pretty(v)
                        .unwrap_or_else(|e| format!("# could not render configuration: {e}"))
                },
                |v| v.api_root.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config()?;
            let name = target_profile(global, &cfg);

            let profile = cfg.profiles.entry(name.clone()).or_default();
            set_key(profile, &key, value)?;
            // Reject values the client could not run with.
            config::profile_to_client_config(profile, &cfg.defaults)?;

            config::save_config(&cfg)?;
            util::notice(&format!("Set {key} on profile '{name}'"), global.quiet);
            Ok(())
        }

        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config()?;
            if name != "default" && !cfg.profiles.contains_key(&name) {
                return Err(config::ConfigError::UnknownProfile { name }.into());
            }

            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            util::notice(&format!("Default profile set to '{name}'"), global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }
    }
}
