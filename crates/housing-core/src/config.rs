// ── Runtime client configuration ──
//
// Describes which endpoints to talk to and how to authenticate. Built by the
// CLI from the on-disk profile plus flags; core never reads config files.

use std::time::Duration;

use housing_api::transport::{TlsMode, TransportConfig};
use housing_api::{ApiModule, Error};
use url::Url;

/// Domain API module name and version loaded at startup.
pub const DOMAIN_MODULE: (&str, &str) = ("housing", "v1");
/// Identity API module name and version loaded at startup.
pub const IDENTITY_MODULE: (&str, &str) = ("oauth2", "v2");

/// OAuth client settings passed to the provider on every attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSettings {
    pub client_id: String,
    pub scopes: Vec<String>,
    /// Organizational domain preferred during silent sign-in.
    pub hosted_domain: Option<String>,
}

impl AuthSettings {
    /// Scopes joined the way the provider expects them.
    pub fn scope(&self) -> String {
        self.scopes.join(" ")
    }
}

/// Everything needed to reach the remote services.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Cloud Endpoints root, e.g. `https://host/_ah/api`.
    pub api_root: Url,
    /// OAuth authorization endpoint.
    pub auth_url: Url,
    /// Identity endpoint (`oauth2.userinfo.get`).
    pub userinfo_url: Url,
    /// Static sample document used when the domain API is unavailable.
    pub sample_url: Url,
    pub auth: AuthSettings,
    pub tls: TlsMode,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: self.tls.clone(),
            timeout: self.timeout,
        }
    }

    /// The housing module, discovered under the API root.
    pub fn domain_module(&self) -> ApiModule {
        ApiModule::new(DOMAIN_MODULE.0, DOMAIN_MODULE.1, self.api_root.clone())
    }

    /// The identity module, discovered at the origin serving userinfo.
    pub fn identity_module(&self) -> Result<ApiModule, Error> {
        let root = self.userinfo_url.join("/")?;
        Ok(ApiModule::new(IDENTITY_MODULE.0, IDENTITY_MODULE.1, root))
    }
}
