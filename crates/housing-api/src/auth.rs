// OAuth authorization client
//
// Posts an authorization request to the provider and reports the outcome in
// the provider's callback shape: a result that may carry an `error` field.
// The client never fails outright; a transport failure is itself an
// unsuccessful authorization.

use secrecy::SecretString;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

/// Parameters of one authorization attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizeRequest {
    pub client_id: String,
    pub scope: String,
    /// Non-interactive ("silent") attempt when `true`.
    pub immediate: bool,
    /// Hosted-domain hint preferring accounts from one organization.
    pub hd: Option<String>,
    /// Account selector; `Some("")` forces the full account chooser.
    pub authuser: Option<String>,
}

impl AuthorizeRequest {
    fn form(&self) -> Vec<(&'static str, String)> {
        let mut form = vec![
            ("client_id", self.client_id.clone()),
            ("scope", self.scope.clone()),
            ("immediate", self.immediate.to_string()),
            ("response_type", "token".to_owned()),
        ];
        if let Some(ref hd) = self.hd {
            form.push(("hd", hd.clone()));
        }
        if let Some(ref authuser) = self.authuser {
            form.push(("authuser", authuser.clone()));
        }
        form
    }
}

#[derive(Deserialize)]
struct TokenAnswer {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
    #[serde(default)]
    error: Option<String>,
}

/// The provider's answer. Authorized iff `error` is absent; a token is
/// stored when one was issued.
#[derive(Debug, Clone, Default)]
pub struct AuthorizeResponse {
    pub access_token: Option<SecretString>,
    pub expires_in: Option<u64>,
    pub error: Option<String>,
}

impl From<TokenAnswer> for AuthorizeResponse {
    fn from(answer: TokenAnswer) -> Self {
        Self {
            access_token: answer.access_token.map(SecretString::from),
            expires_in: answer.expires_in,
            error: answer.error,
        }
    }
}

impl AuthorizeResponse {
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }

    pub fn is_authorized(&self) -> bool {
        self.error.is_none()
    }
}

pub struct OAuthClient {
    http: reqwest::Client,
    auth_url: Url,
}

impl OAuthClient {
    pub fn with_client(http: reqwest::Client, auth_url: Url) -> Self {
        Self { http, auth_url }
    }

    pub async fn authorize(&self, request: &AuthorizeRequest) -> AuthorizeResponse {
        debug!(
            immediate = request.immediate,
            hd = ?request.hd,
            "POST {}",
            self.auth_url
        );

        let resp = match self
            .http
            .post(self.auth_url.clone())
            .form(&request.form())
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                warn!(error = %e, "authorization request failed");
                return AuthorizeResponse::failed(e.to_string());
            }
        };

        let status = resp.status();
        match resp.json::<TokenAnswer>().await {
            Ok(answer) => {
                let mut answer = AuthorizeResponse::from(answer);
                if !status.is_success() && answer.error.is_none() {
                    answer.error = Some(status.to_string());
                }
                answer
            }
            Err(e) => AuthorizeResponse::failed(format!("HTTP {status}: {e}")),
        }
    }
}
