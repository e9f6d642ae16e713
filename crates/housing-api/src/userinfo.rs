// Identity API client (`oauth2.userinfo.get`).

use tracing::debug;
use url::Url;

use crate::client::handle_response;
use crate::error::Error;
use crate::models::Userinfo;
use crate::transport::TokenStore;

/// Default identity endpoint.
pub const DEFAULT_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

pub struct UserinfoClient {
    http: reqwest::Client,
    url: Url,
    token: TokenStore,
}

impl UserinfoClient {
    pub fn with_client(http: reqwest::Client, url: Url, token: TokenStore) -> Self {
        Self { http, url, token }
    }

    /// Fetch the signed-in account's profile (email only).
    pub async fn get(&self) -> Result<Userinfo, Error> {
        debug!("GET {}", self.url);
        let resp = self.token.apply(self.http.get(self.url.clone())).send().await?;
        handle_response(resp).await
    }
}
