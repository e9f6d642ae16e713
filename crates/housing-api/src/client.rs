// Housing API HTTP client
//
// Wraps `reqwest::Client` with Cloud-Endpoints style URL construction
// (`{root}/housing/v1/{method}`), bearer-token injection, and error-envelope
// unwrapping. Response parsing helpers are shared with the identity and
// sample clients.

use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::{CODE_BAD_BODY, Error};
use crate::models::{AdminList, Floor, FloorsResponse, Identifier, OpenStatus, Reservation};
use crate::transport::TokenStore;

/// Error bodies arrive as `{"error":{...}}` or, from older API versions,
/// double-wrapped as `{"result":{"error":{...}}}`.
#[derive(serde::Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    error: Option<ErrorBody>,
    #[serde(default)]
    result: Option<Box<ErrorEnvelope>>,
}

#[derive(serde::Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<u16>,
    #[serde(default)]
    message: Option<String>,
}

impl ErrorEnvelope {
    fn into_body(self) -> Option<ErrorBody> {
        match (self.error, self.result) {
            (Some(body), _) => Some(body),
            (None, Some(inner)) => inner.error,
            (None, None) => None,
        }
    }
}

/// Pull a structured error out of a response body, if it carries one.
fn structured_error(body: &str) -> Option<ErrorBody> {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(ErrorEnvelope::into_body)
}

/// Parse a JSON body, or translate the failure into an [`Error`].
///
/// Non-success statuses become [`Error::Api`] with the code and message
/// from the body's error envelope when present, otherwise from the HTTP
/// status line. A success status whose body is an error envelope is
/// treated the same way.
pub(crate) async fn handle_response<T: DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, Error> {
    let status = resp.status();
    let body = resp.text().await?;

    if !status.is_success() {
        let parsed = structured_error(&body);
        let code = parsed
            .as_ref()
            .and_then(|e| e.code)
            .unwrap_or_else(|| status.as_u16());
        let message = parsed.and_then(|e| e.message).unwrap_or_else(|| {
            if body.is_empty() {
                status.to_string()
            } else {
                body.chars().take(200).collect()
            }
        });
        return Err(Error::Api { code, message });
    }

    if let Some(err) = structured_error(&body) {
        return Err(Error::Api {
            code: err.code.unwrap_or(CODE_BAD_BODY),
            message: err.message.unwrap_or_default(),
        });
    }

    serde_json::from_str(&body).map_err(|e| {
        let preview: String = body.chars().take(200).collect();
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body,
        }
    })
}

/// Raw HTTP client for the housing API.
///
/// All methods return unwrapped payloads: `floors` lists, the reservation,
/// the open flag, or an admin list. Errors keep the server's code so the
/// caller can classify them.
pub struct HousingClient {
    http: reqwest::Client,
    base_url: Url,
    token: TokenStore,
}

impl HousingClient {
    /// Wrap an existing `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, api_root: &Url, token: TokenStore) -> Self {
        Self {
            http,
            base_url: Self::normalize_base_url(api_root),
            token,
        }
    }

    /// `https://host/_ah/api` → `https://host/_ah/api/housing/v1/`
    fn normalize_base_url(api_root: &Url) -> Url {
        let mut url = api_root.clone();
        let path = url.path().trim_end_matches('/').to_owned();
        if path.ends_with("/housing/v1") {
            url.set_path(&format!("{path}/"));
        } else {
            url.set_path(&format!("{path}/housing/v1/"));
        }
        url
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, method: &str) -> Result<T, Error> {
        let url = self.base_url.join(method)?;
        debug!("GET {url}");

        let resp = self.token.apply(self.http.get(url)).send().await?;
        handle_response(resp).await
    }

    async fn post<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        let url = self.base_url.join(method)?;
        debug!("POST {url} params={params:?}");

        let resp = self
            .token
            .apply(self.http.post(url).query(params))
            .send()
            .await?;
        handle_response(resp).await
    }

    // ── Rooms & reservations ─────────────────────────────────────────

    /// `GET rooms`: every floor with its rooms.
    pub async fn rooms(&self) -> Result<Vec<Floor>, Error> {
        let resp: FloorsResponse = self.get("rooms").await?;
        Ok(resp.floors)
    }

    /// `GET current`: the signed-in user's reservation.
    pub async fn current(&self) -> Result<Reservation, Error> {
        self.get("current").await
    }

    /// `POST reserve?number=`: returns the updated floors.
    pub async fn reserve(&self, room: &Identifier) -> Result<Vec<Floor>, Error> {
        debug!(%room, "reserving room");
        let resp: FloorsResponse = self.post("reserve", &[("number", room.to_string())]).await?;
        Ok(resp.floors)
    }

    /// `POST deleteReservation`: returns the updated floors.
    pub async fn delete_reservation(&self) -> Result<Vec<Floor>, Error> {
        let resp: FloorsResponse = self.post("deleteReservation", &[]).await?;
        Ok(resp.floors)
    }

    // ── Admin ────────────────────────────────────────────────────────

    /// `GET isOpen`: whether the registration form accepts reservations.
    pub async fn is_open(&self) -> Result<bool, Error> {
        let resp: OpenStatus = self.get("isOpen").await?;
        Ok(resp.is_open)
    }

    /// `POST setOpen?isOpen=`: returns the flag as stored by the server.
    pub async fn set_open(&self, open: bool) -> Result<bool, Error> {
        let resp: OpenStatus = self.post("setOpen", &[("isOpen", open.to_string())]).await?;
        Ok(resp.is_open)
    }

    /// `GET {method}` for one of the admin collections
    /// (`getStudentList`, `getRoomList`, `getAdminList`, `getEditorList`).
    pub async fn list(&self, method: &str) -> Result<AdminList, Error> {
        self.get(method).await
    }
}
