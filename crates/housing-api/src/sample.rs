// Static sample-data loader
//
// Used when the housing API module could not be loaded (offline or local
// development). One GET of a plain JSON file shaped `{ "floors": [...] }`.

use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::{Floor, FloorsResponse};

/// Default location of the sample document relative to the site root.
pub const DEFAULT_SAMPLE_PATH: &str = "/spec.json";

pub struct SampleLoader {
    http: reqwest::Client,
    url: Url,
}

impl SampleLoader {
    pub fn with_client(http: reqwest::Client, url: Url) -> Self {
        Self { http, url }
    }

    /// Fetch the sample document and return its `floors` field as-is.
    ///
    /// Every failure is reported as [`Error::Unavailable`] carrying the
    /// underlying error text.
    pub async fn fetch_sample(&self) -> Result<Vec<Floor>, Error> {
        debug!("GET {} (sample data)", self.url);

        let resp = self
            .http
            .get(self.url.clone())
            .send()
            .await
            .map_err(|e| Error::unavailable(e.to_string()))?;

        let resp = resp
            .error_for_status()
            .map_err(|e| Error::unavailable(e.to_string()))?;

        let doc: FloorsResponse = resp
            .json()
            .await
            .map_err(|e| Error::unavailable(e.to_string()))?;

        Ok(doc.floors)
    }
}
