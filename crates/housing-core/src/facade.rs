// ── API facade ──
//
// One async operation per server capability. Routes to the remote backend
// when the capability loaded, otherwise to the sample document (floors) or
// to the code-600 sentinel (everything else). Results and errors are
// returned raw; callers classify at the display boundary.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::join_all;
use housing_api::Error;
use tracing::debug;

use crate::capability::{Capabilities, Capability};
use crate::model::{AdminList, AdminListKind, Floor, Identifier, Reservation, admin_list_kinds};

/// Message carried by the sentinel when a capability is missing.
pub const NOT_AVAILABLE: &str = "API Not Available";

/// The remote housing operations.
#[async_trait]
pub trait HousingBackend: Send + Sync {
    async fn rooms(&self) -> Result<Vec<Floor>, Error>;
    async fn current(&self) -> Result<Reservation, Error>;
    async fn reserve(&self, room: &Identifier) -> Result<Vec<Floor>, Error>;
    async fn delete_reservation(&self) -> Result<Vec<Floor>, Error>;
    async fn is_open(&self) -> Result<bool, Error>;
    async fn set_open(&self, open: bool) -> Result<bool, Error>;
    async fn admin_list(&self, kind: AdminListKind) -> Result<AdminList, Error>;
}

/// Static floor data used when the backend is absent.
#[async_trait]
pub trait SampleSource: Send + Sync {
    async fn fetch_sample(&self) -> Result<Vec<Floor>, Error>;
}

/// Stateless between calls; cheap to clone.
#[derive(Clone)]
pub struct Housing {
    backend: Option<Arc<dyn HousingBackend>>,
    capabilities: Capabilities,
    sample: Arc<dyn SampleSource>,
}

impl Housing {
    pub fn new(
        backend: Option<Arc<dyn HousingBackend>>,
        capabilities: Capabilities,
        sample: Arc<dyn SampleSource>,
    ) -> Self {
        Self {
            backend,
            capabilities,
            sample,
        }
    }

    /// No backend: floors come from the sample, everything else is unavailable.
    pub fn offline(sample: Arc<dyn SampleSource>) -> Self {
        Self::new(None, Capabilities::none(), sample)
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    pub fn is_online(&self) -> bool {
        self.backend.is_some()
    }

    fn backend_for(&self, capability: Capability) -> Option<&Arc<dyn HousingBackend>> {
        self.backend
            .as_ref()
            .filter(|_| self.capabilities.supports(capability))
    }

    fn require(&self, capability: Capability) -> Result<&Arc<dyn HousingBackend>, Error> {
        self.backend_for(capability).ok_or_else(|| {
            debug!(%capability, "capability not loaded");
            Error::unavailable(NOT_AVAILABLE)
        })
    }

    // ── Rooms & reservations ─────────────────────────────────────────

    /// Every floor with its rooms. Falls back to the sample document when
    /// the rooms capability is missing; sample failures are code 600.
    pub async fn load_floors(&self) -> Result<Vec<Floor>, Error> {
        if let Some(backend) = self.backend_for(Capability::Rooms) {
            return backend.rooms().await;
        }

        debug!("rooms capability missing, loading sample floors");
        self.sample.fetch_sample().await.map_err(|e| {
            if e.is_unavailable() {
                e
            } else {
                Error::unavailable(e.message())
            }
        })
    }

    pub async fn current_reservation(&self) -> Result<Reservation, Error> {
        self.require(Capability::Current)?.current().await
    }

    /// Reserve `room`; returns the updated floors.
    pub async fn reserve(&self, room: &Identifier) -> Result<Vec<Floor>, Error> {
        self.require(Capability::Reserve)?.reserve(room).await
    }

    /// Release the current reservation; returns the updated floors.
    pub async fn delete_reservation(&self) -> Result<Vec<Floor>, Error> {
        self.require(Capability::DeleteReservation)?
            .delete_reservation()
            .await
    }

    // ── Admin ────────────────────────────────────────────────────────

    /// Registration-form flag. A missing capability is an error, never `false`.
    pub async fn is_open(&self) -> Result<bool, Error> {
        self.require(Capability::IsOpen)?.is_open().await
    }

    /// Set the registration-form flag; returns the stored value.
    pub async fn set_open(&self, open: bool) -> Result<bool, Error> {
        self.require(Capability::SetOpen)?.set_open(open).await
    }

    /// Fetch the admin lists concurrently and wait for all of them.
    ///
    /// Results are inspected in request order (student, room, admin,
    /// editor). A 401 or 404 drops that list; any other failure aborts with
    /// the first such error. Lists whose capability did not load are not
    /// requested.
    pub async fn load_admin_lists(&self) -> Result<Vec<AdminList>, Error> {
        let Some(backend) = self.backend.as_ref() else {
            return Err(Error::unavailable(NOT_AVAILABLE));
        };

        let requests = admin_list_kinds()
            .filter(|kind| self.capabilities.supports(kind.capability()))
            .map(|kind| async move { (kind, backend.admin_list(kind).await) });
        let settled = join_all(requests).await;

        let mut lists = Vec::with_capacity(settled.len());
        for (kind, result) in settled {
            match result {
                Ok(list) => lists.push(list),
                Err(e) if e.is_unauthorized() || e.is_not_found() => {
                    debug!(%kind, code = e.code(), "admin list absent");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(lists)
    }
}
