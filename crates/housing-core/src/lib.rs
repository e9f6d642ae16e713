//! Client logic between `housing-api` and the command-line shell.
//!
//! - **[`Session`]**: loads the domain and identity API modules (both must
//!   settle), attempts silent sign-in, offers interactive sign-in, and
//!   publishes `authorized` / [`Identity`] on every transition.
//!
//! - **[`Housing`]**: the API facade. One async operation per capability,
//!   routed to the remote backend when loaded and to the sample document
//!   otherwise. Errors stay raw until the caller classifies them.
//!
//! - **[`classify`]**: turns any error payload into a [`ClassifiedError`]
//!   (`Unauthorized`, `ServerError`, `ApiUnavailable`, `ClientError`).
//!
//! - **[`Capabilities`]**: the set of remote operations decided once at
//!   startup from the loaded discovery documents.

pub mod capability;
pub mod classify;
pub mod config;
pub mod error;
pub mod facade;
pub mod model;
pub mod remote;
pub mod session;

// ── Primary re-exports ──────────────────────────────────────────────
pub use capability::{Capabilities, Capability};
pub use classify::{ClassifiedError, Classify, ErrorKind, classify};
pub use config::{AuthSettings, ClientConfig};
pub use error::SessionError;
pub use facade::{Housing, HousingBackend, SampleSource};
pub use remote::RemoteClients;
pub use session::{
    Authorizer, IdentityProvider, ModuleLoader, Session, SessionModules, SessionServices,
    SessionState,
};

pub use model::{
    AdminList, AdminListKind, Floor, Identifier, Identity, Occupancy, Occupants, Reservation, Room,
    RoomShape, Userinfo,
};
