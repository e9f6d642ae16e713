// housing-api: async HTTP clients for the housing reservation service
// (domain API, identity API, OAuth provider, discovery, sample data)

pub mod auth;
pub mod client;
pub mod discovery;
pub mod error;
pub mod models;
pub mod sample;
pub mod transport;
pub mod userinfo;

pub use auth::{AuthorizeRequest, AuthorizeResponse, OAuthClient};
pub use client::HousingClient;
pub use discovery::{ApiModule, DiscoveryLoader, LoadedModule};
pub use error::{CODE_UNAVAILABLE, Error};
pub use models::{
    AdminList, Floor, Identifier, Occupancy, Occupants, Reservation, Room, RoomShape, Userinfo,
};
pub use sample::SampleLoader;
pub use transport::{TlsMode, TokenStore, TransportConfig};
pub use userinfo::UserinfoClient;
