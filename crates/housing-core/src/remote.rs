// Bindings from the facade and session seams to the `housing-api` HTTP clients.

use std::sync::Arc;

use async_trait::async_trait;
use housing_api::{
    ApiModule, AuthorizeRequest, AuthorizeResponse, DiscoveryLoader, Error, HousingClient,
    LoadedModule, OAuthClient, SampleLoader, TokenStore, UserinfoClient,
};

use crate::capability::Capabilities;
use crate::config::ClientConfig;
use crate::facade::{Housing, HousingBackend, SampleSource};
use crate::model::{AdminList, AdminListKind, Floor, Identifier, Reservation, Userinfo};
use crate::session::{Authorizer, IdentityProvider, ModuleLoader, SessionModules, SessionServices};

#[async_trait]
impl HousingBackend for HousingClient {
    async fn rooms(&self) -> Result<Vec<Floor>, Error> {
        HousingClient::rooms(self).await
    }

    async fn current(&self) -> Result<Reservation, Error> {
        HousingClient::current(self).await
    }

    async fn reserve(&self, room: &Identifier) -> Result<Vec<Floor>, Error> {
        HousingClient::reserve(self, room).await
    }

    async fn delete_reservation(&self) -> Result<Vec<Floor>, Error> {
        HousingClient::delete_reservation(self).await
    }

    async fn is_open(&self) -> Result<bool, Error> {
        HousingClient::is_open(self).await
    }

    async fn set_open(&self, open: bool) -> Result<bool, Error> {
        HousingClient::set_open(self, open).await
    }

    async fn admin_list(&self, kind: AdminListKind) -> Result<AdminList, Error> {
        self.list(kind.method()).await
    }
}

#[async_trait]
impl SampleSource for SampleLoader {
    async fn fetch_sample(&self) -> Result<Vec<Floor>, Error> {
        SampleLoader::fetch_sample(self).await
    }
}

#[async_trait]
impl ModuleLoader for DiscoveryLoader {
    async fn load(&self, module: &ApiModule) -> Result<LoadedModule, Error> {
        DiscoveryLoader::load(self, module).await
    }
}

#[async_trait]
impl Authorizer for OAuthClient {
    async fn authorize(&self, request: &AuthorizeRequest) -> AuthorizeResponse {
        OAuthClient::authorize(self, request).await
    }
}

#[async_trait]
impl IdentityProvider for UserinfoClient {
    async fn userinfo(&self) -> Result<Userinfo, Error> {
        self.get().await
    }
}

/// The HTTP clients for one configuration, sharing a single token store.
pub struct RemoteClients {
    pub modules: SessionModules,
    pub services: SessionServices,
    pub backend: Arc<HousingClient>,
    pub sample: Arc<SampleLoader>,
}

impl RemoteClients {
    pub fn build(config: &ClientConfig) -> Result<Self, Error> {
        let transport = config.transport();
        let http = transport.build_client()?;
        let token = TokenStore::new();

        let modules = SessionModules {
            domain: config.domain_module(),
            identity: config.identity_module()?,
        };
        let services = SessionServices {
            loader: Arc::new(DiscoveryLoader::with_client(http.clone())),
            authorizer: Arc::new(OAuthClient::with_client(
                http.clone(),
                config.auth_url.clone(),
            )),
            identity: Arc::new(UserinfoClient::with_client(
                http.clone(),
                config.userinfo_url.clone(),
                token.clone(),
            )),
            token: token.clone(),
        };

        Ok(Self {
            modules,
            services,
            backend: Arc::new(HousingClient::with_client(
                http.clone(),
                &config.api_root,
                token,
            )),
            sample: Arc::new(SampleLoader::with_client(http, config.sample_url.clone())),
        })
    }

    /// Facade over these clients. The backend is attached only when the
    /// domain module loaded.
    pub fn facade(&self, capabilities: Capabilities) -> Housing {
        let backend = capabilities
            .has_domain()
            .then(|| Arc::clone(&self.backend) as Arc<dyn HousingBackend>);
        Housing::new(backend, capabilities, self.sample.clone())
    }
}
