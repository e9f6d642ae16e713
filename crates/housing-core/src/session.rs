// ── Session bootstrap ──
//
// Loads the domain and identity API modules, then drives the OAuth
// handshake: a silent attempt first, an interactive one on request. Every
// SignedIn/SignedOut transition is published as an `authorized` flag plus
// the current identity.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use housing_api::{
    ApiModule, AuthorizeRequest, AuthorizeResponse, Error, LoadedModule, TokenStore, Userinfo,
};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::capability::{Capabilities, Capability};
use crate::classify::ClassifiedError;
use crate::config::AuthSettings;
use crate::error::SessionError;
use crate::model::Identity;

const AUTHORIZED_CHANNEL_SIZE: usize = 16;

// ── Seams ────────────────────────────────────────────────────────

/// Fetches an API module's discovery document.
#[async_trait]
pub trait ModuleLoader: Send + Sync {
    async fn load(&self, module: &ApiModule) -> Result<LoadedModule, Error>;
}

/// The OAuth provider. Never fails outright: problems come back in
/// [`AuthorizeResponse::error`].
#[async_trait]
pub trait Authorizer: Send + Sync {
    async fn authorize(&self, request: &AuthorizeRequest) -> AuthorizeResponse;
}

/// The identity API.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn userinfo(&self) -> Result<Userinfo, Error>;
}

/// Remote collaborators of a [`Session`].
#[derive(Clone)]
pub struct SessionServices {
    pub loader: Arc<dyn ModuleLoader>,
    pub authorizer: Arc<dyn Authorizer>,
    pub identity: Arc<dyn IdentityProvider>,
    /// Shared with every HTTP client; written on sign-in, cleared on sign-out.
    pub token: TokenStore,
}

/// The two modules loaded at startup.
#[derive(Debug, Clone)]
pub struct SessionModules {
    pub domain: ApiModule,
    pub identity: ApiModule,
}

// ── SessionState ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum SessionState {
    Unstarted,
    ApisLoading,
    SilentAuthAttempted,
    SignedIn,
    SignedOut,
    InteractiveAuthAttempted,
}

// ── Session ──────────────────────────────────────────────────────

/// Cheaply cloneable via `Arc<SessionInner>`.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    settings: AuthSettings,
    modules: SessionModules,
    services: SessionServices,
    state: watch::Sender<SessionState>,
    capabilities: watch::Sender<Capabilities>,
    identity: watch::Sender<Identity>,
    authorized: broadcast::Sender<bool>,
    /// Bumped on every sign-out. A sign-in attempt commits only if the
    /// epoch it started under is still current.
    epoch: Mutex<u64>,
}

impl Session {
    /// Create an unstarted session. Call [`start()`](Self::start) to load
    /// the API modules and attempt silent sign-in.
    pub fn new(settings: AuthSettings, modules: SessionModules, services: SessionServices) -> Self {
        let (state, _) = watch::channel(SessionState::Unstarted);
        let (capabilities, _) = watch::channel(Capabilities::none());
        let (identity, _) = watch::channel(Identity::signed_out());
        let (authorized, _) = broadcast::channel(AUTHORIZED_CHANNEL_SIZE);

        Self {
            inner: Arc::new(SessionInner {
                settings,
                modules,
                services,
                state,
                capabilities,
                identity,
                authorized,
                epoch: Mutex::new(0),
            }),
        }
    }

    // ── Observation ──────────────────────────────────────────────

    pub fn state(&self) -> SessionState {
        *self.inner.state.borrow()
    }

    pub fn watch_state(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    /// `authorized` flag, sent on every SignedIn/SignedOut transition.
    pub fn subscribe(&self) -> broadcast::Receiver<bool> {
        self.inner.authorized.subscribe()
    }

    pub fn identity(&self) -> Identity {
        self.inner.identity.borrow().clone()
    }

    pub fn watch_identity(&self) -> watch::Receiver<Identity> {
        self.inner.identity.subscribe()
    }

    /// Operations available after the modules loaded (empty before).
    pub fn capabilities(&self) -> Capabilities {
        self.inner.capabilities.borrow().clone()
    }

    pub fn is_signed_in(&self) -> bool {
        self.state() == SessionState::SignedIn
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Load both API modules, then attempt silent sign-in.
    ///
    /// Sign-in is attempted only after both loads have settled; a failed
    /// load contributes no capabilities but does not block the other.
    /// Returns whether the session ended up signed in.
    pub async fn start(&self) -> Result<bool, SessionError> {
        let claimed = self.inner.state.send_if_modified(|state| {
            if *state == SessionState::Unstarted {
                *state = SessionState::ApisLoading;
                true
            } else {
                false
            }
        });
        if !claimed {
            return Err(SessionError::AlreadyStarted);
        }

        info!("loading API modules");
        let modules = &self.inner.modules;
        let (domain, identity) = tokio::join!(
            self.load_module(&modules.domain),
            self.load_module(&modules.identity)
        );
        self.inner.capabilities.send_replace(domain.union(&identity));

        let request = AuthorizeRequest {
            client_id: self.inner.settings.client_id.clone(),
            scope: self.inner.settings.scope(),
            immediate: true,
            hd: self.inner.settings.hosted_domain.clone(),
            authuser: None,
        };
        self.set_state(SessionState::SilentAuthAttempted);
        Ok(self.authorize(&request).await)
    }

    /// Interactive sign-in with the full account chooser.
    pub async fn sign_in(&self) -> Result<bool, SessionError> {
        if matches!(
            self.state(),
            SessionState::Unstarted | SessionState::ApisLoading
        ) {
            return Err(SessionError::NotStarted);
        }

        let request = AuthorizeRequest {
            client_id: self.inner.settings.client_id.clone(),
            scope: self.inner.settings.scope(),
            immediate: false,
            hd: None,
            authuser: Some(String::new()),
        };
        self.set_state(SessionState::InteractiveAuthAttempted);
        Ok(self.authorize(&request).await)
    }

    /// React to a classified API error. An `Unauthorized` error forces the
    /// session back to SignedOut on a separate task; the handle lets the
    /// caller wait for it. Other kinds are ignored.
    pub fn handle_error(&self, error: &ClassifiedError) -> Option<JoinHandle<()>> {
        if !error.is_unauthorized() {
            return None;
        }

        debug!(source = %error.source, "unauthorized response, scheduling sign-out");
        let session = self.clone();
        Some(tokio::spawn(async move {
            session.signed_out();
        }))
    }

    // ── Internals ────────────────────────────────────────────────

    async fn load_module(&self, module: &ApiModule) -> Capabilities {
        match self.inner.services.loader.load(module).await {
            Ok(loaded) => {
                debug!(%module, "API module loaded");
                Capabilities::from_methods(&loaded.methods)
            }
            Err(e) => {
                warn!(%module, error = %e, "API module failed to load");
                Capabilities::none()
            }
        }
    }

    async fn authorize(&self, request: &AuthorizeRequest) -> bool {
        let epoch = *self.epoch();
        let answer = self.inner.services.authorizer.authorize(request).await;

        if !answer.is_authorized() {
            debug!(
                immediate = request.immediate,
                error = ?answer.error,
                "authorization not granted"
            );
            self.signed_out();
            return false;
        }

        // The userinfo call needs the bearer token, so it is stored before
        // anything is published.
        {
            let current = self.epoch();
            if *current != epoch {
                debug!("authorization superseded by sign-out");
                return false;
            }
            if let Some(token) = answer.access_token {
                self.inner.services.token.set(token);
            }
        }

        let email = self.fetch_email().await;
        self.signed_in(epoch, email)
    }

    async fn fetch_email(&self) -> Option<String> {
        if !self.capabilities().supports(Capability::Userinfo) {
            warn!("identity API not loaded, account email unavailable");
            return None;
        }
        match self.inner.services.identity.userinfo().await {
            Ok(info) => info.email,
            Err(e) => {
                warn!(error = %e, "could not fetch account email");
                None
            }
        }
    }

    /// Publish SignedIn with its identity, unless a sign-out happened since
    /// `epoch` was read.
    fn signed_in(&self, epoch: u64, email: Option<String>) -> bool {
        let current = self.epoch();
        if *current != epoch {
            debug!("sign-in dropped, session signed out meanwhile");
            return false;
        }

        self.inner.identity.send_replace(Identity::signed_in(email));
        self.set_state(SessionState::SignedIn);
        let _ = self.inner.authorized.send(true);
        info!("signed in");
        true
    }

    fn signed_out(&self) {
        let mut epoch = self.epoch();
        *epoch += 1;

        self.inner.services.token.clear();
        self.inner.identity.send_replace(Identity::signed_out());
        self.set_state(SessionState::SignedOut);
        let _ = self.inner.authorized.send(false);
        info!("signed out");
    }

    fn epoch(&self) -> MutexGuard<'_, u64> {
        self.inner
            .epoch
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, state: SessionState) {
        debug!(%state, "session state");
        self.inner.state.send_replace(state);
    }
}
