//! Command dispatch: starts the session, builds the facade, then hands
//! each command its handler.

pub mod admin;
pub mod config_cmd;
pub mod floors;
pub mod reservation;
pub mod session;
pub mod util;

use housing_core::{ClassifiedError, Classify, ClientConfig, Housing, RemoteClients, Session};
use tracing::{debug, warn};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// A started session and the facade built from its capabilities.
pub struct App {
    pub session: Session,
    pub housing: Housing,
}

impl App {
    /// Build the clients, load the API modules and attempt silent sign-in
    /// (interactive too with `--sign-in`).
    pub async fn connect(config: &ClientConfig, global: &GlobalOpts) -> Result<Self, CliError> {
        let clients = RemoteClients::build(config).map_err(|source| CliError::ConnectionFailed {
            url: config.api_root.to_string(),
            source,
        })?;
        let session = Session::new(
            config.auth.clone(),
            clients.modules.clone(),
            clients.services.clone(),
        );

        let pb = util::spinner("Loading...", global.quiet);
        let mut signed_in = session.start().await?;
        if !signed_in && global.sign_in {
            pb.set_message("Signing in...");
            signed_in = session.sign_in().await?;
        }
        pb.finish_and_clear();

        let capabilities = session.capabilities();
        debug!(
            signed_in,
            online = capabilities.has_domain(),
            "session started"
        );
        let housing = clients.facade(capabilities);
        Ok(Self { session, housing })
    }

    /// Fail unless signed in. Offline sample browsing passes `allow_offline`.
    pub fn require_sign_in(&self, allow_offline: bool) -> Result<(), CliError> {
        if self.session.is_signed_in() || (allow_offline && !self.housing.is_online()) {
            Ok(())
        } else {
            Err(CliError::NotSignedIn)
        }
    }

    /// Classify a facade error for display. An `Unauthorized` error also
    /// signs the session out; the deferred sign-out completes before this
    /// returns.
    pub async fn classify(&self, err: &housing_api::Error, source: &str) -> ClassifiedError {
        let classified = err.classify(source);
        if let Some(handle) = self.session.handle_error(&classified) {
            if let Err(e) = handle.await {
                warn!(error = %e, "sign-out task failed");
            }
        }
        classified
    }

    /// [`classify`](Self::classify), converted to a CLI error.
    pub async fn fail(&self, err: &housing_api::Error, source: &str) -> CliError {
        self.classify(err, source).await.into()
    }
}

/// Dispatch a session-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, app: &App, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Floors(args) => floors::handle(app, args, global).await,
        Command::Current => reservation::current(app, global).await,
        Command::Reserve { room } => reservation::reserve(app, &room, global).await,
        Command::Release => reservation::release(app, global).await,
        Command::Admin(args) => admin::handle(app, args, global).await,
        Command::Whoami => {
            session::whoami(app, global);
            Ok(())
        }
        Command::Login => session::login(app, global).await,
        Command::Config(_) | Command::Completions(_) => Err(CliError::Validation {
            field: "command".into(),
            reason: "handled before a session is started".into(),
        }),
    }
}
