#![allow(clippy::unwrap_used)]
// Session bootstrap: module-load join, silent/interactive parameters,
// identity publication and forced sign-out.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::json;
use tokio::sync::oneshot;
use url::Url;

use housing_api::{
    ApiModule, AuthorizeRequest, AuthorizeResponse, Error, LoadedModule, TokenStore, Userinfo,
};
use housing_core::{
    AuthSettings, Authorizer, Capability, ErrorKind, Identity, IdentityProvider, ModuleLoader,
    Session, SessionError, SessionModules, SessionServices, SessionState, classify,
};

// ── Stubs ───────────────────────────────────────────────────────────

type Gate = oneshot::Receiver<Result<LoadedModule, Error>>;

/// Each module load waits on its own gate until the test releases it.
#[derive(Default)]
struct GatedLoader {
    gates: Mutex<HashMap<String, Gate>>,
}

impl GatedLoader {
    fn gate(&self, name: &str) -> oneshot::Sender<Result<LoadedModule, Error>> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(name.to_owned(), rx);
        tx
    }
}

#[async_trait]
impl ModuleLoader for GatedLoader {
    async fn load(&self, module: &ApiModule) -> Result<LoadedModule, Error> {
        let gate = self.gates.lock().unwrap().remove(&module.name).unwrap();
        gate.await.unwrap()
    }
}

/// Loads every module immediately with the given method ids.
struct ReadyLoader(Vec<&'static str>);

#[async_trait]
impl ModuleLoader for ReadyLoader {
    async fn load(&self, module: &ApiModule) -> Result<LoadedModule, Error> {
        Ok(loaded(module, &self.0))
    }
}

/// Records every request and answers from a script (last answer repeats).
struct ScriptedAuthorizer {
    calls: Mutex<Vec<AuthorizeRequest>>,
    answers: Mutex<Vec<AuthorizeResponse>>,
}

impl ScriptedAuthorizer {
    fn new(answers: Vec<AuthorizeResponse>) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            answers: Mutex::new(answers),
        })
    }

    fn calls(&self) -> Vec<AuthorizeRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Authorizer for ScriptedAuthorizer {
    async fn authorize(&self, request: &AuthorizeRequest) -> AuthorizeResponse {
        self.calls.lock().unwrap().push(request.clone());
        let mut answers = self.answers.lock().unwrap();
        if answers.len() > 1 {
            answers.remove(0)
        } else {
            answers[0].clone()
        }
    }
}

struct StubIdentity(Result<&'static str, u16>);

#[async_trait]
impl IdentityProvider for StubIdentity {
    async fn userinfo(&self) -> Result<Userinfo, Error> {
        match self.0 {
            Ok(email) => Ok(Userinfo {
                email: Some(email.to_owned()),
            }),
            Err(code) => Err(Error::Api {
                code,
                message: "userinfo failed".into(),
            }),
        }
    }
}

/// Signals when the email fetch starts, then waits for the test to release it.
struct GatedIdentity {
    started: Mutex<Option<oneshot::Sender<()>>>,
    release: Mutex<Option<oneshot::Receiver<()>>>,
}

impl GatedIdentity {
    fn new() -> (Arc<Self>, oneshot::Receiver<()>, oneshot::Sender<()>) {
        let (started_tx, started_rx) = oneshot::channel();
        let (release_tx, release_rx) = oneshot::channel();
        let identity = Arc::new(Self {
            started: Mutex::new(Some(started_tx)),
            release: Mutex::new(Some(release_rx)),
        });
        (identity, started_rx, release_tx)
    }
}

#[async_trait]
impl IdentityProvider for GatedIdentity {
    async fn userinfo(&self) -> Result<Userinfo, Error> {
        let started = self.started.lock().unwrap().take().unwrap();
        let release = self.release.lock().unwrap().take().unwrap();
        started.send(()).unwrap();
        release.await.unwrap();
        Ok(Userinfo {
            email: Some("abc1234@g.rit.edu".into()),
        })
    }
}

fn loaded(module: &ApiModule, methods: &[&str]) -> LoadedModule {
    LoadedModule {
        name: module.name.clone(),
        version: module.version.clone(),
        methods: methods.iter().map(ToString::to_string).collect(),
    }
}

fn granted() -> AuthorizeResponse {
    AuthorizeResponse {
        access_token: Some("ya29.token".to_owned().into()),
        expires_in: Some(3600),
        error: None,
    }
}

fn settings() -> AuthSettings {
    AuthSettings {
        client_id: "cid.apps.example".into(),
        scopes: vec!["https://www.googleapis.com/auth/userinfo.email".into()],
        hosted_domain: Some("g.rit.edu".into()),
    }
}

fn modules() -> SessionModules {
    SessionModules {
        domain: ApiModule::new("housing", "v1", Url::parse("https://h.example/_ah/api").unwrap()),
        identity: ApiModule::new("oauth2", "v2", Url::parse("https://id.example/").unwrap()),
    }
}

const ALL_METHODS: [&str; 3] = [
    "housing.housing.rooms",
    "housing.housing.current",
    "oauth2.userinfo.get",
];

fn session(
    loader: Arc<dyn ModuleLoader>,
    authorizer: Arc<ScriptedAuthorizer>,
    identity: StubIdentity,
    token: &TokenStore,
) -> Session {
    session_with(loader, authorizer, Arc::new(identity), token)
}

fn session_with(
    loader: Arc<dyn ModuleLoader>,
    authorizer: Arc<ScriptedAuthorizer>,
    identity: Arc<dyn IdentityProvider>,
    token: &TokenStore,
) -> Session {
    Session::new(
        settings(),
        modules(),
        SessionServices {
            loader,
            authorizer,
            identity,
            token: token.clone(),
        },
    )
}

// ── Module-load join ────────────────────────────────────────────────

#[tokio::test]
async fn test_silent_auth_waits_for_both_modules() {
    let loader = Arc::new(GatedLoader::default());
    let domain_gate = loader.gate("housing");
    let identity_gate = loader.gate("oauth2");
    let authorizer = ScriptedAuthorizer::new(vec![granted()]);
    let token = TokenStore::new();
    let session = session(
        loader,
        authorizer.clone(),
        StubIdentity(Ok("abc1234@g.rit.edu")),
        &token,
    );

    let task = tokio::spawn({
        let session = session.clone();
        async move { session.start().await }
    });

    tokio::task::yield_now().await;
    assert_eq!(session.state(), SessionState::ApisLoading);

    let m = modules();
    domain_gate
        .send(Ok(loaded(&m.domain, &ALL_METHODS[..2])))
        .unwrap();
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    assert!(
        authorizer.calls().is_empty(),
        "silent auth attempted before the identity module loaded"
    );
    assert_eq!(session.state(), SessionState::ApisLoading);

    identity_gate
        .send(Ok(loaded(&m.identity, &ALL_METHODS[2..])))
        .unwrap();
    assert!(task.await.unwrap().unwrap());

    assert_eq!(authorizer.calls().len(), 1);
    assert_eq!(session.state(), SessionState::SignedIn);
    assert!(session.capabilities().supports(Capability::Rooms));
    assert!(session.capabilities().supports(Capability::Userinfo));
}

#[tokio::test]
async fn test_failed_module_load_still_settles() {
    let loader = Arc::new(GatedLoader::default());
    let domain_gate = loader.gate("housing");
    let identity_gate = loader.gate("oauth2");
    let authorizer = ScriptedAuthorizer::new(vec![granted()]);
    let token = TokenStore::new();
    let session = session(loader, authorizer.clone(), StubIdentity(Ok("a@b.c")), &token);

    identity_gate
        .send(Ok(loaded(&modules().identity, &ALL_METHODS[2..])))
        .unwrap();
    domain_gate.send(Err(Error::unavailable("offline"))).unwrap();

    assert!(session.start().await.unwrap());
    assert!(!session.capabilities().has_domain());
    assert_eq!(authorizer.calls().len(), 1);
}

#[tokio::test]
async fn test_start_twice_is_rejected() {
    let authorizer = ScriptedAuthorizer::new(vec![granted()]);
    let token = TokenStore::new();
    let session = session(
        Arc::new(ReadyLoader(ALL_METHODS.to_vec())),
        authorizer.clone(),
        StubIdentity(Ok("a@b.c")),
        &token,
    );

    session.start().await.unwrap();
    assert_eq!(session.start().await, Err(SessionError::AlreadyStarted));
    assert_eq!(authorizer.calls().len(), 1);
}

// ── Authorization parameters ────────────────────────────────────────

#[tokio::test]
async fn test_silent_then_interactive_parameters() {
    let authorizer = ScriptedAuthorizer::new(vec![
        AuthorizeResponse::failed("immediate_failed"),
        granted(),
    ]);
    let token = TokenStore::new();
    let session = session(
        Arc::new(ReadyLoader(ALL_METHODS.to_vec())),
        authorizer.clone(),
        StubIdentity(Ok("abc1234@g.rit.edu")),
        &token,
    );

    assert!(!session.start().await.unwrap());
    assert_eq!(session.state(), SessionState::SignedOut);
    assert!(!token.is_set());

    assert!(session.sign_in().await.unwrap());
    assert_eq!(session.state(), SessionState::SignedIn);
    assert!(token.is_set());

    let calls = authorizer.calls();
    assert_eq!(calls.len(), 2);

    let silent = &calls[0];
    assert!(silent.immediate);
    assert_eq!(silent.hd.as_deref(), Some("g.rit.edu"));
    assert_eq!(silent.authuser, None);
    assert_eq!(silent.client_id, "cid.apps.example");

    let interactive = &calls[1];
    assert!(!interactive.immediate);
    assert_eq!(interactive.hd, None);
    assert_eq!(interactive.authuser.as_deref(), Some(""));
}

#[tokio::test]
async fn test_sign_in_before_start_is_rejected() {
    let authorizer = ScriptedAuthorizer::new(vec![granted()]);
    let token = TokenStore::new();
    let session = session(
        Arc::new(ReadyLoader(vec![])),
        authorizer.clone(),
        StubIdentity(Ok("a@b.c")),
        &token,
    );

    assert_eq!(session.sign_in().await, Err(SessionError::NotStarted));
    assert!(authorizer.calls().is_empty());
}

#[tokio::test]
async fn test_error_field_means_signed_out() {
    let authorizer = ScriptedAuthorizer::new(vec![AuthorizeResponse {
        access_token: Some("leftover".to_owned().into()),
        expires_in: None,
        error: Some("access_denied".into()),
    }]);
    let token = TokenStore::new();
    let session = session(
        Arc::new(ReadyLoader(ALL_METHODS.to_vec())),
        authorizer,
        StubIdentity(Ok("a@b.c")),
        &token,
    );

    assert!(!session.start().await.unwrap());
    assert!(!token.is_set());
    assert_eq!(session.identity(), Identity::signed_out());
}

#[tokio::test]
async fn test_result_without_error_field_signs_in() {
    let authorizer = ScriptedAuthorizer::new(vec![AuthorizeResponse::default()]);
    let token = TokenStore::new();
    let session = session(
        Arc::new(ReadyLoader(ALL_METHODS.to_vec())),
        authorizer,
        StubIdentity(Ok("a@b.c")),
        &token,
    );

    assert!(session.start().await.unwrap());
    assert_eq!(session.state(), SessionState::SignedIn);
    assert!(!token.is_set());
}

// ── Identity publication ────────────────────────────────────────────

#[tokio::test]
async fn test_signed_in_publishes_identity_and_flag() {
    let authorizer = ScriptedAuthorizer::new(vec![granted()]);
    let token = TokenStore::new();
    let session = session(
        Arc::new(ReadyLoader(ALL_METHODS.to_vec())),
        authorizer,
        StubIdentity(Ok("abc1234@g.rit.edu")),
        &token,
    );
    let mut authorized = session.subscribe();

    session.start().await.unwrap();

    assert!(authorized.recv().await.unwrap());
    assert_eq!(
        session.identity(),
        Identity::signed_in(Some("abc1234@g.rit.edu".into()))
    );
}

#[tokio::test]
async fn test_email_failure_keeps_signed_in() {
    let authorizer = ScriptedAuthorizer::new(vec![granted()]);
    let token = TokenStore::new();
    let session = session(
        Arc::new(ReadyLoader(ALL_METHODS.to_vec())),
        authorizer,
        StubIdentity(Err(500)),
        &token,
    );

    assert!(session.start().await.unwrap());
    assert_eq!(session.state(), SessionState::SignedIn);
    assert_eq!(session.identity(), Identity::signed_in(None));
}

#[tokio::test]
async fn test_missing_identity_module_leaves_email_blank() {
    let authorizer = ScriptedAuthorizer::new(vec![granted()]);
    let token = TokenStore::new();
    let session = session(
        Arc::new(ReadyLoader(vec!["housing.housing.rooms"])),
        authorizer,
        StubIdentity(Ok("never@fetched.example")),
        &token,
    );

    assert!(session.start().await.unwrap());
    assert_eq!(session.identity().email, None);
}

#[tokio::test]
async fn test_nothing_published_while_email_is_fetched() {
    let (identity, started, release) = GatedIdentity::new();
    let token = TokenStore::new();
    let session = session_with(
        Arc::new(ReadyLoader(ALL_METHODS.to_vec())),
        ScriptedAuthorizer::new(vec![granted()]),
        identity,
        &token,
    );
    let mut authorized = session.subscribe();

    let task = tokio::spawn({
        let session = session.clone();
        async move { session.start().await }
    });
    started.await.unwrap();

    assert_eq!(session.state(), SessionState::SilentAuthAttempted);
    assert_eq!(session.identity(), Identity::signed_out());
    assert!(authorized.try_recv().is_err());

    release.send(()).unwrap();
    assert!(task.await.unwrap().unwrap());
    assert_eq!(session.state(), SessionState::SignedIn);
    assert_eq!(
        session.identity(),
        Identity::signed_in(Some("abc1234@g.rit.edu".into()))
    );
    assert!(authorized.recv().await.unwrap());
}

// ── Forced sign-out ─────────────────────────────────────────────────

#[tokio::test]
async fn test_sign_out_during_email_fetch_drops_the_sign_in() {
    let (identity, started, release) = GatedIdentity::new();
    let token = TokenStore::new();
    let session = session_with(
        Arc::new(ReadyLoader(ALL_METHODS.to_vec())),
        ScriptedAuthorizer::new(vec![granted()]),
        identity,
        &token,
    );
    let mut authorized = session.subscribe();

    let task = tokio::spawn({
        let session = session.clone();
        async move { session.start().await }
    });
    started.await.unwrap();
    assert!(token.is_set());

    let err = classify(&json!({ "error": { "code": 401, "message": "expired" } }), Some("rooms()"));
    session.handle_error(&err).unwrap().await.unwrap();
    release.send(()).unwrap();

    assert!(!task.await.unwrap().unwrap());
    assert_eq!(session.state(), SessionState::SignedOut);
    assert_eq!(session.identity(), Identity::signed_out());
    assert!(!token.is_set());
    assert!(!authorized.recv().await.unwrap());
    assert!(authorized.try_recv().is_err());
}


#[tokio::test]
async fn test_unauthorized_error_signs_out_deferred() {
    let authorizer = ScriptedAuthorizer::new(vec![granted()]);
    let token = TokenStore::new();
    let session = session(
        Arc::new(ReadyLoader(ALL_METHODS.to_vec())),
        authorizer,
        StubIdentity(Ok("abc1234@g.rit.edu")),
        &token,
    );
    session.start().await.unwrap();
    let mut authorized = session.subscribe();

    let err = classify(&json!({ "error": { "code": 401, "message": "expired" } }), Some("rooms()"));
    assert_eq!(err.kind, ErrorKind::Unauthorized);

    let handle = session.handle_error(&err).unwrap();
    // Not applied inline.
    assert_eq!(session.state(), SessionState::SignedIn);
    assert!(token.is_set());

    handle.await.unwrap();
    assert_eq!(session.state(), SessionState::SignedOut);
    assert!(!token.is_set());
    assert!(!authorized.recv().await.unwrap());
    assert_eq!(session.identity(), Identity::signed_out());
}

#[tokio::test]
async fn test_other_errors_do_not_sign_out() {
    let authorizer = ScriptedAuthorizer::new(vec![granted()]);
    let token = TokenStore::new();
    let session = session(
        Arc::new(ReadyLoader(ALL_METHODS.to_vec())),
        authorizer,
        StubIdentity(Ok("a@b.c")),
        &token,
    );
    session.start().await.unwrap();

    for code in [404, 500, 600] {
        let err = classify(&json!({ "code": code }), None);
        assert!(session.handle_error(&err).is_none());
    }
    assert_eq!(session.state(), SessionState::SignedIn);
}
