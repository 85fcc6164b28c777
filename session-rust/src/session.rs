use crate::{
    api::{AuthApi, HttpAuthApi, LoginRequest},
    crypto::encrypt_password,
    opentelemetry::HandshakeSpan,
    pem::pem_to_der,
    store::{KeyValueStore, AUTH_TOKEN_KEY, PUBLIC_KEY_KEY},
    Credentials, SessionError, SessionOptions, SessionResult,
};
use std::{
    fmt,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};
use tracing_futures::Instrument;

/// Whether the session can be used to call the portfolio API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// The handshake has not resolved yet.
    Pending,
    Authenticated,
    Failed,
}

impl AuthState {
    #[must_use]
    pub fn is_pending(self) -> bool {
        self == Self::Pending
    }

    #[must_use]
    pub fn is_authenticated(self) -> bool {
        self == Self::Authenticated
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        !self.is_pending()
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Authenticated => "authenticated",
            Self::Failed => "failed",
        }
    }
}

/// A step of the handshake. Phases that need key material or a token carry
/// it, so a later phase can never run without what it depends on.
///
/// Transitions:
///
/// | from             | on                         | to               |
/// |------------------|----------------------------|------------------|
/// | `Init`           | key cached and decodable   | `KeyReady`       |
/// | `Init`           | no usable cached key       | `FetchingKey`    |
/// | `FetchingKey`    | key fetched and decoded    | `KeyReady`       |
/// | `FetchingKey`    | any error                  | `Failed`         |
/// | `KeyReady`       | token cached               | `Validating`     |
/// | `KeyReady`       | no token cached            | `Authenticating` |
/// | `Validating`     | HTTP 200                   | `Authenticated`  |
/// | `Validating`     | any error                  | `Authenticating` |
/// | `Authenticating` | token received             | `Authenticated`  |
/// | `Authenticating` | any error                  | `Failed`         |
///
/// Nothing leads back into `Validating` after it has been left, so a
/// rejected token costs exactly one login attempt.
#[derive(Clone, PartialEq, Eq)]
pub enum SessionPhase {
    Init,
    FetchingKey,
    KeyReady { public_key: Vec<u8> },
    Validating { public_key: Vec<u8>, token: String },
    Authenticating { public_key: Vec<u8> },
    Authenticated,
    Failed,
}

impl SessionPhase {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Init => "Init",
            Self::FetchingKey => "FetchingKey",
            Self::KeyReady { .. } => "KeyReady",
            Self::Validating { .. } => "Validating",
            Self::Authenticating { .. } => "Authenticating",
            Self::Authenticated => "Authenticated",
            Self::Failed => "Failed",
        }
    }

    #[must_use]
    pub fn terminal_state(&self) -> Option<AuthState> {
        match self {
            Self::Authenticated => Some(AuthState::Authenticated),
            Self::Failed => Some(AuthState::Failed),
            _ => None,
        }
    }
}

// Key bytes and tokens stay out of logs.
impl fmt::Debug for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Establishes a session with the portfolio API and publishes the result as
/// an [`AuthState`] signal.
pub struct SessionManager {
    api: Arc<dyn AuthApi>,
    store: Arc<dyn KeyValueStore>,
    credentials: Credentials,
    base_url: String,
    state: watch::Sender<AuthState>,
    started: AtomicBool,
}

impl SessionManager {
    pub fn new(
        api: Arc<dyn AuthApi>,
        store: Arc<dyn KeyValueStore>,
        credentials: Credentials,
    ) -> Self {
        let (state, _) = watch::channel(AuthState::Pending);
        Self {
            api,
            store,
            credentials,
            base_url: String::new(),
            state,
            started: AtomicBool::new(false),
        }
    }

    /// Build a manager talking HTTP to `options.base_url`.
    pub fn from_options(
        options: SessionOptions,
        store: Arc<dyn KeyValueStore>,
    ) -> SessionResult<Self> {
        let credentials = options.credentials.clone();
        let base_url = options.base_url.clone();
        let api = HttpAuthApi::new(options)?;
        Ok(Self {
            base_url,
            ..Self::new(Arc::new(api), store, credentials)
        })
    }

    #[must_use]
    pub fn state(&self) -> AuthState {
        *self.state.borrow()
    }

    /// Receive every change of the signal. The value only ever moves once,
    /// from `Pending` to a terminal state.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    /// Drive the handshake to completion and return the terminal state.
    ///
    /// Only the first call runs the handshake; later or concurrent calls wait
    /// for it and return the same outcome.
    pub async fn run(&self) -> AuthState {
        if self.started.swap(true, Ordering::SeqCst) {
            let mut receiver = self.subscribe();
            let outcome = receiver
                .wait_for(|state| state.is_terminal())
                .await
                .map(|state| *state);
            return outcome.unwrap_or_else(|_| self.state());
        }

        let mut trace = HandshakeSpan::new(&self.base_url);
        let span = trace.span();
        let outcome = self.drive(&mut trace).instrument(span).await;
        trace.on_outcome(outcome);
        trace.on_end();

        info!(outcome = outcome.as_str(), "session handshake finished");
        self.state.send_replace(outcome);
        outcome
    }

    async fn drive(&self, trace: &mut HandshakeSpan) -> AuthState {
        let mut phase = SessionPhase::Init;
        loop {
            if let Some(state) = phase.terminal_state() {
                return state;
            }
            let from = phase.name();
            phase = self.advance(phase, trace).await;
            debug!(from, to = phase.name(), "session transition");
        }
    }

    /// Perform one transition of the table documented on [`SessionPhase`].
    async fn advance(&self, phase: SessionPhase, trace: &mut HandshakeSpan) -> SessionPhase {
        match phase {
            SessionPhase::Init => match self.cached_public_key() {
                Some(public_key) => {
                    trace.on_key_source("cache");
                    SessionPhase::KeyReady { public_key }
                }
                None => SessionPhase::FetchingKey,
            },
            SessionPhase::FetchingKey => match self.fetch_public_key().await {
                Ok(public_key) => {
                    trace.on_key_source("network");
                    SessionPhase::KeyReady { public_key }
                }
                Err(error) => {
                    error!(%error, "failed to fetch public key");
                    trace.on_error(&error);
                    SessionPhase::Failed
                }
            },
            SessionPhase::KeyReady { public_key } => {
                match self.store.get(AUTH_TOKEN_KEY).filter(|t| !t.is_empty()) {
                    Some(token) => SessionPhase::Validating { public_key, token },
                    None => SessionPhase::Authenticating { public_key },
                }
            }
            SessionPhase::Validating { public_key, token } => {
                trace.on_validate();
                match self.api.validate_token(&token).await {
                    Ok(()) => SessionPhase::Authenticated,
                    Err(error) => {
                        warn!(%error, "cached token rejected, logging in again");
                        SessionPhase::Authenticating { public_key }
                    }
                }
            }
            SessionPhase::Authenticating { public_key } => {
                trace.on_login();
                match self.login(&public_key).await {
                    Ok(token) => {
                        self.store.set(AUTH_TOKEN_KEY, token);
                        SessionPhase::Authenticated
                    }
                    Err(error) => {
                        error!(%error, "login failed");
                        trace.on_error(&error);
                        SessionPhase::Failed
                    }
                }
            }
            terminal @ (SessionPhase::Authenticated | SessionPhase::Failed) => terminal,
        }
    }

    /// The cached key, if there is one that still decodes. An undecodable
    /// entry is dropped so the key is fetched again.
    fn cached_public_key(&self) -> Option<Vec<u8>> {
        let pem = self.store.get(PUBLIC_KEY_KEY)?;
        match pem_to_der(&pem) {
            Ok(der) if !der.is_empty() => Some(der),
            Ok(_) => {
                self.store.remove(PUBLIC_KEY_KEY);
                None
            }
            Err(error) => {
                warn!(%error, "discarding undecodable cached public key");
                self.store.remove(PUBLIC_KEY_KEY);
                None
            }
        }
    }

    async fn fetch_public_key(&self) -> SessionResult<Vec<u8>> {
        let response = self.api.fetch_public_key().await?;
        let pem = response
            .public_key
            .filter(|pem| !pem.trim().is_empty())
            .ok_or_else(|| {
                SessionError::Invariant("public_key", "response has no publicKey".to_string())
            })?;
        let der = pem_to_der(&pem)?;
        self.store.set(PUBLIC_KEY_KEY, pem);
        Ok(der)
    }

    async fn login(&self, public_key: &[u8]) -> SessionResult<String> {
        let (username, password) = self.credentials.require()?;
        if public_key.is_empty() {
            return Err(SessionError::MissingPublicKey);
        }

        let password = encrypt_password(public_key, password)?;
        let response = self
            .api
            .login(LoginRequest {
                username: username.to_string(),
                password,
            })
            .await?;

        response
            .token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| SessionError::Invariant("login", "response has no token".to_string()))
    }
}
