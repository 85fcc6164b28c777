use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use portfolio_data::{PortfolioContext, PortfolioSnapshot};
use portfolio_session::{
    api::{LoginRequest, ValidateTokenRequest},
    session_test::TestKeyPair,
    AuthState, Credentials, KeyValueStore, MemoryStore, SessionOptions, AUTH_TOKEN_KEY,
    PUBLIC_KEY_KEY,
};
use serde_json::{json, Value};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use tokio::{net::TcpListener, sync::oneshot};

type BoxedError = Box<dyn std::error::Error + Send + Sync>;

const USERNAME: &str = "portfolio-reader";
const PASSWORD: &str = "correct horse battery staple";
const ISSUED_TOKEN: &str = "token-abc";

#[derive(Default)]
struct Calls {
    public_key: AtomicUsize,
    login: AtomicUsize,
    validate: AtomicUsize,
    blogs: AtomicUsize,
}

struct StubState {
    keys: &'static TestKeyPair,
    fail_blogs: bool,
    calls: Calls,
}

struct StubServer {
    url: String,
    state: Arc<StubState>,
    shutdown: Option<oneshot::Sender<()>>,
    handle: tokio::task::JoinHandle<()>,
}

impl StubServer {
    fn options(&self, password: &str) -> SessionOptions {
        SessionOptions::new(self.url.clone(), Credentials::new(USERNAME, password))
    }

    fn calls(&self) -> &Calls {
        &self.state.calls
    }

    async fn stop(self) -> Result<(), BoxedError> {
        if let Some(tx) = self.shutdown {
            let _ = tx.send(());
        }
        self.handle
            .await
            .map_err(|err| format!("Failed to join stub API server task: {err}"))?;
        Ok(())
    }
}

async fn public_key(State(state): State<Arc<StubState>>) -> Json<Value> {
    state.calls.public_key.fetch_add(1, Ordering::SeqCst);
    Json(json!({ "publicKey": state.keys.pem() }))
}

async fn login(
    State(state): State<Arc<StubState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<Value>, StatusCode> {
    state.calls.login.fetch_add(1, Ordering::SeqCst);
    let password = state
        .keys
        .decrypt_password(&request.password)
        .map_err(|_| StatusCode::BAD_REQUEST)?;
    if request.username == USERNAME && password == PASSWORD {
        Ok(Json(json!({ "token": ISSUED_TOKEN })))
    } else {
        Err(StatusCode::UNAUTHORIZED)
    }
}

async fn validate_token(
    State(state): State<Arc<StubState>>,
    Json(request): Json<ValidateTokenRequest>,
) -> StatusCode {
    state.calls.validate.fetch_add(1, Ordering::SeqCst);
    if request.token == ISSUED_TOKEN {
        StatusCode::OK
    } else {
        StatusCode::UNAUTHORIZED
    }
}

async fn blogs(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
) -> Result<Json<Value>, StatusCode> {
    state.calls.blogs.fetch_add(1, Ordering::SeqCst);
    if state.fail_blogs {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    let authorized = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        == Some(format!("Bearer {ISSUED_TOKEN}").as_str());
    if !authorized {
        return Err(StatusCode::UNAUTHORIZED);
    }
    Ok(Json(json!({
        "blogs": [
            {
                "type_of": "article",
                "id": 9001,
                "title": "Served over HTTP",
                "description": "Fetched with a bearer token",
                "cover_image": "https://example.com/cover.png",
                "published_at": "2024-07-04T10:00:00Z",
                "url": "https://dev.to/example/served-over-http",
                "tag_list": ["rust"],
                "reading_time_minutes": 3
            }
        ]
    })))
}

async fn start_stub_api_server(fail_blogs: bool) -> Result<StubServer, BoxedError> {
    let state = Arc::new(StubState {
        keys: TestKeyPair::shared(),
        fail_blogs,
        calls: Calls::default(),
    });

    let app = Router::new()
        .route("/api/v1/auth/public_key", get(public_key))
        .route("/api/v1/auth/login", post(login))
        .route("/api/v1/auth/validate_token", post(validate_token))
        .route("/api/v1/portfolio/blogs", get(blogs))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let url = format!("http://{addr}");

    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let handle = tokio::spawn(async move {
        let server = axum::serve(listener, app).with_graceful_shutdown(async {
            let _ = shutdown_rx.await;
        });

        if let Err(err) = server.await {
            eprintln!("Stub API server error: {err}");
        }
    });

    Ok(StubServer {
        url,
        state,
        shutdown: Some(shutdown_tx),
        handle,
    })
}

#[tokio::test]
async fn handshake_and_blogs_over_http() -> Result<(), BoxedError> {
    let stub = start_stub_api_server(false).await?;
    let cache = Arc::new(MemoryStore::new());
    let context = PortfolioContext::from_options(stub.options(PASSWORD), cache.clone())?;

    assert_eq!(context.start().await?, AuthState::Authenticated);

    assert_eq!(cache.get(AUTH_TOKEN_KEY).as_deref(), Some(ISSUED_TOKEN));
    assert_eq!(
        cache.get(PUBLIC_KEY_KEY).as_deref(),
        Some(TestKeyPair::shared().pem())
    );
    let snapshot = context.portfolio_data()?;
    assert_eq!(snapshot.blogs.len(), 1);
    assert_eq!(snapshot.blogs[0].id, 9001);
    assert_eq!(
        snapshot.blogs[0].cover_image.as_deref(),
        Some("https://example.com/cover.png")
    );

    assert_eq!(stub.calls().public_key.load(Ordering::SeqCst), 1);
    assert_eq!(stub.calls().login.load(Ordering::SeqCst), 1);
    assert_eq!(stub.calls().validate.load(Ordering::SeqCst), 0);
    assert_eq!(stub.calls().blogs.load(Ordering::SeqCst), 1);

    stub.stop().await
}

#[tokio::test]
async fn stale_cached_token_falls_back_to_login() -> Result<(), BoxedError> {
    let stub = start_stub_api_server(false).await?;
    let cache = Arc::new(MemoryStore::with_entries([
        (PUBLIC_KEY_KEY, TestKeyPair::shared().pem()),
        (AUTH_TOKEN_KEY, "expired-token"),
    ]));
    let context = PortfolioContext::from_options(stub.options(PASSWORD), cache.clone())?;

    assert_eq!(context.start().await?, AuthState::Authenticated);

    assert_eq!(cache.get(AUTH_TOKEN_KEY).as_deref(), Some(ISSUED_TOKEN));
    assert_eq!(stub.calls().public_key.load(Ordering::SeqCst), 0);
    assert_eq!(stub.calls().validate.load(Ordering::SeqCst), 1);
    assert_eq!(stub.calls().login.load(Ordering::SeqCst), 1);
    assert_eq!(stub.calls().blogs.load(Ordering::SeqCst), 1);

    stub.stop().await
}

#[tokio::test]
async fn valid_cached_token_skips_login_over_http() -> Result<(), BoxedError> {
    let stub = start_stub_api_server(false).await?;
    let cache = Arc::new(MemoryStore::with_entries([
        (PUBLIC_KEY_KEY, TestKeyPair::shared().pem()),
        (AUTH_TOKEN_KEY, ISSUED_TOKEN),
    ]));
    let context = PortfolioContext::from_options(stub.options(PASSWORD), cache)?;

    assert_eq!(context.start().await?, AuthState::Authenticated);
    assert_eq!(stub.calls().validate.load(Ordering::SeqCst), 1);
    assert_eq!(stub.calls().login.load(Ordering::SeqCst), 0);

    stub.stop().await
}

#[tokio::test]
async fn rejected_login_keeps_bundled_blogs() -> Result<(), BoxedError> {
    let stub = start_stub_api_server(false).await?;
    let cache = Arc::new(MemoryStore::new());
    let context = PortfolioContext::from_options(stub.options("wrong"), cache.clone())?;

    assert_eq!(context.start().await?, AuthState::Failed);

    assert_eq!(cache.get(AUTH_TOKEN_KEY), None);
    assert_eq!(stub.calls().blogs.load(Ordering::SeqCst), 0);
    assert_eq!(*context.portfolio_data()?, PortfolioSnapshot::bundled());

    stub.stop().await
}

#[tokio::test]
async fn blogs_server_error_keeps_bundled_blogs() -> Result<(), BoxedError> {
    let stub = start_stub_api_server(true).await?;
    let context =
        PortfolioContext::from_options(stub.options(PASSWORD), Arc::new(MemoryStore::new()))?;

    assert_eq!(context.start().await?, AuthState::Authenticated);
    assert_eq!(stub.calls().blogs.load(Ordering::SeqCst), 1);
    assert_eq!(*context.portfolio_data()?, PortfolioSnapshot::bundled());

    stub.stop().await
}

#[tokio::test]
async fn unreachable_server_fails_without_panicking() -> Result<(), BoxedError> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let url = format!("http://{}", listener.local_addr()?);
    drop(listener);

    let context = PortfolioContext::from_options(
        SessionOptions::new(url, Credentials::new(USERNAME, PASSWORD)),
        Arc::new(MemoryStore::new()),
    )?;

    assert_eq!(context.start().await?, AuthState::Failed);
    Ok(())
}
