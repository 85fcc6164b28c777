use crate::{
    api::{AuthApi, LoginRequest, LoginResponse, PublicKeyResponse},
    SessionError, SessionResult,
};
use std::{collections::VecDeque, sync::Mutex};

#[derive(Default)]
struct MockAuthApiState {
    mocked_public_key_results: VecDeque<SessionResult<PublicKeyResponse>>,
    mocked_login_results: VecDeque<SessionResult<LoginResponse>>,
    mocked_validate_results: VecDeque<SessionResult<()>>,
    tracked_public_key_calls: usize,
    tracked_login_requests: Vec<LoginRequest>,
    tracked_validate_tokens: Vec<String>,
}

/// A mock auth API that tracks calls and yields predefined results, one per
/// call, in the order they were enqueued.
///
/// A call with nothing enqueued fails with an `Invariant` error.
#[derive(Default)]
pub struct MockAuthApi {
    state: Mutex<MockAuthApiState>,
}

impl MockAuthApi {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue_public_key(&self, result: SessionResult<PublicKeyResponse>) -> &Self {
        let mut state = self.state.lock().expect("mock state poisoned");
        state.mocked_public_key_results.push_back(result);
        drop(state);
        self
    }

    pub fn enqueue_login(&self, result: SessionResult<LoginResponse>) -> &Self {
        let mut state = self.state.lock().expect("mock state poisoned");
        state.mocked_login_results.push_back(result);
        drop(state);
        self
    }

    pub fn enqueue_validate(&self, result: SessionResult<()>) -> &Self {
        let mut state = self.state.lock().expect("mock state poisoned");
        state.mocked_validate_results.push_back(result);
        drop(state);
        self
    }

    pub fn tracked_public_key_calls(&self) -> usize {
        self.state
            .lock()
            .expect("mock state poisoned")
            .tracked_public_key_calls
    }

    pub fn tracked_login_requests(&self) -> Vec<LoginRequest> {
        self.state
            .lock()
            .expect("mock state poisoned")
            .tracked_login_requests
            .clone()
    }

    pub fn tracked_validate_tokens(&self) -> Vec<String> {
        self.state
            .lock()
            .expect("mock state poisoned")
            .tracked_validate_tokens
            .clone()
    }
}

fn exhausted(endpoint: &str) -> SessionError {
    SessionError::Invariant("mock", format!("no mocked {endpoint} results available"))
}

#[async_trait::async_trait]
impl AuthApi for MockAuthApi {
    async fn fetch_public_key(&self) -> SessionResult<PublicKeyResponse> {
        let mut state = self.state.lock().expect("mock state poisoned");
        state.tracked_public_key_calls += 1;
        state
            .mocked_public_key_results
            .pop_front()
            .unwrap_or_else(|| Err(exhausted("public_key")))
    }

    async fn login(&self, request: LoginRequest) -> SessionResult<LoginResponse> {
        let mut state = self.state.lock().expect("mock state poisoned");
        state.tracked_login_requests.push(request);
        state
            .mocked_login_results
            .pop_front()
            .unwrap_or_else(|| Err(exhausted("login")))
    }

    async fn validate_token(&self, token: &str) -> SessionResult<()> {
        let mut state = self.state.lock().expect("mock state poisoned");
        state.tracked_validate_tokens.push(token.to_string());
        state
            .mocked_validate_results
            .pop_front()
            .unwrap_or_else(|| Err(exhausted("validate_token")))
    }
}
