use crate::{client_utils, SessionError, SessionOptions, SessionResult};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

pub const PUBLIC_KEY_PATH: &str = "/api/v1/auth/public_key";
pub const LOGIN_PATH: &str = "/api/v1/auth/login";
pub const VALIDATE_TOKEN_PATH: &str = "/api/v1/auth/validate_token";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKeyResponse {
    /// PEM-encoded SPKI public key.
    #[serde(rename = "publicKey", default)]
    pub public_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    /// Base64 RSA-OAEP ciphertext of the password.
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidateTokenRequest {
    pub token: String,
}

/// The three auth endpoints the handshake talks to.
#[async_trait::async_trait]
pub trait AuthApi: Send + Sync {
    /// `GET /api/v1/auth/public_key`
    async fn fetch_public_key(&self) -> SessionResult<PublicKeyResponse>;
    /// `POST /api/v1/auth/login`
    async fn login(&self, request: LoginRequest) -> SessionResult<LoginResponse>;
    /// `POST /api/v1/auth/validate_token`. `Ok` only for HTTP 200.
    async fn validate_token(&self, token: &str) -> SessionResult<()>;
}

pub struct HttpAuthApi {
    options: SessionOptions,
    client: Client,
}

impl HttpAuthApi {
    pub fn new(options: SessionOptions) -> SessionResult<Self> {
        let client = build_client(&options)?;
        Ok(Self { options, client })
    }
}

/// Build a reqwest client honoring the configured timeout, if any.
pub fn build_client(options: &SessionOptions) -> SessionResult<Client> {
    let mut builder = Client::builder();
    if let Some(timeout) = options.timeout {
        builder = builder.timeout(timeout);
    }
    Ok(builder.build()?)
}

#[async_trait::async_trait]
impl AuthApi for HttpAuthApi {
    async fn fetch_public_key(&self) -> SessionResult<PublicKeyResponse> {
        client_utils::get_json(&self.client, &self.options.endpoint(PUBLIC_KEY_PATH), None).await
    }

    async fn login(&self, request: LoginRequest) -> SessionResult<LoginResponse> {
        client_utils::send_json(&self.client, &self.options.endpoint(LOGIN_PATH), &request).await
    }

    async fn validate_token(&self, token: &str) -> SessionResult<()> {
        let status = client_utils::send_for_status(
            &self.client,
            &self.options.endpoint(VALIDATE_TOKEN_PATH),
            &ValidateTokenRequest {
                token: token.to_string(),
            },
        )
        .await?;

        if status == StatusCode::OK {
            Ok(())
        } else {
            Err(SessionError::StatusCode(
                status,
                "token validation rejected".to_string(),
            ))
        }
    }
}
