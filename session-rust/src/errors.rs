use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    /// The service username or password is not configured.
    #[error("Missing credentials: {0}")]
    MissingCredentials(&'static str),
    /// Encryption was attempted before a public key was available.
    #[error("Public key is not available")]
    MissingPublicKey,
    /// The PEM body is not valid base64.
    #[error("Invalid PEM: {0}")]
    InvalidPem(#[from] base64::DecodeError),
    /// The decoded key bytes are not an RSA SubjectPublicKeyInfo.
    #[error("Key import error: {0}")]
    KeyImport(String),
    #[error("Encryption error: {0}")]
    Encryption(#[from] rsa::Error),
    /// The request to the API failed or the parsing of the response
    /// failed.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The request returns a non-OK status code
    #[error("Status error: {1} (Status {0})")]
    StatusCode(reqwest::StatusCode, String),
    /// The response was successful but did not carry a field the flow
    /// depends on (e.g. no `token` in a login response).
    #[error("Invariant from {0}: {1}")]
    Invariant(&'static str, String),
}

pub type SessionResult<T> = Result<T, SessionError>;
