pub mod api;
pub mod client_utils;
mod crypto;
mod errors;
mod opentelemetry;
pub mod pem;
mod options;
mod session;
pub mod session_test;
mod store;

pub use api::{AuthApi, HttpAuthApi};
pub use crypto::{encrypt_password, import_public_key};
pub use errors::*;
pub use options::{
    Credentials, SessionOptions, BASE_URL_ENV, PASSWORD_ENV, REQUEST_TIMEOUT_ENV, USERNAME_ENV,
};
pub use session::{AuthState, SessionManager, SessionPhase};
pub use store::{KeyValueStore, MemoryStore, AUTH_TOKEN_KEY, PUBLIC_KEY_KEY};
