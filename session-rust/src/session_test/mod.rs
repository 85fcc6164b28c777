//! Test doubles for code built on top of the session handshake.

mod auth_api;
mod keys;

pub use auth_api::MockAuthApi;
pub use keys::TestKeyPair;
