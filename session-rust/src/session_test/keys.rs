use crate::{pem::decode_base64, SessionError, SessionResult};
use rsa::{
    pkcs8::{EncodePublicKey, LineEnding},
    Oaep, RsaPrivateKey, RsaPublicKey,
};
use sha2::Sha256;
use std::sync::OnceLock;

const TEST_KEY_BITS: usize = 1024;

/// An RSA key pair standing in for the server side of the handshake.
pub struct TestKeyPair {
    private_key: RsaPrivateKey,
    der: Vec<u8>,
    pem: String,
}

impl TestKeyPair {
    pub fn generate() -> SessionResult<Self> {
        let private_key = RsaPrivateKey::new(&mut rand::thread_rng(), TEST_KEY_BITS)?;
        let public_key = RsaPublicKey::from(&private_key);
        let der = public_key
            .to_public_key_der()
            .map_err(|error| SessionError::KeyImport(error.to_string()))?
            .as_bytes()
            .to_vec();
        let pem = public_key
            .to_public_key_pem(LineEnding::LF)
            .map_err(|error| SessionError::KeyImport(error.to_string()))?;
        Ok(Self {
            private_key,
            der,
            pem,
        })
    }

    /// A process-wide key pair, generated on first use.
    pub fn shared() -> &'static Self {
        static KEYS: OnceLock<TestKeyPair> = OnceLock::new();
        KEYS.get_or_init(|| Self::generate().expect("failed to generate test key pair"))
    }

    pub fn der(&self) -> &[u8] {
        &self.der
    }

    pub fn pem(&self) -> &str {
        &self.pem
    }

    /// Decrypt a base64 RSA-OAEP/SHA-256 ciphertext back into the password.
    pub fn decrypt_password(&self, ciphertext: &str) -> SessionResult<String> {
        let plaintext = self
            .private_key
            .decrypt(Oaep::new::<Sha256>(), &decode_base64(ciphertext)?)?;
        String::from_utf8(plaintext)
            .map_err(|error| SessionError::Invariant("test_keys", error.to_string()))
    }
}
