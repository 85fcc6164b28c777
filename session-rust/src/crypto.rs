use crate::{pem::encode_base64, SessionError, SessionResult};
use rsa::{pkcs8::DecodePublicKey, Oaep, RsaPublicKey};
use sha2::Sha256;

/// Import raw SPKI bytes as an RSA public key.
pub fn import_public_key(spki_der: &[u8]) -> SessionResult<RsaPublicKey> {
    RsaPublicKey::from_public_key_der(spki_der)
        .map_err(|error| SessionError::KeyImport(error.to_string()))
}

/// Encrypt a password with RSA-OAEP (SHA-256 for both the hash and MGF1, no
/// label) and return the base64 ciphertext.
///
/// This matches what Web Crypto produces for
/// `{ name: "RSA-OAEP", hash: "SHA-256" }`.
pub fn encrypt_password(spki_der: &[u8], password: &str) -> SessionResult<String> {
    let key = import_public_key(spki_der)?;
    let ciphertext = key.encrypt(
        &mut rand::thread_rng(),
        Oaep::new::<Sha256>(),
        password.as_bytes(),
    )?;
    Ok(encode_base64(&ciphertext))
}
