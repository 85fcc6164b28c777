//! PEM and base64 helpers for SubjectPublicKeyInfo key material.
//!
//! The `base64` engine is pure Rust, so the same path serves native
//! builds, wasm targets and tests alike.

use crate::SessionResult;
use base64::{engine::general_purpose::STANDARD, Engine as _};

const PEM_HEADER: &str = "-----BEGIN PUBLIC KEY-----";
const PEM_FOOTER: &str = "-----END PUBLIC KEY-----";
const PEM_LINE_WIDTH: usize = 64;

/// Strip the public-key delimiters and all whitespace from a PEM string and
/// decode the remainder into raw SPKI bytes.
pub fn pem_to_der(pem: &str) -> SessionResult<Vec<u8>> {
    let body = pem.replacen(PEM_HEADER, "", 1).replacen(PEM_FOOTER, "", 1);
    let body: String = body.chars().filter(|c| !c.is_whitespace()).collect();
    decode_base64(&body)
}

/// Wrap raw SPKI bytes in a PEM public-key block with 64-column lines.
#[must_use]
pub fn der_to_pem(der: &[u8]) -> String {
    let encoded = encode_base64(der);
    let mut pem = String::with_capacity(encoded.len() + encoded.len() / PEM_LINE_WIDTH + 64);
    pem.push_str(PEM_HEADER);
    pem.push('\n');
    let mut rest = encoded.as_str();
    while !rest.is_empty() {
        // base64 output is ASCII, so any byte index is a char boundary
        let (line, tail) = rest.split_at(rest.len().min(PEM_LINE_WIDTH));
        pem.push_str(line);
        pem.push('\n');
        rest = tail;
    }
    pem.push_str(PEM_FOOTER);
    pem.push('\n');
    pem
}

#[must_use]
pub fn encode_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

pub fn decode_base64(encoded: &str) -> SessionResult<Vec<u8>> {
    Ok(STANDARD.decode(encoded)?)
}
