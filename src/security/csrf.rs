//! CSRF tokens: 32 random bytes, hex encoded.

use rand::RngCore;
use subtle::ConstantTimeEq;

/// Hex length of a token (32 bytes).
pub const CSRF_TOKEN_LEN: usize = 64;

/// Header carrying the session copy of the token.
pub const CSRF_HEADER: &str = "x-csrf-token";

/// Body field carrying the submitted token.
pub const CSRF_FIELD: &str = "_csrf";

pub fn generate_csrf_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// The submitted token must be exactly 64 characters and equal to the
/// session token.
pub fn validate_csrf_token(token: &str, session_token: &str) -> bool {
    token.len() == CSRF_TOKEN_LEN && bool::from(token.as_bytes().ct_eq(session_token.as_bytes()))
}
