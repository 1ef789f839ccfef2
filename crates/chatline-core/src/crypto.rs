// crates/chatline-core/src/crypto.rs

use rand::rngs::OsRng;
use rand::RngCore;
use uuid::Uuid;

/// Number of random bytes in a session token (hex encoded on the wire).
pub const TOKEN_BYTES: usize = 32;

/// Generate a fresh opaque session token.
///
/// Returns `TOKEN_BYTES` bytes from the OS CSPRNG, hex encoded.
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Generate a fresh identifier for a room or channel (UUID v7, time-sortable).
pub fn new_entity_id() -> String {
    Uuid::now_v7().to_string()
}

/// Compare two tokens without short-circuiting on the first differing byte.
pub fn tokens_match(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
