//! XOR keystream cipher over a cycled shared key.
//!
//! Messages longer than the key reuse it cyclically, so the construction is
//! one-time-pad-strength only up to the key length. That matches what the
//! key sizes from a QKD run can support and keeps the cipher involutive:
//! applying it twice with the same key returns the input.

use crate::error::{SimError, SimResult};

/// XORs `data` against `key` repeated to length.
pub fn keystream_xor(key: &[u8], data: &[u8]) -> SimResult<Vec<u8>> {
    if key.is_empty() {
        return Err(SimError::InvalidParameter("cipher key is empty".into()));
    }
    Ok(data
        .iter()
        .zip(key.iter().cycle())
        .map(|(d, k)| d ^ k)
        .collect())
}
