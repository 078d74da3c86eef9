//! Utility functions for `md5` digests, used to sign object URLs.
use md5::{Digest, Md5};

/// Compute the `md5` digest of a string.
///
/// The result is a hexadecimal string of 32 characters.
#[must_use]
pub fn compute(data: impl AsRef<[u8]>) -> String {
    let mut hasher = Md5::new();
    hasher.update(data);
    let result = hasher.finalize();
    format!("{result:x}")
}

/// Block size of `md5` in bytes.
const BLOCK_SIZE: usize = 64;

/// Compute the HMAC-MD5 (RFC 2104) of `data` under `key`, as hex.
#[must_use]
pub fn hmac(key: impl AsRef<[u8]>, data: impl AsRef<[u8]>) -> String {
    let key = key.as_ref();
    let mut block = [0_u8; BLOCK_SIZE];
    if key.len() > BLOCK_SIZE {
        block[..16].copy_from_slice(&Md5::digest(key));
    } else {
        block[..key.len()].copy_from_slice(key);
    }
    let mut inner = Md5::new();
    inner.update(block.map(|byte| byte ^ 0x36));
    inner.update(data);
    let mut outer = Md5::new();
    outer.update(block.map(|byte| byte ^ 0x5c));
    outer.update(inner.finalize());
    format!("{:x}", outer.finalize())
}

/// Compare two digests in time independent of where they first differ.
#[must_use]
pub fn digest_eq(left: &str, right: &str) -> bool {
    left.len() == right.len()
        && left
            .bytes()
            .zip(right.bytes())
            .fold(0_u8, |diff, (a, b)| diff | (a ^ b))
            == 0
}
