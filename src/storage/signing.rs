//! Signed, expiring URLs for stored objects.
use chrono::Utc;
use url::Url;

use crate::utils::md5;

/// Produces and checks `expires`/`signature` query pairs for object URLs.
#[derive(Debug, Clone)]
pub struct UrlSigner {
    /// Public URL under which objects are served.
    base_url: Url,
    /// Shared secret mixed into every signature.
    secret: String,
    /// Lifetime of a signed URL in seconds.
    ttl_secs: i64,
}

impl UrlSigner {
    /// Create a signer.
    ///
    /// # Errors
    /// Errors if `base_url` is not an absolute URL.
    pub fn new(base_url: &str, secret: &str, ttl_secs: i64) -> anyhow::Result<Self> {
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            base_url,
            secret: secret.to_owned(),
            ttl_secs,
        })
    }

    /// HMAC signature of `key` valid until `expires` (unix seconds).
    fn signature(&self, key: &str, expires: i64) -> String {
        md5::hmac(&self.secret, format!("{key}:{expires}"))
    }

    /// Sign `key` for `ttl_secs` from `now` (unix seconds).
    ///
    /// # Errors
    /// Errors if the key cannot be joined onto the base URL.
    pub fn sign_at(&self, key: &str, now: i64) -> anyhow::Result<String> {
        let expires = now + self.ttl_secs;
        let mut url = self.base_url.join(key)?;
        url.query_pairs_mut()
            .append_pair("expires", &expires.to_string())
            .append_pair("signature", &self.signature(key, expires));
        Ok(url.to_string())
    }

    /// Sign `key` from the current time.
    ///
    /// # Errors
    /// Errors if the key cannot be joined onto the base URL.
    pub fn sign(&self, key: &str) -> anyhow::Result<String> {
        self.sign_at(key, Utc::now().timestamp())
    }

    /// Whether `signature` is valid for `key` and has not expired at `now`.
    #[must_use]
    pub fn verify_at(&self, key: &str, expires: i64, signature: &str, now: i64) -> bool {
        expires >= now && md5::digest_eq(&self.signature(key, expires), signature)
    }

    /// Whether `signature` is valid for `key` right now.
    #[must_use]
    pub fn verify(&self, key: &str, expires: i64, signature: &str) -> bool {
        self.verify_at(key, expires, signature, Utc::now().timestamp())
    }
}
