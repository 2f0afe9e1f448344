//! Stateless session tokens.
//!
//! A token is `payload.signature`: the payload is a base64url encoding of
//! `{account_id}:{issued_at_ms}` and the signature is HMAC-SHA256 over the
//! encoded payload bytes, keyed by a process-wide secret. Verification is
//! pure computation — no session table, no I/O — so any node holding the
//! secret can validate any token.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Separator between payload and signature
const TOKEN_SEPARATOR: char = '.';

/// Process-wide token signing secret, injected at startup.
#[derive(Clone)]
pub struct SessionSecret(Vec<u8>);

impl SessionSecret {
    /// Use an explicitly configured secret, or generate a random one when
    /// none is configured. A generated secret invalidates all previously
    /// issued tokens on restart; `Config::validate` warns about this.
    pub fn from_config(configured: Option<&str>) -> Self {
        match configured {
            Some(secret) => Self(secret.as_bytes().to_vec()),
            None => {
                let mut rng = rand::thread_rng();
                let bytes: [u8; 32] = rng.gen();
                Self(bytes.to_vec())
            }
        }
    }
}

/// The identity claim carried inside a valid token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionClaim {
    pub account_id: u64,
    pub issued_at: DateTime<Utc>,
}

/// Signs and verifies session tokens.
pub struct SessionCodec {
    secret: SessionSecret,
    ttl_seconds: u64,
}

impl SessionCodec {
    pub fn new(secret: SessionSecret, ttl_seconds: u64) -> Self {
        Self {
            secret,
            ttl_seconds,
        }
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    /// Issue a signed token for an account.
    pub fn issue(&self, account_id: u64, now: DateTime<Utc>) -> String {
        let payload = URL_SAFE_NO_PAD.encode(format!("{}:{}", account_id, now.timestamp_millis()));
        let signature = self.sign(payload.as_bytes());
        format!("{payload}{TOKEN_SEPARATOR}{signature}")
    }

    /// Verify a token, returning the claim when the signature matches, the
    /// payload is structurally valid, and the TTL has not elapsed.
    ///
    /// The MAC check runs before the payload is decoded, and the comparison
    /// is constant-time (`Mac::verify_slice`) so signature bytes cannot be
    /// probed through timing.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Option<SessionClaim> {
        let (payload, signature) = token.split_once(TOKEN_SEPARATOR)?;

        let received_sig = hex::decode(signature).ok()?;
        let mut mac = HmacSha256::new_from_slice(&self.secret.0).ok()?;
        mac.update(payload.as_bytes());
        mac.verify_slice(&received_sig).ok()?;

        // Signature is authentic; only now look inside the payload
        let decoded = URL_SAFE_NO_PAD.decode(payload).ok()?;
        let decoded = String::from_utf8(decoded).ok()?;
        let (account_id, issued_ms) = decoded.split_once(':')?;

        let account_id: u64 = account_id.parse().ok()?;
        if account_id == 0 {
            return None;
        }
        let issued_ms: i64 = issued_ms.parse().ok()?;
        let issued_at = DateTime::from_timestamp_millis(issued_ms)?;

        let age_ms = now.timestamp_millis().saturating_sub(issued_ms);
        if age_ms > (self.ttl_seconds as i64).saturating_mul(1000) {
            return None;
        }

        Some(SessionClaim {
            account_id,
            issued_at,
        })
    }

    fn sign(&self, payload: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(&self.secret.0)
            .expect("HMAC accepts keys of any length");
        mac.update(payload);
        hex::encode(mac.finalize().into_bytes())
    }
}
