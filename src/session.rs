//! Session values captured during provisioning.
//!
//! Nothing here is persisted: a power cycle starts a fresh session.

use core::fmt;

use log::warn;

/// Maximum network name length (802.11 SSID).
pub const MAX_NAME_LEN: usize = 32;
/// Maximum network secret length (WPA2 passphrase / PSK hex).
pub const MAX_SECRET_LEN: usize = 64;
/// Capacity of a captured identity response.
pub const MAX_IDENTITY_LEN: usize = 64;

/// Split point inside a credential payload.
const DELIMITER: char = ':';

// ───────────────────────────────────────────────────────────────
// One-shot input token
// ───────────────────────────────────────────────────────────────

/// A value raised by an input source and consumed by exactly one
/// transition.  Raising again before consumption overwrites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputToken<T>(Option<T>);

impl<T> Default for InputToken<T> {
    fn default() -> Self {
        Self(None)
    }
}

impl<T> InputToken<T> {
    pub const fn empty() -> Self {
        Self(None)
    }

    pub fn raise(&mut self, value: T) {
        self.0 = Some(value);
    }

    /// Consume the token.  Subsequent calls return `None` until raised again.
    pub fn take(&mut self) -> Option<T> {
        self.0.take()
    }

    pub fn is_raised(&self) -> bool {
        self.0.is_some()
    }
}

// ───────────────────────────────────────────────────────────────
// Credential pair
// ───────────────────────────────────────────────────────────────

/// Network credentials delivered by the pairing peer.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialPair {
    pub name: heapless::String<MAX_NAME_LEN>,
    pub secret: heapless::String<MAX_SECRET_LEN>,
}

impl fmt::Debug for CredentialPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialPair")
            .field("name", &self.name)
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl CredentialPair {
    /// Parse a `<name>:<secret>` payload, splitting at the first colon.
    ///
    /// Returns `None` for anything malformed: empty, not UTF-8, no
    /// delimiter, or a field longer than its capacity.
    pub fn parse(payload: &[u8]) -> Option<Self> {
        if payload.is_empty() {
            return None;
        }
        let text = core::str::from_utf8(payload).ok()?;
        let (name, secret) = text.split_once(DELIMITER)?;

        let mut pair = Self {
            name: heapless::String::new(),
            secret: heapless::String::new(),
        };
        pair.name.push_str(name).ok()?;
        pair.secret.push_str(secret).ok()?;
        Some(pair)
    }
}

// ───────────────────────────────────────────────────────────────
// Device identity
// ───────────────────────────────────────────────────────────────

/// The modem's hardware identity as captured from the identity query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceIdentity(heapless::String<MAX_IDENTITY_LEN>);

impl DeviceIdentity {
    /// Validate a raw response blob.  The blob is trimmed of ASCII
    /// whitespace and accepted when at least `min_len` bytes remain.
    pub fn from_response(raw: &[u8], min_len: usize) -> Option<Self> {
        let trimmed = raw.trim_ascii();
        if trimmed.len() < min_len {
            return None;
        }

        let mut id = heapless::String::new();
        for &b in trimmed {
            let c = if b.is_ascii() { b as char } else { '?' };
            if id.push(c).is_err() {
                warn!("Identity: response truncated to {} bytes", MAX_IDENTITY_LEN);
                break;
            }
        }
        Some(Self(id))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for DeviceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}
