use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Signs and verifies session cookie values with a server secret.
///
/// Tokens have the form `"{value}|{hex_hmac}"`. There is no server-side
/// session table: the signature alone makes the cookie tamper-evident.
#[derive(Clone)]
pub struct SessionKeeper {
    secret: String,
}

impl SessionKeeper {
    /// The secret must come from configuration at startup, never a literal.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Sign a value, producing `"{value}|{hex_hmac}"`.
    pub fn seal(&self, value: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .expect("HMAC accepts keys of any length");
        mac.update(value.as_bytes());

        format!("{}|{}", value, hex::encode(mac.finalize().into_bytes()))
    }

    /// Recover the value from a sealed token, or None if the token is
    /// malformed or fails verification. Never panics on hostile input.
    ///
    /// The check re-seals the extracted value and compares against the whole
    /// presented token, so a valid signature lifted from a different value
    /// is rejected along with any tampering.
    pub fn unseal(&self, token: &str) -> Option<String> {
        let (value, _sig) = token.split_once('|')?;

        if self.seal(value) == token {
            Some(value.to_string())
        } else {
            None
        }
    }
}
