use rand::Rng;
use sha2::{Digest, Sha256};

use quill_types::models::User;

const SALT_LEN: usize = 5;
const SALT_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Generate a short random salt of ASCII letters.
pub fn make_salt() -> String {
    let mut rng = rand::rng();
    (0..SALT_LEN)
        .map(|_| SALT_ALPHABET[rng.random_range(0..SALT_ALPHABET.len())] as char)
        .collect()
}

/// Hash a password into the canonical `"{salt},{hex_digest}"` form.
///
/// The digest is SHA-256 over username + password + salt, so the same
/// password hashes differently for different users. Deterministic when a
/// salt is supplied; a fresh salt is drawn otherwise.
pub fn hash_password(username: &str, password: &str, salt: Option<&str>) -> String {
    let salt = salt.map(str::to_owned).unwrap_or_else(make_salt);

    let mut hasher = Sha256::new();
    hasher.update(username.as_bytes());
    hasher.update(password.as_bytes());
    hasher.update(salt.as_bytes());

    format!("{},{}", salt, hex::encode(hasher.finalize()))
}

/// Check a candidate password against a user's stored hash.
///
/// Extracts the salt from the stored hash, recomputes, and compares for
/// exact string equality. An absent user verifies false rather than
/// erroring, so login handlers can pass the lookup result straight through.
pub fn verify_password(user: Option<&User>, password: &str) -> bool {
    let Some(user) = user else {
        return false;
    };

    let salt = user
        .password_hash
        .split(',')
        .next()
        .unwrap_or_default();

    hash_password(&user.username, password, Some(salt)) == user.password_hash
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user_with(username: &str, password_hash: &str) -> User {
        User {
            id: 1,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            email: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn hash_is_deterministic_given_salt() {
        let a = hash_password("alice", "secret1", Some("AbCdE"));
        let b = hash_password("alice", "secret1", Some("AbCdE"));
        assert_eq!(a, b);
        assert!(a.starts_with("AbCdE,"));
    }

    #[test]
    fn fresh_salts_differ() {
        let a = hash_password("alice", "secret1", None);
        let b = hash_password("alice", "secret1", None);
        // 52^5 salts; a collision here means the rng is broken.
        assert_ne!(a, b);
    }

    #[test]
    fn salt_shape() {
        let salt = make_salt();
        assert_eq!(salt.len(), 5);
        assert!(salt.chars().all(|c| c.is_ascii_alphabetic()));
    }

    #[test]
    fn verify_accepts_correct_password() {
        let hash = hash_password("alice", "secret1", None);
        let user = user_with("alice", &hash);
        assert!(verify_password(Some(&user), "secret1"));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let hash = hash_password("alice", "secret1", None);
        let user = user_with("alice", &hash);
        assert!(!verify_password(Some(&user), "secret2"));
    }

    #[test]
    fn verify_is_bound_to_username() {
        // Same password and salt under a different username must not verify.
        let hash = hash_password("alice", "secret1", Some("AbCdE"));
        let user = user_with("bob", &hash);
        assert!(!verify_password(Some(&user), "secret1"));
    }

    #[test]
    fn verify_is_bound_to_salt() {
        let hash = hash_password("alice", "secret1", Some("AbCdE"));
        let resalted = format!("ZZZZZ,{}", hash.split(',').nth(1).unwrap());
        let user = user_with("alice", &resalted);
        assert!(!verify_password(Some(&user), "secret1"));
    }

    #[test]
    fn verify_absent_user_is_false() {
        assert!(!verify_password(None, "secret1"));
    }

    #[test]
    fn empty_password_is_hashable() {
        // Shape rules live in signup validation, not here.
        let hash = hash_password("alice", "", None);
        let user = user_with("alice", &hash);
        assert!(verify_password(Some(&user), ""));
        assert!(!verify_password(Some(&user), "x"));
    }
}
