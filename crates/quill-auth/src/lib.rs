/// Credential hashing and sealed session tokens.
///
/// Two independent pieces: `password` turns a (username, password) pair into
/// a salted digest and checks candidates against it; `token` signs opaque
/// string values with the server secret so session cookies are
/// tamper-evident without any server-side session storage.

pub mod password;
pub mod token;

pub use password::{hash_password, make_salt, verify_password};
pub use token::SessionKeeper;
