use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    /// Canonical `"{salt},{hex_digest}"` string produced by quill-auth.
    pub password_hash: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub subject: String,
    pub content: String,
    /// Ownership is fixed at creation; only `owner_id` decides edit/delete
    /// rights. `owner_username` is display-only.
    pub owner_id: i64,
    pub owner_username: String,
    pub created_at: DateTime<Utc>,
}

/// Comments are append-only. `author` is the denormalized display name at
/// the time of writing; `author_id` is the authoritative reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub author_id: i64,
    pub author: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
