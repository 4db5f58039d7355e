/// Database row types — these map directly to SQLite rows.
/// Distinct from quill-types domain models to keep the DB layer independent.

pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub email: Option<String>,
    pub created_at: String,
}

/// `owner_username` is joined in from users for display; ownership checks
/// use `owner_id` only.
pub struct PostRow {
    pub id: i64,
    pub subject: String,
    pub content: String,
    pub owner_id: i64,
    pub owner_username: String,
    pub created_at: String,
}

pub struct CommentRow {
    pub id: i64,
    pub post_id: i64,
    pub author_id: i64,
    pub author: String,
    pub content: String,
    pub created_at: String,
}
