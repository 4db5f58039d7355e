use crate::Database;
use crate::models::{CommentRow, PostRow, UserRow};
use anyhow::Result;
use rusqlite::{Connection, OptionalExtension};

impl Database {
    // -- Users --

    /// Insert a new user. Returns the new id, or None when the username is
    /// already taken — uniqueness is enforced by the store, so concurrent
    /// signups cannot both succeed.
    pub fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        email: Option<&str>,
    ) -> Result<Option<i64>> {
        self.with_conn_mut(|conn| {
            let inserted = conn.execute(
                "INSERT INTO users (username, password_hash, email) VALUES (?1, ?2, ?3)",
                rusqlite::params![username, password_hash, email],
            );

            match inserted {
                Ok(_) => Ok(Some(conn.last_insert_rowid())),
                Err(rusqlite::Error::SqliteFailure(e, _))
                    if e.code == rusqlite::ErrorCode::ConstraintViolation =>
                {
                    Ok(None)
                }
                Err(e) => Err(e.into()),
            }
        })
    }

    pub fn user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "username = ?1", rusqlite::params![username]))
    }

    pub fn user_by_id(&self, id: i64) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id = ?1", rusqlite::params![id]))
    }

    // -- Posts --

    pub fn create_post(&self, subject: &str, content: &str, owner_id: i64) -> Result<i64> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO posts (subject, content, owner_id) VALUES (?1, ?2, ?3)",
                rusqlite::params![subject, content, owner_id],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn post_by_id(&self, id: i64) -> Result<Option<PostRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT p.id, p.subject, p.content, p.owner_id, u.username, p.created_at
                 FROM posts p JOIN users u ON u.id = p.owner_id
                 WHERE p.id = ?1",
            )?;

            let row = stmt.query_row([id], map_post_row).optional()?;
            Ok(row)
        })
    }

    /// All posts, newest first.
    pub fn recent_posts(&self) -> Result<Vec<PostRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT p.id, p.subject, p.content, p.owner_id, u.username, p.created_at
                 FROM posts p JOIN users u ON u.id = p.owner_id
                 ORDER BY p.created_at DESC, p.id DESC",
            )?;

            let rows = stmt
                .query_map([], map_post_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// Subject and content are the only mutable post fields; owner and
    /// creation time never change.
    pub fn update_post(&self, id: i64, subject: &str, content: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "UPDATE posts SET subject = ?1, content = ?2 WHERE id = ?3",
                rusqlite::params![subject, content, id],
            )?;
            Ok(())
        })
    }

    /// Comments and likes cascade with the post.
    pub fn delete_post(&self, id: i64) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute("DELETE FROM posts WHERE id = ?1", [id])?;
            Ok(())
        })
    }

    // -- Comments --

    pub fn create_comment(
        &self,
        post_id: i64,
        author_id: i64,
        author: &str,
        content: &str,
    ) -> Result<i64> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO comments (post_id, author_id, author, content) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![post_id, author_id, author, content],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Comments for one post, oldest first.
    pub fn comments_for_post(&self, post_id: i64) -> Result<Vec<CommentRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, post_id, author_id, author, content, created_at
                 FROM comments WHERE post_id = ?1
                 ORDER BY created_at ASC, id ASC",
            )?;

            let rows = stmt
                .query_map([post_id], |row| {
                    Ok(CommentRow {
                        id: row.get(0)?,
                        post_id: row.get(1)?,
                        author_id: row.get(2)?,
                        author: row.get(3)?,
                        content: row.get(4)?,
                        created_at: row.get(5)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    // -- Likes --

    /// Insert a like. Returns false when this (post, user) pair already has
    /// one; the UNIQUE constraint backs up the guard-level check.
    pub fn create_like(&self, post_id: i64, user_id: i64) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let inserted = conn.execute(
                "INSERT INTO likes (post_id, user_id) VALUES (?1, ?2)",
                rusqlite::params![post_id, user_id],
            );

            match inserted {
                Ok(_) => Ok(true),
                Err(rusqlite::Error::SqliteFailure(e, _))
                    if e.code == rusqlite::ErrorCode::ConstraintViolation =>
                {
                    Ok(false)
                }
                Err(e) => Err(e.into()),
            }
        })
    }

    pub fn like_exists(&self, post_id: i64, user_id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let found: Option<i64> = conn
                .query_row(
                    "SELECT 1 FROM likes WHERE post_id = ?1 AND user_id = ?2",
                    rusqlite::params![post_id, user_id],
                    |row| row.get(0),
                )
                .optional()?;

            Ok(found.is_some())
        })
    }

    pub fn like_count(&self, post_id: i64) -> Result<i64> {
        self.with_conn(|conn| {
            let count =
                conn.query_row("SELECT COUNT(*) FROM likes WHERE post_id = ?1", [post_id], |row| {
                    row.get(0)
                })?;
            Ok(count)
        })
    }
}

fn query_user(
    conn: &Connection,
    predicate: &str,
    params: &[&dyn rusqlite::types::ToSql],
) -> Result<Option<UserRow>> {
    let sql = format!(
        "SELECT id, username, password_hash, email, created_at FROM users WHERE {}",
        predicate
    );
    let mut stmt = conn.prepare(&sql)?;

    let row = stmt
        .query_row(params, |row| {
            Ok(UserRow {
                id: row.get(0)?,
                username: row.get(1)?,
                password_hash: row.get(2)?,
                email: row.get(3)?,
                created_at: row.get(4)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn map_post_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PostRow> {
    Ok(PostRow {
        id: row.get(0)?,
        subject: row.get(1)?,
        content: row.get(2)?,
        owner_id: row.get(3)?,
        owner_username: row.get(4)?,
        created_at: row.get(5)?,
    })
}
