//! Preconditions composed in front of mutating operations.
//!
//! Each guard either passes (handing the next stage its input, e.g. the
//! loaded post) or fails with a terminal response wrapped in
//! `AppError::Denied`. Handlers chain guards with `?` in a fixed order, so
//! the first failure resolves the request and the operation never runs.

use axum::response::{IntoResponse, Redirect};

use quill_types::models::{Post, User};

use crate::AppState;
use crate::error::AppError;
use crate::posts::{post_from_row, render_post_page};
use crate::session::CurrentUser;

/// Anonymous requests are redirected to the login page; no error is shown.
pub fn require_login(identity: &CurrentUser) -> Result<User, AppError> {
    match &identity.0 {
        Some(user) => Ok(user.clone()),
        None => Err(AppError::Denied(Redirect::to("/login").into_response())),
    }
}

/// Parse the post id from the raw path segment and load the post. An
/// unparseable or unknown id is a 404. The loaded post is passed along so
/// later stages don't repeat the lookup.
pub fn require_post_exists(state: &AppState, raw_id: &str) -> Result<Post, AppError> {
    let post_id: i64 = raw_id.parse().map_err(|_| AppError::NotFound)?;

    let row = state.db.post_by_id(post_id)?.ok_or(AppError::NotFound)?;
    Ok(post_from_row(row))
}

/// Only the post's owner may edit or delete it. A non-owner gets the post
/// page back with a permission message — a rendered page, not a hard error.
/// Ownership is decided by the stored owner id, never by display names.
pub fn require_owns_post(state: &AppState, user: &User, post: &Post) -> Result<(), AppError> {
    if user.id == post.owner_id {
        return Ok(());
    }

    let page = render_post_page(
        state,
        Some(user),
        post,
        Some("You do not have permission to modify this post."),
    )?;
    Err(AppError::Denied(page))
}

/// A like must come from a logged-in user other than the owner, and only
/// once per (post, user) pair. Both rejections render the post page with the
/// reason inline, alongside the current like count and comments.
pub fn require_like_allowed(state: &AppState, user: &User, post: &Post) -> Result<(), AppError> {
    if user.id == post.owner_id {
        let page = render_post_page(state, Some(user), post, Some("You cannot like your own post."))?;
        return Err(AppError::Denied(page));
    }

    if state.db.like_exists(post.id, user.id)? {
        let page = render_post_page(state, Some(user), post, Some("You already liked this post."))?;
        return Err(AppError::Denied(page));
    }

    Ok(())
}
