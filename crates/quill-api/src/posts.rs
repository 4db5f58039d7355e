use axum::{
    Extension, Form,
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::{info, warn};

use quill_db::models::PostRow;
use quill_types::forms::PostForm;
use quill_types::models::{Post, User};

use crate::AppState;
use crate::comments::comment_from_row;
use crate::error::AppError;
use crate::guards;
use crate::pages;
use crate::session::CurrentUser;

/// GET / — every post, newest first.
pub async fn index(
    State(state): State<AppState>,
    Extension(identity): Extension<CurrentUser>,
) -> Result<Response, AppError> {
    let posts: Vec<Post> = state
        .db
        .recent_posts()?
        .into_iter()
        .map(post_from_row)
        .collect();

    Ok(Html(pages::post_index(identity.0.as_ref(), &posts)).into_response())
}

/// GET /newpost
pub async fn new_form(
    Extension(identity): Extension<CurrentUser>,
) -> Result<Response, AppError> {
    let user = guards::require_login(&identity)?;

    Ok(Html(pages::post_form(Some(&user), "New Post", "/newpost", "", "", None)).into_response())
}

/// POST /newpost — create a post owned by the current user.
pub async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<CurrentUser>,
    Form(form): Form<PostForm>,
) -> Result<Response, AppError> {
    let user = guards::require_login(&identity)?;

    if form.subject.trim().is_empty() || form.content.trim().is_empty() {
        let page = pages::post_form(
            Some(&user),
            "New Post",
            "/newpost",
            &form.subject,
            &form.content,
            Some("Subject and content are both required."),
        );
        return Ok(Html(page).into_response());
    }

    let post_id = state.db.create_post(&form.subject, &form.content, user.id)?;
    info!("user {} created post {}", user.id, post_id);

    Ok(Redirect::to(&format!("/{post_id}")).into_response())
}

/// GET /{id} — post with its comments and like count.
pub async fn show(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Extension(identity): Extension<CurrentUser>,
) -> Result<Response, AppError> {
    let post = guards::require_post_exists(&state, &raw_id)?;

    render_post_page(&state, identity.0.as_ref(), &post, None)
}

/// GET /{id}/delete — owner only.
pub async fn delete(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Extension(identity): Extension<CurrentUser>,
) -> Result<Response, AppError> {
    let user = guards::require_login(&identity)?;
    let post = guards::require_post_exists(&state, &raw_id)?;
    guards::require_owns_post(&state, &user, &post)?;

    state.db.delete_post(post.id)?;
    info!("user {} deleted post {}", user.id, post.id);

    Ok(Redirect::to("/").into_response())
}

/// GET /{id}/edit — owner only.
pub async fn edit_form(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Extension(identity): Extension<CurrentUser>,
) -> Result<Response, AppError> {
    let user = guards::require_login(&identity)?;
    let post = guards::require_post_exists(&state, &raw_id)?;
    guards::require_owns_post(&state, &user, &post)?;

    let action = format!("/{}/edit", post.id);
    let page = pages::post_form(
        Some(&user),
        "Edit Post",
        &action,
        &post.subject,
        &post.content,
        None,
    );
    Ok(Html(page).into_response())
}

/// POST /{id}/edit — owner only; owner and creation time are immutable.
pub async fn update(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Extension(identity): Extension<CurrentUser>,
    Form(form): Form<PostForm>,
) -> Result<Response, AppError> {
    let user = guards::require_login(&identity)?;
    let post = guards::require_post_exists(&state, &raw_id)?;
    guards::require_owns_post(&state, &user, &post)?;

    if form.subject.trim().is_empty() || form.content.trim().is_empty() {
        let action = format!("/{}/edit", post.id);
        let page = pages::post_form(
            Some(&user),
            "Edit Post",
            &action,
            &form.subject,
            &form.content,
            Some("Subject and content are both required."),
        );
        return Ok(Html(page).into_response());
    }

    state.db.update_post(post.id, &form.subject, &form.content)?;

    Ok(Redirect::to(&format!("/{}", post.id)).into_response())
}

/// Render the full post page: comments oldest-first, current like count,
/// and an optional inline message from a failed guard.
pub(crate) fn render_post_page(
    state: &AppState,
    user: Option<&User>,
    post: &Post,
    flash: Option<&str>,
) -> Result<Response, AppError> {
    let comments: Vec<_> = state
        .db
        .comments_for_post(post.id)?
        .into_iter()
        .map(comment_from_row)
        .collect();
    let like_count = state.db.like_count(post.id)?;

    Ok(Html(pages::post_page(user, post, &comments, like_count, flash)).into_response())
}

pub(crate) fn post_from_row(row: PostRow) -> Post {
    let created_at = parse_created_at(&row.created_at, "post", row.id);
    Post {
        id: row.id,
        subject: row.subject,
        content: row.content,
        owner_id: row.owner_id,
        owner_username: row.owner_username,
        created_at,
    }
}

/// SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS" without timezone.
/// Parse as naive UTC and convert; a corrupt value gets the epoch and a log
/// line rather than failing the page.
pub(crate) fn parse_created_at(raw: &str, entity: &str, id: i64) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt created_at '{}' on {} {}: {}", raw, entity, id, e);
            DateTime::default()
        })
}
