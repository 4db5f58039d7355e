use axum::{
    Extension,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use tracing::info;

use crate::AppState;
use crate::error::AppError;
use crate::guards;
use crate::posts::render_post_page;
use crate::session::CurrentUser;

/// GET /{id}/like — record a like and return to the post.
///
/// Likes are insert-only: there is no unlike. The guard enforces the
/// "not your own post" and "only once" rules with friendly pages; the
/// store's UNIQUE constraint catches a duplicate that slips in between the
/// guard's check and the insert, and it renders the same way.
pub async fn create(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Extension(identity): Extension<CurrentUser>,
) -> Result<Response, AppError> {
    let user = guards::require_login(&identity)?;
    let post = guards::require_post_exists(&state, &raw_id)?;
    guards::require_like_allowed(&state, &user, &post)?;

    if !state.db.create_like(post.id, user.id)? {
        return render_post_page(&state, Some(&user), &post, Some("You already liked this post."));
    }

    info!("user {} liked post {}", user.id, post.id);

    Ok(Redirect::to(&format!("/{}", post.id)).into_response())
}
