use axum::{
    Extension, Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};

use quill_db::models::CommentRow;
use quill_types::forms::CommentForm;
use quill_types::models::Comment;

use crate::AppState;
use crate::error::AppError;
use crate::guards;
use crate::posts::{parse_created_at, render_post_page};
use crate::session::CurrentUser;

/// POST /{id}/comment — append a comment to an existing post.
///
/// The author's username is stored alongside the comment as a display
/// string; the author id is the only field authorization ever reads.
pub async fn create(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Extension(identity): Extension<CurrentUser>,
    Form(form): Form<CommentForm>,
) -> Result<Response, AppError> {
    let user = guards::require_login(&identity)?;
    let post = guards::require_post_exists(&state, &raw_id)?;

    if form.content.trim().is_empty() {
        return render_post_page(&state, Some(&user), &post, Some("Comment cannot be empty."));
    }

    state
        .db
        .create_comment(post.id, user.id, &user.username, &form.content)?;

    Ok(Redirect::to(&format!("/{}", post.id)).into_response())
}

pub(crate) fn comment_from_row(row: CommentRow) -> Comment {
    let created_at = parse_created_at(&row.created_at, "comment", row.id);
    Comment {
        id: row.id,
        post_id: row.post_id,
        author_id: row.author_id,
        author: row.author,
        content: row.content,
        created_at,
    }
}
