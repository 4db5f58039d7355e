use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use thiserror::Error;
use tracing::error;

use crate::pages;

/// Failure channel for all handlers and guards.
///
/// Guard denials carry their own fully rendered terminal response, so a
/// failed precondition resolves the request itself and the wrapped mutation
/// never runs.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("no such page")]
    NotFound,

    #[error("request denied by guard")]
    Denied(Response),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound => {
                (StatusCode::NOT_FOUND, Html(pages::not_found())).into_response()
            }
            AppError::Denied(response) => response,
            AppError::Other(err) => {
                error!("internal error: {err:#}");
                (StatusCode::INTERNAL_SERVER_ERROR, Html(pages::server_error())).into_response()
            }
        }
    }
}
