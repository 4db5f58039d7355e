use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;
use tracing::warn;

use quill_db::models::UserRow;
use quill_types::models::User;

use crate::AppState;
use crate::posts::parse_created_at;

/// Name of the session cookie. Its value is a sealed `"{user_id}|{hmac}"`
/// token; the id is only trusted after the signature checks out.
pub const SESSION_COOKIE: &str = "user_id";

/// The identity resolved for the current request: a loaded user, or
/// anonymous. Inserted once per request and read-only from then on.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Option<User>);

/// Resolve the session cookie into a `CurrentUser` extension before any
/// handler runs. Reading never mutates the cookie; a missing, malformed, or
/// forged token simply resolves to anonymous.
pub async fn resolve_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    let user = identify(&state, &jar);
    req.extensions_mut().insert(CurrentUser(user));
    next.run(req).await
}

fn identify(state: &AppState, jar: &CookieJar) -> Option<User> {
    let token = jar.get(SESSION_COOKIE)?.value();
    let value = state.sessions.unseal(token)?;
    let user_id: i64 = value.parse().ok()?;

    let row = match state.db.user_by_id(user_id) {
        Ok(row) => row?,
        Err(err) => {
            // Session resolution never fails a request; fall back to anonymous.
            warn!("session lookup failed for user {}: {}", user_id, err);
            return None;
        }
    };

    Some(user_from_row(row))
}

pub(crate) fn user_from_row(row: UserRow) -> User {
    let created_at = parse_created_at(&row.created_at, "user", row.id);
    User {
        id: row.id,
        username: row.username,
        password_hash: row.password_hash,
        email: row.email,
        created_at,
    }
}
