use axum::{
    Extension, Form,
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use regex::Regex;
use tracing::info;

use quill_auth::{hash_password, verify_password};
use quill_types::forms::{LoginForm, SignupForm};

use crate::AppState;
use crate::error::AppError;
use crate::guards;
use crate::pages;
use crate::session::{CurrentUser, SESSION_COOKIE, user_from_row};

// -- Signup field validation --

fn valid_username(username: &str) -> bool {
    Regex::new(r"^[a-zA-Z0-9_-]{3,20}$").is_ok_and(|re| re.is_match(username))
}

fn valid_password(password: &str) -> bool {
    Regex::new(r"^.{3,20}$").is_ok_and(|re| re.is_match(password))
}

fn valid_email(email: &str) -> bool {
    email.is_empty() || Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email))
}

/// Per-field signup messages, rendered inline next to the offending input.
#[derive(Debug, Default)]
pub struct SignupErrors {
    pub username: Option<String>,
    pub password: Option<String>,
    pub verify: Option<String>,
    pub email: Option<String>,
    pub duplicate: Option<String>,
}

impl SignupErrors {
    fn any(&self) -> bool {
        self.username.is_some()
            || self.password.is_some()
            || self.verify.is_some()
            || self.email.is_some()
            || self.duplicate.is_some()
    }
}

// -- Handlers --

/// GET /signup
pub async fn show_signup() -> Html<String> {
    Html(pages::signup_form("", "", &SignupErrors::default()))
}

/// POST /signup — validate, create the account, and log it in.
pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<SignupForm>,
) -> Result<Response, AppError> {
    let mut errors = SignupErrors::default();

    if !valid_username(&form.username) {
        errors.username = Some("That's not a valid username.".to_string());
    }
    if !valid_password(&form.password) {
        errors.password = Some("That's not a valid password.".to_string());
    }
    if form.verify != form.password {
        errors.verify = Some("Your passwords didn't match.".to_string());
    }
    if !valid_email(&form.email) {
        errors.email = Some("That's not a valid email.".to_string());
    }

    if errors.any() {
        return Ok(Html(pages::signup_form(&form.username, &form.email, &errors)).into_response());
    }

    let password_hash = hash_password(&form.username, &form.password, None);
    let email = (!form.email.is_empty()).then_some(form.email.as_str());

    // The store's UNIQUE constraint is the authority on duplicates; there is
    // no separate check-then-insert window.
    let Some(user_id) = state.db.create_user(&form.username, &password_hash, email)? else {
        errors.duplicate = Some("User already exists".to_string());
        return Ok(Html(pages::signup_form(&form.username, &form.email, &errors)).into_response());
    };

    info!("registered user {} ({})", form.username, user_id);

    Ok(start_session(&state, jar, user_id))
}

/// GET /login
pub async fn show_login() -> Html<String> {
    Html(pages::login_form("", None))
}

/// POST /login — one generic failure message; no hint at which part was
/// wrong or whether the username exists.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let user = state.db.user_by_username(&form.username)?.map(user_from_row);

    if verify_password(user.as_ref(), &form.password) {
        if let Some(user) = user {
            info!("user {} logged in", user.id);
            return Ok(start_session(&state, jar, user.id));
        }
    }

    Ok(Html(pages::login_form(&form.username, Some("Invalid Credentials"))).into_response())
}

/// GET /welcome
pub async fn welcome(Extension(identity): Extension<CurrentUser>) -> Result<Response, AppError> {
    let user = guards::require_login(&identity)?;

    Ok(Html(pages::welcome(&user)).into_response())
}

/// GET /logout — clear the session cookie and return to the login page.
pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    (
        jar.remove(Cookie::build(SESSION_COOKIE).path("/")),
        Redirect::to("/login"),
    )
}

/// Write a freshly sealed session cookie and send the client to the welcome
/// page. The only places a session cookie is ever written are here (login
/// and signup) and the removal in `logout`.
fn start_session(state: &AppState, jar: CookieJar, user_id: i64) -> Response {
    let sealed = state.sessions.seal(&user_id.to_string());

    let cookie = Cookie::build((SESSION_COOKIE, sealed))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();

    (jar.add(cookie), Redirect::to("/welcome")).into_response()
}
