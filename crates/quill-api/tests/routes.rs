use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode, header};
use tower::ServiceExt;

use quill_api::{AppStateInner, router};
use quill_auth::SessionKeeper;
use quill_db::Database;

fn app() -> Router {
    let state = Arc::new(AppStateInner {
        db: Database::open_in_memory().expect("in-memory db"),
        sessions: SessionKeeper::new("integration-test secret"),
    });
    router(state)
}

async fn get(app: &Router, path: &str, cookie: Option<&str>) -> Response<Body> {
    let mut builder = Request::builder().uri(path);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    app.clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn post_form(
    app: &Router,
    path: &str,
    form: &str,
    cookie: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    app.clone()
        .oneshot(builder.body(Body::from(form.to_string())).unwrap())
        .await
        .unwrap()
}

fn location(res: &Response<Body>) -> &str {
    res.headers()
        .get(header::LOCATION)
        .expect("redirect has a location")
        .to_str()
        .unwrap()
}

/// The `name=value` pair from the response's Set-Cookie header.
fn session_cookie(res: &Response<Body>) -> String {
    res.headers()
        .get(header::SET_COOKIE)
        .expect("response sets a cookie")
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

async fn body_text(res: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Sign up a fresh user and return their session cookie pair.
async fn signup(app: &Router, username: &str, password: &str) -> String {
    let form = format!("username={username}&password={password}&verify={password}&email=");
    let res = post_form(app, "/signup", &form, None).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/welcome");
    session_cookie(&res)
}

/// Create a post and return its permalink path ("/{id}").
async fn create_post(app: &Router, cookie: &str, subject: &str, content: &str) -> String {
    let res = post_form(
        app,
        "/newpost",
        &format!("subject={subject}&content={content}"),
        Some(cookie),
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    location(&res).to_string()
}

// -- Signup and sessions --

#[tokio::test]
async fn signup_logs_in_and_welcome_greets() {
    let app = app();

    let cookie = signup(&app, "alice", "secret1").await;
    assert!(cookie.starts_with("user_id="));
    assert!(cookie.contains('|'), "cookie value is a sealed token");

    let res = get(&app, "/welcome", Some(&cookie)).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(body_text(res).await.contains("Welcome, alice"));
}

#[tokio::test]
async fn duplicate_username_is_rejected_inline() {
    let app = app();
    signup(&app, "alice", "secret1").await;

    let form = "username=alice&password=other22&verify=other22&email=";
    let res = post_form(&app, "/signup", form, None).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().get(header::SET_COOKIE).is_none());
    assert!(body_text(res).await.contains("User already exists"));

    // The original account is intact.
    let res = post_form(&app, "/login", "username=alice&password=secret1", None).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn signup_field_validation_renders_inline_errors() {
    let app = app();

    let form = "username=ab&password=x&verify=y&email=nonsense";
    let res = post_form(&app, "/signup", form, None).await;
    assert_eq!(res.status(), StatusCode::OK);

    let page = body_text(res).await;
    assert!(page.contains("That&#39;s not a valid username."));
    assert!(page.contains("That&#39;s not a valid password."));
    assert!(page.contains("Your passwords didn&#39;t match."));
    assert!(page.contains("That&#39;s not a valid email."));
}

#[tokio::test]
async fn login_with_wrong_password_sets_no_cookie() {
    let app = app();
    signup(&app, "alice", "secret1").await;

    let res = post_form(&app, "/login", "username=alice&password=wrong99", None).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().get(header::SET_COOKIE).is_none());
    assert!(body_text(res).await.contains("Invalid Credentials"));
}

#[tokio::test]
async fn login_with_unknown_user_matches_wrong_password() {
    let app = app();

    let res = post_form(&app, "/login", "username=ghost&password=whatever", None).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(body_text(res).await.contains("Invalid Credentials"));
}

#[tokio::test]
async fn welcome_redirects_anonymous_to_login() {
    let app = app();

    let res = get(&app, "/welcome", None).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/login");
}

#[tokio::test]
async fn tampered_session_cookie_is_anonymous() {
    let app = app();
    let cookie = signup(&app, "alice", "secret1").await;

    // Flip the last signature character.
    let mut tampered = cookie.clone();
    let last = tampered.pop().unwrap();
    tampered.push(if last == '0' { '1' } else { '0' });

    let res = get(&app, "/welcome", Some(&tampered)).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/login");
}

#[tokio::test]
async fn logout_clears_session_and_redirects_to_login() {
    let app = app();
    let cookie = signup(&app, "alice", "secret1").await;

    let res = get(&app, "/logout", Some(&cookie)).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/login");
    assert!(session_cookie(&res).starts_with("user_id="));
}

// -- Posts --

#[tokio::test]
async fn post_lifecycle_create_show_edit_delete() {
    let app = app();
    let cookie = signup(&app, "alice", "secret1").await;

    let permalink = create_post(&app, &cookie, "Hello", "First+post").await;

    let res = get(&app, &permalink, None).await;
    assert_eq!(res.status(), StatusCode::OK);
    let page = body_text(res).await;
    assert!(page.contains("Hello"));
    assert!(page.contains("by alice"));

    let res = post_form(
        &app,
        &format!("{permalink}/edit"),
        "subject=Hello+again&content=Edited",
        Some(&cookie),
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), permalink);

    let res = get(&app, &permalink, None).await;
    assert!(body_text(res).await.contains("Hello again"));

    let res = get(&app, &format!("{permalink}/delete"), Some(&cookie)).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/");

    let res = get(&app, &permalink, None).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn index_lists_posts() {
    let app = app();
    let cookie = signup(&app, "alice", "secret1").await;
    create_post(&app, &cookie, "Visible", "content").await;

    let res = get(&app, "/", None).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(body_text(res).await.contains("Visible"));
}

#[tokio::test]
async fn new_post_requires_login() {
    let app = app();

    let res = get(&app, "/newpost", None).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/login");

    let res = post_form(&app, "/newpost", "subject=x&content=y", None).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/login");
}

#[tokio::test]
async fn editing_a_missing_post_is_not_found() {
    let app = app();
    let cookie = signup(&app, "alice", "secret1").await;

    let res = get(&app, "/999/edit", Some(&cookie)).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // Unparseable ids fall out the same way.
    let res = get(&app, "/not-a-post", Some(&cookie)).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn non_owner_cannot_delete_or_edit() {
    let app = app();
    let alice = signup(&app, "alice", "secret1").await;
    let bob = signup(&app, "bob", "secret2").await;

    let permalink = create_post(&app, &alice, "Mine", "content").await;

    let res = get(&app, &format!("{permalink}/delete"), Some(&bob)).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(
        body_text(res)
            .await
            .contains("You do not have permission to modify this post.")
    );

    // Post survived.
    let res = get(&app, &permalink, None).await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = post_form(
        &app,
        &format!("{permalink}/edit"),
        "subject=Hijacked&content=nope",
        Some(&bob),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = get(&app, &permalink, None).await;
    let page = body_text(res).await;
    assert!(page.contains("Mine"));
    assert!(!page.contains("Hijacked"));
}

// -- Likes --

#[tokio::test]
async fn owner_cannot_like_own_post() {
    let app = app();
    let alice = signup(&app, "alice", "secret1").await;
    let permalink = create_post(&app, &alice, "Mine", "content").await;

    let res = get(&app, &format!("{permalink}/like"), Some(&alice)).await;
    assert_eq!(res.status(), StatusCode::OK);
    let page = body_text(res).await;
    assert!(page.contains("You cannot like your own post."));
    assert!(page.contains("0 like(s)"));
}

#[tokio::test]
async fn first_like_counts_second_is_rejected() {
    let app = app();
    let alice = signup(&app, "alice", "secret1").await;
    let bob = signup(&app, "bob", "secret2").await;
    let permalink = create_post(&app, &alice, "Likeable", "content").await;

    let res = get(&app, &format!("{permalink}/like"), Some(&bob)).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), permalink);

    let res = get(&app, &permalink, None).await;
    assert!(body_text(res).await.contains("1 like(s)"));

    let res = get(&app, &format!("{permalink}/like"), Some(&bob)).await;
    assert_eq!(res.status(), StatusCode::OK);
    let page = body_text(res).await;
    assert!(page.contains("You already liked this post."));
    assert!(page.contains("1 like(s)"));
}

#[tokio::test]
async fn liking_requires_login() {
    let app = app();
    let alice = signup(&app, "alice", "secret1").await;
    let permalink = create_post(&app, &alice, "Likeable", "content").await;

    let res = get(&app, &format!("{permalink}/like"), None).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/login");
}

// -- Comments --

#[tokio::test]
async fn comments_require_login_and_append_to_post() {
    let app = app();
    let alice = signup(&app, "alice", "secret1").await;
    let bob = signup(&app, "bob", "secret2").await;
    let permalink = create_post(&app, &alice, "Discussable", "content").await;

    let res = post_form(&app, &format!("{permalink}/comment"), "content=hi", None).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/login");

    let res = post_form(
        &app,
        &format!("{permalink}/comment"),
        "content=Nice+post",
        Some(&bob),
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), permalink);

    let res = get(&app, &permalink, None).await;
    let page = body_text(res).await;
    assert!(page.contains("Nice post"));
    assert!(page.contains("<b>bob</b>"));
}

#[tokio::test]
async fn commenting_on_missing_post_is_not_found() {
    let app = app();
    let cookie = signup(&app, "alice", "secret1").await;

    let res = post_form(&app, "/999/comment", "content=hello", Some(&cookie)).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
