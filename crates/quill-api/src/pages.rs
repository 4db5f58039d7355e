//! Server-rendered pages. Plain string building with escaping; which page
//! gets rendered is decided by the handlers and guards.

use quill_types::models::{Comment, Post, User};

use crate::auth::SignupErrors;

/// Escape text for interpolation into HTML.
pub(crate) fn esc(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, user: Option<&User>, body: &str) -> String {
    let nav = match user {
        Some(user) => format!(
            "<a href=\"/\">Home</a> <a href=\"/newpost\">New Post</a> \
             <span>signed in as {}</span> <a href=\"/logout\">Logout</a>",
            esc(&user.username)
        ),
        None => r#"<a href="/">Home</a> <a href="/login">Login</a> <a href="/signup">Signup</a>"#
            .to_string(),
    };

    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{}</title></head>\n\
         <body>\n<nav>{}</nav>\n<hr>\n{}\n</body>\n</html>\n",
        esc(title),
        nav,
        body
    )
}

fn error_line(message: Option<&str>) -> String {
    match message {
        Some(message) => format!("<p class=\"error\">{}</p>\n", esc(message)),
        None => String::new(),
    }
}

pub(crate) fn post_index(user: Option<&User>, posts: &[Post]) -> String {
    let mut body = String::from("<h1>Blog</h1>\n");
    if posts.is_empty() {
        body.push_str("<p>No posts yet.</p>\n");
    }
    for post in posts {
        body.push_str(&format!(
            "<article><h2><a href=\"/{id}\">{subject}</a></h2>\
             <p>by {owner} on {date}</p></article>\n",
            id = post.id,
            subject = esc(&post.subject),
            owner = esc(&post.owner_username),
            date = post.created_at.format("%b %-d, %Y"),
        ));
    }
    layout("Blog", user, &body)
}

pub(crate) fn post_page(
    user: Option<&User>,
    post: &Post,
    comments: &[Comment],
    like_count: i64,
    flash: Option<&str>,
) -> String {
    let mut body = format!(
        "<article>\n<h1>{subject}</h1>\n<p>by {owner} on {date}</p>\n<div>{content}</div>\n\
         <p>{likes} like(s) · <a href=\"/{id}/like\">like</a></p>\n</article>\n",
        subject = esc(&post.subject),
        owner = esc(&post.owner_username),
        date = post.created_at.format("%b %-d, %Y"),
        content = esc(&post.content),
        likes = like_count,
        id = post.id,
    );

    body.push_str(&error_line(flash));

    if user.map(|u| u.id) == Some(post.owner_id) {
        body.push_str(&format!(
            "<p><a href=\"/{id}/edit\">edit</a> · <a href=\"/{id}/delete\">delete</a></p>\n",
            id = post.id
        ));
    }

    body.push_str("<h2>Comments</h2>\n");
    for comment in comments {
        body.push_str(&format!(
            "<div><b>{author}</b> on {date}<br>{content}</div>\n",
            author = esc(&comment.author),
            date = comment.created_at.format("%b %-d, %Y"),
            content = esc(&comment.content),
        ));
    }

    body.push_str(&format!(
        "<form method=\"post\" action=\"/{id}/comment\">\n\
         <textarea name=\"content\"></textarea><br>\n\
         <button type=\"submit\">Comment</button>\n</form>\n",
        id = post.id
    ));

    layout(&post.subject, user, &body)
}

pub(crate) fn post_form(
    user: Option<&User>,
    heading: &str,
    action: &str,
    subject: &str,
    content: &str,
    error: Option<&str>,
) -> String {
    let body = format!(
        "<h1>{heading}</h1>\n{error}\
         <form method=\"post\" action=\"{action}\">\n\
         <label>Subject<br><input type=\"text\" name=\"subject\" value=\"{subject}\"></label><br>\n\
         <label>Content<br><textarea name=\"content\">{content}</textarea></label><br>\n\
         <button type=\"submit\">Save</button>\n</form>\n",
        heading = esc(heading),
        error = error_line(error),
        action = esc(action),
        subject = esc(subject),
        content = esc(content),
    );
    layout(heading, user, &body)
}

pub(crate) fn signup_form(username: &str, email: &str, errors: &SignupErrors) -> String {
    let body = format!(
        "<h1>Signup</h1>\n\
         <form method=\"post\" action=\"/signup\">\n\
         <label>Username<br><input type=\"text\" name=\"username\" value=\"{username}\"></label>{e_username}<br>\n\
         <label>Password<br><input type=\"password\" name=\"password\"></label>{e_password}<br>\n\
         <label>Verify Password<br><input type=\"password\" name=\"verify\"></label>{e_verify}<br>\n\
         <label>Email (optional)<br><input type=\"text\" name=\"email\" value=\"{email}\"></label>{e_email}<br>\n\
         {e_duplicate}\
         <button type=\"submit\">Signup</button>\n</form>\n",
        username = esc(username),
        email = esc(email),
        e_username = error_line(errors.username.as_deref()),
        e_password = error_line(errors.password.as_deref()),
        e_verify = error_line(errors.verify.as_deref()),
        e_email = error_line(errors.email.as_deref()),
        e_duplicate = error_line(errors.duplicate.as_deref()),
    );
    layout("Signup", None, &body)
}

pub(crate) fn login_form(username: &str, error: Option<&str>) -> String {
    let body = format!(
        "<h1>Login</h1>\n{error}\
         <form method=\"post\" action=\"/login\">\n\
         <label>Username<br><input type=\"text\" name=\"username\" value=\"{username}\"></label><br>\n\
         <label>Password<br><input type=\"password\" name=\"password\"></label><br>\n\
         <button type=\"submit\">Login</button>\n</form>\n",
        username = esc(username),
        error = error_line(error),
    );
    layout("Login", None, &body)
}

pub(crate) fn welcome(user: &User) -> String {
    let body = format!("<h1>Welcome, {}!</h1>\n", esc(&user.username));
    layout("Welcome", Some(user), &body)
}

pub(crate) fn not_found() -> String {
    layout("Not Found", None, "<h1>404</h1>\n<p>No such page.</p>\n")
}

pub(crate) fn server_error() -> String {
    layout(
        "Error",
        None,
        "<h1>Something went wrong</h1>\n<p>Please try again.</p>\n",
    )
}
