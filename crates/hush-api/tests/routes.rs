use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use hush_api::auth::{AppState, AppStateInner, create_token};
use hush_api::router::build_router;
use hush_db::Database;
use hush_types::models::Role;

fn test_app() -> (Router, AppState) {
    let state: AppState = Arc::new(AppStateInner {
        db: Database::open_in_memory().unwrap(),
        session_secret: "test-secret".into(),
        admin_username: "admin".into(),
        session_ttl_days: 1,
    });
    (build_router(state.clone()), state)
}

async fn send(app: &Router, req: Request<Body>) -> Response<Body> {
    app.clone().oneshot(req).await.unwrap()
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn post_form(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn location(resp: &Response<Body>) -> &str {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

async fn body_text(resp: Response<Body>) -> String {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(resp: Response<Body>) -> Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn register(app: &Router, username: &str, password: &str) -> Response<Body> {
    let body = format!("username={}&password={}", username, password);
    send(app, post_form("/register", &body, None)).await
}

/// Log in and return the `name=value` pair to send back as a Cookie header.
async fn login(app: &Router, username: &str, password: &str) -> String {
    let body = format!("username={}&password={}", username, password);
    let resp = send(app, post_form("/login", &body, None)).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/feed");

    let set_cookie = resp
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .expect("login sets a session cookie");
    set_cookie.split(';').next().unwrap().to_string()
}

#[tokio::test]
async fn confession_board_scenario() {
    let (app, state) = test_app();

    let resp = register(&app, "alice", "x").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/login");

    let resp = register(&app, "alice", "y").await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(body_text(resp).await, "Username already exists");
    assert_eq!(state.db.count_users().unwrap(), 1);

    register(&app, "bob", "pw").await;
    let alice = login(&app, "alice", "x").await;
    let bob = login(&app, "bob", "pw").await;

    let resp = send(&app, post_form("/feed", "message=hello&emoji=%F0%9F%99%82", Some(&alice))).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/feed");

    let feed = body_json(send(&app, get("/feed", Some(&alice))).await).await;
    assert_eq!(feed["username"], "alice");
    let post = &feed["posts"][0];
    assert_eq!(post["emoji"], "🙂");
    assert_eq!(post["likes"], 0);
    let post_id = post["id"].as_i64().unwrap();

    let resp = send(&app, post_form(&format!("/comment/{}", post_id), "comment=hi", Some(&bob))).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let feed = body_json(send(&app, get("/feed", Some(&alice))).await).await;
    assert_eq!(feed["unseen_notifications"], 1);
    assert_eq!(feed["comments"][0]["username"], "bob");
    assert_eq!(feed["comments"][0]["post_id"], post_id);

    // Likes need no session and are not deduplicated.
    for _ in 0..2 {
        let resp = send(&app, get(&format!("/like/{}", post_id), None)).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    }
    assert_eq!(state.db.get_post(post_id).unwrap().unwrap().likes, 2);

    let profile = body_json(send(&app, get("/profile", Some(&alice))).await).await;
    assert_eq!(profile["posts"].as_array().unwrap().len(), 1);
    let note = &profile["notifications"][0];
    assert!(note["text"].as_str().unwrap().contains("bob"));
    assert_eq!(note["seen"], false);

    let profile = body_json(send(&app, get("/profile", Some(&alice))).await).await;
    assert_eq!(profile["notifications"][0]["seen"], true);

    let feed = body_json(send(&app, get("/feed", Some(&alice))).await).await;
    assert_eq!(feed["unseen_notifications"], 0);
}

#[tokio::test]
async fn anonymous_requests_are_sent_to_login() {
    let (app, _) = test_app();

    for req in [
        get("/feed", None),
        get("/profile", None),
        post_form("/feed", "message=a&emoji=b", None),
        post_form("/comment/1", "comment=hi", None),
        get("/feed", Some("hush_session=not-a-token")),
    ] {
        let resp = send(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&resp), "/login");
    }
}

#[tokio::test]
async fn expired_session_is_sent_to_login() {
    let (app, _) = test_app();
    let token = create_token("test-secret", 1, "alice", Role::User, -1).unwrap();
    let cookie = format!("hush_session={}", token);

    for req in [get("/feed", Some(&cookie)), get("/profile", Some(&cookie))] {
        let resp = send(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&resp), "/login");
    }

    let resp = send(&app, get("/admin", Some(&cookie))).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let fresh = create_token("test-secret", 1, "alice", Role::User, 1).unwrap();
    let resp = send(&app, get("/feed", Some(&format!("hush_session={}", fresh)))).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn bad_credentials_are_rejected() {
    let (app, _) = test_app();
    register(&app, "alice", "x").await;

    for body in ["username=alice&password=wrong", "username=nobody&password=x", "username=alice"] {
        let resp = send(&app, post_form("/login", body, None)).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert!(resp.headers().get(header::SET_COOKIE).is_none());
    }
}

#[tokio::test]
async fn incomplete_forms_change_nothing() {
    let (app, state) = test_app();

    let resp = register(&app, "alice", "").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/register");
    assert_eq!(state.db.count_users().unwrap(), 0);

    register(&app, "alice", "x").await;
    let alice = login(&app, "alice", "x").await;

    let resp = send(&app, post_form("/feed", "message=&emoji=x", Some(&alice))).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let resp = send(&app, post_form("/feed", "message=hello", Some(&alice))).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert!(state.db.list_posts().unwrap().is_empty());

    let resp = send(&app, post_form("/comment/1", "comment=", Some(&alice))).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert!(state.db.list_comments().unwrap().is_empty());
}

#[tokio::test]
async fn admin_routes_require_moderator_role() {
    let (app, state) = test_app();
    register(&app, "admin", "root").await;
    register(&app, "bob", "pw").await;
    let admin = login(&app, "admin", "root").await;
    let bob = login(&app, "bob", "pw").await;

    send(&app, post_form("/feed", "message=first&emoji=1", Some(&bob))).await;
    send(&app, post_form("/feed", "message=second&emoji=2", Some(&bob))).await;
    let posts = state.db.list_posts().unwrap();
    let (second, first) = (posts[0].id, posts[1].id);
    send(&app, post_form(&format!("/comment/{}", first), "comment=a", Some(&admin))).await;
    send(&app, post_form(&format!("/comment/{}", second), "comment=b", Some(&admin))).await;

    for cookie in [None, Some(bob.as_str())] {
        for uri in ["/admin", "/admin/delete_post/1", "/admin/delete_comment/1"] {
            let resp = send(&app, get(uri, cookie)).await;
            assert_eq!(resp.status(), StatusCode::FORBIDDEN, "{uri}");
            assert!(resp.headers().get(header::LOCATION).is_none());
        }
    }
    assert_eq!(state.db.list_posts().unwrap().len(), 2);

    let panel = body_json(send(&app, get("/admin", Some(&admin))).await).await;
    assert_eq!(panel["posts"].as_array().unwrap().len(), 2);
    assert_eq!(panel["comments"].as_array().unwrap().len(), 2);
    assert_eq!(panel["posts"][0]["id"], second);

    let resp = send(&app, get(&format!("/admin/delete_post/{}", first), Some(&admin))).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/admin");

    let (posts, comments) = state.db.list_all().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].post_id, second);

    let resp = send(&app, get(&format!("/admin/delete_comment/{}", comments[0].id), Some(&admin))).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert!(state.db.list_comments().unwrap().is_empty());
}

#[tokio::test]
async fn logout_clears_the_session_cookie() {
    let (app, _) = test_app();
    register(&app, "alice", "x").await;
    let alice = login(&app, "alice", "x").await;

    let form = body_json(send(&app, get("/login", Some(&alice))).await).await;
    assert_eq!(form["logged_in_as"], "alice");

    let resp = send(&app, get("/logout", Some(&alice))).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/login");
    let cleared = resp.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
    assert!(cleared.starts_with("hush_session="));

    let form = body_json(send(&app, get("/login", None)).await).await;
    assert!(form.get("logged_in_as").is_none());
}

#[tokio::test]
async fn health_and_root() {
    let (app, _) = test_app();

    let health = body_json(send(&app, get("/health", None)).await).await;
    assert_eq!(health["status"], "ok");

    let resp = send(&app, get("/", None)).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/feed");
}
