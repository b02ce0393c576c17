/// End-to-end API scenarios against PostgreSQL
///
/// Run with:
///
/// ```bash
/// DATABASE_URL=postgresql://localhost/moviehub_test cargo test -p moviehub-api -- --ignored
/// ```

mod common;

use axum::http::{Method, StatusCode};
use common::{send, unique_email, TestContext};
use serde_json::json;

async fn create_movie(ctx: &TestContext, token: &str, title: &str) -> String {
    let (status, body) = send(
        &ctx.app,
        Method::POST,
        "/api/movies",
        Some(token),
        Some(json!({ "title": title, "description": "A test film." })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create movie failed: {}", body);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
#[ignore = "requires DATABASE_URL pointing at a PostgreSQL database"]
async fn test_board_scenario() {
    let ctx = TestContext::new().await.unwrap();

    let (_, a_token) = ctx.register("Ana").await;
    let (_, b_token) = ctx.register("Ben").await;
    let (_, c_token) = ctx.register("Cleo").await;
    let (_, admin_token) = ctx.admin().await.unwrap();

    // A submits X
    let movie_id = create_movie(&ctx, &a_token, "Scenario Film").await;
    let movie_uri = format!("/api/movies/{}", movie_id);
    let vote_uri = format!("/api/votes/{}", movie_id);

    let (status, body) = send(&ctx.app, Method::GET, &movie_uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["movie"]["vote_score"], 0);
    assert_eq!(body["movie"]["added_by_name"], "Ana");

    // B upvotes, repeats, then flips
    let (status, body) = send(&ctx.app, Method::POST, &vote_uri, Some(&b_token), Some(json!({ "voteType": 1 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Vote recorded");
    assert_eq!((body["upvotes"].as_i64(), body["downvotes"].as_i64(), body["vote_score"].as_i64()), (Some(1), Some(0), Some(1)));

    let (_, body) = send(&ctx.app, Method::POST, &vote_uri, Some(&b_token), Some(json!({ "voteType": 1 }))).await;
    assert_eq!(body["vote_score"], 1);

    let (_, body) = send(&ctx.app, Method::POST, &vote_uri, Some(&b_token), Some(json!({ "voteType": -1 }))).await;
    assert_eq!((body["upvotes"].as_i64(), body["downvotes"].as_i64(), body["vote_score"].as_i64()), (Some(0), Some(1), Some(-1)));

    let (status, body) = send(&ctx.app, Method::GET, &format!("{}/user-vote", vote_uri), Some(&b_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["vote_type"], -1);

    let (_, body) = send(&ctx.app, Method::GET, &format!("{}/user-vote", vote_uri), Some(&c_token), None).await;
    assert_eq!(body["vote_type"], serde_json::Value::Null);

    // C comments
    let (status, body) = send(
        &ctx.app,
        Method::POST,
        &format!("/api/comments/{}", movie_id),
        Some(&c_token),
        Some(json!({ "body": "  Better than the trailer.  " })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["body"], "Better than the trailer.");
    assert_eq!(body["user_name"], "Cleo");

    let (_, body) = send(&ctx.app, Method::GET, &movie_uri, None, None).await;
    assert_eq!(body["comments"].as_array().unwrap().len(), 1);
    assert_eq!(body["movie"]["vote_score"], -1);

    // Admin removes X with everything attached to it
    let (status, body) = send(&ctx.app, Method::DELETE, &format!("/api/admin/movies/{}", movie_id), Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deletedMovie"], "Scenario Film");
    assert_eq!(body["deletedComments"], 1);
    assert_eq!(body["deletedVotes"], 1);

    let (status, _) = send(&ctx.app, Method::GET, &movie_uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&ctx.app, Method::DELETE, &format!("/api/admin/movies/{}", movie_id), Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&ctx.app, Method::POST, &vote_uri, Some(&b_token), Some(json!({ "voteType": 1 }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL pointing at a PostgreSQL database"]
async fn test_register_login_and_profile() {
    let ctx = TestContext::new().await.unwrap();
    let email = unique_email("Dana");

    let register = json!({ "name": "Dana", "email": email, "password": "popcorn42" });
    let (status, body) = send(&ctx.app, Method::POST, "/api/auth/register", None, Some(register.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["role"], "user");
    assert!(body["user"].get("password_hash").is_none());

    let (status, body) = send(&ctx.app, Method::POST, "/api/auth/register", None, Some(register)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Email already registered");

    let (status, body) = send(
        &ctx.app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": email.to_uppercase(), "password": "popcorn42" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();

    let (status, body) = send(&ctx.app, Method::GET, "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Dana");

    let (wrong_password, wrong_body) = send(
        &ctx.app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": email, "password": "not-the-password" })),
    )
    .await;
    let (unknown_email, unknown_body) = send(
        &ctx.app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": unique_email("nobody"), "password": "popcorn42" })),
    )
    .await;
    assert_eq!(wrong_password, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_body, unknown_body);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL pointing at a PostgreSQL database"]
async fn test_comment_deletion_rules() {
    let ctx = TestContext::new().await.unwrap();

    let (_, author_token) = ctx.register("Eli").await;
    let (_, other_token) = ctx.register("Fay").await;
    let (_, admin_token) = ctx.admin().await.unwrap();

    let movie_id = create_movie(&ctx, &author_token, "Comment Rules").await;

    let mut comment_ids = Vec::new();
    for text in ["First", "Second"] {
        let (_, body) = send(
            &ctx.app,
            Method::POST,
            &format!("/api/comments/{}", movie_id),
            Some(&author_token),
            Some(json!({ "body": text })),
        )
        .await;
        comment_ids.push(body["id"].as_str().unwrap().to_string());
    }

    let first = format!("/api/comments/{}", comment_ids[0]);
    let (status, _) = send(&ctx.app, Method::DELETE, &first, Some(&other_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&ctx.app, Method::DELETE, &first, Some(&author_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Comment deleted");

    let (status, _) = send(&ctx.app, Method::DELETE, &first, Some(&author_token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Admins may delete anyone's comment, through either route
    let (status, _) = send(&ctx.app, Method::DELETE, &format!("/api/comments/{}", comment_ids[1]), Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&ctx.app, Method::DELETE, &format!("/api/admin/comments/{}", comment_ids[1]), Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &ctx.app,
        Method::POST,
        &format!("/api/comments/{}", uuid::Uuid::new_v4()),
        Some(&author_token),
        Some(json!({ "body": "Into the void" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL pointing at a PostgreSQL database"]
async fn test_admin_dashboard() {
    let ctx = TestContext::new().await.unwrap();

    let (member_id, member_token) = ctx.register("Gus").await;
    let (_, admin_token) = ctx.admin().await.unwrap();
    create_movie(&ctx, &member_token, "Dashboard Film").await;

    let (status, body) = send(&ctx.app, Method::GET, "/api/admin/stats", Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["movies"].as_i64().unwrap() >= 1);
    assert!(body["users"].as_i64().unwrap() >= 2);

    let (status, body) = send(&ctx.app, Method::GET, "/api/admin/top-movies", Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::OK);
    let scores: Vec<i64> = body.as_array().unwrap().iter().map(|m| m["vote_score"].as_i64().unwrap()).collect();
    assert!(scores.len() <= 20);
    assert!(scores.windows(2).all(|w| w[0] >= w[1]));

    let (status, body) = send(&ctx.app, Method::GET, "/api/admin/users?limit=5", Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().len() <= 5);

    // Promotion shows up in the profile but the old token keeps its role
    let (status, body) = send(
        &ctx.app,
        Method::PUT,
        &format!("/api/admin/users/{}/role", member_id),
        Some(&admin_token),
        Some(json!({ "role": "admin" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "admin");

    let (_, body) = send(&ctx.app, Method::GET, "/api/auth/me", Some(&member_token), None).await;
    assert_eq!(body["role"], "admin");

    let (status, _) = send(&ctx.app, Method::GET, "/api/admin/stats", Some(&member_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &ctx.app,
        Method::PUT,
        &format!("/api/admin/users/{}/role", uuid::Uuid::new_v4()),
        Some(&admin_token),
        Some(json!({ "role": "user" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
