/// Posts, comments and policies over HTTP

mod common;

use axum::http::StatusCode;
use common::TestContext;
use serde_json::json;

#[tokio::test]
async fn test_posts_and_comments() {
    let ctx = TestContext::new().await;
    let course = ctx.create_course("Board").await;
    let posts_uri = format!("/api/v1/course/{}/posts", course);

    let (status, _) = ctx
        .post(&posts_uri, None, json!({ "title": "Hi", "content": "First" }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = ctx
        .post(&posts_uri, Some(&ctx.learner_token), json!({ "title": "Hi", "content": "First" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["authorId"], ctx.learner.id.to_string());
    let post = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = ctx.get(&posts_uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let comments_uri = format!("/api/v1/course/post/{}/comments", post);
    let (status, body) = ctx.get(&comments_uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));

    let (status, body) = ctx
        .post(&comments_uri, Some(&ctx.admin_token), json!({ "content": "Welcome" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    let comment = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = ctx
        .put(&format!("/api/v1/course/comment/{}", comment), None, json!({ "content": "Welcome!" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["content"], "Welcome!");

    let (status, body) = ctx.put(&format!("/api/v1/course/post/{}", post), None, json!({})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "wrong keys");

    let (status, _) = ctx
        .put(&format!("/api/v1/course/post/{}", post), None, json!({ "title": "" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = ctx.delete(&format!("/api/v1/course/post/{}", post), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = ctx.get(&posts_uri, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "No Posts found");
}

#[tokio::test]
async fn test_policies() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx
        .post(
            "/api/v1/course/policies",
            Some(&ctx.learner_token),
            json!({ "names": ["terms", "privacy"] }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (status, body) = ctx.get("/api/v1/course/policies", Some(&ctx.learner_token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (status, _) = ctx.delete("/api/v1/course/policies", Some(&ctx.learner_token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = ctx.delete("/api/v1/course/policies", Some(&ctx.admin_token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["count"], 2);

    let (status, body) = ctx
        .post("/api/v1/course/policies", Some(&ctx.learner_token), json!({ "names": [] }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["field"], "names");
}
