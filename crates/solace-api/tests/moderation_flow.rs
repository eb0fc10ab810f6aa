mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{HARMFUL, SAFE, SUPPORT, TestApp, URGENT};
use solace_api::moderation::{CHECK_FAILED_REASON, FailMode};

#[tokio::test]
async fn urgent_risk_is_blocked_and_never_stored() {
    let t = TestApp::new().await;
    let token = t.register("willow").await;
    t.model.push_text(URGENT);

    let (status, body) = t
        .post("/community/posts", &token, json!({ "content": "I don't want to be here anymore" }))
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["status"], "blocked");
    assert!(!body["crisis_resources"].as_array().unwrap().is_empty());
    assert_eq!(t.post_count(), 0);
}

#[tokio::test]
async fn harmful_instruction_is_rejected_and_never_stored() {
    let t = TestApp::new().await;
    let token = t.register("willow").await;
    t.model.push_text(HARMFUL);

    let (status, body) = t
        .post("/community/posts", &token, json!({ "content": "how would someone..." }))
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["status"], "rejected");
    assert!(body["message"].as_str().unwrap().len() > 10);
    assert_eq!(t.post_count(), 0);
}

#[tokio::test]
async fn support_needed_waits_for_confirmation_and_publishes_once() {
    let t = TestApp::new().await;
    let token = t.register("willow").await;
    t.model.push_text(SUPPORT);
    t.model.push_text("That sounds really heavy. You're not alone.");

    let (status, body) = t
        .post("/community/posts", &token, json!({ "content": "everything feels grey lately" }))
        .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["status"], "needs_confirmation");
    assert_eq!(body["message"], "That sounds really heavy. You're not alone.");
    assert_eq!(t.post_count(), 0);

    let id = body["submission_id"].as_str().unwrap().to_string();
    let confirm = format!("/community/submissions/{id}/confirm");

    let (status, body) = t.post(&confirm, &token, json!({})).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "published");
    assert_eq!(body["item"]["kind"], "post");
    assert_eq!(body["item"]["content"], "everything feels grey lately");
    assert_eq!(t.post_count(), 1);

    let (status, _) = t.post(&confirm, &token, json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(t.post_count(), 1);
}

#[tokio::test]
async fn support_message_falls_back_when_model_fails() {
    let t = TestApp::new().await;
    let token = t.register("willow").await;
    t.model.push_text(SUPPORT);

    let (status, body) = t
        .post("/community/posts", &token, json!({ "content": "rough week" }))
        .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert!(!body["message"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn pending_submissions_are_private_and_discardable() {
    let t = TestApp::new().await;
    let owner = t.register("willow").await;
    let other = t.register("aspen").await;
    t.model.push_text(SUPPORT);
    t.model.push_text("Take care.");

    let (_, body) = t
        .post("/community/posts", &owner, json!({ "content": "struggling today" }))
        .await;
    let id = body["submission_id"].as_str().unwrap().to_string();

    let (status, _) = t
        .post(&format!("/community/submissions/{id}/confirm"), &other, json!({}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = t.delete(&format!("/community/submissions/{id}"), &owner).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = t
        .post(&format!("/community/submissions/{id}/confirm"), &owner, json!({}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(t.post_count(), 0);
}

#[tokio::test]
async fn safe_and_failed_checks_publish_exactly_once() {
    let t = TestApp::new().await;
    let token = t.register("willow").await;

    t.model.push_text(format!("```json\n{SAFE}\n```"));
    let (status, body) = t
        .post("/community/posts", &token, json!({ "content": "went for a run", "tags": ["Exercise"] }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["item"]["tags"], json!(["exercise"]));
    assert_eq!(t.post_count(), 1);

    // Empty queue: the classifier errors and the post goes through
    let (status, body) = t
        .post("/community/posts", &token, json!({ "content": "quiet evening" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "published");
    assert_eq!(t.post_count(), 2);

    let id = body["item"]["id"].as_str().unwrap();
    let row = t.state.db.get_post(id).unwrap().unwrap();
    assert!(row.moderation.contains(CHECK_FAILED_REASON));
}

#[tokio::test]
async fn unparseable_verdict_is_treated_as_failed_check() {
    let t = TestApp::new().await;
    let token = t.register("willow").await;
    t.model.push_text("I think this is fine!");

    let (status, _) = t
        .post("/community/posts", &token, json!({ "content": "hello all" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(t.post_count(), 1);
}

#[tokio::test]
async fn fail_closed_refuses_without_writing() {
    let t = TestApp::with_fail_mode(FailMode::Closed).await;
    let token = t.register("willow").await;

    let (status, body) = t
        .post("/community/posts", &token, json!({ "content": "hello all" }))
        .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "moderation_unavailable");
    assert_eq!(t.post_count(), 0);
}

#[tokio::test]
async fn comments_are_screened_with_their_post() {
    let t = TestApp::new().await;
    let token = t.register("willow").await;

    t.model.push_text(SAFE);
    let (_, body) = t
        .post("/community/posts", &token, json!({ "content": "Tips for sleeping better?" }))
        .await;
    let post_id = body["item"]["id"].as_str().unwrap().to_string();
    let comments = format!("/community/posts/{post_id}/comments");

    t.model.push_text(URGENT);
    let (status, body) = t.post(&comments, &token, json!({ "content": "nothing helps, I give up" })).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["status"], "blocked");
    assert_eq!(t.comment_count(&post_id), 0);
    assert!(t.model.prompts().last().unwrap().contains("Tips for sleeping better?"));

    t.model.push_text(SAFE);
    let (status, body) = t
        .post(&comments, &token, json!({ "content": "Chamomile tea helps me", "anonymous": true }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["item"]["kind"], "comment");
    assert!(body["item"]["author_name"].is_null());

    let (status, list) = t.get(&comments, &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (_, post) = t.get(&format!("/community/posts/{post_id}"), &token).await;
    assert_eq!(post["comment_count"], 1);
}

#[tokio::test]
async fn held_comment_publishes_once_after_confirmation() {
    let t = TestApp::new().await;
    let token = t.register("willow").await;

    t.model.push_text(SAFE);
    let (_, body) = t
        .post("/community/posts", &token, json!({ "content": "How do you get through Sundays?" }))
        .await;
    let post_id = body["item"]["id"].as_str().unwrap().to_string();

    t.model.push_text(SUPPORT);
    t.model.push_text("Sundays can be hard. Thank you for sharing.");
    let (status, body) = t
        .post(
            &format!("/community/posts/{post_id}/comments"),
            &token,
            json!({ "content": "I mostly just feel empty on Sundays" }),
        )
        .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["status"], "needs_confirmation");
    assert_eq!(t.comment_count(&post_id), 0);

    let id = body["submission_id"].as_str().unwrap().to_string();
    let confirm = format!("/community/submissions/{id}/confirm");

    let (status, body) = t.post(&confirm, &token, json!({})).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["item"]["kind"], "comment");
    assert_eq!(body["item"]["content"], "I mostly just feel empty on Sundays");
    assert_eq!(t.comment_count(&post_id), 1);

    let stored = t.state.db.list_comments(&post_id).unwrap();
    let record: serde_json::Value = serde_json::from_str(&stored[0].moderation).unwrap();
    assert_eq!(record["category"], "support_needed");
    assert_eq!(record["confirmed_by_user"], true);

    let (status, _) = t.post(&confirm, &token, json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(t.comment_count(&post_id), 1);

    let (_, post) = t.get(&format!("/community/posts/{post_id}"), &token).await;
    assert_eq!(post["comment_count"], 1);
}

#[tokio::test]
async fn reactions_toggle() {
    let t = TestApp::new().await;
    let token = t.register("willow").await;
    t.model.push_text(SAFE);
    let (_, body) = t.post("/community/posts", &token, json!({ "content": "small win today" })).await;
    let uri = format!("/community/posts/{}/reactions", body["item"]["id"].as_str().unwrap());

    let (_, first) = t.post(&uri, &token, json!({})).await;
    assert_eq!(first, json!({ "added": true, "reaction_count": 1 }));
    let (_, second) = t.post(&uri, &token, json!({})).await;
    assert_eq!(second, json!({ "added": false, "reaction_count": 0 }));
}

#[tokio::test]
async fn posts_list_newest_first_and_filter_by_tag() {
    let t = TestApp::new().await;
    let token = t.register("willow").await;

    for (content, tag) in [("first", "sleep"), ("second", "work"), ("third", "sleep")] {
        t.model.push_text(SAFE);
        t.post("/community/posts", &token, json!({ "content": content, "tags": [tag] })).await;
    }

    let (_, all) = t.get("/community/posts", &token).await;
    let contents: Vec<&str> = all.as_array().unwrap().iter().map(|p| p["content"].as_str().unwrap()).collect();
    assert_eq!(contents, ["third", "second", "first"]);
    assert_eq!(all[0]["is_own"], true);

    let (_, sleep) = t.get("/community/posts?tag=sleep", &token).await;
    assert_eq!(sleep.as_array().unwrap().len(), 2);
}
