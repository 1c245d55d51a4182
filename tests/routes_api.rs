#![cfg(feature = "inmem-store")]

mod common;

use actix_web::{test, App};
use common::{multipart_upload, png_bytes, setup_env, token_for, MockMediaStore};
use mosaic::models::User;
use mosaic::repo::inmem::InMemRepo;
use mosaic::repo::UserRepo;
use mosaic::{config, AppState, SecurityHeaders};
use serial_test::serial;
use std::sync::Arc;
use uuid::Uuid;

async fn seeded_repo(users: &[(Uuid, &str)]) -> InMemRepo {
    let repo = InMemRepo::new();
    for (id, email) in users {
        repo.upsert_user(User { id: *id, email: (*email).into() }).await.unwrap();
    }
    repo
}

macro_rules! app {
    ($repo:expr, $store:expr) => {
        test::init_service(
            App::new()
                .wrap(SecurityHeaders::from_env())
                .app_data(actix_web::web::Data::new(AppState {
                    repo: Arc::new($repo),
                    media_store: Arc::new($store),
                }))
                .configure(config),
        )
        .await
    };
}

/// Upload a small PNG and return the created post JSON.
macro_rules! upload_png {
    ($app:expr, $token:expr, $caption:expr, $category:expr) => {{
        let boundary = "BOUNDARYHASH";
        let body =
            multipart_upload(boundary, "a.png", "image/png", &png_bytes(), $caption, $category);
        let req = test::TestRequest::post()
            .uri("/upload")
            .insert_header(("Authorization", format!("Bearer {}", $token)))
            .insert_header((
                "Content-Type",
                format!("multipart/form-data; boundary={}", boundary),
            ))
            .set_payload(body)
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), 200);
        let v: serde_json::Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
        v
    }};
}

#[actix_web::test]
#[serial]
async fn upload_feed_delete_flow() {
    setup_env();
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    let repo = seeded_repo(&[(alice, "alice@example.com"), (bob, "bob@example.com")]).await;
    let app = app!(repo, MockMediaStore::ok());

    let alice_token = token_for(alice, "alice@example.com");
    let bob_token = token_for(bob, "bob@example.com");

    let post = upload_png!(app, alice_token, "my shot", "street");
    assert_eq!(post["file_type"], "image");
    assert_eq!(post["caption"], "my shot");
    assert!(post["url"].as_str().unwrap().starts_with("https://cdn.test/"));
    let post_id = post["id"].as_str().unwrap().to_string();

    // feed is annotated relative to the caller
    let req = test::TestRequest::get()
        .uri("/feed")
        .insert_header(("Authorization", format!("Bearer {bob_token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    let feed: serde_json::Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
    let posts = feed["posts"].as_array().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["is_owner"], false);
    assert_eq!(posts[0]["email"], "alice@example.com");
    assert_eq!(posts[0]["like_count"], 0);

    // non-owner cannot delete
    let req = test::TestRequest::delete()
        .uri(&format!("/posts/{post_id}"))
        .insert_header(("Authorization", format!("Bearer {bob_token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 403);

    // owner can
    let req = test::TestRequest::delete()
        .uri(&format!("/posts/{post_id}"))
        .insert_header(("Authorization", format!("Bearer {alice_token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    // gone from the feed
    let req = test::TestRequest::get()
        .uri("/feed")
        .insert_header(("Authorization", format!("Bearer {alice_token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let feed: serde_json::Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
    assert!(feed["posts"].as_array().unwrap().is_empty());

    // deleting again: 404
    let req = test::TestRequest::delete()
        .uri(&format!("/posts/{post_id}"))
        .insert_header(("Authorization", format!("Bearer {alice_token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}

#[actix_web::test]
#[serial]
async fn video_content_type_sets_file_type() {
    setup_env();
    let alice = Uuid::new_v4();
    let repo = seeded_repo(&[(alice, "alice@example.com")]).await;
    let app = app!(repo, MockMediaStore::ok());
    let token = token_for(alice, "alice@example.com");

    let boundary = "BOUNDARYHASH";
    let body = multipart_upload(boundary, "clip.mp4", "video/mp4", b"fakevideo", "clip", "sports");
    let req = test::TestRequest::post()
        .uri("/upload")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .insert_header(("Content-Type", format!("multipart/form-data; boundary={boundary}")))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let post: serde_json::Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
    assert_eq!(post["file_type"], "video");
}

#[actix_web::test]
#[serial]
async fn media_store_outage_is_a_single_opaque_failure() {
    setup_env();
    let alice = Uuid::new_v4();
    let repo = seeded_repo(&[(alice, "alice@example.com")]).await;
    let app = app!(repo.clone(), MockMediaStore::failing());
    let token = token_for(alice, "alice@example.com");

    let boundary = "BOUNDARYHASH";
    let body = multipart_upload(boundary, "a.png", "image/png", &png_bytes(), "c", "k");
    let req = test::TestRequest::post()
        .uri("/upload")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .insert_header(("Content-Type", format!("multipart/form-data; boundary={boundary}")))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 500);
    let body: serde_json::Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
    assert!(body["error"].as_str().unwrap().contains("simulated outage"));

    // nothing was persisted
    use mosaic::repo::PostRepo;
    assert!(repo.list_posts(None).await.unwrap().is_empty());
}

#[actix_web::test]
#[serial]
async fn comments_and_likes_flow() {
    setup_env();
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    let repo = seeded_repo(&[(alice, "alice@example.com"), (bob, "bob@example.com")]).await;
    let app = app!(repo, MockMediaStore::ok());
    let alice_token = token_for(alice, "alice@example.com");
    let bob_token = token_for(bob, "bob@example.com");

    let post = upload_png!(app, alice_token, "commentable", "misc");
    let post_id = post["id"].as_str().unwrap().to_string();

    // anyone authenticated may comment
    let req = test::TestRequest::post()
        .uri(&format!("/posts/{post_id}/createcomment"))
        .insert_header(("Authorization", format!("Bearer {bob_token}")))
        .set_form([("description", "great shot")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let comment: serde_json::Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
    let comment_id = comment["id"].as_str().unwrap().to_string();
    assert_eq!(comment["description"], "great shot");

    let req = test::TestRequest::get()
        .uri(&format!("/posts/{post_id}/comments"))
        .insert_header(("Authorization", format!("Bearer {alice_token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let listed: serde_json::Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
    assert_eq!(listed["comments"].as_array().unwrap().len(), 1);

    // commenting on a missing post: 404
    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/createcomment", Uuid::new_v4()))
        .insert_header(("Authorization", format!("Bearer {bob_token}")))
        .set_form([("description", "into the void")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);

    // only the author may delete the comment
    let req = test::TestRequest::delete()
        .uri(&format!("/comments/{comment_id}"))
        .insert_header(("Authorization", format!("Bearer {alice_token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 403);
    let req = test::TestRequest::delete()
        .uri(&format!("/comments/{comment_id}"))
        .insert_header(("Authorization", format!("Bearer {bob_token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    // like toggling via the endpoint
    for (expected_liked, expected_count) in [(true, 1), (false, 0), (true, 1)] {
        let req = test::TestRequest::post()
            .uri(&format!("/posts/{post_id}/like"))
            .insert_header(("Authorization", format!("Bearer {bob_token}")))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
        let toggled: serde_json::Value =
            serde_json::from_slice(&test::read_body(resp).await).unwrap();
        assert_eq!(toggled["liked"], expected_liked);

        let req = test::TestRequest::get()
            .uri(&format!("/posts/{post_id}/likes"))
            .insert_header(("Authorization", format!("Bearer {bob_token}")))
            .to_request();
        let resp = test::call_service(&app, req).await;
        let counted: serde_json::Value =
            serde_json::from_slice(&test::read_body(resp).await).unwrap();
        assert_eq!(counted["likes"], expected_count);
    }

    // liked posts reflect the final state
    let req = test::TestRequest::get()
        .uri("/posts/liked")
        .insert_header(("Authorization", format!("Bearer {bob_token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let liked: serde_json::Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
    let liked_posts = liked["posts"].as_array().unwrap();
    assert_eq!(liked_posts.len(), 1);
    assert_eq!(liked_posts[0]["id"].as_str().unwrap(), post_id);
}

#[actix_web::test]
#[serial]
async fn search_matches_captions_case_insensitively() {
    setup_env();
    let alice = Uuid::new_v4();
    let repo = seeded_repo(&[(alice, "alice@example.com")]).await;
    let app = app!(repo, MockMediaStore::ok());
    let token = token_for(alice, "alice@example.com");

    upload_png!(app, token, "Sunset over the bay", "travel");
    upload_png!(app, token, "breakfast", "food");

    let req = test::TestRequest::get()
        .uri("/search?query=SUNSET")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let found: serde_json::Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
    assert_eq!(found["posts"].as_array().unwrap().len(), 1);

    // category narrows the match away
    let req = test::TestRequest::get()
        .uri("/search?query=sunset&category=food")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let found: serde_json::Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
    assert!(found["posts"].as_array().unwrap().is_empty());

    // feed category filter
    let req = test::TestRequest::get()
        .uri("/feed?category=food")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let feed: serde_json::Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
    let posts = feed["posts"].as_array().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["caption"], "breakfast");
}

#[actix_web::test]
#[serial]
async fn malformed_ids_yield_400() {
    setup_env();
    let alice = Uuid::new_v4();
    let repo = seeded_repo(&[(alice, "alice@example.com")]).await;
    let app = app!(repo, MockMediaStore::ok());
    let token = token_for(alice, "alice@example.com");

    let req = test::TestRequest::get()
        .uri("/posts/not-a-uuid/comments")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let req = test::TestRequest::delete()
        .uri("/posts/not-a-uuid")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let req = test::TestRequest::post()
        .uri("/posts/not-a-uuid/like")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}
