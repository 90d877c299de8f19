//! Video upload integration tests.
//!
//! Run with: `cargo test -p tubely-api --test upload_video_test`

mod helpers;

use axum::http::StatusCode;
use bytes::Bytes;
use helpers::{
    bearer, fake_mp4, file_form, setup_test_app, setup_test_app_with, Stall, TestApp,
    TestAppOptions,
};
use serde_json::Value;
use std::time::Duration;
use tubely_core::{ContentRecord, ProbeResult};
use tubely_processing::ProcessingError;
use uuid::Uuid;

fn video_path(id: Uuid) -> String {
    format!("/content/{}/video", id)
}

fn mp4_stream(
    len: usize,
) -> impl futures::Stream<Item = Result<Bytes, ProcessingError>> + Send {
    futures::stream::iter(vec![Ok(Bytes::from(fake_mp4(len)))])
}

/// Run the video pipeline directly and drop it after `after`.
async fn abandon_video_upload(app: &TestApp, record: &ContentRecord, after: Duration) {
    let run = app
        .state
        .uploads
        .upload_video(record.clone(), Some("video/mp4"), mp4_stream(4096));
    assert!(
        tokio::time::timeout(after, run).await.is_err(),
        "pipeline finished instead of stalling"
    );
}

fn storage_key(url: &str) -> &str {
    url.strip_prefix(&format!("https://{}/", helpers::CDN_DOMAIN))
        .expect("URL on the distribution domain")
}

#[tokio::test]
async fn test_landscape_video_is_published_under_its_category() {
    let app = setup_test_app().await;
    let owner = Uuid::new_v4();
    let record = app.seed_content(owner).await;

    let response = app
        .client()
        .post(&video_path(record.id))
        .add_header("Authorization", bearer(owner))
        .multipart(file_form("video", "boots.mp4", "video/mp4", &fake_mp4(200_000)))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: ContentRecord = response.json();
    let url = body.video_url.clone().expect("video URL set");
    let key = storage_key(&url);
    assert!(key.starts_with("landscape/"));
    assert!(key.ends_with(".mp4"));

    assert!(app.video_storage.exists(key).await.unwrap());
    let stored = app.stored(record.id).await;
    assert_eq!(stored.video_url.as_deref(), Some(url.as_str()));
    assert_eq!(stored.owner_id, owner);
    assert_eq!(stored.thumbnail_url, None);
    assert!(app.scratch_entries().is_empty());
    assert_eq!(app.toolkit.remux_calls(), 1);
}

#[tokio::test]
async fn test_portrait_and_other_categories() {
    let app = setup_test_app().await;
    let owner = Uuid::new_v4();

    for (width, height, prefix) in [(1080, 1920, "portrait/"), (1000, 800, "other/")] {
        app.toolkit.set_probe(Ok(ProbeResult { width, height }));
        let record = app.seed_content(owner).await;

        let response = app
            .client()
            .post(&video_path(record.id))
            .add_header("Authorization", bearer(owner))
            .multipart(file_form("video", "clip.mp4", "video/mp4", &fake_mp4(1024)))
            .await;

        assert_eq!(response.status_code(), StatusCode::OK);
        let body: ContentRecord = response.json();
        let url = body.video_url.expect("video URL set");
        assert!(storage_key(&url).starts_with(prefix), "{} for {}x{}", url, width, height);
    }
}

#[tokio::test]
async fn test_probe_failure_leaves_record_and_scratch_clean() {
    let app = setup_test_app_with(TestAppOptions {
        probe: Err("no video stream".to_string()),
        ..Default::default()
    })
    .await;
    let owner = Uuid::new_v4();
    let record = app.seed_content(owner).await;

    let response = app
        .client()
        .post(&video_path(record.id))
        .add_header("Authorization", bearer(owner))
        .multipart(file_form("video", "clip.mp4", "video/mp4", &fake_mp4(4096)))
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["code"], "PROBE_ERROR");

    assert_eq!(app.stored(record.id).await, record);
    assert!(app.scratch_entries().is_empty());
    assert_eq!(app.toolkit.remux_calls(), 0);
}

#[tokio::test]
async fn test_remux_failure_removes_both_scratch_files() {
    let app = setup_test_app_with(TestAppOptions {
        remux_fails: true,
        ..Default::default()
    })
    .await;
    let owner = Uuid::new_v4();
    let record = app.seed_content(owner).await;

    let response = app
        .client()
        .post(&video_path(record.id))
        .add_header("Authorization", bearer(owner))
        .multipart(file_form("video", "clip.mp4", "video/mp4", &fake_mp4(4096)))
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["code"], "REMUX_ERROR");
    assert_eq!(app.stored(record.id).await.video_url, None);
    assert!(app.scratch_entries().is_empty());
}

#[tokio::test]
async fn test_publish_failure_is_reported_and_cleaned_up() {
    let app = setup_test_app_with(TestAppOptions {
        video_publish_fails: true,
        ..Default::default()
    })
    .await;
    let owner = Uuid::new_v4();
    let record = app.seed_content(owner).await;

    let response = app
        .client()
        .post(&video_path(record.id))
        .add_header("Authorization", bearer(owner))
        .multipart(file_form("video", "clip.mp4", "video/mp4", &fake_mp4(4096)))
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["code"], "PUBLISH_ERROR");
    assert!(app.published_video_keys().await.is_empty());
    assert_eq!(app.stored(record.id).await.video_url, None);
    assert!(app.scratch_entries().is_empty());
}

#[tokio::test]
async fn test_persist_failure_keeps_published_object() {
    let app = setup_test_app().await;
    let owner = Uuid::new_v4();
    let record = app.seed_content(owner).await;
    app.contents.set_fail_updates(true);

    let response = app
        .client()
        .post(&video_path(record.id))
        .add_header("Authorization", bearer(owner))
        .multipart(file_form("video", "clip.mp4", "video/mp4", &fake_mp4(4096)))
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["code"], "PERSIST_ERROR");
    assert_eq!(app.stored(record.id).await, record);
    assert!(app.scratch_entries().is_empty());

    // the object stays behind, unreferenced
    let keys = app.published_video_keys().await;
    assert_eq!(keys.len(), 1);
    assert!(keys[0].starts_with("landscape/"));
}

#[tokio::test]
async fn test_non_owner_is_rejected_before_any_bytes_are_staged() {
    let app = setup_test_app().await;
    let record = app.seed_content(Uuid::new_v4()).await;

    let response = app
        .client()
        .post(&video_path(record.id))
        .add_header("Authorization", bearer(Uuid::new_v4()))
        .multipart(file_form("video", "clip.mp4", "video/mp4", &fake_mp4(4096)))
        .await;

    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    assert!(app.scratch_entries().is_empty());
    assert!(app.published_video_keys().await.is_empty());
    assert_eq!(app.toolkit.probe_calls(), 0);
    assert_eq!(app.stored(record.id).await, record);
}

#[tokio::test]
async fn test_missing_or_invalid_token_is_unauthorized() {
    let app = setup_test_app().await;
    let record = app.seed_content(Uuid::new_v4()).await;

    let response = app
        .client()
        .post(&video_path(record.id))
        .multipart(file_form("video", "clip.mp4", "video/mp4", &fake_mp4(16)))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    let response = app
        .client()
        .post(&video_path(record.id))
        .add_header("Authorization", "Bearer not.a.jwt")
        .multipart(file_form("video", "clip.mp4", "video/mp4", &fake_mp4(16)))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_content_and_malformed_id() {
    let app = setup_test_app().await;
    let caller = Uuid::new_v4();

    let response = app
        .client()
        .post(&video_path(Uuid::new_v4()))
        .add_header("Authorization", bearer(caller))
        .multipart(file_form("video", "clip.mp4", "video/mp4", &fake_mp4(16)))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let response = app
        .client()
        .post("/content/not-a-uuid/video")
        .add_header("Authorization", bearer(caller))
        .multipart(file_form("video", "clip.mp4", "video/mp4", &fake_mp4(16)))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_non_mp4_is_unsupported() {
    let app = setup_test_app().await;
    let owner = Uuid::new_v4();
    let record = app.seed_content(owner).await;

    let response = app
        .client()
        .post(&video_path(record.id))
        .add_header("Authorization", bearer(owner))
        .multipart(file_form("video", "clip.mov", "video/quicktime", &fake_mp4(16)))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "UNSUPPORTED_MEDIA_TYPE");
    assert!(app.scratch_entries().is_empty());
    assert_eq!(app.toolkit.probe_calls(), 0);
}

#[tokio::test]
async fn test_oversized_video_is_rejected_without_leftovers() {
    let app = setup_test_app_with(TestAppOptions {
        max_video_size_bytes: 1024,
        ..Default::default()
    })
    .await;
    let owner = Uuid::new_v4();
    let record = app.seed_content(owner).await;

    let response = app
        .client()
        .post(&video_path(record.id))
        .add_header("Authorization", bearer(owner))
        .multipart(file_form("video", "clip.mp4", "video/mp4", &fake_mp4(4096)))
        .await;

    assert_eq!(response.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(app.scratch_entries().is_empty());
    assert_eq!(app.stored(record.id).await.video_url, None);
}

#[tokio::test]
async fn test_missing_video_field_and_empty_file() {
    let app = setup_test_app().await;
    let owner = Uuid::new_v4();
    let record = app.seed_content(owner).await;

    let response = app
        .client()
        .post(&video_path(record.id))
        .add_header("Authorization", bearer(owner))
        .multipart(file_form("file", "clip.mp4", "video/mp4", &fake_mp4(16)))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let response = app
        .client()
        .post(&video_path(record.id))
        .add_header("Authorization", bearer(owner))
        .multipart(file_form("video", "clip.mp4", "video/mp4", &[]))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert!(app.scratch_entries().is_empty());
}

#[tokio::test]
async fn test_video_persist_keeps_thumbnail_uploaded_meanwhile() {
    let app = setup_test_app().await;
    let owner = Uuid::new_v4();
    // snapshot as read by the gate before the video body streams in
    let snapshot = app.seed_content(owner).await;

    let response = app
        .client()
        .post(&format!("/content/{}/thumbnail", snapshot.id))
        .add_header("Authorization", bearer(owner))
        .multipart(file_form("thumbnail", "cover.png", "image/png", b"png-bytes"))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let thumbnail_url = response.json::<ContentRecord>().thumbnail_url;
    assert!(thumbnail_url.is_some());

    let updated = app
        .state
        .uploads
        .upload_video(snapshot.clone(), Some("video/mp4"), mp4_stream(4096))
        .await
        .unwrap();

    assert_eq!(updated.thumbnail_url, thumbnail_url);
    assert!(updated.video_url.is_some());
    let stored = app.stored(snapshot.id).await;
    assert_eq!(stored.thumbnail_url, thumbnail_url);
    assert_eq!(stored.video_url, updated.video_url);
}

#[tokio::test]
async fn test_cancelled_during_probe_leaves_nothing_behind() {
    let app = setup_test_app_with(TestAppOptions {
        stall: Some(Stall::Probe),
        ..Default::default()
    })
    .await;
    let record = app.seed_content(Uuid::new_v4()).await;

    abandon_video_upload(&app, &record, Duration::from_millis(200)).await;

    assert_eq!(app.toolkit.probe_calls(), 1);
    assert!(app.scratch_entries().is_empty());
    assert_eq!(app.stored(record.id).await, record);
}

#[tokio::test]
async fn test_cancelled_during_remux_removes_both_scratch_files() {
    let app = setup_test_app_with(TestAppOptions {
        stall: Some(Stall::Remux),
        ..Default::default()
    })
    .await;
    let record = app.seed_content(Uuid::new_v4()).await;

    abandon_video_upload(&app, &record, Duration::from_millis(200)).await;

    assert_eq!(app.toolkit.remux_calls(), 1);
    assert!(app.scratch_entries().is_empty());
    assert_eq!(app.stored(record.id).await, record);
}

#[tokio::test]
async fn test_cancelled_during_publish_leaves_record_unchanged() {
    let app = setup_test_app_with(TestAppOptions {
        stall: Some(Stall::Publish),
        ..Default::default()
    })
    .await;
    let record = app.seed_content(Uuid::new_v4()).await;

    abandon_video_upload(&app, &record, Duration::from_millis(200)).await;

    assert_eq!(app.toolkit.remux_calls(), 1);
    assert!(app.scratch_entries().is_empty());
    assert_eq!(app.stored(record.id).await, record);
}

#[tokio::test]
async fn test_request_timeout_cancels_the_pipeline() {
    let app = setup_test_app_with(TestAppOptions {
        stall: Some(Stall::Remux),
        upload_timeout_secs: 1,
        ..Default::default()
    })
    .await;
    let owner = Uuid::new_v4();
    let record = app.seed_content(owner).await;

    let response = app
        .client()
        .post(&video_path(record.id))
        .add_header("Authorization", bearer(owner))
        .multipart(file_form("video", "clip.mp4", "video/mp4", &fake_mp4(4096)))
        .await;

    assert_eq!(response.status_code(), StatusCode::REQUEST_TIMEOUT);
    assert!(app.scratch_entries().is_empty());
    assert_eq!(app.stored(record.id).await, record);
}
