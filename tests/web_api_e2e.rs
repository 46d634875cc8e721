//! Web API end-to-end scenario
//!
//! Walks one user through sign-up, upload, sharing, rename, delete and
//! sign-out against the in-memory backend.

mod common;

use axum::http::header::{COOKIE, LOCATION};
use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use common::{create_test_app, session_cookie, sign_up, sign_up_and_verify, verify};
use serde_json::{json, Value};

#[tokio::test]
async fn test_full_user_journey() {
    let app = create_test_app();

    // Sign up and verify the emailed code
    let account_id = sign_up(&app, "Grace Hopper", "grace@example.com").await;
    let secret = verify(&app, &account_id, "grace@example.com").await;
    let cookie = session_cookie(&secret);

    let response = app.server.get("/api/auth/me").add_header(COOKIE, cookie.clone()).await;
    response.assert_status_ok();
    let me: Value = response.json();
    assert_eq!(me["data"]["accountId"], account_id.as_str());

    // Upload two files in one request
    let form = MultipartForm::new()
        .add_text("path", "/")
        .add_part(
            "file",
            Part::bytes(b"0123456789".to_vec())
                .file_name("notes.txt")
                .mime_type("text/plain"),
        )
        .add_part(
            "file",
            Part::bytes(vec![7u8; 2048])
                .file_name("diagram.png")
                .mime_type("image/png"),
        );
    let response = app
        .server
        .post("/api/files")
        .add_header(COOKIE, cookie.clone())
        .multipart(form)
        .await;
    response.assert_status_ok();
    let uploaded: Value = response.json();
    let results = uploaded["data"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r["error"].is_null()));

    let stored = app.backend.stored_files("files").await;
    let png = stored.iter().find(|f| f.name == "diagram.png").unwrap();
    assert_eq!(png.mime_type, "image/png");

    let notes = results
        .iter()
        .find(|r| r["name"] == "notes.txt")
        .map(|r| r["file"].clone())
        .unwrap();
    let notes_id = notes["$id"].as_str().unwrap().to_string();

    // Share with a colleague who signs up afterwards
    let response = app
        .server
        .post(&format!("/api/files/{}/actions", notes_id))
        .add_header(COOKIE, cookie.clone())
        .json(&json!({ "action": "share", "emails": ["alan@example.com"] }))
        .await;
    response.assert_status_ok();

    let alan = sign_up_and_verify(&app, "Alan Turing", "alan@example.com").await;
    let response = app
        .server
        .get("/api/files")
        .add_header(COOKIE, session_cookie(&alan))
        .await;
    let shared: Value = response.json();
    assert_eq!(shared["data"]["total"], 1);
    assert_eq!(shared["data"]["documents"][0]["name"], "notes.txt");

    // Rename and check the listing
    let response = app
        .server
        .post(&format!("/api/files/{}/actions", notes_id))
        .add_header(COOKIE, cookie.clone())
        .json(&json!({ "action": "rename", "name": "report", "extension": "pdf" }))
        .await;
    response.assert_status_ok();

    let response = app
        .server
        .get("/api/files?sort=name-asc")
        .add_header(COOKIE, cookie.clone())
        .await;
    let listing: Value = response.json();
    let listed: Vec<&str> = listing["data"]["documents"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["name"].as_str().unwrap())
        .collect();
    assert_eq!(listed, vec!["diagram.png", "report.pdf"]);

    // Usage counts both files
    let response = app.server.get("/api/usage").add_header(COOKIE, cookie.clone()).await;
    let usage: Value = response.json();
    assert_eq!(usage["data"]["total"]["used"], 2058);
    assert_eq!(usage["data"]["formattedUsed"], "2.0 KB");

    // Delete the renamed file
    let response = app
        .server
        .post(&format!("/api/files/{}/actions", notes_id))
        .add_header(COOKIE, cookie.clone())
        .json(&json!({ "action": "delete", "bucketFileId": notes["bucketFileId"] }))
        .await;
    response.assert_status_ok();
    assert_eq!(app.backend.documents("files").await.len(), 1);
    assert_eq!(app.backend.stored_files("files").await.len(), 1);

    // Sign out
    let response = app
        .server
        .post("/api/auth/sign-out")
        .add_header(COOKIE, cookie.clone())
        .await;
    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(response.header(LOCATION), "/sign-in");

    let response = app.server.get("/api/files").add_header(COOKIE, cookie).await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}
