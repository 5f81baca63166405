// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Punchlist-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Punchlist and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use base64::Engine;
use glam::{DVec2, DVec3};
use serde_json::{json, Value};
use tokio::time::Instant;
use tower::ServiceExt;

use punchlist::api::{router, AppState};
use punchlist::config::{demo_floors, DEMO_BUILDING_ID};
use punchlist::model::IssueStatus;
use punchlist::store::FolderStore;
use punchlist::viewer::testing::FakeScene;
use punchlist::viewer::{
    Aabb, ElementId, GestureConfig, InteractionController, InteractionEffect, InteractionEvent,
    SpatialResolver,
};

static TEMP_DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

struct TempDir {
    path: std::path::PathBuf,
}

impl TempDir {
    fn new(prefix: &str) -> Self {
        let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_nanos();
        let counter = TEMP_DIR_COUNTER.fetch_add(1, Ordering::Relaxed);
        let path = std::env::temp_dir().join(format!(
            "punchlist-it-{prefix}-{}-{nanos}-{counter}",
            std::process::id()
        ));
        std::fs::create_dir_all(&path).expect("create temp dir");
        Self { path }
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

fn open(dir: &TempDir) -> axum::Router {
    let store = FolderStore::new(dir.path.join("data"));
    router(AppState::from_store(Arc::new(store)))
}

async fn call(
    app: &axum::Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(body) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(body.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(request.body(body).expect("request"))
        .await
        .expect("router is infallible");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json response")
    };
    (status, value)
}

fn photo(name: &str) -> Value {
    json!({
        "fileName": name,
        "contentType": "image/jpeg",
        "data": base64::engine::general_purpose::STANDARD.encode(b"\xff\xd8\xff\xe0jpeg"),
    })
}

#[tokio::test]
async fn issue_lifecycle_survives_restart() {
    let dir = TempDir::new("lifecycle");
    let app = open(&dir);

    let (status, created) = call(
        &app,
        Method::POST,
        "/api/projects/tower-a/issues",
        Some(json!({
            "floorId": "floor-2",
            "title": "Loose handrail",
            "description": "Second flight, east stair",
            "locationType": "worldPosition",
            "worldPositionX": 10.5,
            "worldPositionY": 20.5,
            "worldPositionZ": 30.5,
            "photos": [photo("before.jpg")],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    let issue_id = created["issueId"].as_str().expect("issueId").to_owned();
    let status_uri = format!("/api/projects/tower-a/issues/{issue_id}/status");

    let in_progress = Some(json!({ "status": "InProgress" }));
    let (status, _) = call(&app, Method::PATCH, &status_uri, in_progress).await;
    assert_eq!(status, StatusCode::OK);

    let done = Some(json!({ "status": "Done" }));
    let (status, error) = call(&app, Method::PATCH, &status_uri, done).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["details"], "missing_evidence");

    let mut after = photo("after.jpg");
    after["photoPhase"] = json!("AFTER");
    let (status, _) = call(
        &app,
        Method::POST,
        &format!("/api/projects/tower-a/issues/{issue_id}/photos"),
        Some(after),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let done = Some(json!({ "status": "DONE" }));
    let (status, done) = call(&app, Method::PATCH, &status_uri, done).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(done["status"], IssueStatus::Done.as_str());

    // A fresh store over the same directory sees everything.
    drop(app);
    let reopened = open(&dir);
    let (status, detail) = call(
        &reopened,
        Method::GET,
        &format!("/api/projects/tower-a/issues/{issue_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["status"], "DONE");
    assert_eq!(detail["worldPosition"], json!({ "x": 10.5, "y": 20.5, "z": 30.5 }));
    let phases = detail["photos"]
        .as_array()
        .expect("photos")
        .iter()
        .filter_map(|photo| photo["photoPhase"].as_str())
        .collect::<Vec<_>>();
    assert_eq!(phases.len(), 2);
    assert!(phases.contains(&"BEFORE"));
    assert!(phases.contains(&"AFTER"));

    let photo_id = detail["photos"][0]["photoId"].as_str().expect("photoId");
    let url_uri = format!("/api/photos/{photo_id}/url");
    let (status, url) = call(&reopened, Method::GET, &url_uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(url["url"].as_str().is_some_and(|u| u.starts_with("file://")));
}

#[tokio::test]
async fn seeded_floor_catalog_is_served() {
    let dir = TempDir::new("floors");
    let store = FolderStore::new(dir.path.join("data"));
    store.save_floors(&demo_floors().expect("demo floors")).expect("seed floors");
    let app = router(AppState::from_store(Arc::new(store)));

    let uri = format!("/api/buildings/{DEMO_BUILDING_ID}/floors");
    let (status, floors) = call(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    let names = floors["floors"]
        .as_array()
        .expect("floors")
        .iter()
        .filter_map(|floor| floor["name"].as_str())
        .collect::<Vec<_>>();
    assert_eq!(names, ["1F", "2F", "3F"]);
}

#[tokio::test]
async fn quick_register_gesture_creates_an_element_issue() {
    let scene = FakeScene::new()
        .with_hit_region(
            DVec2::new(100.0, 100.0),
            DVec2::new(200.0, 200.0),
            ElementId(4711),
            None,
        )
        .with_element_bounds(
            ElementId(4711),
            &[Aabb::new(DVec3::new(0.0, 0.0, 0.0), DVec3::new(2.0, 3.0, 4.0))],
        );
    let resolver = SpatialResolver::new(&scene);
    let mut controller = InteractionController::new(GestureConfig::default());

    let effects = controller.handle(
        &resolver,
        InteractionEvent::DoubleClick {
            position: DVec2::new(150.0, 150.0),
            on_marker: false,
        },
        Instant::now(),
    );
    let Some(InteractionEffect::QuickRegister(hit)) = effects.last().copied() else {
        panic!("expected a quick register, got {effects:?}");
    };
    assert_eq!(hit.point(), DVec3::new(1.0, 1.5, 2.0));
    let location = hit.to_location().expect("location");

    let dir = TempDir::new("gesture");
    let app = open(&dir);
    let (status, created) = call(
        &app,
        Method::POST,
        "/api/projects/tower-a/issues",
        Some(json!({
            "floorId": "floor-1",
            "title": "Chipped column",
            "description": "Corner damage at grid C4",
            "locationType": location.kind().as_str(),
            "dbId": location.db_id(),
            "photos": [photo("column.jpg")],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    assert_eq!(created["issue"]["dbId"], "4711");
}
