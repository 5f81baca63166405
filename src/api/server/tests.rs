// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Punchlist-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Punchlist and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::*;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request};
use rstest::{fixture, rstest};
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::model::fixtures::three_floors;
use crate::store::MemoryStore;
use crate::viewer::StaticTokenSource;

struct Api {
    store: Arc<MemoryStore>,
    router: Router,
}

impl Api {
    async fn call(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(body) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(body.to_string())
            }
            None => Body::empty(),
        };
        let response = self
            .router
            .clone()
            .oneshot(request.body(body).expect("request"))
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("collect response body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json response")
        };
        (status, value)
    }

    async fn create(&self, body: Value) -> String {
        let (status, created) = self
            .call(Method::POST, "/api/projects/proj-1/issues", Some(body))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{created}");
        created["issueId"].as_str().expect("issueId").to_owned()
    }

    async fn set_status(&self, issue_id: &str, status: &str) -> (StatusCode, Value) {
        self.call(
            Method::PATCH,
            &format!("/api/projects/proj-1/issues/{issue_id}/status"),
            Some(json!({ "status": status })),
        )
        .await
    }

    async fn add_photo(&self, issue_id: &str, phase: &str) -> (StatusCode, Value) {
        self.call(
            Method::POST,
            &format!("/api/projects/proj-1/issues/{issue_id}/photos"),
            Some(json!({
                "photoPhase": phase,
                "fileName": "after.png",
                "contentType": "image/png",
                "data": encode(b"png-bytes"),
            })),
        )
        .await
    }
}

fn encode(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

fn photo() -> Value {
    json!({
        "fileName": "crack.jpg",
        "contentType": "image/jpeg",
        "data": encode(b"jpeg-bytes"),
    })
}

fn element_issue() -> Value {
    json!({
        "floorId": "floor-2",
        "title": "Cracked drywall",
        "description": "Hairline crack next to the stairwell door",
        "issueType": "finishing",
        "locationType": "dbId",
        "dbId": "4711",
        "photos": [photo()],
    })
}

#[fixture]
fn api() -> Api {
    let store = Arc::new(MemoryStore::with_floors(three_floors()));
    let tokens = CachedTokenProvider::new(Arc::new(StaticTokenSource::new(
        "viewer-abc",
        chrono::Duration::hours(1),
    )));
    let state = AppState::from_store(store.clone()).with_token_provider(Arc::new(tokens));
    Api {
        store,
        router: router(state),
    }
}

#[rstest]
#[tokio::test]
async fn create_issue_returns_created_issue(api: Api) {
    let (status, created) = api
        .call(Method::POST, "/api/projects/proj-1/issues", Some(element_issue()))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["issue"]["status"], "OPEN");
    assert_eq!(created["issue"]["priority"], "MEDIUM");
    assert_eq!(created["issue"]["locationType"], "dbId");
    assert_eq!(created["issue"]["dbId"], "4711");
    assert_eq!(created["issue"]["worldPosition"], Value::Null);

    let issue_id = created["issueId"].as_str().expect("issueId");
    let (status, detail) = api
        .call(Method::GET, &format!("/api/projects/proj-1/issues/{issue_id}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["title"], "Cracked drywall");
    assert_eq!(detail["photos"].as_array().map(Vec::len), Some(1));
    assert_eq!(detail["photos"][0]["photoPhase"], "BEFORE");
    assert_eq!(api.store.blob_count().await, 1);
}

#[rstest]
#[tokio::test]
async fn world_position_round_trips_exactly(api: Api) {
    let issue_id = api
        .create(json!({
            "floorId": "floor-1",
            "title": "Missing fire stop",
            "description": "Penetration left open",
            "locationType": "worldPosition",
            "worldPositionX": 10.5,
            "worldPositionY": 20.5,
            "worldPositionZ": 30.5,
            "photos": [photo()],
        }))
        .await;

    let (_, detail) = api
        .call(Method::GET, &format!("/api/projects/proj-1/issues/{issue_id}"), None)
        .await;
    assert_eq!(detail["locationType"], "worldPosition");
    assert_eq!(detail["dbId"], Value::Null);
    assert_eq!(detail["worldPosition"], json!({ "x": 10.5, "y": 20.5, "z": 30.5 }));
}

#[rstest]
#[tokio::test]
async fn create_without_photos_is_rejected_before_persisting(api: Api) {
    let mut body = element_issue();
    body["photos"] = json!([]);
    let (status, error) = api
        .call(Method::POST, "/api/projects/proj-1/issues", Some(body))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["details"], "missing_evidence");
    assert!(error["error"].as_str().is_some_and(|msg| msg.contains("BEFORE")));

    let (_, listed) = api.call(Method::GET, "/api/projects/proj-1/issues", None).await;
    assert_eq!(listed["issues"], json!([]));
    assert_eq!(api.store.blob_count().await, 0);
}

#[rstest]
#[case::missing_title(json!({ "title": null }))]
#[case::blank_description(json!({ "description": "   " }))]
#[case::missing_location_type(json!({ "locationType": null }))]
#[case::unknown_location_type(json!({ "locationType": "gps" }))]
#[case::element_without_db_id(json!({ "dbId": null }))]
#[case::world_position_without_z(json!({
    "locationType": "worldPosition",
    "worldPositionX": 1.0,
    "worldPositionY": 2.0,
}))]
#[case::world_position_not_a_number(json!({
    "locationType": "worldPosition",
    "worldPositionX": "abc",
    "worldPositionY": 2.0,
    "worldPositionZ": 3.0,
}))]
#[case::bad_priority(json!({ "priority": "urgent" }))]
#[case::bad_base64(json!({ "photos": [{ "fileName": "a.jpg", "data": "%%%" }] }))]
#[tokio::test]
async fn malformed_creation_is_a_validation_error(api: Api, #[case] patch: Value) {
    let mut body = element_issue();
    if let (Some(body), Some(patch)) = (body.as_object_mut(), patch.as_object()) {
        for (key, value) in patch {
            body.insert(key.clone(), value.clone());
        }
    }
    let (status, error) = api
        .call(Method::POST, "/api/projects/proj-1/issues", Some(body))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{error}");
    assert_eq!(error["details"], "validation");
}

#[rstest]
#[case("IN_PROGRESS")]
#[case("InProgress")]
#[case("in-progress")]
#[case("in progress")]
#[tokio::test]
async fn status_aliases_are_accepted(api: Api, #[case] status: &str) {
    let issue_id = api.create(element_issue()).await;
    let (code, issue) = api.set_status(&issue_id, status).await;
    assert_eq!(code, StatusCode::OK, "{issue}");
    assert_eq!(issue["status"], "IN_PROGRESS");
}

#[rstest]
#[tokio::test]
async fn unknown_status_is_rejected(api: Api) {
    let issue_id = api.create(element_issue()).await;
    let (code, error) = api.set_status(&issue_id, "Closed").await;
    assert_eq!(code, StatusCode::BAD_REQUEST);
    assert_eq!(error["details"], "validation");

    let (code, _) = api
        .call(
            Method::PATCH,
            &format!("/api/projects/proj-1/issues/{issue_id}/status"),
            Some(json!({})),
        )
        .await;
    assert_eq!(code, StatusCode::BAD_REQUEST);
}

#[rstest]
#[case::wrong_field_type(Some("application/json"), r#"{ "status": 5 }"#)]
#[case::broken_syntax(Some("application/json"), r#"{ "status": "#)]
#[case::missing_content_type(None, r#"{ "status": "Open" }"#)]
#[tokio::test]
async fn undecodable_body_is_a_validation_error(
    api: Api,
    #[case] content_type: Option<&str>,
    #[case] body: &str,
) {
    let issue_id = api.create(element_issue()).await;
    let mut request = Request::builder()
        .method(Method::PATCH)
        .uri(format!("/api/projects/proj-1/issues/{issue_id}/status"));
    if let Some(content_type) = content_type {
        request = request.header(header::CONTENT_TYPE, content_type);
    }
    let response = api
        .router
        .clone()
        .oneshot(request.body(Body::from(body.to_owned())).expect("request"))
        .await
        .expect("router is infallible");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("collect response body");
    let error: Value = serde_json::from_slice(&bytes).expect("json error body");
    assert_eq!(error["details"], "validation");
    assert!(error["error"].as_str().is_some_and(|text| !text.is_empty()));
}

#[rstest]
#[tokio::test]
async fn done_requires_after_photo(api: Api) {
    let issue_id = api.create(element_issue()).await;
    let (code, _) = api.set_status(&issue_id, "InProgress").await;
    assert_eq!(code, StatusCode::OK);

    let (code, error) = api.set_status(&issue_id, "Done").await;
    assert_eq!(code, StatusCode::BAD_REQUEST);
    assert_eq!(error["details"], "missing_evidence");
    assert!(error["error"].as_str().is_some_and(|msg| msg.contains("AFTER")));

    let (code, added) = api.add_photo(&issue_id, "AFTER").await;
    assert_eq!(code, StatusCode::CREATED);
    let blob_key = added["blobKey"].as_str().expect("blobKey");
    assert!(blob_key.starts_with(&format!("projects/proj-1/issues/{issue_id}/photos/")));
    assert!(blob_key.ends_with(".png"));

    let (code, issue) = api.set_status(&issue_id, "DONE").await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(issue["status"], "DONE");
}

#[rstest]
#[tokio::test]
async fn illegal_edge_is_a_transition_error(api: Api) {
    let issue_id = api.create(element_issue()).await;
    api.add_photo(&issue_id, "AFTER").await;
    let (code, error) = api.set_status(&issue_id, "DONE").await;
    assert_eq!(code, StatusCode::BAD_REQUEST);
    assert_eq!(error["details"], "invalid_status_transition");
    assert_eq!(error["error"], "invalid status transition: OPEN -> DONE");
}

#[rstest]
#[tokio::test]
async fn unknown_or_foreign_issue_is_not_found(api: Api) {
    let (code, error) = api
        .call(Method::GET, "/api/projects/proj-1/issues/nope", None)
        .await;
    assert_eq!(code, StatusCode::NOT_FOUND);
    assert_eq!(error["details"], "not_found");

    let (code, error) = api.set_status("nope", "InProgress").await;
    assert_eq!(code, StatusCode::NOT_FOUND);
    assert_eq!(error["details"], "not_found");

    let issue_id = api.create(element_issue()).await;
    let (code, _) = api
        .call(Method::GET, &format!("/api/projects/proj-9/issues/{issue_id}"), None)
        .await;
    assert_eq!(code, StatusCode::NOT_FOUND);
}

#[rstest]
#[tokio::test]
async fn list_filters_by_floor(api: Api) {
    api.create(element_issue()).await;
    let mut other = element_issue();
    other["floorId"] = json!("floor-3");
    api.create(other).await;

    let (_, all) = api.call(Method::GET, "/api/projects/proj-1/issues", None).await;
    assert_eq!(all["issues"].as_array().map(Vec::len), Some(2));

    let (code, filtered) = api
        .call(Method::GET, "/api/projects/proj-1/issues?floorId=floor-3", None)
        .await;
    assert_eq!(code, StatusCode::OK);
    let issues = filtered["issues"].as_array().expect("issues");
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0]["floorId"], "floor-3");
}

#[rstest]
#[tokio::test]
async fn priority_changes_keep_status(api: Api) {
    let issue_id = api.create(element_issue()).await;
    let uri = format!("/api/projects/proj-1/issues/{issue_id}/priority");
    let (code, issue) = api
        .call(Method::PATCH, &uri, Some(json!({ "priority": "high" })))
        .await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(issue["priority"], "HIGH");
    assert_eq!(issue["status"], "OPEN");

    let (code, _) = api
        .call(Method::PATCH, &uri, Some(json!({ "priority": "someday" })))
        .await;
    assert_eq!(code, StatusCode::BAD_REQUEST);
}

#[rstest]
#[tokio::test]
async fn photo_upload_rejects_unknown_phase(api: Api) {
    let issue_id = api.create(element_issue()).await;
    let (code, error) = api.add_photo(&issue_id, "DURING").await;
    assert_eq!(code, StatusCode::BAD_REQUEST);
    assert_eq!(error["details"], "validation");
}

#[rstest]
#[tokio::test]
async fn photo_urls_are_time_limited(api: Api) {
    let issue_id = api.create(element_issue()).await;
    let (_, detail) = api
        .call(Method::GET, &format!("/api/projects/proj-1/issues/{issue_id}"), None)
        .await;
    let photo_id = detail["photos"][0]["photoId"].as_str().expect("photoId");

    let (code, url) = api
        .call(Method::GET, &format!("/api/photos/{photo_id}/url"), None)
        .await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(url["expiresInSeconds"], 3_600);
    assert!(url["url"].as_str().is_some_and(|u| u.starts_with("memory://projects/proj-1/")));

    let (_, short) = api
        .call(Method::GET, &format!("/api/photos/{photo_id}/url?expirationMinutes=5"), None)
        .await;
    assert_eq!(short["expiresInSeconds"], 300);

    let (_, capped) = api
        .call(
            Method::GET,
            &format!("/api/photos/{photo_id}/url?expirationMinutes=100000"),
            None,
        )
        .await;
    assert_eq!(capped["expiresInSeconds"], 7 * 24 * 60 * 60);

    let (code, _) = api.call(Method::GET, "/api/photos/missing/url", None).await;
    assert_eq!(code, StatusCode::NOT_FOUND);
}

#[rstest]
#[tokio::test]
async fn floors_are_listed_in_order(api: Api) {
    let (code, floors) = api.call(Method::GET, "/api/buildings/bldg-1/floors", None).await;
    assert_eq!(code, StatusCode::OK);
    let numbers = floors["floors"]
        .as_array()
        .expect("floors")
        .iter()
        .map(|floor| floor["floorNumber"].as_i64())
        .collect::<Vec<_>>();
    assert_eq!(numbers, [Some(1), Some(2), Some(3)]);

    let (_, none) = api.call(Method::GET, "/api/buildings/bldg-9/floors", None).await;
    assert_eq!(none["floors"], json!([]));
}

#[rstest]
#[tokio::test]
async fn viewer_token_is_served_from_cache(api: Api) {
    let (code, first) = api.call(Method::GET, "/api/viewer/token", None).await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(first["accessToken"], "viewer-abc");

    let (_, second) = api.call(Method::GET, "/api/viewer/token", None).await;
    assert_eq!(first["expiresAt"], second["expiresAt"]);
}

#[tokio::test]
async fn viewer_token_without_source_is_unavailable() {
    let router = router(AppState::from_store(Arc::new(MemoryStore::new())));
    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/viewer/token")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router is infallible");
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}
