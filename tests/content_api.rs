// This file is part of the product Docroot.
// SPDX-FileCopyrightText: 2025-2026 Docroot Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use serde_json::json;

#[actix_web::test]
async fn posting_the_same_fragment_twice_upserts_one_record() {
    let harness = common::TestHarness::new();
    let app = test::init_service(common::build_test_app(harness.app_bundle())).await;

    for _ in 0..2 {
        let req = test::TestRequest::post()
            .uri("/cms/content")
            .set_json(json!({"uri": "/x", "element_id": "h1", "content": "hi"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let req = test::TestRequest::get()
        .uri("/cms/content?uri=/x")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    let records = body.as_array().expect("record list");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["content"], "hi");
    assert_eq!(records[0]["element_id"], "h1");
}

#[actix_web::test]
async fn updated_content_replaces_the_stored_value() {
    let harness = common::TestHarness::new();
    let app = test::init_service(common::build_test_app(harness.app_bundle())).await;

    for content in ["first", "second"] {
        let req = test::TestRequest::post()
            .uri("/cms/content")
            .set_json(json!({"uri": "/x", "element_id": "h1", "content": content}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let req = test::TestRequest::get()
        .uri("/cms/content?uri=/x")
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body[0]["content"], "second");
}

#[actix_web::test]
async fn missing_content_yields_no_content_status() {
    let harness = common::TestHarness::new();
    let app = test::init_service(common::build_test_app(harness.app_bundle())).await;

    let req = test::TestRequest::post()
        .uri("/cms/content")
        .set_json(json!({"uri": "/x", "element_id": "h1"}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

#[actix_web::test]
async fn get_without_uri_returns_an_empty_list() {
    let harness = common::TestHarness::new();
    let app = test::init_service(common::build_test_app(harness.app_bundle())).await;

    let req = test::TestRequest::get().uri("/cms/content").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body, json!([]));
}

#[actix_web::test]
async fn fragments_are_scoped_to_their_uri() {
    let harness = common::TestHarness::new();
    let app = test::init_service(common::build_test_app(harness.app_bundle())).await;

    for (uri, content) in [("/x", "x content"), ("/y", "y content")] {
        let req = test::TestRequest::post()
            .uri("/cms/content")
            .set_json(json!({"uri": uri, "element_id": "h1", "content": content}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let req = test::TestRequest::get()
        .uri("/cms/content?uri=/y")
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: serde_json::Value = test::read_body_json(resp).await;
    let records = body.as_array().expect("record list");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["content"], "y content");
}
