// This file is part of the product Docroot.
// SPDX-FileCopyrightText: 2025-2026 Docroot Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

mod common;

use actix_web::http::StatusCode;
use actix_web::http::header::CONTENT_TYPE;
use actix_web::test;

const GET_ONLY_SCRIPT: &str = "local M = {}\nfunction M.GET(request)\n  return { a = 1 }\nend\nreturn M";

#[actix_web::test]
async fn json_path_dispatches_to_get_handler() {
    let harness = common::TestHarness::new();
    harness
        .fixture
        .write_docroot_file("test/index.data.lua", GET_ONLY_SCRIPT)
        .unwrap();
    let app = test::init_service(common::build_test_app(harness.app_bundle())).await;

    let req = test::TestRequest::get().uri("/test/index.json").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("Allow").and_then(|v| v.to_str().ok()),
        Some("GET")
    );
    let content_type = resp
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    assert!(content_type.contains("application/json"));

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["a"], 1);
}

#[actix_web::test]
async fn trailing_slash_path_reaches_the_index_script() {
    let harness = common::TestHarness::new();
    harness
        .fixture
        .write_docroot_file("test/index.data.lua", GET_ONLY_SCRIPT)
        .unwrap();
    let app = test::init_service(common::build_test_app(harness.app_bundle())).await;

    let req = test::TestRequest::get().uri("/test/").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["a"], 1);
}

#[actix_web::test]
async fn query_method_override_wins_over_the_actual_method() {
    let harness = common::TestHarness::new();
    harness
        .fixture
        .write_docroot_file(
            "switch.data.lua",
            "local M = {}\nfunction M.GET(request)\n  return { handler = \"get\" }\nend\nfunction M.POST(request)\n  return { handler = \"post\" }\nend\nreturn M",
        )
        .unwrap();
    let app = test::init_service(common::build_test_app(harness.app_bundle())).await;

    let req = test::TestRequest::get()
        .uri("/switch.json?_method=POST")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["handler"], "post");
}

#[actix_web::test]
async fn form_method_override_is_honored() {
    let harness = common::TestHarness::new();
    harness
        .fixture
        .write_docroot_file(
            "switch.data.lua",
            "local M = {}\nfunction M.PUT(request)\n  return { handler = \"put\" }\nend\nreturn M",
        )
        .unwrap();
    let app = test::init_service(common::build_test_app(harness.app_bundle())).await;

    let req = test::TestRequest::post()
        .uri("/switch.json")
        .insert_header((CONTENT_TYPE, "application/x-www-form-urlencoded"))
        .set_payload("_method=put")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["handler"], "put");
}

#[actix_web::test]
async fn unsupported_method_yields_405_with_allow_header() {
    let harness = common::TestHarness::new();
    harness
        .fixture
        .write_docroot_file("only-get.data.lua", GET_ONLY_SCRIPT)
        .unwrap();
    let app = test::init_service(common::build_test_app(harness.app_bundle())).await;

    let req = test::TestRequest::delete().uri("/only-get.json").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(
        resp.headers().get("Allow").and_then(|v| v.to_str().ok()),
        Some("GET")
    );
}

#[actix_web::test]
async fn script_without_handlers_degrades_to_not_found() {
    let harness = common::TestHarness::new();
    harness
        .fixture
        .write_docroot_file("inert.data.lua", "return { context = { a = 1 } }")
        .unwrap();
    let app = test::init_service(common::build_test_app(harness.app_bundle())).await;

    let req = test::TestRequest::get().uri("/inert.json").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn ready_response_from_handler_is_returned_verbatim() {
    let harness = common::TestHarness::new();
    harness
        .fixture
        .write_docroot_file(
            "made.data.lua",
            "local M = {}\nfunction M.POST(request)\n  return { status = 201, body = \"made\", content_type = \"text/plain\" }\nend\nreturn M",
        )
        .unwrap();
    let app = test::init_service(common::build_test_app(harness.app_bundle())).await;

    let req = test::TestRequest::post().uri("/made.json").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = test::read_body(resp).await;
    assert_eq!(&body[..], b"made");
}

#[actix_web::test]
async fn handlers_see_query_parameters() {
    let harness = common::TestHarness::new();
    harness
        .fixture
        .write_docroot_file(
            "echo.data.lua",
            "local M = {}\nfunction M.GET(request)\n  return { name = request.query.name }\nend\nreturn M",
        )
        .unwrap();
    let app = test::init_service(common::build_test_app(harness.app_bundle())).await;

    let req = test::TestRequest::get()
        .uri("/echo.json?name=world")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["name"], "world");
}

#[actix_web::test]
async fn broken_api_script_is_not_found_in_production() {
    let harness = common::TestHarness::new();
    harness
        .fixture
        .write_docroot_file("broken.data.lua", "return {")
        .unwrap();
    let app = test::init_service(common::build_test_app(harness.app_bundle())).await;

    let req = test::TestRequest::get().uri("/broken.json").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn broken_api_script_surfaces_in_debug_mode() {
    let mut config = common::build_config();
    config.docroot.debug_scripts = true;
    let harness = common::TestHarness::with_config(config);
    harness
        .fixture
        .write_docroot_file("broken.data.lua", "return {")
        .unwrap();
    let app = test::init_service(common::build_test_app(harness.app_bundle())).await;

    let req = test::TestRequest::get().uri("/broken.json").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
