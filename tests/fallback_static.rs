// This file is part of the product Docroot.
// SPDX-FileCopyrightText: 2025-2026 Docroot Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

mod common;

use actix_web::http::StatusCode;
use actix_web::http::header::CONTENT_TYPE;
use actix_web::test;

#[actix_web::test]
async fn static_files_are_served_with_a_mime_type() {
    let harness = common::TestHarness::new();
    harness
        .fixture
        .write_docroot_file("css/site.css", "body { color: red; }")
        .unwrap();
    let app = test::init_service(common::build_test_app(harness.app_bundle())).await;

    let req = test::TestRequest::get().uri("/css/site.css").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let content_type = resp
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");
    assert!(content_type.contains("text/css"));

    let body = test::read_body(resp).await;
    assert!(String::from_utf8_lossy(&body).contains("color: red"));
}

#[actix_web::test]
async fn literal_files_win_over_page_templates() {
    let harness = common::TestHarness::new();
    harness
        .fixture
        .write_docroot_file("page.html", "STATIC")
        .unwrap();
    harness
        .fixture
        .write_docroot_file("page.dt", "TEMPLATE")
        .unwrap();
    let app = test::init_service(common::build_test_app(harness.app_bundle())).await;

    let req = test::TestRequest::get().uri("/page.html").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    assert_eq!(&body[..], b"STATIC");
}

#[actix_web::test]
async fn forbidden_extension_yields_403_even_though_the_file_exists() {
    let harness = common::TestHarness::new();
    harness
        .fixture
        .write_docroot_file("secret.dt", "<p>template source</p>")
        .unwrap();
    let app = test::init_service(common::build_test_app(harness.app_bundle())).await;

    let req = test::TestRequest::get().uri("/secret.dt").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn forbidden_file_name_yields_403() {
    let harness = common::TestHarness::new();
    harness
        .fixture
        .write_docroot_file(".htaccess", "Deny from all")
        .unwrap();
    let app = test::init_service(common::build_test_app(harness.app_bundle())).await;

    let req = test::TestRequest::get().uri("/.htaccess").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn disabled_policy_serves_template_sources() {
    let mut config = common::build_config();
    config.docroot.forbidden.enabled = false;
    let harness = common::TestHarness::with_config(config);
    harness
        .fixture
        .write_docroot_file("secret.dt", "<p>template source</p>")
        .unwrap();
    let app = test::init_service(common::build_test_app(harness.app_bundle())).await;

    let req = test::TestRequest::get().uri("/secret.dt").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn traversal_probes_are_rejected() {
    let harness = common::TestHarness::new();
    let app = test::init_service(common::build_test_app(harness.app_bundle())).await;

    let req = test::TestRequest::get()
        .uri("/static/..%2f..%2fconfig.yaml")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
