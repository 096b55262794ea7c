// This file is part of the product Docroot.
// SPDX-FileCopyrightText: 2025-2026 Docroot Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

//! The docroot fallback: serves pages, data APIs and static files straight
//! from a directory tree instead of one explicit route per page.
//!
//! Registered as the application's `default_service`, so it runs exactly
//! when normal routing produced a "not found" outcome. Resolution order is
//! a deliberate priority: literal files win over templated pages, which win
//! over dynamic APIs, reflecting decreasing specificity and increasing
//! computational cost.

use actix_web::http::{Method, StatusCode, header};
use actix_web::{HttpRequest, HttpResponse, Result, web};
use log::debug;

pub mod api;
pub mod error;
pub mod normalize;
pub mod pages;
pub mod resolve;
pub mod scripts;
pub mod statics;

pub use resolve::{ResolvedResource, ResourceKind, Resolver};

use crate::app_state::AppState;
use crate::config::ValidatedConfig;
use crate::security;
use scripts::ScriptResponse;

pub async fn handle_unrouted(
    req: HttpRequest,
    body: web::Bytes,
    config: web::Data<ValidatedConfig>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    debug!("docroot fallback called: {}", req.path());
    let raw_path = req.path().to_string();

    if !security::route_checks(&raw_path) {
        return error::serve_404(&state.error_renderer, Some(state.templates.as_ref()));
    }

    let accept_language = req
        .headers()
        .get(header::ACCEPT_LANGUAGE)
        .and_then(|value| value.to_str().ok());
    let locale = normalize::active_locale(accept_language, &config.docroot.locales);
    let flags = normalize::NormalizeFlags {
        ignore_locale_prefix: config.docroot.ignore_locale_prefix,
        strip_appended_slash: config.docroot.strip_appended_slash,
    };
    let candidates = normalize::candidate_paths(&raw_path, locale.as_deref(), flags);

    let resolver = Resolver::new(
        &state.runtime_paths.docroot_dir,
        &config.docroot.template_ext,
        &config.docroot.script_ext,
    );

    // Static files are looked up under the literal path only; the locale
    // fallback applies to pages and APIs.
    if let Some(resource) = resolver.resolve(&raw_path, &candidates[..1], ResourceKind::Static) {
        return statics::serve(&resource, &config, &state).await;
    }

    if req.method() == Method::GET
        && let Some(resource) = resolver.resolve(&raw_path, &candidates, ResourceKind::Page)
    {
        return pages::render(&resource, &req, &body, &config, &state).await;
    }

    if let Some(resource) = resolver.resolve(&raw_path, &candidates, ResourceKind::Api) {
        if let Some(response) = api::dispatch(&resource, &req, &body, &config).await? {
            return Ok(response);
        }
    }

    error::serve_404(&state.error_renderer, Some(state.templates.as_ref()))
}

/// Materializes a ready response returned by a script callable.
pub(crate) fn script_response(response: &ScriptResponse) -> HttpResponse {
    let status =
        StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut builder = HttpResponse::build(status);
    builder.content_type(
        response
            .content_type
            .as_deref()
            .unwrap_or("text/html; charset=utf-8"),
    );
    if let Some(headers) = &response.headers {
        for (name, value) in headers {
            builder.insert_header((name.as_str(), value.as_str()));
        }
    }
    builder.body(response.body.clone().unwrap_or_default())
}
