// This file is part of the product Docroot.
// SPDX-FileCopyrightText: 2025-2026 Docroot Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

//! JSON API for editable content fragments, keyed on `(uri, element_id)`.

use super::store::ContentStore;
use actix_web::error::ErrorInternalServerError;
use actix_web::{HttpResponse, Result, web};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ContentQuery {
    pub uri: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ContentPayload {
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub element_id: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Serialize)]
struct ContentView<'a> {
    uri: &'a str,
    element_id: Option<&'a str>,
    content: &'a str,
}

pub async fn get_content(
    query: web::Query<ContentQuery>,
    store: web::Data<ContentStore>,
) -> Result<HttpResponse> {
    let records = match query.uri.as_deref() {
        Some(uri) => store.list_by_uri(uri),
        None => Vec::new(),
    };

    let views: Vec<ContentView<'_>> = records
        .iter()
        .map(|record| ContentView {
            uri: &record.uri,
            element_id: record.element_id.as_deref(),
            content: &record.content,
        })
        .collect();

    Ok(HttpResponse::Ok().json(views))
}

pub async fn post_content(
    payload: web::Json<ContentPayload>,
    store: web::Data<ContentStore>,
) -> Result<HttpResponse> {
    let Some(content) = payload.content.as_deref() else {
        return Ok(HttpResponse::NoContent().finish());
    };

    let uri = payload.uri.as_deref().unwrap_or("");
    let record = store
        .upsert(uri, payload.element_id.as_deref(), content)
        .map_err(|err| ErrorInternalServerError(err.to_string()))?;

    Ok(HttpResponse::Ok().json(record))
}
