// This file is part of the product Docroot.
// SPDX-FileCopyrightText: 2025-2026 Docroot Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

use actix_web::HttpRequest;
use minijinja::{Value, context};
use serde_json::{Map, json};

pub struct ErrorPageContext<'a> {
    app_name: &'a str,
}

impl<'a> ErrorPageContext<'a> {
    pub fn new(app_name: &'a str) -> Self {
        Self { app_name }
    }

    pub fn to_value(&self) -> Value {
        context! {
            app_name => self.app_name,
        }
    }
}

/// Base context every docroot page template receives, before the data
/// script's own keys are merged over it.
pub fn request_context(req: &HttpRequest, app_name: &str) -> Map<String, serde_json::Value> {
    let connection = req.connection_info().clone();

    let mut context = Map::new();
    context.insert("app_name".to_string(), json!(app_name));
    context.insert(
        "request".to_string(),
        json!({
            "path": req.path(),
            "method": req.method().as_str(),
            "query_string": req.query_string(),
            "scheme": connection.scheme(),
            "host": connection.host(),
        }),
    );
    context
}
