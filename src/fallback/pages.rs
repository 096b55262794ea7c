// This file is part of the product Docroot.
// SPDX-FileCopyrightText: 2025-2026 Docroot Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Renders a resolved page template with its data-script context.
//!
//! The sibling data script (if any) contributes the render context: a
//! `get_context(request)` function wins over a static `context` table. A
//! ready response returned by `get_context` short-circuits rendering
//! entirely, which is how scripts redirect on bad data. Script load errors
//! are swallowed (empty context) unless `docroot.debug_scripts` is set.

use super::resolve::{ResolvedResource, Resolver};
use super::scripts::{self, ScriptError, ScriptOutcome, ScriptResponse};
use crate::app_state::AppState;
use crate::config::ValidatedConfig;
use crate::templates::request_context;
use actix_web::error::ErrorInternalServerError;
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, Result};
use log::{debug, error, warn};
use minijinja::{AutoEscape, Environment, Value, path_loader};
use serde_json::Map;
use std::path::Path;

enum PageData {
    Context(Map<String, serde_json::Value>),
    Response(ScriptResponse),
}

enum ContextError {
    Load(ScriptError),
    Execution(String),
}

pub async fn render(
    resource: &ResolvedResource,
    req: &HttpRequest,
    body: &[u8],
    config: &ValidatedConfig,
    state: &AppState,
) -> Result<HttpResponse> {
    let resolver = Resolver::new(
        &state.runtime_paths.docroot_dir,
        &config.docroot.template_ext,
        &config.docroot.script_ext,
    );

    let script_context = match resolver.data_script_path(resource) {
        Some(data_path) => load_script_context(resource, req, body, &data_path),
        None => Ok(PageData::Context(Map::new())),
    };

    let script_context = match script_context {
        Ok(data) => data,
        Err(ContextError::Load(err)) => {
            if config.docroot.debug_scripts {
                return Err(ErrorInternalServerError(err.to_string()));
            }
            error!("{}", err);
            PageData::Context(Map::new())
        }
        Err(ContextError::Execution(message)) => {
            return Err(ErrorInternalServerError(message));
        }
    };

    let context = match script_context {
        PageData::Response(response) => return Ok(super::script_response(&response)),
        PageData::Context(map) => map,
    };

    let mut template_context = request_context(req, &config.app.name);
    for (key, value) in context {
        template_context.insert(key, value);
    }

    debug!("rendering template: {}", resource.resource_path);
    let env = page_environment(&state.runtime_paths.docroot_dir);
    let html = env
        .get_template(&resource.resource_path)
        .and_then(|template| template.render(Value::from_serialize(&template_context)))
        .map_err(|err| {
            error!(
                "Failed to render page template '{}': {}",
                resource.resource_path, err
            );
            ErrorInternalServerError(err.to_string())
        })?;

    let mut builder = HttpResponse::build(StatusCode::OK);
    builder.content_type("text/html; charset=utf-8");

    // Canonical link so search engines collapse the URL variants that reach
    // the same template (with/without trailing slash, with/without .html).
    if req.path() != format!("/{}", resource.public_name) {
        let connection = req.connection_info().clone();
        if !connection.scheme().is_empty() && !connection.host().is_empty() {
            builder.insert_header((
                "Link",
                format!(
                    "< {}://{}/{} >; rel=\"canonical\"",
                    connection.scheme(),
                    connection.host(),
                    resource.public_name
                ),
            ));
        }
    }

    Ok(builder.body(html))
}

fn load_script_context(
    resource: &ResolvedResource,
    req: &HttpRequest,
    body: &[u8],
    data_path: &Path,
) -> std::result::Result<PageData, ContextError> {
    scripts::with_host(|host| {
        let exports = host
            .load_exports(&resource.public_name, data_path)
            .map_err(ContextError::Load)?;

        let Some(exports) = exports else {
            return Ok(PageData::Context(Map::new()));
        };

        let get_context: mlua::Value = exports
            .get("get_context")
            .map_err(|err| ContextError::Load(eval_error(resource, err)))?;

        let outcome = if let mlua::Value::Function(get_context) = get_context {
            let request = host
                .build_request_table(req, body)
                .map_err(ContextError::Load)?;
            let value: mlua::Value = get_context
                .call(request)
                .map_err(|err| ContextError::Execution(err.to_string()))?;
            host.interpret(&resource.public_name, value)
                .map_err(ContextError::Load)?
        } else {
            let static_context: mlua::Value = exports
                .get("context")
                .map_err(|err| ContextError::Load(eval_error(resource, err)))?;
            host.interpret(&resource.public_name, static_context)
                .map_err(ContextError::Load)?
        };

        match outcome {
            ScriptOutcome::Empty => Ok(PageData::Context(Map::new())),
            ScriptOutcome::Response(response) => Ok(PageData::Response(response)),
            ScriptOutcome::Data(serde_json::Value::Object(map)) => Ok(PageData::Context(map)),
            ScriptOutcome::Data(other) => {
                warn!(
                    "Data script for '{}' produced a non-mapping context ({}), ignoring",
                    resource.public_name,
                    json_type_name(&other)
                );
                Ok(PageData::Context(Map::new()))
            }
        }
    })
}

fn page_environment(docroot_dir: &Path) -> Environment<'static> {
    let mut env = Environment::new();
    env.set_loader(path_loader(docroot_dir));
    // Page templates use the docroot extension, not .html, so force HTML
    // auto-escaping rather than relying on the extension heuristic.
    env.set_auto_escape_callback(|_| AutoEscape::Html);
    env
}

fn eval_error(resource: &ResolvedResource, err: mlua::Error) -> ScriptError {
    ScriptError::Eval {
        script: resource.public_name.clone(),
        message: err.to_string(),
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
