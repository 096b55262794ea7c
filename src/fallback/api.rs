// This file is part of the product Docroot.
// SPDX-FileCopyrightText: 2025-2026 Docroot Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Method dispatch for docroot API scripts.
//!
//! The script's exports table is inspected for the seven recognized HTTP
//! method names; the set of exported handlers is advertised in the `Allow`
//! header. A `_method` request parameter (query string first, then form
//! body) overrides the actual method, which is handy for testing and for
//! clients stuck behind method-stripping proxies.

use super::resolve::ResolvedResource;
use super::scripts::{self, METHOD_OVERRIDE_PARAM, ScriptError, ScriptOutcome};
use crate::config::ValidatedConfig;
use actix_web::error::ErrorInternalServerError;
use actix_web::{HttpRequest, HttpResponse, Result};
use log::{debug, error};
use mlua::{Function, Value as LuaValue};

enum DispatchError {
    Load(ScriptError),
    Execution(String),
}

pub async fn dispatch(
    resource: &ResolvedResource,
    req: &HttpRequest,
    body: &[u8],
    config: &ValidatedConfig,
) -> Result<Option<HttpResponse>> {
    let outcome = scripts::with_host(|host| run_script(host, resource, req, body));

    match outcome {
        Ok(response) => Ok(response),
        Err(DispatchError::Load(err)) => {
            if config.docroot.debug_scripts {
                return Err(ErrorInternalServerError(err.to_string()));
            }
            error!("{}", err);
            Ok(None)
        }
        Err(DispatchError::Execution(message)) => Err(ErrorInternalServerError(message)),
    }
}

fn run_script(
    host: &scripts::ScriptHost,
    resource: &ResolvedResource,
    req: &HttpRequest,
    body: &[u8],
) -> std::result::Result<Option<HttpResponse>, DispatchError> {
    let exports = host
        .load_exports(&resource.public_name, &resource.file_path)
        .map_err(DispatchError::Load)?;

    let Some(exports) = exports else {
        return Ok(None);
    };

    let mut handlers: Vec<(&'static str, Function)> = Vec::new();
    for method in scripts::API_METHODS {
        let value: LuaValue = exports.get(method).map_err(|err| {
            DispatchError::Load(ScriptError::Eval {
                script: resource.public_name.clone(),
                message: err.to_string(),
            })
        })?;
        if let LuaValue::Function(function) = value {
            handlers.push((method, function));
        }
    }

    let allow = handlers
        .iter()
        .map(|(method, _)| *method)
        .collect::<Vec<_>>()
        .join(",");

    let effective = effective_method(req, body);

    let handler = handlers
        .iter()
        .find(|(method, _)| *method == effective)
        .map(|(_, function)| function);

    let Some(handler) = handler else {
        error!(
            "Found data script [{}] but didn't find method [{}]!",
            resource.file_path.display(),
            effective
        );
        // A script with no recognized methods at all degrades to not found;
        // there is no way to adjust the call to make it work.
        if handlers.is_empty() {
            return Ok(None);
        }
        return Ok(Some(
            HttpResponse::MethodNotAllowed()
                .content_type("text/plain; charset=utf-8")
                .insert_header(("Allow", allow))
                .body(format!("Method Not Supported [{}]!", effective)),
        ));
    };

    let request = host
        .build_request_table(req, body)
        .map_err(DispatchError::Load)?;
    let value: LuaValue = handler
        .call(request)
        .map_err(|err| DispatchError::Execution(err.to_string()))?;
    let outcome = host
        .interpret(&resource.public_name, value)
        .map_err(DispatchError::Load)?;

    let response = match outcome {
        ScriptOutcome::Response(response) => super::script_response(&response),
        ScriptOutcome::Data(data) => {
            let body = serde_json::to_string(&data)
                .map_err(|err| DispatchError::Execution(err.to_string()))?;
            HttpResponse::Ok()
                .content_type("application/json")
                .insert_header(("Allow", allow))
                .body(body)
        }
        ScriptOutcome::Empty => HttpResponse::Ok().insert_header(("Allow", allow)).finish(),
    };

    Ok(Some(response))
}

/// The actual HTTP method, unless a `_method` parameter overrides it.
fn effective_method(req: &HttpRequest, body: &[u8]) -> String {
    let mut method = req.method().as_str().to_string();

    let override_value = scripts::parse_params(req.query_string())
        .into_iter()
        .find(|(key, _)| key == METHOD_OVERRIDE_PARAM)
        .or_else(|| {
            scripts::form_params(req, body)
                .into_iter()
                .find(|(key, _)| key == METHOD_OVERRIDE_PARAM)
        })
        .map(|(_, value)| value);

    if let Some(value) = override_value
        && !value.trim().is_empty()
    {
        let replacement = value.trim().to_ascii_uppercase();
        debug!(
            "Overriding method [{}] with parameter value [{}]",
            method, replacement
        );
        method = replacement;
    }

    method
}
