// This file is part of the product Docroot.
// SPDX-FileCopyrightText: 2025-2026 Docroot Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Lua script host for page data scripts and API scripts.
//!
//! A data script is an ordinary Lua chunk that returns a table of exports:
//!
//! ```lua
//! local M = {}
//! M.context = { greeting = "hello" }       -- static page context
//! function M.get_context(request) ... end  -- dynamic page context
//! function M.GET(request) ... end          -- API handler
//! return M
//! ```
//!
//! `get_context` and API handlers receive a request table (method, path,
//! query/form tables, headers, body, peer address, scheme, host) and return
//! either plain data or a ready response: a table carrying a numeric
//! `status` field plus optional `body`, `content_type` and `headers`.
//!
//! The host is per worker thread. Evaluated exports are kept in a registry
//! keyed by the resource's canonical name and invalidated by file
//! modification time, so editing a script on disk takes effect on the next
//! request without a restart. Scripts run with the full privileges of the
//! server process; they are first-party content, not untrusted input.

use actix_web::HttpRequest;
use mlua::{Lua, LuaSerdeExt, RegistryKey, Table, Value as LuaValue};
use serde::Deserialize;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::Path;
use std::time::SystemTime;

pub const API_METHODS: [&str; 7] = ["GET", "POST", "PUT", "TRACE", "DELETE", "HEAD", "PATCH"];

pub const METHOD_OVERRIDE_PARAM: &str = "_method";

#[derive(Debug)]
pub enum ScriptError {
    Io { script: String, message: String },
    Eval { script: String, message: String },
}

impl std::fmt::Display for ScriptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScriptError::Io { script, message } => {
                write!(f, "Failed to read data script '{}': {}", script, message)
            }
            ScriptError::Eval { script, message } => {
                write!(f, "Failed to evaluate data script '{}': {}", script, message)
            }
        }
    }
}

impl std::error::Error for ScriptError {}

/// A ready HTTP response produced by a script instead of plain data.
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptResponse {
    pub status: u16,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub headers: Option<BTreeMap<String, String>>,
}

/// What a script callable handed back.
#[derive(Debug)]
pub enum ScriptOutcome {
    Empty,
    Data(serde_json::Value),
    Response(ScriptResponse),
}

struct CachedExports {
    modified: Option<SystemTime>,
    exports: RegistryKey,
}

pub struct ScriptHost {
    lua: Lua,
    cache: RefCell<HashMap<String, CachedExports>>,
}

thread_local! {
    static HOST: ScriptHost = ScriptHost::new();
}

/// Runs a closure against this worker thread's script host.
pub fn with_host<R>(f: impl FnOnce(&ScriptHost) -> R) -> R {
    HOST.with(f)
}

impl ScriptHost {
    fn new() -> Self {
        Self {
            lua: Lua::new(),
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Loads the exports table of the script at `path`, keyed by the
    /// resource's canonical `name`. Returns None when the script file does
    /// not exist (a normal outcome). Re-evaluates the chunk only when the
    /// file's modification time changed since the last load.
    pub fn load_exports(&self, name: &str, path: &Path) -> Result<Option<Table>, ScriptError> {
        let modified = match fs::metadata(path) {
            Ok(metadata) => metadata.modified().ok(),
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(ScriptError::Io {
                    script: name.to_string(),
                    message: err.to_string(),
                });
            }
        };

        if let Some(entry) = self.cache.borrow().get(name)
            && entry.modified == modified
            && entry.modified.is_some()
        {
            let table = self
                .lua
                .registry_value::<Table>(&entry.exports)
                .map_err(|err| ScriptError::Eval {
                    script: name.to_string(),
                    message: err.to_string(),
                })?;
            return Ok(Some(table));
        }

        let source = fs::read_to_string(path).map_err(|err| ScriptError::Io {
            script: name.to_string(),
            message: err.to_string(),
        })?;

        let value = self
            .lua
            .load(&source)
            .set_name(format!("@{}", name))
            .eval::<LuaValue>()
            .map_err(|err| ScriptError::Eval {
                script: name.to_string(),
                message: err.to_string(),
            })?;

        let exports = match value {
            LuaValue::Table(table) => table,
            LuaValue::Nil => self.lua.create_table().map_err(|err| ScriptError::Eval {
                script: name.to_string(),
                message: err.to_string(),
            })?,
            other => {
                return Err(ScriptError::Eval {
                    script: name.to_string(),
                    message: format!(
                        "script must return a table of exports, got {}",
                        other.type_name()
                    ),
                });
            }
        };

        let key = self
            .lua
            .create_registry_value(&exports)
            .map_err(|err| ScriptError::Eval {
                script: name.to_string(),
                message: err.to_string(),
            })?;

        if let Some(old) = self.cache.borrow_mut().insert(
            name.to_string(),
            CachedExports {
                modified,
                exports: key,
            },
        ) {
            let _ = self.lua.remove_registry_value(old.exports);
        }

        Ok(Some(exports))
    }

    /// Builds the Lua request table handed to script callables.
    pub fn build_request_table(
        &self,
        req: &HttpRequest,
        body: &[u8],
    ) -> Result<Table, ScriptError> {
        self.try_build_request_table(req, body)
            .map_err(|err| ScriptError::Eval {
                script: req.path().to_string(),
                message: err.to_string(),
            })
    }

    fn try_build_request_table(&self, req: &HttpRequest, body: &[u8]) -> mlua::Result<Table> {
        let table = self.lua.create_table()?;
        let connection = req.connection_info().clone();

        table.set("method", req.method().as_str())?;
        table.set("path", req.path())?;
        table.set("query_string", req.query_string())?;
        table.set("scheme", connection.scheme())?;
        table.set("host", connection.host())?;
        if let Some(peer) = req.peer_addr() {
            table.set("remote_addr", peer.ip().to_string())?;
        }

        let headers = self.lua.create_table()?;
        for (header_name, header_value) in req.headers() {
            headers.set(
                header_name.as_str().to_ascii_lowercase(),
                String::from_utf8_lossy(header_value.as_bytes()).to_string(),
            )?;
        }
        table.set("headers", headers)?;

        let query = self.lua.create_table()?;
        for (key, value) in parse_params(req.query_string()) {
            query.set(key, value)?;
        }
        table.set("query", query)?;

        let form = self.lua.create_table()?;
        for (key, value) in form_params(req, body) {
            form.set(key, value)?;
        }
        table.set("form", form)?;

        table.set("body", String::from_utf8_lossy(body).to_string())?;

        Ok(table)
    }

    /// Classifies a script return value: nil, plain data, or a ready
    /// response (a table with a numeric `status` field).
    pub fn interpret(&self, name: &str, value: LuaValue) -> Result<ScriptOutcome, ScriptError> {
        let eval_error = |message: String| ScriptError::Eval {
            script: name.to_string(),
            message,
        };

        match value {
            LuaValue::Nil => Ok(ScriptOutcome::Empty),
            LuaValue::Table(table) => {
                let status: LuaValue = table
                    .get("status")
                    .map_err(|err| eval_error(err.to_string()))?;
                if matches!(status, LuaValue::Integer(_) | LuaValue::Number(_)) {
                    let response: ScriptResponse = self
                        .lua
                        .from_value(LuaValue::Table(table))
                        .map_err(|err| eval_error(err.to_string()))?;
                    Ok(ScriptOutcome::Response(response))
                } else {
                    let data: serde_json::Value = self
                        .lua
                        .from_value(LuaValue::Table(table))
                        .map_err(|err| eval_error(err.to_string()))?;
                    Ok(ScriptOutcome::Data(data))
                }
            }
            other => {
                let data: serde_json::Value = self
                    .lua
                    .from_value(other)
                    .map_err(|err| eval_error(err.to_string()))?;
                Ok(ScriptOutcome::Data(data))
            }
        }
    }

    #[cfg(test)]
    fn cached_count(&self) -> usize {
        self.cache.borrow().len()
    }
}

pub fn parse_params(input: &str) -> Vec<(String, String)> {
    serde_urlencoded::from_str::<Vec<(String, String)>>(input).unwrap_or_default()
}

/// Form-body parameters, parsed only for urlencoded request bodies.
pub fn form_params(req: &HttpRequest, body: &[u8]) -> Vec<(String, String)> {
    let is_form = req
        .headers()
        .get(actix_web::http::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.starts_with("application/x-www-form-urlencoded"))
        .unwrap_or(false);

    if !is_form {
        return Vec::new();
    }

    match std::str::from_utf8(body) {
        Ok(text) => parse_params(text),
        Err(_) => Vec::new(),
    }
}
