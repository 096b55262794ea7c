// This file is part of the product Docroot.
// SPDX-FileCopyrightText: 2025-2026 Docroot Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Serves literal files from the docroot.
//!
//! Template sources and data scripts live next to the static assets, so a
//! forbidden-extensions/file-names policy keeps them from leaking even
//! though they exist on disk.

use super::error;
use super::resolve::ResolvedResource;
use crate::app_state::AppState;
use crate::config::{ForbiddenStaticConfig, ValidatedConfig};
use crate::security;
use crate::util::detect_mime_type;
use actix_web::{HttpResponse, Result};
use log::debug;
use std::path::Path;

pub async fn serve(
    resource: &ResolvedResource,
    config: &ValidatedConfig,
    state: &AppState,
) -> Result<HttpResponse> {
    let forbidden = &config.docroot.forbidden;
    if forbidden.enabled && is_forbidden(&resource.file_path, forbidden) {
        debug!("refusing forbidden static file: {}", resource.resource_path);
        return error::serve_403(&state.error_renderer, Some(state.templates.as_ref()));
    }

    let Some(canonical_path) =
        security::canonical_path_checks(&resource.file_path, &state.runtime_paths.docroot_dir)
    else {
        return error::serve_404(&state.error_renderer, Some(state.templates.as_ref()));
    };

    let content = match tokio::fs::read(&canonical_path).await {
        Ok(content) => content,
        Err(_) => {
            return error::serve_404(&state.error_renderer, Some(state.templates.as_ref()));
        }
    };

    let mime = detect_mime_type(&canonical_path, &content);
    debug!("serving static file: {} ({})", resource.resource_path, mime);

    Ok(HttpResponse::Ok().content_type(mime.as_str()).body(content))
}

/// Matches a file against the forbidden extensions/file-names policy.
pub fn is_forbidden(path: &Path, policy: &ForbiddenStaticConfig) -> bool {
    if let Some(extension) = path.extension().and_then(|ext| ext.to_str()) {
        let dotted = format!(".{}", extension);
        if policy.extensions.iter().any(|entry| entry == &dotted) {
            return true;
        }
    }

    if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str())
        && policy.file_names.iter().any(|entry| entry == stem)
    {
        return true;
    }

    false
}
