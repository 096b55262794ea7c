// This file is part of the product Docroot.
// SPDX-FileCopyrightText: 2025-2026 Docroot Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

use actix_web::web;

pub mod api;
pub mod store;

pub use store::{ContentRecord, ContentStore};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/cms/content")
            .route(web::get().to(api::get_content))
            .route(web::post().to(api::post_content)),
    );
}
