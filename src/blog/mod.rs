// This file is part of the product Docroot.
// SPDX-FileCopyrightText: 2025-2026 Docroot Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Lightweight blog: markdown posts with tags and hierarchical categories.

use actix_web::{HttpResponse, Result, web};
use minijinja::context;

pub mod markdown;
pub mod posts;

pub use posts::Post;

use crate::app_state::AppState;
use crate::config::ValidatedConfig;
use crate::fallback::error;

pub fn configure(cfg: &mut web::ServiceConfig, config: &ValidatedConfig) {
    if !config.blog.enabled {
        return;
    }
    cfg.route("/blog", web::get().to(index))
        .route("/blog/tag/{tag}", web::get().to(by_tag))
        .route("/blog/category/{category:.*}", web::get().to(by_category))
        .route("/blog/{slug}", web::get().to(detail));
}

async fn index(
    config: web::Data<ValidatedConfig>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let posts = posts::scan_posts(&state.runtime_paths.blog_dir);
    render_listing(&config, &state, &config.blog.title, posts)
}

async fn by_tag(
    path: web::Path<String>,
    config: web::Data<ValidatedConfig>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let tag = path.into_inner();
    let posts: Vec<Post> = posts::scan_posts(&state.runtime_paths.blog_dir)
        .into_iter()
        .filter(|post| post.has_tag(&tag))
        .collect();
    let title = format!("Posts tagged '{}'", tag);
    render_listing(&config, &state, &title, posts)
}

async fn by_category(
    path: web::Path<String>,
    config: web::Data<ValidatedConfig>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let category = path.into_inner();
    let posts: Vec<Post> = posts::scan_posts(&state.runtime_paths.blog_dir)
        .into_iter()
        .filter(|post| post.in_category(&category))
        .collect();
    let title = format!("Posts in '{}'", category);
    render_listing(&config, &state, &title, posts)
}

async fn detail(
    path: web::Path<String>,
    config: web::Data<ValidatedConfig>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let slug = path.into_inner();
    let Some(post) = posts::find_post(&state.runtime_paths.blog_dir, &slug) else {
        return error::serve_404(&state.error_renderer, Some(state.templates.as_ref()));
    };

    let template_context = context! {
        app_name => config.app.name,
        post => post,
    };

    match state.templates.render("blog/post.html", template_context) {
        Ok(html) => Ok(HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(html)),
        Err(err) => {
            log::error!("Failed to render blog post '{}': {}", slug, err);
            error::serve_500(&state.error_renderer, Some(state.templates.as_ref()))
        }
    }
}

fn render_listing(
    config: &ValidatedConfig,
    state: &AppState,
    title: &str,
    posts: Vec<Post>,
) -> Result<HttpResponse> {
    let template_context = context! {
        app_name => config.app.name,
        title => title,
        posts => posts,
    };

    match state.templates.render("blog/index.html", template_context) {
        Ok(html) => Ok(HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(html)),
        Err(err) => {
            log::error!("Failed to render blog listing '{}': {}", title, err);
            error::serve_500(&state.error_renderer, Some(state.templates.as_ref()))
        }
    }
}
