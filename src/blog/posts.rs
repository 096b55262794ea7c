// This file is part of the product Docroot.
// SPDX-FileCopyrightText: 2025-2026 Docroot Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Blog posts are markdown files with YAML front matter in the blog
//! directory; the file stem is the default slug. Posts are re-read per
//! request so edits show up without a restart.

use super::markdown::render_markdown;
use chrono::{DateTime, NaiveDate, Utc};
use gray_matter::Matter;
use gray_matter::engine::YAML;
use log::warn;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize)]
pub struct Post {
    pub title: String,
    pub slug: String,
    pub tags: Vec<String>,
    pub categories: Vec<String>,
    pub publish_date: Option<DateTime<Utc>>,
    pub expire_date: Option<DateTime<Utc>>,
    pub teaser_html: Option<String>,
    pub content_html: String,
}

#[derive(Debug, Default, Deserialize)]
struct FrontMatter {
    title: Option<String>,
    slug: Option<String>,
    teaser: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    categories: Vec<String>,
    publish_date: Option<String>,
    expire_date: Option<String>,
}

impl Post {
    /// Published and not expired.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        if let Some(publish) = self.publish_date
            && publish > now
        {
            return false;
        }
        if let Some(expire) = self.expire_date
            && expire <= now
        {
            return false;
        }
        true
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|entry| entry == tag)
    }

    /// Categories are paths; a post in "tech/linux" is also listed under
    /// "tech".
    pub fn in_category(&self, category: &str) -> bool {
        self.categories.iter().any(|entry| {
            entry == category || entry.starts_with(&format!("{}/", category))
        })
    }
}

/// All live posts, newest first.
pub fn scan_posts(blog_dir: &Path) -> Vec<Post> {
    let now = Utc::now();
    let mut posts = read_all_posts(blog_dir);
    posts.retain(|post| post.is_live(now));
    posts.sort_by_key(|post| (Reverse(post.publish_date), post.title.clone()));
    posts
}

pub fn find_post(blog_dir: &Path, slug: &str) -> Option<Post> {
    let now = Utc::now();
    read_all_posts(blog_dir)
        .into_iter()
        .find(|post| post.slug == slug && post.is_live(now))
}

fn read_all_posts(blog_dir: &Path) -> Vec<Post> {
    let entries = match fs::read_dir(blog_dir) {
        Ok(entries) => entries,
        Err(_) => return Vec::new(),
    };

    let mut posts = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        let is_markdown = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("md") || ext.eq_ignore_ascii_case("markdown"))
            .unwrap_or(false);
        if !is_markdown {
            continue;
        }
        match parse_post(&path) {
            Some(post) => posts.push(post),
            None => warn!("Skipping unreadable blog post: {}", path.display()),
        }
    }
    posts
}

fn parse_post(path: &Path) -> Option<Post> {
    let source = fs::read_to_string(path).ok()?;
    let stem = path.file_stem()?.to_str()?.to_string();

    let matter = Matter::<YAML>::new();
    let parsed = matter.parse(&source);
    let front: FrontMatter = parsed
        .data
        .as_ref()
        .and_then(|data| data.deserialize().ok())
        .unwrap_or_default();

    let slug = front.slug.unwrap_or_else(|| stem.clone());
    let title = front.title.unwrap_or(stem);

    Some(Post {
        title,
        slug,
        tags: front.tags,
        categories: front.categories,
        publish_date: front.publish_date.as_deref().and_then(parse_date),
        expire_date: front.expire_date.as_deref().and_then(parse_date),
        teaser_html: front.teaser.as_deref().map(render_markdown),
        content_html: render_markdown(&parsed.content),
    })
}

/// RFC 3339 or a bare date.
fn parse_date(input: &str) -> Option<DateTime<Utc>> {
    if let Ok(datetime) = DateTime::parse_from_rfc3339(input.trim()) {
        return Some(datetime.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").ok()?;
    Some(DateTime::from_naive_utc_and_offset(
        date.and_hms_opt(0, 0, 0)?,
        Utc,
    ))
}
