// This file is part of the product Docroot.
// SPDX-FileCopyrightText: 2025-2026 Docroot Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

use once_cell::sync::Lazy;
use pulldown_cmark::{Options, Parser, html};
use regex::Regex;

static EXTERNAL_LINK_REGEX: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r#"<a href="(https?://[^"]+)"([^>]*)>"#));

pub fn markdown_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options
}

pub fn render_markdown(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, markdown_options());
    let mut html_output = String::new();
    html::push_html(&mut html_output, parser);
    mark_external_links(html_output)
}

/// External links open in a new tab; local links are left alone.
fn mark_external_links(html: String) -> String {
    match EXTERNAL_LINK_REGEX.as_ref() {
        Ok(regex) => regex
            .replace_all(&html, r#"<a href="$1"$2 target="_blank" rel="noopener">"#)
            .into_owned(),
        Err(_) => html,
    }
}
