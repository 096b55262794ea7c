// This file is part of the product Docroot.
// SPDX-FileCopyrightText: 2025-2026 Docroot Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Maps normalized request paths to on-disk docroot resources.
//!
//! Pages are addressed externally via `.html` (or extensionless) URLs but
//! live on disk with the template extension; APIs are addressed via `.json`
//! and live as `<name>.data.<script-ext>` scripts. Static files are looked
//! up literally. Absence is a normal outcome, never an error.

use log::debug;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Static,
    Page,
    Api,
    NotFound,
}

/// The outcome of resolving one request path against the docroot.
///
/// `public_name` is the externally visible, SEO-preferred name of the
/// resource: it feeds the canonical `Link` header and keys the script
/// registry. `resource_path` is the docroot-relative path of the backing
/// file (the minijinja template name for pages, the script path for APIs).
#[derive(Debug, Clone)]
pub struct ResolvedResource {
    pub original_path: String,
    pub normalized_path: String,
    pub kind: ResourceKind,
    pub file_path: PathBuf,
    pub public_name: String,
    pub resource_path: String,
}

pub struct Resolver<'a> {
    docroot_dir: &'a Path,
    template_ext: &'a str,
    script_ext: &'a str,
}

impl<'a> Resolver<'a> {
    pub fn new(docroot_dir: &'a Path, template_ext: &'a str, script_ext: &'a str) -> Self {
        Self {
            docroot_dir,
            template_ext,
            script_ext,
        }
    }

    /// Tries each candidate in order, stopping at the first that exists.
    pub fn resolve(
        &self,
        original_path: &str,
        candidates: &[String],
        kind: ResourceKind,
    ) -> Option<ResolvedResource> {
        candidates
            .iter()
            .find_map(|candidate| self.resolve_candidate(original_path, candidate, kind))
    }

    fn resolve_candidate(
        &self,
        original_path: &str,
        candidate: &str,
        kind: ResourceKind,
    ) -> Option<ResolvedResource> {
        let (resource_path, public_name) = match kind {
            ResourceKind::Page => self.page_target(candidate)?,
            ResourceKind::Api => self.api_target(candidate)?,
            ResourceKind::Static => (candidate.to_string(), candidate.to_string()),
            ResourceKind::NotFound => return None,
        };

        let file_path = self.docroot_dir.join(&resource_path);
        if !file_path.is_file() {
            return None;
        }
        debug!("found file: {}", file_path.display());

        Some(ResolvedResource {
            original_path: original_path.to_string(),
            normalized_path: candidate.to_string(),
            kind,
            file_path,
            public_name,
            resource_path,
        })
    }

    /// Returns (docroot-relative template path, public name) for a page
    /// candidate without touching the filesystem.
    fn page_target(&self, candidate: &str) -> Option<(String, String)> {
        if let Some(base) = candidate.strip_suffix(".html") {
            // "about.html" -> "about.dt"; the public name keeps ".html".
            Some((
                format!("{}.{}", base, self.template_ext),
                candidate.to_string(),
            ))
        } else if candidate.ends_with('/') {
            Some((
                format!("{}index.{}", candidate, self.template_ext),
                format!("{}index.html", candidate),
            ))
        } else if candidate.is_empty() {
            Some((
                format!("index.{}", self.template_ext),
                "index.html".to_string(),
            ))
        } else {
            // Extensionless page: the public name stays as requested so no
            // canonical header is emitted for the plain URL.
            Some((
                format!("{}.{}", candidate, self.template_ext),
                candidate.to_string(),
            ))
        }
    }

    fn api_target(&self, candidate: &str) -> Option<(String, String)> {
        if let Some(base) = candidate.strip_suffix(".json") {
            // "feed.json" -> "feed.data.lua"; the public name keeps ".json".
            Some((
                format!("{}.data.{}", base, self.script_ext),
                candidate.to_string(),
            ))
        } else if candidate.ends_with('/') {
            Some((
                format!("{}index.data.{}", candidate, self.script_ext),
                format!("{}index.json", candidate),
            ))
        } else if candidate.is_empty() {
            Some((
                format!("index.data.{}", self.script_ext),
                "index.json".to_string(),
            ))
        } else {
            Some((
                format!("{}.data.{}", candidate, self.script_ext),
                format!("{}.json", candidate),
            ))
        }
    }

    /// Derives the sibling data-script path for a resolved page template:
    /// the template suffix is replaced by `data.<script-ext>`.
    pub fn data_script_path(&self, resource: &ResolvedResource) -> Option<PathBuf> {
        let base = resource.resource_path.strip_suffix(self.template_ext)?;
        if !base.ends_with('.') {
            return None;
        }
        Some(
            self.docroot_dir
                .join(format!("{}data.{}", base, self.script_ext)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(root: &Path, relative: &str, contents: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn candidates(path: &str) -> Vec<String> {
        vec![path.to_string()]
    }

    #[test]
    fn trailing_slash_page_resolves_to_index_template() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "test/index.dt", "<html></html>");

        let resolver = Resolver::new(dir.path(), "dt", "lua");
        let resource = resolver
            .resolve("/test/", &candidates("test/"), ResourceKind::Page)
            .expect("resource");

        assert_eq!(resource.resource_path, "test/index.dt");
        assert_eq!(resource.public_name, "test/index.html");
        assert_eq!(resource.kind, ResourceKind::Page);
    }

    #[test]
    fn html_suffix_is_replaced_not_appended() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "about.dt", "<html></html>");

        let resolver = Resolver::new(dir.path(), "dt", "lua");
        let resource = resolver
            .resolve("/about.html", &candidates("about.html"), ResourceKind::Page)
            .expect("resource");

        assert_eq!(resource.resource_path, "about.dt");
        assert_eq!(resource.public_name, "about.html");
    }

    #[test]
    fn extensionless_page_keeps_public_name() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "about.dt", "<html></html>");

        let resolver = Resolver::new(dir.path(), "dt", "lua");
        let resource = resolver
            .resolve("/about", &candidates("about"), ResourceKind::Page)
            .expect("resource");

        assert_eq!(resource.resource_path, "about.dt");
        assert_eq!(resource.public_name, "about");
    }

    #[test]
    fn json_suffix_maps_to_data_script() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "test/index.data.lua", "return {}");

        let resolver = Resolver::new(dir.path(), "dt", "lua");
        let resource = resolver
            .resolve(
                "/test/index.json",
                &candidates("test/index.json"),
                ResourceKind::Api,
            )
            .expect("resource");

        assert_eq!(resource.resource_path, "test/index.data.lua");
        assert_eq!(resource.public_name, "test/index.json");
    }

    #[test]
    fn trailing_slash_api_resolves_to_index_script() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "test/index.data.lua", "return {}");

        let resolver = Resolver::new(dir.path(), "dt", "lua");
        let resource = resolver
            .resolve("/test/", &candidates("test/"), ResourceKind::Api)
            .expect("resource");

        assert_eq!(resource.resource_path, "test/index.data.lua");
        assert_eq!(resource.public_name, "test/index.json");
    }

    #[test]
    fn bare_api_path_gains_json_public_name() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "feed.data.lua", "return {}");

        let resolver = Resolver::new(dir.path(), "dt", "lua");
        let resource = resolver
            .resolve("/feed", &candidates("feed"), ResourceKind::Api)
            .expect("resource");

        assert_eq!(resource.resource_path, "feed.data.lua");
        assert_eq!(resource.public_name, "feed.json");
    }

    #[test]
    fn missing_files_resolve_to_none() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = Resolver::new(dir.path(), "dt", "lua");

        assert!(
            resolver
                .resolve("/nope", &candidates("nope"), ResourceKind::Page)
                .is_none()
        );
        assert!(
            resolver
                .resolve("/nope", &candidates("nope"), ResourceKind::Api)
                .is_none()
        );
        assert!(
            resolver
                .resolve("/nope", &candidates("nope"), ResourceKind::Static)
                .is_none()
        );
    }

    #[test]
    fn resolution_stops_at_first_candidate_hit() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "en/about.dt", "<p>en</p>");
        write(dir.path(), "about.dt", "<p>bare</p>");

        let resolver = Resolver::new(dir.path(), "dt", "lua");
        let all = vec!["en/about".to_string(), "about".to_string()];
        let resource = resolver
            .resolve("/en/about", &all, ResourceKind::Page)
            .expect("resource");

        assert_eq!(resource.resource_path, "en/about.dt");
        assert_eq!(resource.normalized_path, "en/about");
    }

    #[test]
    fn locale_fallback_hits_second_candidate() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "about.dt", "<p>bare</p>");

        let resolver = Resolver::new(dir.path(), "dt", "lua");
        let all = vec!["en/about".to_string(), "about".to_string()];
        let resource = resolver
            .resolve("/en/about", &all, ResourceKind::Page)
            .expect("resource");

        assert_eq!(resource.resource_path, "about.dt");
        assert_eq!(resource.normalized_path, "about");
    }

    #[test]
    fn data_script_path_replaces_template_suffix() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "test/index.dt", "<html></html>");

        let resolver = Resolver::new(dir.path(), "dt", "lua");
        let resource = resolver
            .resolve("/test/", &candidates("test/"), ResourceKind::Page)
            .expect("resource");
        let data_path = resolver.data_script_path(&resource).expect("data path");

        assert!(data_path.ends_with("test/index.data.lua"));
    }
}
