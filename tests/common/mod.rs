// This file is part of the product Docroot.
// SPDX-FileCopyrightText: 2025-2026 Docroot Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

#![allow(dead_code)]

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};
use docroot::app_state::AppState;
use docroot::blog;
use docroot::config::{
    AppConfig, BlogConfig, DocrootConfig, LoggingConfig, ServerConfig, ValidatedConfig,
};
use docroot::content::{self, ContentStore};
use docroot::fallback;
use docroot::runtime_paths::RuntimePaths;
use docroot::util::test_fixtures::TestFixtureRoot;
use std::sync::Arc;

pub struct TestHarness {
    pub fixture: TestFixtureRoot,
    pub config: Arc<ValidatedConfig>,
    pub runtime_paths: RuntimePaths,
    pub app_state: Arc<AppState>,
    pub content_store: Arc<ContentStore>,
}

#[derive(Clone)]
pub struct AppBundle {
    pub config: Arc<ValidatedConfig>,
    pub app_state: Arc<AppState>,
    pub content_store: Arc<ContentStore>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_config(build_config())
    }

    pub fn with_config(config: ValidatedConfig) -> Self {
        let fixture = TestFixtureRoot::new_unique("docroot-test-suite").expect("fixture root");
        fixture.init_runtime_layout().expect("fixture layout");

        let runtime_paths = fixture.runtime_paths().expect("runtime paths");
        let config = Arc::new(config);
        let app_state = Arc::new(AppState::new(&config.app.name, runtime_paths.clone()));
        let content_store = Arc::new(
            ContentStore::open(runtime_paths.content_store_file()).expect("content store"),
        );

        Self {
            fixture,
            config,
            runtime_paths,
            app_state,
            content_store,
        }
    }

    pub fn app_bundle(&self) -> AppBundle {
        AppBundle {
            config: self.config.clone(),
            app_state: self.app_state.clone(),
            content_store: self.content_store.clone(),
        }
    }
}

pub fn build_config() -> ValidatedConfig {
    ValidatedConfig {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            workers: 1,
        },
        app: AppConfig {
            name: "Test Docroot".to_string(),
            description: "Test site".to_string(),
        },
        logging: LoggingConfig::default(),
        docroot: DocrootConfig::default(),
        blog: BlogConfig::default(),
    }
}

pub fn build_test_app(
    bundle: AppBundle,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let config_for_blog = bundle.config.clone();

    App::new()
        .app_data(web::Data::from(bundle.config))
        .app_data(web::Data::from(bundle.app_state))
        .app_data(web::Data::from(bundle.content_store))
        .configure(content::configure)
        .configure(move |cfg| blog::configure(cfg, &config_for_blog))
        .default_service(web::route().to(fallback::handle_unrouted))
}
