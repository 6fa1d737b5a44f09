pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod models;
pub mod patterns;
pub mod services;
pub mod sources;
pub mod utils;

use crate::config::Config;
use crate::error::Result;
use crate::services::{
    fetch_service::FetchService, pipeline_service::PipelineService,
    posting_service::PostingService,
};
use crate::sources::{build_http_client, AdapterRegistry};
use sqlx::SqlitePool;
use std::time::Duration;

#[derive(Clone)]
pub struct AppState {
    pub posting_service: PostingService,
    pub pipeline_service: PipelineService,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: &Config) -> Result<Self> {
        let http_client = build_http_client(Duration::from_secs(config.request_timeout_secs))?;
        let registry = AdapterRegistry::with_defaults(http_client);
        Ok(Self::with_registry(pool, config, registry))
    }

    /// Same wiring over a caller-supplied adapter set.
    pub fn with_registry(pool: SqlitePool, config: &Config, registry: AdapterRegistry) -> Self {
        let posting_service = PostingService::new(pool);
        let fetch_service = FetchService::new(registry, config.max_parallel_fetches);
        let pipeline_service = PipelineService::new(
            fetch_service,
            posting_service.clone(),
            config.output_dir.clone(),
            config.filename_prefix.clone(),
        );

        Self {
            posting_service,
            pipeline_service,
        }
    }
}
