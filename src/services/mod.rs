pub mod enrich_service;
pub mod export_service;
pub mod fetch_service;
pub mod filter_service;
pub mod pipeline_service;
pub mod posting_service;
pub mod schedule_service;
