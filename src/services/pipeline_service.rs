use serde::Serialize;
use std::path::PathBuf;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, instrument};

use crate::dto::search_dto::SearchPlan;
use crate::error::Result;
use crate::models::posting::Posting;
use crate::services::enrich_service::{contact_counts, enrich};
use crate::services::export_service::ExportService;
use crate::services::fetch_service::{FetchProgress, FetchService, FetchTask, TaskFailure};
use crate::services::filter_service;
use crate::services::posting_service::PostingService;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// No source returned anything.
    NoResults,
    /// Rows were fetched but none survived the filters.
    NothingPassedFilters,
    Completed,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub status: RunStatus,
    pub fetched: usize,
    pub emails_found: usize,
    pub names_found: usize,
    /// Rows that survived the filters, in pipeline order.
    pub postings: Vec<Posting>,
    pub inserted: u64,
    pub failures: Vec<TaskFailure>,
    pub export_path: Option<PathBuf>,
}

impl RunReport {
    fn empty(status: RunStatus, fetched: usize, failures: Vec<TaskFailure>) -> Self {
        Self {
            status,
            fetched,
            emails_found: 0,
            names_found: 0,
            postings: Vec::new(),
            inserted: 0,
            failures,
            export_path: None,
        }
    }
}

/// Fetch, enrich, filter, persist and optionally export one search.
#[derive(Clone)]
pub struct PipelineService {
    fetch_service: FetchService,
    posting_service: PostingService,
    output_dir: PathBuf,
    filename_prefix: String,
}

impl PipelineService {
    pub fn new(
        fetch_service: FetchService,
        posting_service: PostingService,
        output_dir: PathBuf,
        filename_prefix: String,
    ) -> Self {
        Self {
            fetch_service,
            posting_service,
            output_dir,
            filename_prefix,
        }
    }

    #[instrument(skip_all, fields(terms = ?plan.search_terms))]
    pub async fn run(
        &self,
        plan: &SearchPlan,
        progress: Option<UnboundedSender<FetchProgress>>,
    ) -> Result<RunReport> {
        let tasks = FetchTask::cross_product(
            &plan.search_terms,
            &plan.sources,
            plan.location.as_deref(),
            plan.max_age_hours,
            plan.results_per_source,
        );
        let report = self.fetch_service.run(tasks, progress).await;
        let fetched = report.postings.len();

        if fetched == 0 {
            info!("no postings returned by any source");
            return Ok(RunReport::empty(RunStatus::NoResults, 0, report.failures));
        }

        let enriched = enrich(report.postings);
        let (emails_found, names_found) = contact_counts(&enriched);
        info!(emails_found, names_found, "recruiter contacts extracted");

        let postings = filter_service::apply(enriched, &plan.filters);
        if postings.is_empty() {
            info!(fetched, "no postings passed the filters");
            return Ok(RunReport::empty(
                RunStatus::NothingPassedFilters,
                fetched,
                report.failures,
            ));
        }

        let inserted = self
            .posting_service
            .save(&postings, &plan.combined_term())
            .await?;

        let export_path = match plan.export_format {
            Some(format) => {
                let stem = plan.output_name.clone().unwrap_or_else(|| {
                    ExportService::file_stem(&self.filename_prefix, Some(plan.primary_term()))
                });
                Some(ExportService::export(
                    &postings,
                    &self.output_dir,
                    &stem,
                    format,
                )?)
            }
            None => None,
        };

        info!(
            fetched,
            kept = postings.len(),
            inserted,
            "search run completed"
        );

        Ok(RunReport {
            status: RunStatus::Completed,
            fetched,
            emails_found,
            names_found,
            postings,
            inserted,
            failures: report.failures,
            export_path,
        })
    }
}
