//! Periodic execution of the searches declared in the schedule file.
//!
//! Every round runs each search through the pipeline without exporting it,
//! merges the surviving rows, deduplicates them by `source_url` and writes a
//! single `{prefix}_{timestamp}` export.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info, warn};

use crate::config::{ScheduleConfig, MAX_INTERVAL_HOURS};
use crate::dto::search_dto::SearchPlan;
use crate::error::Result;
use crate::models::posting::Posting;
use crate::services::export_service::ExportService;
use crate::services::filter_service::deduplicate;
use crate::services::pipeline_service::{PipelineService, RunStatus};

#[derive(Debug, Default)]
pub struct RoundReport {
    pub searches: usize,
    pub failed_searches: usize,
    pub rows: usize,
    pub inserted: u64,
    pub export_path: Option<PathBuf>,
}

pub struct ScheduleService {
    pipeline: PipelineService,
    config: ScheduleConfig,
    plans: Vec<SearchPlan>,
}

impl ScheduleService {
    /// Validates every declared search up front so a bad entry is reported
    /// before the first round.
    pub fn new(pipeline: PipelineService, config: ScheduleConfig) -> Result<Self> {
        let plans = config
            .searches
            .iter()
            .map(|search| SearchPlan::try_from(search.to_request()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            pipeline,
            config,
            plans,
        })
    }

    pub fn interval(&self) -> Duration {
        let hours = self
            .config
            .schedule
            .interval_hours
            .clamp(1, MAX_INTERVAL_HOURS);
        Duration::from_secs(hours * 3600)
    }

    pub async fn run_round(&self) -> Result<RoundReport> {
        let mut report = RoundReport {
            searches: self.plans.len(),
            ..RoundReport::default()
        };
        let mut collected: Vec<Posting> = Vec::new();

        for (i, plan) in self.plans.iter().enumerate() {
            info!(
                search = i + 1,
                of = self.plans.len(),
                term = plan.primary_term(),
                "scheduled search started"
            );
            match self.pipeline.run(plan, None).await {
                Ok(run) if run.status == RunStatus::Completed => {
                    report.inserted += run.inserted;
                    collected.extend(run.postings);
                }
                Ok(run) => info!(status = ?run.status, "scheduled search produced no rows"),
                Err(e) => {
                    report.failed_searches += 1;
                    error!(error = %e, term = plan.primary_term(), "scheduled search failed");
                }
            }
        }

        let merged = deduplicate(collected);
        report.rows = merged.len();
        if merged.is_empty() {
            warn!("no postings found in any scheduled search");
            return Ok(report);
        }

        let output = &self.config.output;
        let stem = ExportService::file_stem(&output.filename_prefix, None);
        report.export_path = Some(ExportService::export(
            &merged,
            &output.directory,
            &stem,
            output.format,
        )?);
        Ok(report)
    }

    async fn run_round_logged(&self) {
        match self.run_round().await {
            Ok(report) => info!(
                rows = report.rows,
                inserted = report.inserted,
                failed_searches = report.failed_searches,
                export = ?report.export_path,
                "scheduled round finished"
            ),
            Err(e) => error!(error = %e, "scheduled round failed"),
        }
    }

    /// Runs one round immediately, then registers the repeating job and
    /// returns the started scheduler.
    pub async fn start(self) -> Result<JobScheduler> {
        let interval = self.interval();
        let service = Arc::new(self);
        service.run_round_logged().await;

        let scheduler = JobScheduler::new().await?;
        let job_service = service.clone();
        let job = Job::new_repeated_async(interval, move |_uuid, _lock| {
            let service = job_service.clone();
            Box::pin(async move {
                service.run_round_logged().await;
            })
        })?;
        scheduler.add(job).await?;
        scheduler.start().await?;

        info!(
            interval_hours = interval.as_secs() / 3600,
            searches = service.plans.len(),
            "scheduler started"
        );
        Ok(scheduler)
    }
}
