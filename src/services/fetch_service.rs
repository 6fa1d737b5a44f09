use serde::Serialize;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc::UnboundedSender, Mutex};
use tracing::{error, info, instrument, warn};

use crate::models::posting::Posting;
use crate::sources::{AdapterRegistry, FetchOutcome, SearchQuery, SourceKey};

/// One (search term, source) unit of work.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchTask {
    pub source: SourceKey,
    pub query: SearchQuery,
    pub limit: usize,
}

impl FetchTask {
    pub fn new(source: SourceKey, query: SearchQuery, limit: usize) -> Self {
        Self {
            source,
            query,
            limit,
        }
    }

    pub fn label(&self) -> String {
        format!("{} [{}]", self.source.label(), self.query.term)
    }

    /// Every term paired with every source, term-major.
    pub fn cross_product(
        terms: &[String],
        sources: &[SourceKey],
        location: Option<&str>,
        max_age_hours: Option<u32>,
        limit: usize,
    ) -> Vec<FetchTask> {
        terms
            .iter()
            .flat_map(|term| {
                sources.iter().map(move |source| {
                    FetchTask::new(
                        *source,
                        SearchQuery {
                            term: term.clone(),
                            location: location.map(str::to_string),
                            max_age_hours,
                        },
                        limit,
                    )
                })
            })
            .collect()
    }
}

/// Emitted once per finished task; `failed` tasks report zero rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FetchProgress {
    pub completed: usize,
    pub total: usize,
    pub label: String,
    pub fetched: usize,
    pub failed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskFailure {
    pub label: String,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct FetchReport {
    /// Rows of every successful task, in completion order.
    pub postings: Vec<Posting>,
    pub failures: Vec<TaskFailure>,
    pub completed: usize,
}

#[derive(Clone)]
pub struct FetchService {
    registry: AdapterRegistry,
    max_parallel: usize,
}

impl FetchService {
    pub fn new(registry: AdapterRegistry, max_parallel: usize) -> Self {
        Self {
            registry,
            max_parallel: max_parallel.max(1),
        }
    }

    /// Runs every task on a bounded worker pool and waits for all of them.
    /// Failed or panicking tasks are recorded, never propagated.
    #[instrument(skip_all, fields(tasks = tasks.len()))]
    pub async fn run(
        &self,
        tasks: Vec<FetchTask>,
        progress: Option<UnboundedSender<FetchProgress>>,
    ) -> FetchReport {
        let total = tasks.len();
        if total == 0 {
            return FetchReport::default();
        }

        let workers = self.max_parallel.min(total);
        let queue = Arc::new(Mutex::new(tasks.into_iter().collect::<VecDeque<_>>()));
        let sink = Arc::new(Mutex::new(FetchReport::default()));
        let completed = Arc::new(AtomicUsize::new(0));

        info!(total, workers, "dispatching fetch tasks");

        let mut handles = Vec::with_capacity(workers);
        for _ in 0..workers {
            let queue = queue.clone();
            let sink = sink.clone();
            let completed = completed.clone();
            let registry = self.registry.clone();
            let progress = progress.clone();

            handles.push(tokio::spawn(async move {
                loop {
                    let Some(task) = queue.lock().await.pop_front() else {
                        break;
                    };
                    let label = task.label();
                    let result = run_task(&registry, task).await;
                    let done = completed.fetch_add(1, Ordering::SeqCst) + 1;

                    let (fetched, failed) = {
                        let mut report = sink.lock().await;
                        match result {
                            Ok(rows) => {
                                let fetched = rows.len();
                                report.postings.extend(rows);
                                (fetched, false)
                            }
                            Err(reason) => {
                                report.failures.push(TaskFailure {
                                    label: label.clone(),
                                    reason,
                                });
                                (0, true)
                            }
                        }
                    };

                    if let Some(tx) = &progress {
                        let _ = tx.send(FetchProgress {
                            completed: done,
                            total,
                            label,
                            fetched,
                            failed,
                        });
                    }
                }
            }));
        }

        for handle in handles {
            if let Err(e) = handle.await {
                error!(error = %e, "fetch worker stopped unexpectedly");
            }
        }

        let mut report = std::mem::take(&mut *sink.lock().await);
        report.completed = completed.load(Ordering::SeqCst);
        info!(
            completed = report.completed,
            rows = report.postings.len(),
            failures = report.failures.len(),
            "fetch tasks finished"
        );
        report
    }
}

async fn run_task(
    registry: &AdapterRegistry,
    task: FetchTask,
) -> std::result::Result<Vec<Posting>, String> {
    let Some(adapter) = registry.get(task.source) else {
        warn!(source = %task.source, "no adapter registered");
        return Err(format!("no adapter registered for '{}'", task.source));
    };

    let FetchTask { query, limit, .. } = task;
    let handle = tokio::spawn(async move { adapter.fetch(&query, limit).await });
    match handle.await {
        Ok(FetchOutcome::Success(rows)) => Ok(rows),
        Ok(FetchOutcome::Failure(failure)) => Err(failure.message),
        Err(e) => {
            error!(error = %e, "source task aborted");
            Err(format!("task aborted: {}", e))
        }
    }
}
