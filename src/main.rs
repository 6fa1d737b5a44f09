use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use vagas_aggregator::{
    config::{get_config, init_config, ScheduleConfig},
    database::pool::{create_pool, run_migrations},
    dto::{
        history_dto::HistoryQuery,
        search_dto::{ExportFormat, SearchPlan, SearchRequest},
    },
    models::posting::Posting,
    services::{
        fetch_service::FetchProgress,
        pipeline_service::RunStatus,
        schedule_service::ScheduleService,
    },
    sources::SourceKey,
    utils::text::truncate_chars,
    AppState,
};

const SUMMARY_ROWS: usize = 15;

#[derive(Parser)]
#[command(name = "vagas")]
#[command(about = "Aggregates job postings from Brazilian job boards and social posts")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search now, store new postings and export the result
    Search {
        /// Search term; repeat for several
        #[arg(short = 's', long = "search", required = true)]
        terms: Vec<String>,
        #[arg(short, long, default_value = "Brazil")]
        location: String,
        #[arg(long, num_args = 1.., default_values_t = ["linkedin".to_string(), "gupy".to_string(), "remoteok".to_string()])]
        sources: Vec<String>,
        /// Results per source
        #[arg(long, default_value_t = 25)]
        results: usize,
        #[arg(long, default_value_t = 168)]
        hours_old: u32,
        /// Comma separated, e.g. "python,django"
        #[arg(long, value_delimiter = ',')]
        skills: Vec<String>,
        /// trainee, junior, pleno (mid), senior
        #[arg(long, num_args = 1..)]
        seniority: Vec<String>,
        #[arg(long)]
        remote: bool,
        #[arg(long, default_value = "csv")]
        format: String,
        /// Output file name without extension
        #[arg(long)]
        output: Option<String>,
        #[arg(long)]
        no_export: bool,
    },

    /// Run the searches declared in the schedule file periodically
    Schedule {
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print the effective schedule configuration
    Config {
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List stored postings, most recent first
    History {
        #[arg(long, default_value_t = 20)]
        limit: i64,
        /// Matches title, company or search term
        #[arg(long)]
        filter: Option<String>,
        #[arg(long)]
        site: Option<String>,
    },

    /// Summary of the stored history
    Stats,

    /// Delete the whole history
    Clear {
        #[arg(long)]
        yes: bool,
    },

    /// List the available sources
    Sources,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    init_config()?;

    let cli = Cli::parse();
    match cli.command {
        Commands::Search {
            terms,
            location,
            sources,
            results,
            hours_old,
            skills,
            seniority,
            remote,
            format,
            output,
            no_export,
        } => {
            let export_format = if no_export {
                None
            } else {
                Some(format.parse::<ExportFormat>()?)
            };
            let request = SearchRequest {
                search_terms: terms,
                sources,
                location,
                results_per_source: results,
                max_age_hours: Some(hours_old),
                skills,
                seniority,
                remote_only: remote,
                export_format,
                output_name: output,
            };
            cmd_search(request).await
        }
        Commands::Schedule { config } => cmd_schedule(config).await,
        Commands::Config { config } => cmd_config(config),
        Commands::History { limit, filter, site } => {
            cmd_history(HistoryQuery {
                limit,
                text: filter,
                site,
            })
            .await
        }
        Commands::Stats => cmd_stats().await,
        Commands::Clear { yes } => cmd_clear(yes).await,
        Commands::Sources => {
            cmd_sources();
            Ok(())
        }
    }
}

async fn app_state() -> Result<AppState> {
    let config = get_config();
    let pool = create_pool(&config.database_url, config.database_max_connections).await?;
    run_migrations(&pool).await?;
    Ok(AppState::new(pool, config)?)
}

async fn cmd_search(request: SearchRequest) -> Result<()> {
    let plan = SearchPlan::try_from(request)?;
    let state = app_state().await?;

    let (tx, mut rx) = mpsc::unbounded_channel::<FetchProgress>();
    let printer = tokio::spawn(async move {
        while let Some(p) = rx.recv().await {
            let status = if p.failed {
                "failed".to_string()
            } else {
                format!("{} rows", p.fetched)
            };
            eprintln!("  [{}/{}] {}: {}", p.completed, p.total, p.label, status);
        }
    });

    let report = state.pipeline_service.run(&plan, Some(tx)).await?;
    let _ = printer.await;

    for failure in &report.failures {
        eprintln!("  ! {}: {}", failure.label, failure.reason);
    }

    match report.status {
        RunStatus::NoResults => {
            println!("No postings found. Try other terms or sources.");
        }
        RunStatus::NothingPassedFilters => {
            println!("{} postings found, none passed the filters.", report.fetched);
        }
        RunStatus::Completed => {
            println!(
                "\n{} postings after filters ({} new in history, {} with recruiter email)",
                report.postings.len(),
                report.inserted,
                report.emails_found
            );
            print_summary(&report.postings);
            if let Some(path) = &report.export_path {
                println!("\nSaved to: {}", path.display());
            }
        }
    }
    Ok(())
}

async fn cmd_schedule(path: Option<PathBuf>) -> Result<()> {
    let path = path.unwrap_or_else(|| get_config().schedule_file.clone());
    let schedule = ScheduleConfig::load(&path)?;
    let state = app_state().await?;

    let service = ScheduleService::new(state.pipeline_service.clone(), schedule)?;
    let mut scheduler = service.start().await?;

    info!("press Ctrl+C to stop");
    tokio::signal::ctrl_c().await?;
    scheduler.shutdown().await?;
    info!("scheduler stopped");
    Ok(())
}

fn cmd_config(path: Option<PathBuf>) -> Result<()> {
    let path = path.unwrap_or_else(|| get_config().schedule_file.clone());
    let schedule = ScheduleConfig::load(&path)?;
    println!("Effective configuration ({}):\n", path.display());
    println!("{}", toml::to_string_pretty(&schedule)?);
    Ok(())
}

async fn cmd_history(query: HistoryQuery) -> Result<()> {
    let state = app_state().await?;
    let rows = state.posting_service.load(&query).await?;
    if rows.is_empty() {
        println!("History is empty.");
        return Ok(());
    }

    println!(
        "{:<17} {:<16} {:<40} {:<24} {}",
        "COLLECTED", "SITE", "TITLE", "COMPANY", "RECRUITER EMAIL"
    );
    for row in &rows {
        println!(
            "{:<17} {:<16} {:<40} {:<24} {}",
            row.collected_at
                .with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M"),
            truncate_chars(&row.site, 15),
            truncate_chars(row.title.as_deref().unwrap_or("—"), 39),
            truncate_chars(row.company.as_deref().unwrap_or("—"), 23),
            row.recruiter_email.as_deref().unwrap_or("—"),
        );
    }

    let sites = state.posting_service.distinct_sites().await?;
    println!("\n{} rows shown. Sites in history: {}", rows.len(), sites.join(", "));
    Ok(())
}

async fn cmd_stats() -> Result<()> {
    let state = app_state().await?;
    let stats = state.posting_service.stats().await?;

    println!("Total postings:        {}", stats.total);
    println!("With recruiter email:  {}", stats.with_recruiter_email);
    match stats.most_recent_collection {
        Some(at) => println!(
            "Last collection:       {}",
            at.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M")
        ),
        None => println!("Last collection:       never"),
    }
    if !stats.per_site.is_empty() {
        println!("\nPer site:");
        for (site, count) in &stats.per_site {
            println!("  {:<24} {}", site, count);
        }
    }
    Ok(())
}

async fn cmd_clear(yes: bool) -> Result<()> {
    if !yes {
        println!("This deletes the whole history. Re-run with --yes to confirm.");
        return Ok(());
    }
    let state = app_state().await?;
    let removed = state.posting_service.delete_all().await?;
    println!("Removed {} postings.", removed);
    Ok(())
}

fn cmd_sources() {
    println!("{:<16} {}", "KEY", "SOURCE");
    for key in SourceKey::all() {
        let kind = if key.is_post_search() { " (posts)" } else { "" };
        println!("{:<16} {}{}", key.key(), key.label(), kind);
    }
}

fn print_summary(postings: &[Posting]) {
    let rule = "=".repeat(70);
    println!("{}", rule);
    println!("{:<12} {:<35} {:<20}", "SITE", "TITLE", "COMPANY");
    println!("{}", rule);
    for posting in postings.iter().take(SUMMARY_ROWS) {
        println!(
            "{:<12} {:<35} {:<20}",
            truncate_chars(&posting.site, 11),
            truncate_chars(posting.title.as_deref().unwrap_or(""), 34),
            truncate_chars(posting.company.as_deref().unwrap_or(""), 19),
        );
    }
    if postings.len() > SUMMARY_ROWS {
        println!("  ... and {} more in the output file.", postings.len() - SUMMARY_ROWS);
    }
    println!("{}", rule);
}
