use crate::dto::search_dto::{ExportFormat, SearchRequest};
use crate::error::{Error, Result};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub max_parallel_fetches: usize,
    pub request_timeout_secs: u64,
    pub output_dir: PathBuf,
    pub filename_prefix: String,
    pub schedule_file: PathBuf,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            database_url: get_env_or("DATABASE_URL", "sqlite://vagas_historico.db"),
            database_max_connections: get_env_parse_or("DATABASE_MAX_CONNECTIONS", 5)?,
            max_parallel_fetches: get_env_parse_or("MAX_PARALLEL_FETCHES", 8)?,
            request_timeout_secs: get_env_parse_or("REQUEST_TIMEOUT_SECS", 15)?,
            output_dir: PathBuf::from(get_env_or("OUTPUT_DIR", "output")),
            filename_prefix: get_env_or("FILENAME_PREFIX", "vagas"),
            schedule_file: PathBuf::from(get_env_or("SCHEDULE_FILE", "vagas.toml")),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite://vagas_historico.db".to_string(),
            database_max_connections: 5,
            max_parallel_fetches: 8,
            request_timeout_secs: 15,
            output_dir: PathBuf::from("output"),
            filename_prefix: "vagas".to_string(),
            schedule_file: PathBuf::from("vagas.toml"),
        }
    }
}

fn get_env_or(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        _ => Ok(default),
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}

/// One year.
pub const MAX_INTERVAL_HOURS: u64 = 24 * 366;

/// Declarative run-level defaults read from the schedule file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ScheduleConfig {
    pub schedule: ScheduleOptions,
    pub output: OutputOptions,
    pub searches: Vec<ScheduledSearch>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleOptions {
    pub interval_hours: u64,
}

impl Default for ScheduleOptions {
    fn default() -> Self {
        Self { interval_hours: 24 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputOptions {
    pub directory: PathBuf,
    pub format: ExportFormat,
    pub filename_prefix: String,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("output"),
            format: ExportFormat::Csv,
            filename_prefix: "vagas".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduledSearch {
    pub search_term: String,
    pub location: String,
    #[serde(alias = "sites")]
    pub sources: Vec<String>,
    pub results_wanted: usize,
    pub hours_old: Option<u32>,
    pub skills: Vec<String>,
    pub seniority: Vec<String>,
    pub remote_only: bool,
}

impl Default for ScheduledSearch {
    fn default() -> Self {
        Self {
            search_term: String::new(),
            location: "Brazil".to_string(),
            sources: vec!["gupy".to_string(), "remoteok".to_string()],
            results_wanted: 25,
            hours_old: Some(168),
            skills: Vec::new(),
            seniority: Vec::new(),
            remote_only: false,
        }
    }
}

impl ScheduledSearch {
    /// Scheduled searches never export on their own; the merged batch is
    /// exported once per round.
    pub fn to_request(&self) -> SearchRequest {
        SearchRequest {
            search_terms: vec![self.search_term.clone()],
            sources: self.sources.clone(),
            location: self.location.clone(),
            results_per_source: self.results_wanted,
            max_age_hours: self.hours_old,
            skills: self.skills.clone(),
            seniority: self.seniority.clone(),
            remote_only: self.remote_only,
            export_format: None,
            output_name: None,
        }
    }
}

impl ScheduleConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: ScheduleConfig = toml::from_str(raw)?;
        let hours = config.schedule.interval_hours;
        if !(1..=MAX_INTERVAL_HOURS).contains(&hours) {
            return Err(Error::Config(format!(
                "schedule.interval_hours must be between 1 and {}, got {}",
                MAX_INTERVAL_HOURS, hours
            )));
        }
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::Config(format!(
                "Schedule file not found: {}",
                path.display()
            )));
        }
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }
}
