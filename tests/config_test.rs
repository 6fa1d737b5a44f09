use std::path::PathBuf;

use vagas_aggregator::config::ScheduleConfig;
use vagas_aggregator::dto::search_dto::{ExportFormat, SearchPlan};
use vagas_aggregator::sources::SourceKey;

const SCHEDULE: &str = r#"
[schedule]
interval_hours = 12

[output]
directory = "relatorios"
format = "excel"
filename_prefix = "agendado"

[[searches]]
search_term = "desenvolvedor python"
location = "São Paulo"
sources = ["gupy", "vagascom"]
results_wanted = 40
skills = ["django"]
seniority = ["pleno", "senior"]
remote_only = true

[[searches]]
search_term = "rust"
"#;

#[test]
fn schedule_file_is_parsed() {
    let config = ScheduleConfig::from_toml_str(SCHEDULE).expect("valid schedule");

    assert_eq!(config.schedule.interval_hours, 12);
    assert_eq!(config.output.directory, PathBuf::from("relatorios"));
    assert_eq!(config.output.format, ExportFormat::Excel);
    assert_eq!(config.output.filename_prefix, "agendado");
    assert_eq!(config.searches.len(), 2);

    let first = &config.searches[0];
    assert_eq!(first.location, "São Paulo");
    assert_eq!(first.results_wanted, 40);
    assert!(first.remote_only);
}

#[test]
fn missing_search_fields_take_defaults() {
    let config = ScheduleConfig::from_toml_str(SCHEDULE).expect("valid schedule");
    let second = &config.searches[1];

    assert_eq!(second.location, "Brazil");
    assert_eq!(second.sources, vec!["gupy".to_string(), "remoteok".to_string()]);
    assert_eq!(second.results_wanted, 25);
    assert_eq!(second.hours_old, Some(168));
    assert!(second.skills.is_empty());
}

#[test]
fn empty_file_uses_defaults() {
    let config = ScheduleConfig::from_toml_str("").expect("empty schedule");
    assert_eq!(config.schedule.interval_hours, 24);
    assert_eq!(config.output.format, ExportFormat::Csv);
    assert_eq!(config.output.filename_prefix, "vagas");
    assert!(config.searches.is_empty());
}

#[test]
fn zero_interval_is_rejected() {
    let err = ScheduleConfig::from_toml_str("[schedule]\ninterval_hours = 0\n")
        .expect_err("interval 0 must fail");
    assert!(err.to_string().contains("interval_hours"));
}

#[test]
fn sites_is_accepted_as_an_alias_for_sources() {
    let config = ScheduleConfig::from_toml_str(
        "[[searches]]\nsearch_term = \"qa\"\nsites = [\"trampos\"]\n",
    )
    .expect("schedule with sites");
    assert_eq!(config.searches[0].sources, vec!["trampos".to_string()]);
}

#[test]
fn scheduled_searches_become_plans_without_export() {
    let config = ScheduleConfig::from_toml_str(SCHEDULE).expect("valid schedule");
    let plan = SearchPlan::try_from(config.searches[0].to_request()).expect("valid plan");

    assert_eq!(plan.search_terms, vec!["desenvolvedor python".to_string()]);
    assert_eq!(plan.sources, vec![SourceKey::Gupy, SourceKey::VagasCom]);
    assert_eq!(plan.export_format, None);
    assert!(plan.filters.remote_only);
    assert_eq!(plan.filters.seniority.len(), 2);
}

#[test]
fn missing_schedule_file_is_reported() {
    let err = ScheduleConfig::load(std::path::Path::new("/nonexistent/vagas.toml"))
        .expect_err("missing file");
    assert!(err.to_string().contains("not found"));
}

#[test]
fn oversized_interval_is_rejected() {
    let err = ScheduleConfig::from_toml_str("[schedule]\ninterval_hours = 1000000\n")
        .expect_err("huge interval must fail");
    assert!(err.to_string().contains("interval_hours"));
    assert!(ScheduleConfig::from_toml_str("[schedule]\ninterval_hours = 8784\n").is_ok());
}
