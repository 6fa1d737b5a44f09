use vagas_aggregator::dto::search_dto::{FilterOptions, Seniority};
use vagas_aggregator::models::posting::Posting;
use vagas_aggregator::services::filter_service::{
    apply, deduplicate, filter_by_seniority, filter_by_skills, filter_remote,
};

fn posting(site: &str, url: &str, title: &str) -> Posting {
    Posting {
        source_url: Some(url.to_string()),
        title: Some(title.to_string()),
        ..Posting::new(site)
    }
}

#[test]
fn same_url_from_two_sources_is_kept_once() {
    let rows = deduplicate(vec![
        posting("gupy", "https://vagas.example/123", "Dev Python"),
        posting("remoteok", "https://vagas.example/123", "Python Developer"),
        posting("remoteok", "https://vagas.example/456", "Go Developer"),
    ]);

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].site, "gupy");
    assert_eq!(rows[0].title.as_deref(), Some("Dev Python"));
    assert_eq!(rows[1].source_url.as_deref(), Some("https://vagas.example/456"));
}

#[test]
fn post_rows_are_deduplicated_separately_and_appended() {
    let rows = deduplicate(vec![
        posting("post_linkedin_posts", "https://linkedin.com/posts/1", "Estamos contratando"),
        posting("gupy", "https://gupy.example/1", "Dev"),
        posting("post_linkedin_posts", "https://linkedin.com/posts/1", "Repost"),
        posting("vagas.com", "https://vagas.com.br/v/2", "QA"),
    ]);

    let sites: Vec<&str> = rows.iter().map(|r| r.site.as_str()).collect();
    assert_eq!(sites, vec!["gupy", "vagas.com", "post_linkedin_posts"]);
}

#[test]
fn rows_without_url_survive_deduplication() {
    let mut no_url = Posting::new("trampos.co");
    no_url.title = Some("Sem link".into());
    let rows = deduplicate(vec![no_url.clone(), no_url]);
    assert_eq!(rows.len(), 2);
}

#[test]
fn skills_match_any_keyword_case_insensitively() {
    let mut django = posting("gupy", "https://a.example/1", "Backend Engineer");
    django.description = Some("Stack: Django REST Framework".into());
    let java = posting("gupy", "https://a.example/2", "Desenvolvedor Java");

    let rows = filter_by_skills(
        vec![django, java],
        &["python".to_string(), "django".to_string()],
    );

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].source_url.as_deref(), Some("https://a.example/1"));
}

#[test]
fn skill_keywords_are_literal() {
    let cpp = posting("gupy", "https://a.example/1", "Desenvolvedor C++");
    let c = posting("gupy", "https://a.example/2", "Desenvolvedor C");

    let rows = filter_by_skills(vec![cpp, c], &["c++".to_string()]);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].title.as_deref(), Some("Desenvolvedor C++"));
}

#[test]
fn blank_skills_disable_the_stage() {
    let rows = vec![posting("gupy", "https://a.example/1", "Anything")];
    assert_eq!(filter_by_skills(rows.clone(), &[]).len(), 1);
    assert_eq!(filter_by_skills(rows, &["  ".to_string()]).len(), 1);
}

#[test]
fn seniority_patterns_accept_accented_portuguese() {
    let senior = posting("gupy", "https://a.example/1", "Engenheiro Sênior Backend");
    let intern = posting("gupy", "https://a.example/2", "Estágio em Desenvolvimento");

    let seniors = filter_by_seniority(vec![senior.clone(), intern.clone()], &[Seniority::Senior]);
    assert_eq!(seniors.len(), 1);
    assert_eq!(seniors[0].title.as_deref(), Some("Engenheiro Sênior Backend"));

    let trainees = filter_by_seniority(vec![senior, intern], &[Seniority::Trainee]);
    assert_eq!(trainees.len(), 1);
    assert_eq!(trainees[0].title.as_deref(), Some("Estágio em Desenvolvimento"));
}

#[test]
fn seniority_levels_are_a_union() {
    let rows = vec![
        posting("gupy", "https://a.example/1", "Dev Júnior"),
        posting("gupy", "https://a.example/2", "Dev Pleno"),
        posting("gupy", "https://a.example/3", "Dev Sênior"),
    ];
    let kept = filter_by_seniority(rows, &[Seniority::Junior, Seniority::Senior]);
    let urls: Vec<&str> = kept.iter().filter_map(|p| p.identity()).collect();
    assert_eq!(urls, vec!["https://a.example/1", "https://a.example/3"]);
}

#[test]
fn remote_filter_keeps_only_remote_rows() {
    let mut remote = posting("remoteok", "https://a.example/1", "Remote Rust");
    remote.is_remote = true;
    let onsite = posting("gupy", "https://a.example/2", "Presencial");

    let rows = filter_remote(vec![remote, onsite]);
    assert_eq!(rows.len(), 1);
    assert!(rows[0].is_remote);
}

#[test]
fn apply_runs_every_stage_and_only_removes_rows() {
    let mut a = posting("gupy", "https://a.example/1", "Senior Python Developer");
    a.is_remote = true;
    let b = a.clone();
    let mut c = posting("gupy", "https://a.example/2", "Junior Python Developer");
    c.is_remote = true;
    let d = posting("gupy", "https://a.example/3", "Senior Python Developer");

    let options = FilterOptions {
        remote_only: true,
        skills: vec!["python".into()],
        seniority: vec![Seniority::Senior],
    };
    let rows = apply(vec![a, b, c, d], &options);

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].identity(), Some("https://a.example/1"));
}

#[test]
fn default_options_only_deduplicate() {
    let rows = vec![
        posting("gupy", "https://a.example/1", "One"),
        posting("gupy", "https://a.example/1", "One again"),
        posting("gupy", "https://a.example/2", "Two"),
    ];
    assert_eq!(apply(rows, &FilterOptions::default()).len(), 2);
}
