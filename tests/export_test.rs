use vagas_aggregator::dto::search_dto::ExportFormat;
use vagas_aggregator::models::posting::Posting;
use vagas_aggregator::services::export_service::{ExportService, EXPORT_COLUMNS};

fn sample() -> Vec<Posting> {
    vec![
        Posting {
            source_url: Some("https://gupy.example/1".into()),
            title: Some("Dev \"Rust\", Sênior".into()),
            company: Some("Acme".into()),
            is_remote: true,
            salary_min: Some(12000.0),
            currency: Some("BRL".into()),
            raw_contact_hint: Some("secret@hint.example".into()),
            recruiter_email: Some("rh@acme.com".into()),
            description: Some("<p>Linha 1</p>\nLinha 2".into()),
            ..Posting::new("gupy")
        },
        Posting {
            source_url: Some("https://x.com/status/1".into()),
            title: Some("Estamos contratando".into()),
            ..Posting::new("post_twitter")
        },
    ]
}

fn csv_text(bytes: &[u8]) -> String {
    String::from_utf8(bytes[3..].to_vec()).expect("utf-8 csv")
}

#[test]
fn csv_starts_with_bom_and_header() {
    let bytes = ExportService::generate_postings_csv(&sample());
    assert_eq!(&bytes[..3], b"\xEF\xBB\xBF");

    let text = csv_text(&bytes);
    let header = text.lines().next().expect("header line");
    assert_eq!(header, EXPORT_COLUMNS.join(","));
    assert!(!header.contains("raw_contact_hint"));
}

#[test]
fn csv_never_contains_the_contact_hint() {
    let text = csv_text(&ExportService::generate_postings_csv(&sample()));
    assert!(!text.contains("secret@hint.example"));
    assert!(text.contains("rh@acme.com"));
}

#[test]
fn csv_quotes_fields_with_separators() {
    let text = csv_text(&ExportService::generate_postings_csv(&sample()));
    assert!(text.contains("\"Dev \"\"Rust\"\", Sênior\""));
}

#[test]
fn empty_batch_still_has_a_header() {
    let text = csv_text(&ExportService::generate_postings_csv(&[]));
    assert_eq!(text.trim_end(), EXPORT_COLUMNS.join(","));
}

#[test]
fn export_writes_into_a_created_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    let target = dir.path().join("nested").join("out");

    let path = ExportService::export(&sample(), &target, "vagas_rust", ExportFormat::Csv)
        .expect("csv export");
    assert_eq!(path, target.join("vagas_rust.csv"));
    assert!(path.exists());

    let path = ExportService::export(&sample(), &target, "report.xlsx", ExportFormat::Excel)
        .expect("xlsx export");
    assert_eq!(path, target.join("report.xlsx"));
    let bytes = std::fs::read(&path).expect("read xlsx");
    assert_eq!(&bytes[..2], b"PK");
}

#[test]
fn file_stem_embeds_the_term_slug() {
    let stem = ExportService::file_stem("vagas", Some("Desenvolvedor Python Sênior"));
    assert!(stem.starts_with("vagas_"));
    assert!(stem.to_lowercase().contains("python"));
    assert!(!stem.contains(' '));

    let bare = ExportService::file_stem("vagas", None);
    assert!(bare.starts_with("vagas_"));
    assert!(!bare.contains("python"));
}

#[test]
fn non_web_urls_are_written_as_text_in_excel() {
    let urls = [
        "https://ok.example/1",
        "/vagas/123",
        "javascript:void(0)",
        "www.example.com/x",
    ];
    let rows: Vec<Posting> = urls
        .into_iter()
        .map(|url| Posting {
            source_url: Some(url.to_string()),
            title: Some("Dev".into()),
            ..Posting::new("geekhunter")
        })
        .collect();

    let bytes = ExportService::generate_postings_xlsx(&rows).expect("workbook with odd urls");
    assert_eq!(&bytes[..2], b"PK");
}
