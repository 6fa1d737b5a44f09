use crate::dto::search_dto::ExportFormat;
use crate::error::Result;
use crate::models::posting::Posting;
use crate::sources::is_web_url;
use crate::utils::text::{slug, strip_html, truncate_chars};
use crate::utils::time::file_stamp;
use rust_xlsxwriter::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::info;

/// Exported columns, in order. `raw_contact_hint` is internal and never
/// leaves the process.
pub const EXPORT_COLUMNS: [&str; 14] = [
    "site",
    "title",
    "company",
    "location",
    "is_remote",
    "employment_type",
    "salary_min",
    "salary_max",
    "currency",
    "posted_date",
    "source_url",
    "recruiter_name",
    "recruiter_email",
    "description",
];

const SLUG_CHARS: usize = 25;
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
// Excel rejects longer cell strings.
const XLSX_CELL_CHARS: usize = 32_000;
const XLSX_URL_CHARS: usize = 2_000;

pub struct ExportService;

impl ExportService {
    /// `{prefix}_{slug}_{stamp}` for a search, `{prefix}_{stamp}` without one.
    pub fn file_stem(prefix: &str, term: Option<&str>) -> String {
        match term.map(|t| slug(t, SLUG_CHARS)).filter(|s| !s.is_empty()) {
            Some(term_slug) => format!("{}_{}_{}", prefix, term_slug, file_stamp()),
            None => format!("{}_{}", prefix, file_stamp()),
        }
    }

    /// Writes the postings under `dir` as `{stem}.{csv|xlsx}` and returns the
    /// written path. The directory is created when missing.
    pub fn export(
        postings: &[Posting],
        dir: &Path,
        stem: &str,
        format: ExportFormat,
    ) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let stem = stem
            .strip_suffix(&format!(".{}", format.extension()))
            .unwrap_or(stem);
        let path = dir.join(format!("{}.{}", stem, format.extension()));

        let bytes = match format {
            ExportFormat::Csv => Self::generate_postings_csv(postings),
            ExportFormat::Excel => Self::generate_postings_xlsx(postings)?,
        };
        std::fs::write(&path, bytes)?;

        info!(path = %path.display(), rows = postings.len(), "export written");
        Ok(path)
    }

    /// UTF-8 CSV with a byte-order mark; empty cells for absent values.
    pub fn generate_postings_csv(postings: &[Posting]) -> Vec<u8> {
        let mut out = String::new();
        push_csv_line(&mut out, EXPORT_COLUMNS.iter().map(|c| c.to_string()));
        for posting in postings {
            push_csv_line(&mut out, row_cells(posting).into_iter());
        }

        let mut bytes = Vec::with_capacity(UTF8_BOM.len() + out.len());
        bytes.extend_from_slice(UTF8_BOM);
        bytes.extend_from_slice(out.as_bytes());
        bytes
    }

    /// Styled workbook: title and subtitle rows, frozen header, autofilter,
    /// alternating rows and a summary row.
    pub fn generate_postings_xlsx(postings: &[Posting]) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name("Postings")?;

        let primary_color = Color::RGB(0x1E293B);
        let header_bg = Color::RGB(0x0F172A);
        let header_text = Color::White;
        let alt_row_1 = Color::RGB(0xF8FAFC);
        let alt_row_2 = Color::White;
        let border_color = Color::RGB(0xE2E8F0);
        let remote_color = Color::RGB(0x10B981);
        let post_color = Color::RGB(0x8B5CF6);

        let widths = [
            18.0, 40.0, 28.0, 26.0, 10.0, 16.0, 12.0, 12.0, 10.0, 13.0, 45.0, 24.0, 30.0, 60.0,
        ];
        for (i, width) in widths.iter().enumerate() {
            worksheet.set_column_width(i as u16, *width)?;
        }
        let last_col = (EXPORT_COLUMNS.len() - 1) as u16;

        let title_format = Format::new()
            .set_font_size(16)
            .set_bold()
            .set_font_color(header_text)
            .set_background_color(primary_color)
            .set_align(FormatAlign::CenterAcross)
            .set_align(FormatAlign::VerticalCenter);
        worksheet.set_row_height(0, 40)?;
        worksheet.merge_range(0, 0, 0, last_col, "Job postings", &title_format)?;

        let subtitle_format = Format::new()
            .set_font_size(10)
            .set_italic()
            .set_font_color(Color::RGB(0x94A3B8))
            .set_background_color(primary_color)
            .set_align(FormatAlign::CenterAcross)
            .set_align(FormatAlign::VerticalCenter);
        worksheet.set_row_height(1, 22)?;
        let exported = chrono::Local::now().format("%d.%m.%Y %H:%M").to_string();
        let subtitle = format!("Exported: {}  •  Postings: {}", exported, postings.len());
        worksheet.merge_range(1, 0, 1, last_col, &subtitle, &subtitle_format)?;

        let header_format = Format::new()
            .set_bold()
            .set_font_size(10)
            .set_font_color(header_text)
            .set_background_color(header_bg)
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter)
            .set_text_wrap()
            .set_border(FormatBorder::Thin)
            .set_border_color(border_color);
        let header_row = 2;
        worksheet.set_row_height(header_row, 30)?;
        for (i, name) in EXPORT_COLUMNS.iter().enumerate() {
            worksheet.write_string_with_format(header_row, i as u16, *name, &header_format)?;
        }

        let data_start_row = 3;
        for (idx, posting) in postings.iter().enumerate() {
            let row = data_start_row + idx as u32;
            let bg = if idx % 2 == 0 { alt_row_1 } else { alt_row_2 };

            let base_fmt = Format::new()
                .set_font_size(10)
                .set_background_color(bg)
                .set_align(FormatAlign::VerticalCenter)
                .set_border(FormatBorder::Thin)
                .set_border_color(border_color);
            let center_fmt = base_fmt.clone().set_align(FormatAlign::Center);
            let money_fmt = base_fmt.clone().set_num_format("#,##0.00");
            let site_fmt = if posting.is_post() {
                center_fmt.clone().set_bold().set_font_color(post_color)
            } else {
                center_fmt.clone().set_bold()
            };
            worksheet.set_row_height(row, 22)?;

            worksheet.write_string_with_format(row, 0, &posting.site, &site_fmt)?;
            write_opt(worksheet, row, 1, posting.title.as_deref(), &base_fmt.clone().set_bold())?;
            write_opt(worksheet, row, 2, posting.company.as_deref(), &base_fmt)?;
            write_opt(worksheet, row, 3, posting.location.as_deref(), &base_fmt)?;

            if posting.is_remote {
                let remote_fmt = center_fmt.clone().set_bold().set_font_color(remote_color);
                worksheet.write_string_with_format(row, 4, "yes", &remote_fmt)?;
            } else {
                worksheet.write_string_with_format(row, 4, "no", &center_fmt)?;
            }

            write_opt(worksheet, row, 5, posting.employment_type.as_deref(), &center_fmt)?;
            for (col, amount) in [(6u16, posting.salary_min), (7u16, posting.salary_max)] {
                match amount {
                    Some(value) => worksheet.write_number_with_format(row, col, value, &money_fmt)?,
                    None => worksheet.write_string_with_format(row, col, "—", &center_fmt)?,
                };
            }
            write_opt(worksheet, row, 8, posting.currency.as_deref(), &center_fmt)?;

            let posted = posting.posted_date.map(|d| d.format("%Y-%m-%d").to_string());
            write_opt(worksheet, row, 9, posted.as_deref(), &center_fmt)?;

            match posting.source_url.as_deref() {
                // hyperlinks only for absolute web URLs, anything else stays text
                Some(url) if is_web_url(url) && url.len() <= XLSX_URL_CHARS => {
                    let link_fmt = base_fmt
                        .clone()
                        .set_font_color(Color::RGB(0x2563EB))
                        .set_underline(FormatUnderline::Single);
                    worksheet.write_url_with_format(row, 10, url, &link_fmt)?;
                }
                other => write_opt(worksheet, row, 10, other, &base_fmt)?,
            }

            write_opt(worksheet, row, 11, posting.recruiter_name.as_deref(), &base_fmt)?;
            write_opt(worksheet, row, 12, posting.recruiter_email.as_deref(), &base_fmt)?;

            let description = posting
                .description
                .as_deref()
                .map(|d| truncate_chars(&strip_html(d), XLSX_CELL_CHARS));
            write_opt(worksheet, row, 13, description.as_deref(), &base_fmt)?;
        }

        let total_row = data_start_row + postings.len() as u32 + 1;
        let summary_fmt = Format::new()
            .set_bold()
            .set_font_size(10)
            .set_font_color(primary_color)
            .set_background_color(Color::RGB(0xE0E7FF))
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter)
            .set_border(FormatBorder::Thin)
            .set_border_color(border_color);
        worksheet.set_row_height(total_row, 26)?;

        let remote = postings.iter().filter(|p| p.is_remote).count();
        let with_email = postings.iter().filter(|p| p.recruiter_email.is_some()).count();
        let sites: HashSet<&str> = postings.iter().map(|p| p.site.as_str()).collect();

        worksheet.merge_range(
            total_row,
            0,
            total_row,
            1,
            &format!("Total: {} postings", postings.len()),
            &summary_fmt,
        )?;
        worksheet.merge_range(
            total_row,
            2,
            total_row,
            5,
            &format!("Remote: {} | Sites: {}", remote, sites.len()),
            &summary_fmt,
        )?;
        worksheet.merge_range(
            total_row,
            6,
            total_row,
            last_col,
            &format!("With recruiter email: {}", with_email),
            &summary_fmt,
        )?;

        worksheet.set_freeze_panes(3, 0)?;
        worksheet.autofilter(
            2,
            0,
            (data_start_row + postings.len() as u32).saturating_sub(1).max(2),
            last_col,
        )?;

        let buffer = workbook.save_to_buffer()?;
        Ok(buffer)
    }
}

fn write_opt(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: Option<&str>,
    format: &Format,
) -> Result<()> {
    worksheet.write_string_with_format(row, col, value.unwrap_or("—"), format)?;
    Ok(())
}

fn row_cells(posting: &Posting) -> [String; 14] {
    let text = |value: &Option<String>| value.clone().unwrap_or_default();
    let number = |value: Option<f64>| value.map(|v| v.to_string()).unwrap_or_default();
    [
        posting.site.clone(),
        text(&posting.title),
        text(&posting.company),
        text(&posting.location),
        posting.is_remote.to_string(),
        text(&posting.employment_type),
        number(posting.salary_min),
        number(posting.salary_max),
        text(&posting.currency),
        posting
            .posted_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        text(&posting.source_url),
        text(&posting.recruiter_name),
        text(&posting.recruiter_email),
        text(&posting.description),
    ]
}

fn push_csv_line(out: &mut String, cells: impl Iterator<Item = String>) {
    let line = cells.map(|cell| csv_field(&cell)).collect::<Vec<_>>().join(",");
    out.push_str(&line);
    out.push_str("\r\n");
}

/// RFC 4180 quoting: fields containing separators, quotes or line breaks are
/// wrapped in quotes with inner quotes doubled.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
