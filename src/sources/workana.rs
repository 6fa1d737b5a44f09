use async_trait::async_trait;
use reqwest::Client;
use scraper::Html;

use super::html::{attr, element_text, first_element, first_text, select_cards};
use super::{absolute_url, get_checked, SearchQuery, SourceAdapter};
use crate::error::Result;
use crate::models::posting::Posting;

const SITE: &str = "workana";
const CARD_STRATEGIES: &[&str] = &["article.project", ".project-item", "li.project", ".job-item"];

/// Freelance projects are always remote; the budget text stands in for the
/// description.
pub fn parse_listing(body: &str, base_url: &str, limit: usize) -> Vec<Posting> {
    let document = Html::parse_document(body);
    select_cards(&document, CARD_STRATEGIES)
        .into_iter()
        .filter_map(|card| {
            let title = first_element(&card, "h2 a, h3 a, .project-title a, .title a")?;
            let href = attr(&title, "href").unwrap_or_default();

            Some(Posting {
                source_url: absolute_url(base_url, &href),
                title: Some(element_text(&title)),
                is_remote: true,
                employment_type: Some("Freelance".to_string()),
                currency: Some("BRL".to_string()),
                description: first_text(&card, ".budget, .price, .valor"),
                ..Posting::new(SITE)
            })
        })
        .take(limit)
        .collect()
}

/// Latin-American freelance marketplace.
pub struct WorkanaAdapter {
    client: Client,
    base_url: String,
}

impl WorkanaAdapter {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: "https://www.workana.com".to_string(),
        }
    }
}

#[async_trait]
impl SourceAdapter for WorkanaAdapter {
    fn site(&self) -> &str {
        SITE
    }

    async fn fetch_postings(&self, query: &SearchQuery, limit: usize) -> Result<Vec<Posting>> {
        let url = format!("{}/jobs", self.base_url);
        let body = get_checked(
            self.client
                .get(&url)
                .query(&[("search", query.term.as_str()), ("language", "pt")]),
            SITE,
        )
        .await?
        .text()
        .await?;
        Ok(parse_listing(&body, &self.base_url, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_projects_as_remote_freelance_work() {
        let body = r#"
            <article class="project">
              <h2><a href="/job/api-em-rust">API em Rust</a></h2>
              <span class="budget">R$ 3.000 - 5.000</span>
            </article>"#;

        let rows = parse_listing(body, "https://www.workana.com", 5);
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert!(row.is_remote);
        assert_eq!(row.employment_type.as_deref(), Some("Freelance"));
        assert_eq!(row.description.as_deref(), Some("R$ 3.000 - 5.000"));
        assert_eq!(row.source_url.as_deref(), Some("https://www.workana.com/job/api-em-rust"));
    }
}
