use async_trait::async_trait;
use reqwest::Client;
use scraper::Html;

use super::html::{attr, element_text, first_element, first_text, select_cards};
use super::{absolute_url, get_checked, SearchQuery, SourceAdapter};
use crate::error::Result;
use crate::models::posting::Posting;
use crate::utils::time::date_from_iso;

const SITE: &str = "vagas.com";
const CARD_STRATEGIES: &[&str] = &["li.vaga", "article.vaga", ".lista-de-vagas li"];

pub fn search_path(term: &str) -> String {
    let slug = term.to_lowercase().split_whitespace().collect::<Vec<_>>().join("-");
    format!("/vagas-de-{}", slug)
}

/// Cards without a title link are skipped.
pub fn parse_listing(body: &str, base_url: &str, limit: usize) -> Vec<Posting> {
    let document = Html::parse_document(body);
    select_cards(&document, CARD_STRATEGIES)
        .into_iter()
        .filter_map(|card| {
            let title = first_element(&card, "h2.cargo a, .cargo a")?;
            let href = attr(&title, "href").unwrap_or_default();
            let posted_date = first_element(&card, "time, .data-publicacao").and_then(|el| {
                let raw = attr(&el, "datetime").unwrap_or_else(|| element_text(&el));
                date_from_iso(&raw)
            });

            Some(Posting {
                source_url: absolute_url(base_url, &href),
                title: Some(element_text(&title)),
                company: first_text(&card, ".empresa"),
                location: first_text(&card, ".localidade, .cidade"),
                currency: Some("BRL".to_string()),
                posted_date,
                ..Posting::new(SITE)
            })
        })
        .take(limit)
        .collect()
}

/// Largest Brazilian job board; server-rendered listing pages.
pub struct VagasComAdapter {
    client: Client,
    base_url: String,
}

impl VagasComAdapter {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: "https://www.vagas.com.br".to_string(),
        }
    }
}

#[async_trait]
impl SourceAdapter for VagasComAdapter {
    fn site(&self) -> &str {
        SITE
    }

    async fn fetch_postings(&self, query: &SearchQuery, limit: usize) -> Result<Vec<Posting>> {
        let url = format!("{}{}", self.base_url, search_path(&query.term));
        let body = get_checked(self.client.get(&url), SITE).await?.text().await?;
        Ok(parse_listing(&body, &self.base_url, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"
        <ul>
          <li class="vaga">
            <h2 class="cargo"><a href="/vagas/v2650001/desenvolvedor-python">Desenvolvedor Python</a></h2>
            <span class="empresa"> Acme Tecnologia </span>
            <span class="localidade">São Paulo / SP</span>
            <time datetime="2026-03-02">02/03</time>
          </li>
          <li class="vaga"><span class="empresa">Sem título</span></li>
        </ul>"#;

    #[test]
    fn builds_the_slugged_search_path() {
        assert_eq!(search_path("Desenvolvedor  Python"), "/vagas-de-desenvolvedor-python");
    }

    #[test]
    fn parses_cards_and_skips_untitled_ones() {
        let rows = parse_listing(LISTING, "https://www.vagas.com.br", 10);
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.site, "vagas.com");
        assert_eq!(row.title.as_deref(), Some("Desenvolvedor Python"));
        assert_eq!(row.company.as_deref(), Some("Acme Tecnologia"));
        assert_eq!(
            row.source_url.as_deref(),
            Some("https://www.vagas.com.br/vagas/v2650001/desenvolvedor-python")
        );
        assert_eq!(row.posted_date, chrono::NaiveDate::from_ymd_opt(2026, 3, 2));
    }
}
