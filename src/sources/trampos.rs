use async_trait::async_trait;
use reqwest::Client;
use scraper::Html;

use super::html::{attr, element_text, first_element, first_text, select_cards};
use super::{absolute_url, get_checked, mentions_remote, SearchQuery, SourceAdapter};
use crate::error::Result;
use crate::models::posting::Posting;

const SITE: &str = "trampos.co";
const CARD_STRATEGIES: &[&str] = &[
    "article.opportunity",
    ".opportunity-item",
    "li.opportunity",
    ".job-item",
    ".vaga-item",
];

pub fn parse_listing(body: &str, base_url: &str, limit: usize) -> Vec<Posting> {
    let document = Html::parse_document(body);
    select_cards(&document, CARD_STRATEGIES)
        .into_iter()
        .filter_map(|card| {
            let title = first_element(&card, "h2, h3, .title, .cargo, .position")
                .map(|el| element_text(&el))?;
            let href = first_element(&card, "a")
                .and_then(|link| attr(&link, "href"))
                .unwrap_or_default();

            Some(Posting {
                source_url: absolute_url(base_url, &href),
                is_remote: mentions_remote(&title),
                title: Some(title),
                company: first_text(&card, ".company, .empresa"),
                location: first_text(&card, ".location, .localidade, .cidade"),
                currency: Some("BRL".to_string()),
                ..Posting::new(SITE)
            })
        })
        .take(limit)
        .collect()
}

/// Tech and creative job board.
pub struct TramposAdapter {
    client: Client,
    base_url: String,
}

impl TramposAdapter {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: "https://trampos.co".to_string(),
        }
    }
}

#[async_trait]
impl SourceAdapter for TramposAdapter {
    fn site(&self) -> &str {
        SITE
    }

    async fn fetch_postings(&self, query: &SearchQuery, limit: usize) -> Result<Vec<Posting>> {
        let url = format!("{}/oportunidades", self.base_url);
        let body = get_checked(self.client.get(&url).query(&[("term", &query.term)]), SITE)
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
    fn falls_back_through_card_strategies() {
        let body = r#"
            <div class="job-item">
              <a href="/oportunidades/512"><h3>Designer Remoto</h3></a>
              <span class="empresa">Estúdio X</span>
              <span class="cidade">Curitiba</span>
            </div>
            <div class="job-item"><a href="/oportunidades/513"><h3>Redator</h3></a></div>
            <div class="job-item"><p>sem título</p></div>"#;

        let rows = parse_listing(body, "https://trampos.co", 10);
        assert_eq!(rows.len(), 2);
        assert!(rows[0].is_remote);
        assert_eq!(rows[0].company.as_deref(), Some("Estúdio X"));
        assert_eq!(rows[0].source_url.as_deref(), Some("https://trampos.co/oportunidades/512"));
        assert!(!rows[1].is_remote);
    }

    #[test]
    fn honours_the_limit() {
        let body = r#"<article class="opportunity"><h2>A</h2></article>
                      <article class="opportunity"><h2>B</h2></article>"#;
        assert_eq!(parse_listing(body, "https://trampos.co", 1).len(), 1);
    }
}
