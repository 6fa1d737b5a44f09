use async_trait::async_trait;
use reqwest::Client;
use scraper::Html;
use std::time::Duration;
use tracing::debug;

use super::html::{attr, element_text, first_element, first_text, select_cards};
use super::{absolute_url, get_checked, mentions_remote, SearchQuery, SourceAdapter};
use crate::error::Result;
use crate::models::posting::Posting;
use crate::utils::time::date_from_iso;

const SITE: &str = "linkedin";
const CARD_STRATEGIES: &[&str] = &["div.base-search-card", "div.base-card", "li"];
// The guest endpoint pages in steps of 10 regardless of what is asked.
const PAGE_SIZE: usize = 10;
const PAGE_DELAY: Duration = Duration::from_secs(2);

/// Parses one page of the guest search endpoint. Links lose their tracking
/// query string; cards without a title or link are skipped.
pub fn parse_page(body: &str, base_url: &str) -> Vec<Posting> {
    let document = Html::parse_document(body);
    select_cards(&document, CARD_STRATEGIES)
        .into_iter()
        .filter_map(|card| {
            let title = first_text(&card, "h3.base-search-card__title, h3")?;
            let link = first_element(&card, "a.base-card__full-link, a[href]")?;
            let href = attr(&link, "href")?;
            let source_url = absolute_url(base_url, &href)
                .map(|url| url.split('?').next().unwrap_or_default().to_string())?;

            let location = first_text(&card, "span.job-search-card__location");
            let posted_date = first_element(&card, "time")
                .and_then(|el| attr(&el, "datetime"))
                .as_deref()
                .and_then(date_from_iso);
            let is_remote = mentions_remote(&title)
                || location.as_deref().map(mentions_remote).unwrap_or(false);

            Some(Posting {
                source_url: Some(source_url),
                company: first_text(&card, "h4.base-search-card__subtitle, h4"),
                title: Some(title),
                location,
                is_remote,
                posted_date,
                ..Posting::new(SITE)
            })
        })
        .collect()
}

/// LinkedIn job board through its logged-out listing endpoint.
pub struct LinkedinAdapter {
    client: Client,
    base_url: String,
}

impl LinkedinAdapter {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: "https://www.linkedin.com".to_string(),
        }
    }

    async fn fetch_page(&self, query: &SearchQuery, start: usize) -> Result<String> {
        let url = format!(
            "{}/jobs-guest/jobs/api/seeMoreJobPostings/search",
            self.base_url
        );
        let mut params = vec![
            ("keywords", query.term.clone()),
            ("start", start.to_string()),
        ];
        if let Some(location) = &query.location {
            params.push(("location", location.clone()));
        }
        if let Some(hours) = query.max_age_hours {
            params.push(("f_TPR", format!("r{}", u64::from(hours) * 3600)));
        }

        let response = get_checked(self.client.get(&url).query(&params), SITE).await?;
        Ok(response.text().await?)
    }
}

#[async_trait]
impl SourceAdapter for LinkedinAdapter {
    fn site(&self) -> &str {
        SITE
    }

    async fn fetch_postings(&self, query: &SearchQuery, limit: usize) -> Result<Vec<Posting>> {
        let mut rows: Vec<Posting> = Vec::new();
        let mut start = 0;

        while rows.len() < limit {
            let body = self.fetch_page(query, start).await?;
            let page = parse_page(&body, &self.base_url);
            if page.is_empty() {
                break;
            }
            rows.extend(page);
            start += PAGE_SIZE;
            debug!(start, rows = rows.len(), "linkedin page consumed");
            if rows.len() >= limit {
                break;
            }
            tokio::time::sleep(PAGE_DELAY).await;
        }

        rows.truncate(limit);
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <li>
          <div class="base-card base-search-card job-search-card">
            <a class="base-card__full-link" href="https://br.linkedin.com/jobs/view/desenvolvedor-python-at-acme-4012345678?position=1&amp;refId=abc">
              <span class="sr-only">Desenvolvedor Python</span>
            </a>
            <div class="base-search-card__info">
              <h3 class="base-search-card__title"> Desenvolvedor Python </h3>
              <h4 class="base-search-card__subtitle"><a href="https://br.linkedin.com/company/acme">Acme</a></h4>
              <div class="base-search-card__metadata">
                <span class="job-search-card__location">São Paulo, SP (Remoto)</span>
                <time class="job-search-card__listdate" datetime="2026-03-10">1 week ago</time>
              </div>
            </div>
          </div>
        </li>
        <li>
          <div class="base-card base-search-card job-search-card">
            <a class="base-card__full-link" href="javascript:void(0)"></a>
            <h3 class="base-search-card__title">Sem link</h3>
          </div>
        </li>
        <li>
          <div class="base-card base-search-card job-search-card">
            <a class="base-card__full-link" href="/jobs/view/4099999999?trk=guest"></a>
            <h3 class="base-search-card__title">Engenheiro de Dados</h3>
            <h4 class="base-search-card__subtitle">Globex</h4>
            <span class="job-search-card__location">Curitiba, PR</span>
          </div>
        </li>"#;

    #[test]
    fn parses_guest_cards() {
        let rows = parse_page(PAGE, "https://www.linkedin.com");
        assert_eq!(rows.len(), 2);

        let first = &rows[0];
        assert_eq!(first.site, "linkedin");
        assert_eq!(first.title.as_deref(), Some("Desenvolvedor Python"));
        assert_eq!(first.company.as_deref(), Some("Acme"));
        assert_eq!(
            first.source_url.as_deref(),
            Some("https://br.linkedin.com/jobs/view/desenvolvedor-python-at-acme-4012345678")
        );
        assert!(first.is_remote);
        assert_eq!(first.posted_date, chrono::NaiveDate::from_ymd_opt(2026, 3, 10));

        let second = &rows[1];
        assert_eq!(
            second.source_url.as_deref(),
            Some("https://www.linkedin.com/jobs/view/4099999999")
        );
        assert_eq!(second.company.as_deref(), Some("Globex"));
        assert!(!second.is_remote);
        assert_eq!(second.posted_date, None);
    }

    #[test]
    fn empty_page_yields_nothing() {
        assert!(parse_page("", "https://www.linkedin.com").is_empty());
    }
}
