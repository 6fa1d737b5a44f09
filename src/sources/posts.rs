use async_trait::async_trait;
use reqwest::Client;
use scraper::Html;

use super::html::{attr, element_text, first_element, first_text, select_cards};
use super::{absolute_url, get_checked, PostPlatform, SearchQuery, SourceAdapter};
use crate::error::Result;
use crate::models::posting::{Posting, POST_SITE_PREFIX};
use crate::patterns::JOB_POST_PHRASES;
use crate::services::enrich_service::extract_email;

const RESULT_STRATEGIES: &[&str] = &[".result", ".web-result"];
/// Only the leading phrases go into the query; the engine truncates long ones.
const QUERY_PHRASES: usize = 6;

/// `"phrase" OR "phrase" … term city site-filter`, where only the first
/// comma-separated segment of the location is used.
pub fn build_query(term: &str, location: Option<&str>, site_filter: &str) -> String {
    let phrases = JOB_POST_PHRASES
        .iter()
        .take(QUERY_PHRASES)
        .map(|p| format!("\"{}\"", p))
        .collect::<Vec<_>>()
        .join(" OR ");
    let city = location
        .and_then(|loc| loc.split(',').next())
        .map(str::trim)
        .unwrap_or_default();

    [format!("({})", phrases), term.trim().to_string(), city.to_string(), site_filter.to_string()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// The engine's `df` window for a maximum posting age.
pub fn date_window(max_age_hours: Option<u32>) -> Option<&'static str> {
    match max_age_hours? {
        h if h <= 24 => Some("d"),
        h if h <= 24 * 7 => Some("w"),
        h if h <= 24 * 31 => Some("m"),
        _ => Some("y"),
    }
}

/// Result links point at a redirector carrying the target in `uddg`.
pub fn decode_result_link(href: &str) -> Option<String> {
    let absolute = absolute_url("https://duckduckgo.com", href)?;
    let parsed = url::Url::parse(&absolute).ok()?;
    let target = parsed
        .query_pairs()
        .find(|(key, _)| key == "uddg")
        .map(|(_, value)| value.into_owned());
    Some(target.unwrap_or(absolute))
}

pub fn parse_results(body: &str, platform: PostPlatform, limit: usize) -> Vec<Posting> {
    let site = format!("{}{}", POST_SITE_PREFIX, platform.key());
    let document = Html::parse_document(body);
    select_cards(&document, RESULT_STRATEGIES)
        .into_iter()
        .filter_map(|result| {
            let link = first_element(&result, "a.result__a")?;
            let source_url = attr(&link, "href").and_then(|href| decode_result_link(&href))?;
            let snippet = first_text(&result, ".result__snippet");

            Some(Posting {
                source_url: Some(source_url),
                title: Some(element_text(&link)),
                employment_type: Some("Post".to_string()),
                raw_contact_hint: snippet.as_deref().and_then(extract_email),
                description: snippet,
                ..Posting::new(site.clone())
            })
        })
        .take(limit)
        .collect()
}

/// Recruiter posts on a social platform, discovered through a web search
/// engine restricted to the platform's domain.
pub struct PostSearchAdapter {
    client: Client,
    platform: PostPlatform,
    site: String,
    endpoint: String,
}

impl PostSearchAdapter {
    pub fn new(client: Client, platform: PostPlatform) -> Self {
        Self {
            client,
            platform,
            site: format!("{}{}", POST_SITE_PREFIX, platform.key()),
            endpoint: "https://html.duckduckgo.com/html/".to_string(),
        }
    }
}

#[async_trait]
impl SourceAdapter for PostSearchAdapter {
    fn site(&self) -> &str {
        &self.site
    }

    async fn fetch_postings(&self, query: &SearchQuery, limit: usize) -> Result<Vec<Posting>> {
        let q = build_query(
            &query.term,
            query.location.as_deref(),
            self.platform.site_filter(),
        );
        let mut params = vec![("q", q)];
        if let Some(df) = date_window(query.max_age_hours) {
            params.push(("df", df.to_string()));
        }

        let body = get_checked(self.client.get(&self.endpoint).query(&params), &self.site)
            .await?
            .text()
            .await?;
        Ok(parse_results(&body, self.platform, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_uses_the_city_and_site_filter() {
        let q = build_query(
            "desenvolvedor python",
            Some("Rio de Janeiro, Brazil"),
            PostPlatform::Instagram.site_filter(),
        );
        assert!(q.starts_with("(\"estamos contratando\" OR \"vaga aberta\""));
        assert!(q.contains("desenvolvedor python Rio de Janeiro site:instagram.com"));
        assert!(!q.contains("Brazil"));
        assert!(!q.contains("looking for"));
    }

    #[test]
    fn redirect_links_are_decoded() {
        assert_eq!(
            decode_result_link(
                "//duckduckgo.com/l/?uddg=https%3A%2F%2Fwww.linkedin.com%2Fposts%2Fana_vaga-123&rut=abc"
            )
            .as_deref(),
            Some("https://www.linkedin.com/posts/ana_vaga-123")
        );
        assert_eq!(
            decode_result_link("https://x.com/acme/status/1").as_deref(),
            Some("https://x.com/acme/status/1")
        );
    }

    #[test]
    fn results_become_post_rows() {
        let body = r#"
            <div class="result">
              <a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fx.com%2Facme%2Fstatus%2F9">Estamos contratando dev Rust</a>
              <a class="result__snippet">Mande CV para talentos@acme.com.br</a>
            </div>
            <div class="result"><span>sem link</span></div>"#;

        let rows = parse_results(body, PostPlatform::Twitter, 10);
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.site, "post_twitter");
        assert!(row.is_post());
        assert_eq!(row.source_url.as_deref(), Some("https://x.com/acme/status/9"));
        assert_eq!(row.raw_contact_hint.as_deref(), Some("talentos@acme.com.br"));
        assert_eq!(row.employment_type.as_deref(), Some("Post"));
    }

    #[test]
    fn age_maps_to_date_window() {
        assert_eq!(date_window(None), None);
        assert_eq!(date_window(Some(24)), Some("d"));
        assert_eq!(date_window(Some(72)), Some("w"));
        assert_eq!(date_window(Some(720)), Some("m"));
        assert_eq!(date_window(Some(9000)), Some("y"));
    }
}
