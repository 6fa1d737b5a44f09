use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::warn;

use super::de::deserialize_f64_flexible;
use super::{mentions_remote, SearchQuery, SourceAdapter};
use crate::error::Result;
use crate::models::posting::Posting;
use crate::patterns::FORUM_JOB_KEYWORDS;
use crate::utils::text::truncate_chars;
use crate::utils::time::date_from_epoch;

const SUBREDDITS: &[&str] = &["brdev", "remotebrazil", "devBrasil"];
const PAGE_LIMIT: usize = 25;
const SUBREDDIT_DELAY: Duration = Duration::from_secs(1);
const DESCRIPTION_CHARS: usize = 2000;
const REDDIT_USER_AGENT: &str = "vagas-aggregator/0.1 (job search aggregator)";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Listing {
    pub data: ListingData,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListingData {
    pub children: Vec<Child>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Child {
    pub data: RedditPost,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RedditPost {
    pub title: String,
    pub selftext: String,
    pub url: Option<String>,
    pub permalink: Option<String>,
    #[serde(deserialize_with = "deserialize_f64_flexible")]
    pub created_utc: Option<f64>,
}

/// Reddit's `t` window for a maximum posting age; a month when unset.
pub fn time_window(max_age_hours: Option<u32>) -> &'static str {
    match max_age_hours {
        Some(h) if h <= 24 => "day",
        Some(h) if h <= 24 * 7 => "week",
        Some(h) if h <= 24 * 31 => "month",
        Some(_) => "year",
        None => "month",
    }
}

/// Keeps only posts mentioning a job keyword and maps them to postings
/// tagged with their subreddit.
pub fn job_posts(subreddit: &str, listing: Listing) -> Vec<Posting> {
    let site = format!("reddit_r/{}", subreddit);
    listing
        .data
        .children
        .into_iter()
        .map(|child| child.data)
        .filter_map(|post| {
            let combined = format!("{} {}", post.title, post.selftext).to_lowercase();
            if !FORUM_JOB_KEYWORDS.iter().any(|kw| combined.contains(kw)) {
                return None;
            }
            let source_url = post
                .url
                .filter(|u| !u.trim().is_empty())
                .or_else(|| {
                    post.permalink
                        .as_ref()
                        .map(|p| format!("https://reddit.com{}", p))
                });

            Some(Posting {
                source_url,
                title: Some(post.title),
                is_remote: mentions_remote(&combined),
                employment_type: Some("Post".to_string()),
                posted_date: post.created_utc.and_then(date_from_epoch),
                description: Some(truncate_chars(&post.selftext, DESCRIPTION_CHARS)),
                ..Posting::new(site.clone())
            })
        })
        .collect()
}

/// Job threads from Brazilian developer subreddits via the public JSON search.
pub struct RedditAdapter {
    client: Client,
    base_url: String,
}

impl RedditAdapter {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: "https://www.reddit.com".to_string(),
        }
    }
}

#[async_trait]
impl SourceAdapter for RedditAdapter {
    fn site(&self) -> &str {
        "reddit"
    }

    async fn fetch_postings(&self, query: &SearchQuery, limit: usize) -> Result<Vec<Posting>> {
        let search = format!("vaga {}", query.term);
        let window = time_window(query.max_age_hours);
        let page_limit = PAGE_LIMIT.to_string();
        let mut rows = Vec::new();

        for (i, subreddit) in SUBREDDITS.iter().copied().enumerate() {
            if rows.len() >= limit {
                break;
            }
            if i > 0 {
                tokio::time::sleep(SUBREDDIT_DELAY).await;
            }

            let url = format!("{}/r/{}/search.json", self.base_url, subreddit);
            let response = self
                .client
                .get(&url)
                .header(reqwest::header::USER_AGENT, REDDIT_USER_AGENT)
                .query(&[
                    ("q", search.as_str()),
                    ("restrict_sr", "1"),
                    ("sort", "new"),
                    ("limit", page_limit.as_str()),
                    ("t", window),
                ])
                .send()
                .await?;

            if !response.status().is_success() {
                warn!(subreddit, status = %response.status(), "subreddit search skipped");
                continue;
            }
            let listing = response.json::<Listing>().await?;
            rows.extend(job_posts(subreddit, listing));
        }

        rows.truncate(limit);
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keeps_only_job_threads() {
        let listing: Listing = serde_json::from_value(json!({
            "data": { "children": [
                { "data": {
                    "title": "[Vaga] Backend Rust remoto",
                    "selftext": "Contratamos dev. Falar com Ana Souza",
                    "url": "",
                    "permalink": "/r/brdev/comments/abc/vaga/",
                    "created_utc": 1700000000.0
                }},
                { "data": { "title": "Qual teclado vocês usam?", "selftext": "" } }
            ]}
        }))
        .unwrap();

        let rows = job_posts("brdev", listing);
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.site, "reddit_r/brdev");
        assert_eq!(
            row.source_url.as_deref(),
            Some("https://reddit.com/r/brdev/comments/abc/vaga/")
        );
        assert!(row.is_remote);
        assert_eq!(row.employment_type.as_deref(), Some("Post"));
        assert!(row.posted_date.is_some());
    }

    #[test]
    fn long_bodies_are_truncated() {
        let listing: Listing = serde_json::from_value(json!({
            "data": { "children": [{ "data": {
                "title": "Oportunidade",
                "selftext": "x".repeat(5000),
                "url": "https://example.com/vaga"
            }}]}
        }))
        .unwrap();
        let rows = job_posts("devBrasil", listing);
        assert_eq!(rows[0].description.as_ref().map(|d| d.chars().count()), Some(2000));
    }

    #[test]
    fn age_maps_to_search_window() {
        assert_eq!(time_window(Some(12)), "day");
        assert_eq!(time_window(Some(168)), "week");
        assert_eq!(time_window(Some(500)), "month");
        assert_eq!(time_window(Some(10_000)), "year");
        assert_eq!(time_window(None), "month");
    }
}
