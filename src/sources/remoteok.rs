use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use super::de::{deserialize_f64_flexible, deserialize_string_flexible};
use super::{get_checked, SearchQuery, SourceAdapter};
use crate::error::{Error, Result};
use crate::models::posting::Posting;
use crate::utils::time::{date_from_epoch, date_from_iso};

const SITE: &str = "remoteok";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RemoteOkJob {
    #[serde(deserialize_with = "deserialize_string_flexible")]
    pub id: Option<String>,
    pub position: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    #[serde(deserialize_with = "deserialize_f64_flexible")]
    pub salary_min: Option<f64>,
    #[serde(deserialize_with = "deserialize_f64_flexible")]
    pub salary_max: Option<f64>,
    #[serde(deserialize_with = "deserialize_f64_flexible")]
    pub epoch: Option<f64>,
    pub date: Option<String>,
    pub url: Option<String>,
    pub email: Option<String>,
    pub description: Option<String>,
}

impl From<RemoteOkJob> for Posting {
    fn from(job: RemoteOkJob) -> Self {
        let salary_min = job.salary_min.filter(|v| *v > 0.0);
        let salary_max = job.salary_max.filter(|v| *v > 0.0);
        let source_url = job
            .url
            .filter(|u| !u.trim().is_empty())
            .or_else(|| job.id.as_ref().map(|id| format!("https://remoteok.com/remote-jobs/{}", id)));
        let posted_date = job
            .epoch
            .and_then(date_from_epoch)
            .or_else(|| job.date.as_deref().and_then(date_from_iso));

        Posting {
            source_url,
            title: job.position,
            company: job.company,
            location: job
                .location
                .filter(|l| !l.trim().is_empty())
                .or_else(|| Some("Remote".to_string())),
            is_remote: true,
            salary_min,
            salary_max,
            currency: salary_min.map(|_| "USD".to_string()),
            posted_date,
            raw_contact_hint: job.email,
            description: job.description,
            ..Posting::new(SITE)
        }
    }
}

/// The feed is an array whose first element is a legal notice; only entries
/// carrying both an id and a position are jobs.
pub fn parse_feed(body: Value) -> Result<Vec<RemoteOkJob>> {
    let Value::Array(entries) = body else {
        return Err(Error::unexpected(SITE, "expected a JSON array"));
    };
    Ok(entries
        .into_iter()
        .filter(|entry| {
            entry.is_object()
                && entry.get("id").is_some_and(|v| !v.is_null())
                && entry.get("position").is_some_and(|v| !v.is_null())
        })
        .filter_map(|entry| serde_json::from_value::<RemoteOkJob>(entry).ok())
        .collect())
}

/// Remote-only job board with a public JSON feed filtered by tags.
pub struct RemoteOkAdapter {
    client: Client,
    base_url: String,
}

impl RemoteOkAdapter {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: "https://remoteok.com".to_string(),
        }
    }
}

#[async_trait]
impl SourceAdapter for RemoteOkAdapter {
    fn site(&self) -> &str {
        SITE
    }

    async fn fetch_postings(&self, query: &SearchQuery, limit: usize) -> Result<Vec<Posting>> {
        let tags = query
            .term
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("+");
        let url = format!("{}/api?tags={}", self.base_url, tags);
        let response = get_checked(self.client.get(&url), SITE).await?;
        let body = response.json::<Value>().await?;

        Ok(parse_feed(body)?
            .into_iter()
            .take(limit)
            .map(Posting::from)
            .collect())
    }
}
