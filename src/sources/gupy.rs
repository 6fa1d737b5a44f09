use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::de::company_name;
use super::{get_checked, SearchQuery, SourceAdapter};
use crate::error::Result;
use crate::models::posting::Posting;
use crate::utils::time::date_from_iso;

const SITE: &str = "gupy";
const PAGE_SIZE: usize = 40;
const PAGE_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GupyPage {
    pub data: Vec<GupyJob>,
    pub total: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GupyJob {
    pub name: Option<String>,
    pub company: Option<Value>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub workplace_type: Option<String>,
    #[serde(rename = "type")]
    pub job_type: Option<String>,
    pub published_date: Option<String>,
    pub job_url: Option<String>,
    pub description: Option<String>,
}

impl From<GupyJob> for Posting {
    fn from(job: GupyJob) -> Self {
        let location = [job.city.as_deref(), job.state.as_deref(), Some("Brazil")]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ");
        let workplace = job
            .workplace_type
            .as_deref()
            .unwrap_or_default()
            .to_lowercase();

        Posting {
            source_url: job.job_url,
            title: job.name,
            company: company_name(job.company.as_ref()),
            location: Some(location),
            is_remote: matches!(workplace.as_str(), "remote" | "home_office" | "hybrid"),
            employment_type: job.job_type,
            currency: Some("BRL".to_string()),
            posted_date: job.published_date.as_deref().and_then(date_from_iso),
            description: job.description,
            ..Posting::new(SITE)
        }
    }
}

/// Public job API behind the Gupy career portals.
pub struct GupyAdapter {
    client: Client,
    base_url: String,
}

impl GupyAdapter {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: "https://portal.api.gupy.io".to_string(),
        }
    }

    async fn fetch_page(&self, term: &str, page_size: usize, offset: usize) -> Result<GupyPage> {
        let url = format!("{}/api/v1/jobs", self.base_url);
        let response = get_checked(
            self.client.get(&url).query(&[
                ("jobName", term.to_string()),
                ("limit", page_size.to_string()),
                ("offset", offset.to_string()),
            ]),
            SITE,
        )
        .await?;
        Ok(response.json::<GupyPage>().await?)
    }
}

#[async_trait]
impl SourceAdapter for GupyAdapter {
    fn site(&self) -> &str {
        SITE
    }

    async fn fetch_postings(&self, query: &SearchQuery, limit: usize) -> Result<Vec<Posting>> {
        let page_size = limit.clamp(1, PAGE_SIZE);
        let mut rows: Vec<Posting> = Vec::new();
        let mut offset = 0;

        while rows.len() < limit {
            let page = self.fetch_page(&query.term, page_size, offset).await?;
            if page.data.is_empty() {
                break;
            }
            let total = page.total.unwrap_or(0) as usize;
            rows.extend(page.data.into_iter().map(Posting::from));

            offset += page_size;
            debug!(offset, total, "gupy page consumed");
            if offset >= total || offset >= limit {
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
    use chrono::NaiveDate;
    use serde_json::json;

    #[test]
    fn maps_a_gupy_job_to_the_canonical_shape() {
        let page: GupyPage = serde_json::from_value(json!({
            "data": [{
                "name": "Desenvolvedor Python",
                "company": { "name": "Acme" },
                "city": "Recife",
                "state": "Pernambuco",
                "workplaceType": "home_office",
                "type": "vacancy_type_effective",
                "publishedDate": "2026-02-10T12:00:00.000Z",
                "jobUrl": "https://acme.gupy.io/jobs/1",
                "description": "Contato: rh@acme.com"
            }],
            "total": 1
        }))
        .unwrap();

        let posting = Posting::from(page.data[0].clone());
        assert_eq!(posting.site, "gupy");
        assert_eq!(posting.company.as_deref(), Some("Acme"));
        assert_eq!(posting.location.as_deref(), Some("Recife, Pernambuco, Brazil"));
        assert!(posting.is_remote);
        assert_eq!(posting.currency.as_deref(), Some("BRL"));
        assert_eq!(posting.posted_date, NaiveDate::from_ymd_opt(2026, 2, 10));
        assert_eq!(posting.recruiter_email, None);
    }

    #[test]
    fn on_site_jobs_are_not_remote() {
        let job: GupyJob = serde_json::from_value(json!({
            "name": "Analista",
            "company": "Acme",
            "workplaceType": "on-site",
            "jobUrl": "https://acme.gupy.io/jobs/2"
        }))
        .unwrap();
        let posting = Posting::from(job);
        assert!(!posting.is_remote);
        assert_eq!(posting.location.as_deref(), Some("Brazil"));
        assert_eq!(posting.company.as_deref(), Some("Acme"));
    }
}
