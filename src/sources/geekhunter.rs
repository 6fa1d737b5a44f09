use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use super::de::{bool_from_value, company_name, first_f64, first_string};
use super::{absolute_url, get_checked, SearchQuery, SourceAdapter};
use crate::error::Result;
use crate::models::posting::Posting;
use crate::utils::time::date_from_iso;

const SITE: &str = "geekhunter";

/// The endpoint has answered with `{"opportunities": […]}`, `{"data": […]}`
/// and bare arrays; all three are accepted.
pub fn job_entries(body: &Value) -> Vec<&Value> {
    let list = body
        .get("opportunities")
        .and_then(Value::as_array)
        .or_else(|| body.get("data").and_then(Value::as_array))
        .or_else(|| body.as_array());
    list.map(|jobs| jobs.iter().filter(|job| job.is_object()).collect())
        .unwrap_or_default()
}

pub fn posting_from_entry(job: &Value, base_url: &str) -> Posting {
    let source_url = first_string(job, &["url"])
        .and_then(|url| absolute_url(base_url, &url))
        .or_else(|| first_string(job, &["id"]).map(|id| format!("{}/vagas/{}", base_url, id)));

    Posting {
        source_url,
        title: first_string(job, &["title", "name"]),
        company: company_name(job.get("company")),
        location: first_string(job, &["city", "location"]),
        is_remote: job.get("remote").map(bool_from_value).unwrap_or(false),
        employment_type: first_string(job, &["contract_type", "job_type"]),
        salary_min: first_f64(job, &["salary_from", "min_salary"]),
        salary_max: first_f64(job, &["salary_to", "max_salary"]),
        currency: Some("BRL".to_string()),
        posted_date: first_string(job, &["created_at"]).as_deref().and_then(date_from_iso),
        description: first_string(job, &["description"]),
        ..Posting::new(SITE)
    }
}

/// Brazilian tech-recruiting marketplace with a public JSON index.
pub struct GeekHunterAdapter {
    client: Client,
    base_url: String,
}

impl GeekHunterAdapter {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: "https://www.geekhunter.com.br".to_string(),
        }
    }
}

#[async_trait]
impl SourceAdapter for GeekHunterAdapter {
    fn site(&self) -> &str {
        SITE
    }

    async fn fetch_postings(&self, query: &SearchQuery, limit: usize) -> Result<Vec<Posting>> {
        let url = format!("{}/api/v1/opportunities/public_index", self.base_url);
        let response = get_checked(
            self.client.get(&url).query(&[
                ("q", query.term.clone()),
                ("per_page", limit.to_string()),
                ("page", "1".to_string()),
            ]),
            SITE,
        )
        .await?;
        let body = response.json::<Value>().await?;

        Ok(job_entries(&body)
            .into_iter()
            .take(limit)
            .map(|job| posting_from_entry(job, &self.base_url))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_every_known_envelope() {
        let job = json!({ "id": 5, "title": "Dev" });
        assert_eq!(job_entries(&json!({ "opportunities": [job.clone()] })).len(), 1);
        assert_eq!(job_entries(&json!({ "data": [job.clone(), "junk"] })).len(), 1);
        assert_eq!(job_entries(&json!([job])).len(), 1);
        assert!(job_entries(&json!({ "message": "down" })).is_empty());
    }

    #[test]
    fn maps_alternate_field_names() {
        let job = json!({
            "id": 77,
            "name": "Backend Pleno",
            "company": "Acme",
            "location": "São Paulo",
            "remote": "true",
            "job_type": "CLT",
            "min_salary": "7000",
            "max_salary": 9000.5,
            "created_at": "2026-01-05T08:00:00-03:00"
        });
        let posting = posting_from_entry(&job, "https://www.geekhunter.com.br");
        assert_eq!(
            posting.source_url.as_deref(),
            Some("https://www.geekhunter.com.br/vagas/77")
        );
        assert_eq!(posting.title.as_deref(), Some("Backend Pleno"));
        assert!(posting.is_remote);
        assert_eq!(posting.employment_type.as_deref(), Some("CLT"));
        assert_eq!(posting.salary_min, Some(7000.0));
        assert_eq!(posting.salary_max, Some(9000.5));
        assert!(posting.posted_date.is_some());
    }

    #[test]
    fn relative_urls_resolve_against_the_site() {
        let base = "https://www.geekhunter.com.br";
        let relative = posting_from_entry(&json!({ "id": 3, "url": "/vagas/123" }), base);
        assert_eq!(
            relative.source_url.as_deref(),
            Some("https://www.geekhunter.com.br/vagas/123")
        );

        let script = posting_from_entry(&json!({ "id": 4, "url": "javascript:void(0)" }), base);
        assert_eq!(
            script.source_url.as_deref(),
            Some("https://www.geekhunter.com.br/vagas/4")
        );
    }
}
