use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::utils::text::clean;

/// Site tags starting with this prefix come from free-text post search.
pub const POST_SITE_PREFIX: &str = "post_";

/// The canonical record every source adapter emits.
///
/// `source_url` is the natural identity: two postings with the same URL are
/// the same entity regardless of any other field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    pub source_url: Option<String>,
    pub site: String,
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    #[serde(default)]
    pub is_remote: bool,
    pub employment_type: Option<String>,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
    pub currency: Option<String>,
    pub posted_date: Option<NaiveDate>,
    pub raw_contact_hint: Option<String>,
    pub description: Option<String>,
    pub recruiter_email: Option<String>,
    pub recruiter_name: Option<String>,
}

impl Posting {
    pub fn new(site: impl Into<String>) -> Self {
        Self {
            site: site.into(),
            ..Self::default()
        }
    }

    pub fn identity(&self) -> Option<&str> {
        self.source_url.as_deref().filter(|url| !url.is_empty())
    }

    pub fn is_post(&self) -> bool {
        self.site.starts_with(POST_SITE_PREFIX)
    }

    /// Applies the canonical null conventions: blank or null-like strings
    /// become `None`, salaries must be finite and non-negative.
    pub fn normalized(self) -> Self {
        Self {
            source_url: clean(self.source_url),
            site: self.site.trim().to_string(),
            title: clean(self.title),
            company: clean(self.company),
            location: clean(self.location),
            is_remote: self.is_remote,
            employment_type: clean(self.employment_type),
            salary_min: salary(self.salary_min),
            salary_max: salary(self.salary_max),
            currency: clean(self.currency),
            posted_date: self.posted_date,
            raw_contact_hint: clean(self.raw_contact_hint),
            description: clean(self.description),
            recruiter_email: clean(self.recruiter_email),
            recruiter_name: clean(self.recruiter_name),
        }
    }

    /// Title and description joined, the text that keyword filters scan.
    pub fn searchable_text(&self) -> impl Iterator<Item = &str> {
        [self.title.as_deref(), self.description.as_deref()]
            .into_iter()
            .flatten()
    }
}

fn salary(value: Option<f64>) -> Option<f64> {
    value.filter(|amount| amount.is_finite() && *amount >= 0.0)
}

/// A posting as stored in the history table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PersistedPosting {
    pub id: i64,
    pub source_url: String,
    pub site: String,
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub is_remote: bool,
    pub employment_type: Option<String>,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
    pub currency: Option<String>,
    pub posted_date: Option<NaiveDate>,
    pub raw_contact_hint: Option<String>,
    pub description: Option<String>,
    pub recruiter_email: Option<String>,
    pub recruiter_name: Option<String>,
    pub search_term: String,
    pub collected_at: DateTime<Utc>,
}

impl From<PersistedPosting> for Posting {
    fn from(value: PersistedPosting) -> Self {
        Self {
            source_url: Some(value.source_url),
            site: value.site,
            title: value.title,
            company: value.company,
            location: value.location,
            is_remote: value.is_remote,
            employment_type: value.employment_type,
            salary_min: value.salary_min,
            salary_max: value.salary_max,
            currency: value.currency,
            posted_date: value.posted_date,
            raw_contact_hint: value.raw_contact_hint,
            description: value.description,
            recruiter_email: value.recruiter_email,
            recruiter_name: value.recruiter_name,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostingStats {
    pub total: i64,
    pub per_site: Vec<(String, i64)>,
    pub most_recent_collection: Option<DateTime<Utc>>,
    pub with_recruiter_email: i64,
}
