use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

use crate::error::{Error, Result};
use crate::sources::SourceKey;

/// Structured search request as supplied by the presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SearchRequest {
    #[validate(length(min = 1, message = "at least one search term is required"))]
    pub search_terms: Vec<String>,
    #[validate(length(min = 1, message = "select at least one source"))]
    pub sources: Vec<String>,
    #[serde(default)]
    pub location: String,
    #[validate(range(min = 1, max = 500))]
    pub results_per_source: usize,
    pub max_age_hours: Option<u32>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub seniority: Vec<String>,
    #[serde(default)]
    pub remote_only: bool,
    pub export_format: Option<ExportFormat>,
    /// Overrides the generated export file stem.
    #[serde(default)]
    pub output_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Seniority {
    Trainee,
    Junior,
    #[serde(alias = "mid")]
    Pleno,
    Senior,
}

impl Seniority {
    pub const ALL: [Seniority; 4] = [
        Seniority::Trainee,
        Seniority::Junior,
        Seniority::Pleno,
        Seniority::Senior,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Seniority::Trainee => "trainee",
            Seniority::Junior => "junior",
            Seniority::Pleno => "pleno",
            Seniority::Senior => "senior",
        }
    }
}

impl FromStr for Seniority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "trainee" | "estagio" | "estágio" | "intern" => Ok(Seniority::Trainee),
            "junior" | "júnior" | "jr" => Ok(Seniority::Junior),
            "pleno" | "mid" | "mid-level" => Ok(Seniority::Pleno),
            "senior" | "sênior" | "sr" => Ok(Seniority::Senior),
            other => Err(Error::BadRequest(format!(
                "Invalid seniority level '{}'. Valid: trainee, junior, pleno (mid), senior",
                other
            ))),
        }
    }
}

impl fmt::Display for Seniority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    #[serde(alias = "xlsx")]
    Excel,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Excel => "xlsx",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "excel" | "xlsx" => Ok(ExportFormat::Excel),
            other => Err(Error::BadRequest(format!(
                "Invalid export format '{}'. Valid: csv, excel",
                other
            ))),
        }
    }
}

/// Row-level narrowing options applied after enrichment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub remote_only: bool,
    pub skills: Vec<String>,
    pub seniority: Vec<Seniority>,
}

/// A request that passed pre-flight validation.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPlan {
    pub search_terms: Vec<String>,
    pub sources: Vec<SourceKey>,
    pub location: Option<String>,
    pub results_per_source: usize,
    pub max_age_hours: Option<u32>,
    pub filters: FilterOptions,
    pub export_format: Option<ExportFormat>,
    pub output_name: Option<String>,
}

impl SearchPlan {
    pub fn primary_term(&self) -> &str {
        self.search_terms.first().map(String::as_str).unwrap_or_default()
    }

    /// The literal term stamped on every row saved by this run.
    pub fn combined_term(&self) -> String {
        self.search_terms.join(" + ")
    }
}

impl TryFrom<SearchRequest> for SearchPlan {
    type Error = Error;

    fn try_from(request: SearchRequest) -> Result<Self> {
        request.validate()?;

        let mut search_terms: Vec<String> = Vec::new();
        for term in &request.search_terms {
            let term = term.trim();
            if term.is_empty() {
                return Err(Error::BadRequest("Search term must not be empty".to_string()));
            }
            if !search_terms.iter().any(|t| t == term) {
                search_terms.push(term.to_string());
            }
        }

        let mut sources: Vec<SourceKey> = Vec::new();
        for raw in &request.sources {
            let key = raw.parse::<SourceKey>()?;
            if !sources.contains(&key) {
                sources.push(key);
            }
        }

        let mut seniority: Vec<Seniority> = Vec::new();
        for raw in &request.seniority {
            let level = raw.parse::<Seniority>()?;
            if !seniority.contains(&level) {
                seniority.push(level);
            }
        }

        let skills = request
            .skills
            .iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let location = Some(request.location.trim().to_string()).filter(|l| !l.is_empty());

        Ok(Self {
            search_terms,
            sources,
            location,
            results_per_source: request.results_per_source,
            max_age_hours: request.max_age_hours,
            filters: FilterOptions {
                remote_only: request.remote_only,
                skills,
                seniority,
            },
            export_format: request.export_format,
            output_name: request
                .output_name
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty()),
        })
    }
}
