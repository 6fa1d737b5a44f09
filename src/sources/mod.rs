//! Source adapters: one fetch-and-normalise unit per posting source.
//!
//! Every adapter satisfies [`SourceAdapter`]. Implementations only write the
//! fallible [`SourceAdapter::fetch_postings`]; the provided
//! [`SourceAdapter::fetch`] turns its result into a [`FetchOutcome`],
//! normalises rows and enforces the limit, so callers never handle
//! adapter-level errors.

pub mod de;
pub mod geekhunter;
pub mod gupy;
pub mod html;
pub mod linkedin;
pub mod posts;
pub mod reddit;
pub mod remoteok;
pub mod trampos;
pub mod vagascom;
pub mod workana;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use lazy_static::lazy_static;
use regex::Regex;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::models::posting::Posting;
use crate::patterns::REMOTE_PATTERN;

lazy_static! {
    static ref REMOTE_REGEX: Regex = Regex::new(REMOTE_PATTERN).unwrap();
}

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub term: String,
    pub location: Option<String>,
    pub max_age_hours: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PostPlatform {
    LinkedinPosts,
    Twitter,
    Instagram,
    Facebook,
}

impl PostPlatform {
    pub const ALL: [PostPlatform; 4] = [
        PostPlatform::LinkedinPosts,
        PostPlatform::Twitter,
        PostPlatform::Instagram,
        PostPlatform::Facebook,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            PostPlatform::LinkedinPosts => "linkedin_posts",
            PostPlatform::Twitter => "twitter",
            PostPlatform::Instagram => "instagram",
            PostPlatform::Facebook => "facebook",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PostPlatform::LinkedinPosts => "LinkedIn Posts",
            PostPlatform::Twitter => "Twitter / X",
            PostPlatform::Instagram => "Instagram",
            PostPlatform::Facebook => "Facebook",
        }
    }

    /// Search-engine operators restricting results to the platform.
    /// LinkedIn excludes `/jobs/` so post URLs never shadow job-board URLs.
    pub fn site_filter(&self) -> &'static str {
        match self {
            PostPlatform::LinkedinPosts => {
                "(site:linkedin.com/posts OR site:linkedin.com/pulse) -site:linkedin.com/jobs"
            }
            PostPlatform::Twitter => "site:twitter.com OR site:x.com",
            PostPlatform::Instagram => "site:instagram.com",
            PostPlatform::Facebook => "site:facebook.com",
        }
    }
}

/// Identifies one selectable source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKey {
    Linkedin,
    Gupy,
    RemoteOk,
    VagasCom,
    GeekHunter,
    Trampos,
    Reddit,
    Workana,
    Posts(PostPlatform),
}

impl SourceKey {
    pub fn all() -> Vec<SourceKey> {
        let mut keys = vec![
            SourceKey::Linkedin,
            SourceKey::Gupy,
            SourceKey::RemoteOk,
            SourceKey::VagasCom,
            SourceKey::GeekHunter,
            SourceKey::Trampos,
            SourceKey::Reddit,
            SourceKey::Workana,
        ];
        keys.extend(PostPlatform::ALL.into_iter().map(SourceKey::Posts));
        keys
    }

    pub fn key(&self) -> &'static str {
        match self {
            SourceKey::Linkedin => "linkedin",
            SourceKey::Gupy => "gupy",
            SourceKey::RemoteOk => "remoteok",
            SourceKey::VagasCom => "vagascom",
            SourceKey::GeekHunter => "geekhunter",
            SourceKey::Trampos => "trampos",
            SourceKey::Reddit => "reddit",
            SourceKey::Workana => "workana",
            SourceKey::Posts(platform) => platform.key(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SourceKey::Linkedin => "LinkedIn",
            SourceKey::Gupy => "Gupy",
            SourceKey::RemoteOk => "RemoteOK",
            SourceKey::VagasCom => "Vagas.com",
            SourceKey::GeekHunter => "GeekHunter",
            SourceKey::Trampos => "Trampos.co",
            SourceKey::Reddit => "Reddit r/brdev",
            SourceKey::Workana => "Workana",
            SourceKey::Posts(platform) => platform.label(),
        }
    }

    pub fn is_post_search(&self) -> bool {
        matches!(self, SourceKey::Posts(_))
    }
}

impl fmt::Display for SourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for SourceKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase();
        // `post_{platform}` site tags name post platforms only
        let post_platform = normalized
            .strip_prefix(crate::models::posting::POST_SITE_PREFIX)
            .and_then(|rest| PostPlatform::ALL.into_iter().find(|p| p.key() == rest));
        post_platform
            .map(SourceKey::Posts)
            .or_else(|| {
                SourceKey::all()
                    .into_iter()
                    .find(|key| key.key() == normalized)
            })
            .ok_or_else(|| {
                let valid: Vec<&str> = SourceKey::all().iter().map(|k| k.key()).collect();
                Error::BadRequest(format!(
                    "Invalid source '{}'. Valid: {}",
                    s.trim(),
                    valid.join(", ")
                ))
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFailure {
    pub site: String,
    pub message: String,
}

/// Result of one adapter invocation; failures carry a diagnostic instead of
/// propagating.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Success(Vec<Posting>),
    Failure(SourceFailure),
}

#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Tag used in diagnostics; usually the `site` value of emitted rows.
    fn site(&self) -> &str;

    async fn fetch_postings(&self, query: &SearchQuery, limit: usize) -> Result<Vec<Posting>>;

    async fn fetch(&self, query: &SearchQuery, limit: usize) -> FetchOutcome {
        match self.fetch_postings(query, limit).await {
            Ok(rows) => {
                let rows: Vec<Posting> = rows
                    .into_iter()
                    .map(Posting::normalized)
                    .take(limit)
                    .collect();
                info!(site = self.site(), term = %query.term, count = rows.len(), "source fetched");
                FetchOutcome::Success(rows)
            }
            Err(err) => {
                warn!(site = self.site(), term = %query.term, error = %err, "source fetch failed");
                FetchOutcome::Failure(SourceFailure {
                    site: self.site().to_string(),
                    message: err.to_string(),
                })
            }
        }
    }
}

/// Maps source keys to adapter instances.
#[derive(Clone, Default)]
pub struct AdapterRegistry {
    adapters: HashMap<SourceKey, Arc<dyn SourceAdapter>>,
}

impl AdapterRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registers the full catalogue on one shared HTTP client.
    pub fn with_defaults(client: Client) -> Self {
        let mut registry = Self::empty();
        for key in SourceKey::all() {
            let adapter: Arc<dyn SourceAdapter> = match key {
                SourceKey::Linkedin => Arc::new(linkedin::LinkedinAdapter::new(client.clone())),
                SourceKey::Gupy => Arc::new(gupy::GupyAdapter::new(client.clone())),
                SourceKey::RemoteOk => Arc::new(remoteok::RemoteOkAdapter::new(client.clone())),
                SourceKey::VagasCom => Arc::new(vagascom::VagasComAdapter::new(client.clone())),
                SourceKey::GeekHunter => {
                    Arc::new(geekhunter::GeekHunterAdapter::new(client.clone()))
                }
                SourceKey::Trampos => Arc::new(trampos::TramposAdapter::new(client.clone())),
                SourceKey::Reddit => Arc::new(reddit::RedditAdapter::new(client.clone())),
                SourceKey::Workana => Arc::new(workana::WorkanaAdapter::new(client.clone())),
                SourceKey::Posts(platform) => {
                    Arc::new(posts::PostSearchAdapter::new(client.clone(), platform))
                }
            };
            registry.register(key, adapter);
        }
        registry
    }

    pub fn register(&mut self, key: SourceKey, adapter: Arc<dyn SourceAdapter>) {
        self.adapters.insert(key, adapter);
    }

    pub fn with(mut self, key: SourceKey, adapter: Arc<dyn SourceAdapter>) -> Self {
        self.register(key, adapter);
        self
    }

    pub fn get(&self, key: SourceKey) -> Option<Arc<dyn SourceAdapter>> {
        self.adapters.get(&key).cloned()
    }
}

pub fn build_http_client(timeout: Duration) -> Result<Client> {
    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert(
        reqwest::header::ACCEPT,
        reqwest::header::HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        ),
    );
    headers.insert(
        reqwest::header::ACCEPT_LANGUAGE,
        reqwest::header::HeaderValue::from_static("pt-BR,pt;q=0.9,en-US;q=0.8"),
    );

    let client = Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()?;
    Ok(client)
}

/// Resolves a possibly relative `href` against the source's origin. Only
/// http(s) targets are kept, so `javascript:` or `mailto:` links yield `None`.
pub fn absolute_url(base: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    if is_web_url(href) {
        return Some(href.to_string());
    }
    let resolved = url::Url::parse(base).ok()?.join(href).ok()?;
    matches!(resolved.scheme(), "http" | "https").then(|| resolved.to_string())
}

pub fn is_web_url(url: &str) -> bool {
    let lower = url.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

pub fn mentions_remote(text: &str) -> bool {
    REMOTE_REGEX.is_match(text)
}

async fn get_checked(request: reqwest::RequestBuilder, site: &str) -> Result<reqwest::Response> {
    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(Error::unexpected(site, format!("HTTP {}", status)));
    }
    Ok(response)
}
