use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::dto::history_dto::HistoryQuery;
use crate::error::Result;
use crate::models::posting::{PersistedPosting, Posting, PostingStats};
use crate::utils::time::now;

const SELECT_COLUMNS: &str = "id, source_url, site, title, company, location, is_remote, \
     employment_type, salary_min, salary_max, currency, posted_date, raw_contact_hint, \
     description, recruiter_email, recruiter_name, search_term, collected_at";

/// Append-only posting history keyed by `source_url`.
#[derive(Clone)]
pub struct PostingService {
    pool: SqlitePool,
}

impl PostingService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Inserts unseen postings and returns how many were new. Already stored
    /// URLs are ignored; rows without a URL are skipped.
    #[instrument(skip(self, postings), fields(rows = postings.len()))]
    pub async fn save(&self, postings: &[Posting], search_term: &str) -> Result<u64> {
        if postings.is_empty() {
            return Ok(0);
        }

        let collected_at = now();
        let mut skipped = 0usize;
        let mut inserted = 0u64;
        let mut tx = self.pool.begin().await?;

        for posting in postings {
            let Some(url) = posting.identity() else {
                skipped += 1;
                continue;
            };
            let result = sqlx::query(
                r#"
                INSERT INTO postings (
                    source_url, site, title, company, location, is_remote,
                    employment_type, salary_min, salary_max, currency, posted_date,
                    raw_contact_hint, description, recruiter_email, recruiter_name,
                    search_term, collected_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(source_url) DO NOTHING
                "#,
            )
            .bind(url)
            .bind(&posting.site)
            .bind(&posting.title)
            .bind(&posting.company)
            .bind(&posting.location)
            .bind(posting.is_remote)
            .bind(&posting.employment_type)
            .bind(posting.salary_min)
            .bind(posting.salary_max)
            .bind(&posting.currency)
            .bind(posting.posted_date)
            .bind(&posting.raw_contact_hint)
            .bind(&posting.description)
            .bind(&posting.recruiter_email)
            .bind(&posting.recruiter_name)
            .bind(search_term)
            .bind(collected_at)
            .execute(&mut *tx)
            .await?;
            inserted += result.rows_affected();
        }

        tx.commit().await?;

        if skipped > 0 {
            warn!(skipped, "postings without a source URL were not stored");
        }
        info!(inserted, offered = postings.len(), "postings saved");
        Ok(inserted)
    }

    /// Most recent first. The text filter is matched in Rust with full
    /// Unicode case folding, since SQLite `LIKE` only folds ASCII.
    pub async fn load(&self, query: &HistoryQuery) -> Result<Vec<PersistedPosting>> {
        query.validate()?;

        let needle = query.text_filter().map(str::to_lowercase);
        let site = query.site_filter();

        let mut sql = format!("SELECT {} FROM postings", SELECT_COLUMNS);
        if site.is_some() {
            sql.push_str(" WHERE site = ?");
        }
        sql.push_str(" ORDER BY collected_at DESC, id DESC");
        if needle.is_none() {
            sql.push_str(" LIMIT ?");
        }

        let mut statement = sqlx::query_as::<_, PersistedPosting>(&sql);
        if let Some(site) = site {
            statement = statement.bind(site);
        }
        let rows: Vec<PersistedPosting> = match &needle {
            Some(needle) => statement
                .fetch_all(&self.pool)
                .await?
                .into_iter()
                .filter(|row| matches_text(row, needle))
                .take(query.limit as usize)
                .collect(),
            None => statement.bind(query.limit).fetch_all(&self.pool).await?,
        };
        Ok(rows)
    }

    pub async fn stats(&self) -> Result<PostingStats> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM postings")
            .fetch_one(&self.pool)
            .await?;

        let per_site = sqlx::query_as::<_, (String, i64)>(
            "SELECT site, COUNT(*) AS n FROM postings GROUP BY site ORDER BY n DESC, site ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        let most_recent_collection = sqlx::query_scalar::<_, DateTime<Utc>>(
            "SELECT collected_at FROM postings ORDER BY collected_at DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        let with_recruiter_email = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM postings WHERE recruiter_email IS NOT NULL AND recruiter_email <> ''",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(PostingStats {
            total,
            per_site,
            most_recent_collection,
            with_recruiter_email,
        })
    }

    pub async fn distinct_sites(&self) -> Result<Vec<String>> {
        let sites = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT site FROM postings ORDER BY site ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(sites)
    }

    /// Irreversibly clears the history; returns the number of removed rows.
    pub async fn delete_all(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM postings")
            .execute(&self.pool)
            .await?;
        warn!(removed = result.rows_affected(), "posting history cleared");
        Ok(result.rows_affected())
    }
}

fn matches_text(row: &PersistedPosting, needle: &str) -> bool {
    [row.title.as_deref(), row.company.as_deref(), Some(row.search_term.as_str())]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(needle))
}
