use lazy_static::lazy_static;
use regex::{Regex, RegexBuilder};
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::dto::search_dto::{FilterOptions, Seniority};
use crate::models::posting::Posting;
use crate::patterns::seniority_patterns;

lazy_static! {
    static ref SENIORITY_REGEXES: HashMap<Seniority, Regex> = Seniority::ALL
        .into_iter()
        .map(|level| (level, compile_any(seniority_patterns(level).iter().map(|p| p.to_string()))))
        .filter_map(|(level, regex)| regex.map(|r| (level, r)))
        .collect();
}

/// Dedup, then remote, then skills, then seniority. Stages only remove rows.
pub fn apply(postings: Vec<Posting>, options: &FilterOptions) -> Vec<Posting> {
    let before = postings.len();
    let rows = deduplicate(postings);
    let deduped = rows.len();
    let rows = if options.remote_only {
        filter_remote(rows)
    } else {
        rows
    };
    let rows = filter_by_skills(rows, &options.skills);
    let rows = filter_by_seniority(rows, &options.seniority);

    debug!(before, deduped, after = rows.len(), "filters applied");
    rows
}

/// Keeps the first row per `source_url`. Post-search rows are deduplicated
/// in their own partition and appended after job-board rows. Rows without
/// an identity are kept as they are.
pub fn deduplicate(postings: Vec<Posting>) -> Vec<Posting> {
    let (posts, jobs): (Vec<Posting>, Vec<Posting>) =
        postings.into_iter().partition(Posting::is_post);
    let mut rows = dedup_by_url(jobs);
    rows.extend(dedup_by_url(posts));
    rows
}

fn dedup_by_url(postings: Vec<Posting>) -> Vec<Posting> {
    let mut seen: HashSet<String> = HashSet::new();
    postings
        .into_iter()
        .filter(|posting| match posting.identity() {
            Some(url) => seen.insert(url.to_string()),
            None => true,
        })
        .collect()
}

pub fn filter_remote(postings: Vec<Posting>) -> Vec<Posting> {
    postings.into_iter().filter(|p| p.is_remote).collect()
}

/// Case-insensitive literal keyword match on title or description. An empty
/// keyword list, or one with only blank entries, disables the stage.
pub fn filter_by_skills(postings: Vec<Posting>, skills: &[String]) -> Vec<Posting> {
    let keywords = skills
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(regex::escape);
    match compile_any(keywords) {
        Some(regex) => retain_matching(postings, &regex),
        None => postings,
    }
}

pub fn filter_by_seniority(postings: Vec<Posting>, levels: &[Seniority]) -> Vec<Posting> {
    let regexes: Vec<&Regex> = levels
        .iter()
        .filter_map(|level| SENIORITY_REGEXES.get(level))
        .collect();
    if regexes.is_empty() {
        return postings;
    }
    postings
        .into_iter()
        .filter(|posting| {
            posting
                .searchable_text()
                .any(|text| regexes.iter().any(|regex| regex.is_match(text)))
        })
        .collect()
}

fn retain_matching(postings: Vec<Posting>, regex: &Regex) -> Vec<Posting> {
    postings
        .into_iter()
        .filter(|posting| posting.searchable_text().any(|text| regex.is_match(text)))
        .collect()
}

fn compile_any(fragments: impl Iterator<Item = String>) -> Option<Regex> {
    let fragments: Vec<String> = fragments.collect();
    if fragments.is_empty() {
        return None;
    }
    RegexBuilder::new(&fragments.join("|"))
        .case_insensitive(true)
        .build()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(site: &str, url: &str, title: &str) -> Posting {
        Posting {
            source_url: Some(url.to_string()),
            title: Some(title.to_string()),
            ..Posting::new(site)
        }
    }

    #[test]
    fn post_rows_follow_job_rows() {
        let rows = deduplicate(vec![
            row("post_twitter", "https://x.com/1", "a"),
            row("gupy", "https://a.example/job/1", "b"),
            row("post_twitter", "https://x.com/1", "c"),
        ]);
        let sites: Vec<&str> = rows.iter().map(|r| r.site.as_str()).collect();
        assert_eq!(sites, ["gupy", "post_twitter"]);
        assert_eq!(rows[1].title.as_deref(), Some("a"));
    }

    #[test]
    fn blank_skills_disable_the_stage() {
        let rows = vec![row("gupy", "u1", "Designer")];
        assert_eq!(filter_by_skills(rows.clone(), &[]).len(), 1);
        assert_eq!(filter_by_skills(rows, &["  ".to_string()]).len(), 1);
    }

    #[test]
    fn skill_keywords_are_literal() {
        let rows = vec![row("gupy", "u1", "Dev C++ Pleno"), row("gupy", "u2", "Dev C")];
        let kept = filter_by_skills(rows, &["c++".to_string()]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].source_url.as_deref(), Some("u1"));
    }
}
