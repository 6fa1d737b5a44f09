use serde::{Deserialize, Serialize};
use validator::Validate;

/// Site value meaning "every site".
pub const ALL_SITES: &str = "all";

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct HistoryQuery {
    #[validate(range(min = 1, max = 10000))]
    pub limit: i64,
    /// Case-insensitive substring of title, company or search term.
    pub text: Option<String>,
    pub site: Option<String>,
}

impl Default for HistoryQuery {
    fn default() -> Self {
        Self {
            limit: 500,
            text: None,
            site: None,
        }
    }
}

impl HistoryQuery {
    pub fn text_filter(&self) -> Option<&str> {
        self.text.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }

    pub fn site_filter(&self) -> Option<&str> {
        self.site
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case(ALL_SITES))
    }
}
