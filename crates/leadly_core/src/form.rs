use crate::view_model::FormView;
use crate::SearchRequest;

pub const DEFAULT_SUBREDDITS: &str = "forhire, freelance, slavelabour";
pub const DEFAULT_QUERY: &str = "I am a freelance graphic designer and a full stack web developer \
looking for potential clients who need design or/and development services.";
pub const DEFAULT_LIMIT_PER_SUBREDDIT: u32 = 10;

/// Raw inputs of the search form. Only trimming and comma-splitting is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchForm {
    pub subreddits: String,
    pub query: String,
    pub keywords: String,
    pub limit_per_subreddit: Option<u32>,
    pub(crate) submitting: bool,
}

impl Default for SearchForm {
    fn default() -> Self {
        Self {
            subreddits: DEFAULT_SUBREDDITS.to_string(),
            query: DEFAULT_QUERY.to_string(),
            keywords: String::new(),
            limit_per_subreddit: Some(DEFAULT_LIMIT_PER_SUBREDDIT),
            submitting: false,
        }
    }
}

impl SearchForm {
    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn build_request(&self) -> SearchRequest {
        let keywords = split_list(&self.keywords);
        SearchRequest {
            subreddits: split_list(&self.subreddits),
            limit_per_subreddit: self.limit_per_subreddit,
            keywords: (!keywords.is_empty()).then_some(keywords),
            user_query: self.query.clone(),
        }
    }

    pub(crate) fn view(&self) -> FormView {
        FormView {
            subreddits: self.subreddits.clone(),
            query: self.query.clone(),
            keywords: self.keywords.clone(),
            submit_enabled: !self.submitting,
            submit_label: if self.submitting {
                "Searching..."
            } else {
                "Find Leads"
            },
        }
    }
}

/// Splits a comma-separated field, trimming entries and dropping blanks.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}
