use std::ops::Range;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::model::task::Task;

/// Which tasks the list shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl StatusFilter {
    pub const ALL: [StatusFilter; 3] = [
        StatusFilter::All,
        StatusFilter::Active,
        StatusFilter::Completed,
    ];

    pub fn matches(self, task: &Task) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => !task.completed,
            StatusFilter::Completed => task.completed,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StatusFilter::All => "All",
            StatusFilter::Active => "Active",
            StatusFilter::Completed => "Completed",
        }
    }

    pub fn parse_filter(s: &str) -> Option<Self> {
        match s {
            "all" => Some(StatusFilter::All),
            "active" => Some(StatusFilter::Active),
            "completed" | "done" => Some(StatusFilter::Completed),
            _ => None,
        }
    }

    /// Next filter in tab order, wrapping
    pub fn next(self) -> Self {
        match self {
            StatusFilter::All => StatusFilter::Active,
            StatusFilter::Active => StatusFilter::Completed,
            StatusFilter::Completed => StatusFilter::All,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            StatusFilter::All => StatusFilter::Completed,
            StatusFilter::Active => StatusFilter::All,
            StatusFilter::Completed => StatusFilter::Active,
        }
    }

    /// Placeholder shown when nothing is visible under this filter
    pub fn empty_message(self) -> &'static str {
        match self {
            StatusFilter::All => "No tasks yet. Add one to get started!",
            StatusFilter::Active => "No active tasks. Great job! 🎉",
            StatusFilter::Completed => "No completed tasks yet.",
        }
    }
}

/// The tasks to display, in collection order.
///
/// Applies the status filter, then (when `search` is non-blank) keeps tasks
/// whose text contains the trimmed search text, ignoring case.
pub fn visible<'a>(tasks: &'a [Task], filter: StatusFilter, search: &str) -> Vec<&'a Task> {
    let needle = search.trim().to_lowercase();
    tasks
        .iter()
        .filter(|t| filter.matches(t))
        .filter(|t| needle.is_empty() || t.text.to_lowercase().contains(&needle))
        .collect()
}

/// Case-insensitive literal regex for highlighting search matches.
/// `None` when the search text is blank.
pub fn search_regex(search: &str) -> Option<Regex> {
    let needle = search.trim();
    if needle.is_empty() {
        return None;
    }
    Regex::new(&format!("(?i){}", regex::escape(needle))).ok()
}

/// All non-overlapping match byte-ranges for a regex in the given text.
pub fn find_matches(re: &Regex, text: &str) -> Vec<Range<usize>> {
    re.find_iter(text).map(|m| m.start()..m.end()).collect()
}
