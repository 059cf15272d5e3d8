//! Posts table projection
//!
//! Filtering, searching and sorting run in that fixed order and never touch
//! their input; every stage returns a new sequence.

mod view;

pub use view::PostsView;

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use sa_core::{FilterState, ModelError, PlatformFilter, Post};
use serde::{Deserialize, Serialize};

/// Column a posts table can be sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Platform,
    Content,
    Engagement,
    Status,
    Date,
}

impl SortKey {
    pub const ALL: [SortKey; 5] = [
        SortKey::Platform,
        SortKey::Content,
        SortKey::Engagement,
        SortKey::Status,
        SortKey::Date,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Platform => "platform",
            SortKey::Content => "content",
            SortKey::Engagement => "engagement",
            SortKey::Status => "status",
            SortKey::Date => "date",
        }
    }

    /// Compare two posts by this key, ascending
    fn compare(&self, a: &Post, b: &Post) -> Ordering {
        match self {
            SortKey::Platform => a.platform.label().cmp(b.platform.label()),
            SortKey::Content => a.content.cmp(&b.content),
            SortKey::Engagement => a.engagement.cmp(&b.engagement),
            SortKey::Status => a.status.as_str().cmp(b.status.as_str()),
            SortKey::Date => a.date.cmp(&b.date),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortKey::ALL
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ModelError::UnknownSortKey(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortConfig {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortConfig {
    pub fn new(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }

    /// Column header click: the same key ascending becomes descending,
    /// anything else sorts ascending by `key`
    pub fn toggle(&mut self, key: SortKey) {
        *self = if self.key == key && self.direction == SortDirection::Asc {
            Self::new(key, SortDirection::Desc)
        } else {
            Self::new(key, SortDirection::Asc)
        };
    }

    fn compare(&self, a: &Post, b: &Post) -> Ordering {
        let ordering = self.key.compare(a, b);
        match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

impl Default for SortConfig {
    fn default() -> Self {
        Self::new(SortKey::Date, SortDirection::Desc)
    }
}

/// Everything the posts table is derived from, apart from the posts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostQuery {
    pub platform: PlatformFilter,
    pub search: String,
    pub sort: SortConfig,
}

impl PostQuery {
    pub fn new(filters: &FilterState, search: impl Into<String>, sort: SortConfig) -> Self {
        Self {
            platform: filters.platform,
            search: search.into(),
            sort,
        }
    }
}

/// Result of projecting the posts table
#[derive(Debug, Clone, PartialEq)]
pub enum PostsProjection {
    /// Nothing has been fetched yet
    NotLoaded,
    /// Posts exist but every one was filtered out
    NoResults { total: usize },
    Rows(Vec<Post>),
}

impl PostsProjection {
    pub fn rows(&self) -> &[Post] {
        match self {
            PostsProjection::Rows(rows) => rows,
            _ => &[],
        }
    }

    pub fn is_loaded(&self) -> bool {
        !matches!(self, PostsProjection::NotLoaded)
    }
}

/// Keep the posts of the selected platform
pub fn filter_platform(posts: &[Post], filter: PlatformFilter) -> Vec<Post> {
    posts
        .iter()
        .filter(|post| filter.matches(post.platform))
        .cloned()
        .collect()
}

/// Keep posts whose content or platform contains `term`, ignoring case
pub fn filter_search(posts: &[Post], term: &str) -> Vec<Post> {
    if term.is_empty() {
        return posts.to_vec();
    }

    let term = term.to_lowercase();
    posts
        .iter()
        .filter(|post| {
            post.content.to_lowercase().contains(&term) || post.platform.as_str().contains(&term)
        })
        .cloned()
        .collect()
}

/// Stable sort into a new sequence
pub fn sort_posts(posts: &[Post], sort: SortConfig) -> Vec<Post> {
    let mut sorted = posts.to_vec();
    sorted.sort_by(|a, b| sort.compare(a, b));
    sorted
}

/// Run the whole pipeline. `posts` is `None` until data has been fetched.
pub fn project_posts(posts: Option<&[Post]>, query: &PostQuery) -> PostsProjection {
    let Some(posts) = posts else {
        return PostsProjection::NotLoaded;
    };

    let filtered = filter_platform(posts, query.platform);
    let searched = filter_search(&filtered, &query.search);
    if searched.is_empty() {
        return PostsProjection::NoResults { total: posts.len() };
    }

    PostsProjection::Rows(sort_posts(&searched, query.sort))
}
