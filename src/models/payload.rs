//! Normalized shapes every backend response is folded into.

use crate::models::{
    Correction, FavoriteEntry, RankedItem, Record, RecentEntry, SuggestionSet, TrendingKeyword,
};

/// Server-paginated page.
#[derive(Debug, Clone, PartialEq)]
pub struct PagedResult<T> {
    pub items: Vec<T>,
    /// Zero-based page number reported by the server
    pub page: usize,
    pub total_pages: usize,
}

/// Unpaginated list.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatResult<T> {
    pub items: Vec<T>,
}

/// Search hits plus any suggestion metadata embedded in the response.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult<T, S = SuggestionSet> {
    pub items: Vec<T>,
    pub suggestions: Option<S>,
}

impl<T, S> SearchResult<T, S> {
    pub fn map_items<U>(self, f: impl FnMut(T) -> Option<U>) -> SearchResult<U, S> {
        SearchResult {
            items: self.items.into_iter().filter_map(f).collect(),
            suggestions: self.suggestions,
        }
    }
}

/// Uniform gateway output.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Paged(PagedResult<Record>),
    Flat(FlatResult<Record>),
    Search(SearchResult<Record>),
    Keywords(Vec<String>),
    Correction(Option<Correction>),
    Trending(Vec<TrendingKeyword>),
    Ranking(Vec<RankedItem>),
    Favorites(Vec<FavoriteEntry>),
    Recent(Vec<RecentEntry>),
    /// Write acknowledged
    Ack,
}

impl Payload {
    /// Short name of the variant, for error messages.
    pub fn shape(&self) -> &'static str {
        match self {
            Payload::Paged(_) => "paged",
            Payload::Flat(_) => "flat",
            Payload::Search(_) => "search",
            Payload::Keywords(_) => "keywords",
            Payload::Correction(_) => "correction",
            Payload::Trending(_) => "trending",
            Payload::Ranking(_) => "ranking",
            Payload::Favorites(_) => "favorites",
            Payload::Recent(_) => "recent",
            Payload::Ack => "ack",
        }
    }
}
