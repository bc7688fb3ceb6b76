// src/models/mod.rs

//! Domain models for the orchestration layer.
//!
//! This module contains all data structures used throughout the crate,
//! organized by their primary purpose.

mod config;
mod entry;
mod payload;
mod ranking;
mod record;
mod suggestion;
mod view;

// Re-export all public types
pub use config::{
    AutocompleteConfig, BackendConfig, CacheConfig, Config, ListingConfig, LoggingConfig,
    RankingConfig, StorageConfig,
};
pub use entry::{FavoriteEntry, RecentEntry};
pub use payload::{FlatResult, PagedResult, Payload, SearchResult};
pub use ranking::{RankedItem, RankingCategory, RankingSnapshot};
pub use record::{ChangeDirection, Market, News, PriceChange, Record, Stock};
pub use suggestion::{Candidate, Correction, SuggestionSet, TrendingKeyword};
pub use view::{
    Filters, NewsOrder, SortField, SortOrder, SortSpec, ViewMode, ViewState, ViewStatus,
};

#[cfg(test)]
pub(crate) use record::fixtures;

/// Login state of the current user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    token: Option<String>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self { token: None }
    }

    pub fn authenticated(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}
