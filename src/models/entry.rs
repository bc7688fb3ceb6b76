//! Favorites and recently-viewed entries.

use serde::{Deserialize, Serialize};

use crate::models::{News, Record, Stock};

/// A bookmarked entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FavoriteEntry {
    pub code: String,
    #[serde(default)]
    pub name: String,
}

impl From<&Stock> for FavoriteEntry {
    fn from(stock: &Stock) -> Self {
        Self {
            code: stock.code.clone(),
            name: stock.name.clone(),
        }
    }
}

/// A recently viewed entity with enough payload to redisplay it offline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentEntry {
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Record>,
}

impl RecentEntry {
    pub fn key(&self) -> &str {
        &self.code
    }
}

impl From<&Stock> for RecentEntry {
    fn from(stock: &Stock) -> Self {
        Self {
            code: stock.code.clone(),
            name: stock.name.clone(),
            payload: Some(Record::Stock(stock.clone())),
        }
    }
}

impl From<&News> for RecentEntry {
    fn from(news: &News) -> Self {
        Self {
            code: news.key().to_string(),
            name: news.title.clone(),
            payload: Some(Record::News(news.clone())),
        }
    }
}
