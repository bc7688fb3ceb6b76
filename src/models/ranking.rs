//! Ranking sidebar data.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A Top-N ranking the sidebar rotates through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankingCategory {
    /// Trading value
    Trade,
    Volume,
    /// Change rate
    Change,
    /// Market capitalisation
    Market,
    /// Blended score
    Mixed,
}

impl RankingCategory {
    pub const ALL: [RankingCategory; 5] = [
        RankingCategory::Trade,
        RankingCategory::Volume,
        RankingCategory::Change,
        RankingCategory::Market,
        RankingCategory::Mixed,
    ];

    /// Path segment under `/ranking/`.
    pub fn slug(&self) -> &'static str {
        match self {
            RankingCategory::Trade => "trade",
            RankingCategory::Volume => "volume",
            RankingCategory::Change => "change",
            RankingCategory::Market => "market",
            RankingCategory::Mixed => "mixed",
        }
    }
}

impl fmt::Display for RankingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl std::str::FromStr for RankingCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.slug() == s.to_ascii_lowercase())
            .ok_or_else(|| format!("unknown ranking category '{s}'"))
    }
}

/// One row of a ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedItem {
    pub rank: u32,
    pub code: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub current_price: Option<i64>,
    #[serde(default)]
    pub volume: Option<i64>,
    #[serde(default)]
    pub change_rate: Option<String>,
    #[serde(default)]
    pub market_cap: Option<i64>,
    #[serde(default)]
    pub score: Option<i64>,
    #[serde(default)]
    pub mixed_score: Option<i64>,
}

/// Last good Top-N for a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingSnapshot {
    pub category: RankingCategory,
    pub items: Vec<RankedItem>,
    pub as_of: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_round_trips_through_slug() {
        for c in RankingCategory::ALL {
            assert_eq!(c.slug().parse::<RankingCategory>(), Ok(c));
        }
        assert!("bogus".parse::<RankingCategory>().is_err());
    }

    #[test]
    fn test_ranked_item_camel_case() {
        let item: RankedItem = serde_json::from_str(
            r#"{"rank":1,"code":"005930","name":"삼성전자","currentPrice":70000,"mixedScore":12,"score":null}"#,
        )
        .unwrap();
        assert_eq!(item.current_price, Some(70000));
        assert_eq!(item.mixed_score, Some(12));
        assert_eq!(item.score, None);
    }
}
