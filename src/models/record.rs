//! Stock and news records as delivered by the backend.
//!
//! Records are immutable snapshots. Every measurement field is nullable:
//! `None` means "unknown" and is never rendered as zero.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Domestic exchange a stock is listed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Market {
    #[serde(rename = "KOSPI", alias = "kospi", alias = "Kospi")]
    Kospi,
    #[serde(rename = "KOSDAQ", alias = "kosdaq", alias = "Kosdaq")]
    Kosdaq,
}

impl Market {
    pub const ALL: [Market; 2] = [Market::Kospi, Market::Kosdaq];

    /// Path segment of the market listing endpoint.
    pub fn slug(&self) -> &'static str {
        match self {
            Market::Kospi => "kospi",
            Market::Kosdaq => "kosdaq",
        }
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Market::Kospi => f.write_str("KOSPI"),
            Market::Kosdaq => f.write_str("KOSDAQ"),
        }
    }
}

impl std::str::FromStr for Market {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "kospi" => Ok(Market::Kospi),
            "kosdaq" => Ok(Market::Kosdaq),
            other => Err(format!("unknown market '{other}'")),
        }
    }
}

/// A listed equity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stock {
    /// Ticker code, the stable key
    pub code: String,

    pub name: String,

    #[serde(default)]
    pub current_price: Option<i64>,

    /// Display text such as "상승 1,200" or "보합"
    #[serde(default)]
    pub change: Option<String>,

    /// Display text such as "+1.25%", "▲" or "▼"
    #[serde(default)]
    pub change_rate: Option<String>,

    #[serde(default)]
    pub volume: Option<i64>,

    #[serde(default)]
    pub market_cap: Option<i64>,

    #[serde(default)]
    pub foreign_ratio: Option<f64>,

    #[serde(default)]
    pub per: Option<f64>,

    #[serde(default)]
    pub roe: Option<f64>,

    #[serde(default)]
    pub crawled_at: Option<String>,

    #[serde(default)]
    pub market: Option<Market>,
}

impl Stock {
    /// Trading value in units of 100 million won, unknowns counted as zero.
    pub fn trade_amount(&self) -> i64 {
        let price = self.current_price.unwrap_or(0) as f64;
        let volume = self.volume.unwrap_or(0) as f64;
        (price * volume / 1e8).round() as i64
    }

    /// Numeric percent of `change_rate`, if it carries one.
    pub fn change_rate_percent(&self) -> Option<f64> {
        self.change_rate
            .as_deref()
            .and_then(|s| s.trim().trim_end_matches('%').trim().parse::<f64>().ok())
    }

    /// Structured form of the `change` display text.
    pub fn price_change(&self) -> Option<PriceChange> {
        self.change.as_deref().and_then(PriceChange::parse)
    }
}

/// Direction word carried by a price change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeDirection {
    Up,
    UpLimit,
    Down,
    DownLimit,
    Flat,
}

/// Parsed price change: direction plus absolute amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceChange {
    pub direction: ChangeDirection,
    pub amount: i64,
}

impl PriceChange {
    /// Parse texts like "상승 1,200", "하한가500" or "보합".
    pub fn parse(text: &str) -> Option<Self> {
        static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();

        let text = text.trim();
        if text.starts_with("보합") {
            return Some(Self {
                direction: ChangeDirection::Flat,
                amount: 0,
            });
        }

        let pattern = PATTERN
            .get_or_init(|| Regex::new(r"^([가-힣]+)\s*([\d,]+)?$").ok())
            .as_ref()?;
        let caps = pattern.captures(text)?;
        let direction = match caps.get(1)?.as_str() {
            "상승" => ChangeDirection::Up,
            "상한가" => ChangeDirection::UpLimit,
            "하락" => ChangeDirection::Down,
            "하한가" => ChangeDirection::DownLimit,
            _ => return None,
        };
        let amount = caps
            .get(2)
            .and_then(|m| m.as_str().replace(',', "").parse().ok())
            .unwrap_or(0);

        Some(Self { direction, amount })
    }
}

/// A news article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct News {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub link: Option<String>,

    #[serde(default)]
    pub content: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub media: Option<String>,

    #[serde(default)]
    pub author: Option<String>,

    #[serde(default)]
    pub image_url: Option<String>,

    #[serde(rename = "pubDate", default)]
    pub pub_date: Option<String>,

    /// Search relevance in [0, 1]
    #[serde(default)]
    pub score: Option<f64>,

    #[serde(default)]
    pub category: Option<String>,
}

impl News {
    /// Stable key: `_id`, then `link`, then the title.
    pub fn key(&self) -> &str {
        self.id
            .as_deref()
            .or(self.link.as_deref())
            .unwrap_or(&self.title)
    }

    /// Publish time, if `pub_date` is in a recognised format.
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.pub_date.as_deref()?.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
            return Some(dt.and_utc());
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc())
    }
}

/// Either kind of record, as carried by normalized gateway payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Record {
    Stock(Stock),
    News(News),
}

impl Record {
    pub fn key(&self) -> &str {
        match self {
            Record::Stock(s) => &s.code,
            Record::News(n) => n.key(),
        }
    }

    pub fn into_stock(self) -> Option<Stock> {
        match self {
            Record::Stock(s) => Some(s),
            Record::News(_) => None,
        }
    }

    pub fn into_news(self) -> Option<News> {
        match self {
            Record::News(n) => Some(n),
            Record::Stock(_) => None,
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn stock(code: &str, name: &str) -> Stock {
        Stock {
            code: code.to_string(),
            name: name.to_string(),
            current_price: None,
            change: None,
            change_rate: None,
            volume: None,
            market_cap: None,
            foreign_ratio: None,
            per: None,
            roe: None,
            crawled_at: None,
            market: Some(Market::Kospi),
        }
    }

    pub fn news(id: &str, title: &str) -> News {
        News {
            id: Some(id.to_string()),
            title: title.to_string(),
            link: Some(format!("https://news.example.com/{id}")),
            content: None,
            description: None,
            media: None,
            author: None,
            image_url: None,
            pub_date: None,
            score: None,
            category: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::{news, stock};
    use super::*;

    #[test]
    fn test_stock_deserializes_with_missing_measurements() {
        let s: Stock = serde_json::from_str(
            r#"{"code":"005930","name":"삼성전자","volume":1200,"market":"kospi"}"#,
        )
        .unwrap();
        assert_eq!(s.volume, Some(1200));
        assert_eq!(s.current_price, None);
        assert_eq!(s.market, Some(Market::Kospi));
    }

    #[test]
    fn test_trade_amount_treats_unknown_as_zero() {
        let mut s = stock("005930", "삼성전자");
        assert_eq!(s.trade_amount(), 0);

        s.current_price = Some(70_000);
        s.volume = Some(10_000);
        assert_eq!(s.trade_amount(), 7);
    }

    #[test]
    fn test_change_rate_percent() {
        let mut s = stock("1", "a");
        s.change_rate = Some("+1.25%".into());
        assert_eq!(s.change_rate_percent(), Some(1.25));
        s.change_rate = Some("-3%".into());
        assert_eq!(s.change_rate_percent(), Some(-3.0));
        s.change_rate = Some("▲".into());
        assert_eq!(s.change_rate_percent(), None);
    }

    #[test]
    fn test_price_change_parse() {
        assert_eq!(
            PriceChange::parse("상승 1,200"),
            Some(PriceChange {
                direction: ChangeDirection::Up,
                amount: 1200
            })
        );
        assert_eq!(
            PriceChange::parse("하한가500").map(|c| c.direction),
            Some(ChangeDirection::DownLimit)
        );
        assert_eq!(
            PriceChange::parse("보합0").map(|c| c.direction),
            Some(ChangeDirection::Flat)
        );
        assert_eq!(PriceChange::parse("unknown"), None);
    }

    #[test]
    fn test_news_key_fallbacks() {
        let mut n = news("abc", "Title");
        assert_eq!(n.key(), "abc");
        n.id = None;
        assert_eq!(n.key(), "https://news.example.com/abc");
        n.link = None;
        assert_eq!(n.key(), "Title");
    }

    #[test]
    fn test_news_published_at_formats() {
        let mut n = news("1", "t");
        n.pub_date = Some("2025-03-01T09:00:00+09:00".into());
        assert_eq!(
            n.published_at().map(|d| d.to_rfc3339()),
            Some("2025-03-01T00:00:00+00:00".into())
        );
        n.pub_date = Some("2025-03-01".into());
        assert!(n.published_at().is_some());
        n.pub_date = Some("yesterday".into());
        assert!(n.published_at().is_none());
    }
}
