//! View-state vocabulary shared by the pipeline and the controllers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn flipped(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

/// Columns a record set can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Name,
    CurrentPrice,
    ChangeRate,
    Volume,
    TradeAmount,
    MarketCap,
    ForeignRatio,
    Per,
    Roe,
    PubDate,
    Score,
}

impl SortField {
    /// Whether values compare as text rather than numbers.
    pub fn is_textual(&self) -> bool {
        matches!(self, SortField::Name)
    }
}

impl std::str::FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let field = match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "name" => SortField::Name,
            "current_price" | "price" => SortField::CurrentPrice,
            "change_rate" => SortField::ChangeRate,
            "volume" => SortField::Volume,
            "trade_amount" => SortField::TradeAmount,
            "market_cap" => SortField::MarketCap,
            "foreign_ratio" => SortField::ForeignRatio,
            "per" => SortField::Per,
            "roe" => SortField::Roe,
            "pub_date" | "date" => SortField::PubDate,
            "score" => SortField::Score,
            other => return Err(format!("unknown sort field '{other}'")),
        };
        Ok(field)
    }
}

/// Active column sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: SortField,
    pub order: SortOrder,
}

impl SortSpec {
    /// Column-header click: the same field flips direction, a new field
    /// starts ascending.
    pub fn toggle(current: Option<SortSpec>, field: SortField) -> SortSpec {
        match current {
            Some(spec) if spec.field == field => SortSpec {
                field,
                order: spec.order.flipped(),
            },
            _ => SortSpec {
                field,
                order: SortOrder::Asc,
            },
        }
    }
}

/// News ordering. `Accuracy` is only meaningful for search results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NewsOrder {
    /// Relevance score, best first
    Accuracy,
    /// Newest first
    #[default]
    Desc,
    /// Oldest first
    Asc,
}

impl NewsOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            NewsOrder::Accuracy => "accuracy",
            NewsOrder::Desc => "desc",
            NewsOrder::Asc => "asc",
        }
    }

    /// Equivalent column sort for the client-side pipeline.
    pub fn sort_spec(&self) -> SortSpec {
        match self {
            NewsOrder::Accuracy => SortSpec {
                field: SortField::Score,
                order: SortOrder::Desc,
            },
            NewsOrder::Desc => SortSpec {
                field: SortField::PubDate,
                order: SortOrder::Desc,
            },
            NewsOrder::Asc => SortSpec {
                field: SortField::PubDate,
                order: SortOrder::Asc,
            },
        }
    }
}

impl fmt::Display for NewsOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for NewsOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "accuracy" | "relevance" => Ok(NewsOrder::Accuracy),
            "desc" | "latest" => Ok(NewsOrder::Desc),
            "asc" | "oldest" => Ok(NewsOrder::Asc),
            other => Err(format!("unknown news order '{other}'")),
        }
    }
}

/// Optional numeric minimums, combined with AND.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Filters {
    pub volume_min: Option<i64>,
    pub market_cap_min: Option<i64>,
}

/// Browse mode paginates on the server, search mode on the client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewMode {
    #[default]
    Browse,
    Search,
}

/// Coarse state of the record area of a screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ViewStatus {
    /// Nothing requested yet
    #[default]
    Idle,
    /// Authoritative request in flight
    Loading,
    /// Records present
    Ready,
    /// Request succeeded with zero records
    Empty,
    /// Nothing usable could be fetched
    Error(String),
}

/// Per-screen user-controlled state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    /// Zero-based page
    pub page: usize,
    pub sort: Option<SortSpec>,
    pub filters: Filters,
    pub show_favorites_only: bool,
    pub mode: ViewMode,
    /// Highest token issued for this screen
    pub request_token: u64,
}

impl ViewState {
    /// Stamp a new authoritative request.
    pub fn issue_token(&mut self) -> u64 {
        self.request_token += 1;
        self.request_token
    }

    pub fn is_current(&self, token: u64) -> bool {
        self.request_token == token
    }

    /// Switch mode, resetting the page and any sort when the mode changes.
    /// Returns whether it changed.
    pub fn enter_mode(&mut self, mode: ViewMode) -> bool {
        if self.mode == mode {
            return false;
        }
        self.mode = mode;
        self.page = 0;
        self.sort = None;
        true
    }
}
