// src/services/gateway.rs

//! Uniform access to the three backend services.
//!
//! Every call goes through [`FetchGateway::fetch`], which takes an
//! [`Endpoint`] and yields a normalized [`Payload`]. [`GatewayExt`] layers
//! typed helpers on top so callers never match on payload shapes.
//!
//! The gateway performs no retries and touches no shared cache state.

use std::fmt;

use async_trait::async_trait;

use crate::error::FetchError;
use crate::models::{
    Correction, FavoriteEntry, Market, News, NewsOrder, PagedResult, Payload, RankedItem,
    RankingCategory, RecentEntry, SearchResult, Stock, TrendingKeyword,
};

/// Which backend answers a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    /// Market lists and news pages
    Listing,
    /// Rankings, favorites, recently viewed
    Ranking,
    /// Search, autocomplete, correction, trending
    Search,
}

/// What a search call looks through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchScope {
    Stocks,
    News,
}

/// News listing source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NewsFeed {
    /// Domestic categories
    #[default]
    Domestic,
    /// Foreign media, category `all` means unfiltered
    Global,
}

/// A backend call with its parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    MarketList {
        market: Market,
    },
    NewsPage {
        feed: NewsFeed,
        category: Option<String>,
        page: usize,
        size: usize,
        sort: NewsOrder,
    },
    Search {
        scope: SearchScope,
        query: String,
        category: Option<String>,
        sort: Option<NewsOrder>,
        /// Query is made of Hangul initial consonants only
        use_chosung: bool,
    },
    Autocomplete {
        query: String,
    },
    Correction {
        query: String,
    },
    Trending {
        hours: u32,
    },
    Ranking {
        category: RankingCategory,
    },
    Favorites,
    AddFavorite(FavoriteEntry),
    RemoveFavorite {
        code: String,
    },
    Recent,
    AddRecent(FavoriteEntry),
}

impl Endpoint {
    pub fn service(&self) -> Service {
        match self {
            Endpoint::MarketList { .. } | Endpoint::NewsPage { .. } => Service::Listing,
            Endpoint::Search { .. }
            | Endpoint::Autocomplete { .. }
            | Endpoint::Correction { .. }
            | Endpoint::Trending { .. } => Service::Search,
            Endpoint::Ranking { .. }
            | Endpoint::Favorites
            | Endpoint::AddFavorite(_)
            | Endpoint::RemoveFavorite { .. }
            | Endpoint::Recent
            | Endpoint::AddRecent(_) => Service::Ranking,
        }
    }

    /// Path relative to the service base URL.
    pub fn path(&self) -> String {
        match self {
            Endpoint::MarketList { market } => format!("{}/list", market.slug()),
            Endpoint::NewsPage {
                feed: NewsFeed::Domestic,
                ..
            } => "news".into(),
            Endpoint::NewsPage {
                feed: NewsFeed::Global,
                ..
            } => "news/global".into(),
            Endpoint::Search { .. } => "search".into(),
            Endpoint::Autocomplete { .. } => "autocomplete".into(),
            Endpoint::Correction { .. } => "search-correction".into(),
            Endpoint::Trending { .. } => "trending".into(),
            Endpoint::Ranking { category } => format!("ranking/{}", category.slug()),
            Endpoint::Favorites | Endpoint::AddFavorite(_) | Endpoint::RemoveFavorite { .. } => {
                "favorites".into()
            }
            Endpoint::Recent | Endpoint::AddRecent(_) => "recent".into(),
        }
    }

    /// Query string parameters.
    pub fn query(&self) -> Vec<(&'static str, String)> {
        match self {
            Endpoint::NewsPage {
                feed,
                category,
                page,
                size,
                sort,
            } => {
                let mut params = Vec::new();
                if let Some(category) = category {
                    let unfiltered = *feed == NewsFeed::Global && category == "all";
                    if !unfiltered {
                        params.push(("category", category.clone()));
                    }
                }
                params.push(("page", page.to_string()));
                params.push(("size", size.to_string()));
                params.push(("sort", sort.to_string()));
                params
            }
            Endpoint::Search {
                query,
                category,
                sort,
                use_chosung,
                ..
            } => {
                let mut params = vec![("q", query.clone())];
                if let Some(category) = category {
                    params.push(("category", category.clone()));
                }
                if let Some(sort) = sort {
                    params.push(("sort", sort.to_string()));
                }
                if *use_chosung {
                    params.push(("use_chosung", "true".into()));
                }
                params
            }
            Endpoint::Autocomplete { query } => vec![("query", query.clone())],
            Endpoint::Correction { query } => vec![("q", query.clone())],
            Endpoint::Trending { hours } => vec![("hours", hours.to_string())],
            _ => Vec::new(),
        }
    }

    /// Whether the call changes server state.
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            Endpoint::AddFavorite(_) | Endpoint::RemoveFavorite { .. } | Endpoint::AddRecent(_)
        )
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let method = match self {
            Endpoint::AddFavorite(_) | Endpoint::AddRecent(_) => "POST",
            Endpoint::RemoveFavorite { .. } => "DELETE",
            _ => "GET",
        };
        write!(f, "{method} /{}", self.path())
    }
}

/// Normalizing access to the backend services.
#[async_trait]
pub trait FetchGateway: Send + Sync {
    async fn fetch(&self, endpoint: &Endpoint) -> Result<Payload, FetchError>;
}

fn mismatch(endpoint: &Endpoint, payload: &Payload) -> FetchError {
    FetchError::unexpected_shape(endpoint, format!("got {} payload", payload.shape()))
}

/// Typed helpers over [`FetchGateway`].
#[async_trait]
pub trait GatewayExt: FetchGateway {
    async fn market_list(&self, market: Market) -> Result<Vec<Stock>, FetchError> {
        let endpoint = Endpoint::MarketList { market };
        match self.fetch(&endpoint).await? {
            Payload::Flat(flat) => Ok(flat.items.into_iter().filter_map(|r| r.into_stock()).collect()),
            other => Err(mismatch(&endpoint, &other)),
        }
    }

    async fn news_page(
        &self,
        feed: NewsFeed,
        category: Option<String>,
        page: usize,
        size: usize,
        sort: NewsOrder,
    ) -> Result<PagedResult<News>, FetchError> {
        let endpoint = Endpoint::NewsPage {
            feed,
            category,
            page,
            size,
            sort,
        };
        match self.fetch(&endpoint).await? {
            Payload::Paged(paged) => Ok(PagedResult {
                items: paged.items.into_iter().filter_map(|r| r.into_news()).collect(),
                page: paged.page,
                total_pages: paged.total_pages,
            }),
            other => Err(mismatch(&endpoint, &other)),
        }
    }

    async fn search_stocks(
        &self,
        query: &str,
        use_chosung: bool,
    ) -> Result<SearchResult<Stock>, FetchError> {
        let endpoint = Endpoint::Search {
            scope: SearchScope::Stocks,
            query: query.to_string(),
            category: None,
            sort: None,
            use_chosung,
        };
        match self.fetch(&endpoint).await? {
            Payload::Search(result) => Ok(result.map_items(|r| r.into_stock())),
            other => Err(mismatch(&endpoint, &other)),
        }
    }

    async fn search_news(
        &self,
        query: &str,
        category: Option<String>,
        sort: NewsOrder,
    ) -> Result<SearchResult<News>, FetchError> {
        let endpoint = Endpoint::Search {
            scope: SearchScope::News,
            query: query.to_string(),
            category,
            sort: Some(sort),
            use_chosung: false,
        };
        match self.fetch(&endpoint).await? {
            Payload::Search(result) => Ok(result.map_items(|r| r.into_news())),
            other => Err(mismatch(&endpoint, &other)),
        }
    }

    async fn autocomplete(&self, query: &str) -> Result<Vec<String>, FetchError> {
        let endpoint = Endpoint::Autocomplete {
            query: query.to_string(),
        };
        match self.fetch(&endpoint).await? {
            Payload::Keywords(words) => Ok(words),
            other => Err(mismatch(&endpoint, &other)),
        }
    }

    async fn correction(&self, query: &str) -> Result<Option<Correction>, FetchError> {
        let endpoint = Endpoint::Correction {
            query: query.to_string(),
        };
        match self.fetch(&endpoint).await? {
            Payload::Correction(correction) => Ok(correction),
            other => Err(mismatch(&endpoint, &other)),
        }
    }

    async fn trending(&self, hours: u32) -> Result<Vec<TrendingKeyword>, FetchError> {
        let endpoint = Endpoint::Trending { hours };
        match self.fetch(&endpoint).await? {
            Payload::Trending(keywords) => Ok(keywords),
            other => Err(mismatch(&endpoint, &other)),
        }
    }

    async fn ranking(&self, category: RankingCategory) -> Result<Vec<RankedItem>, FetchError> {
        let endpoint = Endpoint::Ranking { category };
        match self.fetch(&endpoint).await? {
            Payload::Ranking(items) => Ok(items),
            other => Err(mismatch(&endpoint, &other)),
        }
    }

    async fn favorites(&self) -> Result<Vec<FavoriteEntry>, FetchError> {
        let endpoint = Endpoint::Favorites;
        match self.fetch(&endpoint).await? {
            Payload::Favorites(entries) => Ok(entries),
            other => Err(mismatch(&endpoint, &other)),
        }
    }

    async fn add_favorite(&self, entry: FavoriteEntry) -> Result<(), FetchError> {
        self.fetch(&Endpoint::AddFavorite(entry)).await.map(|_| ())
    }

    async fn remove_favorite(&self, code: &str) -> Result<(), FetchError> {
        let endpoint = Endpoint::RemoveFavorite {
            code: code.to_string(),
        };
        self.fetch(&endpoint).await.map(|_| ())
    }

    async fn recent(&self) -> Result<Vec<RecentEntry>, FetchError> {
        let endpoint = Endpoint::Recent;
        match self.fetch(&endpoint).await? {
            Payload::Recent(entries) => Ok(entries),
            other => Err(mismatch(&endpoint, &other)),
        }
    }

    async fn add_recent(&self, entry: FavoriteEntry) -> Result<(), FetchError> {
        self.fetch(&Endpoint::AddRecent(entry)).await.map(|_| ())
    }
}

impl<G: FetchGateway + ?Sized> GatewayExt for G {}
