// src/controller/news.rs

//! News listing screen.
//!
//! Browse mode pages through the feed on the server. Search mode fetches
//! the whole result set once, orders it client-side and pages it locally.

use std::sync::{Arc, Mutex};

use crate::controller::Applied;
use crate::error::{AppError, Result};
use crate::models::{
    AutocompleteConfig, CacheConfig, Candidate, ListingConfig, News, NewsOrder, RecentEntry,
    SuggestionSet, ViewMode, ViewState, ViewStatus,
};
use crate::pipeline::sort_filter::{self, ViewQuery};
use crate::services::{AutocompleteEngine, FetchGateway, GatewayExt, NewsFeed};
use crate::storage::{CacheKey, CacheLookup, PersistenceStore, SearchCache};
use crate::utils::lock;

/// Category value meaning "no category filter".
pub const ALL_CATEGORIES: &str = "all";

/// Snapshot of the news screen for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct NewsView {
    pub feed: NewsFeed,
    pub category: String,
    pub order: NewsOrder,
    pub mode: ViewMode,
    pub query: Option<String>,
    pub suggestions: Option<SuggestionSet>,
    pub status: ViewStatus,
    pub page: usize,
    pub total_pages: usize,
    /// Records on the client; in browse mode only the current page
    pub total_count: usize,
    pub visible: Vec<News>,
    pub request_token: u64,
}

struct NewsScreen {
    view: ViewState,
    category: String,
    order: NewsOrder,
    page_items: Vec<News>,
    total_pages: usize,
    results: Vec<News>,
    query: Option<String>,
    suggestions: Option<SuggestionSet>,
    status: ViewStatus,
    cache: SearchCache<News>,
}

impl NewsScreen {
    fn apply_results(&mut self, results: Vec<News>) {
        self.status = if results.is_empty() {
            ViewStatus::Empty
        } else {
            ViewStatus::Ready
        };
        self.results = results;
    }
}

/// Orchestrator for the news listing screen.
pub struct NewsListController {
    gateway: Arc<dyn FetchGateway>,
    store: PersistenceStore,
    engine: AutocompleteEngine,
    feed: NewsFeed,
    page_size: usize,
    state: Mutex<NewsScreen>,
}

impl NewsListController {
    /// Build the controller and start its suggestion engine on the
    /// current runtime.
    pub fn new(
        gateway: Arc<dyn FetchGateway>,
        store: PersistenceStore,
        feed: NewsFeed,
        listing: &ListingConfig,
        cache: &CacheConfig,
        autocomplete: AutocompleteConfig,
    ) -> Self {
        let (page_size, category) = match feed {
            NewsFeed::Domestic => (
                listing.news_page_size,
                listing.default_news_category.clone(),
            ),
            NewsFeed::Global => (listing.global_news_page_size, ALL_CATEGORIES.to_string()),
        };

        Self {
            engine: AutocompleteEngine::spawn(Arc::clone(&gateway), autocomplete),
            gateway,
            store,
            feed,
            page_size,
            state: Mutex::new(NewsScreen {
                view: ViewState::default(),
                category,
                order: NewsOrder::Desc,
                page_items: Vec::new(),
                total_pages: 0,
                results: Vec::new(),
                query: None,
                suggestions: None,
                status: ViewStatus::Idle,
                cache: SearchCache::new(cache.ttl()),
            }),
        }
    }

    /// Fetch the current browse page from the server.
    pub async fn browse(&self) -> Result<Applied> {
        let page = lock(&self.state).view.page;
        self.fetch_page(page).await
    }

    /// Fetch `page` of the feed. The page number moves only once the
    /// server has answered for it.
    async fn fetch_page(&self, page: usize) -> Result<Applied> {
        let (token, category, order) = {
            let mut screen = lock(&self.state);
            screen.status = ViewStatus::Loading;
            (
                screen.view.issue_token(),
                screen.category.clone(),
                screen.order,
            )
        };

        let outcome = self
            .gateway
            .news_page(self.feed, Some(category), page, self.page_size, order)
            .await;

        let mut screen = lock(&self.state);
        if !screen.view.is_current(token) {
            log::debug!("Discarding stale news page {page} (token {token})");
            return Ok(Applied::Stale);
        }
        match outcome {
            Ok(paged) => {
                log::info!(
                    "News page {}/{}: {} articles",
                    paged.page + 1,
                    paged.total_pages,
                    paged.items.len()
                );
                screen.status = if paged.items.is_empty() {
                    ViewStatus::Empty
                } else {
                    ViewStatus::Ready
                };
                screen.view.page = paged.page;
                screen.total_pages = paged.total_pages;
                screen.page_items = paged.items;
                Ok(Applied::Applied)
            }
            Err(e) => {
                // The previous page stays on screen.
                screen.status = ViewStatus::Error(e.to_string());
                Err(e.into())
            }
        }
    }

    /// Move to `page`: a server fetch in browse mode, a local slice in
    /// search mode. Out-of-range pages are ignored.
    pub async fn go_to_page(&self, page: usize) -> Result<Applied> {
        {
            let mut screen = lock(&self.state);
            match screen.view.mode {
                ViewMode::Browse => {
                    if screen.total_pages > 0
                        && !sort_filter::page_in_range(page, screen.total_pages)
                    {
                        return Ok(Applied::Ignored);
                    }
                }
                ViewMode::Search => {
                    let total = sort_filter::total_pages(screen.results.len(), self.page_size);
                    if !sort_filter::page_in_range(page, total) {
                        return Ok(Applied::Ignored);
                    }
                    screen.view.page = page;
                    return Ok(Applied::Applied);
                }
            }
        }
        self.fetch_page(page).await
    }

    /// Search news in the current category. Entering search mode selects
    /// relevance order.
    pub async fn search(&self, query: &str) -> Result<Applied> {
        let query = query.trim();
        if query.is_empty() {
            return self.leave_search().await;
        }

        let (token, category, order) = {
            let mut screen = lock(&self.state);
            if screen.view.enter_mode(ViewMode::Search) {
                screen.order = NewsOrder::Accuracy;
            }
            screen.view.page = 0;
            screen.query = Some(query.to_string());
            screen.suggestions = None;
            let token = screen.view.issue_token();

            let key = CacheKey::new(query, screen.category.as_str(), screen.order.as_str());
            if let CacheLookup::Hit(articles) = screen.cache.get(&key) {
                screen.apply_results(articles);
                return Ok(Applied::Applied);
            }
            screen.status = ViewStatus::Loading;
            (token, screen.category.clone(), screen.order)
        };

        let filter = (category != ALL_CATEGORIES).then(|| category.clone());
        let outcome = self.gateway.search_news(query, filter, order).await;

        let mut screen = lock(&self.state);
        if !screen.view.is_current(token) {
            log::debug!("Discarding stale news search '{query}' (token {token})");
            return Ok(Applied::Stale);
        }
        match outcome {
            Ok(result) => {
                let mut articles = result.items;
                sort_filter::sort_records(&mut articles, order.sort_spec());
                log::info!("News search '{query}' in {category}: {} hits", articles.len());

                screen.cache.put(
                    CacheKey::new(query, category.as_str(), order.as_str()),
                    articles.clone(),
                );
                screen.suggestions = result.suggestions;
                screen.apply_results(articles);
                Ok(Applied::Applied)
            }
            Err(e) => {
                screen.status = ViewStatus::Error(e.to_string());
                Err(e.into())
            }
        }
    }

    /// Back to the feed, newest first, from the first page.
    pub async fn leave_search(&self) -> Result<Applied> {
        {
            let mut screen = lock(&self.state);
            screen.view.enter_mode(ViewMode::Browse);
            screen.view.page = 0;
            screen.order = NewsOrder::Desc;
            screen.query = None;
            screen.results.clear();
            screen.suggestions = None;
        }
        self.browse().await
    }

    /// Switch category and refetch whatever the current mode shows.
    pub async fn set_category(&self, category: &str) -> Result<Applied> {
        let query = {
            let mut screen = lock(&self.state);
            screen.category = category.to_string();
            screen.view.page = 0;
            screen.query.clone()
        };
        match query {
            Some(query) => self.search(&query).await,
            None => self.browse().await,
        }
    }

    /// Change the article order. Relevance only exists for search results.
    pub async fn set_order(&self, order: NewsOrder) -> Result<Applied> {
        let query = {
            let mut screen = lock(&self.state);
            if order == NewsOrder::Accuracy && screen.view.mode == ViewMode::Browse {
                return Err(AppError::validation(
                    "relevance order is only available for search results",
                ));
            }
            screen.order = order;
            screen.view.page = 0;
            screen.query.clone()
        };
        match query {
            Some(query) => self.search(&query).await,
            None => self.browse().await,
        }
    }

    /// Forward a keystroke to the suggestion engine.
    pub fn on_input(&self, text: &str) {
        self.engine.on_input(text);
    }

    pub fn suggestions(&self) -> SuggestionSet {
        self.engine.current()
    }

    pub async fn select_suggestion(&self, candidate: &Candidate) -> Result<Applied> {
        let query = self.engine.select(candidate);
        self.search(&query).await
    }

    /// Enter pressed in the search box.
    pub async fn submit(&self, text: &str) -> Result<Applied> {
        let query = self.engine.commit(text);
        self.search(&query).await
    }

    /// Remember an opened article in the local recents.
    pub async fn open_article(&self, article: &News) -> Vec<RecentEntry> {
        self.store.upsert_recent(RecentEntry::from(article)).await
    }

    pub fn recent(&self) -> Vec<RecentEntry> {
        self.store.list_recent()
    }

    pub fn view(&self) -> NewsView {
        let screen = lock(&self.state);
        let (visible, page, total_pages, total_count) = match screen.view.mode {
            ViewMode::Browse => (
                screen.page_items.clone(),
                screen.view.page,
                screen.total_pages,
                screen.page_items.len(),
            ),
            ViewMode::Search => {
                let page = sort_filter::apply(
                    &screen.results,
                    &ViewQuery {
                        filters: screen.view.filters,
                        favorites_only: None,
                        sort: None,
                        page: screen.view.page,
                        page_size: self.page_size,
                    },
                );
                (page.visible, page.page, page.total_pages, page.total_count)
            }
        };

        NewsView {
            feed: self.feed,
            category: screen.category.clone(),
            order: screen.order,
            mode: screen.view.mode,
            query: screen.query.clone(),
            suggestions: screen.suggestions.clone(),
            status: screen.status.clone(),
            page,
            total_pages,
            total_count,
            visible,
            request_token: screen.view.request_token,
        }
    }

    /// Stop the background suggestion tasks.
    pub fn shutdown(&self) {
        self.engine.shutdown();
    }
}
