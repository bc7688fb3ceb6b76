// src/controller/stocks.rs

//! Equity listing screen.
//!
//! Browse mode shows the full KOSPI/KOSDAQ lists, search mode shows the
//! results of the last query. Both are paginated client-side through the
//! sort/filter pipeline, one market tab at a time.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use futures::future::join_all;

use crate::controller::Applied;
use crate::error::{AppError, Result};
use crate::models::{
    CacheConfig, Candidate, FavoriteEntry, Filters, ListingConfig, Market, RecentEntry, Session,
    SortField, SortSpec, Stock, SuggestionSet, ViewMode, ViewState, ViewStatus,
};
use crate::pipeline::sort_filter::{self, ViewQuery};
use crate::services::{FetchGateway, GatewayExt};
use crate::storage::{CacheKey, CacheLookup, PersistenceStore, SearchCache};
use crate::utils::{is_chosung_query, lock};

/// Snapshot of the stock screen for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct StockView {
    pub tab: Market,
    pub mode: ViewMode,
    pub query: Option<String>,
    /// Did-you-mean metadata attached to the last search
    pub suggestions: Option<SuggestionSet>,
    pub status: ViewStatus,
    pub sort: Option<SortSpec>,
    pub filters: Filters,
    pub show_favorites_only: bool,
    pub page: usize,
    pub total_pages: usize,
    pub total_count: usize,
    pub visible: Vec<Stock>,
    pub request_token: u64,
}

struct StockScreen {
    view: ViewState,
    tab: Market,
    listings: HashMap<Market, Vec<Stock>>,
    /// Listings have their own slot, so they are stamped apart from searches
    listings_token: u64,
    listings_loading: bool,
    results: Vec<Stock>,
    query: Option<String>,
    suggestions: Option<SuggestionSet>,
    status: ViewStatus,
    cache: SearchCache<Stock>,
}

impl StockScreen {
    fn records(&self) -> Vec<&Stock> {
        match self.view.mode {
            ViewMode::Browse => self
                .listings
                .get(&self.tab)
                .map(|stocks| stocks.iter().collect())
                .unwrap_or_default(),
            ViewMode::Search => self
                .results
                .iter()
                .filter(|s| s.market.is_none_or(|m| m == self.tab))
                .collect(),
        }
    }

    fn has_records(&self) -> bool {
        match self.view.mode {
            ViewMode::Browse => self.listings.values().any(|l| !l.is_empty()),
            ViewMode::Search => !self.results.is_empty(),
        }
    }

    fn settle(&mut self) {
        self.status = if self.view.mode == ViewMode::Browse && self.listings_loading {
            ViewStatus::Loading
        } else if self.has_records() {
            ViewStatus::Ready
        } else {
            ViewStatus::Empty
        };
    }

    fn apply_results(&mut self, results: Vec<Stock>) {
        let has = |market| results.iter().any(|s| s.market == Some(market));
        if has(Market::Kospi) {
            self.tab = Market::Kospi;
        } else if has(Market::Kosdaq) {
            self.tab = Market::Kosdaq;
        }
        self.results = results;
        self.settle();
    }
}

/// Orchestrator for the equity listing screen.
pub struct StockListController {
    gateway: Arc<dyn FetchGateway>,
    session: Session,
    store: PersistenceStore,
    page_size: usize,
    state: Mutex<StockScreen>,
}

impl StockListController {
    pub fn new(
        gateway: Arc<dyn FetchGateway>,
        session: Session,
        store: PersistenceStore,
        listing: &ListingConfig,
        cache: &CacheConfig,
    ) -> Self {
        Self {
            gateway,
            session,
            store,
            page_size: listing.stock_page_size,
            state: Mutex::new(StockScreen {
                view: ViewState::default(),
                tab: Market::Kospi,
                listings: HashMap::new(),
                listings_token: 0,
                listings_loading: false,
                results: Vec::new(),
                query: None,
                suggestions: None,
                status: ViewStatus::Idle,
                cache: SearchCache::new(cache.ttl()),
            }),
        }
    }

    /// Fetch both market lists concurrently. One failing market keeps its
    /// previous list and the other is shown; both failing is an error.
    pub async fn load_listings(&self) -> Result<Applied> {
        let token = {
            let mut screen = lock(&self.state);
            screen.listings_token += 1;
            screen.listings_loading = true;
            if screen.view.mode == ViewMode::Browse {
                screen.status = ViewStatus::Loading;
            }
            screen.listings_token
        };

        let outcomes = join_all(Market::ALL.map(|market| async move {
            (market, self.gateway.market_list(market).await)
        }))
        .await;

        let mut screen = lock(&self.state);
        if screen.listings_token != token {
            log::debug!("Discarding stale market listings (token {token})");
            return Ok(Applied::Stale);
        }
        screen.listings_loading = false;
        let browsing = screen.view.mode == ViewMode::Browse;

        let mut last_error = None;
        let mut failures = 0;
        for (market, outcome) in outcomes {
            match outcome {
                Ok(stocks) => {
                    log::info!("Loaded {} {market} stocks", stocks.len());
                    screen.listings.insert(market, stocks);
                }
                Err(e) => {
                    log::warn!("{market} listing failed: {e}");
                    failures += 1;
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if failures == Market::ALL.len() => {
                if browsing {
                    screen.status = ViewStatus::Error(e.to_string());
                }
                Err(e.into())
            }
            _ => {
                if browsing {
                    screen.settle();
                }
                Ok(Applied::Applied)
            }
        }
    }

    /// Search stocks. Results are cached by query; the tab follows the
    /// first market that has hits.
    pub async fn search(&self, query: &str) -> Result<Applied> {
        let query = query.trim();
        if query.is_empty() {
            self.cancel_search();
            return Ok(Applied::Applied);
        }
        let key = CacheKey::new(query, "stocks", "relevance");

        let token = {
            let mut screen = lock(&self.state);
            screen.view.enter_mode(ViewMode::Search);
            screen.view.page = 0;
            if screen.query.as_deref() != Some(query) {
                // Hits of the previous query never show under the new one
                screen.results.clear();
            }
            screen.query = Some(query.to_string());
            screen.suggestions = None;
            let token = screen.view.issue_token();

            if let CacheLookup::Hit(stocks) = screen.cache.get(&key) {
                screen.apply_results(stocks);
                return Ok(Applied::Applied);
            }
            screen.status = ViewStatus::Loading;
            token
        };

        let outcome = self
            .gateway
            .search_stocks(query, is_chosung_query(query))
            .await;

        let mut screen = lock(&self.state);
        if !screen.view.is_current(token) {
            log::debug!("Discarding stale stock search '{query}' (token {token})");
            return Ok(Applied::Stale);
        }
        match outcome {
            Ok(result) => {
                log::info!("Stock search '{query}': {} hits", result.items.len());
                screen.cache.put(key, result.items.clone());
                screen.suggestions = result.suggestions;
                screen.apply_results(result.items);
                Ok(Applied::Applied)
            }
            Err(e) => {
                screen.status = ViewStatus::Error(e.to_string());
                Err(e.into())
            }
        }
    }

    /// Re-run the search for a did-you-mean candidate.
    pub async fn select_suggestion(&self, candidate: &Candidate) -> Result<Applied> {
        self.search(candidate.query()).await
    }

    /// Back to browse mode. Any in-flight search is invalidated; listings
    /// still loading land when they arrive.
    pub fn cancel_search(&self) {
        let mut screen = lock(&self.state);
        if screen.view.mode == ViewMode::Search {
            screen.view.issue_token();
        }
        screen.view.enter_mode(ViewMode::Browse);
        screen.query = None;
        screen.results.clear();
        screen.suggestions = None;
        screen.settle();
    }

    pub fn set_tab(&self, market: Market) {
        let mut screen = lock(&self.state);
        if screen.tab != market {
            screen.tab = market;
            screen.view.page = 0;
        }
    }

    /// Move to `page`. Out-of-range pages are ignored.
    pub fn set_page(&self, page: usize) -> Applied {
        let total_pages = self.view().total_pages;
        if !sort_filter::page_in_range(page, total_pages) {
            log::debug!("Ignoring page {page} of {total_pages}");
            return Applied::Ignored;
        }
        lock(&self.state).view.page = page;
        Applied::Applied
    }

    /// Column click: the active field flips order, a new one starts ascending.
    pub fn toggle_sort(&self, field: SortField) -> SortSpec {
        let mut screen = lock(&self.state);
        let spec = SortSpec::toggle(screen.view.sort, field);
        screen.view.sort = Some(spec);
        screen.view.page = 0;
        spec
    }

    pub fn set_filters(&self, filters: Filters) {
        let mut screen = lock(&self.state);
        screen.view.filters = filters;
        screen.view.page = 0;
    }

    /// Flip the favorites-only filter. Needs a logged-in session.
    pub fn toggle_favorites_only(&self) -> Result<bool> {
        if !self.session.is_authenticated() {
            return Err(AppError::not_authenticated("favorites filter"));
        }
        let mut screen = lock(&self.state);
        screen.view.show_favorites_only = !screen.view.show_favorites_only;
        screen.view.page = 0;
        Ok(screen.view.show_favorites_only)
    }

    /// Add or remove a favorite. Rejected locally, without a network
    /// call, when logged out. Returns whether the stock is now a favorite.
    pub async fn toggle_favorite(&self, stock: &Stock) -> Result<bool> {
        if !self.session.is_authenticated() {
            log::info!("Favorite toggle for {} rejected: not logged in", stock.code);
            return Err(AppError::not_authenticated("toggle favorite"));
        }

        if self.store.is_favorite(&stock.code) {
            self.gateway.remove_favorite(&stock.code).await?;
            self.store.remove_favorite(&stock.code).await;
            Ok(false)
        } else {
            let entry = FavoriteEntry::from(stock);
            self.gateway.add_favorite(entry.clone()).await?;
            self.store.add_favorite(entry).await;
            Ok(true)
        }
    }

    /// Refresh favorites from the server. Logged out means no favorites.
    pub async fn load_favorites(&self) -> Result<Vec<FavoriteEntry>> {
        if !self.session.is_authenticated() {
            self.store.replace_favorites(Vec::new()).await;
            return Ok(Vec::new());
        }
        let favorites = self.gateway.favorites().await?;
        self.store.replace_favorites(favorites.clone()).await;
        Ok(favorites)
    }

    pub fn favorites(&self) -> Vec<FavoriteEntry> {
        self.store.list_favorites()
    }

    /// Record a detail-page visit: posted to the server and upserted into
    /// the local recents. A failed post is logged only.
    pub async fn view_record(&self, stock: &Stock) -> Vec<RecentEntry> {
        if let Err(e) = self.gateway.add_recent(FavoriteEntry::from(stock)).await {
            log::warn!("Could not record recent view of {}: {e}", stock.code);
        }
        self.store.upsert_recent(RecentEntry::from(stock)).await
    }

    /// Replace local recents with the server's list, deduplicated and capped.
    pub async fn load_recent(&self) -> Result<Vec<RecentEntry>> {
        let entries = self.gateway.recent().await?;
        Ok(self.store.replace_recent(entries).await)
    }

    pub fn recent(&self) -> Vec<RecentEntry> {
        self.store.list_recent()
    }

    pub fn view(&self) -> StockView {
        let favorites: HashSet<String> = self
            .store
            .list_favorites()
            .into_iter()
            .map(|f| f.code)
            .collect();

        let screen = lock(&self.state);
        let records = screen.records();
        let page = sort_filter::apply(
            &records,
            &ViewQuery {
                filters: screen.view.filters,
                favorites_only: screen.view.show_favorites_only.then_some(&favorites),
                sort: screen.view.sort,
                page: screen.view.page,
                page_size: self.page_size,
            },
        );

        StockView {
            tab: screen.tab,
            mode: screen.view.mode,
            query: screen.query.clone(),
            suggestions: screen.suggestions.clone(),
            status: screen.status.clone(),
            sort: screen.view.sort,
            filters: screen.view.filters,
            show_favorites_only: screen.view.show_favorites_only,
            page: page.page,
            total_pages: page.total_pages,
            total_count: page.total_count,
            visible: page.visible.into_iter().cloned().collect(),
            request_token: screen.view.request_token,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::error::FetchError;
    use crate::models::fixtures::stock;
    use crate::models::{FlatResult, Payload, Record, SearchResult};
    use crate::services::gateway::{Endpoint, SearchScope};
    use crate::storage::MemoryStorage;
    use crate::testing::ScriptedGateway;

    fn listed(code: &str, name: &str, market: Market, volume: i64) -> Stock {
        let mut s = stock(code, name);
        s.market = Some(market);
        s.volume = Some(volume);
        s
    }

    fn flat(stocks: Vec<Stock>) -> Payload {
        Payload::Flat(FlatResult {
            items: stocks.into_iter().map(Record::Stock).collect(),
        })
    }

    fn hits(stocks: Vec<Stock>) -> Payload {
        Payload::Search(SearchResult {
            items: stocks.into_iter().map(Record::Stock).collect(),
            suggestions: None,
        })
    }

    fn list(market: Market) -> Endpoint {
        Endpoint::MarketList { market }
    }

    fn search(query: &str, use_chosung: bool) -> Endpoint {
        Endpoint::Search {
            scope: SearchScope::Stocks,
            query: query.into(),
            category: None,
            sort: None,
            use_chosung,
        }
    }

    async fn controller(gateway: &Arc<ScriptedGateway>, session: Session) -> StockListController {
        let store = PersistenceStore::open(Arc::new(MemoryStorage::new()), "stocks").await;
        let listing = ListingConfig {
            stock_page_size: 2,
            ..ListingConfig::default()
        };
        StockListController::new(
            gateway.clone(),
            session,
            store,
            &listing,
            &CacheConfig::default(),
        )
    }

    fn codes(view: &StockView) -> Vec<&str> {
        view.visible.iter().map(|s| s.code.as_str()).collect()
    }

    #[tokio::test]
    async fn test_one_market_failing_shows_the_other() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.reply(
            list(Market::Kospi),
            flat(vec![listed("1", "A", Market::Kospi, 10)]),
        );
        gateway.fail(list(Market::Kosdaq), FetchError::timeout("slow"));
        let ctrl = controller(&gateway, Session::anonymous()).await;

        assert_eq!(ctrl.load_listings().await.unwrap(), Applied::Applied);
        let view = ctrl.view();
        assert_eq!(view.status, ViewStatus::Ready);
        assert_eq!(codes(&view), vec!["1"]);

        ctrl.set_tab(Market::Kosdaq);
        assert!(ctrl.view().visible.is_empty());
    }

    #[tokio::test]
    async fn test_both_markets_failing_is_an_error_state() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.fail(list(Market::Kospi), FetchError::network("down"));
        gateway.fail(list(Market::Kosdaq), FetchError::network("down"));
        let ctrl = controller(&gateway, Session::anonymous()).await;

        assert!(ctrl.load_listings().await.is_err());
        assert!(matches!(ctrl.view().status, ViewStatus::Error(_)));
    }

    #[tokio::test]
    async fn test_search_switches_tab_and_uses_cache() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.reply(
            search("셀트", false),
            hits(vec![listed("068270", "셀트리온", Market::Kosdaq, 5)]),
        );
        let ctrl = controller(&gateway, Session::anonymous()).await;

        ctrl.search("셀트").await.unwrap();
        let view = ctrl.view();
        assert_eq!(view.mode, ViewMode::Search);
        assert_eq!(view.tab, Market::Kosdaq);
        assert_eq!(codes(&view), vec!["068270"]);

        ctrl.search(" 셀트 ").await.unwrap();
        assert_eq!(gateway.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_chosung_query_sets_flag() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.reply(search("ㅅㅅ", true), hits(vec![]));
        let ctrl = controller(&gateway, Session::anonymous()).await;

        ctrl.search("ㅅㅅ").await.unwrap();
        assert_eq!(gateway.calls(), vec![search("ㅅㅅ", true)]);
        assert_eq!(ctrl.view().status, ViewStatus::Empty);
    }

    #[tokio::test(start_paused = true)]
    async fn test_earlier_search_resolving_late_is_discarded() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.reply_after(
            search("bank", false),
            hits(vec![listed("1", "bank", Market::Kospi, 1)]),
            Duration::from_millis(500),
        );
        gateway.reply(
            search("finance", false),
            hits(vec![listed("2", "finance", Market::Kospi, 1)]),
        );
        let ctrl = controller(&gateway, Session::anonymous()).await;

        let (bank, finance) = tokio::join!(ctrl.search("bank"), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            ctrl.search("finance").await
        });

        assert_eq!(finance.unwrap(), Applied::Applied);
        assert_eq!(bank.unwrap(), Applied::Stale);
        let view = ctrl.view();
        assert_eq!(view.query.as_deref(), Some("finance"));
        assert_eq!(codes(&view), vec!["2"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_listings_landing_during_a_search_are_kept() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.reply_after(
            list(Market::Kospi),
            flat(vec![listed("1", "A", Market::Kospi, 10)]),
            Duration::from_millis(500),
        );
        gateway.reply_after(list(Market::Kosdaq), flat(vec![]), Duration::from_millis(500));
        gateway.reply(
            search("x", false),
            hits(vec![listed("2", "x", Market::Kospi, 1)]),
        );
        let ctrl = controller(&gateway, Session::anonymous()).await;

        let (listings, found) = tokio::join!(ctrl.load_listings(), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            ctrl.search("x").await
        });
        assert_eq!(listings.unwrap(), Applied::Applied);
        assert_eq!(found.unwrap(), Applied::Applied);
        assert_eq!(codes(&ctrl.view()), vec!["2"]);

        ctrl.cancel_search();
        let view = ctrl.view();
        assert_eq!(view.mode, ViewMode::Browse);
        assert_eq!(view.status, ViewStatus::Ready);
        assert_eq!(codes(&view), vec!["1"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_listings_reload_does_not_invalidate_search() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.reply(list(Market::Kospi), flat(vec![]));
        gateway.reply(list(Market::Kosdaq), flat(vec![]));
        gateway.reply_after(
            search("x", false),
            hits(vec![listed("2", "x", Market::Kospi, 1)]),
            Duration::from_millis(500),
        );
        let ctrl = controller(&gateway, Session::anonymous()).await;

        let (found, listings) = tokio::join!(ctrl.search("x"), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            ctrl.load_listings().await
        });
        assert_eq!(listings.unwrap(), Applied::Applied);
        assert_eq!(found.unwrap(), Applied::Applied);

        let view = ctrl.view();
        assert_eq!(view.status, ViewStatus::Ready);
        assert_eq!(codes(&view), vec!["2"]);
    }

    #[tokio::test]
    async fn test_failed_search_shows_no_earlier_hits() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.reply(
            search("a", false),
            hits(vec![listed("1", "a", Market::Kospi, 1)]),
        );
        gateway.fail(search("b", false), FetchError::network("down"));
        let ctrl = controller(&gateway, Session::anonymous()).await;

        ctrl.search("a").await.unwrap();
        assert!(ctrl.search("b").await.is_err());

        let view = ctrl.view();
        assert_eq!(view.query.as_deref(), Some("b"));
        assert!(matches!(view.status, ViewStatus::Error(_)));
        assert!(view.visible.is_empty());
    }

    #[tokio::test]
    async fn test_cancel_search_resets_page_and_sort() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.reply(
            search("a", false),
            hits((0..5).map(|i| listed(&i.to_string(), "a", Market::Kospi, i)).collect()),
        );
        let ctrl = controller(&gateway, Session::anonymous()).await;

        ctrl.search("a").await.unwrap();
        ctrl.toggle_sort(SortField::Volume);
        assert_eq!(ctrl.set_page(2), Applied::Applied);

        ctrl.cancel_search();
        let view = ctrl.view();
        assert_eq!(view.mode, ViewMode::Browse);
        assert_eq!(view.page, 0);
        assert_eq!(view.sort, None);
        assert_eq!(view.query, None);
    }

    #[tokio::test]
    async fn test_sort_toggle_and_page_bounds() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.reply(
            list(Market::Kospi),
            flat(vec![
                listed("1", "A", Market::Kospi, 30),
                listed("2", "B", Market::Kospi, 10),
                listed("3", "C", Market::Kospi, 20),
            ]),
        );
        gateway.reply(list(Market::Kosdaq), flat(vec![]));
        let ctrl = controller(&gateway, Session::anonymous()).await;
        ctrl.load_listings().await.unwrap();

        ctrl.toggle_sort(SortField::Volume);
        assert_eq!(codes(&ctrl.view()), vec!["2", "3"]);
        ctrl.toggle_sort(SortField::Volume);
        assert_eq!(codes(&ctrl.view()), vec!["1", "3"]);

        assert_eq!(ctrl.set_page(1), Applied::Applied);
        assert_eq!(codes(&ctrl.view()), vec!["2"]);
        assert_eq!(ctrl.set_page(2), Applied::Ignored);
        assert_eq!(ctrl.view().page, 1);
    }

    #[tokio::test]
    async fn test_favorite_toggle_logged_out_is_rejected_locally() {
        let gateway = Arc::new(ScriptedGateway::new());
        let ctrl = controller(&gateway, Session::anonymous()).await;
        let before = ctrl.view();

        let err = ctrl
            .toggle_favorite(&stock("005930", "삼성전자"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotAuthenticated(_)));
        assert!(ctrl.toggle_favorites_only().is_err());

        assert!(gateway.calls().is_empty());
        assert_eq!(ctrl.view(), before);
        assert!(ctrl.favorites().is_empty());
    }

    #[tokio::test]
    async fn test_favorite_toggle_and_filter_when_logged_in() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.reply(
            list(Market::Kospi),
            flat(vec![
                listed("1", "A", Market::Kospi, 1),
                listed("2", "B", Market::Kospi, 1),
            ]),
        );
        gateway.reply(list(Market::Kosdaq), flat(vec![]));
        let ctrl = controller(&gateway, Session::authenticated("t0k")).await;
        ctrl.load_listings().await.unwrap();

        let b = listed("2", "B", Market::Kospi, 1);
        assert!(ctrl.toggle_favorite(&b).await.unwrap());
        assert!(ctrl.toggle_favorites_only().unwrap());
        assert_eq!(codes(&ctrl.view()), vec!["2"]);

        assert!(!ctrl.toggle_favorite(&b).await.unwrap());
        assert!(ctrl.view().visible.is_empty());
        assert!(
            gateway
                .calls()
                .contains(&Endpoint::RemoveFavorite { code: "2".into() })
        );
    }

    #[tokio::test]
    async fn test_recent_views_are_deduplicated_and_capped() {
        let gateway = Arc::new(ScriptedGateway::new());
        let ctrl = controller(&gateway, Session::anonymous()).await;

        for code in ["1", "2", "3", "4", "5", "6", "2"] {
            ctrl.view_record(&stock(code, code)).await;
        }
        let recent: Vec<_> = ctrl.recent().into_iter().map(|e| e.code).collect();
        assert_eq!(recent, vec!["2", "6", "5", "4", "3"]);
        assert_eq!(
            gateway
                .calls_where(|e| matches!(e, Endpoint::AddRecent(_)))
                .len(),
            7
        );
    }

    #[tokio::test]
    async fn test_load_recent_from_server() {
        let gateway = Arc::new(ScriptedGateway::new());
        let entries = ["a", "b", "a", "c", "d", "e", "f"]
            .into_iter()
            .map(|c| RecentEntry::from(&stock(c, c)))
            .collect();
        gateway.reply(Endpoint::Recent, Payload::Recent(entries));
        let ctrl = controller(&gateway, Session::anonymous()).await;

        let recent: Vec<_> = ctrl
            .load_recent()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.code)
            .collect();
        assert_eq!(recent, vec!["a", "b", "c", "d", "e"]);
    }
}
