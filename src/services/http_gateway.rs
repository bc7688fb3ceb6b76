// src/services/http_gateway.rs

//! reqwest-backed [`FetchGateway`].
//!
//! The three backends answer in different shapes. [`normalize`] folds a
//! decoded JSON body into the [`Payload`] variant the endpoint promises;
//! it is pure so the folding rules are testable without a server.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use url::Url;

use crate::error::{FetchError, Result};
use crate::models::{
    BackendConfig, Correction, FlatResult, Market, News, PagedResult, Payload, Record,
    SearchResult, Session, Stock, SuggestionSet,
};
use crate::services::gateway::{Endpoint, FetchGateway, SearchScope, Service};
use crate::utils::http;

/// Gateway talking to the listing, ranking and search services over HTTP.
pub struct HttpGateway {
    client: Client,
    listing_url: Url,
    ranking_url: Url,
    search_url: Url,
    session: Session,
}

impl HttpGateway {
    /// Build a gateway from backend settings. The session's token, if any,
    /// is sent as a bearer credential on every call.
    pub fn new(config: &BackendConfig, session: Session) -> Result<Self> {
        Ok(Self {
            client: http::create_async_client(config)?,
            listing_url: base_url(&config.listing_url)?,
            ranking_url: base_url(&config.ranking_url)?,
            search_url: base_url(&config.search_url)?,
            session,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn url_for(&self, endpoint: &Endpoint) -> std::result::Result<Url, FetchError> {
        let base = match endpoint.service() {
            Service::Listing => &self.listing_url,
            Service::Ranking => &self.ranking_url,
            Service::Search => &self.search_url,
        };
        base.join(&endpoint.path())
            .map_err(|e| FetchError::network(format!("cannot build URL for {endpoint}: {e}")))
    }
}

#[async_trait]
impl FetchGateway for HttpGateway {
    async fn fetch(&self, endpoint: &Endpoint) -> std::result::Result<Payload, FetchError> {
        let url = self.url_for(endpoint)?;
        log::debug!("{endpoint} -> {url}");

        let mut request = match endpoint {
            Endpoint::AddFavorite(entry) | Endpoint::AddRecent(entry) => {
                self.client.post(url).json(entry)
            }
            Endpoint::RemoveFavorite { code } => self
                .client
                .delete(url)
                .json(&serde_json::json!({ "code": code })),
            _ => self.client.get(url).query(&endpoint.query()),
        };
        if let Some(token) = self.session.token() {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?.error_for_status()?;
        let bytes = response.bytes().await?;
        let body = if bytes.iter().all(u8::is_ascii_whitespace) {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .map_err(|e| FetchError::unexpected_shape(endpoint, e))?
        };

        normalize(endpoint, body)
    }
}

/// Parse a service base URL, forcing a trailing slash so relative paths
/// append instead of replacing the last segment.
fn base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Fold a decoded response body into the payload the endpoint promises.
pub fn normalize(endpoint: &Endpoint, body: Value) -> std::result::Result<Payload, FetchError> {
    match endpoint {
        Endpoint::MarketList { market } => {
            let items = parse_records(endpoint, SearchScope::Stocks, into_array(endpoint, body)?)
                .into_iter()
                .map(|record| with_market(record, *market))
                .collect();
            Ok(Payload::Flat(FlatResult { items }))
        }
        Endpoint::NewsPage { .. } => normalize_paged(endpoint, body).map(Payload::Paged),
        Endpoint::Search { scope, query, .. } => {
            normalize_search(endpoint, *scope, query, body).map(Payload::Search)
        }
        Endpoint::Autocomplete { .. } => decode(endpoint, or_empty(body)).map(Payload::Keywords),
        Endpoint::Correction { query } => Ok(Payload::Correction(normalize_correction(query, &body))),
        Endpoint::Trending { .. } => decode(endpoint, or_empty(body)).map(Payload::Trending),
        Endpoint::Ranking { .. } => decode(endpoint, or_empty(body)).map(Payload::Ranking),
        Endpoint::Favorites => decode(endpoint, or_empty(body)).map(Payload::Favorites),
        Endpoint::Recent => decode(endpoint, or_empty(body)).map(Payload::Recent),
        Endpoint::AddFavorite(_) | Endpoint::RemoveFavorite { .. } | Endpoint::AddRecent(_) => {
            Ok(Payload::Ack)
        }
    }
}

fn or_empty(body: Value) -> Value {
    match body {
        Value::Null => Value::Array(Vec::new()),
        other => other,
    }
}

fn decode<T: DeserializeOwned>(
    endpoint: &Endpoint,
    body: Value,
) -> std::result::Result<T, FetchError> {
    serde_json::from_value(body).map_err(|e| FetchError::unexpected_shape(endpoint, e))
}

fn into_array(endpoint: &Endpoint, body: Value) -> std::result::Result<Vec<Value>, FetchError> {
    match body {
        Value::Array(items) => Ok(items),
        Value::Null => Ok(Vec::new()),
        other => Err(FetchError::unexpected_shape(
            endpoint,
            format!("expected an array, got {}", kind_of(&other)),
        )),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Decode each element as the endpoint's record type, skipping rows that
/// do not parse.
fn parse_records(endpoint: &Endpoint, scope: SearchScope, items: Vec<Value>) -> Vec<Record> {
    items
        .into_iter()
        .filter_map(|item| {
            let parsed = match scope {
                SearchScope::Stocks => serde_json::from_value::<Stock>(item).map(Record::Stock),
                SearchScope::News => serde_json::from_value::<News>(item).map(Record::News),
            };
            parsed
                .map_err(|e| log::warn!("Skipping malformed record from {endpoint}: {e}"))
                .ok()
        })
        .collect()
}

fn with_market(record: Record, market: Market) -> Record {
    match record {
        Record::Stock(mut stock) => {
            stock.market.get_or_insert(market);
            Record::Stock(stock)
        }
        other => other,
    }
}

/// `{content, number, totalPages}`, with a bare array read as a single page.
fn normalize_paged(
    endpoint: &Endpoint,
    body: Value,
) -> std::result::Result<PagedResult<Record>, FetchError> {
    match body {
        Value::Object(mut obj) => {
            let content = obj.remove("content").unwrap_or(Value::Null);
            let items = parse_records(endpoint, SearchScope::News, into_array(endpoint, content)?);
            let page = obj.get("number").and_then(Value::as_u64).unwrap_or(0) as usize;
            let total_pages = obj
                .get("totalPages")
                .and_then(Value::as_u64)
                .filter(|n| *n > 0)
                .unwrap_or(1) as usize;
            Ok(PagedResult {
                items,
                page,
                total_pages,
            })
        }
        other => {
            let items = parse_records(endpoint, SearchScope::News, into_array(endpoint, other)?);
            Ok(PagedResult {
                items,
                page: 0,
                total_pages: 1,
            })
        }
    }
}

fn normalize_search(
    endpoint: &Endpoint,
    scope: SearchScope,
    query: &str,
    body: Value,
) -> std::result::Result<SearchResult<Record>, FetchError> {
    match body {
        Value::Object(mut obj) => {
            let hits = obj
                .remove("results")
                .or_else(|| obj.remove("content"))
                .unwrap_or(Value::Null);
            let items = parse_records(endpoint, scope, into_array(endpoint, hits)?);
            Ok(SearchResult {
                items,
                suggestions: embedded_suggestions(query, &obj),
            })
        }
        other => Ok(SearchResult {
            items: parse_records(endpoint, scope, into_array(endpoint, other)?),
            suggestions: None,
        }),
    }
}

/// Suggestion metadata the stock search service attaches when a query
/// looks misspelled. Present only with both a message and candidates.
fn embedded_suggestions(query: &str, obj: &Map<String, Value>) -> Option<SuggestionSet> {
    let message = obj
        .get("suggestion_message")
        .and_then(Value::as_str)
        .filter(|m| !m.trim().is_empty())?;
    let candidates: Vec<String> = obj
        .get("suggestion_list")
        .cloned()
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default();
    if candidates.is_empty() {
        return None;
    }

    let original = obj
        .get("suggestion_original_query")
        .and_then(Value::as_str)
        .unwrap_or(query);
    let correction = obj
        .get("gpt_inferred_word")
        .and_then(Value::as_str)
        .and_then(|word| Correction::new(original, word, "inferred"));

    Some(SuggestionSet {
        query: original.to_string(),
        autocomplete: candidates,
        correction,
        trending: Vec::new(),
        message: Some(message.to_string()),
    })
}

/// `{corrected, source}`, optionally nested under `news`.
fn normalize_correction(query: &str, body: &Value) -> Option<Correction> {
    let inner = body.get("news").filter(|v| v.is_object()).unwrap_or(body);
    let corrected = inner.get("corrected").and_then(Value::as_str)?;
    let source = inner
        .get("source")
        .and_then(Value::as_str)
        .unwrap_or("unknown");
    Correction::new(query.trim(), corrected, source)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::FetchErrorKind;
    use crate::models::{NewsOrder, RankingCategory};
    use crate::services::gateway::NewsFeed;

    fn news_page() -> Endpoint {
        Endpoint::NewsPage {
            feed: NewsFeed::Domestic,
            category: Some("금융".into()),
            page: 0,
            size: 5,
            sort: NewsOrder::Desc,
        }
    }

    fn stock_search(query: &str) -> Endpoint {
        Endpoint::Search {
            scope: SearchScope::Stocks,
            query: query.into(),
            category: None,
            sort: None,
            use_chosung: false,
        }
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let url = base_url("http://localhost:8585/api/krx").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8585/api/krx/");
        assert_eq!(
            url.join("kospi/list").unwrap().as_str(),
            "http://localhost:8585/api/krx/kospi/list"
        );
    }

    #[test]
    fn test_gateway_routes_to_service_base() {
        let config = BackendConfig {
            listing_url: "http://listing.local/api".into(),
            ranking_url: "http://ranking.local/".into(),
            search_url: "http://search.local".into(),
            ..BackendConfig::default()
        };
        let gateway = HttpGateway::new(&config, Session::anonymous()).unwrap();

        let url = gateway
            .url_for(&Endpoint::Ranking {
                category: RankingCategory::Volume,
            })
            .unwrap();
        assert_eq!(url.as_str(), "http://ranking.local/ranking/volume");

        let url = gateway.url_for(&news_page()).unwrap();
        assert_eq!(url.as_str(), "http://listing.local/api/news");

        let url = gateway
            .url_for(&Endpoint::Trending { hours: 24 })
            .unwrap();
        assert_eq!(url.as_str(), "http://search.local/trending");
    }

    #[test]
    fn test_market_list_fills_missing_market() {
        let endpoint = Endpoint::MarketList {
            market: Market::Kosdaq,
        };
        let body = json!([
            {"code": "000001", "name": "A"},
            {"code": "000002", "name": "B", "market": "KOSPI"}
        ]);
        let Payload::Flat(flat) = normalize(&endpoint, body).unwrap() else {
            panic!("expected flat payload");
        };
        let markets: Vec<_> = flat
            .items
            .into_iter()
            .filter_map(|r| r.into_stock())
            .map(|s| s.market)
            .collect();
        assert_eq!(markets, vec![Some(Market::Kosdaq), Some(Market::Kospi)]);
    }

    #[test]
    fn test_malformed_rows_are_skipped() {
        let endpoint = Endpoint::MarketList {
            market: Market::Kospi,
        };
        let body = json!([{"code": "000001", "name": "A"}, {"name": 42}]);
        let Payload::Flat(flat) = normalize(&endpoint, body).unwrap() else {
            panic!("expected flat payload");
        };
        assert_eq!(flat.items.len(), 1);
    }

    #[test]
    fn test_paged_object_and_bare_array() {
        let body = json!({
            "content": [{"_id": "n1", "title": "금리"}],
            "number": 2,
            "totalPages": 7
        });
        let Payload::Paged(paged) = normalize(&news_page(), body).unwrap() else {
            panic!("expected paged payload");
        };
        assert_eq!(paged.page, 2);
        assert_eq!(paged.total_pages, 7);
        assert_eq!(paged.items[0].key(), "n1");

        let Payload::Paged(paged) = normalize(&news_page(), json!([])).unwrap() else {
            panic!("expected paged payload");
        };
        assert_eq!((paged.page, paged.total_pages), (0, 1));
    }

    #[test]
    fn test_search_carries_suggestion_metadata() {
        let body = json!({
            "results": [{"code": "005930", "name": "삼성전자", "market": "kospi"}],
            "suggestion_original_query": "tkatjd",
            "suggestion_message": "혹시 삼성을 검색하셨나요?",
            "suggestion_list": ["삼성전자", "삼성SDI"],
            "gpt_inferred_word": "삼성"
        });
        let Payload::Search(result) = normalize(&stock_search("tkatjd"), body).unwrap() else {
            panic!("expected search payload");
        };
        assert_eq!(result.items.len(), 1);

        let suggestions = result.suggestions.unwrap();
        assert_eq!(suggestions.autocomplete, vec!["삼성전자", "삼성SDI"]);
        assert_eq!(suggestions.correction.unwrap().corrected, "삼성");
        assert!(suggestions.message.is_some());
    }

    #[test]
    fn test_search_without_candidates_has_no_suggestions() {
        let body = json!({
            "results": [],
            "suggestion_message": "nothing similar",
            "suggestion_list": []
        });
        let Payload::Search(result) = normalize(&stock_search("zz"), body).unwrap() else {
            panic!("expected search payload");
        };
        assert!(result.suggestions.is_none());
    }

    #[test]
    fn test_correction_shapes() {
        let endpoint = Endpoint::Correction {
            query: "삼셩".into(),
        };
        let nested = json!({"news": {"corrected": "삼성", "source": "dict"}});
        let Payload::Correction(Some(c)) = normalize(&endpoint, nested).unwrap() else {
            panic!("expected a correction");
        };
        assert_eq!((c.original.as_str(), c.corrected.as_str()), ("삼셩", "삼성"));

        let same = json!({"corrected": "삼셩", "source": "dict"});
        assert_eq!(normalize(&endpoint, same).unwrap(), Payload::Correction(None));
        assert_eq!(
            normalize(&endpoint, Value::Null).unwrap(),
            Payload::Correction(None)
        );
    }

    #[test]
    fn test_wrong_shape_is_server_error() {
        let endpoint = Endpoint::Ranking {
            category: RankingCategory::Trade,
        };
        let err = normalize(&endpoint, json!("oops")).unwrap_err();
        assert_eq!(err.kind, FetchErrorKind::Server);

        assert_eq!(
            normalize(&endpoint, Value::Null).unwrap(),
            Payload::Ranking(Vec::new())
        );
    }

    #[test]
    fn test_writes_are_acknowledged() {
        let endpoint = Endpoint::RemoveFavorite {
            code: "005930".into(),
        };
        assert_eq!(normalize(&endpoint, Value::Null).unwrap(), Payload::Ack);
    }
}
