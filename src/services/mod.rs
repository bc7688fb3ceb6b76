//! Service layer for the orchestration core.
//!
//! This module contains:
//! - Backend access (`FetchGateway`, `HttpGateway`)
//! - Debounced suggestions (`AutocompleteEngine`)
//! - The rotating ranking sidebar (`RankingPoller`)

mod autocomplete;
pub mod gateway;
pub mod http_gateway;
mod ranking;

pub use autocomplete::AutocompleteEngine;
pub use gateway::{Endpoint, FetchGateway, GatewayExt, NewsFeed, SearchScope, Service};
pub use http_gateway::HttpGateway;
pub use ranking::{PollerState, RankingPoller, RankingRotation, RankingView};
