//! Per-screen orchestration.
//!
//! A controller owns one screen's [`ViewState`](crate::models::ViewState)
//! and composes the gateway, search cache, persistence store and
//! pipeline into the view the presentation layer reads. Every
//! authoritative fetch is stamped with a fresh request token; a response
//! is applied only while its token is still the highest one issued.

pub mod news;
pub mod stocks;

pub use news::{NewsListController, NewsView};
pub use stocks::{StockListController, StockView};

/// What happened to a request's response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The response is now visible
    Applied,
    /// A newer request superseded it; nothing changed
    Stale,
    /// The request was a no-op (e.g. a page out of range)
    Ignored,
}
