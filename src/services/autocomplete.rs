// src/services/autocomplete.rs

//! Debounced suggestion engine.
//!
//! Keystrokes go through [`AutocompleteEngine::on_input`]. Once the input
//! has been quiet for the debounce window, exactly one autocomplete
//! request (plus a correction request for inputs of at least
//! `min_correction_chars` characters) is issued for the latest text. Each
//! keystroke bumps a generation counter; a response whose generation is
//! no longer current is dropped on arrival.
//!
//! Trending keywords refresh on their own, slower cadence and are merged
//! into whatever suggestion set is read.

use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{mpsc, watch};
use tokio::time::{MissedTickBehavior, Sleep, sleep};
use tokio_util::sync::CancellationToken;

use crate::models::{AutocompleteConfig, Candidate, SuggestionSet, TrendingKeyword};
use crate::services::gateway::{FetchGateway, GatewayExt};

enum Input {
    Text { text: String, generation: u64 },
    Cancel,
}

/// Handle to the debounce and trending tasks. Dropping it stops both.
pub struct AutocompleteEngine {
    input_tx: mpsc::UnboundedSender<Input>,
    generation: Arc<AtomicU64>,
    suggestions: Arc<watch::Sender<SuggestionSet>>,
    trending: watch::Receiver<Vec<TrendingKeyword>>,
    shutdown: CancellationToken,
}

impl AutocompleteEngine {
    /// Start the engine on the current runtime.
    pub fn spawn(gateway: Arc<dyn FetchGateway>, config: AutocompleteConfig) -> Self {
        let (input_tx, input_rx) = mpsc::unbounded_channel();
        let generation = Arc::new(AtomicU64::new(0));
        let suggestions = Arc::new(watch::Sender::new(SuggestionSet::default()));
        let (trending_tx, trending) = watch::channel(Vec::new());
        let shutdown = CancellationToken::new();

        tokio::spawn(debounce_loop(
            Arc::clone(&gateway),
            config.clone(),
            input_rx,
            Arc::clone(&generation),
            Arc::clone(&suggestions),
            shutdown.clone(),
        ));
        tokio::spawn(trending_loop(gateway, config, trending_tx, shutdown.clone()));

        Self {
            input_tx,
            generation,
            suggestions,
            trending,
            shutdown,
        }
    }

    /// Record a keystroke. Restarts the debounce window.
    pub fn on_input(&self, text: impl Into<String>) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let _ = self.input_tx.send(Input::Text {
            text: text.into(),
            generation,
        });
    }

    /// Submit `text` as a search right away: the pending window is
    /// cancelled, in-flight suggestions are invalidated and the dropdown
    /// clears. Returns the query to search for.
    pub fn commit(&self, text: &str) -> String {
        self.generation.fetch_add(1, Ordering::SeqCst);
        let _ = self.input_tx.send(Input::Cancel);
        self.suggestions.send_replace(SuggestionSet::default());
        text.trim().to_string()
    }

    /// Selecting a candidate behaves exactly like pressing Enter on it.
    pub fn select(&self, candidate: &Candidate) -> String {
        self.commit(candidate.query())
    }

    /// Latest suggestions with the current trending list merged in.
    pub fn current(&self) -> SuggestionSet {
        let mut set = self.suggestions.borrow().clone();
        set.trending = self.trending.borrow().clone();
        set
    }

    pub fn trending(&self) -> Vec<TrendingKeyword> {
        self.trending.borrow().clone()
    }

    /// Receiver notified whenever a fresh suggestion set is applied.
    pub fn subscribe(&self) -> watch::Receiver<SuggestionSet> {
        self.suggestions.subscribe()
    }

    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}

impl Drop for AutocompleteEngine {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn debounce_loop(
    gateway: Arc<dyn FetchGateway>,
    config: AutocompleteConfig,
    mut input_rx: mpsc::UnboundedReceiver<Input>,
    generation: Arc<AtomicU64>,
    suggestions: Arc<watch::Sender<SuggestionSet>>,
    shutdown: CancellationToken,
) {
    let debounce = config.debounce();
    let mut pending: Option<(String, u64)> = None;
    let mut timer: Option<Pin<Box<Sleep>>> = None;

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            maybe = input_rx.recv() => {
                let Some(input) = maybe else { break; };
                match input {
                    Input::Text { text, generation } => {
                        pending = Some((text, generation));
                        timer = Some(Box::pin(sleep(debounce)));
                    }
                    Input::Cancel => {
                        pending = None;
                        timer = None;
                    }
                }
            }
            _ = async {
                if let Some(t) = &mut timer {
                    t.await;
                }
            }, if timer.is_some() => {
                timer = None;
                let Some((text, issued)) = pending.take() else { continue; };
                tokio::spawn(fetch_suggestions(
                    Arc::clone(&gateway),
                    config.min_correction_chars,
                    text,
                    issued,
                    Arc::clone(&generation),
                    Arc::clone(&suggestions),
                    shutdown.clone(),
                ));
            }
        }
    }
    log::debug!("Autocomplete debounce loop stopped");
}

async fn fetch_suggestions(
    gateway: Arc<dyn FetchGateway>,
    min_correction_chars: usize,
    text: String,
    issued: u64,
    generation: Arc<AtomicU64>,
    suggestions: Arc<watch::Sender<SuggestionSet>>,
    shutdown: CancellationToken,
) {
    let query = text.trim();
    if query.is_empty() {
        if generation.load(Ordering::SeqCst) == issued {
            suggestions.send_replace(SuggestionSet::default());
        }
        return;
    }

    let wants_correction = query.chars().count() >= min_correction_chars;
    let (autocomplete, correction) = tokio::join!(gateway.autocomplete(query), async {
        if wants_correction {
            gateway.correction(query).await
        } else {
            Ok(None)
        }
    });

    if shutdown.is_cancelled() {
        return;
    }
    if generation.load(Ordering::SeqCst) != issued {
        log::debug!("Discarding superseded suggestions for '{query}'");
        return;
    }

    let autocomplete = autocomplete.unwrap_or_else(|e| {
        log::warn!("Autocomplete for '{query}' failed: {e}");
        Vec::new()
    });
    let correction = correction.unwrap_or_else(|e| {
        log::warn!("Correction for '{query}' failed: {e}");
        None
    });

    suggestions.send_replace(SuggestionSet {
        query: query.to_string(),
        autocomplete,
        correction,
        trending: Vec::new(),
        message: None,
    });
}

async fn trending_loop(
    gateway: Arc<dyn FetchGateway>,
    config: AutocompleteConfig,
    trending_tx: watch::Sender<Vec<TrendingKeyword>>,
    shutdown: CancellationToken,
) {
    let mut interval = tokio::time::interval(config.trending_refresh());
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = interval.tick() => {
                match gateway.trending(config.trending_hours).await {
                    Ok(mut keywords) => {
                        keywords.truncate(config.trending_limit);
                        log::debug!("Trending keywords refreshed: {}", keywords.len());
                        trending_tx.send_replace(keywords);
                    }
                    Err(e) => log::warn!("Trending refresh failed, keeping previous list: {e}"),
                }
            }
        }
    }
}
