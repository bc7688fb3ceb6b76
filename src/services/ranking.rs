// src/services/ranking.rs

//! Rotating ranking sidebar.
//!
//! [`RankingRotation`] is the synchronous state machine
//! (`Idle -> Fetching(category) -> Idle`); [`RankingPoller`] drives it
//! from a fixed interval timer. The rotation index moves on every tick
//! regardless of how long fetches take, and a tick that finds a fetch
//! still in flight starts nothing. A failed or empty fetch leaves the
//! category's previous snapshot untouched.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::error::FetchError;
use crate::models::{RankedItem, RankingCategory, RankingConfig, RankingSnapshot};
use crate::services::gateway::{FetchGateway, GatewayExt};
use crate::utils::lock;

/// Poller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    Idle,
    Fetching(RankingCategory),
}

/// What the sidebar shows right now.
#[derive(Debug, Clone, PartialEq)]
pub struct RankingView {
    pub category: RankingCategory,
    /// Last good snapshot for the category, if one ever arrived
    pub snapshot: Option<RankingSnapshot>,
    /// Rotation steps taken since start
    pub step: u64,
}

/// Rotation index, single-flight guard and last good snapshots.
#[derive(Debug, Clone)]
pub struct RankingRotation {
    categories: Vec<RankingCategory>,
    index: usize,
    steps: u64,
    state: PollerState,
    snapshots: HashMap<RankingCategory, RankingSnapshot>,
    top_n: usize,
}

impl RankingRotation {
    /// An empty category list falls back to every category.
    pub fn new(categories: Vec<RankingCategory>, top_n: usize) -> Self {
        let categories = if categories.is_empty() {
            RankingCategory::ALL.to_vec()
        } else {
            categories
        };
        Self {
            categories,
            index: 0,
            steps: 0,
            state: PollerState::Idle,
            snapshots: HashMap::new(),
            top_n,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> RankingCategory {
        self.categories[self.index]
    }

    pub fn state(&self) -> PollerState {
        self.state
    }

    pub fn snapshot(&self, category: RankingCategory) -> Option<&RankingSnapshot> {
        self.snapshots.get(&category)
    }

    pub fn view(&self) -> RankingView {
        let category = self.current();
        RankingView {
            category,
            snapshot: self.snapshots.get(&category).cloned(),
            step: self.steps,
        }
    }

    /// `i = (i + 1) mod N`.
    pub fn advance(&mut self) {
        self.index = (self.index + 1) % self.categories.len();
        self.steps += 1;
    }

    /// Claim the fetch slot for the current category. `None` while another
    /// fetch is still in flight.
    pub fn begin(&mut self) -> Option<RankingCategory> {
        match self.state {
            PollerState::Fetching(busy) => {
                log::debug!("Ranking fetch for {busy} still in flight, skipping tick");
                None
            }
            PollerState::Idle => {
                let category = self.current();
                self.state = PollerState::Fetching(category);
                Some(category)
            }
        }
    }

    /// Release the fetch slot and apply the outcome. Returns whether the
    /// snapshot was replaced.
    pub fn complete(
        &mut self,
        category: RankingCategory,
        outcome: Result<Vec<RankedItem>, FetchError>,
    ) -> bool {
        if self.state == PollerState::Fetching(category) {
            self.state = PollerState::Idle;
        }

        match outcome {
            Ok(mut items) if !items.is_empty() => {
                items.truncate(self.top_n);
                self.snapshots.insert(
                    category,
                    RankingSnapshot {
                        category,
                        items,
                        as_of: Utc::now(),
                    },
                );
                true
            }
            Ok(_) => {
                log::info!("Ranking {category} came back empty, keeping previous snapshot");
                false
            }
            Err(e) => {
                log::warn!("Ranking {category} fetch failed, keeping previous snapshot: {e}");
                false
            }
        }
    }
}

/// Background rotation over the configured ranking categories.
pub struct RankingPoller {
    rotation: Arc<Mutex<RankingRotation>>,
    view: watch::Receiver<RankingView>,
    shutdown: CancellationToken,
}

impl RankingPoller {
    /// Start polling on the current runtime. The first category is fetched
    /// immediately.
    pub fn spawn(gateway: Arc<dyn FetchGateway>, config: &RankingConfig) -> Self {
        let rotation = Arc::new(Mutex::new(RankingRotation::new(
            config.categories.clone(),
            config.top_n,
        )));
        let (view_tx, view) = watch::channel(lock(&rotation).view());
        let shutdown = CancellationToken::new();

        tokio::spawn(rotation_loop(
            gateway,
            Arc::clone(&rotation),
            Arc::new(view_tx),
            config.interval(),
            shutdown.clone(),
        ));

        Self {
            rotation,
            view,
            shutdown,
        }
    }

    pub fn snapshot(&self, category: RankingCategory) -> Option<RankingSnapshot> {
        lock(&self.rotation).snapshot(category).cloned()
    }

    pub fn current(&self) -> RankingView {
        self.view.borrow().clone()
    }

    pub fn state(&self) -> PollerState {
        lock(&self.rotation).state()
    }

    pub fn index(&self) -> usize {
        lock(&self.rotation).index()
    }

    /// Receiver notified on every rotation step and applied snapshot.
    pub fn subscribe(&self) -> watch::Receiver<RankingView> {
        self.view.clone()
    }

    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}

impl Drop for RankingPoller {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn rotation_loop(
    gateway: Arc<dyn FetchGateway>,
    rotation: Arc<Mutex<RankingRotation>>,
    view_tx: Arc<watch::Sender<RankingView>>,
    period: std::time::Duration,
    shutdown: CancellationToken,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut first = true;

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = interval.tick() => {
                let claimed = {
                    let mut rotation = lock(&rotation);
                    if !first {
                        rotation.advance();
                    }
                    first = false;
                    view_tx.send_replace(rotation.view());
                    rotation.begin()
                };

                if let Some(category) = claimed {
                    tokio::spawn(fetch_ranking(
                        Arc::clone(&gateway),
                        category,
                        Arc::clone(&rotation),
                        Arc::clone(&view_tx),
                        shutdown.clone(),
                    ));
                }
            }
        }
    }
    log::debug!("Ranking poller stopped");
}

async fn fetch_ranking(
    gateway: Arc<dyn FetchGateway>,
    category: RankingCategory,
    rotation: Arc<Mutex<RankingRotation>>,
    view_tx: Arc<watch::Sender<RankingView>>,
    shutdown: CancellationToken,
) {
    let outcome = tokio::select! {
        _ = shutdown.cancelled() => return,
        outcome = gateway.ranking(category) => outcome,
    };

    let mut rotation = lock(&rotation);
    if rotation.complete(category, outcome) && rotation.current() == category {
        view_tx.send_replace(rotation.view());
    }
}
