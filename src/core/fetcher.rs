//! Periodic rate polling and the observable fetch state.

use crate::core::rate::{RateProvider, RateSnapshot};
use anyhow::Result;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Default time between two polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchState {
    /// Nothing has been received yet.
    Pending,
    /// The most recent applied request failed.
    Error(String),
    Success(RateSnapshot),
}

/// A reply to a single request, tagged with the ticket it was issued under.
#[derive(Debug)]
pub struct PollReply {
    pub ticket: u64,
    pub result: Result<RateSnapshot>,
}

/// Tracks the outcome of rate requests.
///
/// Replies are applied last-writer-wins by ticket: a reply whose ticket is
/// not newer than the last applied one is dropped.
#[derive(Debug)]
pub struct RateFetcher {
    state: FetchState,
    latest: Option<RateSnapshot>,
    tickets: Arc<AtomicU64>,
    applied: u64,
}

impl Default for RateFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl RateFetcher {
    pub fn new() -> Self {
        Self {
            state: FetchState::Pending,
            latest: None,
            tickets: Arc::new(AtomicU64::new(0)),
            applied: 0,
        }
    }

    pub fn state(&self) -> &FetchState {
        &self.state
    }

    /// The last successfully received snapshot, even when a later request failed.
    pub fn latest(&self) -> Option<&RateSnapshot> {
        self.latest.as_ref()
    }

    /// Issues the ticket for a new request.
    pub fn begin(&self) -> u64 {
        self.tickets.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Applies a reply. Returns the snapshot when a new one was accepted.
    pub fn complete(&mut self, ticket: u64, result: Result<RateSnapshot>) -> Option<&RateSnapshot> {
        if ticket <= self.applied {
            debug!(ticket, applied = self.applied, "Discarding stale rate reply");
            return None;
        }
        self.applied = ticket;

        match result {
            Ok(snapshot) => {
                debug!(ticket, ?snapshot, "Applied rate snapshot");
                self.state = FetchState::Success(snapshot.clone());
                self.latest = Some(snapshot);
                self.latest.as_ref()
            }
            Err(e) => {
                warn!(ticket, error = %e, "Rate request failed");
                self.state = FetchState::Error(format!("{e:#}"));
                None
            }
        }
    }

    /// Creates a [`Poller`] that shares this fetcher's ticket counter.
    pub fn poller(
        &self,
        provider: Arc<dyn RateProvider>,
        replies: mpsc::UnboundedSender<PollReply>,
    ) -> Poller {
        Poller {
            provider,
            tickets: Arc::clone(&self.tickets),
            replies,
        }
    }
}

/// Issues rate requests on a schedule or on demand and forwards the replies.
#[derive(Clone)]
pub struct Poller {
    provider: Arc<dyn RateProvider>,
    tickets: Arc<AtomicU64>,
    replies: mpsc::UnboundedSender<PollReply>,
}

impl Poller {
    async fn request(&self) {
        let ticket = self.tickets.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(ticket, "Requesting rates");
        let result = self.provider.fetch_rates().await;
        if self.replies.send(PollReply { ticket, result }).is_err() {
            debug!(ticket, "Reply receiver dropped");
        }
    }

    /// Performs a single out-of-band request.
    pub fn fetch_now(&self) -> JoinHandle<()> {
        let poller = self.clone();
        tokio::spawn(async move { poller.request().await })
    }

    /// Polls every `every`, starting immediately, until the receiver goes away.
    pub fn spawn_schedule(&self, every: Duration) -> JoinHandle<()> {
        let poller = self.clone();
        tokio::spawn(async move {
            info!(interval_secs = every.as_secs(), "Starting rate polling");
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if poller.replies.is_closed() {
                    break;
                }
                // Each request runs on its own so a slow reply never delays the next tick.
                poller.fetch_now();
            }
        })
    }
}
