//! Refresh coordinator
//!
//! Owns the cached reading and runs the fetch + parse pipeline. At most one
//! pipeline is in flight: a refresh that arrives while another is running
//! waits for it and returns its result instead of fetching again. A failed
//! fetch leaves the cache untouched, so consumers keep the last good reading.

use crate::config::PollInterval;
use crate::extract;
use crate::fetch::PageSource;
use crate::schema::{FailureKind, Reading, RefreshState};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Capability the host scheduler depends on
#[async_trait]
pub trait Refreshable: Send + Sync {
    async fn refresh(&self) -> Arc<Reading>;
}

pub struct Coordinator<S> {
    source: Mutex<S>,
    state: watch::Sender<RefreshState>,
    interval: PollInterval,
}

impl<S: PageSource> Coordinator<S> {
    pub fn new(source: S, interval: PollInterval) -> Self {
        let (state, _) = watch::channel(RefreshState::default());
        Self {
            source: Mutex::new(source),
            state,
            interval,
        }
    }

    /// Last successfully parsed reading (empty if none yet)
    pub fn current(&self) -> Arc<Reading> {
        self.state.borrow().reading.clone()
    }

    pub fn state(&self) -> RefreshState {
        self.state.borrow().clone()
    }

    pub fn last_failure(&self) -> Option<FailureKind> {
        self.state.borrow().last_failure
    }

    /// Receiver notified on every cache replacement or failure
    pub fn subscribe(&self) -> watch::Receiver<RefreshState> {
        self.state.subscribe()
    }

    pub fn interval(&self) -> PollInterval {
        self.interval
    }

    /// Run one fetch + parse cycle and return the (possibly stale) cache
    pub async fn refresh(&self) -> Arc<Reading> {
        let mut source = match self.source.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                debug!("refresh already in flight, waiting for it");
                let _done = self.source.lock().await;
                return self.current();
            }
        };

        match source.fetch().await {
            Ok(html) => {
                let reading = Arc::new(extract::parse(&html));
                self.state.send_replace(RefreshState {
                    reading: reading.clone(),
                    refreshed_at: Some(Utc::now()),
                    last_failure: None,
                });
                info!("readings updated");
                reading
            }
            Err(e) => {
                let kind = e.kind();
                warn!(kind = %kind, "refresh failed, keeping previous reading");
                self.state.send_modify(|state| state.last_failure = Some(kind));
                self.current()
            }
        }
    }
}

impl<S: PageSource + 'static> Coordinator<S> {
    /// Refresh immediately, then once per interval, until the task is aborted
    pub fn spawn_polling(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval.period());
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                self.refresh().await;
            }
        })
    }
}

#[async_trait]
impl<S: PageSource> Refreshable for Coordinator<S> {
    async fn refresh(&self) -> Arc<Reading> {
        Coordinator::refresh(self).await
    }
}
