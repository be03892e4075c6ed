//! Activity feed polling
//!
//! The feed is read incrementally: the first poll takes the newest page, and
//! every following poll asks for items strictly newer than the cursor (the
//! `created_at` of the most recently seen item). The cursor only advances on
//! non-empty responses, so a transient empty or failed poll can never regress
//! it. Items land in a bounded ring buffer, newest first.

use crate::client::ApiClient;
use onair_common::api::Milestone;
use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Default poll interval
pub const POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Cursor over the milestone stream. Advances only on non-empty batches.
#[derive(Debug, Default, Clone, Copy)]
pub struct FeedCursor {
    since: Option<i64>,
}

impl FeedCursor {
    pub fn since(&self) -> Option<i64> {
        self.since
    }

    /// Account for a received batch; empty batches leave the cursor alone
    pub fn observe(&mut self, items: &[Milestone]) {
        if let Some(newest) = items.iter().map(|m| m.created_at).max() {
            self.since = Some(newest);
        }
    }
}

/// Bounded, newest-first, id-deduplicated milestone buffer
pub struct ActivityBuffer {
    capacity: usize,
    items: VecDeque<Milestone>,
    ids: HashSet<String>,
}

impl ActivityBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            items: VecDeque::with_capacity(capacity),
            ids: HashSet::new(),
        }
    }

    /// Prepend a batch of strictly-newer items (oldest-to-newest order, as
    /// the cursor read returns them), discarding the oldest entries once the
    /// buffer exceeds its bound.
    pub fn prepend_newer(&mut self, items_ascending: Vec<Milestone>) {
        for item in items_ascending {
            if !self.ids.insert(item.id.clone()) {
                continue;
            }
            self.items.push_front(item);
        }
        while self.items.len() > self.capacity {
            if let Some(evicted) = self.items.pop_back() {
                self.ids.remove(&evicted.id);
            }
        }
    }

    /// Items newest-to-oldest
    pub fn items(&self) -> impl Iterator<Item = &Milestone> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Background poller feeding a shared [`ActivityBuffer`].
///
/// Stops cleanly when the shutdown channel flips to `true` (the viewing
/// session ended); network failures are logged and retried on the next
/// scheduled tick, never immediately.
pub struct FeedPoller {
    client: ApiClient,
    interval: Duration,
    cursor: FeedCursor,
    buffer: Arc<Mutex<ActivityBuffer>>,
}

impl FeedPoller {
    pub fn new(client: ApiClient, capacity: usize) -> Self {
        Self {
            client,
            interval: POLL_INTERVAL,
            cursor: FeedCursor::default(),
            buffer: Arc::new(Mutex::new(ActivityBuffer::new(capacity))),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Shared handle to the buffer for the rendering side
    pub fn buffer(&self) -> Arc<Mutex<ActivityBuffer>> {
        Arc::clone(&self.buffer)
    }

    /// Poll until `shutdown` flips to true
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        info!("Activity feed poller started (interval {:?})", self.interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.poll_once().await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Activity feed poller stopping");
                        return;
                    }
                }
            }
        }
    }

    /// One poll step, shared by the loop and tests
    pub async fn poll_once(&mut self) {
        match self.client.activity(self.cursor.since(), None).await {
            Ok(mut milestones) => {
                if milestones.is_empty() {
                    debug!("Feed poll: no new milestones");
                    return;
                }
                self.cursor.observe(&milestones);

                // The initial (cursorless) page arrives newest-first; cursor
                // reads arrive oldest-first. Normalize to ascending.
                milestones.sort_by_key(|m| m.created_at);

                let mut buffer = self.buffer.lock().unwrap_or_else(|e| e.into_inner());
                buffer.prepend_newer(milestones);
            }
            Err(e) => {
                // Retried on the next scheduled tick, never in a tight loop
                warn!("Feed poll failed: {}", e);
            }
        }
    }
}
