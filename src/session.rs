use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::NaiveDate;
use tokio::sync::{Mutex, watch};
use tracing::{debug, error, info};

use crate::error::AppError;
use crate::timings::{Location, TimingsSnapshot, TimingsSource};

struct Applied {
    seq: u64,
    location: Location,
}

/// What happened to a response once it arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The response became the current location and snapshot.
    Applied,
    /// Something newer had been applied first, so the response was dropped.
    Discarded,
}

/// Holds the current location and the current day's snapshot.
///
/// Both are replaced whole. Location switches are numbered as they start
/// and a response is only applied if nothing newer has been applied before
/// it, so a slow stale request can never overwrite a fresher one. A refresh
/// takes no number of its own: it only lands if the location it read is
/// still the applied one.
pub struct Session {
    next_seq: AtomicU64,
    applied: Mutex<Applied>,
    snapshot: watch::Sender<Option<Arc<TimingsSnapshot>>>,
}

impl Session {
    pub fn new(location: Location) -> Self {
        let (snapshot, _) = watch::channel(None);
        Session {
            next_seq: AtomicU64::new(0),
            applied: Mutex::new(Applied { seq: 0, location }),
            snapshot,
        }
    }

    /// Receiver that observes every applied snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<TimingsSnapshot>>> {
        self.snapshot.subscribe()
    }

    pub fn snapshot(&self) -> Option<Arc<TimingsSnapshot>> {
        self.snapshot.borrow().clone()
    }

    pub async fn location(&self) -> Location {
        self.applied.lock().await.location.clone()
    }

    /// True when there is no snapshot or it belongs to another day.
    pub fn is_stale(&self, today: NaiveDate) -> bool {
        self.snapshot
            .borrow()
            .as_ref()
            .is_none_or(|snapshot| !snapshot.is_valid_on(today))
    }

    /// Re-fetches for the current location.
    ///
    /// Dropped if a switch to another location is applied while the
    /// request is in flight.
    pub async fn refresh<S: TimingsSource>(&self, source: &S) -> Result<FetchOutcome, AppError> {
        let (base, location) = {
            let applied = self.applied.lock().await;
            (applied.seq, applied.location.clone())
        };
        debug!(base, %location, "Refresh started");

        let result = source.fetch(&location).await;

        let applied = self.applied.lock().await;
        if applied.seq != base {
            debug!(
                base,
                applied = applied.seq,
                "Discarding refresh, the location changed meanwhile"
            );
            return Ok(FetchOutcome::Discarded);
        }

        match result {
            Ok(snapshot) => {
                info!(%location, date = %snapshot.fetched_for, "Timings refreshed");
                self.snapshot.send_replace(Some(Arc::new(snapshot)));
                Ok(FetchOutcome::Applied)
            }
            Err(e) => {
                error!(%location, "Keeping previous timings: {}", e);
                Err(e)
            }
        }
    }

    /// Fetches timings for `location` and, if this is still the newest
    /// request to finish, makes both the current ones.
    ///
    /// On failure the previous snapshot stays in place.
    pub async fn fetch<S: TimingsSource>(
        &self,
        source: &S,
        location: Location,
    ) -> Result<FetchOutcome, AppError> {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(seq, %location, "Fetch started");

        let result = source.fetch(&location).await;

        let mut applied = self.applied.lock().await;
        if seq < applied.seq {
            debug!(
                seq,
                applied = applied.seq,
                "Discarding response older than the applied one"
            );
            return Ok(FetchOutcome::Discarded);
        }

        match result {
            Ok(snapshot) => {
                info!(seq, %location, date = %snapshot.fetched_for, "Timings applied");
                applied.seq = seq;
                applied.location = location;
                self.snapshot.send_replace(Some(Arc::new(snapshot)));
                Ok(FetchOutcome::Applied)
            }
            Err(e) => {
                error!(seq, %location, "Keeping previous timings: {}", e);
                Err(e)
            }
        }
    }
}
