//! Last-two-minutes urgency detection before Sehri ends (Fajr) and Iftar
//! starts (Maghrib).
//!
//! Anchors are always "today at HH:MM" on the calendar day of the instant
//! being evaluated. They never roll over to the next day: once Maghrib has
//! passed nothing fires until a fresh snapshot arrives and the next Fajr is
//! reached on its own day.

use std::pin::pin;
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDateTime, NaiveTime};
use futures::StreamExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::clock::{self, Clock, TICK};
use crate::time_format;
use crate::timings::{Timings, TimingsSnapshot};

/// Length of the window before an anchor during which the banner shows.
pub const URGENCY_WINDOW: Duration = Duration::from_secs(120);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrgencyKind {
    SehriEnd,
    IftarStart,
}

impl UrgencyKind {
    pub fn headline(&self) -> &'static str {
        match self {
            UrgencyKind::SehriEnd => "Sehri ends in",
            UrgencyKind::IftarStart => "Iftar time in",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UrgencyStatus {
    #[default]
    Clear,
    Approaching {
        kind: UrgencyKind,
        /// Strictly positive and at most [`URGENCY_WINDOW`]
        remaining: Duration,
    },
}

/// `m:ss`, e.g. `1:05` or `0:12`. Sub-second remainders are floored.
pub fn format_remaining(remaining: Duration) -> String {
    let millis = remaining.as_millis();
    let minutes = (millis % 3_600_000) / 60_000;
    let seconds = (millis % 60_000) / 1_000;
    format!("{minutes}:{seconds:02}")
}

/// Parsed Fajr and Maghrib. An anchor that failed to parse is `None` and
/// never fires.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Anchors {
    pub sehri: Option<NaiveTime>,
    pub iftar: Option<NaiveTime>,
}

impl Anchors {
    pub fn from_timings(timings: &Timings) -> Self {
        Anchors {
            sehri: parse_anchor("Fajr", &timings.fajr),
            iftar: parse_anchor("Maghrib", &timings.maghrib),
        }
    }
}

fn parse_anchor(name: &str, raw: &str) -> Option<NaiveTime> {
    match time_format::parse(raw).and_then(|time| time.to_naive_time()) {
        Ok(time) => Some(time),
        Err(e) => {
            warn!("Ignoring {} anchor for the countdown: {}", name, e);
            None
        }
    }
}

/// Status at `now`. Sehri is checked first and wins if both windows are open.
pub fn evaluate(anchors: &Anchors, now: NaiveDateTime) -> UrgencyStatus {
    [
        (anchors.sehri, UrgencyKind::SehriEnd),
        (anchors.iftar, UrgencyKind::IftarStart),
    ]
    .into_iter()
    .find_map(|(anchor, kind)| {
        time_until(anchor?, now).map(|remaining| UrgencyStatus::Approaching { kind, remaining })
    })
    .unwrap_or(UrgencyStatus::Clear)
}

fn time_until(anchor: NaiveTime, now: NaiveDateTime) -> Option<Duration> {
    let target = now.date().and_time(anchor);
    // Negative differences fail the conversion
    let remaining = (target - now).to_std().ok()?;
    (!remaining.is_zero() && remaining <= URGENCY_WINDOW).then_some(remaining)
}

/// Background task re-evaluating the urgency status every second for as
/// long as a snapshot is present.
///
/// The task follows the snapshot channel: `None` idles it with the status
/// forced to `Clear`, and every new snapshot re-arms it with fresh anchors
/// and an immediate evaluation. Dropping the engine stops the task.
#[derive(Debug)]
pub struct CountdownEngine {
    status: watch::Receiver<UrgencyStatus>,
    task: JoinHandle<()>,
}

impl CountdownEngine {
    pub fn spawn<C: Clock>(
        snapshots: watch::Receiver<Option<Arc<TimingsSnapshot>>>,
        clock: C,
    ) -> Self {
        let (tx, rx) = watch::channel(UrgencyStatus::Clear);
        let task = tokio::spawn(run(snapshots, clock, tx));
        CountdownEngine { status: rx, task }
    }

    pub fn status(&self) -> UrgencyStatus {
        *self.status.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<UrgencyStatus> {
        self.status.clone()
    }
}

impl Drop for CountdownEngine {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run<C: Clock>(
    mut snapshots: watch::Receiver<Option<Arc<TimingsSnapshot>>>,
    clock: C,
    status: watch::Sender<UrgencyStatus>,
) {
    loop {
        let snapshot = snapshots.borrow_and_update().clone();
        let changed = match snapshot {
            None => {
                debug!("Countdown idle");
                publish(&status, UrgencyStatus::Clear);
                snapshots.changed().await
            }
            Some(snapshot) => {
                let anchors = Anchors::from_timings(&snapshot.timings);
                debug!(?anchors, "Countdown armed");
                tick_until_changed(&anchors, &clock, &status, &mut snapshots).await
            }
        };

        if changed.is_err() {
            debug!("Snapshot source closed, countdown stopped");
            publish(&status, UrgencyStatus::Clear);
            return;
        }
    }
}

async fn tick_until_changed<C: Clock>(
    anchors: &Anchors,
    clock: &C,
    status: &watch::Sender<UrgencyStatus>,
    snapshots: &mut watch::Receiver<Option<Arc<TimingsSnapshot>>>,
) -> Result<(), watch::error::RecvError> {
    let mut ticks = pin!(clock::ticks(TICK));
    loop {
        tokio::select! {
            biased;
            changed = snapshots.changed() => return changed,
            Some(_) = ticks.next() => publish(status, evaluate(anchors, clock.now())),
        }
    }
}

fn publish(status: &watch::Sender<UrgencyStatus>, next: UrgencyStatus) {
    status.send_if_modified(|current| {
        if *current == next {
            return false;
        }
        match (*current, next) {
            (UrgencyStatus::Clear, UrgencyStatus::Approaching { kind, remaining }) => {
                info!("{} {}", kind.headline(), format_remaining(remaining));
            }
            (UrgencyStatus::Approaching { kind, .. }, UrgencyStatus::Clear) => {
                info!(?kind, "Urgency window closed");
            }
            _ => {}
        }
        *current = next;
        true
    });
}
