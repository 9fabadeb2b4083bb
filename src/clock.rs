use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use futures::stream::{self, Stream};
use tokio::time::{Instant, MissedTickBehavior};

/// Period of both the wall-clock display and the urgency evaluation.
pub const TICK: Duration = Duration::from_secs(1);

/// Source of the current local wall-clock time.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> NaiveDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Endless stream of ticks, the first one yielded immediately.
///
/// Late ticks are skipped rather than bursted, so a stalled consumer never
/// sees a backlog of stale evaluations.
pub fn ticks(period: Duration) -> impl Stream<Item = Instant> + Send {
    stream::unfold(None, move |interval: Option<tokio::time::Interval>| async move {
        let mut interval = interval.unwrap_or_else(|| {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            interval
        });
        let instant = interval.tick().await;
        Some((instant, Some(interval)))
    })
}

/// Wall clock that advances with tokio's (pausable) time.
#[cfg(test)]
#[derive(Debug, Clone)]
pub(crate) struct PausedClock {
    wall: NaiveDateTime,
    origin: Instant,
}

#[cfg(test)]
impl PausedClock {
    pub(crate) fn starting_at(wall: NaiveDateTime) -> Self {
        PausedClock {
            wall,
            origin: Instant::now(),
        }
    }
}

#[cfg(test)]
impl Clock for PausedClock {
    fn now(&self) -> NaiveDateTime {
        self.wall + (Instant::now() - self.origin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use futures::StreamExt;

    #[tokio::test(start_paused = true)]
    async fn first_tick_is_immediate() {
        let start = Instant::now();
        let stamps: Vec<Instant> = ticks(TICK).take(3).collect().await;

        assert_eq!(stamps[0], start);
        assert_eq!(stamps[1] - start, Duration::from_secs(1));
        assert_eq!(stamps[2] - start, Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn paused_clock_follows_tokio_time() {
        let wall = NaiveDate::from_ymd_opt(2026, 10, 16)
            .unwrap()
            .and_hms_opt(4, 50, 0)
            .unwrap();
        let clock = PausedClock::starting_at(wall);

        tokio::time::sleep(Duration::from_secs(90)).await;
        assert_eq!(clock.now(), wall + Duration::from_secs(90));
    }
}
