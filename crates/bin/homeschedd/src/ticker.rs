//! Minute-aligned ticker that drives the scheduler.
//!
//! Tasks fire on an exact `HH:MM` match, so the ticker wakes just after every
//! wall-clock minute boundary and calls [`Scheduler::tick`] once per minute.
//! A minute that was already ticked is never ticked again; a minute missed
//! because the process was busy or asleep is not caught up.

use std::future::Future;
use std::time::Duration;

use chrono::Timelike;
use homesched_app::ports::{DeviceRepository, TaskRepository};
use homesched_app::scheduler::Scheduler;
use homesched_domain::time::TimeOfDay;

/// Delay after the boundary so the clock reads the new minute on wake-up.
const BOUNDARY_SLACK: Duration = Duration::from_millis(20);

/// Remembers the last minute handed to the scheduler.
#[derive(Debug, Default)]
pub struct Ticker {
    last: Option<TimeOfDay>,
}

impl Ticker {
    /// Return `now` if this minute has not been ticked yet, recording it.
    pub fn claim(&mut self, now: TimeOfDay) -> Option<TimeOfDay> {
        if self.last == Some(now) {
            return None;
        }
        self.last = Some(now);
        Some(now)
    }
}

/// Time left until the next minute boundary, plus a little slack.
#[must_use]
pub fn until_next_minute<T: Timelike>(now: &T) -> Duration {
    // nanosecond() exceeds 1e9 during a leap second
    let nanos = now.nanosecond().min(999_999_999);
    let elapsed =
        Duration::from_secs(u64::from(now.second())) + Duration::from_nanos(u64::from(nanos));
    Duration::from_secs(60).saturating_sub(elapsed) + BOUNDARY_SLACK
}

/// Tick every minute boundary until `shutdown` resolves.
///
/// With `tick_on_startup` the minute the daemon starts in is ticked right
/// away; otherwise the first tick is at the next boundary.
pub async fn run<DR, TR>(
    scheduler: &Scheduler<DR, TR>,
    tick_on_startup: bool,
    shutdown: impl Future<Output = ()>,
) where
    DR: DeviceRepository,
    TR: TaskRepository,
{
    let mut ticker = Ticker::default();
    if !tick_on_startup {
        ticker.claim(homesched_domain::time::now());
    }
    tokio::pin!(shutdown);

    loop {
        if let Some(now) = ticker.claim(homesched_domain::time::now()) {
            match scheduler.tick(now).await {
                Ok(report) if !report.is_empty() => {
                    tracing::info!(
                        now = %now,
                        attempted = report.attempted(),
                        skipped = report.skipped.len(),
                        failed = report.failed.len(),
                        "tick complete"
                    );
                }
                Ok(_) => {}
                Err(err) => tracing::error!(now = %now, error = %err, "tick failed"),
            }
        }

        let delay = until_next_minute(&chrono::Local::now());
        tokio::select! {
            () = tokio::time::sleep(delay) => {}
            () = &mut shutdown => break,
        }
    }
}
