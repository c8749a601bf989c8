use chrono::{DateTime, Local, TimeZone, Utc};
use log::debug;
use std::sync::Mutex;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Time remaining until the target instant, decomposed into display units.
///
/// Components are signed: once the target passes, the decomposition goes
/// negative rather than the timer stopping. Only the view clamps for
/// display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CountdownState {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

/// Decomposes `target - now` into whole days/hours/minutes/seconds.
pub fn time_remaining(target: DateTime<Utc>, now: DateTime<Utc>) -> CountdownState {
    let delta = target - now;
    let days = delta.num_days();
    let hours = delta.num_hours() - days * 24;
    let minutes = delta.num_minutes() - delta.num_hours() * 60;
    let seconds = delta.num_seconds() - delta.num_minutes() * 60;
    CountdownState {
        days,
        hours,
        minutes,
        seconds,
    }
}

/// Midnight on January 1 of the given year, in the machine's local timezone.
pub fn new_year_target(year: i32) -> DateTime<Utc> {
    match Local.with_ymd_and_hms(year, 1, 1, 0, 0, 0).earliest() {
        Some(local) => local.with_timezone(&Utc),
        // A timezone transition exactly at local midnight; fall back to UTC.
        None => Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).unwrap(),
    }
}

/// One-second ticker reporting the remaining time, fully decoupled from the
/// network layer. The tick task is aborted on `stop` and on drop so an
/// unmounted page never leaks an interval.
pub struct CountdownClock {
    target: DateTime<Utc>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl CountdownClock {
    pub fn new(target: DateTime<Utc>) -> Self {
        Self {
            target,
            handle: Mutex::new(None),
        }
    }

    pub fn target(&self) -> DateTime<Utc> {
        self.target
    }

    /// Starts ticking, invoking `on_tick` immediately and then every
    /// 1000 ms. A previous ticker, if any, is stopped first.
    pub fn start(&self, on_tick: impl Fn(CountdownState) + Send + 'static) {
        self.stop();

        let target = self.target;
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            loop {
                interval.tick().await;
                on_tick(time_remaining(target, Utc::now()));
            }
        });

        debug!("Countdown clock started, target={}", self.target);
        *self.handle.lock().unwrap() = Some(handle);
    }

    pub fn stop(&self) {
        if let Some(handle) = self.handle.lock().unwrap().take() {
            handle.abort();
            debug!("Countdown clock stopped");
        }
    }
}

impl Drop for CountdownClock {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_two_seconds_before_midnight() {
        let target = utc(2026, 1, 1, 0, 0, 0);

        let first = time_remaining(target, utc(2025, 12, 31, 23, 59, 58));
        assert_eq!(
            first,
            CountdownState {
                days: 0,
                hours: 0,
                minutes: 0,
                seconds: 2
            }
        );

        let second = time_remaining(target, utc(2025, 12, 31, 23, 59, 59));
        assert_eq!(second.seconds, 1);
        assert_eq!((second.days, second.hours, second.minutes), (0, 0, 0));
    }

    #[test]
    fn test_full_decomposition() {
        let target = utc(2026, 1, 1, 0, 0, 0);
        let state = time_remaining(target, utc(2025, 12, 29, 21, 30, 15));
        assert_eq!(
            state,
            CountdownState {
                days: 2,
                hours: 2,
                minutes: 29,
                seconds: 45
            }
        );
    }

    #[test]
    fn test_past_target_goes_negative_without_panicking() {
        let target = utc(2026, 1, 1, 0, 0, 0);
        let state = time_remaining(target, utc(2026, 1, 1, 0, 1, 30));
        assert!(state.seconds <= 0);
        assert!(state.minutes <= 0);
        assert!(state.days <= 0);
    }

    #[test]
    fn test_exactly_at_target() {
        let target = utc(2026, 1, 1, 0, 0, 0);
        let state = time_remaining(target, target);
        assert_eq!(state, CountdownState::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_halts_the_ticker() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let clock = CountdownClock::new(utc(2026, 1, 1, 0, 0, 0));
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ticks);
        clock.start(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(2500)).await;
        let before = ticks.load(Ordering::SeqCst);
        assert!(before >= 2, "expected at least two ticks, got {}", before);

        clock.stop();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), before);
    }
}
