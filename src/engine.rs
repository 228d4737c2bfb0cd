use crate::notifier::Notifier;
use crate::store::{SessionStore, StoreKey};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::warn;

pub const DEFAULT_WORK_MINUTES: u64 = 25;

/// Largest configurable work duration; more minutes than this cannot be
/// represented as a `Duration` of whole seconds.
pub const MAX_WORK_MINUTES: u64 = u64::MAX / 60;

/// Message carried on every break-due channel (OS alert, bell, toast).
pub const BREAK_MESSAGE: &str = "Time for a break!";

/// Phase of the timer, derived from the session timestamp and the wall
/// clock rather than stored. `Overdue` is `Running` past the threshold.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Stopped,
    Running,
    Overdue,
}

/// Snapshot of a session handed back by `stop`, consumed by the history log.
#[derive(Clone, Copy, Debug)]
pub struct SessionSummary {
    pub started_at: SystemTime,
    pub elapsed: Duration,
    pub work_duration: Duration,
    pub overdue: Option<Duration>,
}

/// The timer state machine.
///
/// A session exists exactly while `started_at` is set. Elapsed time is
/// always `now - started_at`; nothing here accumulates across ticks, which
/// is what makes the machine survive restarts and suspends. The break-due
/// signal fires at most once per session, guarded by `notified`.
///
/// Every persistence call is best-effort: a failing store costs durability
/// across restarts, never the in-memory machine.
#[derive(Debug)]
pub struct TimerEngine<S: SessionStore, N: Notifier> {
    store: S,
    notifier: N,
    started_at: Option<SystemTime>,
    work_duration: Duration,
    notified: bool,
}

impl<S: SessionStore, N: Notifier> TimerEngine<S, N> {
    /// Builds the engine from whatever the store remembers. A persisted
    /// start timestamp resumes the session with that timestamp as the
    /// authoritative origin; the first tick may land straight in `Overdue`.
    ///
    /// A resumed session is always re-armed: reloading while already
    /// overdue notifies again. See DESIGN.md for the rationale.
    pub fn load(store: S, notifier: N) -> Self {
        let work_duration = store
            .get(StoreKey::Work)
            .filter(|minutes| *minutes > 0)
            .and_then(minutes_to_duration)
            .unwrap_or(Duration::from_secs(DEFAULT_WORK_MINUTES * 60));

        let started_at = store
            .get(StoreKey::Start)
            .filter(|ms| *ms > 0)
            .map(|ms| UNIX_EPOCH + Duration::from_millis(ms));

        Self {
            store,
            notifier,
            started_at,
            work_duration,
            notified: false,
        }
    }

    /// Like `load`, but discards any persisted session so the engine comes
    /// up stopped. The configured work duration is kept.
    pub fn fresh(store: S, notifier: N) -> Self {
        let mut engine = Self::load(store, notifier);
        if engine.started_at.take().is_some() {
            if let Err(err) = engine.store.remove(StoreKey::Start) {
                warn!(error = %err, "failed to discard persisted session start");
            }
        }
        engine
    }

    pub fn start(&mut self) {
        self.start_at(SystemTime::now());
    }

    /// Begins a session at `now`. No-op while a session exists, so a
    /// double-pressed start key cannot move the origin.
    pub fn start_at(&mut self, now: SystemTime) {
        if self.started_at.is_some() {
            return;
        }

        self.notified = false;
        self.notifier.request_permission();
        self.started_at = Some(now);

        if let Err(err) = self.store.set(StoreKey::Start, epoch_ms(now)) {
            warn!(error = %err, "failed to persist session start; continuing in memory");
        }
    }

    pub fn stop(&mut self) -> Option<SessionSummary> {
        self.stop_at(SystemTime::now())
    }

    /// Ends the session, clearing the persisted start. Returns a summary
    /// for the history log, or `None` when already stopped.
    pub fn stop_at(&mut self, now: SystemTime) -> Option<SessionSummary> {
        let started_at = self.started_at.take()?;
        self.notified = false;

        if let Err(err) = self.store.remove(StoreKey::Start) {
            warn!(error = %err, "failed to clear persisted session start");
        }

        let elapsed = now.duration_since(started_at).unwrap_or_default();
        Some(SessionSummary {
            started_at,
            elapsed,
            work_duration: self.work_duration,
            overdue: elapsed.checked_sub(self.work_duration),
        })
    }

    /// Applies user input for the work duration. Empty, non-numeric and
    /// zero input is rejected without touching the prior value; the bool
    /// only tells the caller whether its entry field should reset.
    pub fn set_work_duration_input(&mut self, input: &str) -> bool {
        match input.trim().parse::<u64>() {
            Ok(minutes) if minutes > 0 => self.set_work_minutes(minutes),
            _ => false,
        }
    }

    /// Sets and persists the work duration, independent of running state.
    /// An already-overdue session stays overdue; a running session's
    /// threshold moves for its next tick. Zero and minute counts beyond
    /// `MAX_WORK_MINUTES` are rejected like any other invalid input.
    pub fn set_work_minutes(&mut self, minutes: u64) -> bool {
        if minutes == 0 {
            return false;
        }
        let Some(duration) = minutes_to_duration(minutes) else {
            return false;
        };

        self.work_duration = duration;
        if let Err(err) = self.store.set(StoreKey::Work, minutes) {
            warn!(error = %err, "failed to persist work duration; continuing in memory");
        }
        true
    }

    pub fn tick(&mut self) -> bool {
        self.tick_at(SystemTime::now())
    }

    /// Periodic recomputation. The only place the break-due signal can
    /// fire; returns whether it fired on this tick so the caller can raise
    /// its own visual channel. Safe to call with no session and safe to
    /// call redundantly for the same `now`.
    pub fn tick_at(&mut self, now: SystemTime) -> bool {
        let Some(started_at) = self.started_at else {
            return false;
        };

        let elapsed = now.duration_since(started_at).unwrap_or_default();
        if !self.notified && elapsed >= self.work_duration {
            self.notified = true;
            self.notifier.notify(BREAK_MESSAGE);
            return true;
        }

        false
    }

    pub fn phase_at(&self, now: SystemTime) -> Phase {
        match self.elapsed_at(now) {
            None => Phase::Stopped,
            Some(elapsed) if elapsed >= self.work_duration => Phase::Overdue,
            Some(_) => Phase::Running,
        }
    }

    /// Time since the session origin. A clock that went backwards clamps
    /// to zero rather than erroring; it will sort itself out on a later
    /// tick.
    pub fn elapsed_at(&self, now: SystemTime) -> Option<Duration> {
        self.started_at
            .map(|started| now.duration_since(started).unwrap_or_default())
    }

    /// Time past the threshold, present only once overdue.
    pub fn overdue_at(&self, now: SystemTime) -> Option<Duration> {
        self.elapsed_at(now)?.checked_sub(self.work_duration)
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn started_at(&self) -> Option<SystemTime> {
        self.started_at
    }

    pub fn work_minutes(&self) -> u64 {
        self.work_duration.as_secs() / 60
    }

    pub fn has_notified(&self) -> bool {
        self.notified
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }
}

fn minutes_to_duration(minutes: u64) -> Option<Duration> {
    minutes.checked_mul(60).map(Duration::from_secs)
}

fn epoch_ms(t: SystemTime) -> u64 {
    t.duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
