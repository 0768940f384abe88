//! Session-scoped timer state with countdown scheduling

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
    time::{Duration, Instant},
};
use tokio::{sync::watch, task::AbortHandle};
use tracing::{debug, info, warn};

use super::{
    registry::{TickOutcome, TimerRegistry, Transition},
    timer::{Timer, TimerId, TimerStatus},
};
use crate::{
    error::ParseDurationError,
    services::Notifier,
    tasks::{countdown_task, reversion_task},
};

/// Delay between completion and the automatic return to idle
pub const DEFAULT_HOLD_PERIOD: Duration = Duration::from_secs(10);

/// Interval between countdown ticks
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_secs(1);

/// Timing and seeding parameters for a session
#[derive(Debug, Clone, Copy)]
pub struct TimerSettings {
    /// Length of the seeded timer and of timers created without a value
    pub default_seconds: f64,
    pub hold_period: Duration,
    pub tick_period: Duration,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            default_seconds: 300.0,
            hold_period: DEFAULT_HOLD_PERIOD,
            tick_period: DEFAULT_TICK_PERIOD,
        }
    }
}

/// A spawned task tagged with the epoch it was started under
#[derive(Debug)]
struct Scheduled {
    epoch: u64,
    handle: AbortHandle,
}

#[derive(Debug, Default)]
struct Inner {
    registry: TimerRegistry,
    /// At most one live countdown per timer
    countdowns: HashMap<TimerId, Scheduled>,
    /// Pending finished -> idle transitions
    reversions: HashMap<TimerId, Scheduled>,
    next_epoch: u64,
}

impl Inner {
    fn next_epoch(&mut self) -> u64 {
        self.next_epoch += 1;
        self.next_epoch
    }

    fn cancel_countdown(&mut self, id: TimerId) {
        if let Some(countdown) = self.countdowns.remove(&id) {
            debug!("Cancelling countdown for timer {} (epoch {})", id, countdown.epoch);
            countdown.handle.abort();
        }
    }

    fn cancel_reversion(&mut self, id: TimerId) {
        if let Some(reversion) = self.reversions.remove(&id) {
            debug!("Cancelling pending reversion for timer {} (epoch {})", id, reversion.epoch);
            reversion.handle.abort();
        }
    }
}

/// Owned timer registry for one application session.
///
/// Every mutation goes through a single lock, so countdown callbacks and
/// user actions are applied one at a time. Starting, stopping or deleting a
/// timer must happen inside a tokio runtime since it spawns or aborts tasks.
pub struct AppState {
    inner: Mutex<Inner>,
    notifier: Arc<dyn Notifier>,
    settings: TimerSettings,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Ordered snapshot published after every change
    snapshot_tx: watch::Sender<Vec<Timer>>,
    /// Keep the receiver alive to prevent channel closure
    _snapshot_rx: watch::Receiver<Vec<Timer>>,
}

impl AppState {
    /// Create the session state with the default "main" timer seeded
    pub fn new(port: u16, host: String, settings: TimerSettings, notifier: Arc<dyn Notifier>) -> Self {
        let registry = TimerRegistry::seeded(settings.default_seconds);
        let (snapshot_tx, snapshot_rx) = watch::channel(registry.ordered());

        Self {
            inner: Mutex::new(Inner {
                registry,
                ..Inner::default()
            }),
            notifier,
            settings,
            start_time: Instant::now(),
            port,
            host,
            snapshot_tx,
            _snapshot_rx: snapshot_rx,
        }
    }

    pub fn settings(&self) -> TimerSettings {
        self.settings
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| {
            warn!("Timer state lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn publish(&self, inner: &Inner) {
        if let Err(e) = self.snapshot_tx.send(inner.registry.ordered()) {
            warn!("Failed to publish timer snapshot: {}", e);
        }
    }

    /// Watch the ordered list of timers
    pub fn subscribe(&self) -> watch::Receiver<Vec<Timer>> {
        self.snapshot_tx.subscribe()
    }

    /// Timers in display order
    pub fn timers(&self) -> Vec<Timer> {
        self.lock().registry.ordered()
    }

    pub fn get(&self, id: TimerId) -> Option<Timer> {
        self.lock().registry.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().registry.is_empty()
    }

    /// Whether a countdown task is registered for the timer
    pub fn has_countdown(&self, id: TimerId) -> bool {
        self.lock().countdowns.contains_key(&id)
    }

    /// Whether a finished -> idle transition is pending for the timer
    pub fn has_pending_reversion(&self, id: TimerId) -> bool {
        self.lock().reversions.contains_key(&id)
    }

    /// Add an idle timer. Without a name one is derived from the count,
    /// without a value the configured default length is used.
    pub fn create(&self, name: Option<&str>, initial_seconds: Option<f64>) -> Timer {
        let mut inner = self.lock();
        let name = match name.map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("Timer {}", inner.registry.len() + 1),
        };
        let seconds = initial_seconds.unwrap_or(self.settings.default_seconds);
        let id = inner.registry.create(&name, seconds);
        self.publish(&inner);

        match inner.registry.get(id) {
            Some(timer) => timer.clone(),
            None => Timer::new(id, name, seconds),
        }
    }

    /// Start, pause or resume depending on the current status
    pub fn toggle(self: &Arc<Self>, id: TimerId) -> Transition {
        let mut inner = self.lock();
        let transition = inner.registry.toggle(id);
        match transition {
            Transition::Started => self.begin_countdown(&mut inner, id),
            Transition::Resumed if !inner.countdowns.contains_key(&id) => {
                self.begin_countdown(&mut inner, id)
            }
            _ => {}
        }
        if transition != Transition::Ignored {
            self.publish(&inner);
        }
        transition
    }

    /// Start counting down, replacing any countdown already in progress
    pub fn start(self: &Arc<Self>, id: TimerId) -> bool {
        let mut inner = self.lock();
        if !inner.registry.start(id) {
            return false;
        }
        self.begin_countdown(&mut inner, id);
        self.publish(&inner);
        true
    }

    /// Freeze the countdown. The task stays alive but stops decrementing.
    pub fn pause(&self, id: TimerId) -> bool {
        let mut inner = self.lock();
        let paused = inner.registry.pause(id);
        if paused {
            self.publish(&inner);
        }
        paused
    }

    pub fn resume(self: &Arc<Self>, id: TimerId) -> bool {
        let mut inner = self.lock();
        if !inner.registry.resume(id) {
            return false;
        }
        if !inner.countdowns.contains_key(&id) {
            self.begin_countdown(&mut inner, id);
        }
        self.publish(&inner);
        true
    }

    /// Advance a running timer by one tick outside of its countdown task
    pub fn tick(self: &Arc<Self>, id: TimerId) -> TickOutcome {
        let outcome = self.apply_tick(&mut self.lock(), id);
        self.notify_completion(outcome);
        outcome
    }

    /// Called by a countdown task each period. Returns false once the task
    /// should exit.
    pub(crate) fn advance(self: &Arc<Self>, id: TimerId, epoch: u64) -> bool {
        let (outcome, keep_going) = {
            let mut inner = self.lock();
            let current = inner.countdowns.get(&id).is_some_and(|c| c.epoch == epoch);
            if !current {
                debug!("Stale countdown for timer {} (epoch {}) exiting", id, epoch);
                return false;
            }

            let outcome = self.apply_tick(&mut inner, id);
            let keep_going = match outcome {
                TickOutcome::Finished { .. } => false,
                TickOutcome::Counting { .. } => true,
                // Paused timers keep their countdown task
                TickOutcome::Ignored => inner.registry.contains(id),
            };
            (outcome, keep_going)
        };

        self.notify_completion(outcome);
        keep_going
    }

    // Fire-and-forget, outside the lock; a failing notifier never touches timer state
    fn notify_completion(&self, outcome: TickOutcome) {
        if let TickOutcome::Finished { duration } = outcome {
            self.notifier.notify(Some(duration));
        }
    }

    fn apply_tick(self: &Arc<Self>, inner: &mut Inner, id: TimerId) -> TickOutcome {
        let outcome = inner.registry.tick(id);
        match outcome {
            TickOutcome::Ignored => return outcome,
            TickOutcome::Counting { .. } => {}
            TickOutcome::Finished { duration } => {
                inner.cancel_countdown(id);
                debug!("Timer {} completed a {}s run", id, duration);
                self.begin_hold(inner, id);
            }
        }
        self.publish(inner);
        outcome
    }

    /// Cancel the countdown and mark the timer finished.
    ///
    /// Only running or paused timers can be stopped.
    pub fn stop(self: &Arc<Self>, id: TimerId) -> bool {
        let mut inner = self.lock();
        let stoppable = matches!(
            inner.registry.get(id).map(|t| t.status),
            Some(TimerStatus::Running | TimerStatus::Paused)
        );
        if !stoppable {
            return false;
        }

        inner.cancel_countdown(id);
        inner.registry.finish(id);
        self.begin_hold(&mut inner, id);
        self.publish(&inner);
        true
    }

    /// Called by a reversion task once the hold period has elapsed
    pub(crate) fn end_hold(&self, id: TimerId, epoch: u64) -> bool {
        let mut inner = self.lock();
        let current = inner.reversions.get(&id).is_some_and(|r| r.epoch == epoch);
        if !current {
            debug!("Stale reversion for timer {} (epoch {}) ignored", id, epoch);
            return false;
        }
        inner.reversions.remove(&id);

        let reverted = inner.registry.revert(id);
        if reverted {
            self.publish(&inner);
        }
        reverted
    }

    /// Set a new length in seconds; refused while running
    pub fn edit(&self, id: TimerId, new_seconds: f64) -> bool {
        let mut inner = self.lock();
        let edited = inner.registry.edit(id, new_seconds);
        if edited {
            self.settle_after_edit(&mut inner, id);
        }
        edited
    }

    /// Set a new length typed as minutes or `mm:ss`
    pub fn edit_text(&self, id: TimerId, text: &str) -> Result<bool, ParseDurationError> {
        let mut inner = self.lock();
        let edited = inner.registry.edit_text(id, text).map_err(|e| {
            info!("Rejected input {:?} for timer {}: {}", text, id, e);
            e
        })?;
        if edited {
            self.settle_after_edit(&mut inner, id);
        }
        Ok(edited)
    }

    // An edit can drop a paused timer back to idle; its countdown goes with it
    fn settle_after_edit(&self, inner: &mut Inner, id: TimerId) {
        if inner.registry.get(id).is_some_and(|t| t.status != TimerStatus::Paused) {
            inner.cancel_countdown(id);
        }
        self.publish(inner);
    }

    /// Remove a timer and everything scheduled for it; the last timer stays
    pub fn delete(&self, id: TimerId) -> bool {
        let mut inner = self.lock();
        if !inner.registry.delete(id) {
            return false;
        }
        inner.cancel_countdown(id);
        inner.cancel_reversion(id);
        self.publish(&inner);
        true
    }

    pub fn rename(&self, id: TimerId, name: &str) -> bool {
        let mut inner = self.lock();
        let renamed = inner.registry.rename(id, name);
        if renamed {
            self.publish(&inner);
        }
        renamed
    }

    pub fn set_hovered(&self, id: TimerId, hovered: bool) -> bool {
        let mut inner = self.lock();
        let changed = inner.registry.set_hovered(id, hovered);
        if changed {
            self.publish(&inner);
        }
        changed
    }

    /// Abort every countdown and pending reversion
    pub fn shutdown(&self) {
        let mut inner = self.lock();
        let ids: Vec<TimerId> = inner
            .countdowns
            .keys()
            .chain(inner.reversions.keys())
            .copied()
            .collect();
        for id in ids {
            inner.cancel_countdown(id);
            inner.cancel_reversion(id);
        }
        info!("All timer tasks cancelled");
    }

    fn begin_countdown(self: &Arc<Self>, inner: &mut Inner, id: TimerId) {
        inner.cancel_countdown(id);
        inner.cancel_reversion(id);

        let epoch = inner.next_epoch();
        let handle = tokio::spawn(countdown_task(
            Arc::downgrade(self),
            id,
            epoch,
            self.settings.tick_period,
        ))
        .abort_handle();
        inner.countdowns.insert(id, Scheduled { epoch, handle });
    }

    fn begin_hold(self: &Arc<Self>, inner: &mut Inner, id: TimerId) {
        inner.cancel_reversion(id);

        let epoch = inner.next_epoch();
        let handle = tokio::spawn(reversion_task(
            Arc::downgrade(self),
            id,
            epoch,
            self.settings.hold_period,
        ))
        .abort_handle();
        inner.reversions.insert(id, Scheduled { epoch, handle });
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::LogNotifier;

    fn state() -> AppState {
        AppState::new(0, "127.0.0.1".to_string(), TimerSettings::default(), Arc::new(LogNotifier))
    }

    #[test]
    fn session_starts_with_main_timer() {
        let state = state();
        let timers = state.timers();
        assert_eq!(timers.len(), 1);
        assert_eq!(timers[0].name, "main");
        assert_eq!(timers[0].remaining, 300.0);
    }

    #[test]
    fn create_names_and_defaults() {
        let state = state();
        let timer = state.create(None, None);
        assert_eq!(timer.name, "Timer 2");
        assert_eq!(timer.remaining, 300.0);

        let named = state.create(Some(" tea "), Some(180.0));
        assert_eq!(named.name, "tea");
        assert_eq!(named.duration, 180.0);
        assert_eq!(state.len(), 3);
    }

    #[test]
    fn snapshot_follows_mutations() {
        let state = state();
        let rx = state.subscribe();
        let id = state.create(Some("tea"), Some(60.0)).id;
        assert_eq!(rx.borrow().len(), 2);

        state.edit(id, 90.0);
        assert_eq!(rx.borrow().iter().find(|t| t.id == id).unwrap().remaining, 90.0);

        state.delete(id);
        assert_eq!(rx.borrow().len(), 1);
    }

    #[test]
    fn delete_keeps_last_timer() {
        let state = state();
        let main = state.timers()[0].id;
        assert!(!state.delete(main));
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn rejected_input_keeps_value() {
        let state = state();
        let id = state.timers()[0].id;
        assert!(state.edit_text(id, "1:2:3").is_err());
        assert_eq!(state.get(id).unwrap().remaining, 300.0);
        assert_eq!(state.edit_text(id, "2"), Ok(true));
        assert_eq!(state.get(id).unwrap().remaining, 120.0);
    }

    #[test]
    fn stop_requires_active_timer() {
        let state = Arc::new(state());
        let id = state.timers()[0].id;
        assert!(!state.stop(id));
        assert_eq!(state.get(id).unwrap().status, TimerStatus::Idle);
    }
}
