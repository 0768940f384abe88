//! In-memory timer registry and its state machine
//!
//! The registry is purely synchronous: it never schedules anything itself.
//! [`AppState`](super::AppState) drives it from countdown and reversion tasks.

use std::collections::HashMap;
use tracing::{debug, info};

use super::timer::{Timer, TimerId, TimerStatus};
use crate::{error::ParseDurationError, utils::parse_duration};

/// Name given to the timer seeded when the registry is first presented
pub const DEFAULT_TIMER_NAME: &str = "main";

/// Result of a user-facing transition request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Started,
    Paused,
    Resumed,
    Ignored,
}

/// Result of a single countdown tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Timer missing or not running
    Ignored,
    Counting { remaining: f64 },
    /// Remaining reached zero; carries the run length for the alert
    Finished { duration: f64 },
}

#[derive(Debug, Default)]
pub struct TimerRegistry {
    timers: HashMap<TimerId, Timer>,
    next_id: TimerId,
}

impl TimerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the default "main" timer
    pub fn seeded(initial_seconds: f64) -> Self {
        let mut registry = Self::new();
        registry.create(DEFAULT_TIMER_NAME, initial_seconds);
        registry
    }

    /// Insert a new idle timer and return its id
    pub fn create(&mut self, name: &str, initial_seconds: f64) -> TimerId {
        self.next_id += 1;
        let id = self.next_id;
        let timer = Timer::new(id, name.to_string(), initial_seconds);
        info!("Created timer {} ({:?}) with {}s", id, timer.name, timer.remaining);
        self.timers.insert(id, timer);
        id
    }

    pub fn get(&self, id: TimerId) -> Option<&Timer> {
        self.timers.get(&id)
    }

    pub fn contains(&self, id: TimerId) -> bool {
        self.timers.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Timers in display order: ascending creation time, ties by id
    pub fn ordered(&self) -> Vec<Timer> {
        let mut timers: Vec<Timer> = self.timers.values().cloned().collect();
        timers.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        timers
    }

    /// Dispatch on the current status: idle starts, running pauses,
    /// paused resumes, finished is left alone.
    pub fn toggle(&mut self, id: TimerId) -> Transition {
        let Some(status) = self.get(id).map(|t| t.status) else {
            return Transition::Ignored;
        };

        let applied = match status {
            TimerStatus::Idle => self.start(id).then_some(Transition::Started),
            TimerStatus::Running => self.pause(id).then_some(Transition::Paused),
            TimerStatus::Paused => self.resume(id).then_some(Transition::Resumed),
            TimerStatus::Finished => None,
        };
        applied.unwrap_or(Transition::Ignored)
    }

    /// Mark the timer running and snapshot its run length.
    ///
    /// Refused when there is nothing left to count down.
    pub fn start(&mut self, id: TimerId) -> bool {
        let Some(timer) = self.timers.get_mut(&id) else {
            return false;
        };
        if !timer.has_time_left() {
            debug!("Timer {} has no time left, not starting", id);
            return false;
        }

        timer.status = TimerStatus::Running;
        timer.duration = timer.remaining;
        info!("Timer {} started for {}s", id, timer.duration);
        true
    }

    pub fn pause(&mut self, id: TimerId) -> bool {
        match self.timers.get_mut(&id) {
            Some(timer) if timer.is_running() && timer.has_time_left() => {
                timer.status = TimerStatus::Paused;
                info!("Timer {} paused at {}s", id, timer.remaining);
                true
            }
            _ => false,
        }
    }

    pub fn resume(&mut self, id: TimerId) -> bool {
        match self.timers.get_mut(&id) {
            Some(timer) if timer.status == TimerStatus::Paused && timer.has_time_left() => {
                timer.status = TimerStatus::Running;
                info!("Timer {} resumed at {}s", id, timer.remaining);
                true
            }
            _ => false,
        }
    }

    /// Advance a running timer by one second, finishing it at zero
    pub fn tick(&mut self, id: TimerId) -> TickOutcome {
        let Some(timer) = self.timers.get_mut(&id) else {
            return TickOutcome::Ignored;
        };
        if !timer.is_running() {
            return TickOutcome::Ignored;
        }

        timer.remaining = (timer.remaining - 1.0).max(0.0);
        debug!("Timer {} tick, {}s remaining", id, timer.remaining);

        if timer.remaining <= 0.0 {
            timer.status = TimerStatus::Finished;
            info!("Timer {} finished after {}s", id, timer.duration);
            TickOutcome::Finished {
                duration: timer.duration,
            }
        } else {
            TickOutcome::Counting {
                remaining: timer.remaining,
            }
        }
    }

    /// Force the timer into `finished`, returning its run length
    pub fn finish(&mut self, id: TimerId) -> Option<f64> {
        let timer = self.timers.get_mut(&id)?;
        timer.status = TimerStatus::Finished;
        info!("Timer {} stopped", id);
        Some(timer.duration)
    }

    /// End the hold period: a finished timer becomes idle again
    pub fn revert(&mut self, id: TimerId) -> bool {
        match self.timers.get_mut(&id) {
            Some(timer) if timer.status == TimerStatus::Finished => {
                timer.status = TimerStatus::Idle;
                info!("Timer {} back to idle", id);
                true
            }
            _ => false,
        }
    }

    /// Set both remaining and duration; refused while running
    pub fn edit(&mut self, id: TimerId, new_seconds: f64) -> bool {
        match self.timers.get_mut(&id) {
            Some(timer) if timer.status.is_editable() => {
                let new_seconds = new_seconds.max(0.0);
                timer.remaining = new_seconds;
                timer.duration = new_seconds;
                // A paused timer with nothing left could never resume
                if timer.status == TimerStatus::Paused && !timer.has_time_left() {
                    timer.status = TimerStatus::Idle;
                }
                info!("Timer {} set to {}s", id, new_seconds);
                true
            }
            _ => false,
        }
    }

    /// Apply a value typed as minutes or `mm:ss`.
    ///
    /// A parse failure leaves the timer untouched; `Ok(false)` means the
    /// timer is missing or running.
    pub fn edit_text(&mut self, id: TimerId, text: &str) -> Result<bool, ParseDurationError> {
        let seconds = parse_duration(text)?;
        Ok(self.edit(id, seconds))
    }

    /// Remove a timer unless it is the last one
    pub fn delete(&mut self, id: TimerId) -> bool {
        if self.timers.len() <= 1 || !self.timers.contains_key(&id) {
            debug!("Refusing to delete timer {}", id);
            return false;
        }
        self.timers.remove(&id);
        info!("Deleted timer {}", id);
        true
    }

    pub fn rename(&mut self, id: TimerId, name: &str) -> bool {
        let name = name.trim();
        match self.timers.get_mut(&id) {
            Some(timer) if !name.is_empty() => {
                timer.name = name.to_string();
                true
            }
            _ => false,
        }
    }

    pub fn set_hovered(&mut self, id: TimerId, hovered: bool) -> bool {
        match self.timers.get_mut(&id) {
            Some(timer) => {
                timer.hovered = hovered;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(registry: &TimerRegistry, id: TimerId) -> TimerStatus {
        registry.get(id).unwrap().status
    }

    #[test]
    fn seeded_registry_has_main_timer() {
        let registry = TimerRegistry::seeded(300.0);
        assert_eq!(registry.len(), 1);
        let timers = registry.ordered();
        assert_eq!(timers[0].name, DEFAULT_TIMER_NAME);
        assert_eq!(timers[0].remaining, 300.0);
    }

    #[test]
    fn ids_are_unique() {
        let mut registry = TimerRegistry::new();
        let a = registry.create("a", 1.0);
        let b = registry.create("a", 1.0);
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn toggle_cycles_through_states() {
        let mut registry = TimerRegistry::seeded(60.0);
        let id = registry.ordered()[0].id;

        assert_eq!(registry.toggle(id), Transition::Started);
        assert_eq!(status(&registry, id), TimerStatus::Running);
        assert_eq!(registry.toggle(id), Transition::Paused);
        assert_eq!(status(&registry, id), TimerStatus::Paused);
        assert_eq!(registry.toggle(id), Transition::Resumed);
        assert_eq!(status(&registry, id), TimerStatus::Running);
    }

    #[test]
    fn toggle_on_finished_is_ignored() {
        let mut registry = TimerRegistry::seeded(60.0);
        let id = registry.ordered()[0].id;
        registry.finish(id);
        assert_eq!(registry.toggle(id), Transition::Ignored);
        assert_eq!(status(&registry, id), TimerStatus::Finished);
    }

    #[test]
    fn unknown_id_is_a_no_op() {
        let mut registry = TimerRegistry::seeded(60.0);
        assert_eq!(registry.toggle(99), Transition::Ignored);
        assert!(!registry.start(99));
        assert!(!registry.pause(99));
        assert!(!registry.resume(99));
        assert_eq!(registry.tick(99), TickOutcome::Ignored);
        assert_eq!(registry.finish(99), None);
        assert!(!registry.edit(99, 5.0));
        assert!(!registry.delete(99));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn start_snapshots_duration() {
        let mut registry = TimerRegistry::new();
        let id = registry.create("x", 10.0);
        registry.start(id);
        registry.tick(id);
        registry.tick(id);
        registry.pause(id);
        registry.start(id);
        let timer = registry.get(id).unwrap();
        assert_eq!(timer.remaining, 8.0);
        assert_eq!(timer.duration, 8.0);
    }

    #[test]
    fn start_refused_without_time_left() {
        let mut registry = TimerRegistry::new();
        let id = registry.create("x", 0.0);
        assert!(!registry.start(id));
        assert_eq!(status(&registry, id), TimerStatus::Idle);
    }

    #[test]
    fn ticks_finish_at_zero_without_going_negative() {
        let mut registry = TimerRegistry::new();
        let id = registry.create("x", 2.5);
        registry.start(id);

        assert_eq!(registry.tick(id), TickOutcome::Counting { remaining: 1.5 });
        assert_eq!(registry.tick(id), TickOutcome::Counting { remaining: 0.5 });
        assert_eq!(registry.tick(id), TickOutcome::Finished { duration: 2.5 });
        assert_eq!(registry.get(id).unwrap().remaining, 0.0);
        assert_eq!(registry.tick(id), TickOutcome::Ignored);
        assert_eq!(registry.get(id).unwrap().remaining, 0.0);
    }

    #[test]
    fn paused_timer_does_not_tick() {
        let mut registry = TimerRegistry::new();
        let id = registry.create("x", 5.0);
        registry.start(id);
        registry.tick(id);
        registry.pause(id);
        assert_eq!(registry.tick(id), TickOutcome::Ignored);
        registry.resume(id);
        assert_eq!(registry.get(id).unwrap().remaining, 4.0);
    }

    #[test]
    fn pause_and_resume_require_matching_state() {
        let mut registry = TimerRegistry::new();
        let id = registry.create("x", 5.0);
        assert!(!registry.pause(id));
        assert!(!registry.resume(id));
        registry.start(id);
        assert!(!registry.resume(id));
        assert!(registry.pause(id));
        assert!(!registry.pause(id));
    }

    #[test]
    fn revert_only_from_finished() {
        let mut registry = TimerRegistry::new();
        let id = registry.create("x", 5.0);
        assert!(!registry.revert(id));
        registry.finish(id);
        assert!(registry.revert(id));
        assert_eq!(status(&registry, id), TimerStatus::Idle);
    }

    #[test]
    fn edit_refused_while_running() {
        let mut registry = TimerRegistry::new();
        let id = registry.create("x", 5.0);
        registry.start(id);
        assert!(!registry.edit(id, 90.0));
        assert_eq!(registry.get(id).unwrap().remaining, 5.0);

        registry.pause(id);
        assert!(registry.edit(id, 90.0));
        let timer = registry.get(id).unwrap();
        assert_eq!(timer.remaining, 90.0);
        assert_eq!(timer.duration, 90.0);
    }

    #[test]
    fn zeroing_a_paused_timer_makes_it_idle() {
        let mut registry = TimerRegistry::new();
        let id = registry.create("x", 10.0);
        registry.start(id);
        registry.tick(id);
        registry.pause(id);

        assert!(registry.edit(id, 0.0));
        assert_eq!(status(&registry, id), TimerStatus::Idle);

        assert!(registry.edit(id, 30.0));
        assert_eq!(registry.toggle(id), Transition::Started);
    }

    #[test]
    fn edit_text_parses_or_keeps_prior_value() {
        let mut registry = TimerRegistry::new();
        let id = registry.create("x", 60.0);

        assert_eq!(registry.edit_text(id, "5"), Ok(true));
        assert_eq!(registry.get(id).unwrap().remaining, 300.0);
        assert_eq!(registry.edit_text(id, "1:30"), Ok(true));
        assert_eq!(registry.get(id).unwrap().remaining, 90.0);

        assert!(registry.edit_text(id, "abc").is_err());
        assert!(registry.edit_text(id, "1:2:3").is_err());
        let timer = registry.get(id).unwrap();
        assert_eq!(timer.remaining, 90.0);
        assert_eq!(timer.duration, 90.0);
    }

    #[test]
    fn last_timer_cannot_be_deleted() {
        let mut registry = TimerRegistry::seeded(60.0);
        let main = registry.ordered()[0].id;
        let extra = registry.create("extra", 30.0);

        assert!(registry.delete(extra));
        assert_eq!(registry.len(), 1);
        assert!(!registry.delete(main));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn ordered_by_creation() {
        let mut registry = TimerRegistry::new();
        let ids: Vec<TimerId> = (0..5).map(|i| registry.create(&i.to_string(), 1.0)).collect();
        let ordered: Vec<TimerId> = registry.ordered().iter().map(|t| t.id).collect();
        assert_eq!(ordered, ids);
    }

    #[test]
    fn rename_ignores_blank_names() {
        let mut registry = TimerRegistry::new();
        let id = registry.create("x", 1.0);
        assert!(registry.rename(id, "  tea "));
        assert_eq!(registry.get(id).unwrap().name, "tea");
        assert!(!registry.rename(id, "   "));
        assert_eq!(registry.get(id).unwrap().name, "tea");
    }

    #[test]
    fn hover_flag_round_trips() {
        let mut registry = TimerRegistry::new();
        let id = registry.create("x", 1.0);
        assert!(registry.set_hovered(id, true));
        assert!(registry.get(id).unwrap().hovered);
        assert!(!registry.set_hovered(42, true));
    }
}
