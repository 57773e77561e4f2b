//! Deferred and repeating events tied to the active session.

use std::time::{Duration, Instant};

/// Events the app loop dispatches when their timers come due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// One second of quiz time has passed.
    QuizClock,
    /// The answer feedback has been shown long enough.
    QuizAdvance,
    /// Clear the spelling input after a missed attempt.
    SpellingClearInput,
    /// Hide the retry feedback.
    SpellingHideFeedback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
struct Entry {
    id: TimerId,
    event: TimerEvent,
    due: Instant,
    period: Option<Duration>,
}

/// Timer queue polled by the app loop.
///
/// Starting a new session must call `cancel_all` so that callbacks of the
/// previous session never reach the new one.
#[derive(Debug, Default)]
pub struct Scheduler {
    entries: Vec<Entry>,
    next_id: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, event: TimerEvent, due: Instant, period: Option<Duration>) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.entries.push(Entry { id, event, due, period });
        id
    }

    /// Fire `event` once after `delay`.
    pub fn schedule_once(&mut self, event: TimerEvent, delay: Duration, now: Instant) -> TimerId {
        self.push(event, now + delay, None)
    }

    /// Fire `event` every `period`, starting one period from now.
    pub fn schedule_every(&mut self, event: TimerEvent, period: Duration, now: Instant) -> TimerId {
        // A zero period would never leave the catch-up loop
        let period = period.max(Duration::from_millis(1));
        self.push(event, now + period, Some(period))
    }

    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    /// Cancel every pending timer for `event`.
    pub fn cancel_event(&mut self, event: TimerEvent) {
        self.entries.retain(|e| e.event != event);
    }

    pub fn cancel_all(&mut self) {
        if !self.entries.is_empty() {
            tracing::debug!(pending = self.entries.len(), "cancelling timers");
        }
        self.entries.clear();
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.entries.iter().map(|e| e.due).min()
    }

    /// Pop due events in deadline order.
    ///
    /// A repeating timer that fell behind fires once per missed period.
    pub fn fire_due(&mut self, now: Instant) -> Vec<TimerEvent> {
        let mut fired: Vec<(Instant, TimerEvent)> = Vec::new();

        self.entries.retain_mut(|entry| {
            while entry.due <= now {
                fired.push((entry.due, entry.event));
                match entry.period {
                    Some(period) => entry.due += period,
                    None => return false,
                }
            }
            true
        });

        fired.sort_by_key(|(due, _)| *due);
        fired.into_iter().map(|(_, event)| event).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_once_fires_once() {
        let mut sched = Scheduler::new();
        let t0 = Instant::now();
        sched.schedule_once(TimerEvent::QuizAdvance, Duration::from_millis(1500), t0);

        assert!(sched.fire_due(t0 + Duration::from_millis(1000)).is_empty());
        assert_eq!(sched.fire_due(t0 + Duration::from_millis(1500)), vec![TimerEvent::QuizAdvance]);
        assert!(sched.fire_due(t0 + Duration::from_secs(10)).is_empty());
        assert_eq!(sched.next_deadline(), None);
    }

    #[test]
    fn test_repeating_catches_up() {
        let mut sched = Scheduler::new();
        let t0 = Instant::now();
        sched.schedule_every(TimerEvent::QuizClock, Duration::from_secs(1), t0);

        let fired = sched.fire_due(t0 + Duration::from_millis(3500));
        assert_eq!(fired, vec![TimerEvent::QuizClock; 3]);
        assert_eq!(sched.next_deadline(), Some(t0 + Duration::from_secs(4)));
    }

    #[test]
    fn test_events_come_out_in_deadline_order() {
        let mut sched = Scheduler::new();
        let t0 = Instant::now();
        sched.schedule_once(TimerEvent::SpellingHideFeedback, Duration::from_millis(2300), t0);
        sched.schedule_once(TimerEvent::SpellingClearInput, Duration::from_millis(800), t0);

        let fired = sched.fire_due(t0 + Duration::from_secs(3));
        assert_eq!(fired, vec![TimerEvent::SpellingClearInput, TimerEvent::SpellingHideFeedback]);
    }

    #[test]
    fn test_cancel() {
        let mut sched = Scheduler::new();
        let t0 = Instant::now();
        let id = sched.schedule_once(TimerEvent::QuizAdvance, Duration::from_secs(1), t0);
        sched.schedule_every(TimerEvent::QuizClock, Duration::from_secs(1), t0);
        sched.schedule_once(TimerEvent::SpellingClearInput, Duration::from_secs(1), t0);

        assert!(sched.cancel(id));
        assert!(!sched.cancel(id));
        sched.cancel_event(TimerEvent::QuizClock);
        assert_eq!(sched.fire_due(t0 + Duration::from_secs(2)), vec![TimerEvent::SpellingClearInput]);

        sched.schedule_every(TimerEvent::QuizClock, Duration::from_secs(1), t0);
        sched.cancel_all();
        assert_eq!(sched.next_deadline(), None);
        assert!(sched.fire_due(t0 + Duration::from_secs(60)).is_empty());
    }
}
