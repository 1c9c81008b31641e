use std::time::Duration;

/// Handle to a transition registered with a [`Schedule`].
///
/// Handles are never reused within a schedule, so cancelling a handle whose
/// transition already fired is a harmless no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScheduleHandle(u64);

#[derive(Debug, Clone)]
struct Entry<T> {
    handle: ScheduleHandle,
    due: Duration,
    transition: T,
}

/// A cancellable timeline of delayed transitions driven by an explicit clock.
///
/// The schedule never observes wall-clock time. Its owner advances the clock by
/// the elapsed time and pops the transitions that became due, in due order.
/// Transitions due at the same instant fire in the order they were scheduled.
///
/// While a transition fires, the clock reads its due time, so transitions
/// scheduled from inside a firing transition are measured from that instant and
/// chains of delays do not drift with the granularity of `advance` calls.
#[derive(Debug, Clone)]
pub struct Schedule<T> {
    now: Duration,
    next_handle: u64,
    entries: Vec<Entry<T>>,
}

impl<T> Default for Schedule<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Schedule<T> {
    /// Creates an empty schedule at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_handle: 0,
            entries: Vec::new(),
        }
    }

    /// Returns the current time on the schedule's clock.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Returns the number of transitions waiting to fire.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no transition is waiting to fire.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registers `transition` to fire `after` the current time.
    pub fn schedule(&mut self, after: Duration, transition: T) -> ScheduleHandle {
        let handle = ScheduleHandle(self.next_handle);
        self.next_handle += 1;
        let due = self.now + after;
        let index = self.entries.partition_point(|entry| entry.due <= due);
        self.entries.insert(
            index,
            Entry {
                handle,
                due,
                transition,
            },
        );
        handle
    }

    /// Returns `true` if the transition behind `handle` has neither fired nor been
    /// cancelled.
    #[must_use]
    pub fn is_pending(&self, handle: ScheduleHandle) -> bool {
        self.entries.iter().any(|entry| entry.handle == handle)
    }

    /// Cancels a pending transition, returning it if it had not fired yet.
    pub fn cancel(&mut self, handle: ScheduleHandle) -> Option<T> {
        let index = self
            .entries
            .iter()
            .position(|entry| entry.handle == handle)?;
        Some(self.entries.remove(index).transition)
    }

    /// Cancels every pending transition, returning how many were discarded.
    pub fn cancel_all(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        count
    }

    /// Returns the time remaining until the next transition becomes due.
    #[must_use]
    pub fn time_until_next(&self) -> Option<Duration> {
        self.entries
            .first()
            .map(|entry| entry.due.saturating_sub(self.now))
    }

    /// Pops the earliest transition due at or before `deadline`.
    ///
    /// The clock moves forward to the transition's due time. Returns `None` once
    /// nothing else is due by `deadline`; call [`Schedule::advance_to`] afterwards
    /// to move the clock to the deadline itself.
    pub fn pop_due(&mut self, deadline: Duration) -> Option<T> {
        let first = self.entries.first()?;
        if first.due > deadline {
            return None;
        }
        let entry = self.entries.remove(0);
        self.now = self.now.max(entry.due);
        Some(entry.transition)
    }

    /// Pops the earliest pending transition regardless of its due time.
    pub fn pop_next(&mut self) -> Option<T> {
        let deadline = self.entries.first()?.due;
        self.pop_due(deadline)
    }

    /// Moves the clock forward to `deadline`. The clock never moves backwards.
    pub fn advance_to(&mut self, deadline: Duration) {
        self.now = self.now.max(deadline);
    }
}
