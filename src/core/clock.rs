//! Virtual time and the cooperative timer queue.
//!
//! Nothing in `core` reads the wall clock.  The runtime converts real
//! elapsed time into [`Millis`] and feeds it in; tests feed whatever they
//! like.  Every "wait N ms, then do X" in the engine is a task parked in a
//! [`Scheduler`] until the clock reaches its due time.

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashSet};

/// Milliseconds since the page was loaded.
pub type Millis = u64;

/// Handle returned by [`Scheduler::schedule`], used to cancel a timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

// ───────────────────────────────────────── scheduler ─────────

struct Entry<T> {
    due: Millis,
    seq: u64,
    task: T,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.due
            .cmp(&other.due)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

/// Single-threaded timer queue.
///
/// Tasks fire in due-time order; tasks due at the same instant fire in the
/// order they were scheduled.  Cancellation is lazy: a cancelled entry stays
/// in the heap until it reaches the front and is then discarded.
pub struct Scheduler<T> {
    now: Millis,
    next_seq: u64,
    queue: BinaryHeap<Reverse<Entry<T>>>,
    /// Sequence numbers of timers that are still armed.
    live: HashSet<u64>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            now: 0,
            next_seq: 0,
            queue: BinaryHeap::new(),
            live: HashSet::new(),
        }
    }

    /// Current virtual time.
    pub fn now(&self) -> Millis {
        self.now
    }

    /// Arm a timer that fires `delay` ms from now.
    pub fn schedule(&mut self, delay: Millis, task: T) -> TimerId {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Reverse(Entry {
            due: self.now.saturating_add(delay),
            seq,
            task,
        }));
        self.live.insert(seq);
        TimerId(seq)
    }

    /// Disarm a timer.  Returns `false` if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.live.remove(&id.0)
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.live.contains(&id.0)
    }

    /// Number of armed timers.
    pub fn pending(&self) -> usize {
        self.live.len()
    }

    /// Due time of the earliest armed timer.
    pub fn next_due(&mut self) -> Option<Millis> {
        self.prune();
        self.queue.peek().map(|Reverse(entry)| entry.due)
    }

    /// Pop the next task due at or before `until`, moving the clock to the
    /// task's due time.
    pub fn pop_due(&mut self, until: Millis) -> Option<(TimerId, T)> {
        self.prune();
        if self.queue.peek()?.0.due > until {
            return None;
        }
        let Reverse(entry) = self.queue.pop()?;
        self.live.remove(&entry.seq);
        self.now = self.now.max(entry.due);
        Some((TimerId(entry.seq), entry.task))
    }

    /// Move the clock forward without firing anything.  Call after draining
    /// [`pop_due`](Self::pop_due) so "now" matches the caller's clock.
    pub fn advance_to(&mut self, until: Millis) {
        self.now = self.now.max(until);
    }

    /// Cancel every armed timer, returning how many were live.
    pub fn clear(&mut self) -> usize {
        let cancelled = self.live.len();
        self.live.clear();
        self.queue.clear();
        cancelled
    }

    fn prune(&mut self) {
        while let Some(Reverse(entry)) = self.queue.peek() {
            if self.live.contains(&entry.seq) {
                break;
            }
            self.queue.pop();
        }
    }
}

// ───────────────────────────────────────── rate limiting ─────

/// Leading-edge throttle with a single trailing run.
///
/// The first hit in a quiet period runs immediately.  Hits inside the
/// window arm one trailing task at the end of the window, so the final
/// state is always processed.
#[derive(Debug, Clone)]
pub struct Throttle {
    interval: Millis,
    last_run: Option<Millis>,
    trailing: Option<TimerId>,
}

impl Throttle {
    pub fn new(interval: Millis) -> Self {
        Self {
            interval,
            last_run: None,
            trailing: None,
        }
    }

    /// Returns `true` when the caller should run now.  Otherwise `task` may
    /// have been parked as the trailing run.
    pub fn hit<T>(&mut self, scheduler: &mut Scheduler<T>, task: T) -> bool {
        let now = scheduler.now();
        match self.last_run {
            Some(last) if now < last.saturating_add(self.interval) => {
                if self.trailing.is_none() {
                    let delay = last + self.interval - now;
                    self.trailing = Some(scheduler.schedule(delay, task));
                }
                false
            }
            _ => {
                self.last_run = Some(now);
                true
            }
        }
    }

    /// Record that the trailing task fired at `now`.
    pub fn flush(&mut self, now: Millis) {
        self.trailing = None;
        self.last_run = Some(now);
    }
}

/// Trailing-edge debounce: each hit cancels the armed timer and re-arms it.
#[derive(Debug, Clone)]
pub struct Debounce {
    wait: Millis,
    armed: Option<TimerId>,
}

impl Debounce {
    pub fn new(wait: Millis) -> Self {
        Self { wait, armed: None }
    }

    pub fn hit<T>(&mut self, scheduler: &mut Scheduler<T>, task: T) {
        if let Some(id) = self.armed.take() {
            scheduler.cancel(id);
        }
        self.armed = Some(scheduler.schedule(self.wait, task));
    }

    /// Record that the armed task fired.
    pub fn settle(&mut self) {
        self.armed = None;
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }
}
