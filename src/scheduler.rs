use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashSet};

use crate::clock::Timestamp;

/// Handle to a scheduled task, usable for cancellation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskHandle(u64);

/// A task that has come due
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Due<T> {
    pub handle: TaskHandle,
    pub due_at: Timestamp,
    pub payload: T,
}

#[derive(Debug)]
struct Entry<T> {
    due_at: Timestamp,
    handle: TaskHandle,
    payload: T,
}

// Ordered by due time, then by scheduling order, so same-millisecond tasks
// fire in the order they were scheduled.
impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.due_at, self.handle).cmp(&(other.due_at, other.handle))
    }
}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.handle == other.handle
    }
}

impl<T> Eq for Entry<T> {}

/// Delayed-task queue polled by its owner with the current time.
///
/// Nothing here runs on its own: the owner calls [`Scheduler::pop_due`] from
/// its event loop, which keeps every callback on the owner's thread.
#[derive(Debug)]
pub struct Scheduler<T> {
    queue: BinaryHeap<Reverse<Entry<T>>>,
    cancelled: HashSet<TaskHandle>,
    next_handle: u64,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            queue: BinaryHeap::new(),
            cancelled: HashSet::new(),
            next_handle: 0,
        }
    }

    pub fn schedule(&mut self, due_at: Timestamp, payload: T) -> TaskHandle {
        let handle = TaskHandle(self.next_handle);
        self.next_handle += 1;
        self.queue.push(Reverse(Entry {
            due_at,
            handle,
            payload,
        }));
        handle
    }

    /// Cancel a pending task. Returns false if it already fired or was
    /// never scheduled here.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let pending = self.queue.iter().any(|Reverse(e)| e.handle == handle);
        if pending {
            self.cancelled.insert(handle);
        }
        pending
    }

    pub fn cancel_all(&mut self) {
        self.queue.clear();
        self.cancelled.clear();
    }

    /// Pop the earliest live task due at or before `now`
    pub fn pop_due(&mut self, now: Timestamp) -> Option<Due<T>> {
        self.discard_cancelled_head();
        match self.queue.peek() {
            Some(Reverse(entry)) if entry.due_at <= now => {}
            _ => return None,
        }
        self.queue.pop().map(|Reverse(entry)| Due {
            handle: entry.handle,
            due_at: entry.due_at,
            payload: entry.payload,
        })
    }

    /// Due time of the earliest live task
    pub fn next_due(&mut self) -> Option<Timestamp> {
        self.discard_cancelled_head();
        self.queue.peek().map(|Reverse(entry)| entry.due_at)
    }

    pub fn len(&self) -> usize {
        self.queue.len() - self.cancelled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn discard_cancelled_head(&mut self) {
        while let Some(Reverse(entry)) = self.queue.peek() {
            if !self.cancelled.remove(&entry.handle) {
                break;
            }
            self.queue.pop();
        }
    }
}
