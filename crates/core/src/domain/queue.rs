// Queue State Machine - pure bookkeeping, no async, no I/O

use std::collections::VecDeque;

/// Effect of a successful worker completion on the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionEffect {
    /// Queue is closed, nothing pending, nothing running: epoch is settled
    Drained,
    /// Capacity freed up: attempt exactly one further dispatch
    DispatchNext,
    /// Epoch already settled (drain or abort happened first): discard
    Ignored,
}

/// Bookkeeping for one queue: pending buffer, running gauge, lifecycle flags.
///
/// This is the critical section of the runner. All transitions are
/// synchronous; the async orchestration in the application layer calls in
/// under a lock and never suspends while mutating.
///
/// Invariants upheld here:
/// - `running` never exceeds `concurrency` (gate in [`QueueState::take_next`])
/// - `running` never goes negative (decrement only pairs with a take)
/// - `settled` latches exactly one drain/abort per epoch
#[derive(Debug)]
pub struct QueueState<T> {
    concurrency: usize,
    pending: VecDeque<T>,
    running: usize,
    closed: bool,
    settled: bool,
}

impl<T> QueueState<T> {
    pub fn new(concurrency: usize) -> Self {
        debug_assert!(concurrency > 0);
        Self {
            concurrency,
            pending: VecDeque::new(),
            running: 0,
            closed: false,
            settled: false,
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Update the concurrency limit. Zero is rejected (caller keeps the
    /// previous value); returns whether the new value was accepted.
    pub fn set_concurrency(&mut self, concurrency: usize) -> bool {
        if concurrency == 0 {
            return false;
        }
        self.concurrency = concurrency;
        true
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn running(&self) -> usize {
        self.running
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Append an item to the tail of the pending buffer.
    ///
    /// Returns false (item dropped) when the queue is closed.
    pub fn push(&mut self, item: T) -> bool {
        if self.closed {
            return false;
        }
        self.pending.push_back(item);
        true
    }

    /// Admission control: pop the head item and occupy a slot, or None when
    /// the epoch is settled, the window is full, or nothing is pending.
    pub fn take_next(&mut self) -> Option<T> {
        if self.settled || self.running >= self.concurrency {
            return None;
        }
        let item = self.pending.pop_front()?;
        self.running += 1;
        Some(item)
    }

    /// Record a successful completion for a previously taken item.
    ///
    /// Each call must pair with an earlier [`QueueState::take_next`]. An
    /// unpaired call saturates at zero rather than underflowing the gauge.
    pub fn finish_ok(&mut self) -> CompletionEffect {
        if self.settled {
            // Late completion from before a drain/abort; counters are frozen.
            return CompletionEffect::Ignored;
        }
        self.running = self.running.saturating_sub(1);
        if self.closed && self.pending.is_empty() && self.running == 0 {
            self.settled = true;
            CompletionEffect::Drained
        } else {
            CompletionEffect::DispatchNext
        }
    }

    /// Record a failed completion: abort the epoch.
    ///
    /// Closes the queue, discards pending items, and latches the settled
    /// flag. The running gauge is intentionally not decremented; the epoch is
    /// terminal. Returns true only for the completion that won the latch.
    pub fn finish_err(&mut self) -> bool {
        if self.settled {
            return false;
        }
        self.settled = true;
        self.closed = true;
        self.pending.clear();
        true
    }

    /// Refuse further pushes. Returns true when the drain condition is
    /// already satisfied at the moment of closing (caller must fire the
    /// completion callback exactly once).
    pub fn close(&mut self) -> bool {
        self.closed = true;
        if !self.settled && self.running == 0 && self.pending.is_empty() {
            self.settled = true;
            return true;
        }
        false
    }

    /// Re-enable pushes and start a fresh completion epoch.
    pub fn reopen(&mut self) {
        self.closed = false;
        self.settled = false;
    }

    /// Discard pending items only; running items are unaffected.
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
