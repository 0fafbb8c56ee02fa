//! Bounded block queue — the single shared structure between planner and
//! interpolator.
//!
//! An arena of preallocated slots indexed by head/tail cursors. Only the
//! interpolator advances `head`; only the planner advances `tail`. The
//! full/empty boundary is the one coordination point and is always checked,
//! never assumed. Cursors are atomics so status readers in other contexts
//! never observe a torn index. No slot is allocated or freed at runtime.

use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::error::PlannerError;

use super::block::MotionBlock;

/// Default queue capacity in blocks.
pub const DEFAULT_QUEUE_CAPACITY: usize = 16;

/// Fixed-capacity ring of motion blocks.
///
/// One slot is kept open to distinguish full from empty, so a
/// `BlockQueue<16>` holds at most 15 pending blocks.
#[derive(Debug)]
pub struct BlockQueue<const N: usize = DEFAULT_QUEUE_CAPACITY> {
    slots: [Option<MotionBlock>; N],
    head: AtomicUsize,
    tail: AtomicUsize,
    /// Set once the interpolator starts executing the head block; a started
    /// block is never re-planned.
    head_busy: AtomicBool,
}

impl<const N: usize> Default for BlockQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> BlockQueue<N> {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            slots: [None; N],
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
            head_busy: AtomicBool::new(false),
        }
    }

    /// Number of queued blocks, including one under execution.
    pub fn len(&self) -> usize {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        (tail + N - head) % N
    }

    /// Whether no blocks are queued.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether an append would be rejected.
    pub fn is_full(&self) -> bool {
        self.len() == N - 1
    }

    /// Maximum number of pending blocks.
    pub const fn capacity(&self) -> usize {
        N - 1
    }

    /// Append a block at the tail.
    ///
    /// Returns [`PlannerError::QueueFull`] as backpressure when no slot is
    /// free; the caller retries and nothing is dropped.
    pub fn push(&mut self, block: MotionBlock) -> Result<(), PlannerError> {
        if self.is_full() {
            return Err(PlannerError::QueueFull);
        }
        let tail = self.tail.load(Ordering::Acquire);
        self.slots[tail] = Some(block);
        self.tail.store((tail + 1) % N, Ordering::Release);
        Ok(())
    }

    /// Peek at the block under (or next up for) execution.
    pub fn front(&self) -> Option<&MotionBlock> {
        if self.is_empty() {
            return None;
        }
        self.slots[self.head.load(Ordering::Acquire)].as_ref()
    }

    /// Take a copy of the head block for execution and latch it busy.
    ///
    /// Returns `None` when the queue is empty.
    pub(crate) fn begin_front(&mut self) -> Option<MotionBlock> {
        let block = *self.front()?;
        self.head_busy.store(true, Ordering::Release);
        Some(block)
    }

    /// Discard the head block and free its slot. Called by the interpolator
    /// exactly once per completed (or aborted) block.
    pub(crate) fn pop_front(&mut self) {
        if self.is_empty() {
            return;
        }
        let head = self.head.load(Ordering::Acquire);
        self.slots[head] = None;
        self.head.store((head + 1) % N, Ordering::Release);
        self.head_busy.store(false, Ordering::Release);
    }

    /// Discard every queued block (emergency stop, endstop abort).
    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = None;
        }
        self.head.store(0, Ordering::Release);
        self.tail.store(0, Ordering::Release);
        self.head_busy.store(false, Ordering::Release);
    }

    /// Offset from head of the first block the planner may still modify:
    /// 1 while the head block has started executing, 0 otherwise.
    pub(crate) fn first_replannable_offset(&self) -> usize {
        if self.head_busy.load(Ordering::Acquire) {
            1
        } else {
            0
        }
    }

    /// Mutable access to a pending block by offset from head, for lookahead
    /// reconciliation. Offsets below [`Self::first_replannable_offset`] must
    /// not be requested.
    pub(crate) fn get_mut(&mut self, offset: usize) -> Option<&mut MotionBlock> {
        if offset >= self.len() {
            return None;
        }
        let head = self.head.load(Ordering::Acquire);
        self.slots[(head + offset) % N].as_mut()
    }

    /// Read access to a pending block by offset from head.
    pub(crate) fn get(&self, offset: usize) -> Option<&MotionBlock> {
        if offset >= self.len() {
            return None;
        }
        let head = self.head.load(Ordering::Acquire);
        self.slots[(head + offset) % N].as_ref()
    }
}
