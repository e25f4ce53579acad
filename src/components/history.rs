use std::collections::VecDeque;

use crate::canvas::PixelBuffer;

/// Maximum number of undo snapshots kept.
pub const MAX_HISTORY: usize = 20;

// ============================================================================
// HISTORY MANAGER - bounded undo/redo stacks of full-buffer snapshots
// ============================================================================

/// Undo/redo history of committed-buffer snapshots.
///
/// Snapshots share tiles with the buffer they were taken from, so pushing one
/// costs a reference-count bump per tile and only tiles touched afterwards
/// are ever copied.
pub struct HistoryManager {
    undo_stack: VecDeque<PixelBuffer>,
    redo_stack: VecDeque<PixelBuffer>,
    max_history_size: usize,
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new(MAX_HISTORY)
    }
}

impl HistoryManager {
    pub fn new(max_history_size: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            max_history_size: max_history_size.max(1),
        }
    }

    /// Snapshot `committed` before a gesture mutates it.
    ///
    /// Clears the redo stack: once a new action is taken the undone future is
    /// unreachable.
    pub fn begin_gesture(&mut self, committed: &PixelBuffer) {
        self.redo_stack.clear();
        self.undo_stack.push_back(committed.clone());
        self.prune();
    }

    /// Step back one gesture. Returns the buffer to install as committed, or
    /// `None` when there is nothing to undo.
    pub fn undo(&mut self, committed: &PixelBuffer) -> Option<PixelBuffer> {
        let restored = self.undo_stack.pop_back()?;
        self.redo_stack.push_back(committed.clone());
        Some(restored)
    }

    /// Re-apply the most recently undone gesture.
    pub fn redo(&mut self, committed: &PixelBuffer) -> Option<PixelBuffer> {
        let restored = self.redo_stack.pop_back()?;
        self.undo_stack.push_back(committed.clone());
        self.prune();
        Some(restored)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    /// Bytes held exclusively by snapshots (tiles shared with the live
    /// buffer or another snapshot are not counted).
    pub fn memory_usage(&self) -> usize {
        self.undo_stack
            .iter()
            .chain(self.redo_stack.iter())
            .map(PixelBuffer::memory_bytes)
            .sum()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Drop the oldest snapshots beyond the depth cap.
    fn prune(&mut self) {
        while self.undo_stack.len() > self.max_history_size {
            self.undo_stack.pop_front();
        }
    }
}
