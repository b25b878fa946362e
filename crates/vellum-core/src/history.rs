//! Snapshot-based undo/redo history.

use crate::object::{CanvasObject, ObjectId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

/// Maximum number of snapshots kept on each stack.
pub const MAX_HISTORY: usize = 50;

/// A full, independent copy of the object map plus a capture timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub objects: HashMap<ObjectId, CanvasObject>,
    /// Capture time in milliseconds since the Unix epoch.
    pub timestamp_ms: u64,
}

impl Snapshot {
    /// Capture a snapshot of the given object map.
    pub fn capture(objects: &HashMap<ObjectId, CanvasObject>) -> Self {
        Self {
            objects: objects.clone(),
            timestamp_ms: now_ms(),
        }
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Bounded past/future snapshot stacks with an undo-recursion guard.
///
/// `is_undo_redoing` is set by the controller while a snapshot is being
/// applied, so mutations performed during the restore can never push new
/// snapshots and corrupt the stacks.
#[derive(Debug, Clone, Default)]
pub struct History {
    past: Vec<Snapshot>,
    future: Vec<Snapshot>,
    is_undo_redoing: bool,
}

impl History {
    /// Create an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture the current state onto the past stack, truncating to
    /// [`MAX_HISTORY`] (oldest dropped) and clearing the future stack.
    ///
    /// No-op while a snapshot is being applied.
    pub fn push_snapshot(&mut self, objects: &HashMap<ObjectId, CanvasObject>) {
        if self.is_undo_redoing {
            log::debug!("push_snapshot ignored during undo/redo");
            return;
        }
        self.past.push(Snapshot::capture(objects));
        if self.past.len() > MAX_HISTORY {
            self.past.remove(0);
        }
        self.future.clear();
    }

    /// Pop the most recent past snapshot, capturing the live state onto the
    /// future stack. Returns the snapshot to apply, or `None` when the past
    /// is empty.
    pub fn undo(&mut self, live: &HashMap<ObjectId, CanvasObject>) -> Option<Snapshot> {
        let snapshot = self.past.pop()?;
        self.future.push(Snapshot::capture(live));
        Some(snapshot)
    }

    /// Pop the most recent future snapshot, capturing the live state onto the
    /// past stack. Returns the snapshot to apply, or `None` when the future
    /// is empty.
    pub fn redo(&mut self, live: &HashMap<ObjectId, CanvasObject>) -> Option<Snapshot> {
        let snapshot = self.future.pop()?;
        self.past.push(Snapshot::capture(live));
        Some(snapshot)
    }

    /// Drop the most recent past snapshot without applying it. Used when a
    /// gesture that checkpointed at its start is cancelled.
    pub fn discard_last(&mut self) {
        self.past.pop();
    }

    /// Mark the start/end of a snapshot restore.
    pub fn set_undo_redoing(&mut self, active: bool) {
        self.is_undo_redoing = active;
    }

    /// Whether a snapshot restore is in progress.
    pub fn is_undo_redoing(&self) -> bool {
        self.is_undo_redoing
    }

    /// Whether undo is available.
    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    /// Whether redo is available.
    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Number of past snapshots.
    pub fn depth(&self) -> usize {
        self.past.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::ObjectKind;
    use kurbo::Point;

    fn map_with_rect(x: f64) -> HashMap<ObjectId, CanvasObject> {
        let obj = CanvasObject::new(
            ObjectKind::Rect { corner_radius: 0.0 },
            Point::new(x, 0.0),
            50.0,
            50.0,
        );
        HashMap::from([(obj.id, obj)])
    }

    #[test]
    fn test_undo_redo_round_trip() {
        let mut history = History::new();
        let before = map_with_rect(0.0);
        history.push_snapshot(&before);
        let after = map_with_rect(100.0);

        let restored = history.undo(&after).unwrap();
        assert_eq!(restored.objects, before);
        assert!(history.can_redo());

        let redone = history.redo(&restored.objects).unwrap();
        assert_eq!(redone.objects, after);
        assert!(history.can_undo());
    }

    #[test]
    fn test_underflow_is_noop() {
        let mut history = History::new();
        let live = map_with_rect(0.0);
        assert!(history.undo(&live).is_none());
        assert!(history.redo(&live).is_none());
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_push_clears_future() {
        let mut history = History::new();
        let a = map_with_rect(0.0);
        history.push_snapshot(&a);
        let b = map_with_rect(10.0);
        history.undo(&b).unwrap();
        assert!(history.can_redo());

        history.push_snapshot(&a);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_depth_is_bounded() {
        let mut history = History::new();
        for i in 0..(MAX_HISTORY + 10) {
            history.push_snapshot(&map_with_rect(i as f64));
        }
        assert_eq!(history.depth(), MAX_HISTORY);
        // The oldest snapshots were dropped: the bottom of the stack is the
        // 11th push.
        let mut live = map_with_rect(-1.0);
        let mut last = None;
        while let Some(snap) = history.undo(&live) {
            live = snap.objects.clone();
            last = Some(snap);
        }
        let bottom = last.unwrap();
        let x = bottom.objects.values().next().unwrap().x;
        assert!((x - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_push_ignored_during_restore() {
        let mut history = History::new();
        history.set_undo_redoing(true);
        history.push_snapshot(&map_with_rect(0.0));
        assert!(!history.can_undo());
        history.set_undo_redoing(false);
        history.push_snapshot(&map_with_rect(0.0));
        assert!(history.can_undo());
    }

    #[test]
    fn test_discard_last() {
        let mut history = History::new();
        history.push_snapshot(&map_with_rect(0.0));
        history.push_snapshot(&map_with_rect(1.0));
        history.discard_last();
        assert_eq!(history.depth(), 1);
        history.discard_last();
        history.discard_last();
        assert!(!history.can_undo());
    }
}
