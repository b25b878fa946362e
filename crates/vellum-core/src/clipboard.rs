//! Clipboard for deep-copied objects with a cumulative paste offset.

use crate::object::CanvasObject;
use crate::store::remap_ids;
use kurbo::Vec2;

/// Offset applied per paste, accumulating across repeated pastes.
pub const PASTE_OFFSET: f64 = 10.0;

/// Holds structural deep copies of a copied selection.
///
/// Copied roots are stored with canvas-absolute coordinates (the controller
/// rewrites them on copy); nested children stay parent-relative. Each paste
/// produces fresh ids and shifts the roots by one more offset step.
#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    contents: Vec<CanvasObject>,
    paste_count: u32,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the clipboard holds anything.
    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    /// Number of stored objects (roots plus nested children).
    pub fn len(&self) -> usize {
        self.contents.len()
    }

    /// Store deep copies, resetting the paste offset. An empty copy is
    /// ignored so an accidental copy doesn't clear the clipboard.
    pub fn copy(&mut self, objects: Vec<CanvasObject>) {
        if objects.is_empty() {
            return;
        }
        self.contents = objects;
        self.paste_count = 0;
    }

    /// Produce paste-ready clones: fresh ids (internal parent/child
    /// references remapped) and roots offset by the cumulative step.
    pub fn paste(&mut self) -> Vec<CanvasObject> {
        if self.contents.is_empty() {
            return Vec::new();
        }
        self.paste_count += 1;
        let offset = Vec2::new(
            PASTE_OFFSET * self.paste_count as f64,
            PASTE_OFFSET * self.paste_count as f64,
        );

        let mut clones = self.contents.clone();
        remap_ids(&mut clones);
        for clone in &mut clones {
            if clone.parent_id.is_none() {
                clone.x += offset.x;
                clone.y += offset.y;
            }
        }
        clones
    }
}
