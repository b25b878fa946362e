//! Selection handles: the eight resize grips, the rotation grip, and the
//! resize math they drive.

use crate::object::{rotate_about, MIN_FONT_SIZE, MIN_OBJECT_SIZE};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Handle hit tolerance in screen pixels.
pub const HANDLE_HIT_TOLERANCE: f64 = 8.0;

/// Distance from the top edge to the rotation handle, in canvas units.
pub const ROTATION_HANDLE_OFFSET: f64 = 25.0;

/// One of the eight resize grips (corners and edge midpoints).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResizeHandle {
    TopLeft,
    Top,
    TopRight,
    Right,
    BottomRight,
    Bottom,
    BottomLeft,
    Left,
}

impl ResizeHandle {
    /// All handles, corners first so corner grips win hit-test ties.
    pub const ALL: [ResizeHandle; 8] = [
        ResizeHandle::TopLeft,
        ResizeHandle::TopRight,
        ResizeHandle::BottomRight,
        ResizeHandle::BottomLeft,
        ResizeHandle::Top,
        ResizeHandle::Right,
        ResizeHandle::Bottom,
        ResizeHandle::Left,
    ];

    /// Whether this is a corner grip (proportional by default).
    pub fn is_corner(self) -> bool {
        matches!(
            self,
            ResizeHandle::TopLeft
                | ResizeHandle::TopRight
                | ResizeHandle::BottomRight
                | ResizeHandle::BottomLeft
        )
    }

    /// CSS cursor for the grip.
    pub fn cursor(self) -> &'static str {
        match self {
            ResizeHandle::TopLeft | ResizeHandle::BottomRight => "nwse-resize",
            ResizeHandle::TopRight | ResizeHandle::BottomLeft => "nesw-resize",
            ResizeHandle::Left | ResizeHandle::Right => "ew-resize",
            ResizeHandle::Top | ResizeHandle::Bottom => "ns-resize",
        }
    }

    /// The grip's position on the unrotated box (before applying rotation).
    fn unrotated_position(self, bounds: Rect) -> Point {
        let cx = bounds.center().x;
        let cy = bounds.center().y;
        match self {
            ResizeHandle::TopLeft => Point::new(bounds.x0, bounds.y0),
            ResizeHandle::Top => Point::new(cx, bounds.y0),
            ResizeHandle::TopRight => Point::new(bounds.x1, bounds.y0),
            ResizeHandle::Right => Point::new(bounds.x1, cy),
            ResizeHandle::BottomRight => Point::new(bounds.x1, bounds.y1),
            ResizeHandle::Bottom => Point::new(cx, bounds.y1),
            ResizeHandle::BottomLeft => Point::new(bounds.x0, bounds.y1),
            ResizeHandle::Left => Point::new(bounds.x0, cy),
        }
    }
}

/// Position of a resize grip on an object's absolute box, rotated about the
/// box center by the object's rotation (degrees).
pub fn handle_position(bounds: Rect, rotation: f64, handle: ResizeHandle) -> Point {
    let position = handle.unrotated_position(bounds);
    if rotation == 0.0 {
        position
    } else {
        rotate_about(position, bounds.center(), rotation)
    }
}

/// Position of the rotation grip: above the top-center, rotated with the
/// object.
pub fn rotation_handle_position(bounds: Rect, rotation: f64) -> Point {
    let above = Point::new(bounds.center().x, bounds.y0 - ROTATION_HANDLE_OFFSET);
    if rotation == 0.0 {
        above
    } else {
        rotate_about(above, bounds.center(), rotation)
    }
}

/// Find which resize grip (if any) a canvas point hits. `tolerance` should be
/// adjusted for camera zoom.
pub fn hit_test_handles(
    bounds: Rect,
    rotation: f64,
    point: Point,
    tolerance: f64,
) -> Option<ResizeHandle> {
    for handle in ResizeHandle::ALL {
        let position = handle_position(bounds, rotation, handle);
        let dx = point.x - position.x;
        let dy = point.y - position.y;
        if dx * dx + dy * dy <= tolerance * tolerance {
            return Some(handle);
        }
    }
    None
}

/// Whether a canvas point hits the rotation grip.
pub fn hit_test_rotation_handle(bounds: Rect, rotation: f64, point: Point, tolerance: f64) -> bool {
    let position = rotation_handle_position(bounds, rotation);
    let dx = point.x - position.x;
    let dy = point.y - position.y;
    dx * dx + dy * dy <= tolerance * tolerance
}

/// Geometry captured when a resize drag starts.
#[derive(Debug, Clone, Copy)]
pub struct ResizeStart {
    /// The object's absolute box at drag start.
    pub rect: Rect,
    /// Text font size at drag start, if the object is text.
    pub font_size: Option<f64>,
}

/// The box (and scaled font size) produced by a resize drag.
#[derive(Debug, Clone, Copy)]
pub struct ResizeOutcome {
    pub rect: Rect,
    pub font_size: Option<f64>,
}

/// Resize the captured box by dragging `handle` through `delta`.
///
/// Corner grips keep the aspect ratio fixed at its drag-start value when
/// `proportional` is set; edge grips always move a single axis. The result
/// is clamped to the minimum size and re-anchored so the edge opposite the
/// grip stays fixed. Text font size scales by the same ratio as width.
pub fn apply_resize(
    start: &ResizeStart,
    handle: ResizeHandle,
    delta: Vec2,
    proportional: bool,
) -> ResizeOutcome {
    let rect = start.rect;
    let orig_w = rect.width().max(MIN_OBJECT_SIZE);
    let orig_h = rect.height().max(MIN_OBJECT_SIZE);

    let mut width = match handle {
        ResizeHandle::TopLeft | ResizeHandle::Left | ResizeHandle::BottomLeft => orig_w - delta.x,
        ResizeHandle::TopRight | ResizeHandle::Right | ResizeHandle::BottomRight => {
            orig_w + delta.x
        }
        ResizeHandle::Top | ResizeHandle::Bottom => orig_w,
    };
    let mut height = match handle {
        ResizeHandle::TopLeft | ResizeHandle::Top | ResizeHandle::TopRight => orig_h - delta.y,
        ResizeHandle::BottomLeft | ResizeHandle::Bottom | ResizeHandle::BottomRight => {
            orig_h + delta.y
        }
        ResizeHandle::Left | ResizeHandle::Right => orig_h,
    };

    if proportional && handle.is_corner() {
        // Scale both axes by the dominant one, against the drag-start aspect.
        let scale = (width / orig_w).max(height / orig_h);
        width = orig_w * scale;
        height = orig_h * scale;
    }

    width = width.max(MIN_OBJECT_SIZE);
    height = height.max(MIN_OBJECT_SIZE);

    // Re-anchor: the edge opposite the grip stays fixed.
    let x0 = match handle {
        ResizeHandle::TopLeft | ResizeHandle::Left | ResizeHandle::BottomLeft => rect.x1 - width,
        _ => rect.x0,
    };
    let y0 = match handle {
        ResizeHandle::TopLeft | ResizeHandle::Top | ResizeHandle::TopRight => rect.y1 - height,
        _ => rect.y0,
    };

    let font_size = start
        .font_size
        .map(|size| (size * width / orig_w).max(MIN_FONT_SIZE));

    ResizeOutcome {
        rect: Rect::new(x0, y0, x0 + width, y0 + height),
        font_size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start(w: f64, h: f64) -> ResizeStart {
        ResizeStart {
            rect: Rect::new(100.0, 100.0, 100.0 + w, 100.0 + h),
            font_size: None,
        }
    }

    #[test]
    fn test_handle_positions_unrotated() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 50.0);
        let p = handle_position(bounds, 0.0, ResizeHandle::BottomRight);
        assert_eq!(p, Point::new(100.0, 50.0));
        let p = handle_position(bounds, 0.0, ResizeHandle::Top);
        assert_eq!(p, Point::new(50.0, 0.0));
    }

    #[test]
    fn test_handle_positions_rotate_with_object() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 50.0);
        let p = handle_position(bounds, 180.0, ResizeHandle::TopLeft);
        assert!((p.x - 100.0).abs() < 1e-9);
        assert!((p.y - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_rotation_handle_above_top_center() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 50.0);
        let p = rotation_handle_position(bounds, 0.0);
        assert_eq!(p, Point::new(50.0, -ROTATION_HANDLE_OFFSET));
    }

    #[test]
    fn test_hit_test_prefers_corner() {
        // Top-left corner and nearby: corner should win.
        let bounds = Rect::new(0.0, 0.0, 100.0, 50.0);
        let hit = hit_test_handles(bounds, 0.0, Point::new(1.0, 1.0), 8.0);
        assert_eq!(hit, Some(ResizeHandle::TopLeft));
        assert_eq!(hit_test_handles(bounds, 0.0, Point::new(50.0, 25.0), 8.0), None);
    }

    #[test]
    fn test_free_corner_resize() {
        let outcome = apply_resize(
            &start(100.0, 50.0),
            ResizeHandle::BottomRight,
            Vec2::new(50.0, 30.0),
            false,
        );
        assert!((outcome.rect.width() - 150.0).abs() < 1e-9);
        assert!((outcome.rect.height() - 80.0).abs() < 1e-9);
        // Anchor (top-left) unchanged.
        assert!((outcome.rect.x0 - 100.0).abs() < 1e-9);
        assert!((outcome.rect.y0 - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_proportional_corner_keeps_aspect() {
        let outcome = apply_resize(
            &start(100.0, 50.0),
            ResizeHandle::BottomRight,
            Vec2::new(100.0, 0.0),
            true,
        );
        let aspect = outcome.rect.width() / outcome.rect.height();
        assert!((aspect - 2.0).abs() < 1e-9);
        assert!((outcome.rect.width() - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_edge_resize_single_axis() {
        let outcome = apply_resize(
            &start(100.0, 50.0),
            ResizeHandle::Left,
            Vec2::new(-20.0, 999.0),
            true,
        );
        assert!((outcome.rect.width() - 120.0).abs() < 1e-9);
        assert!((outcome.rect.height() - 50.0).abs() < 1e-9);
        // Right edge (anchor) unchanged.
        assert!((outcome.rect.x1 - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_min_size_clamp_all_handles() {
        for handle in ResizeHandle::ALL {
            for proportional in [false, true] {
                let outcome = apply_resize(
                    &start(100.0, 50.0),
                    handle,
                    Vec2::new(-10_000.0, 10_000.0),
                    proportional,
                );
                assert!(outcome.rect.width() >= MIN_OBJECT_SIZE);
                assert!(outcome.rect.height() >= MIN_OBJECT_SIZE);
            }
        }
    }

    #[test]
    fn test_min_clamp_keeps_opposite_edge_fixed() {
        let outcome = apply_resize(
            &start(100.0, 50.0),
            ResizeHandle::TopLeft,
            Vec2::new(10_000.0, 10_000.0),
            false,
        );
        // Anchor is the bottom-right corner at (200, 150).
        assert!((outcome.rect.x1 - 200.0).abs() < 1e-9);
        assert!((outcome.rect.y1 - 150.0).abs() < 1e-9);
        assert!((outcome.rect.width() - MIN_OBJECT_SIZE).abs() < 1e-9);
    }

    #[test]
    fn test_text_font_scales_with_width() {
        let resize_start = ResizeStart {
            rect: Rect::new(0.0, 0.0, 100.0, 40.0),
            font_size: Some(16.0),
        };
        let outcome = apply_resize(
            &resize_start,
            ResizeHandle::Right,
            Vec2::new(100.0, 0.0),
            false,
        );
        assert!((outcome.font_size.unwrap() - 32.0).abs() < 1e-9);
    }
}
