//! Snap functionality for aligning positions to the grid and to other objects.

use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Grid size for snapping (matches the visual grid).
pub const GRID_SIZE: f64 = 20.0;

/// Distance threshold for object snapping (in canvas units).
pub const OBJECT_SNAP_THRESHOLD: f64 = 10.0;

/// Rotation snap increment in degrees (held modifier during rotate).
pub const ANGLE_SNAP_INCREMENT: f64 = 15.0;

/// Line angle snap increment in degrees (held modifier while drawing lines).
pub const LINE_ANGLE_INCREMENT: f64 = 45.0;

/// Snap mode for aligning positions to the grid or to other objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SnapMode {
    /// No snapping.
    #[default]
    None,
    /// Snap to grid intersections.
    Grid,
    /// Snap to other objects' bounds.
    Objects,
    /// Snap to both grid and objects.
    All,
}

impl SnapMode {
    /// Cycle to the next snap mode.
    pub fn next(self) -> Self {
        match self {
            SnapMode::None => SnapMode::Grid,
            SnapMode::Grid => SnapMode::Objects,
            SnapMode::Objects => SnapMode::All,
            SnapMode::All => SnapMode::None,
        }
    }

    pub fn snaps_to_grid(self) -> bool {
        matches!(self, SnapMode::Grid | SnapMode::All)
    }

    pub fn snaps_to_objects(self) -> bool {
        matches!(self, SnapMode::Objects | SnapMode::All)
    }

    pub fn is_enabled(self) -> bool {
        self != SnapMode::None
    }
}

/// An alignment guide produced by a snap, for the host to draw.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SnapGuide {
    /// Vertical guide line at the given canvas x.
    Vertical(f64),
    /// Horizontal guide line at the given canvas y.
    Horizontal(f64),
}

/// Result of a snap operation.
#[derive(Debug, Clone, Default)]
pub struct SnapResult {
    /// The snapped position.
    pub x: f64,
    pub y: f64,
    /// Guides to render while the snap is active.
    pub guides: Vec<SnapGuide>,
}

impl SnapResult {
    /// A result with no snapping.
    pub fn none(point: Point) -> Self {
        Self {
            x: point.x,
            y: point.y,
            guides: Vec::new(),
        }
    }

    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn is_snapped(&self) -> bool {
        !self.guides.is_empty()
    }
}

/// Snap a point to the nearest grid intersection.
pub fn snap_to_grid(point: Point, grid_size: f64) -> Point {
    Point::new(
        (point.x / grid_size).round() * grid_size,
        (point.y / grid_size).round() * grid_size,
    )
}

/// Snap an angle to the nearest increment, normalized to [0, 360).
pub fn snap_angle(angle_degrees: f64, increment: f64) -> f64 {
    let snapped = (angle_degrees / increment).round() * increment;
    snapped.rem_euclid(360.0)
}

/// Snap a line endpoint to angle increments from its start point, preserving
/// the distance from start.
pub fn snap_line_endpoint(start: Point, end: Point, increment: f64) -> Point {
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let distance = (dx * dx + dy * dy).sqrt();
    if distance < 0.001 {
        return end;
    }
    let angle = snap_angle(dy.atan2(dx).to_degrees(), increment).to_radians();
    Point::new(
        start.x + distance * angle.cos(),
        start.y + distance * angle.sin(),
    )
}

/// Candidate x/y positions collected from an object's bounds: edges and
/// center on both axes.
pub fn snap_targets_from_bounds(bounds: Rect) -> ([f64; 3], [f64; 3]) {
    (
        [bounds.x0, bounds.center().x, bounds.x1],
        [bounds.y0, bounds.center().y, bounds.y1],
    )
}

/// Snap a position against per-axis candidate values from other objects.
/// Each axis snaps independently to its nearest candidate within the
/// threshold.
pub fn snap_to_targets(point: Point, xs: &[f64], ys: &[f64], threshold: f64) -> SnapResult {
    let mut result = SnapResult::none(point);

    let best_x = xs
        .iter()
        .copied()
        .filter(|x| (x - point.x).abs() <= threshold)
        .min_by(|a, b| {
            (a - point.x)
                .abs()
                .partial_cmp(&(b - point.x).abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    if let Some(x) = best_x {
        result.x = x;
        result.guides.push(SnapGuide::Vertical(x));
    }

    let best_y = ys
        .iter()
        .copied()
        .filter(|y| (y - point.y).abs() <= threshold)
        .min_by(|a, b| {
            (a - point.y)
                .abs()
                .partial_cmp(&(b - point.y).abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    if let Some(y) = best_y {
        result.y = y;
        result.guides.push(SnapGuide::Horizontal(y));
    }

    result
}

/// Snap a position according to the mode. Object candidates take priority
/// over the grid; an axis that found no object candidate falls back to the
/// grid when grid snapping is on.
pub fn snap_position(point: Point, mode: SnapMode, xs: &[f64], ys: &[f64]) -> SnapResult {
    match mode {
        SnapMode::None => SnapResult::none(point),
        SnapMode::Grid => {
            let snapped = snap_to_grid(point, GRID_SIZE);
            SnapResult {
                x: snapped.x,
                y: snapped.y,
                guides: Vec::new(),
            }
        }
        SnapMode::Objects => snap_to_targets(point, xs, ys, OBJECT_SNAP_THRESHOLD),
        SnapMode::All => {
            let mut result = snap_to_targets(point, xs, ys, OBJECT_SNAP_THRESHOLD);
            let grid = snap_to_grid(point, GRID_SIZE);
            let has_vertical = result
                .guides
                .iter()
                .any(|g| matches!(g, SnapGuide::Vertical(_)));
            let has_horizontal = result
                .guides
                .iter()
                .any(|g| matches!(g, SnapGuide::Horizontal(_)));
            if !has_vertical {
                result.x = grid.x;
            }
            if !has_horizontal {
                result.y = grid.y;
            }
            result
        }
    }
}
