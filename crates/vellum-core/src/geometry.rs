//! Rotation-aware selection geometry: bounds, alignment, and distribution.

use crate::object::{rotate_about, ObjectId};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Axis-aligned box tightly enclosing `rect` after rotating it by
/// `rotation` degrees about its own center.
///
/// Every alignment and distribution decision works on this box, never on the
/// unrotated rectangle.
pub fn rotated_bounds(rect: Rect, rotation: f64) -> Rect {
    if rotation == 0.0 {
        return rect;
    }
    let center = rect.center();
    let corners = [
        Point::new(rect.x0, rect.y0),
        Point::new(rect.x1, rect.y0),
        Point::new(rect.x1, rect.y1),
        Point::new(rect.x0, rect.y1),
    ];
    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for corner in corners {
        let p = rotate_about(corner, center, rotation);
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    Rect::new(min_x, min_y, max_x, max_y)
}

/// Alignment target edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlignEdge {
    Left,
    Right,
    Top,
    Bottom,
    /// Align horizontal positions on the mean of all centers.
    CenterH,
    /// Align vertical positions on the mean of all centers.
    CenterV,
}

/// Distribution axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistributeAxis {
    Horizontal,
    Vertical,
}

/// An object's absolute rotated bounds, as input to alignment/distribution.
#[derive(Debug, Clone, Copy)]
pub struct BoundsItem {
    pub id: ObjectId,
    pub bounds: Rect,
}

/// Compute per-object translation deltas that align the rotated bounds of
/// every item on the given edge. Requires at least two items; fewer returns
/// no updates.
///
/// Each object's own position moves by the same delta as its bounds edge, so
/// the rotation offset between an object and its bounds is preserved.
pub fn align(items: &[BoundsItem], edge: AlignEdge) -> Vec<(ObjectId, Vec2)> {
    if items.len() < 2 {
        return Vec::new();
    }

    match edge {
        AlignEdge::Left => {
            let target = items.iter().map(|i| i.bounds.x0).fold(f64::INFINITY, f64::min);
            items
                .iter()
                .map(|i| (i.id, Vec2::new(target - i.bounds.x0, 0.0)))
                .collect()
        }
        AlignEdge::Right => {
            let target = items
                .iter()
                .map(|i| i.bounds.x1)
                .fold(f64::NEG_INFINITY, f64::max);
            items
                .iter()
                .map(|i| (i.id, Vec2::new(target - i.bounds.x1, 0.0)))
                .collect()
        }
        AlignEdge::Top => {
            let target = items.iter().map(|i| i.bounds.y0).fold(f64::INFINITY, f64::min);
            items
                .iter()
                .map(|i| (i.id, Vec2::new(0.0, target - i.bounds.y0)))
                .collect()
        }
        AlignEdge::Bottom => {
            let target = items
                .iter()
                .map(|i| i.bounds.y1)
                .fold(f64::NEG_INFINITY, f64::max);
            items
                .iter()
                .map(|i| (i.id, Vec2::new(0.0, target - i.bounds.y1)))
                .collect()
        }
        AlignEdge::CenterH => {
            let target =
                items.iter().map(|i| i.bounds.center().x).sum::<f64>() / items.len() as f64;
            items
                .iter()
                .map(|i| (i.id, Vec2::new(target - i.bounds.center().x, 0.0)))
                .collect()
        }
        AlignEdge::CenterV => {
            let target =
                items.iter().map(|i| i.bounds.center().y).sum::<f64>() / items.len() as f64;
            items
                .iter()
                .map(|i| (i.id, Vec2::new(0.0, target - i.bounds.center().y)))
                .collect()
        }
    }
}

/// Compute translation deltas that spread the items evenly along the axis.
///
/// Items are sorted by their rotated-bounds min edge; the first and last
/// keep their position, and the remaining span is divided into equal gaps.
/// Requires at least three items; fewer returns no updates. A negative gap
/// (objects wider than the span) is still valid output.
pub fn distribute(items: &[BoundsItem], axis: DistributeAxis) -> Vec<(ObjectId, Vec2)> {
    if items.len() < 3 {
        return Vec::new();
    }

    let (min_of, extent_of): (fn(&Rect) -> f64, fn(&Rect) -> f64) = match axis {
        DistributeAxis::Horizontal => (|r| r.x0, |r| r.width()),
        DistributeAxis::Vertical => (|r| r.y0, |r| r.height()),
    };

    let mut sorted: Vec<&BoundsItem> = items.iter().collect();
    sorted.sort_by(|a, b| {
        min_of(&a.bounds)
            .partial_cmp(&min_of(&b.bounds))
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let first = sorted[0];
    let last = sorted[sorted.len() - 1];
    let span = min_of(&last.bounds) + extent_of(&last.bounds) - min_of(&first.bounds);
    let total_extent: f64 = sorted.iter().map(|i| extent_of(&i.bounds)).sum();
    let gap = (span - total_extent) / (sorted.len() - 1) as f64;

    let mut updates = Vec::new();
    let mut cursor = min_of(&first.bounds) + extent_of(&first.bounds) + gap;
    for item in &sorted[1..sorted.len() - 1] {
        let delta = cursor - min_of(&item.bounds);
        let delta = match axis {
            DistributeAxis::Horizontal => Vec2::new(delta, 0.0),
            DistributeAxis::Vertical => Vec2::new(0.0, delta),
        };
        updates.push((item.id, delta));
        cursor += extent_of(&item.bounds) + gap;
    }
    updates
}
