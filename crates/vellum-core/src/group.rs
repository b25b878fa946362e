//! Group resolution: absolute positions, grouping, and ungrouping.

use crate::object::{CanvasObject, ObjectId, ObjectKind, ObjectPatch};
use crate::store::ObjectStore;
use kurbo::{Point, Rect};
use std::collections::HashSet;

/// Minimum number of resolvable objects required to form a group.
pub const MIN_GROUP_SIZE: usize = 2;

/// Resolve an object's canvas-absolute position by summing relative offsets
/// through the parent chain.
///
/// A missing parent is treated as the chain root; a cyclic chain is detected
/// with a visited set and resolves to the object's own local position instead
/// of recursing forever.
pub fn absolute_position(store: &ObjectStore, id: ObjectId) -> Point {
    let Some(object) = store.get(id) else {
        return Point::ZERO;
    };
    let mut x = object.x;
    let mut y = object.y;
    let mut visited = HashSet::from([id]);
    let mut current = object.parent_id;
    while let Some(parent_id) = current {
        if !visited.insert(parent_id) {
            log::warn!("absolute_position: parent cycle at {parent_id}, using local position");
            return Point::new(object.x, object.y);
        }
        match store.get(parent_id) {
            Some(parent) => {
                x += parent.x;
                y += parent.y;
                current = parent.parent_id;
            }
            None => break,
        }
    }
    Point::new(x, y)
}

/// An object's unrotated rectangle in canvas-absolute coordinates.
pub fn absolute_rect(store: &ObjectStore, id: ObjectId) -> Option<Rect> {
    let object = store.get(id)?;
    Some(object.rect_at(absolute_position(store, id)))
}

/// The result of planning a group operation: the new group object and the
/// child updates that reparent and re-origin each member.
#[derive(Debug, Clone)]
pub struct GroupPlan {
    pub group: CanvasObject,
    pub child_updates: Vec<(ObjectId, ObjectPatch)>,
}

/// Plan grouping the given objects under a new group.
///
/// The group is positioned at the origin of the union bounding box of the
/// members' absolute rectangles and sized to that box; each member's `x`/`y`
/// is rewritten relative to the group origin. Returns `None` when fewer than
/// two of the ids resolve to live objects.
///
/// The caller inserts `plan.group` first and then applies `child_updates`,
/// so the reparenting patches find their parent in the store.
pub fn plan_group(store: &ObjectStore, ids: &[ObjectId]) -> Option<GroupPlan> {
    let mut members: Vec<(ObjectId, Point)> = Vec::new();
    let mut union: Option<Rect> = None;
    for &id in ids {
        let Some(object) = store.get(id) else {
            continue;
        };
        if members.iter().any(|(m, _)| *m == id) {
            continue;
        }
        let origin = absolute_position(store, id);
        members.push((id, origin));
        let rect = object.rect_at(origin);
        union = Some(match union {
            Some(u) => u.union(rect),
            None => rect,
        });
    }
    if members.len() < MIN_GROUP_SIZE {
        return None;
    }
    let bounds = union?;

    let mut group = CanvasObject::new(
        ObjectKind::Group {
            children: members.iter().map(|(id, _)| *id).collect(),
        },
        bounds.origin(),
        bounds.width(),
        bounds.height(),
    );
    group.z_index = store.next_z_index();
    group.stroke = None;
    let group_id = group.id;

    let child_updates = members
        .iter()
        .map(|&(id, origin)| {
            let patch = ObjectPatch {
                x: Some(origin.x - bounds.x0),
                y: Some(origin.y - bounds.y0),
                parent_id: Some(Some(group_id)),
                ..ObjectPatch::default()
            };
            (id, patch)
        })
        .collect();

    Some(GroupPlan {
        group,
        child_updates,
    })
}

/// The result of planning an ungroup operation.
#[derive(Debug, Clone, Default)]
pub struct UngroupPlan {
    /// Groups to delete once their children are detached.
    pub delete: Vec<ObjectId>,
    /// Former children, to select afterward.
    pub select: Vec<ObjectId>,
    /// Updates restoring each child to absolute coordinates with no parent.
    pub child_updates: Vec<(ObjectId, ObjectPatch)>,
}

impl UngroupPlan {
    pub fn is_empty(&self) -> bool {
        self.delete.is_empty()
    }
}

/// Plan dissolving the given groups: children are restored to canvas-absolute
/// coordinates and detached; missing children are skipped. Non-group ids are
/// ignored.
///
/// Apply `child_updates` before removing the `delete` ids, so the groups are
/// empty by the time they are removed.
pub fn plan_ungroup(store: &ObjectStore, ids: &[ObjectId]) -> UngroupPlan {
    let mut plan = UngroupPlan::default();
    for &group_id in ids {
        let Some(group) = store.get(group_id) else {
            continue;
        };
        let Some(children) = group.children() else {
            continue;
        };
        let group_origin = absolute_position(store, group_id);
        for &child_id in children {
            let Some(child) = store.get(child_id) else {
                log::debug!("ungroup: group {group_id} lists missing child {child_id}");
                continue;
            };
            let patch = ObjectPatch {
                x: Some(child.x + group_origin.x),
                y: Some(child.y + group_origin.y),
                parent_id: Some(None),
                ..ObjectPatch::default()
            };
            plan.child_updates.push((child_id, patch));
            plan.select.push(child_id);
        }
        plan.delete.push(group_id);
    }
    plan
}
