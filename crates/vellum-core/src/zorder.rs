//! Z-order reordering: front/back jumps and single-step moves.

use crate::object::{ObjectId, ObjectPatch};
use crate::store::ObjectStore;

fn z_patch(z_index: i64) -> ObjectPatch {
    ObjectPatch {
        z_index: Some(z_index),
        ..ObjectPatch::default()
    }
}

fn live_ids(store: &ObjectStore, ids: &[ObjectId]) -> Vec<ObjectId> {
    ids.iter().copied().filter(|&id| store.contains(id)).collect()
}

/// Assign the given objects fresh contiguous indices strictly above the
/// current maximum, in input order (the last id ends up frontmost).
pub fn bring_to_front(store: &ObjectStore, ids: &[ObjectId]) -> Vec<(ObjectId, ObjectPatch)> {
    let ids = live_ids(store, ids);
    if ids.is_empty() {
        return Vec::new();
    }
    let max = store
        .objects()
        .values()
        .map(|o| o.z_index)
        .max()
        .unwrap_or(0);
    ids.iter()
        .enumerate()
        .map(|(i, &id)| (id, z_patch(max + 1 + i as i64)))
        .collect()
}

/// Assign the given objects fresh contiguous indices strictly below the
/// current minimum, in input order (the first id ends up backmost).
pub fn send_to_back(store: &ObjectStore, ids: &[ObjectId]) -> Vec<(ObjectId, ObjectPatch)> {
    let ids = live_ids(store, ids);
    if ids.is_empty() {
        return Vec::new();
    }
    let min = store
        .objects()
        .values()
        .map(|o| o.z_index)
        .min()
        .unwrap_or(0);
    let count = ids.len() as i64;
    ids.iter()
        .enumerate()
        .map(|(i, &id)| (id, z_patch(min - count + i as i64)))
        .collect()
}

/// Move the selection one step toward the front: each selected index is
/// incremented and the nearest non-selected object above the selection is
/// displaced below it. A selection already at the top is a no-op.
pub fn bring_forward(store: &ObjectStore, ids: &[ObjectId]) -> Vec<(ObjectId, ObjectPatch)> {
    let ids = live_ids(store, ids);
    if ids.is_empty() {
        return Vec::new();
    }
    let sel_max = ids.iter().map(|&id| store.get(id).unwrap().z_index).max();
    let sel_min = ids.iter().map(|&id| store.get(id).unwrap().z_index).min();
    let (Some(sel_max), Some(sel_min)) = (sel_max, sel_min) else {
        return Vec::new();
    };

    // Nearest non-selected object above the selection's topmost index.
    let neighbor = store
        .objects()
        .values()
        .filter(|o| !ids.contains(&o.id) && o.z_index > sel_max)
        .min_by_key(|o| o.z_index)
        .map(|o| o.id);
    let Some(neighbor) = neighbor else {
        return Vec::new();
    };

    let mut updates: Vec<(ObjectId, ObjectPatch)> = ids
        .iter()
        .map(|&id| (id, z_patch(store.get(id).unwrap().z_index + 1)))
        .collect();
    updates.push((neighbor, z_patch(sel_min)));
    updates
}

/// Move the selection one step toward the back: each selected index is
/// decremented and the nearest non-selected object below the selection is
/// displaced above it. A selection already at the bottom is a no-op.
pub fn send_backward(store: &ObjectStore, ids: &[ObjectId]) -> Vec<(ObjectId, ObjectPatch)> {
    let ids = live_ids(store, ids);
    if ids.is_empty() {
        return Vec::new();
    }
    let sel_max = ids.iter().map(|&id| store.get(id).unwrap().z_index).max();
    let sel_min = ids.iter().map(|&id| store.get(id).unwrap().z_index).min();
    let (Some(sel_max), Some(sel_min)) = (sel_max, sel_min) else {
        return Vec::new();
    };

    let neighbor = store
        .objects()
        .values()
        .filter(|o| !ids.contains(&o.id) && o.z_index < sel_min)
        .max_by_key(|o| o.z_index)
        .map(|o| o.id);
    let Some(neighbor) = neighbor else {
        return Vec::new();
    };

    let mut updates: Vec<(ObjectId, ObjectPatch)> = ids
        .iter()
        .map(|&id| (id, z_patch(store.get(id).unwrap().z_index - 1)))
        .collect();
    updates.push((neighbor, z_patch(sel_max)));
    updates
}
