//! Object store: the canonical id→object map, selection, and parent/child links.

use crate::error::{DocumentError, DocumentResult};
use crate::object::{CanvasObject, ObjectId, ObjectKind, ObjectPatch};
use kurbo::Vec2;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Owns every live object, the selection set, and the parent/child links.
///
/// The store is the single mutation point for the object graph: reparenting
/// goes through [`ObjectStore::set_parent`] so the bidirectional
/// group-children invariant holds and cycles are rejected before they can be
/// written. Reads stay cheap; z-order is derived from `z_index` on demand.
#[derive(Debug, Clone, Default)]
pub struct ObjectStore {
    objects: HashMap<ObjectId, CanvasObject>,
    /// Selected ids in selection order. Always a subset of `objects` keys.
    selection: Vec<ObjectId>,
}

impl ObjectStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// All live objects.
    pub fn objects(&self) -> &HashMap<ObjectId, CanvasObject> {
        &self.objects
    }

    /// Look up an object by id.
    pub fn get(&self, id: ObjectId) -> Option<&CanvasObject> {
        self.objects.get(&id)
    }

    /// Whether an object exists.
    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    /// Number of live objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// The next free z-index (strictly above the current maximum).
    pub fn next_z_index(&self) -> i64 {
        self.objects
            .values()
            .map(|o| o.z_index)
            .max()
            .map_or(0, |z| z + 1)
    }

    /// Ids sorted back-to-front by `(z_index, id)`.
    ///
    /// The id tiebreak keeps the order deterministic when indices collide
    /// (e.g. after an external layer wrote duplicates).
    pub fn ids_by_z(&self) -> Vec<ObjectId> {
        let mut ids: Vec<ObjectId> = self.objects.keys().copied().collect();
        ids.sort_by(|a, b| {
            let za = self.objects[a].z_index;
            let zb = self.objects[b].z_index;
            za.cmp(&zb).then_with(|| a.cmp(b))
        });
        ids
    }

    /// Insert an object, overwriting any object with the same id.
    ///
    /// A dangling or non-group `parent_id` is cleared; a valid one is
    /// mirrored into the parent's child list.
    pub fn insert(&mut self, mut object: CanvasObject) {
        if let Some(parent_id) = object.parent_id {
            let parent_ok = self.objects.get(&parent_id).is_some_and(|p| p.is_group());
            if parent_ok {
                if let Some(ObjectKind::Group { children }) =
                    self.objects.get_mut(&parent_id).map(|p| &mut p.kind)
                {
                    if !children.contains(&object.id) {
                        children.push(object.id);
                    }
                }
            } else {
                log::warn!(
                    "insert: clearing dangling parent {} on {}",
                    parent_id,
                    object.id
                );
                object.parent_id = None;
            }
        }
        self.objects.insert(object.id, object);
    }

    /// Remove an object and all of its descendants; the selection is pruned
    /// in the same step.
    pub fn remove(&mut self, id: ObjectId) -> Option<CanvasObject> {
        let parent = self.objects.get(&id)?.parent_id;

        // Collect the subtree before mutating anything.
        let mut doomed = Vec::new();
        self.collect_subtree(id, &mut doomed, &mut HashSet::new());

        // Detach from the parent's child list.
        if let Some(parent_id) = parent {
            if let Some(ObjectKind::Group { children }) =
                self.objects.get_mut(&parent_id).map(|p| &mut p.kind)
            {
                children.retain(|&c| c != id);
            }
        }

        let mut removed = None;
        for doomed_id in doomed {
            let taken = self.objects.remove(&doomed_id);
            if doomed_id == id {
                removed = taken;
            }
        }
        self.prune_selection();
        removed
    }

    /// The ids of an object and all of its descendants, parents first.
    pub(crate) fn subtree_ids(&self, id: ObjectId) -> Vec<ObjectId> {
        let mut out = Vec::new();
        self.collect_subtree(id, &mut out, &mut HashSet::new());
        out
    }

    fn collect_subtree(&self, id: ObjectId, out: &mut Vec<ObjectId>, seen: &mut HashSet<ObjectId>) {
        if !seen.insert(id) {
            return;
        }
        out.push(id);
        if let Some(children) = self.objects.get(&id).and_then(|o| o.children()) {
            for &child in children {
                self.collect_subtree(child, out, seen);
            }
        }
    }

    /// Apply a sparse update to an object. Unknown ids are a silent no-op;
    /// returns whether the object existed.
    pub fn apply_patch(&mut self, id: ObjectId, patch: &ObjectPatch) -> bool {
        if !self.objects.contains_key(&id) {
            log::debug!("apply_patch: skipping unknown object {id}");
            return false;
        }
        if let Some(new_parent) = patch.parent_id {
            if let Err(err) = self.set_parent(id, new_parent) {
                log::warn!("apply_patch: rejected reparent of {id}: {err}");
            }
        }
        if let Some(object) = self.objects.get_mut(&id) {
            object.apply_patch_fields(patch);
        }
        true
    }

    /// Apply a batch of updates, skipping unknown ids rather than failing the
    /// whole batch.
    pub fn apply_patches(&mut self, batch: &[(ObjectId, ObjectPatch)]) {
        for (id, patch) in batch {
            self.apply_patch(*id, patch);
        }
    }

    /// Reparent `child` under `parent` (or detach with `None`).
    ///
    /// Rejects unknown ids, non-group parents, and any assignment that would
    /// close a cycle in the parent chain.
    pub fn set_parent(&mut self, child: ObjectId, parent: Option<ObjectId>) -> DocumentResult<()> {
        if !self.objects.contains_key(&child) {
            return Err(DocumentError::UnknownObject(child));
        }
        if let Some(parent_id) = parent {
            let parent_obj = self
                .objects
                .get(&parent_id)
                .ok_or(DocumentError::UnknownObject(parent_id))?;
            if !parent_obj.is_group() {
                return Err(DocumentError::NotAGroup(parent_id));
            }
            if self.would_cycle(child, parent_id) {
                return Err(DocumentError::WouldCycle {
                    child,
                    parent: parent_id,
                });
            }
        }

        // Unlink from the previous parent.
        let old_parent = self.objects.get(&child).and_then(|o| o.parent_id);
        if let Some(old_id) = old_parent {
            if let Some(ObjectKind::Group { children }) =
                self.objects.get_mut(&old_id).map(|p| &mut p.kind)
            {
                children.retain(|&c| c != child);
            }
        }

        if let Some(parent_id) = parent {
            if let Some(ObjectKind::Group { children }) =
                self.objects.get_mut(&parent_id).map(|p| &mut p.kind)
            {
                if !children.contains(&child) {
                    children.push(child);
                }
            }
        }
        if let Some(object) = self.objects.get_mut(&child) {
            object.parent_id = parent;
        }
        Ok(())
    }

    /// Would parenting `child` under `parent` close a cycle?
    fn would_cycle(&self, child: ObjectId, parent: ObjectId) -> bool {
        let mut current = Some(parent);
        let mut visited = HashSet::new();
        while let Some(id) = current {
            if id == child {
                return true;
            }
            // An existing cycle above the parent also rejects the write.
            if !visited.insert(id) {
                return true;
            }
            current = self.objects.get(&id).and_then(|o| o.parent_id);
        }
        false
    }

    // --- Selection ---

    /// Selected ids in selection order.
    pub fn selected_ids(&self) -> &[ObjectId] {
        &self.selection
    }

    /// Whether an object is selected.
    pub fn is_selected(&self, id: ObjectId) -> bool {
        self.selection.contains(&id)
    }

    /// Replace the selection. Unknown and duplicate ids are dropped.
    pub fn set_selection(&mut self, ids: Vec<ObjectId>) {
        let mut seen = HashSet::new();
        self.selection = ids
            .into_iter()
            .filter(|id| self.objects.contains_key(id) && seen.insert(*id))
            .collect();
    }

    /// Add an object to the selection if it exists.
    pub fn add_to_selection(&mut self, id: ObjectId) {
        if self.objects.contains_key(&id) && !self.selection.contains(&id) {
            self.selection.push(id);
        }
    }

    /// Clear the selection.
    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Drop selected ids that no longer exist in the store.
    pub fn prune_selection(&mut self) {
        let objects = &self.objects;
        self.selection.retain(|id| objects.contains_key(id));
    }

    // --- Snapshots ---

    /// Deep copy of the whole object map, for history snapshots and external
    /// readers.
    pub fn clone_objects(&self) -> HashMap<ObjectId, CanvasObject> {
        self.objects.clone()
    }

    /// Replace the whole object map (undo/redo restore). The selection is
    /// pruned in the same step.
    pub fn replace_objects(&mut self, objects: HashMap<ObjectId, CanvasObject>) {
        self.objects = objects;
        self.prune_selection();
    }

    // --- Duplication ---

    /// Deep-copy the subtrees rooted at `ids`, remapping ids and internal
    /// parent/child references, offsetting the copied roots, and assigning
    /// fresh z-indices. Returns the new root ids in input order.
    pub fn duplicate(&mut self, ids: &[ObjectId], offset: Vec2) -> Vec<ObjectId> {
        let mut subtree = Vec::new();
        let mut seen = HashSet::new();
        let mut roots = Vec::new();
        for &id in ids {
            if self.objects.contains_key(&id) && !seen.contains(&id) {
                roots.push(id);
                self.collect_subtree(id, &mut subtree, &mut seen);
            }
        }
        if subtree.is_empty() {
            return Vec::new();
        }

        let mut clones: Vec<CanvasObject> =
            subtree.iter().map(|id| self.objects[id].clone()).collect();
        let id_map = remap_ids(&mut clones);

        let mut z = self.next_z_index();
        for clone in &mut clones {
            clone.z_index = z;
            z += 1;
            if clone.parent_id.is_none() {
                clone.x += offset.x;
                clone.y += offset.y;
            }
        }
        for clone in clones {
            self.objects.insert(clone.id, clone);
        }
        roots.iter().map(|id| id_map[id]).collect()
    }
}

/// Assign fresh ids to a set of cloned objects, rewriting parent/child
/// references that point inside the set. Parent references that leave the set
/// (the roots' original parents) are cleared. Returns the old→new id map.
pub(crate) fn remap_ids(clones: &mut [CanvasObject]) -> HashMap<ObjectId, ObjectId> {
    let mut id_map = HashMap::new();
    for clone in clones.iter() {
        id_map.insert(clone.id, Uuid::new_v4());
    }
    for clone in clones.iter_mut() {
        clone.id = id_map[&clone.id];
        clone.parent_id = match clone.parent_id {
            Some(old) if id_map.contains_key(&old) => Some(id_map[&old]),
            _ => None,
        };
        if let ObjectKind::Group { children } = &mut clone.kind {
            children.retain(|c| id_map.contains_key(c));
            for child in children.iter_mut() {
                *child = id_map[child];
            }
        }
    }
    id_map
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;

    fn rect(x: f64, y: f64) -> CanvasObject {
        CanvasObject::new(
            ObjectKind::Rect { corner_radius: 0.0 },
            Point::new(x, y),
            50.0,
            50.0,
        )
    }

    fn group_of(store: &mut ObjectStore, child_ids: Vec<ObjectId>) -> ObjectId {
        let group = CanvasObject::new(
            ObjectKind::Group {
                children: Vec::new(),
            },
            Point::ZERO,
            100.0,
            100.0,
        );
        let group_id = group.id;
        store.insert(group);
        for id in child_ids {
            store.set_parent(id, Some(group_id)).unwrap();
        }
        group_id
    }

    #[test]
    fn test_insert_and_remove() {
        let mut store = ObjectStore::new();
        let obj = rect(0.0, 0.0);
        let id = obj.id;
        store.insert(obj);
        assert_eq!(store.len(), 1);
        assert!(store.remove(id).is_some());
        assert!(store.is_empty());
        assert!(store.remove(id).is_none());
    }

    #[test]
    fn test_next_z_index() {
        let mut store = ObjectStore::new();
        assert_eq!(store.next_z_index(), 0);
        let mut obj = rect(0.0, 0.0);
        obj.z_index = 7;
        store.insert(obj);
        assert_eq!(store.next_z_index(), 8);
    }

    #[test]
    fn test_apply_patch_unknown_id_is_noop() {
        let mut store = ObjectStore::new();
        assert!(!store.apply_patch(Uuid::new_v4(), &ObjectPatch::move_to(1.0, 2.0)));
    }

    #[test]
    fn test_batch_skips_unknown_ids() {
        let mut store = ObjectStore::new();
        let obj = rect(0.0, 0.0);
        let id = obj.id;
        store.insert(obj);
        store.apply_patches(&[
            (Uuid::new_v4(), ObjectPatch::move_to(9.0, 9.0)),
            (id, ObjectPatch::move_to(10.0, 20.0)),
        ]);
        assert!((store.get(id).unwrap().x - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_set_parent_links_both_sides() {
        let mut store = ObjectStore::new();
        let child = rect(0.0, 0.0);
        let child_id = child.id;
        store.insert(child);
        let group_id = group_of(&mut store, vec![child_id]);

        assert_eq!(store.get(child_id).unwrap().parent_id, Some(group_id));
        assert_eq!(
            store.get(group_id).unwrap().children(),
            Some(&[child_id][..])
        );

        store.set_parent(child_id, None).unwrap();
        assert_eq!(store.get(child_id).unwrap().parent_id, None);
        assert_eq!(store.get(group_id).unwrap().children(), Some(&[][..]));
    }

    #[test]
    fn test_set_parent_rejects_cycle() {
        let mut store = ObjectStore::new();
        let a = rect(0.0, 0.0);
        let a_id = a.id;
        store.insert(a);
        let inner = group_of(&mut store, vec![a_id]);
        let outer = group_of(&mut store, vec![inner]);

        // outer -> inner -> a; parenting outer under inner would cycle.
        let err = store.set_parent(outer, Some(inner)).unwrap_err();
        assert!(matches!(err, DocumentError::WouldCycle { .. }));
        // Self-parenting is the smallest cycle.
        assert!(store.set_parent(inner, Some(inner)).is_err());
    }

    #[test]
    fn test_set_parent_rejects_non_group() {
        let mut store = ObjectStore::new();
        let a = rect(0.0, 0.0);
        let b = rect(10.0, 10.0);
        let (a_id, b_id) = (a.id, b.id);
        store.insert(a);
        store.insert(b);
        assert!(matches!(
            store.set_parent(a_id, Some(b_id)),
            Err(DocumentError::NotAGroup(_))
        ));
    }

    #[test]
    fn test_remove_prunes_selection_and_descendants() {
        let mut store = ObjectStore::new();
        let child = rect(0.0, 0.0);
        let child_id = child.id;
        store.insert(child);
        let group_id = group_of(&mut store, vec![child_id]);
        store.set_selection(vec![group_id, child_id]);

        store.remove(group_id);
        assert!(store.is_empty());
        assert!(store.selected_ids().is_empty());
    }

    #[test]
    fn test_set_selection_filters_unknown_and_duplicates() {
        let mut store = ObjectStore::new();
        let obj = rect(0.0, 0.0);
        let id = obj.id;
        store.insert(obj);
        store.set_selection(vec![id, Uuid::new_v4(), id]);
        assert_eq!(store.selected_ids(), &[id]);
    }

    #[test]
    fn test_replace_objects_prunes_selection() {
        let mut store = ObjectStore::new();
        let obj = rect(0.0, 0.0);
        let id = obj.id;
        store.insert(obj);
        store.set_selection(vec![id]);
        store.replace_objects(HashMap::new());
        assert!(store.selected_ids().is_empty());
    }

    #[test]
    fn test_duplicate_offsets_and_remaps() {
        let mut store = ObjectStore::new();
        let child = rect(5.0, 5.0);
        let child_id = child.id;
        store.insert(child);
        let group_id = group_of(&mut store, vec![child_id]);

        let new_ids = store.duplicate(&[group_id], Vec2::new(10.0, 10.0));
        assert_eq!(new_ids.len(), 1);
        let new_group = store.get(new_ids[0]).unwrap();
        assert!((new_group.x - 10.0).abs() < f64::EPSILON);

        let new_children = new_group.children().unwrap().to_vec();
        assert_eq!(new_children.len(), 1);
        let new_child = store.get(new_children[0]).unwrap();
        assert_ne!(new_child.id, child_id);
        assert_eq!(new_child.parent_id, Some(new_ids[0]));
        // Children stay parent-relative, so their coordinates do not shift.
        assert!((new_child.x - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_ids_by_z_is_deterministic() {
        let mut store = ObjectStore::new();
        let mut a = rect(0.0, 0.0);
        let mut b = rect(10.0, 0.0);
        a.z_index = 2;
        b.z_index = 1;
        let (a_id, b_id) = (a.id, b.id);
        store.insert(a);
        store.insert(b);
        assert_eq!(store.ids_by_z(), vec![b_id, a_id]);
    }
}
