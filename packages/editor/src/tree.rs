//! # Component Tree
//!
//! Arena storage for every component of one document.
//!
//! Components are addressed by [`ComponentId`]; a collection owns the ordered
//! id list of its children and every child holds the id of its parent. A
//! component appears in at most one child list at a time: moving a component
//! means removing it from its old parent before adding it to the new one.
//!
//! Components that are detached from the tree stay in the arena until
//! [`ComponentTree::collect_garbage`] runs, because undo snapshots may still
//! refer to them.

use crate::component::{ComponentEvent, ComponentId, ComponentKind, Node};
use crate::decorate::Decorate;
use crate::errors::{EditorError, EditorResult};
use crate::id_generator::IdGenerator;
use crate::record::{Journal, Snapshot};
use std::collections::{HashMap, HashSet};
use tracing::{debug, trace};

/// Cells that reported themselves empty, per row, during one edit batch
#[derive(Debug, Clone, Default)]
pub(crate) struct EmptyCellBatch {
    pub(crate) rows: HashMap<ComponentId, HashSet<ComponentId>>,
}

#[derive(Debug)]
pub struct ComponentTree {
    nodes: HashMap<ComponentId, Node>,
    root: ComponentId,
    ids: IdGenerator,
    journal: Option<Journal>,
    pub(crate) batch: Option<EmptyCellBatch>,
    batch_savepoints: Vec<Option<EmptyCellBatch>>,
    explicit_batch: bool,
    events: Vec<ComponentEvent>,
}

impl ComponentTree {
    /// Create a tree holding an empty article
    pub fn new(document_name: &str) -> Self {
        let mut ids = IdGenerator::new(document_name);
        let root = ids.new_id();
        let mut nodes = HashMap::new();
        nodes.insert(
            root,
            Node::new(root, ComponentKind::Article, Decorate::default()),
        );

        Self {
            nodes,
            root,
            ids,
            journal: None,
            batch: None,
            batch_savepoints: Vec::new(),
            explicit_batch: false,
            events: Vec::new(),
        }
    }

    pub fn root(&self) -> ComponentId {
        self.root
    }

    /// Replace the root with another article already in the arena
    pub(crate) fn set_root(&mut self, root: ComponentId) -> EditorResult<()> {
        match self.get(root)?.kind {
            ComponentKind::Article => {
                self.root = root;
                Ok(())
            }
            _ => Err(EditorError::structural("root must be an article")),
        }
    }

    pub fn id_generator(&self) -> &IdGenerator {
        &self.ids
    }

    /// External id string for a component
    pub fn qualified_id(&self, id: ComponentId) -> String {
        self.ids.qualify(id)
    }

    // ---- construction -------------------------------------------------

    /// Allocate a detached component
    pub fn create(&mut self, kind: ComponentKind, decorate: Decorate) -> ComponentId {
        let id = self.ids.new_id();
        self.nodes.insert(id, Node::new(id, kind, decorate));
        if let Some(journal) = &mut self.journal {
            journal.created(id);
        }
        id
    }

    // ---- lookup -------------------------------------------------------

    pub fn get(&self, id: ComponentId) -> EditorResult<&Node> {
        self.nodes.get(&id).ok_or(EditorError::NotFound(id))
    }

    pub fn contains(&self, id: ComponentId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn kind(&self, id: ComponentId) -> EditorResult<&ComponentKind> {
        Ok(&self.get(id)?.kind)
    }

    pub fn decorate(&self, id: ComponentId) -> EditorResult<&Decorate> {
        Ok(&self.get(id)?.decorate)
    }

    pub fn parent(&self, id: ComponentId) -> EditorResult<Option<ComponentId>> {
        Ok(self.get(id)?.parent)
    }

    /// Parent that must exist for the operation to make sense
    pub(crate) fn require_parent(&self, id: ComponentId) -> EditorResult<ComponentId> {
        self.parent(id)?.ok_or_else(|| {
            EditorError::structural(format!("component {} is not attached to a parent", id))
        })
    }

    pub fn children(&self, id: ComponentId) -> EditorResult<&[ComponentId]> {
        Ok(&self.get(id)?.children)
    }

    pub fn size(&self, id: ComponentId) -> EditorResult<usize> {
        Ok(self.get(id)?.children.len())
    }

    pub fn get_child(&self, id: ComponentId, index: usize) -> EditorResult<Option<ComponentId>> {
        Ok(self.get(id)?.children.get(index).copied())
    }

    pub fn find_children_index(
        &self,
        parent: ComponentId,
        child: ComponentId,
    ) -> EditorResult<Option<usize>> {
        Ok(self.get(parent)?.children.iter().position(|c| *c == child))
    }

    /// Index of a component inside its own parent
    pub(crate) fn index_in_parent(&self, id: ComponentId) -> EditorResult<(ComponentId, usize)> {
        let parent = self.require_parent(id)?;
        let index = self.find_children_index(parent, id)?.ok_or_else(|| {
            EditorError::structural(format!("component {} missing from its parent", id))
        })?;
        Ok((parent, index))
    }

    pub fn get_prev(&self, child: ComponentId) -> EditorResult<Option<ComponentId>> {
        let (parent, index) = self.index_in_parent(child)?;
        if index == 0 {
            return Ok(None);
        }
        self.get_child(parent, index - 1)
    }

    pub fn get_next(&self, child: ComponentId) -> EditorResult<Option<ComponentId>> {
        let (parent, index) = self.index_in_parent(child)?;
        self.get_child(parent, index + 1)
    }

    /// Walk up the parent chain until a component matches
    pub fn find_ancestor(
        &self,
        id: ComponentId,
        predicate: impl Fn(&ComponentKind) -> bool,
    ) -> EditorResult<Option<ComponentId>> {
        let mut current = self.parent(id)?;
        while let Some(candidate) = current {
            let node = self.get(candidate)?;
            if predicate(&node.kind) {
                return Ok(Some(candidate));
            }
            current = node.parent;
        }
        Ok(None)
    }

    fn is_ancestor_or_self(&self, ancestor: ComponentId, id: ComponentId) -> bool {
        let mut current = Some(id);
        while let Some(candidate) = current {
            if candidate == ancestor {
                return true;
            }
            current = self.nodes.get(&candidate).and_then(|n| n.parent);
        }
        false
    }

    // ---- collection primitives ----------------------------------------

    /// Insert detached components at `index` in `parent`'s child list.
    ///
    /// Validates everything before touching the tree: the index range, the
    /// containment rules of the parent variant, that every item is detached,
    /// distinct and not an ancestor of `parent`.
    pub fn add_children(
        &mut self,
        parent: ComponentId,
        index: usize,
        items: &[ComponentId],
    ) -> EditorResult<()> {
        let size = self.size(parent)?;
        if index > size {
            return Err(EditorError::invalid_range(index as isize, index as isize, size));
        }
        self.check_insertable(parent, items)?;

        self.touch(parent);
        for item in items {
            self.touch(*item);
            if let Some(node) = self.nodes.get_mut(item) {
                node.parent = Some(parent);
            }
        }
        if let Some(node) = self.nodes.get_mut(&parent) {
            node.children.splice(index..index, items.iter().copied());
        }
        Ok(())
    }

    /// Whether `items` could be added to `parent` as they stand
    pub(crate) fn check_insertable(
        &self,
        parent: ComponentId,
        items: &[ComponentId],
    ) -> EditorResult<()> {
        let parent_node = self.get(parent)?;
        let mut seen = HashSet::new();
        for item in items {
            let node = self.get(*item)?;
            if !parent_node.kind.accepts_child(&node.kind) {
                return Err(EditorError::structural(format!(
                    "{} may not contain {}",
                    parent_node.kind.type_tag(),
                    node.kind.type_tag()
                )));
            }
            if node.parent.is_some() {
                return Err(EditorError::structural(format!(
                    "component {} already has a parent",
                    item
                )));
            }
            if !seen.insert(*item) || self.is_ancestor_or_self(*item, parent) {
                return Err(EditorError::structural(format!(
                    "component {} cannot be inserted into {}",
                    item, parent
                )));
            }
        }
        Ok(())
    }

    /// Every item is detached and listed once
    pub(crate) fn check_detached(&self, items: &[ComponentId]) -> EditorResult<()> {
        let mut seen = HashSet::new();
        for item in items {
            if self.parent(*item)?.is_some() || !seen.insert(*item) {
                return Err(EditorError::structural(format!(
                    "component {} is attached or listed twice",
                    item
                )));
            }
        }
        Ok(())
    }

    /// Detach the half-open range `[start, end)` of `parent`'s children
    pub fn remove_children(
        &mut self,
        parent: ComponentId,
        start: usize,
        end: usize,
    ) -> EditorResult<Vec<ComponentId>> {
        let size = self.size(parent)?;
        if start > end || end > size {
            return Err(EditorError::invalid_range(start as isize, end as isize, size));
        }
        if start == end {
            return Ok(Vec::new());
        }

        self.touch(parent);
        let removed: Vec<ComponentId> = match self.nodes.get_mut(&parent) {
            Some(node) => node.children.drain(start..end).collect(),
            None => Vec::new(),
        };
        for item in &removed {
            self.touch(*item);
            if let Some(node) = self.nodes.get_mut(item) {
                node.parent = None;
            }
        }
        Ok(removed)
    }

    /// Replace variant-specific fields
    pub(crate) fn set_kind(&mut self, id: ComponentId, kind: ComponentKind) -> EditorResult<()> {
        self.get(id)?;
        self.touch(id);
        if let Some(node) = self.nodes.get_mut(&id) {
            node.kind = kind;
        }
        Ok(())
    }

    pub(crate) fn decorate_mut(&mut self, id: ComponentId) -> EditorResult<&mut Decorate> {
        self.get(id)?;
        self.touch(id);
        self.nodes
            .get_mut(&id)
            .map(|node| &mut node.decorate)
            .ok_or(EditorError::NotFound(id))
    }

    // ---- journal ------------------------------------------------------

    /// Capture the component before its first mutation in the open journal
    fn touch(&mut self, id: ComponentId) {
        if let Some(journal) = &mut self.journal {
            if let Some(node) = self.nodes.get(&id) {
                journal.record(node);
            }
        }
    }

    pub(crate) fn start_journal(&mut self) {
        self.journal = Some(Journal::default());
    }

    pub(crate) fn take_journal(&mut self) -> Option<Journal> {
        self.journal.take()
    }

    pub(crate) fn capture(&self, ids: &[ComponentId]) -> Vec<Snapshot> {
        ids.iter()
            .filter_map(|id| self.nodes.get(id))
            .map(Snapshot::capture)
            .collect()
    }

    /// Put captured fields back and re-link parent references.
    ///
    /// A child dropped from a restored list is detached unless another
    /// restored list still holds it.
    pub(crate) fn restore(&mut self, snapshots: &[Snapshot]) {
        let mut dropped = Vec::new();
        for snapshot in snapshots {
            if let Some(node) = self.nodes.get_mut(&snapshot.id) {
                dropped.extend(
                    node.children
                        .iter()
                        .filter(|child| !snapshot.children.contains(child))
                        .copied(),
                );
                snapshot.apply(node);
            }
        }
        for snapshot in snapshots {
            for child in &snapshot.children {
                if let Some(node) = self.nodes.get_mut(child) {
                    node.parent = Some(snapshot.id);
                }
            }
            self.emit_updated(snapshot.id);
        }
        for child in dropped {
            let linked = match self.nodes.get(&child).and_then(|node| node.parent) {
                Some(parent) => self
                    .nodes
                    .get(&parent)
                    .is_some_and(|node| node.children.contains(&child)),
                None => true,
            };
            if !linked {
                trace!(component = %child, "Detached by restore");
                if let Some(node) = self.nodes.get_mut(&child) {
                    node.parent = None;
                }
            }
        }
        debug!(components = snapshots.len(), "Restored snapshot");
    }

    /// Open a nested frame in the running journal
    pub(crate) fn push_savepoint(&mut self) {
        if let Some(journal) = &mut self.journal {
            journal.push_frame();
        }
        self.batch_savepoints.push(self.batch.clone());
    }

    /// Keep what the nested frame changed
    pub(crate) fn release_savepoint(&mut self) {
        if let Some(journal) = &mut self.journal {
            journal.pop_frame();
        }
        self.batch_savepoints.pop();
    }

    /// Undo what the nested frame changed, empty-cell reports included
    pub(crate) fn rollback_savepoint(&mut self) {
        let snapshots = match &mut self.journal {
            Some(journal) => journal.pop_frame(),
            None => Vec::new(),
        };
        self.restore(&snapshots);
        if let Some(batch) = self.batch_savepoints.pop() {
            self.batch = batch;
        }
    }

    // ---- edit batches -------------------------------------------------

    /// Open an explicit edit batch; empty-cell reports coalesce until `end_batch`
    pub fn begin_batch(&mut self) {
        self.explicit_batch = true;
        self.batch = Some(EmptyCellBatch::default());
    }

    /// Close the explicit edit batch and reset every empty-cell counter
    pub fn end_batch(&mut self) {
        self.explicit_batch = false;
        self.batch = None;
    }

    pub fn in_batch(&self) -> bool {
        self.explicit_batch
    }

    /// Close the implicit batch a single call opened for itself
    pub(crate) fn end_implicit_batch(&mut self) {
        if !self.explicit_batch {
            self.batch = None;
        }
    }

    // ---- notifications ------------------------------------------------

    pub(crate) fn emit_updated(&mut self, id: ComponentId) {
        trace!(component = %id, "componentUpdated");
        let event = ComponentEvent::Updated(id);
        if self.events.last() != Some(&event) {
            self.events.push(event);
        }
    }

    /// Hand queued change notifications to the view layer
    pub fn drain_events(&mut self) -> Vec<ComponentEvent> {
        std::mem::take(&mut self.events)
    }

    // ---- housekeeping -------------------------------------------------

    /// Ids reachable from the root, depth first
    pub fn descendants(&self, id: ComponentId) -> Vec<ComponentId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            if let Some(node) = self.nodes.get(&current) {
                stack.extend(node.children.iter().rev());
            }
        }
        out
    }

    /// Drop components unreachable from the root
    pub fn collect_garbage(&mut self) -> usize {
        let reachable: HashSet<ComponentId> = self.descendants(self.root).into_iter().collect();
        let before = self.nodes.len();
        self.nodes.retain(|id, _| reachable.contains(id));
        let dropped = before - self.nodes.len();
        debug!(dropped, "Collected detached components");
        dropped
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paragraph(tree: &mut ComponentTree) -> ComponentId {
        tree.create(ComponentKind::Paragraph, Decorate::default())
    }

    #[test]
    fn test_add_children_sets_parent() {
        let mut tree = ComponentTree::new("test");
        let root = tree.root();
        let a = paragraph(&mut tree);
        let b = paragraph(&mut tree);

        tree.add_children(root, 0, &[a, b]).unwrap();

        assert_eq!(tree.children(root).unwrap(), &[a, b]);
        assert_eq!(tree.parent(a).unwrap(), Some(root));
        assert_eq!(tree.get_prev(b).unwrap(), Some(a));
        assert_eq!(tree.get_next(a).unwrap(), Some(b));
        assert_eq!(tree.get_next(b).unwrap(), None);
    }

    #[test]
    fn test_add_children_rejects_out_of_range() {
        let mut tree = ComponentTree::new("test");
        let root = tree.root();
        let a = paragraph(&mut tree);

        let err = tree.add_children(root, 2, &[a]).unwrap_err();
        assert!(err.is_range_error());
        assert_eq!(tree.parent(a).unwrap(), None);
    }

    #[test]
    fn test_child_is_never_shared() {
        let mut tree = ComponentTree::new("test");
        let root = tree.root();
        let list = tree.create(
            ComponentKind::List(crate::component::ListType::Ul),
            Decorate::default(),
        );
        let a = paragraph(&mut tree);
        tree.add_children(root, 0, &[list, a]).unwrap();

        let err = tree.add_children(list, 0, &[a]).unwrap_err();
        assert!(err.is_structural());

        let removed = tree.remove_children(root, 1, 2).unwrap();
        tree.add_children(list, 0, &removed).unwrap();
        assert_eq!(tree.parent(a).unwrap(), Some(list));
        assert_eq!(tree.size(root).unwrap(), 1);
    }

    #[test]
    fn test_content_rejects_blocks() {
        let mut tree = ComponentTree::new("test");
        let a = paragraph(&mut tree);
        let b = paragraph(&mut tree);

        assert!(tree.add_children(a, 0, &[b]).unwrap_err().is_structural());
    }

    #[test]
    fn test_collect_garbage_drops_detached() {
        let mut tree = ComponentTree::new("test");
        let root = tree.root();
        let a = paragraph(&mut tree);
        let _orphan = paragraph(&mut tree);
        tree.add_children(root, 0, &[a]).unwrap();

        assert_eq!(tree.collect_garbage(), 1);
        assert_eq!(tree.len(), 2);
    }
}
