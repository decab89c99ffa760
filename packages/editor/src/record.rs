//! # Undo/Redo Record Engine
//!
//! Tracks edit history as structural snapshots and enables undo/redo.
//!
//! ## Design
//!
//! - Every user-facing edit runs inside a journal on the tree
//! - The first time a component is touched inside the journal its structural
//!   state (variant fields, decorate, parent, child id list) is captured
//! - Committing turns the journal into one [`Record`]: one logical edit is
//!   one undo step, however many components it touched
//! - Nested edits join the outer record but keep a savepoint, so a nested
//!   failure is put back on its own
//! - Undo captures the current state of the same components, restores the
//!   before-snapshots and moves the record to the redo stack
//! - Redo restores the captured after-state and moves the record back
//! - A new edit clears the redo stack
//!
//! Inline leaves are never mutated in place (re-decorating replaces them),
//! so a child id list is enough to put a content collection back.
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut editor = Editor::new(EditorConfig::default());
//! let op = editor.insert_text(paragraph, 0, "Hello")?;
//!
//! editor.undo()?;
//! editor.redo()?;
//! ```

use crate::component::{ComponentId, ComponentKind, Cursor, Node};
use crate::decorate::Decorate;
use crate::tree::ComponentTree;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Minimal state needed to put one component back
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub id: ComponentId,
    pub kind: ComponentKind,
    pub decorate: Decorate,
    pub parent: Option<ComponentId>,
    pub children: Vec<ComponentId>,
}

impl Snapshot {
    pub(crate) fn capture(node: &Node) -> Self {
        Self {
            id: node.id,
            kind: node.kind.clone(),
            decorate: node.decorate.clone(),
            parent: node.parent,
            children: node.children.clone(),
        }
    }

    pub(crate) fn apply(&self, node: &mut Node) {
        node.kind = self.kind.clone();
        node.decorate = self.decorate.clone();
        node.parent = self.parent;
        node.children = self.children.clone();
    }
}

/// Copy-on-first-write capture of everything one logical edit touches.
///
/// Nested edits open a frame of their own so a failing inner edit can be
/// put back while the outer edit keeps going.
#[derive(Debug)]
pub struct Journal {
    frames: Vec<Frame>,
}

#[derive(Debug, Default)]
struct Frame {
    order: Vec<ComponentId>,
    snapshots: HashMap<ComponentId, Snapshot>,
    created: HashSet<ComponentId>,
}

impl Frame {
    fn record(&mut self, node: &Node) {
        if self.created.contains(&node.id) || self.snapshots.contains_key(&node.id) {
            return;
        }
        self.order.push(node.id);
        self.snapshots.insert(node.id, Snapshot::capture(node));
    }

    fn into_snapshots(mut self) -> Vec<Snapshot> {
        self.order
            .iter()
            .filter_map(|id| self.snapshots.remove(id))
            .collect()
    }
}

impl Default for Journal {
    fn default() -> Self {
        Self {
            frames: vec![Frame::default()],
        }
    }
}

impl Journal {
    pub(crate) fn record(&mut self, node: &Node) {
        for frame in &mut self.frames {
            frame.record(node);
        }
    }

    /// Components created during the edit need no before-state
    pub(crate) fn created(&mut self, id: ComponentId) {
        for frame in &mut self.frames {
            frame.created.insert(id);
        }
    }

    pub(crate) fn push_frame(&mut self) {
        self.frames.push(Frame::default());
    }

    /// Close the innermost nested frame, returning its before-state
    pub(crate) fn pop_frame(&mut self) -> Vec<Snapshot> {
        if self.frames.len() < 2 {
            return Vec::new();
        }
        self.frames
            .pop()
            .map(Frame::into_snapshots)
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.first().map_or(true, |frame| frame.order.is_empty())
    }

    pub(crate) fn into_snapshots(mut self) -> Vec<Snapshot> {
        if self.frames.is_empty() {
            return Vec::new();
        }
        self.frames.swap_remove(0).into_snapshots()
    }
}

/// One undo step
#[derive(Debug, Clone)]
pub struct Record {
    /// State of every touched component before the edit
    pub before: Vec<Snapshot>,

    /// State of the same components after the edit, captured on first undo
    pub after: Option<Vec<Snapshot>>,

    pub cursor_before: Option<Cursor>,
    pub cursor_after: Option<Cursor>,

    /// Optional description of this record
    pub description: Option<String>,
}

impl Record {
    fn ids(&self) -> Vec<ComponentId> {
        self.before.iter().map(|s| s.id).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordState {
    Idle,
    Recording,
    Committed,
}

/// Outcome of undo/redo handed back to the selection layer
#[derive(Debug, Clone, PartialEq)]
pub struct Restored {
    pub components: Vec<ComponentId>,
    pub cursor: Option<Cursor>,
}

/// Undo/redo stacks for one edit session
#[derive(Debug)]
pub struct RecordEngine {
    /// Stack of applied records (most recent last)
    undo_stack: Vec<Record>,

    /// Stack of undone records (most recent last)
    redo_stack: Vec<Record>,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,

    state: RecordState,

    /// Nesting depth of `begin` calls; only the outermost commits
    depth: usize,
}

impl RecordEngine {
    /// Create an engine with default max levels (100)
    pub fn new() -> Self {
        Self::with_max_levels(100)
    }

    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_levels,
            state: RecordState::Idle,
            depth: 0,
        }
    }

    pub fn state(&self) -> RecordState {
        self.state
    }

    /// Start recording a logical edit; nested calls join the outer record
    pub fn begin(&mut self, tree: &mut ComponentTree) {
        if self.depth == 0 {
            tree.start_journal();
            self.state = RecordState::Recording;
        } else {
            tree.push_savepoint();
        }
        self.depth += 1;
    }

    /// Finish a logical edit. Returns true when a record was pushed.
    pub fn commit(
        &mut self,
        tree: &mut ComponentTree,
        cursor_before: Option<Cursor>,
        cursor_after: Option<Cursor>,
        description: Option<String>,
    ) -> bool {
        self.depth = self.depth.saturating_sub(1);
        if self.depth > 0 {
            tree.release_savepoint();
            return false;
        }

        self.state = RecordState::Committed;
        let Some(journal) = tree.take_journal() else {
            return false;
        };
        // An edit that changed nothing must not invalidate redo
        if journal.is_empty() {
            return false;
        }

        self.push_record(Record {
            before: journal.into_snapshots(),
            after: None,
            cursor_before,
            cursor_after,
            description,
        });
        true
    }

    /// Abandon the innermost open edit and put what it touched back.
    ///
    /// A nested edit only undoes its own changes; the outer record stays open.
    pub fn rollback(&mut self, tree: &mut ComponentTree) {
        self.depth = self.depth.saturating_sub(1);
        if self.depth > 0 {
            debug!(depth = self.depth, "Rolling back nested edit");
            tree.rollback_savepoint();
            return;
        }
        if let Some(journal) = tree.take_journal() {
            let snapshots = journal.into_snapshots();
            debug!(components = snapshots.len(), "Rolling back failed edit");
            tree.restore(&snapshots);
        }
        self.state = RecordState::Idle;
    }

    fn push_record(&mut self, record: Record) {
        self.undo_stack.push(record);

        // Trim if exceeded max levels
        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.remove(0);
        }

        // New action invalidates future
        self.redo_stack.clear();
    }

    /// Undo the most recent record
    pub fn undo(&mut self, tree: &mut ComponentTree) -> Option<Restored> {
        let mut record = self.undo_stack.pop()?;
        let ids = record.ids();
        if record.after.is_none() {
            record.after = Some(tree.capture(&ids));
        }
        tree.restore(&record.before);

        let restored = Restored {
            components: ids,
            cursor: record.cursor_before,
        };
        self.redo_stack.push(record);
        self.state = RecordState::Idle;
        Some(restored)
    }

    /// Redo the most recently undone record
    pub fn redo(&mut self, tree: &mut ComponentTree) -> Option<Restored> {
        let record = self.redo_stack.pop()?;
        if let Some(after) = &record.after {
            tree.restore(after);
        }

        let restored = Restored {
            components: record.ids(),
            cursor: record.cursor_after,
        };
        self.undo_stack.push(record);
        self.state = RecordState::Idle;
        Some(restored)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    /// Clear all undo/redo history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.state = RecordState::Idle;
    }

    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack
            .last()
            .and_then(|record| record.description.as_deref())
    }

    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack
            .last()
            .and_then(|record| record.description.as_deref())
    }
}

impl Default for RecordEngine {
    fn default() -> Self {
        Self::new()
    }
}
