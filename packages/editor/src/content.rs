//! # Content Collections
//!
//! Text-editing primitives of paragraph-like components (paragraph, header,
//! code block, table item): add, remove, split, receive, range decoration,
//! variant exchange and run coalescing for serialization/rendering.
//!
//! Inline leaves are immutable once created. Re-decorating a range swaps the
//! affected leaves for freshly decorated ones.

use crate::component::{ComponentId, ComponentKind, Cursor, HeaderType, ListType, Operation};
use crate::decorate::{Decorate, StoreData};
use crate::errors::{EditorError, EditorResult};
use crate::tree::ComponentTree;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// What `add` inserts
#[derive(Debug, Clone, PartialEq)]
pub enum InlineInput {
    /// Expanded into characters inheriting the preceding character's decorate
    Text(String),
    /// Detached inline leaves
    Leaves(Vec<ComponentId>),
}

impl From<&str> for InlineInput {
    fn from(text: &str) -> Self {
        InlineInput::Text(text.to_string())
    }
}

impl From<String> for InlineInput {
    fn from(text: String) -> Self {
        InlineInput::Text(text)
    }
}

impl From<ComponentId> for InlineInput {
    fn from(leaf: ComponentId) -> Self {
        InlineInput::Leaves(vec![leaf])
    }
}

impl From<Vec<ComponentId>> for InlineInput {
    fn from(leaves: Vec<ComponentId>) -> Self {
        InlineInput::Leaves(leaves)
    }
}

/// Coalesced view of a content collection's children
#[derive(Debug, Clone, PartialEq)]
pub enum ContentRun {
    /// Adjacent characters sharing one decorate
    Text { content: String, decorate: Decorate },
    /// Any other inline leaf
    Leaf(ComponentId),
}

/// Variant a content block can be switched to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ExchangeTarget {
    Paragraph,
    Header { level: HeaderType },
    CodeBlock { language: String },
    #[serde(rename_all = "camelCase")]
    List { list_type: ListType },
}

impl ComponentTree {
    pub(crate) fn require_content(&self, id: ComponentId) -> EditorResult<()> {
        let kind = self.kind(id)?;
        if kind.is_content() {
            Ok(())
        } else {
            Err(EditorError::structural(format!(
                "{} is not a content collection",
                kind.type_tag()
            )))
        }
    }

    /// Plain text of a content collection (inline images excluded)
    pub fn text(&self, id: ComponentId) -> EditorResult<String> {
        let mut out = String::new();
        for child in self.children(id)? {
            if let ComponentKind::Character(c) = self.kind(*child)? {
                out.push(*c);
            }
        }
        Ok(out)
    }

    /// Insert inline leaves (or text) at `index`, defaulting to the end
    pub fn add(
        &mut self,
        id: ComponentId,
        input: impl Into<InlineInput>,
        index: Option<usize>,
    ) -> EditorResult<Operation> {
        self.require_content(id)?;
        let size = self.size(id)?;
        let index = index.unwrap_or(size);
        if index > size {
            return Err(EditorError::invalid_range(index as isize, index as isize, size));
        }

        let leaves = match input.into() {
            InlineInput::Text(text) => {
                let decorate = self.inherited_decorate(id, index)?;
                text.chars()
                    .map(|c| self.create(ComponentKind::Character(c), decorate.clone()))
                    .collect()
            }
            InlineInput::Leaves(leaves) => leaves,
        };

        self.add_children(id, index, &leaves)?;
        self.emit_updated(id);
        Ok(Operation::new(vec![id], Cursor::new(id, index + leaves.len())))
    }

    /// Decorate typed text continues with: the character just before `index`
    fn inherited_decorate(&self, id: ComponentId, index: usize) -> EditorResult<Decorate> {
        if index == 0 {
            return Ok(Decorate::default());
        }
        match self.get_child(id, index - 1)? {
            Some(prev) => {
                let node = self.get(prev)?;
                match node.kind {
                    ComponentKind::Character(_) => Ok(node.decorate.clone()),
                    _ => Ok(Decorate::default()),
                }
            }
            None => Ok(Decorate::default()),
        }
    }

    /// Remove the half-open range `[start, end)`; `end` defaults to `start + 1`.
    ///
    /// `(-1, 0)` means backspace at the very head of this collection and is
    /// resolved by the parent (see `child_head_delete`).
    pub fn remove(
        &mut self,
        id: ComponentId,
        start: isize,
        end: Option<isize>,
    ) -> EditorResult<Operation> {
        self.require_content(id)?;
        let end = end.unwrap_or(start.saturating_add(1));

        if start == -1 && end == 0 {
            let parent = self.require_parent(id)?;
            return self.child_head_delete(parent, id);
        }

        let size = self.size(id)?;
        if start < 0 || end < start || end as usize > size {
            return Err(EditorError::invalid_range(start, end, size));
        }
        let (start, end) = (start as usize, end as usize);

        self.remove_children(id, start, end)?;
        self.emit_updated(id);

        if end > start && matches!(self.kind(id)?, ComponentKind::TableItem) {
            self.report_item_emptied(id)?;
        }

        Ok(Operation::new(vec![id], Cursor::new(id, start)))
    }

    /// Split at `index`; `extra` blocks are placed between head and tail.
    pub fn split(
        &mut self,
        id: ComponentId,
        index: usize,
        extra: &[ComponentId],
    ) -> EditorResult<Operation> {
        self.require_content(id)?;
        if matches!(self.kind(id)?, ComponentKind::TableItem) {
            return self.split_table_item(id, index, extra);
        }
        self.split_content(id, index, extra)
    }

    pub(crate) fn split_content(
        &mut self,
        id: ComponentId,
        index: usize,
        extra: &[ComponentId],
    ) -> EditorResult<Operation> {
        let size = self.size(id)?;
        if index > size {
            return Err(EditorError::invalid_range(index as isize, index as isize, size));
        }
        let (parent, block_index) = self.index_in_parent(id)?;

        self.check_insertable(parent, extra)?;

        let tail = self.split_child(id, index)?;
        let tail_is_empty = self.size(tail)? == 0;

        let mut new_blocks = extra.to_vec();
        if !tail_is_empty || extra.is_empty() {
            new_blocks.push(tail);
        }
        self.add_children(parent, block_index + 1, &new_blocks)?;
        self.emit_updated(id);
        self.emit_updated(parent);
        debug!(component = %id, index, inserted = new_blocks.len(), "Split content");

        let anchor = if new_blocks.last() == Some(&tail) {
            Cursor::new(tail, 0)
        } else {
            self.end_cursor(new_blocks.last().copied().unwrap_or(id), id, index)?
        };
        Ok(Operation::new(new_blocks, anchor))
    }

    /// Caret after an inserted block, or back where the split happened
    fn end_cursor(
        &self,
        block: ComponentId,
        fallback: ComponentId,
        offset: usize,
    ) -> EditorResult<Cursor> {
        if self.kind(block)?.is_content() {
            Ok(Cursor::new(block, self.size(block)?))
        } else {
            Ok(Cursor::new(fallback, offset))
        }
    }

    /// Cut everything from `index` on into a new detached collection.
    ///
    /// Splitting mid-content keeps the variant; splitting at the very end
    /// starts a plain block of the container's default variant.
    fn split_child(&mut self, id: ComponentId, index: usize) -> EditorResult<ComponentId> {
        let size = self.size(id)?;
        if index == size {
            let kind = match self.kind(id)? {
                ComponentKind::TableItem => ComponentKind::TableItem,
                _ => ComponentKind::Paragraph,
            };
            return Ok(self.create(kind, Decorate::default()));
        }

        let tail = self.create_empty(id)?;
        let moved = self.remove_children(id, index, size)?;
        self.add_children(tail, 0, &moved)?;
        Ok(tail)
    }

    /// Absorb the content of another content collection at the end.
    pub(crate) fn receive_content(
        &mut self,
        target: ComponentId,
        donor: ComponentId,
    ) -> EditorResult<Operation> {
        if !self.kind(donor)?.is_content() {
            debug!(target = %target, donor = %donor, "Receive refused: donor has no content");
            return Ok(Operation::empty());
        }

        let size = self.size(target)?;
        let donor_size = self.size(donor)?;
        let leaves = self.remove_children(donor, 0, donor_size)?;
        // Leaves land first so a table cell never looks empty mid-merge
        self.add_children(target, size, &leaves)?;
        self.remove_self(donor)?;
        self.emit_updated(target);

        Ok(Operation::new(vec![target], Cursor::new(target, size)))
    }

    /// Apply a decoration patch to every leaf in `[start, end]`.
    ///
    /// A negative `end` counts from the tail (`size + end`). Nothing changes
    /// when `start > end` or when neither patch is given.
    pub fn modify_content_decorate(
        &mut self,
        id: ComponentId,
        start: usize,
        end: isize,
        style: Option<&StoreData>,
        data: Option<&StoreData>,
    ) -> EditorResult<Operation> {
        self.require_content(id)?;
        let size = self.size(id)?;
        let end = if end < 0 { size as isize + end } else { end };

        let empty_range = end < 0 || start > end as usize;
        if empty_range || (style.is_none() && data.is_none()) {
            return Ok(Operation::new(vec![id], Cursor::new(id, start)));
        }
        let end = end as usize;
        if end >= size {
            return Err(EditorError::invalid_range(start as isize, end as isize, size));
        }

        let current: Vec<ComponentId> = self.children(id)?[start..=end].to_vec();
        let mut replaced = Vec::with_capacity(current.len());
        for leaf in &current {
            let node = self.get(*leaf)?;
            let mut decorate = node.decorate.clone();
            decorate.modify_decorate(style, data);
            if decorate == node.decorate {
                replaced.push(*leaf);
            } else {
                let kind = node.kind.clone();
                replaced.push(self.create(kind, decorate));
            }
        }

        self.remove_children(id, start, end + 1)?;
        self.add_children(id, start, &replaced)?;
        self.emit_updated(id);

        Ok(Operation::range(
            vec![id],
            Cursor::new(id, start),
            Cursor::new(id, end),
        ))
    }

    /// Change block decoration (merge semantics)
    pub fn modify_decorate(
        &mut self,
        id: ComponentId,
        style: Option<&StoreData>,
        data: Option<&StoreData>,
    ) -> EditorResult<Operation> {
        self.decorate_mut(id)?.modify_decorate(style, data);
        self.emit_updated(id);
        Ok(Operation::new(vec![id], Cursor::new(id, 0)))
    }

    pub fn clear_decorate(&mut self, id: ComponentId) -> EditorResult<Operation> {
        let decorate = self.decorate_mut(id)?;
        decorate.clear_style();
        decorate.clear_data();
        self.emit_updated(id);
        Ok(Operation::new(vec![id], Cursor::new(id, 0)))
    }

    /// Switch a content block to another variant
    pub fn exchange(
        &mut self,
        id: ComponentId,
        target: &ExchangeTarget,
    ) -> EditorResult<Operation> {
        match self.kind(id)? {
            ComponentKind::TableItem => {
                return Err(EditorError::structural(
                    "table cell content may not change structural type",
                ))
            }
            kind if !kind.is_content() => {
                return Err(EditorError::structural(format!(
                    "{} cannot change structural type",
                    kind.type_tag()
                )))
            }
            _ => {}
        }

        let kind = match target {
            ExchangeTarget::Paragraph => ComponentKind::Paragraph,
            ExchangeTarget::Header { level } => ComponentKind::Header(*level),
            ExchangeTarget::CodeBlock { language } => ComponentKind::CodeBlock {
                language: language.clone(),
            },
            ExchangeTarget::List { list_type } => return self.wrap_in_list(id, *list_type),
        };

        self.set_kind(id, kind)?;
        self.emit_updated(id);
        Ok(Operation::new(vec![id], Cursor::new(id, 0)))
    }

    fn wrap_in_list(&mut self, id: ComponentId, list_type: ListType) -> EditorResult<Operation> {
        let (parent, index) = self.index_in_parent(id)?;
        if let ComponentKind::List(current) = self.kind(parent)? {
            if *current == list_type {
                return Ok(Operation::new(vec![parent], Cursor::new(id, 0)));
            }
        }

        let list = self.create(ComponentKind::List(list_type), Decorate::default());
        let removed = self.remove_children(parent, index, index + 1)?;
        self.add_children(list, 0, &removed)?;
        self.add_children(parent, index, &[list])?;
        self.emit_updated(parent);
        Ok(Operation::new(vec![list], Cursor::new(id, 0)))
    }

    /// Coalesce adjacent characters with identical decorate into runs
    pub fn format_children(&self, id: ComponentId) -> EditorResult<Vec<ContentRun>> {
        let mut runs = Vec::new();
        let mut acc = String::new();
        let mut prev: Option<&Decorate> = None;

        for child in self.children(id)? {
            let node = self.get(*child)?;
            match node.kind {
                ComponentKind::Character(c) => {
                    if let Some(decorate) = prev {
                        if !decorate.is_same(&node.decorate) {
                            runs.push(ContentRun::Text {
                                content: std::mem::take(&mut acc),
                                decorate: decorate.clone(),
                            });
                        }
                    }
                    prev = Some(&node.decorate);
                    acc.push(c);
                }
                _ => {
                    if let Some(decorate) = prev.take() {
                        runs.push(ContentRun::Text {
                            content: std::mem::take(&mut acc),
                            decorate: decorate.clone(),
                        });
                    }
                    runs.push(ContentRun::Leaf(*child));
                }
            }
        }

        if let Some(decorate) = prev {
            runs.push(ContentRun::Text {
                content: acc,
                decorate: decorate.clone(),
            });
        }
        Ok(runs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::MediaType;
    use crate::decorate::store;

    fn paragraph(tree: &mut ComponentTree, text: &str) -> ComponentId {
        let root = tree.root();
        let id = tree.build_paragraph(text).unwrap();
        let size = tree.size(root).unwrap();
        tree.add_children(root, size, &[id]).unwrap();
        id
    }

    #[test]
    fn test_remove_head_character() {
        let mut tree = ComponentTree::new("test");
        let p = paragraph(&mut tree, "ab");

        let op = tree.remove(p, 0, Some(1)).unwrap();

        assert_eq!(tree.text(p).unwrap(), "b");
        assert_eq!(op.anchor, Some(Cursor::new(p, 0)));
    }

    #[test]
    fn test_remove_rejects_negative_start() {
        let mut tree = ComponentTree::new("test");
        let p = paragraph(&mut tree, "ab");

        assert!(tree.remove(p, -2, Some(1)).unwrap_err().is_range_error());
        assert!(tree.remove(p, 1, Some(5)).unwrap_err().is_range_error());
        assert_eq!(tree.text(p).unwrap(), "ab");
    }

    #[test]
    fn test_typed_text_inherits_previous_decorate() {
        let mut tree = ComponentTree::new("test");
        let p = paragraph(&mut tree, "ab");
        let bold = store([("fontWeight", "bold")]);
        tree.modify_content_decorate(p, 1, 1, Some(&bold), None)
            .unwrap();

        let op = tree.add(p, "c", Some(2)).unwrap();

        assert_eq!(op.anchor, Some(Cursor::new(p, 3)));
        let c = tree.get_child(p, 2).unwrap().unwrap();
        assert_eq!(tree.decorate(c).unwrap().style(), &bold);

        // Inserting at the head starts undecorated
        tree.add(p, "z", Some(0)).unwrap();
        let z = tree.get_child(p, 0).unwrap().unwrap();
        assert!(tree.decorate(z).unwrap().is_empty());
    }

    #[test]
    fn test_split_middle_keeps_variant() {
        let mut tree = ComponentTree::new("test");
        let root = tree.root();
        let header = tree.build_header(HeaderType::H3, "abcd").unwrap();
        tree.add_children(root, 0, &[header]).unwrap();

        let op = tree.split(header, 2, &[]).unwrap();

        let tail = op.affected[0];
        assert_eq!(tree.text(header).unwrap(), "ab");
        assert_eq!(tree.text(tail).unwrap(), "cd");
        assert_eq!(tree.kind(tail).unwrap(), &ComponentKind::Header(HeaderType::H3));
        assert_eq!(op.anchor, Some(Cursor::new(tail, 0)));
    }

    #[test]
    fn test_split_at_end_starts_paragraph() {
        let mut tree = ComponentTree::new("test");
        let root = tree.root();
        let header = tree.build_header(HeaderType::H1, "ab").unwrap();
        tree.add_children(root, 0, &[header]).unwrap();

        let op = tree.split(header, 2, &[]).unwrap();

        let tail = op.affected[0];
        assert_eq!(tree.kind(tail).unwrap(), &ComponentKind::Paragraph);
        assert_eq!(tree.size(tail).unwrap(), 0);
        assert_eq!(tree.children(root).unwrap(), &[header, tail]);
    }

    #[test]
    fn test_split_with_extra_block_omits_empty_tail() {
        let mut tree = ComponentTree::new("test");
        let p = paragraph(&mut tree, "ab");
        let media = tree
            .build_media(crate::component::MediaType::Image, "a.png")
            .unwrap();

        let op = tree.split(p, 2, &[media]).unwrap();

        assert_eq!(op.affected, vec![media]);
        assert_eq!(tree.children(tree.root()).unwrap(), &[p, media]);
        assert_eq!(op.anchor, Some(Cursor::new(p, 2)));
    }

    #[test]
    fn test_split_preserves_content() {
        let mut tree = ComponentTree::new("test");
        let p = paragraph(&mut tree, "hello world");
        let before: Vec<ComponentId> = tree.children(p).unwrap().to_vec();

        for index in 0..=before.len() {
            let mut tree = ComponentTree::new("test");
            let p = paragraph(&mut tree, "hello world");
            let op = tree.split(p, index, &[]).unwrap();
            let tail = op.affected[0];
            let joined = format!("{}{}", tree.text(p).unwrap(), tree.text(tail).unwrap());
            assert_eq!(joined, "hello world");
        }
    }

    #[test]
    fn test_decorate_range_and_noops() {
        let mut tree = ComponentTree::new("test");
        let p = paragraph(&mut tree, "abcd");
        let italic = store([("fontStyle", "italic")]);

        let op = tree
            .modify_content_decorate(p, 1, -1, Some(&italic), None)
            .unwrap();
        assert_eq!(op.focus, Some(Cursor::new(p, 3)));

        let runs = tree.format_children(p).unwrap();
        assert_eq!(runs.len(), 2);
        assert_eq!(
            runs[1],
            ContentRun::Text {
                content: "bcd".to_string(),
                decorate: Decorate::new(Some(italic.clone()), None),
            }
        );

        let before = tree.children(p).unwrap().to_vec();
        let op = tree.modify_content_decorate(p, 3, 1, Some(&italic), None).unwrap();
        assert_eq!(op.anchor, Some(Cursor::new(p, 3)));
        tree.modify_content_decorate(p, 0, -1, None, None).unwrap();
        assert_eq!(tree.children(p).unwrap(), before.as_slice());
    }

    #[test]
    fn test_exchange_to_header_and_list() {
        let mut tree = ComponentTree::new("test");
        let p = paragraph(&mut tree, "ab");

        tree.exchange(p, &ExchangeTarget::Header { level: HeaderType::H2 })
            .unwrap();
        assert_eq!(tree.kind(p).unwrap(), &ComponentKind::Header(HeaderType::H2));

        let op = tree
            .exchange(p, &ExchangeTarget::List { list_type: ListType::Ul })
            .unwrap();
        let list = op.affected[0];
        assert_eq!(tree.parent(p).unwrap(), Some(list));
        assert_eq!(tree.children(tree.root()).unwrap(), &[list]);
    }

    #[test]
    fn test_rejected_split_leaves_block_whole() {
        let mut tree = ComponentTree::new("test");
        let p = paragraph(&mut tree, "ab");
        let media = tree.build_media(MediaType::Image, "a.png").unwrap();

        let err = tree.split(p, 1, &[media, media]).unwrap_err();
        assert!(err.is_structural());
        assert_eq!(tree.text(p).unwrap(), "ab");
        assert_eq!(tree.size(tree.root()).unwrap(), 1);

        assert!(tree.split(p, 1, &[p]).unwrap_err().is_structural());
        assert_eq!(tree.text(p).unwrap(), "ab");
    }

    #[test]
    fn test_huge_offsets_are_range_errors() {
        let mut tree = ComponentTree::new("test");
        let p = paragraph(&mut tree, "ab");
        let bold = store([("fontWeight", "bold")]);

        let op = tree
            .modify_content_decorate(p, usize::MAX, -1, Some(&bold), None)
            .unwrap();
        assert_eq!(op.affected, vec![p]);
        assert!(tree.remove(p, isize::MAX, None).unwrap_err().is_range_error());
        assert!(tree.remove(p, 0, Some(isize::MAX)).unwrap_err().is_range_error());
        assert_eq!(tree.text(p).unwrap(), "ab");
    }
}
