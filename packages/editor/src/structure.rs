//! # Structure Collections
//!
//! Variant-aware behaviour shared by every collection: removal rules that
//! cascade upward, backspace-at-head resolution, the send/receive merge
//! protocol dispatch and bottom-up statistics.

use crate::component::{ComponentId, ComponentKind, Cursor, MediaType, Operation, Statistic};
use crate::decorate::Decorate;
use crate::errors::{EditorError, EditorResult};
use crate::tree::ComponentTree;
use tracing::debug;

impl ComponentTree {
    /// Remove `[start, end)` from `parent`, honouring the parent variant's rules.
    ///
    /// - a table cell never loses its last item; the item is emptied instead
    /// - a table that loses its last row removes itself from its parent
    pub fn remove_range(
        &mut self,
        parent: ComponentId,
        start: usize,
        end: usize,
    ) -> EditorResult<Vec<ComponentId>> {
        let removed = match self.kind(parent)?.clone() {
            ComponentKind::TableCell(_) if self.size(parent)? == 1 && start == 0 && end == 1 => {
                let item = self.get_child(parent, 0)?.ok_or(EditorError::NotFound(parent))?;
                let len = self.size(item)?;
                self.remove_children(item, 0, len)?;
                self.emit_updated(item);
                Vec::new()
            }
            ComponentKind::Table { .. } => {
                let removed = self.remove_children(parent, start, end)?;
                if self.size(parent)? == 0 {
                    debug!(table = %parent, "Table lost its last row");
                    self.remove_self(parent)?;
                }
                removed
            }
            _ => self.remove_children(parent, start, end)?,
        };

        self.emit_updated(parent);
        Ok(removed)
    }

    /// Detach this component from its parent, cascading as the parent requires
    pub fn remove_self(&mut self, id: ComponentId) -> EditorResult<Operation> {
        let Some(parent) = self.parent(id)? else {
            return Ok(Operation::empty());
        };
        let index = self.find_children_index(parent, id)?.ok_or_else(|| {
            EditorError::structural(format!("component {} missing from its parent", id))
        })?;

        self.remove_range(parent, index, index + 1)?;

        // An item leaving a cell may leave that cell empty
        if matches!(self.kind(id)?, ComponentKind::TableItem) && self.cell_is_empty(parent)? {
            if let Some(row) = self.parent(parent)? {
                self.count_empty_cell(row, parent)?;
            }
        }

        Ok(Operation::affected(vec![parent]))
    }

    /// Insert blocks into a structure collection
    pub fn add_blocks(
        &mut self,
        parent: ComponentId,
        index: Option<usize>,
        blocks: &[ComponentId],
    ) -> EditorResult<Operation> {
        let index = match index {
            Some(index) => index,
            None => self.size(parent)?,
        };
        self.add_children(parent, index, blocks)?;
        self.emit_updated(parent);

        let anchor = match blocks.first() {
            Some(first) => Cursor::new(*first, 0),
            None => Cursor::new(parent, index),
        };
        Ok(Operation::new(blocks.to_vec(), anchor))
    }

    /// Backspace pressed at offset 0 of `child`; decided by the parent variant
    pub fn child_head_delete(
        &mut self,
        parent: ComponentId,
        child: ComponentId,
    ) -> EditorResult<Operation> {
        let prev = self.get_prev(child)?;

        match self.kind(parent)?.clone() {
            ComponentKind::Article | ComponentKind::Custom { .. } => match prev {
                Some(prev) => self.send_to(child, prev),
                None => {
                    let kind = self.kind(child)?;
                    if kind.is_content() && !matches!(kind, ComponentKind::Paragraph) {
                        self.set_kind(child, ComponentKind::Paragraph)?;
                        self.emit_updated(child);
                    }
                    Ok(Operation::new(vec![child], Cursor::new(child, 0)))
                }
            },
            ComponentKind::List(_) => match prev {
                Some(prev) => self.send_to(child, prev),
                None => self.lift_out_of_list(parent, child),
            },
            ComponentKind::TableCell(_) => match prev {
                Some(prev) => self.send_to(child, prev),
                None => Ok(Operation::affected(vec![parent])),
            },
            _ => Ok(Operation::empty()),
        }
    }

    /// Move the first item of a list in front of the list
    fn lift_out_of_list(
        &mut self,
        list: ComponentId,
        child: ComponentId,
    ) -> EditorResult<Operation> {
        let (outer, list_index) = self.index_in_parent(list)?;
        let removed = self.remove_children(list, 0, 1)?;
        self.add_children(outer, list_index, &removed)?;
        if self.size(list)? == 0 {
            self.remove_self(list)?;
        } else {
            self.emit_updated(list);
        }
        self.emit_updated(outer);
        Ok(Operation::new(vec![child], Cursor::new(child, 0)))
    }

    /// Ask `target` to absorb `donor`
    pub fn send_to(&mut self, donor: ComponentId, target: ComponentId) -> EditorResult<Operation> {
        self.receive(target, donor)
    }

    /// Absorb `donor` into `target`. An incompatible donor is refused with an
    /// empty operation, never an error.
    pub fn receive(&mut self, target: ComponentId, donor: ComponentId) -> EditorResult<Operation> {
        if target == donor {
            return Ok(Operation::empty());
        }

        match self.kind(target)?.clone() {
            kind if kind.is_content() => self.receive_content(target, donor),
            ComponentKind::Table { .. } | ComponentKind::Media { .. } => {
                debug!(
                    target = %target,
                    donor = %donor,
                    "Block removed by backspace from the next block"
                );
                self.remove_self(target)?;
                Ok(Operation::new(vec![donor], Cursor::new(donor, 0)))
            }
            ComponentKind::List(_) | ComponentKind::Custom { .. } => {
                let last = self.children(target)?.last().copied();
                match last {
                    Some(last) => self.receive(last, donor),
                    None => Ok(Operation::empty()),
                }
            }
            _ => Ok(Operation::empty()),
        }
    }

    /// Insert an empty paragraph above or below the top-level block holding `id`
    pub fn add_empty_paragraph(
        &mut self,
        id: ComponentId,
        bottom: bool,
    ) -> EditorResult<Operation> {
        let mut block = id;
        loop {
            let parent = self.require_parent(block)?;
            if matches!(
                self.kind(parent)?,
                ComponentKind::Article | ComponentKind::Custom { .. }
            ) {
                break;
            }
            block = parent;
        }

        let (parent, index) = self.index_in_parent(block)?;
        let paragraph = self.create(ComponentKind::Paragraph, Decorate::default());
        let at = if bottom { index + 1 } else { index };
        self.add_children(parent, at, &[paragraph])?;
        self.emit_updated(parent);
        Ok(Operation::new(vec![paragraph], Cursor::new(paragraph, 0)))
    }

    /// Whether a component holds no user content
    pub fn is_empty_component(&self, id: ComponentId) -> EditorResult<bool> {
        let node = self.get(id)?;
        Ok(match &node.kind {
            kind if kind.is_content() => node.children.is_empty(),
            ComponentKind::TableCell(_) => self.cell_is_empty(id)?,
            ComponentKind::Article => match node.children.as_slice() {
                [] => true,
                [only] => {
                    let only = self.get(*only)?;
                    only.kind.is_content() && only.children.is_empty()
                }
                _ => false,
            },
            ComponentKind::Media { .. }
            | ComponentKind::Character(_)
            | ComponentKind::InlineImage { .. } => false,
            _ => {
                for child in &node.children {
                    if !self.is_empty_component(*child)? {
                        return Ok(false);
                    }
                }
                true
            }
        })
    }

    /// Aggregate counts bottom-up
    pub fn get_statistic(&self, id: ComponentId) -> EditorResult<Statistic> {
        let node = self.get(id)?;
        let mut res = Statistic::default();

        match &node.kind {
            ComponentKind::Character(_) => res.characters += 1,
            ComponentKind::InlineImage { .. } => res.inline_images += 1,
            ComponentKind::Paragraph => res.paragraphs += 1,
            ComponentKind::Header(_) => res.headers += 1,
            ComponentKind::CodeBlock { .. } => res.code_blocks += 1,
            ComponentKind::List(_) => res.lists += 1,
            ComponentKind::Table { .. } => res.tables += 1,
            ComponentKind::Media { media_type, .. } => match media_type {
                MediaType::Image => res.images += 1,
                MediaType::Audio => res.audio += 1,
                MediaType::Video => res.video += 1,
            },
            _ => {}
        }

        for child in &node.children {
            res += self.get_statistic(*child)?;
        }
        Ok(res)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ListType;

    fn article_with(tree: &mut ComponentTree, texts: &[&str]) -> Vec<ComponentId> {
        let root = tree.root();
        let ids: Vec<ComponentId> = texts
            .iter()
            .map(|text| tree.build_paragraph(text).unwrap())
            .collect();
        tree.add_children(root, 0, &ids).unwrap();
        ids
    }

    #[test]
    fn test_head_delete_merges_into_previous() {
        let mut tree = ComponentTree::new("test");
        let ids = article_with(&mut tree, &["ab", "cd"]);

        let op = tree.remove(ids[1], -1, Some(0)).unwrap();

        assert_eq!(op.affected, vec![ids[0]]);
        assert_eq!(op.anchor, Some(Cursor::new(ids[0], 2)));
        assert_eq!(tree.text(ids[0]).unwrap(), "abcd");
        assert_eq!(tree.size(tree.root()).unwrap(), 1);
    }

    #[test]
    fn test_head_delete_first_header_becomes_paragraph() {
        let mut tree = ComponentTree::new("test");
        let root = tree.root();
        let header = tree
            .build_header(crate::component::HeaderType::H2, "Title")
            .unwrap();
        tree.add_children(root, 0, &[header]).unwrap();

        tree.remove(header, -1, Some(0)).unwrap();

        assert_eq!(tree.kind(header).unwrap(), &ComponentKind::Paragraph);
        assert_eq!(tree.text(header).unwrap(), "Title");
    }

    #[test]
    fn test_head_delete_lifts_first_list_item() {
        let mut tree = ComponentTree::new("test");
        let root = tree.root();
        let a = tree.build_paragraph("a").unwrap();
        let b = tree.build_paragraph("b").unwrap();
        let list = tree.build_list(ListType::Ol, &[a, b]).unwrap();
        tree.add_children(root, 0, &[list]).unwrap();

        tree.remove(a, -1, Some(0)).unwrap();

        assert_eq!(tree.children(root).unwrap(), &[a, list]);
        assert_eq!(tree.children(list).unwrap(), &[b]);
    }

    #[test]
    fn test_receive_refuses_non_content_donor() {
        let mut tree = ComponentTree::new("test");
        let ids = article_with(&mut tree, &["ab"]);
        let media = tree
            .build_media(MediaType::Image, "https://example.com/a.png")
            .unwrap();

        let op = tree.receive(ids[0], media).unwrap();

        assert!(op.is_empty());
        assert_eq!(tree.text(ids[0]).unwrap(), "ab");
    }

    #[test]
    fn test_add_empty_paragraph_below() {
        let mut tree = ComponentTree::new("test");
        let ids = article_with(&mut tree, &["ab"]);

        let op = tree.add_empty_paragraph(ids[0], true).unwrap();

        let root = tree.root();
        assert_eq!(tree.size(root).unwrap(), 2);
        assert_eq!(tree.get_child(root, 1).unwrap(), Some(op.affected[0]));
    }

    #[test]
    fn test_statistic_counts_bottom_up() {
        let mut tree = ComponentTree::new("test");
        article_with(&mut tree, &["ab", "cde"]);
        let root = tree.root();
        let table = tree.build_table(1, 2, &[], false).unwrap();
        tree.add_children(root, 2, &[table]).unwrap();

        let stats = tree.get_statistic(root).unwrap();

        assert_eq!(stats.characters, 5);
        assert_eq!(stats.paragraphs, 2);
        assert_eq!(stats.tables, 1);
    }

    #[test]
    fn test_is_empty_component() {
        let mut tree = ComponentTree::new("test");
        let root = tree.root();
        assert!(tree.is_empty_component(root).unwrap());

        article_with(&mut tree, &[""]);
        assert!(tree.is_empty_component(root).unwrap());

        let p = tree.get_child(root, 0).unwrap().unwrap();
        tree.add(p, "x", None).unwrap();
        assert!(!tree.is_empty_component(root).unwrap());
    }
}
