//! # Component Factory
//!
//! Registry mapping serialized type tags to constructors, plus the
//! convenience builders used to make components in code.
//!
//! Deserialization is recursive: a collection's constructor dispatches each
//! raw child through the registry. Inside a content collection an
//! unrecognized child carrying `content` is expanded into characters.

use crate::component::{
    tags, CellType, ComponentId, ComponentKind, HeaderType, ListType, MediaType,
};
use crate::decorate::Decorate;
use crate::errors::{EditorError, EditorResult};
use crate::raw::RawNode;
use crate::tree::ComponentTree;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Builds one component (and its subtree) from its raw form
pub type CreateFn =
    Box<dyn Fn(&ComponentFactory, &mut ComponentTree, &RawNode) -> EditorResult<ComponentId>>;

pub struct ComponentFactory {
    type_map: HashMap<String, CreateFn>,
}

impl ComponentFactory {
    /// Factory with every built-in variant registered
    pub fn new() -> Self {
        let mut factory = Self {
            type_map: HashMap::new(),
        };

        factory.register_type(tags::ARTICLE, |factory, tree, raw| {
            let id = tree.create(ComponentKind::Article, raw.decorate());
            let children = factory.create_children(tree, raw)?;
            tree.add_children(id, 0, &children)?;
            Ok(id)
        });
        factory.register_type(tags::PARAGRAPH, |factory, tree, raw| {
            factory.create_content(tree, raw, ComponentKind::Paragraph)
        });
        factory.register_type(tags::HEADER, |factory, tree, raw| {
            let kind = ComponentKind::Header(raw.header_type.unwrap_or_default());
            factory.create_content(tree, raw, kind)
        });
        factory.register_type(tags::CODE_BLOCK, |factory, tree, raw| {
            let kind = ComponentKind::CodeBlock {
                language: raw.language.clone().unwrap_or_default(),
            };
            factory.create_content(tree, raw, kind)
        });
        factory.register_type(tags::LIST, |factory, tree, raw| {
            let id = tree.create(
                ComponentKind::List(raw.list_type.unwrap_or_default()),
                raw.decorate(),
            );
            let children = factory.create_children(tree, raw)?;
            tree.add_children(id, 0, &children)?;
            Ok(id)
        });
        factory.register_type(tags::MEDIA, |_, tree, raw| {
            let kind = ComponentKind::Media {
                media_type: raw.media_type.unwrap_or_default(),
                src: raw.src.clone().unwrap_or_default(),
            };
            Ok(tree.create(kind, raw.decorate()))
        });
        factory.register_type(tags::TABLE, Self::create_table);
        factory.register_type(tags::TABLE_ROW, |factory, tree, raw| {
            let id = tree.create(
                ComponentKind::TableRow(raw.cell_type.unwrap_or_default()),
                raw.decorate(),
            );
            let children = factory.create_children(tree, raw)?;
            tree.add_children(id, 0, &children)?;
            Ok(id)
        });
        factory.register_type(tags::TABLE_CELL, |factory, tree, raw| {
            let id = tree.create(
                ComponentKind::TableCell(raw.cell_type.unwrap_or_default()),
                raw.decorate(),
            );
            let mut children = factory.create_children(tree, raw)?;
            if children.is_empty() {
                children.push(tree.create(ComponentKind::TableItem, Decorate::default()));
            }
            tree.add_children(id, 0, &children)?;
            Ok(id)
        });
        factory.register_type(tags::TABLE_ITEM, |factory, tree, raw| {
            factory.create_content(tree, raw, ComponentKind::TableItem)
        });
        factory.register_type(tags::INLINE_IMAGE, |_, tree, raw| {
            let kind = ComponentKind::InlineImage {
                src: raw.src.clone().unwrap_or_default(),
            };
            Ok(tree.create(kind, raw.decorate()))
        });

        factory
    }

    /// Register (or replace) the constructor for a type tag
    pub fn register_type<F>(&mut self, tag: impl Into<String>, create: F)
    where
        F: Fn(&ComponentFactory, &mut ComponentTree, &RawNode) -> EditorResult<ComponentId>
            + 'static,
    {
        let tag = tag.into();
        debug!(tag = %tag, "Registered component type");
        self.type_map.insert(tag, Box::new(create));
    }

    /// Register a custom block collection rendered under its own tag
    pub fn register_collection(&mut self, tag: impl Into<String>) {
        let tag = tag.into();
        let kind_tag = tag.clone();
        self.register_type(tag, move |factory, tree, raw| {
            let id = tree.create(
                ComponentKind::Custom {
                    tag: kind_tag.clone(),
                },
                raw.decorate(),
            );
            let children = factory.create_children(tree, raw)?;
            tree.add_children(id, 0, &children)?;
            Ok(id)
        });
    }

    pub fn is_registered(&self, tag: &str) -> bool {
        self.type_map.contains_key(tag)
    }

    /// Build a detached component from its raw form
    pub fn create(&self, tree: &mut ComponentTree, raw: &RawNode) -> EditorResult<ComponentId> {
        let create = self
            .type_map
            .get(&raw.kind)
            .ok_or_else(|| EditorError::UnknownType(raw.kind.clone()))?;
        create(self, tree, raw)
    }

    /// Build every raw child of a structure collection
    pub fn create_children(
        &self,
        tree: &mut ComponentTree,
        raw: &RawNode,
    ) -> EditorResult<Vec<ComponentId>> {
        let Some(children) = &raw.children else {
            return Ok(Vec::new());
        };
        children.iter().map(|child| self.create(tree, child)).collect()
    }

    /// Build the inline leaves of a content collection
    pub fn content_children(
        &self,
        tree: &mut ComponentTree,
        raw: &RawNode,
    ) -> EditorResult<Vec<ComponentId>> {
        let Some(children) = &raw.children else {
            return Ok(Vec::new());
        };

        let mut leaves = Vec::new();
        for child in children {
            if child.kind != tags::CHARACTER && self.is_registered(&child.kind) {
                leaves.push(self.create(tree, child)?);
                continue;
            }
            let Some(content) = &child.content else {
                warn!(tag = %child.kind, "Skipped unknown inline without content");
                continue;
            };
            let decorate = child.decorate();
            for c in content.chars() {
                leaves.push(tree.create(ComponentKind::Character(c), decorate.clone()));
            }
        }
        Ok(leaves)
    }

    fn create_content(
        &self,
        tree: &mut ComponentTree,
        raw: &RawNode,
        kind: ComponentKind,
    ) -> EditorResult<ComponentId> {
        let id = tree.create(kind, raw.decorate());
        let leaves = self.content_children(tree, raw)?;
        tree.add_children(id, 0, &leaves)?;
        Ok(id)
    }

    /// Tables are loaded with every row normalized to the column count
    fn create_table(&self, tree: &mut ComponentTree, raw: &RawNode) -> EditorResult<ComponentId> {
        let rows = self.create_children(tree, raw)?;
        let col = match raw.col {
            Some(col) => col,
            None => match rows.first() {
                Some(first) => tree.size(*first)?,
                None => 0,
            },
        };
        let need_head = raw.need_head.unwrap_or(false);

        for row in &rows {
            if tree.size(*row)? != col {
                warn!(row = %row, col, "Table row does not match column count, resizing");
                tree.row_set_size(*row, col)?;
            }
        }

        let id = tree.create(ComponentKind::Table { col, need_head }, raw.decorate());
        tree.add_children(id, 0, &rows)?;
        Ok(id)
    }

    /// Load a document root; the raw node must describe an article
    pub fn load_article(
        &self,
        tree: &mut ComponentTree,
        raw: &RawNode,
    ) -> EditorResult<ComponentId> {
        if raw.kind != tags::ARTICLE {
            return Err(EditorError::structural(format!(
                "document root must be {}, found {}",
                tags::ARTICLE,
                raw.kind
            )));
        }
        self.create(tree, raw)
    }
}

impl Default for ComponentFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ComponentFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut tags: Vec<&String> = self.type_map.keys().collect();
        tags.sort();
        f.debug_struct("ComponentFactory").field("types", &tags).finish()
    }
}

// Convenience builders. Every component they return is detached.
impl ComponentTree {
    pub fn build_article(&mut self, blocks: &[ComponentId]) -> EditorResult<ComponentId> {
        let id = self.create(ComponentKind::Article, Decorate::default());
        self.add_children(id, 0, blocks)?;
        Ok(id)
    }

    /// Content collection of `kind` holding undecorated `text`
    pub fn build_content(&mut self, kind: ComponentKind, text: &str) -> EditorResult<ComponentId> {
        if !kind.is_content() {
            return Err(EditorError::structural(format!(
                "{} cannot hold text",
                kind.type_tag()
            )));
        }
        let id = self.create(kind, Decorate::default());
        self.append_text(id, text)?;
        Ok(id)
    }

    pub fn build_paragraph(&mut self, text: &str) -> EditorResult<ComponentId> {
        self.build_content(ComponentKind::Paragraph, text)
    }

    pub fn build_header(
        &mut self,
        header_type: HeaderType,
        text: &str,
    ) -> EditorResult<ComponentId> {
        self.build_content(ComponentKind::Header(header_type), text)
    }

    pub fn build_code_block(&mut self, language: &str, text: &str) -> EditorResult<ComponentId> {
        self.build_content(
            ComponentKind::CodeBlock {
                language: language.to_string(),
            },
            text,
        )
    }

    pub fn build_list(
        &mut self,
        list_type: ListType,
        items: &[ComponentId],
    ) -> EditorResult<ComponentId> {
        let id = self.create(ComponentKind::List(list_type), Decorate::default());
        self.add_children(id, 0, items)?;
        Ok(id)
    }

    pub fn build_media(&mut self, media_type: MediaType, src: &str) -> EditorResult<ComponentId> {
        Ok(self.create(
            ComponentKind::Media {
                media_type,
                src: src.to_string(),
            },
            Decorate::default(),
        ))
    }

    /// `row` body rows of `col` cells, plus a `th` row first when `need_head`.
    /// `contents[i][j]` fills cell `j` of row `i` (head row included).
    pub fn build_table(
        &mut self,
        row: usize,
        col: usize,
        contents: &[Vec<String>],
        need_head: bool,
    ) -> EditorResult<ComponentId> {
        let total = row + usize::from(need_head);
        let mut rows = Vec::with_capacity(total);
        for i in 0..total {
            let cell_type = if need_head && i == 0 {
                CellType::Th
            } else {
                CellType::Td
            };
            let cells = contents.get(i).map(Vec::as_slice).unwrap_or_default();
            rows.push(self.build_table_row(col, cell_type, cells)?);
        }

        let id = self.create(ComponentKind::Table { col, need_head }, Decorate::default());
        self.add_children(id, 0, &rows)?;
        Ok(id)
    }

    pub fn build_table_row(
        &mut self,
        size: usize,
        cell_type: CellType,
        contents: &[String],
    ) -> EditorResult<ComponentId> {
        let mut cells = Vec::with_capacity(size);
        for i in 0..size {
            let text = contents.get(i).map(String::as_str).unwrap_or_default();
            cells.push(self.build_table_cell(cell_type, text)?);
        }
        let id = self.create(ComponentKind::TableRow(cell_type), Decorate::default());
        self.add_children(id, 0, &cells)?;
        Ok(id)
    }

    /// A cell always starts with exactly one item
    pub fn build_table_cell(
        &mut self,
        cell_type: CellType,
        text: &str,
    ) -> EditorResult<ComponentId> {
        let item = self.build_table_item(text)?;
        let id = self.create(ComponentKind::TableCell(cell_type), Decorate::default());
        self.add_children(id, 0, &[item])?;
        Ok(id)
    }

    pub fn build_table_item(&mut self, text: &str) -> EditorResult<ComponentId> {
        self.build_content(ComponentKind::TableItem, text)
    }

    pub fn build_character(&mut self, c: char, decorate: Decorate) -> ComponentId {
        self.create(ComponentKind::Character(c), decorate)
    }

    pub fn build_inline_image(&mut self, src: &str) -> ComponentId {
        self.create(
            ComponentKind::InlineImage {
                src: src.to_string(),
            },
            Decorate::default(),
        )
    }

    pub fn build_custom(&mut self, tag: &str, blocks: &[ComponentId]) -> EditorResult<ComponentId> {
        let id = self.create(
            ComponentKind::Custom {
                tag: tag.to_string(),
            },
            Decorate::default(),
        );
        self.add_children(id, 0, blocks)?;
        Ok(id)
    }

    /// Empty collection of the same variant carrying a copy of the decorate
    pub fn create_empty(&mut self, id: ComponentId) -> EditorResult<ComponentId> {
        let node = self.get(id)?;
        let kind = node.kind.clone();
        let decorate = Decorate::new(
            Some(node.decorate.copy_style()),
            Some(node.decorate.copy_data()),
        );
        Ok(self.create(kind, decorate))
    }

    /// Append undecorated characters without touching inherited style
    pub fn append_text(&mut self, id: ComponentId, text: &str) -> EditorResult<()> {
        let leaves: Vec<ComponentId> = text
            .chars()
            .map(|c| self.create(ComponentKind::Character(c), Decorate::default()))
            .collect();
        let size = self.size(id)?;
        self.add_children(id, size, &leaves)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_content_fallback() {
        let factory = ComponentFactory::new();
        let mut tree = ComponentTree::new("test");
        let raw = RawNode::new(tags::PARAGRAPH).with_children(vec![
            RawNode::new("TEXT").with_content("hi"),
            RawNode::new("UNKNOWN"),
        ]);

        let id = factory.create(&mut tree, &raw).unwrap();

        assert_eq!(tree.text(id).unwrap(), "hi");
    }

    #[test]
    fn test_unknown_block_is_rejected() {
        let factory = ComponentFactory::new();
        let mut tree = ComponentTree::new("test");
        let raw = RawNode::new(tags::ARTICLE).with_children(vec![RawNode::new("QUOTE")]);

        let err = factory.create(&mut tree, &raw).unwrap_err();
        assert!(matches!(err, EditorError::UnknownType(tag) if tag == "QUOTE"));
    }

    #[test]
    fn test_registered_collection() {
        let mut factory = ComponentFactory::new();
        factory.register_collection("QUOTE");
        let mut tree = ComponentTree::new("test");
        let raw = RawNode::new(tags::ARTICLE).with_children(vec![RawNode::new("QUOTE")
            .with_children(vec![RawNode::new(tags::PARAGRAPH)
                .with_children(vec![RawNode::new(tags::CHARACTER).with_content("q")])])]);

        let article = factory.load_article(&mut tree, &raw).unwrap();
        let quote = tree.get_child(article, 0).unwrap().unwrap();

        assert_eq!(
            tree.kind(quote).unwrap(),
            &ComponentKind::Custom {
                tag: "QUOTE".to_string()
            }
        );
        assert_eq!(tree.get_raw(article).unwrap(), raw);
    }

    #[test]
    fn test_table_rows_are_normalized() {
        let factory = ComponentFactory::new();
        let mut tree = ComponentTree::new("test");
        let json = r#"{"type":"TABLE","col":2,"needHead":false,"children":[
            {"type":"TABLE_ROW","cellType":"td","children":[{"type":"TABLE_CELL","cellType":"td"}]}
        ]}"#;
        let raw = RawNode::from_json(json).unwrap();

        let table = factory.create(&mut tree, &raw).unwrap();
        let row = tree.get_child(table, 0).unwrap().unwrap();

        assert_eq!(tree.size(row).unwrap(), 2);
        let cell = tree.get_child(row, 0).unwrap().unwrap();
        assert!(tree.cell_is_empty(cell).unwrap());
    }

    #[test]
    fn test_build_table_fills_contents() {
        let mut tree = ComponentTree::new("test");
        let contents = vec![vec!["a".to_string()], vec!["b".to_string(), "c".to_string()]];

        let table = tree.build_table(1, 2, &contents, true).unwrap();

        let body = tree.get_child(table, 1).unwrap().unwrap();
        let cell = tree.get_child(body, 1).unwrap().unwrap();
        let item = tree.get_child(cell, 0).unwrap().unwrap();
        assert_eq!(tree.text(item).unwrap(), "c");
    }
}
