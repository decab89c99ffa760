//! # Components
//!
//! The closed set of node variants that make up a document, plus the small
//! value types every editing call hands back to the selection layer.
//!
//! ```text
//! Article
//!  ├─ Paragraph / Header / CodeBlock      (content: Character, InlineImage)
//!  ├─ List ─ Paragraph / Header / ...     (list items)
//!  ├─ Media
//!  ├─ Custom ─ blocks
//!  └─ Table ─ TableRow ─ TableCell ─ TableItem (content)
//! ```

use crate::decorate::Decorate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::AddAssign;

/// Stable identity of a component within one document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentId(pub u64);

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Serialized type tags
pub mod tags {
    pub const ARTICLE: &str = "ARTICLE";
    pub const PARAGRAPH: &str = "PARAGRAPH";
    pub const HEADER: &str = "TITLE";
    pub const CODE_BLOCK: &str = "CODE";
    pub const LIST: &str = "LIST";
    pub const MEDIA: &str = "MEDIA";
    pub const TABLE: &str = "TABLE";
    pub const TABLE_ROW: &str = "TABLE_ROW";
    pub const TABLE_CELL: &str = "TABLE_CELL";
    pub const TABLE_ITEM: &str = "TABLE_ITEM";
    pub const CHARACTER: &str = "CHARACTER";
    pub const INLINE_IMAGE: &str = "INLINE_IMAGE";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellType {
    Th,
    #[default]
    Td,
}

impl CellType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CellType::Th => "th",
            CellType::Td => "td",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderType {
    #[default]
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
}

impl HeaderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            HeaderType::H1 => "h1",
            HeaderType::H2 => "h2",
            HeaderType::H3 => "h3",
            HeaderType::H4 => "h4",
            HeaderType::H5 => "h5",
            HeaderType::H6 => "h6",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListType {
    #[default]
    Ul,
    Ol,
    /// Unmarked list
    Nl,
}

impl ListType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListType::Ul => "ul",
            ListType::Ol => "ol",
            ListType::Nl => "nl",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    #[default]
    Image,
    Audio,
    Video,
}

/// How a component holds children
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructureType {
    /// Owns block-level or grid children
    Structure,
    /// Owns inline leaves
    Content,
    /// Block without children
    Media,
    /// Inline leaf
    Inline,
}

/// Variant tag plus variant-specific fields
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentKind {
    Article,
    Paragraph,
    Header(HeaderType),
    CodeBlock { language: String },
    List(ListType),
    Media { media_type: MediaType, src: String },
    Table { col: usize, need_head: bool },
    TableRow(CellType),
    TableCell(CellType),
    TableItem,
    /// A registered extension collection rendered under its own tag
    Custom { tag: String },
    Character(char),
    InlineImage { src: String },
}

impl ComponentKind {
    pub fn type_tag(&self) -> &str {
        match self {
            ComponentKind::Article => tags::ARTICLE,
            ComponentKind::Paragraph => tags::PARAGRAPH,
            ComponentKind::Header(_) => tags::HEADER,
            ComponentKind::CodeBlock { .. } => tags::CODE_BLOCK,
            ComponentKind::List(_) => tags::LIST,
            ComponentKind::Media { .. } => tags::MEDIA,
            ComponentKind::Table { .. } => tags::TABLE,
            ComponentKind::TableRow(_) => tags::TABLE_ROW,
            ComponentKind::TableCell(_) => tags::TABLE_CELL,
            ComponentKind::TableItem => tags::TABLE_ITEM,
            ComponentKind::Custom { tag } => tag,
            ComponentKind::Character(_) => tags::CHARACTER,
            ComponentKind::InlineImage { .. } => tags::INLINE_IMAGE,
        }
    }

    pub fn structure_type(&self) -> StructureType {
        match self {
            ComponentKind::Article
            | ComponentKind::List(_)
            | ComponentKind::Table { .. }
            | ComponentKind::TableRow(_)
            | ComponentKind::TableCell(_)
            | ComponentKind::Custom { .. } => StructureType::Structure,
            ComponentKind::Paragraph
            | ComponentKind::Header(_)
            | ComponentKind::CodeBlock { .. }
            | ComponentKind::TableItem => StructureType::Content,
            ComponentKind::Media { .. } => StructureType::Media,
            ComponentKind::Character(_) | ComponentKind::InlineImage { .. } => {
                StructureType::Inline
            }
        }
    }

    pub fn is_content(&self) -> bool {
        self.structure_type() == StructureType::Content
    }

    pub fn is_inline(&self) -> bool {
        self.structure_type() == StructureType::Inline
    }

    /// Blocks that may sit directly under an article, a list or a custom collection
    pub fn is_block(&self) -> bool {
        matches!(
            self,
            ComponentKind::Paragraph
                | ComponentKind::Header(_)
                | ComponentKind::CodeBlock { .. }
                | ComponentKind::List(_)
                | ComponentKind::Media { .. }
                | ComponentKind::Table { .. }
                | ComponentKind::Custom { .. }
        )
    }

    /// Child containment rules for every variant
    pub fn accepts_child(&self, child: &ComponentKind) -> bool {
        match self {
            ComponentKind::Article | ComponentKind::Custom { .. } => child.is_block(),
            ComponentKind::List(_) => matches!(
                child,
                ComponentKind::Paragraph
                    | ComponentKind::Header(_)
                    | ComponentKind::CodeBlock { .. }
                    | ComponentKind::List(_)
            ),
            ComponentKind::Table { .. } => matches!(child, ComponentKind::TableRow(_)),
            ComponentKind::TableRow(_) => matches!(child, ComponentKind::TableCell(_)),
            ComponentKind::TableCell(_) => matches!(child, ComponentKind::TableItem),
            ComponentKind::Paragraph
            | ComponentKind::Header(_)
            | ComponentKind::CodeBlock { .. }
            | ComponentKind::TableItem => child.is_inline(),
            ComponentKind::Media { .. }
            | ComponentKind::Character(_)
            | ComponentKind::InlineImage { .. } => false,
        }
    }
}

/// One node of the document arena
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) id: ComponentId,
    pub(crate) kind: ComponentKind,
    pub(crate) decorate: Decorate,
    pub(crate) parent: Option<ComponentId>,
    pub(crate) children: Vec<ComponentId>,
}

impl Node {
    pub(crate) fn new(id: ComponentId, kind: ComponentKind, decorate: Decorate) -> Self {
        Self {
            id,
            kind,
            decorate,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn id(&self) -> ComponentId {
        self.id
    }

    pub fn kind(&self) -> &ComponentKind {
        &self.kind
    }

    pub fn decorate(&self) -> &Decorate {
        &self.decorate
    }

    pub fn parent(&self) -> Option<ComponentId> {
        self.parent
    }

    pub fn children(&self) -> &[ComponentId] {
        &self.children
    }

    pub fn size(&self) -> usize {
        self.children.len()
    }
}

/// A caret position expressed in tree coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    pub id: ComponentId,
    pub offset: usize,
}

impl Cursor {
    pub fn new(id: ComponentId, offset: usize) -> Self {
        Self { id, offset }
    }
}

/// Result of every mutating call: affected components plus caret(s)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Operation {
    pub affected: Vec<ComponentId>,
    pub anchor: Option<Cursor>,
    pub focus: Option<Cursor>,
}

impl Operation {
    pub fn new(affected: Vec<ComponentId>, anchor: Cursor) -> Self {
        Self {
            affected,
            anchor: Some(anchor),
            focus: None,
        }
    }

    pub fn range(affected: Vec<ComponentId>, anchor: Cursor, focus: Cursor) -> Self {
        Self {
            affected,
            anchor: Some(anchor),
            focus: Some(focus),
        }
    }

    /// Only the affected list, no caret
    pub fn affected(affected: Vec<ComponentId>) -> Self {
        Self {
            affected,
            anchor: None,
            focus: None,
        }
    }

    /// Refused speculative operation
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.affected.is_empty()
    }
}

/// Notifications queued for the view layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentEvent {
    Updated(ComponentId),
}

/// Bottom-up counts over a subtree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistic {
    pub characters: usize,
    pub paragraphs: usize,
    pub headers: usize,
    pub lists: usize,
    pub code_blocks: usize,
    pub tables: usize,
    pub images: usize,
    pub audio: usize,
    pub video: usize,
    pub inline_images: usize,
}

impl AddAssign for Statistic {
    fn add_assign(&mut self, other: Self) {
        self.characters += other.characters;
        self.paragraphs += other.paragraphs;
        self.headers += other.headers;
        self.lists += other.lists;
        self.code_blocks += other.code_blocks;
        self.tables += other.tables;
        self.images += other.images;
        self.audio += other.audio;
        self.video += other.video;
        self.inline_images += other.inline_images;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_never_accepts_blocks() {
        let paragraph = ComponentKind::Paragraph;
        assert!(paragraph.accepts_child(&ComponentKind::Character('a')));
        assert!(!paragraph.accepts_child(&ComponentKind::Paragraph));
        assert!(!ComponentKind::TableItem.accepts_child(&ComponentKind::Table {
            col: 1,
            need_head: false
        }));
    }

    #[test]
    fn test_grid_containment() {
        let table = ComponentKind::Table {
            col: 2,
            need_head: false,
        };
        assert!(table.accepts_child(&ComponentKind::TableRow(CellType::Td)));
        assert!(!table.accepts_child(&ComponentKind::TableCell(CellType::Td)));
        assert!(ComponentKind::TableCell(CellType::Th).accepts_child(&ComponentKind::TableItem));
    }

    #[test]
    fn test_type_tags() {
        assert_eq!(ComponentKind::Header(HeaderType::H2).type_tag(), "TITLE");
        assert_eq!(
            ComponentKind::Custom {
                tag: "QUOTE".to_string()
            }
            .type_tag(),
            "QUOTE"
        );
    }
}
