//! # Serialized Tree Format
//!
//! Every component serializes to `{ type, style?, data?, children?, content? }`
//! plus its variant fields. Adjacent characters sharing a decorate are
//! written as one `CHARACTER` run carrying `content`.

use crate::component::{CellType, ComponentId, ComponentKind, HeaderType, ListType, MediaType};
use crate::content::ContentRun;
use crate::decorate::{Decorate, StoreData};
use crate::errors::EditorResult;
use crate::tree::ComponentTree;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNode {
    #[serde(rename = "type", default)]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<StoreData>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<StoreData>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<RawNode>>,

    /// Plain text of a character run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub col: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub need_head: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cell_type: Option<CellType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_type: Option<HeaderType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_type: Option<ListType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<MediaType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl RawNode {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Default::default()
        }
    }

    pub fn with_children(mut self, children: Vec<RawNode>) -> Self {
        self.children = Some(children);
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn from_json(json: &str) -> EditorResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> EditorResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> EditorResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decorate described by this node (missing maps are empty)
    pub fn decorate(&self) -> Decorate {
        Decorate::new(self.style.clone(), self.data.clone())
    }

    fn set_decorate(&mut self, decorate: &Decorate) {
        if !decorate.style_is_empty() {
            self.style = Some(decorate.copy_style());
        }
        if !decorate.data_is_empty() {
            self.data = Some(decorate.copy_data());
        }
    }
}

impl ComponentTree {
    /// Serialize a component and its subtree
    pub fn get_raw(&self, id: ComponentId) -> EditorResult<RawNode> {
        let node = self.get(id)?;
        let mut raw = RawNode::new(node.kind.type_tag());
        raw.set_decorate(&node.decorate);

        match &node.kind {
            ComponentKind::Header(header_type) => raw.header_type = Some(*header_type),
            ComponentKind::CodeBlock { language } => raw.language = Some(language.clone()),
            ComponentKind::List(list_type) => raw.list_type = Some(*list_type),
            ComponentKind::Media { media_type, src } => {
                raw.media_type = Some(*media_type);
                raw.src = Some(src.clone());
            }
            ComponentKind::Table { col, need_head } => {
                raw.col = Some(*col);
                raw.need_head = Some(*need_head);
            }
            ComponentKind::TableRow(cell_type) | ComponentKind::TableCell(cell_type) => {
                raw.cell_type = Some(*cell_type);
            }
            ComponentKind::Character(c) => raw.content = Some(c.to_string()),
            ComponentKind::InlineImage { src } => raw.src = Some(src.clone()),
            _ => {}
        }

        if node.kind.is_content() {
            let mut children = Vec::new();
            for run in self.format_children(id)? {
                children.push(match run {
                    ContentRun::Text { content, decorate } => {
                        let mut text = RawNode::new(crate::component::tags::CHARACTER)
                            .with_content(content);
                        text.set_decorate(&decorate);
                        text
                    }
                    ContentRun::Leaf(leaf) => self.get_raw(leaf)?,
                });
            }
            raw.children = Some(children);
        } else if !node.kind.is_inline() && !matches!(node.kind, ComponentKind::Media { .. }) {
            let children = node
                .children
                .iter()
                .map(|child| self.get_raw(*child))
                .collect::<EditorResult<Vec<_>>>()?;
            raw.children = Some(children);
        }

        Ok(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decorate::store;

    #[test]
    fn test_runs_are_coalesced() {
        let mut tree = ComponentTree::new("test");
        let root = tree.root();
        let p = tree.build_paragraph("abcd").unwrap();
        tree.add_children(root, 0, &[p]).unwrap();
        let bold = store([("fontWeight", "bold")]);
        tree.modify_content_decorate(p, 2, 3, Some(&bold), None)
            .unwrap();

        let raw = tree.get_raw(p).unwrap();
        let children = raw.children.unwrap();

        assert_eq!(children.len(), 2);
        assert_eq!(children[0].content.as_deref(), Some("ab"));
        assert_eq!(children[0].style, None);
        assert_eq!(children[1].content.as_deref(), Some("cd"));
        assert_eq!(children[1].style, Some(bold));
    }

    #[test]
    fn test_empty_maps_are_omitted() {
        let tree = ComponentTree::new("test");
        let json = tree.get_raw(tree.root()).unwrap().to_json().unwrap();
        assert_eq!(json, r#"{"type":"ARTICLE","children":[]}"#);
    }

    #[test]
    fn test_table_fields() {
        let mut tree = ComponentTree::new("test");
        let table = tree.build_table(1, 2, &[], true).unwrap();

        let raw = tree.get_raw(table).unwrap();

        assert_eq!(raw.col, Some(2));
        assert_eq!(raw.need_head, Some(true));
        let rows = raw.children.unwrap();
        assert_eq!(rows[0].cell_type, Some(CellType::Th));
        assert_eq!(rows[1].cell_type, Some(CellType::Td));
    }
}
