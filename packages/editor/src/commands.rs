//! # Edit Commands
//!
//! Serializable form of every editing call, so edit scripts can be stored
//! as JSON and replayed against an [`Editor`].
//!
//! ```json
//! [
//!   { "op": "insertText", "id": 3, "index": 0, "text": "Hello" },
//!   { "op": "split", "id": 3, "index": 3 },
//!   { "op": "undo" }
//! ]
//! ```

use crate::component::{ComponentId, Operation};
use crate::content::ExchangeTarget;
use crate::decorate::StoreData;
use crate::editor::Editor;
use crate::errors::{EditorError, EditorResult};
use crate::raw::RawNode;
use crate::record::Restored;
use crate::table::TableSize;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum EditCommand {
    InsertText {
        id: ComponentId,
        index: usize,
        text: String,
    },

    InsertInlineImage {
        id: ComponentId,
        index: usize,
        src: String,
    },

    /// `start: -1, end: 0` is backspace at the head of `id`
    Delete {
        id: ComponentId,
        start: isize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        end: Option<isize>,
    },

    Split {
        id: ComponentId,
        index: usize,
    },

    InsertBlock {
        id: ComponentId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<usize>,
        block: RawNode,
    },

    AddBlocks {
        id: ComponentId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<usize>,
        blocks: Vec<RawNode>,
    },

    DecorateContent {
        id: ComponentId,
        start: usize,
        end: isize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        style: Option<StoreData>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data: Option<StoreData>,
    },

    Decorate {
        id: ComponentId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        style: Option<StoreData>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data: Option<StoreData>,
    },

    ClearDecorate {
        id: ComponentId,
    },

    Exchange {
        id: ComponentId,
        target: ExchangeTarget,
    },

    AddEmptyParagraph {
        id: ComponentId,
        #[serde(default)]
        bottom: bool,
    },

    AddRow {
        id: ComponentId,
        index: usize,
    },

    RemoveRow {
        id: ComponentId,
        index: usize,
    },

    AddCol {
        id: ComponentId,
        index: usize,
    },

    RemoveCol {
        id: ComponentId,
        index: usize,
    },

    SetTableRow {
        id: ComponentId,
        row: usize,
    },

    SetTableCol {
        id: ComponentId,
        col: usize,
    },

    SetTableHead {
        id: ComponentId,
        head: bool,
    },

    ModifyTable {
        id: ComponentId,
        #[serde(flatten)]
        size: TableSize,
    },

    Undo,

    Redo,

    /// Commands applied as one undo step and one edit batch
    Batch {
        #[serde(default = "default_batch_description")]
        description: String,
        commands: Vec<EditCommand>,
    },
}

fn default_batch_description() -> String {
    "batch".to_string()
}

impl EditCommand {
    pub fn name(&self) -> &'static str {
        match self {
            EditCommand::InsertText { .. } => "insertText",
            EditCommand::InsertInlineImage { .. } => "insertInlineImage",
            EditCommand::Delete { .. } => "delete",
            EditCommand::Split { .. } => "split",
            EditCommand::InsertBlock { .. } => "insertBlock",
            EditCommand::AddBlocks { .. } => "addBlocks",
            EditCommand::DecorateContent { .. } => "decorateContent",
            EditCommand::Decorate { .. } => "decorate",
            EditCommand::ClearDecorate { .. } => "clearDecorate",
            EditCommand::Exchange { .. } => "exchange",
            EditCommand::AddEmptyParagraph { .. } => "addEmptyParagraph",
            EditCommand::AddRow { .. } => "addRow",
            EditCommand::RemoveRow { .. } => "removeRow",
            EditCommand::AddCol { .. } => "addCol",
            EditCommand::RemoveCol { .. } => "removeCol",
            EditCommand::SetTableRow { .. } => "setTableRow",
            EditCommand::SetTableCol { .. } => "setTableCol",
            EditCommand::SetTableHead { .. } => "setTableHead",
            EditCommand::ModifyTable { .. } => "modifyTable",
            EditCommand::Undo => "undo",
            EditCommand::Redo => "redo",
            EditCommand::Batch { .. } => "batch",
        }
    }

    /// History commands cannot run inside a batch
    pub fn validate(&self) -> EditorResult<()> {
        if let EditCommand::Batch { commands, .. } = self {
            for command in commands {
                if matches!(command, EditCommand::Undo | EditCommand::Redo) {
                    return Err(EditorError::structural(format!(
                        "{} is not allowed inside a batch",
                        command.name()
                    )));
                }
                command.validate()?;
            }
        }
        Ok(())
    }

    /// Apply this command to an editor
    pub fn apply(&self, editor: &mut Editor) -> EditorResult<Operation> {
        self.validate()?;

        match self {
            EditCommand::InsertText { id, index, text } => editor.insert_text(*id, *index, text),
            EditCommand::InsertInlineImage { id, index, src } => {
                editor.insert_inline_image(*id, *index, src)
            }
            EditCommand::Delete { id, start, end } => editor.delete(*id, *start, *end),
            EditCommand::Split { id, index } => editor.split(*id, *index),
            EditCommand::InsertBlock { id, index, block } => {
                editor.insert_block(*id, *index, block)
            }
            EditCommand::AddBlocks { id, index, blocks } => editor.add_blocks(*id, *index, blocks),
            EditCommand::DecorateContent {
                id,
                start,
                end,
                style,
                data,
            } => editor.modify_content_decorate(*id, *start, *end, style.as_ref(), data.as_ref()),
            EditCommand::Decorate { id, style, data } => {
                editor.modify_decorate(*id, style.as_ref(), data.as_ref())
            }
            EditCommand::ClearDecorate { id } => editor.clear_decorate(*id),
            EditCommand::Exchange { id, target } => editor.exchange(*id, target),
            EditCommand::AddEmptyParagraph { id, bottom } => {
                editor.add_empty_paragraph(*id, *bottom)
            }
            EditCommand::AddRow { id, index } => editor.add_row(*id, *index),
            EditCommand::RemoveRow { id, index } => editor.remove_row(*id, *index),
            EditCommand::AddCol { id, index } => editor.add_col(*id, *index),
            EditCommand::RemoveCol { id, index } => editor.remove_col(*id, *index),
            EditCommand::SetTableRow { id, row } => editor.set_table_row(*id, *row),
            EditCommand::SetTableCol { id, col } => editor.set_table_col(*id, *col),
            EditCommand::SetTableHead { id, head } => editor.set_table_head(*id, *head),
            EditCommand::ModifyTable { id, size } => editor.modify_table(*id, *size),
            EditCommand::Undo => Ok(restored_operation(editor.undo())),
            EditCommand::Redo => Ok(restored_operation(editor.redo())),
            EditCommand::Batch {
                description,
                commands,
            } => editor.batch(description, |editor| {
                let mut last = Operation::empty();
                for command in commands {
                    last = command.apply(editor)?;
                }
                Ok(last)
            }),
        }
    }
}

fn restored_operation(restored: Option<Restored>) -> Operation {
    match restored {
        Some(restored) => Operation {
            affected: restored.components,
            anchor: restored.cursor,
            focus: None,
        },
        None => Operation::empty(),
    }
}
