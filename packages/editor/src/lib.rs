//! # Zebra Editor
//!
//! Document editing engine for rich articles.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ factory: serialized article → components    │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ tree: arena of components                   │
//! │  - structure collections (article, list,    │
//! │    table grid, custom)                      │
//! │  - content collections (paragraph, header,  │
//! │    code block, table item)                  │
//! │  - inline leaves (character, inline image)  │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ builder: components → any render target     │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Ids, not pointers**: parents own child id lists, children hold the
//!    parent id, a component has at most one parent
//! 2. **Operations report, views place**: every edit returns the affected
//!    components and caret positions
//! 3. **One edit, one undo step**: snapshots are captured on first touch
//! 4. **All or nothing**: a failing edit leaves the tree as it was
//!
//! ## Usage
//!
//! ```rust,ignore
//! use zebra_editor::{Editor, EditorConfig};
//!
//! let mut editor = Editor::from_json(EditorConfig::default(), &json)?;
//! let paragraph = editor.tree().get_child(editor.root(), 0)?.unwrap();
//!
//! // Typing, Enter, backspace at the head
//! editor.insert_text(paragraph, 0, "Hello")?;
//! let op = editor.split(paragraph, 2)?;
//! editor.delete(op.affected[0], -1, Some(0))?;
//!
//! editor.undo();
//! println!("{}", editor.to_json_pretty()?);
//! ```

mod builder;
mod commands;
mod component;
mod config;
mod content;
mod decorate;
mod editor;
mod errors;
mod factory;
mod id_generator;
mod raw;
mod record;
mod structure;
mod table;
mod tree;

pub use builder::{render, Builder, Children, ListItemKind};
pub use commands::EditCommand;
pub use component::{
    tags, CellType, ComponentEvent, ComponentId, ComponentKind, Cursor, HeaderType, ListType,
    MediaType, Node, Operation, Statistic, StructureType,
};
pub use config::EditorConfig;
pub use content::{ContentRun, ExchangeTarget, InlineInput};
pub use decorate::{store, Decorate, StoreData};
pub use editor::Editor;
pub use errors::{EditorError, EditorResult};
pub use factory::{ComponentFactory, CreateFn};
pub use id_generator::{get_document_id, IdGenerator};
pub use raw::RawNode;
pub use record::{Record, RecordEngine, RecordState, Restored, Snapshot};
pub use table::TableSize;
pub use tree::ComponentTree;
