//! # Editor
//!
//! One open document: the component tree, the factory that loads it and the
//! undo/redo history. Every editing call runs as one recorded logical edit;
//! a call that fails puts every touched component back before returning.
//!
//! ```rust,ignore
//! let mut editor = Editor::from_json(EditorConfig::default(), json)?;
//! let paragraph = editor.tree().get_child(editor.root(), 0)?.unwrap();
//!
//! editor.insert_text(paragraph, 0, "Hello ")?;
//! editor.split(paragraph, 3)?;
//! editor.undo();
//! ```

use crate::builder::{render, Builder};
use crate::component::{ComponentEvent, ComponentId, Cursor, Operation, Statistic};
use crate::config::EditorConfig;
use crate::content::ExchangeTarget;
use crate::decorate::StoreData;
use crate::errors::{EditorError, EditorResult};
use crate::factory::ComponentFactory;
use crate::raw::RawNode;
use crate::record::{RecordEngine, Restored};
use crate::table::TableSize;
use crate::tree::ComponentTree;
use tracing::{debug, info, instrument, warn};

#[derive(Debug)]
pub struct Editor {
    tree: ComponentTree,
    factory: ComponentFactory,
    history: RecordEngine,
    config: EditorConfig,
}

impl Editor {
    /// Editor holding an empty article
    pub fn new(config: EditorConfig) -> Self {
        Self {
            tree: ComponentTree::new(&config.document_name),
            factory: ComponentFactory::new(),
            history: RecordEngine::with_max_levels(config.max_undo_levels),
            config,
        }
    }

    /// Load a serialized article using `factory`
    pub fn from_raw(
        config: EditorConfig,
        factory: ComponentFactory,
        raw: &RawNode,
    ) -> EditorResult<Self> {
        let mut tree = ComponentTree::new(&config.document_name);
        let article = factory.load_article(&mut tree, raw)?;
        tree.set_root(article)?;
        tree.collect_garbage();
        tree.drain_events();
        info!(components = tree.len(), "Loaded document");

        Ok(Self {
            tree,
            factory,
            history: RecordEngine::with_max_levels(config.max_undo_levels),
            config,
        })
    }

    pub fn from_json(config: EditorConfig, json: &str) -> EditorResult<Self> {
        let raw = RawNode::from_json(json)?;
        Self::from_raw(config, ComponentFactory::new(), &raw)
    }

    pub fn tree(&self) -> &ComponentTree {
        &self.tree
    }

    pub fn root(&self) -> ComponentId {
        self.tree.root()
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn history(&self) -> &RecordEngine {
        &self.history
    }

    /// Register extension types before creating components from raw input
    pub fn factory_mut(&mut self) -> &mut ComponentFactory {
        &mut self.factory
    }

    /// Run `edit` as one recorded logical edit
    fn record<F>(
        &mut self,
        description: &str,
        cursor_before: Option<Cursor>,
        edit: F,
    ) -> EditorResult<Operation>
    where
        F: FnOnce(&mut ComponentTree, &ComponentFactory) -> EditorResult<Operation>,
    {
        let Editor {
            tree,
            factory,
            history,
            ..
        } = self;

        history.begin(tree);
        match edit(tree, factory) {
            Ok(op) => {
                history.commit(tree, cursor_before, op.anchor, Some(description.to_string()));
                Ok(op)
            }
            Err(e) => {
                warn!(error = %e, edit = description, "Edit failed, rolling back");
                history.rollback(tree);
                Err(e)
            }
        }
    }

    #[instrument(skip(self), fields(component = %id))]
    pub fn insert_text(
        &mut self,
        id: ComponentId,
        index: usize,
        text: &str,
    ) -> EditorResult<Operation> {
        self.record("insert text", Some(Cursor::new(id, index)), |tree, _| {
            tree.add(id, text, Some(index))
        })
    }

    #[instrument(skip(self), fields(component = %id))]
    pub fn insert_inline_image(
        &mut self,
        id: ComponentId,
        index: usize,
        src: &str,
    ) -> EditorResult<Operation> {
        self.record("insert inline image", Some(Cursor::new(id, index)), |tree, _| {
            let image = tree.build_inline_image(src);
            tree.add(id, image, Some(index))
        })
    }

    /// Remove `[start, end)`; `(-1, Some(0))` is backspace at the head
    #[instrument(skip(self), fields(component = %id))]
    pub fn delete(
        &mut self,
        id: ComponentId,
        start: isize,
        end: Option<isize>,
    ) -> EditorResult<Operation> {
        let end_offset = end.unwrap_or(start.saturating_add(1)).max(0);
        let cursor = Cursor::new(id, end_offset as usize);
        self.record("delete", Some(cursor), |tree, _| tree.remove(id, start, end))
    }

    /// Enter pressed at `index`
    #[instrument(skip(self), fields(component = %id))]
    pub fn split(&mut self, id: ComponentId, index: usize) -> EditorResult<Operation> {
        self.record("split", Some(Cursor::new(id, index)), |tree, _| {
            tree.split(id, index, &[])
        })
    }

    /// Insert a block described by `raw` after `id`. A content block is
    /// split at `index` (default: its end) and the new block placed between.
    #[instrument(skip(self, raw), fields(component = %id, tag = %raw.kind))]
    pub fn insert_block(
        &mut self,
        id: ComponentId,
        index: Option<usize>,
        raw: &RawNode,
    ) -> EditorResult<Operation> {
        let cursor = Cursor::new(id, index.unwrap_or(0));
        self.record("insert block", Some(cursor), |tree, factory| {
            let block = factory.create(tree, raw)?;
            if tree.kind(id)?.is_content() {
                let index = match index {
                    Some(index) => index,
                    None => tree.size(id)?,
                };
                tree.split(id, index, &[block])
            } else {
                let (parent, at) = tree.index_in_parent(id)?;
                tree.add_blocks(parent, Some(at + 1), &[block])
            }
        })
    }

    /// Insert blocks described by `raws` into a structure collection
    #[instrument(skip(self, raws), fields(component = %parent, blocks = raws.len()))]
    pub fn add_blocks(
        &mut self,
        parent: ComponentId,
        index: Option<usize>,
        raws: &[RawNode],
    ) -> EditorResult<Operation> {
        self.record("add blocks", None, |tree, factory| {
            let blocks = raws
                .iter()
                .map(|raw| factory.create(tree, raw))
                .collect::<EditorResult<Vec<_>>>()?;
            tree.add_blocks(parent, index, &blocks)
        })
    }

    #[instrument(skip(self, style, data), fields(component = %id))]
    pub fn modify_content_decorate(
        &mut self,
        id: ComponentId,
        start: usize,
        end: isize,
        style: Option<&StoreData>,
        data: Option<&StoreData>,
    ) -> EditorResult<Operation> {
        self.record("decorate content", Some(Cursor::new(id, start)), |tree, _| {
            tree.modify_content_decorate(id, start, end, style, data)
        })
    }

    #[instrument(skip(self, style, data), fields(component = %id))]
    pub fn modify_decorate(
        &mut self,
        id: ComponentId,
        style: Option<&StoreData>,
        data: Option<&StoreData>,
    ) -> EditorResult<Operation> {
        self.record("decorate", None, |tree, _| tree.modify_decorate(id, style, data))
    }

    #[instrument(skip(self), fields(component = %id))]
    pub fn clear_decorate(&mut self, id: ComponentId) -> EditorResult<Operation> {
        self.record("clear decorate", None, |tree, _| tree.clear_decorate(id))
    }

    #[instrument(skip(self), fields(component = %id))]
    pub fn exchange(
        &mut self,
        id: ComponentId,
        target: &ExchangeTarget,
    ) -> EditorResult<Operation> {
        self.record("exchange", Some(Cursor::new(id, 0)), |tree, _| {
            tree.exchange(id, target)
        })
    }

    #[instrument(skip(self), fields(component = %id))]
    pub fn add_empty_paragraph(
        &mut self,
        id: ComponentId,
        bottom: bool,
    ) -> EditorResult<Operation> {
        self.record("add paragraph", None, |tree, _| {
            tree.add_empty_paragraph(id, bottom)
        })
    }

    // Table operations accept the table or any component inside it.

    #[instrument(skip(self), fields(component = %id))]
    pub fn add_row(&mut self, id: ComponentId, index: usize) -> EditorResult<Operation> {
        self.record("add row", None, |tree, _| {
            let table = resolve_table(tree, id)?;
            tree.add_row(table, index)
        })
    }

    #[instrument(skip(self), fields(component = %id))]
    pub fn remove_row(&mut self, id: ComponentId, index: usize) -> EditorResult<Operation> {
        self.record("remove row", None, |tree, _| {
            let table = resolve_table(tree, id)?;
            tree.remove_row(table, index)
        })
    }

    #[instrument(skip(self), fields(component = %id))]
    pub fn add_col(&mut self, id: ComponentId, index: usize) -> EditorResult<Operation> {
        self.record("add column", None, |tree, _| {
            let table = resolve_table(tree, id)?;
            tree.add_col(table, index)
        })
    }

    #[instrument(skip(self), fields(component = %id))]
    pub fn remove_col(&mut self, id: ComponentId, index: usize) -> EditorResult<Operation> {
        self.record("remove column", None, |tree, _| {
            let table = resolve_table(tree, id)?;
            tree.remove_col(table, index)
        })
    }

    #[instrument(skip(self), fields(component = %id))]
    pub fn set_table_row(&mut self, id: ComponentId, row: usize) -> EditorResult<Operation> {
        self.record("resize rows", None, |tree, _| {
            let table = resolve_table(tree, id)?;
            tree.set_table_row(table, row)
        })
    }

    #[instrument(skip(self), fields(component = %id))]
    pub fn set_table_col(&mut self, id: ComponentId, col: usize) -> EditorResult<Operation> {
        self.record("resize columns", None, |tree, _| {
            let table = resolve_table(tree, id)?;
            tree.set_table_col(table, col)
        })
    }

    #[instrument(skip(self), fields(component = %id))]
    pub fn set_table_head(&mut self, id: ComponentId, need_head: bool) -> EditorResult<Operation> {
        self.record("toggle head", None, |tree, _| {
            let table = resolve_table(tree, id)?;
            tree.set_table_head(table, need_head)
        })
    }

    #[instrument(skip(self), fields(component = %id))]
    pub fn modify_table(&mut self, id: ComponentId, size: TableSize) -> EditorResult<Operation> {
        self.record("modify table", None, |tree, _| {
            let table = resolve_table(tree, id)?;
            tree.modify_table(table, size)
        })
    }

    /// Run several edits as one undo step and one edit batch.
    ///
    /// Empty-cell reports from every edit inside are counted together. If
    /// `edits` returns an error the whole batch is rolled back; an edit that
    /// fails inside the batch is rolled back on its own even when `edits`
    /// carries on. A batch inside a batch joins the outer one.
    #[instrument(skip(self, edits))]
    pub fn batch<T, F>(&mut self, description: &str, edits: F) -> EditorResult<T>
    where
        F: FnOnce(&mut Editor) -> EditorResult<T>,
    {
        let outermost = !self.tree.in_batch();
        self.history.begin(&mut self.tree);
        if outermost {
            self.tree.begin_batch();
        }
        let result = edits(self);
        if outermost {
            self.tree.end_batch();
        }

        match result {
            Ok(value) => {
                self.history
                    .commit(&mut self.tree, None, None, Some(description.to_string()));
                Ok(value)
            }
            Err(e) => {
                warn!(error = %e, edit = description, "Batch failed, rolling back");
                self.history.rollback(&mut self.tree);
                Err(e)
            }
        }
    }

    /// Delete several ranges in one batch, e.g. a selection spanning cells
    pub fn delete_ranges(
        &mut self,
        ranges: &[(ComponentId, isize, Option<isize>)],
    ) -> EditorResult<Vec<Operation>> {
        self.batch("delete ranges", |editor| {
            ranges
                .iter()
                .map(|(id, start, end)| editor.delete(*id, *start, *end))
                .collect()
        })
    }

    #[instrument(skip(self))]
    pub fn undo(&mut self) -> Option<Restored> {
        let restored = self.history.undo(&mut self.tree);
        if restored.is_none() {
            debug!("Nothing to undo");
        }
        restored
    }

    #[instrument(skip(self))]
    pub fn redo(&mut self) -> Option<Restored> {
        let restored = self.history.redo(&mut self.tree);
        if restored.is_none() {
            debug!("Nothing to redo");
        }
        restored
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Forget history and drop components only it still referenced
    pub fn clear_history(&mut self) -> usize {
        self.history.clear();
        self.tree.collect_garbage()
    }

    pub fn to_raw(&self) -> EditorResult<RawNode> {
        self.tree.get_raw(self.tree.root())
    }

    pub fn to_json(&self) -> EditorResult<String> {
        self.to_raw()?.to_json()
    }

    pub fn to_json_pretty(&self) -> EditorResult<String> {
        self.to_raw()?.to_json_pretty()
    }

    pub fn render<B: Builder>(&self, builder: &B) -> EditorResult<B::Output> {
        render(&self.tree, self.tree.root(), builder)
    }

    pub fn statistic(&self) -> EditorResult<Statistic> {
        self.tree.get_statistic(self.tree.root())
    }

    /// Whether a view should show the placeholder
    pub fn is_empty(&self) -> EditorResult<bool> {
        self.tree.is_empty_component(self.tree.root())
    }

    pub fn drain_events(&mut self) -> Vec<ComponentEvent> {
        self.tree.drain_events()
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

fn resolve_table(tree: &ComponentTree, id: ComponentId) -> EditorResult<ComponentId> {
    tree.table_of(id)?.ok_or_else(|| {
        EditorError::structural(format!("component {} is not inside a table", id))
    })
}
