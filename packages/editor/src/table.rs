//! # Table Grid
//!
//! Row/column operations on tables. The column count is a property of the
//! table; every column operation fans out to each row so no row can diverge
//! from it.
//!
//! Emptied cells report to their row through `count_empty_cell`. Reports are
//! collected per edit batch: when every cell of a row has reported inside one
//! batch the row removes itself. Outside an explicit batch each report is
//! its own batch.

use crate::component::{CellType, ComponentId, ComponentKind, Operation};
use crate::errors::{EditorError, EditorResult};
use crate::tree::ComponentTree;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Target shape for `modify_table`; absent fields are left alone
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSize {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub col: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head: Option<bool>,
}

impl ComponentTree {
    /// The table holding `id` (or `id` itself)
    pub fn table_of(&self, id: ComponentId) -> EditorResult<Option<ComponentId>> {
        if matches!(self.kind(id)?, ComponentKind::Table { .. }) {
            return Ok(Some(id));
        }
        self.find_ancestor(id, |kind| matches!(kind, ComponentKind::Table { .. }))
    }

    /// Column count and head flag of a table
    pub fn table_shape(&self, table: ComponentId) -> EditorResult<(usize, bool)> {
        match self.kind(table)? {
            ComponentKind::Table { col, need_head } => Ok((*col, *need_head)),
            other => Err(EditorError::structural(format!(
                "{} is not a table",
                other.type_tag()
            ))),
        }
    }

    fn set_table_shape(
        &mut self,
        table: ComponentId,
        col: usize,
        need_head: bool,
    ) -> EditorResult<()> {
        self.set_kind(table, ComponentKind::Table { col, need_head })
    }

    fn row_cell_type(&self, row: ComponentId) -> EditorResult<CellType> {
        match self.kind(row)? {
            ComponentKind::TableRow(cell_type) => Ok(*cell_type),
            other => Err(EditorError::structural(format!(
                "{} is not a table row",
                other.type_tag()
            ))),
        }
    }

    pub fn add_row(&mut self, table: ComponentId, index: usize) -> EditorResult<Operation> {
        let (col, _) = self.table_shape(table)?;
        let size = self.size(table)?;
        if index > size {
            return Err(EditorError::invalid_range(index as isize, index as isize, size));
        }

        let row = self.build_table_row(col, CellType::Td, &[])?;
        self.add_children(table, index, &[row])?;
        self.emit_updated(table);
        debug!(table = %table, index, "Added table row");
        Ok(Operation::affected(vec![table]))
    }

    /// Removing the head row clears the head flag; removing the last row
    /// removes the table
    pub fn remove_row(&mut self, table: ComponentId, index: usize) -> EditorResult<Operation> {
        let (col, need_head) = self.table_shape(table)?;
        let size = self.size(table)?;
        if index >= size {
            return Err(EditorError::invalid_range(index as isize, index as isize + 1, size));
        }

        let was_head = need_head && index == 0;
        self.remove_range(table, index, index + 1)?;
        if was_head {
            self.set_table_shape(table, col, false)?;
        }
        debug!(table = %table, index, "Removed table row");
        Ok(Operation::affected(vec![table]))
    }

    pub fn add_col(&mut self, table: ComponentId, index: usize) -> EditorResult<Operation> {
        let (col, need_head) = self.table_shape(table)?;
        if index > col {
            return Err(EditorError::invalid_range(index as isize, index as isize, col));
        }

        let rows = self.children(table)?.to_vec();
        for row in &rows {
            let cell_type = self.row_cell_type(*row)?;
            let cell = self.build_table_cell(cell_type, "")?;
            self.add_children(*row, index, &[cell])?;
            self.emit_updated(*row);
        }
        self.set_table_shape(table, col + 1, need_head)?;
        self.emit_updated(table);
        Ok(Operation::affected(vec![table]))
    }

    /// Removing the only column removes the table
    pub fn remove_col(&mut self, table: ComponentId, index: usize) -> EditorResult<Operation> {
        let (col, need_head) = self.table_shape(table)?;
        if index >= col {
            return Err(EditorError::invalid_range(index as isize, index as isize + 1, col));
        }
        if col == 1 {
            debug!(table = %table, "Removed last column");
            return self.remove_self(table);
        }

        let rows = self.children(table)?.to_vec();
        for row in &rows {
            self.remove_children(*row, index, index + 1)?;
            self.emit_updated(*row);
        }
        self.set_table_shape(table, col - 1, need_head)?;
        self.emit_updated(table);
        Ok(Operation::affected(vec![table]))
    }

    /// Resize to `row` body rows. New rows are appended; extra rows are cut
    /// from the end. Zero is ignored.
    pub fn set_table_row(&mut self, table: ComponentId, row: usize) -> EditorResult<Operation> {
        let (col, need_head) = self.table_shape(table)?;
        let target = row + usize::from(need_head);
        let size = self.size(table)?;
        if row == 0 || target == size {
            return Ok(Operation::affected(vec![table]));
        }

        if target > size {
            let mut rows = Vec::with_capacity(target - size);
            for _ in size..target {
                rows.push(self.build_table_row(col, CellType::Td, &[])?);
            }
            self.add_children(table, size, &rows)?;
            self.emit_updated(table);
        } else {
            self.remove_range(table, target, size)?;
        }
        Ok(Operation::affected(vec![table]))
    }

    /// Resize every row to `col` cells. Zero is ignored.
    pub fn set_table_col(&mut self, table: ComponentId, col: usize) -> EditorResult<Operation> {
        let (current, need_head) = self.table_shape(table)?;
        if col == 0 || col == current {
            return Ok(Operation::affected(vec![table]));
        }

        let rows = self.children(table)?.to_vec();
        for row in &rows {
            self.row_set_size(*row, col)?;
        }
        self.set_table_shape(table, col, need_head)?;
        self.emit_updated(table);
        Ok(Operation::affected(vec![table]))
    }

    /// Insert or drop the `th` row at index 0
    pub fn set_table_head(
        &mut self,
        table: ComponentId,
        need_head: bool,
    ) -> EditorResult<Operation> {
        let (col, current) = self.table_shape(table)?;
        if need_head == current {
            return Ok(Operation::affected(vec![table]));
        }

        if need_head {
            let head = self.build_table_row(col, CellType::Th, &[])?;
            self.add_children(table, 0, &[head])?;
            self.emit_updated(table);
        } else {
            self.remove_range(table, 0, 1)?;
        }
        self.set_table_shape(table, col, need_head)?;
        Ok(Operation::affected(vec![table]))
    }

    /// Apply head, then body rows, then columns
    pub fn modify_table(&mut self, table: ComponentId, size: TableSize) -> EditorResult<Operation> {
        if let Some(head) = size.head {
            self.set_table_head(table, head)?;
        }
        if let Some(row) = size.row {
            self.set_table_row(table, row)?;
        }
        if let Some(col) = size.col {
            self.set_table_col(table, col)?;
        }
        Ok(Operation::affected(vec![table]))
    }

    pub(crate) fn row_set_size(&mut self, row: ComponentId, size: usize) -> EditorResult<()> {
        let current = self.size(row)?;
        if size == current {
            return Ok(());
        }

        if size > current {
            let cell_type = self.row_cell_type(row)?;
            let mut cells = Vec::with_capacity(size - current);
            for _ in current..size {
                cells.push(self.build_table_cell(cell_type, "")?);
            }
            self.add_children(row, current, &cells)?;
        } else {
            self.remove_children(row, size, current)?;
        }
        self.emit_updated(row);
        Ok(())
    }

    /// A cell is empty when it holds a single empty item
    pub fn cell_is_empty(&self, cell: ComponentId) -> EditorResult<bool> {
        let children = self.children(cell)?;
        match children {
            [only] => Ok(self.size(*only)? == 0),
            _ => Ok(false),
        }
    }

    /// An item lost content; report its cell if that left the cell empty
    pub(crate) fn report_item_emptied(&mut self, item: ComponentId) -> EditorResult<()> {
        let Some(cell) = self.parent(item)? else {
            return Ok(());
        };
        if !self.cell_is_empty(cell)? {
            return Ok(());
        }
        if let Some(row) = self.parent(cell)? {
            self.count_empty_cell(row, cell)?;
        }
        Ok(())
    }

    /// Record that `cell` of `row` became empty in the current batch.
    ///
    /// Once every cell of the row has reported, the row removes itself; a
    /// removed `th` row clears the table's head flag.
    pub fn count_empty_cell(&mut self, row: ComponentId, cell: ComponentId) -> EditorResult<()> {
        let reported = {
            let batch = self.batch.get_or_insert_with(Default::default);
            let cells = batch.rows.entry(row).or_default();
            cells.insert(cell);
            cells.len()
        };

        let size = self.size(row)?;
        if reported >= size && self.parent(row)?.is_some() {
            let cell_type = self.row_cell_type(row)?;
            let table = self.require_parent(row)?;
            debug!(row = %row, table = %table, "Every cell emptied, removing row");

            if let Some(batch) = &mut self.batch {
                batch.rows.remove(&row);
            }
            self.remove_self(row)?;
            if cell_type == CellType::Th {
                let (col, _) = self.table_shape(table)?;
                self.set_table_shape(table, col, false)?;
            }
        }

        self.end_implicit_batch();
        Ok(())
    }

    /// Split inside a table cell: only content blocks may follow the item,
    /// and each is turned into a table item of its own
    pub(crate) fn split_table_item(
        &mut self,
        id: ComponentId,
        index: usize,
        extra: &[ComponentId],
    ) -> EditorResult<Operation> {
        let mut blocks = Vec::new();
        for block in extra {
            if self.kind(*block)?.is_content() {
                blocks.push(*block);
            }
        }
        if !extra.is_empty() && blocks.is_empty() {
            debug!(item = %id, "Split refused: no content blocks to insert");
            return Ok(Operation::affected(vec![id]));
        }

        let size = self.size(id)?;
        if index > size {
            return Err(EditorError::invalid_range(index as isize, index as isize, size));
        }
        self.index_in_parent(id)?;
        self.check_detached(&blocks)?;

        let mut items = Vec::with_capacity(blocks.len());
        for block in blocks {
            let item = self.create(ComponentKind::TableItem, Default::default());
            let len = self.size(block)?;
            let leaves = self.remove_children(block, 0, len)?;
            self.add_children(item, 0, &leaves)?;
            items.push(item);
        }
        self.split_content(id, index, &items)
    }
}
