//! Table controller: the one owner of row data, column visibility, the
//! active-edit pointer and the pagination state. Everything the front end
//! draws is derived from these on each read.

use log::debug;

use crate::columns::{Visibility, visible_columns};
use crate::model::{Column, Dataset, Row, Value};
use crate::pagination::{PageSize, PageWindow, Pagination};

/// Identifies one cell by row id and column id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CellRef {
    pub row_id: String,
    pub column_id: String,
}

impl CellRef {
    pub fn new(row_id: impl Into<String>, column_id: impl Into<String>) -> Self {
        Self {
            row_id: row_id.into(),
            column_id: column_id.into(),
        }
    }

    pub fn is(&self, row_id: &str, column_id: &str) -> bool {
        self.row_id == row_id && self.column_id == column_id
    }
}

/// View model for one rendered cell.
#[derive(Debug, Clone, PartialEq)]
pub struct CellView<'a> {
    pub row_id: &'a str,
    pub column: &'a Column,
    pub value: Option<&'a Value>,
    pub editing: bool,
}

pub struct TableController {
    columns: Vec<Column>,
    rows: Vec<Row>,
    visibility: Visibility,
    /// At most one cell is in edit mode; this is the only place that says which.
    active_edit: Option<CellRef>,
    pagination: Pagination,
}

impl TableController {
    pub fn new(dataset: Dataset, page_size: PageSize) -> Self {
        let Dataset { columns, data } = dataset;
        let visibility = Visibility::all_visible(&columns);
        Self {
            columns,
            rows: data,
            visibility,
            active_edit: None,
            pagination: Pagination::new(page_size),
        }
    }

    // ===== Columns =====

    /// Every column in source order with its visibility flag, for the toggle list.
    pub fn columns_with_visibility(&self) -> impl Iterator<Item = (&Column, bool)> + '_ {
        self.columns
            .iter()
            .map(|c| (c, self.visibility.is_visible(&c.id)))
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, column_id: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == column_id)
    }

    pub fn visible_columns(&self) -> Vec<&Column> {
        visible_columns(&self.columns, &self.visibility)
    }

    /// Flip a column's visibility. Unknown ids are ignored.
    pub fn toggle_column_visibility(&mut self, column_id: &str) {
        if self.visibility.toggle(column_id) {
            debug!(
                "column '{}' now {}",
                column_id,
                if self.visibility.is_visible(column_id) { "visible" } else { "hidden" }
            );
        } else {
            debug!("ignoring visibility toggle for unknown column '{column_id}'");
        }
    }

    // ===== Editing =====

    /// Point the single editor at `(row_id, column_id)`, replacing any other.
    pub fn start_edit(&mut self, row_id: &str, column_id: &str) {
        if let Some(prev) = self.active_edit.as_ref()
            && !prev.is(row_id, column_id)
        {
            debug!("abandoning edit of {}/{}", prev.row_id, prev.column_id);
        }
        debug!("start edit {row_id}/{column_id}");
        self.active_edit = Some(CellRef::new(row_id, column_id));
    }

    /// Store `value` in the row's column and close the editor. An unknown row
    /// or column leaves the data as it was; the editor is closed regardless.
    pub fn commit_edit(&mut self, row_id: &str, column_id: &str, value: Value) {
        self.active_edit = None;
        if self.column(column_id).is_none() {
            debug!("commit ignored: unknown column '{column_id}'");
            return;
        }
        match self.rows.iter_mut().find(|r| r.id == row_id) {
            Some(row) => {
                debug!("commit {row_id}/{column_id} = {value:?}");
                row.values.insert(column_id.to_string(), value);
            }
            None => debug!("commit ignored: unknown row '{row_id}'"),
        }
    }

    /// Close the editor without touching data.
    pub fn cancel_edit(&mut self) {
        if let Some(cell) = self.active_edit.take() {
            debug!("cancel edit {}/{}", cell.row_id, cell.column_id);
        }
    }

    pub fn is_editing(&self, row_id: &str, column_id: &str) -> bool {
        self.active_edit
            .as_ref()
            .is_some_and(|c| c.is(row_id, column_id))
    }

    pub fn active_edit(&self) -> Option<&CellRef> {
        self.active_edit.as_ref()
    }

    // ===== Rows =====

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, row_id: &str) -> Option<&Row> {
        self.rows.iter().find(|r| r.id == row_id)
    }

    pub fn value(&self, row_id: &str, column_id: &str) -> Option<&Value> {
        self.row(row_id).and_then(|r| r.get(column_id))
    }

    /// Snapshot of the current data, e.g. for writing it back out.
    pub fn to_dataset(&self) -> Dataset {
        Dataset::new(self.columns.clone(), self.rows.clone())
    }

    // ===== Pagination =====

    pub fn page_window(&self) -> PageWindow {
        self.pagination.window(self.rows.len())
    }

    pub fn page_rows(&self) -> &[Row] {
        &self.rows[self.page_window().range()]
    }

    /// Visible columns × current page rows.
    pub fn page_grid(&self) -> Vec<Vec<CellView<'_>>> {
        let columns = self.visible_columns();
        self.page_rows()
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|&column| CellView {
                        row_id: &row.id,
                        column,
                        value: row.get(&column.id),
                        editing: self.is_editing(&row.id, &column.id),
                    })
                    .collect()
            })
            .collect()
    }

    pub fn page_size(&self) -> PageSize {
        self.pagination.page_size()
    }

    pub fn page_size_choices(&self) -> &'static [PageSize] {
        &PageSize::ALL
    }

    pub fn next_page(&mut self) -> bool {
        let moved = self.pagination.next_page(self.rows.len());
        if moved {
            debug!("page {}", self.pagination.current_page());
        }
        moved
    }

    pub fn previous_page(&mut self) -> bool {
        let moved = self.pagination.previous_page();
        if moved {
            debug!("page {}", self.pagination.current_page());
        }
        moved
    }

    pub fn set_page_size(&mut self, page_size: PageSize) {
        debug!("page size {page_size}");
        self.pagination.set_page_size(page_size);
    }
}
