use std::cmp::min;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::Rect;

use crate::editor::CellEditor;
use crate::table::{CellRef, TableController};
use crate::ui;

#[derive(Debug, Clone, PartialEq)]
pub enum AppMode {
    Normal,
    Editing(CellEditor),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Columns,
    Data,
}

pub struct App {
    pub should_quit: bool,

    // UI state
    pub mode: AppMode,
    pub status: String,
    pub focus: Focus,
    pub show_help: bool,
    pub help_scroll: u16,

    pub table: TableController,

    /// Highlighted entry in the column toggle list (source order)
    pub selected_column: usize,

    // Cell selection, relative to the current page and the visible columns
    pub sel_row: usize,
    pub sel_col: usize,

    /// Number of page rows the data pane can show at once; <= page size
    pub viewport_rows: usize,
    /// First page row shown in the data pane
    pub row_offset: usize,
}

impl App {
    pub fn new(table: TableController) -> Self {
        Self {
            should_quit: false,
            mode: AppMode::Normal,
            status: "Press ? for help. Enter to edit a cell, Tab to switch panes, q to quit."
                .into(),
            focus: Focus::Data,
            show_help: false,
            help_scroll: 0,
            viewport_rows: table.page_size().get(),
            table,
            selected_column: 0,
            sel_row: 0,
            sel_col: 0,
            row_offset: 0,
        }
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.mode, AppMode::Editing(_))
    }

    pub fn editor(&self) -> Option<&CellEditor> {
        match &self.mode {
            AppMode::Editing(editor) => Some(editor),
            AppMode::Normal => None,
        }
    }

    fn editor_mut(&mut self) -> Option<&mut CellEditor> {
        match &mut self.mode {
            AppMode::Editing(editor) => Some(editor),
            AppMode::Normal => None,
        }
    }

    // Focus helpers; leaving the data pane commits an open edit
    pub fn toggle_focus(&mut self) {
        self.submit_cell_edit();
        self.focus = match self.focus {
            Focus::Columns => Focus::Data,
            Focus::Data => Focus::Columns,
        };
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
        self.help_scroll = 0;
    }

    // ===== Input dispatch =====

    pub fn handle_key(&mut self, key: KeyEvent) {
        if self.is_editing() {
            self.handle_key_editing(key);
            return;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            if let KeyCode::Char('c') = key.code {
                self.should_quit = true;
            }
            return;
        }
        if self.show_help {
            self.handle_key_help(key.code);
            return;
        }
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.toggle_help(),
            KeyCode::Tab | KeyCode::BackTab => self.toggle_focus(),
            KeyCode::PageDown | KeyCode::Char('n') => self.next_page(),
            KeyCode::PageUp | KeyCode::Char('p') => self.prev_page(),
            KeyCode::Char('s') => self.cycle_page_size(),
            code => match self.focus {
                Focus::Columns => self.handle_key_columns(code),
                Focus::Data => self.handle_key_normal(code),
            },
        }
    }

    fn handle_key_help(&mut self, code: KeyCode) {
        match code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.help_scroll = self.help_scroll.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let last = ui::HELP.len().saturating_sub(1) as u16;
                self.help_scroll = min(self.help_scroll + 1, last);
            }
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') | KeyCode::Esc => self.toggle_help(),
            _ => {}
        }
    }

    fn handle_key_columns(&mut self, code: KeyCode) {
        match code {
            KeyCode::Up | KeyCode::Char('k') => self.move_column_selection_up(),
            KeyCode::Down | KeyCode::Char('j') => self.move_column_selection_down(),
            KeyCode::Char(' ') | KeyCode::Enter => self.toggle_selected_column(),
            _ => {}
        }
    }

    fn handle_key_normal(&mut self, code: KeyCode) {
        match code {
            KeyCode::Up | KeyCode::Char('k') => self.move_cell_up(),
            KeyCode::Down | KeyCode::Char('j') => self.move_cell_down(),
            KeyCode::Left | KeyCode::Char('h') => self.move_cell_left(),
            KeyCode::Right | KeyCode::Char('l') => self.move_cell_right(),
            KeyCode::Enter | KeyCode::Char('e') => self.begin_edit_cell(),
            _ => {}
        }
    }

    fn handle_key_editing(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.submit_cell_edit(),
            KeyCode::Esc => self.cancel_edit_cell(),
            // Leaving the cell commits it
            KeyCode::Tab | KeyCode::BackTab => self.toggle_focus(),
            KeyCode::Up => {
                self.submit_cell_edit();
                self.move_cell_up();
            }
            KeyCode::Down => {
                self.submit_cell_edit();
                self.move_cell_down();
            }
            KeyCode::Backspace => self.edit_input_backspace(),
            KeyCode::Delete => self.edit_input_delete(),
            KeyCode::Left => self.edit_input_left(),
            KeyCode::Right => self.edit_input_right(),
            KeyCode::Home => self.edit_input_home(),
            KeyCode::End => self.edit_input_end(),
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.edit_input_insert(c)
            }
            _ => {}
        }
    }

    /// Left click at `(x, y)` on a screen of size `area`. A data cell opens;
    /// a column entry toggles. Anywhere else takes focus away from an open
    /// editor, which commits it. Returns whether anything changed.
    pub fn handle_click(&mut self, area: Rect, x: u16, y: u16) -> bool {
        let panes = ui::panes(area);

        let widths = ui::column_widths(panes.data.width, &self.table.visible_columns());
        let rows = self.table.page_rows().len();
        if let Some((row, col)) = ui::cell_at(panes.data, &widths, self.row_offset, rows, x, y) {
            self.activate_cell(row, col);
            return true;
        }

        let count = self.table.columns().len();
        if let Some(idx) = ui::column_entry_at(panes.columns, count, x, y) {
            self.submit_cell_edit();
            self.focus = Focus::Columns;
            self.selected_column = idx;
            self.toggle_selected_column();
            return true;
        }

        if self.is_editing() {
            self.submit_cell_edit();
            return true;
        }
        false
    }

    // ===== Column toggle list =====

    pub fn move_column_selection_up(&mut self) {
        let n = self.table.columns().len();
        if n == 0 {
            return;
        }
        if self.selected_column == 0 {
            self.selected_column = n - 1;
        } else {
            self.selected_column -= 1;
        }
    }

    pub fn move_column_selection_down(&mut self) {
        let n = self.table.columns().len();
        if n == 0 {
            return;
        }
        self.selected_column = (self.selected_column + 1) % n;
    }

    pub fn toggle_selected_column(&mut self) {
        let Some(column) = self.table.columns().get(self.selected_column) else {
            return;
        };
        let (id, title) = (column.id.clone(), column.title.clone());
        self.submit_cell_edit();
        self.table.toggle_column_visibility(&id);
        let shown = self.table.visible_columns().iter().any(|c| c.id == id);
        self.status = format!("{} column {}", title, if shown { "shown" } else { "hidden" });
        self.clamp_selection();
    }

    // ===== Pagination =====

    pub fn next_page(&mut self) {
        if self.table.next_page() {
            self.sel_row = 0;
            self.row_offset = 0;
            self.status = self.page_status();
        }
    }

    pub fn prev_page(&mut self) {
        if self.table.previous_page() {
            self.sel_row = 0;
            self.row_offset = 0;
            self.status = self.page_status();
        }
    }

    /// Step through the page-size choices (10 → 25 → … → 500 → 10).
    pub fn cycle_page_size(&mut self) {
        let next = self.table.page_size().next();
        self.table.set_page_size(next);
        self.sel_row = 0;
        self.row_offset = 0;
        self.status = format!("Rows per page: {next}");
    }

    fn page_status(&self) -> String {
        let w = self.table.page_window();
        format!("Page {} ({})", w.page_text(), w.range_text())
    }

    // ===== Cell selection =====

    fn clamp_selection(&mut self) {
        let rows = self.table.page_rows().len();
        let cols = self.table.visible_columns().len();
        self.sel_row = self.sel_row.min(rows.saturating_sub(1));
        self.sel_col = self.sel_col.min(cols.saturating_sub(1));
        self.scroll_to_selection();
    }

    /// Resize the data viewport (rows that fit the pane) and keep the
    /// selection inside it.
    pub fn set_viewport_rows(&mut self, rows: usize) {
        self.viewport_rows = rows.max(1);
        self.scroll_to_selection();
    }

    /// Move `row_offset` the least amount that brings `sel_row` on screen.
    fn scroll_to_selection(&mut self) {
        let rows = self.table.page_rows().len();
        let view = self.viewport_rows.max(1);
        if self.sel_row < self.row_offset {
            self.row_offset = self.sel_row;
        } else if self.sel_row >= self.row_offset + view {
            self.row_offset = self.sel_row + 1 - view;
        }
        self.row_offset = self.row_offset.min(rows.saturating_sub(view));
    }

    pub fn move_cell_left(&mut self) {
        self.sel_col = self.sel_col.saturating_sub(1);
    }

    pub fn move_cell_right(&mut self) {
        let cols = self.table.visible_columns().len();
        self.sel_col = min(self.sel_col + 1, cols.saturating_sub(1));
    }

    pub fn move_cell_up(&mut self) {
        self.sel_row = self.sel_row.saturating_sub(1);
        self.scroll_to_selection();
    }

    pub fn move_cell_down(&mut self) {
        let rows = self.table.page_rows().len();
        self.sel_row = min(self.sel_row + 1, rows.saturating_sub(1));
        self.scroll_to_selection();
    }

    pub fn selected_cell(&self) -> Option<CellRef> {
        let row = self.table.page_rows().get(self.sel_row)?;
        let column = self.table.visible_columns().get(self.sel_col).copied()?;
        Some(CellRef::new(row.id.as_str(), column.id.as_str()))
    }

    // ===== Editing =====

    pub fn begin_edit_cell(&mut self) {
        let Some(cell) = self.selected_cell() else {
            self.status = "Nothing to edit".into();
            return;
        };
        if self.editor().is_some_and(|e| e.cell() == &cell) {
            // Already editing this cell; keep the buffer
            return;
        }
        // Another cell's open buffer is committed before this one opens
        self.submit_cell_edit();

        let Some(column) = self.table.column(&cell.column_id) else {
            return;
        };
        let editor = CellEditor::open(
            cell.clone(),
            column,
            self.table.value(&cell.row_id, &cell.column_id),
        );
        let title = column.title.clone();
        self.table.start_edit(&cell.row_id, &cell.column_id);
        self.mode = AppMode::Editing(editor);
        self.status = format!("Editing {title}: Enter to save, Esc to cancel");
    }

    /// Commit the open editor, if any. Used for Enter and for every loss of focus.
    pub fn submit_cell_edit(&mut self) {
        let AppMode::Editing(editor) = std::mem::replace(&mut self.mode, AppMode::Normal) else {
            return;
        };
        match editor.commit() {
            Some((cell, value)) => {
                self.table.commit_edit(&cell.row_id, &cell.column_id, value);
                self.status = "Cell updated".into();
            }
            None => {
                self.table.cancel_edit();
                self.status = "No changes".into();
            }
        }
    }

    pub fn cancel_edit_cell(&mut self) {
        if let AppMode::Editing(editor) = std::mem::replace(&mut self.mode, AppMode::Normal) {
            editor.cancel();
            self.table.cancel_edit();
            self.status = "Edit cancelled".into();
        }
    }

    /// Select `(row, col)` on the current page and open its editor. The cell
    /// already being edited keeps its buffer.
    pub fn activate_cell(&mut self, row: usize, col: usize) {
        self.focus = Focus::Data;
        self.sel_row = row;
        self.sel_col = col;
        self.clamp_selection();
        self.begin_edit_cell();
    }

    // Editing buffer ops
    pub fn edit_input_insert(&mut self, ch: char) {
        if let Some(editor) = self.editor_mut() {
            editor.insert_char(ch);
        }
    }
    pub fn edit_input_backspace(&mut self) {
        if let Some(editor) = self.editor_mut() {
            editor.backspace();
        }
    }
    pub fn edit_input_delete(&mut self) {
        if let Some(editor) = self.editor_mut() {
            editor.delete();
        }
    }
    pub fn edit_input_left(&mut self) {
        if let Some(editor) = self.editor_mut() {
            editor.left();
        }
    }
    pub fn edit_input_right(&mut self) {
        if let Some(editor) = self.editor_mut() {
            editor.right();
        }
    }
    pub fn edit_input_home(&mut self) {
        if let Some(editor) = self.editor_mut() {
            editor.home();
        }
    }
    pub fn edit_input_end(&mut self) {
        if let Some(editor) = self.editor_mut() {
            editor.end();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator;
    use crate::model::Value;
    use crate::pagination::PageSize;

    fn app(rows: usize) -> App {
        App::new(TableController::new(
            generator::generate(rows, Some(3)),
            PageSize::Ten,
        ))
    }

    fn selected_value(app: &App) -> Option<Value> {
        let cell = app.selected_cell()?;
        app.table.value(&cell.row_id, &cell.column_id).cloned()
    }

    #[test]
    fn editor_and_pointer_agree() {
        let mut app = app(5);
        app.begin_edit_cell();
        let cell = app.editor().map(|e| e.cell().clone());
        assert_eq!(cell.as_ref(), app.table.active_edit());

        app.cancel_edit_cell();
        assert!(app.editor().is_none());
        assert!(app.table.active_edit().is_none());
    }

    #[test]
    fn typing_then_enter_commits() {
        let mut app = app(5);
        app.begin_edit_cell();
        app.edit_input_end();
        app.edit_input_insert('!');
        let expected = match app.editor().map(|e| e.buffer().edit_text()) {
            Some(text) => Value::Text(text),
            None => panic!("editor not open"),
        };
        app.submit_cell_edit();
        assert_eq!(selected_value(&app), Some(expected));
        assert!(!app.is_editing());
    }

    #[test]
    fn escape_discards_the_buffer() {
        let mut app = app(5);
        let before = selected_value(&app);
        app.begin_edit_cell();
        app.edit_input_insert('x');
        app.cancel_edit_cell();
        assert_eq!(selected_value(&app), before);
    }

    #[test]
    fn moving_focus_commits_the_open_edit() {
        let mut app = app(5);
        app.sel_col = 1; // Age
        app.begin_edit_cell();
        app.edit_input_end();
        for _ in 0..3 {
            app.edit_input_backspace();
        }
        app.edit_input_insert('7');
        app.toggle_focus();
        assert_eq!(app.focus, Focus::Columns);
        assert_eq!(selected_value(&app), Some(Value::Number(7.0)));
        assert!(app.table.active_edit().is_none());
    }

    #[test]
    fn activating_another_cell_commits_the_first() {
        let mut app = app(5);
        app.sel_col = 4; // Manager
        let before = selected_value(&app).and_then(|v| v.as_bool()).unwrap();
        app.begin_edit_cell();
        app.edit_input_right();
        app.activate_cell(2, 0);

        app.sel_row = 0;
        app.sel_col = 4;
        assert_eq!(selected_value(&app), Some(Value::Bool(!before)));

        let open = app.table.active_edit().cloned().unwrap();
        assert_eq!(open.row_id, app.table.page_rows()[2].id);
        assert_eq!(open.column_id, "name");
    }

    #[test]
    fn hiding_columns_keeps_selection_in_range() {
        let mut app = app(3);
        app.sel_col = 5;
        for idx in 0..6 {
            app.selected_column = idx;
            app.toggle_selected_column();
        }
        assert!(app.table.visible_columns().is_empty());
        assert_eq!(app.sel_col, 0);
        assert!(app.selected_cell().is_none());
        app.begin_edit_cell();
        assert!(!app.is_editing());
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    const SCREEN: Rect = Rect {
        x: 0,
        y: 0,
        width: 120,
        height: 24,
    };

    /// Screen position of page row `row`, first visible column.
    fn cell_point(app: &App, row: usize) -> (u16, u16) {
        let data = ui::panes(SCREEN).data;
        let y = data.y + 2 + (row - app.row_offset) as u16;
        (data.x + 1, y)
    }

    #[test]
    fn arrow_keys_while_editing_commit_then_move() {
        let mut app = app(5);
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::End);
        press(&mut app, KeyCode::Char('!'));
        let expected = app.editor().map(|e| Value::Text(e.buffer().edit_text()));
        press(&mut app, KeyCode::Down);
        assert!(!app.is_editing());
        assert_eq!(app.sel_row, 1);

        app.sel_row = 0;
        assert_eq!(selected_value(&app), expected);

        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Char('e'));
        press(&mut app, KeyCode::Char('?'));
        press(&mut app, KeyCode::Up);
        assert!(!app.is_editing());
        assert_eq!(app.sel_row, 0);
        app.sel_row = 1;
        assert!(selected_value(&app).and_then(|v| v.as_str().map(|s| s.ends_with('?'))).unwrap());
    }

    #[test]
    fn tab_while_editing_commits_and_switches_pane() {
        let mut app = app(5);
        app.sel_col = 4; // Manager
        let before = selected_value(&app).and_then(|v| v.as_bool()).unwrap();
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focus, Focus::Columns);
        assert!(app.table.active_edit().is_none());
        assert_eq!(selected_value(&app), Some(Value::Bool(!before)));
    }

    #[test]
    fn escape_key_cancels_without_saving() {
        let mut app = app(5);
        let before = selected_value(&app);
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Esc);
        assert!(!app.is_editing());
        assert_eq!(selected_value(&app), before);
    }

    #[test]
    fn click_on_empty_space_commits() {
        let mut app = app(5);
        app.set_viewport_rows(ui::data_viewport_rows(SCREEN));
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('x'));
        let expected = app.editor().map(|e| Value::Text(e.buffer().edit_text()));

        let footer = ui::panes(SCREEN).footer;
        assert!(app.handle_click(SCREEN, footer.x + 2, footer.y));
        assert!(!app.is_editing());
        assert!(app.table.active_edit().is_none());
        assert_eq!(selected_value(&app), expected);

        // nothing open, nothing to do
        assert!(!app.handle_click(SCREEN, footer.x + 2, footer.y));
    }

    #[test]
    fn click_on_column_entry_commits_before_toggling() {
        let mut app = app(5);
        app.set_viewport_rows(ui::data_viewport_rows(SCREEN));
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('x'));
        let expected = app.editor().map(|e| Value::Text(e.buffer().edit_text()));

        // first entry of the list is the Name column being edited
        let list = ui::panes(SCREEN).columns;
        assert!(app.handle_click(SCREEN, list.x + 2, list.y + 1));
        assert!(!app.is_editing());
        assert_eq!(app.focus, Focus::Columns);
        assert!(app.table.visible_columns().iter().all(|c| c.id != "name"));

        let row_id = app.table.page_rows()[0].id.clone();
        assert_eq!(app.table.value(&row_id, "name").cloned(), expected);
    }

    #[test]
    fn click_on_another_cell_commits_and_opens_it() {
        let mut app = app(5);
        app.set_viewport_rows(ui::data_viewport_rows(SCREEN));
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('x'));
        let expected = app.editor().map(|e| Value::Text(e.buffer().edit_text()));

        let (x, y) = cell_point(&app, 3);
        assert!(app.handle_click(SCREEN, x, y));
        assert_eq!(app.sel_row, 3);
        let open = app.table.active_edit().cloned().unwrap();
        assert_eq!(open.row_id, app.table.page_rows()[3].id);

        let first = app.table.page_rows()[0].id.clone();
        assert_eq!(app.table.value(&first, "name").cloned(), expected);
    }

    #[test]
    fn click_inside_the_open_cell_keeps_the_buffer() {
        let mut app = app(5);
        app.set_viewport_rows(ui::data_viewport_rows(SCREEN));
        let before = selected_value(&app);
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Home);
        press(&mut app, KeyCode::Char('x'));

        let (x, y) = cell_point(&app, 0);
        assert!(app.handle_click(SCREEN, x, y));
        assert!(app.is_editing());
        assert_eq!(selected_value(&app), before);

        // the cursor stayed after the inserted char
        press(&mut app, KeyCode::Char('y'));
        let text = app.editor().map(|e| e.buffer().edit_text()).unwrap();
        assert!(text.starts_with("xy"));
    }

    #[test]
    fn selection_scrolls_the_viewport() {
        let mut app = App::new(TableController::new(
            generator::generate(100, Some(3)),
            PageSize::Fifty,
        ));
        app.set_viewport_rows(10);
        for _ in 0..40 {
            press(&mut app, KeyCode::Down);
        }
        assert_eq!(app.sel_row, 40);
        assert_eq!(app.row_offset, 31);

        for _ in 0..35 {
            press(&mut app, KeyCode::Up);
        }
        assert_eq!(app.sel_row, 5);
        assert_eq!(app.row_offset, 5);

        // a taller pane never scrolls past the end of the page
        app.sel_row = 49;
        app.set_viewport_rows(30);
        assert_eq!(app.row_offset, 20);

        app.next_page();
        assert_eq!((app.sel_row, app.row_offset), (0, 0));
    }

    #[test]
    fn clicks_land_on_scrolled_rows() {
        let mut app = App::new(TableController::new(
            generator::generate(100, Some(3)),
            PageSize::Fifty,
        ));
        app.set_viewport_rows(ui::data_viewport_rows(SCREEN));
        for _ in 0..40 {
            press(&mut app, KeyCode::Down);
        }
        assert!(app.row_offset > 0);

        let (x, y) = cell_point(&app, 38);
        assert!(app.handle_click(SCREEN, x, y));
        let open = app.table.active_edit().cloned().unwrap();
        assert_eq!(open.row_id, app.table.page_rows()[38].id);
    }

    #[test]
    fn help_scrolls_and_closes() {
        let mut app = app(5);
        press(&mut app, KeyCode::Char('?'));
        assert!(app.show_help);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Down);
        assert_eq!(app.help_scroll, 2);
        // selection does not move behind the popup
        assert_eq!(app.sel_row, 0);
        for _ in 0..50 {
            press(&mut app, KeyCode::Down);
        }
        assert_eq!(usize::from(app.help_scroll), ui::HELP.len() - 1);
        press(&mut app, KeyCode::Esc);
        assert!(!app.show_help);
        assert_eq!(app.help_scroll, 0);
    }

    #[test]
    fn page_size_cycle_returns_to_first_page() {
        let mut app = app(40);
        app.next_page();
        app.next_page();
        assert_eq!(app.table.page_window().current_page, 3);
        app.cycle_page_size();
        assert_eq!(app.table.page_size(), PageSize::TwentyFive);
        assert_eq!(app.table.page_window().current_page, 1);
    }
}
