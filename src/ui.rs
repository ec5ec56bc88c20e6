use crate::app::{App, AppMode, Focus};
use crate::editor::{EditBuffer, display_value};
use crate::model::Column;
use crate::table::CellView;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, List, ListItem, Paragraph, Row, Table},
};

const COLUMNS_PANE_WIDTH: u16 = 28;
const DEFAULT_COLUMN_WEIGHT: u16 = 150;

/// Screen regions. Shared by drawing and mouse hit-testing so both agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Panes {
    pub columns: Rect,
    pub data: Rect,
    pub footer: Rect,
    pub status: Rect,
}

pub fn panes(area: Rect) -> Panes {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(2),
        ])
        .split(area);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(COLUMNS_PANE_WIDTH), Constraint::Min(10)])
        .split(chunks[0]);

    Panes {
        columns: body[0],
        data: body[1],
        footer: chunks[1],
        status: chunks[2],
    }
}

/// Page rows that fit the data pane of a screen of size `area`.
pub fn data_viewport_rows(area: Rect) -> usize {
    // two borders and the header line
    usize::from(panes(area).data.height.saturating_sub(3)).max(1)
}

pub fn draw(f: &mut Frame, app: &App) {
    let p = panes(f.size());
    draw_columns(f, p.columns, app);
    draw_data(f, p.data, app);
    draw_footer(f, p.footer, app);
    draw_status(f, p.status, app);
    if app.show_help {
        draw_help(f, p.data, app.help_scroll);
    }
}

fn pane_block(title: &str, focused: bool) -> Block<'_> {
    let border = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(border)
}

fn draw_columns(f: &mut Frame, area: Rect, app: &App) {
    let items: Vec<ListItem> = app
        .table
        .columns_with_visibility()
        .map(|(col, visible)| {
            let mark = if visible { "[x]" } else { "[ ]" };
            ListItem::new(format!("{mark} {}", col.title))
        })
        .collect();

    let focused = app.focus == Focus::Columns;
    let list = List::new(items)
        .block(pane_block("Columns", focused))
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .fg(Color::Yellow),
        );

    let mut state = ratatui::widgets::ListState::default();
    if focused && !app.table.columns().is_empty() {
        state.select(Some(app.selected_column));
    }
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_data(f: &mut Frame, area: Rect, app: &App) {
    let block = pane_block("Data", app.focus == Focus::Data);
    let columns = app.table.visible_columns();
    if columns.is_empty() {
        let p = Paragraph::new("All columns are hidden. Tab to the Columns pane to show some.")
            .block(block);
        f.render_widget(p, area);
        return;
    }

    let widths = column_widths(area.width, &columns);
    let header = Row::new(columns.iter().map(|c| Cell::from(c.title.as_str()))).style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    );

    let grid = app.table.page_grid();
    let shown = grid
        .iter()
        .enumerate()
        .skip(app.row_offset)
        .take(app.viewport_rows);
    let mut rows = Vec::with_capacity(app.viewport_rows.min(grid.len()));
    for (r_idx, cells) in shown {
        let row = cells.iter().enumerate().map(|(c_idx, view)| {
            let selected =
                app.focus == Focus::Data && r_idx == app.sel_row && c_idx == app.sel_col;
            render_cell(view, app, selected)
        });
        rows.push(Row::new(row.collect::<Vec<_>>()));
    }

    let table = Table::new(
        rows,
        widths.iter().map(|&w| Constraint::Length(w)).collect::<Vec<_>>(),
    )
    .header(header)
    .block(block)
    .column_spacing(1);

    f.render_widget(table, area);
}

fn render_cell(view: &CellView<'_>, app: &App, selected: bool) -> Cell<'static> {
    if view.editing
        && let AppMode::Editing(editor) = &app.mode
    {
        let style = Style::default().bg(Color::Yellow).fg(Color::Black);
        let line = match editor.buffer() {
            EditBuffer::Text(input) | EditBuffer::Number { input, .. } => {
                let text = input.text();
                let split = text
                    .char_indices()
                    .nth(input.cursor_chars())
                    .map_or(text.len(), |(i, _)| i);
                let (before, after) = text.split_at(split);
                let mut rest = after.chars();
                let under = rest.next().map(String::from).unwrap_or_else(|| " ".into());
                Line::from(vec![
                    Span::raw(before.to_string()),
                    Span::styled(under, style.add_modifier(Modifier::REVERSED)),
                    Span::raw(rest.as_str().to_string()),
                ])
            }
            EditBuffer::Boolean(_) | EditBuffer::Select { .. } => {
                Line::from(format!("◂ {} ▸", editor.buffer().edit_text()))
            }
        };
        return Cell::from(line).style(style);
    }

    let shown = display_value(&view.column.kind, view.value);
    let mut cell = if shown.is_placeholder() {
        Cell::from(shown.text().to_string()).style(
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )
    } else {
        Cell::from(shown.text().to_string())
    };
    if selected {
        cell = cell.style(Style::default().bg(Color::Blue).fg(Color::Black));
    }
    cell
}

fn draw_footer(f: &mut Frame, area: Rect, app: &App) {
    let w = app.table.page_window();
    let enabled = Style::default().fg(Color::Cyan);
    let disabled = Style::default().fg(Color::DarkGray);

    let mut spans = vec![Span::raw("Rows per page: ")];
    for &size in app.table.page_size_choices() {
        if size == app.table.page_size() {
            spans.push(Span::styled(
                format!("[{size}]"),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ));
        } else {
            spans.push(Span::raw(format!(" {size} ")));
        }
    }
    spans.push(Span::raw(format!("   {}   ", w.range_text())));
    spans.push(Span::styled(
        "◀ Previous",
        if w.can_go_prev { enabled } else { disabled },
    ));
    spans.push(Span::raw(format!("  {}  ", w.page_text())));
    spans.push(Span::styled(
        "Next ▶",
        if w.can_go_next { enabled } else { disabled },
    ));

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
    let mode = match app.mode {
        AppMode::Normal => "NORMAL",
        AppMode::Editing(_) => "EDIT",
    };
    let mut spans = vec![
        Span::styled(
            format!("[{mode}] "),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(&app.status),
    ];
    if let Some(EditBuffer::Select { options, index }) = app.editor().map(|e| e.buffer()) {
        let choices: Vec<String> = options
            .iter()
            .enumerate()
            .map(|(i, o)| if i == *index { format!("[{o}]") } else { o.clone() })
            .collect();
        spans.push(Span::raw(format!(" | {}", choices.join(" "))));
    }
    let p = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::TOP));
    f.render_widget(p, area);
}

pub const HELP: [(&str, &str); 14] = [
    ("Tab", "switch between Columns and Data"),
    ("arrows / hjkl", "move selection"),
    ("Enter / e / click", "edit the selected cell"),
    ("Enter", "save edit"),
    ("Esc", "cancel edit"),
    ("Tab / Up / Down", "save edit and move on"),
    ("Left / Right / Space", "change a Yes/No or choice cell"),
    ("PgDn / n", "next page"),
    ("PgUp / p", "previous page"),
    ("s", "cycle rows per page"),
    ("Space / Enter", "show or hide column (Columns pane)"),
    ("?", "toggle this help"),
    ("Up / Down", "scroll this help"),
    ("q", "quit"),
];

fn draw_help(f: &mut Frame, area: Rect, scroll: u16) {
    let lines: Vec<Line> = HELP
        .iter()
        .map(|(keys, what)| {
            Line::from(vec![
                Span::styled(format!("{keys:>22}  "), Style::default().fg(Color::Yellow)),
                Span::raw(*what),
            ])
        })
        .collect();
    let height = (HELP.len() as u16 + 2).min(area.height);
    let width = 64.min(area.width);
    let popup = Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    };
    // too short for every entry: say so in the title
    let title = if height < HELP.len() as u16 + 2 {
        "Keys (Up/Down to scroll)"
    } else {
        "Keys"
    };
    f.render_widget(Clear, popup);
    f.render_widget(
        Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title(title))
            .scroll((scroll, 0)),
        popup,
    );
}

/// Split the inner width across columns in proportion to their width hints.
pub fn column_widths(total_width: u16, columns: &[&Column]) -> Vec<u16> {
    if columns.is_empty() {
        return vec![];
    }
    let n = columns.len() as u32;
    // borders and spacing
    let avail = u32::from(total_width).saturating_sub(2 + (n - 1));
    let weights: Vec<u32> = columns
        .iter()
        .map(|c| u32::from(c.width.unwrap_or(DEFAULT_COLUMN_WEIGHT).max(1)))
        .collect();
    let sum: u32 = weights.iter().sum();
    weights
        .iter()
        .map(|w| (avail * w / sum).max(1) as u16)
        .collect()
}

/// Which `(row, column)` of the page grid sits under the point, if any.
/// `row_offset` is the first page row drawn in the pane.
pub fn cell_at(
    data: Rect,
    widths: &[u16],
    row_offset: usize,
    row_count: usize,
    x: u16,
    y: u16,
) -> Option<(usize, usize)> {
    // one border line and one header line above the first row
    let first_row_y = data.y + 2;
    if y < first_row_y || y >= data.bottom().saturating_sub(1) {
        return None;
    }
    let row = row_offset + usize::from(y - first_row_y);
    if row >= row_count || x <= data.x {
        return None;
    }

    let mut left = data.x + 1;
    for (i, &w) in widths.iter().enumerate() {
        if x >= left && x < left + w {
            return Some((row, i));
        }
        left += w + 1;
    }
    None
}

/// Which entry of the column toggle list sits under the point, if any.
pub fn column_entry_at(list: Rect, count: usize, x: u16, y: u16) -> Option<usize> {
    if x <= list.x || x + 1 >= list.right() || y <= list.y || y + 1 >= list.bottom() {
        return None;
    }
    let idx = usize::from(y - list.y - 1);
    (idx < count).then_some(idx)
}
