//! Paginated, column-filterable, cell-editable table for the terminal.
//!
//! The state model (`pagination`, `columns`, `editor`, `table`) has no
//! terminal dependencies; `app` and `ui` put it on screen with ratatui.

pub mod app;
pub mod columns;
pub mod editor;
pub mod error;
pub mod generator;
pub mod model;
pub mod pagination;
pub mod table;
pub mod ui;
