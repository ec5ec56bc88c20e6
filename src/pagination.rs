//! Page arithmetic. Nothing here touches row data; the table slices rows with
//! the window computed from `(row_count, page_size, current_page)`.

use std::fmt;
use std::str::FromStr;

use crate::error::InvalidPageSize;

/// Rows per page, restricted to the sizes offered by the size selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageSize {
    #[default]
    Ten,
    TwentyFive,
    Fifty,
    Hundred,
    FiveHundred,
}

impl PageSize {
    pub const ALL: [PageSize; 5] = [
        PageSize::Ten,
        PageSize::TwentyFive,
        PageSize::Fifty,
        PageSize::Hundred,
        PageSize::FiveHundred,
    ];

    pub fn get(self) -> usize {
        match self {
            PageSize::Ten => 10,
            PageSize::TwentyFive => 25,
            PageSize::Fifty => 50,
            PageSize::Hundred => 100,
            PageSize::FiveHundred => 500,
        }
    }

    /// The next larger choice, wrapping back to the smallest.
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|&s| s == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

impl TryFrom<usize> for PageSize {
    type Error = InvalidPageSize;

    fn try_from(n: usize) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|s| s.get() == n)
            .ok_or(InvalidPageSize(n))
    }
}

impl FromStr for PageSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let n: usize = s
            .trim()
            .parse()
            .map_err(|_| format!("'{s}' is not a number"))?;
        PageSize::try_from(n).map_err(|e| e.to_string())
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

/// Everything the footer needs to draw one page, derived in one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub row_count: usize,
    pub current_page: usize,
    pub total_pages: usize,
    /// First row index on the page (0-based, inclusive)
    pub start_index: usize,
    /// One past the last row index on the page
    pub end_index: usize,
    pub can_go_prev: bool,
    pub can_go_next: bool,
}

impl PageWindow {
    pub fn compute(row_count: usize, page_size: PageSize, current_page: usize) -> Self {
        let size = page_size.get();
        let total_pages = total_pages(row_count, page_size);
        let current_page = current_page.clamp(1, total_pages);
        let start_index = ((current_page - 1) * size).min(row_count);
        let end_index = (start_index + size).min(row_count);
        Self {
            row_count,
            current_page,
            total_pages,
            start_index,
            end_index,
            can_go_prev: current_page > 1,
            can_go_next: current_page < total_pages,
        }
    }

    pub fn range(&self) -> std::ops::Range<usize> {
        self.start_index..self.end_index
    }

    /// "Showing 1 - 10 of 23 rows"; an empty table reads "Showing 1 - 0 of 0 rows".
    pub fn range_text(&self) -> String {
        format!(
            "Showing {} - {} of {} rows",
            self.start_index + 1,
            self.end_index,
            self.row_count
        )
    }

    /// "2 / 3"
    pub fn page_text(&self) -> String {
        format!("{} / {}", self.current_page, self.total_pages)
    }
}

/// `max(1, ceil(row_count / page_size))`
pub fn total_pages(row_count: usize, page_size: PageSize) -> usize {
    row_count.div_ceil(page_size.get()).max(1)
}

/// Page size plus the 1-based page being viewed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page_size: PageSize,
    current_page: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(PageSize::default())
    }
}

impl Pagination {
    pub fn new(page_size: PageSize) -> Self {
        Self {
            page_size,
            current_page: 1,
        }
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn window(&self, row_count: usize) -> PageWindow {
        PageWindow::compute(row_count, self.page_size, self.current_page)
    }

    /// Advance one page; no-op on the last page. Returns whether the page changed.
    pub fn next_page(&mut self, row_count: usize) -> bool {
        if self.window(row_count).can_go_next {
            self.current_page += 1;
            true
        } else {
            false
        }
    }

    /// Go back one page; no-op on the first page. Returns whether the page changed.
    pub fn previous_page(&mut self) -> bool {
        if self.current_page > 1 {
            self.current_page -= 1;
            true
        } else {
            false
        }
    }

    /// Always lands on page 1, even when the size is unchanged.
    pub fn set_page_size(&mut self, page_size: PageSize) {
        self.page_size = page_size;
        self.current_page = 1;
    }
}
