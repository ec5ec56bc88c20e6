use std::collections::HashMap;

use crate::model::Column;

/// Per-column visibility flags. Keys are fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visibility {
    flags: HashMap<String, bool>,
}

impl Visibility {
    /// Every column starts visible.
    pub fn all_visible(columns: &[Column]) -> Self {
        Self {
            flags: columns.iter().map(|c| (c.id.clone(), true)).collect(),
        }
    }

    pub fn is_visible(&self, column_id: &str) -> bool {
        self.flags.get(column_id).copied().unwrap_or(false)
    }

    /// Flip a known column. Unknown ids are ignored and report `false`.
    pub fn toggle(&mut self, column_id: &str) -> bool {
        match self.flags.get_mut(column_id) {
            Some(flag) => {
                *flag = !*flag;
                true
            }
            None => false,
        }
    }
}

/// Visible columns in ascending `ordinal_no`; ties keep source order.
pub fn visible_columns<'a>(columns: &'a [Column], visibility: &Visibility) -> Vec<&'a Column> {
    let mut out: Vec<&Column> = columns
        .iter()
        .filter(|c| visibility.is_visible(&c.id))
        .collect();
    out.sort_by_key(|c| c.ordinal_no);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ColumnKind;

    fn cols() -> Vec<Column> {
        vec![
            Column::new("email", 3, "Email", ColumnKind::String),
            Column::new("name", 1, "Name", ColumnKind::String),
            Column::new("age", 2, "Age", ColumnKind::Number),
            Column::new("a", 10, "A", ColumnKind::String),
            Column::new("b", 10, "B", ColumnKind::String),
        ]
    }

    fn ids(v: &[&Column]) -> Vec<String> {
        v.iter().map(|c| c.id.clone()).collect()
    }

    #[test]
    fn orders_by_ordinal_and_keeps_ties_stable() {
        let columns = cols();
        let vis = Visibility::all_visible(&columns);
        assert_eq!(
            ids(&visible_columns(&columns, &vis)),
            ["name", "age", "email", "a", "b"]
        );
    }

    #[test]
    fn toggle_twice_restores_the_set() {
        let columns = cols();
        let mut vis = Visibility::all_visible(&columns);
        let before = vis.clone();

        assert!(vis.toggle("age"));
        assert_eq!(ids(&visible_columns(&columns, &vis)), ["name", "email", "a", "b"]);
        assert!(vis.toggle("age"));
        assert_eq!(vis, before);
    }

    #[test]
    fn toggle_order_does_not_matter() {
        let columns = cols();
        let mut one = Visibility::all_visible(&columns);
        let mut two = one.clone();
        one.toggle("name");
        one.toggle("b");
        two.toggle("b");
        two.toggle("name");
        assert_eq!(one, two);
        assert_eq!(ids(&visible_columns(&columns, &one)), ["age", "email", "a"]);
    }

    #[test]
    fn unknown_column_is_ignored() {
        let columns = cols();
        let mut vis = Visibility::all_visible(&columns);
        let before = vis.clone();
        assert!(!vis.toggle("salary"));
        assert_eq!(vis, before);
        assert!(!vis.is_visible("salary"));
    }
}
