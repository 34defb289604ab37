//! Roadmap grid items shown on the home page and edited from the admin screen.
//!
//! The grid has two halves (January-June on top, July-December below), six
//! columns, and any number of rows per half. Row 0 is the main row; higher rows
//! hold details.

pub mod client;
pub mod types;

pub use client::{create, delete, list, list_admin, update};
pub use types::{Half, NewRoadmapItem, RoadmapItem, RoadmapPatch};

use crate::api::ApiError;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RoadmapError {
    #[error("Label is required.")]
    LabelRequired,
    #[error("Label must be at most {max} characters.")]
    LabelTooLong { max: usize },
    #[error("Row must not be negative.")]
    NegativeRow,
    #[error("Column start {col_start} with span {col_span} does not fit the 6-column grid.")]
    ColumnsOutOfRange { col_start: i32, col_span: i32 },
    #[error("Invalid {field} color {value}: expected #RRGGBB.")]
    InvalidColor { field: &'static str, value: String },
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Groups items by `(half, row)`, each group sorted by `order` then id.
#[must_use]
pub fn arrange(items: &[RoadmapItem]) -> BTreeMap<(Half, i32), Vec<RoadmapItem>> {
    let mut grid: BTreeMap<(Half, i32), Vec<RoadmapItem>> = BTreeMap::new();

    for item in items {
        grid.entry((item.half, item.row))
            .or_default()
            .push(item.clone());
    }

    for cells in grid.values_mut() {
        cells.sort_by_key(|item| (item.order, item.id));
    }

    grid
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: i64, half: Half, row: i32, order: i32) -> RoadmapItem {
        RoadmapItem {
            id,
            half,
            row,
            col_start: 1,
            col_span: 1,
            label: format!("item {id}"),
            bg_color: types::DEFAULT_BG_COLOR.to_string(),
            text_color: types::DEFAULT_TEXT_COLOR.to_string(),
            order,
        }
    }

    #[test]
    fn arrange_groups_by_half_and_row_in_order() {
        let items = vec![
            item(1, Half::Bottom, 0, 0),
            item(2, Half::Top, 1, 2),
            item(3, Half::Top, 0, 1),
            item(4, Half::Top, 1, 0),
            item(5, Half::Top, 0, 0),
        ];

        let grid = arrange(&items);
        let keys: Vec<(Half, i32)> = grid.keys().copied().collect();
        assert_eq!(
            keys,
            vec![(Half::Top, 0), (Half::Top, 1), (Half::Bottom, 0)]
        );

        let top_main: Vec<i64> = grid[&(Half::Top, 0)].iter().map(|i| i.id).collect();
        assert_eq!(top_main, vec![5, 3]);
        let top_detail: Vec<i64> = grid[&(Half::Top, 1)].iter().map(|i| i.id).collect();
        assert_eq!(top_detail, vec![4, 2]);
    }

    #[test]
    fn arrange_empty() {
        assert!(arrange(&[]).is_empty());
    }
}
