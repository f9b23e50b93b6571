//! Page geometry and the tiling math that places labels on it.
use svglabel_units::{AreaDimension, LengthDimension};

use crate::error::TemplateError;

/// A sheet of identical labels: page size, spacing between labels, and the grid
/// count as `(columns, rows)`. Labels are centered on the page as a block, so the
/// margins follow from the other values.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelSheet {
    page: AreaDimension,
    space: AreaDimension,
    count: (usize, usize),
    flip_x: bool,
}

impl LabelSheet {
    /// Fails unless there is at least one column and one row, and the label
    /// count fits in a `usize`.
    pub fn new(
        page: AreaDimension,
        space: AreaDimension,
        count: (usize, usize),
        flip_x: bool,
    ) -> Result<Self, TemplateError> {
        if count.0 < 1 || count.1 < 1 {
            return Err(TemplateError::InvalidSheet(format!(
                "count must be at least (1, 1), got ({}, {})",
                count.0, count.1
            )));
        }
        if count.0.checked_mul(count.1).is_none() {
            return Err(TemplateError::InvalidSheet(format!(
                "count ({}, {}) holds too many labels",
                count.0, count.1
            )));
        }
        Ok(Self {
            page,
            space,
            count,
            flip_x,
        })
    }

    pub fn page(&self) -> AreaDimension {
        self.page
    }

    pub fn space(&self) -> AreaDimension {
        self.space
    }

    pub fn count(&self) -> (usize, usize) {
        self.count
    }

    pub fn columns(&self) -> usize {
        self.count.0
    }

    pub fn rows(&self) -> usize {
        self.count.1
    }

    pub fn flip_x(&self) -> bool {
        self.flip_x
    }

    pub fn labels_per_sheet(&self) -> usize {
        self.count.0 * self.count.1
    }

    /// The X and Y margins for labels of the given size.
    pub fn margins(&self, label: AreaDimension) -> AreaDimension {
        let margin = |page: LengthDimension, label: LengthDimension, space: LengthDimension, n: usize| {
            let contents = label * n as f64 + space * (n - 1) as f64;
            (page - contents) / 2.0
        };
        (
            margin(self.page.0, label.0, self.space.0, self.count.0),
            margin(self.page.1, label.1, self.space.1, self.count.1),
        )
    }

    /// The grid cell `(column, row)` of the `index`-th label on a page.
    /// With `flip_x`, columns are numbered from the right.
    pub fn slot(&self, index: usize) -> (usize, usize) {
        let column = index % self.count.0;
        let row = index / self.count.0;
        if self.flip_x {
            (self.count.0 - 1 - column, row)
        } else {
            (column, row)
        }
    }

    /// The top-left corner of the `index`-th label on a page.
    pub fn offset(&self, label: AreaDimension, index: usize) -> AreaDimension {
        let (margin_x, margin_y) = self.margins(label);
        let (column, row) = self.slot(index);
        (
            margin_x + (label.0 + self.space.0) * column as f64,
            margin_y + (label.1 + self.space.1) * row as f64,
        )
    }
}
