//! Collector for generated cells.

use dggs_common::{Cell, DggsError, DggsFamily, DggsResult, Feedback};

/// Receives cells from a generator.
///
/// Enforces the configured cell limit and checks for cancellation after
/// every pushed cell. Once cancellation is observed, `push` returns
/// `Ok(false)` and generators stop; the cells gathered so far remain valid.
pub struct CellSink<'a> {
    family: DggsFamily,
    resolution: u8,
    max_cells: usize,
    cells: Vec<Cell>,
    canceled: bool,
    feedback: &'a dyn Feedback,
}

impl<'a> CellSink<'a> {
    pub fn new(
        family: DggsFamily,
        resolution: u8,
        max_cells: usize,
        feedback: &'a dyn Feedback,
    ) -> Self {
        Self {
            family,
            resolution,
            max_cells,
            cells: Vec::new(),
            canceled: false,
            feedback,
        }
    }

    /// Add a cell. Returns `Ok(true)` to keep generating, `Ok(false)` once
    /// canceled.
    pub fn push(&mut self, cell: Cell) -> DggsResult<bool> {
        if self.canceled {
            return Ok(false);
        }
        if self.cells.len() >= self.max_cells {
            return Err(DggsError::CellLimitExceeded {
                family: self.family,
                resolution: self.resolution,
                limit: self.max_cells,
            });
        }

        self.cells.push(cell);

        if self.feedback.is_canceled() {
            self.canceled = true;
            return Ok(false);
        }
        Ok(true)
    }

    pub fn is_canceled(&self) -> bool {
        self.canceled
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn into_cells(self) -> Vec<Cell> {
        self.cells
    }
}
