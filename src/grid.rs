//! Subplot grid layout.
//!
//! The layout is pure bookkeeping: it decides which feature goes into which
//! cell, which cells stay empty, which cells carry a y-axis label and where
//! each cell sits inside the figure. Rendering lives in [`crate::plotting`].

use crate::error::{PlotFitError, Result};

/// Figure-relative subplot placement, in the usual `subplots_adjust` terms.
///
/// `left`, `right`, `bottom` and `top` are fractions of the figure size.
/// `wspace` and `hspace` are the gaps between cells as a fraction of the
/// average cell width and height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubplotParams {
    pub left: f64,
    pub right: f64,
    pub bottom: f64,
    pub top: f64,
    pub wspace: f64,
    pub hspace: f64,
}

impl Default for SubplotParams {
    fn default() -> Self {
        Self {
            left: 0.125,
            right: 0.9,
            bottom: 0.11,
            top: 0.88,
            wspace: 0.2,
            hspace: 0.5,
        }
    }
}

impl SubplotParams {
    /// Default placement for a grid with `n_cols` columns.
    ///
    /// A single column stacks tall cells, so rows get a full cell height of
    /// vertical gap instead of half.
    pub fn for_columns(n_cols: usize) -> Self {
        let hspace = if n_cols == 1 { 1.0 } else { 0.5 };
        Self {
            hspace,
            ..Self::default()
        }
    }

    fn validate(&self) -> Result<()> {
        let in_unit = |v: f64| (0.0..=1.0).contains(&v);
        if !(in_unit(self.left) && in_unit(self.right) && in_unit(self.bottom) && in_unit(self.top))
        {
            return Err(PlotFitError::InvalidParameter(
                "subplot margins must lie in [0, 1]".to_string(),
            ));
        }
        if self.left >= self.right || self.bottom >= self.top {
            return Err(PlotFitError::InvalidParameter(
                "subplot margins must satisfy left < right and bottom < top".to_string(),
            ));
        }
        if !(self.wspace >= 0.0 && self.hspace >= 0.0) {
            return Err(PlotFitError::InvalidParameter(
                "wspace and hspace must be non-negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// Pixel rectangle of a cell, measured from the figure's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// One cell of the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct GridCell {
    pub row: usize,
    pub col: usize,
    /// Index into the feature list, or `None` for a deactivated cell.
    pub feature: Option<usize>,
    /// Whether the y axis carries the outcome label.
    pub show_y_label: bool,
    pub rect: CellRect,
}

impl GridCell {
    pub fn is_active(&self) -> bool {
        self.feature.is_some()
    }
}

/// Row-major grid of `n_rows x n_cols` cells holding `n_features` plots.
#[derive(Debug, Clone, PartialEq)]
pub struct GridLayout {
    n_rows: usize,
    n_cols: usize,
    n_features: usize,
    figure_px: (u32, u32),
    params: SubplotParams,
    cells: Vec<GridCell>,
}

/// Number of rows needed to hold `n_features` cells `n_cols` at a time.
pub fn rows_for(n_features: usize, n_cols: usize) -> Result<usize> {
    if n_cols == 0 {
        return Err(PlotFitError::InvalidParameter(
            "number of columns must be at least 1".to_string(),
        ));
    }
    Ok(n_features.div_ceil(n_cols))
}

impl GridLayout {
    /// Lay out `n_features` plots on a grid `n_cols` wide.
    pub fn new(
        n_features: usize,
        n_cols: usize,
        figure_px: (u32, u32),
        params: SubplotParams,
    ) -> Result<Self> {
        let n_rows = rows_for(n_features, n_cols)?;
        params.validate()?;

        let (fig_w, fig_h) = (figure_px.0 as f64, figure_px.1 as f64);
        let span_w = (params.right - params.left) * fig_w;
        let span_h = (params.top - params.bottom) * fig_h;
        let cell_w = span_w / (n_cols as f64 + params.wspace * (n_cols as f64 - 1.0));
        let cell_h = if n_rows > 0 {
            span_h / (n_rows as f64 + params.hspace * (n_rows as f64 - 1.0))
        } else {
            0.0
        };
        let gap_w = params.wspace * cell_w;
        let gap_h = params.hspace * cell_h;
        let origin_x = params.left * fig_w;
        let origin_y = (1.0 - params.top) * fig_h;

        let mut cells = Vec::with_capacity(n_rows * n_cols);
        let mut v = 0;
        for row in 0..n_rows {
            for col in 0..n_cols {
                let feature = if v < n_features {
                    v += 1;
                    Some(v - 1)
                } else {
                    None
                };
                // Single-column grids label only the top cell.
                let show_y_label = feature.is_some() && col == 0 && (n_cols > 1 || row == 0);
                let rect = CellRect {
                    x: (origin_x + col as f64 * (cell_w + gap_w)).round() as i32,
                    y: (origin_y + row as f64 * (cell_h + gap_h)).round() as i32,
                    width: cell_w.round() as u32,
                    height: cell_h.round() as u32,
                };
                cells.push(GridCell {
                    row,
                    col,
                    feature,
                    show_y_label,
                    rect,
                });
            }
        }

        tracing::debug!(n_features, n_rows, n_cols, "laid out scatter grid");

        Ok(Self {
            n_rows,
            n_cols,
            n_features,
            figure_px,
            params,
            cells,
        })
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn figure_px(&self) -> (u32, u32) {
        self.figure_px
    }

    pub fn params(&self) -> &SubplotParams {
        &self.params
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    /// Cell at `(row, col)`, whatever the grid's shape.
    pub fn cell(&self, row: usize, col: usize) -> Option<&GridCell> {
        if row >= self.n_rows || col >= self.n_cols {
            return None;
        }
        self.cells.get(row * self.n_cols + col)
    }

    pub fn active_cells(&self) -> impl Iterator<Item = &GridCell> {
        self.cells.iter().filter(|c| c.is_active())
    }

    pub fn inactive_count(&self) -> usize {
        self.cells.len() - self.n_features
    }
}
