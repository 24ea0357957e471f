//! Scatter-plot grids of features against an outcome.
//!
//! [`scatter_grid`] validates the inputs and computes a [`GridLayout`]; the
//! returned [`ScatterGrid`] is the figure. It can be drawn onto any plotters
//! drawing area or saved directly as PNG or SVG.
//!
//! Requires the `plotting` feature to be enabled.

use crate::error::{PlotFitError, Result};
use crate::grid::{GridCell, GridLayout, SubplotParams};
use crate::table::FeatureTable;
use ndarray::{Array1, Array2, ArrayView1};
use plotters::chart::LabelAreaPosition;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::ops::Range;
use std::path::Path;

/// Marker and axis styling shared by every cell.
#[derive(Debug, Clone)]
pub struct ScatterStyle {
    /// Marker colour.
    pub marker_color: RGBColor,
    /// Marker opacity; below 1.0 so overlapping points show through.
    pub alpha: f64,
    /// Marker radius in pixels.
    pub marker_size: i32,
    /// Tick mark length in pixels on the left and bottom axes.
    pub tick_length: i32,
    /// Font size for axis labels.
    pub font_size: u32,
    /// Space reserved below each cell for tick labels and the x label.
    pub x_label_area: i32,
    /// Space reserved left of each cell for tick labels and the y label.
    pub y_label_area: i32,
}

impl Default for ScatterStyle {
    fn default() -> Self {
        Self {
            marker_color: RGBColor(31, 119, 180),
            alpha: 0.6,
            marker_size: 3,
            tick_length: 5,
            font_size: 14,
            x_label_area: 40,
            y_label_area: 60,
        }
    }
}

/// Configuration for [`scatter_grid`].
#[derive(Debug, Clone)]
pub struct ScatterGridConfig {
    /// Number of grid columns.
    pub n_cols: usize,
    /// Name of the outcome column. Required.
    pub outcome_col: Option<String>,
    /// Figure size in inches (width, height).
    pub fig_size: (f64, f64),
    /// Pixels per inch.
    pub dpi: u32,
    /// Subplot placement; derived from `n_cols` when `None`.
    pub subplot: Option<SubplotParams>,
    pub style: ScatterStyle,
}

impl Default for ScatterGridConfig {
    fn default() -> Self {
        Self {
            n_cols: 3,
            outcome_col: None,
            fig_size: (15.0, 15.0),
            dpi: 80,
            subplot: None,
            style: ScatterStyle::default(),
        }
    }
}

impl ScatterGridConfig {
    pub fn new(outcome_col: impl Into<String>) -> Self {
        Self::default().with_outcome(outcome_col)
    }

    pub fn with_outcome(mut self, outcome_col: impl Into<String>) -> Self {
        self.outcome_col = Some(outcome_col.into());
        self
    }

    pub fn with_n_cols(mut self, n_cols: usize) -> Self {
        self.n_cols = n_cols;
        self
    }

    pub fn with_fig_size(mut self, width: f64, height: f64) -> Self {
        self.fig_size = (width, height);
        self
    }

    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    pub fn with_subplot(mut self, params: SubplotParams) -> Self {
        self.subplot = Some(params);
        self
    }

    pub fn with_style(mut self, style: ScatterStyle) -> Self {
        self.style = style;
        self
    }

    /// Figure size in pixels.
    pub fn figure_px(&self) -> Result<(u32, u32)> {
        let (w, h) = self.fig_size;
        if !(w > 0.0 && h > 0.0 && w.is_finite() && h.is_finite()) || self.dpi == 0 {
            return Err(PlotFitError::InvalidParameter(format!(
                "figure size {:?} at {} dpi is not drawable",
                self.fig_size, self.dpi
            )));
        }
        let dpi = self.dpi as f64;
        Ok(((w * dpi).round() as u32, (h * dpi).round() as u32))
    }
}

/// A laid-out grid of feature-vs-outcome scatter plots.
#[derive(Debug, Clone)]
pub struct ScatterGrid {
    feature_names: Vec<String>,
    outcome_name: String,
    features: Array2<f64>,
    outcome: Array1<f64>,
    layout: GridLayout,
    style: ScatterStyle,
}

/// Build a scatter grid of every non-outcome column of `table` against the
/// outcome column.
///
/// Fails with [`PlotFitError::MissingOutcome`] when no outcome column is
/// configured, before looking at the table.
///
/// # Example
///
/// ```ignore
/// let grid = scatter_grid(&table, &ScatterGridConfig::new("price"))?;
/// grid.save_png("scatter.png")?;
/// ```
pub fn scatter_grid(table: &FeatureTable, config: &ScatterGridConfig) -> Result<ScatterGrid> {
    let outcome_name = config
        .outcome_col
        .as_deref()
        .ok_or(PlotFitError::MissingOutcome)?;

    let (feature_names, features) = table.features_excluding(outcome_name)?;
    let outcome = table.column(outcome_name)?.to_owned();

    let params = config
        .subplot
        .unwrap_or_else(|| SubplotParams::for_columns(config.n_cols));
    let layout = GridLayout::new(
        feature_names.len(),
        config.n_cols,
        config.figure_px()?,
        params,
    )?;

    Ok(ScatterGrid {
        feature_names,
        outcome_name: outcome_name.to_string(),
        features,
        outcome,
        layout,
        style: config.style.clone(),
    })
}

impl ScatterGrid {
    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn outcome_name(&self) -> &str {
        &self.outcome_name
    }

    /// (feature, outcome) points for the feature at `feature_idx`.
    pub fn points(&self, feature_idx: usize) -> Option<Vec<(f64, f64)>> {
        if feature_idx >= self.feature_names.len() {
            return None;
        }
        Some(
            self.features
                .column(feature_idx)
                .iter()
                .zip(self.outcome.iter())
                .filter(|(x, y)| x.is_finite() && y.is_finite())
                .map(|(&x, &y)| (x, y))
                .collect(),
        )
    }

    /// Draw the whole figure onto `root`.
    ///
    /// `root` should have the figure's pixel size; cell rectangles are placed
    /// in those coordinates.
    pub fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<()> {
        root.fill(&WHITE)
            .map_err(|e| PlotFitError::PlottingError(e.to_string()))?;

        for cell in self.layout.active_cells() {
            self.draw_cell(root, cell)?;
        }

        Ok(())
    }

    fn draw_cell<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
        cell: &GridCell,
    ) -> Result<()> {
        let Some(feature_idx) = cell.feature else {
            return Ok(());
        };
        let style = &self.style;
        let feature_name = &self.feature_names[feature_idx];

        // The cell rectangle is the plotting box; label areas sit outside it.
        let (fig_w, fig_h) = root.dim_in_pixel();
        let left = (cell.rect.x - style.y_label_area).max(0);
        let right = (fig_w as i32 - cell.rect.x - cell.rect.width as i32).max(0);
        let top = cell.rect.y.max(0);
        let bottom =
            (fig_h as i32 - cell.rect.y - cell.rect.height as i32 - style.x_label_area).max(0);
        let area = root.margin(top, bottom, left, right);

        let x_range = padded_range(&self.features.column(feature_idx));
        let y_range = padded_range(&self.outcome.view());

        // Only the left and bottom label areas exist, so no top or right
        // border is drawn.
        let mut chart = ChartBuilder::on(&area)
            .x_label_area_size(style.x_label_area)
            .y_label_area_size(cell.rect.x - left)
            .build_cartesian_2d(x_range, y_range)
            .map_err(|e| PlotFitError::PlottingError(e.to_string()))?;

        let mut mesh = chart.configure_mesh();
        mesh.disable_mesh()
            .set_tick_mark_size(LabelAreaPosition::Left, style.tick_length)
            .set_tick_mark_size(LabelAreaPosition::Bottom, style.tick_length)
            .axis_desc_style(("sans-serif", style.font_size).into_font())
            .x_desc(feature_name.as_str());
        if cell.show_y_label {
            mesh.y_desc(self.outcome_name.as_str());
        }
        mesh.draw()
            .map_err(|e| PlotFitError::PlottingError(e.to_string()))?;

        let points = self.points(feature_idx).unwrap_or_default();
        let marker = style.marker_color.mix(style.alpha).filled();
        chart
            .draw_series(
                points
                    .into_iter()
                    .map(|(x, y)| Circle::new((x, y), style.marker_size, marker)),
            )
            .map_err(|e| PlotFitError::PlottingError(e.to_string()))?
            .label(feature_name.as_str());

        Ok(())
    }

    /// Render the figure to a PNG file.
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<()> {
        let root = BitMapBackend::new(path.as_ref(), self.layout.figure_px()).into_drawing_area();
        self.draw(&root)?;
        root.present()
            .map_err(|e| PlotFitError::PlottingError(e.to_string()))?;
        Ok(())
    }

    /// Render the figure to an SVG file.
    pub fn save_svg(&self, path: impl AsRef<Path>) -> Result<()> {
        let root = SVGBackend::new(path.as_ref(), self.layout.figure_px()).into_drawing_area();
        self.draw(&root)?;
        root.present()
            .map_err(|e| PlotFitError::PlottingError(e.to_string()))?;
        Ok(())
    }
}

/// Finite data range padded by 5% on both sides.
fn padded_range(values: &ArrayView1<f64>) -> Range<f64> {
    let (min, max) = values
        .iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });

    if !min.is_finite() {
        return 0.0..1.0;
    }
    if max - min == 0.0 {
        return (min - 0.5)..(max + 0.5);
    }
    let margin = (max - min) * 0.05;
    (min - margin)..(max + margin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;
    use tempfile::tempdir;

    fn table(n_features: usize, n_rows: usize) -> FeatureTable {
        let mut columns: Vec<(String, Vec<f64>)> = (0..n_features)
            .map(|j| {
                let values = (0..n_rows).map(|i| (i * (j + 1)) as f64).collect();
                (format!("x{}", j), values)
            })
            .collect();
        columns.push((
            "outcome".to_string(),
            (0..n_rows).map(|i| i as f64 * 0.5).collect(),
        ));
        FeatureTable::from_columns(columns).unwrap()
    }

    #[test]
    fn test_config_default() {
        let config = ScatterGridConfig::default();
        assert_eq!(config.n_cols, 3);
        assert!(config.outcome_col.is_none());
        assert_eq!(config.figure_px().unwrap(), (1200, 1200));
        assert_relative_eq!(config.style.alpha, 0.6);
    }

    #[test]
    fn test_missing_outcome_fails_for_any_table() {
        let config = ScatterGridConfig::default();
        let empty = FeatureTable::from_columns(Vec::<(String, Vec<f64>)>::new()).unwrap();
        let single = FeatureTable::from_columns(vec![("a", vec![1.0, 2.0])]).unwrap();

        for t in [&empty, &single, &table(4, 10)] {
            assert!(matches!(
                scatter_grid(t, &config),
                Err(PlotFitError::MissingOutcome)
            ));
        }
    }

    #[test]
    fn test_outcome_not_in_table() {
        let config = ScatterGridConfig::new("missing");
        assert!(matches!(
            scatter_grid(&table(2, 5), &config),
            Err(PlotFitError::ColumnNotFound(_))
        ));
    }

    #[test]
    fn test_zero_columns_rejected() {
        let config = ScatterGridConfig::new("outcome").with_n_cols(0);
        assert!(matches!(
            scatter_grid(&table(2, 5), &config),
            Err(PlotFitError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_bad_figure_size_rejected() {
        let config = ScatterGridConfig::new("outcome").with_fig_size(0.0, 10.0);
        assert!(scatter_grid(&table(2, 5), &config).is_err());
    }

    #[test]
    fn test_two_features_two_columns() {
        let table = FeatureTable::from_columns(vec![
            ("a", (0..10).map(|i| i as f64).collect()),
            ("b", (0..10).map(|i| (i * i) as f64).collect()),
            ("outcome", (0..10).map(|i| 2.0 * i as f64).collect()),
        ])
        .unwrap();
        let grid = scatter_grid(&table, &ScatterGridConfig::new("outcome").with_n_cols(2)).unwrap();

        let layout = grid.layout();
        assert_eq!(layout.n_features(), 2);
        assert_eq!(layout.n_rows(), 1);
        assert_eq!(layout.cells().len(), 2);
        assert_eq!(layout.active_cells().count(), 2);
        assert!(layout.cell(0, 0).unwrap().show_y_label);
        assert!(!layout.cell(0, 1).unwrap().show_y_label);
        assert_eq!(grid.feature_names(), &["a", "b"]);
        assert_eq!(grid.outcome_name(), "outcome");
    }

    #[test]
    fn test_outcome_in_middle_keeps_feature_order() {
        let table = FeatureTable::from_columns(vec![
            ("a", vec![1.0, 2.0]),
            ("y", vec![3.0, 4.0]),
            ("b", vec![5.0, 6.0]),
        ])
        .unwrap();
        let grid = scatter_grid(&table, &ScatterGridConfig::new("y")).unwrap();
        assert_eq!(grid.feature_names(), &["a", "b"]);
        assert_eq!(grid.points(1).unwrap(), vec![(5.0, 3.0), (6.0, 4.0)]);
        assert!(grid.points(2).is_none());
    }

    #[test]
    fn test_seven_features_three_columns() {
        let grid = scatter_grid(&table(7, 12), &ScatterGridConfig::new("outcome")).unwrap();
        let layout = grid.layout();
        assert_eq!(layout.n_rows(), 3);
        assert_eq!(layout.active_cells().count(), 7);
        assert_eq!(layout.inactive_count(), 2);
    }

    #[test]
    fn test_single_column_spacing() {
        let grid = scatter_grid(
            &table(3, 5),
            &ScatterGridConfig::new("outcome").with_n_cols(1),
        )
        .unwrap();
        assert_relative_eq!(grid.layout().params().hspace, 1.0);
    }

    #[test]
    fn test_points_skip_non_finite() {
        let table = FeatureTable::from_columns(vec![
            ("a", vec![1.0, f64::NAN, 3.0]),
            ("y", vec![1.0, 2.0, f64::INFINITY]),
        ])
        .unwrap();
        let grid = scatter_grid(&table, &ScatterGridConfig::new("y")).unwrap();
        assert_eq!(grid.points(0).unwrap(), vec![(1.0, 1.0)]);
    }

    #[test]
    fn test_padded_range() {
        let r = padded_range(&array![0.0, 10.0].view());
        assert_relative_eq!(r.start, -0.5);
        assert_relative_eq!(r.end, 10.5);

        let r = padded_range(&array![2.0, 2.0].view());
        assert_relative_eq!(r.start, 1.5);
        assert_relative_eq!(r.end, 2.5);

        let r = padded_range(&array![f64::NAN].view());
        assert_eq!(r, 0.0..1.0);
    }

    #[test]
    fn test_save_png() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("grid.png");

        let config = ScatterGridConfig::new("outcome").with_fig_size(6.0, 6.0);
        let grid = scatter_grid(&table(4, 20), &config).unwrap();
        let result = grid.save_png(&path);
        assert!(result.is_ok());
        assert!(path.exists());
    }

    #[test]
    fn test_save_svg_single_cell() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("grid.svg");

        let config = ScatterGridConfig::new("outcome")
            .with_n_cols(1)
            .with_fig_size(4.0, 4.0);
        let grid = scatter_grid(&table(1, 8), &config).unwrap();
        let result = grid.save_svg(&path);
        assert!(result.is_ok());
        assert!(path.exists());
    }

    #[test]
    fn test_draw_empty_grid() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.png");

        let table = FeatureTable::from_columns(vec![("outcome", vec![1.0, 2.0])]).unwrap();
        let config = ScatterGridConfig::new("outcome").with_fig_size(2.0, 2.0);
        let grid = scatter_grid(&table, &config).unwrap();
        assert!(grid.layout().cells().is_empty());
        assert!(grid.save_png(&path).is_ok());
    }
}
