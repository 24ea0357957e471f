//! # plotfit
//!
//! Two small building blocks for exploring a regression dataset:
//!
//! - [`plotting::scatter_grid`] lays every feature column of a table out on a
//!   grid of scatter plots against an outcome column and renders it with
//!   plotters.
//! - [`evaluate::train_test`] fits a seeded random forest on a train split and
//!   returns the RMSE on the train and test splits.
//!
//! ## Features
//!
//! - `plotting` (default) - Enable scatter-grid rendering
//!
//! ## Example
//!
//! ```ignore
//! use plotfit::prelude::*;
//!
//! let grid = scatter_grid(&table, &ScatterGridConfig::new("price").with_n_cols(3))?;
//! grid.save_png("features.png")?;
//!
//! let result = train_test_tables(&train, &test, "price", &ForestConfig::default())?;
//! println!("{}", result.rmse_test);
//! ```

pub mod error;
pub mod evaluate;
pub mod forest;
pub mod grid;
pub mod metrics;
#[cfg(feature = "plotting")]
pub mod plotting;
pub mod table;

pub mod prelude {
    //! Convenient re-exports of commonly used types.
    pub use crate::error::{PlotFitError, Result};
    pub use crate::evaluate::{EvaluationResult, train_test, train_test_tables};
    pub use crate::forest::{ForestConfig, RandomForestRegressor};
    pub use crate::grid::{GridCell, GridLayout, SubplotParams};
    pub use crate::metrics::{mean_squared_error, rmse};
    pub use crate::table::FeatureTable;

    #[cfg(feature = "plotting")]
    pub use crate::plotting::{ScatterGrid, ScatterGridConfig, ScatterStyle, scatter_grid};
}
