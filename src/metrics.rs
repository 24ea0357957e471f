//! Regression error metrics.

use crate::error::{PlotFitError, Result};
use ndarray::ArrayView1;

/// Mean of squared differences between `y_true` and `y_pred`.
pub fn mean_squared_error(y_true: &ArrayView1<f64>, y_pred: &ArrayView1<f64>) -> Result<f64> {
    if y_true.len() != y_pred.len() {
        return Err(PlotFitError::shape(
            format!("{} predictions", y_true.len()),
            format!("{} predictions", y_pred.len()),
        ));
    }
    if y_true.is_empty() {
        return Err(PlotFitError::InvalidInput(
            "cannot score an empty prediction vector".to_string(),
        ));
    }

    let sse: f64 = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).powi(2))
        .sum();
    Ok(sse / y_true.len() as f64)
}

/// Root-mean-squared error.
pub fn rmse(y_true: &ArrayView1<f64>, y_pred: &ArrayView1<f64>) -> Result<f64> {
    mean_squared_error(y_true, y_pred).map(f64::sqrt)
}
