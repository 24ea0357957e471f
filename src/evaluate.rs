//! Fit a random forest on a train split and score it on train and test.

use crate::error::{PlotFitError, Result};
use crate::forest::{ForestConfig, RandomForestRegressor};
use crate::metrics::rmse;
use crate::table::FeatureTable;
use ndarray::{ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Root-mean-squared error on each split.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub rmse_train: f64,
    pub rmse_test: f64,
}

impl fmt::Display for EvaluationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "rmse train: {}", self.rmse_train)?;
        write!(f, "rmse test: {}", self.rmse_test)
    }
}

/// Fit a [`RandomForestRegressor`] on the train split and report RMSE on both
/// splits.
///
/// The model is built fresh from `config`, used for the two predictions and
/// dropped. With `config.verbose` the two report lines are printed to stdout.
///
/// # Example
///
/// ```ignore
/// let result = train_test(&x_train.view(), &y_train.view(), &x_test.view(), &y_test.view(),
///     &ForestConfig::default())?;
/// assert!(result.rmse_train <= result.rmse_test);
/// ```
pub fn train_test(
    x_train: &ArrayView2<f64>,
    y_train: &ArrayView1<f64>,
    x_test: &ArrayView2<f64>,
    y_test: &ArrayView1<f64>,
    config: &ForestConfig,
) -> Result<EvaluationResult> {
    if x_test.nrows() != y_test.len() {
        return Err(PlotFitError::shape(
            format!("y_test length = {}", x_test.nrows()),
            format!("y_test length = {}", y_test.len()),
        ));
    }
    if x_test.iter().chain(y_test.iter()).any(|v| !v.is_finite()) {
        return Err(PlotFitError::InvalidInput(
            "test data contains NaN or infinite values".to_string(),
        ));
    }

    let mut model = RandomForestRegressor::new(config.clone());
    model.fit(x_train, y_train)?;

    let pred_train = model.predict(x_train)?;
    let pred_test = model.predict(x_test)?;

    let result = EvaluationResult {
        rmse_train: rmse(y_train, &pred_train.view())?,
        rmse_test: rmse(y_test, &pred_test.view())?,
    };

    tracing::info!(
        rmse_train = result.rmse_train,
        rmse_test = result.rmse_test,
        n_train = x_train.nrows(),
        n_test = x_test.nrows(),
        "evaluated random forest"
    );
    if config.verbose {
        println!("{}", result);
    }

    Ok(result)
}

/// [`train_test`] on two tables sharing the same columns, split on `outcome`.
pub fn train_test_tables(
    train: &FeatureTable,
    test: &FeatureTable,
    outcome: &str,
    config: &ForestConfig,
) -> Result<EvaluationResult> {
    if train.column_names() != test.column_names() {
        return Err(PlotFitError::shape(
            format!("test columns {:?}", train.column_names()),
            format!("{:?}", test.column_names()),
        ));
    }

    let (x_train, y_train) = train.split_outcome(outcome)?;
    let (x_test, y_test) = test.split_outcome(outcome)?;
    train_test(
        &x_train.view(),
        &y_train.view(),
        &x_test.view(),
        &y_test.view(),
        config,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{Array1, Array2, array};

    fn dataset(n: usize, offset: usize) -> (Array2<f64>, Array1<f64>) {
        let x = Array2::from_shape_fn((n, 4), |(i, j)| (((i + offset) * (2 * j + 1)) % 23) as f64);
        let y = x
            .rows()
            .into_iter()
            .map(|r| r[0] * 1.5 + r[1] - 0.25 * r[3])
            .collect();
        (x, y)
    }

    fn quiet() -> ForestConfig {
        ForestConfig::default().with_n_trees(20).with_verbose(false)
    }

    #[test]
    fn test_display_format() {
        let result = EvaluationResult {
            rmse_train: 0.5,
            rmse_test: 1.25,
        };
        assert_eq!(result.to_string(), "rmse train: 0.5\nrmse test: 1.25");
    }

    #[test]
    fn test_result_json_round_trip() {
        let result = EvaluationResult {
            rmse_train: 0.1,
            rmse_test: 0.2,
        };
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("rmse_train"));
        let back: EvaluationResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }

    #[test]
    fn test_same_split_gives_same_error() {
        let (x, y) = dataset(50, 0);
        let result = train_test(&x.view(), &y.view(), &x.view(), &y.view(), &quiet()).unwrap();
        assert_relative_eq!(result.rmse_train, result.rmse_test);
    }

    #[test]
    fn test_reproducible() {
        let (x_train, y_train) = dataset(60, 0);
        let (x_test, y_test) = dataset(20, 60);

        let run = || {
            train_test(
                &x_train.view(),
                &y_train.view(),
                &x_test.view(),
                &y_test.view(),
                &quiet(),
            )
            .unwrap()
        };
        let a = run();
        let b = run();
        assert_eq!(a.rmse_train.to_bits(), b.rmse_train.to_bits());
        assert_eq!(a.rmse_test.to_bits(), b.rmse_test.to_bits());
    }

    #[test]
    fn test_forest_beats_mean_baseline() {
        let (x, y) = dataset(80, 0);
        let result = train_test(&x.view(), &y.view(), &x.view(), &y.view(), &quiet()).unwrap();

        let mean = y.mean().unwrap();
        let baseline = (y.mapv(|v| (v - mean).powi(2)).sum() / y.len() as f64).sqrt();
        assert!(result.rmse_train < baseline);
    }

    #[test]
    fn test_train_length_mismatch() {
        let (x, y) = dataset(10, 0);
        let short = y.slice(ndarray::s![..9]).to_owned();
        assert!(matches!(
            train_test(&x.view(), &short.view(), &x.view(), &y.view(), &quiet()),
            Err(PlotFitError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_test_length_mismatch() {
        let (x, y) = dataset(10, 0);
        let short = y.slice(ndarray::s![..9]).to_owned();
        assert!(matches!(
            train_test(&x.view(), &y.view(), &x.view(), &short.view(), &quiet()),
            Err(PlotFitError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_test_width_mismatch() {
        let (x, y) = dataset(10, 0);
        let narrow = x.slice(ndarray::s![.., ..3]).to_owned();
        assert!(matches!(
            train_test(&x.view(), &y.view(), &narrow.view(), &y.view(), &quiet()),
            Err(PlotFitError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_too_many_max_features() {
        let x = array![[1.0, 2.0], [2.0, 1.0], [3.0, 0.0]];
        let y = array![1.0, 2.0, 3.0];
        assert!(matches!(
            train_test(&x.view(), &y.view(), &x.view(), &y.view(), &quiet()),
            Err(PlotFitError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_tables() {
        let make = |offset: usize| {
            let (x, y) = dataset(30, offset);
            let mut columns: Vec<(String, Vec<f64>)> = (0..4)
                .map(|j| (format!("f{}", j), x.column(j).to_vec()))
                .collect();
            columns.insert(1, ("target".to_string(), y.to_vec()));
            FeatureTable::from_columns(columns).unwrap()
        };
        let train = make(0);
        let test = make(30);

        let result = train_test_tables(&train, &test, "target", &quiet()).unwrap();
        assert!(result.rmse_train.is_finite());
        assert!(result.rmse_test.is_finite());

        assert!(matches!(
            train_test_tables(&train, &test, "nope", &quiet()),
            Err(PlotFitError::ColumnNotFound(_))
        ));
    }

    #[test]
    fn test_tables_column_mismatch() {
        let train = FeatureTable::from_columns(vec![("a", vec![1.0]), ("y", vec![1.0])]).unwrap();
        let test = FeatureTable::from_columns(vec![("b", vec![1.0]), ("y", vec![1.0])]).unwrap();
        assert!(matches!(
            train_test_tables(&train, &test, "y", &quiet()),
            Err(PlotFitError::ShapeMismatch { .. })
        ));
    }
}
