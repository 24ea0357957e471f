//! Column-labelled numeric tables.
//!
//! A [`FeatureTable`] pairs an `n_rows x n_cols` matrix with one unique name per
//! column. One of those columns is usually treated as the outcome and the rest
//! as features.

use crate::error::{PlotFitError, Result};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use std::collections::HashSet;

/// A two-dimensional numeric table with uniquely named columns.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    names: Vec<String>,
    data: Array2<f64>,
}

impl FeatureTable {
    /// Build a table from column names and a row-major data matrix.
    pub fn new<S: Into<String>>(names: Vec<S>, data: Array2<f64>) -> Result<Self> {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.len() != data.ncols() {
            return Err(PlotFitError::shape(
                format!("{} columns", names.len()),
                format!("{} columns", data.ncols()),
            ));
        }

        let mut seen = HashSet::with_capacity(names.len());
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(PlotFitError::DuplicateColumn(name.clone()));
            }
        }

        Ok(Self { names, data })
    }

    /// Build a table from named columns of equal length.
    pub fn from_columns<S: Into<String>>(columns: Vec<(S, Vec<f64>)>) -> Result<Self> {
        let n_rows = columns.first().map_or(0, |(_, values)| values.len());
        let n_cols = columns.len();

        let mut names = Vec::with_capacity(n_cols);
        let mut data = Array2::zeros((n_rows, n_cols));
        for (j, (name, values)) in columns.into_iter().enumerate() {
            let name = name.into();
            if values.len() != n_rows {
                return Err(PlotFitError::shape(
                    format!("{} rows in column '{}'", n_rows, name),
                    format!("{} rows", values.len()),
                ));
            }
            data.column_mut(j).assign(&Array1::from(values));
            names.push(name);
        }

        Self::new(names, data)
    }

    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    pub fn n_rows(&self) -> usize {
        self.data.nrows()
    }

    pub fn n_cols(&self) -> usize {
        self.data.ncols()
    }

    pub fn data(&self) -> ArrayView2<'_, f64> {
        self.data.view()
    }

    /// Position of a column by name.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| PlotFitError::ColumnNotFound(name.to_string()))
    }

    /// View of a single column by name.
    pub fn column(&self, name: &str) -> Result<ArrayView1<'_, f64>> {
        let idx = self.column_index(name)?;
        Ok(self.data.column(idx))
    }

    /// Every column except `outcome`, in original order, with its names.
    pub fn features_excluding(&self, outcome: &str) -> Result<(Vec<String>, Array2<f64>)> {
        let outcome_idx = self.column_index(outcome)?;
        let keep: Vec<usize> = (0..self.n_cols()).filter(|&j| j != outcome_idx).collect();
        let names = keep.iter().map(|&j| self.names[j].clone()).collect();
        Ok((names, self.data.select(Axis(1), &keep)))
    }

    /// Split into a feature matrix and an outcome vector.
    pub fn split_outcome(&self, outcome: &str) -> Result<(Array2<f64>, Array1<f64>)> {
        let y = self.column(outcome)?.to_owned();
        let (_, x) = self.features_excluding(outcome)?;
        Ok((x, y))
    }
}
