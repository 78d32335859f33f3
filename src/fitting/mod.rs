//! Ordinary least squares fitting of a line, used to relate stimulus phase to
//! visual field position, and the correlation used to judge the fit.

use ndarray::Array2;
use crate::error::{MappingError, ValueError};


fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn sum_of_squares(values: &[f64], values_mean: f64) -> f64 {
    values.iter()
        .map(|i| (i - values_mean).powi(2))
        .sum()
}

fn cross_deviation(x: &[f64], y: &[f64], x_mean: f64, y_mean: f64) -> f64 {
    x.iter().zip(y.iter())
        .map(|(i, j)| (i - x_mean) * (j - y_mean))
        .sum()
}

fn check_lengths(x: &[f64], y: &[f64]) -> Result<(), ValueError> {
    if x.len() != y.len() {
        return Err(ValueError::ShapeMismatch { expected: vec![x.len()], found: vec![y.len()] });
    }

    Ok(())
}


/// Linear equation `y = slope * x + intercept`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearEquation {
    /// Slope of the line
    pub slope: f64,
    /// Value of the line at `x = 0`
    pub intercept: f64,
}

impl LinearEquation {
    /// Evaluates the line at `x`
    pub fn evaluate(&self, x: f64) -> f64 {
        x * self.slope + self.intercept
    }

    /// Evaluates the line at every element of a map
    pub fn apply(&self, map: &Array2<f64>) -> Array2<f64> {
        map.mapv(|x| self.evaluate(x))
    }
}

/// Fits a line to the given points with ordinary least squares, returns `None`
/// if fewer than two points are given or every `x` is the same
pub fn linear_regression(x: &[f64], y: &[f64]) -> Result<Option<LinearEquation>, MappingError> {
    check_lengths(x, y)?;
    if x.len() < 2 {
        return Ok(None);
    }

    let x_mean = mean(x);
    let y_mean = mean(y);

    let sxx = sum_of_squares(x, x_mean);
    if sxx <= f64::EPSILON * x.len() as f64 {
        return Ok(None);
    }

    let slope = cross_deviation(x, y, x_mean, y_mean) / sxx;

    Ok(Some(LinearEquation { slope, intercept: y_mean - slope * x_mean }))
}

/// Pearson correlation of two samples of the same length, `NaN` when either sample is constant
pub fn pearsonr(x: &[f64], y: &[f64]) -> Result<f64, MappingError> {
    check_lengths(x, y)?;

    let x_mean = mean(x);
    let y_mean = mean(y);

    let spread = (sum_of_squares(x, x_mean) * sum_of_squares(y, y_mean)).sqrt();

    Ok(cross_deviation(x, y, x_mean, y_mean) / spread)
}
