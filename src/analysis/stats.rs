use crate::domain::model::{ColumnMissing, CorrelationPair, Dataset};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Categorical columns above this distinct-value count look like free text
/// or identifiers and are skipped for mode calculation.
pub const MODE_MAX_CARDINALITY: usize = 50;

/// How many correlation pairs the summary keeps.
pub const TOP_CORRELATIONS: usize = 5;

#[derive(Debug, Clone)]
pub struct MissingSummary {
    /// Columns with at least one missing value, sorted by percentage descending
    pub by_column: Vec<ColumnMissing>,
    /// Mean percentage over the columns in `by_column`, 0.0 when none
    pub average_percent: f64,
}

pub fn missing_summary(dataset: &Dataset) -> MissingSummary {
    let mut by_column: Vec<ColumnMissing> = dataset
        .columns
        .iter()
        .filter(|column| column.missing_count() > 0)
        .map(|column| ColumnMissing {
            column: column.name.clone(),
            missing_count: column.missing_count(),
            missing_percent: column.missing_percent(),
        })
        .collect();

    by_column.sort_by(|a, b| {
        b.missing_percent
            .partial_cmp(&a.missing_percent)
            .unwrap_or(Ordering::Equal)
    });

    let average_percent = if by_column.is_empty() {
        0.0
    } else {
        by_column.iter().map(|c| c.missing_percent).sum::<f64>() / by_column.len() as f64
    };

    MissingSummary {
        by_column,
        average_percent,
    }
}

/// Most frequent value per categorical column, skipping high-cardinality
/// columns. Ties break to the smaller string.
pub fn categorical_modes(dataset: &Dataset) -> BTreeMap<String, String> {
    let mut modes = BTreeMap::new();

    for name in &dataset.categorical_columns {
        let Some(column) = dataset.column(name) else {
            continue;
        };
        if column.distinct_count() > MODE_MAX_CARDINALITY {
            continue;
        }
        let Some(values) = column.categorical_values() else {
            continue;
        };

        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for value in values.iter().flatten() {
            *counts.entry(value.as_str()).or_insert(0) += 1;
        }

        // BTreeMap iteration order makes the tie-break deterministic
        let mode = counts
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(a.0)))
            .map(|(value, _)| value.to_string());

        if let Some(mode) = mode {
            modes.insert(name.clone(), mode);
        }
    }

    modes
}

#[derive(Debug, Clone)]
pub struct CorrelationAnalysis {
    pub labels: Vec<String>,
    /// Pearson matrix; `None` marks undefined cells (constant columns,
    /// fewer than two paired observations)
    pub matrix: Vec<Vec<Option<f64>>>,
    /// Strongest unique pairs by |r|, sign preserved, rounded to 4 decimals
    pub top: Vec<CorrelationPair>,
}

/// Pairwise-complete Pearson correlations over the analysis-numeric
/// columns. Returns `None` when fewer than two numeric columns exist.
pub fn correlations(dataset: &Dataset, top_k: usize) -> Option<CorrelationAnalysis> {
    let labels = dataset.numeric_columns.clone();
    if labels.len() < 2 {
        return None;
    }

    let series: Vec<&[Option<f64>]> = labels
        .iter()
        .filter_map(|name| dataset.column(name).and_then(|c| c.numeric_values()))
        .collect();
    debug_assert_eq!(series.len(), labels.len());

    let n = labels.len();
    let mut matrix = vec![vec![None; n]; n];
    let mut candidates = Vec::new();

    for i in 0..n {
        matrix[i][i] = Some(1.0);
        for j in (i + 1)..n {
            let r = pearson(series[i], series[j]);
            matrix[i][j] = r;
            matrix[j][i] = r;
            if let Some(r) = r {
                candidates.push(CorrelationPair {
                    left: labels[i].clone(),
                    right: labels[j].clone(),
                    r,
                });
            }
        }
    }

    candidates.sort_by(|a, b| {
        b.r.abs()
            .partial_cmp(&a.r.abs())
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.left.cmp(&b.left))
            .then_with(|| a.right.cmp(&b.right))
    });
    candidates.truncate(top_k);
    for pair in &mut candidates {
        pair.r = (pair.r * 10_000.0).round() / 10_000.0;
    }

    Some(CorrelationAnalysis {
        labels,
        matrix,
        top: candidates,
    })
}

/// Pearson r over rows where both series have a value.
fn pearson(xs: &[Option<f64>], ys: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys.iter())
        .filter_map(|(x, y)| match (x, y) {
            (Some(x), Some(y)) => Some((*x, *y)),
            _ => None,
        })
        .collect();

    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }

    Some(cov / (var_x * var_y).sqrt())
}

/// Quantile with linear interpolation over an ascending-sorted slice.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    debug_assert!((0.0..=1.0).contains(&q));

    if sorted.len() == 1 {
        return sorted[0];
    }

    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    if lower == upper {
        sorted[lower]
    } else {
        sorted[lower] + (sorted[upper] - sorted[lower]) * (pos - lower as f64)
    }
}

/// Values outside [Q1 - 1.5*IQR, Q3 + 1.5*IQR], missing cells excluded.
pub fn iqr_outliers(values: &[Option<f64>]) -> usize {
    let mut present: Vec<f64> = values.iter().flatten().copied().collect();
    if present.is_empty() {
        return 0;
    }
    present.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let q1 = quantile_sorted(&present, 0.25);
    let q3 = quantile_sorted(&present, 0.75);
    let iqr = q3 - q1;
    let lower_fence = q1 - 1.5 * iqr;
    let upper_fence = q3 + 1.5 * iqr;

    present
        .iter()
        .filter(|&&v| v < lower_fence || v > upper_fence)
        .count()
}

/// Outlier total across all analysis-numeric columns.
pub fn total_iqr_outliers(dataset: &Dataset) -> usize {
    dataset
        .numeric_columns
        .iter()
        .filter_map(|name| dataset.column(name).and_then(|c| c.numeric_values()))
        .map(iqr_outliers)
        .sum()
}
