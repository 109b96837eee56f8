use crate::analysis::stats::{self, CorrelationAnalysis};
use crate::domain::model::{
    BoxStats, ChartSet, Column, ColumnMissing, CorrelationChart, Dataset, DistributionChart,
    FrequencyChart, FrequencyEntry, HistogramBin, MissingChart,
};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Categorical columns above this distinct-value count are not worth a bar
/// chart and are skipped.
pub const FREQUENCY_MAX_CATEGORIES: usize = 20;

/// Upper bound for histogram bin counts, whatever Sturges' rule says.
pub const MAX_HISTOGRAM_BINS: usize = 50;

/// Builds every chart artifact for the dataset.
pub fn build_charts(dataset: &Dataset, correlation: Option<&CorrelationAnalysis>) -> ChartSet {
    let distributions = dataset
        .numeric_columns
        .iter()
        .filter_map(|name| dataset.column(name))
        .filter_map(distribution_chart)
        .collect();

    let frequencies = dataset
        .categorical_columns
        .iter()
        .filter_map(|name| dataset.column(name))
        .filter_map(frequency_chart)
        .collect();

    ChartSet {
        missing: missing_chart(dataset),
        distributions,
        frequencies,
        correlation: correlation.map(|analysis| CorrelationChart {
            columns: analysis.labels.clone(),
            matrix: analysis.matrix.clone(),
        }),
    }
}

/// Missing counts for every column, in dataset order.
pub fn missing_chart(dataset: &Dataset) -> MissingChart {
    MissingChart {
        entries: dataset
            .columns
            .iter()
            .map(|column| ColumnMissing {
                column: column.name.clone(),
                missing_count: column.missing_count(),
                missing_percent: column.missing_percent(),
            })
            .collect(),
    }
}

/// Histogram plus box-plot summary for a numeric column. `None` when the
/// column has no values to draw.
pub fn distribution_chart(column: &Column) -> Option<DistributionChart> {
    let values = column.numeric_values()?;
    let mut present: Vec<f64> = values.iter().flatten().copied().collect();
    if present.is_empty() {
        return None;
    }
    present.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let box_stats = BoxStats {
        min: present[0],
        q1: stats::quantile_sorted(&present, 0.25),
        median: stats::quantile_sorted(&present, 0.5),
        q3: stats::quantile_sorted(&present, 0.75),
        max: present[present.len() - 1],
        outliers: stats::iqr_outliers(values),
    };

    Some(DistributionChart {
        column: column.name.clone(),
        bins: histogram(&present),
        box_stats,
    })
}

/// Equal-width bins over sorted values, bin count per Sturges' rule.
fn histogram(sorted: &[f64]) -> Vec<HistogramBin> {
    let n = sorted.len();
    let min = sorted[0];
    let max = sorted[n - 1];

    if min == max {
        return vec![HistogramBin {
            lower: min,
            upper: max,
            count: n,
        }];
    }

    let bin_count = sturges_bins(n);
    let width = (max - min) / bin_count as f64;
    let mut bins: Vec<HistogramBin> = (0..bin_count)
        .map(|i| HistogramBin {
            lower: min + width * i as f64,
            upper: min + width * (i + 1) as f64,
            count: 0,
        })
        .collect();

    for &value in sorted {
        let mut idx = ((value - min) / width) as usize;
        // The maximum lands exactly on the upper edge of the last bin
        if idx >= bin_count {
            idx = bin_count - 1;
        }
        bins[idx].count += 1;
    }

    bins
}

fn sturges_bins(n: usize) -> usize {
    let bins = (n as f64).log2().ceil() as usize + 1;
    bins.clamp(1, MAX_HISTOGRAM_BINS)
}

/// Value frequencies for a categorical column, descending by count.
/// `None` for high-cardinality or all-missing columns.
pub fn frequency_chart(column: &Column) -> Option<FrequencyChart> {
    let values = column.categorical_values()?;

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for value in values.iter().flatten() {
        *counts.entry(value.as_str()).or_insert(0) += 1;
    }

    if counts.is_empty() || counts.len() > FREQUENCY_MAX_CATEGORIES {
        return None;
    }

    let mut entries: Vec<FrequencyEntry> = counts
        .into_iter()
        .map(|(value, count)| FrequencyEntry {
            value: value.to_string(),
            count,
        })
        .collect();
    entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));

    Some(FrequencyChart {
        column: column.name.clone(),
        entries,
    })
}
