use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Cell values of a single column. Missing cells are `None`.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Numeric(Vec<Option<f64>>),
    Categorical(Vec<Option<String>>),
}

#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn len(&self) -> usize {
        match &self.data {
            ColumnData::Numeric(values) => values.len(),
            ColumnData::Categorical(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn missing_count(&self) -> usize {
        match &self.data {
            ColumnData::Numeric(values) => values.iter().filter(|v| v.is_none()).count(),
            ColumnData::Categorical(values) => values.iter().filter(|v| v.is_none()).count(),
        }
    }

    pub fn missing_percent(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        self.missing_count() as f64 / self.len() as f64 * 100.0
    }

    /// Number of distinct non-missing values.
    pub fn distinct_count(&self) -> usize {
        match &self.data {
            ColumnData::Numeric(values) => {
                let mut seen = std::collections::HashSet::new();
                for value in values.iter().flatten() {
                    // NaN never equals itself, compare by bit pattern
                    seen.insert(value.to_bits());
                }
                seen.len()
            }
            ColumnData::Categorical(values) => {
                let mut seen = std::collections::HashSet::new();
                for value in values.iter().flatten() {
                    seen.insert(value.as_str());
                }
                seen.len()
            }
        }
    }

    pub fn numeric_values(&self) -> Option<&[Option<f64>]> {
        match &self.data {
            ColumnData::Numeric(values) => Some(values),
            ColumnData::Categorical(_) => None,
        }
    }

    pub fn categorical_values(&self) -> Option<&[Option<String>]> {
        match &self.data {
            ColumnData::Categorical(values) => Some(values),
            ColumnData::Numeric(_) => None,
        }
    }
}

/// A parsed and classified CSV dataset.
///
/// `numeric_columns` holds the columns selected for numeric analysis;
/// numeric columns that look like identifiers are excluded from it during
/// loading but remain present in `columns`.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub name: String,
    pub rows: usize,
    pub columns: Vec<Column>,
    pub numeric_columns: Vec<String>,
    pub categorical_columns: Vec<String>,
}

impl Dataset {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnMissing {
    pub column: String,
    pub missing_count: usize,
    pub missing_percent: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CorrelationPair {
    pub left: String,
    pub right: String,
    pub r: f64,
}

/// The statistical digest handed to the report generator and written to
/// `summary.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub dataset_name: String,
    pub rows: usize,
    pub columns: usize,
    pub numeric_columns: usize,
    pub categorical_columns: usize,
    /// Average missing percentage over columns that have missing values
    pub missing_avg_percent: f64,
    /// Columns with missing values, sorted by percentage descending
    pub missing_by_column: Vec<ColumnMissing>,
    pub total_outliers: usize,
    pub top_correlations: Vec<CorrelationPair>,
    pub categorical_modes: BTreeMap<String, String>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoxStats {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub outliers: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributionChart {
    pub column: String,
    pub bins: Vec<HistogramBin>,
    pub box_stats: BoxStats,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FrequencyEntry {
    pub value: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrequencyChart {
    pub column: String,
    pub entries: Vec<FrequencyEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissingChart {
    pub entries: Vec<ColumnMissing>,
}

/// Pearson matrix over the analysis-numeric columns. Undefined cells
/// (constant columns, not enough paired observations) are `None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationChart {
    pub columns: Vec<String>,
    pub matrix: Vec<Vec<Option<f64>>>,
}

/// Chart-ready data for every figure the analysis produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartSet {
    pub missing: MissingChart,
    pub distributions: Vec<DistributionChart>,
    pub frequencies: Vec<FrequencyChart>,
    pub correlation: Option<CorrelationChart>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportArtifact {
    pub file_name: String,
    pub model: String,
    pub markdown: String,
}

#[derive(Debug, Clone)]
pub struct AnalysisOutput {
    pub summary: DatasetSummary,
    pub charts: ChartSet,
    pub report: Option<ReportArtifact>,
}
