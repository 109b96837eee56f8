use crate::domain::model::{Column, ColumnData, Dataset};
use crate::utils::error::{AnalystError, Result};
use std::collections::HashSet;

/// Cell contents treated as missing, compared case-insensitively after trimming.
const MISSING_MARKERS: [&str; 4] = ["", "na", "nan", "null"];

/// Name tokens that suggest a numeric column is an identifier.
const ID_NAME_TOKENS: [&str; 3] = ["id", "code", "index"];

/// A name-flagged numeric column is dropped from analysis when its distinct
/// count exceeds this share of the row count.
const ID_DISTINCT_RATIO: f64 = 0.9;

#[derive(Debug, Clone)]
pub struct LoaderOptions {
    pub min_rows: usize,
    pub min_columns: usize,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            min_rows: 2000,
            min_columns: 10,
        }
    }
}

/// Parses CSV bytes into a classified [`Dataset`].
///
/// Columns where every non-missing cell parses as `f64` become numeric,
/// everything else categorical. Numeric columns whose name suggests an
/// identifier and whose cardinality is near the row count are kept in the
/// dataset but excluded from the numeric analysis set.
pub fn parse_dataset(name: &str, bytes: &[u8], options: &LoaderOptions) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut seen = HashSet::new();
    for header in &headers {
        if !seen.insert(header.as_str()) {
            return Err(AnalystError::DatasetValidationError {
                reason: format!("duplicate column header '{}'", header),
            });
        }
    }

    let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
    for record in reader.records() {
        let record = record?;
        for (idx, field) in record.iter().enumerate() {
            cells[idx].push(parse_cell(field));
        }
    }

    let rows = cells.first().map(|c| c.len()).unwrap_or(0);

    if rows < options.min_rows || headers.len() < options.min_columns {
        return Err(AnalystError::DatasetValidationError {
            reason: format!(
                "dataset is {} rows x {} columns, minimum is {} rows x {} columns",
                rows,
                headers.len(),
                options.min_rows,
                options.min_columns
            ),
        });
    }

    let columns: Vec<Column> = headers
        .into_iter()
        .zip(cells)
        .map(|(name, raw)| build_column(name, raw))
        .collect();

    let mut numeric_columns = Vec::new();
    let mut categorical_columns = Vec::new();

    tracing::debug!("🔍 Classifying {} columns", columns.len());
    for column in &columns {
        match &column.data {
            ColumnData::Numeric(_) => {
                if is_identifier_column(column, rows) {
                    tracing::debug!("Ignoring '{}': name and cardinality suggest an identifier", column.name);
                    continue;
                }
                numeric_columns.push(column.name.clone());
            }
            ColumnData::Categorical(_) => categorical_columns.push(column.name.clone()),
        }
    }

    tracing::debug!(
        "   Numeric columns for analysis: {}, categorical columns: {}",
        numeric_columns.len(),
        categorical_columns.len()
    );

    Ok(Dataset {
        name: name.to_string(),
        rows,
        columns,
        numeric_columns,
        categorical_columns,
    })
}

fn parse_cell(field: &str) -> Option<String> {
    let trimmed = field.trim();
    let lowered = trimmed.to_ascii_lowercase();
    if MISSING_MARKERS.contains(&lowered.as_str()) {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn build_column(name: String, raw: Vec<Option<String>>) -> Column {
    let mut parsed = Vec::with_capacity(raw.len());
    let mut all_numeric = true;
    let mut any_value = false;

    for cell in &raw {
        match cell {
            Some(text) => {
                any_value = true;
                match text.parse::<f64>() {
                    Ok(value) => parsed.push(Some(value)),
                    Err(_) => {
                        all_numeric = false;
                        break;
                    }
                }
            }
            None => parsed.push(None),
        }
    }

    // A column with no values at all carries no evidence of a numeric type
    let data = if all_numeric && any_value {
        ColumnData::Numeric(parsed)
    } else {
        ColumnData::Categorical(raw)
    };

    Column { name, data }
}

fn is_identifier_column(column: &Column, rows: usize) -> bool {
    let lowered = column.name.to_ascii_lowercase();
    let name_flagged = ID_NAME_TOKENS.iter().any(|token| lowered.contains(token));
    name_flagged && (column.distinct_count() as f64) > (rows as f64) * ID_DISTINCT_RATIO
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_options() -> LoaderOptions {
        LoaderOptions {
            min_rows: 1,
            min_columns: 1,
        }
    }

    #[test]
    fn test_classifies_numeric_and_categorical_columns() {
        let csv = "age,city\n30,Lima\n25,Quito\n40,Lima\n";
        let dataset = parse_dataset("people", csv.as_bytes(), &small_options()).unwrap();

        assert_eq!(dataset.rows, 3);
        assert_eq!(dataset.numeric_columns, vec!["age"]);
        assert_eq!(dataset.categorical_columns, vec!["city"]);
        assert_eq!(dataset.column("age").unwrap().missing_count(), 0);
    }

    #[test]
    fn test_missing_markers_are_recognized() {
        let csv = "score\n1.5\n\nNA\nnan\nNULL\n2.5\n";
        let dataset = parse_dataset("scores", csv.as_bytes(), &small_options()).unwrap();

        let column = dataset.column("score").unwrap();
        assert_eq!(column.missing_count(), 4);
        assert!(matches!(column.data, ColumnData::Numeric(_)));
    }

    #[test]
    fn test_identifier_column_excluded_from_numeric_analysis() {
        let mut csv = String::from("user_id,amount\n");
        for i in 0..100 {
            csv.push_str(&format!("{},{}\n", i, i % 5));
        }
        let dataset = parse_dataset("sales", csv.as_bytes(), &small_options()).unwrap();

        // Still a column of the dataset, just not analyzed numerically
        assert!(dataset.column("user_id").is_some());
        assert_eq!(dataset.numeric_columns, vec!["amount"]);
    }

    #[test]
    fn test_low_cardinality_id_name_is_kept() {
        let mut csv = String::from("group_id,amount\n");
        for i in 0..100 {
            csv.push_str(&format!("{},{}\n", i % 3, i));
        }
        let dataset = parse_dataset("groups", csv.as_bytes(), &small_options()).unwrap();

        assert_eq!(dataset.numeric_columns, vec!["group_id", "amount"]);
    }

    #[test]
    fn test_dimension_thresholds_enforced() {
        let csv = "a,b\n1,2\n3,4\n";
        let options = LoaderOptions {
            min_rows: 2000,
            min_columns: 10,
        };
        let err = parse_dataset("tiny", csv.as_bytes(), &options).unwrap_err();

        match err {
            AnalystError::DatasetValidationError { reason } => {
                assert!(reason.contains("2 rows"));
                assert!(reason.contains("2000"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_headers_rejected() {
        let csv = "a,a\n1,2\n";
        let err = parse_dataset("dup", csv.as_bytes(), &small_options()).unwrap_err();
        assert!(matches!(err, AnalystError::DatasetValidationError { .. }));
    }

    #[test]
    fn test_ragged_rows_are_an_error() {
        let csv = "a,b\n1,2\n3\n";
        let err = parse_dataset("ragged", csv.as_bytes(), &small_options()).unwrap_err();
        assert!(matches!(err, AnalystError::CsvError(_)));
    }

    #[test]
    fn test_all_missing_column_is_categorical() {
        let csv = "empty,val\nNA,1\n,2\nnull,3\n";
        let dataset = parse_dataset("sparse", csv.as_bytes(), &small_options()).unwrap();

        let column = dataset.column("empty").unwrap();
        assert!(matches!(column.data, ColumnData::Categorical(_)));
        assert_eq!(column.missing_percent(), 100.0);
        assert_eq!(dataset.categorical_columns, vec!["empty"]);
    }

    #[test]
    fn test_mixed_column_is_categorical() {
        let csv = "code_mix\n1\ntwo\n3\n";
        let dataset = parse_dataset("mixed", csv.as_bytes(), &small_options()).unwrap();
        let column = dataset.column("code_mix").unwrap();
        assert!(matches!(column.data, ColumnData::Categorical(_)));
    }
}
