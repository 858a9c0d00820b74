use crate::error::AgentError;
use crate::feature::FeatureTable;

/// Number of feature rows fed to the regime model, fixed at training time.
pub const SEQ_LEN: usize = 252;

/// The last `seq_len` feature rows in a declared column order, oldest first.
/// Shape is fixed: `seq_len` rows of `columns.len()` values each.
#[derive(Debug, Clone)]
pub struct SequenceWindow {
    columns: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl SequenceWindow {
    pub fn seq_len(&self) -> usize {
        self.rows.len()
    }

    pub fn num_features(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }
}

/// Slice the trailing `seq_len` rows of the table, each materialized in
/// `feature_columns` order (the order the sequence model was trained with).
pub fn make_window(
    table: &FeatureTable,
    feature_columns: &[&str],
    seq_len: usize,
) -> Result<SequenceWindow, AgentError> {
    let missing = table.missing_columns(feature_columns);
    if !missing.is_empty() {
        return Err(AgentError::SchemaMismatch(missing));
    }
    if table.len() < seq_len {
        return Err(AgentError::InsufficientHistory {
            rows: table.len(),
            min: seq_len,
        });
    }

    let start = table.len() - seq_len;
    let rows = (start..table.len())
        .map(|i| table.row_in_order(i, feature_columns))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SequenceWindow {
        columns: feature_columns.iter().map(|c| c.to_string()).collect(),
        rows,
    })
}
