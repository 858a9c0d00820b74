use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("market data fetch failed: {0}")]
    DataFetch(String),

    #[error("insufficient history: {rows} rows available, need at least {min}")]
    InsufficientHistory { rows: usize, min: usize },

    #[error("feature table is missing required columns: {0:?}")]
    SchemaMismatch(Vec<String>),

    #[error("feature scaling failed: {0}")]
    Scaling(String),

    #[error("model inference failed: {0}")]
    Inference(String),
}
