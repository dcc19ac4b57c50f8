use thiserror::Error;

#[derive(Error, Debug)]
pub enum CopilotError {
    #[error("{source_name}: missing required column '{column}'")]
    MissingColumn {
        source_name: String,
        column: String,
    },

    #[error("{source_name}: unparsable period '{value}' (expected e.g. '2025-06', '2025-06-15' or 'June 2025')")]
    PeriodParse {
        source_name: String,
        value: String,
    },

    #[error("fx: duplicate rate for period {period}, currency {currency}")]
    DuplicateFxRate { period: String, currency: String },

    #[error("{source_name}: column '{column}' holds non-numeric value '{value}'")]
    NumberParse {
        source_name: String,
        column: String,
        value: String,
    },

    #[error("{source_name}: no rows loaded, cannot compute a metric")]
    EmptyDataset { source_name: String },

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CopilotError>;
