use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Model fit failed: {0}")]
    ModelFitFailure(String),

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Unknown ticker: {0}")]
    UnknownTicker(String),

    #[error("No rows produced for the selected tickers")]
    NoRowsProduced,

    #[error("Calculation error: {0}")]
    CalculationError(String),
}
