use thiserror::Error;

#[derive(Debug, Error)]
pub enum LcaError {
    #[error("Request was considered invalid due to error: {0}")]
    InvalidRequest(#[from] anyhow::Error),
    #[error("Uncaught error during lifecycle calculation: {0}")]
    PanicInCalculation(String),
    #[error("Error while writing calculation output: {0}")]
    ErrorInOutput(OutputError),
}

#[derive(Debug, Error)]
#[error(transparent)]
pub struct OutputError {
    error: anyhow::Error,
}

impl OutputError {
    pub(crate) fn new(error: anyhow::Error) -> Self {
        Self { error }
    }
}
