#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("bundle file not found: {0}")]
    BundleNotFound(String),
    #[error("failed to read bundle file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to write bundle file: {0}")]
    FileWrite(std::io::Error),
    #[error("FHIR error: {0}")]
    Fhir(#[from] fhir::FhirError),
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
