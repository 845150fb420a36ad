// src/analysis/error.rs
use thiserror::Error;

/// User-facing failures of an analysis run.
///
/// Every message carried here is short and human readable. Transport and
/// parse details are logged where they are caught and never end up in these
/// strings.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// Input rejected before any request was issued.
    #[error("{0}")]
    Validation(String),
    /// No usable credential at call time.
    #[error("API key is not set. Open Settings and enter a Gemini API key.")]
    Auth,
    /// The external service failed, returned nothing, or returned something
    /// that does not match the requested shape.
    #[error("{0}")]
    Analysis(String),
}

impl AnalysisError {
    pub fn no_input() -> Self {
        AnalysisError::Validation(
            "Enter one or more SMILES strings or upload structure images.".to_string(),
        )
    }

    /// No credential when the user starts a run. Reported like missing input;
    /// `Auth` is kept for a request that reaches a backend without one.
    pub fn missing_credential() -> Self {
        AnalysisError::Validation("Enter a Gemini API key in Settings before analyzing.".to_string())
    }

    pub fn unified_method() -> Self {
        AnalysisError::Analysis(
            "Unable to obtain a unified chromatographic method. Check the input and the API key, then try again."
                .to_string(),
        )
    }

    pub fn component(display_id: &str) -> Self {
        AnalysisError::Analysis(format!("Unable to analyze {}.", display_id))
    }

    pub fn curve(display_id: &str) -> Self {
        AnalysisError::Analysis(format!("Unable to generate the pH-logD curve for {}.", display_id))
    }
}

/// Failures inside the service client. Logged, then mapped to an
/// [`AnalysisError`] scoped to the request that produced them.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("service returned an empty response")]
    EmptyResponse,
    #[error("response does not match the requested schema: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("response contained no image part")]
    MissingImage,
}
