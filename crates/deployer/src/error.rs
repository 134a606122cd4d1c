//! Deployment errors.

use provisioner_core::{BackendError, SubmissionError};
use thiserror::Error;

/// Failure to deploy a single resource.
#[derive(Debug, Error)]
pub enum DeployError {
    /// The creation backend could not produce creation code.
    #[error("Cannot build creation code for {resource}: {source}")]
    Backend {
        /// Resource name.
        resource: String,
        #[source]
        source: BackendError,
    },

    /// The creation call failed and could not be recovered.
    ///
    /// `source` is the original client-side error, unchanged.
    #[error("Creation of {resource} failed: {source}")]
    Submission {
        /// Resource name.
        resource: String,
        #[source]
        source: SubmissionError,
    },
}

impl DeployError {
    /// The unrecovered submission error, if that is what failed.
    pub fn submission_error(&self) -> Option<&SubmissionError> {
        match self {
            DeployError::Submission { source, .. } => Some(source),
            DeployError::Backend { .. } => None,
        }
    }
}
