//! Process exit codes.
//!
//! - 0: Success
//! - 1: Run failed (I/O, missing resources, division by zero)
//! - 2: Invalid input (malformed stimulus names, bad config, inconsistent embeddings)

use std::process::ExitCode;

use shape_bias_core::ShapeBiasError;
use shape_bias_embeddings::EmbeddingError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CliExitCode {
    Success = 0,
    Failure = 1,
    InvalidInput = 2,
}

impl From<CliExitCode> for ExitCode {
    fn from(code: CliExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

impl From<&ShapeBiasError> for CliExitCode {
    fn from(err: &ShapeBiasError) -> Self {
        match err {
            ShapeBiasError::MalformedInput { .. }
            | ShapeBiasError::DuplicateStimulus(_)
            | ShapeBiasError::InvalidConfig(_)
            | ShapeBiasError::Json(_) => CliExitCode::InvalidInput,
            ShapeBiasError::MissingResource { .. }
            | ShapeBiasError::MissingEmbedding { .. }
            | ShapeBiasError::Division { .. }
            | ShapeBiasError::Similarity { .. }
            | ShapeBiasError::Softmax(_)
            | ShapeBiasError::Io { .. }
            | ShapeBiasError::Csv { .. } => CliExitCode::Failure,
        }
    }
}

impl From<&EmbeddingError> for CliExitCode {
    fn from(err: &EmbeddingError) -> Self {
        match err {
            EmbeddingError::Core(inner) => inner.into(),
            EmbeddingError::InvalidDimension { .. }
            | EmbeddingError::InvalidValue { .. }
            | EmbeddingError::EmptyInput
            | EmbeddingError::SerializationError { .. } => CliExitCode::InvalidInput,
            EmbeddingError::MissingFeatures { .. }
            | EmbeddingError::ExtractionFailed { .. }
            | EmbeddingError::CacheError { .. } => CliExitCode::Failure,
        }
    }
}

/// Exit code for an error chain, from the first typed error found in it.
pub fn exit_code_for_error(err: &anyhow::Error) -> CliExitCode {
    for cause in err.chain() {
        if let Some(e) = cause.downcast_ref::<ShapeBiasError>() {
            return e.into();
        }
        if let Some(e) = cause.downcast_ref::<EmbeddingError>() {
            return e.into();
        }
    }
    CliExitCode::Failure
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_malformed_input_is_exit_2() {
        let err: anyhow::Error = ShapeBiasError::malformed("zebra1-cat2", "unknown category").into();
        assert_eq!(exit_code_for_error(&err), CliExitCode::InvalidInput);
    }

    #[test]
    fn test_context_does_not_hide_typed_error() {
        let result: Result<(), ShapeBiasError> = Err(ShapeBiasError::division("shape/total", "model saycam"));
        let err = result.context("computing proportions").unwrap_err();
        assert_eq!(exit_code_for_error(&err), CliExitCode::Failure);
    }

    #[test]
    fn test_embedding_core_error_delegates() {
        let err: anyhow::Error = EmbeddingError::Core(ShapeBiasError::InvalidConfig("x".into())).into();
        assert_eq!(exit_code_for_error(&err), CliExitCode::InvalidInput);
        let untyped = anyhow::anyhow!("something else");
        assert_eq!(exit_code_for_error(&untyped), CliExitCode::Failure);
    }
}
