//! Internal codegen failures (§10.2): implementation bugs, not user
//! source errors — those flow exclusively through `DiagnosticEngine` and
//! never reach here. Codegen only runs over an error-free `SemanticIR`
//! (§4.6 "Halts with an internal error if semantic errors are present"),
//! so every variant below is a "this should have been impossible" case.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodegenError {
    #[error("semantic analysis reported errors; codegen was not run")]
    SemanticErrorsPresent,

    #[error("unresolved symbol `{0}` reached codegen")]
    UnresolvedSymbol(String),

    #[error("class `{0}` missing during codegen despite registration")]
    MissingClass(String),

    #[error("method `{0}` missing during codegen despite registration")]
    MissingMethod(String),

    #[error("LLVM builder error while emitting {context}: {source}")]
    Builder { context: String, source: String },

    #[error("module verification failed: {0}")]
    VerificationFailed(String),

    #[error("internal error at {location}: {message}")]
    Internal { location: String, message: String },

    #[error("JIT/AOT backend error: {0}")]
    Backend(String),
}

impl CodegenError {
    pub fn builder(context: impl Into<String>, source: impl ToString) -> Self {
        CodegenError::Builder {
            context: context.into(),
            source: source.to_string(),
        }
    }

    pub fn internal(location: impl Into<String>, message: impl Into<String>) -> Self {
        CodegenError::Internal {
            location: location.into(),
            message: message.into(),
        }
    }
}

pub type CodegenResult<T> = Result<T, CodegenError>;
