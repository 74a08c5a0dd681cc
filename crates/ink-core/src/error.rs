use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{code}: {message}")]
pub struct InkError {
    pub code: String,
    pub message: String,
}

impl InkError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Fatal errors halt execution; everything else is reported to the
    /// caller, which decides whether to continue.
    pub fn is_fatal(&self) -> bool {
        self.code.starts_with("CALLSTACK_")
            || matches!(
                self.code.as_str(),
                "SAVE_FORMAT_INCORRECT" | "SAVE_VERSION_INCOMPATIBLE" | "SAVE_FORMAT_INVALID"
            )
    }
}

#[cfg(test)]
mod error_tests {
    use super::*;

    #[test]
    fn display_joins_code_and_message() {
        let error = InkError::new("PATH_INVALID", "Empty path.");
        assert_eq!(error.to_string(), "PATH_INVALID: Empty path.");
    }

    #[test]
    fn fatal_classification_follows_code_prefix() {
        assert!(InkError::new("CALLSTACK_POP_ROOT", "x").is_fatal());
        assert!(InkError::new("SAVE_VERSION_INCOMPATIBLE", "x").is_fatal());
        assert!(!InkError::new("EVAL_STACK_UNDERFLOW", "x").is_fatal());
        assert!(!InkError::new("PATH_UNRESOLVED", "x").is_fatal());
    }
}
