//! Test failure types

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TestError>;

/// Why a single test case failed
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TestError {
    #[error("{message}: expected {expected}, got {actual}")]
    Assertion {
        message: String,
        actual: String,
        expected: String,
    },

    #[error("{0}")]
    Failed(String),
}

impl TestError {
    pub fn assertion(
        message: impl Into<String>,
        actual: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self::Assertion {
            message: message.into(),
            actual: actual.into(),
            expected: expected.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assertion_message_shows_both_sides() {
        let err = TestError::assertion("unexpected result", "3", "2");
        assert_eq!(err.to_string(), "unexpected result: expected 2, got 3");
    }
}
