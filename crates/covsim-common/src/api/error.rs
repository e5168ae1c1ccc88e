// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Dragonscale Team

use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CovsimError {
    /// Every sampling attempt in the retry budget failed to converge.
    #[error(
        "Sampling failed {attempts} consecutive attempts (failed weight {failed_weight}); \
         the partition pair may be unsolvable or degenerate"
    )]
    NonConvergence { attempts: usize, failed_weight: f64 },

    #[error("Vertex set is empty, nothing to sample from")]
    EmptyVertexSet,

    #[error("Argument '{arg}' is invalid: {message}")]
    InvalidArgument { arg: String, message: String },

    #[error("Parse error: {message}")]
    Parse { message: String, line: Option<usize> },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl CovsimError {
    /// Parse error pinned to a 1-based input line.
    pub fn parse_at(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            message: format!("line {}: {}", line, message.into()),
            line: Some(line),
        }
    }
}

pub type Result<T> = std::result::Result<T, CovsimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_convergence_message_hints_at_degenerate_input() {
        let err = CovsimError::NonConvergence {
            attempts: 1024,
            failed_weight: 1024.0,
        };
        let msg = err.to_string();
        assert!(msg.contains("1024 consecutive attempts"));
        assert!(msg.contains("unsolvable"));
    }

    #[test]
    fn test_parse_at_records_line() {
        let err = CovsimError::parse_at(3, "bad vertex id 'x'");
        match err {
            CovsimError::Parse { message, line } => {
                assert_eq!(line, Some(3));
                assert_eq!(message, "line 3: bad vertex id 'x'");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
