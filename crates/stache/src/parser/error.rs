//! Parse error types.

use thiserror::Error;

/// An error that occurred during parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// No grammar rule matched. `position` is the furthest byte offset the
    /// parser reached; `expected` lists the tokens that could have matched there.
    #[error("syntax error at {line}:{column}: expected {}", expected.join(" or "))]
    Syntax {
        position: usize,
        line: usize,
        column: usize,
        expected: Vec<String>,
    },

    /// Blocks or subexpressions nested deeper than the configured limit.
    #[error("nesting deeper than {max_depth} levels at {line}:{column}")]
    NestingTooDeep {
        position: usize,
        line: usize,
        column: usize,
        max_depth: usize,
    },
}

impl ParseError {
    pub(crate) fn syntax(source: &str, position: usize, expected: Vec<String>) -> Self {
        let (line, column) = calculate_position(source, position);
        ParseError::Syntax {
            position,
            line,
            column,
            expected,
        }
    }

    pub(crate) fn nesting_too_deep(source: &str, position: usize, max_depth: usize) -> Self {
        let (line, column) = calculate_position(source, position);
        ParseError::NestingTooDeep {
            position,
            line,
            column,
            max_depth,
        }
    }

    /// Byte offset into the source where the error was detected.
    pub fn position(&self) -> usize {
        match self {
            ParseError::Syntax { position, .. } | ParseError::NestingTooDeep { position, .. } => {
                *position
            }
        }
    }

    /// Token descriptions that would have been accepted at the error position.
    pub fn expected(&self) -> &[String] {
        match self {
            ParseError::Syntax { expected, .. } => expected,
            ParseError::NestingTooDeep { .. } => &[],
        }
    }
}

/// Calculate 1-based line and column (in characters) of a byte offset.
fn calculate_position(source: &str, position: usize) -> (usize, usize) {
    let consumed = &source[..position.min(source.len())];
    let line = consumed.chars().filter(|&c| c == '\n').count() + 1;
    let line_start = consumed.rfind('\n').map_or(0, |pos| pos + 1);
    let column = consumed[line_start..].chars().count() + 1;
    (line, column)
}
