use std::io;

/// Structural errors found while resolving the jump table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// A `]` with no pending `[`.
    #[error("Unmatched bracket ']' at offset {offset}")]
    UnmatchedCloseBracket { offset: usize },

    /// A `[` that was never closed. Reports the innermost one still open.
    #[error("Unmatched bracket '[' at offset {offset}")]
    UnmatchedOpenBracket { offset: usize },
}

impl ParseError {
    /// Char offset of the offending bracket in the source text.
    pub fn offset(&self) -> usize {
        match self {
            ParseError::UnmatchedCloseBracket { offset } | ParseError::UnmatchedOpenBracket { offset } => *offset,
        }
    }
}

/// Errors raised by a single `step()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RuntimeError {
    /// The data pointer left the tape (moved below zero, or read past the end on output).
    #[error("Invalid data index {pointer} at instruction {ip}")]
    InvalidDataIndex { ip: usize, pointer: isize },

    /// A jump targeted an instruction outside the program.
    #[error("Invalid instruction index {target} at instruction {ip}")]
    InvalidInstructionIndex { ip: usize, target: usize },
}

impl RuntimeError {
    /// Index of the instruction that failed.
    pub fn ip(&self) -> usize {
        match self {
            RuntimeError::InvalidDataIndex { ip, .. } | RuntimeError::InvalidInstructionIndex { ip, .. } => *ip,
        }
    }
}

/// Everything that can stop a program from parsing or running to completion.
#[derive(Debug, thiserror::Error)]
pub enum VmError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Runtime error: {0}")]
    Runtime(#[from] RuntimeError),

    /// Execution aborted due to step limit.
    #[error("Execution aborted: step limit exceeded ({limit})")]
    StepLimitExceeded { limit: u64 },

    /// Execution aborted due to cooperative cancellation (e.g., timeout)
    #[error("Execution aborted: cancelled")]
    Canceled,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_the_offending_index() {
        let err = ParseError::UnmatchedCloseBracket { offset: 4 };
        assert_eq!(err.to_string(), "Unmatched bracket ']' at offset 4");
        assert_eq!(err.offset(), 4);

        let err = RuntimeError::InvalidDataIndex { ip: 0, pointer: -1 };
        assert_eq!(err.to_string(), "Invalid data index -1 at instruction 0");
    }

    #[test]
    fn vm_error_wraps_with_category_prefix() {
        let err: VmError = RuntimeError::InvalidInstructionIndex { ip: 2, target: 9 }.into();
        assert_eq!(err.to_string(), "Runtime error: Invalid instruction index 9 at instruction 2");

        let err: VmError = ParseError::UnmatchedOpenBracket { offset: 0 }.into();
        assert!(err.to_string().starts_with("Parse error:"));
    }
}
