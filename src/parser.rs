//! Single-pass parser that resolves loop jump targets.
//!
//! Any character outside `><+-.,[]` is a comment and is skipped. Brackets are
//! matched with a stack of pending `[` positions; both halves of a pair are
//! patched as soon as the `]` is seen, so the returned sequence is always
//! fully resolved.

use crate::error::ParseError;
use crate::instruction::Instruction;

/// Parsed instructions plus the char offset each one came from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedProgram {
    pub instructions: Vec<Instruction>,
    /// `offsets[i]` is the char offset in the source of `instructions[i]`.
    pub offsets: Vec<usize>,
}

/// Parse `source` into a resolved instruction sequence.
pub fn parse(source: &str) -> Result<Vec<Instruction>, ParseError> {
    parse_with_offsets(source).map(|parsed| parsed.instructions)
}

/// Parse `source`, keeping a source offset for every emitted instruction.
pub fn parse_with_offsets(source: &str) -> Result<ParsedProgram, ParseError> {
    let mut instructions: Vec<Instruction> = Vec::new();
    let mut offsets: Vec<usize> = Vec::new();
    // Emission indices of `[` still waiting for their `]`.
    let mut pending: Vec<usize> = Vec::new();

    for (offset, ch) in source.chars().enumerate() {
        let Some(mut instr) = Instruction::from_char(ch) else {
            continue;
        };
        let index = instructions.len();

        match instr {
            Instruction::LoopStart { .. } => pending.push(index),
            Instruction::LoopEnd { .. } => {
                let Some(start) = pending.pop() else {
                    return Err(ParseError::UnmatchedCloseBracket { offset });
                };
                instructions[start] = Instruction::LoopStart { end: index + 1 };
                instr = Instruction::LoopEnd { start: start + 1 };
            }
            _ => {}
        }

        instructions.push(instr);
        offsets.push(offset);
    }

    if let Some(&unclosed) = pending.last() {
        return Err(ParseError::UnmatchedOpenBracket {
            offset: offsets[unclosed],
        });
    }

    Ok(ParsedProgram { instructions, offsets })
}
