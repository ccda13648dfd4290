use std::fmt;

/// A single resolved Brainfuck instruction.
///
/// Loop instructions carry the index of the instruction to execute after the
/// jump, i.e. the slot right after their matching partner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// `>`: move the data pointer one cell to the right.
    MoveRight,
    /// `<`: move the data pointer one cell to the left.
    MoveLeft,
    /// `+`: increment the current cell (wrapping).
    Increment,
    /// `-`: decrement the current cell (wrapping).
    Decrement,
    /// `.`: append the current cell to the output buffer.
    Output,
    /// `,`: read the next input character into the current cell.
    Input,
    /// `[`: jump to `end` when the current cell is zero.
    LoopStart { end: usize },
    /// `]`: jump to `start` when the current cell is not zero.
    LoopEnd { start: usize },
}

impl Instruction {
    /// Map a source character to an instruction.
    ///
    /// Loop payloads are placeholders (`0`); the parser patches them once the
    /// matching bracket is known.
    pub fn from_char(ch: char) -> Option<Self> {
        Some(match ch {
            '>' => Instruction::MoveRight,
            '<' => Instruction::MoveLeft,
            '+' => Instruction::Increment,
            '-' => Instruction::Decrement,
            '.' => Instruction::Output,
            ',' => Instruction::Input,
            '[' => Instruction::LoopStart { end: 0 },
            ']' => Instruction::LoopEnd { start: 0 },
            _ => return None,
        })
    }

    /// The source character this instruction was parsed from.
    pub fn as_char(&self) -> char {
        match self {
            Instruction::MoveRight => '>',
            Instruction::MoveLeft => '<',
            Instruction::Increment => '+',
            Instruction::Decrement => '-',
            Instruction::Output => '.',
            Instruction::Input => ',',
            Instruction::LoopStart { .. } => '[',
            Instruction::LoopEnd { .. } => ']',
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Keep only Brainfuck instruction characters
pub fn bf_only(s: &str) -> String {
    s.chars().filter(|c| Instruction::from_char(*c).is_some()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_instruction_char_maps_back_to_itself() {
        for ch in "><+-.,[]".chars() {
            let instr = Instruction::from_char(ch).expect("instruction char");
            assert_eq!(instr.as_char(), ch);
            assert_eq!(instr.to_string(), ch.to_string());
        }
    }

    #[test]
    fn other_chars_are_not_instructions() {
        for ch in "ab 1\n#!".chars() {
            assert!(Instruction::from_char(ch).is_none());
        }
    }

    #[test]
    fn bf_only_strips_comments() {
        assert_eq!(bf_only("a+ b[-]\n# done."), "+[-].");
    }
}
