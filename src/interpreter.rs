//! The stepping execution engine.
//!
//! The interpreter owns all of its state: the resolved instructions, a
//! growable byte tape, the data and instruction pointers, the input sequence
//! with its cursor, and the buffered output. Nothing is shared between
//! instances.
//!
//! Behaviors:
//! - The tape starts from a caller-supplied buffer or `memory_size` zeroed cells.
//! - Moving right past the end grows the tape; moving left of cell 0 is an error.
//! - `+`/`-` wrap modulo 256.
//! - `,` consumes the next input character; once input is exhausted it writes 0.
//! - `.` appends the current cell to the output buffer.
//! - Loop zero-tests treat cells past the end of the tape as zero without growing it.

use std::fmt;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::error::{ParseError, RuntimeError, VmError};
use crate::instruction::Instruction;
use crate::parser;

/// Tape length used when no explicit tape is supplied.
pub const DEFAULT_MEMORY_SIZE: usize = 256;

/// How to set up a fresh interpreter.
#[derive(Debug, Clone)]
pub struct InterpreterOptions {
    /// Initial tape contents. Takes precedence over `memory_size`.
    pub tape: Option<Vec<u8>>,
    /// Characters consumed by `,`, in order.
    pub input: String,
    /// Number of zeroed cells when `tape` is `None`.
    pub memory_size: usize,
}

impl Default for InterpreterOptions {
    fn default() -> Self {
        Self {
            tape: None,
            input: String::new(),
            memory_size: DEFAULT_MEMORY_SIZE,
        }
    }
}

impl InterpreterOptions {
    pub fn with_tape(mut self, tape: Vec<u8>) -> Self {
        self.tape = Some(tape);
        self
    }

    pub fn with_input(mut self, input: impl Into<String>) -> Self {
        self.input = input.into();
        self
    }

    pub fn with_memory_size(mut self, memory_size: usize) -> Self {
        self.memory_size = memory_size;
        self
    }
}

/// Controls for cooperative cancellation and step limiting.
#[derive(Debug, Clone, Default)]
pub struct StepControl {
    pub max_steps: Option<u64>,
    pub cancel_flag: Arc<AtomicBool>,
}

impl StepControl {
    pub fn new(max_steps: Option<u64>, cancel_flag: Arc<AtomicBool>) -> Self {
        Self { max_steps, cancel_flag }
    }
}

/// A Brainfuck virtual machine executing a resolved instruction sequence.
#[derive(Debug, Clone)]
pub struct Interpreter {
    instructions: Vec<Instruction>,
    tape: Vec<u8>,
    data_pointer: usize,
    instruction_pointer: usize,
    input: Vec<char>,
    input_cursor: usize,
    output: Vec<char>,
    steps: u64,
}

impl Interpreter {
    /// Create an interpreter for an already parsed program.
    pub fn new(instructions: Vec<Instruction>, options: InterpreterOptions) -> Self {
        let InterpreterOptions { tape, input, memory_size } = options;
        Self {
            instructions,
            tape: tape.unwrap_or_else(|| vec![0; memory_size]),
            data_pointer: 0,
            instruction_pointer: 0,
            input: input.chars().collect(),
            input_cursor: 0,
            output: Vec::new(),
            steps: 0,
        }
    }

    /// Parse `source` and create an interpreter for it.
    pub fn from_source(source: &str, options: InterpreterOptions) -> Result<Self, ParseError> {
        let instructions = parser::parse(source)?;
        Ok(Self::new(instructions, options))
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn tape(&self) -> &[u8] {
        &self.tape
    }

    pub fn data_pointer(&self) -> usize {
        self.data_pointer
    }

    pub fn instruction_pointer(&self) -> usize {
        self.instruction_pointer
    }

    pub fn input_cursor(&self) -> usize {
        self.input_cursor
    }

    /// Number of instructions executed so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Everything written by `.` so far.
    pub fn output(&self) -> String {
        self.output.iter().collect()
    }

    pub fn has_output(&self) -> bool {
        !self.output.is_empty()
    }

    /// True once the instruction pointer has run off the end of the program.
    pub fn is_halted(&self) -> bool {
        self.instruction_pointer >= self.instructions.len()
    }

    /// Value of the current cell, or `None` if the pointer is past the tape.
    pub fn current_cell(&self) -> Option<u8> {
        self.tape.get(self.data_pointer).copied()
    }

    /// Execute the program until it halts or an instruction fails.
    pub fn run(&mut self) -> Result<(), RuntimeError> {
        while !self.is_halted() {
            self.step()?;
        }
        Ok(())
    }

    /// Execute with cooperative cancellation and an optional step limit.
    ///
    /// The limit counts steps taken by this call, not the lifetime total.
    pub fn run_with_control(&mut self, control: &StepControl) -> Result<(), VmError> {
        let mut executed: u64 = 0;
        while !self.is_halted() {
            if control.cancel_flag.load(Ordering::Relaxed) {
                return Err(VmError::Canceled);
            }
            if let Some(max) = control.max_steps {
                if executed >= max {
                    return Err(VmError::StepLimitExceeded { limit: max });
                }
            }
            self.step()?;
            executed += 1;
        }
        Ok(())
    }

    /// Execute exactly one instruction. Does nothing once halted.
    ///
    /// The instruction pointer is advanced before the instruction runs, so a
    /// taken jump replaces the default advance.
    pub fn step(&mut self) -> Result<(), RuntimeError> {
        if self.is_halted() {
            return Ok(());
        }
        let ip = self.instruction_pointer;
        let instr = self.instructions[ip];
        self.instruction_pointer = ip + 1;
        self.steps += 1;
        self.execute(ip, instr)
    }

    fn execute(&mut self, ip: usize, instr: Instruction) -> Result<(), RuntimeError> {
        match instr {
            Instruction::MoveRight => {
                self.data_pointer += 1;
                self.grow_to_pointer();
            }
            Instruction::MoveLeft => {
                let Some(moved) = self.data_pointer.checked_sub(1) else {
                    return Err(RuntimeError::InvalidDataIndex { ip, pointer: -1 });
                };
                self.data_pointer = moved;
            }
            Instruction::Increment => {
                self.grow_to_pointer();
                let cell = &mut self.tape[self.data_pointer];
                *cell = cell.wrapping_add(1);
            }
            Instruction::Decrement => {
                self.grow_to_pointer();
                let cell = &mut self.tape[self.data_pointer];
                *cell = cell.wrapping_sub(1);
            }
            Instruction::Output => {
                let Some(value) = self.current_cell() else {
                    return Err(RuntimeError::InvalidDataIndex {
                        ip,
                        pointer: self.data_pointer as isize,
                    });
                };
                self.output.push(char::from(value));
            }
            Instruction::Input => {
                self.grow_to_pointer();
                let value = self.read_input();
                self.tape[self.data_pointer] = value;
            }
            Instruction::LoopStart { end } => {
                if self.is_current_cell_zero() {
                    self.jump(ip, end)?;
                }
            }
            Instruction::LoopEnd { start } => {
                if !self.is_current_cell_zero() {
                    self.jump(ip, start)?;
                }
            }
        }
        Ok(())
    }

    fn is_current_cell_zero(&self) -> bool {
        self.current_cell().is_none_or(|v| v == 0)
    }

    /// Resize the tape so the data pointer is a valid index. Never shrinks.
    fn grow_to_pointer(&mut self) {
        if self.data_pointer >= self.tape.len() {
            self.tape.resize(self.data_pointer + 1, 0);
        }
    }

    /// Next input byte, or 0 once input is exhausted. Characters that do not
    /// fit in a byte cell read as 0 but still consume their slot.
    fn read_input(&mut self) -> u8 {
        let Some(&ch) = self.input.get(self.input_cursor) else {
            return 0;
        };
        self.input_cursor += 1;
        if ch.is_ascii() { ch as u8 } else { 0 }
    }

    // A target equal to the program length is the halt position.
    fn jump(&mut self, ip: usize, target: usize) -> Result<(), RuntimeError> {
        if target > self.instructions.len() {
            return Err(RuntimeError::InvalidInstructionIndex { ip, target });
        }
        self.instruction_pointer = target;
        Ok(())
    }
}

impl fmt::Display for Interpreter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let instructions = self
            .instructions
            .iter()
            .map(|i| i.to_string())
            .collect::<Vec<_>>()
            .join(" ");

        writeln!(f, "{:?}", self.tape)?;
        writeln!(f, "{}^", " ".repeat(1 + self.data_pointer * 3))?;
        writeln!(f)?;
        writeln!(f, "{instructions}")?;
        writeln!(f, "{}^", " ".repeat(self.instruction_pointer * 2))?;
        writeln!(f)?;
        writeln!(f, "{}", "-".repeat(self.tape.len() * 3))
    }
}
