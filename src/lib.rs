//! A small Brainfuck virtual machine.
//!
//! Source text is parsed once into a sequence of [`Instruction`]s whose loop
//! brackets already carry their resolved jump targets. An [`Interpreter`]
//! then executes that sequence against a growable byte tape, one `step()` at
//! a time or all at once with `run()`.
//!
//! Features and behaviors:
//! - Any character outside `><+-.,[]` is a comment.
//! - Unmatched brackets are reported before anything runs.
//! - The tape starts with 256 zeroed cells (or a supplied buffer) and grows
//!   to the right on demand; moving left of cell 0 is an error.
//! - Cells are bytes with wrapping arithmetic.
//! - Input comes from an in-memory string; past its end `,` writes 0.
//! - Output is buffered and available once the program halts.
//!
//! Quick start:
//!
//! ```
//! use bf_tape::{Interpreter, InterpreterOptions};
//!
//! let code = "++++++++[>++++[>++>+++>+++>+<<<<-]>+>+>->>+[<]<-]>>.>---.+++++++..+++.>>.<-.<.+++.------.--------.>>+.>++.";
//! let mut bf = Interpreter::from_source(code, InterpreterOptions::default()).expect("valid program");
//! bf.run().expect("program should run");
//! assert_eq!(bf.output(), "Hello World!\n");
//! ```
//!
//! Callers that need to bound runaway programs can drive [`Interpreter::step`]
//! themselves, or use [`Interpreter::run_with_control`] with a [`StepControl`].

pub mod cli_util;
pub mod commands;
pub mod config;
pub mod error;
pub mod instruction;
pub mod interpreter;
pub mod logging;
pub mod parser;
pub mod repl;
pub mod theme;
pub mod trace;

pub use error::{ParseError, RuntimeError, VmError};
pub use instruction::Instruction;
pub use interpreter::{Interpreter, InterpreterOptions, StepControl, DEFAULT_MEMORY_SIZE};
pub use parser::{parse, parse_with_offsets, ParsedProgram};
