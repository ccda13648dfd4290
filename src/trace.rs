//! Step-by-step execution tables for `--debug`.

use std::io::Write;
use std::sync::atomic::Ordering;

use crate::error::VmError;
use crate::instruction::Instruction;
use crate::interpreter::{Interpreter, StepControl};

const HEADER: &str = "STEP | IP  | PTR | CELL | INSTR | ACTION";
const RULE: &str = "-----+-----+-----+------+-------+------------------------------------------------";

/// Drive `vm` to completion one step at a time, writing a table row per
/// executed instruction to `out`.
///
/// The machine state advances exactly as it would under `run()`; the
/// program's own output stays buffered in the interpreter.
pub fn run_debug<W: Write>(vm: &mut Interpreter, out: &mut W, control: Option<&StepControl>) -> Result<(), VmError> {
    writeln!(out, "{HEADER}")?;
    writeln!(out, "{RULE}")?;

    let mut step: u64 = 0;
    while !vm.is_halted() {
        if let Some(ctrl) = control {
            if ctrl.cancel_flag.load(Ordering::Relaxed) {
                return Err(VmError::Canceled);
            }
            if let Some(max) = ctrl.max_steps {
                if step >= max {
                    return Err(VmError::StepLimitExceeded { limit: max });
                }
            }
        }

        let ip = vm.instruction_pointer();
        let instr = vm.instructions()[ip];
        let ptr_before = vm.data_pointer();
        let cell_before = vm.current_cell().unwrap_or(0);
        let cursor_before = vm.input_cursor();

        if let Err(err) = vm.step() {
            writeln!(
                out,
                "{:<4} | {:<3} | {:<3} | {:<4} |  {}    | Error: {}",
                step, ip, ptr_before, cell_before, instr, err
            )?;
            return Err(err.into());
        }

        let action = match instr {
            Instruction::MoveRight | Instruction::MoveLeft => {
                format!("Moved pointer head to index {}", vm.data_pointer())
            }
            Instruction::Increment => format!(
                "Increment cell[{}] from {} to {}",
                ptr_before,
                cell_before,
                vm.current_cell().unwrap_or(0)
            ),
            Instruction::Decrement => format!(
                "Decrement cell[{}] from {} to {}",
                ptr_before,
                cell_before,
                vm.current_cell().unwrap_or(0)
            ),
            Instruction::Output => format!("Output byte {} {:?}", cell_before, char::from(cell_before)),
            Instruction::Input if vm.input_cursor() > cursor_before => {
                format!("Read input -> {}", vm.current_cell().unwrap_or(0))
            }
            Instruction::Input => "Input exhausted -> 0".to_string(),
            Instruction::LoopStart { end } if cell_before == 0 => {
                format!("Cell is 0; jump forward to IP {end}")
            }
            Instruction::LoopStart { .. } => "Enter loop (cell != 0)".to_string(),
            Instruction::LoopEnd { start } if cell_before != 0 => {
                format!("Cell != 0; jump back to IP {start}")
            }
            Instruction::LoopEnd { .. } => "Exit loop (cell is 0)".to_string(),
        };

        writeln!(
            out,
            "{:<4} | {:<3} | {:<3} | {:<4} |  {}    | {}",
            step, ip, ptr_before, cell_before, instr, action
        )?;
        step += 1;
    }

    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::InterpreterOptions;
    use std::sync::{atomic::AtomicBool, Arc};

    fn trace(source: &str, options: InterpreterOptions) -> (Result<(), VmError>, String, Interpreter) {
        let mut vm = Interpreter::from_source(source, options).unwrap();
        let mut out = Vec::new();
        let res = run_debug(&mut vm, &mut out, None);
        (res, String::from_utf8(out).unwrap(), vm)
    }

    #[test]
    fn prints_header_and_one_row_per_step() {
        let (res, table, _) = trace(">", InterpreterOptions::default());
        assert!(res.is_ok());
        assert!(table.starts_with("STEP | IP"));
        assert!(table.contains("Moved pointer head to index 1"));
        assert_eq!(table.lines().count(), 3);
    }

    #[test]
    fn describes_loop_jumps() {
        let (_, table, _) = trace("+[-]", InterpreterOptions::default());
        assert!(table.contains("Increment cell[0] from 0 to 1"));
        assert!(table.contains("Enter loop (cell != 0)"));
        assert!(table.contains("Exit loop (cell is 0)"));

        let (_, table, _) = trace("[+]", InterpreterOptions::default());
        assert!(table.contains("Cell is 0; jump forward to IP 3"));
    }

    #[test]
    fn state_matches_plain_run() {
        let source = "++[>+++<-]>.";
        let (_, _, traced) = trace(source, InterpreterOptions::default());
        let mut plain = Interpreter::from_source(source, InterpreterOptions::default()).unwrap();
        plain.run().unwrap();
        assert_eq!(traced.tape(), plain.tape());
        assert_eq!(traced.output(), plain.output());
    }

    #[test]
    fn reports_input_and_exhaustion() {
        let (_, table, _) = trace(",,", InterpreterOptions::default().with_input("A"));
        assert!(table.contains("Read input -> 65"));
        assert!(table.contains("Input exhausted -> 0"));
    }

    #[test]
    fn error_row_is_written_before_failing() {
        let (res, table, _) = trace("<", InterpreterOptions::default());
        assert!(matches!(res, Err(VmError::Runtime(_))));
        assert!(table.contains("Error: Invalid data index -1"));
    }

    #[test]
    fn honours_step_limit() {
        let mut vm = Interpreter::from_source("+[]", InterpreterOptions::default()).unwrap();
        let control = StepControl::new(Some(3), Arc::new(AtomicBool::new(false)));
        let res = run_debug(&mut vm, &mut std::io::sink(), Some(&control));
        assert!(matches!(res, Err(VmError::StepLimitExceeded { limit: 3 })));
    }
}
