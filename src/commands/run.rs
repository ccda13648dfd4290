use clap::Args;
use std::io::{self, IsTerminal, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::time::Duration;
use std::{fs, thread};

use crate::cli_util::print_vm_error;
use crate::config::{check_memory_size, Settings};
use crate::error::VmError;
use crate::instruction::Instruction;
use crate::interpreter::{Interpreter, InterpreterOptions, StepControl};
use crate::parser::parse_with_offsets;
use crate::trace::run_debug;

#[derive(Args, Debug)]
#[command(disable_help_flag = true)]
pub struct RunArgs {
    /// Print a step-by-step table of operations while executing
    #[arg(short = 'd', long = "debug")]
    pub debug: bool,

    /// Print the final tape and pointers to stderr
    #[arg(long = "dump")]
    pub dump: bool,

    /// Read Brainfuck code from PATH instead of positional "<code>"
    #[arg(short = 'f', long = "file")]
    pub file: Option<String>,

    /// Characters consumed by `,` (default: piped stdin, if any)
    #[arg(short = 'i', long = "input", value_name = "TEXT")]
    pub input: Option<String>,

    /// Initial number of tape cells (fallback BF_MEMORY_SIZE; default 256)
    #[arg(short = 'm', long = "memory-size", value_name = "N", value_parser = parse_memory_size)]
    pub memory_size: Option<usize>,

    /// Wall-clock timeout in milliseconds (fallback BF_TIMEOUT_MS; default 2_000)
    #[arg(long = "timeout", value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Maximum interpreter steps before abort (fallback BF_MAX_STEPS; default unlimited)
    #[arg(long = "max-steps", value_name = "N")]
    pub max_steps: Option<u64>,

    /// Concatenated Brainfuck code parts
    #[arg(value_name = "code", trailing_var_arg = true, allow_hyphen_values = true)]
    pub code: Vec<String>,

    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    pub help: bool,
}

/// Everything needed to run one program.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub code: String,
    /// `None` means: read piped stdin if the program uses `,`.
    pub input: Option<String>,
    pub memory_size: usize,
    pub max_steps: Option<u64>,
    pub timeout_ms: u64,
    pub debug: bool,
    pub dump: bool,
}

impl RunRequest {
    pub fn from_settings(code: String, settings: &Settings) -> Self {
        Self {
            code,
            input: None,
            memory_size: settings.memory_size,
            max_steps: settings.max_steps,
            timeout_ms: settings.timeout_ms,
            debug: false,
            dump: false,
        }
    }
}

pub fn run(program: &str, args: RunArgs, settings: &Settings) -> i32 {
    if args.help {
        usage_and_exit(program, 0);
    }

    let RunArgs {
        debug,
        dump,
        file,
        input,
        memory_size,
        timeout_ms,
        max_steps,
        code,
        ..
    } = args;

    if file.is_none() && code.is_empty() {
        usage_and_exit(program, 2);
    }

    if file.is_some() && !code.is_empty() {
        eprintln!("{program}: cannot use positional code together with --file");
        usage_and_exit(program, 2);
    }

    let code_str = if let Some(path) = file {
        match read_source_file(&path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("{program}: failed to read code file as UTF-8: {e}");
                let _ = io::stderr().flush();
                return 1;
            }
        }
    } else {
        code.join("")
    };

    // Resolve limits: flags -> env/config file -> defaults
    let mut request = RunRequest::from_settings(code_str, settings);
    request.input = input;
    request.memory_size = memory_size.unwrap_or(request.memory_size);
    request.timeout_ms = timeout_ms.unwrap_or(request.timeout_ms);
    request.max_steps = max_steps.or(request.max_steps);
    request.debug = debug;
    request.dump = dump;

    execute(Some(program), request)
}

/// Run a program file the way `bf <SCRIPT>` does.
pub fn run_script(program: &str, path: &str, settings: &Settings) -> i32 {
    match read_source_file(path) {
        Ok(code) => execute(Some(program), RunRequest::from_settings(code, settings)),
        Err(e) => {
            eprintln!("{program}: failed to read script {path}: {e}");
            let _ = io::stderr().flush();
            1
        }
    }
}

fn parse_memory_size(raw: &str) -> Result<usize, String> {
    let cells: usize = raw.parse().map_err(|e| format!("{e}"))?;
    check_memory_size(cells)
}

fn read_source_file(path: &str) -> io::Result<String> {
    fs::read_to_string(path)
}

/// Parse and execute `request`, printing program output to stdout and
/// errors to stderr. Returns the process exit code.
///
/// The program runs on a worker thread; the caller's thread enforces the
/// wall-clock timeout by raising the cancel flag.
pub fn execute(program: Option<&str>, request: RunRequest) -> i32 {
    let RunRequest { code, input, memory_size, max_steps, timeout_ms, debug, dump } = request;

    let parsed = match parse_with_offsets(&code) {
        Ok(p) => p,
        Err(e) => {
            print_vm_error(program, &code, &[], &VmError::Parse(e));
            return 1;
        }
    };

    let uses_input = parsed.instructions.contains(&Instruction::Input);
    let instructions = parsed.instructions;

    tracing::debug!(
        instructions = instructions.len(),
        memory_size,
        ?max_steps,
        timeout_ms,
        "starting program"
    );

    let cancel = Arc::new(AtomicBool::new(false));
    let control = StepControl::new(max_steps, cancel.clone());
    let (tx, rx) = mpsc::channel::<(Result<(), VmError>, Interpreter)>();

    // Reading piped stdin happens on the worker too, so the timeout covers it.
    thread::spawn(move || {
        let input = match input {
            Some(text) => text,
            None if uses_input => read_piped_stdin(),
            None => String::new(),
        };
        let options = InterpreterOptions::default()
            .with_input(input)
            .with_memory_size(memory_size);
        let mut vm = Interpreter::new(instructions, options);

        let res = if debug {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            run_debug(&mut vm, &mut out, Some(&control))
        } else {
            vm.run_with_control(&control)
        };
        let _ = tx.send((res, vm));
    });

    let exit_code = match rx.recv_timeout(Duration::from_millis(timeout_ms)) {
        Ok((res, vm)) => {
            // Partial output is still shown when the program fails.
            if vm.has_output() {
                print!("{}", vm.output());
                let _ = io::stdout().flush();
            }
            if dump {
                eprint!("{vm}");
            }
            tracing::debug!(steps = vm.steps(), "program finished");
            match res {
                Ok(()) => 0,
                Err(err) => {
                    print_vm_error(program, &code, &parsed.offsets, &err);
                    1
                }
            }
        }
        Err(mpsc::RecvTimeoutError::Timeout) => {
            cancel.store(true, Ordering::Relaxed);
            tracing::debug!(timeout_ms, "cancelled program after timeout");
            eprintln!("Execution aborted: wall-clock timeout exceeded ({timeout_ms} ms)");
            let _ = io::stderr().flush();
            1
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => 1,
    };

    // For readability, ensure output ends with a newline
    println!();
    let _ = io::stdout().flush();
    exit_code
}

/// Input sequence for `,` when none was given: piped stdin, never a TTY.
fn read_piped_stdin() -> String {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return String::new();
    }
    let mut buf = String::new();
    if let Err(e) = stdin.lock().read_to_string(&mut buf) {
        tracing::warn!(error = %e, "failed reading program input from stdin");
    }
    buf
}

fn usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} run [OPTIONS] "<code>"
  {0} run [OPTIONS] --file <PATH>

Options:
  --file,  -f <PATH>       Read Brainfuck code from PATH instead of positional "<code>"
  --input, -i <TEXT>       Characters consumed by `,` (default: piped stdin)
  --memory-size, -m <N>    Initial tape cells (default 256; the tape grows to the right)
  --max-steps <N>          Abort after N steps
  --timeout <MS>           Abort after MS milliseconds (default 2000)
  --debug, -d              Print a step-by-step table of operations
  --dump                   Print the final tape and pointers to stderr
  --help,  -h              Show this help

Notes:
- Characters outside of Brainfuck's ><+-.,[] are comments and are ignored.
- Input (`,`) past the end of the input writes 0 to the current cell.
- Output is printed once the program halts.
- Code starting with `-` is accepted as is; `--` before the code also works.

Examples:
- Load Brainfuck code from a file:
    {0} run --file ./program.bf
- Feed input to `,`:
    {0} run --input hello ",[.,]"
    {0} run ",[.,]" < input.txt
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}
