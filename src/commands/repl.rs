use std::io::{self, IsTerminal, Write};
use clap::Args;

use crate::config::Settings;
use crate::repl::{execute_bare_once, repl_loop, select_mode, ModeFlagOverride, ReplMode};

#[derive(Args, Debug)]
#[command(disable_help_flag = true)]
pub struct ReplArgs {
    /// Force non-interactive bare mode
    #[arg(long = "bare", conflicts_with = "editor")]
    pub bare: bool,

    /// Force interactive mode (errors if stdin is not a TTY)
    #[arg(long = "editor", conflicts_with = "bare")]
    pub editor: bool,

    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    pub help: bool,
}

impl ReplArgs {
    pub fn mode_flag(&self) -> ModeFlagOverride {
        if self.bare {
            ModeFlagOverride::Bare
        } else if self.editor {
            ModeFlagOverride::Editor
        } else {
            ModeFlagOverride::None
        }
    }
}

// Public entry point for the REPL from main.rs
pub fn run(program: &str, help: bool, mode_flag: ModeFlagOverride, settings: &Settings) -> i32 {
    if help {
        usage_and_exit(program, 0);
    }

    // Determine mode: flags -> env -> auto-detect via is_terminal()
    let mode = match select_mode(mode_flag) {
        Ok(m) => m,
        Err(msg) => {
            eprintln!("{program}: {msg}");
            let _ = io::stderr().flush();
            return 1;
        }
    };
    tracing::debug!(?mode, "selected REPL mode");

    // Install SIGINT (ctrl+c) handler to flush and exit(0) immediately
    if let Err(e) = ctrlc::set_handler(|| {
        let _ = io::stdout().flush();
        let _ = io::stderr().flush();
        std::process::exit(0);
    }) {
        eprintln!("{program}: failed to set ctrl+c handler: {e}");
        let _ = io::stderr().flush();
        return 1;
    }

    let result = match mode {
        ReplMode::Editor => {
            // Print banners only if stderr is a TTY
            if io::stderr().is_terminal() {
                eprintln!("Brainfuck REPL");
                eprintln!("Enter runs the line as a program. Type :help for commands, ctrl+c to exit");
                let _ = io::stderr().flush();
            }
            repl_loop(settings)
        }
        // Bare mode: read stdin until EOF, execute once, exit 0
        ReplMode::Bare => execute_bare_once(settings),
    };

    match result {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("{program}: REPL error: {e}");
            let _ = io::stderr().flush();
            1
        }
    }
}

fn usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} repl   # Start a Brainfuck REPL (read-eval-print loop)

Options:
  --help,   -h        Show this help
  --bare              Force non-interactive bare mode
  --editor            Force interactive editor mode (errors if stdin is not a TTY)

Description:
  Starts a REPL where each entered line is run as a Brainfuck program.

Meta commands (line starts with ":")
  :exit            Exit immediately (code 0)
  :help            Show the meta command list

Notes:
    - Non-Brainfuck characters are comments; lines without instructions are skipped.
    - Each execution starts with a fresh tape and pointer; `,` reads 0.
    - Ctrl+C or Ctrl+D exits the REPL.
    - The REPL will print a newline after each execution for readability.
    - The REPL will exit after a single execution if the environment variable `BF_REPL_ONCE` is set to `1`.
    - Mode selection:
        * Flags: --bare|--editor override environment and auto-detection.
        * Env: BF_REPL_MODE=bare|editor overrides auto-detection.
        * Auto-detect: if stdin is a TTY, starts in interactive editor mode; otherwise, bare mode.
        * Banners suppressed if stderr is not a TTY.
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}
