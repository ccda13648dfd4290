use bf_tape::commands::{repl, run};
use bf_tape::config;
use bf_tape::logging::init_logging;
use bf_tape::repl::ModeFlagOverride;
use clap::{Parser, Subcommand};
use std::env;
use std::io::{self, Write};

fn print_top_usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} <SCRIPT>                          # Run the Brainfuck program in SCRIPT
  {0}                                   # Start a REPL (bare mode when stdin is piped)
  {0} run  [OPTIONS] "<code>"           # Run Brainfuck code (args are concatenated)
  {0} run  [OPTIONS] --file <PATH>      # Run Brainfuck code loaded from file
  {0} repl [--bare|--editor]            # Start a Brainfuck REPL (read-eval-print loop)

Run "{0} <subcommand> --help" for more info.
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}

#[derive(Parser, Debug)]
#[command(
    name = "bf",
    disable_help_flag = true,
    disable_help_subcommand = true,
    args_conflicts_with_subcommands = true
)]
struct Cli {
    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    help: bool,

    /// Brainfuck program file to run
    #[arg(value_name = "SCRIPT")]
    script: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    Run(run::RunArgs),
    Repl(repl::ReplArgs),
}

fn main() {
    init_logging();

    // We still pull the program name for help rendering consistency
    let program = env::args().next().unwrap_or_else(|| String::from("bf"));

    let cli = Cli::parse();

    if cli.help {
        print_top_usage_and_exit(&program, 0);
    }

    let settings = config::settings();

    let code = match (cli.command, cli.script) {
        (Some(Command::Run(args)), _) => run::run(&program, args, settings),
        (Some(Command::Repl(args)), _) => {
            let mode_flag = args.mode_flag();
            repl::run(&program, args.help, mode_flag, settings)
        }
        (None, Some(path)) => run::run_script(&program, &path, settings),
        (None, None) => repl::run(&program, false, ModeFlagOverride::None, settings),
    };

    std::process::exit(code);
}
