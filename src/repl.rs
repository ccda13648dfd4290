use std::env;
use std::io::{self, IsTerminal, Write};

use nu_ansi_term::Style;
use reedline::{DefaultPrompt, DefaultPromptSegment, Highlighter, Reedline, Signal, StyledText};

use crate::commands::run::{execute, RunRequest};
use crate::config::Settings;
use crate::instruction::bf_only;

const META_HELP: &str = "Meta commands:\n  :exit   Exit the REPL\n  :help   Show this help\n\nEvery other line is run as a fresh program.";

/// Interactive loop: every submitted line is parsed and run as its own
/// program on a fresh tape.
pub fn repl_loop(settings: &Settings) -> io::Result<()> {
    let mut editor = Reedline::create()
        .with_highlighter(Box::new(BrainfuckHighlighter::new_catppuccin_mocha()));
    let prompt = DefaultPrompt::new(DefaultPromptSegment::Basic("bf".to_string()), DefaultPromptSegment::Empty);

    loop {
        let line = match editor.read_line(&prompt) {
            Ok(Signal::Success(buffer)) => buffer,
            Ok(_) => {
                // Ctrl+C / Ctrl+D: end the session cleanly
                println!();
                io::stdout().flush()?;
                return Ok(());
            }
            Err(e) => {
                eprintln!("repl: editor error: {e}");
                let _ = io::stderr().flush();
                return Ok(());
            }
        };

        match line.trim() {
            ":exit" => return Ok(()),
            ":help" => {
                eprintln!("{META_HELP}");
                let _ = io::stderr().flush();
                continue;
            }
            _ => {}
        }

        if !submit(&line, settings) {
            continue;
        }

        // Test hook: if BF_REPL_ONCE=1, exit after one execution
        if env::var("BF_REPL_ONCE").ok().as_deref() == Some("1") {
            return Ok(());
        }
    }
}

/// Run `submission` unless it holds no instructions. Returns whether it ran.
fn submit(submission: &str, settings: &Settings) -> bool {
    let trimmed = submission.trim();
    if bf_only(trimmed).is_empty() {
        return false;
    }
    let mut request = RunRequest::from_settings(trimmed.to_string(), settings);
    // stdin carries the program itself here, so `,` always sees exhausted input
    request.input = Some(String::new());
    // Program errors are reported by `execute`; the session keeps going.
    let _ = execute(None, request);
    true
}

pub fn read_submission<R: io::BufRead>(stdin: &mut R) -> Option<String> {
    // Collect all lines until EOF
    let mut buffer = String::new();

    loop {
        let mut line = String::new();
        match stdin.read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => buffer.push_str(&line),
            Err(e) => {
                tracing::warn!(error = %e, "stopped reading submission");
                return None;
            }
        }
    }

    if buffer.is_empty() {
        None
    } else {
        Some(buffer)
    }
}

/// Bare mode: read stdin until EOF and run it once.
pub fn execute_bare_once(settings: &Settings) -> io::Result<()> {
    let submission = {
        let mut locked = io::BufReader::new(io::stdin().lock());
        read_submission(&mut locked)
    };
    if let Some(s) = submission {
        submit(&s, settings);
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplMode {
    Bare,
    Editor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeFlagOverride {
    None,
    Bare,
    Editor,
}

/// Pick a mode: flags, then `BF_REPL_MODE`, then whether stdin is a TTY.
pub fn select_mode(flag: ModeFlagOverride) -> Result<ReplMode, String> {
    resolve_mode(flag, env::var("BF_REPL_MODE").ok().as_deref(), io::stdin().is_terminal())
}

fn resolve_mode(flag: ModeFlagOverride, env_mode: Option<&str>, stdin_tty: bool) -> Result<ReplMode, String> {
    match flag {
        ModeFlagOverride::Bare => return Ok(ReplMode::Bare),
        ModeFlagOverride::Editor => {
            if !stdin_tty {
                return Err("cannot start editor: stdin is not a TTY (use --bare or BF_REPL_MODE=bare)".to_string());
            }
            return Ok(ReplMode::Editor);
        }
        ModeFlagOverride::None => {}
    }

    if let Some(val) = env_mode {
        return match val.trim().to_ascii_lowercase().as_str() {
            "bare" => Ok(ReplMode::Bare),
            "editor" if stdin_tty => Ok(ReplMode::Editor),
            "editor" => Err("cannot start editor: stdin is not a TTY (use BF_REPL_MODE=bare)".to_string()),
            _ => Err(format!("invalid BF_REPL_MODE value: {val}, must be 'bare' or 'editor'")),
        };
    }

    if stdin_tty { Ok(ReplMode::Editor) } else { Ok(ReplMode::Bare) }
}

#[derive(Default)]
struct BrainfuckHighlighter {
    movement: Style,
    data: Style,
    io: Style,
    flow: Style,
    other: Style,
}

impl BrainfuckHighlighter {
    fn new_catppuccin_mocha() -> Self {
        use crate::theme::catppuccin::Mocha as P;

        // > <   => SKY (movement)
        // + -   => GREEN (data modification)
        // . ,   => YELLOW (I/O)
        // [ ]   => MAUVE (flow control)
        Self {
            movement: Style::new().fg(P::SKY).bold(),
            data: Style::new().fg(P::GREEN).bold(),
            io: Style::new().fg(P::YELLOW).bold(),
            flow: Style::new().fg(P::MAUVE).bold(),
            other: Style::new().fg(P::SURFACE2),
        }
    }

    #[inline]
    fn style_for(&self, ch: char) -> Style {
        match ch {
            '>' | '<' => self.movement,
            '+' | '-' => self.data,
            '.' | ',' => self.io,
            '[' | ']' => self.flow,
            _ => self.other,
        }
    }
}

impl Highlighter for BrainfuckHighlighter {
    fn highlight(&self, line: &str, _cursor: usize) -> StyledText {
        let mut out: StyledText = StyledText::new();
        let mut current_style: Option<Style> = None;
        let mut buffer = String::new();

        for ch in line.chars() {
            let style = self.style_for(ch);
            match current_style {
                Some(s) if s != style => {
                    out.push((s, std::mem::take(&mut buffer)));
                }
                _ => {}
            }
            current_style = Some(style);
            buffer.push(ch);
        }

        if let Some(s) = current_style {
            if !buffer.is_empty() {
                out.push((s, buffer));
            }
        }
        out
    }
}
