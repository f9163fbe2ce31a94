mod files;
mod highlighter;
mod host;
mod validator;

use std::io::BufRead;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use kerbo::{CpuOptions, Session, compile_program, render_error};
use miette::{IntoDiagnostic, Result};
use reedline::{
    DefaultCompleter, DefaultPrompt, DefaultPromptSegment, DescriptionMode, EditCommand, Emacs,
    IdeMenu, KeyCode, KeyModifiers, Keybindings, MenuBuilder, Reedline, ReedlineEvent,
    ReedlineMenu, Signal, default_emacs_keybindings,
};
use tracing::{debug, warn};

use crate::highlighter::KerboHighlighter;
use crate::host::TerminalHost;
use crate::validator::BlockValidator;

/// Kerbo - KerboScript compiler and virtual machine
#[derive(Parser, Debug)]
#[command(name = "kerbo")]
#[command(about = "Run KerboScript programs", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Script file to run (if not provided, reads from stdin)
    file: Option<PathBuf>,

    /// Line to execute in the interpreter instead of a file
    #[arg(short = 'e', long)]
    execute: Option<String>,

    /// Instructions per tick, shared between triggers and the mainline
    #[arg(long, default_value_t = 200)]
    instructions_per_update: usize,

    /// Maximum number of stack entries
    #[arg(long, default_value_t = 1000)]
    max_stack_depth: usize,

    /// Allow NaN and Infinity on the stack
    #[arg(long)]
    no_safe_mode: bool,

    /// Stack entries included in fault reports
    #[arg(long, default_value_t = 15)]
    stack_dump_lines: usize,

    /// Simulated seconds per tick
    #[arg(long, default_value_t = 0.02)]
    tick: f64,

    /// Abort after this many ticks without going idle
    #[arg(long)]
    max_ticks: Option<u64>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile a script to a bytecode file without running it
    Compile {
        input: PathBuf,

        /// Output file (defaults to the input with a .ksm extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the linked opcodes
        #[arg(long)]
        listing: bool,
    },
}

impl Args {
    fn cpu_options(&self) -> CpuOptions {
        CpuOptions {
            instructions_per_update: self.instructions_per_update,
            max_stack_depth: self.max_stack_depth,
            safe_mode: !self.no_safe_mode,
            stack_dump_lines: self.stack_dump_lines,
        }
    }
}

fn add_menu_keybindings(keybindings: &mut Keybindings) {
    keybindings.add_binding(
        KeyModifiers::NONE,
        KeyCode::Tab,
        ReedlineEvent::UntilFound(vec![
            ReedlineEvent::Menu("completion_menu".to_string()),
            ReedlineEvent::MenuNext,
        ]),
    );
    keybindings.add_binding(
        KeyModifiers::ALT,
        KeyCode::Enter,
        ReedlineEvent::Edit(vec![EditCommand::InsertNewline]),
    );
}

fn setup_reedline() -> (Reedline, DefaultPrompt) {
    let commands: Vec<String> = [
        "print", "set", "lock", "unlock", "wait", "until", "when", "then", "declare",
        "parameter", "toggle", "run", "unset", "stage",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    let completer = Box::new({
        let mut completions = DefaultCompleter::with_inclusions(&['-', '_']);
        completions.insert(commands);
        completions
    });

    let ide_menu = IdeMenu::default()
        .with_name("completion_menu")
        .with_min_completion_width(0)
        .with_max_completion_width(50)
        .with_max_completion_height(u16::MAX)
        .with_padding(0)
        .with_cursor_offset(0)
        .with_description_mode(DescriptionMode::PreferRight)
        .with_min_description_width(0)
        .with_max_description_width(50)
        .with_description_offset(1)
        .with_correct_cursor_pos(false);

    let completion_menu = Box::new(ide_menu);

    let mut keybindings = default_emacs_keybindings();
    add_menu_keybindings(&mut keybindings);

    let edit_mode = Box::new(Emacs::new(keybindings));

    let line_editor = Reedline::create()
        .with_highlighter(Box::new(KerboHighlighter))
        .with_validator(Box::new(BlockValidator))
        .with_completer(completer)
        .with_menu(ReedlineMenu::EngineCompleter(completion_menu))
        .with_edit_mode(edit_mode);

    let prompt = DefaultPrompt::new(
        DefaultPromptSegment::Basic("kerbo".to_string()),
        DefaultPromptSegment::Empty,
    );

    (line_editor, prompt)
}

/// Tick until the mainline goes idle. Faults were already printed by the
/// CPU through the host.
fn run_until_idle(session: &mut Session, tick: f64, max_ticks: Option<u64>) {
    let mut ticks = 0u64;
    while !session.is_idle() {
        if let Err(e) = session.update(tick) {
            debug!(error = %e, "tick ended with a fault");
        }
        ticks += 1;
        if max_ticks.is_some_and(|max| ticks >= max) {
            warn!(ticks, "tick limit reached");
            session.cpu_mut().break_execution(true);
            break;
        }
    }
}

fn interpret_input(session: &mut Session, input: &str, args: &Args) {
    if input.trim().is_empty() {
        return;
    }
    match session.execute(input) {
        Ok(()) => run_until_idle(session, args.tick, args.max_ticks),
        Err(e) => render_error(&e),
    }
}

fn compile_file(input: &Path, output: Option<&Path>, listing: bool) -> Result<()> {
    let source = std::fs::read_to_string(input).into_diagnostic()?;
    let program = match compile_program(&source) {
        Ok(program) => program,
        Err(e) => {
            render_error(&e);
            return Err(miette::miette!("compilation of {} failed", input.display()));
        }
    };
    if listing {
        print!("{}", program.listing());
    }
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| input.with_extension("ksm"));
    let bytes = program.to_bytes().into_diagnostic()?;
    std::fs::write(&output, &bytes).into_diagnostic()?;
    println!("Wrote {} ({} bytes)", output.display(), bytes.len());
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging subscriber
    use tracing_subscriber::{EnvFilter, fmt};

    // Use RUST_LOG environment variable to control log level
    // Default to WARN if not set
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("warn"))
        .into_diagnostic()?;

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if let Some(Command::Compile {
        input,
        output,
        listing,
    }) = &args.command
    {
        return compile_file(input, output.as_deref(), *listing);
    }

    let mut session = Session::new(args.cpu_options(), TerminalHost::new());
    let base = match args.file.as_ref().and_then(|file| file.parent()) {
        Some(parent) => parent.to_path_buf(),
        None => std::env::current_dir().into_diagnostic()?,
    };
    files::register_run(session.cpu_mut(), base);

    if let Some(file) = &args.file {
        let source = std::fs::read_to_string(file).into_diagnostic()?;
        match session.run_file_source(&source) {
            Ok(()) => run_until_idle(&mut session, args.tick, args.max_ticks),
            Err(e) => render_error(&e),
        }
        return Ok(());
    }

    if let Some(line) = &args.execute {
        interpret_input(&mut session, line, &args);
        return Ok(());
    }

    // Otherwise, check if we're in interactive or pipe mode
    let is_interactive = atty::is(atty::Stream::Stdin);

    if is_interactive {
        let (mut line_editor, prompt) = setup_reedline();

        println!("Kerbo REPL - End statements with a period (Ctrl+D or Ctrl+C to exit)");

        loop {
            let sig = match line_editor.read_line(&prompt) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("Reedline error: {e}");
                    return Ok(());
                }
            };

            match sig {
                Signal::Success(buffer) => interpret_input(&mut session, &buffer, &args),
                Signal::CtrlD | Signal::CtrlC => {
                    println!("\nGoodbye!");
                    return Ok(());
                }
            }
        }
    } else {
        // Pipe/stdin mode
        let stdin = std::io::stdin();
        let reader = BufReader::new(stdin.lock());

        for line in reader.lines() {
            let line = match line {
                Ok(l) => l,
                Err(e) => {
                    eprintln!("Error reading line from stdin: {}", e);
                    return Ok(());
                }
            };

            interpret_input(&mut session, &line, &args);
        }
    }

    Ok(())
}
