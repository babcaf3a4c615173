use std::{
    collections::HashMap,
    fs,
    io::{self, BufRead, Write},
    thread,
};

use clap::Parser;
use lilt::{
    EvaluateOptions, evaluate,
    interpreter::{
        evaluator::{function::core::prelude, scope::Scope},
        value::core::Value,
    },
    parse_module, run_source,
};
use tracing_subscriber::EnvFilter;

/// lilt is a small indentation-sensitive expression language with
/// juxtaposition calls, named and flag arguments, and generic functions.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Tells lilt to look at a file instead of a script.
    #[arg(short, long)]
    file: bool,

    /// Pipe mode automatically prints out the value of the last statement of
    /// a lilt script.
    #[arg(short, long)]
    pipe_mode: bool,

    /// Starts an interactive session. Lines ending in ':' open a block that
    /// is closed by an empty line.
    #[arg(short, long)]
    repl: bool,

    #[arg(required_unless_present = "repl")]
    contents: Option<String>,
}

/// Stack size of the thread programs run on. Every interpreted call recurses
/// on the native stack, up to the interpreter's call depth limit.
const INTERPRETER_STACK_SIZE: usize = 256 * 1024 * 1024;

fn main() {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env())
                             .with_writer(io::stderr)
                             .init();

    let args = Args::parse();

    let worker = thread::Builder::new().name("lilt".to_string())
                                       .stack_size(INTERPRETER_STACK_SIZE)
                                       .spawn(move || run(args));
    match worker {
        Ok(worker) => {
            if worker.join().is_err() {
                std::process::exit(1);
            }
        },
        Err(e) => {
            eprintln!("Failed to start the interpreter: {e}");
            std::process::exit(1);
        },
    }
}

fn run(args: Args) {
    if args.repl {
        repl();
        return;
    }

    let contents = args.contents.unwrap_or_default();
    let script = if args.file {
        fs::read_to_string(&contents).unwrap_or_else(|_| {
                                         eprintln!("Failed to read the input file '{contents}'. \
                                                    Perhaps this file does not exist?");
                                         std::process::exit(1);
                                     })
    } else {
        contents
    };

    if let Err(e) = run_source(&script, args.pipe_mode) {
        eprintln!("{}", e.render(&script));
        std::process::exit(1);
    }
}

/// Reads entries from standard input and evaluates each against the scope
/// left by the previous successful entry.
fn repl() {
    let mut scope = Scope::with_globals(prelude());
    let mut buffer = String::new();
    let stdin = io::stdin();

    loop {
        print!("{}", if buffer.is_empty() { "> " } else { ". " });
        if io::stdout().flush().is_err() {
            return;
        }

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => return,
            Ok(_) => {},
            Err(e) => {
                eprintln!("{e}");
                return;
            },
        }
        let line = line.trim_end_matches(['\n', '\r']);

        let opens_block = line.trim_end().ends_with(':');
        if opens_block || (!buffer.is_empty() && !line.trim().is_empty()) {
            buffer.push_str(line);
            buffer.push('\n');
            continue;
        }
        buffer.push_str(line);
        let source = std::mem::take(&mut buffer);
        if source.trim().is_empty() {
            continue;
        }

        if let Some(next) = run_entry(&source, &scope) {
            scope = next;
        }
    }
}

/// Evaluates one entry against a copy of `scope`, so a failing entry leaves
/// the session unchanged.
fn run_entry(source: &str, scope: &Scope) -> Option<Scope> {
    let names: Vec<&str> = scope.global_names().collect();
    let result = parse_module(source, &names).and_then(|module| {
                     evaluate(&module,
                              EvaluateOptions { scope:           Some(scope.clone()),
                                                initial_globals: HashMap::new(), })
                 });

    match result {
        Ok(evaluation) => {
            if evaluation.value != Value::None {
                println!("{}", evaluation.value);
            }
            Some(evaluation.scope)
        },
        Err(e) => {
            eprintln!("{}", e.render(source));
            None
        },
    }
}
