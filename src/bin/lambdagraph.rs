//! REPL / regression-harness front end.
//!
//! This binary is a collaborator of the core engine, not part of it: it
//! owns the interactive loop and the `lambda.test`/`lambda.res` comparison,
//! both wired against [`lambdagraph::Session`] through the same four
//! operations a library consumer would call directly.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::info;

use lambdagraph::{Session, SessionConfig};

/// Run the lambda-graph reduction engine.
#[derive(Parser, Debug)]
#[command(name = "lambdagraph", version, about)]
struct Cli {
    /// `0` runs the `lambda.test`/`lambda.res` regression harness, `1` runs
    /// the interactive REPL. Prompted for interactively when omitted.
    #[arg(long)]
    mode: Option<u8>,

    /// Source file of newline-separated programs for the regression harness.
    #[arg(long, default_value = "lambda.test")]
    test_file: PathBuf,

    /// Expected output, one line per `test_file` line.
    #[arg(long, default_value = "lambda.res")]
    expected_file: PathBuf,

    /// Heap capacity (nodes) for the session driving either mode.
    #[arg(long, default_value_t = SessionConfig::default().heap_size)]
    heap_size: usize,

    /// Reduction-step limit per `eval`.
    #[arg(long, default_value_t = SessionConfig::default().cycle_limit)]
    cycle_limit: usize,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let mode = match cli.mode {
        Some(m) => m,
        None => match prompt_for_mode() {
            Ok(m) => m,
            Err(e) => {
                eprintln!("lambdagraph: {e}");
                return ExitCode::FAILURE;
            }
        },
    };

    let cfg = SessionConfig {
        heap_size: cli.heap_size,
        cycle_limit: cli.cycle_limit,
        ..SessionConfig::default()
    };

    match mode {
        0 => run_regression(cfg, &cli.test_file, &cli.expected_file),
        1 => run_repl(cfg),
        other => {
            eprintln!("lambdagraph: unrecognized mode `{other}`, expected 0 or 1");
            ExitCode::FAILURE
        }
    }
}

fn prompt_for_mode() -> io::Result<u8> {
    print!("0: run regression tests\n1: interactive REPL\n> ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    line.trim()
        .parse()
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "expected `0` or `1`"))
}

/// Feed every non-blank line of `test_file` through a fresh session and
/// compare its printed result, line for line, against `expected_file`.
fn run_regression(cfg: SessionConfig, test_file: &PathBuf, expected_file: &PathBuf) -> ExitCode {
    let test_src = match fs::read_to_string(test_file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("lambdagraph: cannot read {}: {e}", test_file.display());
            return ExitCode::FAILURE;
        }
    };
    let expected_src = match fs::read_to_string(expected_file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("lambdagraph: cannot read {}: {e}", expected_file.display());
            return ExitCode::FAILURE;
        }
    };

    let tests: Vec<&str> = test_src.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    let expected: Vec<&str> = expected_src.lines().map(str::trim).collect();

    let mut session = Session::new(cfg);
    let mut passed = 0usize;
    let mut failed = 0usize;
    for (i, line) in tests.iter().enumerate() {
        session.reset_counters();
        let got = match session.reduce_lambda(line) {
            Ok(text) => text,
            Err(e) => format!("<error: {e}>"),
        };
        let want = expected.get(i).copied().unwrap_or("<missing expected line>");
        if got.trim() == want {
            passed += 1;
        } else {
            failed += 1;
            println!("FAIL[{}]: {line}\n  got:  {got}\n  want: {want}", i + 1);
        }
    }
    info!("regression: {passed} passed, {failed} failed, {} total", tests.len());
    println!("{passed} passed, {failed} failed, {} total", tests.len());
    if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Interactive read-eval-print loop. A leading `@` on a line exits.
fn run_repl(cfg: SessionConfig) -> ExitCode {
    let mut session = Session::new(cfg);
    let stdin = io::stdin();
    loop {
        print!("> ");
        if io::stdout().flush().is_err() {
            break;
        }
        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                eprintln!("lambdagraph: {e}");
                break;
            }
        }
        let line = line.trim();
        if line.starts_with('@') {
            break;
        }
        if line.is_empty() {
            continue;
        }
        match session.reduce_lambda(line) {
            Ok(text) => println!("{text}"),
            Err(e) => eprintln!("error: {e}"),
        }
    }
    ExitCode::SUCCESS
}
