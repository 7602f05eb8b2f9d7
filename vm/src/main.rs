use clap::Parser as ClapParser;
use std::{
    fs,
    io::{self, Write},
    process,
};

use object::Value;
use vm::{interpreter::RuntimeError, Error, Runtime};

#[derive(ClapParser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input source files to execute in order
    #[arg(required = false, help = "The .self files to execute")]
    files: Vec<String>,

    /// Start REPL after executing files (default if no files)
    #[arg(long, help = "Force REPL mode after file execution")]
    repl: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let mut rt = Runtime::new();

    for filename in &cli.files {
        let source = match fs::read_to_string(filename) {
            Ok(content) => content,
            Err(err) => {
                eprintln!("Error reading file '{}': {}", filename, err);
                process::exit(1);
            }
        };

        match rt.execute(&source) {
            Ok(value) => println!("{}", print_string(&mut rt, value)),
            Err(err) => {
                eprintln!("Error executing {}: {}", filename, err);
                process::exit(1);
            }
        }
    }

    if cli.repl || cli.files.is_empty() {
        run_repl(&mut rt);
    }
}

fn run_repl(rt: &mut Runtime) {
    println!("selva REPL");
    println!("Type 'exit' to quit.");

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut input = String::new();

    loop {
        print!("> ");
        if let Err(err) = stdout.flush() {
            eprintln!("Error flushing stdout: {}", err);
            break;
        }

        input.clear();
        match stdin.read_line(&mut input) {
            Ok(0) => break,
            Ok(_) => {
                let line = input.trim();
                if line == "exit" {
                    break;
                }
                if line.is_empty() {
                    continue;
                }

                // Failures are printed and the loop continues; the
                // interpreter itself never recovers anything.
                match rt.execute(line) {
                    Ok(value) => println!("{}", print_string(rt, value)),
                    Err(err) => eprintln!("Error: {}", err),
                }
            }
            Err(err) => {
                eprintln!("Error reading input: {}", err);
                break;
            }
        }
    }
}

/// Ask the value to print itself; fall back to the raw display form
/// with a marker when it doesn't understand `printString`.
fn print_string(rt: &mut Runtime, value: Value) -> String {
    match rt.send("printString", &[value.clone()]) {
        Ok(Value::Str(text)) => text.to_string(),
        Ok(other) => other.to_string(),
        Err(RuntimeError::UnknownMessageSend(_)) => {
            format!("{} (no printString)", value)
        }
        Err(err) => format!("{} (printString failed: {})", value, Error::Runtime(err)),
    }
}
