//! `r8` — Rotor JavaScript front-end shell.
//!
//! Parses a source file, resolves its variables, and pretty-prints the
//! program to stdout.  With `--print-resolution` every variable reference is
//! followed by its resolved-variable tag.  Any lexical or syntax error is
//! reported on stderr with a nonzero exit code.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser as ClapParser;

use rotor_core::error::RotorResult;
use rotor_core::parser::parser::parse;
use rotor_core::parser::resolver::resolve;
use rotor_core::printer::Printer;

#[derive(ClapParser)]
#[command(name = "r8")]
#[command(version)]
#[command(about = "Rotor JavaScript front end", long_about = None)]
struct Cli {
    /// Annotate the output with resolved-variable tags.
    #[arg(long)]
    print_resolution: bool,

    /// Path to the JavaScript source file.
    input: PathBuf,
}

/// Run the whole pipeline over `source` and return the printed program.
fn run(source: &str, print_resolution: bool) -> RotorResult<String> {
    let program = parse(source)?;
    let resolution = resolve(&program);
    let printer = if print_resolution {
        Printer::with_resolution(&resolution)
    } else {
        Printer::new()
    };
    Ok(printer.print(&program))
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let source = match fs::read_to_string(&cli.input) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("r8: {}: {err}", cli.input.display());
            return ExitCode::FAILURE;
        }
    };

    match run(&source, cli.print_resolution) {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("r8: {err}");
            ExitCode::FAILURE
        }
    }
}
