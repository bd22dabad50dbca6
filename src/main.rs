//! depscan CLI entry point.

use clap::Parser;
use depscan::cli::{self, Cli, EXIT_ERROR};

fn main() {
    // bad arguments exit 1, like every other fatal error
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            std::process::exit(if e.use_stderr() { EXIT_ERROR } else { 0 });
        }
    };

    let exit_code = match cli::run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            EXIT_ERROR
        }
    };

    std::process::exit(exit_code);
}
