//! Command-line interface for depscan.
//!
//! Surface: a root directory, one or more file patterns, and `/x` display
//! options mixed in with the patterns:
//!
//! - `/m` metrics table, `/s` file sizes, `/a` AST dump
//! - `/r` result channel (always on; accepted for compatibility),
//!   `/d` demo channel, `/b` debug channel
//! - `/f` tee every enabled channel to `logFile.txt` in the root
//! - `/j` export the dependency table as JSON
//!
//! The metric summary and the dependency table are always shown.

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::Parser;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

use crate::analysis::{collect_rows, SummaryLimits};
use crate::analyze::Analyzer;
use crate::discover;
use crate::error::AnalyzeError;
use crate::report;
use crate::sink::LogSinks;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_ERROR: i32 = 1;

/// Type-based dependency analysis over C-family sources.
///
/// Discovers files under a root directory by pattern, parses them into one
/// abstract syntax tree of named scopes, computes structural metrics and
/// derives a file-to-file dependency table from the user-defined types each
/// file mentions versus defines.
#[derive(Parser)]
#[command(name = "depscan")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Root directory containing the sources to analyze
    pub path: PathBuf,

    /// File patterns (*.h *.cpp *.cs ...) and /x display options
    #[arg(allow_hyphen_values = true)]
    pub args: Vec<String>,
}

/// Parsed `/x` options, with the display options in the order given.
#[derive(Debug, Default, Clone)]
pub struct Options {
    pub metrics: bool,
    pub sizes: bool,
    pub ast: bool,
    pub result: bool,
    pub demo: bool,
    pub debug: bool,
    pub log_file: bool,
    pub json: bool,
    pub display_order: Vec<char>,
}

/// Split the free arguments into file patterns and options.
pub fn split_args(args: &[String]) -> Result<(Vec<String>, Options), AnalyzeError> {
    let mut patterns = Vec::new();
    let mut opts = Options::default();

    for arg in args {
        let Some(flag) = arg.strip_prefix('/') else {
            patterns.push(arg.clone());
            continue;
        };
        match flag.chars().next() {
            Some('m') => {
                opts.metrics = true;
                opts.display_order.push('m');
            }
            Some('s') => {
                opts.sizes = true;
                opts.display_order.push('s');
            }
            Some('a') => {
                opts.ast = true;
                opts.display_order.push('a');
            }
            Some('r') => opts.result = true,
            Some('d') => opts.demo = true,
            Some('b') => opts.debug = true,
            Some('f') => opts.log_file = true,
            Some('j') => opts.json = true,
            other => {
                let shown = other.map(|c| c.to_string()).unwrap_or_default();
                eprintln!("Warning: unknown option /{}", shown);
            }
        }
    }

    if patterns.is_empty() {
        return Err(AnalyzeError::Usage(
            "at least one file pattern is required (e.g. *.h *.cpp *.cs)".to_string(),
        ));
    }
    Ok((patterns, opts))
}

fn print_usage() {
    eprintln!("Usage: depscan <path> <patterns...> [/options]");
    eprintln!("  path       root directory containing the files to analyze");
    eprintln!("  patterns   one or more file patterns, e.g. *.h *.cpp *.cs");
    eprintln!("  options, each prefixed with '/':");
    eprintln!("    m  display function/scope metrics");
    eprintln!("    s  display file sizes");
    eprintln!("    a  display the abstract syntax tree");
    eprintln!("    r  result output (always on)");
    eprintln!("    d  demo output (processing commentary)");
    eprintln!("    b  debug output (diagnostics)");
    eprintln!("    f  also write all enabled output to logFile.txt in the root");
    eprintln!("    j  export the dependency table as JSON");
    eprintln!("  The metric summary and the dependency table are always shown.");
}

/// Run a full analysis per the command line. Returns the process exit code.
pub fn run(cli: &Cli) -> anyhow::Result<i32> {
    let (patterns, opts) = match split_args(&cli.args) {
        Ok(split) => split,
        Err(e) => {
            eprintln!("Error: {}", e);
            print_usage();
            return Ok(EXIT_ERROR);
        }
    };

    // resolve the root up front; a bad path ends the run
    let root = match cli.path.canonicalize() {
        Ok(p) if p.is_dir() => p,
        _ => {
            eprintln!("Error: {}", AnalyzeError::Path(cli.path.clone()));
            return Ok(EXIT_ERROR);
        }
    };

    let mut sinks = LogSinks::new(opts.demo, opts.debug);
    if opts.log_file {
        match sinks.attach_file(&root) {
            Ok(path) => sinks.demo(&format!("logging to {}", path.display())),
            Err(e) => eprintln!("Warning: couldn't open log file for writing: {}", e),
        }
    }

    // echo what we were asked to do
    sinks.result(&format!("  Path: {}", root.display()));
    sinks.result(&format!("  Args: {}", cli.args.join(", ")));

    let files = match discover::discover(&root, &patterns) {
        Ok(files) => files,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };
    sinks.demo(&format!(
        "found {} file(s) in {} director(ies)",
        files.num_files, files.num_dirs
    ));
    if files.is_empty() {
        eprintln!("{}", "Warning: no files matched the given patterns".yellow());
    }

    // parse with a progress bar for larger corpora
    let interactive = std::io::stderr().is_terminal();
    let analysis = if interactive && files.num_files > 10 {
        let pb = ProgressBar::new(files.num_files as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} files ({eta})")
                .unwrap()
                .progress_chars("#>-"),
        );
        let pb_clone = pb.clone();
        let analyzer = Analyzer::new().with_progress(move |done, _total| {
            pb_clone.set_position(done as u64);
        });
        let analysis = analyzer.run(&files, &sinks);
        pb.finish_and_clear();
        analysis
    } else {
        Analyzer::new().run(&files, &sinks)
    };

    let rows = collect_rows(&analysis.ast);

    // optional displays, in the order the options were given
    for display in &opts.display_order {
        match display {
            'm' => report::write_metrics(&analysis.ast, &rows, &sinks),
            'a' => report::write_ast(&analysis.ast, &sinks),
            's' => report::write_slocs(&files, &analysis.sloc, &sinks),
            _ => {}
        }
    }

    // the summary and the dependency table are the point of the run
    report::write_metric_summary(&analysis.ast, &rows, SummaryLimits::default(), &sinks);
    report::write_dependencies(&analysis.dependencies, &sinks);
    if opts.json {
        report::write_dependencies_json(&root, &analysis.dependencies, &sinks)?;
    }

    Ok(EXIT_SUCCESS)
}
