//! End-to-end analysis runner.
//!
//! Runs the passes in their required order: parse (headers, then C++
//! implementations, then C#), complexity evaluation, type table
//! construction, dependency resolution. The repository is mutated only by
//! the parse pass; everything downstream reads it frozen.

use std::collections::BTreeMap;

use crate::analysis::{complexity_eval, DependencyTable, TypeTable};
use crate::ast::Ast;
use crate::discover::FileSet;
use crate::error::AnalyzeError;
use crate::parser::{parse_file, Repository};
use crate::sink::LogSinks;

/// Everything the displays consume.
pub struct Analysis {
    pub ast: Ast,
    /// Source lines per file, keyed by base name.
    pub sloc: BTreeMap<String, usize>,
    pub types: TypeTable,
    pub dependencies: DependencyTable,
}

/// Callback reporting (files processed, files total) during the parse pass.
pub type ProgressCallback = Box<dyn Fn(usize, usize)>;

/// Drives a full analysis over a discovered file set.
#[derive(Default)]
pub struct Analyzer {
    progress: Option<ProgressCallback>,
}

impl Analyzer {
    pub fn new() -> Self {
        Self { progress: None }
    }

    /// Report per-file progress through `callback`.
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(usize, usize) + 'static,
    {
        self.progress = Some(Box::new(callback));
        self
    }

    /// Run every pass over `files`.
    pub fn run(&self, files: &FileSet, sinks: &LogSinks) -> Analysis {
        let ordered = files.ordered();
        let total = ordered.len();

        let mut repo = Repository::new();
        for (done, file) in ordered.iter().enumerate() {
            sinks.demo(&format!("opening file {}", file.display()));
            match parse_file(&mut repo, sinks, file) {
                Ok(_) => {}
                Err(AnalyzeError::Io { path, source }) => {
                    sinks.result(&format!("  could not open file {}: {}", path.display(), source));
                }
                Err(e) => sinks.debug(&e.to_string()),
            }
            if let Some(callback) = &self.progress {
                callback(done + 1, total);
            }
        }

        let mut ast = repo.ast;
        let sloc = repo.sloc;
        complexity_eval(&mut ast);
        let types = TypeTable::build(&ast, sinks);
        let dependencies = DependencyTable::resolve(&ordered, &types, sinks);

        Analysis {
            ast,
            sloc,
            types,
            dependencies,
        }
    }
}
