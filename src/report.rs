//! Report rendering: metrics table, AST dump, SLOC summary and the
//! dependency table in text and JSON form.
//!
//! Everything here reads the analysis results; nothing mutates them.

use std::collections::BTreeMap;
use std::path::Path;

use colored::*;
use serde::{Deserialize, Serialize};

use crate::analysis::{DependencyTable, MetricsRow, SummaryLimits};
use crate::ast::{Ast, AstNode, DeclKind, ScopeKind};
use crate::discover::FileSet;
use crate::sink::LogSinks;

// column widths of the metrics table
const FILE_W: usize = 25;
const TYPE_W: usize = 12;
const NAME_W: usize = 35;
const NUM_W: usize = 8;

fn truncate(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

fn write_title(sinks: &LogSinks, text: &str) {
    sinks.result("");
    sinks.result(&format!("  {}", text.bold()));
    sinks.result(&format!("  {}", "=".repeat(text.len())));
}

fn header(sinks: &LogSinks) {
    sinks.result(&format!(
        " {:>FILE_W$}{:>TYPE_W$}{:>NAME_W$}{:>NUM_W$}{:>NUM_W$}{:>NUM_W$}",
        "file name", "type", "name", "line", "size", "cplx"
    ));
    sinks.result(&format!(
        " {:>FILE_W$}{:>TYPE_W$}{:>NAME_W$}{:>NUM_W$}{:>NUM_W$}{:>NUM_W$}",
        "-".repeat(FILE_W - 2),
        "-".repeat(TYPE_W - 2),
        "-".repeat(NAME_W - 2),
        "-".repeat(NUM_W - 2),
        "-".repeat(NUM_W - 2),
        "-".repeat(NUM_W - 2)
    ));
}

fn metrics_line(sinks: &LogSinks, package: &str, node: &AstNode) {
    sinks.result(&format!(
        " {:>FILE_W$}{:>TYPE_W$}{:>NAME_W$}{:>NUM_W$}{:>NUM_W$}{:>NUM_W$}",
        truncate(package, FILE_W - 2),
        node.kind.as_str(),
        truncate(&node.name, NAME_W - 2),
        node.start_line,
        node.size_lines(),
        node.complexity
    ));
}

fn public_data_lines(sinks: &LogSinks, node: &AstNode, summary: bool) {
    if !matches!(
        node.kind,
        ScopeKind::Namespace | ScopeKind::Class | ScopeKind::Struct
    ) {
        return;
    }
    for decl in &node.decls {
        if decl.kind != DeclKind::Data || decl.access != crate::ast::Access::Public {
            continue;
        }
        if summary {
            sinks.result(&format!(
                " {:>FILE_W$} {} : {} - {} {}",
                "public data:",
                decl.package,
                decl.line,
                node.kind,
                node.name
            ));
            sinks.result(&format!(" {:>FILE_W$} {}", " ", decl.text()));
        } else {
            sinks.result(&format!(" {:>FILE_W$} {}", "public data:", decl.text()));
        }
    }
}

/// `/m`: the full metrics table, header repeated whenever the file changes.
pub fn write_metrics(ast: &Ast, rows: &[MetricsRow], sinks: &LogSinks) {
    write_title(
        sinks,
        "Code Metrics - Start Line, Size (lines), and Complexity (number of scopes)",
    );
    header(sinks);

    let mut previous_file: Option<&str> = None;
    for row in rows {
        if previous_file.is_some() && previous_file != Some(row.package.as_str()) {
            sinks.result("");
            header(sinks);
        }
        let node = ast.node(row.node);
        metrics_line(sinks, &row.package, node);
        public_data_lines(sinks, node, false);
        previous_file = Some(row.package.as_str());
    }
    sinks.result("");
}

/// Always-on summary: functions exceeding the limits, then public data.
pub fn write_metric_summary(
    ast: &Ast,
    rows: &[MetricsRow],
    limits: SummaryLimits,
    sinks: &LogSinks,
) {
    write_title(sinks, "Functions Exceeding Metric Limits and Public Data");
    header(sinks);

    for row in rows {
        let node = ast.node(row.node);
        if node.kind != ScopeKind::Function {
            continue;
        }
        if node.size_lines() > limits.max_function_lines
            || node.complexity > limits.max_function_complexity
        {
            metrics_line(sinks, &row.package, node);
        }
    }
    sinks.result("");
    for row in rows {
        public_data_lines(sinks, ast.node(row.node), true);
    }
    sinks.result("");
}

/// `/a`: the scope tree, indented two spaces per level.
pub fn write_ast(ast: &Ast, sinks: &LogSinks) {
    write_title(sinks, "Abstract Syntax Tree");
    ast.walk(|id, depth| {
        sinks.result(&format!("  {}{}", "  ".repeat(depth), ast.node(id).show()));
    });
    sinks.result("");
}

/// Comparison key that groups a header right before the implementation
/// files sharing its stem.
fn sloc_sort_key(path: &Path) -> String {
    let text = path.to_string_lossy().to_string();
    match text.rsplit_once('.') {
        Some((stem, ext)) if ext.starts_with('h') => {
            format!("{}.{}", stem, ext.replacen('h', "a", 1))
        }
        _ => text,
    }
}

/// `/s`: per-file source-line counts and the total.
pub fn write_slocs(files: &FileSet, sloc: &BTreeMap<String, usize>, sinks: &LogSinks) {
    write_title(sinks, "File Size - Source Lines of Code");

    let mut listing: Vec<&Path> = files
        .iter_patterns()
        .flat_map(|(_, paths)| paths.iter().map(|p| p.as_path()))
        .collect();
    listing.sort_by_key(|p| sloc_sort_key(p));

    let mut total = 0usize;
    for path in listing {
        let base = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let lines = sloc.get(&base).copied().unwrap_or(0);
        total += lines;
        sinks.result(&format!("  {:>NUM_W$} : {}", lines, path.display()));
    }
    sinks.result("");
    sinks.result(&format!("      Total line count = {}", total));
    sinks.result("");
}

/// The dependency table, one record per file in discovery order, each
/// dependency set sorted ascending.
pub fn write_dependencies(deps: &DependencyTable, sinks: &LogSinks) {
    write_title(sinks, "Type-Based Dependency Table");
    for (file, targets) in deps.iter() {
        let rendered: Vec<String> = targets.iter().map(|t| t.display().to_string()).collect();
        sinks.result(&format!("  {} -> [{}]", file.display(), rendered.join(", ")));
    }
    sinks.result("");
}

/// JSON shape of the `/j` dependency export.
#[derive(Debug, Serialize, Deserialize)]
pub struct DependencyReport {
    pub version: String,
    pub root: String,
    pub files: Vec<FileDependencies>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FileDependencies {
    pub file: String,
    pub depends_on: Vec<String>,
}

/// `/j`: the dependency table as pretty JSON on the result channel.
pub fn write_dependencies_json(
    root: &Path,
    deps: &DependencyTable,
    sinks: &LogSinks,
) -> anyhow::Result<()> {
    let files = deps
        .iter()
        .map(|(file, targets)| FileDependencies {
            file: file.display().to_string(),
            depends_on: targets.iter().map(|t| t.display().to_string()).collect(),
        })
        .collect();

    let report = DependencyReport {
        version: env!("CARGO_PKG_VERSION").to_string(),
        root: root.display().to_string(),
        files,
    };
    sinks.result(&serde_json::to_string_pretty(&report)?);
    Ok(())
}
