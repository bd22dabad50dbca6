//! Structural metrics: scope complexity and the ordered metrics listing.

use crate::ast::{Ast, NodeId};

/// Post-order complexity evaluation: each scope counts itself plus every
/// scope it transitively contains. Anonymous blocks weigh zero.
pub fn complexity_eval(ast: &mut Ast) {
    fn eval(ast: &mut Ast, id: NodeId) -> usize {
        let children = ast.node(id).children.clone();
        let mut total = ast.node(id).kind.complexity_weight();
        for child in children {
            total += eval(ast, child);
        }
        ast.node_mut(id).complexity = total;
        total
    }
    eval(ast, ast.root());
}

/// One line of the metrics display: a scope and the file it belongs to.
#[derive(Debug, Clone)]
pub struct MetricsRow {
    /// Base name of the file the scope was opened in.
    pub package: String,
    pub node: NodeId,
}

/// Collect the displayable scopes (namespaces, types, functions, lambdas)
/// in display order: grouped by filename stem ascending, `.h` before the
/// matching implementation via extension descending as the secondary key.
pub fn collect_rows(ast: &Ast) -> Vec<MetricsRow> {
    let root = ast.root();
    let mut rows = Vec::new();
    ast.walk(|id, _depth| {
        if id == root {
            return;
        }
        let node = ast.node(id);
        if node.kind.is_metric_kind() {
            rows.push(MetricsRow {
                package: node.package.clone(),
                node: id,
            });
        }
    });

    // two stable passes: extension descending, then stem ascending; the
    // later pass is the primary key
    rows.sort_by(|a, b| extension(&b.package).cmp(extension(&a.package)));
    rows.sort_by(|a, b| stem(&a.package).cmp(stem(&b.package)));
    rows
}

fn extension(name: &str) -> &str {
    name.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("")
}

fn stem(name: &str) -> &str {
    name.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(name)
}

/// Limits for the always-on metric summary of oversized functions.
#[derive(Debug, Clone, Copy)]
pub struct SummaryLimits {
    pub max_function_lines: usize,
    pub max_function_complexity: usize,
}

impl Default for SummaryLimits {
    fn default() -> Self {
        Self {
            max_function_lines: 50,
            max_function_complexity: 10,
        }
    }
}
