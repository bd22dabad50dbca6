//! Scope-tracking parser that accumulates the cross-file AST.
//!
//! Each file is tokenized, grouped into semi-expressions and run through the
//! rule set in `rules`. All visible side effects of parsing land on the
//! [`Repository`], which holds the AST, the open-scope stack and the
//! per-file context. One parse pass is the repository's only writer; the
//! analyses afterwards read it frozen.

mod rules;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::ast::{Access, Ast, AstNode, Declaration, NodeId, ScopeKind};
use crate::error::AnalyzeError;
use crate::lexer::SemiCollector;
use crate::sink::LogSinks;

/// Source language of the file being parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Cpp,
    CSharp,
}

impl Language {
    /// Language implied by a file extension; unknown extensions parse as C++.
    pub fn from_extension(ext: &str) -> Language {
        match ext {
            "cs" => Language::CSharp,
            _ => Language::Cpp,
        }
    }
}

/// Process-wide parse state: the AST under construction, the stack of open
/// scopes and the current file context.
pub struct Repository {
    pub ast: Ast,
    scopes: Vec<NodeId>,
    access: Vec<Access>,
    pub language: Language,
    /// Base name of the file being parsed.
    pub package: String,
    /// Directory of that file.
    pub path: PathBuf,
    /// Source lines per file, keyed by base name.
    pub sloc: BTreeMap<String, usize>,
}

impl Repository {
    pub fn new() -> Self {
        let ast = Ast::new();
        let root = ast.root();
        Self {
            ast,
            scopes: vec![root],
            access: vec![Access::Public],
            language: Language::Cpp,
            package: String::new(),
            path: PathBuf::new(),
            sloc: BTreeMap::new(),
        }
    }

    /// The scope declarations and new children attach to.
    pub fn current_scope(&self) -> NodeId {
        self.scopes.last().copied().unwrap_or_else(|| self.ast.root())
    }

    /// Open scopes, bottom (root) first.
    pub fn scope_chain(&self) -> &[NodeId] {
        &self.scopes
    }

    /// Number of open scopes including the root.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Open a new scope: attach `node` under `parent` and make it current.
    pub fn push_scope(&mut self, node: AstNode, parent: NodeId, access: Access) -> NodeId {
        let id = self.ast.add_child(parent, node);
        self.scopes.push(id);
        self.access.push(access);
        id
    }

    /// Make an existing scope current again (namespace blocks spanning
    /// several files share one node).
    pub fn reopen_scope(&mut self, id: NodeId) {
        self.scopes.push(id);
        self.access.push(Access::Public);
    }

    /// Close the current scope, stamping its end line. Returns `None` when
    /// only the root is open (an unmatched `}`).
    pub fn pop_scope(&mut self, end_line: usize) -> Option<NodeId> {
        if self.scopes.len() <= 1 {
            return None;
        }
        let id = self.scopes.pop()?;
        self.access.pop();
        self.ast.node_mut(id).end_line = end_line;
        Some(id)
    }

    /// Close every open scope down to the root, stamping end lines.
    pub fn reset_to_root(&mut self, end_line: usize) {
        while self.pop_scope(end_line).is_some() {}
    }

    pub fn current_access(&self) -> Access {
        self.access.last().copied().unwrap_or(Access::Public)
    }

    /// Update the access mode of the current scope; only class and struct
    /// bodies honor access specifiers.
    pub fn set_current_access(&mut self, access: Access) {
        let kind = self.ast.node(self.current_scope()).kind;
        if matches!(kind, ScopeKind::Class | ScopeKind::Struct) {
            if let Some(top) = self.access.last_mut() {
                *top = access;
            }
        }
    }

    /// True when the current scope can hold recordable declarations.
    pub fn in_declaration_scope(&self) -> bool {
        self.ast.node(self.current_scope()).kind.holds_declarations()
    }

    /// Record a declaration on the current scope.
    pub fn record_decl(&mut self, decl: Declaration) {
        let scope = self.current_scope();
        self.ast.node_mut(scope).decls.push(decl);
    }

    /// Full path of the file currently being parsed.
    pub fn current_file(&self) -> PathBuf {
        self.path.join(&self.package)
    }
}

impl Default for Repository {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse one file into the repository's AST. Returns the file's source line
/// count. Fails only when the file cannot be read; structural problems are
/// reported on the debug sink and recovered.
pub fn parse_file(
    repo: &mut Repository,
    sinks: &LogSinks,
    file: &Path,
) -> Result<usize, AnalyzeError> {
    let source = fs::read_to_string(file).map_err(|e| AnalyzeError::Io {
        path: file.to_path_buf(),
        source: e,
    })?;

    let ext = file.extension().and_then(|e| e.to_str()).unwrap_or("");
    repo.language = Language::from_extension(ext);
    repo.package = file
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    repo.path = file.parent().map(Path::to_path_buf).unwrap_or_default();

    let sloc = parse_source(repo, sinks, &source);
    repo.sloc.insert(repo.package.clone(), sloc);
    Ok(sloc)
}

/// Run the rule set over a source string using the repository's current file
/// context. Returns the number of lines consumed.
pub fn parse_source(repo: &mut Repository, sinks: &LogSinks, source: &str) -> usize {
    let mut collector = SemiCollector::new(source);
    for semi in &mut collector {
        if let Err(e) = rules::apply(&semi, repo, sinks) {
            sinks.debug(&format!("{} in {}; skipping rest of file", e, repo.package));
            repo.reset_to_root(semi.start_line);
            break;
        }
    }
    // drain to the end so the line count covers the whole file
    for _ in &mut collector {}

    if repo.depth() > 1 {
        sinks.debug(&format!(
            "{} unclosed scope(s) at end of {}",
            repo.depth() - 1,
            repo.package
        ));
        repo.reset_to_root(collector.lines_consumed());
    }
    collector.lines_consumed()
}
