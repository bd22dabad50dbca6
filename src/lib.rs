//! depscan - type-based dependency analysis for C-family source trees.
//!
//! Given a root directory and a set of filename patterns, depscan discovers
//! C++ header, C++ implementation and C# files, parses them into a single
//! abstract syntax tree of named program scopes, computes structural
//! metrics, and derives a file-to-file dependency table from the
//! user-defined types each file mentions versus defines.
//!
//! # Architecture
//!
//! The pipeline runs in strict phases:
//!
//! - `discover`: pattern-matched directory walk, headers ordered first
//! - `lexer`: tokenizer and semi-expression collector
//! - `parser`: scope-tracking rule engine building the AST on a shared
//!   repository
//! - `analysis`: complexity evaluation, type table, dependency resolution
//! - `report`: metrics table, AST dump, SLOC and dependency output
//! - `cli` / `sink`: the command surface and the result/demo/debug channels
//!
//! Headers parse before implementation files so out-of-line C++ members can
//! be relocated into their class scope; the type table is closed before any
//! dependency edge is drawn.

pub mod analysis;
pub mod analyze;
pub mod ast;
pub mod cli;
pub mod discover;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod report;
pub mod sink;

pub use analysis::{collect_rows, complexity_eval, DependencyTable, MetricsRow, SummaryLimits, TypeTable};
pub use analyze::{Analysis, Analyzer};
pub use ast::{Access, Ast, AstNode, DeclKind, Declaration, NodeId, ScopeKind};
pub use discover::{discover, FileSet};
pub use error::AnalyzeError;
pub use lexer::{SemiCollector, SemiExpr, Token, TokenKind, Tokenizer};
pub use parser::{parse_file, Language, Repository};
pub use sink::LogSinks;
