//! Pattern/action rules that turn semi-expressions into scope transitions.
//!
//! Rules are a closed set evaluated in a fixed order; the first match wins
//! and the scope closer always wins. Actions mutate only the repository.

use once_cell::sync::Lazy;
use std::collections::HashSet;

use super::{Language, Repository};
use crate::ast::{Access, AstNode, DeclKind, Declaration, NodeId, ScopeKind};
use crate::error::AnalyzeError;
use crate::lexer::{SemiExpr, Token, TokenKind};
use crate::sink::LogSinks;

/// Keywords that open control scopes and can never name a function.
static CONTROL_KEYWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "if", "for", "while", "switch", "do", "try", "catch", "else", "foreach", "lock", "using",
    ]
    .into_iter()
    .collect()
});

/// Leading keywords that disqualify a semi-expression from being recorded
/// as a declaration.
static DECL_SKIP: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "if", "for", "while", "switch", "do", "try", "catch", "else", "foreach", "lock",
        "return", "delete", "throw", "break", "continue", "goto", "case", "default",
    ]
    .into_iter()
    .collect()
});

/// Evaluate the rule set against one semi-expression.
pub fn apply(semi: &SemiExpr, repo: &mut Repository, sinks: &LogSinks) -> Result<(), AnalyzeError> {
    if semi.is_empty() {
        return Ok(());
    }
    // preprocessor directives are opaque tokens; nothing to do
    if semi.tokens[0].kind == TokenKind::Preproc {
        return Ok(());
    }

    if semi.is_scope_closer() {
        return close_scope(semi, repo);
    }

    if semi.ends_with_open_brace() {
        open_scope(semi, repo, sinks);
        return Ok(());
    }

    if let Some(access) = access_specifier(semi) {
        repo.set_current_access(access);
        return Ok(());
    }

    record_declaration(semi, repo);
    Ok(())
}

fn close_scope(semi: &SemiExpr, repo: &mut Repository) -> Result<(), AnalyzeError> {
    match repo.pop_scope(semi.start_line) {
        Some(_) => Ok(()),
        None => Err(AnalyzeError::Internal(format!(
            "unmatched `}}` at line {}",
            semi.start_line
        ))),
    }
}

fn open_scope(semi: &SemiExpr, repo: &mut Repository, sinks: &LogSinks) {
    let (template_args, toks) = split_template(&semi.tokens);
    let line = semi.start_line;

    if let Some(name) = keyword_name(toks, "namespace") {
        // a namespace block re-opens an existing same-named sibling, so
        // members relocated through it find one node, not one per block
        let parent = repo.current_scope();
        if let Some(existing) = repo.ast.find_container_child(parent, &name) {
            if repo.ast.node(existing).kind == ScopeKind::Namespace {
                repo.reopen_scope(existing);
                return;
            }
        }
        push(repo, ScopeKind::Namespace, name, Access::Public, template_args, line, None);
        return;
    }
    if let Some(name) = keyword_name(toks, "class") {
        push(repo, ScopeKind::Class, name, Access::Private, template_args, line, None);
        return;
    }
    if let Some(name) = keyword_name(toks, "struct") {
        push(repo, ScopeKind::Struct, name, Access::Public, template_args, line, None);
        return;
    }
    if repo.language == Language::CSharp {
        if let Some(name) = keyword_name(toks, "interface") {
            push(repo, ScopeKind::Interface, name, Access::Public, template_args, line, None);
            return;
        }
    }
    if let Some((qualifiers, name)) = function_signature(toks) {
        let parent = if qualifiers.is_empty() {
            None
        } else {
            let resolved = resolve_qualifiers(repo, &qualifiers);
            if resolved.is_none() {
                sinks.debug(&format!(
                    "no scope matches {}::{} at line {}; attaching lexically",
                    qualifiers.join("::"),
                    name,
                    line
                ));
            }
            resolved
        };
        push(repo, ScopeKind::Function, name, Access::Public, template_args, line, parent);
        return;
    }
    if is_lambda(toks) {
        push(repo, ScopeKind::Lambda, "lambda".to_string(), Access::Public, template_args, line, None);
        return;
    }
    if is_control(toks) {
        let name = toks[0].text.clone();
        push(repo, ScopeKind::Control, name, Access::Public, None, line, None);
        return;
    }

    // fallback: bare block. A plain `enum X {` lands here; record the
    // declaration so the type table can harvest the enum name.
    if keyword_name(toks, "enum").is_some() && repo.in_declaration_scope() {
        record_tokens(semi, repo, DeclKind::Other);
    }
    push(repo, ScopeKind::Anonymous, "anonymous".to_string(), Access::Public, None, line, None);
}

fn push(
    repo: &mut Repository,
    kind: ScopeKind,
    name: String,
    access: Access,
    template_args: Option<String>,
    line: usize,
    parent_override: Option<NodeId>,
) {
    let parent = parent_override.unwrap_or_else(|| repo.current_scope());
    let mut node = AstNode::new(name, kind, repo.package.clone(), repo.path.clone(), line);
    node.template_args = template_args;
    repo.push_scope(node, parent, access);
}

/// Name introduced by `kw` in the token run: the first identifier after the
/// keyword.
fn keyword_name(toks: &[Token], kw: &str) -> Option<String> {
    let pos = toks
        .iter()
        .position(|t| t.kind == TokenKind::Identifier && t.text == kw)?;
    toks[pos + 1..]
        .iter()
        .find(|t| t.kind == TokenKind::Identifier)
        .map(|t| t.text.clone())
}

/// Match `name ( args ) ... {`, returning the `::`-qualifier chain and the
/// function name. Control keywords never name functions; a lambda fails here
/// because `]` precedes its parameter list.
fn function_signature(toks: &[Token]) -> Option<(Vec<String>, String)> {
    let open = toks.iter().position(|t| t.text == "(")?;
    if open == 0 {
        return None;
    }
    toks[open..].iter().position(|t| t.text == ")")?;

    let mut i = open - 1;
    let mut name = match toks[i].kind {
        TokenKind::Identifier => toks[i].text.clone(),
        _ => return None,
    };
    if CONTROL_KEYWORDS.contains(name.as_str()) {
        return None;
    }
    // destructor: fold the `~` into the name
    if i >= 1 && toks[i - 1].text == "~" {
        name = format!("~{}", name);
        i -= 1;
    }

    let mut qualifiers = Vec::new();
    while i >= 2 && toks[i - 1].text == "::" && toks[i - 2].kind == TokenKind::Identifier {
        qualifiers.insert(0, toks[i - 2].text.clone());
        i -= 2;
    }
    Some((qualifiers, name))
}

/// Resolve a qualifier chain to the scope node a relocated member belongs
/// to. Starts from each open scope innermost-first, then from the root, and
/// follows the chain left to right.
fn resolve_qualifiers(repo: &Repository, qualifiers: &[String]) -> Option<NodeId> {
    let starts: Vec<NodeId> = repo.scope_chain().iter().rev().copied().collect();
    for start in starts {
        let mut current = start;
        let mut matched = true;
        for name in qualifiers {
            match repo.ast.find_container_child(current, name) {
                Some(next) => current = next,
                None => {
                    matched = false;
                    break;
                }
            }
        }
        if matched {
            return Some(current);
        }
    }
    None
}

/// True for `... [ captures ] ( params ) ... {` and the parameterless
/// `... [ captures ] {` form.
fn is_lambda(toks: &[Token]) -> bool {
    let Some(lb) = toks.iter().position(|t| t.text == "[") else {
        return false;
    };
    let Some(rb_off) = toks[lb..].iter().position(|t| t.text == "]") else {
        return false;
    };
    let after = lb + rb_off + 1;
    matches!(toks.get(after).map(|t| t.text.as_str()), Some("(") | Some("{"))
}

fn is_control(toks: &[Token]) -> bool {
    toks.first()
        .is_some_and(|t| t.kind == TokenKind::Identifier && CONTROL_KEYWORDS.contains(t.text.as_str()))
}

/// Consume a leading `template < ... >` prefix, counting nested angles.
/// Returns the prefix text and the remaining tokens.
fn split_template(toks: &[Token]) -> (Option<String>, &[Token]) {
    if toks.len() < 2 || toks[0].text != "template" || toks[1].text != "<" {
        return (None, toks);
    }
    let mut depth = 0isize;
    for (i, t) in toks.iter().enumerate().skip(1) {
        match t.text.as_str() {
            "<" => depth += 1,
            ">" => depth -= 1,
            ">>" => depth -= 2,
            _ => {}
        }
        if depth <= 0 {
            let text: Vec<&str> = toks[..=i].iter().map(|t| t.text.as_str()).collect();
            return (Some(text.join(" ")), &toks[i + 1..]);
        }
    }
    (None, toks)
}

fn access_specifier(semi: &SemiExpr) -> Option<Access> {
    if semi.len() != 2 || semi.text(1) != Some(":") {
        return None;
    }
    match semi.first_text() {
        Some("public") => Some(Access::Public),
        Some("protected") => Some(Access::Protected),
        Some("private") => Some(Access::Private),
        _ => None,
    }
}

/// Record a declaration-shaped semi-expression on the current scope.
fn record_declaration(semi: &SemiExpr, repo: &mut Repository) {
    if !repo.in_declaration_scope() {
        return;
    }
    if semi.last_text() != Some(";") || semi.len() < 2 {
        return;
    }
    let first = &semi.tokens[0];
    if first.kind == TokenKind::Identifier && DECL_SKIP.contains(first.text.as_str()) {
        return;
    }
    if !semi.tokens.iter().any(Token::is_identifier) {
        return;
    }
    record_tokens(semi, repo, classify_decl(&semi.tokens));
}

fn record_tokens(semi: &SemiExpr, repo: &mut Repository, kind: DeclKind) {
    let decl = Declaration {
        package: repo.package.clone(),
        file: repo.current_file(),
        line: semi.start_line,
        access: repo.current_access(),
        kind,
        tokens: semi.tokens.iter().map(|t| t.text.clone()).collect(),
    };
    repo.record_decl(decl);
}

fn classify_decl(toks: &[Token]) -> DeclKind {
    if matches!(toks[0].text.as_str(), "typedef" | "using" | "enum") {
        return DeclKind::Other;
    }
    if is_lambda(toks) {
        return DeclKind::Lambda;
    }
    if toks.iter().any(|t| t.text == "(") {
        return DeclKind::Function;
    }
    DeclKind::Data
}
