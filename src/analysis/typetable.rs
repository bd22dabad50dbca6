//! Type table: user-defined type name → defining file.
//!
//! Built from one walk of the AST. Class, struct and interface scopes
//! define their own names; `typedef`, `using` aliases and plain `enum`
//! declarations are harvested from the scopes' declaration lists. When two
//! files define the same name the later definition wins and a diagnostic
//! goes to the debug sink.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::ast::Ast;
use crate::sink::LogSinks;

#[derive(Debug, Clone, Default)]
pub struct TypeTable {
    map: HashMap<String, PathBuf>,
}

impl TypeTable {
    /// Harvest every user-defined type from the AST.
    pub fn build(ast: &Ast, sinks: &LogSinks) -> TypeTable {
        let mut table = TypeTable::default();
        ast.walk(|id, _depth| {
            let node = ast.node(id);
            if node.kind.is_type_definition() && is_type_name(&node.name) {
                table.insert(&node.name, node.source_file(), sinks);
            }
            for decl in &node.decls {
                if let Some(name) = alias_type_name(&decl.tokens) {
                    table.insert(&name, decl.file.clone(), sinks);
                }
            }
        });
        table
    }

    fn insert(&mut self, name: &str, file: PathBuf, sinks: &LogSinks) {
        if let Some(previous) = self.map.get(name) {
            if previous != &file {
                sinks.debug(&format!(
                    "type {:?} redefined in {}; previous definition in {} is shadowed",
                    name,
                    file.display(),
                    previous.display()
                ));
            }
        }
        self.map.insert(name.to_string(), file);
    }

    /// The file defining `name`, if `name` is a known user type.
    pub fn defining_file(&self, name: &str) -> Option<&Path> {
        self.map.get(name).map(PathBuf::as_path)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &PathBuf)> {
        self.map.iter()
    }
}

fn is_type_name(name: &str) -> bool {
    !name.is_empty()
        && name != "anonymous"
        && name
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
}

/// Type name introduced by a `typedef`, `using` alias or plain `enum`
/// declaration, if any.
fn alias_type_name(tokens: &[String]) -> Option<String> {
    match tokens.first().map(String::as_str) {
        Some("typedef") => tokens
            .iter()
            .rev()
            .find(|t| is_type_name(t))
            .cloned(),
        Some("using") => {
            // only the alias form `using X = ...` defines a name
            if tokens.get(1).map(String::as_str) == Some("namespace") {
                return None;
            }
            if tokens.get(2).map(String::as_str) == Some("=") {
                tokens.get(1).filter(|t| is_type_name(t)).cloned()
            } else {
                None
            }
        }
        Some("enum") => tokens
            .iter()
            .skip(1)
            .find(|t| !matches!(t.as_str(), "class" | "struct") && is_type_name(t))
            .cloned(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse_source, Repository};
    use std::path::PathBuf;

    fn parse_into(repo: &mut Repository, package: &str, source: &str) {
        repo.package = package.to_string();
        repo.path = PathBuf::from("/src");
        repo.language =
            crate::parser::Language::from_extension(package.rsplit('.').next().unwrap_or(""));
        let sinks = LogSinks::quiet();
        parse_source(repo, &sinks, source);
    }

    fn build(repo: &Repository) -> TypeTable {
        TypeTable::build(&repo.ast, &LogSinks::quiet())
    }

    #[test]
    fn test_class_struct_interface_recorded() {
        let mut repo = Repository::new();
        parse_into(&mut repo, "A.h", "class A { }; struct B { };");
        parse_into(&mut repo, "I.cs", "interface I { }");

        let table = build(&repo);
        assert_eq!(table.defining_file("A"), Some(Path::new("/src/A.h")));
        assert_eq!(table.defining_file("B"), Some(Path::new("/src/A.h")));
        assert_eq!(table.defining_file("I"), Some(Path::new("/src/I.cs")));
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_functions_not_recorded() {
        let mut repo = Repository::new();
        parse_into(&mut repo, "F.cpp", "void helper() { }");
        let table = build(&repo);
        assert!(!table.contains("helper"));
    }

    #[test]
    fn test_typedef_recorded() {
        let mut repo = Repository::new();
        parse_into(&mut repo, "T.h", "typedef unsigned long Size;");
        let table = build(&repo);
        assert_eq!(table.defining_file("Size"), Some(Path::new("/src/T.h")));
    }

    #[test]
    fn test_using_alias_recorded() {
        let mut repo = Repository::new();
        parse_into(&mut repo, "U.h", "using Key = std::string;");
        let table = build(&repo);
        assert_eq!(table.defining_file("Key"), Some(Path::new("/src/U.h")));
    }

    #[test]
    fn test_using_namespace_not_recorded() {
        let mut repo = Repository::new();
        parse_into(&mut repo, "U.cpp", "using namespace std;");
        let table = build(&repo);
        assert!(table.is_empty());
    }

    #[test]
    fn test_plain_enum_recorded() {
        let mut repo = Repository::new();
        parse_into(&mut repo, "E.h", "enum Color { red, green };");
        let table = build(&repo);
        assert_eq!(table.defining_file("Color"), Some(Path::new("/src/E.h")));
    }

    #[test]
    fn test_enum_class_recorded() {
        let mut repo = Repository::new();
        parse_into(&mut repo, "E.h", "enum class Mode { on, off };");
        let table = build(&repo);
        assert_eq!(table.defining_file("Mode"), Some(Path::new("/src/E.h")));
    }

    #[test]
    fn test_collision_last_writer_wins() {
        let mut repo = Repository::new();
        parse_into(&mut repo, "First.h", "class Twice { };");
        parse_into(&mut repo, "Second.h", "class Twice { };");
        let table = build(&repo);
        assert_eq!(table.defining_file("Twice"), Some(Path::new("/src/Second.h")));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_forward_declaration_not_a_definition() {
        let mut repo = Repository::new();
        parse_into(&mut repo, "F.h", "class Fwd;");
        let table = build(&repo);
        assert!(!table.contains("Fwd"));
    }
}
